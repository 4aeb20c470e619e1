//! The two page layouts used by the Jira REST APIs.
//!
//! The agile API (`agile/1.0/...`) returns `{"values": [...], "isLast": bool}`,
//! the platform search API returns `{"issues": [...], "startAt", "maxResults",
//! "total"}`. Both are walked from `startAt=0` in steps of [`PAGE_SIZE`].

use serde_json::Value;

pub const PAGE_SIZE: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageConvention {
    /// `values` + `isLast`
    Values,
    /// `issues` + `startAt`/`maxResults`/`total`
    Issues,
}

#[derive(Debug)]
pub struct Page {
    pub items: Vec<Value>,
    pub is_last: bool,
}

impl PageConvention {
    pub const fn items_key(self) -> &'static str {
        match self {
            PageConvention::Values => "values",
            PageConvention::Issues => "issues",
        }
    }

    /// Splits one response into its items and the "last page" flag. The
    /// error is a description of what the response was missing.
    pub fn read_page(self, mut payload: Value) -> Result<Page, String> {
        let is_last = match self {
            PageConvention::Values => payload
                .get("isLast")
                .and_then(Value::as_bool)
                .ok_or_else(|| "missing boolean 'isLast'".to_string())?,
            PageConvention::Issues => {
                let start_at = cursor(&payload, "startAt")?;
                let max_results = cursor(&payload, "maxResults")?;
                let total = cursor(&payload, "total")?;
                start_at.saturating_add(max_results) >= total
            }
        };

        let key = self.items_key();
        let items = match payload.get_mut(key).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(format!("'{}' is not a list", key)),
            None => return Err(format!("missing '{}'", key)),
        };

        Ok(Page { items, is_last })
    }
}

// Cursor fields may arrive as numbers or as numeric strings.
fn cursor(payload: &Value, key: &str) -> Result<u64, String> {
    match payload.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| format!("'{}' is not a non-negative integer", key)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a non-negative integer", key)),
        _ => Err(format!("missing '{}'", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_page() {
        let page = PageConvention::Values
            .read_page(json!({ "values": [1, 2], "isLast": false, "maxResults": 50 }))
            .unwrap();
        assert_eq!(page.items, vec![json!(1), json!(2)]);
        assert!(!page.is_last);
    }

    #[test]
    fn test_values_page_without_is_last() {
        let err = PageConvention::Values
            .read_page(json!({ "values": [] }))
            .unwrap_err();
        assert!(err.contains("isLast"));
    }

    #[test]
    fn test_issues_page_stopping_condition() {
        let read = |start_at: u64| {
            PageConvention::Issues
                .read_page(json!({
                    "issues": [],
                    "startAt": start_at,
                    "maxResults": 50,
                    "total": 120
                }))
                .unwrap()
                .is_last
        };
        assert!(!read(0));
        assert!(!read(50));
        assert!(read(100));
    }

    #[test]
    fn test_issues_page_accepts_numeric_strings() {
        let page = PageConvention::Issues
            .read_page(json!({
                "issues": [{ "key": "ABC-1" }],
                "startAt": "0",
                "maxResults": "50",
                "total": "1"
            }))
            .unwrap();
        assert!(page.is_last);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_issues_page_missing_cursor() {
        let err = PageConvention::Issues
            .read_page(json!({ "issues": [], "startAt": 0, "maxResults": 50 }))
            .unwrap_err();
        assert!(err.contains("total"));
    }

    #[test]
    fn test_items_must_be_a_list() {
        let err = PageConvention::Values
            .read_page(json!({ "values": {}, "isLast": true }))
            .unwrap_err();
        assert!(err.contains("not a list"));
    }
}
