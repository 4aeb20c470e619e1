use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: u64,
    pub state: Option<String>,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Epic {
    pub id: u64,
    pub name: Option<String>,
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sprint_keeps_only_projected_fields() {
        let sprint: Sprint = serde_json::from_value(json!({
            "id": 37,
            "self": "https://jira.example.com/rest/agile/1.0/sprint/37",
            "state": "active",
            "name": "Sprint 7",
            "startDate": "2024-03-01T09:00:00.000Z",
            "endDate": "2024-03-15T09:00:00.000Z",
            "originBoardId": 5
        }))
        .unwrap();

        assert_eq!(sprint.id, 37);
        assert!(sprint.goal.is_none());

        let value = serde_json::to_value(&sprint).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 37,
                "state": "active",
                "name": "Sprint 7",
                "goal": null,
                "startDate": "2024-03-01T09:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_epic_deserialization() {
        let epic: Epic = serde_json::from_value(json!({
            "id": 12,
            "key": "ABC-4",
            "name": "Payments",
            "summary": "Payments epic",
            "done": false
        }))
        .unwrap();

        assert_eq!(epic.id, 12);
        assert_eq!(epic.key.as_deref(), Some("ABC-4"));
        assert_eq!(epic.name.as_deref(), Some("Payments"));
    }
}
