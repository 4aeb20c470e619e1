use serde::{Deserialize, Serialize};

/// `dev-status/1.0/issue/detail` response.
#[derive(Debug, Deserialize)]
pub struct DevStatusResponse {
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub detail: Vec<DevStatusDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevStatusDetail {
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub branches: Vec<RawBranch>,
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub pull_requests: Vec<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
pub struct RawBranch {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPullRequest {
    pub author: Option<RawAuthor>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment_count: Option<u64>,
    #[serde(default, deserialize_with = "crate::models::null_as_empty")]
    pub reviewers: Vec<RawAuthor>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub last_update: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAuthor {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    pub author: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment_count: Option<u64>,
    pub reviewers: Vec<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPullRequests {
    pub branches: Vec<String>,
    pub pull_requests: Vec<PullRequestSummary>,
}

impl From<RawPullRequest> for PullRequestSummary {
    fn from(pr: RawPullRequest) -> Self {
        let author = match &pr.author {
            Some(author) => author_label(author.name.as_deref(), author.url.as_deref()),
            None => author_label(None, None),
        };

        Self {
            author,
            id: pr.id,
            name: pr.name,
            comment_count: pr.comment_count,
            reviewers: pr.reviewers.into_iter().filter_map(|r| r.name).collect(),
            status: pr.status,
            url: pr.url,
            last_update: pr.last_update,
        }
    }
}

impl From<DevStatusDetail> for LinkedPullRequests {
    fn from(detail: DevStatusDetail) -> Self {
        Self {
            branches: detail.branches.into_iter().filter_map(|b| b.name).collect(),
            pull_requests: detail
                .pull_requests
                .into_iter()
                .map(PullRequestSummary::from)
                .collect(),
        }
    }
}

/// `"Jane Doe (jdoe)"`, where the id is the last segment of the profile URL.
/// Falls back to the bare name when the URL is missing or unusable.
pub fn author_label(name: Option<&str>, url: Option<&str>) -> String {
    let name = name.filter(|n| !n.is_empty()).unwrap_or("unknown");

    match url.and_then(profile_id) {
        Some(id) => format!("{} ({})", name, id),
        None => name.to_string(),
    }
}

fn profile_id(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_author_label() {
        assert_eq!(
            author_label(Some("Jane Doe"), Some("https://github.example.com/jdoe")),
            "Jane Doe (jdoe)"
        );
        assert_eq!(
            author_label(Some("Jane Doe"), Some("https://github.example.com/jdoe/")),
            "Jane Doe (jdoe)"
        );
    }

    #[test]
    fn test_author_label_without_usable_url() {
        assert_eq!(author_label(Some("Jane"), None), "Jane");
        assert_eq!(author_label(Some("Jane"), Some("not a url")), "Jane");
        assert_eq!(author_label(Some("Jane"), Some("https://github.example.com")), "Jane");
        assert_eq!(author_label(None, None), "unknown");
    }

    #[test]
    fn test_detail_projection() {
        let detail: DevStatusDetail = serde_json::from_value(json!({
            "branches": [{ "name": "feature/ABC-1", "url": "https://x" }],
            "pullRequests": [{
                "author": { "name": "Jane", "url": "https://github.example.com/jdoe", "avatar": "a" },
                "id": "#42",
                "name": "ABC-1 fix login",
                "commentCount": 3,
                "reviewers": [{ "name": "bob", "approved": true }, { "name": "amy" }],
                "status": "OPEN",
                "url": "https://github.example.com/org/repo/pull/42",
                "lastUpdate": "2024-03-02T10:00:00.000+0000",
                "source": { "branch": "feature/ABC-1" }
            }],
            "repositories": []
        }))
        .unwrap();

        let linked = LinkedPullRequests::from(detail);
        assert_eq!(linked.branches, vec!["feature/ABC-1"]);
        let pr = &linked.pull_requests[0];
        assert_eq!(pr.author, "Jane (jdoe)");
        assert_eq!(pr.comment_count, Some(3));
        assert_eq!(pr.reviewers, vec!["bob", "amy"]);

        let value = serde_json::to_value(pr).unwrap();
        assert_eq!(value["lastUpdate"], "2024-03-02T10:00:00.000+0000");
        assert_eq!(value["commentCount"], 3);
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let detail: DevStatusDetail = serde_json::from_value(json!({
            "branches": null,
            "pullRequests": [{
                "author": { "name": "Jane" },
                "id": "#7",
                "reviewers": null
            }]
        }))
        .unwrap();

        let linked = LinkedPullRequests::from(detail);
        assert!(linked.branches.is_empty());
        assert_eq!(linked.pull_requests[0].author, "Jane");
        assert!(linked.pull_requests[0].reviewers.is_empty());

        let response: DevStatusResponse = serde_json::from_value(json!({ "detail": null })).unwrap();
        assert!(response.detail.is_empty());
    }
}
