//! Status enums for book requests and issues.
//!
//! The Seeklit server stores these as lowercase strings. Values it may add
//! later are tolerated on read through the `Other` variants so a newer server
//! never breaks request listing.

use serde::{Deserialize, Serialize};

/// Approval state of a book request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Denied,
    #[serde(untagged)]
    Other(String),
}

/// Download state of a book request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    #[default]
    Pending,
    Downloading,
    Complete,
    Failed,
    #[serde(untagged)]
    Other(String),
}

/// Severity reported with an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

/// Lifecycle of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Pending,
    Cancelled,
    Resolved,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_status_known_values() {
        let status: ApprovalStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_download_status_unknown_value_is_preserved() {
        let status: DownloadStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, DownloadStatus::Other("queued".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"queued\"");
    }

    #[test]
    fn test_issue_severity_lowercase() {
        assert_eq!(
            serde_json::to_string(&IssueSeverity::Critical).unwrap(),
            "\"critical\""
        );
        let status: IssueStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(status, IssueStatus::Resolved);
    }
}
