//! Issues reported against books already in the library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::IssueId;
use super::status::{IssueSeverity, IssueStatus};
use super::user::User;

/// Validation failures for a new issue.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("the issue must reference a book")]
    MissingBook,
    #[error("please describe the issue")]
    MissingDescription,
}

/// A new issue report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: IssueSeverity,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub creator_username: String,
}

impl NewIssue {
    /// # Errors
    ///
    /// Returns an error when the book reference or description is blank.
    pub fn validate(&self) -> Result<(), IssueError> {
        if self.book_id.trim().is_empty() || self.book_title.trim().is_empty() {
            return Err(IssueError::MissingBook);
        }
        if self.description.trim().is_empty() {
            return Err(IssueError::MissingDescription);
        }
        Ok(())
    }

    /// Stamp the reporting user onto the issue.
    #[must_use]
    pub fn reported_by(mut self, user: &User) -> Self {
        self.creator_id.clone_from(&user.id);
        self.creator_username.clone_from(&user.username);
        self
    }
}

/// A stored issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub book_id: String,
    pub book_title: String,
    pub description: String,
    pub severity: IssueSeverity,
    pub status: IssueStatus,
    pub creator_id: String,
    pub creator_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status change for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditIssue {
    pub status: IssueStatus,
}
