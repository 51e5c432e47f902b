//! Book requests and metadata providers.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::BookRequestId;
use super::status::{ApprovalStatus, DownloadStatus};
use super::user::User;

/// External metadata provider a search is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataProvider {
    Google,
    #[serde(rename = "OPENLIBRARY")]
    OpenLibrary,
    Hardcover,
    Readarr,
}

impl MetadataProvider {
    pub const ALL: [Self; 4] = [Self::Google, Self::OpenLibrary, Self::Hardcover, Self::Readarr];

    /// Path segment used by the Seeklit search API (`/search/{segment}`).
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenLibrary => "openlib",
            Self::Hardcover => "hardcover",
            Self::Readarr => "readarr",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "GOOGLE",
            Self::OpenLibrary => "OPENLIBRARY",
            Self::Hardcover => "HARDCOVER",
            Self::Readarr => "READARR",
        }
    }
}

impl fmt::Display for MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`MetadataProvider`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown metadata provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for MetadataProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "openlibrary" | "openlib" => Ok(Self::OpenLibrary),
            "hardcover" => Ok(Self::Hardcover),
            "readarr" => Ok(Self::Readarr),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Validation failures for a new book request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BookRequestError {
    #[error("a book title is required to submit a request")]
    MissingTitle,
    #[error("an author is required to submit a request")]
    MissingAuthor,
    #[error("the book source is missing")]
    MissingSource,
}

/// A request for a book that is not yet in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub isbn_10: Option<String>,
    #[serde(default)]
    pub isbn_13: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub requestor_id: String,
    #[serde(default)]
    pub requestor_username: String,
}

impl NewBookRequest {
    /// Check the fields a request cannot be submitted without.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, title before author.
    pub fn validate(&self) -> Result<(), BookRequestError> {
        if self.title.trim().is_empty() {
            return Err(BookRequestError::MissingTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookRequestError::MissingAuthor);
        }
        if self.source.trim().is_empty() {
            return Err(BookRequestError::MissingSource);
        }
        Ok(())
    }

    /// Stamp the requesting user onto the request.
    #[must_use]
    pub fn requested_by(mut self, user: &User) -> Self {
        self.requestor_id.clone_from(&user.id);
        self.requestor_username.clone_from(&user.username);
        self
    }
}

/// A stored book request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    pub id: BookRequestId,
    pub title: String,
    pub author: String,
    pub source: String,
    pub source_id: String,
    pub isbn_10: Option<String>,
    pub isbn_13: Option<String>,
    pub cover: Option<String>,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub download_status: DownloadStatus,
    pub download_source: Option<String>,
    pub requestor_id: String,
    pub requestor_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin edit of a book request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBookRequest {
    pub approval_status: ApprovalStatus,
    pub download_status: DownloadStatus,
    pub download_source: Option<String>,
}
