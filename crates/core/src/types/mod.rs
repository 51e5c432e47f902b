//! Core types for Seeklit.
//!
//! This module provides type-safe wrappers for the domain concepts exchanged
//! with the Seeklit API server and the Audiobookshelf media server.

pub mod auth;
pub mod book;
pub mod id;
pub mod issue;
pub mod settings;
pub mod status;
pub mod user;

pub use auth::{AuthInfo, AvailableMethods, OidcInfo, friendly_auth_error};
pub use book::{
    BookRequest, BookRequestError, EditBookRequest, MetadataProvider, NewBookRequest,
    UnknownProvider,
};
pub use id::*;
pub use issue::{EditIssue, Issue, IssueError, NewIssue};
pub use settings::{ServerConfigUpdate, ServerSettings, is_sensitive_key};
pub use status::*;
pub use user::{AuthSource, Role, User, UserPermissions, UserProfile, WireUser};
