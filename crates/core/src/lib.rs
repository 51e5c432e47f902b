//! Seeklit Core - Shared types library.
//!
//! This crate provides the domain types shared by the Seeklit web frontend
//! and its tests:
//! - `web` - Server-rendered frontend, session handling and API proxying
//! - `integration-tests` - End-to-end tests against mocked upstream APIs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Upstream payloads are deserialized into permissive wire types and
//! lifted into strict domain types here, so every consumer sees the same
//! invariants (for example: a [`User`] always carries a non-empty access token).
//!
//! # Modules
//!
//! - [`types`] - Users, auth configuration, book requests, issues and settings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
