//! JSON API consumed by the browser.
//!
//! Thin proxies to the Seeklit API server. Every handler except
//! `GET /api/settings` requires a signed-in user and calls upstream with
//! that user's bearer token.

pub mod issues;
pub mod me;
pub mod preferences;
pub mod requests;
pub mod search;
pub mod settings;
pub mod users;
