//! Agency Admin - admin backend for an agency website
//!
//! Single-admin session authentication over a JSON credential file, plus the
//! JSON-file content store and HTTP API behind the site's admin panel.

pub mod api;
pub mod auth;
pub mod config;
pub mod server;
pub mod setup;
pub mod store;
