//! Request extractors.
//!
//! - [`admin::AdminToken`] -- Requires a valid `x-admin-token` header.

pub mod admin;
