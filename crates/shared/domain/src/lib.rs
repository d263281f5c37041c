//! # Domain Types
//!
//! Pure configuration types and protocol constants with a single dependency (`serde`).
//! Keep it lean: no I/O, networking, or heavy logic. Just data and simple helpers.

pub mod config;
pub mod constants;
