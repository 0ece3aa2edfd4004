//! HTTP middleware: request ID and cache policy.

pub mod cache_control;
pub mod request_id;
