//! HTTP request handlers.

pub mod admin;
pub mod repos;

pub use admin::*;
pub use repos::*;
