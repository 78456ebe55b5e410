//! Endpoint groups.
//!
//! Each group translates one logical operation into one request through the
//! client's shared pipeline.

pub mod admin;
pub mod export;
pub mod stats;
