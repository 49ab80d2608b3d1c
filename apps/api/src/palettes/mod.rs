//! Saved palettes: persistence rules and the delete cascade.

pub mod handlers;
pub mod service;
