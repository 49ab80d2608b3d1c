//! Comments, collaboration invites, notifications and activity feeds.

pub mod collaboration;
pub mod comments;
pub mod handlers;
