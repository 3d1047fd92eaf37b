//! Persistence layer: owner-scoped queries over users and contacts

pub mod contacts;
pub mod users;
