//! SeaORM entities for the identity tables.

pub mod credential;
pub mod profile;
pub mod user;
