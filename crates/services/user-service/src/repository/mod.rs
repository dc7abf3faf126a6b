//! Repository layer for data access.

pub mod entities;
mod memory;
mod user_store;

pub use memory::InMemoryUserStore;
pub use user_store::UserStore;
