//! In-memory backend for the forge artifact history.
//!
//! History lives only as long as the session that owns it; nothing is written
//! to disk.

mod store;

pub use store::MemoryHistory;

#[cfg(test)]
mod tests;
