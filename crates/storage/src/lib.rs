#![forbid(unsafe_code)]

pub mod history;
pub mod repository;
pub mod sqlite;

pub use history::{HISTORY_CAP, HISTORY_KEY, SessionHistory};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
