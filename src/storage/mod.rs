//! Storage module for ledger persistence

pub mod persistence;

pub use persistence::{load_from_file, Storage, StorageConfig, StorageError};
