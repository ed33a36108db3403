//! Storage backends for the roster.

pub mod memory;
pub mod redis;
pub mod traits;

pub use self::traits::{
    RosterStorage,
    StorageError,
    StorageResult,
    StudentAdd,
    StudentAddError,
};
