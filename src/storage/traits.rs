//! Storage API.

use std::collections::BTreeSet;

use derive_more::Deref;
use displaydoc::Display;
use thiserror::Error;

use crate::student::Student;

/// The error type for storage operations that are not directly related to application domain.
/// These include, for example IO errors like broken pipe, connection refused, etc.
pub type StorageError = anyhow::Error;

/// The result of the storage operation.
pub type StorageResult<T> = Result<T, StorageError>;

/// An abstract roster storage.
///
/// A roster maps the unique name of a student to the number of times they have been selected.
/// All operations block until the store has answered.
pub trait RosterStorage {
    /// Returns every student of the roster.
    ///
    /// # Behavior
    ///
    /// - If the roster is empty, return `StorageResult::Ok(Vec::new())`.
    /// - The order is the iteration order of the store and is not guaranteed to be sorted.
    fn students(&mut self) -> StorageResult<Vec<Student>>;

    /// Adds a new student to the roster.
    ///
    /// # Behavior
    ///
    /// - If the student has been successfully added, return `StorageResult::Ok(StudentAdd)`
    ///   containing a `Result::Ok(())`.
    /// - If a student with the same name already exists, leave it untouched and return
    ///   `StorageResult::Ok(StudentAdd)` containing a `Result::Err(StudentAddError)`.
    fn add_student(&mut self, student: &Student) -> StorageResult<StudentAdd>;

    /// Adds the students one after another.
    ///
    /// # Behavior
    ///
    /// - Stop at the first student that could not be added and return its
    ///   `StorageResult::Ok(StudentAdd)`. Students added before are kept.
    /// - If all students have been added, return `StorageResult::Ok(StudentAdd)` containing a
    ///   `Result::Ok(())`.
    fn bulk_insert(&mut self, students: &[Student]) -> StorageResult<StudentAdd> {
        for student in students {
            let added = self.add_student(student)?;
            if added.is_err() {
                return Ok(added);
            }
        }
        Ok(StudentAdd(Ok(())))
    }

    /// Increments the count of each of the given students by one.
    ///
    /// # Behavior
    ///
    /// - Either all counts are incremented or, on error, none of them.
    /// - Students that are not named are not touched.
    fn incr_counts(&mut self, names: &BTreeSet<String>) -> StorageResult<()>;

    /// Sets the count of a student.
    ///
    /// # Behavior
    ///
    /// - If the student exists, override the count and return `StorageResult::Ok(true)`.
    /// - If the student does not exist, do nothing and return `StorageResult::Ok(false)`.
    fn set_count(&mut self, name: &str, count: u64) -> StorageResult<bool>;

    /// Sets the count of every student and returns the number of students updated.
    fn set_all_counts(&mut self, count: u64) -> StorageResult<u64>;

    /// Checks if the [`RosterStorage`] is ready to process requests.
    ///
    /// # Behavior
    ///
    /// If the [`RosterStorage`] is ready to process requests, return `StorageResult::Ok(())`.
    /// If the [`RosterStorage`] cannot process requests because of a connection error,
    /// for example, return `StorageResult::Err(error)`.
    fn is_ready(&mut self) -> StorageResult<()>;
}

/// A wrapper that contains the result of the "add student" operation.
#[derive(Debug, Deref)]
pub struct StudentAdd(pub(crate) Result<(), StudentAddError>);

impl StudentAdd {
    /// Unwraps this wrapper, returning the underlying result.
    pub fn into_inner(self) -> Result<(), StudentAddError> {
        self.0
    }
}

/// Error that can occur when adding a student to the roster.
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum StudentAddError {
    /// student `{0}` already exists
    AlreadyExists(String),
}
