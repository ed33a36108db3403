//! An in-memory [`RosterStorage`].
//!
//! The roster lives as long as the store and is iterated in insertion order.

use std::collections::BTreeSet;

use crate::{
    storage::{RosterStorage, StorageResult, StudentAdd, StudentAddError},
    student::Student,
};

#[derive(Debug, Clone, Default)]
pub struct InMemory {
    students: Vec<Student>,
}

impl InMemory {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.students.iter().position(|student| student.name == name)
    }
}

impl RosterStorage for InMemory {
    fn students(&mut self) -> StorageResult<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn add_student(&mut self, student: &Student) -> StorageResult<StudentAdd> {
        if self.position(&student.name).is_some() {
            return Ok(StudentAdd(Err(StudentAddError::AlreadyExists(
                student.name.clone(),
            ))));
        }
        self.students.push(student.clone());
        Ok(StudentAdd(Ok(())))
    }

    fn incr_counts(&mut self, names: &BTreeSet<String>) -> StorageResult<()> {
        for student in self
            .students
            .iter_mut()
            .filter(|student| names.contains(&student.name))
        {
            student.count = student.count.saturating_add(1);
        }
        Ok(())
    }

    fn set_count(&mut self, name: &str, count: u64) -> StorageResult<bool> {
        match self.position(name) {
            Some(idx) => {
                self.students[idx].count = count;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_all_counts(&mut self, count: u64) -> StorageResult<u64> {
        for student in self.students.iter_mut() {
            student.count = count;
        }
        Ok(self.students.len() as u64)
    }

    fn is_ready(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
