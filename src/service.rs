//! Coordination of the roster commands.
//!
//! A [`Roster`] owns the store and the selector it works with. Every command runs to
//! completion before it returns, and every store error aborts the command immediately.

use std::{collections::BTreeSet, path::Path};

use crate::{
    error::RollcallError,
    selector::{Draw, Selector},
    storage::{RosterStorage, StudentAddError},
    student::Student,
    transfer,
};

/// The roster commands on top of a store.
#[derive(Debug)]
pub struct Roster<S, D> {
    store: S,
    selector: Selector<D>,
}

impl<S, D> Roster<S, D>
where
    S: RosterStorage,
    D: Draw,
{
    /// Creates a new [`Roster`].
    pub fn new(store: S, selector: Selector<D>) -> Self {
        Self { store, selector }
    }

    /// Returns a mutable reference to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Runs a selection round.
    ///
    /// Reads a snapshot of the roster, picks up to `sample` students and increments the count of
    /// every picked student by one. The picks are returned in selection order and carry their
    /// incremented counts. Nothing is written if nobody is picked.
    pub fn select(&mut self, sample: usize) -> Result<Vec<Student>, RollcallError> {
        let roster = self.store.students()?;
        let picks = self.selector.select(&roster, sample);
        if picks.is_empty() {
            debug!("nobody selected from {} students", roster.len());
            return Ok(picks);
        }

        let names = picks
            .iter()
            .map(|student| student.name.clone())
            .collect::<BTreeSet<_>>();
        self.store.incr_counts(&names)?;
        info!("selected {} of {} students", picks.len(), roster.len());

        Ok(picks
            .into_iter()
            .map(|student| Student {
                count: student.count.saturating_add(1),
                ..student
            })
            .collect())
    }

    /// Sets the count of the student `name`.
    ///
    /// An unknown name is not an error, the roster just stays as it is.
    pub fn reset(&mut self, name: &str, count: u64) -> Result<(), RollcallError> {
        if self.store.set_count(name, count)? {
            info!("reset count of {} to {}", name, count);
        } else {
            debug!("no student named {}, nothing to reset", name);
        }
        Ok(())
    }

    /// Sets the count of every student.
    pub fn reset_all(&mut self, count: u64) -> Result<(), RollcallError> {
        let updated = self.store.set_all_counts(count)?;
        info!("reset count of {} students to {}", updated, count);
        Ok(())
    }

    /// Adds the given students to the roster and returns how many were added.
    ///
    /// # Errors
    /// Fails with [`RollcallError::ImportConflict`] at the first student whose name is already
    /// taken. The students before it stay in the roster.
    pub fn insert(&mut self, students: &[Student]) -> Result<usize, RollcallError> {
        match self.store.bulk_insert(students)?.into_inner() {
            Ok(()) => {
                info!("imported {} students", students.len());
                Ok(students.len())
            }
            Err(StudentAddError::AlreadyExists(name)) => {
                warn!("import aborted at {}", name);
                Err(RollcallError::ImportConflict { name })
            }
        }
    }

    /// Imports the students of the file at `path`, see [`transfer::read_students`] for the
    /// format.
    pub fn import(
        &mut self,
        path: impl AsRef<Path>,
        skip_first: bool,
    ) -> Result<usize, RollcallError> {
        let students = transfer::import_file(path, skip_first)?;
        self.insert(&students)
    }

    /// Exports the roster to the file at `path` and returns the number of students written.
    pub fn export(&mut self, path: impl AsRef<Path>) -> Result<usize, RollcallError> {
        let students = self.store.students()?;
        transfer::export_file(path, &students)?;
        info!("exported {} students", students.len());
        Ok(students.len())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::{memory::InMemory, StorageResult, StudentAdd};

    fn roster_with<D: Draw>(entries: &[(&str, u64)], draw: D) -> Roster<InMemory, D> {
        let mut roster = Roster::new(InMemory::new(), Selector::new(draw));
        let students = entries
            .iter()
            .map(|&(name, count)| Student::new(name, count))
            .collect::<Vec<_>>();
        roster.insert(&students).unwrap();
        roster
    }

    fn counts<S: RosterStorage, D: Draw>(roster: &mut Roster<S, D>) -> Vec<(String, u64)> {
        let mut counts = roster
            .store_mut()
            .students()
            .unwrap()
            .into_iter()
            .map(|s| (s.name, s.count))
            .collect::<Vec<_>>();
        counts.sort();
        counts
    }

    /// A store that records the writes it receives and can be told to fail.
    #[derive(Default)]
    struct Recording {
        inner: InMemory,
        incr_calls: Vec<BTreeSet<String>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl RosterStorage for Recording {
        fn students(&mut self) -> StorageResult<Vec<Student>> {
            if self.fail_reads {
                return Err(anyhow::anyhow!("connection refused"));
            }
            self.inner.students()
        }

        fn add_student(&mut self, student: &Student) -> StorageResult<StudentAdd> {
            if self.fail_writes {
                return Err(anyhow::anyhow!("broken pipe"));
            }
            self.inner.add_student(student)
        }

        fn incr_counts(&mut self, names: &BTreeSet<String>) -> StorageResult<()> {
            if self.fail_writes {
                return Err(anyhow::anyhow!("broken pipe"));
            }
            self.incr_calls.push(names.clone());
            self.inner.incr_counts(names)
        }

        fn set_count(&mut self, name: &str, count: u64) -> StorageResult<bool> {
            self.inner.set_count(name, count)
        }

        fn set_all_counts(&mut self, count: u64) -> StorageResult<u64> {
            self.inner.set_all_counts(count)
        }

        fn is_ready(&mut self) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_select_increments_picked_students() {
        let draws = vec![0.9, 0.1, 0.5];
        let mut draws = draws.into_iter();
        let mut roster = roster_with(&[("A", 0), ("B", 0), ("C", 5)], move || {
            draws.next().unwrap()
        });

        let picks = roster.select(2).unwrap();

        assert_eq!(picks, vec![Student::new("C", 6), Student::new("A", 1)]);
        assert_eq!(
            counts(&mut roster),
            vec![("A".into(), 1), ("B".into(), 0), ("C".into(), 6)]
        );
    }

    #[test]
    fn test_select_increments_exactly_once() {
        let mut roster = Roster::new(Recording::default(), Selector::from_seed(Some(3)));
        let students = (0..30)
            .map(|i| Student::new(format!("student-{}", i), i % 4))
            .collect::<Vec<_>>();
        roster.insert(&students).unwrap();

        for sample in &[1, 5, 30, 100] {
            let before = counts(&mut roster);
            let picks = roster.select(*sample).unwrap();
            let after = counts(&mut roster);

            let picked = picks.iter().map(|s| s.name.clone()).collect::<HashSet<_>>();
            assert_eq!(picked.len(), picks.len());
            for ((name, old), (_, new)) in before.iter().zip(after.iter()) {
                let expected = if picked.contains(name) { old + 1 } else { *old };
                assert_eq!(*new, expected, "count of {}", name);
            }
        }

        let calls = &roster.store_mut().incr_calls;
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls.iter().map(|names| names.len()).collect::<Vec<_>>(),
            vec![1, 5, 30, 30]
        );
    }

    #[test]
    fn test_select_empty_roster_writes_nothing() {
        let mut roster = Roster::new(Recording::default(), Selector::from_seed(Some(1)));

        assert!(roster.select(5).unwrap().is_empty());
        assert!(roster.store_mut().incr_calls.is_empty());
    }

    #[test]
    fn test_select_zero_writes_nothing() {
        let mut roster = Roster::new(Recording::default(), Selector::from_seed(Some(1)));
        roster.insert(&[Student::new("A", 1)]).unwrap();

        assert!(roster.select(0).unwrap().is_empty());
        assert!(roster.store_mut().incr_calls.is_empty());
    }

    #[test]
    fn test_select_propagates_store_errors() {
        let mut roster = Roster::new(Recording::default(), Selector::from_seed(Some(1)));
        roster.insert(&[Student::new("A", 1)]).unwrap();

        roster.store_mut().fail_writes = true;
        assert!(matches!(
            roster.select(1),
            Err(RollcallError::StoreUnavailable(_))
        ));

        roster.store_mut().fail_reads = true;
        assert!(matches!(
            roster.select(1),
            Err(RollcallError::StoreUnavailable(_))
        ));
        assert!(roster.store_mut().incr_calls.is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut roster = roster_with(&[("A", 3), ("B", 7)], || 0.5);

        roster.reset("A", 2).unwrap();
        roster.reset("A", 2).unwrap();

        assert_eq!(counts(&mut roster), vec![("A".into(), 2), ("B".into(), 7)]);
    }

    #[test]
    fn test_reset_unknown_name_is_noop() {
        let mut roster = roster_with(&[("A", 3)], || 0.5);

        roster.reset("Z", 0).unwrap();

        assert_eq!(counts(&mut roster), vec![("A".into(), 3)]);
    }

    #[test]
    fn test_reset_all() {
        let mut roster = roster_with(&[("A", 3), ("B", 7)], || 0.5);

        roster.reset_all(0).unwrap();

        assert_eq!(counts(&mut roster), vec![("A".into(), 0), ("B".into(), 0)]);
    }

    #[test]
    fn test_insert_conflict() {
        let mut roster = roster_with(&[("B", 1)], || 0.5);

        let err = roster
            .insert(&[Student::new("A", 0), Student::new("B", 2), Student::new("C", 0)])
            .unwrap_err();

        assert!(matches!(err, RollcallError::ImportConflict { ref name } if name == "B"));
        assert_eq!(counts(&mut roster), vec![("A".into(), 0), ("B".into(), 1)]);
    }

    #[test]
    fn test_insert_propagates_store_errors() {
        let mut roster = Roster::new(Recording::default(), Selector::from_seed(None));
        roster.store_mut().fail_writes = true;

        assert!(matches!(
            roster.insert(&[Student::new("A", 0)]),
            Err(RollcallError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        let mut source = roster_with(&[("carol", 2), ("alice", 0), ("bob", 9)], || 0.5);

        assert_eq!(source.export(&path).unwrap(), 3);

        let mut target = roster_with(&[], || 0.5);
        assert_eq!(target.import(&path, true).unwrap(), 3);

        assert_eq!(counts(&mut source), counts(&mut target));
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut roster = roster_with(&[], || 0.5);

        assert!(matches!(
            roster.import(dir.path().join("missing.csv"), false),
            Err(RollcallError::FileAccess { .. })
        ));
    }
}
