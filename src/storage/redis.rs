//! A Redis compatible [`RosterStorage`].
//!
//! # Redis Data Model
//!
//!```text
//! {
//!     // Roster, the key is configurable and defaults to "students"
//!     "students": { // hash
//!         "name_1": count_1,
//!         "name_2": count_2
//!     }
//! }
//! ```
//!
//! A hash needs no schema, so there is nothing to create on startup. Every operation is a single
//! command, an atomic pipeline or a script, which serializes concurrent writers on the Redis
//! side.

use std::collections::BTreeSet;

pub use redis::RedisError;
use redis::{Commands, Connection, IntoConnectionInfo, Script};

use crate::{
    storage::{RosterStorage, StorageError, StorageResult, StudentAdd, StudentAddError},
    student::Student,
};

/// Overrides the count of a student, but only if the student exists.
///
/// Returns `1` if the count was set, `0` otherwise.
const SET_COUNT_SCRIPT: &str = r#"
    if redis.call("HEXISTS", KEYS[1], ARGV[1]) == 1 then
        redis.call("HSET", KEYS[1], ARGV[1], ARGV[2])
        return 1
    end
    return 0
"#;

/// Overrides the count of every student.
///
/// Returns the number of students updated.
const SET_ALL_COUNTS_SCRIPT: &str = r#"
    local names = redis.call("HKEYS", KEYS[1])
    for _, name in ipairs(names) do
        redis.call("HSET", KEYS[1], name, ARGV[1])
    end
    return #names
"#;

pub struct Client {
    connection: Connection,
    key: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redis client")
            .field("key", &self.key)
            .finish()
    }
}

fn to_storage_err(e: RedisError) -> StorageError {
    anyhow::anyhow!(e)
}

impl Client {
    /// Creates a new Redis client.
    ///
    /// `url` to which Redis instance the client should connect to.
    /// The URL format is `redis://[<username>][:<passwd>@]<hostname>[:port][/<db>]`.
    ///
    /// `key` is the name of the hash that holds the roster.
    pub fn new<T: IntoConnectionInfo>(url: T, key: impl Into<String>) -> Result<Self, RedisError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection()?;
        Ok(Self {
            connection,
            key: key.into(),
        })
    }

    /// Deletes the roster.
    #[cfg(test)]
    pub(crate) fn delete_roster(&mut self) -> StorageResult<()> {
        debug!("delete roster {}", self.key);
        // https://redis.io/commands/del
        // > Return value:
        //   The number of keys that were removed.
        // We ignore the return value because we are not interested in it.
        self.connection
            .del::<_, u64>(&self.key)
            .map(|_| ())
            .map_err(to_storage_err)
    }
}

impl RosterStorage for Client {
    /// See [`RosterStorage::students`].
    fn students(&mut self) -> StorageResult<Vec<Student>> {
        debug!("get roster {}", self.key);
        // https://redis.io/commands/hgetall
        // > Return value
        //   Array reply: list of fields and their values stored in the hash, or an empty
        //   list when key does not exist.
        let reply: Vec<(String, u64)> = self
            .connection
            .hgetall(&self.key)
            .map_err(to_storage_err)?;
        Ok(reply.into_iter().map(Student::from).collect())
    }

    /// See [`RosterStorage::add_student`].
    fn add_student(&mut self, student: &Student) -> StorageResult<StudentAdd> {
        debug!("add student {} with count {}", student.name, student.count);
        // https://redis.io/commands/hsetnx
        // > If field already exists, this operation has no effect.
        // > Return value
        //   Integer reply, specifically:
        //   1 if field is a new field in the hash and value was set.
        //   0 if field already exists in the hash and no operation was performed.
        let added: bool = self
            .connection
            .hset_nx(&self.key, &student.name, student.count)
            .map_err(to_storage_err)?;

        if added {
            Ok(StudentAdd(Ok(())))
        } else {
            Ok(StudentAdd(Err(StudentAddError::AlreadyExists(
                student.name.clone(),
            ))))
        }
    }

    /// See [`RosterStorage::incr_counts`].
    fn incr_counts(&mut self, names: &BTreeSet<String>) -> StorageResult<()> {
        debug!("increment the counts of {} students", names.len());
        // https://redis.io/commands/hincrby
        // The commands are wrapped in MULTI/EXEC, so either all counts are incremented or none.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for name in names {
            pipe.hincr(&self.key, name, 1).ignore();
        }
        pipe.query(&mut self.connection).map_err(to_storage_err)
    }

    /// See [`RosterStorage::set_count`].
    fn set_count(&mut self, name: &str, count: u64) -> StorageResult<bool> {
        debug!("set count of {} to {}", name, count);
        Script::new(SET_COUNT_SCRIPT)
            .key(&self.key)
            .arg(name)
            .arg(count)
            .invoke(&mut self.connection)
            .map_err(to_storage_err)
    }

    /// See [`RosterStorage::set_all_counts`].
    fn set_all_counts(&mut self, count: u64) -> StorageResult<u64> {
        debug!("set all counts to {}", count);
        Script::new(SET_ALL_COUNTS_SCRIPT)
            .key(&self.key)
            .arg(count)
            .invoke(&mut self.connection)
            .map_err(to_storage_err)
    }

    /// See [`RosterStorage::is_ready`].
    fn is_ready(&mut self) -> StorageResult<()> {
        redis::cmd("PING")
            .query(&mut self.connection)
            .map_err(to_storage_err)
    }
}
