//! # Rollcall: random picks from a roster, biased by history
//!
//! Rollcall keeps a roster of students. Every student carries a counter of how many times they
//! have been picked. A selection round draws a sample of distinct students, ranks them with a
//! random score weighted by their counter and increments the counter of everybody who got picked.
//!
//! The crate is split along the same seams as the command line tool:
//! - [`selector`]: the sampling policy. It is pure and takes an injectable source of uniform
//!   draws, so rounds can be replayed deterministically.
//! - [`storage`]: the roster store abstraction together with a Redis and an in-memory backend.
//! - [`service`]: the coordination of a round (snapshot, select, increment) and the reset,
//!   import and export operations on top of a store.
//! - [`transfer`] and [`report`]: the tabular file format and the rendered selection report.
//! - [`settings`]: loading and validation of the configuration.

#[macro_use]
extern crate serde;

#[macro_use]
extern crate tracing;

pub mod error;
pub mod report;
pub mod selector;
pub mod service;
pub mod settings;
pub mod storage;
pub mod student;
pub mod transfer;

pub use self::{
    error::RollcallError,
    selector::{Draw, RngDraw, Selector},
    service::Roster,
    student::Student,
};
