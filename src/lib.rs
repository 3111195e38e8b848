//! Benchmarks an exclusive lock against a reader-preferring lock guarding a shared record
//! store, timing fixed populations of reader and writer threads under each.

pub mod condvar;
pub mod dataset;
pub mod experiment;
pub mod mutex;
pub mod policy;
pub mod store;
pub mod sweep;
pub mod task;
pub mod wait_group;

pub use dataset::{Dataset, LoadError};
pub use experiment::{Experiment, ExperimentConfig};
pub use policy::{AccessPolicy, Discipline, ExclusiveAccess, GateStats, ReaderPreferring};
pub use store::{Records, SharedStore};
pub use sweep::{Sweep, SweepConfig, SweepRow};
