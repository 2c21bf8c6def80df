//! Background scheduling for flux agents.
//!
//! This crate provides:
//!
//! - **Interval tasks**: a job run on a fixed period until its handle stops it

pub mod error;
pub mod interval;

pub use error::SchedulerError;
pub use interval::{IntervalJob, IntervalTask, TaskHandle};
