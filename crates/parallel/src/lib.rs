//! # cavescan parallel
//!
//! Execution strategy for row-parallel terrain passes.
//!
//! This crate provides:
//! - `RowScheduler`: a fixed-size worker pool running one task per grid row, with a join barrier
//! - `ProcessingMode`: sequential, default (2x hardware threads) or explicit worker counts
//! - `CancelToken`: cooperative cancellation checked between row dispatches

pub mod cancel;
pub mod scheduler;
pub mod strategy;

pub use cancel::CancelToken;
pub use scheduler::RowScheduler;
pub use strategy::{hardware_parallelism, ProcessingMode};
