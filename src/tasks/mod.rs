//! Background Tasks Module
//!
//! Contains background tasks that run periodically during proxy operation.
//!
//! # Tasks
//! - TTL Sweep: Evicts expired responses at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
