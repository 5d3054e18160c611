//! Shared configuration and error types for the cadence recurrence engine.

pub mod config;
pub mod error;
