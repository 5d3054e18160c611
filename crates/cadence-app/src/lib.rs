//! The `cadence` command line: expands, diffs, imports and exports recurring
//! series documents.

pub mod cli;
pub mod error;
