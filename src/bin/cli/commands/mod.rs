//! CLI command modules
//!
//! - split: region boundary computation
//! - bench: write throughput benchmark
//! - table: table lifecycle against the store

pub mod bench;
pub mod split;
pub mod table;
