//! # refscan
//!
//! Inventories which externally defined class members (fields and methods)
//! are referenced by a corpus of compiled JAR artifacts, and reports how
//! often each member is used.
//!
//! ## Architecture
//!
//! - **symbol**: identity of one referenced class member
//! - **extract**: recursive unpacking of nested archives into class buffers
//! - **classfile**: constant pool decoding and member-reference extraction
//! - **tally**: mergeable symbol occurrence counts
//! - **scan**: parallel per-artifact scanning and tally accumulation
//! - **report**: owner filtering, deterministic sorting, report emission
//! - **cli** / **config**: command-line surface and validated configuration

pub mod classfile;
pub mod cli;
pub mod config;
pub mod extract;
pub mod report;
pub mod scan;
pub mod symbol;
pub mod tally;
