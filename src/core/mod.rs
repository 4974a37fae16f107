//! core
//!
//! Core domain types, configuration, and operation locking.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, ContentPath
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Exclusive operation lock
//! - [`paths`] - Centralized path routing for the working directory
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Configuration is immutable once loaded

pub mod config;
pub mod ops;
pub mod paths;
pub mod types;
