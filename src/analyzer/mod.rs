//! # Analyzer Module
//!
//! Cluster analysis for lhmon. Only Longhorn storage is covered today.

pub mod storage;

pub use storage::{InspectConfig, StorageFilters, StorageInspector, StorageReport};
