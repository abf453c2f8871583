//! Shared utilities for the Chanoma workspace.

pub mod logger;
