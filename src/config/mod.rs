//! Configuration module.
//!
//! This module provides the pipeline configuration and the site list files
//! that drive per-site ordering and popularity tiers.

pub mod loader;
pub mod sites;

pub use loader::{ConfigLoader, PipelineConfig};
pub use sites::SiteList;
