//! Raster to vector conversion module
//!
//! This module contains the configuration builder, the engine capability
//! interface with its `visioncortex` backed variants, and statistics.

pub mod binary;
pub mod color;
pub mod config;
pub mod engine;
pub mod scripted;
pub mod stats;

pub use config::{
    build_config, deg2rad, ClusteringMode, ControlValues, ConversionConfig, Hierarchy, PathMode,
    Preset, SurfaceIds,
};

pub use engine::{ClusteringEngine, Engine, EngineFactory, VisionCortexFactory, PROGRESS_MAX};
pub use stats::{SessionOutcome, SessionStatistics};

pub use crate::error::ConversionResult;
