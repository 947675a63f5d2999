//! Tethys: a sediment CDOM index processor for the northern Gulf
//!
//! Fetches MODIS L1B granules and NEO sea surface temperature imagery,
//! grids them onto a common area, computes a CDOM-based sediment index
//! and renders georeferenced plots.

pub mod area;
pub mod cdom;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod plot;
pub mod proj;
pub mod raster;
pub mod readers;
pub mod resample;
pub mod scene;

// Re-export the main entry points for easier access
pub use config::Config;
pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use raster::Raster;
