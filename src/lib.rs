//! Cloud-free Sentinel-2 composites, described as remote computation graphs.
//!
//! Nothing here reads pixels. Each call builds an [Expr] graph; a
//! [ComputeService] evaluates it when a value or a map is requested.

pub mod components;
pub mod display;
pub mod encode;
mod errors;
pub mod expr;
pub mod params;
pub mod pipeline;
pub mod sensors;
pub mod service;

pub use components::{Geometry, Image, ImageCollection, Number};
pub use display::{LayerSource, MapDisplay};
pub use encode::Encoded;
pub use errors::{CloudFreeError, Result};
pub use expr::Expr;
pub use params::{CloudFreeParams, CloudScoreParams, ShadowMode, ShadowParams};
pub use pipeline::{export_cloud_free, sentinel2_collection};
pub use service::{ComputeService, MapId, VisParams};
