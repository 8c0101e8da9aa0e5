//! Core types and definitions for sightline.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geographic points, rays, blocked segments, sweep configuration,
//! geodesy and the curvature model. It has no dependency on any
//! terrain source or runtime.

pub mod config;
pub mod constants;
pub mod curvature;
pub mod geodesy;
pub mod geojson;
pub mod types;
