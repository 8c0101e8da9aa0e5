//! GeoJSON rendering of blocked segments.
//!
//! Each segment becomes a two-vertex `LineString` in `[lon, lat]` order.

use serde::{Deserialize, Serialize};

use crate::types::{Segment, VisibilitySet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    /// Bearing of the originating ray (degrees).
    pub bearing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl From<&Segment> for Feature {
    fn from(segment: &Segment) -> Self {
        Self {
            properties: FeatureProperties {
                bearing: segment.bearing,
            },
            geometry: Geometry::LineString {
                coordinates: vec![segment.start.lon_lat(), segment.end.lon_lat()],
            },
        }
    }
}

impl VisibilitySet {
    /// Line features for every blocked segment, in sweep order.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            features: self.segments().iter().map(Feature::from).collect(),
        }
    }
}
