//! Places of interest and coordinates
//!
//! A place of interest is a named spatial reference (point, path or area)
//! that conditions and strategy activities point at by name.

use serde::{Deserialize, Serialize};

/// Coordinate system of a [`Coordinate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateType {
    /// Geocentric (x, y, z)
    Gcc,
    /// Geodetic (latitude, longitude, elevation)
    Gdc,
    /// Above ground level (x, y, elevation)
    Agl,
}

impl CoordinateType {
    /// Upper-case label used in messages
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gcc => "GCC",
            Self::Gdc => "GDC",
            Self::Agl => "AGL",
        }
    }
}

/// A coordinate in one of the supported systems
///
/// Components are optional so that a partially authored coordinate can be
/// represented and reported instead of rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Coordinate {
    /// Geocentric coordinate
    Gcc {
        /// X component
        x: Option<f64>,
        /// Y component
        y: Option<f64>,
        /// Z component
        z: Option<f64>,
    },
    /// Geodetic coordinate
    Gdc {
        /// Latitude in degrees
        latitude: Option<f64>,
        /// Longitude in degrees
        longitude: Option<f64>,
        /// Elevation in meters
        elevation: Option<f64>,
    },
    /// Above-ground-level coordinate
    Agl {
        /// X component
        x: Option<f64>,
        /// Y component
        y: Option<f64>,
        /// Elevation above ground
        elevation: Option<f64>,
    },
}

impl Coordinate {
    /// Fully specified GCC coordinate
    #[inline]
    #[must_use]
    pub fn gcc(x: f64, y: f64, z: f64) -> Self {
        Self::Gcc {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Fully specified GDC coordinate
    #[inline]
    #[must_use]
    pub fn gdc(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self::Gdc {
            latitude: Some(latitude),
            longitude: Some(longitude),
            elevation: Some(elevation),
        }
    }

    /// Fully specified AGL coordinate
    #[inline]
    #[must_use]
    pub fn agl(x: f64, y: f64, elevation: f64) -> Self {
        Self::Agl {
            x: Some(x),
            y: Some(y),
            elevation: Some(elevation),
        }
    }

    /// Coordinate system of this coordinate
    #[inline]
    #[must_use]
    pub fn coordinate_type(&self) -> CoordinateType {
        match self {
            Self::Gcc { .. } => CoordinateType::Gcc,
            Self::Gdc { .. } => CoordinateType::Gdc,
            Self::Agl { .. } => CoordinateType::Agl,
        }
    }

    /// True when every component is present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Gcc { x, y, z } => x.is_some() && y.is_some() && z.is_some(),
            Self::Gdc {
                latitude,
                longitude,
                elevation,
            } => latitude.is_some() && longitude.is_some() && elevation.is_some(),
            Self::Agl { x, y, elevation } => x.is_some() && y.is_some() && elevation.is_some(),
        }
    }
}

/// One segment of a [`PlaceOfInterest::Path`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment name
    pub name: String,
    /// Width of the corridor in meters
    pub width: Option<f64>,
    /// Buffer width as a percentage of `width`
    #[serde(default)]
    pub buffer_width_percent: Option<f64>,
    /// Starting coordinate
    pub start: Option<Coordinate>,
    /// Ending coordinate
    pub end: Option<Coordinate>,
}

/// A named spatial reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlaceOfInterest {
    /// Single location
    Point {
        /// Unique name
        name: String,
        /// Location of the point
        coordinate: Option<Coordinate>,
    },
    /// Ordered sequence of segments
    Path {
        /// Unique name
        name: String,
        /// Path segments
        #[serde(default)]
        segments: Vec<Segment>,
    },
    /// Closed polygon
    Area {
        /// Unique name
        name: String,
        /// Polygon vertices
        #[serde(default)]
        coordinates: Vec<Coordinate>,
    },
}

impl PlaceOfInterest {
    /// Name of the place
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Point { name, .. } | Self::Path { name, .. } | Self::Area { name, .. } => name,
        }
    }

    /// Mutable name of the place
    #[inline]
    pub fn name_mut(&mut self) -> &mut String {
        match self {
            Self::Point { name, .. } | Self::Path { name, .. } | Self::Area { name, .. } => name,
        }
    }

    /// Whether this is a point
    #[inline]
    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point { .. })
    }

    /// Whether this is a path
    #[inline]
    #[must_use]
    pub fn is_path(&self) -> bool {
        matches!(self, Self::Path { .. })
    }

    /// Whether this is an area
    #[inline]
    #[must_use]
    pub fn is_area(&self) -> bool {
        matches!(self, Self::Area { .. })
    }
}

/// Reference to a point by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRef {
    /// Name of the referenced point
    pub value: String,
    /// Optional proximity distance
    #[serde(default)]
    pub distance: Option<f64>,
}

impl PointRef {
    /// Reference without a distance
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            distance: None,
        }
    }
}

/// Reference to an area by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRef {
    /// Name of the referenced area
    pub value: String,
}

/// Reference to a path by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRef {
    /// Name of the referenced path
    pub value: String,
}

/// Starting location of a learner or entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartLocation {
    /// Location
    pub coordinate: Option<Coordinate>,
}
