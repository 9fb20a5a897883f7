//! Output areas: the smallest census geography, with their boundaries.

use std::fmt;

use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{MultiPolygon, Relate};
use serde::Serialize;

/// Output area identifier (`OA21CD`, e.g. `E00000001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OutputAreaCode(String);

/// Error raised when an output area code is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("output area code must not be empty")]
pub struct EmptyOutputAreaCode;

impl OutputAreaCode {
    /// Build a code from its trimmed textual form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyOutputAreaCode> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmptyOutputAreaCode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OutputAreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OutputAreaCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Errors raised while decoding a boundary from GeoJSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    /// The GeoJSON could not be parsed or converted.
    #[error("invalid boundary geometry: {message}")]
    Invalid {
        /// Decoder message.
        message: String,
    },
    /// The geometry is not areal.
    #[error("boundary must be a Polygon or MultiPolygon, found {kind}")]
    NotAreal {
        /// Geometry type that was found.
        kind: String,
    },
}

/// Polygonal boundary of an output area.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary(MultiPolygon<f64>);

impl Boundary {
    /// Wrap a multipolygon.
    pub fn new(shape: MultiPolygon<f64>) -> Self {
        Self(shape)
    }

    /// Borrow the underlying multipolygon.
    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.0
    }

    /// True when both boundaries share at least one boundary point and their
    /// interiors do not intersect.
    pub fn touches(&self, other: &Boundary) -> bool {
        let matrix = self.0.relate(&other.0);
        matrix.is_intersects() && matrix.get(CoordPos::Inside, CoordPos::Inside) == Dimensions::Empty
    }

    /// Decode a GeoJSON geometry.
    pub fn from_geojson(geometry: geojson::Geometry) -> Result<Self, BoundaryError> {
        let decoded = geo::Geometry::<f64>::try_from(geometry.value).map_err(|err| {
            BoundaryError::Invalid {
                message: err.to_string(),
            }
        })?;
        match decoded {
            geo::Geometry::Polygon(polygon) => Ok(Self(MultiPolygon::new(vec![polygon]))),
            geo::Geometry::MultiPolygon(shape) => Ok(Self(shape)),
            other => Err(BoundaryError::NotAreal {
                kind: geometry_kind(&other).to_owned(),
            }),
        }
    }

    /// Decode a GeoJSON geometry from its JSON text.
    pub fn from_geojson_str(text: &str) -> Result<Self, BoundaryError> {
        let geometry = text
            .parse::<geojson::Geometry>()
            .map_err(|err| BoundaryError::Invalid {
                message: err.to_string(),
            })?;
        Self::from_geojson(geometry)
    }

    /// Encode as a GeoJSON geometry.
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.0))
    }
}

fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// An output area with its parent LSOA and boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArea {
    /// Unique output area code.
    pub code: OutputAreaCode,
    /// Parent LSOA code (`LSOA21CD`).
    pub parent_area_code: String,
    /// Parent LSOA name (`LSOA21NM`).
    pub parent_area_name: String,
    /// Polygonal boundary.
    pub boundary: Boundary,
}
