use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// SRID applied to every stored geometry (WGS-84 longitude/latitude).
pub const WGS84_SRID: i32 = 4326;

pub type Position = Vec<f64>;

/// Typed GeoJSON geometry. Deserialization rejects unknown `type` tags and
/// coordinate payloads of the wrong shape; `validate` covers the structural
/// rules serde cannot express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("not a GeoJSON geometry object: {0}")]
    Shape(String),

    #[error("position has {0} ordinates; expected longitude, latitude and optional altitude")]
    PositionArity(usize),

    #[error("line string has {0} positions; at least 2 required")]
    ShortLineString(usize),

    #[error("polygon ring has {0} positions; at least 4 required")]
    ShortRing(usize),

    #[error("failed to encode canonical GeoJSON: {0}")]
    Encode(String),
}

impl Geometry {
    /// Parses and validates a raw JSON value as a GeoJSON geometry.
    pub fn parse(value: &Value) -> Result<Self, GeometryError> {
        let geometry: Geometry = serde_json::from_value(value.clone())
            .map_err(|source| GeometryError::Shape(source.to_string()))?;
        geometry.validate()?;
        Ok(geometry)
    }

    /// Canonical GeoJSON text, suitable for `ST_GeomFromGeoJSON`.
    pub fn to_geojson(&self) -> Result<String, GeometryError> {
        serde_json::to_string(self).map_err(|source| GeometryError::Encode(source.to_string()))
    }

    fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Point { coordinates } => check_position(coordinates),
            Self::MultiPoint { coordinates } => coordinates.iter().try_for_each(check_position),
            Self::LineString { coordinates } => check_line(coordinates),
            Self::MultiLineString { coordinates } => {
                coordinates.iter().try_for_each(|line| check_line(line))
            }
            Self::Polygon { coordinates } => coordinates.iter().try_for_each(|ring| check_ring(ring)),
            Self::MultiPolygon { coordinates } => coordinates
                .iter()
                .try_for_each(|rings| rings.iter().try_for_each(|ring| check_ring(ring))),
            Self::GeometryCollection { geometries } => {
                geometries.iter().try_for_each(Self::validate)
            }
        }
    }
}

fn check_position(position: &Position) -> Result<(), GeometryError> {
    match position.len() {
        2 | 3 => Ok(()),
        other => Err(GeometryError::PositionArity(other)),
    }
}

fn check_line(line: &[Position]) -> Result<(), GeometryError> {
    if line.len() < 2 {
        return Err(GeometryError::ShortLineString(line.len()));
    }
    line.iter().try_for_each(check_position)
}

fn check_ring(ring: &[Position]) -> Result<(), GeometryError> {
    if ring.len() < 4 {
        return Err(GeometryError::ShortRing(ring.len()));
    }
    ring.iter().try_for_each(check_position)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_a_point() {
        let geometry = Geometry::parse(&json!({"type": "Point", "coordinates": [10.0, 20.0]}))
            .expect("point should parse");
        assert_eq!(
            geometry,
            Geometry::Point {
                coordinates: vec![10.0, 20.0]
            }
        );
    }

    #[test]
    fn parses_a_polygon_with_closed_ring() {
        let geometry = Geometry::parse(&json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }));
        assert!(geometry.is_ok());
    }

    #[test]
    fn rejects_non_array_coordinates() {
        let err = Geometry::parse(&json!({"type": "Polygon", "coordinates": "not-an-array"}))
            .expect_err("malformed coordinates must fail");
        assert!(matches!(err, GeometryError::Shape(_)));
    }

    #[test]
    fn rejects_unknown_geometry_type() {
        let err = Geometry::parse(&json!({"type": "Circle", "coordinates": [0.0, 0.0]}))
            .expect_err("unknown type must fail");
        assert!(matches!(err, GeometryError::Shape(_)));
    }

    #[test]
    fn rejects_missing_type_tag() {
        let err = Geometry::parse(&json!({"coordinates": [0.0, 0.0]}))
            .expect_err("untyped object must fail");
        assert!(matches!(err, GeometryError::Shape(_)));
    }

    #[test]
    fn rejects_single_ordinate_position() {
        let err = Geometry::parse(&json!({"type": "Point", "coordinates": [10.0]}))
            .expect_err("one ordinate is not a position");
        assert_eq!(err, GeometryError::PositionArity(1));
    }

    #[test]
    fn accepts_altitude_ordinate() {
        let geometry = Geometry::parse(&json!({"type": "Point", "coordinates": [10.0, 20.0, 5.0]}));
        assert!(geometry.is_ok());
    }

    #[test]
    fn rejects_short_polygon_ring() {
        let err = Geometry::parse(&json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        }))
        .expect_err("three-position ring must fail");
        assert_eq!(err, GeometryError::ShortRing(3));
    }

    #[test]
    fn rejects_one_position_line_string() {
        let err = Geometry::parse(&json!({"type": "LineString", "coordinates": [[0.0, 0.0]]}))
            .expect_err("degenerate line must fail");
        assert_eq!(err, GeometryError::ShortLineString(1));
    }

    #[test]
    fn validates_nested_collection_members() {
        let err = Geometry::parse(&json!({
            "type": "GeometryCollection",
            "geometries": [{"type": "Point", "coordinates": [10.0]}]
        }))
        .expect_err("invalid member must fail the collection");
        assert_eq!(err, GeometryError::PositionArity(1));
    }

    #[test]
    fn geojson_text_round_trips_coordinates() {
        let source = json!({"type": "Point", "coordinates": [10.0, 20.0]});
        let geometry = Geometry::parse(&source).expect("point should parse");
        let text = geometry.to_geojson().expect("encoding is infallible here");
        let reparsed: serde_json::Value =
            serde_json::from_str(&text).expect("canonical text is valid JSON");
        assert_eq!(reparsed, source);
    }
}
