/// Point-in-polygon matching for warning areas.
///
/// Containment uses the even-odd (ray casting) rule with a ray cast from
/// the point towards increasing longitude. An edge is counted when exactly
/// one of its endpoints has latitude `>=` the point's, so a ray passing
/// through a vertex is counted once, not twice.
///
/// Matching fails towards exclusion: empty, degenerate or non-finite
/// geometry never contains anything. A missed boundary case costs less
/// than a false alarm sent to every subscriber of a tenant.

use serde_json::Value;

use crate::error::GeometryError;
use crate::model::GeoFeature;

// ---------------------------------------------------------------------------
// Geometry types
// ---------------------------------------------------------------------------

/// WGS84 position, longitude first as in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Closed sequence of positions. The closing position may or may not be
/// repeated.
pub type Ring = Vec<Position>;

/// Exterior ring followed by zero or more hole rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Area {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Area {
    /// Converts a feed feature into a typed area.
    ///
    /// # Errors
    /// - `MissingGeometry`: the feature carries no `geometry` object.
    /// - `MissingType`: the geometry has no `type` member.
    /// - `UnsupportedType`: anything other than `Polygon`/`MultiPolygon`.
    /// - `MalformedCoordinates`: coordinate nesting or values are wrong.
    /// - `NonFinite`: a coordinate is NaN or infinite.
    pub fn from_feature(feature: &GeoFeature) -> Result<Self, GeometryError> {
        let geometry = feature
            .geometry
            .as_ref()
            .filter(|g| !g.is_null())
            .ok_or(GeometryError::MissingGeometry)?;

        let kind = match geometry.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(GeometryError::UnsupportedType(other.to_string())),
            None => return Err(GeometryError::MissingType),
        };
        if kind != "Polygon" && kind != "MultiPolygon" {
            return Err(GeometryError::UnsupportedType(kind.to_string()));
        }
        let coordinates = geometry.get("coordinates").ok_or_else(|| {
            GeometryError::MalformedCoordinates("geometry has no coordinates".to_string())
        })?;

        if kind == "Polygon" {
            return Ok(Area::Polygon(parse_polygon(coordinates)?));
        }
        let members = as_array(coordinates, "multipolygon")?
            .iter()
            .map(parse_polygon)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Area::MultiPolygon(members))
    }
}

// ---------------------------------------------------------------------------
// GeoJSON coordinate parsing
// ---------------------------------------------------------------------------

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, GeometryError> {
    value
        .as_array()
        .ok_or_else(|| GeometryError::MalformedCoordinates(format!("{} is not an array", what)))
}

fn parse_polygon(value: &Value) -> Result<Polygon, GeometryError> {
    let rings = as_array(value, "polygon")?
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(rings))
}

fn parse_ring(value: &Value) -> Result<Ring, GeometryError> {
    as_array(value, "ring")?.iter().map(parse_position).collect()
}

fn parse_position(value: &Value) -> Result<Position, GeometryError> {
    let pair = as_array(value, "position")?;
    if pair.len() < 2 {
        return Err(GeometryError::MalformedCoordinates(format!(
            "position has {} values, expected at least 2",
            pair.len()
        )));
    }

    let number = |v: &Value| {
        v.as_f64().ok_or_else(|| {
            GeometryError::MalformedCoordinates(format!("coordinate {} is not a number", v))
        })
    };
    let position = Position::new(number(&pair[0])?, number(&pair[1])?);

    if !position.is_finite() {
        return Err(GeometryError::NonFinite {
            lon: position.lon,
            lat: position.lat,
        });
    }
    Ok(position)
}

// ---------------------------------------------------------------------------
// Containment
// ---------------------------------------------------------------------------

/// Returns true if `point` lies inside `area`.
///
/// A polygon contains the point when its exterior ring does and none of
/// its holes do; a multipolygon when any member polygon does.
pub fn contains(point: Position, area: &Area) -> bool {
    if !point.is_finite() {
        return false;
    }
    match area {
        Area::Polygon(polygon) => polygon_contains(polygon, point),
        Area::MultiPolygon(members) => members.iter().any(|p| polygon_contains(p, point)),
    }
}

fn polygon_contains(polygon: &Polygon, point: Position) -> bool {
    let Some((exterior, holes)) = polygon.rings.split_first() else {
        return false;
    };
    ring_contains(exterior, point) && !holes.iter().any(|hole| ring_contains(hole, point))
}

fn ring_contains(ring: &[Position], point: Position) -> bool {
    let ring = match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if ring.len() < 3 || ring.iter().any(|p| !p.is_finite()) {
        return false;
    }

    let mut inside = false;
    let mut prev = ring[ring.len() - 1];
    for &curr in ring {
        if (curr.lat >= point.lat) != (prev.lat >= point.lat) {
            // Latitudes differ here, so the division is safe.
            let crossing_lon =
                curr.lon + (point.lat - curr.lat) * (prev.lon - curr.lon) / (prev.lat - curr.lat);
            if point.lon < crossing_lon {
                inside = !inside;
            }
        }
        prev = curr;
    }
    inside
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
