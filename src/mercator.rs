//! Project the lat/lon coordinates into a 2D x/y using the Web Mercator.
//! <https://en.wikipedia.org/wiki/Web_Mercator_projection>
//! <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames>

use crate::position::{Pixels, Position};
use std::f64::consts::PI;

// zoom level   tile coverage  number of tiles  tile size(*) in degrees
// 0            1 tile         1 tile           360° x 170.1022°
// 1            2 × 2 tiles    4 tiles          180° x 85.0511°
// 2            4 × 4 tiles    16 tiles         90° x [variable]

/// Size of a single tile in pixels. Rambler uses 256px tiles as most of the tile sources do.
pub const TILE_SIZE: u32 = 256;

/// Equatorial radius of the Earth, in meters (WGS 84).
pub const EARTH_RADIUS: f64 = 6_378_137.;

/// Length of the equator, which is also the side length of the projected,
/// square world map, in meters.
pub const EARTH_PERIMETER: f64 = 2. * PI * EARTH_RADIUS;

/// Number of tiles along one side of the grid at the given zoom level.
pub fn total_tiles(zoom: u8) -> u32 {
    2u32.pow(zoom as u32)
}

/// The projection diverges at the poles, so latitudes at or beyond ±90° are
/// rejected up front instead of producing infinities.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("latitude {0}° lies outside the Web Mercator domain (-90°, 90°)")]
pub struct LatitudeOutOfRange(pub f64);

/// Project the position into the Mercator plane, in meters. The origin is the
/// intersection of the equator and the prime meridian, x grows east, y grows
/// north.
pub fn project(position: Position) -> Result<(f64, f64), LatitudeOutOfRange> {
    if position.y().abs() >= 90. {
        return Err(LatitudeOutOfRange(position.y()));
    }

    let x = position.x().to_radians() * EARTH_RADIUS;
    let sin = position.y().to_radians().sin();
    let y = (EARTH_RADIUS / 2.) * ((1. + sin) / (1. - sin)).ln();

    Ok((x, y))
}

/// How many meters a single pixel covers at the given zoom level. Halves with
/// every zoom increment.
pub fn resolution(zoom: u8) -> f64 {
    EARTH_PERIMETER / (total_tiles(zoom) as f64 * TILE_SIZE as f64)
}

/// Position on the "world bitmap": projected, translated so that the origin
/// is the top-left corner of the map, scaled to pixels and floored.
pub fn pixel_origin(position: Position, zoom: u8) -> Result<Pixels, LatitudeOutOfRange> {
    let (x, y) = project(position)?;

    // Move the origin from the middle of the map to its top-left corner.
    // Screen y grows downwards, hence the flip.
    let x = x + EARTH_PERIMETER / 2.;
    let y = EARTH_PERIMETER / 2. - y;

    let resolution = resolution(zoom);
    Ok(Pixels::new((x / resolution).floor(), (y / resolution).floor()))
}
