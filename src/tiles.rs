//! Tiles and their position within the viewport.

use bytes::Bytes;

use crate::mercator::{pixel_origin, total_tiles, LatitudeOutOfRange, TILE_SIZE};
use crate::position::{Pixels, Position};

/// Identifies the tile in the tile grid.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TileId {
    /// X number of the tile.
    pub x: u32,

    /// Y number of the tile.
    pub y: u32,

    /// Zoom level, where 0 means no zoom.
    /// See: <https://wiki.openstreetmap.org/wiki/Zoom_levels>
    pub zoom: u8,
}

impl TileId {
    /// Tile position (in pixels) on the "world bitmap".
    pub fn project(&self, tile_size: f64) -> Pixels {
        Pixels::new(self.x as f64 * tile_size, self.y as f64 * tile_size)
    }

    pub(crate) fn valid(&self) -> bool {
        self.x < total_tiles(self.zoom) && self.y < total_tiles(self.zoom)
    }
}

/// Undecoded raster image of a single tile, straight from the tile source.
/// Decoding and drawing it belong to the rendering collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct Tile {
    bytes: Bytes,
}

impl Tile {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile").field("bytes", &self.bytes.len()).finish()
    }
}

/// Where the tile should be drawn, in pixels relative to the top-left corner
/// of the viewport.
///
/// The offset depends on the geographic origin of the viewport, so it has to
/// be recomputed after every pan, even when no new tiles were fetched.
pub fn screen_position(
    tile_id: TileId,
    viewport_top_left: Position,
) -> Result<Pixels, LatitudeOutOfRange> {
    let origin = pixel_origin(viewport_top_left, tile_id.zoom)?;
    Ok(tile_id.project(TILE_SIZE as f64) - origin)
}
