//! Choosing the zoom level and the rectangle of tiles covering the viewport.

use crate::extent::Extent;
use crate::mercator::{
    pixel_origin, project, total_tiles, LatitudeOutOfRange, EARTH_PERIMETER, TILE_SIZE,
};
use crate::tiles::TileId;

/// Tile sources rarely serve anything finer, and the search below must not
/// run away on extents spanning less than a pixel.
const MAX_ZOOM: u8 = 22;

/// Size of the drawable area, in pixels. Owned by the windowing collaborator;
/// the engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Rectangle of tiles covering the viewport at a chosen zoom level, inclusive
/// on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    zoom: u8,
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl TileRange {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Number of tiles in the rectangle.
    pub fn count(&self) -> usize {
        ((self.x_max - self.x_min + 1) * (self.y_max - self.y_min + 1)) as usize
    }

    /// Iterate the rectangle in raster order, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> {
        let Self {
            zoom,
            x_min,
            y_min,
            x_max,
            y_max,
        } = *self;

        (y_min..=y_max).flat_map(move |y| (x_min..=x_max).map(move |x| TileId { x, y, zoom }))
    }
}

/// Pick the zoom level and the tile rectangle covering `extent` in a viewport
/// of the given pixel size.
///
/// The zoom is the smallest one whose resolution does not under-sample either
/// axis, so the projected extent never comes out coarser than the viewport on
/// the axis that constrains it tighter.
pub fn tile_range(extent: &Extent, size: ViewportSize) -> Result<TileRange, LatitudeOutOfRange> {
    let (left, top) = project(extent.top_left())?;
    let (right, bottom) = project(extent.bottom_right())?;

    let x_span = right - left;
    let y_span = top - bottom;
    let required = (x_span / size.width).min(y_span / size.height);

    // Resolution strictly halves with each level, so this terminates at the
    // first zoom at least as fine as `required`.
    let mut zoom = 0;
    let mut grid_extent = TILE_SIZE as f64;
    while EARTH_PERIMETER / grid_extent / required > 1. && zoom < MAX_ZOOM {
        grid_extent *= 2.;
        zoom += 1;
    }

    let top_left = pixel_origin(extent.top_left(), zoom)?;
    let bottom_right = pixel_origin(extent.bottom_right(), zoom)?;

    // Extents touching the antimeridian or the projection's latitude limit
    // would otherwise index one tile past the grid.
    let last = total_tiles(zoom) - 1;
    let tile = |pixel: f64| ((pixel / TILE_SIZE as f64).floor().max(0.) as u32).min(last);

    Ok(TileRange {
        zoom,
        x_min: tile(top_left.x()),
        y_min: tile(top_left.y()),
        x_max: tile(bottom_right.x()),
        y_max: tile(bottom_right.y()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mercator::resolution;
    use crate::position::lon_lat;

    fn shaanxi() -> Extent {
        Extent::new(lon_lat(108., 31.), lon_lat(109., 32.)).unwrap()
    }

    fn viewport() -> ViewportSize {
        ViewportSize {
            width: 800.,
            height: 450.,
        }
    }

    #[test]
    fn covers_a_degree_sized_extent_in_a_small_window() {
        let range = tile_range(&shaanxi(), viewport()).unwrap();

        assert_eq!(11, range.zoom());
        assert_eq!((1638, 1644), (range.x_min(), range.x_max()));
        assert_eq!((831, 838), (range.y_min(), range.y_max()));
        assert_eq!(56, range.count());
    }

    #[test]
    fn selection_is_deterministic() {
        assert_eq!(
            tile_range(&shaanxi(), viewport()).unwrap(),
            tile_range(&shaanxi(), viewport()).unwrap()
        );
    }

    #[test]
    fn chosen_zoom_is_the_coarsest_one_that_does_not_under_sample() {
        let (left, top) = project(shaanxi().top_left()).unwrap();
        let (right, bottom) = project(shaanxi().bottom_right()).unwrap();
        let required = ((right - left) / viewport().width).min((top - bottom) / viewport().height);

        let zoom = tile_range(&shaanxi(), viewport()).unwrap().zoom();
        assert!(resolution(zoom) <= required);
        assert!(required < resolution(zoom - 1));
    }

    #[test]
    fn whole_world_fits_in_a_single_tile_at_zoom_zero() {
        let world = Extent::new(lon_lat(-179., -85.), lon_lat(179., 85.)).unwrap();
        let range = tile_range(
            &world,
            ViewportSize {
                width: 100.,
                height: 100.,
            },
        )
        .unwrap();

        assert_eq!(0, range.zoom());
        assert_eq!(1, range.count());
    }

    #[test]
    fn tiles_iterate_in_raster_order() {
        let range = TileRange {
            zoom: 3,
            x_min: 1,
            y_min: 2,
            x_max: 2,
            y_max: 3,
        };

        let tiles: Vec<_> = range.tiles().collect();
        assert_eq!(
            vec![
                TileId { x: 1, y: 2, zoom: 3 },
                TileId { x: 2, y: 2, zoom: 3 },
                TileId { x: 1, y: 3, zoom: 3 },
                TileId { x: 2, y: 3, zoom: 3 },
            ],
            tiles
        );
        assert_eq!(range.count(), tiles.len());
    }

    #[test]
    fn extent_touching_the_antimeridian_stays_on_the_grid() {
        let east = Extent::new(lon_lat(170., 30.), lon_lat(180., 40.)).unwrap();
        let range = tile_range(&east, viewport()).unwrap();

        assert!(range.x_max() < total_tiles(range.zoom()));
        assert!(range.x_min() <= range.x_max());
        assert!(range.y_min() <= range.y_max());
    }
}
