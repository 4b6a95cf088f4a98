//! Geographic extent currently shown in the viewport.

use crate::position::{Pixels, Position};
use crate::viewport::ViewportSize;

/// Degenerate or inverted bounding boxes carry no area to cover with tiles.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("degenerate or inverted extent: ({min_lng}, {min_lat})..({max_lng}, {max_lat})")]
pub struct InvalidExtent {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

/// Axis-aligned geographic bounding box, in degrees.
///
/// An extent is only ever replaced wholesale; there is no way to move a single
/// edge, so a once valid extent stays valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    min: Position,
    max: Position,
}

impl Extent {
    /// Create an extent from its south-west and north-east corners.
    pub fn new(min: Position, max: Position) -> Result<Self, InvalidExtent> {
        if min.x() < max.x() && min.y() < max.y() {
            Ok(Self { min, max })
        } else {
            Err(InvalidExtent {
                min_lng: min.x(),
                min_lat: min.y(),
                max_lng: max.x(),
                max_lat: max.y(),
            })
        }
    }

    /// South-west corner.
    pub fn min(&self) -> Position {
        self.min
    }

    /// North-east corner.
    pub fn max(&self) -> Position {
        self.max
    }

    /// North-west corner. This is the geographic origin of the viewport, which
    /// tile positions are computed against.
    pub fn top_left(&self) -> Position {
        Position::new(self.min.x(), self.max.y())
    }

    /// South-east corner.
    pub fn bottom_right(&self) -> Position {
        Position::new(self.max.x(), self.min.y())
    }

    /// Longitude span, in degrees.
    pub fn width(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    /// Latitude span, in degrees.
    pub fn height(&self) -> f64 {
        self.max.y() - self.min.y()
    }

    /// Translate the extent by a drag gesture measured in screen pixels.
    ///
    /// Dragging right (positive x) reveals terrain to the west, so longitudes
    /// decrease. Screen y grows downwards while latitude grows upwards, so
    /// dragging down reveals the north.
    pub fn panned_by(&self, delta: Pixels, viewport: ViewportSize) -> Self {
        let shift_lng = delta.x() * self.width() / viewport.width;
        let shift_lat = delta.y() * self.height() / viewport.height;

        Self {
            min: Position::new(self.min.x() - shift_lng, self.min.y() + shift_lat),
            max: Position::new(self.max.x() - shift_lng, self.max.y() + shift_lat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::lon_lat;

    fn extent(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Extent {
        Extent::new(lon_lat(min_lng, min_lat), lon_lat(max_lng, max_lat)).unwrap()
    }

    #[test]
    fn inverted_or_degenerate_extents_are_rejected() {
        assert!(Extent::new(lon_lat(109., 31.), lon_lat(108., 32.)).is_err());
        assert!(Extent::new(lon_lat(108., 32.), lon_lat(109., 31.)).is_err());
        assert!(Extent::new(lon_lat(108., 31.), lon_lat(108., 32.)).is_err());
    }

    #[test]
    fn corners_are_derived_from_the_bounds() {
        let extent = extent(100., 30., 101., 31.);
        assert_eq!(lon_lat(100., 31.), extent.top_left());
        assert_eq!(lon_lat(101., 30.), extent.bottom_right());
    }

    #[test]
    fn horizontal_pan_shifts_longitudes_proportionally() {
        let viewport = ViewportSize {
            width: 800.,
            height: 450.,
        };

        let panned = extent(100., 30., 101., 31.).panned_by(Pixels::new(80., 0.), viewport);

        // 80px of an 800px wide viewport showing 1° is a tenth of a degree.
        approx::assert_relative_eq!(panned.min().x(), 99.9, epsilon = 1e-12);
        approx::assert_relative_eq!(panned.max().x(), 100.9, epsilon = 1e-12);
        approx::assert_relative_eq!(panned.min().y(), 30.);
        approx::assert_relative_eq!(panned.max().y(), 31.);
    }

    #[test]
    fn vertical_pan_shifts_latitudes_upwards() {
        let viewport = ViewportSize {
            width: 800.,
            height: 450.,
        };

        let panned = extent(100., 30., 101., 31.).panned_by(Pixels::new(0., 45.), viewport);

        approx::assert_relative_eq!(panned.min().y(), 30.1, epsilon = 1e-12);
        approx::assert_relative_eq!(panned.max().y(), 31.1, epsilon = 1e-12);
        approx::assert_relative_eq!(panned.min().x(), 100.);
    }
}
