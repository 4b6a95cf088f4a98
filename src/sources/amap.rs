use std::sync::atomic::{AtomicUsize, Ordering};

use super::TileSource;
use crate::tiles::TileId;

const MIRRORS: [&str; 4] = [
    "webrd01.is.autonavi.com",
    "webrd02.is.autonavi.com",
    "webrd03.is.autonavi.com",
    "webrd04.is.autonavi.com",
];

/// AutoNavi (高德) street map raster tiles.
///
/// Requests rotate through the public mirror pool. What the mirrors balance is
/// the load, not any tile content, so the rotation order carries no meaning.
pub struct AMap {
    next_mirror: AtomicUsize,
}

impl AMap {
    pub fn new() -> Self {
        Self {
            next_mirror: AtomicUsize::new(0),
        }
    }
}

impl Default for AMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for AMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        let mirror = MIRRORS[self.next_mirror.fetch_add(1, Ordering::Relaxed) % MIRRORS.len()];
        format!(
            "https://{}/appmaptile?x={}&y={}&z={}&lang=zh_cn&size=1&scale=1&style=8",
            mirror, tile_id.x, tile_id.y, tile_id.zoom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_coordinates_end_up_in_the_query_string() {
        let url = AMap::new().tile_url(TileId {
            x: 1638,
            y: 831,
            zoom: 11,
        });

        assert_eq!(
            "https://webrd01.is.autonavi.com/appmaptile?x=1638&y=831&z=11&lang=zh_cn&size=1&scale=1&style=8",
            url
        );
    }

    #[test]
    fn requests_rotate_through_the_mirror_pool() {
        let source = AMap::new();
        let tile_id = TileId { x: 0, y: 0, zoom: 0 };

        let hosts: Vec<String> = (0..5).map(|_| source.tile_url(tile_id)).collect();

        assert!(hosts[0].contains("webrd01"));
        assert!(hosts[1].contains("webrd02"));
        assert!(hosts[2].contains("webrd03"));
        assert!(hosts[3].contains("webrd04"));
        assert!(hosts[4].contains("webrd01"));
    }
}
