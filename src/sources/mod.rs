//! Remote tile servers. Make sure you follow the terms of usage of the
//! particular source.

mod amap;

pub use amap::AMap;

use crate::tiles::TileId;

/// Remote tile server definition, source for [`crate::HttpFetch`].
pub trait TileSource {
    fn tile_url(&self, tile_id: TileId) -> String;
}
