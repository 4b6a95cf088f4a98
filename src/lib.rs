//! Headless slippy map engine: Web Mercator math, viewport tile ranges and a
//! single-flight tile cache with cooperative cancellation.
//!
//! Given a geographic [`Extent`] and the pixel size of a viewport,
//! [`tile_range`] picks a zoom level and the rectangle of tiles covering it.
//! A [`Loader`] then drives those tiles through a [`TileCache`] and reports
//! each ready tile together with its pixel position relative to the
//! viewport's top-left corner. Decoding the images and putting them on screen
//! is left to the caller.
//!
//! ```no_run
//! use rambler::{lon_lat, sources::AMap, Extent, HttpFetch, Loader, ViewportSize};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Loader::new(HttpFetch::new(AMap::new()));
//! let extent = Extent::new(lon_lat(108., 31.), lon_lat(109., 32.))?;
//! let size = ViewportSize {
//!     width: 800.,
//!     height: 450.,
//! };
//!
//! loader
//!     .load(&extent, size, |tile_id, tile, position| {
//!         println!("{:?}: {} bytes at {:?}", tile_id, tile.bytes().len(), position);
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cache;
mod download;
mod extent;
mod loader;
pub mod mercator;
mod position;
pub mod sources;
mod tiles;
mod viewport;

pub use cache::{Fetch, TileCache, TileState};
pub use download::{HeaderValue, HttpFetch, HttpFetchError, HttpOptions};
pub use extent::{Extent, InvalidExtent};
pub use loader::{LoadOutcome, Loader};
pub use mercator::LatitudeOutOfRange;
pub use position::{lat_lon, lon_lat, Pixels, Position};
pub use tiles::{screen_position, Tile, TileId};
pub use viewport::{tile_range, TileRange, ViewportSize};
