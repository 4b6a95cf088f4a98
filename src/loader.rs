//! One "load" pass: from a viewport extent to draw notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::poll_immediate;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::cache::{Fetch, TileCache, TileState};
use crate::extent::Extent;
use crate::mercator::{pixel_origin, LatitudeOutOfRange, TILE_SIZE};
use crate::position::Pixels;
use crate::tiles::{Tile, TileId};
use crate::viewport::{tile_range, ViewportSize};

/// How a load pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every tile of the rectangle was requested.
    Completed { ready: usize, failed: usize },

    /// Cancellation was observed before the whole rectangle was requested.
    /// Tiles dispatched up to that point still resolved into the cache.
    Cancelled { ready: usize, failed: usize },

    /// Another pass was still running. The call was dropped, not queued.
    AlreadyLoading,
}

/// Drives load passes over a shared [`TileCache`].
///
/// At most one pass runs at a time; a pan gesture cancels the running pass
/// through [`Loader::cancel`] and starts a fresh one once the gesture ends.
pub struct Loader<F> {
    cache: Arc<TileCache<F>>,
    loading: AtomicBool,
    cancellation: Mutex<CancellationToken>,
}

impl<F: Fetch> Loader<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            cache: Arc::new(TileCache::new(fetch)),
            loading: AtomicBool::new(false),
            cancellation: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn cache(&self) -> &TileCache<F> {
        &self.cache
    }

    /// Ask the running pass to stop dispatching new tiles, typically at the
    /// start of a drag gesture. Fetches already in flight run to completion
    /// and land in the cache for the next pass to reuse.
    pub fn cancel(&self) {
        self.lock_token().cancel();
    }

    /// Arm a fresh token once the gesture which cancelled the previous pass
    /// has ended. Without this, every following pass would be stillborn.
    pub fn reset_cancellation(&self) {
        *self.lock_token() = CancellationToken::new();
    }

    /// Run one load pass over the tile rectangle covering `extent`.
    ///
    /// For every tile that turns out ready, `on_tile` is called with the tile
    /// and its position relative to the viewport's top-left corner. Calls
    /// arrive in completion order, not in raster order, so tiles may visibly
    /// appear scattered. A tile that fails to load is counted and skipped,
    /// never aborting the rest of the pass.
    pub async fn load(
        &self,
        extent: &Extent,
        size: ViewportSize,
        mut on_tile: impl FnMut(TileId, &Tile, Pixels),
    ) -> Result<LoadOutcome, LatitudeOutOfRange> {
        if self.loading.swap(true, Ordering::AcqRel) {
            log::debug!("A load pass is already running, dropping this one.");
            return Ok(LoadOutcome::AlreadyLoading);
        }
        let _guard = LoadingGuard(&self.loading);

        let cancellation = self.lock_token().clone();
        let range = tile_range(extent, size)?;
        let origin = pixel_origin(extent.top_left(), range.zoom())?;
        log::debug!("Loading {range:?}.");

        let cache = &self.cache;
        let mut in_flight = FuturesUnordered::new();
        let mut ready = 0;
        let mut failed = 0;
        let mut cancelled = false;

        for tile_id in range.tiles() {
            if cancellation.is_cancelled() {
                log::debug!("Load pass cancelled at {tile_id:?}.");
                cancelled = true;
                break;
            }

            if !tile_id.valid() {
                continue;
            }

            in_flight.push(async move {
                match cache.fetch(tile_id).await {
                    TileState::Ready(tile) => {
                        let position = tile_id.project(TILE_SIZE as f64) - origin;
                        Some((tile_id, tile, position))
                    }
                    TileState::Failed(_) => None,
                }
            });

            // Nudge the fetches along between dispatches, so they overlap
            // with the iteration and finished ones are reported right away.
            while let Some(Some(completed)) = poll_immediate(in_flight.next()).await {
                match completed {
                    Some((tile_id, tile, position)) => {
                        on_tile(tile_id, &tile, position);
                        ready += 1;
                    }
                    None => failed += 1,
                }
            }
        }

        while let Some(completed) = in_flight.next().await {
            match completed {
                Some((tile_id, tile, position)) => {
                    on_tile(tile_id, &tile, position);
                    ready += 1;
                }
                None => failed += 1,
            }
        }

        Ok(if cancelled {
            LoadOutcome::Cancelled { ready, failed }
        } else {
            LoadOutcome::Completed { ready, failed }
        })
    }

    fn lock_token(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancellation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Flips the pass back to idle on every exit path.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
