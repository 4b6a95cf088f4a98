//! Single-flight cache sitting between the load pipeline and the tile source.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::tiles::{Tile, TileId};

/// Retrieves the raw image of a single tile. This is the seam where the
/// network, or a test double, is injected.
pub trait Fetch: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    fn fetch(&self, tile_id: TileId) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}

/// Final state of a tile retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileState {
    /// The image arrived and can be drawn.
    Ready(Tile),

    /// The retrieval failed. The failure is kept so the rest of the pass can
    /// go on, but it does not pin the tile: a later pass tries again.
    Failed(String),
}

impl TileState {
    pub fn is_ready(&self) -> bool {
        matches!(self, TileState::Ready(_))
    }
}

type InFlight = Shared<BoxFuture<'static, TileState>>;

#[derive(Clone)]
enum Slot {
    /// A fetch was issued for this tile and has not concluded yet.
    InFlight(InFlight),
    Done(TileState),
}

/// Keyed store of every tile ever requested, guaranteeing at most one
/// outstanding fetch per [`TileId`].
///
/// There is no eviction; the working set of a pannable viewport is small
/// enough that the map simply grows with the session.
pub struct TileCache<F> {
    fetch: Arc<F>,
    slots: Mutex<HashMap<TileId, Slot>>,
}

impl<F: Fetch> TileCache<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch: Arc::new(fetch),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the tile, retrieving it from the source if it was never requested
    /// before.
    ///
    /// The pending slot is inserted under the lock before the retrieval
    /// starts, so concurrent calls for the same tile end up awaiting one
    /// shared future instead of issuing a second retrieval. The outcome is
    /// committed to the map even when the pass that requested it has been
    /// cancelled in the meantime, so the next pass can reuse it.
    pub async fn fetch(&self, tile_id: TileId) -> TileState {
        let in_flight = {
            let mut slots = self.lock();
            match slots.get(&tile_id) {
                Some(Slot::Done(state @ TileState::Ready(_))) => return state.clone(),
                Some(Slot::InFlight(in_flight)) => in_flight.clone(),
                Some(Slot::Done(TileState::Failed(_))) | None => {
                    let fetch = Arc::clone(&self.fetch);
                    let in_flight = async move {
                        match fetch.fetch(tile_id).await {
                            Ok(bytes) => TileState::Ready(Tile::new(bytes)),
                            Err(e) => {
                                log::warn!("Could not fetch {tile_id:?}: {e}.");
                                TileState::Failed(e.to_string())
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    slots.insert(tile_id, Slot::InFlight(in_flight.clone()));
                    in_flight
                }
            }
        };

        let state = in_flight.clone().await;

        // Commit the outcome, unless the slot changed hands. A failed tile
        // could have been re-requested by now, and the fresh fetch must not
        // be clobbered with this stale result.
        let mut slots = self.lock();
        if matches!(slots.get(&tile_id), Some(Slot::InFlight(current)) if current.ptr_eq(&in_flight))
        {
            slots.insert(tile_id, Slot::Done(state.clone()));
        }

        state
    }

    /// State of the tile, if its retrieval already concluded. Never triggers
    /// a fetch.
    pub fn get(&self, tile_id: TileId) -> Option<TileState> {
        match self.lock().get(&tile_id) {
            Some(Slot::Done(state)) => Some(state.clone()),
            _ => None,
        }
    }

    /// Snapshot of all tiles ready to be drawn. This is what a pan gesture
    /// repaints from while the new load pass is still underway.
    pub fn ready(&self) -> Vec<(TileId, Tile)> {
        self.lock()
            .iter()
            .filter_map(|(tile_id, slot)| match slot {
                Slot::Done(TileState::Ready(tile)) => Some((*tile_id, tile.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TileId, Slot>> {
        // The lock is held only for map operations; the map stays sound even
        // if a holder panicked.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
