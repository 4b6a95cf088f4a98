//! Fetching tiles over HTTP.

use bytes::Bytes;
use reqwest::header::USER_AGENT;

pub use reqwest::header::HeaderValue;

use crate::cache::Fetch;
use crate::sources::TileSource;
use crate::tiles::TileId;

/// Controls how [`HttpFetch`] uses the HTTP protocol.
pub struct HttpOptions {
    /// User agent to be sent to the tile servers. Some providers reject
    /// clients without one.
    pub user_agent: Option<HeaderValue>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: Some(HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tile server returned an empty body")]
    EmptyBody,
}

/// Downloads tiles from a [`TileSource`], reusing one [`reqwest::Client`] for
/// the whole session.
pub struct HttpFetch<S> {
    source: S,
    client: reqwest::Client,
    user_agent: Option<HeaderValue>,
}

impl<S> HttpFetch<S> {
    /// Construct a new fetch with default [`HttpOptions`].
    pub fn new(source: S) -> Self {
        Self::with_options(source, HttpOptions::default())
    }

    pub fn with_options(source: S, options: HttpOptions) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            user_agent: options.user_agent,
        }
    }
}

impl<S> Fetch for HttpFetch<S>
where
    S: TileSource + Send + Sync + 'static,
{
    type Error = HttpFetchError;

    async fn fetch(&self, tile_id: TileId) -> Result<Bytes, Self::Error> {
        let url = self.source.tile_url(tile_id);
        log::debug!("Getting {tile_id:?} from {url}.");

        let mut request = self.client.get(&url);
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent.clone());
        }

        let response = request.send().await?.error_for_status()?;
        log::trace!("Downloaded {tile_id:?}: {}.", response.status());

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(HttpFetchError::EmptyBody);
        }

        Ok(bytes)
    }
}
