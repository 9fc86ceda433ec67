// Stream-address discovery
//
// The AGQR live stream publishes its current rtmp address through a small
// server-info XML document. The address changes rarely, so resolved URLs
// are cached behind an explicit, force-refreshable cache object.

use crate::errors::StreamError;
use crate::models::{Source, SourceKind};
use lazy_static::lazy_static;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, info};

lazy_static! {
    // The server element carries scheme noise before the rtmp part; take
    // the rtmp suffix only, like the other two plain text elements.
    static ref SERVER_ELEMENT: Regex =
        Regex::new(r"<server>[^<]*?(rtmp[^<]*)</server>").expect("server element pattern");
    static ref APP_ELEMENT: Regex = Regex::new(r"<app>([^<]*)</app>").expect("app element pattern");
    static ref STREAM_ELEMENT: Regex =
        Regex::new(r"<stream>([^<]*)</stream>").expect("stream element pattern");
}

/// Extract the stream URL from a server-info document.
pub fn take_stream_url(xml: &str) -> Result<String, StreamError> {
    let server = capture(&SERVER_ELEMENT, xml, "server")?;
    let app = capture(&APP_ELEMENT, xml, "app")?;
    let stream = capture(&STREAM_ELEMENT, xml, "stream")?;

    Ok(format!("{server}/{app}/{stream}"))
}

fn capture<'a>(
    pattern: &Regex,
    xml: &'a str,
    element: &'static str,
) -> Result<&'a str, StreamError> {
    pattern
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(StreamError::MalformedServerInfo(element))
}

/// Fetch the server-info document and extract the current stream URL.
pub async fn fetch_stream_url(
    client: &reqwest::Client,
    info_url: &str,
) -> Result<String, StreamError> {
    let body = client
        .get(info_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    take_stream_url(&body)
}

/// Cache for the resolved stream address.
///
/// Owned by whoever composes the resolver with the job installer; never
/// module-level state. `get(true)` bypasses the cached value.
pub struct StreamUrlCache {
    client: reqwest::Client,
    info_url: String,
    cached: Mutex<Option<String>>,
}

impl StreamUrlCache {
    pub fn new(client: reqwest::Client, info_url: impl Into<String>) -> Self {
        Self {
            client,
            info_url: info_url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Return the cached address, fetching on a miss or when forced.
    pub async fn get(&self, force_refresh: bool) -> Result<String, StreamError> {
        let mut cached = self.cached.lock().await;

        if !force_refresh {
            if let Some(url) = cached.as_ref() {
                debug!(url = %url, "stream url cache hit");
                return Ok(url.clone());
            }
        }

        let url = fetch_stream_url(&self.client, &self.info_url).await?;
        info!(url = %url, "stream url resolved");
        *cached = Some(url.clone());

        Ok(url)
    }

    /// Drop the cached address; the next `get` fetches again.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

/// Maps a schedule's source to a concrete stream URL.
pub struct SourceResolver {
    cache: StreamUrlCache,
}

impl SourceResolver {
    pub fn new(cache: StreamUrlCache) -> Self {
        Self { cache }
    }

    /// Literal URIs and pass-through sources resolve to themselves; the
    /// AGQR symbolic source consults the cache.
    pub async fn resolve(&self, source: &Source) -> Result<String, StreamError> {
        match source.kind() {
            SourceKind::Agqr => self.cache.get(false).await,
            SourceKind::Rtmp | SourceKind::Url => Ok(source.raw().to_string()),
        }
    }
}
