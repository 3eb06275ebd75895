//! Background fetch pipeline: download, decode, optimize, archive.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use crate::codec::{self, ArchivedAnimatedImage};
use crate::error::Error;
use crate::resize;

/// Measured throughput of a low-power wireless link: about 840 kbit/s in
/// a stable environment, and it can be worse.
const BYTES_PER_SECOND: usize = 840 * 1024 / 8;

/// Public endpoint that answers with raw animated GIF bytes.
pub const DEFAULT_ENDPOINT: &str = "https://cataas.com/cat/gif";

/// Opaque per-fetch identity. Equality is identity, never structural:
/// two tokens are equal only when one is a clone of the other.
#[derive(Clone, Debug)]
pub struct RequestToken(Arc<()>);

impl RequestToken {
    fn new() -> Self {
        Self(Arc::new(()))
    }
}

impl PartialEq for RequestToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RequestToken {}

/// Caller-side cell holding the currently active token.
///
/// The pipeline never touches this; the caller marks the newest token as
/// current and checks every delivered reply against it, discarding the
/// stale ones.
#[derive(Default)]
pub struct TokenSlot(Mutex<Option<RequestToken>>);

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `token` as the active fetch, superseding any previous one.
    pub fn make_current(&self, token: &RequestToken) {
        *self.0.lock() = Some(token.clone());
    }

    /// Whether `token` still identifies the active fetch.
    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.0.lock().as_ref() == Some(token)
    }

    pub fn clear(&self) {
        *self.0.lock() = None;
    }
}

/// Output of one successful fetch: the untouched downloaded bytes (kept
/// for later sharing/upload) plus the display-ready archive derived from
/// them. Superseded wholesale by the next successful fetch.
#[derive(Clone, Debug)]
pub struct FetchResult {
    pub original_bytes: Vec<u8>,
    pub archived: ArchivedAnimatedImage,
}

impl FetchResult {
    /// Advisory transfer-time estimate in seconds, sized to the archived
    /// payload over the assumed link throughput. Drives a progress
    /// animation; no real transfer-progress signal exists.
    pub fn estimated_loading_time(&self) -> f64 {
        self.archived.bytes().len() as f64 / BYTES_PER_SECOND as f64
    }

    /// Payload size in whole kilobytes, with thousands separators.
    pub fn formatted_loading_size(&self) -> String {
        let kilo_bytes = self.archived.bytes().len() / 1024;
        let digits = kilo_bytes.to_string();
        let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                formatted.push(',');
            }
            formatted.push(c);
        }
        formatted
    }
}

/// Message delivered back to the caller's receive loop.
#[derive(Debug)]
pub struct FetchReply {
    /// The token handed out by the `start` call this reply answers.
    pub token: RequestToken,
    /// `Some` on success; any failure along the pipeline collapses to
    /// `None`.
    pub result: Option<FetchResult>,
}

/// Knobs for one pipeline instance.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub endpoint: String,
    /// Bounding box the animation is scaled into.
    pub target_size: (u32, u32),
    /// Upper bound on retained frames; 0 keeps all of them.
    pub max_frames: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            target_size: (120, 120),
            max_frames: 6,
        }
    }
}

/// Orchestrates download -> decode -> resize -> archive on a background
/// thread, delivering each outcome into the caller's reply channel.
///
/// Stateless between calls apart from the tokens it hands out.
/// Cancellation is advisory only: superseded work runs to completion and
/// its reply is dropped by the caller's token comparison.
#[derive(Clone, Debug, Default)]
pub struct FetchPipeline {
    config: FetchConfig,
}

impl FetchPipeline {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Kicks off one fetch and returns its token immediately.
    ///
    /// The reply channel is the delivery context: the worker thread only
    /// ever sends into it, so caller-visible state changes happen on
    /// whichever thread drains the receiver. Replies arrive in
    /// completion order, not issue order. A dropped receiver means the
    /// caller is gone and the result is silently discarded.
    pub fn start(&self, replies: Sender<FetchReply>) -> RequestToken {
        let token = RequestToken::new();
        let config = self.config.clone();
        let reply_token = token.clone();

        thread::spawn(move || {
            let result = match run_fetch(&config) {
                Ok(result) => Some(result),
                Err(e) => {
                    log::warn!("fetch failed: {e}");
                    None
                }
            };
            if replies.send(FetchReply { token: reply_token, result }).is_err() {
                log::debug!("fetch reply channel closed, discarding result");
            }
        });

        token
    }
}

/// The blocking pipeline body, run on the worker thread.
fn run_fetch(config: &FetchConfig) -> Result<FetchResult, Error> {
    let start = Instant::now();

    let original_bytes = fetch_bytes(&config.endpoint)?;
    let image = codec::decode(&original_bytes)?;
    let optimized = resize::resize(image, config.target_size, config.max_frames)?;
    let archived = codec::encode(&optimized)?;

    log::info!(
        "fetch complete: {} original bytes -> {} archived bytes in {:?}",
        original_bytes.len(),
        archived.bytes().len(),
        start.elapsed()
    );
    Ok(FetchResult {
        original_bytes,
        archived,
    })
}

fn fetch_bytes(endpoint: &str) -> Result<Vec<u8>, Error> {
    log::info!("fetching {endpoint}");
    let response = reqwest::blocking::get(endpoint)?.error_for_status()?;
    let bytes = response.bytes()?;
    if bytes.is_empty() {
        return Err(Error::EmptyBody);
    }
    Ok(bytes.to_vec())
}
