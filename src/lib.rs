//! Fetches an animated cat GIF from a remote endpoint, scales it down to
//! a small companion display, thins its frames, and re-archives it as a
//! looping payload, alongside an advisory estimate of how long the
//! transfer to the display will take.
//!
//! The pipeline runs on a background thread and delivers each outcome
//! into an mpsc channel the caller drains from its own loop; stale
//! results from superseded fetches are discarded by comparing
//! [`RequestToken`]s.

pub mod codec;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod resize;

pub use codec::{AnimatedFrame, AnimatedImage, ArchivedAnimatedImage};
pub use error::Error;
pub use fetch::{
    FetchConfig, FetchPipeline, FetchReply, FetchResult, RequestToken, TokenSlot,
};
pub use resize::resize;
