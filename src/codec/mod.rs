//! Decoded and archived representations of an animated image.

pub mod gif;

use std::time::Duration;

use image::RgbaImage;

use crate::error::Error;

pub use gif::{decode, encode};

/// One decoded frame plus its individual display duration.
///
/// Immutable once produced.
#[derive(Clone)]
pub struct AnimatedFrame {
    rgba: RgbaImage,
    duration: Duration,
}

impl AnimatedFrame {
    pub fn new(rgba: RgbaImage, duration: Duration) -> Self {
        Self { rgba, duration }
    }

    #[inline]
    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Display duration of this frame.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl std::fmt::Debug for AnimatedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedFrame")
            .field(
                "dimensions",
                &format!("{}x{}", self.rgba.width(), self.rgba.height()),
            )
            .field("duration", &self.duration)
            .finish()
    }
}

/// An ordered, non-empty sequence of frames.
///
/// A single-frame image represents a static (non-looping) picture. The
/// total duration is always the sum of the frame durations.
#[derive(Clone, Debug)]
pub struct AnimatedImage {
    frames: Vec<AnimatedFrame>,
    width: u32,
    height: u32,
}

impl AnimatedImage {
    /// Builds an image from decoded frames. The canvas size is taken from
    /// the first frame.
    pub fn from_frames(frames: Vec<AnimatedFrame>) -> Result<Self, Error> {
        let first = frames.first().ok_or(Error::NoFrames)?;
        let (width, height) = first.rgba().dimensions();
        Ok(Self {
            frames,
            width,
            height,
        })
    }

    #[inline]
    pub fn frames(&self) -> &[AnimatedFrame] {
        &self.frames
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas size as `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// A single-frame image is displayed as a still, not a loop.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.frames.len() == 1
    }

    /// Total playback duration, the sum of all frame durations.
    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(AnimatedFrame::duration).sum()
    }
}

/// A serialized, display-ready encoding of a full animated sequence.
///
/// Frame count and duration are cached from the image the bytes were
/// encoded from; this is a derived view, not independently mutable.
#[derive(Clone, Debug)]
pub struct ArchivedAnimatedImage {
    bytes: Vec<u8>,
    frame_count: usize,
    duration: Duration,
}

impl ArchivedAnimatedImage {
    pub(crate) fn new(bytes: Vec<u8>, frame_count: usize, duration: Duration) -> Self {
        Self {
            bytes,
            frame_count,
            duration,
        }
    }

    /// Encoded GIF payload, ready for a display surface.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}
