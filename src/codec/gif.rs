//! GIF decode and re-encode.

use std::io::Cursor;
use std::time::Duration;
use std::time::Instant;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame, ImageFormat};

use super::{AnimatedFrame, AnimatedImage, ArchivedAnimatedImage};
use crate::error::Error;

/// Decodes an image container that may hold 1..N frames.
///
/// GIF containers are decoded frame by frame with their stored per-frame
/// delays; other supported containers (PNG, JPEG) decode as a single
/// static frame. A container holding one frame or fewer always yields a
/// static image with duration 0.
pub fn decode(bytes: &[u8]) -> Result<AnimatedImage, Error> {
    let start = Instant::now();
    let format = image::guess_format(bytes)?;

    if format != ImageFormat::Gif {
        let img = image::load_from_memory(bytes)?;
        log::info!(
            "decoded static {:?} image {}x{} in {:?}",
            format,
            img.width(),
            img.height(),
            start.elapsed()
        );
        return AnimatedImage::from_frames(vec![AnimatedFrame::new(
            img.to_rgba8(),
            Duration::ZERO,
        )]);
    }

    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;

    if frames.len() <= 1 {
        // A one-frame GIF is a still image, its stored delay is ignored.
        let frame = frames.into_iter().next().ok_or(Error::NoFrames)?;
        return AnimatedImage::from_frames(vec![AnimatedFrame::new(
            frame.into_buffer(),
            Duration::ZERO,
        )]);
    }

    let mut decoded = Vec::with_capacity(frames.len());
    for frame in frames {
        let delay = Duration::from(frame.delay());
        decoded.push(AnimatedFrame::new(frame.into_buffer(), delay));
    }

    let image = AnimatedImage::from_frames(decoded)?;
    log::info!(
        "decoded {} GIF frames ({}x{}, {:?} total) in {:?}",
        image.frame_count(),
        image.width(),
        image.height(),
        image.total_duration(),
        start.elapsed()
    );
    Ok(image)
}

/// Serializes an image into a looping GIF payload reusable by a display
/// surface. Frame count and total duration are cached alongside the bytes.
pub fn encode(image: &AnimatedImage) -> Result<ArchivedAnimatedImage, Error> {
    let start = Instant::now();
    let mut bytes = Vec::new();

    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, 10);
        encoder.set_repeat(Repeat::Infinite).map_err(Error::Encode)?;
        for frame in image.frames() {
            let delay = Delay::from_saturating_duration(frame.duration());
            let frame = Frame::from_parts(frame.rgba().clone(), 0, 0, delay);
            encoder.encode_frame(frame).map_err(Error::Encode)?;
        }
    }

    log::info!(
        "archived {} frames into {} bytes in {:?}",
        image.frame_count(),
        bytes.len(),
        start.elapsed()
    );
    Ok(ArchivedAnimatedImage::new(
        bytes,
        image.frame_count(),
        image.total_duration(),
    ))
}
