//! Downscaling and frame subsampling for small display surfaces.

use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::codec::{AnimatedFrame, AnimatedImage};
use crate::error::Error;

/// JPEG quality used when re-encoding frames, on a 0-100 scale. Lossy on
/// purpose: it bounds the memory and transfer cost of each kept frame.
const LOSSY_QUALITY: u8 = 50;

/// Rescales an animation to fit `target` and thins it to at most roughly
/// `max_frames` frames.
///
/// Returns the input untouched when `target` equals the current size or
/// has zero area. The scale factor is `min(tw/sw, th/sh)`, so aspect
/// ratio is always preserved. `max_frames == 0` keeps every frame.
///
/// Total playback duration is carried over unchanged no matter how many
/// frames were dropped; the retained frames share it evenly.
pub fn resize(
    image: AnimatedImage,
    target: (u32, u32),
    max_frames: u32,
) -> Result<AnimatedImage, Error> {
    let (target_width, target_height) = target;
    if image.size() == target || target_width == 0 || target_height == 0 {
        return Ok(image);
    }

    let (source_width, source_height) = image.size();
    let width_factor = target_width as f64 / source_width as f64;
    let height_factor = target_height as f64 / source_height as f64;
    let scale_factor = width_factor.min(height_factor);

    let scaled_width = ((source_width as f64 * scale_factor).round() as u32).max(1);
    let scaled_height = ((source_height as f64 * scale_factor).round() as u32).max(1);

    let frame_count = image.frame_count();
    // Integer stride, clamped so a frame count below max_frames can never
    // produce a zero increment.
    let stride = if max_frames == 0 {
        1
    } else {
        (frame_count / max_frames as usize).max(1)
    };

    let total_duration = image.total_duration();

    let mut scaled_frames = Vec::new();
    let mut index = 0;
    while index < frame_count {
        let rgba = rescale_frame(&image.frames()[index], scaled_width, scaled_height)?;
        scaled_frames.push(rgba);
        index += stride;
    }

    log::info!(
        "resized {}x{} -> {}x{}, kept {}/{} frames (stride {})",
        source_width,
        source_height,
        scaled_width,
        scaled_height,
        scaled_frames.len(),
        frame_count,
        stride,
    );

    let durations = spread_duration(total_duration, scaled_frames.len() as u32);
    let frames = scaled_frames
        .into_iter()
        .zip(durations)
        .map(|(rgba, duration)| AnimatedFrame::new(rgba, duration))
        .collect();

    AnimatedImage::from_frames(frames)
}

/// Re-renders one frame at the scaled size and pushes it through a lossy
/// JPEG round trip to shrink its in-memory footprint.
fn rescale_frame(
    frame: &AnimatedFrame,
    width: u32,
    height: u32,
) -> Result<image::RgbaImage, Error> {
    let scaled = DynamicImage::ImageRgba8(frame.rgba().clone())
        .resize_exact(width, height, FilterType::Triangle);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, LOSSY_QUALITY)
        .encode_image(&scaled.to_rgb8())
        .map_err(Error::Encode)?;

    Ok(image::load_from_memory(&jpeg)?.to_rgba8())
}

/// Splits `total` evenly across `count` frames, folding the rounding
/// remainder into the last one so the sum stays exact.
fn spread_duration(total: Duration, count: u32) -> Vec<Duration> {
    debug_assert!(count > 0);
    let per_frame = total / count;
    let mut durations = vec![per_frame; count as usize];
    if let Some(last) = durations.last_mut() {
        *last = total - per_frame * (count - 1);
    }
    durations
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn animation(width: u32, height: u32, frames: usize, millis: u64) -> AnimatedImage {
        let frames = (0..frames)
            .map(|i| {
                AnimatedFrame::new(
                    RgbaImage::from_pixel(width, height, Rgba([i as u8 * 16, 0, 0, 255])),
                    Duration::from_millis(millis),
                )
            })
            .collect();
        AnimatedImage::from_frames(frames).unwrap()
    }

    #[test]
    fn same_size_target_is_an_identity_no_op() {
        let image = animation(64, 64, 8, 100);
        let out = resize(image, (64, 64), 3).unwrap();
        assert_eq!(out.frame_count(), 8);
        assert_eq!(out.size(), (64, 64));
        assert_eq!(out.total_duration(), Duration::from_millis(800));
        // Frame delays are untouched, not redistributed.
        assert_eq!(out.frames()[0].duration(), Duration::from_millis(100));
    }

    #[test]
    fn zero_area_target_is_an_identity_no_op() {
        let image = animation(64, 64, 4, 100);
        let out = resize(image, (0, 120), 3).unwrap();
        assert_eq!(out.frame_count(), 4);
        assert_eq!(out.size(), (64, 64));
    }

    #[test]
    fn downscale_preserves_aspect_ratio() {
        let image = animation(64, 32, 2, 100);
        let out = resize(image, (32, 32), 0).unwrap();
        assert_eq!(out.size(), (32, 16));
    }

    #[test]
    fn subsampling_bounds_frame_count_and_keeps_total_duration() {
        let image = animation(64, 64, 8, 100);
        let out = resize(image, (32, 32), 3).unwrap();

        // stride = 8 / 3 = 2, frames 0, 2, 4, 6 are kept.
        assert_eq!(out.frame_count(), 4);
        assert!(out.frame_count() <= 8usize.div_ceil(2));
        assert_eq!(out.total_duration(), Duration::from_millis(800));
        assert_eq!(out.size(), (32, 32));
    }

    #[test]
    fn max_frames_zero_keeps_every_frame() {
        let image = animation(64, 64, 5, 100);
        let out = resize(image, (32, 32), 0).unwrap();
        assert_eq!(out.frame_count(), 5);
        assert_eq!(out.total_duration(), Duration::from_millis(500));
    }

    #[test]
    fn stride_never_drops_to_zero_when_max_frames_exceeds_count() {
        let image = animation(64, 64, 3, 100);
        let out = resize(image, (32, 32), 10).unwrap();
        assert_eq!(out.frame_count(), 3);
        assert_eq!(out.total_duration(), Duration::from_millis(300));
    }

    #[test]
    fn uneven_totals_land_exactly_on_the_last_frame() {
        let durations = spread_duration(Duration::from_millis(700), 3);
        assert_eq!(durations.iter().copied().sum::<Duration>(), Duration::from_millis(700));
        assert_eq!(durations.len(), 3);
    }
}
