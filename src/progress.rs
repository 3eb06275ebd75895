//! Pre-rendered determinate progress-bar animation.
//!
//! The display surface has no real transfer-progress signal, so the bar
//! is rendered up front as a fixed animation and the caller plays a
//! prefix of it for the estimated loading time.

use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::codec::{AnimatedFrame, AnimatedImage};
use crate::error::Error;

/// Default frame count of the pre-rendered bar.
pub const DEFAULT_FRAME_COUNT: usize = 40;

/// Nominal duration of the full animation; playback speed is what maps
/// it onto an actual loading-time estimate.
const FULL_ANIMATION_DURATION: Duration = Duration::from_secs(10);

const BAR_COLOR: Rgba<u8> = Rgba([255, 230, 32, 255]);

/// Renders a bar animation of `frame_count` frames; frame `i` is filled
/// to `i / (frame_count - 1)` of the width. Frame counts below 2 are
/// bumped to 2 so both an empty and a full frame always exist.
pub fn progress_bar_animation(
    bar_size: (u32, u32),
    frame_count: usize,
) -> Result<AnimatedImage, Error> {
    let frame_count = frame_count.max(2);
    let per_frame = FULL_ANIMATION_DURATION / frame_count as u32;

    let mut frames = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let progress = index as f64 / (frame_count - 1) as f64;
        let duration = if index == frame_count - 1 {
            FULL_ANIMATION_DURATION - per_frame * (frame_count as u32 - 1)
        } else {
            per_frame
        };
        frames.push(AnimatedFrame::new(bar_frame(bar_size, progress), duration));
    }

    AnimatedImage::from_frames(frames)
}

/// One bar frame: a transparent canvas with the leftmost
/// `ceil(width * progress)` columns filled.
fn bar_frame((width, height): (u32, u32), progress: f64) -> RgbaImage {
    let progress = progress.clamp(0.0, 1.0);
    let filled = ((width as f64 * progress).ceil() as u32).min(width);

    let mut frame = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for y in 0..height {
        for x in 0..filled {
            frame.put_pixel(x, y, BAR_COLOR);
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_columns(frame: &AnimatedFrame) -> u32 {
        let rgba = frame.rgba();
        (0..rgba.width())
            .take_while(|&x| rgba.get_pixel(x, 0)[3] != 0)
            .count() as u32
    }

    #[test]
    fn bar_runs_from_empty_to_full() {
        let animation = progress_bar_animation((80, 2), DEFAULT_FRAME_COUNT).unwrap();
        assert_eq!(animation.frame_count(), DEFAULT_FRAME_COUNT);
        assert_eq!(animation.size(), (80, 2));

        let frames = animation.frames();
        assert_eq!(filled_columns(&frames[0]), 0);
        assert_eq!(filled_columns(&frames[frames.len() - 1]), 80);
    }

    #[test]
    fn fill_is_monotonically_non_decreasing() {
        let animation = progress_bar_animation((33, 2), 10).unwrap();
        let widths: Vec<u32> = animation.frames().iter().map(filled_columns).collect();
        assert!(widths.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn total_duration_is_fixed() {
        let animation = progress_bar_animation((80, 2), DEFAULT_FRAME_COUNT).unwrap();
        assert_eq!(animation.total_duration(), Duration::from_secs(10));
    }

    #[test]
    fn tiny_frame_counts_are_bumped_to_two() {
        let animation = progress_bar_animation((10, 2), 0).unwrap();
        assert_eq!(animation.frame_count(), 2);
    }
}
