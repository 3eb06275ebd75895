use thiserror::Error;

/// Errors produced inside the fetch pipeline.
///
/// At the delivery boundary these all collapse into a `None` result; the
/// variants exist for the library-internal seams and the log output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network fetch failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote returned an empty body")]
    EmptyBody,

    #[error("could not decode image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("could not encode animation: {0}")]
    Encode(image::ImageError),

    #[error("animation must contain at least one frame")]
    NoFrames,
}
