//! Error types for the gif-watermark crate.

/// Errors that can occur while watermarking an animated GIF.
///
/// An invocation either fully succeeds or returns exactly one of these;
/// nothing is retried inside the core and no partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes are not a valid GIF container, a frame's image data
    /// cannot be decompressed, or a frame region falls outside the logical
    /// screen.
    #[error("malformed GIF input: {0}")]
    MalformedInput(String),

    /// The source GIF decoded successfully but contained zero frames.
    #[error("source GIF contains no frames")]
    EmptyInput,

    /// The watermark image could not be decoded.
    #[error("failed to load watermark image: {0}")]
    AssetLoadFailure(#[source] image::ImageError),

    /// Assembling the output GIF stream failed, or the encoder was
    /// finalized before any frame was added.
    #[error("GIF encoding failed: {0}")]
    EncodingFailure(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
