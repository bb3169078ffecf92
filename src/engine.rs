//! Watermarking pipeline driver.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::compositing::Canvas;
use crate::decoding;
use crate::encoding::{GifAssembler, QUANTIZATION_SPEED};
use crate::error::{Error, Result};
use crate::overlay::{WatermarkAsset, WATERMARK_INSET, WATERMARK_OPACITY, WATERMARK_SCALE};

/// Options controlling watermark rendering and output encoding.
///
/// The defaults are the crate's documented constants; override them per
/// engine when a caller needs a different look or encode speed.
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Watermark width as a fraction of the frame width (default 0.20).
    pub scale: f32,
    /// Inset from the left and bottom frame edges in pixels (default 10).
    pub inset: u32,
    /// Watermark blending opacity in `[0, 1]` (default 0.5).
    pub opacity: f32,
    /// Quantization speed, 1 (best) to 30 (fastest), default 10.
    pub speed: i32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            scale: WATERMARK_SCALE,
            inset: WATERMARK_INSET,
            opacity: WATERMARK_OPACITY,
            speed: QUANTIZATION_SPEED,
        }
    }
}

/// Result of processing a single GIF file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// The watermarking engine holding the decoded watermark asset.
///
/// Create once with [`WatermarkEngine::from_bytes`] and reuse across GIFs;
/// the asset is decoded a single time and only ever read. Every call to
/// [`WatermarkEngine::watermark_gif`] builds its own canvas and encoder, so
/// independent GIFs may be processed concurrently from a shared engine.
pub struct WatermarkEngine {
    asset: WatermarkAsset,
    options: WatermarkOptions,
}

impl WatermarkEngine {
    /// Create an engine from raw watermark image bytes with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoadFailure`] if the bytes cannot be decoded.
    pub fn from_bytes(watermark_bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            asset: WatermarkAsset::from_bytes(watermark_bytes)?,
            options: WatermarkOptions::default(),
        })
    }

    /// Create an engine with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoadFailure`] if the bytes cannot be decoded.
    pub fn with_options(watermark_bytes: &[u8], options: WatermarkOptions) -> Result<Self> {
        Ok(Self {
            asset: WatermarkAsset::from_bytes(watermark_bytes)?,
            options,
        })
    }

    /// Watermark one animated GIF.
    ///
    /// Runs decode, composite, overlay, and encode strictly in sequence,
    /// one frame at a time; a rendered frame is handed to the encoder
    /// before the next frame's compositing begins. The call fails as a
    /// single unit and never returns partial output.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] for an undecodable stream,
    /// [`Error::EmptyInput`] if the stream decodes to zero frames, and
    /// [`Error::EncodingFailure`] if output assembly fails.
    pub fn watermark_gif(&self, gif_bytes: &[u8]) -> Result<Vec<u8>> {
        let source = decoding::decode_gif(gif_bytes)?;
        if source.frames.is_empty() {
            return Err(Error::EmptyInput);
        }

        // Frame dimensions are constant per GIF; scale the asset once.
        let watermark = self.asset.scaled_for(
            source.width,
            source.height,
            self.options.scale,
            self.options.inset,
            self.options.opacity,
        );

        let mut canvas = Canvas::new(source.width, source.height);
        let mut assembler = GifAssembler::new(source.width, source.height, self.options.speed)?;

        for frame in &source.frames {
            let mut rendered = canvas.advance(frame);
            watermark.blend_onto(&mut rendered);
            assembler.push_frame(&rendered, frame.delay_centis)?;
        }

        assembler.finish()
    }

    /// Process a single GIF file: read, watermark, write.
    ///
    /// Returns a [`ProcessResult`] rather than an error so batch runs can
    /// report per-file outcomes.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            message: String::new(),
        };

        let gif_bytes = match std::fs::read(input) {
            Ok(b) => b,
            Err(e) => {
                result.message = format!("Failed to read: {e}");
                return result;
            }
        };

        let encoded = match self.watermark_gif(&gif_bytes) {
            Ok(b) => b,
            Err(e) => {
                result.message = format!("Failed to watermark: {e}");
                return result;
            }
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match std::fs::write(output, &encoded) {
            Ok(()) => {
                result.success = true;
                result.message = "Watermarked".to_string();
            }
            Err(e) => {
                result.message = format!("Failed to write: {e}");
            }
        }

        result
    }

    /// Process all GIF files in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via
    /// rayon); GIFs are independent invocations, so only whole pipelines
    /// run in parallel, never stages within one.
    ///
    /// # Panics
    ///
    /// Panics if any directory entry has no filename (should not happen for
    /// regular files).
    #[must_use]
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_gif_path(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    self.process_file(&input_path, &output_dir.join(filename))
                })
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|entry| {
                    let input_path = entry.path();
                    let filename = input_path.file_name().unwrap();
                    self.process_file(&input_path, &output_dir.join(filename))
                })
                .collect()
        }
    }
}

/// Watermark a GIF in one call: the core entry point.
///
/// Decodes the watermark, runs the full pipeline with default options, and
/// returns the new animated GIF bytes.
///
/// # Errors
///
/// Any of [`Error::MalformedInput`], [`Error::EmptyInput`],
/// [`Error::AssetLoadFailure`], or [`Error::EncodingFailure`].
pub fn watermark(gif_bytes: &[u8], watermark_bytes: &[u8]) -> Result<Vec<u8>> {
    WatermarkEngine::from_bytes(watermark_bytes)?.watermark_gif(gif_bytes)
}

/// Encode GIF bytes as a `data:image/gif;base64,...` URL for transports
/// that deliver the result inline.
#[must_use]
pub fn to_data_url(gif_bytes: &[u8]) -> String {
    format!("data:image/gif;base64,{}", BASE64.encode(gif_bytes))
}

/// Check if a file has a GIF extension.
#[must_use]
pub fn is_gif_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// Generate a default output path from an input path.
///
/// Example: `"dance.gif"` becomes `"dance_watermarked.gif"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_watermarked.{ext}"))
}
