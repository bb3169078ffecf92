//! Overlay a watermark onto animated GIFs.
//!
//! Re-encodes an existing animated GIF with a watermark burned into every
//! frame. The pipeline decodes the source frame stream (including
//! inter-frame disposal and partial-region patches), reconstructs each full
//! frame on a persistent canvas, alpha-blends a scaled watermark at the
//! bottom-left corner, and assembles a new looping GIF, preserving every
//! frame's delay.
//!
//! # Quick Start
//!
//! ```no_run
//! let gif = std::fs::read("dance.gif").unwrap();
//! let logo = std::fs::read("watermark.png").unwrap();
//!
//! let output = gif_watermark::watermark(&gif, &logo).expect("watermarking failed");
//! std::fs::write("dance_watermarked.gif", output).unwrap();
//! ```
//!
//! # Reusing the engine
//!
//! Decoding the watermark once and reusing it across GIFs:
//!
//! ```no_run
//! use gif_watermark::{WatermarkEngine, WatermarkOptions};
//!
//! let logo = std::fs::read("watermark.png").unwrap();
//! let engine = WatermarkEngine::with_options(
//!     &logo,
//!     WatermarkOptions {
//!         opacity: 0.35,
//!         ..WatermarkOptions::default()
//!     },
//! )
//! .expect("failed to load watermark");
//!
//! let gif = std::fs::read("dance.gif").unwrap();
//! let output = engine.watermark_gif(&gif).unwrap();
//! ```

#![deny(missing_docs)]

pub mod compositing;
pub mod decoding;
pub mod encoding;
mod engine;
pub mod error;
pub mod overlay;

pub use engine::{
    default_output_path, is_gif_path, to_data_url, watermark, ProcessResult, WatermarkEngine,
    WatermarkOptions,
};
pub use error::{Error, Result};
