//! Animated-GIF output assembly.
//!
//! Accepts finished full-size RGBA frames one at a time and assembles a
//! single looping GIF byte stream. Frames are quantized individually at a
//! fixed speed setting; transparency is baked into the pixels upstream, so
//! the output stream never carries a transparent color index.

use image::RgbaImage;

use crate::error::{Error, Result};

/// Quantization speed passed to the encoder (1 = best quality, 30 =
/// fastest). The default favors speed over fidelity.
pub const QUANTIZATION_SPEED: i32 = 10;

/// Streaming assembler for the output GIF.
///
/// Create one per pipeline run, push each rendered frame with its own
/// delay, then call [`GifAssembler::finish`] to obtain the byte stream.
/// The output always loops forever (repeat count 0).
pub struct GifAssembler {
    encoder: gif::Encoder<Vec<u8>>,
    width: u16,
    height: u16,
    speed: i32,
    frames_written: usize,
}

impl std::fmt::Debug for GifAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifAssembler")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("speed", &self.speed)
            .field("frames_written", &self.frames_written)
            .finish_non_exhaustive()
    }
}

impl GifAssembler {
    /// Open an assembler for frames of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodingFailure`] if the dimensions exceed the GIF
    /// format's 16-bit limit or the stream header cannot be written.
    pub fn new(width: u32, height: u32, speed: i32) -> Result<Self> {
        let width = u16::try_from(width)
            .map_err(|_| Error::EncodingFailure(format!("output width {width} exceeds u16")))?;
        let height = u16::try_from(height)
            .map_err(|_| Error::EncodingFailure(format!("output height {height} exceeds u16")))?;

        let mut encoder = gif::Encoder::new(Vec::new(), width, height, &[])
            .map_err(|e| Error::EncodingFailure(e.to_string()))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| Error::EncodingFailure(e.to_string()))?;

        Ok(Self {
            encoder,
            width,
            height,
            speed: speed.clamp(1, 30),
            frames_written: 0,
        })
    }

    /// Quantize and append one frame with its own delay in centiseconds.
    ///
    /// The frame must match the assembler's dimensions. Its alpha channel is
    /// flattened to opaque before quantization, so no transparent slot is
    /// allocated in the output palette.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodingFailure`] if the frame dimensions do not
    /// match or the codec fails to write.
    pub fn push_frame(&mut self, frame: &RgbaImage, delay_centis: u16) -> Result<()> {
        if frame.width() != u32::from(self.width) || frame.height() != u32::from(self.height) {
            return Err(Error::EncodingFailure(format!(
                "frame is {}x{}, assembler expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            )));
        }

        let mut pixels = frame.as_raw().clone();
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }

        let mut out = gif::Frame::from_rgba_speed(self.width, self.height, &mut pixels, self.speed);
        out.delay = delay_centis;
        out.dispose = gif::DisposalMethod::Keep;

        self.encoder
            .write_frame(&out)
            .map_err(|e| Error::EncodingFailure(e.to_string()))?;
        self.frames_written += 1;
        Ok(())
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Write the trailer and return the finished byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodingFailure`] if no frame was ever pushed or
    /// the trailer cannot be written.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.frames_written == 0 {
            return Err(Error::EncodingFailure(
                "no frames were added before finalization".to_string(),
            ));
        }
        self.encoder
            .into_inner()
            .map_err(|e| Error::EncodingFailure(e.to_string()))
    }
}
