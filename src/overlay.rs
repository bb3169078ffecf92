//! Watermark scaling and alpha blending.
//!
//! The watermark is decoded once per run, scaled to a fraction of the frame
//! width, anchored at the bottom-left corner, and alpha-blended onto each
//! composited frame at partial opacity.

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::{Error, Result};

/// Watermark width as a fraction of the frame width.
pub const WATERMARK_SCALE: f32 = 0.20;

/// Inset from the frame's left and bottom edges, in pixels.
pub const WATERMARK_INSET: u32 = 10;

/// Blending opacity applied to the watermark.
pub const WATERMARK_OPACITY: f32 = 0.5;

/// A decoded watermark bitmap, loaded once per run and shared read-only
/// across all frames.
#[derive(Debug)]
pub struct WatermarkAsset {
    image: RgbaImage,
}

impl WatermarkAsset {
    /// Decode a watermark from raw image bytes (any `image`-supported
    /// format, PNG in practice).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoadFailure`] if the bytes cannot be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(Error::AssetLoadFailure)?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Original watermark dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Scale and position the watermark for frames of the given size.
    ///
    /// Computed once per GIF since all frames share the logical screen size:
    /// target width is `floor(scale * frame_width)`, target height keeps the
    /// watermark's aspect ratio, and the anchor sits `inset` pixels from the
    /// left and bottom edges.
    #[must_use]
    pub fn scaled_for(
        &self,
        frame_width: u32,
        frame_height: u32,
        scale: f32,
        inset: u32,
        opacity: f32,
    ) -> ScaledWatermark {
        let (asset_w, asset_h) = self.image.dimensions();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target_w = ((scale * frame_width as f32).floor() as u32).max(1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target_h = ((target_w as f32 * asset_h as f32 / asset_w as f32).round() as u32).max(1);

        let image = image::imageops::resize(&self.image, target_w, target_h, FilterType::Lanczos3);

        ScaledWatermark {
            image,
            x: inset,
            y: frame_height.saturating_sub(target_h + inset),
            opacity,
        }
    }
}

/// A watermark resized and positioned for one GIF's frame dimensions.
pub struct ScaledWatermark {
    image: RgbaImage,
    x: u32,
    y: u32,
    opacity: f32,
}

impl ScaledWatermark {
    /// Scaled dimensions and anchor position `(width, height, x, y)`.
    #[must_use]
    pub fn geometry(&self) -> (u32, u32, u32, u32) {
        (self.image.width(), self.image.height(), self.x, self.y)
    }

    /// Alpha-blend the watermark onto a frame in-place.
    ///
    /// The per-pixel blend factor is `opacity * src_alpha / 255`, so an
    /// opaque watermark pixel at the default opacity produces
    /// `0.5 * watermark + 0.5 * underlying` per channel, and fully
    /// transparent watermark pixels leave the frame untouched.
    pub fn blend_onto(&self, frame: &mut RgbaImage) {
        let frame_w = frame.width();
        let frame_h = frame.height();

        // Clip to frame bounds
        let x2 = (self.x + self.image.width()).min(frame_w);
        let y2 = (self.y + self.image.height()).min(frame_h);

        if self.x >= x2 || self.y >= y2 {
            return;
        }

        for dy in 0..(y2 - self.y) {
            for dx in 0..(x2 - self.x) {
                let src = self.image.get_pixel(dx, dy);
                let blend = self.opacity * f32::from(src[3]) / 255.0;
                if blend <= 0.0 {
                    continue;
                }

                let dst = frame.get_pixel_mut(self.x + dx, self.y + dy);
                for ch in 0..3 {
                    let over = blend * f32::from(src[ch]) + (1.0 - blend) * f32::from(dst[ch]);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    {
                        dst[ch] = over.clamp(0.0, 255.0) as u8;
                    }
                }
                dst[3] = 255;
            }
        }
    }
}
