//! Persistent-canvas frame compositing.
//!
//! A GIF frame is usually a partial patch over whatever the viewer already
//! sees. [`Canvas`] carries that visible state across the frame loop: for
//! each [`SourceFrame`] it applies the previous frame's disposal, blits the
//! new patch, and hands back a full-size copy ready for watermarking.

use image::RgbaImage;

use crate::decoding::{DisposalMethod, Region, SourceFrame};

/// The persistent compositing surface for one pipeline run.
///
/// Exactly one `Canvas` exists per watermarking invocation and it is owned
/// exclusively by the frame loop. Besides the live pixels it retains a
/// single pre-blit snapshot, which is all the `RestorePrevious` disposal
/// method ever needs.
pub struct Canvas {
    pixels: RgbaImage,
    /// Canvas state captured immediately before the last blit; restored
    /// when that frame's disposal is `RestorePrevious`.
    restore: Option<RgbaImage>,
    /// Region and disposal of the last frame blitted.
    previous: Option<(Region, DisposalMethod)>,
}

impl Canvas {
    /// Create a fully transparent canvas at the logical screen size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            restore: None,
            previous: None,
        }
    }

    /// Composite the next frame and return the full visible bitmap.
    ///
    /// Applies the *previous* frame's disposal (a no-op on the first call),
    /// snapshots the canvas, blits the patch, and returns an owned copy so
    /// later frames cannot retroactively alter what was already emitted.
    pub fn advance(&mut self, frame: &SourceFrame) -> RgbaImage {
        match self.previous {
            Some((_, DisposalMethod::RestorePrevious)) => {
                if let Some(snapshot) = self.restore.take() {
                    self.pixels = snapshot;
                }
            }
            Some((region, DisposalMethod::RestoreBackground)) => {
                self.clear_region(region);
            }
            Some((_, DisposalMethod::Unspecified | DisposalMethod::DoNotDispose)) | None => {}
        }

        self.restore = Some(self.pixels.clone());
        self.blit(frame);
        self.previous = Some((frame.region, frame.disposal));

        self.pixels.clone()
    }

    /// Clear a region to fully transparent pixels.
    fn clear_region(&mut self, region: Region) {
        let x2 = (region.left + region.width).min(self.pixels.width());
        let y2 = (region.top + region.height).min(self.pixels.height());
        for y in region.top..y2 {
            for x in region.left..x2 {
                self.pixels.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
            }
        }
    }

    /// Blit a patch into its region, alpha-aware: source pixels with any
    /// opacity overwrite the destination, fully transparent source pixels
    /// leave the destination unchanged. This reproduces GIF's
    /// non-destructive partial updates.
    fn blit(&mut self, frame: &SourceFrame) {
        let region = frame.region;

        // The decoder validates bounds; clip anyway so a hand-built frame
        // can never index outside the canvas.
        let x2 = (region.left + region.width).min(self.pixels.width());
        let y2 = (region.top + region.height).min(self.pixels.height());

        for dy in 0..y2.saturating_sub(region.top) {
            for dx in 0..x2.saturating_sub(region.left) {
                let idx = (dy as usize * region.width as usize + dx as usize) * 4;
                let src = &frame.patch[idx..idx + 4];
                if src[3] > 0 {
                    self.pixels.put_pixel(
                        region.left + dx,
                        region.top + dy,
                        image::Rgba([src[0], src[1], src[2], src[3]]),
                    );
                }
            }
        }
    }
}
