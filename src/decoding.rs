//! Animated-GIF frame decoding.
//!
//! Expands a raw GIF byte stream into an ordered sequence of [`SourceFrame`]
//! records: the RGBA patch for each frame, the region it covers on the
//! logical screen, its delay, and its disposal method. Compositing the
//! patches into full frames is the job of [`crate::compositing`].

use crate::error::{Error, Result};

/// How the canvas must be treated once a frame's display time has elapsed,
/// before the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// No disposal specified; treated the same as [`DisposalMethod::DoNotDispose`].
    #[default]
    Unspecified,
    /// Leave the frame in place; the next frame draws over it.
    DoNotDispose,
    /// Clear the frame's region to transparent before the next frame.
    RestoreBackground,
    /// Restore the canvas to its state before this frame was drawn.
    RestorePrevious,
}

impl From<gif::DisposalMethod> for DisposalMethod {
    fn from(dispose: gif::DisposalMethod) -> Self {
        match dispose {
            gif::DisposalMethod::Any => DisposalMethod::Unspecified,
            gif::DisposalMethod::Keep => DisposalMethod::DoNotDispose,
            gif::DisposalMethod::Background => DisposalMethod::RestoreBackground,
            gif::DisposalMethod::Previous => DisposalMethod::RestorePrevious,
        }
    }
}

/// The sub-rectangle of the logical screen a frame's patch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X offset of the patch on the logical screen.
    pub left: u32,
    /// Y offset of the patch on the logical screen.
    pub top: u32,
    /// Patch width in pixels.
    pub width: u32,
    /// Patch height in pixels.
    pub height: u32,
}

/// One decoded frame of the source GIF, before compositing.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// RGBA pixel data covering exactly `region`, row-major,
    /// `region.width * region.height * 4` bytes.
    pub patch: Vec<u8>,
    /// Where the patch lands on the logical screen.
    pub region: Region,
    /// Frame delay in centiseconds (1/100th second), exactly as stored.
    pub delay_centis: u16,
    /// Disposal method to apply after this frame's display time.
    pub disposal: DisposalMethod,
}

/// A fully decoded source GIF: logical screen dimensions plus all frames
/// in display order.
#[derive(Debug, Clone)]
pub struct DecodedGif {
    /// Logical screen width in pixels.
    pub width: u32,
    /// Logical screen height in pixels.
    pub height: u32,
    /// Frames in display order. May be empty for a degenerate stream that
    /// carries a header but no image data.
    pub frames: Vec<SourceFrame>,
}

/// Decode a GIF byte stream into its frame sequence.
///
/// Per-frame delays are preserved exactly; disposal codes outside the four
/// canonical values are normalized to [`DisposalMethod::Unspecified`].
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the bytes are not a valid GIF
/// container, a frame fails to decompress, or a frame's region exceeds the
/// logical screen. Out-of-bounds regions are rejected rather than clipped
/// so a corrupt stream can never silently produce a corrupt composite.
pub fn decode_gif(bytes: &[u8]) -> Result<DecodedGif> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);

    let mut decoder = options
        .read_info(bytes)
        .map_err(|e| Error::MalformedInput(e.to_string()))?;

    let width = u32::from(decoder.width());
    let height = u32::from(decoder.height());

    let mut frames = Vec::new();
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| Error::MalformedInput(e.to_string()))?
    {
        let region = Region {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: u32::from(frame.width),
            height: u32::from(frame.height),
        };

        if region.left + region.width > width || region.top + region.height > height {
            return Err(Error::MalformedInput(format!(
                "frame {} region {}x{}+{}+{} exceeds logical screen {width}x{height}",
                frames.len(),
                region.width,
                region.height,
                region.left,
                region.top,
            )));
        }

        let expected = region.width as usize * region.height as usize * 4;
        if frame.buffer.len() != expected {
            return Err(Error::MalformedInput(format!(
                "frame {} patch has {} bytes, expected {expected}",
                frames.len(),
                frame.buffer.len(),
            )));
        }

        frames.push(SourceFrame {
            patch: frame.buffer.to_vec(),
            region,
            delay_centis: frame.delay,
            disposal: frame.dispose.into(),
        });
    }

    Ok(DecodedGif {
        width,
        height,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal GIF with an explicit 2-color palette so decoded
    /// pixels are exact, with per-frame (delay, dispose) settings.
    fn sample_gif(frames: &[(u16, gif::DisposalMethod)]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let palette = &[0, 0, 0, 255, 255, 255];
            let mut encoder = gif::Encoder::new(&mut out, 4, 4, palette).unwrap();
            for &(delay, dispose) in frames {
                let frame = gif::Frame {
                    width: 4,
                    height: 4,
                    buffer: std::borrow::Cow::Owned(vec![1u8; 16]),
                    delay,
                    dispose,
                    ..gif::Frame::default()
                };
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn empty_bytes_are_malformed() {
        let err = decode_gif(&[]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = decode_gif(b"certainly not a GIF stream").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn truncated_stream_is_malformed() {
        let full = sample_gif(&[(10, gif::DisposalMethod::Keep)]);
        let err = decode_gif(&full[..full.len() / 2]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn delays_are_preserved_exactly() {
        let bytes = sample_gif(&[
            (7, gif::DisposalMethod::Any),
            (0, gif::DisposalMethod::Keep),
            (65535, gif::DisposalMethod::Background),
        ]);
        let decoded = decode_gif(&bytes).unwrap();
        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 4);
        let delays: Vec<u16> = decoded.frames.iter().map(|f| f.delay_centis).collect();
        assert_eq!(delays, vec![7, 0, 65535]);
    }

    #[test]
    fn disposal_methods_map_to_canonical_values() {
        let bytes = sample_gif(&[
            (1, gif::DisposalMethod::Any),
            (1, gif::DisposalMethod::Keep),
            (1, gif::DisposalMethod::Background),
            (1, gif::DisposalMethod::Previous),
        ]);
        let decoded = decode_gif(&bytes).unwrap();
        let disposals: Vec<DisposalMethod> = decoded.frames.iter().map(|f| f.disposal).collect();
        assert_eq!(
            disposals,
            vec![
                DisposalMethod::Unspecified,
                DisposalMethod::DoNotDispose,
                DisposalMethod::RestoreBackground,
                DisposalMethod::RestorePrevious,
            ]
        );
    }

    #[test]
    fn patch_is_rgba_sized() {
        let bytes = sample_gif(&[(2, gif::DisposalMethod::Keep)]);
        let decoded = decode_gif(&bytes).unwrap();
        let frame = &decoded.frames[0];
        assert_eq!(
            frame.patch.len(),
            (frame.region.width * frame.region.height * 4) as usize
        );
        // Palette index 1 is white and fully opaque after RGBA expansion.
        assert_eq!(&frame.patch[..4], &[255, 255, 255, 255]);
    }
}
