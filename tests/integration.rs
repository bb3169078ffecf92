use gif_watermark::{watermark, Error, WatermarkEngine, WatermarkOptions};
use image::RgbaImage;

/// A frame spec for building synthetic source GIFs with exact pixels:
/// a solid patch of one palette color at a given region.
struct TestFrame {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    color_index: u8,
    delay: u16,
    dispose: gif::DisposalMethod,
}

impl TestFrame {
    fn full(width: u16, height: u16, color_index: u8, delay: u16) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            color_index,
            delay,
            dispose: gif::DisposalMethod::Keep,
        }
    }

    fn dispose(mut self, dispose: gif::DisposalMethod) -> Self {
        self.dispose = dispose;
        self
    }
}

/// Encode a GIF with an explicit global palette so decoded pixels are exact.
fn build_gif(width: u16, height: u16, palette: &[u8], frames: &[TestFrame]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, palette).unwrap();
        for f in frames {
            let frame = gif::Frame {
                left: f.left,
                top: f.top,
                width: f.width,
                height: f.height,
                buffer: std::borrow::Cow::Owned(vec![
                    f.color_index;
                    usize::from(f.width) * usize::from(f.height)
                ]),
                delay: f.delay,
                dispose: f.dispose,
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }
    out
}

/// A GIF that is structurally valid but carries zero frames.
fn zero_frame_gif() -> Vec<u8> {
    let encoder = gif::Encoder::new(Vec::new(), 10, 10, &[]).unwrap();
    encoder.into_inner().unwrap()
}

fn watermark_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Decode output and return `(width, height, per-frame RGBA bitmaps, delays)`
/// with full compositing, so assertions see what a viewer would see.
fn decode_composited(bytes: &[u8]) -> (u32, u32, Vec<RgbaImage>, Vec<u16>) {
    let decoded = gif_watermark::decoding::decode_gif(bytes).unwrap();
    let mut canvas = gif_watermark::compositing::Canvas::new(decoded.width, decoded.height);
    let mut frames = Vec::new();
    let mut delays = Vec::new();
    for f in &decoded.frames {
        frames.push(canvas.advance(f));
        delays.push(f.delay_centis);
    }
    (decoded.width, decoded.height, frames, delays)
}

/// Quantization shifts colors slightly; compare with a generous margin.
fn close_to(pixel: &image::Rgba<u8>, expected: [u8; 3], tolerance: i32) -> bool {
    (0..3).all(|ch| (i32::from(pixel[ch]) - i32::from(expected[ch])).abs() <= tolerance)
}

const RED: [u8; 3] = [200, 0, 0];
const GREEN: [u8; 3] = [0, 200, 0];
const BLUE: [u8; 3] = [0, 0, 200];

fn rgb_palette() -> Vec<u8> {
    vec![200, 0, 0, 0, 200, 0, 0, 0, 200]
}

#[test]
fn single_frame_gif_preserves_delay() {
    let source = build_gif(40, 30, &rgb_palette(), &[TestFrame::full(40, 30, 0, 37)]);
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);

    let output = watermark(&source, &logo).unwrap();
    let (w, h, frames, delays) = decode_composited(&output);

    assert_eq!((w, h), (40, 30));
    assert_eq!(frames.len(), 1);
    assert_eq!(delays, vec![37]);
}

#[test]
fn output_round_trip_preserves_frame_count_and_delay_sequence() {
    let source = build_gif(
        32,
        32,
        &rgb_palette(),
        &[
            TestFrame::full(32, 32, 0, 0),
            TestFrame::full(32, 32, 1, 5),
            TestFrame::full(32, 32, 2, 10),
            TestFrame::full(32, 32, 0, 300),
        ],
    );
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);

    let output = watermark(&source, &logo).unwrap();
    let (_, _, frames, delays) = decode_composited(&output);

    assert_eq!(frames.len(), 4);
    assert_eq!(delays, vec![0, 5, 10, 300]);
}

#[test]
fn restore_previous_reverts_to_state_two_frames_prior() {
    // Frame 2 covers everything but disposes to "previous", so frame 3's
    // pixels outside its own small patch must match frame 1, not frame 2.
    let source = build_gif(
        64,
        64,
        &rgb_palette(),
        &[
            TestFrame::full(64, 64, 0, 10),
            TestFrame::full(64, 64, 1, 10).dispose(gif::DisposalMethod::Previous),
            TestFrame {
                left: 0,
                top: 0,
                width: 8,
                height: 8,
                color_index: 2,
                delay: 10,
                dispose: gif::DisposalMethod::Keep,
            },
        ],
    );
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);

    let output = watermark(&source, &logo).unwrap();
    let (_, _, frames, _) = decode_composited(&output);
    assert_eq!(frames.len(), 3);

    // Top-right corner: inside frame 1 and 2, outside frame 3's patch and
    // far from the bottom-left watermark.
    let probe = frames[2].get_pixel(60, 4);
    assert!(
        close_to(probe, RED, 60),
        "expected the first frame's color, got {probe:?}"
    );
    assert!(!close_to(probe, GREEN, 60));

    // Frame 3's own patch is intact.
    assert!(close_to(frames[2].get_pixel(4, 4), BLUE, 60));
}

#[test]
fn three_frame_end_to_end_scenario() {
    // 3-frame 100x80 GIF, delays [10,10,10], disposal
    // [Unspecified, DoNotDispose, RestoreBackground], 50x50 opaque watermark.
    let source = build_gif(
        100,
        80,
        &rgb_palette(),
        &[
            TestFrame::full(100, 80, 0, 10).dispose(gif::DisposalMethod::Any),
            TestFrame::full(100, 80, 1, 10).dispose(gif::DisposalMethod::Keep),
            TestFrame::full(100, 80, 2, 10).dispose(gif::DisposalMethod::Background),
        ],
    );
    let logo = watermark_png(50, 50, [255, 255, 255, 255]);

    let output = watermark(&source, &logo).unwrap();
    let (w, h, frames, delays) = decode_composited(&output);

    assert_eq!((w, h), (100, 80));
    assert_eq!(frames.len(), 3);
    assert_eq!(delays, vec![10, 10, 10]);

    // Watermark geometry: width floor(0.20*100)=20, square logo so height
    // 20, anchored 10px from the left and bottom edges.
    // Inside the watermark every frame is a 50/50 blend with white.
    let expected_blends = [[227, 127, 127], [127, 227, 127], [127, 127, 227]];
    for (frame, expected) in frames.iter().zip(expected_blends) {
        let inside = frame.get_pixel(20, 60); // center of the 10..30 x 50..70 box
        assert!(
            close_to(inside, expected, 60),
            "expected blended watermark pixel, got {inside:?}"
        );
    }

    // Outside the watermark box each frame keeps its own solid color.
    let solids = [RED, GREEN, BLUE];
    for (frame, expected) in frames.iter().zip(solids) {
        let outside = frame.get_pixel(80, 10);
        assert!(
            close_to(outside, expected, 60),
            "expected untouched frame pixel, got {outside:?}"
        );
    }
}

#[test]
fn empty_bytes_fail_with_malformed_input() {
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);
    let err = watermark(&[], &logo).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn zero_frame_gif_fails_with_empty_input() {
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);
    let err = watermark(&zero_frame_gif(), &logo).unwrap_err();
    assert!(matches!(err, Error::EmptyInput));
}

#[test]
fn unreadable_watermark_fails_with_asset_load_failure() {
    let source = build_gif(16, 16, &rgb_palette(), &[TestFrame::full(16, 16, 0, 10)]);
    let err = watermark(&source, b"definitely not an image").unwrap_err();
    assert!(matches!(err, Error::AssetLoadFailure(_)));
}

#[test]
fn engine_is_reusable_across_gifs() {
    let logo = watermark_png(8, 8, [255, 255, 255, 255]);
    let engine = WatermarkEngine::from_bytes(&logo).unwrap();

    let a = build_gif(20, 20, &rgb_palette(), &[TestFrame::full(20, 20, 0, 4)]);
    let b = build_gif(48, 32, &rgb_palette(), &[TestFrame::full(48, 32, 1, 8)]);

    let out_a = engine.watermark_gif(&a).unwrap();
    let out_b = engine.watermark_gif(&b).unwrap();

    let (wa, ha, _, _) = decode_composited(&out_a);
    let (wb, hb, _, _) = decode_composited(&out_b);
    assert_eq!((wa, ha), (20, 20));
    assert_eq!((wb, hb), (48, 32));
}

#[test]
fn custom_opacity_changes_the_blend() {
    let source = build_gif(100, 100, &rgb_palette(), &[TestFrame::full(100, 100, 0, 10)]);
    let logo = watermark_png(10, 10, [255, 255, 255, 255]);

    let engine = WatermarkEngine::with_options(
        &logo,
        WatermarkOptions {
            opacity: 1.0,
            ..WatermarkOptions::default()
        },
    )
    .unwrap();

    let output = engine.watermark_gif(&source).unwrap();
    let (_, _, frames, _) = decode_composited(&output);

    // Full opacity replaces the underlying pixel with the white logo.
    let inside = frames[0].get_pixel(20, 80);
    assert!(
        close_to(inside, [255, 255, 255], 60),
        "expected near-white pixel, got {inside:?}"
    );
}
