use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use gif_watermark::{
    default_output_path, to_data_url, ProcessResult, WatermarkEngine, WatermarkOptions,
};

#[derive(Parser)]
#[command(
    name = "gif-watermark",
    about = "Overlay a watermark onto animated GIFs",
    version,
    after_help = "Simple usage: gif-watermark clip.gif -w logo.png\n\n\
                  The watermark is scaled to 20% of the frame width and blended\n\
                  at 50% opacity in the bottom-left corner, 10px from the edges."
)]
struct Cli {
    /// Input GIF file or directory
    input: String,

    /// Watermark image file (PNG or any common raster format)
    #[arg(short, long)]
    watermark: String,

    /// Output file or directory (default: {name}_watermarked.gif)
    #[arg(short, long)]
    output: Option<String>,

    /// Watermark width as a fraction of the frame width
    #[arg(long, default_value = "0.20")]
    scale: f32,

    /// Watermark blending opacity (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    opacity: f32,

    /// Inset from the left and bottom edges in pixels
    #[arg(long, default_value = "10")]
    inset: u32,

    /// Quantization speed: 1 (best quality) to 30 (fastest)
    #[arg(long, default_value = "10")]
    speed: i32,

    /// Print a base64 data URL to stdout instead of writing a file
    /// (single-file mode only)
    #[arg(long)]
    data_url: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.opacity) {
        eprintln!("Error: Opacity must be between 0.0 and 1.0");
        process::exit(1);
    }

    if !(0.0..=1.0).contains(&cli.scale) || cli.scale == 0.0 {
        eprintln!("Error: Scale must be greater than 0.0 and at most 1.0");
        process::exit(1);
    }

    if !(1..=30).contains(&cli.speed) {
        eprintln!("Error: Speed must be between 1 and 30");
        process::exit(1);
    }

    let watermark_bytes = match std::fs::read(&cli.watermark) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: Failed to read watermark {}: {e}", cli.watermark);
            process::exit(1);
        }
    };

    let options = WatermarkOptions {
        scale: cli.scale,
        inset: cli.inset,
        opacity: cli.opacity,
        speed: cli.speed,
    };

    let engine = match WatermarkEngine::with_options(&watermark_bytes, options) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Fatal: Failed to load watermark: {e}");
            process::exit(1);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if cli.data_url {
        if input_path.is_dir() {
            eprintln!("Error: --data-url is only available for a single file");
            process::exit(1);
        }
        let gif_bytes = match std::fs::read(input_path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error: Failed to read {}: {e}", cli.input);
                process::exit(1);
            }
        };
        match engine.watermark_gif(&gif_bytes) {
            Ok(out) => println!("{}", to_data_url(&out)),
            Err(e) => {
                eprintln!("[FAIL] {}: {e}", cli.input);
                process::exit(1);
            }
        }
        return;
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: gif-watermark <input_dir> -w <watermark> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &output_path)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, cli.quiet);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, quiet: bool) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !quiet {
            eprintln!("[OK] {filename}");
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}
