use anyhow::Context;
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use textmark::config::RenderConfig;
use textmark::encoder::{write_image, OutputFormat, OutputTarget};
use textmark::logging::{LogContext, LogDestination};
use textmark::source::{ImageSource, SourceOptions};
use textmark::watermark::{RenderOptions, TextStyle, Typesetter, WatermarkProcessor};
use textmark::Error;

/// Textmark - render watermark text onto blank canvases, images and PDF pages
#[derive(Parser, Debug)]
#[command(name = "textmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Canvas: WIDTHxHEIGHT, an image file, or a PDF (first page)
    source: String,

    /// Watermark lines, one `directive:text` per line (default/"-": stdin)
    input: Option<PathBuf>,

    /// Output file (default/"-": stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp or tiff
    #[arg(short, long)]
    format: Option<String>,

    /// Text rotation: none, ldiag, rdiag or signed degrees
    #[arg(short, long, allow_hyphen_values = true)]
    rotate: Option<String>,

    /// Final orientation: none, portrait or landscape
    #[arg(short = 'O', long)]
    orientation: Option<String>,

    /// Log file (default: stderr)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Raise verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long)]
    quiet: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font to draw with
    #[arg(long)]
    font: Option<PathBuf>,

    /// PDF rasterization resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Text color as #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Antialiased glyph edges
    #[arg(long)]
    antialias: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // help and version go to stdout and are not failures
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            let _guard = log_context(&args, &RenderConfig::default()).install().ok();
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match log_context(&args, &config).install() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("textmark: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Configuration file values with command-line flags layered on top.
fn load_config(args: &Args) -> anyhow::Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };

    if let Some(font) = &args.font {
        config.font = Some(font.clone());
    }
    if let Some(dpi) = args.dpi {
        config.pdf_dpi = dpi;
    }
    if let Some(color) = &args.color {
        config.color = color.clone();
    }
    if args.antialias {
        config.antialias = true;
    }
    if let Some(format) = &args.format {
        config.format = format.parse::<OutputFormat>()?;
    }
    if let Some(rotate) = &args.rotate {
        config.rotate = rotate.clone();
    }
    if let Some(orientation) = &args.orientation {
        config.orientation = orientation.clone();
    }
    if let Some(log) = &args.log {
        config.log_file = Some(log.clone());
    }

    config.validate()?;
    Ok(config)
}

fn log_context(args: &Args, config: &RenderConfig) -> LogContext {
    let destination = match &config.log_file {
        Some(path) => LogDestination::File(path.clone()),
        None => LogDestination::Stderr,
    };
    let mut context = LogContext::new()
        .with_destination(destination)
        .with_format(config.log_format);
    for _ in 0..args.verbose {
        context.bump_verbosity();
    }
    if args.quiet {
        context.quiet();
    }
    context
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            let file = File::open(p).map_err(|e| Error::io("cannot open input", p, e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(std::io::stdin()))),
    }
}

fn run(args: &Args, config: &RenderConfig) -> anyhow::Result<()> {
    let typesetter = Typesetter::load(config.font.as_deref())?;

    let source_options = SourceOptions {
        pdf_dpi: config.pdf_dpi,
        background: config.background_color()?,
    };
    let (source, canvas) = ImageSource::open(&args.source, &source_options, &typesetter)?;
    tracing::info!(
        source = ?source,
        width = canvas.width(),
        height = canvas.height(),
        "canvas ready"
    );

    let options = RenderOptions {
        rotate: config.rotate.clone(),
        orientation: config.orientation.clone(),
        thresholds: config.thresholds(),
        style: TextStyle {
            color: config.text_color()?,
            antialias: config.antialias,
        },
    };
    let processor = WatermarkProcessor::new(&typesetter, options);

    let reader = open_input(args.input.as_deref())?;
    let Some(image) = processor.render(canvas, reader)? else {
        return Ok(());
    };

    let target = OutputTarget::from_arg(args.output.as_deref());
    write_image(&image, config.format, &target)
        .with_context(|| format!("failed to write {} image", config.format))?;
    Ok(())
}
