use clap::Parser;
use rvibrant::{DefaultGenerator, FallbackMode, GeneratorOptions, Palette, Role, Swatch, Vibrant};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Extract a vibrant/muted color palette from an image
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path
    img: PathBuf,

    /// Maximum number of quantized colors
    #[arg(short, long, default_value_t = 64)]
    colors: usize,

    /// Sample every n-th pixel
    #[arg(short, long, default_value_t = 5)]
    quality: usize,

    /// Scale the image down so its longest side is at most this many pixels
    #[arg(short = 'd', long)]
    max_dimension: Option<u32>,

    /// Derive missing roles with the corrected lightness targets
    #[arg(long)]
    corrected_fallback: bool,

    /// Also print every quantized swatch
    #[arg(short, long)]
    swatches: bool,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rvibrant=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rvibrant=warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn describe(swatch: &Swatch) -> String {
    let hsl = swatch.hsl();
    format!(
        "{} rgb({}, {}, {}) hsl({:.0}, {:.0}%, {:.0}%) population {}",
        swatch.hex(),
        swatch.r(),
        swatch.g(),
        swatch.b(),
        hsl.h * 360.0,
        hsl.s * 100.0,
        hsl.l * 100.0,
        swatch.population()
    )
}

fn print_palette(palette: &Palette) {
    for role in Role::ALL {
        match palette.get(role) {
            Some(swatch) => println!("{:<14} {}", role.name(), describe(swatch)),
            None => println!("{:<14} -", role.name()),
        }
    }
}

fn run(args: &Args, path: &Path) -> Result<(), Box<dyn Error>> {
    let fallback = if args.corrected_fallback {
        FallbackMode::Corrected
    } else {
        FallbackMode::Reference
    };
    let mut vibrant = Vibrant::from_path(path)?
        .max_color_count(args.colors)
        .quality(args.quality)
        .use_generator(DefaultGenerator::new(GeneratorOptions {
            fallback,
            ..GeneratorOptions::default()
        }));
    if let Some(d) = args.max_dimension {
        vibrant = vibrant.max_dimension(d);
    }

    let swatches = vibrant.swatches()?;
    print_palette(&vibrant.generate(&swatches));
    if args.swatches {
        println!();
        for swatch in &swatches {
            println!("{}", describe(swatch));
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    if let Err(e) = run(&args, &args.img) {
        eprintln!("{}: {e}", args.img.to_string_lossy());
        std::process::exit(1);
    }
}
