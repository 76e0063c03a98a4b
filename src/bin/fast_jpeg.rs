//! fast-jpeg CLI - baseline JPEG encoder command-line utility.
//!
//! Encodes raw interleaved pixel files to JFIF and inspects the marker
//! structure of existing JPEG files.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

use fast_jpeg_encoder::jpeg_stream_reader::JpegStreamReader;
use fast_jpeg_encoder::{
    ChromaSubsampling, DensityUnit, EncoderOptions, HuffmanMode, Jpeg1Encoder, PixelBuffer,
    PixelFormat, ScanLayout,
};

/// Baseline JPEG encoder for raw RGBA, BGRA and RGB pixels
#[derive(Parser)]
#[command(name = "fast-jpeg")]
#[command(version)]
#[command(about = "Baseline JPEG encoder and stream inspector", long_about = None)]
#[command(after_help = "EXAMPLES:
    fast-jpeg encode -i pixels.rgba -o image.jpg -w 640 -H 480 -q 0.85
    fast-jpeg encode -i pixels.rgb -o image.jpg -w 640 -H 480 --format rgb --subsampling 444
    fast-jpeg encode -i pixels.rgba -o gray.jpg -w 64 -H 64 --grayscale --optimize
    fast-jpeg info -i image.jpg --extended")]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw pixels to a baseline JPEG file
    ///
    /// Input must be row-major 8-bit samples without padding between rows.
    #[command(visible_alias = "e")]
    Encode {
        /// Input raw pixel file
        #[arg(short, long, help = "Path to raw pixel data file")]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long, help = "Path for the encoded output file")]
        output: PathBuf,

        /// Image width in pixels
        #[arg(short, long)]
        width: u32,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: u32,

        /// Sample layout of the input file
        #[arg(short, long, default_value = "rgba", value_enum)]
        format: InputFormat,

        /// Quality in [0, 1]
        #[arg(short, long, default_value_t = fast_jpeg_encoder::DEFAULT_QUALITY)]
        quality: f32,

        /// Chroma subsampling
        #[arg(short, long, default_value = "420", value_enum)]
        subsampling: Subsampling,

        /// Write one scan per component instead of one interleaved scan
        #[arg(long)]
        planar: bool,

        /// MCUs between restart markers (0 disables them)
        #[arg(short, long, default_value = "0")]
        restart_interval: u16,

        /// Build Huffman tables from the image statistics
        #[arg(long)]
        optimize: bool,

        /// Emit a single luma component
        #[arg(short, long)]
        grayscale: bool,

        /// Omit the JFIF APP0 segment
        #[arg(long)]
        no_jfif: bool,

        /// Pixel density in dots per inch, written to JFIF
        #[arg(long)]
        dpi: Option<u16>,

        /// Text stored in a COM segment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Display the marker structure of a JPEG file
    #[command(visible_alias = "i")]
    Info {
        /// Input file path
        #[arg(short, long, help = "Path to the JPEG file to inspect")]
        input: PathBuf,

        /// Also list tables and scan segments
        #[arg(short, long)]
        extended: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// 4 bytes per pixel: R, G, B, A
    Rgba,
    /// 4 bytes per pixel: B, G, R, A
    Bgra,
    /// 3 bytes per pixel: R, G, B
    Rgb,
}

impl From<InputFormat> for PixelFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Rgba => PixelFormat::Rgba8,
            InputFormat::Bgra => PixelFormat::Bgra8,
            InputFormat::Rgb => PixelFormat::Rgb8,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Subsampling {
    #[value(name = "444")]
    Yuv444,
    #[value(name = "422")]
    Yuv422,
    #[value(name = "420")]
    Yuv420,
}

impl From<Subsampling> for ChromaSubsampling {
    fn from(value: Subsampling) -> Self {
        match value {
            Subsampling::Yuv444 => ChromaSubsampling::Yuv444,
            Subsampling::Yuv422 => ChromaSubsampling::Yuv422,
            Subsampling::Yuv420 => ChromaSubsampling::Yuv420,
        }
    }
}

fn log_level(verbose: bool) -> tracing::Level {
    if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            format,
            quality,
            subsampling,
            planar,
            restart_interval,
            optimize,
            grayscale,
            no_jfif,
            dpi,
            comment,
        } => {
            let mut options = EncoderOptions::default()
                .quality(quality)
                .subsampling(subsampling.into())
                .restart_interval(restart_interval)
                .grayscale(grayscale);
            if planar {
                options = options.scan_layout(ScanLayout::Planar);
            }
            if optimize {
                options = options.huffman_mode(HuffmanMode::Optimized);
            }
            if let Some(dpi) = dpi {
                options = options.density(DensityUnit::DotsPerInch, dpi, dpi);
            }
            if no_jfif {
                options = options.jfif(false);
            }
            if let Some(comment) = comment {
                options = options.comment(comment);
            }
            encode_image(&input, &output, width, height, format.into(), options)
        }
        Commands::Info { input, extended } => show_info(&input, extended),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn encode_image(
    input: &PathBuf,
    output: &PathBuf,
    width: u32,
    height: u32,
    format: PixelFormat,
    options: EncoderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pixels = fs::read(input)?;
    let buffer = PixelBuffer::with_format(width, height, format, &pixels)?;
    let encoded = Jpeg1Encoder::new(options).encode(&buffer)?;
    fs::write(output, &encoded)?;

    println!(
        "✓ Encoded {}x{} image to {:?} ({} bytes, {:.2} bits/pixel)",
        width,
        height,
        output,
        encoded.len(),
        encoded.len() as f64 * 8.0 / (width as f64 * height as f64)
    );
    Ok(())
}

fn show_info(input: &PathBuf, extended: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();

    let info = JpegStreamReader::read(&data)?;
    if let Some(frame) = &info.frame {
        println!("Format: JPEG 1 ({:?})", frame.marker);
        println!("  Dimensions: {}x{}", frame.width, frame.height);
        println!("  Bit depth:  {} bits", frame.precision);
        println!("  Components: {}", frame.components.len());
        for component in &frame.components {
            println!(
                "    #{}: sampling {}x{}, quant table {}",
                component.id,
                component.horizontal_sampling,
                component.vertical_sampling,
                component.quant_table
            );
        }
    } else {
        println!("Format: JPEG (no frame header)");
    }
    if let Some(jfif) = &info.jfif {
        println!(
            "  JFIF:       v{}.{:02}, density {}x{} (unit {})",
            jfif.version[0], jfif.version[1], jfif.x_density, jfif.y_density, jfif.unit
        );
    }
    for comment in &info.comments {
        println!("  Comment:    {}", String::from_utf8_lossy(comment));
    }
    println!("  Scans:      {}", info.scans.len());
    if info.restart_interval > 0 {
        println!("  Restart:    every {} MCUs", info.restart_interval);
    }
    if !info.end_of_image {
        println!("  Warning:    missing EOI marker");
    }

    if extended {
        println!();
        for table in &info.quantization_tables {
            println!("  DQT {}: {:?}", table.id, &table.values[..8]);
        }
        for table in &info.huffman_tables {
            let class = if table.class == 0 { "DC" } else { "AC" };
            println!("  DHT {} {}: {} symbols", class, table.id, table.values.len());
        }
        for (index, scan) in info.scans.iter().enumerate() {
            let ids: Vec<u8> = scan.selectors.iter().map(|s| s.0).collect();
            println!(
                "  SOS {}: components {:?}, {} bytes, {} restart markers",
                index,
                ids,
                scan.data.len(),
                scan.restart_markers.len()
            );
        }
    }
    Ok(())
}
