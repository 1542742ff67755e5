//! # Needlepoint CLI
//!
//! Command-line front end for the ESC/P printer emulator.
//!
//! ## Usage
//!
//! ```bash
//! # Print a captured LPT stream; pages land in ./printer
//! needlepoint print job.prn
//!
//! # Custom output directory and file prefix
//! needlepoint print job.prn --out pages --prefix invoice
//!
//! # No TrueType fonts available: use the built-in bitmap face
//! needlepoint print job.prn --builtin-font
//!
//! # Load device settings from JSON
//! needlepoint print job.prn --config lq850.json
//!
//! # Show the bit-image density table
//! needlepoint densities
//! ```
//!
//! Set `RUST_LOG=debug` (or `trace`) to follow the interpreter.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use needlepoint::{
    EscpPrinter, NeedlepointError, PrinterConfig,
    font::{GlyphRasterizer, SpleenRasterizer, TtfRasterizer},
    port::{Control, LptDevice},
    protocol::density::DENSITIES,
    spool::FileSpooler,
};

/// Needlepoint - ESC/P dot-matrix printer emulator
#[derive(Parser, Debug)]
#[command(name = "needlepoint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a printer byte stream through the emulator
    Print {
        /// File with raw printer data
        input: PathBuf,

        /// Directory for page images
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// JSON device configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory holding the TrueType faces
        #[arg(long, value_name = "DIR")]
        font_dir: Option<PathBuf>,

        /// Use the built-in bitmap face instead of TrueType files
        #[arg(long)]
        builtin_font: bool,

        /// Page image file name prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// List supported bit-image densities
    Densities {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), NeedlepointError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            input,
            out,
            config,
            font_dir,
            builtin_font,
            prefix,
        } => {
            let mut config = match config {
                Some(path) => PrinterConfig::from_json_file(&path)?,
                None => PrinterConfig::default(),
            };
            if let Some(dir) = out {
                config.output_dir = dir;
            }
            if let Some(dir) = font_dir {
                config.font_dir = dir;
            }
            if let Some(prefix) = prefix {
                config.file_prefix = prefix;
            }

            let data = std::fs::read(&input)?;
            println!("Printing {} ({} bytes)...", input.display(), data.len());

            let pages = print_stream(config, &data, builtin_font)?;
            println!("{} page(s) written", pages.len());
            for page in pages {
                println!("  {}", page.display());
            }
        }

        Commands::Densities { json } => {
            if json {
                let text = serde_json::to_string_pretty(&DENSITIES[..])
                    .map_err(|e| NeedlepointError::Encode(e.to_string()))?;
                println!("{}", text);
                return Ok(());
            }

            println!("{:>4}  {:>5}  {:>5}  {:>9}  adjacent", "code", "h dpi", "v dpi", "bytes/col");
            for d in DENSITIES.iter() {
                println!(
                    "{:>4}  {:>5}  {:>5}  {:>9}  {}",
                    d.code,
                    d.h_density,
                    d.v_density,
                    d.bytes_per_column,
                    if d.adjacent { "yes" } else { "no" }
                );
            }
        }
    }

    Ok(())
}

/// Drive every byte through the port handshake and return the files written.
fn print_stream(
    config: PrinterConfig,
    data: &[u8],
    builtin_font: bool,
) -> Result<Vec<PathBuf>, NeedlepointError> {
    let spool = FileSpooler::new(&config.output_dir, &config.file_prefix)?;
    let rasterizer: Box<dyn GlyphRasterizer> = if builtin_font {
        Box::new(SpleenRasterizer::loaded())
    } else {
        Box::new(TtfRasterizer::new())
    };

    let mut printer = EscpPrinter::new(config, rasterizer, spool);
    if !printer.font_ready() {
        eprintln!("Warning: no font loaded, text will not print (try --builtin-font)");
    }

    let idle = Control::NOT_RESET | Control::SELECT;
    for &byte in data {
        printer.write_data(byte);
        printer.write_control(idle | Control::STROBE);
        printer.write_control(idle);
        let _ = printer.read_status();
    }
    printer.close();

    Ok(printer.sink().written().to_vec())
}
