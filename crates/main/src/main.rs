use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use packet_pdf::layout::{self, visible_tests};
use packet_pdf::{Packet, PdfBuilder, Theme};

/// Renders competition problem packets to PDF.
///
/// Fonts are looked up in `--fonts-dir`, then `PACKET_PDF_FONTS_DIR`, then `assets/fonts` next to
/// the binary and in the library crate, then the system font directories (DejaVu).
#[derive(Parser)]
#[command(author, version, about = "Render problem packets to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a packet (or a server config with a `[packet]` table) to PDF.
    Render {
        /// Packet TOML file.
        packet: PathBuf,

        /// Output path; defaults to the packet path with a `.pdf` extension.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Theme TOML file overriding sizes and spacing.
        #[arg(long)]
        theme: Option<PathBuf>,

        /// Extra directory searched for fonts first.
        #[arg(long)]
        fonts_dir: Option<PathBuf>,

        /// Add a PDF outline entry for every problem.
        #[arg(long)]
        bookmarks: bool,
    },

    /// Validate a packet and print a summary of its problems.
    Check {
        /// Packet TOML file.
        packet: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            packet,
            output,
            theme,
            fonts_dir,
            bookmarks,
        } => render(packet, output, theme, fonts_dir, bookmarks),
        Commands::Check { packet } => check(packet),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(
    packet_path: PathBuf,
    output: Option<PathBuf>,
    theme: Option<PathBuf>,
    fonts_dir: Option<PathBuf>,
    bookmarks: bool,
) -> Result<(), Box<dyn Error>> {
    let packet = Packet::from_path(&packet_path)?;
    let theme = match theme {
        Some(path) => Theme::from_path(path)?,
        None => Theme::default(),
    };
    let output = output.unwrap_or_else(|| packet_path.with_extension("pdf"));

    let mut builder = PdfBuilder::new(layout::assemble(&packet)).with_theme(theme);
    if let Some(dir) = fonts_dir {
        builder = builder.with_fonts_dir(dir);
    }

    let pdf = if bookmarks {
        render_with_bookmarks(builder)?
    } else {
        builder.render()?
    };
    std::fs::write(&output, &pdf.bytes)?;
    info!(
        "Generated {} ({} pages, {} bytes)",
        output.display(),
        pdf.page_count,
        pdf.bytes.len()
    );
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn render_with_bookmarks(builder: PdfBuilder) -> Result<packet_pdf::RenderedPdf, Box<dyn Error>> {
    Ok(builder.render_with_bookmarks()?)
}

#[cfg(not(feature = "bookmarks"))]
fn render_with_bookmarks(_builder: PdfBuilder) -> Result<packet_pdf::RenderedPdf, Box<dyn Error>> {
    Err("Rebuild with the `bookmarks` feature to add problem bookmarks".into())
}

fn check(packet_path: PathBuf) -> Result<(), Box<dyn Error>> {
    let packet = Packet::from_path(&packet_path)?;
    println!("{}: {} problems", packet.title, packet.problems.len());
    for (index, problem) in packet.problems.iter().enumerate() {
        println!(
            "  {}. {} ({} of {} tests visible{})",
            index + 1,
            problem.title,
            visible_tests(problem).count(),
            problem.tests.len(),
            if problem.description.is_some() {
                ", with description"
            } else {
                ""
            }
        );
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
