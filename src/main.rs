use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use herosheet_pdf::{FontConfig, convert_hero_to_pdf};

/// Build a printable character sheet PDF from a hero file
#[derive(Parser, Debug)]
#[command(name = "herosheet-pdf")]
#[command(version, about, long_about = None)]
struct Args {
    /// Hero XML file
    input: PathBuf,

    /// PDF file to write
    output: PathBuf,

    /// Sheet settings (JSON); defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the settings used for this build, including newly found sections
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// TrueType font for regular text (requires --font-bold)
    #[arg(long, requires = "font_bold")]
    font_regular: Option<PathBuf>,

    /// TrueType font for bold text (requires --font-regular)
    #[arg(long, requires = "font_regular")]
    font_bold: Option<PathBuf>,

    /// Log layout decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let fonts = match (args.font_regular, args.font_bold) {
        (Some(regular), Some(bold)) => FontConfig::TrueType { regular, bold },
        _ => FontConfig::Builtin,
    };

    let built = match convert_hero_to_pdf(&args.input, args.settings.as_deref(), &args.output, &fonts) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    for skip in &built.report.skipped {
        eprintln!("skipped {}/{}: {}", skip.sheet, skip.section, skip.reason);
    }

    if let Some(path) = &args.write_settings
        && let Err(e) = built.settings.save(path)
    {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    println!(
        "Wrote {} ({} pages)",
        args.output.display(),
        built.report.pages.len()
    );
    ExitCode::SUCCESS
}
