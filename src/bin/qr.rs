use clap::Parser;
use ipa_bundler::qr::qr;
use ipa_bundler::{config, output};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "Usage: qr <url> [size]";

/// Print a QR code image URL for a link.
///
/// The URL goes to stdout without a trailing newline so it can be captured
/// as-is; the newline is written to stderr for interactive use.
#[derive(Parser)]
#[command(name = "qr", version = output::version_string())]
struct Cli {
    /// Link to encode
    url: Option<String>,

    /// Image width and height in pixels (default from ipa-bundler.toml, else 150)
    size: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(url) = cli.url.as_deref().filter(|url| !url.is_empty()) else {
        println!("{USAGE}");
        return ExitCode::from(1);
    };

    match run(url, cli.size.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(url: &str, size: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    // The config is only consulted for the default size.
    let configured;
    let size = match size {
        Some(size) => size,
        None => {
            configured = config::load_config(Path::new(config::CONFIG_FILE_NAME))?
                .qr
                .size
                .to_string();
            configured.as_str()
        }
    };

    let link = qr(url, Some(size))?;
    std::io::stdout().write_all(link.as_bytes())?;
    std::io::stderr().write_all(b"\n")?;
    Ok(())
}
