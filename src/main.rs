use clap::Parser;
use ipa_bundler::options::{BundleInput, join_url};
use ipa_bundler::types::InstallMetadata;
use ipa_bundler::{bundle, config, introspect, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ipa-bundler")]
#[command(about = "Generate an over-the-air install page and manifest for an iOS app")]
#[command(long_about = "\
Generate an over-the-air install page and manifest for an iOS app

Writes two files next to each other:

  index.html       <a href=\"itms-services://…\"> install link, with the app icon
  manifest.plist   what the device downloads to find and register the app

Serve both, plus the .ipa, over HTTPS and open index.html on the device.

App identity is read from the package's Info.plist. Pass --metadata to
supply it yourself instead:

  {\"bundleIdentifier\": \"com.example.demo\", \"bundleVersion\": \"42\",
   \"bundleMarketingVersion\": \"1.2.0\", \"appTitle\": \"Demo\"}

Settings are read from ./ipa-bundler.toml when present. Run
'ipa-bundler --gen-config' to print a documented one.")]
#[command(version = output::version_string())]
struct Cli {
    /// The .ipa to install; also read for app metadata unless --metadata is given
    #[arg(required_unless_present = "gen_config")]
    package: Option<PathBuf>,

    /// URL the files will be served from; makes the install and manifest URLs absolute
    #[arg(long)]
    base_url: Option<String>,

    /// JSON file with the app metadata, instead of reading the package
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Icon to embed when using --metadata
    #[arg(long, requires = "metadata")]
    icon: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// File name of the install page
    #[arg(long)]
    html_file: Option<String>,

    /// File name of the manifest
    #[arg(long)]
    manifest_file: Option<String>,

    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Print a stock ipa-bundler.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let Some(package) = cli.package.clone() else {
        return Err("no package given".into());
    };
    let site_config = config::load_config(&cli.config)?;
    let input = build_input(cli, &package, &site_config.output.manifest_file)?;

    let app_bundle = bundle::build_bundle(input, &site_config, introspect::resolve_backend)?;
    let written = bundle::write_outputs(&app_bundle)?;
    output::print_bundle_output(&app_bundle, &written);

    Ok(())
}

/// Translate CLI arguments into a bundling request.
fn build_input(
    cli: &Cli,
    package: &Path,
    configured_manifest: &str,
) -> Result<BundleInput, Box<dyn std::error::Error>> {
    let package_str = package.to_string_lossy().into_owned();
    let manifest_file = cli.manifest_file.as_deref().unwrap_or(configured_manifest);

    let (install_url, manifest_url) = match &cli.base_url {
        Some(base) => {
            let file_name = package
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| package_str.clone());
            (
                join_url(base, &file_name),
                Some(join_url(base, manifest_file)),
            )
        }
        None => (package_str.clone(), None),
    };

    let mut input = match &cli.metadata {
        Some(path) => {
            let mut metadata: InstallMetadata =
                serde_json::from_str(&std::fs::read_to_string(path)?)?;
            if let Some(icon) = &cli.icon {
                metadata.app_icon = Some(std::fs::read(icon)?);
            }
            BundleInput::with_metadata(install_url, metadata)
        }
        None => BundleInput::with_package(install_url, package_str),
    };
    input.manifest_url = manifest_url;
    input.output_dir = cli.out_dir.clone();
    input.html_file = cli.html_file.clone();
    input.manifest_file = cli.manifest_file.clone();
    Ok(input)
}
