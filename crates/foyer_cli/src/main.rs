//! Packaging and smoke tool for the foyer bootstrap.
//!
//! # Responsibility
//! - Seal a plain profile document into the protected payload format.
//! - Verify a sealed payload against a passphrase.
//! - Exercise the full bootstrap pass against a local resource directory.

use clap::{Parser, Subcommand};
use foyer_core::{
    parse_site_version, seal, ActivationSet, DirectorySource, DiscloseKey, DisclosedProfile,
    Renderer, SiteBootstrap, SiteVersion,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "foyer", about = "Asset manifest and disclosure tooling", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seals a plain profile JSON file into the protected payload format.
    Seal {
        /// Passphrase the disclosure key is derived from.
        #[arg(long)]
        passphrase: String,
        /// Plain profile JSON input.
        #[arg(long)]
        from: PathBuf,
        /// Sealed payload output.
        #[arg(long)]
        to: PathBuf,
    },
    /// Discloses a sealed payload and reports its section count.
    Verify {
        /// Passphrase the disclosure key is derived from.
        #[arg(long)]
        passphrase: String,
        /// Sealed payload input.
        #[arg(long)]
        file: PathBuf,
    },
    /// Runs the full bootstrap pass against a resource directory.
    Boot {
        /// Directory holding every declared resource.
        #[arg(long)]
        dir: PathBuf,
        /// Manifest version tag (`v1` or `v2`).
        #[arg(long, default_value = "v2")]
        version: String,
        /// Passphrase for the protected profile.
        #[arg(long)]
        passphrase: String,
    },
}

/// Renderer stand-in printing what the engine would receive.
struct ReportRenderer;

impl Renderer for ReportRenderer {
    fn activate(&mut self, set: &ActivationSet) {
        println!(
            "activated version={} public_records={} degraded={}",
            set.version(),
            set.public_records().len(),
            set.is_degraded()
        );
        for record in set.public_records() {
            println!(
                "  {} kind={} bytes={}",
                record.name,
                record.kind.as_str(),
                record.payload.len()
            );
        }
        if let Some(profile) = set.profile() {
            println!("  profile sections={}", profile.sections().len());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Seal {
            passphrase,
            from,
            to,
        } => {
            let plaintext = fs::read(&from)
                .map_err(|err| format!("cannot read `{}`: {err}", from.display()))?;
            // Validate before sealing so a broken document fails here, not
            // at disclosure time on the live site.
            let profile: DisclosedProfile = serde_json::from_slice(&plaintext)
                .map_err(|err| format!("`{}` is not a profile document: {err}", from.display()))?;
            let key = DiscloseKey::from_passphrase(&passphrase);
            let payload = seal(&plaintext, &key).map_err(|err| err.to_string())?;
            fs::write(&to, payload)
                .map_err(|err| format!("cannot write `{}`: {err}", to.display()))?;
            println!(
                "sealed {} sections into {}",
                profile.sections().len(),
                to.display()
            );
            Ok(())
        }
        Command::Verify { passphrase, file } => {
            let payload = fs::read(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let record = foyer_core::ResourceRecord {
                name: "profile.protected".to_string(),
                kind: foyer_core::ResourceKind::StructuredProtected,
                payload,
            };
            let gate = foyer_core::DisclosureGate::over(&record).map_err(|err| err.to_string())?;
            let profile = gate
                .disclose(&DiscloseKey::from_passphrase(&passphrase))
                .map_err(|err| err.to_string())?;
            println!("disclosed sections={}", profile.sections().len());
            Ok(())
        }
        Command::Boot {
            dir,
            version,
            passphrase,
        } => {
            let version: SiteVersion = parse_site_version(&version)
                .ok_or_else(|| format!("unknown manifest version `{version}`"))?;
            let mut bootstrap = SiteBootstrap::for_version(version).map_err(|err| err.to_string())?;
            let source = DirectorySource::new(dir);
            let key = DiscloseKey::from_passphrase(&passphrase);
            bootstrap
                .run(&source, &key, &mut ReportRenderer)
                .map_err(|err| err.to_string())
        }
    }
}
