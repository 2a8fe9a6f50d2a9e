//! Compose command implementation
//!
//! Reads a YAML description of an instance's raw configuration maps (the
//! instance map plus its profiles in declared order), runs one composition
//! fetch cycle, and prints the result. By default the full result is emitted
//! as a JSON object; `--kind` selects a single document as raw text instead,
//! which is handy for piping straight into cloud-init tooling.
//!
//! The input schema is documented in the library's `input` module.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use incus_seed::fragment::Kind;
use incus_seed::input;
use incus_seed::pipeline::Pipeline;

/// Arguments for the compose command
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Path to the YAML input file ("-" for stdin)
    #[arg(value_name = "PATH", env = "INCUS_SEED_INPUT", default_value = "-")]
    pub input: String,

    /// Print only one document as raw text instead of the JSON result
    #[arg(long, value_name = "KIND", value_parser = parse_kind)]
    pub kind: Option<Kind>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

fn parse_kind(value: &str) -> std::result::Result<Kind, String> {
    match value {
        "user" | "user-data" => Ok(Kind::User),
        "vendor" | "vendor-data" => Ok(Kind::Vendor),
        other => Err(format!(
            "unknown kind '{}', expected 'user' or 'vendor'",
            other
        )),
    }
}

/// Execute the compose command
pub fn execute(args: ComposeArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let mut seed_input = input::parse(&raw).context("Failed to parse compose input")?;

    let pipeline = Pipeline::new(seed_input.merge_directive);
    let instance = seed_input.instance.take();
    let seed = pipeline.fetch(seed_input.into_profiles(), instance)?;

    let rendered = match args.kind {
        Some(Kind::User) => seed.user_data.unwrap_or_default(),
        Some(Kind::Vendor) => seed.vendor_data.unwrap_or_default(),
        None => serde_json::to_string_pretty(&seed)?,
    };

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
