//! The `magick-probe parse` command for previously captured convert output.

use clap::Args;
use magick_probe_core::{Config, ImageDetails, MagickProbe, OutputFormat, OutputWriter};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

/// Arguments for the `parse` command.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File holding `convert <files> json:-` output ("-" for stdin)
    pub input: PathBuf,

    /// Re-emit the decoded records as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the parse command.
pub async fn execute(args: ParseArgs, config: Config) -> anyhow::Result<()> {
    let raw = read_input(&args.input)?;
    let results = MagickProbe::details_from_json(&raw)?;
    tracing::debug!("Decoded {} record(s) from {:?}", results.len(), args.input);

    if args.json {
        let stdout = BufWriter::new(std::io::stdout().lock());
        let pretty = args.pretty || config.output.pretty;
        let mut writer = OutputWriter::new(stdout, OutputFormat::Json, pretty);
        writer.write_all(&results)?;
        writer.finish()?;
    } else {
        for result in &results {
            println!("{}", describe(&result.image));
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|e| anyhow::anyhow!("Failed to read {:?}: {e}", path))
}

/// One-line summary of an image.
fn describe(image: &ImageDetails) -> String {
    let name = if image.base_name.is_empty() {
        &image.name
    } else {
        &image.base_name
    };
    let geometry = image
        .geometry
        .map(|g| format!("{}x{}", g.dimensions.width, g.dimensions.height))
        .unwrap_or_else(|| "?x?".to_string());

    let mut line = format!(
        "{name}: {} {geometry} {}, {} bytes",
        image.format,
        image.colorspace,
        image.size()
    );
    let profiles = image.profile_names();
    if !profiles.is_empty() {
        line.push_str(&format!(
            ", profiles [{}] {:.2}%",
            profiles.join(", "),
            image.profile_size_percent() * 100.0
        ));
    }
    line
}
