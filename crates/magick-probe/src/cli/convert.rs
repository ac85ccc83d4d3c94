//! The `magick-probe convert` command: a passthrough to the convert binary.

use clap::Args;
use magick_probe_core::{Config, MagickProbe};
use std::io::Write;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Arguments handed to convert unchanged (use `--` before options)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub args: Vec<String>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let probe = MagickProbe::new(config);

    match probe.convert(&args.args).await {
        Ok((stdout, stderr)) => {
            std::io::stdout().write_all(&stdout)?;
            std::io::stderr().write_all(&stderr)?;
            Ok(())
        }
        Err(err) => {
            // Whatever convert printed is still useful to the user.
            std::io::stdout().write_all(err.stdout())?;
            std::io::stderr().write_all(err.stderr())?;
            anyhow::bail!("{} ({})", err.msg(), err.cmd())
        }
    }
}
