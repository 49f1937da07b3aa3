//! Install command - download the binaries missing from the binaries directory.

use anyhow::Result;
use clap::Args;

use easygif_provision::config::TerminalFeatures;
use easygif_provision::{Output, ProvisionPlan, Provisioner};

use crate::args::ConfigArgs;

#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn execute(args: InstallArgs, terminal: TerminalFeatures, output: &Output) -> Result<i32> {
    let config = args.config.resolve(terminal)?;
    log::info!(
        "Provisioning {} into {}",
        config.platform,
        config.bin_dir.display()
    );

    let plan = ProvisionPlan::build(&config);
    let report = Provisioner::new(&config, output)?.run(&plan)?;

    for path in &report.written {
        output.verbose(&format!("Wrote {}", path.display()));
    }

    Ok(0)
}
