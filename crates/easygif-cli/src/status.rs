//! Status command - report what an install would do.

use anyhow::Result;
use clap::Args;
use console::style;

use easygif_provision::config::TerminalFeatures;
use easygif_provision::provision::{ComponentStatus, PresenceState, Remedy};
use easygif_provision::{Output, ProvisionPlan};

use crate::args::ConfigArgs;

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Exit with status 1 when something is missing
    #[arg(long)]
    pub check: bool,
}

pub fn execute(args: StatusArgs, terminal: TerminalFeatures, output: &Output) -> Result<i32> {
    let config = args.config.resolve(terminal)?;
    let plan = ProvisionPlan::build(&config);

    for line in report(&plan, output.ansi()) {
        output.writeln(&line);
    }

    if args.check && !plan.is_satisfied() {
        return Ok(1);
    }
    Ok(0)
}

fn report(plan: &ProvisionPlan, ansi: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", style("Platform:").bold().force_styling(ansi), plan.platform),
        format!(
            "{} {}",
            style("Binaries:").bold().force_styling(ansi),
            plan.bin_dir.display()
        ),
        String::new(),
    ];
    lines.extend(plan.components.iter().map(|status| describe(status, ansi)));
    lines
}

fn describe(status: &ComponentStatus, ansi: bool) -> String {
    let state = match status.state {
        PresenceState::Present => style("present").green(),
        PresenceState::Missing => style("missing").red(),
        PresenceState::Incomplete => style("incomplete").yellow(),
    }
    .force_styling(ansi);

    let detail = match (&status.state, &status.remedy) {
        (PresenceState::Present, _) => status
            .found
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        (_, Remedy::FetchSidecar { url, .. }) | (_, Remedy::FetchArchive { url, .. }) => {
            format!("will download {}", url)
        }
        (_, Remedy::Manual) => "install ffmpeg and ffprobe manually".to_string(),
    };

    format!("  {:<18} {:<10} {}", status.component.label(), state, detail)
}
