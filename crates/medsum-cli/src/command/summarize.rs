use std::path::PathBuf;

use super::SummaryInputArg;
use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummarizeArg {
    #[clap(flatten)]
    pub input: SummaryInputArg,
    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummarizeArg) -> anyhow::Result<()> {
    let SummarizeArg { input, output } = arg;
    let summary = input.load_summary()?;

    let mut output = Output::from_output_path(output.clone())?;
    output.write_json(&summary)?;
    log::info!(
        "Summary of {} patients written to {}",
        summary.total_patients,
        output.display_path()
    );
    Ok(())
}
