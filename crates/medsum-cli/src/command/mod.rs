use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medsum_analysis::{
    config::{MAX_COMORBIDITY_CAP, SummaryConfig},
    summary::{Summary, SummaryBuilder},
};

use self::{report::ReportArg, summarize::SummarizeArg};
use crate::util;

mod report;
mod summarize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Summarize a patient database and write the summary as JSON
    Summarize(#[clap(flatten)] SummarizeArg),
    /// Summarize a patient database and print a text report
    Report(#[clap(flatten)] ReportArg),
}

/// Input and configuration shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummaryInputArg {
    /// Path to the patient database JSON file
    pub patients: PathBuf,

    /// Summary configuration JSON file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of diagnoses in the frequency ranking
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Comorbidity count at which the age table's last column starts
    #[arg(long)]
    pub comorbidity_cap: Option<usize>,

    /// Aggregate on all CPU cores
    #[arg(long)]
    pub parallel: bool,

    /// Records per shard in parallel mode
    #[arg(long)]
    pub shard_size: Option<usize>,
}

impl SummaryInputArg {
    pub(crate) fn summary_config(&self) -> anyhow::Result<SummaryConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => SummaryConfig::default(),
        };
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(cap) = self.comorbidity_cap {
            if cap > MAX_COMORBIDITY_CAP {
                anyhow::bail!("--comorbidity-cap must be at most {MAX_COMORBIDITY_CAP}");
            }
            config.comorbidity_cap = cap;
        }
        if self.parallel {
            config.parallel = true;
        }
        if let Some(shard_size) = self.shard_size {
            if shard_size == 0 {
                anyhow::bail!("--shard-size must be at least 1");
            }
            config.shard_size = shard_size;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads the patient database and builds its summary.
    pub(crate) fn load_summary(&self) -> anyhow::Result<Summary> {
        let builder = SummaryBuilder::new(self.summary_config()?);
        log::debug!("Summary configuration: {:?}", builder.config());

        let records = util::read_patients_file(&self.patients)?;
        log::info!(
            "Loaded {} patients from {}",
            records.len(),
            self.patients.display()
        );

        let summary = builder.build(&records)?;
        Ok(summary)
    }
}

pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summarize(arg) => summarize::run(&arg)?,
        Mode::Report(arg) => report::run(&arg)?,
    }
    Ok(())
}
