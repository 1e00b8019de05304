use miri_sensitivity::{batch, BatchConfig};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "miri-sensitivity",
    about = "MIRI sensitivity and saturation limit charts from ETC tables"
)]
struct Opt {
    /// Path to the ETC tables repository
    #[structopt(short, long, env = "MIRI_ETC_DATA", default_value = ".")]
    input: PathBuf,
    /// ETC version, the tables are read from `<input>/ETC<version>`
    #[structopt(long)]
    etc_version: Option<String>,
    /// ETC tables to process instead of the tables found in the repository
    #[structopt(short, long = "file")]
    files: Vec<PathBuf>,
    /// Path to the charts directory
    #[structopt(short, long, default_value = "plots")]
    output: PathBuf,
    /// Configurations regular expression filter
    #[structopt(short, long)]
    config: Option<String>,
    /// Configurations exclude regular expression filter
    #[structopt(short = "x", long)]
    exclude: Option<String>,
    /// Adds the limiting flux panel
    #[structopt(long)]
    limiting_flux: bool,
    /// Save the tables to CSV files
    #[structopt(long)]
    csv: bool,
    /// Display the tables summary
    #[structopt(long)]
    summary: bool,
}
impl From<Opt> for BatchConfig {
    fn from(opt: Opt) -> Self {
        Self {
            input: opt.input,
            etc_version: opt.etc_version,
            files: opt.files,
            output: opt.output,
            config: opt.config,
            exclude: opt.exclude,
            limiting_flux: opt.limiting_flux,
            csv: opt.csv,
            summary: opt.summary,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    let report = batch::run(&opt.into());
    report.summary();

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} ETC tables failed",
            report.failed().count(),
            report.outcomes.len()
        );
    }
    Ok(())
}
