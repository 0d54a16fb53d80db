use clap::{Parser, Subcommand};
use fwf_ndjson::{Config, Result, driver};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fwf-ndjson", version)]
#[command(about = "Convert fixed-width data files to NDJSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every data file that has a matching specification.
    Convert {
        /// Directory holding `<prefix>_<rest>.<suffix>` data files.
        #[arg(long, env = "FWF_DATA_DIR", default_value = "data")]
        data: PathBuf,

        /// Directory holding `<prefix>.csv` specification files.
        #[arg(long, env = "FWF_SPECS_DIR", default_value = "specs")]
        specs: PathBuf,

        /// Output directory, created if missing.
        #[arg(short = 'o', long, env = "FWF_OUTPUT_DIR", default_value = "output")]
        out: PathBuf,

        /// Extension that marks a data file.
        #[arg(long, default_value = "txt")]
        suffix: String,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Convert {
            data,
            specs,
            out,
            suffix,
        } => {
            let mut config = Config::new(data, specs, out);
            config.data_suffix = suffix.trim_start_matches('.').to_string();

            let report = driver::run(&config)?;
            for (name, err) in &report.failed {
                eprintln!("FAILED [{}] {}: {}", err.kind(), name, err);
            }
            println!(
                "converted {}, skipped {}, failed {}",
                report.converted.len(),
                report.skipped.len(),
                report.failed.len()
            );

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
