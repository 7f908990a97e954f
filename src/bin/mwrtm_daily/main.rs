use std::{env, path::PathBuf, process::ExitCode};

use chrono::NaiveDate;
use clap::Parser;
use error_stack::ResultExt;
use log::info;
use mwrtm_rs::{era5, kernel, logging, output};

mod channels;

/// Environment variable consulted when `--workers` is not given.
const WORKERS_ENV_VAR: &str = "MWRTM_WORKERS";

fn main() -> ExitCode {
    let clargs = DailyRtmCli::parse();
    logging::init_logging(clargs.verbosity.log_level_filter());

    if let Err(e) = driver(clargs) {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Compute simulated radiometer brightness temperatures for one day of
/// reanalysis fields and write them back onto the input grid.
#[derive(Debug, Parser)]
struct DailyRtmCli {
    /// Directory holding the locally cached ERA5 daily files
    /// (era5_surface_<date>.nc and era5_levels_<date>.nc).
    era5_dir: PathBuf,

    /// Date to process, as YYYY-MM-DD.
    date: NaiveDate,

    /// Where to write the output netCDF file. Defaults to
    /// tbs_atmosphere_<date>.nc in the current directory.
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// Channel set to simulate: MSU1, MSU2, MSU3, MSU4, or the path to a
    /// TOML file of [[channel]] tables.
    #[clap(short = 'c', long, default_value = "MSU2")]
    channels: String,

    /// Number of worker threads for the RTM. Falls back to the
    /// MWRTM_WORKERS environment variable, then to one worker per logical
    /// processor.
    #[clap(short = 'w', long)]
    workers: Option<usize>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

#[derive(Debug, Clone, thiserror::Error)]
enum CliError {
    #[error("bad worker configuration: {0}")]
    Workers(String),
    #[error("could not load channel set '{0}'")]
    Channels(String),
    #[error("error reading input fields")]
    Input,
    #[error("the RTM computation failed")]
    Compute,
    #[error("error writing the output file")]
    Output,
}

fn driver(clargs: DailyRtmCli) -> error_stack::Result<(), CliError> {
    let workers = resolve_workers(clargs.workers)?;
    let channels = channels::load_channels(&clargs.channels)
        .change_context_lazy(|| CliError::Channels(clargs.channels.clone()))?;

    let (surface_path, levels_path) = era5::daily_file_paths(&clargs.era5_dir, clargs.date);
    let day = era5::read_daily_atmosphere(&surface_path, &levels_path, clargs.date)
        .change_context(CliError::Input)?;

    info!(
        "running {} channels over {} columns for {}",
        channels.len(),
        day.num_points(),
        clargs.date
    );
    let spinner = indicatif::ProgressBar::new_spinner().with_message("computing RTM");
    spinner.enable_steady_tick(std::time::Duration::from_millis(200));
    let atmo =
        kernel::compute_rtm(&day.grid(), &channels, workers).change_context(CliError::Compute)?;
    spinner.finish_and_clear();

    let out_path = clargs
        .output
        .unwrap_or_else(|| PathBuf::from(format!("tbs_atmosphere_{}.nc", clargs.date)));
    let gridded = output::RtmGridded {
        lats: day.lats,
        lons: day.lons,
        times: day.times,
        time_units: day.time_units,
        channels,
        atmo,
    };
    gridded
        .write_nc(&out_path)
        .change_context(CliError::Output)?;

    Ok(())
}

/// Resolve the worker count: the flag wins, then the environment variable;
/// neither means the kernel picks its own default. The kernel only ever
/// sees an explicit `Option` - it never reads the environment itself.
fn resolve_workers(flag: Option<usize>) -> Result<Option<usize>, CliError> {
    if let Some(n) = flag {
        if n == 0 {
            return Err(CliError::Workers(
                "--workers must be a positive integer".to_string(),
            ));
        }
        return Ok(Some(n));
    }

    match env::var(WORKERS_ENV_VAR) {
        Ok(text) => {
            let n: usize = text.trim().parse().map_err(|_| {
                CliError::Workers(format!(
                    "{WORKERS_ENV_VAR} must be a positive integer, got '{text}'"
                ))
            })?;
            if n == 0 {
                return Err(CliError::Workers(format!(
                    "{WORKERS_ENV_VAR} must be a positive integer, got '{text}'"
                )));
            }
            Ok(Some(n))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(CliError::Workers(format!(
            "could not read {WORKERS_ENV_VAR}: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_beats_environment() {
        // The flag is resolved without ever consulting the environment
        assert_eq!(resolve_workers(Some(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_zero_flag_rejected() {
        assert!(resolve_workers(Some(0)).is_err());
    }
}
