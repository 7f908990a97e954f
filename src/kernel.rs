//! The RTM kernel entry point: validate, dispatch, aggregate.
//!
//! One bounded, data-parallel batch per call. Columns are fully
//! independent, so the batch is fanned out over a rayon pool at column
//! granularity and collected back in input order. For a given set of
//! inputs the result is bit-for-bit identical no matter how many workers
//! run or how the columns are scheduled; the only parallelism-visible
//! effect is wall-clock time.

use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::column::ColumnPath;
use crate::error::RtmError;
use crate::grid::{AtmoResult, ChannelSet, LevelOrder, ProfileGrid, SurfaceState};
use crate::transfer::{integrate_path, PathRadiance};
use crate::validate::validate_grid;

/// Compute the atmospheric radiative transfer model over a batch of columns.
///
/// `grid` holds the level and surface fields (§6 of the interface contract:
/// profiles dimensioned `(num_points, num_levels)`, surface fields
/// `(num_points,)`, with the pressure levels shared across columns).
/// `channels` is the positional angle/frequency table applied to every
/// column. `num_threads` sizes the worker pool: a positive count is used as
/// given, `None` lets the pool match the available logical processors, and
/// an explicit zero is a configuration error.
///
/// Returns the `(num_points, num_freq)` output tensors, fully owned by the
/// caller. Structural and domain errors abort before any computation;
/// per-column NaNs (missing data) flow through to that column's output
/// cells only.
pub fn compute_rtm(
    grid: &ProfileGrid<'_>,
    channels: &ChannelSet,
    num_threads: Option<usize>,
) -> Result<AtmoResult, RtmError> {
    let order = validate_grid(grid)?;
    debug!("input shapes and domains are consistent");

    if num_threads == Some(0) {
        return Err(RtmError::WorkerCount);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|e| RtmError::WorkerPool(e.to_string()))?;

    let num_points = grid.num_points();
    let num_freq = channels.len();

    // Normalize the shared levels to surface-first order once; the columns
    // reorient their own views against it.
    let levels: Vec<f32> = match order {
        LevelOrder::SurfaceFirst => grid.pressure.iter().copied().collect(),
        LevelOrder::TopFirst => grid.pressure.iter().rev().copied().collect(),
    };

    info!("computing RTM for {num_points} columns and {num_freq} channels");
    let started = Instant::now();

    let mut per_column: Vec<Result<Vec<PathRadiance>, RtmError>> = Vec::new();
    pool.install(|| {
        (0..num_points)
            .into_par_iter()
            .map(|column| compute_column(grid, &levels, order, column, channels))
            .collect_into_vec(&mut per_column);
    });

    info!(
        "finished RTM for {num_points} columns in {:.2} s",
        started.elapsed().as_secs_f64()
    );

    // Aggregate in input order; completion order never matters because the
    // parallel collect above is order-preserving.
    let mut out = AtmoResult::zeros(num_points, num_freq);
    for (column, row) in per_column.into_iter().enumerate() {
        let row = row?;
        for (channel, radiance) in row.into_iter().enumerate() {
            out.transmissivity[[column, channel]] = radiance.transmissivity;
            out.tb_up[[column, channel]] = radiance.tb_up;
            out.tb_down[[column, channel]] = radiance.tb_down;
        }
    }

    Ok(out)
}

/// Run every channel for one column.
fn compute_column(
    grid: &ProfileGrid<'_>,
    levels: &[f32],
    order: LevelOrder,
    column: usize,
    channels: &ChannelSet,
) -> Result<Vec<PathRadiance>, RtmError> {
    let surface = SurfaceState {
        temperature: grid.surface_temperature[column],
        height: grid.surface_height[column],
        dewpoint: grid.surface_dewpoint[column],
        pressure: grid.surface_pressure[column],
    };

    // A missing surface pressure leaves nothing to anchor the path to;
    // record the whole column as missing rather than failing the batch.
    if surface.pressure.is_nan() {
        return Ok(vec![PathRadiance::missing(); channels.len()]);
    }

    let path = ColumnPath::build(
        levels,
        order,
        column,
        grid.temperature.row(column),
        grid.height.row(column),
        grid.specific_humidity.row(column),
        grid.liquid_content.row(column),
        surface,
    )?;

    let mut results = Vec::with_capacity(channels.len());
    // MSU-style channel tables repeat one frequency across several
    // incidence angles; reuse the absorption profile until the frequency
    // changes.
    let mut cached_freq = f32::NAN;
    let mut absorption: Vec<f32> = Vec::new();
    for channel in channels.iter() {
        if channel.frequency != cached_freq {
            absorption = path.absorption_profile(channel.frequency);
            cached_freq = channel.frequency;
        }
        results.push(integrate_path(
            channel.incidence,
            path.temperature(),
            path.height(),
            &absorption,
        ));
    }

    Ok(results)
}
