//! Input validation for the RTM kernel.
//!
//! A read-only pass over the whole batch before any computation is
//! dispatched. Violations fail fast with an error naming the offending
//! array and index; nothing is ever clamped or substituted.
//!
//! NaN handling is deliberately asymmetric. The shared arrays (pressure
//! levels and the channel table) must be finite because a NaN there would
//! poison every column. A NaN in a *per-column* value is treated as a
//! missing-data sentinel, passes validation, and NaN-fills only that
//! column's output cells.

use std::fmt::Debug;

use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2};
use num_traits::Float;

use crate::error::RtmError;
use crate::grid::{LevelOrder, ProfileGrid};

/// Validate the batch and report the direction of the pressure levels.
pub(crate) fn validate_grid(grid: &ProfileGrid<'_>) -> Result<LevelOrder, RtmError> {
    let num_points = grid.num_points();
    let num_levels = grid.num_levels();

    if num_levels == 0 {
        return Err(RtmError::NoLevels);
    }

    check_profile_shape(grid.temperature, "temperature", num_points, num_levels)?;
    check_profile_shape(grid.height, "height", num_points, num_levels)?;
    check_profile_shape(
        grid.specific_humidity,
        "specific_humidity",
        num_points,
        num_levels,
    )?;
    check_profile_shape(grid.liquid_content, "liquid_content", num_points, num_levels)?;

    check_surface_len(grid.surface_temperature, "surface_temperature", num_points)?;
    check_surface_len(grid.surface_height, "surface_height", num_points)?;
    check_surface_len(grid.surface_dewpoint, "surface_dewpoint", num_points)?;
    check_surface_len(grid.surface_pressure, "surface_pressure", num_points)?;

    // Shared levels: finite, positive, strictly monotonic.
    for (level, &p) in grid.pressure.iter().enumerate() {
        if !p.is_finite() || p <= 0.0 {
            return Err(RtmError::LevelDomain {
                array: "pressure",
                level,
                value: p,
                requirement: "must be a positive, finite pressure in hPa",
            });
        }
    }
    let order = pressure_direction(grid.pressure)?;

    check_profile_domain(grid.temperature, "temperature", |t| t > 0.0, "must be a positive temperature in K")?;
    check_profile_domain(
        grid.specific_humidity,
        "specific_humidity",
        |q| q >= 0.0,
        "must be a non-negative specific humidity in kg/kg",
    )?;
    check_profile_domain(
        grid.liquid_content,
        "liquid_content",
        |l| l >= 0.0,
        "must be a non-negative liquid content in kg/kg",
    )?;

    check_surface_domain(
        grid.surface_temperature,
        "surface_temperature",
        |t| t > 0.0,
        "must be a positive temperature in K",
    )?;
    check_surface_domain(
        grid.surface_dewpoint,
        "surface_dewpoint",
        |t| t > 0.0,
        "must be a positive temperature in K",
    )?;
    check_surface_domain(
        grid.surface_pressure,
        "surface_pressure",
        |p| p > 0.0,
        "must be a positive pressure in hPa",
    )?;

    Ok(order)
}

fn check_profile_shape(
    array: ArrayView2<'_, f32>,
    name: &'static str,
    num_points: usize,
    num_levels: usize,
) -> Result<(), RtmError> {
    if array.nrows() != num_points || array.ncols() != num_levels {
        Err(RtmError::ProfileShape {
            array: name,
            rows: array.nrows(),
            cols: array.ncols(),
            num_points,
            num_levels,
        })
    } else {
        Ok(())
    }
}

fn check_surface_len(
    array: ArrayView1<'_, f32>,
    name: &'static str,
    num_points: usize,
) -> Result<(), RtmError> {
    if array.len() != num_points {
        Err(RtmError::SeriesLength {
            array: name,
            actual: array.len(),
            expected: num_points,
        })
    } else {
        Ok(())
    }
}

/// Bound check over a 2-D profile array. The predicate receives each value;
/// NaNs are skipped (missing-data pass-through).
fn check_profile_domain(
    array: ArrayView2<'_, f32>,
    name: &'static str,
    ok: impl Fn(f32) -> bool,
    requirement: &'static str,
) -> Result<(), RtmError> {
    for ((column, level), &value) in array.indexed_iter() {
        if !value.is_nan() && !ok(value) {
            return Err(RtmError::ProfileDomain {
                array: name,
                column,
                level,
                value,
                requirement,
            });
        }
    }
    Ok(())
}

fn check_surface_domain(
    array: ArrayView1<'_, f32>,
    name: &'static str,
    ok: impl Fn(f32) -> bool,
    requirement: &'static str,
) -> Result<(), RtmError> {
    for (column, &value) in array.iter().enumerate() {
        if !value.is_nan() && !ok(value) {
            return Err(RtmError::SurfaceDomain {
                array: name,
                column,
                value,
                requirement,
            });
        }
    }
    Ok(())
}

/// Determine whether the pressure levels run surface-first (descending) or
/// top-first (ascending), rejecting any series that changes direction or
/// repeats a value.
fn pressure_direction(pressure: ArrayView1<'_, f32>) -> Result<LevelOrder, RtmError> {
    // A single level is trivially monotonic; treat it as surface-first.
    let Some(order) = series_direction(pressure.iter().copied()) else {
        return Ok(LevelOrder::SurfaceFirst);
    };
    order.map_err(|level| RtmError::NonMonotonicPressure { level })
}

/// Strict direction of a numeric series.
///
/// Returns `None` for a series with fewer than two elements, `Some(Ok(..))`
/// for a strictly monotonic series, and `Some(Err(i))` with the index of
/// the second element of the first offending pair otherwise.
fn series_direction<F, I>(series: I) -> Option<Result<LevelOrder, usize>>
where
    F: Float + Debug,
    I: IntoIterator<Item = F>,
{
    let mut pairs = series.into_iter().tuple_windows().enumerate();
    let (_, (first, second)) = pairs.next()?;
    let descending = match second.partial_cmp(&first) {
        Some(std::cmp::Ordering::Less) => true,
        Some(std::cmp::Ordering::Greater) => false,
        _ => return Some(Err(1)),
    };

    for (i, (prev, next)) in pairs {
        let ok = if descending { next < prev } else { next > prev };
        if !ok {
            return Some(Err(i + 1));
        }
    }

    Some(Ok(if descending {
        LevelOrder::SurfaceFirst
    } else {
        LevelOrder::TopFirst
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array1, Array2};

    fn valid_grid_arrays() -> (
        Array1<f32>,
        Array2<f32>,
        Array2<f32>,
        Array2<f32>,
        Array2<f32>,
        Array1<f32>,
        Array1<f32>,
        Array1<f32>,
        Array1<f32>,
    ) {
        (
            arr1(&[1000.0, 850.0, 500.0]),
            arr2(&[[288.0, 280.0, 255.0]]),
            arr2(&[[100.0, 1500.0, 5500.0]]),
            arr2(&[[8.0e-3, 4.0e-3, 1.0e-3]]),
            arr2(&[[0.0, 1.0e-5, 0.0]]),
            arr1(&[289.0]),
            arr1(&[50.0]),
            arr1(&[284.0]),
            arr1(&[1010.0]),
        )
    }

    macro_rules! grid_from {
        ($arrs:expr) => {
            ProfileGrid {
                pressure: $arrs.0.view(),
                temperature: $arrs.1.view(),
                height: $arrs.2.view(),
                specific_humidity: $arrs.3.view(),
                liquid_content: $arrs.4.view(),
                surface_temperature: $arrs.5.view(),
                surface_height: $arrs.6.view(),
                surface_dewpoint: $arrs.7.view(),
                surface_pressure: $arrs.8.view(),
            }
        };
    }

    #[test]
    fn test_valid_grid_passes() {
        let arrs = valid_grid_arrays();
        let grid = grid_from!(arrs);
        assert_eq!(validate_grid(&grid).unwrap(), LevelOrder::SurfaceFirst);
    }

    #[test]
    fn test_top_first_levels_detected() {
        let mut arrs = valid_grid_arrays();
        arrs.0 = arr1(&[500.0, 850.0, 1000.0]);
        let grid = grid_from!(arrs);
        assert_eq!(validate_grid(&grid).unwrap(), LevelOrder::TopFirst);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let mut arrs = valid_grid_arrays();
        arrs.2 = arr2(&[[100.0, 1500.0]]);
        let grid = grid_from!(arrs);
        let err = validate_grid(&grid).unwrap_err();
        assert_eq!(
            err,
            RtmError::ProfileShape {
                array: "height",
                rows: 1,
                cols: 2,
                num_points: 1,
                num_levels: 3
            }
        );
    }

    #[test]
    fn test_surface_length_mismatch_is_reported() {
        let mut arrs = valid_grid_arrays();
        arrs.8 = arr1(&[1010.0, 1005.0]);
        let grid = grid_from!(arrs);
        let err = validate_grid(&grid).unwrap_err();
        assert_eq!(
            err,
            RtmError::SeriesLength {
                array: "surface_pressure",
                actual: 2,
                expected: 1
            }
        );
    }

    #[test]
    fn test_negative_pressure_rejected() {
        let mut arrs = valid_grid_arrays();
        arrs.0 = arr1(&[1000.0, -850.0, 500.0]);
        let grid = grid_from!(arrs);
        let err = validate_grid(&grid).unwrap_err();
        assert!(matches!(
            err,
            RtmError::LevelDomain {
                array: "pressure",
                level: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_nan_in_shared_pressure_rejected() {
        let mut arrs = valid_grid_arrays();
        arrs.0 = arr1(&[1000.0, f32::NAN, 500.0]);
        let grid = grid_from!(arrs);
        assert!(matches!(
            validate_grid(&grid).unwrap_err(),
            RtmError::LevelDomain { level: 1, .. }
        ));
    }

    #[test]
    fn test_non_monotonic_pressure_rejected() {
        let mut arrs = valid_grid_arrays();
        arrs.0 = arr1(&[1000.0, 500.0, 850.0]);
        let grid = grid_from!(arrs);
        assert_eq!(
            validate_grid(&grid).unwrap_err(),
            RtmError::NonMonotonicPressure { level: 2 }
        );
    }

    #[test]
    fn test_negative_temperature_names_column_and_level() {
        let mut arrs = valid_grid_arrays();
        arrs.1 = arr2(&[[288.0, -1.0, 255.0]]);
        let grid = grid_from!(arrs);
        let err = validate_grid(&grid).unwrap_err();
        assert!(matches!(
            err,
            RtmError::ProfileDomain {
                array: "temperature",
                column: 0,
                level: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_nan_in_column_passes_through() {
        // Missing-data sentinel: a NaN in a per-column array is not a
        // validation failure.
        let mut arrs = valid_grid_arrays();
        arrs.1 = arr2(&[[288.0, f32::NAN, 255.0]]);
        arrs.8 = arr1(&[f32::NAN]);
        let grid = grid_from!(arrs);
        assert!(validate_grid(&grid).is_ok());
    }

    #[test]
    fn test_series_direction() {
        assert_eq!(
            series_direction([3.0f32, 2.0, 1.0]),
            Some(Ok(LevelOrder::SurfaceFirst))
        );
        assert_eq!(
            series_direction([1.0f32, 2.0, 3.0]),
            Some(Ok(LevelOrder::TopFirst))
        );
        assert_eq!(series_direction([1.0f32, 2.0, 2.0]), Some(Err(2)));
        assert_eq!(series_direction([1.0f32, 1.0]), Some(Err(1)));
        assert_eq!(series_direction([1.0f32]), None);
        assert_eq!(series_direction::<f32, _>([]), None);
    }
}
