//! Per-column marshaling: from gridded fields to one integration path.
//!
//! The level stack of a reanalysis product extends below ground wherever
//! the terrain rises above the lowest pressure level, so the integration
//! path for a column does not simply start at index 0. This module splices
//! the surface state into the level profile at the first level at or above
//! the surface pressure, and converts the gridded quantities into the ones
//! the absorption model wants: geometric height, water vapor partial
//! pressure, and liquid water density.

use itertools::Either;
use ndarray::ArrayView1;

use crate::error::RtmError;
use crate::grid::{LevelOrder, SurfaceState};

/// Mean radius of the Earth in meters
const R_EARTH: f32 = 6371e3;
/// Ideal gas constant (J/mol/K)
const R_GAS: f32 = 8.3144598;
/// Mean molar mass of dry air (g/mol)
const M_DRY: f32 = 28.9644;
/// Mean molar mass of water (g/mol)
const M_H2O: f32 = 18.01528;
/// Specific gas constant for dry air (J/g/K)
const R_DRY: f32 = R_GAS / M_DRY;
/// Specific gas constant for water vapor (J/g/K)
const R_VAPOR: f32 = R_GAS / M_H2O;
/// Ratio of the molar masses of water and dry air
const EPSILON: f32 = M_H2O / M_DRY;
/// Virtual-temperature scaling factor derived from EPSILON
const EPS_SCALE: f32 = (1.0 - EPSILON) / EPSILON;

/// One column prepared for vertical integration.
///
/// Index 0 is the surface; indices 1.. are the levels above it, ordered
/// surface to top regardless of how the batch stores its levels. All
/// vectors have the same length, at least 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPath {
    /// Pressure in hPa.
    pressure: Vec<f32>,
    /// Temperature in K.
    temperature: Vec<f32>,
    /// Geometric height in m.
    height: Vec<f32>,
    /// Water vapor partial pressure in hPa.
    vapor_pressure: Vec<f32>,
    /// Liquid cloud water density in g/m³.
    liquid_density: Vec<f32>,
}

impl ColumnPath {
    /// Build the integration path for one column.
    ///
    /// `levels` must already be in surface-first order (the kernel
    /// normalizes the shared pressure array once per batch); `order` says
    /// how the per-column views are stored so they can be walked in the
    /// same direction. `column` is only used to identify the column in
    /// errors.
    pub fn build(
        levels: &[f32],
        order: LevelOrder,
        column: usize,
        temperature: ArrayView1<'_, f32>,
        height: ArrayView1<'_, f32>,
        specific_humidity: ArrayView1<'_, f32>,
        liquid_content: ArrayView1<'_, f32>,
        surface: SurfaceState,
    ) -> Result<Self, RtmError> {
        // First level at or above the surface; levels below ground are
        // dropped from the path.
        let surface_index = levels
            .iter()
            .position(|&p| p <= surface.pressure)
            .ok_or(RtmError::NoSurface { column })?;
        let path_len = levels.len() - surface_index + 1;

        let pressure: Vec<f32> = std::iter::once(surface.pressure)
            .chain(levels[surface_index..].iter().copied())
            .collect();

        let temperature: Vec<f32> = std::iter::once(surface.temperature)
            .chain(oriented(temperature, order).skip(surface_index))
            .collect();

        // Geopotential height, surface first, then converted to geometric
        // height in place.
        let mut height: Vec<f32> = std::iter::once(surface.height)
            .chain(oriented(height, order).skip(surface_index))
            .collect();
        for z in &mut height {
            *z *= R_EARTH / (R_EARTH - *z);
        }
        // Over steep terrain the surface can sit above the first retained
        // level; nudge it just below so the bottom layer keeps a positive
        // thickness.
        if height[0] >= height[1] {
            height[0] = height[1] - 0.1;
        }

        // Water vapor partial pressure: Buck equation at the surface (from
        // the 2 m dewpoint), mixing-ratio conversion aloft.
        let vapor_pressure: Vec<f32> = std::iter::once(buck_vapor_pressure(surface.dewpoint))
            .chain(
                oriented(specific_humidity, order)
                    .zip(levels.iter().copied())
                    .skip(surface_index)
                    .map(|(q, p)| {
                        let w = q / (1.0 - q);
                        (w * p) / (R_DRY / R_VAPOR + w)
                    }),
            )
            .collect();

        // Specific cloud liquid water content in kg/kg; the surface slot
        // takes the value of the first level above it.
        let liquid_mixing: Vec<f32> = {
            let mut q_l: Vec<f32> = std::iter::once(0.0)
                .chain(oriented(liquid_content, order).skip(surface_index))
                .collect();
            q_l[0] = q_l[1];
            q_l
        };

        // Convert liquid content to density using the moist-air gas
        // constant; the specific humidity is recomputed from the vapor
        // pressure so the spliced surface slot is consistent.
        let liquid_density: Vec<f32> = itertools::izip!(&liquid_mixing, &pressure, &temperature, &vapor_pressure)
            .map(|(&q_l, &p, &t, &pv)| {
                let w = (pv * R_DRY) / (R_VAPOR * (p - pv));
                let q_h2o = w / (w + 1.0);
                let r_moist = R_DRY * (1.0 + EPS_SCALE * q_h2o);
                q_l * (1.0e2 * p) / (r_moist * t)
            })
            .collect();

        debug_assert_eq!(pressure.len(), path_len);
        debug_assert_eq!(temperature.len(), path_len);

        Ok(Self {
            pressure,
            temperature,
            height,
            vapor_pressure,
            liquid_density,
        })
    }

    /// Temperature in K along the path, surface first.
    pub fn temperature(&self) -> &[f32] {
        &self.temperature
    }

    /// Geometric height in m along the path, surface first.
    pub fn height(&self) -> &[f32] {
        &self.height
    }

    /// Total absorption coefficient in Np/m at each path level for one
    /// frequency in GHz.
    pub fn absorption_profile(&self, frequency: f32) -> Vec<f32> {
        itertools::izip!(
            &self.pressure,
            &self.temperature,
            &self.vapor_pressure,
            &self.liquid_density
        )
        .map(|(&p, &t, &pv, &rho_l)| crate::absorption::level_absorption(p, t, pv, rho_l, frequency))
        .collect()
    }

    #[cfg(test)]
    pub(crate) fn vapor_pressure(&self) -> &[f32] {
        &self.vapor_pressure
    }

    #[cfg(test)]
    pub(crate) fn liquid_density(&self) -> &[f32] {
        &self.liquid_density
    }
}

/// Walk a per-column view in surface-first order.
fn oriented(
    view: ArrayView1<'_, f32>,
    order: LevelOrder,
) -> impl Iterator<Item = f32> + '_ {
    match order {
        LevelOrder::SurfaceFirst => Either::Left(view.into_iter().copied()),
        LevelOrder::TopFirst => Either::Right(view.into_iter().rev().copied()),
    }
}

/// Saturation water vapor pressure in hPa for a temperature in K.
///
/// The Buck (1996) fit; applied to the dewpoint it yields the actual vapor
/// partial pressure.
fn buck_vapor_pressure(temp: f32) -> f32 {
    let temp_c = temp - 273.15;
    6.1121 * f32::exp((18.678 - temp_c / 234.5) * (temp_c / (257.14 + temp_c)))
}
