//! Vertical integration of the radiative transfer equation.
//!
//! Given one column's absorption and temperature along the path and a
//! channel's incidence angle, compute the slant-path transmissivity and the
//! up/downwelling brightness temperatures. Purely a function of its inputs;
//! no state is carried between columns or channels.

use itertools::izip;
use itertools::Itertools;

/// Radiation incident at the top of the atmosphere from space, in K.
pub const COSMIC_BACKGROUND: f32 = 2.73;

/// Flattening parameter in the curvature-corrected secant; keeps the slant
/// factor finite as the incidence angle approaches 90°.
const SLANT_DELTA: f32 = 0.00035;

/// Atmospheric quantities for one (column, channel) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRadiance {
    /// Transmissivity along the slant path, in [0, 1].
    pub transmissivity: f32,
    /// Upwelling atmospheric brightness temperature in K.
    pub tb_up: f32,
    /// Downwelling atmospheric brightness temperature at the surface in K.
    pub tb_down: f32,
}

impl PathRadiance {
    /// The value recorded for a column whose inputs are missing.
    pub(crate) fn missing() -> Self {
        Self {
            transmissivity: f32::NAN,
            tb_up: f32::NAN,
            tb_down: f32::NAN,
        }
    }
}

/// Slant-path lengthening factor for an Earth incidence angle in degrees.
///
/// A curvature-corrected secant: equal to sec(inc) to first order, but
/// bounded for near-grazing geometry.
fn slant_factor(incidence_deg: f32) -> f32 {
    (1.0 + SLANT_DELTA)
        / (incidence_deg.to_radians().cos().powi(2) + SLANT_DELTA * (2.0 + SLANT_DELTA)).sqrt()
}

/// Integrate the radiative transfer equation along one slant path.
///
/// `temperature` (K), `height` (m), and `absorption` (Np/m) run from the
/// surface to the top of the profile and must have equal lengths. Layers
/// are taken between consecutive levels with trapezoidal means; the
/// emission weight of each layer uses `exp_m1` so optically thin layers do
/// not lose their emission to cancellation. The downwelling term includes
/// the cosmic background attenuated by the whole column.
pub fn integrate_path(
    incidence_deg: f32,
    temperature: &[f32],
    height: &[f32],
    absorption: &[f32],
) -> PathRadiance {
    debug_assert_eq!(temperature.len(), height.len());
    debug_assert_eq!(temperature.len(), absorption.len());

    let dsdh = slant_factor(incidence_deg);

    // Per-layer slant optical depth and mean temperature
    let (opacity, t_avg): (Vec<f32>, Vec<f32>) = izip!(temperature, height, absorption)
        .tuple_windows()
        .map(|((&t0, &z0, &a0), (&t1, &z1, &a1))| {
            (dsdh * 0.5 * (a0 + a1) * (z1 - z0), 0.5 * (t0 + t1))
        })
        .unzip();

    // Upwelling: each layer's emission attenuated by everything above it,
    // walked from the top down so the overburden accumulates as we go.
    let mut tb_up = 0.0_f32;
    let mut op_above = 0.0_f32;
    for (&delta, &t) in opacity.iter().zip(&t_avg).rev() {
        let emission = -(-delta).exp_m1();
        tb_up += t * emission * (-op_above).exp();
        op_above += delta;
    }
    let total_opacity = op_above;

    // Downwelling: the mirror image, attenuated by everything between the
    // layer and the surface.
    let mut tb_down = 0.0_f32;
    let mut op_below = 0.0_f32;
    for (&delta, &t) in opacity.iter().zip(&t_avg) {
        let emission = -(-delta).exp_m1();
        tb_down += t * emission * (-op_below).exp();
        op_below += delta;
    }

    let transmissivity = (-total_opacity).exp();
    let tb_down = tb_down + COSMIC_BACKGROUND * transmissivity;

    PathRadiance {
        transmissivity,
        tb_up,
        tb_down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_slant_factor_is_secant_at_moderate_angles() {
        assert_relative_eq!(slant_factor(0.0), 1.0, max_relative = 1e-3);
        assert_relative_eq!(
            slant_factor(60.0),
            2.0,
            max_relative = 1e-2
        );
        // Bounded at grazing incidence
        assert!(slant_factor(89.9).is_finite());
    }

    #[test]
    fn test_transparent_atmosphere() {
        // No absorption anywhere: tau = 1, no emission, only the cosmic
        // background comes down.
        let t = [289.0, 280.0, 255.0, 220.0];
        let z = [10.0, 1500.0, 5500.0, 12000.0];
        let a = [0.0, 0.0, 0.0, 0.0];
        let out = integrate_path(0.0, &t, &z, &a);
        assert_eq!(out.transmissivity, 1.0);
        assert_eq!(out.tb_up, 0.0);
        assert_abs_diff_eq!(out.tb_down, COSMIC_BACKGROUND);
    }

    #[test]
    fn test_single_layer_transparent_column() {
        // The single-level scenario: surface plus one level, no absorber
        let out = integrate_path(0.0, &[289.0, 280.0], &[10.0, 1500.0], &[0.0, 0.0]);
        assert_eq!(out.transmissivity, 1.0);
        assert_eq!(out.tb_up, 0.0);
        assert_abs_diff_eq!(out.tb_down, COSMIC_BACKGROUND);
    }

    #[test]
    fn test_uniform_slab_transmissivity() {
        // Constant absorption alpha over total height H at nadir:
        // tau = exp(-alpha * H)
        let alpha = 2.0e-4_f32;
        let t = [280.0, 280.0, 280.0];
        let z = [0.0, 1000.0, 2000.0];
        let a = [alpha, alpha, alpha];
        let out = integrate_path(0.0, &t, &z, &a);
        assert_relative_eq!(
            out.transmissivity,
            (-alpha * 2000.0).exp(),
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_slant_path_reduces_transmissivity() {
        let t = [280.0, 270.0, 250.0];
        let z = [0.0, 2000.0, 8000.0];
        let a = [1.0e-4, 5.0e-5, 1.0e-5];
        let nadir = integrate_path(0.0, &t, &z, &a);
        let slant = integrate_path(55.0, &t, &z, &a);
        assert!(slant.transmissivity < nadir.transmissivity);
        assert!(slant.tb_up > nadir.tb_up);
    }

    #[test]
    fn test_opaque_isothermal_atmosphere_saturates() {
        // An optically thick isothermal slab radiates at its physical
        // temperature from both ends and transmits nothing.
        let temp = 260.0_f32;
        let t = [temp; 4];
        let z = [0.0, 1000.0, 2000.0, 3000.0];
        let a = [5.0e-2; 4];
        let out = integrate_path(0.0, &t, &z, &a);
        assert_abs_diff_eq!(out.transmissivity, 0.0, epsilon = 1e-6);
        assert_relative_eq!(out.tb_up, temp, max_relative = 1e-4);
        assert_relative_eq!(out.tb_down, temp, max_relative = 1e-4);
    }

    #[test]
    fn test_brightness_bounded_by_warmest_layer() {
        let t = [300.0, 280.0, 240.0, 210.0];
        let z = [0.0, 3000.0, 8000.0, 16000.0];
        let a = [8.0e-4, 4.0e-4, 1.0e-4, 2.0e-5];
        let out = integrate_path(30.0, &t, &z, &a);
        let warmest = 300.0;
        assert!(out.tb_up > 0.0 && out.tb_up < warmest);
        assert!(out.tb_down >= COSMIC_BACKGROUND && out.tb_down < warmest);
        assert!((0.0..=1.0).contains(&out.transmissivity));
    }

    #[test]
    fn test_zero_thickness_layer_is_harmless() {
        let t = [289.0, 285.0, 285.0, 255.0];
        let z = [10.0, 1500.0, 1500.0, 5500.0];
        let a = [2.0e-4, 1.5e-4, 1.5e-4, 5.0e-5];
        let with_dup = integrate_path(0.0, &t, &z, &a);
        assert!(with_dup.transmissivity.is_finite());

        // The coincident level contributes nothing
        let t2 = [289.0, 285.0, 255.0];
        let z2 = [10.0, 1500.0, 5500.0];
        let a2 = [2.0e-4, 1.5e-4, 5.0e-5];
        let without = integrate_path(0.0, &t2, &z2, &a2);
        assert_relative_eq!(
            with_dup.transmissivity,
            without.transmissivity,
            max_relative = 1e-6
        );
        assert_abs_diff_eq!(with_dup.tb_up, without.tb_up, epsilon = 1e-3);
        assert_abs_diff_eq!(with_dup.tb_down, without.tb_down, epsilon = 1e-3);
    }

    #[test]
    fn test_refining_a_uniform_profile_converges() {
        // Splitting a uniform isothermal slab into more layers is not a
        // physical change; the outputs only move by discretization error.
        let alpha = 1.0e-4_f32;
        let temp = 270.0_f32;

        let coarse = integrate_path(
            0.0,
            &[temp; 3],
            &[0.0, 5000.0, 10000.0],
            &[alpha; 3],
        );

        let n = 41;
        let t_fine = vec![temp; n];
        let z_fine: Vec<f32> = (0..n).map(|i| i as f32 * 10000.0 / (n - 1) as f32).collect();
        let a_fine = vec![alpha; n];
        let fine = integrate_path(0.0, &t_fine, &z_fine, &a_fine);

        assert_relative_eq!(
            coarse.transmissivity,
            fine.transmissivity,
            max_relative = 1e-4
        );
        assert_abs_diff_eq!(coarse.tb_up, fine.tb_up, epsilon = 0.1);
        assert_abs_diff_eq!(coarse.tb_down, fine.tb_down, epsilon = 0.1);
    }

    #[test]
    fn test_thin_layer_emission_does_not_cancel() {
        // An extremely thin absorbing layer: the emission weight must come
        // out positive and proportional to the optical depth, not zero.
        let t = [280.0, 280.0];
        let z = [0.0, 1.0];
        let a = [1.0e-9, 1.0e-9];
        let out = integrate_path(0.0, &t, &z, &a);
        assert!(out.tb_up > 0.0);
        assert_relative_eq!(out.tb_up, 280.0 * 1.0e-9, max_relative = 1e-3);
    }

    #[test]
    fn test_nan_absorption_propagates() {
        let t = [289.0, 280.0];
        let z = [10.0, 1500.0];
        let a = [f32::NAN, 1.0e-4];
        let out = integrate_path(0.0, &t, &z, &a);
        assert!(out.transmissivity.is_nan());
        assert!(out.tb_up.is_nan());
        assert!(out.tb_down.is_nan());
    }
}
