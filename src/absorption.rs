//! Per-layer microwave absorption physics.
//!
//! Three contributions — dry air/oxygen, water vapor, and cloud liquid
//! water — each returned in Np/km by its submodule and summed here into a
//! per-level coefficient in Np/m. Every function is a pure, smooth function
//! of its thermodynamic inputs over the validated domain; a NaN input
//! propagates to a NaN coefficient rather than silently becoming zero.

pub mod liquid_cloud;
pub mod oxygen;
pub mod water_vapor;

/// Scaling factor to convert from dB to nepers: `0.1 * ln(10)`
pub(crate) const NEPERS_PER_DB: f32 = 0.1 * std::f32::consts::LN_10;

/// Cloud water densities at or below this value (g/m³) contribute exactly
/// zero absorption, so vanishing cloud amounts tend smoothly to zero
/// instead of accumulating numerical noise.
const CLOUD_DENSITY_FLOOR: f32 = 1.0e-7;

/// Total absorption coefficient at one profile level.
///
/// For a pressure in hPa, temperature in K, water vapor partial pressure in
/// hPa, liquid cloud water density in g/m³, and frequency in GHz, return
/// the combined oxygen + water vapor + cloud absorption coefficient in
/// Np/m.
pub fn level_absorption(
    pressure: f32,
    temperature: f32,
    vapor_pressure: f32,
    liquid_density: f32,
    frequency: f32,
) -> f32 {
    let oxygen = oxygen::absorption(pressure, temperature, vapor_pressure, frequency);
    let vapor = water_vapor::absorption(pressure, temperature, vapor_pressure, frequency);

    // The NaN arm keeps a missing liquid value from masquerading as a
    // cloud-free level.
    let cloud = if liquid_density > CLOUD_DENSITY_FLOOR || liquid_density.is_nan() {
        liquid_cloud::absorption(frequency, temperature, liquid_density)
    } else {
        0.0
    };

    // Np/km → Np/m
    (oxygen + vapor + cloud) * 1.0e-3
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Mid-latitude near-surface conditions used across the tests
    const P: f32 = 1000.0;
    const T: f32 = 288.0;
    const PV: f32 = 10.0;

    #[rstest]
    #[case(6.9)]
    #[case(23.8)]
    #[case(37.0)]
    #[case(50.3)]
    #[case(57.95)]
    #[case(89.0)]
    fn test_all_contributions_positive_in_band(#[case] freq: f32) {
        let total = level_absorption(P, T, PV, 0.1, freq);
        assert!(
            total > 0.0,
            "total absorption at {freq} GHz should be positive, got {total}"
        );
    }

    #[rstest]
    #[case(23.8)]
    #[case(50.3)]
    #[case(89.0)]
    fn test_absorption_monotonic_in_vapor_pressure(#[case] freq: f32) {
        // More water vapor never absorbs less
        let dry = level_absorption(P, T, 0.0, 0.0, freq);
        let moist = level_absorption(P, T, 5.0, 0.0, freq);
        let moister = level_absorption(P, T, 25.0, 0.0, freq);
        assert!(dry < moist, "at {freq} GHz");
        assert!(moist < moister, "at {freq} GHz");
    }

    #[test]
    fn test_tiny_liquid_amounts_are_exactly_zero() {
        let clear = level_absorption(P, T, PV, 0.0, 37.0);
        let trace = level_absorption(P, T, PV, 0.5e-7, 37.0);
        assert_eq!(clear, trace);
    }

    #[test]
    fn test_cloud_contribution_adds_absorption() {
        let clear = level_absorption(P, T, PV, 0.0, 37.0);
        let cloudy = level_absorption(P, T, PV, 0.2, 37.0);
        assert!(cloudy > clear);
    }

    #[test]
    fn test_nan_inputs_propagate() {
        assert!(level_absorption(f32::NAN, T, PV, 0.0, 50.3).is_nan());
        assert!(level_absorption(P, f32::NAN, PV, 0.0, 50.3).is_nan());
        assert!(level_absorption(P, T, f32::NAN, 0.0, 50.3).is_nan());
        // A NaN liquid density must not silently read as cloud-free
        assert!(level_absorption(P, T, PV, f32::NAN, 50.3).is_nan());
    }

    #[test]
    fn test_oxygen_band_peaks_near_60_ghz() {
        // The 50–70 GHz oxygen complex dominates; absorption deep in the
        // band must exceed absorption at its edges.
        let edge = level_absorption(P, T, 0.0, 0.0, 50.3);
        let deep = level_absorption(P, T, 0.0, 0.0, 57.95);
        assert!(deep > edge);
    }
}
