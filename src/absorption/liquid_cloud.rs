//! Cloud liquid water absorption.
//!
//! Rayleigh absorption by cloud droplets, which are far smaller than
//! microwave wavelengths, using the Meissner & Wentz (2004) double-Debye
//! dielectric model of pure water. Scattering by precipitation-sized
//! particles is out of scope.

use std::f32::consts::PI;

/// Speed of light in cm GHz (wavelength in cm = C / frequency in GHz)
const C_CM_GHZ: f32 = 29.979;

/// Cloud liquid water absorption coefficient in Np/km.
///
/// For a frequency `freq` in GHz, temperature `t` in K, and liquid water
/// density `rho_l` in g/m³.
pub fn absorption(freq: f32, t: f32, rho_l: f32) -> f32 {
    // g/m³ → g/cm³ to keep the Rayleigh expression in CGS
    let rho_cgs = 1.0e-6 * rho_l;
    let wavelength = C_CM_GHZ / freq;

    let (re, loss) = pure_water_dielectric(freq, t);
    // Im[(1 - eps) / (2 + eps)] written out for eps = re - i*loss
    let rayleigh = (6.0 * PI * rho_cgs / wavelength) * 3.0 * loss
        / ((2.0 + re).powi(2) + loss.powi(2));

    // Np/cm → Np/km
    rayleigh * 1.0e5
}

/// Complex dielectric constant of pure water, as (real, loss) parts.
///
/// The Meissner & Wentz (2004) fit, double-Debye relaxation with
/// polynomial temperature dependence, specialized to zero salinity (cloud
/// droplets are fresh water; the saline branches of the published model are
/// not carried here). Valid from roughly -25 °C to 40 °C and 1–400 GHz.
///
/// Reference: T. Meissner and F. J. Wentz, "The complex dielectric constant
/// of pure and sea water from microwave satellite observations", IEEE TGRS
/// 42(9), 2004, <https://doi.org/10.1109/TGRS.2004.831888>.
fn pure_water_dielectric(freq: f32, t: f32) -> (f32, f32) {
    #![allow(clippy::excessive_precision)]
    /// Fit coefficients for the pure-water Debye parameters
    const X: [f32; 11] = [
        5.7230e+00,
        2.2379e-02,
        -7.1237e-04,
        5.0478e+00,
        -7.0315e-02,
        6.0059e-04,
        3.6143e+00,
        2.8841e-02,
        1.3652e-01,
        1.4825e-03,
        2.4166e-04,
    ];

    // The relaxation frequencies go to zero for very cold water; clamp the
    // temperature to keep them positive.
    let sst = (t - 273.15).max(-30.16);
    let sst_sq = sst * sst;

    // Static dielectric constant (Stogryn et al.) and the two Debye
    // relaxation terms
    let e0 = (3.70886e4 - 8.2168e1 * sst) / (4.21854e2 + sst);
    let e1 = X[0] + X[1] * sst + X[2] * sst_sq;
    let n1 = (45.0 + sst) / (X[3] + X[4] * sst + X[5] * sst_sq);
    let e2 = X[6] + X[7] * sst;
    let n2 = (45.0 + sst) / (X[8] + X[9] * sst + X[10] * sst_sq);

    let x1 = freq / n1;
    let x2 = freq / n2;
    let re = (e0 - e1) / (1.0 + x1 * x1) + (e1 - e2) / (1.0 + x2 * x2) + e2;
    let loss = (e0 - e1) * x1 / (1.0 + x1 * x1) + (e1 - e2) * x2 / (1.0 + x2 * x2);

    (re, loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_absorption_positive_for_liquid_cloud() {
        for freq in [6.9, 18.7, 37.0, 89.0] {
            let a = absorption(freq, 280.0, 0.2);
            assert!(a > 0.0, "cloud absorption at {freq} GHz was {a}");
        }
    }

    #[test]
    fn test_linear_in_density() {
        // Rayleigh absorption scales linearly with liquid water content
        let a1 = absorption(37.0, 280.0, 0.1);
        let a2 = absorption(37.0, 280.0, 0.2);
        assert_relative_eq!(a2, 2.0 * a1, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_density_gives_zero() {
        assert_eq!(absorption(37.0, 280.0, 0.0), 0.0);
    }

    #[test]
    fn test_increases_with_frequency_in_microwave() {
        // Below the relaxation peak, cloud absorption rises with frequency
        let low = absorption(6.9, 280.0, 0.2);
        let high = absorption(37.0, 280.0, 0.2);
        assert!(high > low);
    }

    #[test]
    fn test_static_dielectric_near_published_value() {
        // Pure water at 20 °C has a static dielectric constant near 80; at
        // low frequency the real part should approach it.
        let (re, loss) = pure_water_dielectric(0.01, 293.15);
        assert!((78.0..82.5).contains(&re), "re = {re}");
        assert!(loss.abs() < 1.0);
    }

    #[test]
    fn test_loss_positive_in_band() {
        let (_, loss) = pure_water_dielectric(37.0, 280.0);
        assert!(loss > 0.0);
    }
}
