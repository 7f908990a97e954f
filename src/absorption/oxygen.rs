//! Oxygen (dry air) absorption.
//!
//! The 1992 Liebe/Rosenkranz/Hufford 60 GHz oxygen spectrum with the Wentz
//! modifications: a nonresonant pressure-induced term and an empirical
//! correction above 37 GHz.

use super::NEPERS_PER_DB;

/// One spectral line of the oxygen model.
#[derive(Debug, Clone, Copy)]
struct OxygenLine {
    /// Line center frequency in GHz
    f0: f32,
    /// Line intensity at 300 K
    intensity: f32,
    /// Temperature exponent of the intensity
    t_exp: f32,
    /// Pressure-broadened line width
    width: f32,
    /// Line-mixing (interference) coefficients
    mix1: f32,
    mix2: f32,
}

const N_LINES: usize = 44;

/// The 60 GHz band complex, the 118.75 GHz line, and six submillimeter
/// lines, from the published 1992 model.
#[allow(clippy::excessive_precision)]
const LINES: [OxygenLine; N_LINES] = [
    OxygenLine { f0: 50.474238, intensity: 0.94e-6, t_exp: 9.694, width: 8.60e-3, mix1: 0.210, mix2: 0.685 },
    OxygenLine { f0: 50.987749, intensity: 2.46e-6, t_exp: 8.694, width: 8.70e-3, mix1: 0.190, mix2: 0.680 },
    OxygenLine { f0: 51.503350, intensity: 6.08e-6, t_exp: 7.744, width: 8.90e-3, mix1: 0.171, mix2: 0.673 },
    OxygenLine { f0: 52.021410, intensity: 14.14e-6, t_exp: 6.844, width: 9.20e-3, mix1: 0.144, mix2: 0.664 },
    OxygenLine { f0: 52.542394, intensity: 31.02e-6, t_exp: 6.004, width: 9.40e-3, mix1: 0.118, mix2: 0.653 },
    OxygenLine { f0: 53.066907, intensity: 64.10e-6, t_exp: 5.224, width: 9.70e-3, mix1: 0.114, mix2: 0.621 },
    OxygenLine { f0: 53.595749, intensity: 124.70e-6, t_exp: 4.484, width: 10.00e-3, mix1: 0.200, mix2: 0.508 },
    OxygenLine { f0: 54.130000, intensity: 228.00e-6, t_exp: 3.814, width: 10.20e-3, mix1: 0.291, mix2: 0.375 },
    OxygenLine { f0: 54.671159, intensity: 391.80e-6, t_exp: 3.194, width: 10.50e-3, mix1: 0.325, mix2: 0.265 },
    OxygenLine { f0: 55.221367, intensity: 631.60e-6, t_exp: 2.624, width: 10.79e-3, mix1: 0.224, mix2: 0.295 },
    OxygenLine { f0: 55.783802, intensity: 953.50e-6, t_exp: 2.119, width: 11.10e-3, mix1: -0.144, mix2: 0.613 },
    OxygenLine { f0: 56.264775, intensity: 548.90e-6, t_exp: 0.015, width: 16.46e-3, mix1: 0.339, mix2: -0.098 },
    OxygenLine { f0: 56.363389, intensity: 1344.00e-6, t_exp: 1.660, width: 11.44e-3, mix1: -0.258, mix2: 0.655 },
    OxygenLine { f0: 56.968206, intensity: 1763.00e-6, t_exp: 1.260, width: 11.81e-3, mix1: -0.362, mix2: 0.645 },
    OxygenLine { f0: 57.612484, intensity: 2141.00e-6, t_exp: 0.915, width: 12.21e-3, mix1: -0.533, mix2: 0.606 },
    OxygenLine { f0: 58.323877, intensity: 2386.00e-6, t_exp: 0.626, width: 12.66e-3, mix1: -0.178, mix2: 0.044 },
    OxygenLine { f0: 58.446590, intensity: 1457.00e-6, t_exp: 0.084, width: 14.49e-3, mix1: 0.650, mix2: -0.127 },
    OxygenLine { f0: 59.164207, intensity: 2404.00e-6, t_exp: 0.391, width: 13.19e-3, mix1: -0.628, mix2: 0.231 },
    OxygenLine { f0: 59.590983, intensity: 2112.00e-6, t_exp: 0.212, width: 13.60e-3, mix1: 0.665, mix2: -0.078 },
    OxygenLine { f0: 60.306061, intensity: 2124.00e-6, t_exp: 0.212, width: 13.82e-3, mix1: -0.613, mix2: 0.070 },
    OxygenLine { f0: 60.434776, intensity: 2461.00e-6, t_exp: 0.391, width: 12.97e-3, mix1: 0.606, mix2: -0.282 },
    OxygenLine { f0: 61.150560, intensity: 2504.00e-6, t_exp: 0.626, width: 12.48e-3, mix1: 0.090, mix2: -0.058 },
    OxygenLine { f0: 61.800154, intensity: 2298.00e-6, t_exp: 0.915, width: 12.07e-3, mix1: 0.496, mix2: -0.662 },
    OxygenLine { f0: 62.411215, intensity: 1933.00e-6, t_exp: 1.260, width: 11.71e-3, mix1: 0.313, mix2: -0.676 },
    OxygenLine { f0: 62.486260, intensity: 1517.00e-6, t_exp: 0.083, width: 14.68e-3, mix1: -0.433, mix2: 0.084 },
    OxygenLine { f0: 62.997977, intensity: 1503.00e-6, t_exp: 1.665, width: 11.39e-3, mix1: 0.208, mix2: -0.668 },
    OxygenLine { f0: 63.568518, intensity: 1087.00e-6, t_exp: 2.115, width: 11.08e-3, mix1: 0.094, mix2: -0.614 },
    OxygenLine { f0: 64.127767, intensity: 733.50e-6, t_exp: 2.620, width: 10.78e-3, mix1: -0.270, mix2: -0.289 },
    OxygenLine { f0: 64.678903, intensity: 463.50e-6, t_exp: 3.195, width: 10.50e-3, mix1: -0.366, mix2: -0.259 },
    OxygenLine { f0: 65.224071, intensity: 274.80e-6, t_exp: 3.815, width: 10.20e-3, mix1: -0.326, mix2: -0.368 },
    OxygenLine { f0: 65.764772, intensity: 153.00e-6, t_exp: 4.485, width: 10.00e-3, mix1: -0.232, mix2: -0.500 },
    OxygenLine { f0: 66.302091, intensity: 80.09e-6, t_exp: 5.225, width: 9.70e-3, mix1: -0.146, mix2: -0.609 },
    OxygenLine { f0: 66.836830, intensity: 39.46e-6, t_exp: 6.005, width: 9.40e-3, mix1: -0.147, mix2: -0.639 },
    OxygenLine { f0: 67.369598, intensity: 18.32e-6, t_exp: 6.845, width: 9.20e-3, mix1: -0.174, mix2: -0.647 },
    OxygenLine { f0: 67.900867, intensity: 8.01e-6, t_exp: 7.745, width: 8.90e-3, mix1: -0.198, mix2: -0.655 },
    OxygenLine { f0: 68.431005, intensity: 3.30e-6, t_exp: 8.695, width: 8.70e-3, mix1: -0.210, mix2: -0.660 },
    OxygenLine { f0: 68.960311, intensity: 1.28e-6, t_exp: 9.695, width: 8.60e-3, mix1: -0.220, mix2: -0.665 },
    OxygenLine { f0: 118.750343, intensity: 945.00e-6, t_exp: 0.009, width: 16.30e-3, mix1: -0.031, mix2: 0.008 },
    OxygenLine { f0: 368.498350, intensity: 67.90e-6, t_exp: 0.049, width: 19.20e-3, mix1: 0.0, mix2: 0.0 },
    OxygenLine { f0: 424.763124, intensity: 638.00e-6, t_exp: 0.044, width: 19.16e-3, mix1: 0.0, mix2: 0.0 },
    OxygenLine { f0: 487.249370, intensity: 235.00e-6, t_exp: 0.049, width: 19.20e-3, mix1: 0.0, mix2: 0.0 },
    OxygenLine { f0: 715.393150, intensity: 99.60e-6, t_exp: 0.145, width: 18.10e-3, mix1: 0.0, mix2: 0.0 },
    OxygenLine { f0: 773.839675, intensity: 671.00e-6, t_exp: 0.130, width: 18.10e-3, mix1: 0.0, mix2: 0.0 },
    OxygenLine { f0: 834.145330, intensity: 180.00e-6, t_exp: 0.147, width: 18.10e-3, mix1: 0.0, mix2: 0.0 },
];

/// Oxygen absorption coefficient in Np/km.
///
/// For a total pressure `p` in hPa, temperature `t` in K, water vapor
/// partial pressure `pv` in hPa, and frequency `freq` in GHz.
pub fn absorption(p: f32, t: f32, pv: f32, freq: f32) -> f32 {
    let tht = 300.0 / t;
    let pwet = 0.1 * pv;
    let pdry = 0.1 * p - pwet;
    let xterm = 1.0 - tht;

    // Resonant line sum, accumulated in f64: the individual line terms
    // partially cancel through the mixing coefficients.
    let mut sum = 0.0_f64;
    for line in &LINES {
        // The six submillimeter lines take a reduced temperature exponent
        // in their width.
        let width_t_exp = if line.f0 > 300.0 { 0.2 } else { 0.8 };
        let ga = line.width * (pdry * tht.powf(width_t_exp) + 1.1 * tht * pwet);
        let ga_sq = ga * ga;
        let mixing = 1.0e-3 * (line.mix1 + line.mix2 * tht) * p * tht.powf(0.8);

        let rnuneg = line.f0 - freq;
        let rnupos = line.f0 + freq;
        let shape = (ga - rnuneg * mixing) / (ga_sq + rnuneg.powi(2))
            + (ga - rnupos * mixing) / (ga_sq + rnupos.powi(2));

        let strength = (line.intensity / line.f0) * f32::exp(line.t_exp * xterm);
        sum += f64::from(shape * strength);
    }
    let sum = sum.max(0.0);

    // Nonresonant pressure-induced contribution
    let ga = 5.6e-3 * (pdry + 1.1 * pwet) * tht.powf(1.5);
    let zterm = ga * (1.0 + (freq / ga).powi(2));
    let apterm = (1.4e-10 * (1.0 - 1.2e-5 * freq.powf(1.5)) * pdry * tht.powf(1.5)).max(0.0);

    let sftot = (f64::from(pdry * freq * tht.powi(2))
        * (f64::from(tht) * sum + 6.14e-4 / f64::from(zterm) + f64::from(apterm)))
        as f32;

    let gamoxy = 0.1820 * freq * sftot;
    // Empirical high-frequency correction
    let gamoxy = if freq > 37.0 {
        gamoxy + 0.1820 * 26.0e-10 * pdry.powi(2) * tht.powi(3) * (freq - 37.0).powf(1.8)
    } else {
        gamoxy
    };

    gamoxy * NEPERS_PER_DB
}
