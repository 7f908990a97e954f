//! Channel table selection for the daily driver.
//!
//! The four MSU sounding channels are built in: each pairs one reference
//! frequency with the six cross-scan incidence angles. Anything else comes
//! from a user TOML file listing explicit (incidence angle, frequency)
//! pairs.

use std::path::Path;

use mwrtm_rs::error::RtmError;
use mwrtm_rs::grid::ChannelSet;
use serde::Deserialize;

/// Earth incidence angles of the six MSU scan positions, in degrees.
const MSU_INCIDENCE: [f32; 6] = [0.00, 10.71, 21.51, 32.51, 43.91, 56.19];

/// Reference frequencies in GHz for MSU channels 1-4.
const MSU_FREQUENCIES: [f32; 4] = [50.30, 53.74, 54.96, 57.95];

#[derive(Debug, thiserror::Error)]
pub(crate) enum ChannelError {
    #[error("could not read channel file {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
    #[error("could not parse channel file {path}: {reason}")]
    BadToml { path: String, reason: String },
    #[error("invalid channel table: {0}")]
    BadTable(#[from] RtmError),
}

/// A channel table as it appears in a user TOML file:
///
/// ```toml
/// [[channel]]
/// incidence_angle = 0.0
/// frequency = 50.3
/// ```
#[derive(Debug, Deserialize)]
struct ChannelFile {
    channel: Vec<ChannelRow>,
}

#[derive(Debug, Deserialize)]
struct ChannelRow {
    incidence_angle: f32,
    frequency: f32,
}

/// Resolve a channel selector: a built-in MSU name (case-insensitive) or a
/// path to a TOML channel file.
pub(crate) fn load_channels(selector: &str) -> Result<ChannelSet, ChannelError> {
    match selector.to_ascii_uppercase().as_str() {
        "MSU1" => Ok(msu_channel_set(0)?),
        "MSU2" => Ok(msu_channel_set(1)?),
        "MSU3" => Ok(msu_channel_set(2)?),
        "MSU4" => Ok(msu_channel_set(3)?),
        _ => from_toml_file(Path::new(selector)),
    }
}

fn msu_channel_set(index: usize) -> Result<ChannelSet, RtmError> {
    let frequency = [MSU_FREQUENCIES[index]; 6];
    ChannelSet::new(&MSU_INCIDENCE, &frequency)
}

fn from_toml_file(path: &Path) -> Result<ChannelSet, ChannelError> {
    let text = std::fs::read_to_string(path).map_err(|e| ChannelError::UnreadableFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let parsed: ChannelFile = toml::from_str(&text).map_err(|e| ChannelError::BadToml {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let incidence: Vec<f32> = parsed.channel.iter().map(|c| c.incidence_angle).collect();
    let frequency: Vec<f32> = parsed.channel.iter().map(|c| c.frequency).collect();
    Ok(ChannelSet::new(&incidence, &frequency)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_msu_names() {
        for (name, freq) in [
            ("MSU1", 50.30_f32),
            ("msu2", 53.74),
            ("Msu3", 54.96),
            ("MSU4", 57.95),
        ] {
            let set = load_channels(name).unwrap();
            assert_eq!(set.len(), 6);
            assert!(set.frequencies().iter().all(|&f| f == freq));
            assert_eq!(set.incidence_angles()[0], 0.0);
        }
    }

    #[test]
    fn test_toml_table_parses() {
        let text = r#"
            [[channel]]
            incidence_angle = 0.0
            frequency = 23.8

            [[channel]]
            incidence_angle = 53.1
            frequency = 36.5
        "#;
        let parsed: ChannelFile = toml::from_str(text).unwrap();
        assert_eq!(parsed.channel.len(), 2);
        assert_eq!(parsed.channel[1].frequency, 36.5);
    }

    #[test]
    fn test_unknown_selector_is_a_path() {
        let err = load_channels("no-such-file.toml").unwrap_err();
        assert!(matches!(err, ChannelError::UnreadableFile { .. }));
    }
}
