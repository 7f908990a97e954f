//! Batch data model at the kernel boundary.
//!
//! The kernel consumes flat numeric arrays and nothing else: a
//! [`ProfileGrid`] of borrowed views over the caller's level/surface fields,
//! and a [`ChannelSet`] describing the radiometer channels. It returns an
//! owned [`AtmoResult`]; no reference to the inputs is retained once
//! [`crate::kernel::compute_rtm`] returns.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::RtmError;

/// Direction in which the shared pressure levels are stored.
///
/// Reanalysis products disagree on this: some list levels from the surface
/// up (descending pressure), others from the model top down (ascending
/// pressure). The validator detects the direction once per batch and the
/// marshaling step normalizes every column to a surface-first path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOrder {
    /// Pressure strictly decreases along the array (surface level first).
    SurfaceFirst,
    /// Pressure strictly increases along the array (top level first).
    TopFirst,
}

/// Borrowed views over one batch of atmospheric columns.
///
/// The level profiles are dimensioned `(num_points, num_levels)`; the
/// surface fields `(num_points,)`. `pressure` holds the level pressures in
/// hPa shared by every column. All views are read-only; workers never write
/// to them.
#[derive(Debug, Clone, Copy)]
pub struct ProfileGrid<'a> {
    /// Pressure levels in hPa, shared across columns.
    pub pressure: ArrayView1<'a, f32>,
    /// Physical temperature in K.
    pub temperature: ArrayView2<'a, f32>,
    /// Geopotential height above the geoid in m.
    pub height: ArrayView2<'a, f32>,
    /// Specific humidity in kg/kg.
    pub specific_humidity: ArrayView2<'a, f32>,
    /// Cloud liquid water content in kg/kg.
    pub liquid_content: ArrayView2<'a, f32>,
    /// 2 m air temperature in K.
    pub surface_temperature: ArrayView1<'a, f32>,
    /// Surface geopotential height in m.
    pub surface_height: ArrayView1<'a, f32>,
    /// 2 m dewpoint in K.
    pub surface_dewpoint: ArrayView1<'a, f32>,
    /// Surface pressure in hPa.
    pub surface_pressure: ArrayView1<'a, f32>,
}

impl ProfileGrid<'_> {
    /// Number of columns in the batch, taken from the temperature profile.
    pub fn num_points(&self) -> usize {
        self.temperature.nrows()
    }

    /// Number of levels per column.
    pub fn num_levels(&self) -> usize {
        self.pressure.len()
    }
}

/// Per-column scalar state at the lower boundary of the integration path.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceState {
    /// 2 m air temperature in K.
    pub temperature: f32,
    /// Surface geopotential height in m.
    pub height: f32,
    /// 2 m dewpoint in K.
    pub dewpoint: f32,
    /// Surface pressure in hPa.
    pub pressure: f32,
}

/// One radiometer channel: an Earth incidence angle paired with a frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Earth incidence angle in degrees.
    pub incidence: f32,
    /// Microwave frequency in GHz.
    pub frequency: f32,
}

/// The positional channel table shared by every column.
///
/// The i-th incidence angle pairs with the i-th frequency; the table is not
/// a cross product. Construction validates the pairing and the physical
/// domain of every entry, so a `ChannelSet` in hand is always usable.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSet {
    incidence: Vec<f32>,
    frequency: Vec<f32>,
}

impl ChannelSet {
    /// Build a channel table from paired angle/frequency slices.
    ///
    /// Errors if the slices differ in length or are empty, or if any angle
    /// falls outside `[0°, 90°)` or any frequency is not a positive finite
    /// number.
    pub fn new(incidence: &[f32], frequency: &[f32]) -> Result<Self, RtmError> {
        if incidence.len() != frequency.len() || incidence.is_empty() {
            return Err(RtmError::ChannelTable {
                incidence: incidence.len(),
                frequency: frequency.len(),
            });
        }

        for (channel, &eia) in incidence.iter().enumerate() {
            if !eia.is_finite() || !(0.0..90.0).contains(&eia) {
                return Err(RtmError::ChannelDomain {
                    array: "incidence_angle",
                    channel,
                    value: eia,
                    requirement: "must be in [0, 90) degrees",
                });
            }
        }
        for (channel, &freq) in frequency.iter().enumerate() {
            if !freq.is_finite() || freq <= 0.0 {
                return Err(RtmError::ChannelDomain {
                    array: "frequency",
                    channel,
                    value: freq,
                    requirement: "must be a positive number of GHz",
                });
            }
        }

        Ok(Self {
            incidence: incidence.to_vec(),
            frequency: frequency.to_vec(),
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// A `ChannelSet` is never empty, but clippy likes the pair.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Iterate over the channels in table order.
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        self.incidence
            .iter()
            .zip(&self.frequency)
            .map(|(&incidence, &frequency)| Channel {
                incidence,
                frequency,
            })
    }

    /// The incidence angles in degrees, in table order.
    pub fn incidence_angles(&self) -> &[f32] {
        &self.incidence
    }

    /// The frequencies in GHz, in table order.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequency
    }
}

/// Output tensors for one batch, each dimensioned `(num_points, num_freq)`.
///
/// Ownership passes entirely to the caller; the kernel keeps nothing.
#[derive(Debug, Clone)]
pub struct AtmoResult {
    /// Atmospheric transmissivity along the slant path, in [0, 1].
    pub transmissivity: Array2<f32>,
    /// Upwelling atmospheric brightness temperature in K.
    pub tb_up: Array2<f32>,
    /// Downwelling atmospheric brightness temperature in K.
    pub tb_down: Array2<f32>,
}

impl AtmoResult {
    pub(crate) fn zeros(num_points: usize, num_freq: usize) -> Self {
        Self {
            transmissivity: Array2::zeros([num_points, num_freq]),
            tb_up: Array2::zeros([num_points, num_freq]),
            tb_down: Array2::zeros([num_points, num_freq]),
        }
    }
}
