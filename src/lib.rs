//! Atmospheric microwave radiative transfer for simulating what a
//! satellite radiometer sees, driven by reanalysis profiles.

pub mod absorption;
pub mod column;
#[cfg(feature = "netcdf")]
pub mod era5;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod logging;
#[cfg(feature = "netcdf")]
pub mod output;
pub mod transfer;
mod validate;
