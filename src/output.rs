//! Writing the RTM output grid to netCDF.
//!
//! The kernel's flat `(num_points, num_freq)` tensors go back onto the
//! original (time, lat, lon) grid of the upstream reanalysis fields, with
//! the channel table stored as coordinate variables. The file is written
//! under a temporary name and renamed once complete, so a partial file is
//! never mistaken for a finished product.

use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;

use crate::grid::{AtmoResult, ChannelSet};

/// Errors from the output writer.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("output tensors have {points} rows, but the grid implies {expected} (time {times} x lat {lats} x lon {lons})")]
    GridShape {
        points: usize,
        expected: usize,
        times: usize,
        lats: usize,
        lons: usize,
    },
    #[error("netCDF error writing {}: {inner}", .path.display())]
    Netcdf {
        path: PathBuf,
        inner: netcdf::Error,
    },
    #[error("could not finalize {}: {reason}", .path.display())]
    Finalize { path: PathBuf, reason: String },
}

/// The RTM output on its original coordinate grid.
#[derive(Debug)]
pub struct RtmGridded {
    /// Latitude in degrees north.
    pub lats: Vec<f32>,
    /// Longitude in degrees east.
    pub lons: Vec<f32>,
    /// Raw time coordinate values from the input files.
    pub times: Vec<f64>,
    /// Units of the time coordinate.
    pub time_units: String,
    /// The channel table the batch was computed for.
    pub channels: ChannelSet,
    /// Kernel outputs, (num_points, num_freq) with points = time*lat*lon.
    pub atmo: AtmoResult,
}

impl RtmGridded {
    /// Write the gridded output to `path`.
    ///
    /// The data variables are dimensioned (time, lat, lon, freq) and
    /// compressed; global attributes record provenance.
    pub fn write_nc(&self, path: &Path) -> Result<(), OutputError> {
        let num_times = self.times.len();
        let num_lats = self.lats.len();
        let num_lons = self.lons.len();
        let num_freq = self.channels.len();
        let expected = num_times * num_lats * num_lons;
        if self.atmo.transmissivity.nrows() != expected {
            return Err(OutputError::GridShape {
                points: self.atmo.transmissivity.nrows(),
                expected,
                times: num_times,
                lats: num_lats,
                lons: num_lons,
            });
        }

        // Write to a temporary name; rename only after everything landed.
        let tmp_path = temporary_path(path);
        self.write_to(&tmp_path)
            .map_err(|inner| OutputError::Netcdf {
                path: tmp_path.clone(),
                inner,
            })?;
        std::fs::rename(&tmp_path, path).map_err(|e| OutputError::Finalize {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        info!("wrote RTM output to {}", path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> netcdf::Result<()> {
        let mut nc = netcdf::create(path)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%SZ").to_string();
        nc.add_attribute("Conventions", "CF-1.9")?;
        nc.add_attribute("title", "simulated atmospheric microwave radiative transfer")?;
        nc.add_attribute("date_created", timestamp.as_str())?;
        nc.add_attribute(
            "history",
            format!(
                "{timestamp} created: {}",
                std::env::args().collect::<Vec<_>>().join(" ")
            )
            .as_str(),
        )?;
        nc.add_attribute("geospatial_lat_min", min_of(&self.lats))?;
        nc.add_attribute("geospatial_lat_max", max_of(&self.lats))?;
        nc.add_attribute("geospatial_lon_min", min_of(&self.lons))?;
        nc.add_attribute("geospatial_lon_max", max_of(&self.lons))?;

        nc.add_dimension("time", self.times.len())?;
        nc.add_dimension("lat", self.lats.len())?;
        nc.add_dimension("lon", self.lons.len())?;
        nc.add_dimension("freq", self.channels.len())?;

        let mut var = nc.add_variable::<f64>("time", &["time"])?;
        var.put_values(&self.times, netcdf::Extents::All)?;
        var.put_attribute("standard_name", "time")?;
        var.put_attribute("axis", "T")?;
        var.put_attribute("units", self.time_units.as_str())?;

        let mut var = nc.add_variable::<f32>("lat", &["lat"])?;
        var.put_values(&self.lats, netcdf::Extents::All)?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_attribute("axis", "Y")?;
        var.put_attribute("units", "degrees_north")?;

        let mut var = nc.add_variable::<f32>("lon", &["lon"])?;
        var.put_values(&self.lons, netcdf::Extents::All)?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_attribute("axis", "X")?;
        var.put_attribute("units", "degrees_east")?;

        let mut var = nc.add_variable::<f32>("freq", &["freq"])?;
        var.put_values(self.channels.frequencies(), netcdf::Extents::All)?;
        var.put_attribute("standard_name", "sensor_band_central_radiation_frequency")?;
        var.put_attribute("long_name", "channel frequency")?;
        var.put_attribute("units", "GHz")?;

        let mut var = nc.add_variable::<f32>("eia", &["freq"])?;
        var.put_values(self.channels.incidence_angles(), netcdf::Extents::All)?;
        var.put_attribute("standard_name", "sensor_zenith_angle")?;
        var.put_attribute("long_name", "channel Earth incidence angle")?;
        var.put_attribute("units", "degree")?;

        self.put_gridded(
            &mut nc,
            "tran",
            &self.atmo.transmissivity,
            "atmospheric transmissivity",
            None,
        )?;
        self.put_gridded(
            &mut nc,
            "tb_up",
            &self.atmo.tb_up,
            "upwelling atmospheric brightness temperature",
            Some("kelvin"),
        )?;
        self.put_gridded(
            &mut nc,
            "tb_down",
            &self.atmo.tb_down,
            "downwelling atmospheric brightness temperature",
            Some("kelvin"),
        )?;

        Ok(())
    }

    fn put_gridded(
        &self,
        nc: &mut netcdf::FileMut,
        name: &str,
        flat: &Array2<f32>,
        long_name: &str,
        units: Option<&str>,
    ) -> netcdf::Result<()> {
        let shaped = flat
            .view()
            .into_shape((
                self.times.len(),
                self.lats.len(),
                self.lons.len(),
                self.channels.len(),
            ))
            .expect("flat output length was checked against the grid");

        let mut var = nc.add_variable::<f32>(name, &["time", "lat", "lon", "freq"])?;
        var.set_compression(4, true)?;
        var.put(shaped.into_dyn(), netcdf::Extents::All)?;
        var.put_attribute("long_name", long_name)?;
        if let Some(units) = units {
            var.put_attribute("units", units)?;
        }
        var.put_attribute("coordinates", "lat lon")?;
        Ok(())
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn min_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AtmoResult;

    #[test]
    fn test_grid_shape_mismatch_is_reported() {
        let gridded = RtmGridded {
            lats: vec![0.0, 0.25],
            lons: vec![0.0, 0.25, 0.5],
            times: vec![0.0],
            time_units: "hours since 1900-01-01 00:00:00".to_string(),
            channels: ChannelSet::new(&[0.0], &[50.3]).unwrap(),
            // 5 points instead of the 6 the grid implies
            atmo: AtmoResult::zeros(5, 1),
        };
        let err = gridded
            .write_nc(Path::new("/tmp/should-not-be-written.nc"))
            .unwrap_err();
        assert!(matches!(
            err,
            OutputError::GridShape {
                points: 5,
                expected: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_temporary_path_keeps_directory() {
        let tmp = temporary_path(Path::new("/out/rtm_2020-03-07.nc"));
        assert_eq!(tmp, PathBuf::from("/out/rtm_2020-03-07.nc.partial"));
    }
}
