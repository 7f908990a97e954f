//! Reading local ERA5-style daily reanalysis files.
//!
//! One calendar day of fields arrives as two netCDF streams: a surface file
//! (2 m temperature and dewpoint, surface pressure, surface geopotential)
//! and a pressure-level file (temperature, geopotential, specific humidity,
//! cloud liquid water). This module flattens their (time, lat, lon[, level])
//! grids into the `(num_points, num_levels)` arrays the kernel consumes.
//!
//! Retrieval from the remote archive is out of scope here: the reader only
//! ever consumes files already cached locally, and a missing file is
//! reported as such instead of triggering a download.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use ndarray::{Array2, ArrayD, Ix1, Ix3, Ix4};

use crate::grid::ProfileGrid;

/// Standard acceleration of gravity in m/s², for converting geopotential
/// to geopotential height.
const G0: f32 = 9.80665;

/// Pa per hPa; ERA5 stores surface pressure in Pa.
const PA_PER_HPA: f32 = 100.0;

/// Errors from the reanalysis reader.
#[derive(Debug, thiserror::Error)]
pub enum Era5Error {
    /// The expected local file is absent. Retrieval is the archive
    /// client's job, not ours, so this is surfaced instead of fetched.
    #[error("{descr} file {} is not cached locally; retrieve it before running", .path.display())]
    NotCached { descr: &'static str, path: PathBuf },
    #[error("could not open {descr} file {}: {reason}", .path.display())]
    CouldNotOpen {
        descr: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("{} is missing the '{varname}' variable", .path.display())]
    MissingVariable { path: PathBuf, varname: &'static str },
    #[error("variable '{varname}' in {} has {actual} dimensions, expected {expected}", .path.display())]
    BadRank {
        path: PathBuf,
        varname: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("variable '{varname}' in {} has a type this reader does not unpack", .path.display())]
    UnsupportedType { path: PathBuf, varname: &'static str },
    #[error("variable '{varname}' in {} has {actual} values, expected {expected}", .path.display())]
    BadLength {
        path: PathBuf,
        varname: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("the surface and levels files disagree on the {dimension} grid ({surface} vs {levels})")]
    GridMismatch {
        dimension: &'static str,
        surface: usize,
        levels: usize,
    },
    #[error("netCDF error reading '{varname}' from {}: {inner}", .path.display())]
    Netcdf {
        path: PathBuf,
        varname: &'static str,
        inner: netcdf::Error,
    },
}

/// One day of reanalysis fields, flattened for the RTM kernel.
///
/// The point dimension runs (time, lat, lon) in row-major order; the level
/// dimension follows the file's `level` coordinate.
#[derive(Debug)]
pub struct DailyAtmosphere {
    pub date: NaiveDate,
    /// Latitude in degrees north, as stored in the file.
    pub lats: Vec<f32>,
    /// Longitude in degrees east, as stored in the file.
    pub lons: Vec<f32>,
    /// Raw values of the file's time coordinate.
    pub times: Vec<f64>,
    /// Units string of the time coordinate, carried through to the writer.
    pub time_units: String,
    /// Pressure levels in hPa.
    pub levels: Vec<f32>,
    /// Temperature in K, (num_points, num_levels).
    pub temperature: Array2<f32>,
    /// Geopotential height in m, (num_points, num_levels).
    pub height: Array2<f32>,
    /// Specific humidity in kg/kg, (num_points, num_levels).
    pub specific_humidity: Array2<f32>,
    /// Cloud liquid water content in kg/kg, (num_points, num_levels).
    pub liquid_content: Array2<f32>,
    /// 2 m air temperature in K, (num_points,).
    pub surface_temperature: Vec<f32>,
    /// Surface geopotential height in m, (num_points,).
    pub surface_height: Vec<f32>,
    /// 2 m dewpoint in K, (num_points,).
    pub surface_dewpoint: Vec<f32>,
    /// Surface pressure in hPa, (num_points,).
    pub surface_pressure: Vec<f32>,
}

impl DailyAtmosphere {
    /// Borrow the fields as the kernel's input grid.
    pub fn grid(&self) -> ProfileGrid<'_> {
        ProfileGrid {
            pressure: ndarray::ArrayView1::from(self.levels.as_slice()),
            temperature: self.temperature.view(),
            height: self.height.view(),
            specific_humidity: self.specific_humidity.view(),
            liquid_content: self.liquid_content.view(),
            surface_temperature: ndarray::ArrayView1::from(self.surface_temperature.as_slice()),
            surface_height: ndarray::ArrayView1::from(self.surface_height.as_slice()),
            surface_dewpoint: ndarray::ArrayView1::from(self.surface_dewpoint.as_slice()),
            surface_pressure: ndarray::ArrayView1::from(self.surface_pressure.as_slice()),
        }
    }

    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    pub fn num_points(&self) -> usize {
        self.times.len() * self.lats.len() * self.lons.len()
    }
}

/// The conventional names of the two local files for one day.
pub fn daily_file_paths(era5_dir: &Path, date: NaiveDate) -> (PathBuf, PathBuf) {
    let surface = era5_dir.join(format!("era5_surface_{date}.nc"));
    let levels = era5_dir.join(format!("era5_levels_{date}.nc"));
    (surface, levels)
}

/// Read one day of fields from the local surface/levels file pair.
pub fn read_daily_atmosphere(
    surface_path: &Path,
    levels_path: &Path,
    date: NaiveDate,
) -> Result<DailyAtmosphere, Era5Error> {
    for (descr, path) in [("surface", surface_path), ("levels", levels_path)] {
        if !path.exists() {
            return Err(Era5Error::NotCached {
                descr,
                path: path.to_owned(),
            });
        }
    }

    let surface = open(surface_path, "surface")?;
    let levels_file = open(levels_path, "levels")?;

    let lats = read_coord(&surface, surface_path, "latitude")?;
    let lons = read_coord(&surface, surface_path, "longitude")?;
    let levels = read_coord(&levels_file, levels_path, "level")?;
    let (times, time_units) = read_times(&surface, surface_path)?;

    // The two files must describe the same horizontal grid and times
    for (dimension, a, b) in [
        (
            "latitude",
            lats.len(),
            read_coord(&levels_file, levels_path, "latitude")?.len(),
        ),
        (
            "longitude",
            lons.len(),
            read_coord(&levels_file, levels_path, "longitude")?.len(),
        ),
        (
            "time",
            times.len(),
            read_times(&levels_file, levels_path)?.0.len(),
        ),
    ] {
        if a != b {
            return Err(Era5Error::GridMismatch {
                dimension,
                surface: a,
                levels: b,
            });
        }
    }

    let num_points = times.len() * lats.len() * lons.len();
    let num_levels = levels.len();
    info!(
        "reading {num_points} columns x {num_levels} levels for {date} from {} and {}",
        surface_path.display(),
        levels_path.display()
    );

    let temperature = read_level_field(&levels_file, levels_path, "t", num_points, num_levels)?;
    let mut height = read_level_field(&levels_file, levels_path, "z", num_points, num_levels)?;
    // Geopotential (m²/s²) → geopotential height (m)
    height.mapv_inplace(|z| z / G0);
    let specific_humidity =
        read_level_field(&levels_file, levels_path, "q", num_points, num_levels)?;
    let liquid_content =
        read_level_field(&levels_file, levels_path, "clwc", num_points, num_levels)?;

    let surface_temperature = read_surface_field(&surface, surface_path, "t2m", num_points)?;
    let surface_dewpoint = read_surface_field(&surface, surface_path, "d2m", num_points)?;
    let surface_pressure = read_surface_field(&surface, surface_path, "sp", num_points)?
        .into_iter()
        .map(|p| p / PA_PER_HPA)
        .collect();
    let surface_height = read_surface_field(&surface, surface_path, "z", num_points)?
        .into_iter()
        .map(|z| z / G0)
        .collect();

    Ok(DailyAtmosphere {
        date,
        lats,
        lons,
        times,
        time_units,
        levels,
        temperature,
        height,
        specific_humidity,
        liquid_content,
        surface_temperature,
        surface_height,
        surface_dewpoint,
        surface_pressure,
    })
}

fn open(path: &Path, descr: &'static str) -> Result<netcdf::File, Era5Error> {
    netcdf::open(path).map_err(|e| Era5Error::CouldNotOpen {
        descr,
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn get_variable<'f>(
    file: &'f netcdf::File,
    path: &Path,
    varname: &'static str,
) -> Result<netcdf::Variable<'f>, Era5Error> {
    file.variable(varname).ok_or_else(|| Era5Error::MissingVariable {
        path: path.to_owned(),
        varname,
    })
}

fn read_coord(file: &netcdf::File, path: &Path, varname: &'static str) -> Result<Vec<f32>, Era5Error> {
    let var = get_variable(file, path, varname)?;
    let values = read_unpacked(&var, path, varname)?
        .into_dimensionality::<Ix1>()
        .map_err(|_| Era5Error::BadRank {
            path: path.to_owned(),
            varname,
            actual: var.dimensions().len(),
            expected: 1,
        })?;
    Ok(values.to_vec())
}

fn read_times(file: &netcdf::File, path: &Path) -> Result<(Vec<f64>, String), Era5Error> {
    let var = get_variable(file, path, "time")?;
    let values = var
        .get::<f64, _>(netcdf::Extents::All)
        .map_err(|inner| Era5Error::Netcdf {
            path: path.to_owned(),
            varname: "time",
            inner,
        })?
        .into_dimensionality::<Ix1>()
        .map_err(|_| Era5Error::BadRank {
            path: path.to_owned(),
            varname: "time",
            actual: var.dimensions().len(),
            expected: 1,
        })?;

    let units = var
        .attribute("units")
        .and_then(|a| a.value().ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(u) => Some(u),
            _ => None,
        })
        .unwrap_or_else(|| "hours since 1900-01-01 00:00:00".to_string());

    Ok((values.to_vec(), units))
}

/// Read a (time, level, lat, lon) field and flatten it to
/// (time*lat*lon, level).
fn read_level_field(
    file: &netcdf::File,
    path: &Path,
    varname: &'static str,
    num_points: usize,
    num_levels: usize,
) -> Result<Array2<f32>, Era5Error> {
    let var = get_variable(file, path, varname)?;
    let values = read_unpacked(&var, path, varname)?
        .into_dimensionality::<Ix4>()
        .map_err(|_| Era5Error::BadRank {
            path: path.to_owned(),
            varname,
            actual: var.dimensions().len(),
            expected: 4,
        })?;

    // (time, level, lat, lon) → (time, lat, lon, level), then collapse the
    // leading three axes into the point dimension
    let reordered = values.permuted_axes([0, 2, 3, 1]);
    let contiguous = reordered.as_standard_layout().into_owned();
    let actual = contiguous.len();
    contiguous
        .into_shape((num_points, num_levels))
        .map_err(|_| Era5Error::BadLength {
            path: path.to_owned(),
            varname,
            actual,
            expected: num_points * num_levels,
        })
}

/// Read a (time, lat, lon) field and flatten it to (time*lat*lon,).
fn read_surface_field(
    file: &netcdf::File,
    path: &Path,
    varname: &'static str,
    num_points: usize,
) -> Result<Vec<f32>, Era5Error> {
    let var = get_variable(file, path, varname)?;
    let values = read_unpacked(&var, path, varname)?
        .into_dimensionality::<Ix3>()
        .map_err(|_| Era5Error::BadRank {
            path: path.to_owned(),
            varname,
            actual: var.dimensions().len(),
            expected: 3,
        })?;

    let flat: Vec<f32> = values.iter().copied().collect();
    if flat.len() != num_points {
        return Err(Era5Error::BadLength {
            path: path.to_owned(),
            varname,
            actual: flat.len(),
            expected: num_points,
        });
    }
    Ok(flat)
}

/// Read a variable as f32, applying CF packing conventions.
///
/// ERA5 files from the archive are frequently packed as 16-bit integers
/// with `scale_factor`/`add_offset`; fill values become NaN so the kernel's
/// missing-data handling sees them as such.
fn read_unpacked(
    var: &netcdf::Variable<'_>,
    path: &Path,
    varname: &'static str,
) -> Result<ArrayD<f32>, Era5Error> {
    use netcdf::types::{FloatType, IntType, NcVariableType};

    let nc_err = |inner| Era5Error::Netcdf {
        path: path.to_owned(),
        varname,
        inner,
    };

    match var.vartype() {
        NcVariableType::Float(FloatType::F32) => {
            let mut values = var.get::<f32, _>(netcdf::Extents::All).map_err(nc_err)?;
            if let Some(fill) = attr_as_f64(var, "_FillValue") {
                let fill = fill as f32;
                values.mapv_inplace(|v| if v == fill { f32::NAN } else { v });
            }
            Ok(values)
        }
        NcVariableType::Float(FloatType::F64) => {
            let values = var.get::<f64, _>(netcdf::Extents::All).map_err(nc_err)?;
            let fill = attr_as_f64(var, "_FillValue");
            Ok(values.mapv(|v| {
                if fill.is_some_and(|f| v == f) {
                    f32::NAN
                } else {
                    v as f32
                }
            }))
        }
        NcVariableType::Int(IntType::I16) => {
            let values = var.get::<i16, _>(netcdf::Extents::All).map_err(nc_err)?;
            let scale = attr_as_f64(var, "scale_factor").unwrap_or(1.0);
            let offset = attr_as_f64(var, "add_offset").unwrap_or(0.0);
            let fill = attr_as_f64(var, "_FillValue").or_else(|| attr_as_f64(var, "missing_value"));
            Ok(values.mapv(|v| {
                if fill.is_some_and(|f| f64::from(v) == f) {
                    f32::NAN
                } else {
                    (f64::from(v) * scale + offset) as f32
                }
            }))
        }
        NcVariableType::Int(IntType::I32) => {
            let values = var.get::<i32, _>(netcdf::Extents::All).map_err(nc_err)?;
            let scale = attr_as_f64(var, "scale_factor").unwrap_or(1.0);
            let offset = attr_as_f64(var, "add_offset").unwrap_or(0.0);
            Ok(values.mapv(|v| (f64::from(v) * scale + offset) as f32))
        }
        _ => Err(Era5Error::UnsupportedType {
            path: path.to_owned(),
            varname,
        }),
    }
}

/// A numeric attribute as f64, whatever width it was stored at.
fn attr_as_f64(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    use netcdf::AttributeValue;

    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}
