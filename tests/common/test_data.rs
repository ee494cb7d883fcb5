//! Test data generation utilities.
//!
//! This module provides functions to generate NetCDF test files shaped like
//! the reanalysis and model output ecubevis is pointed at.

#![allow(dead_code)]

use std::path::Path;

// Use the netcdf crate's error type directly
use netcdf::Error;
type Result<T> = std::result::Result<T, Error>;

/// Longitudes 0, 45, ..., 315
pub const ERA5_LONGITUDES: [f32; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];
/// Latitudes from north to south, as ERA5 stores them
pub const ERA5_LATITUDES: [f32; 5] = [60.0, 30.0, 0.0, -30.0, -60.0];
/// Pressure levels in hPa
pub const ERA5_LEVELS: [f32; 3] = [1000.0, 850.0, 500.0];
/// Number of 6-hourly time steps
pub const ERA5_TIME_STEPS: usize = 12;

/// Creates an ERA5-style file with ERA5 axis names.
///
/// Variables, in file order:
/// - `z(time, level, latitude, longitude)`: geopotential, value encodes the
///   position as `1000*t + 100*k + 10*y + x`
/// - `t2m(time, latitude, longitude)`: 2 metre temperature
/// - `lsm(latitude, longitude)`: land-sea mask
///
/// Time is stored as `hours since 1982-01-01` on a gregorian calendar.
pub fn create_era5_like_nc(path: &Path) -> Result<()> {
    let nlon = ERA5_LONGITUDES.len();
    let nlat = ERA5_LATITUDES.len();
    let nlev = ERA5_LEVELS.len();
    let ntime = ERA5_TIME_STEPS;

    // Create a new NetCDF file
    let mut file = netcdf::create(path)?;

    // Add dimensions
    file.add_dimension("longitude", nlon)?;
    file.add_dimension("latitude", nlat)?;
    file.add_dimension("level", nlev)?;
    file.add_dimension("time", ntime)?;

    // Add file attributes
    file.add_attribute("Conventions", "CF-1.6")?;
    file.add_attribute("history", "synthetic ERA5-like data for ecubevis tests")?;

    {
        let mut lon_var = file.add_variable::<f32>("longitude", &["longitude"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("long_name", "longitude")?;
        lon_var.put_values(&ERA5_LONGITUDES, ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f32>("latitude", &["latitude"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("long_name", "latitude")?;
        lat_var.put_values(&ERA5_LATITUDES, ..)?;
    }

    {
        let mut level_var = file.add_variable::<f32>("level", &["level"])?;
        level_var.put_attribute("units", "millibars")?;
        level_var.put_attribute("long_name", "pressure_level")?;
        level_var.put_values(&ERA5_LEVELS, ..)?;
    }

    {
        let time_values: Vec<f64> = (0..ntime).map(|i| 6.0 * i as f64).collect();
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "hours since 1982-01-01 00:00:00.0")?;
        time_var.put_attribute("long_name", "time")?;
        time_var.put_attribute("calendar", "gregorian")?;
        time_var.put_values(&time_values, ..)?;
    }

    {
        let mut z = Vec::with_capacity(ntime * nlev * nlat * nlon);
        for t in 0..ntime {
            for k in 0..nlev {
                for y in 0..nlat {
                    for x in 0..nlon {
                        z.push((1000 * t + 100 * k + 10 * y + x) as f32);
                    }
                }
            }
        }
        let mut z_var = file.add_variable::<f32>("z", &["time", "level", "latitude", "longitude"])?;
        z_var.put_attribute("units", "m**2 s**-2")?;
        z_var.put_attribute("long_name", "Geopotential")?;
        z_var.put_values(&z, ..)?;
    }

    {
        let mut t2m = Vec::with_capacity(ntime * nlat * nlon);
        for t in 0..ntime {
            for &lat in &ERA5_LATITUDES {
                for x in 0..nlon {
                    t2m.push(273.15 + 30.0 * (1.0 - (lat / 90.0).abs()) + 0.1 * t as f32 + 0.01 * x as f32);
                }
            }
        }
        let mut t2m_var = file.add_variable::<f32>("t2m", &["time", "latitude", "longitude"])?;
        t2m_var.put_attribute("units", "K")?;
        t2m_var.put_attribute("long_name", "2 metre temperature")?;
        t2m_var.put_values(&t2m, ..)?;
    }

    {
        let lsm: Vec<f32> = (0..nlat * nlon).map(|i| (i % 2) as f32).collect();
        let mut lsm_var = file.add_variable::<f32>("lsm", &["latitude", "longitude"])?;
        lsm_var.put_attribute("long_name", "Land-sea mask")?;
        lsm_var.put_values(&lsm, ..)?;
    }

    Ok(())
}

/// Creates a global grid whose longitude axis includes both 0 and 360.
///
/// `tas(time, lat, lon)` holds the longitude index at every point, so a
/// slice can be checked against the positions it selected. Time is stored as
/// `days since 2000-01-01`.
pub fn create_global_grid_nc(path: &Path) -> Result<()> {
    let lon_values: Vec<f32> = (0..9).map(|i| 45.0 * i as f32).collect();
    let lat_values: Vec<f32> = vec![-60.0, -30.0, 0.0, 30.0, 60.0];
    let time_values: Vec<f32> = vec![0.0, 1.0, 2.0];

    let mut file = netcdf::create(path)?;

    file.add_dimension("lon", lon_values.len())?;
    file.add_dimension("lat", lat_values.len())?;
    file.add_dimension("time", time_values.len())?;

    file.add_attribute("title", "Global grid with a duplicated seam column")?;

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&lon_values, ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&lat_values, ..)?;
    }

    {
        let mut time_var = file.add_variable::<f32>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_attribute("calendar", "standard")?;
        time_var.put_values(&time_values, ..)?;
    }

    {
        let size = time_values.len() * lat_values.len() * lon_values.len();
        let tas: Vec<f32> = (0..size).map(|i| (i % lon_values.len()) as f32).collect();
        let mut tas_var = file.add_variable::<f32>("tas", &["time", "lat", "lon"])?;
        tas_var.put_attribute("units", "K")?;
        tas_var.put_attribute("long_name", "Near-Surface Air Temperature")?;
        tas_var.put_values(&tas, ..)?;
    }

    Ok(())
}

/// Creates a file whose only variable has an ensemble axis `member`, which is
/// outside the default coordinate vocabulary.
pub fn create_ensemble_nc(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("member", 2)?;
    file.add_dimension("lat", 3)?;
    file.add_dimension("lon", 4)?;

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_values(&[-10.0f32, 0.0, 10.0], ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_values(&[-30.0f32, -10.0, 10.0, 30.0], ..)?;
    }

    {
        let pr: Vec<f32> = (0..24).map(|i| i as f32 * 0.5).collect();
        let mut pr_var = file.add_variable::<f32>("pr", &["member", "lat", "lon"])?;
        pr_var.put_attribute("units", "mm/day")?;
        pr_var.put_values(&pr, ..)?;
    }

    Ok(())
}

/// Creates an ERA5-style file whose `t2m(time, lat, lon)` is packed as `short`
/// with `scale_factor = 0.5`, `add_offset = 250` and `_FillValue = -32767`.
///
/// The stored value at flat position `i` is `i`, except position 1 which holds
/// the fill value, so decoded values are `250 + 0.5 * i`.
pub fn create_packed_nc(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("time", 2)?;
    file.add_dimension("lat", 2)?;
    file.add_dimension("lon", 3)?;

    {
        let mut time_var = file.add_variable::<f32>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_values(&[0.0f32, 1.0], ..)?;
    }

    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_values(&[10.0f32, -10.0], ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_values(&[0.0f32, 120.0, 240.0], ..)?;
    }

    {
        let mut stored: Vec<i16> = (0..12).collect();
        stored[1] = -32767;
        let mut t2m_var = file.add_variable::<i16>("t2m", &["time", "lat", "lon"])?;
        t2m_var.set_fill_value(-32767i16)?;
        t2m_var.put_attribute("scale_factor", 0.5f64)?;
        t2m_var.put_attribute("add_offset", 250.0f64)?;
        t2m_var.put_attribute("units", "K")?;
        t2m_var.put_values(&stored, ..)?;
    }

    Ok(())
}
