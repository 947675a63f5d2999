use gdal::{Dataset, Metadata, MetadataEntry};
use std::path::Path;

use super::types::{BandReader, Data, ReadError};

// Reads named bands from satellite container formats through GDAL. A band
// is resolved to a subdataset (HDF/NetCDF variable) when the container has
// subdatasets, otherwise to a 1-based raster band index.
pub struct ModisHdfReader;

impl ModisHdfReader {
    // NetCDF subdataset paths follow a fixed template, no metadata scan needed
    fn netcdf_band_path(path: &Path, band: &str) -> Option<String> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("nc") => Some(format!("NETCDF:{}:{}", path.display(), band)),
            _ => None,
        }
    }

    fn subdataset_path(container: &Dataset, band: &str) -> Option<String> {
        let suffix = format!(":{}", band);

        for MetadataEntry { domain, key, value } in container.metadata() {
            if domain == "SUBDATASETS" && key.ends_with("_NAME") && value.ends_with(&suffix) {
                return Some(value);
            }
        }

        None
    }

    fn open_band_dataset(path: &Path, band: &str) -> Result<(Dataset, usize), ReadError> {
        if let Some(gdal_path) = Self::netcdf_band_path(path, band) {
            let dataset = Dataset::open(&gdal_path)
                .map_err(|e| ReadError::Gdal(format!("Failed to open {}: {}", gdal_path, e)))?;
            return Ok((dataset, 1));
        }

        let container = Dataset::open(path).map_err(|e| {
            ReadError::Gdal(format!("Failed to open {}: {}", path.display(), e))
        })?;

        if let Some(sub) = Self::subdataset_path(&container, band) {
            let dataset = Dataset::open(&sub)
                .map_err(|e| ReadError::Gdal(format!("Failed to open {}: {}", sub, e)))?;
            return Ok((dataset, 1));
        }

        // No matching subdataset: treat the band name as a raster band index
        match band.parse::<usize>() {
            Ok(index) if index >= 1 => Ok((container, index)),
            _ => Err(ReadError::Gdal(format!(
                "Band {} not found in {}",
                band,
                path.display()
            ))),
        }
    }
}

impl BandReader for ModisHdfReader {
    fn read_band(&self, path: &Path, band: &str) -> Result<Data, ReadError> {
        let (dataset, band_index) = Self::open_band_dataset(path, band)?;

        let geo_transform = dataset.geo_transform().map_err(|e| {
            ReadError::Georeference(format!(
                "{} has no usable geotransform: {}",
                path.display(),
                e
            ))
        })?;

        let rasterband = dataset
            .rasterband(band_index)
            .map_err(|e| ReadError::Gdal(format!("Failed to open band {}: {}", band, e)))?;

        let (width, height) = dataset.raster_size();
        let raw = rasterband
            .read_as::<f32>((0, 0), (width, height), (width, height), None)
            .map_err(|e| ReadError::Gdal(format!("Failed to read band {}: {}", band, e)))?;

        let scale = rasterband.scale().unwrap_or(1.0);
        let missing_value = rasterband.no_data_value();

        let buffer: Vec<f32> = raw
            .data()
            .iter()
            .map(|&value| {
                if missing_value.is_some_and(|mv| value == mv as f32) {
                    f32::NAN
                } else {
                    value * scale as f32
                }
            })
            .collect();

        Ok(Data {
            width,
            height,
            buffer,
            geo_transform,
        })
    }
}
