use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};

use super::types::{BandReader, Data, ReadError};

// Reads plain single-band imagery with the pure Rust tiff decoder. The
// upstream temperature product is a global plate-carree render with no
// embedded georeferencing, so a global lon/lat geotransform is assumed.
pub struct ImageReader;

impl BandReader for ImageReader {
    fn read_band(&self, path: &Path, _band: &str) -> Result<Data, ReadError> {
        let file = File::open(path)
            .map_err(|e| ReadError::Tiff(format!("Failed to open file: {}", e)))?;

        let reader = BufReader::new(file);

        let mut decoder = Decoder::new(reader)
            .map_err(|e| ReadError::Tiff(format!("Failed to decode TIFF: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| ReadError::Tiff(format!("Failed to get dimensions: {}", e)))?;

        let image_data: Vec<f32> = match decoder
            .read_image()
            .map_err(|e| ReadError::Tiff(format!("Failed to read image: {}", e)))?
        {
            DecodingResult::U8(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::F32(data) => data,
            DecodingResult::F64(data) => data.iter().map(|&x| x as f32).collect(),
            _ => return Err(ReadError::Tiff("Unsupported pixel format".to_string())),
        };

        let width = width as usize;
        let height = height as usize;
        let pixels = width * height;

        if pixels == 0 || image_data.len() % pixels != 0 {
            return Err(ReadError::Tiff(format!(
                "Sample count {} does not tile {}x{}",
                image_data.len(),
                width,
                height
            )));
        }

        // Multi-channel images keep only the first channel
        let channels = image_data.len() / pixels;
        let buffer: Vec<f32> = if channels == 1 {
            image_data
        } else {
            image_data.into_iter().step_by(channels).collect()
        };

        // Global equirectangular grid, north-up
        let geo_transform = [
            -180.0,
            360.0 / width as f64,
            0.0,
            90.0,
            0.0,
            -180.0 / height as f64,
        ];

        Ok(Data {
            width,
            height,
            buffer,
            geo_transform,
        })
    }
}
