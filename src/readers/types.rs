use std::fmt;
use std::path::Path;

pub trait BandReader {
    fn read_band(&self, path: &Path, band: &str) -> Result<Data, ReadError>;
}

#[derive(Debug)]
pub enum ReadError {
    Gdal(String),
    Tiff(String),
    Georeference(String),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Gdal(msg) => write!(f, "GDAL read error: {}", msg),
            ReadError::Tiff(msg) => write!(f, "TIFF read error: {}", msg),
            ReadError::Georeference(msg) => write!(f, "Georeference error: {}", msg),
        }
    }
}

impl std::error::Error for ReadError {}

// A raster as read from a source file, on its native grid. The geotransform
// maps pixel coordinates to geographic lon/lat:
//   [origin_x, pixel_width, 0, origin_y, 0, -pixel_height]
#[derive(Debug, Clone)]
pub struct Data {
    pub width: usize,
    pub height: usize,
    pub buffer: Vec<f32>,
    pub geo_transform: [f64; 6],
}

impl Data {
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.buffer[row * self.width + col]
    }

    /// Fractional pixel coordinates (col, row) of a geographic point.
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let gt = &self.geo_transform;
        let col = (lon - gt[0]) / gt[1];
        let row = (lat - gt[3]) / gt[5];
        (col, row)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_value = self
            .buffer
            .iter()
            .filter(|&&x| !x.is_nan())
            .min_by(|a, b| a.partial_cmp(b).unwrap())
            .unwrap_or(&f32::NAN);

        let max_value = self
            .buffer
            .iter()
            .filter(|&&x| !x.is_nan())
            .max_by(|a, b| a.partial_cmp(b).unwrap())
            .unwrap_or(&f32::NAN);

        write!(
            f,
            "Width: {}\nHeight: {}\nBuffer Length: {}\nMin value: {}\nMax value: {}",
            self.width,
            self.height,
            self.buffer.len(),
            min_value,
            max_value,
        )
    }
}
