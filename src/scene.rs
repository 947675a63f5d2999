use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use log::{debug, warn};

use crate::area::AreaDefinition;
use crate::raster::Raster;
use crate::readers::{create_reader, BandReader, Data, ReadError, ReaderKind};
use crate::resample::{resample_to_area, Interpolation};

#[derive(Debug)]
pub enum SceneError {
    NoFiles,
    MissingBand { band: String, detail: String },
    Read(ReadError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneError::NoFiles => write!(f, "Scene created without any input files"),
            SceneError::MissingBand { band, detail } => {
                write!(f, "Band '{}' not found in any scene file: {}", band, detail)
            }
            SceneError::Read(e) => write!(f, "Error reading scene file: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<ReadError> for SceneError {
    fn from(error: ReadError) -> Self {
        SceneError::Read(error)
    }
}

/// A set of input files sharing one format, loadable band by band.
pub struct Scene {
    files: Vec<PathBuf>,
    kind: ReaderKind,
    reader: Box<dyn BandReader>,
}

impl Scene {
    pub fn new(mut files: Vec<PathBuf>, kind: ReaderKind) -> Result<Self, SceneError> {
        if files.is_empty() {
            return Err(SceneError::NoFiles);
        }

        files.sort();

        Ok(Scene {
            files,
            kind,
            reader: create_reader(kind),
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read each requested band from the scene files, keyed by band name.
    ///
    /// For multi-granule formats every file is tried in sorted order and the
    /// first one carrying the band wins. Single-image formats read the first
    /// file only.
    pub fn load(&self, bands: &[&str]) -> Result<HashMap<String, Data>, SceneError> {
        let candidates: &[PathBuf] = match self.kind {
            ReaderKind::ModisL1b => &self.files,
            ReaderKind::GenericImage => {
                if self.files.len() > 1 {
                    warn!(
                        "{} files match, reading only {}",
                        self.files.len(),
                        self.files[0].display()
                    );
                }
                std::slice::from_ref(&self.files[0])
            }
        };

        let mut loaded = HashMap::new();

        for &band in bands {
            let mut last_error = String::from("no files tried");

            for path in candidates {
                match self.reader.read_band(path, band) {
                    Ok(data) => {
                        debug!("Loaded band '{}' from {}", band, path.display());
                        loaded.insert(band.to_string(), data);
                        break;
                    }
                    Err(e) => {
                        debug!("Band '{}' not in {}: {}", band, path.display(), e);
                        last_error = e.to_string();
                    }
                }
            }

            if !loaded.contains_key(band) {
                return Err(SceneError::MissingBand {
                    band: band.to_string(),
                    detail: last_error,
                });
            }
        }

        Ok(loaded)
    }

    /// Load the requested bands and resample each onto the area definition.
    pub fn load_onto(
        &self,
        bands: &[&str],
        area: &AreaDefinition,
        method: Interpolation,
    ) -> Result<GriddedScene, SceneError> {
        let loaded = self.load(bands)?;

        let bands = loaded
            .into_iter()
            .map(|(name, data)| {
                let raster = resample_to_area(&data, area, method);
                (name, raster)
            })
            .collect();

        Ok(GriddedScene { bands })
    }
}

/// Bands resampled onto a common grid.
pub struct GriddedScene {
    bands: HashMap<String, Raster>,
}

impl GriddedScene {
    pub fn band(&self, name: &str) -> Option<&Raster> {
        self.bands.get(name)
    }
}
