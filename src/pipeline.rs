//! End-to-end run: load scenes, grid them, compute the index, render plots.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use glob::glob;
use log::{info, warn};

use crate::cdom::{combine, compute_cdom, invert_temperature};
use crate::config::{ColorScale, Config, ConfigError};
use crate::plot::{render, MapProjection, PlotError};
use crate::raster::Raster;
use crate::readers::ReaderKind;
use crate::scene::{Scene, SceneError};

#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Pattern(glob::PatternError),
    NoInputFiles { dir: String, pattern: String },
    Scene(SceneError),
    MissingBand(String),
    Plot(PlotError),
    Io(std::io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "Configuration error: {}", e),
            PipelineError::Pattern(e) => write!(f, "Invalid file pattern: {}", e),
            PipelineError::NoInputFiles { dir, pattern } => {
                write!(f, "No files matching '{}' found in {}", pattern, dir)
            }
            PipelineError::Scene(e) => write!(f, "Scene error: {}", e),
            PipelineError::MissingBand(band) => {
                write!(f, "Band '{}' missing after resampling", band)
            }
            PipelineError::Plot(e) => write!(f, "Plot error: {}", e),
            PipelineError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ConfigError> for PipelineError {
    fn from(error: ConfigError) -> Self {
        PipelineError::Config(error)
    }
}

impl From<glob::PatternError> for PipelineError {
    fn from(error: glob::PatternError) -> Self {
        PipelineError::Pattern(error)
    }
}

impl From<SceneError> for PipelineError {
    fn from(error: SceneError) -> Self {
        PipelineError::Scene(error)
    }
}

impl From<PlotError> for PipelineError {
    fn from(error: PlotError) -> Self {
        PipelineError::Plot(error)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        PipelineError::Io(error)
    }
}

/// What a completed run produced: the composite index raster and the
/// plot files written from it.
#[derive(Debug)]
pub struct RunSummary {
    pub composite: Raster,
    pub plots: Vec<PathBuf>,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Pipeline { config }
    }

    /// Run the full chain and return the composite with the written plots.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        fs::create_dir_all(self.config.output_dir())?;

        let area = self.config.area()?;
        info!(
            "Gridding onto '{}' ({}x{} cells)",
            area.name(),
            area.width(),
            area.height()
        );

        // Reflectance bands from the MODIS granules
        let modis_files = collect_files(
            self.config.modis_input_dir(),
            self.config.modis_file_pattern(),
        )?;
        info!("Found {} MODIS granule(s)", modis_files.len());

        let bands = self.config.bands();
        let band_names: Vec<&str> = bands.iter().map(String::as_str).collect();

        let modis = Scene::new(modis_files, ReaderKind::ModisL1b)?;
        let gridded = modis.load_onto(&band_names, &area, self.config.resampling())?;

        let r412 = gridded
            .band(&bands[0])
            .ok_or_else(|| PipelineError::MissingBand(bands[0].clone()))?;
        let r555 = gridded
            .band(&bands[1])
            .ok_or_else(|| PipelineError::MissingBand(bands[1].clone()))?;

        let cdom = compute_cdom(r412, r555, self.config.coefficients());
        info!("aCDOM(412): {}", cdom);

        // Byte-scaled temperature composite
        let sst_files = collect_files(
            self.config.sst_input_dir(),
            self.config.sst_file_pattern(),
        )?;

        let sst_scene = Scene::new(sst_files, ReaderKind::GenericImage)?;
        let sst_gridded = sst_scene.load_onto(&["image"], &area, self.config.resampling())?;
        let sst = sst_gridded
            .band("image")
            .ok_or_else(|| PipelineError::MissingBand("image".to_string()))?;

        let inverted = invert_temperature(sst, self.config.inversion_mode());
        let composite = combine(&cdom, &inverted);
        info!("Sediment CDOM index: {}", composite);

        let (lons, lats) = area.lonlat_grids();
        let options = self.config.plot_options();

        let mut written = Vec::new();
        for scale in self.resolve_scales(&composite) {
            let output_path = self.config.output_dir().join(&scale.filename);
            info!(
                "Rendering '{}' [{:.3}, {:.3}] to {}",
                scale.title,
                scale.cmin,
                scale.cmax,
                output_path.display()
            );

            render(
                &composite,
                &lons,
                &lats,
                scale.cmin,
                scale.cmax,
                &scale.title,
                &output_path,
                MapProjection::PlateCarree,
                &options,
            )?;

            written.push(output_path);
        }

        Ok(RunSummary {
            composite,
            plots: written,
        })
    }

    /// Color scales with auto bounds substituted from the composite when
    /// manual scaling is off. Infinities never become scale bounds.
    fn resolve_scales(&self, composite: &Raster) -> Vec<ColorScale> {
        let mut scales = self.config.color_scales().to_vec();

        if self.config.manual_color_scale() {
            return scales;
        }

        match composite.finite_min_max() {
            Some((min, max)) => {
                for scale in &mut scales {
                    if scale.auto_min {
                        scale.cmin = min;
                    }
                    if scale.auto_max {
                        scale.cmax = max;
                    }
                }
            }
            None => {
                warn!("Composite has no finite values, keeping configured color scales");
            }
        }

        scales
    }
}

fn collect_files(dir: &str, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let full_pattern = format!("{}/{}", dir.trim_end_matches('/'), pattern);

    let files: Vec<PathBuf> = glob(&full_pattern)?.filter_map(Result::ok).collect();

    if files.is_empty() {
        return Err(PipelineError::NoInputFiles {
            dir: dir.to_string(),
            pattern: pattern.to_string(),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn test_config(manual: bool, modis_dir: &str, sst_dir: &str, output_dir: &str) -> Config {
        let json = format!(
            r#"
        {{
            "modis_input_dir": "{}",
            "modis_file_pattern": "*.hdf",
            "sst_input_dir": "{}",
            "sst_file_pattern": "*.TIFF",
            "output_dir": "{}",
            "date_range": "Jun 01-Jun 30",
            "area": {{
                "name": "gulf",
                "lon_0": -91.0,
                "lat_0": 29.5,
                "lat_1": 29.5,
                "lat_2": 29.5,
                "extent": [-94.0, 27.5, -88.0, 30.5],
                "width": 60,
                "height": 30
            }},
            "bands": ["8", "4", "13lo"],
            "coefficients": {{ "b0": 0.2487, "b1": 14.028, "b2": 4.085 }},
            "inversion_mode": "linear",
            "manual_color_scale": {},
            "color_scales": [
                {{
                    "name": "full_range",
                    "cmin": 0.0,
                    "cmax": 0.24,
                    "auto_min": true,
                    "auto_max": true,
                    "title": "{{date_range}} - Sed. CDOM (Full Range)",
                    "filename": "{{date_range}} SST & CDOM (Full Range).png"
                }},
                {{
                    "name": "high_min",
                    "cmin": 0.08,
                    "cmax": 0.24,
                    "auto_max": true,
                    "title": "{{date_range}} - Sed. CDOM (High Min)",
                    "filename": "{{date_range}} SST & CDOM (High Min).png"
                }}
            ]
        }}
        "#,
            modis_dir, sst_dir, output_dir, manual
        );

        serde_json::from_str(&json).expect("Failed to parse test config")
    }

    #[test]
    fn test_missing_inputs_reported() {
        let dir = tempdir().expect("Failed to create temp dir");
        let empty = dir.path().join("empty");
        std::fs::create_dir_all(&empty).expect("Failed to create dir");

        let config = test_config(
            true,
            empty.to_str().expect("Invalid path"),
            empty.to_str().expect("Invalid path"),
            dir.path().join("out").to_str().expect("Invalid path"),
        );

        let result = Pipeline::new(config).run();

        match result {
            Err(PipelineError::NoInputFiles { pattern, .. }) => {
                assert_eq!(pattern, "*.hdf");
            }
            other => panic!("Expected NoInputFiles, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_collect_files_matches_pattern() {
        let dir = tempdir().expect("Failed to create temp dir");
        for name in ["a.hdf", "b.hdf", "c.txt"] {
            let mut file = File::create(dir.path().join(name)).expect("Failed to create file");
            file.write_all(b"x").expect("Failed to write file");
        }

        let files = collect_files(dir.path().to_str().expect("Invalid path"), "*.hdf")
            .expect("Failed to collect files");

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_manual_scales_untouched() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().to_str().expect("Invalid path");
        let config = test_config(true, path, path, path);

        let composite = Raster::from_values(2, 1, vec![0.01, 0.30]);
        let scales = Pipeline::new(config).resolve_scales(&composite);

        assert_eq!(scales[0].cmin, 0.0);
        assert_eq!(scales[0].cmax, 0.24);
        assert_eq!(scales[1].cmin, 0.08);
    }

    #[test]
    fn test_auto_scales_follow_composite() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().to_str().expect("Invalid path");
        let config = test_config(false, path, path, path);

        // Infinities and NaN must not leak into the bounds
        let composite =
            Raster::from_values(5, 1, vec![0.01, 0.30, f32::NAN, f32::INFINITY, 0.1]);
        let scales = Pipeline::new(config).resolve_scales(&composite);

        // full_range tracks both ends
        assert_eq!(scales[0].cmin, 0.01);
        assert_eq!(scales[0].cmax, 0.30);

        // high_min keeps its floor and tracks the maximum
        assert_eq!(scales[1].cmin, 0.08);
        assert_eq!(scales[1].cmax, 0.30);
    }

    #[test]
    fn test_auto_scales_with_no_finite_values() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().to_str().expect("Invalid path");
        let config = test_config(false, path, path, path);

        let composite = Raster::filled(2, 2, f32::NAN);
        let scales = Pipeline::new(config).resolve_scales(&composite);

        assert_eq!(scales[0].cmin, 0.0);
        assert_eq!(scales[0].cmax, 0.24);
    }
}
