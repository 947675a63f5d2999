use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::area::AreaDefinition;
use crate::cdom::{Coefficients, InversionMode};
use crate::plot::PlotOptions;
use crate::proj::LambertConformal;
use crate::resample::Interpolation;

pub mod error;
pub use error::ConfigError;

#[derive(Debug, Deserialize, Clone)]
pub struct AreaConfig {
    pub name: String,
    pub lon_0: f64,
    pub lat_0: f64,
    pub lat_1: f64,
    pub lat_2: f64,

    /// West, south, east, north in degrees.
    pub extent: [f64; 4],
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ColorScale {
    pub name: String,
    pub cmin: f32,
    pub cmax: f32,

    /// Replace cmin with the composite minimum when auto-scaling.
    #[serde(default)]
    pub auto_min: bool,

    /// Replace cmax with the composite maximum when auto-scaling.
    #[serde(default)]
    pub auto_max: bool,

    pub title: String,
    pub filename: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlotConfig {
    #[serde(default = "default_resolution")]
    pub coastline_resolution: String,

    #[serde(default = "default_land_color")]
    pub land_color: [u8; 3],

    #[serde(default = "default_colorbar_label")]
    pub colorbar_label: String,

    #[serde(default = "default_features_dir")]
    pub features_dir: String,

    #[serde(default = "default_plot_scale")]
    pub scale: u32,
}

fn default_resolution() -> String {
    "10m".to_string()
}

fn default_land_color() -> [u8; 3] {
    [128, 128, 128]
}

fn default_colorbar_label() -> String {
    "Sed. CDOM Index".to_string()
}

fn default_features_dir() -> String {
    "./data/features".to_string()
}

fn default_plot_scale() -> u32 {
    1
}

fn default_manual_color_scale() -> bool {
    true
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            coastline_resolution: default_resolution(),
            land_color: default_land_color(),
            colorbar_label: default_colorbar_label(),
            features_dir: default_features_dir(),
            scale: default_plot_scale(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    modis_input_dir: String,
    modis_file_pattern: String,
    sst_input_dir: String,
    sst_file_pattern: String,
    output_dir: PathBuf,
    date_range: String,
    area: AreaConfig,
    bands: Vec<String>,
    coefficients: Coefficients,
    inversion_mode: InversionMode,
    resampling: Interpolation,
    manual_color_scale: bool,
    color_scales: Vec<ColorScale>,
    plot: PlotConfig,
}

// Deserializes a Config, checking the band list, the color scale bounds and
// the area parameters, and substituting {date_range} into scale titles and
// filenames.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            modis_input_dir: String,
            modis_file_pattern: String,
            sst_input_dir: String,
            sst_file_pattern: String,
            output_dir: String,
            date_range: String,
            area: AreaConfig,
            bands: Vec<String>,
            coefficients: Coefficients,
            inversion_mode: InversionMode,
            resampling: Option<Interpolation>,
            #[serde(default = "default_manual_color_scale")]
            manual_color_scale: bool,
            color_scales: Vec<ColorScale>,
            #[serde(default)]
            plot: PlotConfig,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        if helper.bands.len() != 3 {
            return Err(D::Error::custom(ConfigError::BandCount));
        }

        if helper.color_scales.is_empty() {
            return Err(D::Error::custom("color_scales cannot be empty"));
        }

        let color_scales = helper
            .color_scales
            .into_iter()
            .map(|mut scale| {
                if scale.cmin >= scale.cmax {
                    return Err(D::Error::custom(ConfigError::ScaleBounds(
                        scale.name.clone(),
                    )));
                }
                scale.title = scale.title.replace("{date_range}", &helper.date_range);
                scale.filename = scale.filename.replace("{date_range}", &helper.date_range);
                Ok(scale)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Reject bad projection or extent parameters at load time
        build_area(&helper.area).map_err(|e| D::Error::custom(ConfigError::Area(e)))?;

        Ok(Config {
            modis_input_dir: helper.modis_input_dir,
            modis_file_pattern: helper.modis_file_pattern,
            sst_input_dir: helper.sst_input_dir,
            sst_file_pattern: helper.sst_file_pattern,
            output_dir: PathBuf::from(helper.output_dir),
            date_range: helper.date_range,
            area: helper.area,
            bands: helper.bands,
            coefficients: helper.coefficients,
            inversion_mode: helper.inversion_mode,
            resampling: helper.resampling.unwrap_or(Interpolation::Nearest),
            manual_color_scale: helper.manual_color_scale,
            color_scales,
            plot: helper.plot,
        })
    }
}

fn build_area(area: &AreaConfig) -> Result<AreaDefinition, String> {
    let projection = LambertConformal::new(area.lon_0, area.lat_0, area.lat_1, area.lat_2)?;
    AreaDefinition::new(&area.name, projection, area.extent, area.width, area.height)
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn modis_input_dir(&self) -> &str {
        &self.modis_input_dir
    }

    pub fn modis_file_pattern(&self) -> &str {
        &self.modis_file_pattern
    }

    pub fn sst_input_dir(&self) -> &str {
        &self.sst_input_dir
    }

    pub fn sst_file_pattern(&self) -> &str {
        &self.sst_file_pattern
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn date_range(&self) -> &str {
        &self.date_range
    }

    pub fn area(&self) -> Result<AreaDefinition, ConfigError> {
        build_area(&self.area).map_err(ConfigError::Area)
    }

    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn inversion_mode(&self) -> InversionMode {
        self.inversion_mode
    }

    pub fn resampling(&self) -> Interpolation {
        self.resampling
    }

    pub fn manual_color_scale(&self) -> bool {
        self.manual_color_scale
    }

    pub fn color_scales(&self) -> &[ColorScale] {
        &self.color_scales
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            coastline_resolution: self.plot.coastline_resolution.clone(),
            land_color: self.plot.land_color,
            colorbar_label: self.plot.colorbar_label.clone(),
            features_dir: PathBuf::from(&self.plot.features_dir),
            scale: self.plot.scale,
        }
    }
}
