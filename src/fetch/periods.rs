//! Download targets for NEO sea surface temperature composites.
//!
//! NEO serves one global image per compositing window through its RenderData
//! servlet, addressed by an opaque scene identifier. Targets come either
//! from an explicit period list carrying those identifiers, or from a date
//! range stepped into fixed windows against a URL template.

use chrono::{Duration, NaiveDate};

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::DownloadTarget;
use crate::config::ConfigError;

pub const NEO_RENDER_URL: &str = "https://neo.gsfc.nasa.gov/servlet/RenderData";

/// One compositing window with its NEO scene identifier.
#[derive(Debug, Deserialize, Clone)]
pub struct PeriodSpec {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub si: String,
}

/// A date range stepped into fixed windows against a URL template holding
/// `{start}` and `{end}` placeholders.
#[derive(Debug, Deserialize, Clone)]
pub struct RangeSpec {
    pub start: NaiveDate,
    pub end: NaiveDate,

    #[serde(default = "default_step_days")]
    pub step_days: u32,

    pub url_template: String,
}

fn default_step_days() -> u32 {
    8
}

fn default_base_url() -> String {
    NEO_RENDER_URL.to_string()
}

fn default_color_scheme() -> String {
    "gs".to_string()
}

fn default_image_format() -> String {
    "TIFF".to_string()
}

fn default_width() -> u32 {
    3600
}

fn default_height() -> u32 {
    1800
}

#[derive(Debug, Clone)]
pub struct SstFetchConfig {
    base_url: String,
    color_scheme: String,
    image_format: String,
    width: u32,
    height: u32,
    output_dir: PathBuf,
    periods: Option<Vec<PeriodSpec>>,
    range: Option<RangeSpec>,
}

// Deserializes an SstFetchConfig, requiring exactly one of `periods` and
// `range` and checking window ordering.
impl<'de> Deserialize<'de> for SstFetchConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SstFetchHelper {
            #[serde(default = "default_base_url")]
            base_url: String,
            #[serde(default = "default_color_scheme")]
            color_scheme: String,
            #[serde(default = "default_image_format")]
            image_format: String,
            #[serde(default = "default_width")]
            width: u32,
            #[serde(default = "default_height")]
            height: u32,
            output_dir: String,
            periods: Option<Vec<PeriodSpec>>,
            range: Option<RangeSpec>,
        }

        let helper = SstFetchHelper::deserialize(deserializer)?;

        match (&helper.periods, &helper.range) {
            (Some(_), Some(_)) => {
                return Err(D::Error::custom(
                    "periods and range are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(D::Error::custom("either periods or range is required"));
            }
            _ => {}
        }

        if let Some(periods) = &helper.periods {
            if periods.is_empty() {
                return Err(D::Error::custom("periods cannot be empty"));
            }
            for period in periods {
                if period.start >= period.end {
                    return Err(D::Error::custom(format!(
                        "period {} must start before it ends",
                        period.start
                    )));
                }
            }
        }

        if let Some(range) = &helper.range {
            if range.start >= range.end {
                return Err(D::Error::custom("range must start before it ends"));
            }
            if range.step_days == 0 {
                return Err(D::Error::custom("step_days must be at least 1"));
            }
            if !range.url_template.contains("{start}") || !range.url_template.contains("{end}") {
                return Err(D::Error::custom(
                    "url_template must contain {start} and {end} placeholders",
                ));
            }
        }

        Ok(SstFetchConfig {
            base_url: helper.base_url,
            color_scheme: helper.color_scheme,
            image_format: helper.image_format,
            width: helper.width,
            height: helper.height,
            output_dir: PathBuf::from(helper.output_dir),
            periods: helper.periods,
            range: helper.range,
        })
    }
}

impl SstFetchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SstFetchConfig, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: SstFetchConfig = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// One download target per compositing window.
    pub fn targets(&self) -> Vec<DownloadTarget> {
        if let Some(periods) = &self.periods {
            return periods
                .iter()
                .map(|period| DownloadTarget {
                    url: format!(
                        "{}?cs={}&format={}&width={}&height={}&si={}",
                        self.base_url,
                        self.color_scheme,
                        self.image_format,
                        self.width,
                        self.height,
                        period.si
                    ),
                    dest: self.output_dir.join(window_filename(period.start, period.end)),
                    token: None,
                })
                .collect();
        }

        if let Some(range) = &self.range {
            return stepped_windows(range.start, range.end, range.step_days)
                .into_iter()
                .map(|(start, end)| DownloadTarget {
                    url: range
                        .url_template
                        .replace("{start}", &start.to_string())
                        .replace("{end}", &end.to_string()),
                    dest: self.output_dir.join(window_filename(start, end)),
                    token: None,
                })
                .collect();
        }

        Vec::new()
    }
}

fn window_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!("SST_{}_to_{}.tif", start, end)
}

/// Fixed-length windows covering [start, end). Each window is exactly
/// `step_days` long, so the final one may extend past `end`.
pub fn stepped_windows(start: NaiveDate, end: NaiveDate, step_days: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let step = Duration::days(step_days as i64);
    let mut windows = Vec::new();
    let mut current = start;

    while current < end {
        let window_end = current + step;
        windows.push((current, window_end));
        current = window_end;
    }

    windows
}
