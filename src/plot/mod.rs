//! Georeferenced PNG plots of gridded index data.
//!
//! The figure layout follows the usual single-panel map: the data panel in
//! the center, a title above, and a vertical colorbar on the right at 60%
//! of the panel height. Land polygons are filled and outlined over the data,
//! so water pixels carry the index colors and land stays flat.

pub mod colormap;
pub mod features;
pub mod font;

use std::fmt;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use log::warn;

use crate::raster::Raster;
use colormap::{evaluate, normalize, INFERNO};
use features::FeatureCollection;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 110;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 50;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRAME: Rgba<u8> = Rgba([60, 60, 60, 255]);
const TEXT: Rgba<u8> = Rgba([20, 20, 20, 255]);
const COASTLINE: Rgba<u8> = Rgba([40, 40, 40, 255]);

#[derive(Debug)]
pub enum PlotError {
    Io(std::io::Error),
    Image(image::ImageError),
    Features(String),
    Grid(String),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlotError::Io(e) => write!(f, "I/O error while plotting: {}", e),
            PlotError::Image(e) => write!(f, "Error encoding plot image: {}", e),
            PlotError::Features(msg) => write!(f, "Error loading feature file: {}", msg),
            PlotError::Grid(msg) => write!(f, "Invalid plot grid: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {}

impl From<std::io::Error> for PlotError {
    fn from(error: std::io::Error) -> Self {
        PlotError::Io(error)
    }
}

impl From<image::ImageError> for PlotError {
    fn from(error: image::ImageError) -> Self {
        PlotError::Image(error)
    }
}

/// Geographic axes of the output figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapProjection {
    PlateCarree,
}

#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub coastline_resolution: String,
    pub land_color: [u8; 3],
    pub colorbar_label: String,
    pub features_dir: PathBuf,

    /// Pixels per data cell.
    pub scale: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            coastline_resolution: "10m".to_string(),
            land_color: [128, 128, 128],
            colorbar_label: "Sed. CDOM Index".to_string(),
            features_dir: PathBuf::from("./data/features"),
            scale: 1,
        }
    }
}

/// A pixel rectangle, x1/y1 exclusive. Must lie within the target image.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Render the raster to a PNG on geographic axes.
///
/// `lons` and `lats` give the per-cell coordinates in row-major order, the
/// same layout as `data.values`. Cells holding NaN are left unpainted.
#[allow(clippy::too_many_arguments)]
pub fn render(
    data: &Raster,
    lons: &[f64],
    lats: &[f64],
    cmin: f32,
    cmax: f32,
    title: &str,
    output_path: &Path,
    projection: MapProjection,
    options: &PlotOptions,
) -> Result<(), PlotError> {
    if lons.len() != data.values.len() || lats.len() != data.values.len() {
        return Err(PlotError::Grid(format!(
            "Coordinate grids ({} lons, {} lats) do not match raster cells ({})",
            lons.len(),
            lats.len(),
            data.values.len()
        )));
    }

    let scale = options.scale.max(1);
    let panel_w = data.width as u32 * scale;
    let panel_h = data.height as u32 * scale;
    let img_w = MARGIN_LEFT + panel_w + MARGIN_RIGHT;
    let img_h = MARGIN_TOP + panel_h + MARGIN_BOTTOM;

    let mut image = RgbaImage::from_pixel(img_w, img_h, BACKGROUND);

    let panel = Viewport {
        x0: MARGIN_LEFT,
        y0: MARGIN_TOP,
        x1: MARGIN_LEFT + panel_w,
        y1: MARGIN_TOP + panel_h,
    };
    let full = Viewport { x0: 0, y0: 0, x1: img_w, y1: img_h };

    let (lon_min, lon_max) = slice_bounds(lons);
    let (lat_min, lat_max) = slice_bounds(lats);
    if lon_max <= lon_min || lat_max <= lat_min {
        return Err(PlotError::Grid(
            "Coordinate grids span no area".to_string(),
        ));
    }

    let to_page = match projection {
        MapProjection::PlateCarree => {
            let lon_span = lon_max - lon_min;
            let lat_span = lat_max - lat_min;
            move |lon: f64, lat: f64| -> (f32, f32) {
                let x = panel.x0 as f64 + (lon - lon_min) / lon_span * panel_w as f64;
                let y = panel.y0 as f64 + (lat_max - lat) / lat_span * panel_h as f64;
                (x as f32, y as f32)
            }
        }
    };

    // Data cells as small filled rectangles placed by their coordinates
    let cell = scale + 1;
    let half = cell as i32 / 2;
    for (i, &value) in data.values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }

        let t = normalize(value, cmin, cmax);
        let [r, g, b] = evaluate(&INFERNO, t);
        let (cx, cy) = to_page(lons[i], lats[i]);

        fill_rect(
            &mut image,
            cx.round() as i32 - half,
            cy.round() as i32 - half,
            cell,
            cell,
            panel,
            Rgba([r, g, b, 255]),
        );
    }

    // Land mask and coastlines over the data
    let feature_path = options
        .features_dir
        .join(format!("land_{}.geojson", options.coastline_resolution));
    if feature_path.exists() {
        let land = FeatureCollection::from_file(&feature_path)?;
        let [r, g, b] = options.land_color;
        features::fill_polygons(&mut image, &land, &to_page, panel, Rgba([r, g, b, 255]));
        features::stroke_outlines(&mut image, &land, &to_page, panel, COASTLINE);
    } else {
        warn!(
            "Feature file {} not found, plotting without coastlines",
            feature_path.display()
        );
    }

    draw_frame(&mut image, panel, full);
    draw_colorbar(&mut image, panel, full, cmin, cmax, &options.colorbar_label);
    font::draw_text(
        &mut image,
        title,
        img_w as f32 / 2.0,
        MARGIN_TOP as f32 / 2.0,
        13.0,
        0.0,
        TEXT,
    );

    image.save(output_path)?;
    Ok(())
}

fn slice_bounds(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo, hi)
}

fn fill_rect(image: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, clip: Viewport, color: Rgba<u8>) {
    let x_start = x.max(clip.x0 as i32);
    let y_start = y.max(clip.y0 as i32);
    let x_end = (x + w as i32).min(clip.x1 as i32);
    let y_end = (y + h as i32).min(clip.y1 as i32);

    for py in y_start..y_end {
        for px in x_start..x_end {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn draw_frame(image: &mut RgbaImage, panel: Viewport, full: Viewport) {
    let w = panel.x1 - panel.x0 + 2;
    let h = panel.y1 - panel.y0 + 2;
    let x = panel.x0 as i32 - 1;
    let y = panel.y0 as i32 - 1;

    fill_rect(image, x, y, w, 1, full, FRAME);
    fill_rect(image, x, panel.y1 as i32, w, 1, full, FRAME);
    fill_rect(image, x, y, 1, h, full, FRAME);
    fill_rect(image, panel.x1 as i32, y, 1, h, full, FRAME);
}

fn draw_colorbar(
    image: &mut RgbaImage,
    panel: Viewport,
    full: Viewport,
    cmin: f32,
    cmax: f32,
    label: &str,
) {
    let panel_h = panel.y1 - panel.y0;
    let bar_h = ((panel_h as f32 * 0.6) as u32).max(2);
    let bar_w = 18u32;
    let bar_x = panel.x1 + 28;
    let bar_y = panel.y0 + (panel_h - bar_h) / 2;

    for row in 0..bar_h {
        let t = 1.0 - row as f32 / (bar_h - 1) as f32;
        let [r, g, b] = evaluate(&INFERNO, t);
        fill_rect(
            image,
            bar_x as i32,
            (bar_y + row) as i32,
            bar_w,
            1,
            full,
            Rgba([r, g, b, 255]),
        );
    }

    // Border
    fill_rect(image, bar_x as i32 - 1, bar_y as i32 - 1, bar_w + 2, 1, full, FRAME);
    fill_rect(image, bar_x as i32 - 1, (bar_y + bar_h) as i32, bar_w + 2, 1, full, FRAME);
    fill_rect(image, bar_x as i32 - 1, bar_y as i32 - 1, 1, bar_h + 2, full, FRAME);
    fill_rect(image, (bar_x + bar_w) as i32, bar_y as i32 - 1, 1, bar_h + 2, full, FRAME);

    // Five evenly spaced ticks from cmin to cmax
    for k in 0..5 {
        let frac = k as f32 / 4.0;
        let value = cmin + (cmax - cmin) * frac;
        let y = bar_y + bar_h - 1 - (frac * (bar_h - 1) as f32).round() as u32;

        fill_rect(image, (bar_x + bar_w + 1) as i32, y as i32, 4, 1, full, FRAME);

        let text = format!("{:.2}", value);
        let text_x = (bar_x + bar_w + 9) as f32 + font::text_width(&text, 9.0) / 2.0;
        font::draw_text(image, &text, text_x, y as f32, 9.0, 0.0, TEXT);
    }

    font::draw_text(
        image,
        label,
        (bar_x + bar_w + 58) as f32,
        (bar_y + bar_h / 2) as f32,
        10.0,
        -std::f32::consts::FRAC_PI_2,
        TEXT,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn row_major_grids(width: usize, height: usize) -> (Vec<f64>, Vec<f64>) {
        let mut lons = Vec::with_capacity(width * height);
        let mut lats = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                lons.push(col as f64);
                lats.push((height - 1 - row) as f64);
            }
        }
        (lons, lats)
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().expect("Failed to create temp dir");
        let output = dir.path().join("index.png");

        let mut data = Raster::filled(12, 8, 0.1);
        data.set(3, 4, f32::NAN);
        let (lons, lats) = row_major_grids(12, 8);

        let options = PlotOptions {
            features_dir: dir.path().join("missing"),
            scale: 4,
            ..PlotOptions::default()
        };

        render(
            &data,
            &lons,
            &lats,
            0.0,
            0.24,
            "Jun 01-Jun 30 - Sed. CDOM (Full Range)",
            &output,
            MapProjection::PlateCarree,
            &options,
        )
        .expect("Failed to render");

        let image = image::open(&output).expect("Failed to reopen plot").to_rgba8();
        assert_eq!(image.width(), MARGIN_LEFT + 12 * 4 + MARGIN_RIGHT);
        assert_eq!(image.height(), MARGIN_TOP + 8 * 4 + MARGIN_BOTTOM);
    }

    #[test]
    fn test_render_paints_land_over_data() {
        let dir = tempdir().expect("Failed to create temp dir");
        let features_dir = dir.path().join("features");
        std::fs::create_dir_all(&features_dir).expect("Failed to create features dir");

        let mut file =
            File::create(features_dir.join("land_10m.geojson")).expect("Failed to create file");
        file.write_all(
            br#"{"type": "FeatureCollection", "features": [{"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[-1.0, -1.0], [5.0, -1.0], [5.0, 8.0], [-1.0, 8.0], [-1.0, -1.0]]]}}]}"#,
        )
        .expect("Failed to write file");

        let data = Raster::filled(12, 8, 0.2);
        let (lons, lats) = row_major_grids(12, 8);
        let output = dir.path().join("with_land.png");

        let options = PlotOptions {
            features_dir,
            scale: 4,
            ..PlotOptions::default()
        };

        render(
            &data,
            &lons,
            &lats,
            0.0,
            0.24,
            "Land overlay",
            &output,
            MapProjection::PlateCarree,
            &options,
        )
        .expect("Failed to render");

        let image = image::open(&output).expect("Failed to reopen plot").to_rgba8();

        // A pixel well inside the land polygon carries the land fill
        let x = MARGIN_LEFT + 6;
        let y = MARGIN_TOP + 16;
        assert_eq!(*image.get_pixel(x, y), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_render_rejects_mismatched_grids() {
        let data = Raster::filled(4, 4, 0.1);
        let lons = vec![0.0; 8];
        let lats = vec![0.0; 16];

        let result = render(
            &data,
            &lons,
            &lats,
            0.0,
            1.0,
            "bad grids",
            Path::new("/tmp/never-written.png"),
            MapProjection::PlateCarree,
            &PlotOptions::default(),
        );

        assert!(matches!(result, Err(PlotError::Grid(_))));
    }
}
