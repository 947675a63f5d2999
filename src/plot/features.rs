//! Land polygons from GeoJSON, filled and outlined in page space.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use super::{PlotError, Viewport};

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub type_: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub type_: String,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl FeatureCollection {
    pub fn from_file(path: &Path) -> Result<Self, PlotError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| PlotError::Features(format!("{}: {}", path.display(), e)))
    }

    /// All polygons in the collection, each as its list of rings. The first
    /// ring is the shell, the rest are holes.
    pub fn polygons(&self) -> Vec<&Vec<Vec<[f64; 2]>>> {
        let mut polygons = Vec::new();

        for feature in &self.features {
            match &feature.geometry {
                Some(Geometry::Polygon { coordinates }) => polygons.push(coordinates),
                Some(Geometry::MultiPolygon { coordinates }) => polygons.extend(coordinates.iter()),
                None => {}
            }
        }

        polygons
    }
}

/// Fill every polygon with `color` using even-odd scanlines, so holes stay
/// open. Coordinates pass through `to_page` and painting is clipped to the
/// viewport.
pub fn fill_polygons(
    image: &mut RgbaImage,
    collection: &FeatureCollection,
    to_page: &dyn Fn(f64, f64) -> (f32, f32),
    clip: Viewport,
    color: Rgba<u8>,
) {
    for rings in collection.polygons() {
        let rings_px: Vec<Vec<(f32, f32)>> = rings
            .iter()
            .map(|ring| ring.iter().map(|&[lon, lat]| to_page(lon, lat)).collect())
            .collect();

        let mut y_lo = f32::MAX;
        let mut y_hi = f32::MIN;
        for ring in &rings_px {
            for &(_, y) in ring {
                y_lo = y_lo.min(y);
                y_hi = y_hi.max(y);
            }
        }
        if y_lo > y_hi {
            continue;
        }

        let row_start = (y_lo.floor().max(clip.y0 as f32)) as u32;
        let row_end = (y_hi.ceil().min(clip.y1 as f32)) as u32;

        for row in row_start..row_end {
            let yc = row as f32 + 0.5;
            let mut crossings = Vec::new();

            for ring in &rings_px {
                for i in 0..ring.len() {
                    let (x1, y1) = ring[i];
                    let (x2, y2) = ring[(i + 1) % ring.len()];
                    if (y1 <= yc) != (y2 <= yc) {
                        crossings.push(x1 + (yc - y1) * (x2 - x1) / (y2 - y1));
                    }
                }
            }

            crossings.sort_by(f32::total_cmp);

            for pair in crossings.chunks(2) {
                if let [x_start, x_end] = pair {
                    let span_start = x_start.ceil().max(clip.x0 as f32);
                    let span_end = x_end.floor().min(clip.x1 as f32 - 1.0);
                    if span_start > span_end {
                        continue;
                    }
                    for col in span_start as u32..=span_end as u32 {
                        image.put_pixel(col, row, color);
                    }
                }
            }
        }
    }
}

/// Stroke every ring edge with a one pixel line, clipped to the viewport.
pub fn stroke_outlines(
    image: &mut RgbaImage,
    collection: &FeatureCollection,
    to_page: &dyn Fn(f64, f64) -> (f32, f32),
    clip: Viewport,
    color: Rgba<u8>,
) {
    for rings in collection.polygons() {
        for ring in rings {
            for i in 0..ring.len() {
                let [lon1, lat1] = ring[i];
                let [lon2, lat2] = ring[(i + 1) % ring.len()];
                let (x1, y1) = to_page(lon1, lat1);
                let (x2, y2) = to_page(lon2, lat2);

                if let Some((cx1, cy1, cx2, cy2)) = clip_segment(x1, y1, x2, y2, clip) {
                    draw_line(image, cx1, cy1, cx2, cy2, color);
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment against the viewport rectangle.
fn clip_segment(x1: f32, y1: f32, x2: f32, y2: f32, clip: Viewport) -> Option<(f32, f32, f32, f32)> {
    let dx = x2 - x1;
    let dy = y2 - y1;

    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    let checks = [
        (-dx, x1 - clip.x0 as f32),
        (dx, clip.x1 as f32 - 1.0 - x1),
        (-dy, y1 - clip.y0 as f32),
        (dy, clip.y1 as f32 - 1.0 - y1),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    Some((x1 + t0 * dx, y1 + t0 * dy, x1 + t1 * dx, y1 + t1 * dy))
}

fn draw_line(image: &mut RgbaImage, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba<u8>) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let px = (x1 + dx * t).round() as i32;
        let py = (y1 + dy * t).round() as i32;
        if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}
