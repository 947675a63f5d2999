use serde::Deserialize;

use crate::area::AreaDefinition;
use crate::raster::Raster;
use crate::readers::Data;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    Bilinear,
}

/// Value of the nearest source pixel, NaN outside the source grid.
pub fn nearest(source: &Data, col: f64, row: f64) -> f32 {
    if col < -0.5 || row < -0.5 {
        return f32::NAN;
    }

    let c = col.round() as usize;
    let r = row.round() as usize;

    if c >= source.width || r >= source.height {
        return f32::NAN;
    }

    source.get(r, c)
}

/// Bilinear blend of the four surrounding source pixels. NaN outside the
/// grid or when any contributing pixel is NaN.
pub fn bilinear(source: &Data, col: f64, row: f64) -> f32 {
    if col < 0.0 || row < 0.0 {
        return f32::NAN;
    }

    let c0 = col.floor() as usize;
    let r0 = row.floor() as usize;

    if c0 >= source.width || r0 >= source.height {
        return f32::NAN;
    }

    let c1 = (c0 + 1).min(source.width - 1);
    let r1 = (r0 + 1).min(source.height - 1);

    let cf = (col - c0 as f64) as f32;
    let rf = (row - r0 as f64) as f32;

    let v00 = source.get(r0, c0);
    let v10 = source.get(r0, c1);
    let v01 = source.get(r1, c0);
    let v11 = source.get(r1, c1);

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - cf) + v10 * cf;
    let bottom = v01 * (1.0 - cf) + v11 * cf;
    top * (1.0 - rf) + bottom * rf
}

/// Resample a source raster onto an area definition: each target cell center
/// is inverse-projected to lon/lat, located in the source grid, and sampled.
pub fn resample_to_area(source: &Data, area: &AreaDefinition, method: Interpolation) -> Raster {
    let xs = area.x_coords();
    let ys = area.y_coords();
    let projection = area.projection();

    let mut values = Vec::with_capacity(area.cell_count());

    for &y in &ys {
        for &x in &xs {
            let (lon, lat) = projection.inverse(x, y);
            let (col, row) = source.geo_to_pixel(lon, lat);

            let value = match method {
                Interpolation::Nearest => nearest(source, col, row),
                Interpolation::Bilinear => bilinear(source, col, row),
            };

            values.push(value);
        }
    }

    Raster::from_values(area.width(), area.height(), values)
}
