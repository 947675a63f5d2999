use crate::proj::LambertConformal;

// A named geospatial grid: projection, degree extent, pixel dimensions.
// The projected extent is derived once from the lower-left and upper-right
// corners, mirroring how degree-extent areas are conventionally defined.
#[derive(Debug, Clone)]
pub struct AreaDefinition {
    name: String,
    projection: LambertConformal,
    width: usize,
    height: usize,
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl AreaDefinition {
    /// Extent is (west, south, east, north) in degrees.
    pub fn new(
        name: &str,
        projection: LambertConformal,
        extent: [f64; 4],
        width: usize,
        height: usize,
    ) -> Result<Self, String> {
        let [west, south, east, north] = extent;

        if width == 0 || height == 0 {
            return Err("Area dimensions must be positive".to_string());
        }

        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err("Longitude values must be between -180 and 180".to_string());
        }

        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err("Latitude values must be between -90 and 90".to_string());
        }

        if west >= east || south >= north {
            return Err("Extent must be ordered: west < east, south < north".to_string());
        }

        let (x_min, y_min) = projection.forward(west, south);
        let (x_max, y_max) = projection.forward(east, north);

        if x_min >= x_max || y_min >= y_max {
            return Err("Extent degenerates under the projection".to_string());
        }

        Ok(Self {
            name: name.to_string(),
            projection,
            width,
            height,
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn projection(&self) -> &LambertConformal {
        &self.projection
    }

    fn cell_width(&self) -> f64 {
        (self.x_max - self.x_min) / self.width as f64
    }

    fn cell_height(&self) -> f64 {
        (self.y_max - self.y_min) / self.height as f64
    }

    /// Cell-center x coordinates (projection meters), west to east.
    pub fn x_coords(&self) -> Vec<f64> {
        let dx = self.cell_width();
        (0..self.width)
            .map(|j| self.x_min + (j as f64 + 0.5) * dx)
            .collect()
    }

    /// Cell-center y coordinates (projection meters), north to south so that
    /// row 0 is the northern edge.
    pub fn y_coords(&self) -> Vec<f64> {
        let dy = self.cell_height();
        (0..self.height)
            .map(|i| self.y_max - (i as f64 + 0.5) * dy)
            .collect()
    }

    /// Geographic coordinates of a cell center.
    pub fn cell_lonlat(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.x_min + (col as f64 + 0.5) * self.cell_width();
        let y = self.y_max - (row as f64 + 0.5) * self.cell_height();
        self.projection.inverse(x, y)
    }

    /// Row-major lon and lat grids for every cell center, the coordinate
    /// vectors plot positioning works from.
    pub fn lonlat_grids(&self) -> (Vec<f64>, Vec<f64>) {
        let mut lons = Vec::with_capacity(self.cell_count());
        let mut lats = Vec::with_capacity(self.cell_count());

        let xs = self.x_coords();
        let ys = self.y_coords();

        for &y in &ys {
            for &x in &xs {
                let (lon, lat) = self.projection.inverse(x, y);
                lons.push(lon);
                lats.push(lat);
            }
        }

        (lons, lats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gulf_area() -> AreaDefinition {
        let proj = LambertConformal::new(-91.0, 29.5, 29.5, 29.5).unwrap();
        AreaDefinition::new("northern_gulf", proj, [-94.0, 27.5, -88.0, 30.5], 150, 75).unwrap()
    }

    #[test]
    fn test_area_validation() {
        let proj = LambertConformal::new(-91.0, 29.5, 29.5, 29.5).unwrap();

        // Zero dimensions
        assert!(
            AreaDefinition::new("a", proj.clone(), [-94.0, 27.5, -88.0, 30.5], 0, 75).is_err()
        );

        // Inverted extent
        assert!(
            AreaDefinition::new("a", proj.clone(), [-88.0, 27.5, -94.0, 30.5], 150, 75).is_err()
        );
        assert!(
            AreaDefinition::new("a", proj.clone(), [-94.0, 30.5, -88.0, 27.5], 150, 75).is_err()
        );

        // Out-of-range coordinates
        assert!(
            AreaDefinition::new("a", proj.clone(), [-194.0, 27.5, -88.0, 30.5], 150, 75).is_err()
        );
        assert!(AreaDefinition::new("a", proj, [-94.0, 27.5, -88.0, 99.0], 150, 75).is_err());
    }

    #[test]
    fn test_coordinate_vectors() {
        let area = gulf_area();

        let xs = area.x_coords();
        let ys = area.y_coords();
        assert_eq!(xs.len(), 150);
        assert_eq!(ys.len(), 75);

        // West to east, north to south
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_cell_lonlat_within_extent() {
        let area = gulf_area();

        // Cell centers sit inside the degree extent, with slack for the
        // curvature of projected parallels.
        let (lon, lat) = area.cell_lonlat(0, 0);
        assert!((-94.5..=-87.5).contains(&lon), "lon: {}", lon);
        assert!((27.0..=31.0).contains(&lat), "lat: {}", lat);

        // The north-west cell is west of the north-east cell
        let (lon_ne, _) = area.cell_lonlat(0, 149);
        assert!(lon < lon_ne);

        // And north of the south-west cell
        let (_, lat_sw) = area.cell_lonlat(74, 0);
        assert!(lat > lat_sw);
    }

    #[test]
    fn test_lonlat_grids_match_cells() {
        let area = gulf_area();
        let (lons, lats) = area.lonlat_grids();

        assert_eq!(lons.len(), area.cell_count());
        assert_eq!(lats.len(), area.cell_count());

        let (lon, lat) = area.cell_lonlat(20, 31);
        let idx = 20 * area.width() + 31;
        assert!((lons[idx] - lon).abs() < 1e-12);
        assert!((lats[idx] - lat).abs() < 1e-12);
    }
}
