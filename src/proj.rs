//! Lambert conformal conic projection on a spherical earth.
//!
//! Maps geographic coordinates to projection meters relative to the
//! projection origin (lon_0, lat_0). A tangent cone is used when both
//! standard parallels coincide, a secant cone otherwise.

use std::f64::consts::PI;

pub const EARTH_RADIUS_M: f64 = 6371229.0;

#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    /// First standard parallel in radians
    latin1: f64,
    /// Second standard parallel in radians
    latin2: f64,
    earth_radius: f64,
    /// Cone constant
    n: f64,
    f: f64,
    /// Rho at the projection origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Build a projection from parameters in degrees.
    pub fn new(lon0_deg: f64, lat0_deg: f64, latin1_deg: f64, latin2_deg: f64) -> Result<Self, String> {
        if !(-180.0..=180.0).contains(&lon0_deg) {
            return Err("Origin longitude must be between -180 and 180".to_string());
        }

        for lat in [lat0_deg, latin1_deg, latin2_deg] {
            if !(-89.9..=89.9).contains(&lat) {
                return Err("Latitudes must be between -89.9 and 89.9".to_string());
            }
        }

        let to_rad = PI / 180.0;

        let lon0 = lon0_deg * to_rad;
        let lat0 = lat0_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        // Cone constant n: tangent cone when the parallels coincide,
        // secant cone otherwise.
        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if n.abs() < 1e-10 {
            return Err("Standard parallels produce a degenerate cone".to_string());
        }

        let earth_radius = EARTH_RADIUS_M;
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            latin1,
            latin2,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Project geographic coordinates (degrees) to meters from the origin.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        // Normalize longitude difference to [-pi, pi]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        (x, y)
    }

    /// Invert projection meters back to geographic coordinates (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };

        let theta = x.atan2(self.rho0 - y);

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lon * to_deg, lat * to_deg)
    }

    pub fn standard_parallels(&self) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        (self.latin1 * to_deg, self.latin2 * to_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gulf_projection() -> LambertConformal {
        LambertConformal::new(-91.0, 29.5, 29.5, 29.5).unwrap()
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let proj = gulf_projection();

        let (x, y) = proj.forward(-91.0, 29.5);
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_roundtrip_in_domain() {
        let proj = gulf_projection();

        for (lon, lat) in [(-94.0, 27.5), (-88.0, 30.5), (-91.3, 29.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);

            assert!(
                (lon - lon2).abs() < 1e-9,
                "lon roundtrip failed: {} vs {}",
                lon,
                lon2
            );
            assert!(
                (lat - lat2).abs() < 1e-9,
                "lat roundtrip failed: {} vs {}",
                lat,
                lat2
            );
        }
    }

    #[test]
    fn test_orientation() {
        let proj = gulf_projection();

        // West of the central meridian is negative x, north of the origin
        // latitude is positive y.
        let (x_west, _) = proj.forward(-94.0, 29.5);
        assert!(x_west < 0.0);

        let (_, y_north) = proj.forward(-91.0, 30.5);
        assert!(y_north > 0.0);
    }

    #[test]
    fn test_secant_cone() {
        let proj = LambertConformal::new(-97.5, 38.5, 33.0, 45.0).unwrap();

        let (p1, p2) = proj.standard_parallels();
        assert!((p1 - 33.0).abs() < 1e-9);
        assert!((p2 - 45.0).abs() < 1e-9);

        let (x, y) = proj.forward(-94.5, 39.0);
        let (lon, lat) = proj.inverse(x, y);
        assert!((lon + 94.5).abs() < 1e-9);
        assert!((lat - 39.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_parallels_rejected() {
        // Parallels mirrored across the equator give a zero cone constant.
        assert!(LambertConformal::new(0.0, 0.0, -30.0, 30.0).is_err());
        assert!(LambertConformal::new(0.0, 0.0, 95.0, 30.0).is_err());
        assert!(LambertConformal::new(-200.0, 29.5, 29.5, 29.5).is_err());
    }
}
