use std::fmt;

// A 2-D grid of f32 samples co-registered to an area definition, stored
// row-major from the north-west corner. NaN marks cells with no usable data.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl Raster {
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "raster buffer length does not match dimensions"
        );
        Self {
            width,
            height,
            values,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.values[row * self.width + col] = value;
    }

    /// Minimum and maximum over finite cells, or `None` if no cell is finite.
    pub fn finite_min_max(&self) -> Option<(f32, f32)> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut any = false;

        for &v in &self.values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
                any = true;
            }
        }

        any.then_some((min, max))
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn mean(&self) -> f32 {
        let valid: Vec<f32> = self
            .values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();

        if valid.is_empty() {
            f32::NAN
        } else {
            valid.iter().sum::<f32>() / valid.len() as f32
        }
    }
}

impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = self.finite_min_max().unwrap_or((f32::NAN, f32::NAN));
        let total = self.values.len();
        let valid = self.valid_count();

        write!(
            f,
            "Raster {{ {}x{}, valid: {}/{} ({:.1}%), min: {}, max: {} }}",
            self.width,
            self.height,
            valid,
            total,
            100.0 * valid as f32 / total.max(1) as f32,
            min,
            max,
        )
    }
}
