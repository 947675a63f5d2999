//! Sediment CDOM Index from MODIS band ratios and sea surface temperature.
//!
//! This module derives an absorption proxy for chromophoric dissolved organic
//! matter (aCDOM at 412 nm) from a blue/green reflectance band ratio, then
//! weights it by inverted sea surface temperature to emphasize cooler,
//! sediment-laden coastal water.
//!
//! ## Processing Steps
//!
//! 1. **Band ratio**: divide the 412 nm reflectance by the 555 nm reflectance
//! 2. **aCDOM(412)**: `ln((ratio - B0) / B2) / (-B1)` with operational
//!    coefficients B0=0.2487, B1=14.028, B2=4.085
//! 3. **SST inversion**: map byte-scaled temperature to `1 - x/255` so cold
//!    water approaches 1 and warm water approaches 0
//! 4. **Combination**: multiply aCDOM by inverted SST wherever aCDOM is
//!    defined, leaving other cells at zero
//!
//! ## Numeric Behavior
//!
//! The index is computed with plain IEEE 754 arithmetic and no clamping:
//! a ratio equal to B0 + B2 yields exactly zero, a ratio equal to B0 yields
//! positive infinity, and a ratio below B0 yields NaN. NaN marks cells the
//! combination step skips; infinities count as valid and flow through.

use serde::Deserialize;

use crate::raster::Raster;

/// Band-ratio coefficients for the aCDOM(412) retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
}

impl Default for Coefficients {
    fn default() -> Self {
        Coefficients {
            b0: 0.2487,
            b1: 14.028,
            b2: 4.085,
        }
    }
}

/// How byte-scaled sea surface temperature is inverted before combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum InversionMode {
    #[serde(rename = "linear")]
    Linear,
}

/// aCDOM(412) from the 412 nm and 555 nm reflectance rasters.
///
/// Out-of-domain ratios produce NaN or infinities as described in the module
/// documentation; callers decide how to mask them.
pub fn compute_cdom(r412: &Raster, r555: &Raster, coefficients: &Coefficients) -> Raster {
    assert_eq!(
        (r412.width, r412.height),
        (r555.width, r555.height),
        "reflectance rasters must share dimensions"
    );

    let values = r412
        .values
        .iter()
        .zip(r555.values.iter())
        .map(|(&blue, &green)| {
            let ratio = blue / green;
            ((ratio - coefficients.b0) / coefficients.b2).ln() / (-coefficients.b1)
        })
        .collect();

    Raster::from_values(r412.width, r412.height, values)
}

/// Invert a byte-scaled temperature raster so low temperatures score high.
pub fn invert_temperature(sst: &Raster, mode: InversionMode) -> Raster {
    let values = sst
        .values
        .iter()
        .map(|&value| match mode {
            InversionMode::Linear => -(value / 255.0) + 1.0,
        })
        .collect();

    Raster::from_values(sst.width, sst.height, values)
}

/// Multiply aCDOM by inverted SST where aCDOM is defined.
///
/// Cells where aCDOM is NaN stay at zero, so the output carries no NaN from
/// the CDOM side. NaN in the temperature raster under a defined aCDOM cell
/// propagates into the product.
pub fn combine(cdom: &Raster, inverted_sst: &Raster) -> Raster {
    assert_eq!(
        (cdom.width, cdom.height),
        (inverted_sst.width, inverted_sst.height),
        "combine requires rasters of identical dimensions"
    );

    let mut combined = Raster::filled(cdom.width, cdom.height, 0.0);

    for (i, &value) in cdom.values.iter().enumerate() {
        if !value.is_nan() {
            combined.values[i] = value * inverted_sst.values[i];
        }
    }

    combined
}

pub fn fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Round coefficients keep the boundary arithmetic exact in f32.
    fn exact_coefficients() -> Coefficients {
        Coefficients {
            b0: 0.25,
            b1: 14.0,
            b2: 4.0,
        }
    }

    #[test]
    fn test_cdom_boundary_ratios() {
        let coefficients = exact_coefficients();
        let r412 = Raster::from_values(3, 1, vec![4.25, 0.25, 0.1]);
        let r555 = Raster::filled(3, 1, 1.0);

        let cdom = compute_cdom(&r412, &r555, &coefficients);

        // ratio == b0 + b2
        assert_eq!(cdom.values[0], 0.0);
        // ratio == b0
        assert!(cdom.values[1].is_infinite() && cdom.values[1] > 0.0);
        // ratio < b0
        assert!(cdom.values[2].is_nan());
    }

    #[test]
    fn test_cdom_zero_denominator() {
        let coefficients = Coefficients::default();
        let r412 = Raster::from_values(2, 1, vec![0.5, 0.0]);
        let r555 = Raster::filled(2, 1, 0.0);

        let cdom = compute_cdom(&r412, &r555, &coefficients);

        assert!(cdom.values[0].is_infinite() && cdom.values[0] < 0.0);
        assert!(cdom.values[1].is_nan());
    }

    #[test]
    fn test_cdom_nan_input_propagates() {
        let coefficients = Coefficients::default();
        let r412 = Raster::from_values(1, 1, vec![f32::NAN]);
        let r555 = Raster::filled(1, 1, 1.0);

        let cdom = compute_cdom(&r412, &r555, &coefficients);

        assert!(cdom.values[0].is_nan());
    }

    #[test]
    fn test_invert_temperature_bounds() {
        let sst = Raster::from_values(3, 1, vec![0.0, 255.0, 127.5]);
        let inverted = invert_temperature(&sst, InversionMode::Linear);

        assert_eq!(inverted.values[0], 1.0);
        assert_eq!(inverted.values[1], 0.0);
        assert_eq!(inverted.values[2], 0.5);
    }

    #[test]
    fn test_combine_masks_nan_cdom() {
        let cdom = Raster::from_values(2, 2, vec![0.25, f32::NAN, 0.5, 0.3]);
        let inverted = Raster::from_values(2, 2, vec![0.5, 0.9, f32::NAN, 1.0]);

        let combined = combine(&cdom, &inverted);

        assert_eq!(combined.values[0], 0.125);
        // NaN aCDOM leaves the zero fill in place
        assert_eq!(combined.values[1], 0.0);
        // Defined aCDOM against NaN temperature propagates
        assert!(combined.values[2].is_nan());
        assert_eq!(combined.values[3], 0.3);
    }

    #[test]
    fn test_combine_keeps_infinite_cdom() {
        let cdom = Raster::from_values(1, 1, vec![f32::INFINITY]);
        let inverted = Raster::filled(1, 1, 0.5);

        let combined = combine(&cdom, &inverted);

        assert!(combined.values[0].is_infinite() && combined.values[0] > 0.0);
    }

    #[test]
    #[should_panic(expected = "identical dimensions")]
    fn test_combine_dimension_mismatch_panics() {
        let cdom = Raster::filled(2, 2, 0.1);
        let inverted = Raster::filled(3, 2, 0.5);
        combine(&cdom, &inverted);
    }

    #[test]
    fn test_temperature_conversions() {
        assert_eq!(fahrenheit(0.0), 32.0);
        assert_eq!(fahrenheit(100.0), 212.0);
        assert_eq!(celsius(32.0), 0.0);
        assert_eq!(celsius(212.0), 100.0);
    }

    #[test]
    fn test_inversion_mode_from_json() {
        let mode: InversionMode =
            serde_json::from_str("\"linear\"").expect("Failed to parse mode");
        assert_eq!(mode, InversionMode::Linear);

        let unknown = serde_json::from_str::<InversionMode>("\"quadratic\"");
        assert!(unknown.is_err());
    }
}
