//! Fixed inferno gradient used for the index plots.

/// A color stop at a normalized position in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub position: f32,
    pub color: [u8; 3],
}

/// Inferno sampled at nine evenly spaced positions.
pub const INFERNO: [ColorStop; 9] = [
    ColorStop { position: 0.0, color: [0, 0, 4] },
    ColorStop { position: 0.125, color: [27, 12, 65] },
    ColorStop { position: 0.25, color: [74, 12, 107] },
    ColorStop { position: 0.375, color: [120, 28, 109] },
    ColorStop { position: 0.5, color: [165, 44, 96] },
    ColorStop { position: 0.625, color: [207, 68, 70] },
    ColorStop { position: 0.75, color: [237, 105, 37] },
    ColorStop { position: 0.875, color: [251, 155, 6] },
    ColorStop { position: 1.0, color: [252, 255, 164] },
];

/// Map a value into [0, 1] between the scale bounds, clamping outliers.
/// A degenerate range paints everything at the low end.
pub fn normalize(value: f32, cmin: f32, cmax: f32) -> f32 {
    if cmax <= cmin {
        return 0.0;
    }
    ((value - cmin) / (cmax - cmin)).clamp(0.0, 1.0)
}

/// Interpolate the gradient at a normalized position.
pub fn evaluate(stops: &[ColorStop], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);

    if t <= stops[0].position {
        return stops[0].color;
    }

    for i in 1..stops.len() {
        if t <= stops[i].position {
            let low = &stops[i - 1];
            let high = &stops[i];
            let span = high.position - low.position;
            let f = (t - low.position) / span;
            return lerp(low.color, high.color, f);
        }
    }

    stops[stops.len() - 1].color
}

fn lerp(a: [u8; 3], b: [u8; 3], f: f32) -> [u8; 3] {
    let mut out = [0u8; 3];
    for c in 0..3 {
        let blended = a[c] as f32 + (b[c] as f32 - a[c] as f32) * f;
        out[c] = blended.round() as u8;
    }
    out
}
