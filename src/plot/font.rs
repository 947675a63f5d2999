//! Segment-stroked vector text for plot chrome. Characters are drawn as
//! short line strokes in a unit box, so no font files are needed.

use image::{Rgba, RgbaImage};

const CHAR_WIDTH_FACTOR: f32 = 0.6;
const CHAR_SPACING_FACTOR: f32 = 0.1;

/// Width in pixels of a text run at the given character height.
pub fn text_width(text: &str, size: f32) -> f32 {
    let chars = text.chars().count() as f32;
    if chars == 0.0 {
        return 0.0;
    }
    chars * (size * CHAR_WIDTH_FACTOR + size * CHAR_SPACING_FACTOR) - size * CHAR_SPACING_FACTOR
}

/// Draw text centered on (x, y), rotated by `angle` radians around the
/// center. Characters without a glyph are skipped.
pub fn draw_text(
    image: &mut RgbaImage,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    angle: f32,
    color: Rgba<u8>,
) {
    let char_width = size * CHAR_WIDTH_FACTOR;
    let spacing = size * CHAR_SPACING_FACTOR;
    let total_width = text_width(text, size);

    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let start_x = -total_width / 2.0;

    let stroke = (size * 0.08).round().max(1.0) as i32;

    for (i, ch) in text.chars().enumerate() {
        let char_x = start_x + i as f32 * (char_width + spacing) + char_width / 2.0;

        for ((x1, y1), (x2, y2)) in character_segments(ch, char_width / 2.0, size / 2.0) {
            let (sx, sy) = rotate(char_x + x1, y1, cos_a, sin_a, x, y);
            let (ex, ey) = rotate(char_x + x2, y2, cos_a, sin_a, x, y);
            draw_segment(image, sx, sy, ex, ey, stroke, color);
        }
    }
}

fn rotate(px: f32, py: f32, cos_a: f32, sin_a: f32, cx: f32, cy: f32) -> (f32, f32) {
    (px * cos_a - py * sin_a + cx, px * sin_a + py * cos_a + cy)
}

fn draw_segment(image: &mut RgbaImage, x1: f32, y1: f32, x2: f32, y2: f32, stroke: i32, color: Rgba<u8>) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let px = (x1 + dx * t).round() as i32;
        let py = (y1 + dy * t).round() as i32;

        for ox in 0..stroke {
            for oy in 0..stroke {
                let ix = px + ox;
                let iy = py + oy;
                if ix >= 0 && iy >= 0 && (ix as u32) < image.width() && (iy as u32) < image.height()
                {
                    image.put_pixel(ix as u32, iy as u32, color);
                }
            }
        }
    }
}

/// Stroke list for one character inside a box spanning [-w, w] x [-h, h],
/// with y growing downward. Lowercase folds to uppercase.
fn character_segments(ch: char, w: f32, h: f32) -> Vec<((f32, f32), (f32, f32))> {
    let m = 0.0;
    match ch.to_ascii_uppercase() {
        '0' | 'O' => vec![
            ((-w, -h), (w, -h)),
            ((w, -h), (w, h)),
            ((w, h), (-w, h)),
            ((-w, h), (-w, -h)),
        ],
        '1' => vec![((m, -h), (m, h)), ((-w * 0.5, h), (w * 0.5, h))],
        '2' => vec![
            ((-w, -h), (w, -h)),
            ((w, -h), (w, m)),
            ((w, m), (-w, m)),
            ((-w, m), (-w, h)),
            ((-w, h), (w, h)),
        ],
        '3' => vec![
            ((-w, -h), (w, -h)),
            ((w, -h), (w, h)),
            ((w, h), (-w, h)),
            ((-w, m), (w, m)),
        ],
        '4' => vec![((-w, -h), (-w, m)), ((-w, m), (w, m)), ((w, -h), (w, h))],
        '5' | 'S' => vec![
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, m)),
            ((-w, m), (w, m)),
            ((w, m), (w, h)),
            ((w, h), (-w, h)),
        ],
        '6' => vec![
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, h)),
            ((-w, h), (w, h)),
            ((w, h), (w, m)),
            ((w, m), (-w, m)),
        ],
        '7' => vec![((-w, -h), (w, -h)), ((w, -h), (m, h))],
        '8' => vec![
            ((-w, -h), (w, -h)),
            ((w, -h), (w, h)),
            ((w, h), (-w, h)),
            ((-w, h), (-w, -h)),
            ((-w, m), (w, m)),
        ],
        '9' => vec![
            ((-w, m), (w, m)),
            ((w, m), (w, -h)),
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, m)),
            ((w, m), (w, h)),
        ],
        'A' => vec![
            ((-w, h), (m, -h)),
            ((m, -h), (w, h)),
            ((-w * 0.5, h * 0.2), (w * 0.5, h * 0.2)),
        ],
        'B' => vec![
            ((-w, -h), (-w, h)),
            ((-w, -h), (w, -h)),
            ((w, -h), (w, h)),
            ((w, h), (-w, h)),
            ((-w, m), (w, m)),
        ],
        'C' => vec![((w, -h), (-w, -h)), ((-w, -h), (-w, h)), ((-w, h), (w, h))],
        'D' => vec![
            ((-w, -h), (-w, h)),
            ((-w, -h), (w * 0.5, -h)),
            ((w * 0.5, -h), (w, m)),
            ((w, m), (w * 0.5, h)),
            ((w * 0.5, h), (-w, h)),
        ],
        'E' => vec![
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, h)),
            ((-w, h), (w, h)),
            ((-w, m), (w * 0.6, m)),
        ],
        'F' => vec![
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, h)),
            ((-w, m), (w * 0.6, m)),
        ],
        'G' => vec![
            ((w, -h), (-w, -h)),
            ((-w, -h), (-w, h)),
            ((-w, h), (w, h)),
            ((w, h), (w, m)),
            ((w, m), (m, m)),
        ],
        'H' => vec![((-w, -h), (-w, h)), ((w, -h), (w, h)), ((-w, m), (w, m))],
        'I' => vec![
            ((m, -h), (m, h)),
            ((-w * 0.5, -h), (w * 0.5, -h)),
            ((-w * 0.5, h), (w * 0.5, h)),
        ],
        'J' => vec![
            ((w * 0.5, -h), (w * 0.5, h * 0.5)),
            ((w * 0.5, h * 0.5), (m, h)),
            ((m, h), (-w * 0.5, h * 0.5)),
        ],
        'K' => vec![((-w, -h), (-w, h)), ((-w, m), (w, -h)), ((-w, m), (w, h))],
        'L' => vec![((-w, -h), (-w, h)), ((-w, h), (w, h))],
        'M' => vec![
            ((-w, h), (-w, -h)),
            ((-w, -h), (m, m)),
            ((m, m), (w, -h)),
            ((w, -h), (w, h)),
        ],
        'N' => vec![((-w, h), (-w, -h)), ((-w, -h), (w, h)), ((w, h), (w, -h))],
        'P' => vec![
            ((-w, h), (-w, -h)),
            ((-w, -h), (w, -h)),
            ((w, -h), (w, m)),
            ((w, m), (-w, m)),
        ],
        'Q' => vec![
            ((-w, -h), (w, -h)),
            ((w, -h), (w, h)),
            ((w, h), (-w, h)),
            ((-w, h), (-w, -h)),
            ((w * 0.3, h * 0.3), (w, h)),
        ],
        'R' => vec![
            ((-w, h), (-w, -h)),
            ((-w, -h), (w, -h)),
            ((w, -h), (w, m)),
            ((w, m), (-w, m)),
            ((m, m), (w, h)),
        ],
        'T' => vec![((-w, -h), (w, -h)), ((m, -h), (m, h))],
        'U' => vec![((-w, -h), (-w, h)), ((-w, h), (w, h)), ((w, h), (w, -h))],
        'V' => vec![((-w, -h), (m, h)), ((m, h), (w, -h))],
        'W' => vec![
            ((-w, -h), (-w * 0.5, h)),
            ((-w * 0.5, h), (m, m)),
            ((m, m), (w * 0.5, h)),
            ((w * 0.5, h), (w, -h)),
        ],
        'X' => vec![((-w, -h), (w, h)), ((w, -h), (-w, h))],
        'Y' => vec![((-w, -h), (m, m)), ((w, -h), (m, m)), ((m, m), (m, h))],
        'Z' => vec![((-w, -h), (w, -h)), ((w, -h), (-w, h)), ((-w, h), (w, h))],
        '-' => vec![((-w, m), (w, m))],
        '.' => vec![((m, h * 0.8), (m, h))],
        ',' => vec![((m, h * 0.7), (-w * 0.3, h * 1.1))],
        ':' => vec![((m, -h * 0.4), (m, -h * 0.2)), ((m, h * 0.2), (m, h * 0.4))],
        '(' => vec![
            ((w * 0.3, -h), (-w * 0.3, -h * 0.4)),
            ((-w * 0.3, -h * 0.4), (-w * 0.3, h * 0.4)),
            ((-w * 0.3, h * 0.4), (w * 0.3, h)),
        ],
        ')' => vec![
            ((-w * 0.3, -h), (w * 0.3, -h * 0.4)),
            ((w * 0.3, -h * 0.4), (w * 0.3, h * 0.4)),
            ((w * 0.3, h * 0.4), (-w * 0.3, h)),
        ],
        '&' => vec![
            ((w * 0.6, -h), (-w * 0.4, -h)),
            ((-w * 0.4, -h), (-w, m)),
            ((-w, m), (w * 0.6, h)),
            ((w * 0.6, h), (-w, h)),
            ((-w * 0.2, -h * 0.2), (w, h)),
        ],
        '/' => vec![((w, -h), (-w, h))],
        '%' => vec![
            ((w, -h), (-w, h)),
            ((-w, -h), (-w * 0.5, -h)),
            ((w * 0.5, h), (w, h)),
        ],
        '+' => vec![((-w, m), (w, m)), ((m, -h * 0.6), (m, h * 0.6))],
        _ => vec![],
    }
}
