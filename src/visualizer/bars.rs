/// Share of the surface height a full-scale bin reaches.
pub const BAR_HEIGHT_FRACTION: f64 = 0.8;

const LOW: (u8, u8, u8) = (0, 200, 0);
const MID: (u8, u8, u8) = (230, 210, 0);
const HIGH: (u8, u8, u8) = (220, 0, 0);

/// One bar in surface coordinates; `x` grows to the right, `height` upwards
/// from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    /// Whether the bar overlaps the unit-wide column starting at `col`.
    pub fn covers(&self, col: f64) -> bool {
        self.x < col + 1.0 && self.x + self.width > col
    }
}

/// Split `width` into one equal bar per magnitude, in bin order.
pub fn layout_bars(magnitudes: &[u8], width: f64, height: f64) -> Vec<Bar> {
    if magnitudes.is_empty() || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let bar_width = width / magnitudes.len() as f64;
    magnitudes
        .iter()
        .enumerate()
        .map(|(i, &m)| Bar {
            x: i as f64 * bar_width,
            width: bar_width,
            height: m as f64 / 255.0 * BAR_HEIGHT_FRACTION * height,
        })
        .collect()
}

/// Colour at relative screen height `t` (0 = bottom, 1 = top).
pub fn gradient_at(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.5 {
        lerp(LOW, MID, t * 2.0)
    } else {
        lerp(MID, HIGH, (t - 0.5) * 2.0)
    }
}

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
