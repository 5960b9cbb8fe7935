//! Color palettes and continuous color maps used by the static renderer.

use plotters::style::RGBColor;

/// Categorical palette (tab10 order).
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub const LINE_BLUE: RGBColor = RGBColor(0, 0, 255);
pub const BAR_GREEN: RGBColor = RGBColor(0, 128, 0);
pub const HIST_ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const KDE_ORANGE: RGBColor = RGBColor(204, 112, 0);
pub const SCATTER_RED: RGBColor = RGBColor(255, 0, 0);
pub const SCATTER_PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const BUBBLE_CYAN: RGBColor = RGBColor(0, 255, 255);
pub const MISSING_GREY: RGBColor = RGBColor(200, 200, 200);

// Anchors of the diverging map over [0, 1]
const COOLWARM: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (59, 76, 192)),
    (0.25, (141, 176, 254)),
    (0.5, (221, 221, 221)),
    (0.75, (244, 154, 123)),
    (1.0, (180, 4, 38)),
];

const VIRIDIS: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (68, 1, 84)),
    (0.25, (59, 82, 139)),
    (0.5, (33, 145, 140)),
    (0.75, (94, 201, 98)),
    (1.0, (253, 231, 37)),
];

pub fn categorical(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Diverging blue-white-red map for correlations in `[-1, 1]`.
pub fn coolwarm(value: f64) -> RGBColor {
    interpolate(&COOLWARM, (value.clamp(-1.0, 1.0) + 1.0) / 2.0)
}

/// Sequential map over `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    interpolate(&VIRIDIS, t.clamp(0.0, 1.0))
}

/// Blend a color toward white, as drawing it with `alpha` over a white page would.
pub fn over_white(color: RGBColor, alpha: f64) -> RGBColor {
    let a = alpha.clamp(0.0, 1.0);
    let blend = |c: u8| (c as f64 * a + 255.0 * (1.0 - a)).round() as u8;
    RGBColor(blend(color.0), blend(color.1), blend(color.2))
}

/// Perceived brightness, used to pick black or white annotation text.
pub fn is_dark(color: RGBColor) -> bool {
    let luma = 0.299 * color.0 as f64 + 0.587 * color.1 as f64 + 0.114 * color.2 as f64;
    luma < 128.0
}

fn interpolate(anchors: &[(f64, (u8, u8, u8))], t: f64) -> RGBColor {
    let upper = anchors
        .iter()
        .position(|(stop, _)| *stop >= t)
        .unwrap_or(anchors.len() - 1)
        .max(1);
    let (t0, c0) = anchors[upper - 1];
    let (t1, c1) = anchors[upper];
    let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: RGBColor) -> (u8, u8, u8) {
        (c.0, c.1, c.2)
    }

    #[test]
    fn coolwarm_endpoints_and_clamp() {
        assert_eq!(rgb(coolwarm(-1.0)), (59, 76, 192));
        assert_eq!(rgb(coolwarm(0.0)), (221, 221, 221));
        assert_eq!(rgb(coolwarm(1.0)), (180, 4, 38));
        assert_eq!(rgb(coolwarm(5.0)), rgb(coolwarm(1.0)));
    }

    #[test]
    fn over_white_blends() {
        assert_eq!(rgb(over_white(RGBColor(0, 0, 0), 0.0)), (255, 255, 255));
        assert_eq!(rgb(over_white(RGBColor(0, 0, 0), 1.0)), (0, 0, 0));
    }

    #[test]
    fn categorical_cycles() {
        assert_eq!(rgb(categorical(0)), rgb(categorical(10)));
        assert!(is_dark(coolwarm(-1.0)));
        assert!(!is_dark(coolwarm(0.0)));
    }
}
