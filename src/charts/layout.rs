//! Layout geometry for the charts plotters has no element for:
//! word cloud placement, squarified treemap and three-set Venn circles.
//!
//! Everything here works in plain pixel/unit coordinates so it can be
//! exercised without a drawing backend.

use std::collections::HashMap;

/// Axis-aligned rectangle, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl LayoutRect {
    pub fn new(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, dx, dy }
    }

    pub fn area(&self) -> f64 {
        self.dx * self.dy
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.dx / 2.0, self.y + self.dy / 2.0)
    }

    pub fn intersects(&self, other: &LayoutRect) -> bool {
        self.x < other.x + other.dx
            && other.x < self.x + self.dx
            && self.y < other.y + other.dy
            && other.y < self.y + self.dy
    }

    pub fn contained_in(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.dx <= width && self.y + self.dy <= height
    }
}

// ---------------------------------------------------------------------------
// Word cloud
// ---------------------------------------------------------------------------

/// Word counts from free text, most frequent first.
///
/// Tokens are runs of alphanumerics, `_` or `'` of at least two characters.
/// Case variants are merged and shown in their most common spelling.
pub fn word_frequencies(text: &str) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut spellings: HashMap<String, Vec<(String, usize)>> = HashMap::new();

    let tokens = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| t.chars().count() >= 2);

    for token in tokens {
        let key = token.to_lowercase();
        let variants = spellings.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        match variants.iter_mut().find(|(s, _)| s == token) {
            Some((_, n)) => *n += 1,
            None => variants.push((token.to_string(), 1)),
        }
    }

    let mut words: Vec<(String, usize)> = order
        .iter()
        .filter_map(|key| {
            let variants = spellings.get(key)?;
            let total = variants.iter().map(|(_, n)| n).sum();
            // max_by_key keeps the last maximum; fold keeps the first
            let shown = variants
                .iter()
                .fold(None::<&(String, usize)>, |best, v| match best {
                    Some(b) if b.1 >= v.1 => Some(b),
                    _ => Some(v),
                })?;
            Some((shown.0.clone(), total))
        })
        .collect();

    words.sort_by(|a, b| b.1.cmp(&a.1));
    words
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f64,
    pub rect: LayoutRect,
    /// Relative frequency in `(0, 1]`.
    pub weight: f64,
}

/// Parameters for word placement.
#[derive(Debug, Clone, Copy)]
pub struct CloudSettings {
    pub width: f64,
    pub height: f64,
    pub max_font: f64,
    pub min_font: f64,
    /// Gap kept around each word.
    pub padding: f64,
    pub max_words: usize,
}

/// Greedy spiral placement, largest word first.
///
/// Font size is proportional to relative frequency, floored at `min_font`.
/// `measure` returns the rendered (width, height) of a word at a font size.
/// A word that does not fit is retried at 80% size down to `min_font`,
/// then dropped.
pub fn layout_word_cloud<F>(
    words: &[(String, usize)],
    settings: CloudSettings,
    mut measure: F,
) -> Vec<PlacedWord>
where
    F: FnMut(&str, f64) -> (f64, f64),
{
    let Some(max_count) = words.iter().map(|(_, n)| *n).max().filter(|n| *n > 0) else {
        return Vec::new();
    };

    let (cx, cy) = (settings.width / 2.0, settings.height / 2.0);
    let aspect = settings.height / settings.width.max(1.0);
    let max_radius = settings.width.hypot(settings.height) / 2.0;
    let mut placed: Vec<PlacedWord> = Vec::new();

    for (text, count) in words.iter().take(settings.max_words) {
        let weight = *count as f64 / max_count as f64;
        let mut font_size = (settings.max_font * weight).max(settings.min_font);

        while font_size >= settings.min_font {
            let (w, h) = measure(text, font_size);
            let spot = spiral_search(cx, cy, aspect, max_radius, |x, y| {
                let rect = LayoutRect::new(
                    x - w / 2.0 - settings.padding,
                    y - h / 2.0 - settings.padding,
                    w + 2.0 * settings.padding,
                    h + 2.0 * settings.padding,
                );
                let fits = rect.contained_in(settings.width, settings.height)
                    && !placed.iter().any(|p| p.rect.intersects(&rect));
                fits.then_some(LayoutRect::new(x - w / 2.0, y - h / 2.0, w, h))
            });

            if let Some(rect) = spot {
                placed.push(PlacedWord {
                    text: text.clone(),
                    font_size,
                    rect,
                    weight,
                });
                break;
            }
            font_size *= 0.8;
        }
    }

    placed
}

fn spiral_search<F>(cx: f64, cy: f64, aspect: f64, max_radius: f64, mut probe: F) -> Option<LayoutRect>
where
    F: FnMut(f64, f64) -> Option<LayoutRect>,
{
    const STEP: f64 = 0.1;
    const GROWTH: f64 = 2.0;

    let mut t: f64 = 0.0;
    loop {
        let r = GROWTH * t;
        if r > max_radius {
            return None;
        }
        let x = cx + r * t.cos();
        let y = cy + r * t.sin() * aspect;
        if let Some(rect) = probe(x, y) {
            return Some(rect);
        }
        t += STEP;
    }
}

// ---------------------------------------------------------------------------
// Treemap
// ---------------------------------------------------------------------------

/// Squarified treemap of `values` (sorted descending) inside `bounds`.
///
/// Values are rescaled so the rectangles exactly tile the bounds.
pub fn squarify(values: &[f64], bounds: LayoutRect) -> Vec<LayoutRect> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return Vec::new();
    }
    let scaled: Vec<f64> = values
        .iter()
        .map(|v| v.max(0.0) * bounds.area() / total)
        .collect();

    let mut rects = Vec::with_capacity(scaled.len());
    squarify_into(&scaled, bounds, &mut rects);
    rects
}

fn squarify_into(sizes: &[f64], bounds: LayoutRect, out: &mut Vec<LayoutRect>) {
    match sizes.len() {
        0 => {}
        1 => out.extend(layout_strip(sizes, bounds)),
        _ => {
            let mut i = 1;
            while i < sizes.len()
                && worst_ratio(&sizes[..i], bounds) >= worst_ratio(&sizes[..=i], bounds)
            {
                i += 1;
            }
            let (current, remaining) = sizes.split_at(i);
            out.extend(layout_strip(current, bounds));
            squarify_into(remaining, leftover(current, bounds), out);
        }
    }
}

fn layout_strip(sizes: &[f64], b: LayoutRect) -> Vec<LayoutRect> {
    let covered: f64 = sizes.iter().sum();
    let mut rects = Vec::with_capacity(sizes.len());
    if b.dx >= b.dy {
        // Column along the left edge
        let width = covered / b.dy;
        let mut y = b.y;
        for size in sizes {
            let h = if width > 0.0 { size / width } else { 0.0 };
            rects.push(LayoutRect::new(b.x, y, width, h));
            y += h;
        }
    } else {
        // Row along the top edge
        let height = covered / b.dx;
        let mut x = b.x;
        for size in sizes {
            let w = if height > 0.0 { size / height } else { 0.0 };
            rects.push(LayoutRect::new(x, b.y, w, height));
            x += w;
        }
    }
    rects
}

fn leftover(sizes: &[f64], b: LayoutRect) -> LayoutRect {
    let covered: f64 = sizes.iter().sum();
    if b.dx >= b.dy {
        let width = covered / b.dy;
        LayoutRect::new(b.x + width, b.y, b.dx - width, b.dy)
    } else {
        let height = covered / b.dx;
        LayoutRect::new(b.x, b.y + height, b.dx, b.dy - height)
    }
}

fn worst_ratio(sizes: &[f64], bounds: LayoutRect) -> f64 {
    layout_strip(sizes, bounds)
        .iter()
        .map(|r| {
            if r.dx <= 0.0 || r.dy <= 0.0 {
                f64::INFINITY
            } else {
                (r.dx / r.dy).max(r.dy / r.dx)
            }
        })
        .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// Venn
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VennCircle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// Three circles with area proportional to `sizes`, fitted to `width` x `height`.
///
/// Disjoint sets are laid out with a gap between every pair; otherwise the
/// circles overlap by a fixed fraction of their radii.
pub fn venn_layout(sizes: [usize; 3], disjoint: bool, width: f64, height: f64) -> [VennCircle; 3] {
    let radii = sizes.map(|s| (s as f64).sqrt().max(0.1));
    let gap = if disjoint { 0.15 * radii[0] } else { 0.0 };
    let reach = |i: usize, j: usize| {
        let sum = radii[i] + radii[j];
        if disjoint {
            sum + gap
        } else {
            0.7 * sum
        }
    };

    // A and B side by side, C centred beneath them
    let a = (0.0, 0.0);
    let b = (reach(0, 1), 0.0);
    let mid = b.0 / 2.0;
    let dy_a = (reach(0, 2).powi(2) - mid.powi(2)).max(0.0).sqrt();
    let dy_b = (reach(1, 2).powi(2) - mid.powi(2)).max(0.0).sqrt();
    let c = (mid, dy_a.max(dy_b));

    let centers = [a, b, c];
    let min_x = (0..3).map(|i| centers[i].0 - radii[i]).fold(f64::INFINITY, f64::min);
    let max_x = (0..3).map(|i| centers[i].0 + radii[i]).fold(f64::NEG_INFINITY, f64::max);
    let min_y = (0..3).map(|i| centers[i].1 - radii[i]).fold(f64::INFINITY, f64::min);
    let max_y = (0..3).map(|i| centers[i].1 + radii[i]).fold(f64::NEG_INFINITY, f64::max);

    let scale = (width / (max_x - min_x)).min(height / (max_y - min_y));
    let off_x = (width - (max_x - min_x) * scale) / 2.0;
    let off_y = (height - (max_y - min_y) * scale) / 2.0;

    [0, 1, 2].map(|i| VennCircle {
        cx: off_x + (centers[i].0 - min_x) * scale,
        cy: off_y + (centers[i].1 - min_y) * scale,
        r: radii[i] * scale,
    })
}

/// Anchor points for the seven region counts, in `VennRegions::as_array` order.
pub fn venn_label_positions(circles: &[VennCircle; 3]) -> [(f64, f64); 7] {
    let gx = circles.iter().map(|c| c.cx).sum::<f64>() / 3.0;
    let gy = circles.iter().map(|c| c.cy).sum::<f64>() / 3.0;

    let push = |from: (f64, f64), away: (f64, f64), dist: f64| {
        let (dx, dy) = (from.0 - away.0, from.1 - away.1);
        let len = dx.hypot(dy);
        if len < f64::EPSILON {
            from
        } else {
            (from.0 + dx / len * dist, from.1 + dy / len * dist)
        }
    };
    let only = |i: usize| {
        let c = circles[i];
        push((c.cx, c.cy), (gx, gy), 0.35 * c.r)
    };
    let pair = |i: usize, j: usize, k: usize| {
        let (a, b, c) = (circles[i], circles[j], circles[k]);
        let mid = ((a.cx + b.cx) / 2.0, (a.cy + b.cy) / 2.0);
        push(mid, (c.cx, c.cy), 0.2 * (a.r + b.r) / 2.0)
    };

    [
        only(0),
        only(1),
        pair(0, 1, 2),
        only(2),
        pair(0, 2, 1),
        pair(1, 2, 0),
        (gx, gy),
    ]
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

/// Outline of a pie wedge in pixel space (y down), angles in degrees
/// counter-clockwise from the positive x axis.
pub fn pie_wedge(cx: f64, cy: f64, r: f64, start_deg: f64, end_deg: f64) -> Vec<(i32, i32)> {
    let span = (end_deg - start_deg).max(0.0);
    let steps = (span.ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((cx.round() as i32, cy.round() as i32));
    for step in 0..=steps {
        let theta = (start_deg + span * step as f64 / steps as f64).to_radians();
        points.push(polar(cx, cy, r, theta));
    }
    points
}

/// Point at `r` along the direction `theta` (radians, counter-clockwise).
pub fn polar(cx: f64, cy: f64, r: f64, theta: f64) -> (i32, i32) {
    (
        (cx + r * theta.cos()).round() as i32,
        (cy - r * theta.sin()).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_wedge_starts_at_top_and_turns_left() {
        let wedge = pie_wedge(100.0, 100.0, 50.0, 90.0, 180.0);
        assert_eq!(wedge[0], (100, 100));
        assert_eq!(wedge[1], (100, 50));
        assert_eq!(*wedge.last().unwrap(), (50, 100));
        assert_eq!(wedge.len(), 92);
    }

    #[test]
    fn venn_triple_label_sits_at_centroid() {
        let circles = venn_layout([10, 10, 10], false, 300.0, 300.0);
        let labels = venn_label_positions(&circles);
        let gx = circles.iter().map(|c| c.cx).sum::<f64>() / 3.0;
        assert!((labels[6].0 - gx).abs() < 1e-9);
        // Exclusive labels stay inside their own circle
        for (i, at) in [0usize, 1, 3].iter().enumerate() {
            let c = circles[i];
            let (x, y) = labels[*at];
            assert!((x - c.cx).hypot(y - c.cy) < c.r);
        }
    }

    #[test]
    fn word_frequencies_merge_case() {
        let words = word_frequencies("Apple SAMSUNG apple Apple samsung Mi x");
        assert_eq!(words[0], ("Apple".to_string(), 3));
        assert_eq!(words[1].1, 2);
        assert_eq!(words[2], ("Mi".to_string(), 1));
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn cloud_words_do_not_overlap() {
        let words: Vec<(String, usize)> = (0..15)
            .map(|i| (format!("word{i}"), 20 - i))
            .collect();
        let settings = CloudSettings {
            width: 800.0,
            height: 400.0,
            max_font: 80.0,
            min_font: 8.0,
            padding: 1.0,
            max_words: 200,
        };
        let placed = layout_word_cloud(&words, settings, |text, size| {
            (0.6 * size * text.len() as f64, size)
        });
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.rect.contained_in(800.0, 400.0));
            for b in &placed[i + 1..] {
                assert!(!a.rect.intersects(&b.rect), "{} overlaps {}", a.text, b.text);
            }
        }
        assert_eq!(placed[0].weight, 1.0);
    }

    #[test]
    fn squarify_tiles_the_bounds() {
        let values = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];
        let bounds = LayoutRect::new(0.0, 0.0, 600.0, 400.0);
        let rects = squarify(&values, bounds);
        assert_eq!(rects.len(), values.len());

        let total_area: f64 = rects.iter().map(|r| r.area()).sum();
        assert!((total_area - bounds.area()).abs() < 1e-6);

        let sum: f64 = values.iter().sum();
        for (rect, value) in rects.iter().zip(values) {
            let expected = value / sum * bounds.area();
            assert!((rect.area() - expected).abs() < 1e-6);
            assert!(rect.x >= -1e-9 && rect.x + rect.dx <= 600.0 + 1e-6);
            assert!(rect.y >= -1e-9 && rect.y + rect.dy <= 400.0 + 1e-6);
        }
    }

    #[test]
    fn squarify_ignores_empty_input() {
        assert!(squarify(&[], LayoutRect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
        assert!(squarify(&[0.0], LayoutRect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn disjoint_venn_circles_do_not_touch() {
        let circles = venn_layout([40, 25, 10], true, 500.0, 500.0);
        for i in 0..3 {
            for j in i + 1..3 {
                let (a, b) = (circles[i], circles[j]);
                let d = (a.cx - b.cx).hypot(a.cy - b.cy);
                assert!(d > a.r + b.r, "circles {i} and {j} overlap");
            }
            assert!(circles[i].cx - circles[i].r >= -1e-6);
            assert!(circles[i].cy + circles[i].r <= 500.0 + 1e-6);
        }
        // Area follows set size
        assert!(circles[0].r > circles[1].r && circles[1].r > circles[2].r);
    }

    #[test]
    fn overlapping_venn_circles_intersect() {
        let circles = venn_layout([10, 10, 10], false, 300.0, 300.0);
        let d = (circles[0].cx - circles[1].cx).hypot(circles[0].cy - circles[1].cy);
        assert!(d < circles[0].r + circles[1].r);
    }
}
