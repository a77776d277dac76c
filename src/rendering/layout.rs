//! Geometry shared by the frame renderer, the compositor and the
//! rasterizer: points, rectangles, transform helpers, image fit math and
//! title line-wrapping.

use tiny_skia::Transform;

use crate::rendering::text;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `d` on every side
    pub fn inset(&self, d: f32) -> Rect {
        Rect::new(
            self.x + d,
            self.y + d,
            (self.width - 2.0 * d).max(0.0),
            (self.height - 2.0 * d).max(0.0),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rect holding every point
    pub fn bounding(points: &[Point]) -> Rect {
        let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
        let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        if !x0.is_finite() {
            return Rect::default();
        }
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

/// Per-corner radii (top-left, top-right, bottom-right, bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Radii {
    pub tl: f32,
    pub tr: f32,
    pub br: f32,
    pub bl: f32,
}

impl Radii {
    pub const fn all(r: f32) -> Self {
        Self { tl: r, tr: r, br: r, bl: r }
    }

    pub const fn top(r: f32) -> Self {
        Self { tl: r, tr: r, br: 0.0, bl: 0.0 }
    }

    pub const fn bottom(r: f32) -> Self {
        Self { tl: 0.0, tr: 0.0, br: r, bl: r }
    }

    pub const fn right(r: f32) -> Self {
        Self { tl: 0.0, tr: r, br: r, bl: 0.0 }
    }
}

/// Apply `inner` about `origin`, the way a CSS transform with a
/// transform-origin behaves.
pub fn about(origin: Point, inner: Transform) -> Transform {
    Transform::from_translate(-origin.x, -origin.y)
        .post_concat(inner)
        .post_translate(origin.x, origin.y)
}

pub fn map_point(t: &Transform, p: Point) -> Point {
    let mut pts = [tiny_skia::Point::from_xy(p.x, p.y)];
    t.map_points(&mut pts);
    Point::new(pts[0].x, pts[0].y)
}

/// Bounds of `rect` after transformation
pub fn map_rect(t: &Transform, rect: &Rect) -> Rect {
    let pts = rect.corners().map(|p| map_point(t, p));
    Rect::bounding(&pts)
}

/// Source region of a `src_w`x`src_h` image that fills a `dst_w`x`dst_h`
/// box with "cover" fit, centered horizontally and anchored to the top.
pub fn cover_top_crop(src_w: f32, src_h: f32, dst_w: f32, dst_h: f32) -> Rect {
    if src_w <= 0.0 || src_h <= 0.0 || dst_w <= 0.0 || dst_h <= 0.0 {
        return Rect::default();
    }
    let scale = (dst_w / src_w).max(dst_h / src_h);
    let crop_w = (dst_w / scale).min(src_w);
    let crop_h = (dst_h / scale).min(src_h);
    Rect::new((src_w - crop_w) / 2.0, 0.0, crop_w, crop_h)
}

/// Width of a box that fits `src` inside `height` keeping aspect ratio
pub fn contain_width_for_height(src_w: f32, src_h: f32, height: f32) -> f32 {
    if src_h <= 0.0 {
        return 0.0;
    }
    src_w * height / src_h
}

/// Greedy word wrap so that no line is wider than `max_width` at
/// `size_px`. A single word longer than the line is kept on its own line.
pub fn wrap_title(title: &str, size_px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in title.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", cur, word)
        };
        if text::measure(&candidate, size_px) > max_width && !cur.is_empty() {
            lines.push(std::mem::replace(&mut cur, word.to_string()));
        } else {
            cur = candidate;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}
