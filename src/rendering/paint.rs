//! Display-list command set produced by the frame renderer and the
//! compositor and consumed by the rasterizer.

use tiny_skia::Transform;

use crate::rendering::layout::{Point, Radii, Rect};

/// Straight-alpha RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Same color at `opacity` (0..=1) of its current alpha
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// How a shape is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient between two points in the command's coordinates
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn linear(start: Point, end: Point, colors: &[Color]) -> Paint {
        let n = colors.len().saturating_sub(1).max(1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientStop { offset: i as f32 / n, color })
            .collect();
        Paint::Linear { start, end, stops }
    }
}

/// How an image fills its box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Fill the box, crop overflow, keep the top edge
    CoverTop,
    /// Stretch to the box (caller already sized it to the aspect ratio)
    Fill,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Rounded rectangle
    Fill {
        rect: Rect,
        radii: Radii,
        paint: Paint,
    },
    /// Soft ellipse: opaque out to `hardness` of its radius, then fading
    /// smoothly to nothing at the rim
    Glow {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        hardness: f32,
        color: Color,
    },
    /// Image fetched by URL, clipped to a rounded rect
    Image {
        url: String,
        rect: Rect,
        radii: Radii,
        fit: ImageFit,
    },
    /// One line of title text; `origin` is the top-left of its line box
    Text {
        text: String,
        origin: Point,
        size: f32,
        paint: Paint,
    },
    /// A group painted offscreen at `width`x`height` and composited with
    /// `transform`
    Layer {
        transform: Transform,
        width: u32,
        height: u32,
        commands: Vec<PaintCommand>,
    },
}

impl PaintCommand {
    pub fn fill(rect: Rect, radii: Radii, color: Color) -> Self {
        PaintCommand::Fill { rect, radii, paint: Paint::Solid(color) }
    }

    /// Every image URL referenced by this command and its children
    pub fn image_urls<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PaintCommand::Image { url, .. } => out.push(url),
            PaintCommand::Layer { commands, .. } => {
                for c in commands {
                    c.image_urls(out);
                }
            }
            _ => {}
        }
    }
}
