//! Scene rasterizer.
//!
//! Paints a [`Scene`] back to front onto a `tiny_skia` pixmap: rounded
//! rectangles, soft glows, cover-fit images, title text and transformed
//! offscreen layers. `image` handles decoding, downscaling and the PNG
//! output.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::debug;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LinearGradient, Mask, Path, PathBuilder, Pattern, Pixmap,
    PixmapPaint, RadialGradient, Shader, SpreadMode, Transform,
};

use crate::export::{CaptureOptions, Rasterizer};
use crate::images::{FrameImages, ImageSource};
use crate::rendering::layout::{cover_top_crop, Point, Radii, Rect};
use crate::rendering::paint::{Color, ImageFit, Paint, PaintCommand};
use crate::rendering::text;
use crate::rendering::Screenshot;
use crate::scene::Scene;
use crate::viewport::ViewportState;
use crate::{Error, Result};

const BROKEN_FILL: Color = Color::hex(0xe5e7eb);
const BROKEN_ICON: Color = Color::hex(0x9ca3af);
const GLOW_STOPS: usize = 8;

/// Rasterizes scenes, loading images through `S`
pub struct SceneRasterizer<S: ImageSource> {
    source: S,
}

impl<S: ImageSource> SceneRasterizer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Paint the nodes accepted by `opts` at `opts.width`x`opts.height`
    pub fn render(&self, scene: &Scene, opts: &CaptureOptions) -> RgbaImage {
        let Some(mut canvas) = Pixmap::new(opts.width, opts.height) else {
            return RgbaImage::new(opts.width, opts.height);
        };
        canvas.fill(opts.background.to_skia());
        let images = FrameImages::new(&self.source);
        let painter = Painter { images: &images };
        for node in scene.nodes.iter().filter(|n| !(opts.exclude)(n)) {
            debug!("Painting node {}", node.name);
            for cmd in &node.commands {
                painter.paint(&mut canvas, cmd);
            }
        }
        to_rgba(&canvas)
    }

    /// On-screen preview: the full composition shrunk to the footprint
    /// of `state`. Includes display-only chrome.
    pub fn render_preview(&self, scene: &Scene, state: &ViewportState) -> RgbaImage {
        let opts = CaptureOptions {
            exclude: |_| false,
            ..CaptureOptions::default()
        };
        let full = self.render(scene, &opts);
        let (w, h) = state.footprint();
        let (w, h) = ((w.round() as u32).max(1), (h.round() as u32).max(1));
        if (w, h) == full.dimensions() {
            return full;
        }
        image::imageops::resize(&full, w, h, FilterType::Triangle)
    }
}

impl<S: ImageSource> Rasterizer for SceneRasterizer<S> {
    fn rasterize(&self, scene: &Scene, opts: &CaptureOptions) -> Result<Screenshot> {
        if opts.width == 0 || opts.height == 0 {
            return Err(Error::RenderError(format!(
                "Cannot capture a {}x{} image",
                opts.width, opts.height
            )));
        }
        let canvas = self.render(scene, opts);
        encode_png(&canvas)
    }
}

pub fn encode_png(img: &RgbaImage) -> Result<Screenshot> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
    Ok(Screenshot {
        width: img.width(),
        height: img.height(),
        png_data: out.into_inner(),
    })
}

fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        *dst = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
    }
    Some(pixmap)
}

fn to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, px) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

fn sk_point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x, p.y)
}

/// Rounded rectangle path; radii are clamped to half the shorter side
fn rounded_rect(rect: &Rect, radii: &Radii) -> Option<Path> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    // cubic handle length for a quarter circle
    const K: f32 = 0.552_284_8;
    let limit = rect.width.min(rect.height) / 2.0;
    let clamp = |r: f32| r.clamp(0.0, limit);
    let (tl, tr, br, bl) = (clamp(radii.tl), clamp(radii.tr), clamp(radii.br), clamp(radii.bl));
    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(x0 + tl, y0);
    pb.line_to(x1 - tr, y0);
    if tr > 0.0 {
        pb.cubic_to(x1 - tr + tr * K, y0, x1, y0 + tr - tr * K, x1, y0 + tr);
    }
    pb.line_to(x1, y1 - br);
    if br > 0.0 {
        pb.cubic_to(x1, y1 - br + br * K, x1 - br + br * K, y1, x1 - br, y1);
    }
    pb.line_to(x0 + bl, y1);
    if bl > 0.0 {
        pb.cubic_to(x0 + bl - bl * K, y1, x0, y1 - bl + bl * K, x0, y1 - bl);
    }
    pb.line_to(x0, y0 + tl);
    if tl > 0.0 {
        pb.cubic_to(x0, y0 + tl - tl * K, x0 + tl - tl * K, y0, x0 + tl, y0);
    }
    pb.close();
    pb.finish()
}

fn shader(paint: &Paint) -> Option<Shader<'static>> {
    match paint {
        Paint::Solid(c) => Some(Shader::SolidColor(c.to_skia())),
        Paint::Linear { start, end, stops } => LinearGradient::new(
            sk_point(*start),
            sk_point(*end),
            stops
                .iter()
                .map(|s| tiny_skia::GradientStop::new(s.offset, s.color.to_skia()))
                .collect(),
            SpreadMode::Pad,
            Transform::identity(),
        ),
    }
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    if e1 <= e0 {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

struct Painter<'a, 'b, S: ImageSource + ?Sized> {
    images: &'a FrameImages<'b, S>,
}

impl<S: ImageSource + ?Sized> Painter<'_, '_, S> {
    fn paint(&self, target: &mut Pixmap, cmd: &PaintCommand) {
        match cmd {
            PaintCommand::Fill { rect, radii, paint } => fill_shape(target, rect, radii, paint),
            PaintCommand::Glow { center, radius_x, radius_y, hardness, color } => {
                glow(target, *center, *radius_x, *radius_y, *hardness, *color)
            }
            PaintCommand::Image { url, rect, radii, fit } => self.image(target, url, rect, radii, *fit),
            PaintCommand::Text { text, origin, size, paint } => text_line(target, text, *origin, *size, paint),
            PaintCommand::Layer { transform, width, height, commands } => {
                let Some(mut layer) = Pixmap::new(*width, *height) else {
                    return;
                };
                for c in commands {
                    self.paint(&mut layer, c);
                }
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                target.draw_pixmap(0, 0, layer.as_ref(), &paint, *transform, None);
            }
        }
    }

    fn image(&self, target: &mut Pixmap, url: &str, rect: &Rect, radii: &Radii, fit: ImageFit) {
        let Some(img) = self.images.get(url) else {
            broken_image(target, rect, radii);
            return;
        };
        let Some(path) = rounded_rect(rect, radii) else {
            return;
        };
        let Some(pattern) = fitted_pixmap(img, rect, fit) else {
            return;
        };
        let scale = Transform::from_scale(
            rect.width / pattern.width() as f32,
            rect.height / pattern.height() as f32,
        );
        let paint = tiny_skia::Paint {
            shader: Pattern::new(
                pattern.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                1.0,
                scale.post_translate(rect.x, rect.y),
            ),
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// The part of `img` shown in `rect`, at no more than the box's pixel
/// size. Upscaling is left to the pattern sampler, so the buffer never
/// exceeds the source.
fn fitted_pixmap(img: DynamicImage, rect: &Rect, fit: ImageFit) -> Option<Pixmap> {
    let src = match fit {
        ImageFit::Fill => img,
        ImageFit::CoverTop => {
            let crop = cover_top_crop(img.width() as f32, img.height() as f32, rect.width, rect.height);
            img.crop_imm(
                crop.x.round() as u32,
                crop.y.round() as u32,
                (crop.width.round() as u32).max(1),
                (crop.height.round() as u32).max(1),
            )
        }
    };
    let w = src.width().min(rect.width.ceil().max(1.0) as u32);
    let h = src.height().min(rect.height.ceil().max(1.0) as u32);
    let src = if (w, h) == (src.width(), src.height()) {
        src
    } else {
        src.resize_exact(w, h, FilterType::Triangle)
    };
    to_pixmap(&src.to_rgba8())
}

fn broken_image(target: &mut Pixmap, rect: &Rect, radii: &Radii) {
    fill_shape(target, rect, radii, &Paint::Solid(BROKEN_FILL));
    let c = rect.center();
    let icon = Rect::new(c.x - 12.0, c.y - 9.0, 24.0, 18.0);
    fill_shape(target, &icon, &Radii::all(2.0), &Paint::Solid(BROKEN_ICON));
    fill_shape(target, &icon.inset(2.0), &Radii::all(1.0), &Paint::Solid(BROKEN_FILL));
}

fn fill_shape(target: &mut Pixmap, rect: &Rect, radii: &Radii, paint: &Paint) {
    let (Some(path), Some(shader)) = (rounded_rect(rect, radii), shader(paint)) else {
        return;
    };
    let paint = tiny_skia::Paint {
        shader,
        anti_alias: true,
        ..tiny_skia::Paint::default()
    };
    target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn glow(target: &mut Pixmap, center: Point, rx: f32, ry: f32, hardness: f32, color: Color) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let hardness = hardness.clamp(0.0, 0.99);
    let stops = (0..=GLOW_STOPS)
        .map(|i| {
            let t = hardness + (1.0 - hardness) * i as f32 / GLOW_STOPS as f32;
            let mut c = color.to_skia();
            c.apply_opacity(1.0 - smoothstep(hardness, 1.0, t));
            tiny_skia::GradientStop::new(t, c)
        })
        .collect();
    // unit circle stretched to the ellipse
    let unit = Transform::from_scale(rx, ry).post_translate(center.x, center.y);
    let origin = tiny_skia::Point::from_xy(0.0, 0.0);
    let Some(shader) = RadialGradient::new(origin, origin, 1.0, stops, SpreadMode::Pad, unit) else {
        return;
    };
    let Some(bounds) = tiny_skia::Rect::from_xywh(center.x - rx, center.y - ry, 2.0 * rx, 2.0 * ry) else {
        return;
    };
    let paint = tiny_skia::Paint {
        shader,
        anti_alias: true,
        ..tiny_skia::Paint::default()
    };
    target.fill_rect(bounds, &paint, Transform::identity(), None);
}

/// Glyph coverage goes into a mask, so gradients run across the whole
/// line rather than per glyph.
fn text_line(target: &mut Pixmap, line: &str, origin: Point, size: f32, paint: &Paint) {
    let Some(shader) = shader(paint) else {
        return;
    };
    let (w, h) = (target.width() as i32, target.height() as i32);
    let Some(mut mask) = Mask::new(target.width(), target.height()) else {
        return;
    };
    let (mut x0, mut y0, mut x1, mut y1) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
    let data = mask.data_mut();
    text::rasterize_line(line, origin, size, |x, y, coverage| {
        if x < 0 || y < 0 || x >= w || y >= h {
            return;
        }
        let i = y as usize * w as usize + x as usize;
        data[i] = data[i].max(coverage);
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    });
    if x0 > x1 {
        return;
    }
    let Some(bounds) = tiny_skia::Rect::from_ltrb(x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32) else {
        return;
    };
    let paint = tiny_skia::Paint {
        shader,
        ..tiny_skia::Paint::default()
    };
    target.fill_rect(bounds, &paint, Transform::identity(), Some(&mask));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::MemoryImageSource;
    use crate::scene::SceneNode;

    fn single(commands: Vec<PaintCommand>) -> Scene {
        Scene {
            width: 64,
            height: 64,
            nodes: vec![SceneNode { name: "n", export_excluded: false, commands }],
        }
    }

    fn small_opts() -> CaptureOptions {
        CaptureOptions { width: 64, height: 64, ..Default::default() }
    }

    fn near(actual: &Rgba<u8>, expected: [u8; 4]) -> bool {
        actual.0.iter().zip(expected).all(|(a, e)| (*a as i32 - e as i32).abs() <= 2)
    }

    #[test]
    fn fill_paints_inside_and_leaves_outside() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::fill(
            Rect::new(8.0, 8.0, 16.0, 16.0),
            Radii::default(),
            Color::rgb(255, 0, 0),
        )]);
        let img = r.render(&scene, &small_opts());
        assert_eq!(img.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(40, 40).0, [0, 0, 0, 255]);
    }

    #[test]
    fn rounded_corners_stay_clear() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::fill(
            Rect::new(0.0, 0.0, 64.0, 64.0),
            Radii::all(24.0),
            Color::WHITE,
        )]);
        let img = r.render(&scene, &small_opts());
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(32, 2).0, [255, 255, 255, 255]);
        assert!(rounded_rect(&Rect::new(0.0, 0.0, 0.0, 10.0), &Radii::all(2.0)).is_none());
    }

    #[test]
    fn missing_image_draws_broken_placeholder() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::Image {
            url: "https://nowhere/img.png".into(),
            rect: Rect::new(0.0, 0.0, 64.0, 64.0),
            radii: Radii::default(),
            fit: ImageFit::CoverTop,
        }]);
        let img = r.render(&scene, &small_opts());
        assert_eq!(img.get_pixel(2, 2).0, BROKEN_FILL.to_array());
        assert_eq!(img.get_pixel(21, 32).0, BROKEN_ICON.to_array());
    }

    #[test]
    fn cover_top_keeps_the_top_of_tall_images() {
        // top half green, bottom half blue
        let mut src = RgbaImage::from_pixel(32, 128, Rgba([0, 0, 255, 255]));
        for y in 0..64 {
            for x in 0..32 {
                src.put_pixel(x, y, Rgba([0, 255, 0, 255]));
            }
        }
        let source = MemoryImageSource::new().with("shot", DynamicImage::ImageRgba8(src));
        let r = SceneRasterizer::new(source);
        let scene = single(vec![PaintCommand::Image {
            url: "shot".into(),
            rect: Rect::new(0.0, 0.0, 64.0, 64.0),
            radii: Radii::default(),
            fit: ImageFit::CoverTop,
        }]);
        let img = r.render(&scene, &small_opts());
        // a 64x64 cover crop of a 32x128 image is its top 32x32 square
        assert!(near(img.get_pixel(32, 60), [0, 255, 0, 255]));
        assert!(near(img.get_pixel(4, 4), [0, 255, 0, 255]));
    }

    #[test]
    fn large_sources_are_downscaled_to_the_box() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1200, 800, Rgba([9, 9, 9, 255])));
        let pixmap = fitted_pixmap(img, &Rect::new(0.0, 0.0, 300.0, 100.0), ImageFit::CoverTop).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (300, 100));
    }

    #[test]
    fn oversized_boxes_keep_the_source_resolution() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4000, 1, Rgba([255, 0, 255, 255])));
        let rect = Rect::new(0.0, 0.0, 320_000.0, 80.0);
        let pixmap = fitted_pixmap(img, &rect, ImageFit::Fill).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (4000, 1));
    }

    #[test]
    fn excluded_nodes_are_skipped() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let mut scene = single(vec![PaintCommand::fill(
            Rect::new(0.0, 0.0, 64.0, 64.0),
            Radii::default(),
            Color::WHITE,
        )]);
        scene.nodes[0].export_excluded = true;
        let img = r.render(&scene, &small_opts());
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
    }

    #[test]
    fn layer_is_composited_through_its_transform() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::Layer {
            transform: Transform::from_scale(2.0, 2.0).post_translate(20.0, 20.0),
            width: 8,
            height: 8,
            commands: vec![PaintCommand::fill(Rect::new(0.0, 0.0, 8.0, 8.0), Radii::default(), Color::WHITE)],
        }]);
        let img = r.render(&scene, &small_opts());
        assert!(near(img.get_pixel(28, 28), [255, 255, 255, 255]));
        assert_eq!(img.get_pixel(10, 10).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn glow_fades_from_center_to_rim() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::Glow {
            center: Point::new(32.0, 32.0),
            radius_x: 30.0,
            radius_y: 30.0,
            hardness: 0.0,
            color: Color::WHITE,
        }]);
        let img = r.render(&scene, &small_opts());
        let center = img.get_pixel(32, 32)[0];
        let mid = img.get_pixel(47, 32)[0];
        assert!(center > 240);
        assert!(mid > 20 && mid < center);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn text_lights_pixels_inside_its_line() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let scene = single(vec![PaintCommand::Text {
            text: "HE".into(),
            origin: Point::new(4.0, 8.0),
            size: 24.0,
            paint: Paint::Solid(Color::WHITE),
        }]);
        let img = r.render(&scene, &small_opts());
        let lit = img.pixels().filter(|p| p[0] > 128).count();
        assert!(lit > 20);
        for y in 0..4 {
            for x in 0..64 {
                assert_eq!(img.get_pixel(x, y).0, [0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn zero_sized_capture_is_an_error() {
        let r = SceneRasterizer::new(MemoryImageSource::new());
        let opts = CaptureOptions { width: 0, ..Default::default() };
        assert!(r.rasterize(&single(vec![]), &opts).is_err());
    }

    #[test]
    fn pixmap_round_trip_keeps_straight_alpha() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        let back = to_rgba(&to_pixmap(&img).unwrap());
        assert_eq!(back.get_pixel(1, 1).0, [200, 100, 50, 255]);
    }
}
