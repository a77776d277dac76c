//! Scene composition.
//!
//! Arranges the device cluster, the display title and the logo on the
//! fixed 1920x1080 canvas. Everything is expressed in canvas pixels, so
//! the layout parameters never depend on how large the preview happens
//! to be on screen. The compositor consumes resolved image URLs and
//! never touches the network.

use std::io::Cursor;

use log::warn;
use tiny_skia::Transform;

use crate::device::{render_frame, DeviceClass, DeviceFrame, FRAME_PAD};
use crate::rendering::layout::{about, contain_width_for_height, map_rect, wrap_title, Point, Radii, Rect};
use crate::rendering::paint::{Color, ImageFit, Paint, PaintCommand};
use crate::rendering::text;
use crate::screenshot::resolve_with_config;
use crate::{images, LayoutParameters, MockgenConfig, MockupConfig, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Distance of the title block from the bottom edge
pub const TITLE_BOTTOM_INSET: f32 = 48.0;
/// Horizontal padding on both sides of the title
pub const TITLE_SIDE_PADDING: f32 = 80.0;
/// Title line height relative to the font size
pub const TITLE_LINE_HEIGHT: f32 = 1.25;
/// Logo box: top-left corner and fixed height
pub const LOGO_ORIGIN: Point = Point::new(64.0, 48.0);
pub const LOGO_HEIGHT: f32 = 80.0;

/// A named group of paint commands on the canvas
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: &'static str,
    /// Node is display-only chrome and must not appear in exports
    pub export_excluded: bool,
    pub commands: Vec<PaintCommand>,
}

impl SceneNode {
    fn new(name: &'static str, commands: Vec<PaintCommand>) -> Self {
        Self { name, export_excluded: false, commands }
    }
}

/// The finished composition, in back-to-front order
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn image_urls(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for node in &self.nodes {
            for c in &node.commands {
                c.image_urls(&mut out);
            }
        }
        out
    }
}

/// The three frames the cluster is built from
#[derive(Debug, Clone)]
pub struct ClusterFrames {
    pub tablet: DeviceFrame,
    pub laptop: DeviceFrame,
    pub mobile: DeviceFrame,
}

impl ClusterFrames {
    /// Render the frames for `active_url`, resolving screenshots with
    /// the host from `config`.
    pub fn for_url(config: &MockgenConfig, active_url: &str) -> Self {
        let frame = |d: DeviceClass| render_frame(d, &resolve_with_config(config, active_url, d.screenshot_kind()));
        Self {
            tablet: frame(DeviceClass::Tablet),
            laptop: frame(DeviceClass::Laptop),
            mobile: frame(DeviceClass::Mobile),
        }
    }
}

/// Where one device of the cluster lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub device: DeviceClass,
    /// Maps the device's layout box to canvas pixels
    pub transform: Transform,
    /// Paint order: higher is in front
    pub depth: u8,
}

impl Placement {
    /// Bounds of the device's layout box on the canvas
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.device.layout_size();
        map_rect(&self.transform, &Rect::new(0.0, 0.0, w, h))
    }
}

struct Slot {
    device: DeviceClass,
    depth: u8,
    rotate_deg: f32,
    translate_y: f32,
    scale: f32,
    /// transform origin as a fraction of the box
    origin: (f32, f32),
}

// tablet behind on the left, laptop in the middle, phone in front on the right
const SLOTS: [Slot; 3] = [
    Slot {
        device: DeviceClass::Tablet,
        depth: 20,
        rotate_deg: -2.0,
        translate_y: 32.0,
        scale: 1.1,
        origin: (1.0, 1.0),
    },
    Slot {
        device: DeviceClass::Laptop,
        depth: 30,
        rotate_deg: 0.0,
        translate_y: 0.0,
        scale: 1.1,
        origin: (0.5, 0.5),
    },
    Slot {
        device: DeviceClass::Mobile,
        depth: 40,
        rotate_deg: 2.0,
        translate_y: 48.0,
        scale: 1.35,
        origin: (0.0, 1.0),
    },
];

/// Compute the canvas placement of tablet, laptop and phone.
///
/// The devices sit bottom-aligned in a row separated by the spacing gap
/// (negative gaps overlap them). The row is scaled by `device_scale`
/// about its own center, centered on the canvas and moved down by
/// `vertical_offset_px`. Returned in paint order.
pub fn cluster_placements(params: &LayoutParameters) -> [Placement; 3] {
    let gap = params.device_gap_px();
    let row_width: f32 = SLOTS.iter().map(|s| s.device.layout_size().0).sum::<f32>() + gap * 2.0;
    let row_height = SLOTS
        .iter()
        .map(|s| s.device.layout_size().1)
        .fold(0.0f32, f32::max);

    let scale = params.device_scale();
    let row_to_canvas = about(
        Point::new(row_width / 2.0, row_height / 2.0),
        Transform::from_scale(scale, scale),
    )
    .post_translate(
        (CANVAS_WIDTH as f32 - row_width) / 2.0,
        (CANVAS_HEIGHT as f32 - row_height) / 2.0 + params.vertical_offset_px(),
    );

    let mut x = 0.0;
    SLOTS.map(|slot| {
        let (w, h) = slot.device.layout_size();
        let own = Transform::from_scale(slot.scale, slot.scale)
            .post_concat(Transform::from_rotate(slot.rotate_deg))
            .post_translate(0.0, slot.translate_y);
        let item = about(Point::new(w * slot.origin.0, h * slot.origin.1), own)
            .post_translate(x, row_height - h);
        x += w + gap;
        Placement {
            device: slot.device,
            transform: item.post_concat(row_to_canvas),
            depth: slot.depth,
        }
    })
}

/// Build the full 1920x1080 scene.
///
/// `full_screen` adds the full-screen close control, which is flagged
/// export-excluded.
pub fn compose(
    params: &LayoutParameters,
    mockup: &MockupConfig,
    frames: &ClusterFrames,
    full_screen: bool,
) -> Scene {
    let mut nodes = vec![background()];

    let mut placements = cluster_placements(params);
    placements.sort_by_key(|p| p.depth);
    let cluster = placements
        .iter()
        .map(|p| {
            let frame = match p.device {
                DeviceClass::Tablet => &frames.tablet,
                DeviceClass::Mobile => &frames.mobile,
                _ => &frames.laptop,
            };
            let (width, height) = frame.layer_size();
            PaintCommand::Layer {
                transform: Transform::from_translate(-FRAME_PAD, -FRAME_PAD).post_concat(p.transform),
                width,
                height,
                commands: frame.commands.clone(),
            }
        })
        .collect();
    nodes.push(SceneNode::new("devices", cluster));

    // above the cluster whatever the sliders do
    if let Some(logo) = mockup.logo.as_ref().and_then(|l| logo_node(l.data_url())) {
        nodes.push(logo);
    }

    nodes.push(SceneNode::new(
        "title",
        title_commands(&mockup.title, params.title_size_px()),
    ));

    if full_screen {
        nodes.push(SceneNode {
            name: "fullscreen-close",
            export_excluded: true,
            commands: close_button(),
        });
    }

    Scene {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        nodes,
    }
}

/// Convenience: resolve screenshots and compose in one go
pub fn compose_for(
    config: &MockgenConfig,
    params: &LayoutParameters,
    mockup: &MockupConfig,
    full_screen: bool,
) -> Scene {
    let frames = ClusterFrames::for_url(config, &mockup.active_url);
    compose(params, mockup, &frames, full_screen)
}

fn background() -> SceneNode {
    let (w, h) = (CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32);
    SceneNode::new(
        "background",
        vec![
            PaintCommand::Fill {
                rect: Rect::new(0.0, 0.0, w, h),
                radii: Radii::default(),
                paint: Paint::linear(
                    Point::new(0.0, 0.0),
                    Point::new(w, h),
                    &[Color::hex(0x1a0b2e), Color::hex(0x2d0b45), Color::hex(0x0f0524)],
                ),
            },
            // warm glow from the top edge
            PaintCommand::Glow {
                center: Point::new(w / 2.0, 0.0),
                radius_x: w * 0.35,
                radius_y: h * 0.5,
                hardness: 0.0,
                color: Color::hex(0xeab308).with_opacity(0.2),
            },
            PaintCommand::Glow {
                center: Point::new(172.0, 172.0),
                radius_x: 420.0,
                radius_y: 420.0,
                hardness: 0.43,
                color: Color::hex(0x9333ea).with_opacity(0.2),
            },
            PaintCommand::Glow {
                center: Point::new(w - 400.0, h - 400.0),
                radius_x: 550.0,
                radius_y: 550.0,
                hardness: 0.45,
                color: Color::hex(0x2563eb).with_opacity(0.1),
            },
        ],
    )
}

fn logo_node(data_url: &str) -> Option<SceneNode> {
    let (_, bytes) = images::decode_data_url(data_url)
        .map_err(|e| warn!("Skipping logo: {}", e))
        .ok()?;
    let (w, h) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .map_err(|e| warn!("Skipping logo: {}", e))
        .ok()?;
    let width = contain_width_for_height(w as f32, h as f32, LOGO_HEIGHT);
    Some(SceneNode::new(
        "logo",
        vec![PaintCommand::Image {
            url: data_url.to_string(),
            rect: Rect::new(LOGO_ORIGIN.x, LOGO_ORIGIN.y, width, LOGO_HEIGHT),
            radii: Radii::default(),
            fit: ImageFit::Fill,
        }],
    ))
}

/// Lines of the title, bottom-anchored and centered between the side
/// paddings. A drop shadow is painted under each line.
pub fn title_commands(title: &str, size: f32) -> Vec<PaintCommand> {
    let max_width = CANVAS_WIDTH as f32 - 2.0 * TITLE_SIDE_PADDING;
    let lines = wrap_title(title, size, max_width);
    if lines.is_empty() {
        return Vec::new();
    }
    let line_height = size * TITLE_LINE_HEIGHT;
    let bottom = CANVAS_HEIGHT as f32 - TITLE_BOTTOM_INSET;
    let top = bottom - line_height * lines.len() as f32;
    let gradient = Paint::linear(
        Point::new(0.0, top),
        Point::new(0.0, bottom),
        &[Color::hex(0xfef08a), Color::hex(0xeab308), Color::hex(0xa16207)],
    );
    let shadow = Paint::Solid(Color::BLACK.with_opacity(0.5));
    let shadow_offset = (size / 30.0).max(2.0);

    let mut out = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        let x = TITLE_SIDE_PADDING + (max_width - text::measure(line, size)) / 2.0;
        let y = top + line_height * i as f32 + (line_height - size) / 2.0;
        out.push(PaintCommand::Text {
            text: line.clone(),
            origin: Point::new(x, y + shadow_offset),
            size,
            paint: shadow.clone(),
        });
        out.push(PaintCommand::Text {
            text: line.clone(),
            origin: Point::new(x, y),
            size,
            paint: gradient.clone(),
        });
    }
    out
}

fn close_button() -> Vec<PaintCommand> {
    let r = Rect::new(CANVAS_WIDTH as f32 - 24.0 - 40.0, 24.0, 40.0, 40.0);
    vec![
        PaintCommand::fill(r, Radii::all(20.0), Color::WHITE.with_opacity(0.1)),
        PaintCommand::Text {
            text: "X".into(),
            origin: Point::new(r.x + (r.width - text::measure("X", 16.0)) / 2.0, r.y + 10.0),
            size: 16.0,
            paint: Paint::Solid(Color::WHITE),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogoImage, Param};

    fn center_x(p: &Placement) -> f32 {
        p.bounds().center().x
    }

    #[test]
    fn cluster_order_is_tablet_laptop_mobile() {
        let [tablet, laptop, mobile] = cluster_placements(&LayoutParameters::default());
        assert_eq!(tablet.device, DeviceClass::Tablet);
        assert_eq!(mobile.device, DeviceClass::Mobile);
        assert!(center_x(&tablet) < center_x(&laptop));
        assert!(center_x(&laptop) < center_x(&mobile));
        assert!(tablet.depth < laptop.depth && laptop.depth < mobile.depth);
        // laptop stays near the horizontal middle of the canvas
        assert!((center_x(&laptop) - 960.0).abs() < 80.0);
    }

    #[test]
    fn vertical_offset_moves_whole_cluster() {
        let base = cluster_placements(&LayoutParameters::default());
        let mut params = LayoutParameters::default();
        params.set(Param::VerticalOffset, 143.0).unwrap();
        let moved = cluster_placements(&params);
        for (a, b) in base.iter().zip(moved.iter()) {
            let (ra, rb) = (a.bounds(), b.bounds());
            assert!((rb.y - ra.y - 300.0).abs() < 1e-2);
            assert!((rb.x - ra.x).abs() < 1e-2);
        }
    }

    #[test]
    fn spacing_widens_the_row() {
        let mut tight = LayoutParameters::default();
        tight.set(Param::Spacing, -0.5).unwrap();
        let mut wide = LayoutParameters::default();
        wide.set(Param::Spacing, 2.0).unwrap();
        let spread = |p: &LayoutParameters| {
            let [t, _, m] = cluster_placements(p);
            center_x(&m) - center_x(&t)
        };
        assert!((spread(&wide) - spread(&tight) - 500.0).abs() < 1e-2);
    }

    #[test]
    fn device_scale_shrinks_about_the_cluster_center() {
        let mut small = LayoutParameters::default();
        small.set(Param::DeviceScale, 0.5).unwrap();
        let big = cluster_placements(&LayoutParameters::default());
        let small = cluster_placements(&small);
        let wb = big[1].bounds().width;
        let ws = small[1].bounds().width;
        assert!((ws * 2.0 - wb).abs() < 1e-2);
    }

    #[test]
    fn title_is_bottom_anchored_and_centered() {
        let cmds = title_commands("LOCAL MAG", 180.0);
        assert_eq!(cmds.len(), 2);
        let PaintCommand::Text { origin, size, .. } = &cmds[1] else {
            panic!("expected text");
        };
        let line_bottom = origin.y + size + (size * TITLE_LINE_HEIGHT - size) / 2.0;
        assert!((line_bottom - (1080.0 - TITLE_BOTTOM_INSET)).abs() < 1e-3);
        let width = text::measure("LOCAL MAG", 180.0);
        assert!((origin.x + width / 2.0 - 960.0).abs() < 1e-3);
        assert!(title_commands("", 180.0).is_empty());
    }

    #[test]
    fn long_titles_wrap_inside_padding() {
        let cmds = title_commands("A VERY LONG MARKETING HEADLINE FOR YOU", 300.0);
        assert!(cmds.len() > 2);
        for c in &cmds {
            if let PaintCommand::Text { text, origin, size, .. } = c {
                assert!(origin.x >= TITLE_SIDE_PADDING - 1e-3 || text::measure(text, *size) > 1760.0);
            }
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(40, 20));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn logo_is_fixed_height_top_left() {
        let mockup = MockupConfig {
            logo: Some(LogoImage::from_bytes(&tiny_png(), "image/png").unwrap()),
            ..Default::default()
        };
        let cfg = MockgenConfig::default();
        let mut params = LayoutParameters::default();
        params.set(Param::DeviceScale, 1.5).unwrap();
        let scene = compose_for(&cfg, &params, &mockup, false);
        let logo = scene.node("logo").expect("logo node");
        let PaintCommand::Image { rect, .. } = &logo.commands[0] else {
            panic!("expected image");
        };
        assert_eq!(*rect, Rect::new(64.0, 48.0, 160.0, 80.0));
    }

    #[test]
    fn logo_paints_above_devices_and_below_title() {
        let mockup = MockupConfig {
            logo: Some(LogoImage::from_bytes(&tiny_png(), "image/png").unwrap()),
            ..Default::default()
        };
        let scene = compose_for(&MockgenConfig::default(), &LayoutParameters::default(), &mockup, false);
        let order: Vec<&str> = scene.nodes.iter().map(|n| n.name).collect();
        assert_eq!(order, vec!["background", "devices", "logo", "title"]);
    }

    #[test]
    fn fullscreen_chrome_is_export_excluded() {
        let cfg = MockgenConfig::default();
        let mockup = MockupConfig::default();
        let params = LayoutParameters::default();
        let windowed = compose_for(&cfg, &params, &mockup, false);
        assert!(windowed.node("fullscreen-close").is_none());
        let full = compose_for(&cfg, &params, &mockup, true);
        assert!(full.node("fullscreen-close").unwrap().export_excluded);
        assert!(full.nodes.iter().filter(|n| n.export_excluded).count() == 1);
    }

    #[test]
    fn scene_uses_desktop_and_mobile_screenshots() {
        let scene = compose_for(
            &MockgenConfig::default(),
            &LayoutParameters::default(),
            &MockupConfig::default(),
            false,
        );
        let urls = scene.image_urls();
        assert_eq!(urls.len(), 3);
        assert!(urls.contains(&"https://image.thum.io/get/width/1200/crop/800/noanimate/https://google.com"));
        assert!(urls.contains(&"https://image.thum.io/get/width/600/crop/1000/noanimate/https://google.com"));
    }
}
