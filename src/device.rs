//! Device frames: fixed bezel geometry and decorative chrome drawn around
//! a screenshot, one variant per device class.
//!
//! Frames are pure display lists. The screenshot is referenced by URL and
//! drawn cover-fit, anchored to the top edge, so the header of the page
//! always stays visible. A screenshot that fails to load is painted as a
//! broken-image placeholder by the rasterizer.

use crate::rendering::layout::{Point, Radii, Rect};
use crate::rendering::paint::{Color, ImageFit, Paint, PaintCommand};
use crate::screenshot::ScreenshotKind;

/// Room around the layout box for chrome that hangs outside it
/// (desktop stand, laptop reflection, side buttons).
pub const FRAME_PAD: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Desktop,
    Laptop,
    Tablet,
    Mobile,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 4] = [
        DeviceClass::Desktop,
        DeviceClass::Laptop,
        DeviceClass::Tablet,
        DeviceClass::Mobile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Laptop => "laptop",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Mobile => "mobile",
        }
    }

    pub fn screenshot_kind(self) -> ScreenshotKind {
        match self {
            DeviceClass::Desktop | DeviceClass::Laptop => ScreenshotKind::Desktop,
            DeviceClass::Tablet | DeviceClass::Mobile => ScreenshotKind::Mobile,
        }
    }

    /// Size of the box the device occupies in a row layout
    pub fn layout_size(self) -> (f32, f32) {
        match self {
            DeviceClass::Desktop => (500.0, 326.0),
            DeviceClass::Laptop => (740.0, 425.0),
            DeviceClass::Tablet => (280.0, 380.0),
            DeviceClass::Mobile => (180.0, 360.0),
        }
    }

    /// Window the screenshot is drawn into, in layout-box coordinates
    pub fn display_rect(self) -> Rect {
        match self {
            DeviceClass::Desktop => Rect::new(13.0, 13.0, 474.0, 300.0),
            DeviceClass::Laptop => Rect::new(59.0, 9.0, 622.0, 400.0),
            DeviceClass::Tablet => Rect::new(12.0, 12.0, 256.0, 356.0),
            DeviceClass::Mobile => Rect::new(8.0, 8.0, 164.0, 344.0),
        }
    }

    /// Width / height of the screenshot window
    pub fn display_aspect(self) -> f32 {
        let r = self.display_rect();
        r.width / r.height
    }
}

impl std::str::FromStr for DeviceClass {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        DeviceClass::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Other(format!("Unknown device class: {}", s)))
    }
}

/// A device drawn into an offscreen layer.
///
/// `commands` are in layer coordinates: the layout box starts at
/// (`FRAME_PAD`, `FRAME_PAD`).
#[derive(Debug, Clone)]
pub struct DeviceFrame {
    pub device: DeviceClass,
    pub width: f32,
    pub height: f32,
    pub commands: Vec<PaintCommand>,
}

impl DeviceFrame {
    pub fn layer_size(&self) -> (u32, u32) {
        (
            (self.width + 2.0 * FRAME_PAD).ceil() as u32,
            (self.height + 2.0 * FRAME_PAD).ceil() as u32,
        )
    }
}

const GRAY_300: Color = Color::hex(0xd1d5db);
const GRAY_400: Color = Color::hex(0x9ca3af);
const GRAY_600: Color = Color::hex(0x4b5563);
const GRAY_700: Color = Color::hex(0x374151);
const GRAY_800: Color = Color::hex(0x1f2937);
const GRAY_900: Color = Color::hex(0x111827);
const BODY: Color = Color::hex(0x1a1a1a);

fn at(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(x + FRAME_PAD, y + FRAME_PAD, w, h)
}

fn shifted(r: Rect) -> Rect {
    at(r.x, r.y, r.width, r.height)
}

fn screenshot(url: &str, rect: Rect, radii: Radii) -> PaintCommand {
    PaintCommand::Image {
        url: url.to_string(),
        rect,
        radii,
        fit: ImageFit::CoverTop,
    }
}

/// Soft white sheen from `from` towards `to` across `rect`
fn glare(rect: Rect, radii: Radii, from: Point, to: Point) -> PaintCommand {
    PaintCommand::Fill {
        rect,
        radii,
        paint: Paint::linear(
            from,
            to,
            &[Color::WHITE.with_opacity(0.1), Color::TRANSPARENT, Color::TRANSPARENT],
        ),
    }
}

/// Draw `device` around the screenshot at `screenshot_url`
pub fn render_frame(device: DeviceClass, screenshot_url: &str) -> DeviceFrame {
    let (width, height) = device.layout_size();
    let commands = match device {
        DeviceClass::Desktop => desktop(screenshot_url),
        DeviceClass::Laptop => laptop(screenshot_url),
        DeviceClass::Tablet => tablet(screenshot_url),
        DeviceClass::Mobile => mobile(screenshot_url),
    };
    DeviceFrame { device, width, height, commands }
}

fn desktop(url: &str) -> Vec<PaintCommand> {
    let stand = at(186.0, 326.0, 128.0, 64.0);
    let display = shifted(DeviceClass::Desktop.display_rect());
    vec![
        PaintCommand::Fill {
            rect: stand,
            radii: Radii::bottom(12.0),
            paint: Paint::linear(
                Point::new(stand.x, stand.y),
                Point::new(stand.x, stand.bottom()),
                &[GRAY_300, GRAY_400],
            ),
        },
        PaintCommand::fill(at(242.0, 288.0, 16.0, 48.0), Radii::default(), GRAY_800),
        PaintCommand::fill(at(0.0, 0.0, 500.0, 326.0), Radii::all(12.0), GRAY_800),
        PaintCommand::fill(at(1.0, 1.0, 498.0, 324.0), Radii::all(11.0), GRAY_900),
        PaintCommand::fill(at(247.0, 6.0, 6.0, 6.0), Radii::all(3.0), GRAY_700.with_opacity(0.5)),
        PaintCommand::fill(display, Radii::all(6.0), Color::WHITE),
        screenshot(url, display, Radii::all(6.0)),
    ]
}

fn laptop(url: &str) -> Vec<PaintCommand> {
    let display = shifted(DeviceClass::Laptop.display_rect());
    vec![
        // reflection under the deck
        PaintCommand::Glow {
            center: Point::new(370.0 + FRAME_PAD, 445.0 + FRAME_PAD),
            radius_x: 357.0,
            radius_y: 44.0,
            hardness: 0.3,
            color: Color::BLACK.with_opacity(0.4),
        },
        // lid
        PaintCommand::fill(at(50.0, 0.0, 640.0, 409.0), Radii::top(16.0), Color::hex(0x333333)),
        PaintCommand::fill(at(51.0, 1.0, 638.0, 408.0), Radii::top(15.0), BODY),
        PaintCommand::fill(display, Radii::top(8.0), Color::BLACK),
        screenshot(url, display, Radii::top(8.0)),
        glare(
            display,
            Radii::top(8.0),
            Point::new(display.x, display.y),
            Point::new(display.right(), display.bottom()),
        ),
        PaintCommand::fill(at(367.0, 4.0, 6.0, 6.0), Radii::all(3.0), GRAY_600),
        // keyboard deck
        PaintCommand::fill(at(0.0, 409.0, 740.0, 16.0), Radii::bottom(12.0), GRAY_300),
        PaintCommand::fill(at(0.0, 409.0, 740.0, 1.0), Radii::default(), GRAY_400),
        PaintCommand::fill(at(322.0, 414.0, 96.0, 6.0), Radii::all(3.0), GRAY_400.with_opacity(0.5)),
    ]
}

fn tablet(url: &str) -> Vec<PaintCommand> {
    let display = shifted(DeviceClass::Tablet.display_rect());
    vec![
        PaintCommand::fill(at(0.0, 0.0, 280.0, 380.0), Radii::all(24.0), GRAY_700),
        PaintCommand::fill(at(1.0, 1.0, 278.0, 378.0), Radii::all(23.0), BODY),
        PaintCommand::fill(at(11.0, 11.0, 258.0, 358.0), Radii::all(16.0), Color::BLACK),
        PaintCommand::fill(display, Radii::all(15.0), Color::WHITE),
        screenshot(url, display, Radii::all(15.0)),
        glare(
            display,
            Radii::all(15.0),
            Point::new(display.x, display.bottom()),
            Point::new(display.right(), display.y),
        ),
        // side button
        PaintCommand::fill(at(280.0, 59.0, 2.0, 32.0), Radii::right(2.0), GRAY_600),
    ]
}

fn mobile(url: &str) -> Vec<PaintCommand> {
    let display = shifted(DeviceClass::Mobile.display_rect());
    vec![
        PaintCommand::fill(at(0.0, 0.0, 180.0, 360.0), Radii::all(32.0), Color::hex(0x222222)),
        PaintCommand::fill(at(1.0, 1.0, 178.0, 358.0), Radii::all(31.0), BODY),
        PaintCommand::fill(at(7.0, 7.0, 166.0, 346.0), Radii::all(24.0), Color::BLACK),
        PaintCommand::fill(display, Radii::all(23.0), Color::WHITE),
        screenshot(url, display, Radii::all(23.0)),
        // dynamic island
        PaintCommand::fill(at(58.0, 20.0, 64.0, 20.0), Radii::all(10.0), Color::BLACK),
        glare(
            display,
            Radii::all(23.0),
            Point::new(display.right(), display.y),
            Point::new(display.x, display.bottom()),
        ),
        // power button
        PaintCommand::fill(at(186.0, 96.0, 2.0, 32.0), Radii::right(2.0), GRAY_700),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_names_parse() {
        assert_eq!("Laptop".parse::<DeviceClass>().unwrap(), DeviceClass::Laptop);
        assert!("watch".parse::<DeviceClass>().is_err());
    }

    #[test]
    fn every_frame_references_its_screenshot_once() {
        for device in DeviceClass::ALL {
            let frame = render_frame(device, "https://shot/x");
            let mut urls = Vec::new();
            for c in &frame.commands {
                c.image_urls(&mut urls);
            }
            assert_eq!(urls, vec!["https://shot/x"], "{:?}", device);
        }
    }

    #[test]
    fn display_fits_inside_layout_box() {
        for device in DeviceClass::ALL {
            let (w, h) = device.layout_size();
            let d = device.display_rect();
            assert!(d.x > 0.0 && d.y > 0.0, "{:?}", device);
            assert!(d.right() < w && d.bottom() <= h, "{:?}", device);
        }
    }

    #[test]
    fn laptop_display_sits_inside_its_bezel() {
        let d = DeviceClass::Laptop.display_rect();
        assert_eq!((d.width, d.height), (622.0, 400.0));
        // 640 wide lid starting at x=50 with a 9px bezel, no bottom bezel
        assert_eq!((d.x, d.y), (59.0, 9.0));
        assert_eq!(d.right(), 50.0 + 640.0 - 9.0);
        assert_eq!(d.bottom(), 409.0);
    }

    #[test]
    fn phones_are_portrait_and_laptops_landscape() {
        assert!(DeviceClass::Mobile.display_aspect() < 1.0);
        assert!(DeviceClass::Tablet.display_aspect() < 1.0);
        assert!(DeviceClass::Laptop.display_aspect() > 1.0);
        assert!(DeviceClass::Desktop.display_aspect() > 1.0);
        assert_eq!(DeviceClass::Tablet.screenshot_kind(), ScreenshotKind::Mobile);
    }

    #[test]
    fn layer_has_room_for_overhanging_chrome() {
        let frame = render_frame(DeviceClass::Desktop, "u");
        let (w, h) = frame.layer_size();
        assert_eq!(w, 644);
        assert_eq!(h, 470);
    }
}
