//! MockupGen
//!
//! Composes a stylized 1920x1080 "device mockup" of a website: a laptop,
//! a tablet and a phone showing live screenshots of the site, a large
//! display title and an optional brand logo. The composition can be
//! annotated with AI-generated marketing copy and exported as a PNG.
//!
//! # Features
//!
//! - **http** (default): fetches screenshots and talks to the Gemini API
//!   through a blocking `reqwest` client
//! - **Injected collaborators**: screenshots, content generation,
//!   rasterization and downloads are traits, so the compositor can be
//!   driven entirely by in-memory stubs
//!
//! # Example
//!
//! ```no_run
//! use mockgen::export::{DirectorySink, Exporter};
//! use mockgen::images::HttpImageSource;
//! use mockgen::rendering::raster::SceneRasterizer;
//! use mockgen::session::{Action, MockupSession};
//! use mockgen::MockgenConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MockgenConfig::from_env();
//! let mut session = MockupSession::new(config.clone());
//! session.apply(Action::SetUrl("example.com".into()))?;
//! session.apply(Action::SetTitleSize(220.0))?;
//!
//! let rasterizer = SceneRasterizer::new(HttpImageSource::new(&config)?);
//! let exporter = Exporter::new(rasterizer, DirectorySink::new("."));
//! let path = exporter.export_session(&mut session)?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod device;
pub mod dialogs;
pub mod enrich;
pub mod export;
pub mod images;
pub mod rendering;
pub mod scene;
pub mod screenshot;
pub mod session;
pub mod viewport;

// Gemini REST client backing the default content generator
#[cfg(feature = "http")]
pub mod gemini;

// Async facade: worker threads own the blocking collaborators
pub mod async_api;

pub use async_api::Studio;
pub use device::DeviceClass;
pub use enrich::{enrich, ContentGenerator, GeneratedContent};
pub use viewport::{ViewportGeometry, ViewportState};

/// Width of the canonical composition, in pixels
pub const CANVAS_WIDTH: u32 = 1920;
/// Height of the canonical composition, in pixels
pub const CANVAS_HEIGHT: u32 = 1080;

/// Configuration shared by the collaborators.
///
/// The defaults are usable as-is except for the Gemini API key, which is
/// only ever read from the environment (see [`MockgenConfig::from_env`]).
/// Without a key, content generation degrades to the static fallback.
///
/// # Examples
///
/// ```
/// let cfg = mockgen::MockgenConfig::default();
/// assert_eq!(cfg.screenshot_host, "image.thum.io");
/// assert!(cfg.gemini_api_key.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MockgenConfig {
    /// User agent sent when fetching screenshots
    pub user_agent: String,
    /// Timeout for outgoing HTTP requests in milliseconds
    pub timeout_ms: u64,
    /// Host of the screenshot rendering service
    pub screenshot_host: String,
    /// Image shown when no target URL is set
    pub placeholder_url: String,
    /// Credential for the generative-text service
    pub gemini_api_key: Option<String>,
    /// Model used for content generation
    pub gemini_model: String,
    /// Base URL of the generative-text REST API
    pub gemini_base_url: String,
    /// Background color used for exports (RGBA)
    pub export_background: [u8; 4],
}

impl Default for MockgenConfig {
    fn default() -> Self {
        Self {
            user_agent: "MockupGen/0.1 (+https://image.thum.io)".to_string(),
            timeout_ms: 30000,
            screenshot_host: "image.thum.io".to_string(),
            placeholder_url: screenshot::PLACEHOLDER_URL.to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            export_background: [0, 0, 0, 255],
        }
    }
}

impl MockgenConfig {
    /// Build a config from the process environment.
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `API_KEY`),
    /// `MOCKGEN_SCREENSHOT_HOST` and `MOCKGEN_TIMEOUT_MS`. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.gemini_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(host) = std::env::var("MOCKGEN_SCREENSHOT_HOST") {
            if !host.trim().is_empty() {
                cfg.screenshot_host = host.trim().to_string();
            }
        }
        if let Some(ms) = std::env::var("MOCKGEN_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            cfg.timeout_ms = ms;
        }
        cfg
    }
}

/// Closed interval and slider step of a layout parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

impl ParamRange {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The four slider-driven layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    TitleSize,
    DeviceScale,
    VerticalOffset,
    Spacing,
}

impl Param {
    pub const ALL: [Param; 4] = [
        Param::TitleSize,
        Param::DeviceScale,
        Param::VerticalOffset,
        Param::Spacing,
    ];

    pub fn range(self) -> ParamRange {
        match self {
            Param::TitleSize => ParamRange { min: 50.0, max: 300.0, step: 1.0, default: 180.0 },
            Param::DeviceScale => ParamRange { min: 0.5, max: 1.5, step: 0.05, default: 1.0 },
            Param::VerticalOffset => ParamRange { min: -400.0, max: 200.0, step: 10.0, default: -157.0 },
            Param::Spacing => ParamRange { min: -0.5, max: 2.0, step: 0.1, default: 0.5 },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::TitleSize => "title_size_px",
            Param::DeviceScale => "device_scale",
            Param::VerticalOffset => "vertical_offset_px",
            Param::Spacing => "spacing_factor",
        }
    }
}

/// Slider state for the composition.
///
/// Every field always lies inside its [`Param::range`]; construction,
/// deserialization and the setters all clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLayoutParameters")]
pub struct LayoutParameters {
    title_size_px: f32,
    device_scale: f32,
    vertical_offset_px: f32,
    spacing_factor: f32,
}

#[derive(Deserialize)]
struct RawLayoutParameters {
    #[serde(default = "default_title_size")]
    title_size_px: f32,
    #[serde(default = "default_device_scale")]
    device_scale: f32,
    #[serde(default = "default_vertical_offset")]
    vertical_offset_px: f32,
    #[serde(default = "default_spacing")]
    spacing_factor: f32,
}

fn default_title_size() -> f32 {
    Param::TitleSize.range().default
}
fn default_device_scale() -> f32 {
    Param::DeviceScale.range().default
}
fn default_vertical_offset() -> f32 {
    Param::VerticalOffset.range().default
}
fn default_spacing() -> f32 {
    Param::Spacing.range().default
}

impl From<RawLayoutParameters> for LayoutParameters {
    fn from(raw: RawLayoutParameters) -> Self {
        LayoutParameters::new(
            raw.title_size_px,
            raw.device_scale,
            raw.vertical_offset_px,
            raw.spacing_factor,
        )
    }
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            title_size_px: default_title_size(),
            device_scale: default_device_scale(),
            vertical_offset_px: default_vertical_offset(),
            spacing_factor: default_spacing(),
        }
    }
}

impl LayoutParameters {
    /// Build parameters, clamping each value into its range. Non-finite
    /// values fall back to the parameter default.
    pub fn new(title_size_px: f32, device_scale: f32, vertical_offset_px: f32, spacing_factor: f32) -> Self {
        let mut params = Self::default();
        for (param, value) in Param::ALL
            .into_iter()
            .zip([title_size_px, device_scale, vertical_offset_px, spacing_factor])
        {
            let _ = params.set(param, value);
        }
        params
    }

    pub fn title_size_px(&self) -> f32 {
        self.title_size_px
    }

    pub fn device_scale(&self) -> f32 {
        self.device_scale
    }

    pub fn vertical_offset_px(&self) -> f32 {
        self.vertical_offset_px
    }

    pub fn spacing_factor(&self) -> f32 {
        self.spacing_factor
    }

    pub fn get(&self, param: Param) -> f32 {
        match param {
            Param::TitleSize => self.title_size_px,
            Param::DeviceScale => self.device_scale,
            Param::VerticalOffset => self.vertical_offset_px,
            Param::Spacing => self.spacing_factor,
        }
    }

    /// Set a parameter, clamping into range. Returns the value actually
    /// stored. NaN and infinities are rejected and leave the old value.
    pub fn set(&mut self, param: Param, value: f32) -> Result<f32> {
        if !value.is_finite() {
            return Err(Error::InvalidParameter {
                name: param.name(),
                value: value as f64,
            });
        }
        let clamped = param.range().clamp(value);
        match param {
            Param::TitleSize => self.title_size_px = clamped,
            Param::DeviceScale => self.device_scale = clamped,
            Param::VerticalOffset => self.vertical_offset_px = clamped,
            Param::Spacing => self.spacing_factor = clamped,
        }
        Ok(clamped)
    }

    /// Gap between neighbouring devices, in canvas pixels
    pub fn device_gap_px(&self) -> f32 {
        self.spacing_factor * 100.0
    }
}

/// A brand logo kept as a `data:` URL, the way an uploaded file is held
/// by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    data_url: String,
}

impl LogoImage {
    /// Wrap raw file bytes. Only `image/*` MIME types are accepted.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Result<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(Error::UnsupportedMedia(mime));
        }
        Ok(Self {
            data_url: images::encode_data_url(&mime, bytes),
        })
    }

    /// Read a logo from disk, guessing the MIME type from the extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = image::ImageFormat::from_path(path)
            .map_err(|_| Error::UnsupportedMedia(path.display().to_string()))?;
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, format.to_mime_type())
    }

    /// Accept an existing `data:image/...;base64,` URL
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let (mime, _) = images::decode_data_url(data_url)?;
        if !mime.starts_with("image/") {
            return Err(Error::UnsupportedMedia(mime));
        }
        Ok(Self {
            data_url: data_url.to_string(),
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// What the mockup shows: the target site, the title and the logo.
///
/// `input_url` is the editable text field; `active_url` is the URL the
/// devices currently display and only changes when a generation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MockupConfig {
    pub input_url: String,
    pub active_url: String,
    pub title: String,
    pub logo: Option<LogoImage>,
}

impl Default for MockupConfig {
    fn default() -> Self {
        Self {
            input_url: String::new(),
            active_url: "google.com".to_string(),
            title: "LOCAL MAG".to_string(),
            logo: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MockgenConfig::default();
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.export_background, [0, 0, 0, 255]);
        assert_eq!(config.placeholder_url, "https://picsum.photos/800/600");
    }

    #[test]
    fn layout_defaults_match_initial_composition() {
        let p = LayoutParameters::default();
        assert_eq!(p.title_size_px(), 180.0);
        assert_eq!(p.device_scale(), 1.0);
        assert_eq!(p.vertical_offset_px(), -157.0);
        assert_eq!(p.spacing_factor(), 0.5);
        assert_eq!(p.device_gap_px(), 50.0);
    }

    #[test]
    fn layout_setters_clamp_into_range() {
        let mut p = LayoutParameters::default();
        assert_eq!(p.set(Param::TitleSize, 1000.0).unwrap(), 300.0);
        assert_eq!(p.title_size_px(), 300.0);
        assert_eq!(p.set(Param::DeviceScale, 0.1).unwrap(), 0.5);
        assert_eq!(p.set(Param::VerticalOffset, -900.0).unwrap(), -400.0);
        assert_eq!(p.set(Param::Spacing, 5.0).unwrap(), 2.0);
        for param in Param::ALL {
            assert!(param.range().contains(p.get(param)));
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut p = LayoutParameters::default();
        assert!(p.set(Param::DeviceScale, f32::NAN).is_err());
        assert!(p.set(Param::TitleSize, f32::INFINITY).is_err());
        assert_eq!(p, LayoutParameters::default());
    }

    #[test]
    fn deserialization_clamps() {
        let p: LayoutParameters =
            serde_json::from_str(r#"{"title_size_px": 1000, "spacing_factor": -3}"#).unwrap();
        assert_eq!(p.title_size_px(), 300.0);
        assert_eq!(p.spacing_factor(), -0.5);
        assert_eq!(p.device_scale(), 1.0);
    }

    #[test]
    fn logo_rejects_non_image_mime() {
        assert!(matches!(
            LogoImage::from_bytes(b"hello", "text/plain"),
            Err(Error::UnsupportedMedia(_))
        ));
        let logo = LogoImage::from_bytes(&[1, 2, 3], "image/png").unwrap();
        assert!(logo.data_url().starts_with("data:image/png;base64,"));
    }
}
