//! Export: capture the composition at native resolution and hand the PNG
//! to a download sink.

use std::path::{Path, PathBuf};

use log::{error, info};

use crate::rendering::paint::Color;
use crate::rendering::Screenshot;
use crate::scene::{Scene, SceneNode};
use crate::session::MockupSession;
use crate::{Error, Result, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Shown to the user when an export fails
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to generate image. Please try again.";

/// Parameters of a capture
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    /// Painted under the scene
    pub background: Color,
    /// Nodes for which this returns true are left out of the capture
    pub exclude: fn(&SceneNode) -> bool,
}

fn export_excluded(node: &SceneNode) -> bool {
    node.export_excluded
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: Color::BLACK,
            exclude: export_excluded,
        }
    }
}

/// Turns a scene into an encoded image
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene, opts: &CaptureOptions) -> Result<Screenshot>;
}

impl<T: Rasterizer + ?Sized> Rasterizer for Box<T> {
    fn rasterize(&self, scene: &Scene, opts: &CaptureOptions) -> Result<Screenshot> {
        (**self).rasterize(scene, opts)
    }
}

/// Receives a finished file, the way a browser receives a download
pub trait DownloadSink {
    /// Store `bytes` under `filename` and return where it went
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

impl<T: DownloadSink + ?Sized> DownloadSink for Box<T> {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        (**self).deliver(filename, bytes)
    }
}

/// Writes downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// `mockup-<url>.png` with every `.` of the URL replaced by `-`.
///
/// Only dots are rewritten; anything else in the URL is kept.
pub fn download_filename(active_url: &str) -> String {
    format!("mockup-{}.png", active_url.replace('.', "-"))
}

/// Captures scenes with `R` and delivers them through `D`
pub struct Exporter<R, D> {
    rasterizer: R,
    sink: D,
    options: CaptureOptions,
}

impl<R: Rasterizer, D: DownloadSink> Exporter<R, D> {
    pub fn new(rasterizer: R, sink: D) -> Self {
        Self {
            rasterizer,
            sink,
            options: CaptureOptions::default(),
        }
    }

    /// Background painted under every capture
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.options.background = Color::rgba(rgba[0], rgba[1], rgba[2], rgba[3]);
        self
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Capture `scene` at its native size. The on-screen scale never
    /// reaches this point: scenes are always in canvas coordinates.
    pub fn capture(&self, scene: &Scene) -> Result<Screenshot> {
        let opts = CaptureOptions {
            width: scene.width,
            height: scene.height,
            ..self.options
        };
        self.rasterizer
            .rasterize(scene, &opts)
            .map_err(|e| Error::ExportError(e.to_string()))
    }

    /// Capture and deliver as `mockup-<active_url>.png`
    pub fn export(&self, scene: &Scene, active_url: &str) -> Result<PathBuf> {
        let shot = self.capture(scene)?;
        let filename = download_filename(active_url);
        let path = self
            .sink
            .deliver(&filename, &shot.png_data)
            .map_err(|e| Error::ExportError(e.to_string()))?;
        info!("Exported {}x{} mockup to {}", shot.width, shot.height, path.display());
        Ok(path)
    }

    /// Export the session's current composition.
    ///
    /// Marks the session as downloading for the duration; on failure the
    /// session gets an alert and keeps every other piece of state.
    pub fn export_session(&self, session: &mut MockupSession) -> Result<PathBuf> {
        if !session.begin_download() {
            return Err(Error::ExportError("An export is already in progress".into()));
        }
        let scene = session.scene();
        let result = self.export(&scene, &session.mockup().active_url);
        if let Err(e) = &result {
            error!("Export failed: {}", e);
        }
        session.finish_download(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        result
    }
}
