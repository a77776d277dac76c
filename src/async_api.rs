use crate::enrich::{enrich, ContentGenerator, GeneratedContent};
use crate::export::{DownloadSink, Exporter, Rasterizer};
use crate::scene::Scene;
use crate::session::{Action, MockupSession, Notification, SessionSnapshot};
use crate::{Error, MockgenConfig, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use tokio::sync::oneshot;

enum GenerateCommand {
    Generate(String, oneshot::Sender<GeneratedContent>),
    Close(oneshot::Sender<()>),
}

enum ExportCommand {
    Export(Box<Scene>, String, oneshot::Sender<Result<PathBuf>>),
    Close(oneshot::Sender<()>),
}

/// An async-friendly mockup editor backed by two worker threads.
///
/// One worker owns the content generator, the other the rasterizer and
/// download sink, so a slow generation never holds up an export. The
/// session state stays with the `Studio`; it is never locked across an
/// await.
///
/// `generate` and `download` are single-flight: while one is running a
/// second call of the same kind returns immediately without queuing
/// anything.
pub struct Studio {
    session: Mutex<MockupSession>,
    generate_tx: Sender<GenerateCommand>,
    export_tx: Sender<ExportCommand>,
}

impl Studio {
    /// Spawn the workers with the given collaborators
    pub fn new<G, R, D>(config: MockgenConfig, generator: G, rasterizer: R, sink: D) -> Self
    where
        G: ContentGenerator + Send + 'static,
        R: Rasterizer + Send + 'static,
        D: DownloadSink + Send + 'static,
    {
        let background = config.export_background;
        let (generate_tx, generate_rx) = mpsc::channel::<GenerateCommand>();
        let (export_tx, export_rx) = mpsc::channel::<ExportCommand>();

        thread::spawn(move || {
            while let Ok(cmd) = generate_rx.recv() {
                match cmd {
                    GenerateCommand::Generate(url, resp) => {
                        let _ = resp.send(enrich(&generator, &url));
                    }
                    GenerateCommand::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
            debug!("Generate worker stopped");
        });

        thread::spawn(move || {
            let exporter = Exporter::new(rasterizer, sink).with_background(background);
            while let Ok(cmd) = export_rx.recv() {
                match cmd {
                    ExportCommand::Export(scene, active_url, resp) => {
                        let _ = resp.send(exporter.export(&scene, &active_url));
                    }
                    ExportCommand::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
            debug!("Export worker stopped");
        });

        Self {
            session: Mutex::new(MockupSession::new(config)),
            generate_tx,
            export_tx,
        }
    }

    /// Studio wired to the live services: Gemini for copy, HTTP for
    /// screenshots, files written into `out_dir`.
    #[cfg(feature = "http")]
    pub fn from_config(config: MockgenConfig, out_dir: impl Into<PathBuf>) -> Result<Self> {
        use crate::export::DirectorySink;
        use crate::gemini::GeminiGenerator;
        use crate::images::HttpImageSource;
        use crate::rendering::raster::SceneRasterizer;

        let generator = GeminiGenerator::new(&config)?;
        let rasterizer = SceneRasterizer::new(HttpImageSource::new(&config)?);
        Ok(Self::new(config, generator, rasterizer, DirectorySink::new(out_dir)))
    }

    fn session(&self) -> MutexGuard<'_, MockupSession> {
        match self.session.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn apply(&self, action: Action) -> Result<()> {
        self.session().apply(action)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session().snapshot()
    }

    pub fn take_notification(&self) -> Option<Notification> {
        self.session().take_notification()
    }

    /// Run the mount-time generation (a no-op while the URL field is empty)
    pub async fn mount(&self) -> Result<bool> {
        self.generate().await
    }

    /// Generate copy for the URL field. `Ok(false)` when nothing was
    /// started (empty URL or a generation already running).
    pub async fn generate(&self) -> Result<bool> {
        let Some(url) = self.session().begin_generate() else {
            return Ok(false);
        };

        let (tx, rx) = oneshot::channel();
        let content = match self.generate_tx.send(GenerateCommand::Generate(url, tx)) {
            Ok(()) => rx.await.ok(),
            Err(_) => None,
        };
        match content {
            Some(content) => {
                self.session().finish_generate(content);
                Ok(true)
            }
            None => {
                warn!("Generate worker is gone; using fallback content");
                self.session().finish_generate(GeneratedContent::fallback());
                Err(Error::Other("Generate worker stopped".into()))
            }
        }
    }

    /// Export the current composition. `Ok(None)` when an export is
    /// already running.
    pub async fn download(&self) -> Result<Option<PathBuf>> {
        let (scene, active_url) = {
            let mut session = self.session();
            if !session.begin_download() {
                return Ok(None);
            }
            (session.scene(), session.mockup().active_url.clone())
        };

        let (tx, rx) = oneshot::channel();
        let result = match self.export_tx.send(ExportCommand::Export(Box::new(scene), active_url, tx)) {
            Ok(()) => rx
                .await
                .unwrap_or_else(|e| Err(Error::ExportError(format!("Export canceled: {}", e)))),
            Err(_) => Err(Error::ExportError("Export worker stopped".into())),
        };

        if let Err(e) = &result {
            log::error!("Export failed: {}", e);
        }
        self.session()
            .finish_download(result.as_ref().map(|_| ()).map_err(|e| e.to_string()));
        result.map(Some)
    }

    /// Shut down both worker threads, waiting for in-flight work
    pub async fn close(self) -> Result<()> {
        let (gen_done, gen_rx) = oneshot::channel();
        let (export_done, export_rx) = oneshot::channel();
        let _ = self.generate_tx.send(GenerateCommand::Close(gen_done));
        let _ = self.export_tx.send(ExportCommand::Close(export_done));
        let (a, b) = tokio::join!(gen_rx, export_rx);
        a.and(b)
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}
