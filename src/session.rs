//! The editor's state container.
//!
//! One [`MockupSession`] owns everything the view shows. Edits go through
//! [`MockupSession::apply`]; the two long-running operations (generate
//! and download) are split into begin/finish halves guarded by busy
//! flags, so a second request while one is in flight is inert.

use log::{debug, info};

use crate::dialogs::Dialog;
use crate::enrich::{enrich, ContentGenerator, GeneratedContent};
use crate::export::EXPORT_FAILED_MESSAGE;
use crate::scene::{compose_for, Scene};
use crate::viewport::{ViewportEvent, ViewportGeometry, ViewportState, ViewportTracker};
use crate::{LayoutParameters, LogoImage, MockgenConfig, MockupConfig, Param, Result};

/// A user edit
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUrl(String),
    SetTitle(String),
    SetLogo(Option<LogoImage>),
    SetTitleSize(f32),
    SetDeviceScale(f32),
    SetVerticalOffset(f32),
    SetSpacing(f32),
    SetFullScreen(bool),
    ToggleFullScreen,
    Resize(ViewportEvent),
    OpenDialog(Dialog),
    CloseDialog,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Blocking alert
    Alert(String),
}

/// Immutable view of the session, handed to renderers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub mockup: MockupConfig,
    pub params: LayoutParameters,
    pub content: Option<GeneratedContent>,
    pub viewport: ViewportState,
    pub is_generating: bool,
    pub is_downloading: bool,
    pub dialog: Option<Dialog>,
}

pub struct MockupSession {
    config: MockgenConfig,
    mockup: MockupConfig,
    params: LayoutParameters,
    content: Option<GeneratedContent>,
    viewport: ViewportTracker,
    is_generating: bool,
    is_downloading: bool,
    dialog: Option<Dialog>,
    notification: Option<Notification>,
}

impl MockupSession {
    pub fn new(config: MockgenConfig) -> Self {
        Self::with_state(config, MockupConfig::default(), LayoutParameters::default())
    }

    pub fn with_state(config: MockgenConfig, mockup: MockupConfig, params: LayoutParameters) -> Self {
        Self {
            config,
            mockup,
            params,
            content: None,
            viewport: ViewportTracker::new(ViewportGeometry::default(), false),
            is_generating: false,
            is_downloading: false,
            dialog: None,
            notification: None,
        }
    }

    pub fn config(&self) -> &MockgenConfig {
        &self.config
    }

    pub fn mockup(&self) -> &MockupConfig {
        &self.mockup
    }

    pub fn params(&self) -> &LayoutParameters {
        &self.params
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        self.content.as_ref()
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn is_downloading(&self) -> bool {
        self.is_downloading
    }

    /// Generate button enabled
    pub fn can_generate(&self) -> bool {
        !self.is_generating && !self.mockup.input_url.trim().is_empty()
    }

    /// Download button enabled
    pub fn can_download(&self) -> bool {
        !self.is_downloading
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        debug!("Applying {:?}", action);
        match action {
            Action::SetUrl(url) => self.mockup.input_url = url,
            Action::SetTitle(title) => self.mockup.title = title,
            Action::SetLogo(logo) => self.mockup.logo = logo,
            Action::SetTitleSize(v) => {
                self.params.set(Param::TitleSize, v)?;
            }
            Action::SetDeviceScale(v) => {
                self.params.set(Param::DeviceScale, v)?;
            }
            Action::SetVerticalOffset(v) => {
                self.params.set(Param::VerticalOffset, v)?;
            }
            Action::SetSpacing(v) => {
                self.params.set(Param::Spacing, v)?;
            }
            Action::SetFullScreen(on) => self.viewport.set_full_screen(on),
            Action::ToggleFullScreen => {
                let on = !self.viewport.state().is_full_screen;
                self.viewport.set_full_screen(on);
            }
            Action::Resize(event) => self.viewport.handle(&event),
            Action::OpenDialog(d) => self.dialog = Some(d),
            Action::CloseDialog => self.dialog = None,
        }
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mockup: self.mockup.clone(),
            params: self.params,
            content: self.content.clone(),
            viewport: self.viewport.state(),
            is_generating: self.is_generating,
            is_downloading: self.is_downloading,
            dialog: self.dialog,
        }
    }

    /// The composition as currently configured
    pub fn scene(&self) -> Scene {
        compose_for(
            &self.config,
            &self.params,
            &self.mockup,
            self.viewport.state().is_full_screen,
        )
    }

    /// Start a generation. Returns the URL to generate for, or `None`
    /// when the URL field is empty or a generation is already running.
    /// The devices switch to the new URL immediately.
    pub fn begin_generate(&mut self) -> Option<String> {
        if !self.can_generate() {
            debug!("Generate ignored (busy: {})", self.is_generating);
            return None;
        }
        self.is_generating = true;
        self.mockup.active_url = self.mockup.input_url.clone();
        Some(self.mockup.active_url.clone())
    }

    /// Store the generated content and suggest its headline as the title
    pub fn finish_generate(&mut self, content: GeneratedContent) {
        if let Some(title) = content.title_suggestion() {
            self.mockup.title = title;
        }
        self.content = Some(content);
        self.is_generating = false;
    }

    /// Run a whole generation against `generator`. Returns false when
    /// nothing was started.
    pub fn generate_with<G: ContentGenerator + ?Sized>(&mut self, generator: &G) -> bool {
        let Some(url) = self.begin_generate() else {
            return false;
        };
        let content = enrich(generator, &url);
        info!("Generated \"{}\" for {}", content.headline, url);
        self.finish_generate(content);
        true
    }

    /// The generation run once when the view first mounts. With the
    /// default empty URL field it does nothing.
    pub fn on_mount<G: ContentGenerator + ?Sized>(&mut self, generator: &G) -> bool {
        self.generate_with(generator)
    }

    pub fn begin_download(&mut self) -> bool {
        if self.is_downloading {
            return false;
        }
        self.is_downloading = true;
        true
    }

    /// Clear the busy flag; a failure raises the export alert
    pub fn finish_download(&mut self, result: std::result::Result<(), String>) {
        self.is_downloading = false;
        if result.is_err() {
            self.notification = Some(Notification::Alert(EXPORT_FAILED_MESSAGE.to_string()));
        }
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }
}
