//! Image loading for the painter.
//!
//! A failed load is not an error: the frame shows a broken-image
//! placeholder instead, so every source reports failure as `None`.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine as _;
use image::DynamicImage;
use log::{debug, warn};

use crate::{Error, Result};

/// Something that can turn an image URL into pixels
pub trait ImageSource: Send + Sync {
    /// Fetch and decode `url`. `None` means the image is broken.
    fn load(&self, url: &str) -> Option<DynamicImage>;
}

impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    fn load(&self, url: &str) -> Option<DynamicImage> {
        (**self).load(url)
    }
}

impl<T: ImageSource + ?Sized> ImageSource for std::sync::Arc<T> {
    fn load(&self, url: &str) -> Option<DynamicImage> {
        (**self).load(url)
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Split a base64 `data:` URL into its MIME type and payload bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::DecodeError("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DecodeError("data URL has no payload".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::DecodeError("only base64 data URLs are supported".into()))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::DecodeError(format!("bad base64 payload: {}", e)))?;
    Ok((mime.to_ascii_lowercase(), bytes))
}

fn load_data_url(url: &str) -> Option<DynamicImage> {
    let (_, bytes) = decode_data_url(url)
        .map_err(|e| warn!("Ignoring data URL: {}", e))
        .ok()?;
    image::load_from_memory(&bytes)
        .map_err(|e| warn!("Failed to decode inline image: {}", e))
        .ok()
}

/// Serves `data:` URLs and a fixed set of in-memory images.
///
/// Used by tests and anywhere screenshots are prepared ahead of time.
#[derive(Default)]
pub struct MemoryImageSource {
    images: HashMap<String, DynamicImage>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, img: DynamicImage) {
        self.images.insert(url.into(), img);
    }

    pub fn with(mut self, url: impl Into<String>, img: DynamicImage) -> Self {
        self.insert(url, img);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, url: &str) -> Option<DynamicImage> {
        if url.starts_with("data:") {
            return load_data_url(url);
        }
        self.images.get(url).cloned()
    }
}

/// Remembers every result of an inner source for the duration of one
/// capture, so each distinct URL is fetched at most once per frame.
pub struct FrameImages<'a, S: ImageSource + ?Sized> {
    inner: &'a S,
    seen: Mutex<HashMap<String, Option<DynamicImage>>>,
}

impl<'a, S: ImageSource + ?Sized> FrameImages<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self {
            inner,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, url: &str) -> Option<DynamicImage> {
        let mut seen = match self.seen.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(hit) = seen.get(url) {
            return hit.clone();
        }
        let loaded = self.inner.load(url);
        if loaded.is_none() {
            debug!("Image unavailable, drawing broken state: {}", url);
        }
        seen.insert(url.to_string(), loaded.clone());
        loaded
    }
}

#[cfg(feature = "http")]
pub use http::HttpImageSource;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::MockgenConfig;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Fetches images over HTTP(S); decodes `data:` URLs locally
    pub struct HttpImageSource {
        client: Client,
        user_agent: String,
    }

    impl HttpImageSource {
        pub fn new(config: &MockgenConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
            Ok(Self {
                client,
                user_agent: config.user_agent.clone(),
            })
        }

        fn fetch(&self, url: &str) -> Result<DynamicImage> {
            let resp = self
                .client
                .get(url)
                .header("User-Agent", self.user_agent.clone())
                .send()?;
            let status = resp.status();
            if !status.is_success() {
                return Err(Error::NetworkError(format!("HTTP {} for {}", status, url)));
            }
            let bytes = resp.bytes()?;
            Ok(image::load_from_memory(&bytes)?)
        }
    }

    impl ImageSource for HttpImageSource {
        fn load(&self, url: &str) -> Option<DynamicImage> {
            if url.starts_with("data:") {
                return load_data_url(url);
            }
            debug!("Fetching image {}", url);
            self.fetch(url)
                .map_err(|e| warn!("Failed to load image {}: {}", url, e))
                .ok()
        }
    }
}
