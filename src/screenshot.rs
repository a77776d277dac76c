//! Screenshot URL resolution.
//!
//! Turns whatever the user typed into the URL of a remote screenshot of
//! that site. Nothing here touches the network; the image is fetched by
//! whoever paints the frame (see [`crate::images`]).

use crate::MockgenConfig;

/// Generic image used when no target is set
pub const PLACEHOLDER_URL: &str = "https://picsum.photos/800/600";

/// Default host of the screenshot rendering service
pub const DEFAULT_HOST: &str = "image.thum.io";

/// Which capture profile the screenshot service should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotKind {
    Desktop,
    Mobile,
}

impl ScreenshotKind {
    /// Render width and crop height requested from the service
    pub fn capture_size(self) -> (u32, u32) {
        match self {
            ScreenshotKind::Desktop => (1200, 800),
            ScreenshotKind::Mobile => (600, 1000),
        }
    }
}

impl std::str::FromStr for ScreenshotKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" | "laptop" => Ok(ScreenshotKind::Desktop),
            "mobile" | "tablet" => Ok(ScreenshotKind::Mobile),
            other => Err(crate::Error::Other(format!("Unknown device kind: {}", other))),
        }
    }
}

/// Remove a leading `http://` or `https://`
pub fn strip_scheme(raw: &str) -> &str {
    raw.strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw)
}

/// Resolve against the default screenshot host.
///
/// ```
/// use mockgen::screenshot::{resolve, ScreenshotKind};
/// assert_eq!(
///     resolve("https://example.com", ScreenshotKind::Desktop),
///     "https://image.thum.io/get/width/1200/crop/800/noanimate/https://example.com"
/// );
/// ```
pub fn resolve(raw_url: &str, kind: ScreenshotKind) -> String {
    resolve_with_host(DEFAULT_HOST, PLACEHOLDER_URL, raw_url, kind)
}

/// Resolve using the host and placeholder from `config`
pub fn resolve_with_config(config: &MockgenConfig, raw_url: &str, kind: ScreenshotKind) -> String {
    resolve_with_host(&config.screenshot_host, &config.placeholder_url, raw_url, kind)
}

fn resolve_with_host(host: &str, placeholder: &str, raw_url: &str, kind: ScreenshotKind) -> String {
    let target = strip_scheme(raw_url);
    if target.is_empty() {
        return placeholder.to_string();
    }
    let (width, crop) = kind.capture_size();
    format!(
        "https://{}/get/width/{}/crop/{}/noanimate/https://{}",
        host, width, crop, target
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_url_uses_tall_crop() {
        assert_eq!(
            resolve("example.com", ScreenshotKind::Mobile),
            "https://image.thum.io/get/width/600/crop/1000/noanimate/https://example.com"
        );
    }

    #[test]
    fn scheme_is_stripped_once() {
        assert_eq!(strip_scheme("http://a.io/x"), "a.io/x");
        assert_eq!(strip_scheme("https://a.io"), "a.io");
        assert_eq!(strip_scheme("ftp://a.io"), "ftp://a.io");
    }

    #[test]
    fn empty_input_gives_placeholder_for_both_kinds() {
        assert_eq!(resolve("", ScreenshotKind::Desktop), PLACEHOLDER_URL);
        assert_eq!(resolve("", ScreenshotKind::Mobile), PLACEHOLDER_URL);
        assert_eq!(resolve("https://", ScreenshotKind::Mobile), PLACEHOLDER_URL);
    }

    #[test]
    fn configured_host_is_used() {
        let cfg = MockgenConfig {
            screenshot_host: "127.0.0.1:9000".into(),
            ..Default::default()
        };
        assert_eq!(
            resolve_with_config(&cfg, "my.site", ScreenshotKind::Desktop),
            "https://127.0.0.1:9000/get/width/1200/crop/800/noanimate/https://my.site"
        );
    }

    #[test]
    fn kind_parses_from_device_names() {
        assert_eq!("Laptop".parse::<ScreenshotKind>().unwrap(), ScreenshotKind::Desktop);
        assert_eq!("tablet".parse::<ScreenshotKind>().unwrap(), ScreenshotKind::Mobile);
        assert!("watch".parse::<ScreenshotKind>().is_err());
    }
}
