//! Content enrichment: marketing copy for the mockup.
//!
//! Generation is best effort. Whatever goes wrong, callers of [`enrich`]
//! receive usable content; the failure is only logged.

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Number of tags a piece of content carries
pub const TAG_COUNT: usize = 3;

const FALLBACK_TAGS: [&str; TAG_COUNT] = ["UI/UX", "Responsive", "Design"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub headline: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeneratedContent {
    /// Content used whenever generation fails
    pub fn fallback() -> Self {
        Self {
            headline: "Stunning Web Experience".to_string(),
            description: "A showcase of responsive design across all devices.".to_string(),
            tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Trim every field and force exactly [`TAG_COUNT`] tags: extras are
    /// dropped, blanks removed, gaps filled from the fallback tags.
    pub fn normalized(mut self) -> Self {
        self.headline = self.headline.trim().to_string();
        self.description = self.description.trim().to_string();
        let mut tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .take(TAG_COUNT)
            .map(str::to_string)
            .collect();
        for fill in FALLBACK_TAGS.iter().skip(tags.len()) {
            tags.push(fill.to_string());
        }
        self.tags = tags;
        self
    }

    /// Headline as it is applied to the title: uppercased, `None` if blank
    pub fn title_suggestion(&self) -> Option<String> {
        let h = self.headline.trim();
        if h.is_empty() {
            None
        } else {
            Some(h.to_uppercase())
        }
    }
}

/// A remote service that writes copy for a site
pub trait ContentGenerator {
    fn generate(&self, url: &str) -> Result<GeneratedContent>;
}

impl<T: ContentGenerator + ?Sized> ContentGenerator for Box<T> {
    fn generate(&self, url: &str) -> Result<GeneratedContent> {
        (**self).generate(url)
    }
}

/// Always answers with the fallback content. Used when no API key is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticGenerator;

impl ContentGenerator for StaticGenerator {
    fn generate(&self, _url: &str) -> Result<GeneratedContent> {
        Ok(GeneratedContent::fallback())
    }
}

/// Prompt sent to the generator for `url`
pub fn build_prompt(url: &str) -> String {
    format!(
        "Analyze this domain name: \"{}\".\n\
         Create a short, catchy, modern marketing headline (max 6 words), a brief \
         description (max 20 words) suitable for a design portfolio, and 3 keyword tags.\n\
         If the URL is generic or empty, just generate generic \"Web Design\" related text.",
        url
    )
}

/// Ask `generator` for content about `url`, falling back to
/// [`GeneratedContent::fallback`] on any error.
pub fn enrich<G: ContentGenerator + ?Sized>(generator: &G, url: &str) -> GeneratedContent {
    match generator.generate(url) {
        Ok(content) => {
            debug!("Generated content for {}: {:?}", url, content.headline);
            content.normalized()
        }
        Err(e) => {
            error!("Content generation failed for {}: {}", url, e);
            GeneratedContent::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Failing;

    impl ContentGenerator for Failing {
        fn generate(&self, _url: &str) -> Result<GeneratedContent> {
            Err(Error::NetworkError("connection refused".into()))
        }
    }

    struct Fixed(GeneratedContent);

    impl ContentGenerator for Fixed {
        fn generate(&self, _url: &str) -> Result<GeneratedContent> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn failure_yields_fallback() {
        let content = enrich(&Failing, "example.com");
        assert_eq!(content.headline, "Stunning Web Experience");
        assert_eq!(content.description, "A showcase of responsive design across all devices.");
        assert_eq!(content.tags, vec!["UI/UX", "Responsive", "Design"]);
    }

    #[test]
    fn tags_are_normalized_to_three() {
        let content = enrich(
            &Fixed(GeneratedContent {
                headline: "  Fast Sites ".into(),
                description: "d".into(),
                tags: vec!["a".into(), " ".into()],
            }),
            "x",
        );
        assert_eq!(content.headline, "Fast Sites");
        assert_eq!(content.tags, vec!["a", "Responsive", "Design"]);

        let many = GeneratedContent {
            tags: (0..5).map(|i| i.to_string()).collect(),
            ..GeneratedContent::fallback()
        };
        assert_eq!(many.normalized().tags, vec!["0", "1", "2"]);
    }

    #[test]
    fn title_suggestion_uppercases() {
        let mut c = GeneratedContent::fallback();
        assert_eq!(c.title_suggestion().as_deref(), Some("STUNNING WEB EXPERIENCE"));
        c.headline = "   ".into();
        assert!(c.title_suggestion().is_none());
    }

    #[test]
    fn missing_tags_deserialize_and_pad() {
        let c: GeneratedContent = serde_json::from_str(r#"{"headline":"H","description":"D"}"#).unwrap();
        assert_eq!(c.normalized().tags.len(), TAG_COUNT);
    }

    #[test]
    fn prompt_mentions_the_domain() {
        let p = build_prompt("shop.example");
        assert!(p.contains("\"shop.example\""));
        assert!(p.contains("max 6 words"));
    }
}
