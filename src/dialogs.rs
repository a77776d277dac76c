//! Informational dialogs. Static content only; opening or closing one
//! has no effect on the composition.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Faq,
    DeployGuide,
}

impl Dialog {
    pub fn title(self) -> &'static str {
        match self {
            Dialog::Faq => "Frequently Asked Questions",
            Dialog::DeployGuide => "Deploy to Cloudflare Pages",
        }
    }

    /// Plain-text rendering for terminals
    pub fn render_text(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.title());
        match self {
            Dialog::Faq => {
                for (q, a) in FAQ {
                    let _ = writeln!(out, "Q: {}\nA: {}\n", q, a);
                }
            }
            Dialog::DeployGuide => {
                let _ = writeln!(out, "Note: {}\n", DEPLOY_NOTE);
                for step in DEPLOY_STEPS {
                    let _ = writeln!(out, "{}", step.heading);
                    for line in step.lines {
                        let _ = writeln!(out, "  {}", line);
                    }
                    if !step.commands.is_empty() {
                        let _ = writeln!(out);
                        for cmd in step.commands {
                            let _ = writeln!(out, "    {}", cmd);
                        }
                    }
                    let _ = writeln!(out);
                }
                for (name, value) in BUILD_SETTINGS {
                    let _ = writeln!(out, "  {:<18}{}", name, value);
                }
                let _ = writeln!(out, "\n{}", DEPLOY_DONE);
            }
        }
        out
    }
}

pub const FAQ: [(&str, &str); 4] = [
    (
        "How does it work?",
        "Enter any website URL, and our tool fetches real-time screenshots to generate a high-quality mockup scene automatically.",
    ),
    (
        "Why are the screenshots sometimes generic?",
        "If the screenshot service cannot access the site (due to firewalls or loading speed), we show a placeholder. Try refreshing or using a different public URL.",
    ),
    (
        "Can I use these images for YouTube?",
        "Yes! The generated images are 1920x1080 (HD), perfect for YouTube thumbnails, portfolios, or social media posts.",
    ),
    (
        "Is it free?",
        "Yes, this tool is completely free to use. You can generate unlimited mockups.",
    ),
];

pub struct DeployStep {
    pub heading: &'static str,
    pub lines: &'static [&'static str],
    pub commands: &'static [&'static str],
}

const DEPLOY_NOTE: &str = "A .gitignore excludes system folders like node_modules, which cause errors during deployment.";

pub const DEPLOY_STEPS: [DeployStep; 3] = [
    DeployStep {
        heading: "Step 1: Push to GitHub",
        lines: &[
            "Create a new repository on GitHub.",
            "Run the following commands in your project terminal:",
        ],
        commands: &[
            "git init",
            "git add .",
            "git commit -m \"Initial commit\"",
            "git branch -M main",
            "git remote add origin https://github.com/YOUR_USERNAME/YOUR_REPO.git",
            "git push -u origin main",
        ],
    },
    DeployStep {
        heading: "Step 2: Cloudflare Pages",
        lines: &[
            "1. Log in to your Cloudflare Dashboard.",
            "2. Go to Workers & Pages > Create Application > Pages.",
            "3. Click Connect to Git and select your GitHub repository.",
        ],
        commands: &[],
    },
    DeployStep {
        heading: "Step 3: Build Settings",
        lines: &["Use these exact settings during the setup configuration:"],
        commands: &[],
    },
];

pub const BUILD_SETTINGS: [(&str, &str); 3] = [
    ("Framework Preset", "Vite"),
    ("Build Command", "npm run build"),
    ("Output Directory", "dist"),
];

const DEPLOY_DONE: &str = "Click Save and Deploy. Cloudflare will build your site in about 1 minute and give you a live URL (e.g. project.pages.dev).";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_lists_every_question() {
        let text = Dialog::Faq.render_text();
        for (q, _) in FAQ {
            assert!(text.contains(q));
        }
        assert!(text.starts_with("Frequently Asked Questions"));
    }

    #[test]
    fn deploy_guide_has_build_settings() {
        let text = Dialog::DeployGuide.render_text();
        assert!(text.contains("git push -u origin main"));
        assert!(text.contains("npm run build"));
        assert!(text.contains("dist"));
    }
}
