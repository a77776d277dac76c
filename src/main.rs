use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

use mockgen::dialogs::Dialog;
use mockgen::enrich::{enrich, ContentGenerator};
use mockgen::export::{DirectorySink, Exporter};
use mockgen::images::ImageSource;
use mockgen::rendering::raster::{encode_png, SceneRasterizer};
use mockgen::screenshot::{resolve_with_config, ScreenshotKind};
use mockgen::session::{Action, MockupSession};
use mockgen::viewport::ViewportEvent;
use mockgen::{LayoutParameters, LogoImage, MockgenConfig, MockupConfig};

#[derive(Parser)]
#[command(name = "mockgen", version, about = "Compose 1920x1080 device mockups of a website")]
struct Cli {
    /// Screenshot service host
    #[arg(long, global = true, env = "MOCKGEN_SCREENSHOT_HOST")]
    screenshot_host: Option<String>,
    /// HTTP timeout in milliseconds
    #[arg(long, global = true, env = "MOCKGEN_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a mockup and write mockup-<url>.png
    Render {
        #[command(flatten)]
        compose: ComposeArgs,
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write a preview scaled the way the editor would show it
    Preview {
        #[command(flatten)]
        compose: ComposeArgs,
        /// Browser window size, e.g. 1440x900
        #[arg(long, default_value = "1920x1080", value_parser = parse_size)]
        window: (f64, f64),
        /// Width of the canvas container in windowed mode
        #[arg(long, value_parser = parse_length)]
        container: Option<f64>,
        #[arg(long)]
        fullscreen: bool,
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
    },
    /// Print the screenshot URL used for a site
    ScreenshotUrl {
        url: String,
        /// desktop, laptop, tablet or mobile
        #[arg(long, default_value = "desktop")]
        device: ScreenshotKind,
    },
    /// Print generated marketing copy as JSON
    Enrich { url: String },
    Faq,
    DeployGuide,
}

#[derive(Args)]
struct ComposeArgs {
    /// Website to show on the devices
    #[arg(long, default_value = "google.com")]
    url: String,
    /// Display title (defaults to the generated headline or LOCAL MAG)
    #[arg(long)]
    title: Option<String>,
    /// Logo image file
    #[arg(long)]
    logo: Option<PathBuf>,
    /// JSON file with layout parameters
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long)]
    title_size: Option<f32>,
    #[arg(long)]
    device_scale: Option<f32>,
    #[arg(long)]
    vertical_offset: Option<f32>,
    #[arg(long)]
    spacing: Option<f32>,
    /// Ask the content generator for a headline
    #[arg(long)]
    enrich: bool,
}

fn parse_length(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("expected a positive size, got {}", s)),
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {}", s))?;
    Ok((parse_length(w)?, parse_length(h)?))
}

#[cfg(feature = "http")]
fn generator(config: &MockgenConfig) -> anyhow::Result<Box<dyn ContentGenerator>> {
    Ok(Box::new(mockgen::gemini::GeminiGenerator::new(config)?))
}

#[cfg(not(feature = "http"))]
fn generator(_config: &MockgenConfig) -> anyhow::Result<Box<dyn ContentGenerator>> {
    Ok(Box::new(mockgen::enrich::StaticGenerator))
}

#[cfg(feature = "http")]
fn image_source(config: &MockgenConfig) -> anyhow::Result<Box<dyn ImageSource>> {
    Ok(Box::new(mockgen::images::HttpImageSource::new(config)?))
}

#[cfg(not(feature = "http"))]
fn image_source(_config: &MockgenConfig) -> anyhow::Result<Box<dyn ImageSource>> {
    Ok(Box::new(mockgen::images::MemoryImageSource::new()))
}

fn build_session(config: &MockgenConfig, args: &ComposeArgs) -> anyhow::Result<MockupSession> {
    let params = match &args.params {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<LayoutParameters>(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => LayoutParameters::default(),
    };
    let mockup = MockupConfig {
        input_url: args.url.clone(),
        active_url: args.url.clone(),
        ..MockupConfig::default()
    };
    let mut session = MockupSession::with_state(config.clone(), mockup, params);

    if args.enrich {
        let generator = generator(config)?;
        session.generate_with(generator.as_ref());
    }
    if let Some(title) = &args.title {
        session.apply(Action::SetTitle(title.clone()))?;
    }
    if let Some(path) = &args.logo {
        let logo = LogoImage::from_path(path).with_context(|| format!("loading logo {}", path.display()))?;
        session.apply(Action::SetLogo(Some(logo)))?;
    }
    let sliders = [
        args.title_size.map(Action::SetTitleSize),
        args.device_scale.map(Action::SetDeviceScale),
        args.vertical_offset.map(Action::SetVerticalOffset),
        args.spacing.map(Action::SetSpacing),
    ];
    for action in sliders.into_iter().flatten() {
        session.apply(action)?;
    }
    Ok(session)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = MockgenConfig::from_env();
    if let Some(host) = cli.screenshot_host {
        config.screenshot_host = host;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout_ms = ms;
    }

    match cli.command {
        Commands::Render { compose, out_dir } => {
            let mut session = build_session(&config, &compose)?;
            let rasterizer = SceneRasterizer::new(image_source(&config)?);
            let exporter = Exporter::new(rasterizer, DirectorySink::new(out_dir))
                .with_background(config.export_background);
            match exporter.export_session(&mut session) {
                Ok(path) => println!("{}", path.display()),
                Err(e) => {
                    if let Some(note) = session.take_notification() {
                        eprintln!("{:?}", note);
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Preview { compose, window, container, fullscreen, out } => {
            let mut session = build_session(&config, &compose)?;
            let (w, h) = window;
            session.apply(Action::Resize(ViewportEvent::WindowResized { width: w, height: h }))?;
            session.apply(Action::Resize(ViewportEvent::ContainerResized {
                width: container.unwrap_or(w),
            }))?;
            session.apply(Action::SetFullScreen(fullscreen))?;
            let state = session.viewport();
            let rasterizer = SceneRasterizer::new(image_source(&config)?);
            let img = rasterizer.render_preview(&session.scene(), &state);
            let shot = encode_png(&img)?;
            std::fs::write(&out, &shot.png_data).with_context(|| format!("writing {}", out.display()))?;
            info!("Preview {}x{} -> {}", shot.width, shot.height, out.display());
            println!("scale {:.4}", state.scale_factor);
        }
        Commands::ScreenshotUrl { url, device } => {
            println!("{}", resolve_with_config(&config, &url, device));
        }
        Commands::Enrich { url } => {
            let generator = generator(&config)?;
            let content = enrich(generator.as_ref(), &url);
            println!("{}", serde_json::to_string_pretty(&content)?);
        }
        Commands::Faq => print!("{}", Dialog::Faq.render_text()),
        Commands::DeployGuide => print!("{}", Dialog::DeployGuide.render_text()),
    }
    Ok(())
}
