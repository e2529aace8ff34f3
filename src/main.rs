use anyhow::{Context, Result};
use cardsmith::{CardSession, LayoutConfig, SettingsStore, StudioConfig, TextKey};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cardsmith", version, about = "Composite card images from a layout document")]
struct Cli {
    /// Studio config (JSON); defaults apply for anything missing
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Render one card to a PNG in the output directory
    Render {
        /// Settings document to merge over the template
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Background image (defaults to the studio background)
        #[arg(long)]
        background: Option<PathBuf>,
        /// Sprite file name inside the sprite directory, or "None"
        #[arg(long)]
        sprite: Option<String>,
        /// Write the preview-scale raster instead of the full export
        #[arg(long)]
        preview: bool,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the default settings document
    Template,
    /// Render several settings documents in parallel
    #[cfg(feature = "service")]
    Batch {
        /// Settings documents, one card each
        #[arg(required = true)]
        settings: Vec<PathBuf>,
        #[arg(long)]
        background: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut studio = match &cli.config {
        Some(path) => StudioConfig::from_file(path).with_context(|| format!("reading config {}", path.display()))?,
        None => StudioConfig::default(),
    };

    match cli.command {
        Cmd::Render {
            settings,
            background,
            sprite,
            preview,
            out,
        } => {
            if let Some(out) = out {
                studio.output_dir = out;
            }
            cmd_render(studio, settings.as_deref(), background.as_deref(), sprite.as_deref(), preview)
        }
        Cmd::Template => {
            let doc = SettingsStore::to_string(&LayoutConfig::template())?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", doc)?;
            Ok(())
        }
        #[cfg(feature = "service")]
        Cmd::Batch {
            settings,
            background,
            out,
        } => {
            if let Some(out) = out {
                studio.output_dir = out;
            }
            cmd_batch(studio, &settings, background.as_deref())
        }
    }
}

fn cmd_render(
    studio: StudioConfig,
    settings: Option<&Path>,
    background: Option<&Path>,
    sprite: Option<&str>,
    preview: bool,
) -> Result<()> {
    let mut session = CardSession::new(studio);
    session.load_background(background).context("loading background")?;
    if let Some(path) = settings {
        session
            .load_settings(path)
            .with_context(|| format!("loading settings {}", path.display()))?;
    }
    if sprite.is_some() {
        session.select_sprite(sprite).context("selecting sprite")?;
    }

    let path = if preview {
        let rendered = session.preview()?;
        let studio = session.studio();
        let name = format!("{}_preview", session.config().text(TextKey::Name).text());
        cardsmith::export::write_export(&rendered.image, &studio.output_dir, &name, studio.export_dpi)?
    } else {
        session.export()?
    };
    println!("{}", path.display());
    Ok(())
}

#[cfg(feature = "service")]
fn cmd_batch(studio: StudioConfig, settings: &[PathBuf], background: Option<&Path>) -> Result<()> {
    use cardsmith::service::{render_batch, BatchJob};
    use std::sync::Arc;

    // One session per card: each may name its own sprite.
    let mut jobs = Vec::with_capacity(settings.len());
    let mut names = Vec::with_capacity(settings.len());
    for path in settings {
        let mut session = CardSession::new(studio.clone());
        session.load_background(background).context("loading background")?;
        session
            .load_settings(path)
            .with_context(|| format!("loading settings {}", path.display()))?;
        names.push(session.config().text(TextKey::Name).text().to_string());
        let (config, assets) = session.into_parts();
        jobs.push(BatchJob {
            config,
            assets: Arc::new(assets),
            scale: 1.0,
        });
    }

    let compositor = Arc::new(cardsmith::Compositor::with_canvas(
        Arc::new(studio.font_resolver()),
        studio.canvas,
    ));
    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    let results = runtime.block_on(render_batch(compositor, jobs));

    let mut failed = 0;
    for ((result, name), source) in results.into_iter().zip(&names).zip(settings) {
        match result.and_then(|r| {
            cardsmith::export::write_export(&r.image, &studio.output_dir, name, studio.export_dpi)
        }) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                log::error!("{}: {}", source.display(), e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} cards failed", failed, settings.len());
    }
    Ok(())
}
