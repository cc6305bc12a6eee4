use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framereel::{
    AnimationParams, Container, FrameRate, FrameSynthesizer, Pacing, ReelConfig, StreamEncoder,
    Surface,
};

#[derive(Parser, Debug)]
#[command(name = "framereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single synthesized frame as a PNG.
    Frame(FrameArgs),
    /// Synthesize all frames and encode them into a clip.
    Render(RenderArgs),
    /// Run the HTTP service.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct AnimationArgs {
    /// Overlay text (omit for no text).
    #[arg(long)]
    text: Option<String>,

    /// Clip length in seconds; clamped to 1..=10.
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    duration: i64,

    /// Frames per second (15, 24, 30 or 60).
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl AnimationArgs {
    fn params(&self) -> anyhow::Result<AnimationParams> {
        let fps = FrameRate::new(self.fps)?;
        Ok(AnimationParams::new(self.text.clone(), self.duration, fps))
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    anim: AnimationArgs,

    /// Print which font the overlay text resolves to (origin + SHA-256 of font bytes).
    #[arg(long)]
    dump_font: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output clip path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    anim: AnimationArgs,

    /// Output container; defaults to the config value.
    #[arg(long, value_enum)]
    container: Option<ContainerChoice>,

    /// Hold each frame for 1/fps while encoding instead of replaying as fast as possible.
    #[arg(long)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address; defaults to the config value (0.0.0.0:3000).
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContainerChoice {
    Webm,
    Mp4,
    Gif,
}

impl From<ContainerChoice> for Container {
    fn from(c: ContainerChoice) -> Self {
        match c {
            ContainerChoice::Webm => Container::WebM,
            ContainerChoice::Mp4 => Container::Mp4,
            ContainerChoice::Gif => Container::Gif,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framereel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args).await,
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReelConfig> {
    let cfg = ReelConfig::load(path).with_context(|| match path {
        Some(p) => format!("load config '{}'", p.display()),
        None => "load default config".to_string(),
    })?;
    Ok(cfg)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.anim.config.as_deref())?;
    let params = args.anim.params()?;

    if args.dump_font {
        dump_font_diagnostics(cfg.font_path.as_deref())?;
    }

    let mut surface = Surface::new(cfg.canvas, cfg.surface_opts())?;
    let synth = FrameSynthesizer::new(cfg.jpeg_quality)?;
    synth
        .synthesize_one(&mut surface, &params, args.index)
        .with_context(|| format!("render frame {}", args.index))?;
    let png = framereel::encode::still::encode_png(&surface.snapshot())?;

    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.anim.config.as_deref())?;
    if let Some(c) = args.container {
        cfg.container = c.into();
    }
    let params = args.anim.params()?;
    let pacing = if args.realtime {
        Pacing::Realtime
    } else {
        Pacing::Immediate
    };

    let mut surface = Surface::new(cfg.canvas, cfg.surface_opts())?;
    let synth = FrameSynthesizer::new(cfg.jpeg_quality)?;
    let seq = tokio::task::block_in_place(|| synth.synthesize(Some(&mut surface), &params))
        .context("synthesize frames")?;

    let session = framereel::open_session(cfg.container, &cfg.session_opts())?;
    let video = StreamEncoder::new(pacing)
        .encode(surface, Arc::new(seq), session)
        .await?
        .video
        .context("encode video")?;

    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &video.bytes[..])
        .with_context(|| format!("write video '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} bytes)",
        args.out.display(),
        video.frame_count,
        video.len()
    );
    Ok(())
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }
    framereel::server::serve(&cfg).await
}

fn dump_font_diagnostics(font_path: Option<&Path>) -> anyhow::Result<()> {
    let font = framereel::resolve_overlay_font(font_path).context("resolve overlay font")?;
    eprintln!("overlay font diagnostics:");
    eprintln!("  origin:     {}", font.origin);
    eprintln!("  face_index: {}", font.face_index);
    eprintln!("  sha256:     {}", sha256_hex(&font.bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
