use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use maptrail::{
    EntityId, ExportOptions, ExportProgress, FfmpegSink, FfmpegSinkOpts, FramePlan, FrameSink,
    NullSink, PreviewRenderer, Project, RendererSession, SCRIPT_FILE_NAME, Studio, SvgRasterizer,
    ZipSink, ensure_parent_dir,
};

#[derive(Parser, Debug)]
#[command(name = "maptrail", version)]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a project file.
    Validate(ValidateArgs),
    /// Export every frame of a project.
    Render(RenderArgs),
    /// Run the export without keeping frames and write only the keyframe script.
    Script(ScriptArgs),
    /// Render one waypoint as a PNG still.
    Snapshot(SnapshotArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output archive or video path.
    #[arg(long)]
    out: PathBuf,

    /// Output container.
    #[arg(long, value_enum, default_value_t = OutputFormat::Zip)]
    format: OutputFormat,

    /// Also write the keyframe script to this path.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Also write the per-frame records as JSON to this path.
    #[arg(long)]
    records: Option<PathBuf>,

    /// Seconds to wait for each repaint.
    #[arg(long, default_value_t = 10.0)]
    timeout: f64,
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output script path.
    #[arg(long, default_value = SCRIPT_FILE_NAME)]
    out: PathBuf,

    /// Seconds to wait for each repaint.
    #[arg(long, default_value_t = 10.0)]
    timeout: f64,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Waypoint id to render.
    #[arg(long)]
    waypoint: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Stored zip of `frame_NNNNN.png` entries.
    Zip,
    /// H.264 MP4 through the system `ffmpeg`.
    Mp4,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(args),
        Command::Script(args) => cmd_script(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn timeout_from_secs(secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .with_context(|| format!("timeout must be a positive number of seconds, got {secs}"))
}

fn open_studio(in_path: &Path, render_timeout: Duration) -> anyhow::Result<Studio> {
    let project = Project::from_path(in_path)?;
    let rasterizer = SvgRasterizer::with_system_fonts();
    let renderer = PreviewRenderer::new(project.settings.resolution, rasterizer.clone());
    let session = RendererSession::new(Box::new(renderer));
    let studio = Studio::with_project(
        session,
        rasterizer,
        project,
        ExportOptions { render_timeout },
    )?;
    Ok(studio)
}

fn report_progress() -> impl FnMut(ExportProgress) {
    let mut last = None;
    move |p: ExportProgress| {
        let pct = p.percent();
        if last != Some(pct) {
            last = Some(pct);
            eprint!("\r{p}");
            if p.frame == p.total {
                eprintln!();
            }
        }
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let project = Project::from_path(&args.in_path)?;
    project.settings.validate()?;
    eprintln!(
        "ok: {} waypoints, {} pins, {} path points",
        project.waypoints.len(),
        project.pins.len(),
        project.custom_path.len()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.in_path, timeout_from_secs(args.timeout)?)?;

    let mut sink: Box<dyn FrameSink> = match args.format {
        OutputFormat::Zip => Box::new(ZipSink::to_path(&args.out)),
        OutputFormat::Mp4 => {
            let opts = FfmpegSinkOpts {
                bg_rgba: [255, 255, 255, 255],
                ..FfmpegSinkOpts::new(&args.out)
            };
            Box::new(FfmpegSink::new(opts))
        }
    };

    let mut progress = report_progress();
    let report = studio.render(FramePlan::Legs, sink.as_mut(), &mut progress)?;
    eprintln!("wrote {} ({} frames)", args.out.display(), report.frames);

    if let Some(path) = args.script {
        maptrail::write_keyframe_script(
            &maptrail::ScriptInput {
                resolution: studio.settings().resolution,
                fps: studio.settings().fps()?,
                waypoints: &studio.project().waypoints,
                pins: &studio.project().pins,
                records: studio.last_records(),
            },
            &path,
        )?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(path) = args.records {
        ensure_parent_dir(&path)?;
        std::fs::write(&path, studio.records_json()?)
            .with_context(|| format!("write records '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.in_path, timeout_from_secs(args.timeout)?)?;
    let mut progress = report_progress();
    studio.render(FramePlan::Legs, &mut NullSink::default(), &mut progress)?;

    let script = studio.keyframe_script()?;
    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, script)
        .with_context(|| format!("write keyframe script '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.in_path, ExportOptions::default().render_timeout)?;
    let png = studio.snapshot_waypoint(EntityId(args.waypoint))?;
    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
