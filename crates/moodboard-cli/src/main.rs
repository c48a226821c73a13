use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use moodboard_core::display::{DisplaySink, render_viewport};
use moodboard_core::scheduler::{CycleScheduler, SchedulerEvent};
use moodboard_core::selector::next_window;
use moodboard_core::view::ViewTransform;
use moodboard_core::{
    Board, BoardConfig, BoardWarning, ImageCatalog, RawSettings, board_to_json, compose_board,
    layout_to_json, plan_board,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "moodboard",
    about = "Compose reference images into mood boards",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML settings file (interval_seconds, images_per_board, canvas_width, canvas_height)
    #[arg(long, global = true, help_heading = "Settings")]
    config: Option<PathBuf>,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        global = true,
        help_heading = "Logging/UX"
    )]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the subfolders of a reference library with their image counts
    Folders(FoldersArgs),
    /// Compose one board from a folder and write it as PNG
    Pack(PackArgs),
    /// Cycle boards on a timer, writing each presented board to disk
    Cycle(CycleArgs),
}

#[derive(Parser, Debug, Clone)]
struct FoldersArgs {
    /// Library root directory
    root: PathBuf,
}

/// Board settings given on the command line. Values stay textual so that
/// invalid input falls back to defaults the same way file settings do.
#[derive(Args, Debug, Clone)]
struct SettingsArgs {
    /// Seconds between boards
    #[arg(long, help_heading = "Settings")]
    interval: Option<String>,
    /// Images per board
    #[arg(long, help_heading = "Settings")]
    batch: Option<String>,
    /// Canvas width in pixels
    #[arg(long, help_heading = "Settings")]
    canvas_width: Option<String>,
    /// Canvas height in pixels
    #[arg(long, help_heading = "Settings")]
    canvas_height: Option<String>,
    /// Print the merged settings (defaults, YAML, flags) and exit
    #[arg(long, default_value_t = false, help_heading = "Settings")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Settings")]
    print_config_format: String,
}

impl SettingsArgs {
    fn raw(&self) -> RawSettings {
        RawSettings {
            interval_seconds: self.interval.clone(),
            images_per_board: self.batch.clone(),
            canvas_width: self.canvas_width.clone(),
            canvas_height: self.canvas_height.clone(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Image folder
    #[arg(help_heading = "Input/Output")]
    dir: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Board base name (files will be name.png/.json)
    #[arg(short, long, default_value = "board", help_heading = "Input/Output")]
    name: String,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Catalog index of the first image on the board
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    start: usize,
    /// Write every canvas, not only the first one
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    all_pages: bool,
    #[command(flatten)]
    settings: SettingsArgs,
    /// Also write a JSON manifest with placements, warnings and stats
    #[arg(long, default_value_t = false, help_heading = "Export")]
    manifest: bool,
    /// Dry run: compute the layout without decoding pixels or writing files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct CycleArgs {
    /// Image folder
    #[arg(help_heading = "Input/Output")]
    dir: PathBuf,
    /// Output directory for presented boards
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name for presented boards (name_0000.png, name_0001.png, ...)
    #[arg(short, long, default_value = "board", help_heading = "Input/Output")]
    name: String,
    /// Stop after this many boards (runs until interrupted if omitted)
    #[arg(long, help_heading = "Cycle")]
    boards: Option<u64>,
    /// Zoom factor applied when presenting
    #[arg(long, default_value_t = 1.0, help_heading = "View")]
    zoom: f32,
    /// Pan offset applied when presenting, as X,Y
    #[arg(long, value_parser = parse_offset, help_heading = "View")]
    pan: Option<(f32, f32)>,
    /// Fixed viewport size WxH; defaults to the zoomed canvas size
    #[arg(long, value_parser = parse_size, help_heading = "View")]
    viewport: Option<(u32, u32)>,
    #[command(flatten)]
    settings: SettingsArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let file_settings = match &cli.config {
        Some(path) => load_yaml_settings(path)?,
        None => RawSettings::default(),
    };
    match &cli.command {
        Commands::Folders(args) => run_folders(args),
        Commands::Pack(args) => run_pack(args, &file_settings),
        Commands::Cycle(args) => run_cycle(args, &file_settings, cli.progress && !cli.quiet),
    }
}

fn run_folders(args: &FoldersArgs) -> anyhow::Result<()> {
    let mut subs = ImageCatalog::subfolders(&args.root)
        .with_context(|| format!("list {}", args.root.display()))?;
    subs.sort();
    for dir in subs {
        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match ImageCatalog::open(&dir) {
            Ok(catalog) => println!("{:>6}  {}", catalog.len(), name),
            Err(e) => warn!(?dir, error = %e, "skip folder"),
        }
    }
    Ok(())
}

fn run_pack(args: &PackArgs, file_settings: &RawSettings) -> anyhow::Result<()> {
    let cfg = resolve_config(file_settings, &args.settings)?;
    if args.settings.print_config {
        return print_config(&cfg, &args.settings.print_config_format);
    }

    let catalog = open_filtered(&args.dir, &args.include, &args.exclude)?;
    info!(count = catalog.len(), dir = ?args.dir, "catalog opened");
    let window = next_window(args.start, cfg.images_per_board, catalog.len());

    if args.dry_run {
        let layout = plan_board(&catalog, window, &cfg);
        report_warnings(&layout.warnings);
        let stats = layout.stats();
        info!(summary = %stats.summary(), "layout (dry run)");
        println!("{}", serde_json::to_string_pretty(&layout_to_json(&layout))?);
        return Ok(());
    }

    let board = compose_board(&catalog, window, &cfg);
    report_warnings(&board.warnings);
    board
        .require_content()
        .with_context(|| format!("nothing to compose from {}", args.dir.display()))?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;

    let canvases = if args.all_pages {
        &board.canvases[..]
    } else {
        &board.canvases[..1]
    };
    let page_names: Vec<String> = if canvases.len() == 1 {
        vec![format!("{}.png", args.name)]
    } else {
        (0..canvases.len())
            .map(|id| format!("{}_{}.png", args.name, id))
            .collect()
    };
    for (canvas, file) in canvases.iter().zip(&page_names) {
        let png_path = args.out_dir.join(file);
        canvas
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, w = canvas.width(), h = canvas.height(), "wrote canvas");
    }
    if board.canvases.len() > canvases.len() {
        info!(
            skipped = board.canvases.len() - canvases.len(),
            "extra canvases not written (use --all-pages)"
        );
    }

    info!(
        pages = board.stats.num_bins,
        placed = board.stats.num_placed,
        occupancy = format!("{:.2}%", board.stats.occupancy * 100.0),
        "stats"
    );

    if args.manifest {
        let json_path = args.out_dir.join(format!("{}.json", args.name));
        let json = serde_json::to_string_pretty(&board_to_json(&board, &page_names))?;
        fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, "manifest written");
    }
    Ok(())
}

fn run_cycle(
    args: &CycleArgs,
    file_settings: &RawSettings,
    show_progress: bool,
) -> anyhow::Result<()> {
    let cfg = resolve_config(file_settings, &args.settings)?;
    if args.settings.print_config {
        return print_config(&cfg, &args.settings.print_config_format);
    }

    let mut view = ViewTransform::new();
    if !view.set_zoom(args.zoom) {
        anyhow::bail!("invalid zoom factor: {}", args.zoom);
    }
    if let Some((dx, dy)) = args.pan {
        view.pan(dx, dy);
    }

    let catalog = ImageCatalog::open(&args.dir)
        .with_context(|| format!("open {}", args.dir.display()))?;
    if catalog.is_empty() {
        warn!(dir = ?args.dir, "no images found; presenting blank boards");
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    info!(count = catalog.len(), interval_s = cfg.interval_seconds, "cycling");

    let bar = if show_progress {
        let b = match args.boards {
            Some(n) => ProgressBar::new(n),
            None => ProgressBar::new_spinner(),
        };
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} boards {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let mut sink = FileSink::new(&args.out_dir, &args.name, args.viewport);
    let scheduler = CycleScheduler::spawn(&cfg, catalog)?;
    // First board right away, then one per interval.
    scheduler.refresh()?;
    scheduler.start()?;

    let mut shown: u64 = 0;
    for event in scheduler.events().iter() {
        match event {
            SchedulerEvent::Board(frame) => {
                report_warnings(&frame.board.warnings);
                sink.present(&frame.board, &view)?;
                shown += 1;
                if let Some(b) = &bar {
                    b.set_message(format!("index {}", frame.index));
                    b.inc(1);
                }
            }
            SchedulerEvent::Cleared { trigger } => {
                debug!(?trigger, "board cleared");
                sink.clear(&view)?;
                shown += 1;
                if let Some(b) = &bar {
                    b.set_message("empty catalog");
                    b.inc(1);
                }
            }
            SchedulerEvent::Running(running) => debug!(running, "scheduler state"),
        }
        if args.boards.is_some_and(|n| shown >= n) {
            break;
        }
    }
    scheduler.shutdown();
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(boards = shown, out_dir = ?args.out_dir, "cycle finished");
    Ok(())
}

/// Writes each presented board as a numbered PNG.
struct FileSink {
    out_dir: PathBuf,
    name: String,
    viewport: Option<(u32, u32)>,
    written: usize,
}

impl FileSink {
    fn new(out_dir: &Path, name: &str, viewport: Option<(u32, u32)>) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            name: name.to_string(),
            viewport,
            written: 0,
        }
    }

    fn write(&mut self, img: &RgbaImage) -> moodboard_core::Result<()> {
        let path = self
            .out_dir
            .join(format!("{}_{:04}.png", self.name, self.written));
        img.save(&path)?;
        self.written += 1;
        debug!(?path, "board presented");
        Ok(())
    }
}

impl DisplaySink for FileSink {
    fn present(&mut self, board: &Board, view: &ViewTransform) -> moodboard_core::Result<()> {
        let Some(canvas) = board.primary() else {
            return self.clear(view);
        };
        let (vw, vh) = self
            .viewport
            .unwrap_or_else(|| view.scaled_size(canvas.width(), canvas.height()));
        let frame = render_viewport(canvas, view, vw, vh);
        self.write(&frame)
    }

    fn clear(&mut self, _view: &ViewTransform) -> moodboard_core::Result<()> {
        if let Some((vw, vh)) = self.viewport {
            self.write(&RgbaImage::new(vw, vh))?;
        }
        Ok(())
    }
}

fn resolve_config(
    file_settings: &RawSettings,
    flags: &SettingsArgs,
) -> anyhow::Result<BoardConfig> {
    let raw = file_settings.clone().merge(flags.raw());
    let cfg = BoardConfig::from_raw(&raw);
    cfg.validate()?;
    debug!(?cfg, "settings resolved");
    Ok(cfg)
}

fn print_config(cfg: &BoardConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn report_warnings(warnings: &[BoardWarning]) {
    for w in warnings {
        match w {
            BoardWarning::Decode { path, message } => warn!(?path, %message, "skip image"),
            BoardWarning::Oversized {
                path,
                width,
                height,
            } => warn!(?path, width, height, "image larger than canvas"),
        }
    }
}

fn open_filtered(
    dir: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<ImageCatalog> {
    let catalog = ImageCatalog::open(dir).with_context(|| format!("open {}", dir.display()))?;
    if include.is_empty() && exclude.is_empty() {
        return Ok(catalog);
    }
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    Ok(catalog.retain(|p| !should_skip(p, inc_set.as_ref(), exc_set.as_ref())))
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s}"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in {s}"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in {s}"))?;
    if w == 0 || h == 0 {
        return Err(format!("viewport must be non-empty, got {s}"));
    }
    Ok((w, h))
}

fn parse_offset(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s}"))?;
    let x: f32 = x.trim().parse().map_err(|_| format!("bad x in {s}"))?;
    let y: f32 = y.trim().parse().map_err(|_| format!("bad y in {s}"))?;
    Ok((x, y))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// Settings file. Values may be written as numbers or strings; they are kept
/// as text and validated by `BoardConfig::from_raw`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlSettings {
    interval_seconds: Option<serde_yaml::Value>,
    images_per_board: Option<serde_yaml::Value>,
    canvas_width: Option<serde_yaml::Value>,
    canvas_height: Option<serde_yaml::Value>,
}

impl YamlSettings {
    fn into_raw(self) -> RawSettings {
        RawSettings {
            interval_seconds: self.interval_seconds.and_then(scalar_text),
            images_per_board: self.images_per_board.and_then(scalar_text),
            canvas_width: self.canvas_width.and_then(scalar_text),
            canvas_height: self.canvas_height.and_then(scalar_text),
        }
    }
}

fn scalar_text(v: serde_yaml::Value) -> Option<String> {
    match v {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn load_yaml_settings(path: &Path) -> anyhow::Result<RawSettings> {
    let file = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if file.trim().is_empty() {
        return Ok(RawSettings::default());
    }
    let y: YamlSettings =
        serde_yaml::from_str(&file).with_context(|| format!("parse {}", path.display()))?;
    Ok(y.into_raw())
}
