//! Gallery CLI - a persisted, reorderable image gallery.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};

use gallery::batch::collect_files;
use gallery::cli::{self, Cli, Commands, ThemeAction};
use gallery::config::{GalleryConfig, resolve_config};
use gallery::error::{GalleryError, Result, ResultExt};
use gallery::gallery::Gallery;
use gallery::image_ops::{dimensions, extension_for_media_type};
use gallery::logging::init_logging;
use gallery::output::{ListEntry, Output, OutputMode, VersionInfo};
use gallery::pipeline::ProgressConfig;
use gallery::record::ImageRecord;
use gallery::state::RecordSelector;
use gallery::storage::SqliteStore;
use gallery::view::GalleryView;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

/// What a command gets to work with.
struct Ctx<'a> {
    cli: &'a Cli,
    output: &'a dyn Output,
    view: Arc<dyn GalleryView>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let (output, view) = OutputMode::from_cli(&cli).into_output();
    let ctx = Ctx {
        cli: &cli,
        output: output.as_ref(),
        view,
    };

    if let Err(e) = run(&ctx).await {
        output.error(&e);
        std::process::exit(1);
    }
}

async fn run(ctx: &Ctx<'_>) -> Result<()> {
    match &ctx.cli.command {
        None => {
            ctx.output.quick_start(build_info::VERSION);
            Ok(())
        }
        Some(Commands::Add(args)) => cmd_add(ctx, args).await,
        Some(Commands::List(args)) => cmd_list(ctx, args).await,
        Some(Commands::Remove(args)) => cmd_remove(ctx, args).await,
        Some(Commands::Reorder(args)) => cmd_reorder(ctx, args).await,
        Some(Commands::Move(args)) => cmd_move(ctx, args).await,
        Some(Commands::Export(args)) => cmd_export(ctx, args).await,
        Some(Commands::Theme(args)) => cmd_theme(ctx, args).await,
        Some(Commands::Config(args)) => cmd_config(ctx, args),
        Some(Commands::Version) => {
            cmd_version(ctx);
            Ok(())
        }
        Some(Commands::Completions(args)) => {
            cmd_completions(args);
            Ok(())
        }
    }
}

// === Session setup ===

fn load_config(cli: &Cli) -> Result<GalleryConfig> {
    let (config, source) = resolve_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
    debug!(?source, "Using configuration");
    Ok(config)
}

fn open_gallery(ctx: &Ctx<'_>, config: &GalleryConfig) -> Result<Gallery<SqliteStore>> {
    let store = SqliteStore::open(config.db_path()?)?.with_quota(config.storage.quota_bytes);
    let gallery = Gallery::open(store, config, Arc::clone(&ctx.view));
    ctx.output.apply_theme(gallery.theme());
    Ok(gallery)
}

async fn resolve_all(gallery: &Gallery<SqliteStore>, selectors: &[String]) -> Result<Vec<ImageRecord>> {
    let mut records = Vec::with_capacity(selectors.len());
    for raw in selectors {
        let selector: RecordSelector = raw.parse()?;
        records.push(gallery.resolve(&selector).await?);
    }
    Ok(records)
}

// === Commands ===

async fn cmd_add(ctx: &Ctx<'_>, args: &cli::AddArgs) -> Result<()> {
    let mut config = load_config(ctx.cli)?;
    // Simulated progress is cosmetic; agents never want it.
    if args.no_progress || ctx.cli.use_json() {
        config.upload = ProgressConfig::disabled();
    }

    let scan = collect_files(&args.paths)?;
    if let Some(skipped) = scan.skipped_summary() {
        ctx.output
            .warning(&format!("Skipped {} non-file entries", skipped.count));
    }
    if scan.is_empty() {
        return Err(GalleryError::Other("No files to add".to_string()));
    }

    let mut gallery = open_gallery(ctx, &config)?;
    let report = gallery.on_files_selected(scan.files).await;
    ctx.output.batch_report(&report, &gallery.summary().await);

    if report.accepted() == 0 {
        return Err(GalleryError::Other(format!(
            "No files were added ({} rejected)",
            report.rejected()
        )));
    }
    Ok(())
}

async fn cmd_list(ctx: &Ctx<'_>, args: &cli::ListArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let gallery = open_gallery(ctx, &config)?;

    let entries: Vec<ListEntry> = gallery
        .records()
        .await
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let entry = ListEntry::new(index, record);
            if !args.long {
                return entry;
            }
            match dimensions(record) {
                Ok(dims) => entry.with_dimensions(dims),
                Err(e) => {
                    warn!(id = %record.id(), error = %e, "Could not read image dimensions");
                    entry
                }
            }
        })
        .collect();

    ctx.output.gallery_list(&entries, &gallery.summary().await);
    Ok(())
}

async fn cmd_remove(ctx: &Ctx<'_>, args: &cli::RemoveArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let mut gallery = open_gallery(ctx, &config)?;

    let selector: RecordSelector = args.selector.parse()?;
    let record = gallery.resolve(&selector).await?;
    let removed = gallery.on_remove_requested(&record).await?;
    ctx.output.removed(&removed, &gallery.summary().await);
    Ok(())
}

async fn cmd_reorder(ctx: &Ctx<'_>, args: &cli::ReorderArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let mut gallery = open_gallery(ctx, &config)?;

    let order = resolve_all(&gallery, &args.selectors).await?;
    gallery.on_reorder_completed(order.clone()).await?;
    ctx.output.order(&order);
    Ok(())
}

async fn cmd_move(ctx: &Ctx<'_>, args: &cli::MoveArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let mut gallery = open_gallery(ctx, &config)?;

    let order = gallery.move_record(args.from, args.to).await?;
    ctx.output.order(&order);
    Ok(())
}

async fn cmd_export(ctx: &Ctx<'_>, args: &cli::ExportArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let gallery = open_gallery(ctx, &config)?;

    let selector: RecordSelector = args.selector.parse()?;
    let record = gallery.resolve(&selector).await?;
    let path = export_path(&args.output, &record);
    tokio::fs::write(&path, record.to_bytes()?)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    ctx.output.exported(&record, &path);
    Ok(())
}

fn export_path(output: &Path, record: &ImageRecord) -> PathBuf {
    if output.is_dir() {
        output.join(format!(
            "{}.{}",
            record.id(),
            extension_for_media_type(record.media_type())
        ))
    } else {
        output.to_path_buf()
    }
}

async fn cmd_theme(ctx: &Ctx<'_>, args: &cli::ThemeArgs) -> Result<()> {
    let config = load_config(ctx.cli)?;
    let mut gallery = open_gallery(ctx, &config)?;

    match args.action.unwrap_or(ThemeAction::Show) {
        ThemeAction::Show => ctx.output.theme(gallery.theme(), false),
        ThemeAction::Toggle => {
            let theme = gallery.toggle_theme().await?;
            ctx.output.theme(theme, true);
        }
        action => {
            if let Some(theme) = action.explicit() {
                let theme = gallery.set_theme(theme).await?;
                ctx.output.theme(theme, true);
            }
        }
    }
    Ok(())
}

fn cmd_config(ctx: &Ctx<'_>, args: &cli::ConfigArgs) -> Result<()> {
    let (config, source) = resolve_config(ctx.cli.config.as_deref(), ctx.cli.data_dir.as_deref())?;
    ctx.output.config(&config, &source, args.path);
    Ok(())
}

fn cmd_version(ctx: &Ctx<'_>) {
    ctx.output.version_info(&VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty(),
        build_timestamp: build_info::build_timestamp(),
        rustc: build_info::rustc_semver(),
        target: build_info::target(),
    });
}

fn cmd_completions(args: &cli::CompletionsArgs) {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "gallery", &mut io::stdout());
}
