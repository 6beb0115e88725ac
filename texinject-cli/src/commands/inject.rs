//! Inject command - patch every texture in a container, then stage it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use texinject::config::ConfigFile;
use texinject::patcher::{
    InPlaceTexturePatcher, PatchObserver, PatchReport, RecordOutcome, RecordStatus,
};
use texinject::staging::stage_companion_files;
use tracing::info;

use super::common::{
    format_size, path_or_prompt, print_staging_report, prompt_text, require_file,
    resolve_converter, OverflowArg,
};
use crate::error::CliError;

/// Arguments for the inject command.
#[derive(Debug, Args)]
pub struct InjectArgs {
    /// Container to patch (.ucas or .pak); prompted for when omitted
    pub source: Option<PathBuf>,

    /// Directory to copy the patched container set into
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Filename prefix for the copied files
    #[arg(long)]
    pub prefix: Option<String>,

    /// Texture compiler executable (overrides converter.executable)
    #[arg(long)]
    pub converter: Option<PathBuf>,

    /// Program used to run the compiler, e.g. wine (overrides converter.launcher)
    #[arg(long)]
    pub launcher: Option<PathBuf>,

    /// What to do when a converted texture is larger than the original
    #[arg(long, value_enum)]
    pub overflow: Option<OverflowArg>,

    /// Keep each texture's DDS and converted file in this directory
    #[arg(long)]
    pub keep_artifacts: Option<PathBuf>,

    /// List textures that would be converted without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not copy the container set afterwards
    #[arg(long)]
    pub no_stage: bool,
}

/// Where to copy the patched set.
struct StageTarget {
    dest: PathBuf,
    prefix: String,
}

/// Run the inject command.
pub fn run(args: InjectArgs, config: &ConfigFile) -> Result<(), CliError> {
    let interactive = args.source.is_none();

    let source = path_or_prompt(args.source, "Path to the UCAS or PAK file")?;
    let skip_stage = args.no_stage || args.dry_run;
    let stage = resolve_stage_target(args.dest, args.prefix, interactive, skip_stage)?;

    require_file(&source)?;

    let converter = resolve_converter(args.converter, args.launcher, config);
    let mut patcher_config = config.patcher_config().with_dry_run(args.dry_run);
    if let Some(overflow) = args.overflow {
        patcher_config = patcher_config.with_overflow_policy(overflow.into());
    }
    if let Some(dir) = args.keep_artifacts {
        patcher_config = patcher_config.with_artifacts_dir(dir);
    }

    info!(
        source = %source.display(),
        converter = %converter.executable().display(),
        "Starting injection"
    );

    let patcher = InPlaceTexturePatcher::new(converter, patcher_config);
    let mut progress = ProgressObserver::new();
    let result = patcher.patch_file_with_observer(&source, &mut progress);
    progress.finish();
    let report = result?;

    print_summary(&report, args.dry_run);

    if let Some(target) = stage {
        println!();
        let staged = stage_companion_files(&source, &target.dest, &target.prefix)?;
        print_staging_report(&staged);
    }

    Ok(())
}

/// Decide whether to stage, prompting for missing pieces.
///
/// Without a source on the command line the original interactive flow
/// applies and both destination and prefix are asked for. Otherwise staging
/// only happens when `--dest` is given.
fn resolve_stage_target(
    dest: Option<PathBuf>,
    prefix: Option<String>,
    interactive: bool,
    skip: bool,
) -> Result<Option<StageTarget>, CliError> {
    if skip || (dest.is_none() && !interactive) {
        return Ok(None);
    }

    let dest = path_or_prompt(dest, "Target directory for the copied files")?;
    let prefix = match prefix {
        Some(prefix) => prefix,
        None => prompt_text("Filename prefix for the copied files")?,
    };

    Ok(Some(StageTarget { dest, prefix }))
}

fn print_summary(report: &PatchReport, dry_run: bool) {
    println!();
    if dry_run {
        println!(
            "{} texture(s) found in {} (dry run, nothing written)",
            report.found_count(),
            format_size(report.container_len)
        );
        return;
    }

    println!(
        "{} of {} texture(s) injected, {} written",
        style(report.patched_count()).green().bold(),
        report.found_count(),
        format_size(report.bytes_written())
    );
    if report.truncated_count() > 0 {
        println!(
            "{} texture(s) truncated to their original size",
            style(report.truncated_count()).yellow()
        );
    }
    if report.skipped_count() > 0 {
        println!(
            "{} texture(s) skipped, original bytes kept",
            style(report.skipped_count()).yellow()
        );
    }
}

/// Progress bar driven by scanner position.
struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self, container_len: u64) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(container_len);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        })
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl PatchObserver for ProgressObserver {
    fn on_outcome(&mut self, outcome: &RecordOutcome, cursor: u64, container_len: u64) {
        let bar = self.bar(container_len);
        bar.set_position(cursor.min(container_len));

        let record = &outcome.record;
        let line = match outcome.status {
            RecordStatus::Patched { truncated, .. } => format!(
                "{} {}{}",
                style("patched").green(),
                record,
                if truncated { " (truncated)" } else { "" }
            ),
            RecordStatus::Skipped(ref reason) => {
                format!("{} {}: {}", style("skipped").yellow(), record, reason)
            }
            RecordStatus::Found => format!("{} {}", style("found").cyan(), record),
        };
        bar.println(line);
    }

    fn on_finished(&mut self, report: &PatchReport) {
        let bar = self.bar(report.container_len);
        bar.set_message(format!("{} texture(s)", report.found_count()));
    }
}
