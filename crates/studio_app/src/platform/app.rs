use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use studio_core::{
    AppState, DraftSnapshot, Engagement, EngagementTarget, EntityRef, FormKey, SubmissionId,
    TrackerState, UploadPayload,
};
use studio_engine::{EngineConfig, FileStore, ReqwestApi, StudioEngine};
use studio_logging::{studio_info, studio_warn, LogDestination};

use super::cli::{Cli, Command, DraftCommand, FilterArg, KindArg, SortArg};
use super::config::load_config;
use super::render::{feed_lines, like_line, status_lines};

type Engine = StudioEngine<FileStore>;

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = load_config(cli.config.as_deref(), cli.base_url.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(run_command(cli.command, &config))
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let destination = LogDestination::parse(&cli.log, &cwd)
        .with_context(|| format!("unknown log destination {:?}", cli.log))?;
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    studio_logging::initialize(destination, level);
    Ok(())
}

async fn run_command(command: Command, config: &EngineConfig) -> anyhow::Result<()> {
    let api = ReqwestApi::new(config.api_settings()).context("building http client")?;
    let store = FileStore::new(config.draft_dir.clone());
    let mut engine = StudioEngine::from_config(config, Arc::new(api), store)?;

    match command {
        Command::Upload {
            title,
            file,
            description,
            form_key,
        } => upload(&mut engine, title, file, description, form_key).await,
        Command::Feed { sort, filter, page } => feed(&mut engine, sort, filter, page).await,
        Command::Like { kind, id } => like(&mut engine, kind, &id).await,
        Command::Draft { action } => draft(&mut engine, action),
    }
}

/// Prints only lines that differ from the previous render.
#[derive(Default)]
struct StatusPrinter {
    last: Vec<String>,
}

impl StatusPrinter {
    fn show(&mut self, lines: Vec<String>) {
        for line in &lines {
            if !self.last.contains(line) {
                println!("{line}");
            }
        }
        self.last = lines;
    }
}

fn job_state(state: &AppState, submission: SubmissionId) -> Option<TrackerState> {
    state.job(submission).map(|job| job.state())
}

async fn upload(
    engine: &mut Engine,
    title: String,
    media_path: PathBuf,
    description: Option<String>,
    form_key: Option<String>,
) -> anyhow::Result<()> {
    let payload = UploadPayload {
        title,
        description,
        media_path,
    };
    let submission = engine
        .submit_upload(payload, form_key.map(FormKey::new))
        .context("upload was not started")?;

    let mut printer = StatusPrinter::default();
    engine.consume_dirty();
    printer.show(status_lines(&engine.view()));

    while !job_state(engine.state(), submission).is_some_and(TrackerState::is_terminal) {
        if !engine.next_event().await {
            break;
        }
        if engine.consume_dirty() {
            printer.show(status_lines(&engine.view()));
        }
    }

    match job_state(engine.state(), submission) {
        Some(TrackerState::Succeeded) => Ok(()),
        Some(other) => bail!("upload {submission} ended as {other}"),
        None => bail!("upload {submission} is no longer tracked"),
    }
}

async fn load_feed(engine: &mut Engine) {
    engine.refresh();
    engine.run_until(|state| !state.is_refreshing()).await;
}

async fn feed(
    engine: &mut Engine,
    sort: SortArg,
    filter: FilterArg,
    page: usize,
) -> anyhow::Result<()> {
    engine.set_sort(sort.into());
    engine.set_filter(filter.into());
    load_feed(engine).await;
    engine.select_page(page);

    let view = engine.view();
    if let Some(err) = &view.refresh_error {
        bail!("could not load feed: {err}");
    }
    if view.feed.page != page {
        studio_info!("Page {} out of range, showing {}", page, view.feed.page);
    }
    for line in feed_lines(&view.feed) {
        println!("{line}");
    }
    Ok(())
}

fn engagement_of(state: &AppState, target: &EntityRef) -> Option<Engagement> {
    state
        .feed()
        .lookup(target)
        .map(|entry| *entry.engagement())
}

async fn like(engine: &mut Engine, kind: KindArg, id: &str) -> anyhow::Result<()> {
    let target = kind.target(id);
    load_feed(engine).await;
    if let Some(err) = &engine.view().refresh_error {
        studio_warn!("Liking {} without a local copy: {}", target, err);
    }

    engine.toggle_like(target.clone());
    engine
        .run_until(|state| state.likes().in_flight(&target) == 0)
        .await;
    let settled = engagement_of(engine.state(), &target);

    match like_line(&target, engine.state().likes().last_outcome(), settled) {
        Ok(line) => println!("{line}"),
        Err(reason) => bail!("like on {target} was not saved: {reason}"),
    }
    Ok(())
}

fn draft(engine: &mut Engine, action: DraftCommand) -> anyhow::Result<()> {
    match action {
        DraftCommand::Save { form_key, json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("draft must be valid JSON")?;
            engine.save_draft(&FormKey::new(form_key), &DraftSnapshot(value))?;
        }
        DraftCommand::Show { form_key } => match engine.load_draft(&FormKey::new(form_key)) {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => println!("(no draft)"),
        },
        DraftCommand::Clear { form_key } => engine.clear_draft(&FormKey::new(form_key))?,
    }
    Ok(())
}
