mod script;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rewind_config::AppConfig;
use rewind_core::history::AutosaveStore;
use rewind_core::{open_project_history, recover_project, Project};

use crate::script::{Script, Session};

/// Snapshot-based undo history for multitrack projects.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about)]
struct Cli {
    /// Config file to use instead of `rewind.json` next to the executable.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted editing session and print the resulting history.
    Run {
        /// JSON script to replay.
        script: PathBuf,
        /// Autosave under this project id instead of a generated one.
        #[arg(long)]
        id: Option<String>,
    },
    /// List autosaved projects.
    List,
    /// Print the last autosaved state of a project.
    Recover {
        /// Project id, as shown by `list`.
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_or_create(&config_path);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = %config_path.display(), "Starting rewind");

    match cli.command {
        Command::Run { script, id } => run(&config, &script, id),
        Command::List => list(&config),
        Command::Recover { id } => recover(&config, &id),
    }
}

fn run(config: &AppConfig, path: &std::path::Path, id: Option<String>) -> Result<()> {
    let script = Script::load(path)?;
    let (history, _store) = open_project_history(&config.history_config())?;

    let mut project = match id {
        Some(id) => Project::with_id(id),
        None => Project::new(),
    };
    if let Some(title) = script.title.clone() {
        project.title = title;
    }
    tracing::info!(id = %project.id, steps = script.steps.len(), "Replaying script");

    let mut session = Session::start(project, history)?;
    session.run(&script.steps)?;

    println!("Project {} ({})", session.project.title, session.project.id);
    println!();
    println!("History:");
    for line in session.history_lines() {
        println!("  {line}");
    }
    println!();
    print_tracks(&session.project);
    Ok(())
}

fn list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let ids = store.list_documents()?;
    if ids.is_empty() {
        println!("No autosaved projects");
        return Ok(());
    }
    for id in ids {
        match store.load_meta(&id)? {
            Some(meta) => println!(
                "{id}  {}  {} bytes",
                meta.saved_at.format("%Y-%m-%d %H:%M:%S"),
                meta.size_bytes
            ),
            None => println!("{id}"),
        }
    }
    Ok(())
}

fn recover(config: &AppConfig, id: &str) -> Result<()> {
    let store = open_store(config)?;
    let Some(project) = recover_project(&store, id)? else {
        bail!("No autosave found for {id}");
    };
    println!("Project {} ({})", project.title, project.id);
    let selection = project.view_info.selected_region;
    println!("Selection: {:.3}s - {:.3}s", selection.t0, selection.t1);
    for (name, value) in project.tags().iter() {
        println!("Tag {name}: {value}");
    }
    println!();
    print_tracks(&project);
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<std::sync::Arc<AutosaveStore>> {
    let dir = config.resolve_data_dir();
    AutosaveStore::open(&dir)
        .with_context(|| format!("Failed to open autosave store in {}", dir.display()))
}

fn print_tracks(project: &Project) {
    if project.tracks.is_empty() {
        println!("No tracks");
        return;
    }
    println!("Tracks:");
    for track in project.tracks.iter() {
        println!(
            "  {:<6} {:<20} {:?}  gain {:.2}  {:.3}s",
            track.id.to_string(),
            track.name,
            track.kind,
            track.gain,
            track.duration()
        );
    }
}
