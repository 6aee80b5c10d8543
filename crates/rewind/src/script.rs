//! Scripted editing sessions.
//!
//! A script is a JSON document listing edits and history commands. Each
//! edit only mutates the project; history is recorded when the script says
//! so with a `push` or `modify` step, the same way an editor command would.

use std::path::Path;

use anyhow::{bail, Context, Result};
use rewind_core::history::UndoPush;
use rewind_core::track::DEFAULT_RATE;
use rewind_core::{Project, ProjectHistory, TrackId, TrackKind};
use serde::Deserialize;

/// Longest silence a scripted track may be filled with, in seconds.
const MAX_SILENCE_SECONDS: f64 = 24.0 * 60.0 * 60.0;

/// A whole script file.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: Option<String>,
    pub steps: Vec<Step>,
}

impl Script {
    /// Reads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid script.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse script: {}", path.display()))
    }
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddTrack {
        name: String,
        #[serde(default)]
        kind: TrackKind,
        /// Length of silence to fill the track with.
        #[serde(default)]
        seconds: f64,
    },
    RemoveTrack {
        name: String,
    },
    RenameTrack {
        from: String,
        to: String,
    },
    SetGain {
        name: String,
        gain: f32,
    },
    Select {
        t0: f64,
        t1: f64,
    },
    SetTag {
        name: String,
        value: String,
    },
    BeginRecording {
        name: String,
    },
    CommitRecording,
    Push {
        description: String,
        #[serde(default)]
        short: Option<String>,
        #[serde(default)]
        minimal: bool,
        #[serde(default)]
        consolidate: bool,
    },
    Modify {
        #[serde(default)]
        autosave: bool,
    },
    Rollback,
    Undo,
    Redo,
    Goto {
        position: usize,
    },
    /// The project was written to disk.
    Saved,
}

/// A project and its history, driven step by step.
#[derive(Debug)]
pub struct Session {
    pub project: Project,
    pub history: ProjectHistory,
}

impl Session {
    /// Starts a session, recording the project's initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial checkpoint cannot be recorded.
    pub fn start(project: Project, mut history: ProjectHistory) -> Result<Self> {
        history
            .initial_state(&project)
            .context("Failed to record initial state")?;
        Ok(Self { project, history })
    }

    /// Runs every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first step's error, tagged with its index.
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("Step {index} ({step:?}) failed"))?;
        }
        Ok(())
    }

    /// Applies one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step names a missing track or history
    /// cannot record or restore a state.
    pub fn apply(&mut self, step: &Step) -> Result<()> {
        let project = &mut self.project;
        match step {
            Step::AddTrack {
                name,
                kind,
                seconds,
            } => {
                let samples = silence(*seconds, DEFAULT_RATE)?;
                let id = project.tracks.add(name.clone(), *kind);
                if let Some(track) = project.tracks.get_mut(id) {
                    track.samples = samples;
                }
            }
            Step::RemoveTrack { name } => {
                let id = track_named(project, name)?;
                project.tracks.remove(id);
            }
            Step::RenameTrack { from, to } => {
                let id = track_named(project, from)?;
                if let Some(track) = project.tracks.get_mut(id) {
                    track.name = to.clone();
                }
            }
            Step::SetGain { name, gain } => {
                let id = track_named(project, name)?;
                if let Some(track) = project.tracks.get_mut(id) {
                    track.gain = *gain;
                }
            }
            Step::Select { t0, t1 } => project.view_info.select(*t0, *t1),
            Step::SetTag { name, value } => project.edit_tags(|tags| tags.set(name, value.clone())),
            Step::BeginRecording { name } => {
                project.tracks.begin_pending(name.clone(), TrackKind::Wave);
            }
            Step::CommitRecording => {
                project.tracks.apply_pending();
            }
            Step::Push {
                description,
                short,
                minimal,
                consolidate,
            } => {
                let mut flags = if *minimal {
                    UndoPush::MINIMAL
                } else {
                    UndoPush::AUTOSAVE
                };
                if *consolidate {
                    flags |= UndoPush::CONSOLIDATE;
                }
                let short = short.clone().unwrap_or_else(|| description.clone());
                self.history
                    .push_state_with(project, description.clone(), short, flags)?;
            }
            Step::Modify { autosave } => self.history.modify_state(project, *autosave)?,
            Step::Rollback => self.history.rollback_state(project)?,
            Step::Undo => {
                if !self.history.undo(project)? {
                    tracing::info!("Nothing to undo");
                }
            }
            Step::Redo => {
                if !self.history.redo(project)? {
                    tracing::info!("Nothing to redo");
                }
            }
            Step::Goto { position } => {
                if !self.history.set_state_to(project, *position)? {
                    tracing::info!(position, "No such history position");
                }
            }
            Step::Saved => {
                self.history.state_saved();
                self.history.set_dirty(false);
            }
        }
        Ok(())
    }

    /// Human-readable history listing, one line per checkpoint.
    pub fn history_lines(&self) -> Vec<String> {
        self.history
            .stack()
            .entries()
            .map(|entry| {
                let cursor = if entry.current { '>' } else { ' ' };
                let saved = if entry.saved { '*' } else { ' ' };
                format!("{cursor}{saved} {:>3}  {}", entry.index, entry.description)
            })
            .collect()
    }
}

/// Allocates `seconds` of silence at `rate`.
fn silence(seconds: f64, rate: u32) -> Result<Vec<f32>> {
    if !(0.0..=MAX_SILENCE_SECONDS).contains(&seconds) {
        bail!("Track length must be between 0 and {MAX_SILENCE_SECONDS} seconds, got {seconds}");
    }
    let len = (seconds * f64::from(rate)) as usize;
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(len)
        .with_context(|| format!("Failed to allocate {len} samples"))?;
    samples.resize(len, 0.0);
    Ok(samples)
}

fn track_named(project: &Project, name: &str) -> Result<TrackId> {
    match project.tracks.find_by_name(name) {
        Some(track) => Ok(track.id),
        None => bail!("No track named {name:?}"),
    }
}
