//! Headless driver for the editor core.
//!
//! Opens a file into an [`EditorSession`], replays a JSON edit script against
//! a virtual clock, flushes pending highlight work and reports the projected
//! frame.

use anyhow::{Context, Result};
use clap::Parser;
use core_actions::EditIntent;
use core_config::Config;
use core_events::{EditorObserver, EventRecorder};
use core_model::{EditorSession, HistoryOutcome, SessionOptions};
use core_render::{Frame, Viewport};
use core_syntax::LanguageId;
use core_text::normalize_line_endings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "quill", version, about = "Quill editor core driver")]
pub struct Cli {
    /// File to open (UTF-8 text). An empty buffer is used when omitted.
    pub path: Option<PathBuf>,
    /// Configuration file (overrides discovery of `quill.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// JSON array of script steps to replay after opening.
    #[arg(long)]
    pub script: Option<PathBuf>,
    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    pub height: f32,
    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    pub width: f32,
    /// Scroll so this 1-indexed line is at the top before printing.
    #[arg(long = "scroll-to")]
    pub scroll_to: Option<usize>,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Undo,
    Redo,
    /// 1-indexed line to bring to the top.
    ScrollTo(usize),
    Scroll(f32),
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        shift: bool,
    },
    Drag {
        x: f32,
        y: f32,
    },
    Release,
    /// Advance the virtual clock by this many milliseconds.
    Wait(u64),
    #[serde(untagged)]
    Edit(EditIntent),
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>> {
    serde_json::from_str(json).context("parsing edit script")
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub buffer: String,
    pub language: &'static str,
    pub revision: u64,
    pub line_count: usize,
    pub text: String,
    pub clipboard: Option<String>,
    pub notifications: usize,
    pub viewport: Viewport,
    pub frame: Frame,
}

/// Session parameters derived from configuration and the requested size.
pub fn session_options(config: &mut Config, width: f32, height: f32) -> SessionOptions {
    let viewport = config.viewport().clone();
    let page_lines = (height.max(0.0) / viewport.line_height).floor() as usize;
    let scroll_margin = config.apply_page_lines(page_lines);
    SessionOptions {
        line_height: viewport.line_height,
        overscan: viewport.overscan,
        scroll_margin,
        cell_width: config.font().cell_width,
        container_width: width,
        container_height: height,
        highlight_enabled: config.highlight().enabled,
        highlight_debounce: config.highlight().debounce(),
        completion_enabled: config.completion().enabled,
        completion_debounce: config.completion().debounce(),
    }
}

fn read_document(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let norm = normalize_line_endings(&content);
    debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        line_ending = ?norm.original,
        mixed = norm.mixed,
        "file_read_ok"
    );
    if norm.mixed {
        warn!(target: "io", file = %path.display(), "mixed line endings normalized to LF");
    }
    Ok(norm.normalized)
}

/// Drives a session through script steps on a virtual clock.
pub struct ScriptRunner {
    pub session: EditorSession,
    pub clock: Instant,
    pub clipboard: Option<String>,
}

impl ScriptRunner {
    pub fn new(session: EditorSession, clock: Instant) -> Self {
        Self {
            session,
            clock,
            clipboard: None,
        }
    }

    pub fn step(&mut self, step: ScriptStep) {
        let now = self.clock;
        match step {
            ScriptStep::Undo => log_history("undo", self.session.undo(now)),
            ScriptStep::Redo => log_history("redo", self.session.redo(now)),
            ScriptStep::ScrollTo(line) => {
                self.session.scroll_to_line(line.saturating_sub(1));
            }
            ScriptStep::Scroll(top) => {
                self.session.on_scroll(top);
            }
            ScriptStep::Click { x, y, shift } => self.session.mouse_down(x, y, shift),
            ScriptStep::Drag { x, y } => self.session.mouse_move(x, y),
            ScriptStep::Release => self.session.mouse_up(),
            ScriptStep::Wait(ms) => {
                self.clock += Duration::from_millis(ms);
                self.session.pump(self.clock);
            }
            ScriptStep::Edit(intent) => {
                let result = self.session.apply(intent, now);
                if let Some(text) = result.clipboard {
                    self.clipboard = Some(text);
                }
            }
        }
    }

    /// Advance past every pending timer so debounced work runs.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.session.next_deadline() {
            self.clock = self.clock.max(deadline);
            self.session.pump(self.clock);
        }
    }
}

fn log_history(direction: &'static str, outcome: HistoryOutcome) {
    match outcome {
        HistoryOutcome::Applied { revision } => {
            debug!(target: "runtime.script", direction, revision, "history applied")
        }
        other => info!(target: "runtime.script", direction, outcome = ?other, "history not applied"),
    }
}

/// Open, replay and project according to `cli`.
pub fn run(cli: &Cli) -> Result<Report> {
    let mut config = core_config::load_from(cli.config.clone())?;
    let options = session_options(&mut config, cli.width, cli.height);
    let start = Instant::now();

    let mut session = EditorSession::new(options);
    let recorder = EventRecorder::new();
    session.register(recorder.clone());
    session.register(LogObserver);
    session.set_authority(core_model::LocalHistory::new());

    if let Some(path) = cli.path.as_deref() {
        let text = read_document(path)?;
        session.load(&text, start);
        session
            .set_language(LanguageId::from_path(path), start)
            .context("selecting highlighter")?;
    }
    if config.highlight().enabled {
        session
            .use_local_highlighter(false)
            .context("starting highlighter")?;
    }

    let steps = match cli.script.as_deref() {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            parse_script(&json)?
        }
        None => Vec::new(),
    };

    let mut runner = ScriptRunner::new(session, start);
    let count = steps.len();
    for step in steps {
        runner.step(step);
    }
    runner.settle();
    if let Some(line) = cli.scroll_to {
        runner.session.scroll_to_line(line.saturating_sub(1));
    }
    info!(target: "runtime", steps = count, revision = runner.session.engine().revision(), "script_complete");

    Ok(report(&runner, &recorder))
}

fn report(runner: &ScriptRunner, recorder: &EventRecorder) -> Report {
    let session = &runner.session;
    Report {
        buffer: session.buffer_id().to_string(),
        language: session.language().name(),
        revision: session.engine().revision(),
        line_count: session.engine().buffer().line_count(),
        text: session.text(),
        clipboard: runner.clipboard.clone(),
        notifications: recorder.events().len(),
        viewport: *session.viewport(),
        frame: session.frame(),
    }
}

/// Forward session notifications to the log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl EditorObserver for LogObserver {
    fn on_content_change(&mut self, text: &str) {
        debug!(target: "events", bytes = text.len(), "content_changed");
    }
    fn on_cursor_change(&mut self, line: usize, column: usize) {
        debug!(target: "events", line, column, "cursor_changed");
    }
    fn on_scroll_change(&mut self, scroll_top: f32, visible_start: usize) {
        debug!(target: "events", scroll_top, visible_start, "scroll_changed");
    }
    fn on_completion_request(&mut self, line: usize, column: usize) {
        debug!(target: "events", line, column, "completion_requested");
    }
}
