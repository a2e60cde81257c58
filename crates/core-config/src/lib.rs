//! Configuration loading and parsing.
//!
//! Reads `quill.toml` (or an override path provided by the binary). Every
//! section and field is optional; missing values take their defaults and
//! unknown fields are ignored so older binaries accept newer files. A file
//! that fails to parse is reported at `warn` and replaced by defaults.
//!
//! The configured `scroll_margin` is kept next to the effective value because
//! the usable margin depends on the page height the binary computes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, io, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "quill.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Pixel height of one text line.
    pub line_height: f32,
    /// Extra lines materialized above and below the visible range.
    pub overscan: usize,
    /// Lines kept between the cursor and the viewport edge on auto-scroll.
    pub scroll_margin: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            overscan: 5,
            scroll_margin: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Advance of one display cell in pixels.
    pub cell_width: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { cell_width: 8.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HighlightConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 150,
        }
    }
}

impl HighlightConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompletionConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: 300,
        }
    }
}

impl CompletionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub viewport: ViewportConfig,
    pub font: FontConfig,
    pub highlight: HighlightConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
    /// `viewport.scroll_margin` clamped to the current page height.
    pub effective_scroll_margin: usize,
}

/// Local `quill.toml` first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("reading config {}", path.display()));
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                source: Some(path),
                effective_scroll_margin: file.viewport.scroll_margin,
                file,
            };
            cfg.sanitize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn viewport(&self) -> &ViewportConfig {
        &self.file.viewport
    }

    pub fn font(&self) -> &FontConfig {
        &self.file.font
    }

    pub fn highlight(&self) -> &HighlightConfig {
        &self.file.highlight
    }

    pub fn completion(&self) -> &CompletionConfig {
        &self.file.completion
    }

    /// Replace non-positive pixel sizes with defaults.
    fn sanitize(&mut self) {
        let defaults = ConfigFile::default();
        if !(self.file.viewport.line_height > 0.0) {
            warn!(
                target: "config",
                value = self.file.viewport.line_height,
                "line_height_invalid_using_default"
            );
            self.file.viewport.line_height = defaults.viewport.line_height;
        }
        if !(self.file.font.cell_width > 0.0) {
            warn!(
                target: "config",
                value = self.file.font.cell_width,
                "cell_width_invalid_using_default"
            );
            self.file.font.cell_width = defaults.font.cell_width;
        }
    }

    /// Clamp the scroll margin for a page of `page_lines` lines. Returns the
    /// effective value.
    pub fn apply_page_lines(&mut self, page_lines: usize) -> usize {
        let raw = self.file.viewport.scroll_margin;
        let max = if page_lines <= 3 {
            0
        } else {
            (page_lines - 2) / 2
        };
        let clamped = raw.min(max);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max,
                page_lines,
                "scroll_margin_clamped"
            );
        }
        self.effective_scroll_margin = clamped;
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn defaults_when_file_missing() {
        let cfg = load_from(Some(PathBuf::from("__quill_missing__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.viewport().line_height, 20.0);
        assert_eq!(cfg.viewport().overscan, 5);
        assert!(cfg.highlight().enabled);
        assert!(!cfg.completion().enabled);
        assert!(cfg.source.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[viewport]\nline_height = 18.5\noverscan = 2\nscroll_margin = 3\n\
             [font]\ncell_width = 9.0\n\
             [highlight]\nenabled = false\ndebounce_ms = 40\n\
             [completion]\nenabled = true\ndebounce_ms = 500\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.viewport().line_height, 18.5);
        assert_eq!(cfg.viewport().overscan, 2);
        assert_eq!(cfg.viewport().scroll_margin, 3);
        assert_eq!(cfg.font().cell_width, 9.0);
        assert!(!cfg.highlight().enabled);
        assert_eq!(cfg.highlight().debounce(), Duration::from_millis(40));
        assert!(cfg.completion().enabled);
        assert_eq!(cfg.completion().debounce_ms, 500);
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let tmp = write_config("[viewport]\noverscan = 9\nunknown_key = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.viewport().overscan, 9);
        assert_eq!(cfg.viewport().line_height, 20.0);
        assert_eq!(cfg.highlight().debounce_ms, 150);
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = write_config("[viewport\nline_height = ");
        let mut loaded = None;
        let logs = capture_logs(|| {
            loaded = Some(load_from(Some(tmp.path().to_path_buf())).unwrap());
        });
        let cfg = loaded.unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert!(logs.contains("WARN config:"));
        assert!(logs.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn non_positive_sizes_are_replaced() {
        let tmp = write_config("[viewport]\nline_height = 0.0\n[font]\ncell_width = -3.0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.viewport().line_height, 20.0);
        assert_eq!(cfg.font().cell_width, 8.0);
    }

    #[test]
    fn scroll_margin_clamps_to_page() {
        let tmp = write_config("[viewport]\nscroll_margin = 50\n");
        let mut cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        // 20 lines -> max = (20 - 2) / 2 = 9
        assert_eq!(cfg.apply_page_lines(20), 9);
        assert_eq!(cfg.effective_scroll_margin, 9);
        assert_eq!(cfg.apply_page_lines(3), 0);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = write_config("[viewport]\nscroll_margin = 8\n");
        let mut cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let logs = capture_logs(|| {
            cfg.apply_page_lines(6);
        });
        assert!(logs.contains("INFO config:"));
        assert!(logs.contains("scroll_margin_clamped"));
        assert_eq!(cfg.effective_scroll_margin, 2);
    }
}
