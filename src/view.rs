//! What the widget shows, and a terminal rendering of it.
//!
//! [`WidgetView`] is a plain snapshot of the display rules:
//!
//! - the upload action appears once a file is selected
//! - extracted text appears whenever it is non-empty, even while loading
//! - the analysis, and the report action with it, appear only when the
//!   analysis is non-empty and nothing is loading
//! - at most one of the error or info lines is set
//!
//! [`TerminalRenderer`] turns a snapshot into text for the CLI. Its
//! [`Theme`] belongs to the renderer instance: it is fixed when the
//! renderer is mounted and nothing outside the renderer sees it.

use crate::widget::{UiStatus, WidgetState};
use serde::Serialize;
use std::io::IsTerminal;

pub const TITLE: &str = "Blood Test Analysis AI";
pub const SUBTITLE: &str = "Upload an image of your blood-test results and the AI will analyze it.";
pub const LOADING_TEXT: &str = "Analyzing…";

/// Render-ready snapshot of an [`crate::widget::UploadWidget`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WidgetView {
    pub file_name: Option<String>,
    pub show_upload_action: bool,
    pub loading: bool,
    pub extracted_text: Option<String>,
    pub analysis: Option<String>,
    pub show_report_action: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl WidgetView {
    pub(crate) fn from_state(s: &WidgetState) -> Self {
        let loading = s.status.is_loading();
        let analysis = (!s.analysis.is_empty() && !loading).then(|| s.analysis.clone());
        Self {
            file_name: s.selected.as_ref().map(|f| f.name().to_string()),
            show_upload_action: s.selected.is_some(),
            loading,
            extracted_text: (!s.extracted_text.is_empty()).then(|| s.extracted_text.clone()),
            show_report_action: analysis.is_some(),
            analysis,
            error: s.status.error().map(str::to_string),
            message: match &s.status {
                UiStatus::Info(m) => Some(m.clone()),
                _ => None,
            },
        }
    }
}

/// ANSI styling owned by one [`TerminalRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Colour when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !no_color && std::io::stdout().is_terminal(),
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }
    pub fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }
    pub fn blue(&self, s: &str) -> String {
        self.paint("34", s)
    }
    pub fn dim(&self, s: &str) -> String {
        self.paint("2", s)
    }
    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
    pub fn cyan(&self, s: &str) -> String {
        self.paint("36", s)
    }
}

/// Renders [`WidgetView`] snapshots as terminal text.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    theme: Theme,
}

impl TerminalRenderer {
    /// Mount a renderer with its own theme.
    pub fn mount(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn header(&self) -> String {
        format!(
            "{}\n{}\n",
            self.theme.bold(TITLE),
            self.theme.dim(SUBTITLE)
        )
    }

    pub fn render(&self, view: &WidgetView) -> String {
        let t = &self.theme;
        let mut out = String::new();

        if let Some(ref name) = view.file_name {
            out.push_str(&format!("{} {}\n", t.cyan("File:"), name));
        }
        if view.loading {
            out.push_str(&format!("{}\n", t.dim(LOADING_TEXT)));
        }
        if let Some(ref text) = view.extracted_text {
            out.push_str(&section(t, "Extracted text", text));
        }
        if let Some(ref analysis) = view.analysis {
            out.push_str(&section(t, "Analysis", analysis));
        }
        if let Some(ref e) = view.error {
            out.push_str(&format!("{} {}\n", t.red("✗"), t.red(e)));
        }
        if let Some(ref m) = view.message {
            out.push_str(&format!("{} {}\n", t.green("✔"), t.blue(m)));
        }
        out
    }
}

fn section(t: &Theme, title: &str, body: &str) -> String {
    let mut s = format!("\n{}\n", t.bold(title));
    s.push_str(body.trim_end());
    s.push('\n');
    s
}
