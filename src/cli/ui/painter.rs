use owo_colors::{OwoColorize, Style as OwoStyle};

use crate::state::{ConnectionState, ScanState};

/// Applies colour and style to terminal text.
#[derive(Debug)]
pub(crate) struct Painter {
    use_colour: bool,
}

impl Painter {
    /// Creates a painter with explicit colour control.
    pub(crate) fn new(use_colour: bool) -> Self {
        Self { use_colour }
    }

    pub(crate) fn heading<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().bold().cyan())
    }

    pub(crate) fn success<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().bold().green())
    }

    pub(crate) fn warning<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().bold().yellow())
    }

    pub(crate) fn failure<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().bold().red())
    }

    pub(crate) fn muted<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().dimmed())
    }

    pub(crate) fn value<T: AsRef<str>>(&self, text: T) -> String {
        self.paint(text.as_ref(), OwoStyle::new().bold())
    }

    /// Paints a connection state by how usable the link is.
    pub(crate) fn connection_state(&self, state: ConnectionState) -> String {
        let text = state.to_string();
        match state {
            ConnectionState::Connected => self.success(text),
            ConnectionState::Connecting | ConnectionState::Disconnecting => self.warning(text),
            ConnectionState::Error => self.failure(text),
            ConnectionState::Uninitialized | ConnectionState::Disconnected => self.muted(text),
        }
    }

    /// Paints a scan state by discovery progress.
    pub(crate) fn scan_state(&self, state: ScanState) -> String {
        let text = state.to_string();
        match state {
            ScanState::Looked => self.success(text),
            ScanState::Looking => self.warning(text),
            ScanState::Error => self.failure(text),
            ScanState::Ready => self.muted(text),
        }
    }

    /// Paints an optional value, showing `-` when absent.
    pub(crate) fn optional(&self, value: Option<&str>) -> String {
        match value {
            Some(value) => self.value(value),
            None => self.muted("-"),
        }
    }

    fn paint(&self, text: &str, style: OwoStyle) -> String {
        if self.use_colour {
            format!("{}", text.style(style))
        } else {
            text.to_string()
        }
    }
}
