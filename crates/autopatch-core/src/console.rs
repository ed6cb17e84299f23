//! Human-readable run output

use std::sync::Mutex;

/// Console lines for the operator
///
/// These are not log events: they are printed regardless of the tracing
/// filter. A capturing console keeps the lines instead, for tests.
#[derive(Debug, Default)]
pub struct Console {
    captured: Option<Mutex<Vec<String>>>,
}

impl Console {
    /// Console printing to stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self { captured: None }
    }

    /// Console recording lines in memory
    #[must_use]
    pub fn capture() -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        match &self.captured {
            Some(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.extend(text.as_ref().lines().map(str::to_string));
                }
            }
            None => println!("{}", text.as_ref()),
        }
    }

    /// Lines recorded so far (empty for a stdout console)
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .and_then(|lines| lines.lock().ok().map(|l| l.clone()))
            .unwrap_or_default()
    }
}
