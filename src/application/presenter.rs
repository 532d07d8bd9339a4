//! What the download flow needs from whatever is showing it to the user.
//!
//! The desktop front-end implements these over channels to the `iced` event
//! loop; tests implement them with scripted answers and recorded output.

use std::time::Duration;

/// One question put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: String,
    pub message: String,
    pub default_text: String,
}

pub trait Prompt {
    /// Block until the user answers. `None` means the prompt was dismissed.
    fn ask(&mut self, request: PromptRequest) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
    pub auto_dismiss: Option<Duration>,
}

impl Notice {
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            body: body.into(),
            auto_dismiss: None,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            body: body.into(),
            auto_dismiss: None,
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>, auto_dismiss: Duration) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            body: body.into(),
            auto_dismiss: Some(auto_dismiss),
        }
    }
}

pub trait StatusDisplay {
    /// Transient, human-readable progress text.
    fn progress(&self, text: &str);

    fn notify(&self, notice: Notice);
}
