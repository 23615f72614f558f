use log::{error, info};

use mpt_core::model::SessionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short user-facing message, shown as a toast by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Presentation hooks the quiz controller reports to.
pub trait QuizEvents: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Called once per scored session that clears the celebration threshold.
    fn celebrate(&self, result: &SessionResult);
}

/// Forwards events to the `log` facade. Used when no presentation layer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvents;

impl QuizEvents for LogEvents {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", notice.message),
        }
    }

    fn celebrate(&self, result: &SessionResult) {
        let totals = result.totals();
        info!(
            "{}: {} of {} right",
            result.subject(),
            totals.right,
            totals.total()
        );
    }
}
