use chrono::{DateTime, Local};

/// How a whole invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    CompletedWithErrors,
    Aborted,
}

impl RunStatus {
    pub fn from_errors(errors_occurred: bool) -> Self {
        if errors_occurred {
            Self::CompletedWithErrors
        } else {
            Self::Success
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Aborted => 1,
            Self::CompletedWithErrors => 2,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "The program successfully finished its execution without any errors.",
            Self::CompletedWithErrors => {
                "The program finished its execution but some errors were raised. Check logs for more info."
            }
            Self::Aborted => {
                "The program was terminated due to a critical error. Check logs for more info."
            }
        }
    }

    /// Status line printed when the process exits.
    pub fn line(self, at: DateTime<Local>) -> String {
        format!("{} - {}", at.format("%Y-%m-%d %H:%M:%S"), self.message())
    }
}
