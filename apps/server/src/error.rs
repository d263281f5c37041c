use ied_control::ControlError;
use ied_kernel::config::ConfigError;
use ied_logger::LoggerError;
use ied_model::{ModelError, ServerError};
use std::borrow::Cow;

/// Exit status for startup failures other than binding the listen socket.
pub const EXIT_STARTUP: u8 = 1;
/// Exit status when the listen socket cannot be bound.
pub const EXIT_LISTEN: u8 = 2;

/// Failures that end the process before or while serving.
#[ied_derive::ied_error]
pub enum LaunchError {
    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Logger error{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },

    /// The device model could not be read or is invalid.
    #[error("Model error{}: {source}", format_context(.context))]
    Model { source: ModelError, context: Option<Cow<'static, str>> },

    /// The server refused the model.
    #[error("Server error{}: {source}", format_context(.context))]
    Server { source: ServerError, context: Option<Cow<'static, str>> },

    /// Control bindings could not be installed.
    #[error("Control registration failed{}: {source}", format_context(.context))]
    Control { source: ControlError, context: Option<Cow<'static, str>> },

    #[error("Failed to start server{}: {source}", format_context(.context))]
    Listen { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl LaunchError {
    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Listen { .. } => EXIT_LISTEN,
            _ => EXIT_STARTUP,
        }
    }

    /// Splits a start failure into a listen failure and everything else.
    pub(crate) fn from_start(err: ServerError) -> Self {
        match err {
            ServerError::Listen { source, context } => Self::Listen { source, context },
            other => Self::Server { source: other, context: Some("starting server".into()) },
        }
    }
}
