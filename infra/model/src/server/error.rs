use crate::error::ModelError;
use std::borrow::Cow;

#[ied_derive::ied_error]
pub enum ServerError {
    /// The server refuses to serve a model without logical devices.
    #[error("Server construction failed{}: {message}", format_context(.context))]
    Construction { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Server already running{}: {message}", format_context(.context))]
    AlreadyRunning { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The listen socket could not be bound.
    #[error("Listen failed{}: {source}", format_context(.context))]
    Listen { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// No control handler is installed for the addressed data object.
    #[error("Data object is not controllable{}: {message}", format_context(.context))]
    NotControllable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Model error{}: {source}", format_context(.context))]
    Model { source: ModelError, context: Option<Cow<'static, str>> },

    #[error("Internal server error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
