use ied_model::ServerError;
use std::borrow::Cow;
use std::collections::TryReserveError;

#[ied_derive::ied_error]
pub enum ControlError {
    /// The binding collection could not grow.
    #[error("Binding allocation failed{}: {source}", format_context(.context))]
    Allocation { source: TryReserveError, context: Option<Cow<'static, str>> },

    /// The server refused a handler installation.
    #[error("Handler installation failed{}: {source}", format_context(.context))]
    Server { source: ServerError, context: Option<Cow<'static, str>> },

    #[error("Internal control error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
