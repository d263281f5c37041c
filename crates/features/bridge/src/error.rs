use std::borrow::Cow;

#[ied_derive::ied_error]
pub enum BridgeError {
    /// Reading the command stream failed.
    #[error("Bridge input error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal bridge error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
