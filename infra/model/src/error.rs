use std::borrow::Cow;

/// Errors raised while building, loading or mutating a device model.
#[ied_derive::ied_error]
pub enum ModelError {
    /// The node id or object reference does not exist in this model.
    #[error("Model node not found{}: {message}", format_context(.context))]
    NodeNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A value operation targeted a node that is not a value-carrying data attribute.
    #[error("Node is not a data attribute{}: {message}", format_context(.context))]
    NotAttribute { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A child was placed under a parent kind that cannot own it.
    #[error("Invalid model hierarchy{}: {message}", format_context(.context))]
    InvalidHierarchy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Node names must be non-empty and free of reference separators.
    #[error("Invalid node name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two siblings share a name.
    #[error("Duplicate node name{}: {message}", format_context(.context))]
    DuplicateName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A literal in the model description does not fit the declared attribute type.
    #[error("Invalid initial value{}: {message}", format_context(.context))]
    InvalidValue { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The JSON model description is malformed.
    #[error("Model description error{}: {source}", format_context(.context))]
    Description { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The model description file could not be read.
    #[error("Model file error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal model error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
