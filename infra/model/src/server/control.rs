use crate::value::MmsValue;
use std::sync::Arc;

/// Phase of a select-before-operate exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ControlActionKind {
    Select,
    Operate,
}

/// A decoded control request as handed to check and operate handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlAction {
    kind: ControlActionKind,
    ctl_num: u8,
}

impl ControlAction {
    #[must_use]
    pub const fn select() -> Self {
        Self { kind: ControlActionKind::Select, ctl_num: 0 }
    }

    #[must_use]
    pub const fn operate() -> Self {
        Self { kind: ControlActionKind::Operate, ctl_num: 0 }
    }

    /// Sequence number echoed in the client's `ctlNum`.
    #[must_use]
    pub const fn with_ctl_num(mut self, ctl_num: u8) -> Self {
        self.ctl_num = ctl_num;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ControlActionKind {
        self.kind
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self.kind, ControlActionKind::Select)
    }

    #[must_use]
    pub const fn ctl_num(&self) -> u8 {
        self.ctl_num
    }
}

/// Verdict of the perform-check stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CheckHandlerResult {
    Accepted,
    ObjectAccessDenied,
}

/// Verdict of the operate stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ControlHandlerResult {
    Ok,
    Failed,
}

/// What a dispatched control request ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The check handler refused; the operate handler never ran.
    Rejected(CheckHandlerResult),
    Completed(ControlHandlerResult),
}

/// Check handler: `(action, ctl_val, test)`.
pub type CheckHandler =
    Arc<dyn Fn(&ControlAction, &MmsValue, bool) -> CheckHandlerResult + Send + Sync + 'static>;

/// Operate handler: `(action, ctl_val, test)`.
pub type ControlHandler =
    Arc<dyn Fn(&ControlAction, &MmsValue, bool) -> ControlHandlerResult + Send + Sync + 'static>;
