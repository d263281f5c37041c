use crate::binding::ControlBinding;
use chrono::Utc;
use ied_kernel::diagnostics::{Diagnostic, DiagnosticSink};
use ied_model::{
    AttributeUpdater, CheckHandlerResult, ControlAction, ControlHandlerResult, MmsValue,
};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// The uniform check and operate behaviour shared by every binding.
#[derive(Clone)]
pub struct ControlAdapter {
    updater: AttributeUpdater,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ControlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlAdapter").field("ied", &self.updater.model().name()).finish_non_exhaustive()
    }
}

impl ControlAdapter {
    #[must_use]
    pub fn new(updater: AttributeUpdater, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { updater, sink }
    }

    /// Every request passes the check; no interlocking is modelled.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn perform_check(
        &self,
        action: &ControlAction,
        _ctl_val: &MmsValue,
        test: bool,
    ) -> CheckHandlerResult {
        trace!(action = %action.kind(), test, "Control check accepted");
        CheckHandlerResult::Accepted
    }

    /// Applies an operate request to the binding's status attribute.
    ///
    /// `binding` is `None` once the registry has been released; such requests fail.
    /// A status write the model refuses is logged and the request still succeeds.
    pub fn control(
        &self,
        action: &ControlAction,
        binding: Option<&ControlBinding>,
        ctl_val: &MmsValue,
        test: bool,
    ) -> ControlHandlerResult {
        let Some(binding) = binding else {
            debug!(action = %action.kind(), "Control request without a live binding");
            return ControlHandlerResult::Failed;
        };

        if test {
            debug!(path = %binding.path(), "Test-mode control, nothing applied");
            return ControlHandlerResult::Ok;
        }
        if action.is_select() {
            debug!(path = %binding.path(), ctl_num = action.ctl_num(), "Select accepted");
            return ControlHandlerResult::Ok;
        }

        if let Err(err) = self.updater.update_attribute_value(binding.status(), ctl_val.clone()) {
            error!(path = %binding.path(), error = %err, "Failed to apply control value");
        }
        if let Some(timestamp) = binding.timestamp()
            && let Err(err) = self.updater.update_utc_time(timestamp, Utc::now())
        {
            error!(path = %binding.path(), error = %err, "Failed to stamp control time");
        }

        debug!(path = %binding.path(), value = %ctl_val, ctl_num = action.ctl_num(), "Control applied");
        self.sink.emit(Diagnostic::ControlUpdate { path: binding.path() });
        ControlHandlerResult::Ok
    }
}
