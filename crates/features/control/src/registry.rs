use crate::adapter::ControlAdapter;
use crate::binding::ControlBinding;
use crate::error::{ControlErrorExt, Result};
use crate::walker::ModelWalker;
use ied_domain::constants::{OPERATE, STATUS_VALUE, TIMESTAMP};
use ied_kernel::diagnostics::{Diagnostic, DiagnosticSink};
use ied_model::{FunctionalConstraint, IedServer, NodeId};
use std::sync::Arc;
use tracing::{debug, info};

/// All control bindings of one served model.
///
/// Built by a single walk over the model in [`BindingRegistry::build`]; the
/// registry is read-only afterwards and there is no way to register more
/// points later:
///
/// ```compile_fail,E0624
/// # use ied_control::{BindingRegistry, ControlAdapter};
/// # use ied_kernel::diagnostics::MemorySink;
/// # use ied_model::{IedServer, NodeId};
/// # use std::sync::Arc;
/// # fn extend(registry: &mut BindingRegistry, server: &IedServer, id: NodeId) {
/// let sink = Arc::new(MemorySink::new());
/// let adapter = ControlAdapter::new(server.updater(), sink.clone());
/// let _ = registry.register(server, &adapter, sink.as_ref(), id);
/// # }
/// ```
///
/// Handlers installed on the server hold weak references to their bindings,
/// so dropping the registry turns every later operate request into a failure.
#[derive(Debug)]
pub struct BindingRegistry {
    bindings: Vec<Arc<ControlBinding>>,
}

impl BindingRegistry {
    /// Discovers every controllable data object of the server's model and
    /// installs the check and operate handlers for it.
    ///
    /// # Errors
    /// [`crate::ControlError::Allocation`] if the binding collection cannot grow,
    /// [`crate::ControlError::Server`] if the server rejects a handler.
    pub fn build(server: &IedServer, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        let adapter = ControlAdapter::new(server.updater(), Arc::clone(&sink));
        let model = Arc::clone(server.model());
        let walker = ModelWalker::new(&model);

        let mut registry = Self { bindings: Vec::new() };
        let mut visited = 0;
        for &device in model.logical_devices() {
            visited += walker.traverse(device, |object| {
                registry.register(server, &adapter, sink.as_ref(), object)
            })?;
        }

        info!(
            ied = %model.name(),
            visited,
            bindings = registry.len(),
            "Control binding registration finished"
        );
        sink.emit(Diagnostic::RegisteredTotal { count: registry.len() });
        Ok(registry)
    }

    fn register(
        &mut self,
        server: &IedServer,
        adapter: &ControlAdapter,
        sink: &dyn DiagnosticSink,
        object: NodeId,
    ) -> Result<()> {
        let model = server.model();
        let lookup = |name: &str, fc: FunctionalConstraint| {
            model.child_with_fc(object, name, fc).or_else(|| model.child(object, name))
        };

        let (Some(_), Some(status)) =
            (lookup(OPERATE, FunctionalConstraint::Co), lookup(STATUS_VALUE, FunctionalConstraint::St))
        else {
            return Ok(());
        };
        let timestamp = lookup(TIMESTAMP, FunctionalConstraint::St);

        let path = model
            .object_reference(object)
            .unwrap_or_else(|| model.node(object).map(|n| n.name().to_owned()).unwrap_or_default());

        self.bindings.try_reserve(1).context(format!("registering {path}"))?;
        let binding = Arc::new(ControlBinding::new(object, status, timestamp, &path));

        let check = adapter.clone();
        server
            .set_perform_check_handler(object, move |action, value, test| {
                check.perform_check(action, value, test)
            })
            .context("installing check handler")?;

        let operate = adapter.clone();
        let weak = Arc::downgrade(&binding);
        server
            .set_control_handler(object, move |action, value, test| {
                operate.control(action, weak.upgrade().as_deref(), value, test)
            })
            .context("installing control handler")?;

        debug!(path = %binding.path(), has_timestamp = timestamp.is_some(), "Control binding registered");
        sink.emit(Diagnostic::Registered { path: binding.path() });
        self.bindings.push(binding);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ControlBinding> {
        self.bindings.iter().map(AsRef::as_ref)
    }

    /// Binding of a control point.
    #[must_use]
    pub fn get(&self, control_point: NodeId) -> Option<&ControlBinding> {
        self.iter().find(|b| b.control_point() == control_point)
    }

    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<&ControlBinding> {
        self.iter().find(|b| b.path() == path)
    }

    /// Drops every binding; handlers still installed on the server fail from now on.
    pub fn release(self) {
        info!(bindings = self.bindings.len(), "Releasing control bindings");
    }
}
