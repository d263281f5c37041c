mod control;
mod error;
mod updater;

pub use control::{
    CheckHandler, CheckHandlerResult, ControlAction, ControlActionKind, ControlHandler,
    ControlHandlerResult, ControlOutcome,
};
pub use error::{ServerError, ServerErrorExt};
pub use updater::AttributeUpdater;

use crate::model::IedModel;
use crate::node::NodeId;
use crate::value::MmsValue;
use error::Result;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Default, Clone)]
struct ControlHandlers {
    check: Option<CheckHandler>,
    operate: Option<ControlHandler>,
}

struct Listener {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

struct ServerInner {
    model: Arc<IedModel>,
    handlers: RwLock<FxHashMap<NodeId, ControlHandlers>>,
    dispatch: Mutex<()>,
    listener: Mutex<Option<Listener>>,
    running: AtomicBool,
}

/// In-process IEC 61850 server handle.
///
/// Owns the control-handler table of a model, serialises control dispatch and
/// manages the listen socket. Clones share the same server.
#[derive(Clone)]
pub struct IedServer {
    inner: Arc<ServerInner>,
}

impl std::fmt::Debug for IedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IedServer")
            .field("ied", &self.inner.model.name())
            .field("controls", &self.inner.handlers.read().len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl IedServer {
    /// Creates a server for `model`.
    ///
    /// # Errors
    /// [`ServerError::Construction`] if the model has no logical device.
    pub fn new(model: Arc<IedModel>) -> Result<Self> {
        if model.logical_devices().is_empty() {
            return Err(ServerError::Construction {
                message: format!("model '{}' has no logical devices", model.name()).into(),
                context: None,
            });
        }

        debug!(ied = %model.name(), nodes = model.len(), "IED server created");
        Ok(Self {
            inner: Arc::new(ServerInner {
                model,
                handlers: RwLock::new(FxHashMap::default()),
                dispatch: Mutex::new(()),
                listener: Mutex::new(None),
                running: AtomicBool::new(false),
            }),
        })
    }

    #[must_use]
    pub fn model(&self) -> &Arc<IedModel> {
        &self.inner.model
    }

    /// A detached handle to the attribute update API.
    #[must_use]
    pub fn updater(&self) -> AttributeUpdater {
        AttributeUpdater::new(Arc::clone(&self.inner.model))
    }

    pub fn set_perform_check_handler<F>(&self, data_object: NodeId, handler: F) -> Result<()>
    where
        F: Fn(&ControlAction, &MmsValue, bool) -> CheckHandlerResult + Send + Sync + 'static,
    {
        self.ensure_data_object(data_object)?;
        self.inner.handlers.write().entry(data_object).or_default().check = Some(Arc::new(handler));
        Ok(())
    }

    pub fn set_control_handler<F>(&self, data_object: NodeId, handler: F) -> Result<()>
    where
        F: Fn(&ControlAction, &MmsValue, bool) -> ControlHandlerResult + Send + Sync + 'static,
    {
        self.ensure_data_object(data_object)?;
        self.inner.handlers.write().entry(data_object).or_default().operate =
            Some(Arc::new(handler));
        Ok(())
    }

    /// Data objects that carry an operate handler.
    #[must_use]
    pub fn controllable_objects(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .inner
            .handlers
            .read()
            .iter()
            .filter(|(_, h)| h.operate.is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Runs a control request against the data object at `reference`.
    ///
    /// The check handler runs first, if installed; anything but
    /// [`CheckHandlerResult::Accepted`] ends the request. Requests are
    /// serialised across all data objects.
    pub fn dispatch_control(
        &self,
        reference: &str,
        action: &ControlAction,
        ctl_val: &MmsValue,
        test: bool,
    ) -> Result<ControlOutcome> {
        let id = self
            .inner
            .model
            .resolve(reference)
            .filter(|id| self.inner.model.node(*id).is_some_and(|n| n.is_data_object()))
            .ok_or_else(|| ServerError::NotControllable {
                message: reference.to_owned().into(),
                context: Some("no such data object".into()),
            })?;

        let handlers = self.inner.handlers.read().get(&id).cloned().unwrap_or_default();
        let operate = handlers.operate.ok_or_else(|| ServerError::NotControllable {
            message: reference.to_owned().into(),
            context: None,
        })?;

        let _serial = self.inner.dispatch.lock();

        if let Some(check) = handlers.check {
            let verdict = check(action, ctl_val, test);
            if verdict != CheckHandlerResult::Accepted {
                debug!(reference, %verdict, action = %action.kind(), "Control rejected by check");
                return Ok(ControlOutcome::Rejected(verdict));
            }
        }

        let result = operate(action, ctl_val, test);
        debug!(reference, %result, action = %action.kind(), test, "Control dispatched");
        Ok(ControlOutcome::Completed(result))
    }

    /// Binds the listen socket on `address:port` and starts accepting associations.
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn start(&self, address: &str, port: u16) -> Result<SocketAddr> {
        if self.is_running() {
            return Err(ServerError::AlreadyRunning {
                message: self.inner.model.name().to_owned().into(),
                context: None,
            });
        }

        let listener = TcpListener::bind((address, port))
            .await
            .context(format!("binding {address}:{port}"))?;
        let local_addr = listener.local_addr().context("reading bound address")?;

        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(accept_loop(listener, stopped));

        let previous =
            self.inner.listener.lock().replace(Listener { stop, task, local_addr });
        if let Some(previous) = previous {
            previous.task.abort();
        }
        self.inner.running.store(true, Ordering::Release);

        info!(%local_addr, ied = %self.inner.model.name(), "IED server listening");
        Ok(local_addr)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.listener.lock().as_ref().map(|l| l.local_addr)
    }

    /// Stops accepting associations and releases the listen socket.
    pub async fn stop(&self) {
        let listener = self.inner.listener.lock().take();
        self.inner.running.store(false, Ordering::Release);

        let Some(listener) = listener else {
            return;
        };

        let _ = listener.stop.send(());
        if let Err(err) = listener.task.await
            && !err.is_cancelled()
        {
            error!(error = %err, "Accept loop terminated abnormally");
        }
        info!(local_addr = %listener.local_addr, "IED server stopped");
    }

    fn ensure_data_object(&self, id: NodeId) -> Result<()> {
        match self.inner.model.node(id) {
            Some(node) if node.is_data_object() => Ok(()),
            Some(node) => Err(ServerError::NotControllable {
                message: node.name().to_owned().into(),
                context: Some("handlers attach to data objects only".into()),
            }),
            None => Err(ServerError::NotControllable {
                message: id.to_string().into(),
                context: Some("unknown node".into()),
            }),
        }
    }
}

impl Drop for ServerInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.task.abort();
        }
    }
}

/// Associations are accepted and dropped; protocol decoding happens elsewhere.
async fn accept_loop(listener: TcpListener, mut stopped: oneshot::Receiver<()>) {
    loop {
        tokio::select! {
            _ = &mut stopped => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!(%peer, "Association accepted");
                    drop(stream);
                },
                Err(err) => warn!(error = %err, "Accept failed"),
            },
        }
    }
}
