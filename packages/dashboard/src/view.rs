//! Dashboard view handle and the source fan-out shared by every role.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::scope::{ScopeToken, ViewScope};
use crate::slot::Slot;

/// A view model assembled from independently fetched slots.
pub trait ViewModel: Clone + Send + Sync + 'static {
    /// `true` once every slot has settled.
    fn is_settled(&self) -> bool;
}

/// Builds a view: owns the sender until every source has been issued.
pub(crate) struct ViewBuilder<M> {
    scope: ViewScope,
    tx: Arc<watch::Sender<M>>,
    rx: watch::Receiver<M>,
    tasks: Vec<JoinHandle<()>>,
}

impl<M: ViewModel + Default> ViewBuilder<M> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = watch::channel(M::default());
        Self {
            scope: ViewScope::new(),
            tx: Arc::new(tx),
            rx,
            tasks: Vec::new(),
        }
    }

    /// Issues one source fetch. Its settled slot is handed to `write` on
    /// completion, unless the view has been torn down by then.
    pub(crate) fn source<T, F, W>(&mut self, name: &'static str, fetch: F, write: W)
    where
        T: Send + 'static,
        F: Future<Output = Slot<T>> + Send + 'static,
        W: FnOnce(&mut M, Slot<T>) + Send + 'static,
    {
        let token = self.scope.token();
        let tx = Arc::clone(&self.tx);

        log::debug!("Fetching {name}");
        self.tasks.push(tokio::spawn(async move {
            let slot = fetch.await;
            deliver(&token, &tx, name, slot, write);
        }));
    }

    /// Finishes the view. The builder's sender is dropped here so the
    /// channel closes once the last source completes.
    pub(crate) fn build(self) -> DashboardView<M> {
        DashboardView {
            scope: self.scope,
            rx: self.rx,
            tasks: self.tasks,
        }
    }
}

fn deliver<M, T, W>(
    token: &ScopeToken,
    tx: &watch::Sender<M>,
    name: &'static str,
    slot: Slot<T>,
    write: W,
) where
    W: FnOnce(&mut M, Slot<T>),
{
    if token.is_active() {
        tx.send_modify(|model| write(model, slot));
    } else {
        log::debug!("Dropping {name} result for a closed view");
    }
}

/// An activated dashboard.
///
/// Readers render from [`DashboardView::snapshot`] at any time; slots fill
/// in as their sources complete. Dropping the view (or calling
/// [`DashboardView::teardown`]) closes its scope so late results are
/// discarded.
#[derive(Debug)]
pub struct DashboardView<M> {
    scope: ViewScope,
    rx: watch::Receiver<M>,
    tasks: Vec<JoinHandle<()>>,
}

impl<M: ViewModel> DashboardView<M> {
    /// Current, possibly partial, view model.
    #[must_use]
    pub fn snapshot(&self) -> M {
        self.rx.borrow().clone()
    }

    /// A receiver notified on every slot update.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<M> {
        self.rx.clone()
    }

    /// Waits for the next slot update. Returns `false` once every source
    /// has completed and no further updates can arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until every slot has settled and returns the final model.
    pub async fn settled(&mut self) -> M {
        loop {
            {
                let model = self.rx.borrow_and_update();
                if model.is_settled() {
                    return model.clone();
                }
            }
            if self.rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Whether the view is still accepting results.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scope.is_active()
    }

    /// Closes the view. Fetches already issued keep running to
    /// completion; their handles are returned for callers that want to
    /// wait on them.
    #[must_use]
    pub fn teardown(mut self) -> Vec<JoinHandle<()>> {
        self.scope.close();
        std::mem::take(&mut self.tasks)
    }
}
