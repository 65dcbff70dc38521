// ABOUTME: Refresh coordinator that coalesces node change signals into debounced tree refreshes
// ABOUTME: Never lets a narrower request drop a pending ancestor refresh

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

use arbor_logging::{debug, trace};

use crate::debounce::Debouncer;
use crate::node::ExplorerNode;

/// What the coordinator believes is scheduled but not yet fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRefresh {
    /// The whole tree; also the state before the first refresh fires
    WholeTree,
    /// Nothing pending
    Nothing,
    /// A single subtree
    Node(ExplorerNode),
}

/// Outcome of folding a new request into the pending one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coalesce {
    /// Schedule a whole-tree refresh
    WholeTree,
    /// Schedule the requested node, which covers whatever was pending
    Replace(ExplorerNode),
    /// Re-schedule the pending ancestor, which already covers the request
    KeepPending(ExplorerNode),
    /// Fire the pending refresh now, then schedule the requested node
    FlushThen(ExplorerNode),
}

/// Decide how a refresh request for `element` combines with `pending`
pub fn coalesce(pending: &PendingRefresh, element: Option<&ExplorerNode>) -> Coalesce {
    let Some(element) = element else {
        return Coalesce::WholeTree;
    };
    match pending {
        PendingRefresh::WholeTree => Coalesce::WholeTree,
        PendingRefresh::Nothing => Coalesce::Replace(element.clone()),
        PendingRefresh::Node(pending) if element.is_itself_or_ancestor_of(pending) => {
            Coalesce::Replace(element.clone())
        }
        PendingRefresh::Node(pending) if pending.is_itself_or_ancestor_of(element) => {
            Coalesce::KeepPending(pending.clone())
        }
        PendingRefresh::Node(_) => Coalesce::FlushThen(element.clone()),
    }
}

/// Receiver of fired refreshes.
///
/// Called with the coordinator state locked; implementations must not call
/// back into the coordinator.
pub trait RefreshSink: Send + Sync {
    /// Invalidate `element` (`None` = whole tree) and notify observers
    fn fire(&self, element: Option<&ExplorerNode>);
}

struct CoordinatorState {
    pending: PendingRefresh,
    trigger: Debouncer<Option<ExplorerNode>>,
}

struct Shared {
    state: Mutex<CoordinatorState>,
    sink: Arc<dyn RefreshSink>,
}

/// Debounce/coalescing engine in front of a [`RefreshSink`]
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    pub fn new(sink: Arc<dyn RefreshSink>, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CoordinatorState {
                    pending: PendingRefresh::WholeTree,
                    trigger: Debouncer::new(delay),
                }),
                sink,
            }),
        }
    }

    /// Request a refresh of `element` (`None` = whole tree).
    ///
    /// With `debounce` unset the refresh has fired by the time this returns.
    /// Outside a tokio runtime there is no timer to arm, so debounced
    /// requests fire immediately as well.
    pub fn refresh(&self, debounce: bool, element: Option<ExplorerNode>) {
        let mut state = self.shared.state.lock();

        let decision = coalesce(&state.pending, element.as_ref());
        trace!(decision = ?decision, debounce, "Coalescing refresh request");

        let target = match decision {
            Coalesce::WholeTree => {
                state.pending = PendingRefresh::WholeTree;
                None
            }
            Coalesce::Replace(node) => {
                state.pending = PendingRefresh::Node(node.clone());
                Some(node)
            }
            Coalesce::KeepPending(node) => Some(node),
            Coalesce::FlushThen(node) => {
                self.shared.flush_locked(&mut state);
                state.pending = PendingRefresh::Node(node.clone());
                Some(node)
            }
        };

        let epoch = state.trigger.schedule(target);
        if debounce {
            Shared::arm(&self.shared, &mut state, epoch);
        } else {
            self.shared.flush_locked(&mut state);
        }
    }

    /// Fire the scheduled refresh now, if there is one
    pub fn flush(&self) {
        let mut state = self.shared.state.lock();
        self.shared.flush_locked(&mut state);
    }

    /// Recreate the trigger with a new wait, keeping any scheduled refresh
    pub fn set_debounce_delay(&self, delay: Duration) {
        let mut state = self.shared.state.lock();
        if state.trigger.delay() == delay {
            return;
        }
        debug!(delay_ms = delay.as_millis() as u64, "Refresh delay changed");
        if let Some(epoch) = state.trigger.set_delay(delay) {
            Shared::arm(&self.shared, &mut state, epoch);
        }
    }

    pub fn pending(&self) -> PendingRefresh {
        self.shared.state.lock().pending.clone()
    }

    /// Whether a debounced refresh is waiting for its timer
    pub fn is_scheduled(&self) -> bool {
        self.shared.state.lock().trigger.is_pending()
    }

    pub fn delay(&self) -> Duration {
        self.shared.state.lock().trigger.delay()
    }
}

impl Shared {
    fn arm(this: &Arc<Shared>, state: &mut CoordinatorState, epoch: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime for the refresh timer, firing immediately");
            this.flush_locked(state);
            return;
        };

        let delay = state.trigger.delay();
        let weak: Weak<Shared> = Arc::downgrade(this);
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.fire_scheduled(epoch);
            }
        });
        state.trigger.attach_timer(epoch, timer);
    }

    fn fire_scheduled(&self, epoch: u64) {
        let mut state = self.state.lock();
        if let Some(element) = state.trigger.take_if_current(epoch) {
            self.fire_locked(&mut state, element);
        }
    }

    fn flush_locked(&self, state: &mut CoordinatorState) {
        if let Some(element) = state.trigger.take() {
            self.fire_locked(state, element);
        }
    }

    fn fire_locked(&self, state: &mut CoordinatorState, element: Option<ExplorerNode>) {
        match &element {
            Some(node) => debug!(node = %node.identity(), "Refreshing subtree"),
            None => debug!("Refreshing whole tree"),
        }
        self.sink.fire(element.as_ref());
        state.pending = PendingRefresh::Nothing;
    }
}
