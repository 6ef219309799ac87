use std::sync::Arc;

use model::Criteria;
use tokio::sync::watch;
use tracing::debug;

use crate::event::StoreEvent;
use crate::reducer::reduce;
use crate::state::FetchState;

/// Snapshot taken when a fetch cycle starts: the criteria the requests are
/// built from and the generation their results must carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchTicket {
    pub generation: u64,
    pub criteria: Criteria,
}

/// Shared handle to the transactions state.
///
/// Cloning is cheap and every clone sees the same state. Writers go through
/// [`TransactionsStore::dispatch`], which applies [`reduce`] and notifies
/// subscribers.
#[derive(Debug, Clone)]
pub struct TransactionsStore {
    sender: Arc<watch::Sender<FetchState>>,
}

impl Default for TransactionsStore {
    fn default() -> Self {
        Self::new(Criteria::default())
    }
}

impl TransactionsStore {
    pub fn new(criteria: Criteria) -> Self {
        let (sender, _) = watch::channel(FetchState::with_criteria(criteria));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn dispatch(&self, event: StoreEvent) {
        debug!("Dispatching {}", event.name());
        self.sender.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, event);
        });
    }

    /// Starts a new fetch cycle and returns what its requests must be built
    /// from.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut ticket = FetchTicket::default();
        self.sender.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, StoreEvent::FetchStarted);
            ticket = FetchTicket {
                generation: state.generation,
                criteria: state.criteria.clone(),
            };
        });
        debug!("Fetch cycle {} started", ticket.generation);
        ticket
    }

    /// Copy of the current state.
    pub fn state(&self) -> FetchState {
        self.sender.borrow().clone()
    }

    pub fn criteria(&self) -> Criteria {
        self.sender.borrow().criteria.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.sender.subscribe()
    }

    /// Waits until neither track has a request in flight and returns that
    /// state.
    pub async fn settled(&self) -> FetchState {
        let mut receiver = self.subscribe();
        match receiver.wait_for(FetchState::is_settled).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.state(),
        }
    }
}
