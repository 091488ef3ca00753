//! Catalog Application State
//!
//! `Catalog` ties the entity store, the remote backend and the session
//! together. Command handlers live in `crate::commands` as further
//! `impl Catalog` blocks.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{BackendMode, CatalogConfig, ReassignFailurePolicy};
use crate::domain::{DomainError, DomainResult, ItemId};
use crate::repository::{CatalogBackend, HttpBackend, LocalBackend};
use crate::session::{Session, SessionState};
use crate::store::{CatalogState, EntityStore};

const EVENT_CAPACITY: usize = 64;

/// Notifications for whoever renders the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// Initial (or retried) load finished
    DataLoaded { categories: usize, items: usize },
    /// A CRUD command failed; the message is meant for a blocking alert
    Alert(String),
    /// The remote rejected a reassignment that was already applied locally
    SyncFailed {
        item_id: ItemId,
        message: String,
        reverted: bool,
    },
    SessionExpired,
}

/// Progress of the bulk load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Load failed; calling `fetch_data` again retries
    Failed(String),
}

/// Shared handle to the whole catalog
#[derive(Clone)]
pub struct Catalog {
    pub(crate) backend: Arc<dyn CatalogBackend>,
    pub(crate) store: Arc<EntityStore>,
    pub(crate) session: Session,
    pub(crate) policy: ReassignFailurePolicy,
    events: broadcast::Sender<CatalogEvent>,
    last_error: Arc<Mutex<Option<String>>>,
    load_state: Arc<Mutex<LoadState>>,
}

impl Catalog {
    pub fn new(backend: Arc<dyn CatalogBackend>, session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            store: Arc::new(EntityStore::default()),
            session,
            policy: ReassignFailurePolicy::default(),
            events,
            last_error: Arc::new(Mutex::new(None)),
            load_state: Arc::new(Mutex::new(LoadState::Idle)),
        }
    }

    pub fn with_policy(mut self, policy: ReassignFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build backend and session from configuration
    pub fn from_config(config: &CatalogConfig) -> DomainResult<Self> {
        let backend: Arc<dyn CatalogBackend> = match config.mode {
            BackendMode::Remote => Arc::new(HttpBackend::new(&config.base_url)?),
            BackendMode::Local => Arc::new(LocalBackend::seeded()),
        };
        let session = Session::restore(&config.session_file, config.session_timeout());
        tracing::info!(backend = %backend.describe(), "catalog configured");

        Ok(Self::new(backend, session).with_policy(config.reassign_failure))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Current catalog contents
    pub fn snapshot(&self) -> Arc<CatalogState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.lock().clone()
    }

    /// Message of the most recent failure, cleared by a successful load
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn clear_error(&self) {
        *self.last_error.lock() = None;
    }

    // ========================
    // Loading
    // ========================

    /// Load both collections concurrently and replace the store contents.
    ///
    /// Does nothing while signed out. A failure leaves the store as it was.
    pub async fn fetch_data(&self) -> LoadState {
        if !self.session.is_authenticated() {
            tracing::debug!("not authenticated, skipping load");
            return self.load_state();
        }

        self.set_load_state(LoadState::Loading);
        let result = tokio::try_join!(self.backend.categories().list(), self.backend.items().list());

        let state = match result {
            Ok((categories, items)) => {
                let counts = (categories.len(), items.len());
                self.store.replace_all(categories, items);
                self.clear_error();
                tracing::info!(categories = counts.0, items = counts.1, "catalog loaded");
                self.emit(CatalogEvent::DataLoaded {
                    categories: counts.0,
                    items: counts.1,
                });
                LoadState::Ready
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog load failed");
                let message = e.to_string();
                *self.last_error.lock() = Some(message.clone());
                LoadState::Failed(message)
            }
        };
        self.set_load_state(state.clone());
        state
    }

    fn set_load_state(&self, state: LoadState) {
        *self.load_state.lock() = state;
    }

    // ========================
    // Session
    // ========================

    /// Forward session expiry as `CatalogEvent::SessionExpired`
    pub fn watch_session(&self) -> JoinHandle<()> {
        let mut changes = self.session.subscribe();
        let events = self.events.clone();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let state = *changes.borrow_and_update();
                if state == SessionState::Expired {
                    let _ = events.send(CatalogEvent::SessionExpired);
                }
            }
        })
    }

    // ========================
    // Failure reporting
    // ========================

    pub(crate) fn emit(&self, event: CatalogEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Record a failed command and raise an alert
    pub(crate) fn report(&self, action: &str, error: &DomainError) {
        tracing::error!(action, error = %error, "command failed");
        let message = format!("Failed to {}: {}", action, error);
        *self.last_error.lock() = Some(message.clone());
        self.emit(CatalogEvent::Alert(message));
    }

    /// Surface a validation problem; nothing was attempted
    pub(crate) fn reject(&self, error: DomainError) -> DomainError {
        tracing::debug!(error = %error, "input rejected");
        self.emit(CatalogEvent::Alert(error.to_string()));
        error
    }
}
