//! Session State
//!
//! The "is authenticated" gate with its persisted flag and idle expiry.
//! The flag survives restarts through a small marker file; the expiry timer
//! is re-armed on every login and cancelled on logout.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default idle time before a session is forcibly closed
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Active,
    /// Closed by the idle timer
    Expired,
}

/// Shared handle to the session gate
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    flag_path: Option<PathBuf>,
    idle_timeout: Duration,
    state: watch::Sender<SessionState>,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Session that never touches the filesystem
    pub fn in_memory(idle_timeout: Duration) -> Self {
        Self::build(None, idle_timeout, SessionState::SignedOut)
    }

    /// Read the persisted flag and resume a previous session if present
    pub fn restore(flag_path: impl Into<PathBuf>, idle_timeout: Duration) -> Self {
        let flag_path = flag_path.into();
        let initial = match std::fs::read_to_string(&flag_path) {
            Ok(content) if content.trim() == "true" => SessionState::Active,
            _ => SessionState::SignedOut,
        };
        tracing::debug!(path = %flag_path.display(), state = ?initial, "session restored");

        let session = Self::build(Some(flag_path), idle_timeout, initial);
        if initial == SessionState::Active {
            session.arm_expiry();
        }
        session
    }

    fn build(flag_path: Option<PathBuf>, idle_timeout: Duration, initial: SessionState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionInner {
                flag_path,
                idle_timeout,
                state,
                expiry: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn login(&self) {
        self.inner.persist(true);
        self.inner.state.send_replace(SessionState::Active);
        self.arm_expiry();
        tracing::info!("session started");
    }

    pub fn logout(&self) {
        self.inner.cancel_expiry();
        self.inner.persist(false);
        self.inner.state.send_replace(SessionState::SignedOut);
        tracing::info!("session ended");
    }

    /// (Re)start the idle timer
    fn arm_expiry(&self) {
        self.inner.cancel_expiry();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, session will not expire");
            return;
        };

        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let timeout = self.inner.idle_timeout;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire();
            }
        });
        *self.inner.expiry.lock() = Some(handle);
    }
}

impl SessionInner {
    fn cancel_expiry(&self) {
        if let Some(handle) = self.expiry.lock().take() {
            handle.abort();
        }
    }

    fn expire(&self) {
        if *self.state.borrow() != SessionState::Active {
            return;
        }
        self.persist(false);
        self.state.send_replace(SessionState::Expired);
        tracing::info!(timeout_secs = self.idle_timeout.as_secs(), "session timed out");
    }

    /// Write or clear the marker file; failures only cost persistence
    fn persist(&self, authenticated: bool) {
        let Some(path) = &self.flag_path else {
            return;
        };
        let result = if authenticated {
            write_flag(path)
        } else {
            match std::fs::remove_file(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        };
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "could not persist session flag");
        }
    }
}

/// Write the marker file, creating its directory first
fn write_flag(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(path, "true")
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.cancel_expiry();
    }
}
