//! Backend session context
//!
//! A [`SessionContext`] owns the backend session id for one chat. It is
//! passed explicitly into every backend call instead of living in global
//! state.
//!
//! # Single-flight creation
//!
//! The cached id sits behind an async mutex that is held while a session is
//! being created. Callers that arrive during creation wait on the same lock
//! and then observe the freshly cached id, so at most one creation request is
//! ever in flight per context.
//!
//! # Call ordering
//!
//! Every backend operation also takes the context's call gate for its whole
//! duration. The gate is a fair (FIFO) async mutex, so operations issued
//! concurrently against one context reach the backend in issue order and an
//! upload started before a question is always finished before that question
//! is sent.

use std::future::Future;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::Result;

/// Owner of the backend session id for one chat
///
/// # Examples
///
/// ```
/// use sheetchat::api::session::SessionContext;
///
/// # tokio_test::block_on(async {
/// let ctx = SessionContext::new();
/// let id = ctx
///     .get_or_create(|| async { Ok("session-1".to_string()) })
///     .await
///     .unwrap();
/// assert_eq!(id, "session-1");
/// assert_eq!(ctx.current().await.as_deref(), Some("session-1"));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct SessionContext {
    id: Mutex<Option<String>>,
    gate: Mutex<()>,
}

/// Proof that the holder owns the context's call gate
///
/// Released on drop.
#[derive(Debug)]
pub struct CallTurn<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl SessionContext {
    /// Create a context with no session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that already holds `id`
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Mutex::new(Some(id.into())),
            gate: Mutex::new(()),
        }
    }

    /// The cached session id, if one exists
    pub async fn current(&self) -> Option<String> {
        self.id.lock().await.clone()
    }

    /// Return the cached id, or run `create` to obtain and cache one
    ///
    /// The lock is held across `create`, so concurrent callers coalesce onto
    /// a single creation. When `create` fails nothing is cached and the error
    /// is returned; the next caller tries again.
    pub async fn get_or_create<F, Fut>(&self, create: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut slot = self.id.lock().await;
        if let Some(id) = slot.as_ref() {
            return Ok(id.clone());
        }

        let id = create().await?;
        tracing::debug!(session_id = %id, "Cached new backend session");
        *slot = Some(id.clone());
        Ok(id)
    }

    /// Adopt a session id returned by the backend
    ///
    /// Empty ids are ignored.
    pub async fn adopt(&self, id: Option<&str>) {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return;
        };

        let mut slot = self.id.lock().await;
        if slot.as_deref() != Some(id) {
            tracing::debug!(session_id = %id, "Backend reassigned session");
            *slot = Some(id.to_string());
        }
    }

    /// Forget the cached session; the next call creates a new one
    pub async fn reset(&self) {
        let mut slot = self.id.lock().await;
        if slot.take().is_some() {
            tracing::debug!("Session reset");
        }
    }

    /// Wait for this context's turn to talk to the backend
    pub async fn begin_call(&self) -> CallTurn<'_> {
        CallTurn {
            _guard: self.gate.lock().await,
        }
    }
}
