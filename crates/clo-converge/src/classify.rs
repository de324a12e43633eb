//! Not-found classification for delete flows
//!
//! A fetch that fails with not-found while waiting for a deletion means the
//! entity is gone, which is exactly what the wait is for. [`UntilGone`] turns
//! that error into a synthetic "deleted" label so the waiter can treat it as
//! the target state. Outside delete flows not-found stays an error.

use crate::source::{Observed, StateSource};
use async_trait::async_trait;
use clo_api::ApiError;
use tracing::debug;

/// Whether an API error means the entity no longer exists
pub fn is_gone(err: &ApiError) -> bool {
    err.is_not_found()
}

/// Wraps a source so that not-found reads as `deleted_label`
///
/// The snapshot is `None` once the entity is gone.
pub struct UntilGone<S> {
    inner: S,
    deleted_label: String,
}

impl<S> UntilGone<S> {
    pub fn new(inner: S, deleted_label: impl Into<String>) -> Self {
        Self {
            inner,
            deleted_label: deleted_label.into(),
        }
    }

    pub fn deleted_label(&self) -> &str {
        &self.deleted_label
    }
}

#[async_trait]
impl<S: StateSource> StateSource for UntilGone<S> {
    type Snapshot = Option<S::Snapshot>;

    async fn fetch(&self) -> clo_api::Result<Observed<Option<S::Snapshot>>> {
        match self.inner.fetch().await {
            Ok(observed) => Ok(Observed::new(observed.state, Some(observed.snapshot))),
            Err(err) if is_gone(&err) => {
                debug!(label = %self.deleted_label, "Entity not found, treating as deleted");
                Ok(Observed::new(self.deleted_label.clone(), None))
            }
            Err(err) => Err(err),
        }
    }
}
