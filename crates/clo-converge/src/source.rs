//! What a wait observes: entity references, snapshots and the fetch capability

use async_trait::async_trait;

/// Kind of a remote entity whose state is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Server,
    Volume,
    Address,
    StorageUser,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Server => write!(f, "server"),
            EntityKind::Volume => write!(f, "volume"),
            EntityKind::Address => write!(f, "address"),
            EntityKind::StorageUser => write!(f, "storage-user"),
        }
    }
}

/// Identifier of a remote entity plus its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn server(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Server, id)
    }

    pub fn volume(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Volume, id)
    }

    pub fn address(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Address, id)
    }

    pub fn storage_user(id: impl Into<String>) -> Self {
        Self::new(EntityKind::StorageUser, id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// One fetched snapshot together with its state label
#[derive(Debug, Clone, PartialEq)]
pub struct Observed<T> {
    pub state: String,
    pub snapshot: T,
}

impl<T> Observed<T> {
    pub fn new(state: impl Into<String>, snapshot: T) -> Self {
        Self {
            state: state.into(),
            snapshot,
        }
    }
}

/// Fetches the current state of one remote entity
///
/// Implementations decide how the label is derived from the API response
/// (as returned, uppercased, empty mapped to a default). The waiter compares
/// the label verbatim.
#[async_trait]
pub trait StateSource: Send + Sync {
    type Snapshot: Send;

    async fn fetch(&self) -> clo_api::Result<Observed<Self::Snapshot>>;
}

#[async_trait]
impl<T: StateSource> StateSource for &T {
    type Snapshot = T::Snapshot;

    async fn fetch(&self) -> clo_api::Result<Observed<Self::Snapshot>> {
        (**self).fetch().await
    }
}
