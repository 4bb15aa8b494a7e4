use async_trait::async_trait;
use rc_schemas::{Error, Paste};
use uuid::Uuid;

/// Durable `paste_id -> Paste` mapping.
#[async_trait]
pub trait PasteStore: Send + Sync {
    /// Insert a new paste. Fails with [`Error::Validation`] if `id` already exists.
    async fn save(&self, paste: &Paste) -> Result<(), Error>;

    /// Replace all mutable columns of the row identified by `paste.id`,
    /// stamping `updated_at` to the current time. Fails with
    /// [`Error::NotFound`] if the row is absent.
    async fn update(&self, paste: &Paste) -> Result<(), Error>;

    /// Fetch a paste by id, or [`Error::NotFound`].
    async fn get_by_id(&self, id: Uuid) -> Result<Paste, Error>;
}

/// FIFO of paste ids awaiting judgement, with exclusive-claim dequeue.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a queue entry stamped with the current time. Idempotent from
    /// the queue's point of view: duplicate entries are tolerated.
    async fn enqueue(&self, paste_id: Uuid) -> Result<(), Error>;

    /// Atomically claim and remove the oldest entry, returning the paste it
    /// references. Returns `Ok(None)` when the queue is empty. Under
    /// concurrent callers each entry is returned to exactly one caller.
    async fn dequeue(&self) -> Result<Option<Paste>, Error>;
}

/// Combined capability surface a worker pool or HTTP adapter depends on.
///
/// `supports_queue` lets a caller refuse to start rather than discover at
/// runtime that the configured backend never dispatches anything.
pub trait Store: PasteStore + TaskQueue {
    fn supports_queue(&self) -> bool {
        true
    }
}
