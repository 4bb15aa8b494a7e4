use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rc_schemas::{Error, Paste};
use uuid::Uuid;

use crate::store::{PasteStore, Store, TaskQueue};

/// Single-process, non-durable backend. Valid for `PasteStore`; the queue
/// side is present only to satisfy the trait and always reports empty, so a
/// worker pool must check [`Store::supports_queue`] before relying on it.
#[derive(Default)]
pub struct MemoryStore {
    pastes: RwLock<HashMap<Uuid, Paste>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PasteStore for MemoryStore {
    async fn save(&self, paste: &Paste) -> Result<(), Error> {
        let mut map = self.pastes.write().expect("memory store lock poisoned");
        if map.contains_key(&paste.id) {
            return Err(Error::Validation(format!("paste {} already exists", paste.id)));
        }
        map.insert(paste.id, paste.clone());
        Ok(())
    }

    async fn update(&self, paste: &Paste) -> Result<(), Error> {
        let mut map = self.pastes.write().expect("memory store lock poisoned");
        if !map.contains_key(&paste.id) {
            return Err(Error::NotFound);
        }
        let mut updated = paste.clone();
        updated.touch();
        map.insert(updated.id, updated);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Paste, Error> {
        let map = self.pastes.read().expect("memory store lock poisoned");
        map.get(&id).cloned().ok_or(Error::NotFound)
    }
}

#[async_trait]
impl TaskQueue for MemoryStore {
    async fn enqueue(&self, _paste_id: Uuid) -> Result<(), Error> {
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Paste>, Error> {
        Ok(None)
    }
}

impl Store for MemoryStore {
    fn supports_queue(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_schemas::LANGUAGE_CPP20;

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = MemoryStore::new();
        let paste = Paste::new("int main(){}".into(), LANGUAGE_CPP20.into(), String::new());
        store.save(&paste).await.unwrap();

        let fetched = store.get_by_id(paste.id).await.unwrap();
        assert_eq!(fetched.id, paste.id);
        assert_eq!(fetched.code, paste.code);
    }

    #[tokio::test]
    async fn save_duplicate_id_fails() {
        let store = MemoryStore::new();
        let paste = Paste::new("x".into(), LANGUAGE_CPP20.into(), String::new());
        store.save(&paste).await.unwrap();
        assert!(matches!(store.save(&paste).await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn update_advances_updated_at() {
        let store = MemoryStore::new();
        let paste = Paste::new("x".into(), LANGUAGE_CPP20.into(), String::new());
        let created_at = paste.updated_at;
        store.save(&paste).await.unwrap();

        // Force the clock to move between Save and Update so a regression
        // that stops stamping `updated_at` on every call can't pass by
        // landing in the same tick as `created_at`.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let mut changed = paste.clone();
        changed.stdout = "5".into();
        store.update(&changed).await.unwrap();

        let fetched = store.get_by_id(paste.id).await.unwrap();
        assert_eq!(fetched.stdout, "5");
        assert!(fetched.updated_at > created_at);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let paste = Paste::new("x".into(), LANGUAGE_CPP20.into(), String::new());
        assert!(matches!(store.update(&paste).await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn queue_ops_are_inert_and_capability_is_false() {
        let store = MemoryStore::new();
        assert!(!store.supports_queue());
        store.enqueue(Uuid::new_v4()).await.unwrap();
        assert!(store.dequeue().await.unwrap().is_none());
    }
}
