//! Scripted backend for command tests
//!
//! Wraps the local backend, records every call, fails named operations on
//! request and can hold item updates open to observe optimistic state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::app::Catalog;
use crate::domain::{Category, DomainError, DomainResult, Entity, Item};
use crate::repository::{CatalogBackend, LocalBackend, Repository};
use crate::session::Session;

#[derive(Default)]
pub struct Script {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, DomainError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl Script {
    /// Fail every call to `op`, e.g. `"update item"`
    pub fn fail(&self, op: &str, error: DomainError) {
        self.failures.lock().insert(op.to_string(), error);
    }

    pub fn recover(&self, op: &str) {
        self.failures.lock().remove(op);
    }

    /// Hold item updates until the returned semaphore gets a permit
    pub fn hold_updates(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(op)).count()
    }

    fn enter(&self, op: String, detail: String) -> DomainResult<()> {
        let failure = self.failures.lock().get(&op).cloned();
        self.calls.lock().push(format!("{} {}", op, detail).trim_end().to_string());
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

type Pick<T> = fn(&LocalBackend) -> &dyn Repository<T>;

struct ScriptedCollection<T: Entity> {
    script: Arc<Script>,
    local: Arc<LocalBackend>,
    pick: Pick<T>,
}

#[async_trait]
impl<T: Entity> Repository<T> for ScriptedCollection<T> {
    async fn list(&self) -> DomainResult<Vec<T>> {
        self.script.enter(format!("list {}", T::KIND), String::new())?;
        (self.pick)(&self.local).list().await
    }

    async fn create(&self, draft: &T::Draft) -> DomainResult<T> {
        let detail = serde_json::to_string(draft).unwrap_or_default();
        self.script.enter(format!("create {}", T::KIND), detail)?;
        (self.pick)(&self.local).create(draft).await
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let gate = self.script.gate.lock().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }
        let detail = serde_json::to_string(entity).unwrap_or_default();
        self.script.enter(format!("update {}", T::KIND), detail)?;
        (self.pick)(&self.local).update(entity).await
    }

    async fn delete(&self, id: &T::Id) -> DomainResult<()> {
        self.script.enter(format!("delete {}", T::KIND), id.to_string())?;
        (self.pick)(&self.local).delete(id).await
    }
}

pub struct ScriptedBackend {
    categories: ScriptedCollection<Category>,
    items: ScriptedCollection<Item>,
}

impl CatalogBackend for ScriptedBackend {
    fn categories(&self) -> &dyn Repository<Category> {
        &self.categories
    }

    fn items(&self) -> &dyn Repository<Item> {
        &self.items
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

fn pick_categories(local: &LocalBackend) -> &dyn Repository<Category> {
    local.categories()
}

fn pick_items(local: &LocalBackend) -> &dyn Repository<Item> {
    local.items()
}

/// Signed-in catalog over the seeded demo data, already loaded
pub async fn seeded_catalog() -> (Catalog, Arc<Script>) {
    let script = Arc::new(Script::default());
    let local = Arc::new(LocalBackend::seeded());
    let backend = ScriptedBackend {
        categories: ScriptedCollection {
            script: script.clone(),
            local: local.clone(),
            pick: pick_categories,
        },
        items: ScriptedCollection {
            script: script.clone(),
            local,
            pick: pick_items,
        },
    };

    let session = Session::in_memory(Duration::from_secs(900));
    session.login();
    let catalog = Catalog::new(Arc::new(backend), session);
    catalog.fetch_data().await;
    script.calls.lock().clear();
    (catalog, script)
}
