use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::domain::{Item, ItemDraft, ItemId};
use tokio::sync::{Mutex, Notify};

use crate::{api::ItemsApi, error::ItemsApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Create(ItemDraft),
    Update(ItemId, ItemDraft),
    Delete(ItemId),
}

/// Holds create/update requests until the test releases them.
pub struct SubmitGate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory items server that records every call it receives.
#[derive(Default)]
pub struct FakeItemsApi {
    items: Mutex<Vec<Item>>,
    calls: Mutex<Vec<ApiCall>>,
    next_id: Mutex<u64>,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    gate: Option<Arc<SubmitGate>>,
}

impl FakeItemsApi {
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    pub fn gated(mut self) -> (Self, Arc<SubmitGate>) {
        let gate = Arc::new(SubmitGate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn fail(flag: &AtomicBool, failing: bool) {
        flag.store(failing, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn stored_items(&self) -> Vec<Item> {
        self.items.lock().await.clone()
    }

    async fn record(&self, call: ApiCall) {
        self.calls.lock().await.push(call);
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    fn check(flag: &AtomicBool) -> Result<(), ItemsApiError> {
        if flag.load(Ordering::SeqCst) {
            return Err(ItemsApiError::server(500, "boom"));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemsApi for FakeItemsApi {
    async fn list(&self) -> Result<Vec<Item>, ItemsApiError> {
        self.record(ApiCall::List).await;
        Self::check(&self.fail_list)?;
        Ok(self.items.lock().await.clone())
    }

    async fn create(&self, draft: &ItemDraft) -> Result<Item, ItemsApiError> {
        self.record(ApiCall::Create(draft.clone())).await;
        self.wait_for_gate().await;
        Self::check(&self.fail_create)?;
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            ItemId::new(next_id.to_string())
        };
        let item = Item {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
        };
        self.items.lock().await.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<Option<Item>, ItemsApiError> {
        self.record(ApiCall::Update(id.clone(), draft.clone())).await;
        self.wait_for_gate().await;
        Self::check(&self.fail_update)?;
        let mut items = self.items.lock().await;
        let Some(item) = items.iter_mut().find(|item| &item.id == id) else {
            return Err(ItemsApiError::server(404, "item not found"));
        };
        item.name = draft.name.clone();
        item.description = draft.description.clone();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ItemsApiError> {
        self.record(ApiCall::Delete(id.clone())).await;
        Self::check(&self.fail_delete)?;
        self.items.lock().await.retain(|item| &item.id != id);
        Ok(())
    }
}

pub fn item(id: &str, name: &str, description: &str) -> Item {
    Item {
        id: ItemId::from(id),
        name: name.to_string(),
        description: description.to_string(),
    }
}
