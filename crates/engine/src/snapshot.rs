//! Durable JSON form of a [`BillStore`].
//!
//! The JSON keys are camelCase:
//!
//! ```json
//! {
//!   "people": [{ "id": 0, "name": "Amy" }],
//!   "items": [{ "id": 0, "name": "Pizza", "price": 20.0, "personQuantities": { "0": 1.0 } }],
//!   "nextPersonId": 1,
//!   "nextItemId": 1,
//!   "taxPercent": 0.0,
//!   "tipPercent": 10.0,
//!   "displayTransposed": false,
//!   "undo": [],
//!   "savedAt": "2024-05-01T19:30:00Z"
//! }
//! ```
//!
//! Items written by older versions may use a legacy sharing encoding; they
//! are migrated while the snapshot is turned back into a store (see
//! [`legacy`](crate::legacy)). A snapshot is accepted or rejected as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BillStore, EngineError, ResultEngine,
    legacy::StoredItem,
    model::{BillConfig, DEFAULT_TAX_PERCENT, DEFAULT_TIP_PERCENT, Item, Person},
    undo::{UndoEntry, UndoLog},
};

fn default_tip_percent() -> f64 {
    DEFAULT_TIP_PERCENT
}

fn default_tax_percent() -> f64 {
    DEFAULT_TAX_PERCENT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub people: Vec<Person>,
    pub items: Vec<StoredItem>,
    #[serde(default)]
    pub next_person_id: u64,
    #[serde(default)]
    pub next_item_id: u64,
    #[serde(default = "default_tax_percent")]
    pub tax_percent: f64,
    #[serde(default = "default_tip_percent")]
    pub tip_percent: f64,
    #[serde(default)]
    pub display_transposed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undo: Vec<UndoEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Captures the current state of `store`. The undo log is included only
    /// when `include_undo` is set.
    pub fn capture(store: &BillStore, include_undo: bool) -> Self {
        let config = store.config();
        Self {
            people: store.people().to_vec(),
            items: store.items().iter().map(StoredItem::from).collect(),
            next_person_id: store.next_person_id(),
            next_item_id: store.next_item_id(),
            tax_percent: config.tax_percent,
            tip_percent: config.tip_percent,
            display_transposed: config.display_transposed,
            undo: if include_undo {
                store.undo_log().iter().cloned().collect()
            } else {
                Vec::new()
            },
            saved_at: Some(Utc::now()),
        }
    }

    pub fn from_json(json: &str) -> ResultEngine<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| EngineError::Storage(format!("cannot encode snapshot: {err}")))
    }

    /// `true` when there is nothing worth loading.
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.items.is_empty()
    }

    /// Validates and migrates the snapshot into a store.
    pub fn into_store(self, undo_limit: usize) -> ResultEngine<BillStore> {
        if let Some(item) = self
            .items
            .iter()
            .find(|i| !i.price.is_finite() || i.price < 0.0)
        {
            return Err(EngineError::MalformedImport(format!(
                "invalid price for item '{}'",
                item.name
            )));
        }

        let items: Vec<Item> = self.items.into_iter().map(StoredItem::into_item).collect();
        let mut undo = UndoLog::with_limit(undo_limit);
        for entry in self.undo {
            undo.push(entry);
        }

        BillStore::from_parts(
            self.people,
            items,
            self.next_person_id,
            self.next_item_id,
            BillConfig {
                tax_percent: self.tax_percent,
                tip_percent: self.tip_percent,
                display_transposed: self.display_transposed,
            },
            undo,
        )
    }
}

impl BillStore {
    pub fn snapshot(&self, include_undo: bool) -> Snapshot {
        Snapshot::capture(self, include_undo)
    }

    pub fn export_json(&self, include_undo: bool) -> ResultEngine<String> {
        self.snapshot(include_undo).to_json()
    }

    /// Replaces the whole bill with the content of `json`.
    ///
    /// Nothing changes when the JSON is rejected.
    pub fn import_json(&mut self, json: &str) -> ResultEngine<()> {
        let store = Snapshot::from_json(json)?.into_store(self.undo_log().limit())?;
        tracing::info!(
            "imported bill with {} people and {} items",
            store.people().len(),
            store.items().len()
        );
        *self = store;
        Ok(())
    }
}
