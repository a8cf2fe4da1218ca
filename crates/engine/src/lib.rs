//! Bill splitting engine.
//!
//! The crate holds everything a bill splitter needs besides drawing it:
//!
//! - [`BillStore`]: people, items, rates and the undo log, with mutations
//!   that keep the bill consistent;
//! - [`compute_breakdown`]: per-person and bill-wide totals, projected as an
//!   item-major or a person-major [`Table`];
//! - [`Snapshot`]: the durable JSON form, migrating older item encodings;
//! - [`share`]: the compact query-string form used in links;
//! - [`reconcile`]: which of the two wins at startup.
//!
//! Everything is synchronous and in memory; I/O belongs to the caller
//! through the [`Storage`] trait.
//!
//! ```rust
//! use engine::{BillStore, numbers::format_amount};
//!
//! let mut store = BillStore::builder().tax_percent(10.0).build();
//! let amy = store.add_person("Amy").unwrap();
//! let bo = store.add_person("Bo").unwrap();
//! let pizza = store.add_item("Pizza", 20.0).unwrap();
//! store.split_evenly(pizza);
//!
//! let breakdown = store.breakdown();
//! let allocation = breakdown.allocation().unwrap();
//! assert_eq!(format_amount(allocation.people[0].total), "12.00");
//! assert_eq!(format_amount(allocation.bill.grand_total), "24.00");
//! # let _ = (amy, bo);
//! ```

pub use breakdown::{
    Allocation, BillTotals, Breakdown, ItemLine, Orientation, PersonTotals, Share, Table,
    TableRow, compute_breakdown,
};
pub use edit::{EditTarget, PendingEdit};
pub use error::EngineError;
pub use model::{BillConfig, Item, ItemId, Person, PersonId};
pub use reconcile::{Conflict, Resolution, Source, Startup, reconcile};
pub use snapshot::Snapshot;
pub use storage::{MemoryStorage, Storage};
pub use store::{BillStore, BillStoreBuilder};
pub use undo::{UndoEntry, UndoLog};

mod breakdown;
mod edit;
mod error;
pub mod legacy;
mod model;
pub mod numbers;
mod reconcile;
pub mod share;
pub mod shuffle;
mod snapshot;
mod storage;
mod store;
mod undo;

pub use model::{DEFAULT_TAX_PERCENT, DEFAULT_TIP_PERCENT};
pub use undo::DEFAULT_UNDO_LIMIT;

pub type ResultEngine<T> = Result<T, EngineError>;
