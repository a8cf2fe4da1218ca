//! Item-sharing encodings found in older saved bills.
//!
//! Over time an item recorded who shares it in three ways:
//!
//! 1. `personQuantities`: units per person (current).
//! 2. `sharedBy`: a set of person ids, everybody in it taking an equal part.
//!    Stored either as an object of booleans or as an array of ids.
//! 3. `personAmounts`: the money each person paid for the item.
//!
//! [`ItemShape`] names the encoding an item uses; the first one present, in
//! the order above, wins. [`ItemShape::into_quantities`] converts any of them
//! into the current representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemId, PersonId};

/// Two legacy amounts closer than this are considered equal.
pub const EQUAL_AMOUNT_EPSILON: f64 = 0.01;

/// The legacy set of sharer ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharerSet {
    Flags(BTreeMap<PersonId, bool>),
    Ids(Vec<PersonId>),
}

impl SharerSet {
    fn into_ids(self) -> Vec<PersonId> {
        match self {
            Self::Flags(flags) => flags
                .into_iter()
                .filter_map(|(id, shared)| shared.then_some(id))
                .collect(),
            Self::Ids(ids) => ids,
        }
    }
}

/// The sharing encoding carried by one stored item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemShape {
    Quantities(BTreeMap<PersonId, f64>),
    SharedBy(SharerSet),
    Amounts(BTreeMap<PersonId, f64>),
    Unassigned,
}

impl ItemShape {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::SharedBy(_) | Self::Amounts(_))
    }

    /// Converts to a quantity map that only holds values `> 0`.
    pub fn into_quantities(self) -> BTreeMap<PersonId, f64> {
        match self {
            Self::Quantities(quantities) => quantities
                .into_iter()
                .filter(|(_, q)| q.is_finite() && *q > 0.0)
                .collect(),
            Self::SharedBy(set) => set.into_ids().into_iter().map(|id| (id, 1.0)).collect(),
            Self::Amounts(amounts) => quantities_from_amounts(amounts),
            Self::Unassigned => BTreeMap::new(),
        }
    }
}

/// Backs quantities out of per-person amounts.
///
/// Equal amounts become one unit each. Otherwise every person gets
/// `amount / total * count` units, so the quantities keep the proportions of
/// the amounts and add up to the number of people. The original quantities
/// can't be recovered exactly, this is the closest guess.
fn quantities_from_amounts(amounts: BTreeMap<PersonId, f64>) -> BTreeMap<PersonId, f64> {
    let paying: Vec<(PersonId, f64)> = amounts
        .into_iter()
        .filter(|(_, amount)| amount.is_finite() && *amount > 0.0)
        .collect();
    let Some(&(_, first)) = paying.first() else {
        return BTreeMap::new();
    };

    if paying
        .iter()
        .all(|(_, amount)| (amount - first).abs() < EQUAL_AMOUNT_EPSILON)
    {
        return paying.into_iter().map(|(id, _)| (id, 1.0)).collect();
    }

    let total: f64 = paying.iter().map(|(_, amount)| amount).sum();
    let count = paying.len() as f64;
    paying
        .into_iter()
        .map(|(id, amount)| (id, amount / total * count))
        .collect()
}

/// An item as found in a durable snapshot, in any of its encodings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_quantities: Option<BTreeMap<PersonId, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<SharerSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_amounts: Option<BTreeMap<PersonId, f64>>,
}

impl StoredItem {
    pub fn shape(&self) -> ItemShape {
        if let Some(quantities) = &self.person_quantities {
            ItemShape::Quantities(quantities.clone())
        } else if let Some(set) = &self.shared_by {
            ItemShape::SharedBy(set.clone())
        } else if let Some(amounts) = &self.person_amounts {
            ItemShape::Amounts(amounts.clone())
        } else {
            ItemShape::Unassigned
        }
    }

    /// Converts to the current [`Item`] representation.
    pub fn into_item(self) -> Item {
        let shape = self.shape();
        if shape.is_legacy() {
            tracing::warn!("migrating legacy sharing of item {} ({})", self.name, self.id);
        }
        Item {
            id: self.id,
            name: self.name,
            price: self.price,
            person_quantities: shape.into_quantities(),
        }
    }
}

impl From<&Item> for StoredItem {
    fn from(value: &Item) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            price: value.price,
            person_quantities: Some(value.person_quantities.clone()),
            shared_by: None,
            person_amounts: None,
        }
    }
}
