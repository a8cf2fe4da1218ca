//! People, items and the bill configuration.
//!
//! Ids are plain integers handed out by the [`BillStore`](crate::BillStore)
//! counters and never reused, so a stale id held by an undo entry or a shared
//! link can't point at a different entity.

use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Unexpected, Visitor},
};
use unicode_normalization::UnicodeNormalization;

/// Default tip percentage for a new bill.
pub const DEFAULT_TIP_PERCENT: f64 = 10.0;
/// Default tax percentage for a new bill.
pub const DEFAULT_TAX_PERCENT: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// Ids arrive as numbers, or as strings when they are JSON object keys.
/// Buffered formats (tagged enums) lose the key/number distinction, so both
/// are accepted everywhere.
struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.trim()
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor).map(Self)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor).map(Self)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// A purchased good.
///
/// `person_quantities` holds how many units of the item each person takes.
/// A missing key means zero; a present key is always `> 0`. Keys are weak
/// references: a key whose person is no longer on the roster is ignored when
/// computing the breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub person_quantities: BTreeMap<PersonId, f64>,
}

impl Item {
    pub fn new(id: ItemId, name: String, price: f64) -> Self {
        Self {
            id,
            name,
            price,
            person_quantities: BTreeMap::new(),
        }
    }

    /// Quantity held by `person`, zero when absent.
    pub fn quantity(&self, person: PersonId) -> f64 {
        self.person_quantities.get(&person).copied().unwrap_or(0.0)
    }

    /// Sets a quantity, removing the key when `quantity <= 0` or not finite.
    pub fn set_quantity(&mut self, person: PersonId, quantity: f64) {
        if quantity.is_finite() && quantity > 0.0 {
            self.person_quantities.insert(person, quantity);
        } else {
            self.person_quantities.remove(&person);
        }
    }

    /// Sum of the quantities held by the given people.
    pub fn assigned_units<'a>(&self, people: impl IntoIterator<Item = &'a Person>) -> f64 {
        people.into_iter().map(|p| self.quantity(p.id)).sum()
    }
}

/// Bill-wide settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillConfig {
    pub tax_percent: f64,
    pub tip_percent: f64,
    pub display_transposed: bool,
}

impl Default for BillConfig {
    fn default() -> Self {
        Self {
            tax_percent: DEFAULT_TAX_PERCENT,
            tip_percent: DEFAULT_TIP_PERCENT,
            display_transposed: false,
        }
    }
}

/// Key used to compare names case-insensitively.
///
/// The name is trimmed, NFC normalized and lowercased, so `"Café"` typed
/// with a combining accent still collides with a precomposed `"CAFÉ"`.
pub fn name_key(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_lowercase()
}

/// Trims a user supplied name, returning `None` when nothing is left.
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
