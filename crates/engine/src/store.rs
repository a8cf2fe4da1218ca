//! The authoritative in-memory bill.
//!
//! [`BillStore`] owns people, items, the rates and the undo log. Every
//! mutation keeps these invariants:
//!
//! - person ids and item ids are unique within their collection;
//! - names are unique case-insensitively (see [`name_key`]);
//! - a quantity stored on an item is always `> 0`;
//! - the id counters only grow, so ids are never reused;
//! - removing a person leaves no item referencing them.
//!
//! Unknown ids are never an error: the mutation is skipped and the method
//! returns `false` (ids may be stale, e.g. coming from an old undo entry or a
//! shared link). Recomputing totals and persisting are up to the caller.

use std::collections::HashSet;

use rand::Rng;

use crate::{
    EngineError, ResultEngine,
    breakdown::{Breakdown, Table, compute_breakdown},
    model::{
        BillConfig, DEFAULT_TAX_PERCENT, DEFAULT_TIP_PERCENT, Item, ItemId, Person, PersonId,
        clean_name, name_key,
    },
    numbers::{clamp_rate, is_valid_price, parse_number, parse_quantity},
    shuffle,
    undo::{DEFAULT_UNDO_LIMIT, UndoEntry, UndoLog},
};

#[derive(Clone, Debug, PartialEq)]
pub struct BillStore {
    people: Vec<Person>,
    items: Vec<Item>,
    next_person_id: u64,
    next_item_id: u64,
    config: BillConfig,
    undo: UndoLog,
}

impl Default for BillStore {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BillStore {
    /// Return a builder for `BillStore`.
    pub fn builder() -> BillStoreBuilder {
        BillStoreBuilder::default()
    }

    /// Assemble a store from already decoded parts.
    ///
    /// Rejects duplicated ids, blank names and names repeated
    /// case-insensitively. Counters lower than an existing id (undo entries
    /// included) are raised so new ids can't collide.
    pub(crate) fn from_parts(
        people: Vec<Person>,
        items: Vec<Item>,
        next_person_id: u64,
        next_item_id: u64,
        config: BillConfig,
        undo: UndoLog,
    ) -> ResultEngine<Self> {
        let mut person_ids: Vec<u64> = people.iter().map(|p| p.id.0).collect();
        person_ids.sort_unstable();
        if person_ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(EngineError::MalformedImport(
                "duplicated person id".to_string(),
            ));
        }
        let mut item_ids: Vec<u64> = items.iter().map(|i| i.id.0).collect();
        item_ids.sort_unstable();
        if item_ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(EngineError::MalformedImport(
                "duplicated item id".to_string(),
            ));
        }

        check_names("person", people.iter().map(|p| p.name.as_str()))?;
        check_names("item", items.iter().map(|i| i.name.as_str()))?;

        let mut min_person = person_ids.last().map_or(0, |id| id + 1);
        let mut min_item = item_ids.last().map_or(0, |id| id + 1);
        for entry in undo.iter() {
            match entry {
                UndoEntry::Person { removed_person, .. } => {
                    min_person = min_person.max(removed_person.id.0 + 1);
                }
                UndoEntry::Item { removed_item } => {
                    min_item = min_item.max(removed_item.id.0 + 1);
                }
            }
        }
        if next_person_id < min_person || next_item_id < min_item {
            tracing::warn!(
                "id counters behind existing ids (person {next_person_id} < {min_person} or item {next_item_id} < {min_item}), raising them"
            );
        }

        Ok(Self {
            people,
            items,
            next_person_id: next_person_id.max(min_person),
            next_item_id: next_item_id.max(min_item),
            config: BillConfig {
                tax_percent: clamp_rate(config.tax_percent),
                tip_percent: clamp_rate(config.tip_percent),
                display_transposed: config.display_transposed,
            },
            undo,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &BillConfig {
        &self.config
    }

    pub fn next_person_id(&self) -> u64 {
        self.next_person_id
    }

    pub fn next_item_id(&self) -> u64 {
        self.next_item_id
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&UndoEntry> {
        self.undo.peek()
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn person_by_name(&self, name: &str) -> Option<&Person> {
        let key = name_key(name);
        self.people.iter().find(|p| name_key(&p.name) == key)
    }

    /// Case-insensitive lookup by name.
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        let key = name_key(name);
        self.items.iter().find(|i| name_key(&i.name) == key)
    }

    fn person_name_taken(&self, name: &str, except: Option<PersonId>) -> bool {
        self.person_by_name(name)
            .is_some_and(|p| Some(p.id) != except)
    }

    fn item_name_taken(&self, name: &str, except: Option<ItemId>) -> bool {
        self.item_by_name(name).is_some_and(|i| Some(i.id) != except)
    }

    pub fn add_person(&mut self, name: &str) -> ResultEngine<PersonId> {
        let name = clean_name(name)
            .ok_or_else(|| EngineError::InvalidInput("person name is empty".to_string()))?;
        if self.person_name_taken(&name, None) {
            return Err(EngineError::DuplicateName(name));
        }

        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        tracing::debug!("added person {name} ({id})");
        self.people.push(Person { id, name });
        Ok(id)
    }

    /// Removes a person and every quantity they hold. The deletion can be
    /// reverted with [`undo`](Self::undo).
    pub fn remove_person(&mut self, id: PersonId) -> bool {
        let Some(position) = self.people.iter().position(|p| p.id == id) else {
            return false;
        };
        let person = self.people.remove(position);

        let mut restored_quantities = Vec::new();
        for item in &mut self.items {
            if let Some(quantity) = item.person_quantities.remove(&id) {
                restored_quantities.push((item.id, quantity));
            }
        }

        tracing::debug!(
            "removed person {} ({id}), {} quantities captured",
            person.name,
            restored_quantities.len()
        );
        self.undo.push(UndoEntry::Person {
            removed_person: person,
            restored_quantities,
        });
        true
    }

    pub fn add_item(&mut self, name: &str, price: f64) -> ResultEngine<ItemId> {
        let name = clean_name(name)
            .ok_or_else(|| EngineError::InvalidInput("item name is empty".to_string()))?;
        if !is_valid_price(price) {
            return Err(EngineError::InvalidInput(format!(
                "invalid price for '{name}': must be > 0"
            )));
        }
        if self.item_name_taken(&name, None) {
            return Err(EngineError::DuplicateName(name));
        }

        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        tracing::debug!("added item {name} ({id}) at {price}");
        self.items.push(Item::new(id, name, price));
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let Some(position) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = self.items.remove(position);
        tracing::debug!("removed item {} ({id})", item.name);
        self.undo.push(UndoEntry::Item { removed_item: item });
        true
    }

    /// Sets the units `person` takes of `item` from raw user input.
    ///
    /// Input that doesn't parse, or parses to `<= 0`, removes the share.
    /// Returns `false` when either id is unknown.
    pub fn set_quantity(&mut self, item: ItemId, person: PersonId, raw_quantity: &str) -> bool {
        if self.person(person).is_none() {
            return false;
        }
        let Some(item) = self.item_mut(item) else {
            return false;
        };
        match parse_quantity(raw_quantity) {
            Some(quantity) => item.set_quantity(person, quantity),
            None => {
                item.person_quantities.remove(&person);
            }
        }
        true
    }

    /// Gives one unit of `item` to every current person.
    pub fn split_evenly(&mut self, item: ItemId) -> bool {
        if self.people.is_empty() {
            return false;
        }
        let ids: Vec<PersonId> = self.people.iter().map(|p| p.id).collect();
        let Some(item) = self.item_mut(item) else {
            return false;
        };
        for id in ids {
            item.set_quantity(id, 1.0);
        }
        true
    }

    pub fn clear_quantities(&mut self, item: ItemId) -> bool {
        let Some(item) = self.item_mut(item) else {
            return false;
        };
        item.person_quantities.clear();
        true
    }

    /// Randomly re-splits every assigned item across all current people.
    pub fn shuffle_quantities(&mut self) {
        self.shuffle_quantities_with(&mut rand::rng());
    }

    /// Like [`shuffle_quantities`](Self::shuffle_quantities) with a caller
    /// provided random source.
    ///
    /// Each item keeps its total of assigned units; items nobody holds are
    /// left alone.
    pub fn shuffle_quantities_with<R: Rng>(&mut self, rng: &mut R) {
        if self.people.is_empty() {
            return;
        }

        for item in &mut self.items {
            let total = item.assigned_units(&self.people);
            if total <= 0.0 {
                continue;
            }

            let parts = shuffle::distribute(total, self.people.len(), rng);
            item.person_quantities.clear();
            for (person, part) in self.people.iter().zip(parts) {
                if let Some(quantity) = shuffle::storable(part) {
                    item.person_quantities.insert(person.id, quantity);
                }
            }
        }
        tracing::debug!("shuffled quantities of {} items", self.items.len());
    }

    /// Reverts the most recent deletion.
    ///
    /// Returns the entry that was applied, `None` when there is nothing to
    /// undo. If the removed name has been taken in the meantime the entry is
    /// kept and [`EngineError::DuplicateName`] is returned.
    pub fn undo(&mut self) -> ResultEngine<Option<UndoEntry>> {
        let Some(entry) = self.undo.pop() else {
            return Ok(None);
        };

        match &entry {
            UndoEntry::Person {
                removed_person,
                restored_quantities,
            } => {
                if self.person_name_taken(&removed_person.name, None)
                    || self.person(removed_person.id).is_some()
                {
                    let name = removed_person.name.clone();
                    self.undo.push(entry);
                    return Err(EngineError::DuplicateName(name));
                }

                self.people.push(removed_person.clone());
                self.next_person_id = self.next_person_id.max(removed_person.id.0 + 1);
                for (item_id, quantity) in restored_quantities {
                    if let Some(item) = self.item_mut(*item_id) {
                        item.set_quantity(removed_person.id, *quantity);
                    }
                }
            }
            UndoEntry::Item { removed_item } => {
                if self.item_name_taken(&removed_item.name, None)
                    || self.item(removed_item.id).is_some()
                {
                    let name = removed_item.name.clone();
                    self.undo.push(entry);
                    return Err(EngineError::DuplicateName(name));
                }

                self.items.push(removed_item.clone());
                self.next_item_id = self.next_item_id.max(removed_item.id.0 + 1);
            }
        }

        tracing::debug!("restored {}", entry.label());
        Ok(Some(entry))
    }

    /// Renames a person. Blank names or names already used by someone else
    /// keep the original and return `false`.
    pub fn rename_person(&mut self, id: PersonId, name: &str) -> bool {
        let Some(name) = clean_name(name) else {
            return false;
        };
        if self.person_name_taken(&name, Some(id)) {
            return false;
        }
        let Some(person) = self.people.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        person.name = name;
        true
    }

    /// Updates an item's name and price.
    ///
    /// Each field is validated on its own: an invalid name or price leaves
    /// that field untouched. Returns `true` if anything changed.
    pub fn rename_item(&mut self, id: ItemId, name: &str, raw_price: &str) -> bool {
        let name = clean_name(name).filter(|name| !self.item_name_taken(name, Some(id)));
        let price = parse_number(raw_price).filter(|p| is_valid_price(*p));
        let Some(item) = self.item_mut(id) else {
            return false;
        };

        let mut changed = false;
        if let Some(name) = name
            && name != item.name
        {
            item.name = name;
            changed = true;
        }
        if let Some(price) = price
            && price != item.price
        {
            item.price = price;
            changed = true;
        }
        changed
    }

    pub fn set_tax_percent(&mut self, percent: f64) {
        self.config.tax_percent = clamp_rate(percent);
    }

    pub fn set_tip_percent(&mut self, percent: f64) {
        self.config.tip_percent = clamp_rate(percent);
    }

    pub fn set_transposed(&mut self, transposed: bool) {
        self.config.display_transposed = transposed;
    }

    /// Flips the table orientation and returns the new value.
    pub fn toggle_transposed(&mut self) -> bool {
        self.config.display_transposed = !self.config.display_transposed;
        self.config.display_transposed
    }

    /// Starts a new bill. Id counters keep growing.
    pub fn reset(&mut self) {
        self.people.clear();
        self.items.clear();
        self.config.tax_percent = DEFAULT_TAX_PERCENT;
        self.config.tip_percent = DEFAULT_TIP_PERCENT;
        self.undo.clear();
        tracing::debug!("bill reset");
    }

    pub(crate) fn clear_undo(&mut self) {
        self.undo.clear();
    }

    pub fn breakdown(&self) -> Breakdown {
        compute_breakdown(
            &self.people,
            &self.items,
            self.config.tax_percent,
            self.config.tip_percent,
        )
    }

    /// The projection matching the current orientation, `None` when there is
    /// nobody on the bill.
    pub fn table(&self) -> Option<Table> {
        self.breakdown()
            .allocation()
            .map(|allocation| allocation.project(self.config.display_transposed))
    }
}

fn check_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> ResultEngine<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(EngineError::MalformedImport(format!("{kind} without a name")));
        }
        if !seen.insert(name_key(name)) {
            return Err(EngineError::MalformedImport(format!(
                "{kind} name \"{name}\" repeated"
            )));
        }
    }
    Ok(())
}

/// Builder for [`BillStore`].
#[derive(Debug)]
pub struct BillStoreBuilder {
    undo_limit: usize,
    tax_percent: f64,
    tip_percent: f64,
}

impl Default for BillStoreBuilder {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            tax_percent: DEFAULT_TAX_PERCENT,
            tip_percent: DEFAULT_TIP_PERCENT,
        }
    }
}

impl BillStoreBuilder {
    /// How many deletions can be undone.
    pub fn undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    pub fn tax_percent(mut self, percent: f64) -> Self {
        self.tax_percent = percent;
        self
    }

    pub fn tip_percent(mut self, percent: f64) -> Self {
        self.tip_percent = percent;
        self
    }

    /// Construct `BillStore`
    pub fn build(self) -> BillStore {
        BillStore {
            people: Vec::new(),
            items: Vec::new(),
            next_person_id: 0,
            next_item_id: 0,
            config: BillConfig {
                tax_percent: clamp_rate(self.tax_percent),
                tip_percent: clamp_rate(self.tip_percent),
                display_transposed: false,
            },
            undo: UndoLog::with_limit(self.undo_limit),
        }
    }
}
