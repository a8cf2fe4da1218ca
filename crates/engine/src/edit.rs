//! In-place editing as plain commands.
//!
//! A shell starts an edit with [`BillStore::begin_edit`], lets the user change
//! the draft however its widgets work (blur, enter, a dialog...) and hands the
//! draft back to [`BillStore::commit_edit`]. The store doesn't care how the
//! draft was produced.

use crate::{
    BillStore,
    model::{ItemId, PersonId},
    numbers::format_amount,
};

/// What is being edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditTarget {
    Person(PersonId),
    Item(ItemId),
}

/// A draft edit, prefilled with the current values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingEdit {
    Person { id: PersonId, name: String },
    Item { id: ItemId, name: String, price: String },
}

impl PendingEdit {
    pub fn target(&self) -> EditTarget {
        match self {
            Self::Person { id, .. } => EditTarget::Person(*id),
            Self::Item { id, .. } => EditTarget::Item(*id),
        }
    }

    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Person { name, .. } | Self::Item { name, .. } => *name = value.into(),
        }
        self
    }

    /// Sets the raw price text. Ignored for people.
    #[must_use]
    pub fn price(mut self, value: impl Into<String>) -> Self {
        if let Self::Item { price, .. } = &mut self {
            *price = value.into();
        }
        self
    }
}

impl BillStore {
    /// Opens a draft for `target`, `None` if it no longer exists.
    pub fn begin_edit(&self, target: EditTarget) -> Option<PendingEdit> {
        match target {
            EditTarget::Person(id) => self.person(id).map(|person| PendingEdit::Person {
                id,
                name: person.name.clone(),
            }),
            EditTarget::Item(id) => self.item(id).map(|item| PendingEdit::Item {
                id,
                name: item.name.clone(),
                price: format_amount(item.price),
            }),
        }
    }

    /// Applies a draft. Invalid fields keep their previous value; returns
    /// `true` if anything changed.
    pub fn commit_edit(&mut self, edit: PendingEdit) -> bool {
        match edit {
            PendingEdit::Person { id, name } => {
                let unchanged = self.person(id).is_some_and(|p| p.name == name.trim());
                !unchanged && self.rename_person(id, &name)
            }
            PendingEdit::Item { id, name, price } => self.rename_item(id, &name, &price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_person_round_trip() {
        let mut store = BillStore::default();
        let amy = store.add_person("Amy").unwrap();

        let draft = store.begin_edit(EditTarget::Person(amy)).unwrap();
        assert_eq!(
            draft,
            PendingEdit::Person {
                id: amy,
                name: "Amy".to_string()
            }
        );
        assert!(!store.commit_edit(draft.clone()));

        assert!(store.commit_edit(draft.name("Amelia")));
        assert_eq!(store.person(amy).unwrap().name, "Amelia");
    }

    #[test]
    fn edit_item_keeps_invalid_fields() {
        let mut store = BillStore::default();
        let pizza = store.add_item("Pizza", 20.0).unwrap();

        let draft = store.begin_edit(EditTarget::Item(pizza)).unwrap();
        assert_eq!(draft.target(), EditTarget::Item(pizza));
        assert!(store.commit_edit(draft.name("Calzone").price("zero")));

        let item = store.item(pizza).unwrap();
        assert_eq!(item.name, "Calzone");
        assert_eq!(item.price, 20.0);
    }

    #[test]
    fn edit_of_missing_entity() {
        let mut store = BillStore::default();
        assert!(store.begin_edit(EditTarget::Person(PersonId(3))).is_none());
        assert!(!store.commit_edit(PendingEdit::Item {
            id: ItemId(3),
            name: "Beer".to_string(),
            price: "4".to_string(),
        }));
    }
}
