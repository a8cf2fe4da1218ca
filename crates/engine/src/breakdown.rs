//! Allocation of item costs to people.
//!
//! [`compute_breakdown`] is a pure function: given the roster, the items and
//! the two rates it always returns the same [`Breakdown`]. The result is
//! computed once and then projected twice, as an item-major table (rows are
//! items) and a person-major table (rows are people), so both views show the
//! exact same numbers.
//!
//! ## Totals
//!
//! For an item with price `p` and `T` total units assigned, every person
//! holding `q` units pays `q * p / T`. Per person:
//!
//! - `tax = subtotal * tax% / 100`
//! - `tip = subtotal * tip% / 100`
//! - `total = subtotal + tax + tip`
//!
//! Bill-wide the subtotal is the sum of **all** prices, assigned or not, while
//! the grand total is the sum of the person totals. When some item has no
//! units assigned the two disagree: the unassigned cost shows up in the bill
//! subtotal but in nobody's total. This is kept on purpose so the gap is
//! visible to whoever is splitting the bill.

use std::fmt;

use serde::Serialize;

use crate::{
    model::{Item, ItemId, Person, PersonId},
    numbers::{format_amount, format_quantity},
};

/// Result of [`compute_breakdown`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Breakdown {
    /// There is nobody to split with: render a prompt instead of a table.
    Empty,
    Computed(Allocation),
}

impl Breakdown {
    pub fn allocation(&self) -> Option<&Allocation> {
        match self {
            Self::Empty => None,
            Self::Computed(allocation) => Some(allocation),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    pub people: Vec<PersonTotals>,
    pub items: Vec<ItemLine>,
    pub bill: BillTotals,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonTotals {
    pub id: PersonId,
    pub name: String,
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

/// One item with the share of every person, in roster order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemLine {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub total_units: f64,
    pub shares: Vec<Option<Share>>,
}

impl ItemLine {
    /// `true` when nobody holds a unit of the item.
    pub fn is_unassigned(&self) -> bool {
        self.total_units <= 0.0
    }
}

/// Units and cost of an item taken by one person.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Share {
    pub quantity: f64,
    pub amount: f64,
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}× = {}",
            format_quantity(self.quantity),
            format_amount(self.amount)
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BillTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub grand_total: f64,
}

/// Computes the per-person and bill-wide totals.
///
/// Quantities held by ids that are not in `people` are ignored. Values are
/// left unrounded; round only when presenting.
pub fn compute_breakdown(
    people: &[Person],
    items: &[Item],
    tax_percent: f64,
    tip_percent: f64,
) -> Breakdown {
    if people.is_empty() {
        return Breakdown::Empty;
    }

    let tax_rate = tax_percent / 100.0;
    let tip_rate = tip_percent / 100.0;
    let mut subtotals = vec![0.0_f64; people.len()];
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let total_units = item.assigned_units(people);
        let unit_price = if total_units > 0.0 {
            item.price / total_units
        } else {
            0.0
        };

        let shares = people
            .iter()
            .zip(subtotals.iter_mut())
            .map(|(person, subtotal)| {
                let quantity = item.quantity(person.id);
                if total_units <= 0.0 || quantity <= 0.0 {
                    return None;
                }
                let amount = quantity * unit_price;
                *subtotal += amount;
                Some(Share { quantity, amount })
            })
            .collect();

        lines.push(ItemLine {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            total_units,
            shares,
        });
    }

    let people: Vec<PersonTotals> = people
        .iter()
        .zip(subtotals)
        .map(|(person, subtotal)| {
            let tax = subtotal * tax_rate;
            let tip = subtotal * tip_rate;
            PersonTotals {
                id: person.id,
                name: person.name.clone(),
                subtotal,
                tax,
                tip,
                total: subtotal + tax + tip,
            }
        })
        .collect();

    let subtotal: f64 = items.iter().map(|item| item.price).sum();
    let bill = BillTotals {
        subtotal,
        tax: subtotal * tax_rate,
        tip: subtotal * tip_rate,
        grand_total: people.iter().map(|p| p.total).sum(),
    };

    Breakdown::Computed(Allocation {
        people,
        items: lines,
        bill,
    })
}

/// Which entity the rows of a [`Table`] represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    ItemMajor,
    PersonMajor,
}

/// A presentable projection of an [`Allocation`]. Every value is already
/// formatted with 2 decimals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Table {
    pub orientation: Orientation,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    /// One cell per column: `"2× = 10.00"` or empty.
    pub cells: Vec<String>,
    /// Price for item rows, subtotal for person rows.
    pub total: String,
    pub unassigned: bool,
}

fn cell(share: Option<&Share>) -> String {
    share.map(ToString::to_string).unwrap_or_default()
}

impl Allocation {
    /// Rows are items, columns are people.
    pub fn item_major(&self) -> Table {
        let rows = self
            .items
            .iter()
            .map(|line| TableRow {
                label: line.name.clone(),
                cells: line.shares.iter().map(|s| cell(s.as_ref())).collect(),
                total: format_amount(line.price),
                unassigned: line.is_unassigned(),
            })
            .collect();

        Table {
            orientation: Orientation::ItemMajor,
            columns: self.people.iter().map(|p| p.name.clone()).collect(),
            rows,
        }
    }

    /// Rows are people, columns are items.
    pub fn person_major(&self) -> Table {
        let rows = self
            .people
            .iter()
            .enumerate()
            .map(|(idx, person)| TableRow {
                label: person.name.clone(),
                cells: self
                    .items
                    .iter()
                    .map(|line| cell(line.shares.get(idx).and_then(Option::as_ref)))
                    .collect(),
                total: format_amount(person.subtotal),
                unassigned: false,
            })
            .collect();

        Table {
            orientation: Orientation::PersonMajor,
            columns: self.items.iter().map(|line| line.name.clone()).collect(),
            rows,
        }
    }

    pub fn project(&self, transposed: bool) -> Table {
        if transposed {
            self.person_major()
        } else {
            self.item_major()
        }
    }

    /// Amount of the bill subtotal that nobody has taken.
    pub fn unassigned_amount(&self) -> f64 {
        self.items
            .iter()
            .filter(|line| line.is_unassigned())
            .map(|line| line.price)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbers::approx_eq;

    fn person(id: u64, name: &str) -> Person {
        Person {
            id: PersonId(id),
            name: name.to_string(),
        }
    }

    fn item(id: u64, name: &str, price: f64, quantities: &[(u64, f64)]) -> Item {
        let mut item = Item::new(ItemId(id), name.to_string(), price);
        for (pid, q) in quantities {
            item.set_quantity(PersonId(*pid), *q);
        }
        item
    }

    fn computed(breakdown: Breakdown) -> Allocation {
        match breakdown {
            Breakdown::Computed(allocation) => allocation,
            Breakdown::Empty => panic!("expected a computed breakdown"),
        }
    }

    #[test]
    fn pizza_split_between_two() {
        let people = [person(0, "Amy"), person(1, "Bo")];
        let items = [item(0, "Pizza", 20.0, &[(0, 1.0), (1, 1.0)])];
        let allocation = computed(compute_breakdown(&people, &items, 10.0, 10.0));

        for p in &allocation.people {
            assert_eq!(format_amount(p.subtotal), "10.00");
            assert_eq!(format_amount(p.tax), "1.00");
            assert_eq!(format_amount(p.tip), "1.00");
            assert_eq!(format_amount(p.total), "12.00");
        }
        assert_eq!(format_amount(allocation.bill.grand_total), "24.00");
    }

    #[test]
    fn no_people_is_empty() {
        let items = [item(0, "Pizza", 20.0, &[])];
        assert!(compute_breakdown(&[], &items, 0.0, 10.0).is_empty());
    }

    #[test]
    fn shares_sum_to_price() {
        let people = [person(0, "Amy"), person(1, "Bo"), person(2, "Cy")];
        let items = [item(0, "Wine", 31.7, &[(0, 1.5), (1, 0.25), (2, 3.0)])];
        let allocation = computed(compute_breakdown(&people, &items, 0.0, 0.0));

        let sum: f64 = allocation.items[0].shares.iter().flatten().map(|s| s.amount).sum();
        assert!((sum - 31.7).abs() < 1e-9);
    }

    #[test]
    fn unassigned_item_counts_for_bill_only() {
        let people = [person(0, "Amy"), person(1, "Bo")];
        let items = [
            item(0, "Pizza", 20.0, &[(0, 1.0), (1, 1.0)]),
            item(1, "Salad", 8.0, &[]),
        ];
        let allocation = computed(compute_breakdown(&people, &items, 10.0, 20.0));

        assert!(allocation.items[1].is_unassigned());
        assert!(allocation.items[1].shares.iter().all(Option::is_none));
        assert!(approx_eq(allocation.bill.subtotal, 28.0));
        assert!(approx_eq(allocation.bill.tax, 2.8));
        assert!(approx_eq(allocation.bill.tip, 5.6));
        // Grand total only covers what was allocated.
        assert!(approx_eq(allocation.bill.grand_total, 26.0));
        assert!(approx_eq(allocation.unassigned_amount(), 8.0));
    }

    #[test]
    fn grand_total_is_sum_of_person_totals() {
        let people = [person(0, "Amy"), person(1, "Bo")];
        let items = [
            item(0, "Pizza", 20.0, &[(0, 3.0), (1, 1.0)]),
            item(1, "Beer", 9.0, &[(1, 2.0)]),
        ];
        let allocation = computed(compute_breakdown(&people, &items, 8.0, 15.0));

        let expected: f64 = allocation
            .people
            .iter()
            .map(|p| p.subtotal * (1.0 + 0.08 + 0.15))
            .sum();
        assert!(approx_eq(allocation.bill.grand_total, expected));
        assert!(approx_eq(allocation.people[0].subtotal, 15.0));
        assert!(approx_eq(allocation.people[1].subtotal, 14.0));
    }

    #[test]
    fn stale_person_ids_are_ignored() {
        let people = [person(0, "Amy")];
        let items = [item(0, "Pizza", 20.0, &[(0, 1.0), (7, 3.0)])];
        let allocation = computed(compute_breakdown(&people, &items, 0.0, 0.0));

        assert_eq!(allocation.items[0].total_units, 1.0);
        assert!(approx_eq(allocation.people[0].subtotal, 20.0));
    }

    #[test]
    fn projections_agree() {
        let people = [person(0, "Amy"), person(1, "Bo")];
        let items = [
            item(0, "Pizza", 20.0, &[(0, 2.0), (1, 1.0)]),
            item(1, "Salad", 8.0, &[]),
        ];
        let allocation = computed(compute_breakdown(&people, &items, 0.0, 0.0));
        let by_item = allocation.item_major();
        let by_person = allocation.person_major();

        assert_eq!(by_item.columns, vec!["Amy", "Bo"]);
        assert_eq!(by_person.columns, vec!["Pizza", "Salad"]);
        assert_eq!(by_item.rows[0].cells[0], "2× = 13.33");
        assert_eq!(by_item.rows[0].cells[1], "1× = 6.67");
        assert_eq!(by_item.rows[1].cells, vec!["", ""]);
        assert!(by_item.rows[1].unassigned);
        for (i, row) in by_item.rows.iter().enumerate() {
            for (j, cell) in row.cells.iter().enumerate() {
                assert_eq!(cell, &by_person.rows[j].cells[i]);
            }
        }
        assert_eq!(by_person.rows[0].total, "13.33");
        assert_eq!(allocation.project(true), by_person);
    }
}
