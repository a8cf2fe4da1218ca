//! Text and CSV output of a bill.

use csv::Writer;
use engine::{
    Allocation, BillStore, Table,
    numbers::{format_amount, format_quantity},
};
use serde::Serialize;

use crate::error::{AppError, Result};

const UNASSIGNED_MARK: &str = "(nobody)";

fn width(value: &str) -> usize {
    value.chars().count()
}

fn line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut text = String::new();
    for (cell, to) in cells.zip(widths) {
        text.push_str(cell);
        text.extend(std::iter::repeat_n(' ', to + 2 - width(cell)));
    }
    out.push_str(text.trim_end());
    out.push('\n');
}

/// Lays out `table` in aligned columns, the last one being the row total.
pub fn table(table: &Table) -> String {
    let header: Vec<&str> = std::iter::once("")
        .chain(table.columns.iter().map(String::as_str))
        .chain(std::iter::once("total"))
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let label = if row.unassigned {
                format!("{} {UNASSIGNED_MARK}", row.label)
            } else {
                row.label.clone()
            };
            std::iter::once(label)
                .chain(row.cells.iter().cloned())
                .chain(std::iter::once(row.total.clone()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| width(h)).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let mut out = String::new();
    line(&mut out, header.iter().copied(), &widths);
    for row in &rows {
        line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn totals(allocation: &Allocation, out: &mut String) {
    for person in &allocation.people {
        out.push_str(&format!(
            "{}: {} + tax {} + tip {} = {}\n",
            person.name,
            format_amount(person.subtotal),
            format_amount(person.tax),
            format_amount(person.tip),
            format_amount(person.total)
        ));
    }
    let bill = &allocation.bill;
    out.push_str(&format!(
        "bill: {} + tax {} + tip {} = {}\n",
        format_amount(bill.subtotal),
        format_amount(bill.tax),
        format_amount(bill.tip),
        format_amount(bill.grand_total)
    ));
    let unassigned = allocation.unassigned_amount();
    if unassigned > 0.0 {
        out.push_str(&format!(
            "not assigned to anybody: {}\n",
            format_amount(unassigned)
        ));
    }
}

/// The whole bill as printed by `show`.
pub fn bill(store: &BillStore) -> String {
    let breakdown = store.breakdown();
    let Some(allocation) = breakdown.allocation() else {
        return if store.items().is_empty() {
            "The bill is empty: add some people and items.\n".to_string()
        } else {
            format!(
                "{} items but nobody to pay for them: add some people.\n",
                store.items().len()
            )
        };
    };

    let config = store.config();
    let mut out = table(&allocation.project(config.display_transposed));
    out.push('\n');
    out.push_str(&format!(
        "tax {}%, tip {}%\n",
        format_quantity(config.tax_percent),
        format_quantity(config.tip_percent)
    ));
    totals(allocation, &mut out);
    out
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// `table` as CSV: a header with the column names, then one record per row.
pub fn table_csv(table: &Table) -> Result<String> {
    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(
        std::iter::once("")
            .chain(table.columns.iter().map(String::as_str))
            .chain(std::iter::once("total")),
    )?;
    for row in &table.rows {
        writer.write_record(
            std::iter::once(row.label.as_str())
                .chain(row.cells.iter().map(String::as_str))
                .chain(std::iter::once(row.total.as_str())),
        )?;
    }
    finish(writer)
}

#[derive(Debug, Serialize)]
struct TotalsRow<'a> {
    person: &'a str,
    subtotal: String,
    tax: String,
    tip: String,
    total: String,
}

/// Per-person totals as CSV.
pub fn totals_csv(store: &BillStore) -> Result<String> {
    let breakdown = store.breakdown();
    let allocation = breakdown.allocation().ok_or(AppError::EmptyBill)?;

    let mut writer = Writer::from_writer(vec![]);
    for person in &allocation.people {
        writer.serialize(TotalsRow {
            person: &person.name,
            subtotal: format_amount(person.subtotal),
            tax: format_amount(person.tax),
            tip: format_amount(person.tip),
            total: format_amount(person.total),
        })?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza_night() -> BillStore {
        let mut store = BillStore::builder().tax_percent(10.0).build();
        let amy = store.add_person("Amy").unwrap();
        let bo = store.add_person("Bo").unwrap();
        let pizza = store.add_item("Pizza", 20.0).unwrap();
        store.add_item("Water", 3.0).unwrap();
        store.set_quantity(pizza, amy, "1");
        store.set_quantity(pizza, bo, "1");
        store
    }

    #[test]
    fn item_major_text() {
        let text = table(&pizza_night().table().unwrap());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "                Amy         Bo          total");
        assert_eq!(lines[1], "Pizza           1× = 10.00  1× = 10.00  20.00");
        assert_eq!(lines[2], "Water (nobody)                          3.00");
    }

    #[test]
    fn bill_lists_totals() {
        let text = bill(&pizza_night());
        assert!(text.contains("tax 10%, tip 10%\n"));
        assert!(text.contains("Amy: 10.00 + tax 1.00 + tip 1.00 = 12.00"));
        assert!(text.contains("bill: 23.00 + tax 2.30 + tip 2.30 = 24.00"));
        assert!(text.contains("not assigned to anybody: 3.00"));
    }

    #[test]
    fn empty_bill_text() {
        let mut store = BillStore::default();
        assert!(bill(&store).starts_with("The bill is empty"));
        store.add_item("Pizza", 20.0).unwrap();
        assert!(bill(&store).starts_with("1 items but nobody"));
    }

    #[test]
    fn person_major_csv() {
        let mut store = pizza_night();
        store.toggle_transposed();
        let csv = table_csv(&store.table().unwrap()).unwrap();
        assert_eq!(
            csv,
            ",Pizza,Water,total\nAmy,1× = 10.00,,10.00\nBo,1× = 10.00,,10.00\n"
        );
    }

    #[test]
    fn totals_csv_has_header() {
        let csv = totals_csv(&pizza_night()).unwrap();
        assert_eq!(
            csv,
            "person,subtotal,tax,tip,total\nAmy,10.00,1.00,1.00,12.00\nBo,10.00,1.00,1.00,12.00\n"
        );
        assert!(matches!(
            totals_csv(&BillStore::default()),
            Err(AppError::EmptyBill)
        ));
    }
}
