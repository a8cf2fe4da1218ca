//! Compact query-string encoding used in shareable links.
//!
//! ```text
//! people=Amy,Bo&items=Pizza:20;Salad:8.5&q=0-0:1,0-1:1&tax=8&tip=15
//! ```
//!
//! - `people`: names separated by `,`. Position `n` becomes person id `n`.
//! - `items`: `name:price` pairs separated by `;`. Position `n` becomes
//!   item id `n`.
//! - `q`: `item-person:quantity` triples separated by `,`, where `item` and
//!   `person` are the positions above, not the ids the sender had.
//! - `tax`: only when nonzero.
//! - `tip`: only when different from the default.
//!
//! Names are percent-encoded so they can hold the separators. Decoding never
//! fails: broken or out-of-range parts are skipped.

use std::{borrow::Cow, collections::HashSet};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::{
    BillStore,
    legacy::StoredItem,
    model::{DEFAULT_TAX_PERCENT, DEFAULT_TIP_PERCENT, ItemId, Person, PersonId, name_key},
    numbers::{format_quantity, parse_percent, parse_price, parse_quantity},
    snapshot::Snapshot,
};

pub const PEOPLE_PARAM: &str = "people";
pub const ITEMS_PARAM: &str = "items";
pub const QUANTITIES_PARAM: &str = "q";
pub const TAX_PARAM: &str = "tax";
pub const TIP_PARAM: &str = "tip";

const PARAMS: [&str; 5] = [
    PEOPLE_PARAM,
    ITEMS_PARAM,
    QUANTITIES_PARAM,
    TAX_PARAM,
    TIP_PARAM,
];

const NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, NAME_ENCODE_SET).to_string()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => percent_decode_str(&spaced).decode_utf8_lossy().into_owned(),
    }
}

/// Encodes the bill as a query string (without the leading `?`).
pub fn encode(store: &BillStore) -> String {
    let people = store.people();
    let mut params = Vec::new();

    let names: Vec<String> = people.iter().map(|p| encode_name(&p.name)).collect();
    params.push(format!("{PEOPLE_PARAM}={}", names.join(",")));

    let items: Vec<String> = store
        .items()
        .iter()
        .map(|item| format!("{}:{}", encode_name(&item.name), item.price))
        .collect();
    params.push(format!("{ITEMS_PARAM}={}", items.join(";")));

    let mut triples = Vec::new();
    for (item_idx, item) in store.items().iter().enumerate() {
        for (person_idx, person) in people.iter().enumerate() {
            let quantity = item.quantity(person.id);
            if quantity > 0.0 {
                triples.push(format!(
                    "{item_idx}-{person_idx}:{}",
                    format_quantity(quantity)
                ));
            }
        }
    }
    if !triples.is_empty() {
        params.push(format!("{QUANTITIES_PARAM}={}", triples.join(",")));
    }

    let config = store.config();
    if config.tax_percent != DEFAULT_TAX_PERCENT {
        params.push(format!("{TAX_PARAM}={}", config.tax_percent));
    }
    if config.tip_percent != DEFAULT_TIP_PERCENT {
        params.push(format!("{TIP_PARAM}={}", config.tip_percent));
    }

    params.join("&")
}

fn params(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// `true` if `query` carries a shared bill.
pub fn is_shared(query: &str) -> bool {
    params(query).any(|(key, _)| key == PEOPLE_PARAM || key == ITEMS_PARAM)
}

/// Decodes a query string into a snapshot, `None` when it carries no bill.
///
/// Empty or repeated (case-insensitively) names are dropped, together with
/// the triples pointing at them.
pub fn decode(query: &str) -> Option<Snapshot> {
    let mut people_raw = None;
    let mut items_raw = None;
    let mut quantities_raw = None;
    let mut tax_percent = DEFAULT_TAX_PERCENT;
    let mut tip_percent = DEFAULT_TIP_PERCENT;

    for (key, value) in params(query) {
        match key {
            PEOPLE_PARAM => people_raw = Some(value),
            ITEMS_PARAM => items_raw = Some(value),
            QUANTITIES_PARAM => quantities_raw = Some(value),
            TAX_PARAM => tax_percent = parse_percent(&decode_component(value)),
            TIP_PARAM => tip_percent = parse_percent(&decode_component(value)),
            _ => {}
        }
    }

    if people_raw.is_none() && items_raw.is_none() {
        return None;
    }

    let mut seen = HashSet::new();
    let mut people = Vec::new();
    // Position in the link -> id in the decoded bill.
    let mut person_ids = Vec::new();
    for raw in people_raw.unwrap_or_default().split(',') {
        let name = decode_component(raw).trim().to_string();
        if name.is_empty() || !seen.insert(name_key(&name)) {
            person_ids.push(None);
            continue;
        }
        let id = PersonId(people.len() as u64);
        people.push(Person { id, name });
        person_ids.push(Some(id));
    }

    seen.clear();
    let mut items = Vec::new();
    let mut item_ids = Vec::new();
    for raw in items_raw.unwrap_or_default().split(';') {
        let (raw_name, raw_price) = raw.rsplit_once(':').unwrap_or((raw, ""));
        let name = decode_component(raw_name).trim().to_string();
        if name.is_empty() || !seen.insert(name_key(&name)) {
            item_ids.push(None);
            continue;
        }
        let id = ItemId(items.len() as u64);
        items.push(StoredItem {
            id,
            name,
            price: parse_price(&decode_component(raw_price)),
            person_quantities: Some(Default::default()),
            shared_by: None,
            person_amounts: None,
        });
        item_ids.push(Some(id));
    }

    for triple in quantities_raw
        .unwrap_or_default()
        .split(',')
        .filter(|t| !t.is_empty())
    {
        let parsed = triple.split_once(':').and_then(|(pair, quantity)| {
            let (item_idx, person_idx) = pair.split_once('-')?;
            Some((
                item_idx.trim().parse::<usize>().ok()?,
                person_idx.trim().parse::<usize>().ok()?,
                parse_quantity(&decode_component(quantity))?,
            ))
        });
        let Some((item_idx, person_idx, quantity)) = parsed else {
            tracing::warn!("skipping malformed quantity triple '{triple}'");
            continue;
        };
        let (Some(Some(item_id)), Some(Some(person_id))) =
            (item_ids.get(item_idx), person_ids.get(person_idx))
        else {
            tracing::warn!("skipping quantity triple '{triple}': index out of range");
            continue;
        };
        if let Some(quantities) = items
            .get_mut(item_id.0 as usize)
            .and_then(|item| item.person_quantities.as_mut())
        {
            quantities.insert(*person_id, quantity);
        }
    }

    Some(Snapshot {
        next_person_id: people.len() as u64,
        next_item_id: items.len() as u64,
        people,
        items,
        tax_percent,
        tip_percent,
        display_transposed: false,
        undo: Vec::new(),
        saved_at: None,
    })
}

/// Removes the shared-bill parameters from `query`, keeping anything else.
pub fn clear(query: &str) -> String {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            !pair.is_empty() && !PARAMS.contains(&key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BillStore {
        let mut store = BillStore::default();
        let amy = store.add_person("Amy").unwrap();
        let bo = store.add_person("Bo").unwrap();
        let pizza = store.add_item("Pizza", 20.0).unwrap();
        let salad = store.add_item("Salad", 8.5).unwrap();
        store.set_quantity(pizza, amy, "1");
        store.set_quantity(pizza, bo, "1");
        store.set_quantity(salad, bo, "2.5");
        store.set_tax_percent(8.0);
        store.set_tip_percent(15.0);
        store
    }

    #[test]
    fn encodes_compact_query() {
        assert_eq!(
            encode(&sample()),
            "people=Amy,Bo&items=Pizza:20;Salad:8.5&q=0-0:1,0-1:1,1-1:2.5&tax=8&tip=15"
        );
    }

    #[test]
    fn defaults_are_omitted() {
        let mut store = BillStore::default();
        store.add_person("Amy").unwrap();
        assert_eq!(encode(&store), "people=Amy&items=");
    }

    #[test]
    fn positions_replace_ids() {
        let mut store = sample();
        // Leave a gap in the ids: positions must still start at 0.
        store.remove_person(PersonId(0));
        let query = encode(&store);
        assert!(query.contains("q=0-0:1,1-0:2.5"));

        let decoded = decode(&query).unwrap().into_store(10).unwrap();
        assert_eq!(decoded.people()[0].id, PersonId(0));
        assert_eq!(decoded.people()[0].name, "Bo");
    }

    #[test]
    fn names_with_separators() {
        let mut store = BillStore::default();
        let p = store.add_person("Jo, Jr. & co").unwrap();
        let i = store.add_item("Fish:chips; large", 12.25).unwrap();
        store.set_quantity(i, p, "1");

        let query = encode(&store);
        let decoded = decode(&query).unwrap();
        assert_eq!(decoded.people[0].name, "Jo, Jr. & co");
        assert_eq!(decoded.items[0].name, "Fish:chips; large");
        assert_eq!(decoded.items[0].price, 12.25);
    }

    #[test]
    fn decodes_plus_as_space() {
        let decoded = decode("people=Mary+Ann&items=").unwrap();
        assert_eq!(decoded.people[0].name, "Mary Ann");
    }

    #[test]
    fn skips_out_of_range_triples() {
        let decoded = decode("?people=Amy&items=Pizza:10&q=0-0:2,0-5:1,3-0:1,x,0-0").unwrap();
        let quantities = decoded.items[0].person_quantities.as_ref().unwrap();
        assert_eq!(quantities.len(), 1);
        assert_eq!(quantities[&PersonId(0)], 2.0);
    }

    #[test]
    fn drops_empty_and_duplicate_names() {
        let decoded = decode("people=Amy,,amy,Bo&items=Pizza:10&q=0-3:1,0-2:4").unwrap();
        let names: Vec<_> = decoded.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Bo"]);
        let quantities = decoded.items[0].person_quantities.as_ref().unwrap();
        assert_eq!(quantities.len(), 1);
        assert_eq!(quantities[&PersonId(1)], 1.0);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let decoded = decode("people=Amy&items=Pizza:abc&tax=x&tip=7").unwrap();
        assert_eq!(decoded.items[0].price, 0.0);
        assert_eq!(decoded.tax_percent, 0.0);
        assert_eq!(decoded.tip_percent, 7.0);
    }

    #[test]
    fn no_bill_in_query() {
        assert!(decode("").is_none());
        assert!(decode("?utm_source=mail").is_none());
        assert!(!is_shared("tax=5"));
        assert!(is_shared("?people=Amy"));
    }

    #[test]
    fn clear_keeps_foreign_params() {
        assert_eq!(
            clear("?people=Amy&utm=x&items=Pizza:1&q=0-0:1&tax=5&tip=1&lang=it"),
            "utm=x&lang=it"
        );
        assert_eq!(clear("people=Amy"), "");
    }

    #[test]
    fn round_trip() {
        let store = sample();
        let decoded = decode(&encode(&store)).unwrap().into_store(10).unwrap();

        assert_eq!(decoded.people(), store.people());
        assert_eq!(decoded.items(), store.items());
        assert_eq!(decoded.config().tax_percent, 8.0);
        assert_eq!(decoded.config().tip_percent, 15.0);
        assert!(!decoded.can_undo());
    }
}
