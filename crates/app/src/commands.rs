//! Applies one shell command to the bill.

use std::fs;

use engine::{
    BillStore, EditTarget, EngineError, ItemId, PersonId,
    numbers::{format_quantity, parse_percent, parse_price},
    share,
};

use crate::{
    cli::{Command, ExportArgs, ItemCommand, PersonCommand},
    error::Result,
    render,
};

/// What a command produced.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    /// Text for the user.
    pub output: String,
    /// The bill changed and must be saved.
    pub changed: bool,
}

impl Outcome {
    fn changed(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            changed: true,
        }
    }

    fn unchanged(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            changed: false,
        }
    }
}

fn person_id(store: &BillStore, name: &str) -> Result<PersonId> {
    store
        .person_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| EngineError::NotFound(format!("no person named \"{name}\"")).into())
}

fn item_id(store: &BillStore, name: &str) -> Result<ItemId> {
    store
        .item_by_name(name)
        .map(|i| i.id)
        .ok_or_else(|| EngineError::NotFound(format!("no item named \"{name}\"")).into())
}

fn rejected(what: String) -> crate::error::AppError {
    EngineError::InvalidInput(what).into()
}

pub fn apply(store: &mut BillStore, command: &Command, persist_undo: bool) -> Result<Outcome> {
    let outcome = match command {
        Command::Show => Outcome::unchanged(render::bill(store)),
        Command::Person(args) => person(store, &args.command)?,
        Command::Item(args) => item(store, &args.command)?,
        Command::Assign {
            item,
            person,
            quantity,
        } => {
            let item = item_id(store, item)?;
            let person = person_id(store, person)?;
            store.set_quantity(item, person, quantity);
            Outcome::changed(render::bill(store))
        }
        Command::Split { item } => {
            let id = item_id(store, item)?;
            store.split_evenly(id);
            Outcome::changed(render::bill(store))
        }
        Command::Clear { item } => {
            let id = item_id(store, item)?;
            store.clear_quantities(id);
            Outcome::changed(render::bill(store))
        }
        Command::Shuffle => {
            store.shuffle_quantities();
            Outcome::changed(render::bill(store))
        }
        Command::Undo => match store.undo()? {
            Some(entry) => Outcome::changed(format!("restored {}", entry.label())),
            None => Outcome::unchanged("nothing to undo"),
        },
        Command::Tax { percent } => {
            store.set_tax_percent(parse_percent(percent));
            Outcome::changed(format!(
                "tax set to {}%",
                format_quantity(store.config().tax_percent)
            ))
        }
        Command::Tip { percent } => {
            store.set_tip_percent(parse_percent(percent));
            Outcome::changed(format!(
                "tip set to {}%",
                format_quantity(store.config().tip_percent)
            ))
        }
        Command::Transpose => {
            store.toggle_transposed();
            Outcome::changed(render::bill(store))
        }
        Command::Reset => {
            store.reset();
            Outcome::changed("the bill is empty")
        }
        Command::Share => Outcome::unchanged(share::encode(store)),
        Command::Export(args) => export(store, args, persist_undo)?,
        Command::Import { path } => {
            let json = fs::read_to_string(path)?;
            store.import_json(&json)?;
            Outcome::changed(render::bill(store))
        }
    };
    Ok(outcome)
}

fn person(store: &mut BillStore, command: &PersonCommand) -> Result<Outcome> {
    match command {
        PersonCommand::Add { name } => {
            store.add_person(name)?;
            Ok(Outcome::changed(render::bill(store)))
        }
        PersonCommand::Remove { name } => {
            let id = person_id(store, name)?;
            store.remove_person(id);
            Ok(Outcome::changed(format!(
                "removed {name}, `splitbill undo` brings them back"
            )))
        }
        PersonCommand::Rename { name, new_name } => {
            let id = person_id(store, name)?;
            let edit = store
                .begin_edit(EditTarget::Person(id))
                .ok_or_else(|| EngineError::NotFound(name.clone()))?
                .name(new_name.as_str());
            if !store.commit_edit(edit) {
                return Err(rejected(format!(
                    "cannot rename {name} to \"{new_name}\": blank or already taken"
                )));
            }
            Ok(Outcome::changed(render::bill(store)))
        }
    }
}

fn item(store: &mut BillStore, command: &ItemCommand) -> Result<Outcome> {
    match command {
        ItemCommand::Add { name, price } => {
            store.add_item(name, parse_price(price))?;
            Ok(Outcome::changed(render::bill(store)))
        }
        ItemCommand::Remove { name } => {
            let id = item_id(store, name)?;
            store.remove_item(id);
            Ok(Outcome::changed(format!(
                "removed {name}, `splitbill undo` brings it back"
            )))
        }
        ItemCommand::Rename {
            name,
            new_name,
            price,
        } => {
            let id = item_id(store, name)?;
            let mut edit = store
                .begin_edit(EditTarget::Item(id))
                .ok_or_else(|| EngineError::NotFound(name.clone()))?;
            if let Some(new_name) = new_name {
                edit = edit.name(new_name.as_str());
            }
            if let Some(price) = price {
                edit = edit.price(price.as_str());
            }
            if !store.commit_edit(edit) {
                return Err(rejected(format!(
                    "cannot update {name}: blank or taken name, or a price that is not > 0"
                )));
            }
            Ok(Outcome::changed(render::bill(store)))
        }
    }
}

fn export(store: &BillStore, args: &ExportArgs, persist_undo: bool) -> Result<Outcome> {
    let payload = if args.csv && args.totals {
        render::totals_csv(store)?
    } else if args.csv {
        let table = store.table().ok_or(crate::error::AppError::EmptyBill)?;
        render::table_csv(&table)?
    } else {
        store.export_json(persist_undo)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, payload)?;
            Ok(Outcome::unchanged(format!("exported to {}", path.display())))
        }
        None => Ok(Outcome::unchanged(payload)),
    }
}
