//! CLI command implementations
//!
//! Each invocation loads the config, opens the catalog (loading every entity
//! file), runs one command and prints its result as JSON.

use std::path::Path;

use serde_json::{json, Value};

use crate::catalog::{Catalog, Catalogued};
use crate::entities::{Course, Department, Enrollment, Instructor, PhoneNumber, Student};
use crate::observability::{Event, Logger};
use crate::persistence::{Fields, LineRecord};
use crate::store::{EntityKind, RecordId};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Calls `$func::<R>(args..)` with `R` the record type of `$kind`.
macro_rules! for_kind {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Department => $func::<Department>($($arg),*),
            EntityKind::Instructor => $func::<Instructor>($($arg),*),
            EntityKind::Student => $func::<Student>($($arg),*),
            EntityKind::Course => $func::<Course>($($arg),*),
            EntityKind::Enrollment => $func::<Enrollment>($($arg),*),
            EntityKind::Phone => $func::<PhoneNumber>($($arg),*),
        }
    };
}

/// Load config from `config_path`, run `command`, print the result.
pub fn run_command(command: Command, config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let value = execute(command, &config)?;
    write_response(value)
}

/// Run `command` against the catalog described by `config`.
pub fn execute(command: Command, config: &Config) -> CliResult<Value> {
    Logger::set_min_severity(config.severity()?);
    Logger::info(Event::ConfigLoaded, &[("data_dir", config.data_dir.as_str())]);

    let catalog = Catalog::open(config.data_path(), config.catalog_options())?;

    match command {
        Command::Init => init(&catalog),
        Command::Stats => Ok(serde_json::to_value(catalog.stats())?),
        Command::Show { kind } => for_kind!(kind, show(&catalog)),
        Command::Get { kind, id } => for_kind!(kind, get(&catalog, id)),
        Command::Find { kind, key } => for_kind!(kind, find(&catalog, &key)),
        Command::Add {
            kind: EntityKind::Phone,
            line,
        } => add_phone(&catalog, &line),
        Command::Add { kind, line } => for_kind!(kind, add(&catalog, &line)),
        Command::Delete { kind, id } => for_kind!(kind, delete(&catalog, id)),
    }
}

fn init(catalog: &Catalog) -> CliResult<Value> {
    let stats = catalog.stats();
    let records: usize = stats.stores.iter().map(|s| s.live).sum();
    Ok(json!({
        "data_dir": catalog.data_dir().display().to_string(),
        "records": records,
    }))
}

fn show<R: Catalogued>(catalog: &Catalog) -> CliResult<Value> {
    let rendered = catalog.store::<R>().render_all(|record| serde_json::to_value(record));
    let values = rendered.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(values))
}

fn get<R: Catalogued>(catalog: &Catalog, id: RecordId) -> CliResult<Value> {
    let record = catalog.get::<R>(id).ok_or(CliError::NoMatch {
        kind: R::KIND,
        key: id.to_string(),
    })?;
    Ok(serde_json::to_value(record)?)
}

fn find<R: Catalogued>(catalog: &Catalog, key: &str) -> CliResult<Value> {
    let record = catalog.find::<R>(key).ok_or_else(|| CliError::NoMatch {
        kind: R::KIND,
        key: key.to_string(),
    })?;
    Ok(serde_json::to_value(record)?)
}

fn add<R: Catalogued>(catalog: &Catalog, line: &str) -> CliResult<Value> {
    let record = R::decode(line)
        .map_err(|e| CliError::invalid_argument(format!("bad {} line: {}", R::KIND, e)))?;
    let value = serde_json::to_value(&record)?;
    catalog.insert(record)?;
    Ok(value)
}

fn add_phone(catalog: &Catalog, line: &str) -> CliResult<Value> {
    let mut fields = Fields::new(line);
    let parsed = fields
        .parse::<RecordId>("instructor_id")
        .and_then(|instructor_id| Ok((instructor_id, fields.text("phone")?)));
    let (instructor_id, phone) = parsed
        .map_err(|e| CliError::invalid_argument(format!("bad phone line: {}", e)))?;
    fields
        .finish()
        .map_err(|e| CliError::invalid_argument(format!("bad phone line: {}", e)))?;

    let added = catalog.add_instructor_phone(instructor_id, phone)?;
    Ok(serde_json::to_value(added)?)
}

fn delete<R: Catalogued>(catalog: &Catalog, id: RecordId) -> CliResult<Value> {
    let removed = catalog.delete::<R>(id)?;
    Ok(serde_json::to_value(removed)?)
}
