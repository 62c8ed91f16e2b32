use crate::value_arg::{ValueType, parse_value};
use anyhow::{Context, Result};
use prefstate::v1::EntryPath;
use prefstate_store::{DomainResolver, Store};
use std::path::PathBuf;

pub fn run(
    root: Option<PathBuf>,
    domain: &str,
    path: &str,
    value_type: ValueType,
    raw: &str,
    pretty: bool,
) -> Result<()> {
    let store = open_store(root);
    let entry = EntryPath::parse(path).with_context(|| format!("invalid entry path {path:?}"))?;
    let desired = parse_value(value_type, raw)?;

    let outcome = store
        .converge(domain, &entry, desired)
        .with_context(|| format!("failed to converge {domain}:{path}"))?;

    let json = if pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{}", json);
    Ok(())
}

fn open_store(root: Option<PathBuf>) -> Store {
    match root {
        Some(root) => Store::with_resolver(DomainResolver::new().with_root(root)),
        None => Store::new(),
    }
}
