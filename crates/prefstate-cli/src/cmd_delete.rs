use anyhow::{Context, Result};
use prefstate::v1::EntryPath;
use prefstate_store::{DomainResolver, Store};
use std::path::PathBuf;

pub fn run(root: Option<PathBuf>, domain: &str, path: &str, pretty: bool) -> Result<()> {
    let store = open_store(root);
    let entry = EntryPath::parse(path).with_context(|| format!("invalid entry path {path:?}"))?;

    let outcome = store
        .delete(domain, &entry)
        .with_context(|| format!("failed to delete {domain}:{path}"))?;

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
