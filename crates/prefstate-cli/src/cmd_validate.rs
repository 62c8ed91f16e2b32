use anyhow::{Context, Result, bail};
use prefstate_store::{DomainResolver, Store};
use std::path::PathBuf;

pub fn run(root: Option<PathBuf>, domain: &str) -> Result<()> {
    let store = open_store(root);
    if !store.exists(domain)? {
        bail!("no document for domain {domain}");
    }

    let doc = store
        .load(domain)
        .with_context(|| format!("failed to decode document for {domain}"))?;

    println!("Valid: {} ({} top-level entries)", domain, doc.root.len());
    for (key, value) in &doc.root {
        println!("  {}: {}", key, value.kind());
    }
    Ok(())
}

fn open_store(root: Option<PathBuf>) -> Store {
    match root {
        Some(root) => Store::with_resolver(DomainResolver::new().with_root(root)),
        None => Store::new(),
    }
}
