use crate::error::{Result, StoreError};
use std::env;
use std::path::{Path, PathBuf};

/// Maps logical domain names (`com.example.calendar`) to on-disk document
/// files under a root directory.
///
/// The default root is `~/.prefstate`; tests point it at a temp directory
/// via [`DomainResolver::with_root`].
#[derive(Debug, Clone)]
pub struct DomainResolver {
    home_dir: Option<PathBuf>,
    root: Option<PathBuf>,
}

impl Default for DomainResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainResolver {
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
            root: None,
        }
    }

    pub fn with_home<P: Into<PathBuf>>(mut self, home: P) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.root {
            return Ok(root.clone());
        }
        let home = self
            .home_dir
            .as_deref()
            .ok_or(StoreError::NoHomeDirectory)?;
        Ok(home.join(".prefstate"))
    }

    /// The file holding `domain`'s document, for a codec using `extension`.
    ///
    /// Domain names are plain identifiers; anything that would escape the
    /// root directory is rejected.
    pub fn document_path(&self, domain: &str, extension: &str) -> Result<PathBuf> {
        validate_domain(domain)?;
        Ok(self.root()?.join(format!("{}.{}", domain, extension)))
    }

    /// Domains that currently have a document on disk.
    pub fn list_domains(&self, extension: &str) -> Result<Vec<String>> {
        let root = self.root()?;
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut domains = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some(extension)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                domains.push(stem.to_string());
            }
        }
        domains.sort();
        Ok(domains)
    }

    pub fn exists(&self) -> bool {
        self.root().map(|p| p.exists()).unwrap_or(false)
    }
}

fn validate_domain(domain: &str) -> Result<()> {
    let ok = !domain.is_empty()
        && !domain.contains(['/', '\\'])
        && !Path::new(domain).components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir | std::path::Component::RootDir
            )
        });
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidDomain(domain.to_string()))
    }
}

mod dirs {
    use super::*;

    pub fn home_dir() -> Option<PathBuf> {
        env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_root_under_home() {
        let resolver = DomainResolver::new().with_home("/custom/home");
        assert_eq!(resolver.root().unwrap(), PathBuf::from("/custom/home/.prefstate"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let resolver = DomainResolver::new()
            .with_home("/custom/home")
            .with_root("/srv/prefs");
        assert_eq!(resolver.root().unwrap(), PathBuf::from("/srv/prefs"));
    }

    #[test]
    fn test_document_path() {
        let resolver = DomainResolver::new().with_root("/srv/prefs");
        assert_eq!(
            resolver.document_path("com.example.calendar", "json").unwrap(),
            PathBuf::from("/srv/prefs/com.example.calendar.json")
        );
    }

    #[test]
    fn test_rejects_escaping_domains() {
        let resolver = DomainResolver::new().with_root("/srv/prefs");
        assert!(matches!(
            resolver.document_path("../etc/passwd", "json"),
            Err(StoreError::InvalidDomain(_))
        ));
        assert!(matches!(
            resolver.document_path("a/b", "json"),
            Err(StoreError::InvalidDomain(_))
        ));
        assert!(matches!(
            resolver.document_path("", "json"),
            Err(StoreError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_list_domains() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("com.a.json"), "{}").unwrap();
        fs::write(temp.path().join("com.b.json"), "{}").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();

        let resolver = DomainResolver::new().with_root(temp.path());
        let domains = resolver.list_domains("json").unwrap();
        assert_eq!(domains, vec!["com.a".to_string(), "com.b".to_string()]);
    }

    #[test]
    fn test_list_domains_no_root() {
        let temp = TempDir::new().unwrap();
        let resolver = DomainResolver::new().with_root(temp.path().join("missing"));
        assert!(resolver.list_domains("json").unwrap().is_empty());
        assert!(!resolver.exists());
    }
}
