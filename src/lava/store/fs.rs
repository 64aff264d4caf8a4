use super::{ConfigStore, StoredEntry};
use crate::error::{LavaError, Result};
use once_cell::unsync::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// Single-file JSON store. Nothing is read until the first access, and every
/// `put` rewrites the whole file before returning.
pub struct FileStore {
    path: PathBuf,
    data: OnceCell<Namespaces>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn loaded(&self) -> Result<&Namespaces> {
        self.data.get_or_try_init(|| load(&self.path))
    }

    fn save(&self, data: &Namespaces) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.access_error("create", e))?;
            }
        }
        let mut content = serde_json::to_string_pretty(data)?;
        content.push('\n');
        fs::write(&self.path, content).map_err(|e| self.access_error("write", e))?;
        Ok(())
    }

    fn access_error(&self, action: &str, err: std::io::Error) -> LavaError {
        LavaError::Store(format!(
            "cannot {} {}: {}",
            action,
            self.path.display(),
            err
        ))
    }
}

fn load(path: &Path) -> Result<Namespaces> {
    if !path.exists() {
        debug!(path = %path.display(), "No configuration file yet");
        return Ok(Namespaces::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| LavaError::Store(format!("cannot read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(Namespaces::new());
    }
    serde_json::from_str(&content).map_err(|e| {
        LavaError::Store(format!(
            "{} is not a valid configuration file: {}",
            path.display(),
            e
        ))
    })
}

impl ConfigStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .loaded()?
            .get(namespace)
            .and_then(|values| values.get(key))
            .cloned())
    }

    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let mut data = match self.data.take() {
            Some(data) => data,
            None => load(&self.path)?,
        };
        data.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        let saved = self.save(&data);
        let _ = self.data.set(data);
        saved?;

        info!(namespace, key, path = %self.path.display(), "Stored parameter");
        Ok(())
    }

    fn entries(&self) -> Result<Vec<StoredEntry>> {
        Ok(self
            .loaded()?
            .iter()
            .flat_map(|(namespace, values)| {
                values.iter().map(move |(key, value)| StoredEntry {
                    namespace: namespace.clone(),
                    key: key.clone(),
                    value: value.clone(),
                })
            })
            .collect())
    }
}
