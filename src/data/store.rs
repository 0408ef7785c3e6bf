use std::path::PathBuf;

use super::loader::load_dataset;
use super::model::Dataset;
use crate::error::DatasetLoadError;

// ---------------------------------------------------------------------------
// DatasetStore – every dataset, resident for the whole session
// ---------------------------------------------------------------------------

/// All configured datasets, kept in load order.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    datasets: Vec<Dataset>,
}

impl DatasetStore {
    /// Load every `(name, path)` in order.  The first failure aborts: a file
    /// that is missing, unreadable, or has no table under `required_key`.
    pub fn load(entries: &[(String, PathBuf)], required_key: &str) -> Result<Self, DatasetLoadError> {
        let mut datasets = Vec::with_capacity(entries.len());

        for (name, path) in entries {
            if !path.exists() {
                return Err(DatasetLoadError::Missing {
                    name: name.clone(),
                    path: path.clone(),
                });
            }

            let dataset = load_dataset(name, path).map_err(|e| DatasetLoadError::Unreadable {
                name: name.clone(),
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;

            let Some(table) = dataset.table(required_key) else {
                return Err(DatasetLoadError::MissingKey {
                    name: name.clone(),
                    key: required_key.to_string(),
                });
            };

            log::info!(
                "Loaded dataset '{name}' with {} interactions from {}",
                table.len(),
                path.display()
            );
            datasets.push(dataset);
        }

        Ok(Self { datasets })
    }

    /// Wrap datasets that are already in memory.
    #[cfg(test)]
    pub fn from_datasets(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    /// Dataset names in load order.
    pub fn names(&self) -> Vec<String> {
        self.datasets.iter().map(|d| d.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.datasets.iter_mut().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// `(dataset, label)` pairs for cell types present in a dataset's `key`
    /// table but missing from `known`.  Such rows can never be selected.
    pub fn unlisted_labels(&self, key: &str, known: &[String]) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for dataset in &self.datasets {
            let Some(table) = dataset.table(key) else {
                continue;
            };
            for label in table.cell_types() {
                if !known.iter().any(|k| k == label) {
                    out.push((dataset.name.clone(), label.to_string()));
                }
            }
        }
        out
    }
}
