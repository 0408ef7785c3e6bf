use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::{FILTERED_KEY, INTERACTIONS_KEY};
use crate::error::DatasetLoadError;

/// Optional override file, looked up in the working directory.
pub const CONFIG_FILE: &str = "lr_viewer.json";

const CELL_TYPES: [&str; 8] = [
    "Adipocytes",
    "Endothelial_Cells",
    "Fibroblasts",
    "Immune_Cells",
    "Mesothelial_Cells",
    "Neuronal_Cells",
    "Pericytes",
    "SMCs",
];

const DATASETS: [(&str, &str); 8] = [
    ("8w_ctrl_male", "pvat_8weeks_control_male.parquet"),
    ("8w_ctrl_female", "pvat_8weeks_control_female.parquet"),
    ("8w_hf_male", "pvat_8weeks_hf_male.parquet"),
    ("8w_hf_female", "pvat_8weeks_hf_female.parquet"),
    ("24w_ctrl_male", "pvat_24weeks_control_male.parquet"),
    ("24w_ctrl_female", "pvat_24weeks_control_female.parquet"),
    ("24w_hf_male", "pvat_24weeks_hf_male.parquet"),
    ("24w_hf_female", "pvat_24weeks_hf_female.parquet"),
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One named dataset and the file it is loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    /// Relative paths resolve against [`ViewerConfig::data_dir`].
    pub file: PathBuf,
}

/// Everything the viewer needs to know before the window opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    /// Loaded in this order; the first one is selected initially.
    pub datasets: Vec<DatasetEntry>,
    pub source_labels: Vec<String>,
    pub target_labels: Vec<String>,
    /// Rows must exceed this weight to appear in the heatmap.
    pub heatmap_threshold: f64,
    /// Rows must exceed this weight to appear in the dot plot.
    pub dotplot_threshold: f64,
    pub interactions_key: String,
    pub filtered_key: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            datasets: DATASETS
                .iter()
                .map(|(name, file)| DatasetEntry {
                    name: name.to_string(),
                    file: PathBuf::from(file),
                })
                .collect(),
            source_labels: CELL_TYPES.iter().map(|s| s.to_string()).collect(),
            target_labels: CELL_TYPES.iter().map(|s| s.to_string()).collect(),
            heatmap_threshold: 0.8,
            dotplot_threshold: 1.25,
            interactions_key: INTERACTIONS_KEY.to_string(),
            filtered_key: FILTERED_KEY.to_string(),
        }
    }
}

impl ViewerConfig {
    /// Defaults, overridden by `path` when that file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, DatasetLoadError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let to_error = |reason: String| DatasetLoadError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| to_error(e.to_string()))?;
        log::info!("Read configuration from {}", path.display());
        Ok(config)
    }

    /// `(name, resolved path)` for every configured dataset, in order.
    pub fn dataset_paths(&self) -> Vec<(String, PathBuf)> {
        self.datasets
            .iter()
            .map(|entry| (entry.name.clone(), self.data_dir.join(&entry.file)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_match_the_study_layout() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.datasets.len(), 8);
        assert_eq!(cfg.datasets[0].name, "8w_ctrl_male");
        assert_eq!(cfg.source_labels, cfg.target_labels);
        assert_eq!(cfg.source_labels.len(), 8);
        assert_eq!(cfg.heatmap_threshold, 0.8);
        assert_eq!(cfg.dotplot_threshold, 1.25);
        assert_eq!(cfg.interactions_key, "nichenet_lr_res");
        assert_eq!(cfg.filtered_key, "nichenet_res_filtered");
    }

    #[test]
    fn dataset_paths_resolve_against_data_dir() {
        let cfg = ViewerConfig::default();
        let paths = cfg.dataset_paths();
        assert_eq!(
            paths[7].1,
            PathBuf::from("data").join("pvat_24weeks_hf_female.parquet")
        );
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = ViewerConfig::load_or_default(Path::new("no/such/lr_viewer.json")).unwrap();
        assert_eq!(cfg, ViewerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"data_dir": "/srv/pvat", "heatmap_threshold": 0.5}}"#).unwrap();
        file.flush().unwrap();

        let cfg = ViewerConfig::load_or_default(file.path()).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/pvat"));
        assert_eq!(cfg.heatmap_threshold, 0.5);
        assert_eq!(cfg.dotplot_threshold, 1.25);
        assert_eq!(cfg.datasets.len(), 8);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();

        let err = ViewerConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, DatasetLoadError::Config { .. }));
    }
}
