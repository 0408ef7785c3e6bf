use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Key under which upstream inference stores its results.
pub const INTERACTIONS_KEY: &str = "nichenet_lr_res";

/// Key under which the dot-plot view is cached back into a dataset.
pub const FILTERED_KEY: &str = "nichenet_res_filtered";

// ---------------------------------------------------------------------------
// InteractionRow – one predicted ligand-receptor pair
// ---------------------------------------------------------------------------

/// A single row of an interactions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRow {
    /// Sending cell type.
    pub source: String,
    /// Receiving cell type.
    pub target: String,
    pub ligand_complex: String,
    pub receptor_complex: String,
    /// Non-negative interaction score.
    pub weight: f64,
}

impl InteractionRow {
    /// Look up a numeric column by name, for plots parameterised by field.
    pub fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "weight" => Some(self.weight),
            _ => None,
        }
    }

    /// `"ligand -> receptor"` label used on dot-plot rows.
    pub fn interaction_label(&self) -> String {
        format!("{} -> {}", self.ligand_complex, self.receptor_complex)
    }
}

// ---------------------------------------------------------------------------
// InteractionTable – row-oriented table of interactions
// ---------------------------------------------------------------------------

/// An ordered collection of [`InteractionRow`]s.  Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionTable {
    pub rows: Vec<InteractionRow>,
}

impl InteractionTable {
    pub fn new(rows: Vec<InteractionRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionRow> {
        self.rows.iter()
    }

    /// Every distinct source and target label appearing in the table.
    pub fn cell_types(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|r| [r.source.as_str(), r.target.as_str()])
            .collect()
    }

    /// Largest weight, `None` for an empty table.
    pub fn max_weight(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.weight).reduce(f64::max)
    }
}

impl FromIterator<InteractionRow> for InteractionTable {
    fn from_iter<I: IntoIterator<Item = InteractionRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded container
// ---------------------------------------------------------------------------

/// A loaded dataset: its identifier and the unstructured `uns` store.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub uns: BTreeMap<String, InteractionTable>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uns: BTreeMap::new(),
        }
    }

    /// Table stored under `key`, if any.
    pub fn table(&self, key: &str) -> Option<&InteractionTable> {
        self.uns.get(key)
    }

    /// Store `table` under `key`, replacing whatever was there.
    pub fn put_table(&mut self, key: &str, table: InteractionTable) {
        self.uns.insert(key.to_string(), table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::row;

    #[test]
    fn numeric_lookup_only_knows_weight() {
        let r = row("Adipocytes", "SMCs", "Lep", "Lepr", 1.1);
        assert_eq!(r.numeric("weight"), Some(1.1));
        assert_eq!(r.numeric("lr_means"), None);
        assert_eq!(r.interaction_label(), "Lep -> Lepr");
    }

    #[test]
    fn put_table_overwrites() {
        let mut ds = Dataset::new("8w_ctrl_male");
        ds.put_table(FILTERED_KEY, InteractionTable::new(vec![row("A", "B", "l", "r", 2.0)]));
        ds.put_table(FILTERED_KEY, InteractionTable::default());
        assert!(ds.table(FILTERED_KEY).unwrap().is_empty());
        assert!(ds.table(INTERACTIONS_KEY).is_none());
    }

    #[test]
    fn cell_types_and_max_weight() {
        let table: InteractionTable = vec![
            row("Adipocytes", "Fibroblasts", "A", "B", 0.3),
            row("Pericytes", "Adipocytes", "C", "D", 2.5),
        ]
        .into_iter()
        .collect();
        let types: Vec<_> = table.cell_types().into_iter().collect();
        assert_eq!(types, vec!["Adipocytes", "Fibroblasts", "Pericytes"]);
        assert_eq!(table.max_weight(), Some(2.5));
        assert_eq!(InteractionTable::default().max_weight(), None);
    }
}
