use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use crate::data::filter::for_pair;
use crate::data::model::InteractionTable;

use super::Outcome;

pub const TITLE: &str = "Ligand-Receptor Interaction Heatmap";
pub const X_LABEL: &str = "Receptor Complex";
pub const Y_LABEL: &str = "Ligand Complex";

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

/// Ligand x receptor weight matrix.
///
/// Rows and columns are sorted by label.  Several rows landing in the same
/// cell are averaged; cells without any row hold 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapMatrix {
    pub ligands: Vec<String>,
    pub receptors: Vec<String>,
    /// `values[ligand_idx][receptor_idx]`
    pub values: Vec<Vec<f64>>,
}

impl HeatmapMatrix {
    pub fn pivot(table: &InteractionTable) -> Self {
        let mut sums: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
        let mut ligands = BTreeSet::new();
        let mut receptors = BTreeSet::new();

        for row in table.iter() {
            ligands.insert(row.ligand_complex.as_str());
            receptors.insert(row.receptor_complex.as_str());
            let cell = sums
                .entry((row.ligand_complex.as_str(), row.receptor_complex.as_str()))
                .or_insert((0.0, 0));
            cell.0 += row.weight;
            cell.1 += 1;
        }

        let values = ligands
            .iter()
            .map(|l| {
                receptors
                    .iter()
                    .map(|r| match sums.get(&(*l, *r)) {
                        Some((sum, n)) => sum / *n as f64,
                        None => 0.0,
                    })
                    .collect()
            })
            .collect();

        Self {
            ligands: ligands.into_iter().map(String::from).collect(),
            receptors: receptors.into_iter().map(String::from).collect(),
            values,
        }
    }

    /// Cell value; 0 for any combination the matrix has no row for.
    pub fn get(&self, ligand: &str, receptor: &str) -> f64 {
        let li = self.ligands.iter().position(|l| l == ligand);
        let ri = self.receptors.iter().position(|r| r == receptor);
        match (li, ri) {
            (Some(li), Some(ri)) => self.values[li][ri],
            _ => 0.0,
        }
    }

    /// `(min, max)` over every cell, fill zeros included.
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Write the matrix as CSV: a `ligand_complex` column then one column
    /// per receptor.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        let mut header = vec!["ligand_complex".to_string()];
        header.extend(self.receptors.iter().cloned());
        out.write_record(&header)?;

        for (ligand, row) in self.ligands.iter().zip(&self.values) {
            let mut record = vec![ligand.clone()];
            record.extend(row.iter().map(|v| v.to_string()));
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Everything needed to paint one heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapFigure {
    pub dataset: String,
    pub source: String,
    pub target: String,
    pub matrix: HeatmapMatrix,
    /// Rows that fed the matrix, before aggregation.
    pub row_count: usize,
}

/// Restrict `filtered` to the `(source, target)` pair and pivot it.
pub fn build_heatmap(
    dataset: &str,
    filtered: &InteractionTable,
    source: &str,
    target: &str,
) -> Outcome<HeatmapFigure> {
    let pair = for_pair(filtered, source, target);
    if pair.is_empty() {
        return Outcome::Empty {
            message: format!(
                "No interactions from {source} to {target} pass the heatmap threshold in {dataset}."
            ),
        };
    }

    Outcome::Ready(HeatmapFigure {
        dataset: dataset.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        matrix: HeatmapMatrix::pivot(&pair),
        row_count: pair.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::above_weight;
    use crate::data::fixtures::{mixed_table, row};

    #[test]
    fn unique_cell_reads_back_its_weight() {
        let pair = for_pair(&mixed_table(), "Adipocytes", "Fibroblasts");
        let m = HeatmapMatrix::pivot(&pair);
        assert_eq!(m.ligands, vec!["Adipoq", "Lep"]);
        assert_eq!(m.receptors, vec!["Adipor1", "Adipor2", "Lepr"]);
        assert_eq!(m.get("Lep", "Lepr"), 1.9);
        assert_eq!(m.get("Adipoq", "Adipor2"), 0.4);
        assert_eq!(m.get("Lep", "Adipor1"), 0.0);
        assert_eq!(m.get("Unknown", "Lepr"), 0.0);
    }

    #[test]
    fn collisions_are_averaged() {
        let table = InteractionTable::new(vec![
            row("Adipocytes", "SMCs", "A", "B", 1.0),
            row("Adipocytes", "SMCs", "A", "B", 2.0),
            row("Adipocytes", "SMCs", "A", "B", 4.5),
        ]);
        let m = HeatmapMatrix::pivot(&table);
        assert_eq!(m.values, vec![vec![2.5]]);
    }

    #[test]
    fn labels_are_sorted_regardless_of_input_order() {
        let table = InteractionTable::new(vec![
            row("S", "T", "Zeta", "b", 1.0),
            row("S", "T", "alpha", "a", 1.0),
            row("S", "T", "Beta", "c", 1.0),
        ]);
        let m = HeatmapMatrix::pivot(&table);
        assert_eq!(m.ligands, vec!["Beta", "Zeta", "alpha"]);
        assert_eq!(m.receptors, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_pair_scenario() {
        let table = InteractionTable::new(vec![
            row("Adipocytes", "Fibroblasts", "A", "B", 1.5),
            row("Adipocytes", "Fibroblasts", "A", "B", 0.5),
        ]);
        let filtered = above_weight(&table, 0.8);
        assert_eq!(filtered.len(), 1);

        let Outcome::Ready(fig) = build_heatmap("8w_ctrl_male", &filtered, "Adipocytes", "Fibroblasts") else {
            panic!("expected a heatmap");
        };
        assert_eq!(fig.matrix.ligands, vec!["A"]);
        assert_eq!(fig.matrix.receptors, vec!["B"]);
        assert_eq!(fig.matrix.values, vec![vec![1.5]]);
        assert_eq!(fig.row_count, 1);
    }

    #[test]
    fn absent_pair_is_empty_not_error() {
        let out = build_heatmap("8w_ctrl_male", &mixed_table(), "Neuronal_Cells", "Mesothelial_Cells");
        assert!(matches!(out, Outcome::Empty { .. }));
        let empty = HeatmapMatrix::pivot(&InteractionTable::default());
        assert!(empty.ligands.is_empty() && empty.receptors.is_empty());
    }

    #[test]
    fn range_includes_fill_zeros() {
        let pair = for_pair(&mixed_table(), "Adipocytes", "Fibroblasts");
        assert_eq!(HeatmapMatrix::pivot(&pair).value_range(), (0.0, 1.9));
    }

    #[test]
    fn csv_export_layout() {
        let table = InteractionTable::new(vec![
            row("S", "T", "L1", "R1", 1.5),
            row("S", "T", "L2", "R2", 0.25),
        ]);
        let mut buf = Vec::new();
        HeatmapMatrix::pivot(&table).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "ligand_complex,R1,R2\nL1,1.5,0\nL2,0,0.25\n");
    }
}
