//! Shared builders for unit tests.

use super::model::{InteractionRow, InteractionTable};

pub fn row(source: &str, target: &str, ligand: &str, receptor: &str, weight: f64) -> InteractionRow {
    InteractionRow {
        source: source.into(),
        target: target.into(),
        ligand_complex: ligand.into(),
        receptor_complex: receptor.into(),
        weight,
    }
}

/// A small table spanning both thresholds and several cell-type pairs.
pub fn mixed_table() -> InteractionTable {
    InteractionTable::new(vec![
        row("Adipocytes", "Fibroblasts", "Lep", "Lepr", 1.9),
        row("Adipocytes", "Fibroblasts", "Adipoq", "Adipor1", 0.9),
        row("Adipocytes", "Fibroblasts", "Adipoq", "Adipor2", 0.4),
        row("Fibroblasts", "Immune_Cells", "Cxcl12", "Cxcr4", 1.3),
        row("Pericytes", "SMCs", "Pdgfb", "Pdgfrb", 0.81),
        row("SMCs", "Endothelial_Cells", "Vegfa", "Kdr", 0.8),
    ])
}
