use super::model::{InteractionRow, InteractionTable};

// ---------------------------------------------------------------------------
// Row filters
// ---------------------------------------------------------------------------

/// Return the rows of `table` satisfying `predicate`, in their original
/// order.  Rows are cloned, never modified.
pub fn filter_table<P>(table: &InteractionTable, predicate: P) -> InteractionTable
where
    P: Fn(&InteractionRow) -> bool,
{
    table.iter().filter(|&row| predicate(row)).cloned().collect()
}

/// Rows whose weight is strictly greater than `threshold`.
pub fn above_weight(table: &InteractionTable, threshold: f64) -> InteractionTable {
    filter_table(table, |row| row.weight > threshold)
}

/// Rows sent by `source` and received by `target`.
pub fn for_pair(table: &InteractionTable, source: &str, target: &str) -> InteractionTable {
    filter_table(table, |row| row.source == source && row.target == target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{mixed_table, row};

    #[test]
    fn threshold_is_strict() {
        let table = mixed_table();
        let kept = above_weight(&table, 0.8);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|r| r.weight > 0.8));
        assert!(!kept.iter().any(|r| r.ligand_complex == "Vegfa"));
    }

    #[test]
    fn higher_threshold_yields_subset() {
        let table = mixed_table();
        for (lo, hi) in [(0.0, 0.8), (0.8, 1.25), (0.5, 3.0)] {
            let loose = above_weight(&table, lo);
            let strict = above_weight(&table, hi);
            assert!(strict.iter().all(|r| loose.rows.contains(r)), "{lo} < {hi}");
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = mixed_table();
        let once = above_weight(&table, 1.25);
        let twice = above_weight(&once, 1.25);
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_input_order_and_duplicates() {
        let table = InteractionTable::new(vec![
            row("Adipocytes", "Fibroblasts", "A", "B", 2.0),
            row("Adipocytes", "Fibroblasts", "A", "B", 3.0),
            row("Adipocytes", "Fibroblasts", "C", "D", 0.1),
        ]);
        let kept = above_weight(&table, 1.0);
        let weights: Vec<f64> = kept.iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![2.0, 3.0]);
    }

    #[test]
    fn nothing_passes_gives_empty_table() {
        let kept = above_weight(&mixed_table(), 10.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn pair_restriction() {
        let table = mixed_table();
        let pair = for_pair(&table, "Adipocytes", "Fibroblasts");
        assert_eq!(pair.len(), 3);
        assert!(for_pair(&table, "Fibroblasts", "Adipocytes").is_empty());
        assert!(for_pair(&table, "Neuronal_Cells", "SMCs").is_empty());
    }
}
