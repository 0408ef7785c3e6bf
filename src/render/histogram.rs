use crate::data::model::InteractionTable;

/// Equal-width histogram of interaction weights, starting at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightHistogram {
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl WeightHistogram {
    pub fn from_table(table: &InteractionTable, bins: usize) -> Self {
        let bins = bins.max(1);
        let max = table.max_weight().unwrap_or(0.0);
        let bin_width = if max > 0.0 { max / bins as f64 } else { 1.0 };

        let mut counts = vec![0; bins];
        for row in table.iter() {
            let idx = ((row.weight / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { bin_width, counts }
    }

    /// Centre of bin `i` on the weight axis.
    pub fn centre(&self, i: usize) -> f64 {
        (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{mixed_table, row};

    #[test]
    fn every_row_lands_in_a_bin() {
        let table = mixed_table();
        let hist = WeightHistogram::from_table(&table, 4);
        assert_eq!(hist.total(), table.len());
        assert_eq!(hist.counts.len(), 4);
        // The maximum weight belongs to the last bin.
        assert!(hist.counts[3] >= 1);
    }

    #[test]
    fn bins_split_at_even_widths() {
        let table = InteractionTable::new(vec![
            row("S", "T", "a", "b", 0.1),
            row("S", "T", "a", "b", 0.9),
            row("S", "T", "a", "b", 2.0),
        ]);
        let hist = WeightHistogram::from_table(&table, 2);
        assert_eq!(hist.bin_width, 1.0);
        assert_eq!(hist.counts, vec![2, 1]);
        assert_eq!(hist.centre(1), 1.5);
    }

    #[test]
    fn empty_or_zero_table() {
        let hist = WeightHistogram::from_table(&InteractionTable::default(), 10);
        assert_eq!(hist.total(), 0);
        let zeros = InteractionTable::new(vec![row("S", "T", "a", "b", 0.0)]);
        assert_eq!(WeightHistogram::from_table(&zeros, 3).counts, vec![1, 0, 0]);
    }
}
