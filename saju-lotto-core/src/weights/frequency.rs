use saju_lotto_db::models::{Draw, POOL_SIZE};

use super::{count_appearances, HistoricalWeightSource, HistoricalWeights, NumberWeightTable};
use crate::error::CoreResult;

/// Appearance frequency with a symmetric Dirichlet prior:
/// `w(n) = (alpha + count(n)) / (45 * alpha + total)`.
pub struct FrequencyWeights {
    alpha: f64,
}

impl FrequencyWeights {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl HistoricalWeightSource for FrequencyWeights {
    fn name(&self) -> &str {
        "Frequency"
    }

    fn base_weights(&self, draws: &[Draw]) -> CoreResult<HistoricalWeights> {
        if draws.is_empty() {
            return Ok(HistoricalWeights::empty());
        }
        let counts = count_appearances(self.name(), draws)?;

        let total: u32 = counts.iter().sum();
        let denominator = POOL_SIZE as f64 * self.alpha + total as f64;
        let weights = counts
            .iter()
            .map(|&count| (self.alpha + count as f64) / denominator)
            .collect();

        Ok(HistoricalWeights {
            table: NumberWeightTable::from_weights(weights)?,
            frequencies: counts,
            draws_used: draws.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::make_test_draws;

    #[test]
    fn test_frequency_sums_to_one() {
        let weights = FrequencyWeights::new(1.0).base_weights(&make_test_draws(20)).unwrap();
        let sum: f64 = weights.table.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(weights.table.iter().all(|(_, w)| w > 0.0));
        assert_eq!(weights.draws_used, 20);
    }

    #[test]
    fn test_frequency_empty_history_is_empty_table() {
        let weights = FrequencyWeights::new(1.0).base_weights(&[]).unwrap();
        assert!(weights.table.is_empty());
        assert_eq!(weights.draws_used, 0);
    }

    #[test]
    fn test_frequent_numbers_weigh_more() {
        // Numbers 1..=6 appear in draws 0, 7, 14 of 20.
        let weights = FrequencyWeights::new(1.0).base_weights(&make_test_draws(20)).unwrap();
        assert_eq!(weights.frequency(1), 3);
        assert_eq!(weights.frequency(45), 0);
        assert!(weights.table.get(1).unwrap() > weights.table.get(45).unwrap());
    }

    #[test]
    fn test_larger_alpha_flattens() {
        let draws = make_test_draws(20);
        let sharp = FrequencyWeights::new(0.1).base_weights(&draws).unwrap();
        let flat = FrequencyWeights::new(100.0).base_weights(&draws).unwrap();
        let spread = |w: &HistoricalWeights| w.table.get(1).unwrap() / w.table.get(45).unwrap();
        assert!(spread(&sharp) > spread(&flat));
    }
}
