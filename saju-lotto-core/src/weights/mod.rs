pub mod ewma;
pub mod frequency;

use std::collections::BTreeMap;

use saju_lotto_db::models::{Draw, NumberStats, POOL_SIZE};

use crate::bias::element_for_number;
use crate::config::WeightModel;
use crate::element::Element;
use crate::error::{CoreError, CoreResult};

pub use ewma::EwmaWeights;
pub use frequency::FrequencyWeights;

/// Weight per number 1..=45. An empty table means "no data".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberWeightTable {
    weights: Vec<f64>,
}

impl NumberWeightTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn uniform(value: f64) -> Self {
        Self {
            weights: vec![value; POOL_SIZE as usize],
        }
    }

    /// `weights[0]` is the weight of number 1.
    pub fn from_weights(weights: Vec<f64>) -> CoreResult<Self> {
        if !weights.is_empty() && weights.len() != POOL_SIZE as usize {
            return Err(CoreError::InsufficientWeightData(format!(
                "expected {POOL_SIZE} weights, got {}",
                weights.len()
            )));
        }
        Ok(Self { weights })
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, number: u8) -> Option<f64> {
        if number == 0 {
            return None;
        }
        self.weights.get(number as usize - 1).copied()
    }

    /// `(number, weight)` pairs in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.weights.iter().enumerate().map(|(i, &w)| ((i + 1) as u8, w))
    }
}

/// Base weights plus the per-number draw counts they were built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalWeights {
    pub table: NumberWeightTable,
    /// Appearances per number over the window, index 0 = number 1.
    pub frequencies: Vec<u32>,
    pub draws_used: usize,
}

impl HistoricalWeights {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn frequency(&self, number: u8) -> u32 {
        if number == 0 {
            return 0;
        }
        self.frequencies.get(number as usize - 1).copied().unwrap_or(0)
    }
}

/// Given a draw history (most recent first), a base weight per number.
pub trait HistoricalWeightSource: Send + Sync {
    fn name(&self) -> &str;
    fn base_weights(&self, draws: &[Draw]) -> CoreResult<HistoricalWeights>;
}

/// Flat table regardless of history.
pub struct UniformWeights;

impl HistoricalWeightSource for UniformWeights {
    fn name(&self) -> &str {
        "Uniform"
    }

    fn base_weights(&self, draws: &[Draw]) -> CoreResult<HistoricalWeights> {
        Ok(HistoricalWeights {
            table: NumberWeightTable::uniform(1.0),
            frequencies: count_appearances(self.name(), draws)?,
            draws_used: draws.len(),
        })
    }
}

/// Pre-computed table from an external model.
pub struct StaticWeights {
    weights: HistoricalWeights,
}

impl StaticWeights {
    pub fn new(weights: HistoricalWeights) -> Self {
        Self { weights }
    }
}

impl HistoricalWeightSource for StaticWeights {
    fn name(&self) -> &str {
        "Static"
    }

    fn base_weights(&self, _draws: &[Draw]) -> CoreResult<HistoricalWeights> {
        Ok(self.weights.clone())
    }
}

pub fn build_source(model: WeightModel) -> Box<dyn HistoricalWeightSource> {
    match model {
        WeightModel::Frequency { alpha } => Box::new(FrequencyWeights::new(alpha)),
        WeightModel::Ewma { alpha } => Box::new(EwmaWeights::new(alpha)),
        WeightModel::Uniform => Box::new(UniformWeights),
    }
}

/// Appearances of each main number. Bonus numbers are not counted.
pub(crate) fn count_appearances(source: &str, draws: &[Draw]) -> CoreResult<Vec<u32>> {
    let mut counts = vec![0u32; POOL_SIZE as usize];
    for draw in draws {
        for &n in &draw.numbers {
            if n == 0 || n > POOL_SIZE {
                return Err(CoreError::WeightSource {
                    source_name: source.to_string(),
                    message: format!("draw {} holds number {n} outside 1-{POOL_SIZE}", draw.draw_no),
                });
            }
            counts[(n - 1) as usize] += 1;
        }
    }
    Ok(counts)
}

/// Frequency and gap (draws since last seen) per number; `draws[0]` is the
/// most recent draw.
pub fn number_stats(draws: &[Draw]) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (1..=POOL_SIZE)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: 0,
        })
        .collect();
    let mut seen = vec![false; POOL_SIZE as usize];

    for (i, draw) in draws.iter().enumerate() {
        for &n in &draw.numbers {
            let idx = (n as usize).wrapping_sub(1);
            if idx < stats.len() {
                stats[idx].frequency += 1;
                if !seen[idx] {
                    stats[idx].gap = i as u32;
                    seen[idx] = true;
                }
            }
        }
    }

    for (stat, &was_seen) in stats.iter_mut().zip(&seen) {
        if !was_seen {
            stat.gap = draws.len() as u32;
        }
    }

    stats
}

/// Share (0..1) of drawn main numbers falling in each element's range.
pub fn element_share(draws: &[Draw]) -> BTreeMap<Element, f64> {
    let mut counts: BTreeMap<Element, u32> = Element::ALL.iter().map(|&e| (e, 0)).collect();
    let mut total = 0u32;
    for draw in draws {
        for &n in &draw.numbers {
            if let Ok(element) = element_for_number(n) {
                *counts.entry(element).or_insert(0) += 1;
                total += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(e, c)| (e, if total == 0 { 0.0 } else { c as f64 / total as f64 }))
        .collect()
}

#[cfg(test)]
pub(crate) fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8 * 6;
            Draw {
                draw_no: (n - i) as u32,
                date: format!("2024-01-{:02}", (i % 28) + 1),
                numbers: [base + 1, base + 2, base + 3, base + 4, base + 5, base + 6],
                bonus: base + 7,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(numbers: [u8; 6], bonus: u8) -> Draw {
        Draw {
            draw_no: 1,
            date: "2024-01-06".into(),
            numbers,
            bonus,
        }
    }

    #[test]
    fn test_table_shapes() {
        assert!(NumberWeightTable::empty().is_empty());
        let uniform = NumberWeightTable::uniform(1.0);
        assert_eq!(uniform.iter().count(), 45);
        assert_eq!(uniform.get(1), Some(1.0));
        assert_eq!(uniform.get(45), Some(1.0));
        assert_eq!(uniform.get(0), None);
        assert_eq!(uniform.get(46), None);
        assert!(NumberWeightTable::from_weights(vec![1.0; 44]).is_err());
        assert!(NumberWeightTable::from_weights(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_number_stats_frequency_and_gap() {
        let draws = vec![
            draw([1, 2, 3, 4, 5, 6], 7),
            draw([1, 10, 20, 30, 40, 45], 8),
        ];
        let stats = number_stats(&draws);
        assert_eq!(stats.len(), 45);
        assert_eq!(stats[0].frequency, 2);
        assert_eq!(stats[0].gap, 0);
        assert_eq!(stats[9].frequency, 1);
        assert_eq!(stats[9].gap, 1);
        // Bonus numbers do not count; never seen means gap = window.
        assert_eq!(stats[6].frequency, 0);
        assert_eq!(stats[6].gap, 2);
    }

    #[test]
    fn test_element_share() {
        let draws = vec![draw([1, 2, 10, 20, 30, 40], 7)];
        let share = element_share(&draws);
        assert!((share[&Element::Wood] - 2.0 / 6.0).abs() < 1e-12);
        assert!((share[&Element::Water] - 1.0 / 6.0).abs() < 1e-12);
        let sum: f64 = share.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(element_share(&[]).values().all(|&s| s == 0.0));
    }

    #[test]
    fn test_out_of_range_draw_is_source_error() {
        let bad = vec![draw([0, 2, 3, 4, 5, 6], 7)];
        let err = UniformWeights.base_weights(&bad).unwrap_err();
        assert!(matches!(err, CoreError::WeightSource { .. }));
    }

    #[test]
    fn test_build_source_names() {
        assert_eq!(build_source(WeightModel::default()).name(), "Frequency");
        assert_eq!(build_source(WeightModel::Ewma { alpha: 0.9 }).name(), "EWMA");
        assert_eq!(build_source(WeightModel::Uniform).name(), "Uniform");
    }

    #[test]
    fn test_static_weights_passthrough() {
        let weights = HistoricalWeights {
            table: NumberWeightTable::uniform(2.0),
            frequencies: vec![3; 45],
            draws_used: 9,
        };
        let source = StaticWeights::new(weights.clone());
        assert_eq!(source.base_weights(&[]).unwrap(), weights);
        assert_eq!(weights.frequency(45), 3);
        assert_eq!(HistoricalWeights::empty().frequency(1), 0);
    }

    #[test]
    fn test_make_test_draws_are_valid() {
        for d in make_test_draws(30) {
            assert!(saju_lotto_db::models::validate_draw(&d.numbers, d.bonus).is_ok(), "{d:?}");
        }
    }
}
