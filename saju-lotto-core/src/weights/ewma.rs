use saju_lotto_db::models::{Draw, POOL_SIZE};

use super::{count_appearances, HistoricalWeightSource, HistoricalWeights, NumberWeightTable};
use crate::error::CoreResult;

/// Recency weights: a number drawn `t` draws ago contributes `alpha^t`.
/// Numbers never seen get the floor `alpha^(len + 1)`.
pub struct EwmaWeights {
    alpha: f64,
}

impl EwmaWeights {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl HistoricalWeightSource for EwmaWeights {
    fn name(&self) -> &str {
        "EWMA"
    }

    fn base_weights(&self, draws: &[Draw]) -> CoreResult<HistoricalWeights> {
        if draws.is_empty() {
            return Ok(HistoricalWeights::empty());
        }
        let counts = count_appearances(self.name(), draws)?;

        let size = POOL_SIZE as usize;
        let mut scores = vec![0.0f64; size];
        let floor = self.alpha.powi(draws.len() as i32 + 1);

        for (t, draw) in draws.iter().enumerate() {
            let weight = self.alpha.powi(t as i32);
            for &n in &draw.numbers {
                scores[(n - 1) as usize] += weight;
            }
        }
        for score in &mut scores {
            if *score < floor {
                *score = floor;
            }
        }

        let total: f64 = scores.iter().sum();
        let weights = if total > 0.0 {
            scores.iter().map(|&s| s / total).collect()
        } else {
            vec![1.0 / size as f64; size]
        };

        Ok(HistoricalWeights {
            table: NumberWeightTable::from_weights(weights)?,
            frequencies: counts,
            draws_used: draws.len(),
        })
    }
}
