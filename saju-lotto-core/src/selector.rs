use chrono::Datelike;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use saju_lotto_db::models::{PICK_COUNT, POOL_SIZE};

use crate::bias::element_for_number;
use crate::element::Element;
use crate::error::{CoreError, CoreResult};
use crate::weights::{HistoricalWeights, NumberWeightTable};

/// Deterministic seed from today's date (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

pub fn random_seed() -> u64 {
    rand::rng().random()
}

/// Why a result is not the plain weighted draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// The base weight table was empty; a flat base was used instead.
    NoHistoricalData,
    /// No positive weight was left for some draws, which were uniform.
    UniformFallback { drawn_uniformly: usize },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::NoHistoricalData => write!(f, "no historical data, uniform base weights"),
            Degradation::UniformFallback { drawn_uniformly } => {
                write!(f, "{drawn_uniformly} number(s) drawn uniformly")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberDetail {
    pub number: u8,
    pub element: Element,
    /// Final weight relative to the heaviest number, 0..=100.
    pub compatibility: u8,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Six distinct numbers, ascending.
    pub main_numbers: Vec<u8>,
    pub bonus_number: u8,
    pub number_detail: Vec<NumberDetail>,
    pub degraded: bool,
    pub degradations: Vec<Degradation>,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolPhase {
    Weighted,
    Uniform,
}

/// Numbers still available for drawing, ascending, with their final weight.
///
/// Starts in the weighted phase and drops to uniform for good once the
/// remaining weights cannot form a distribution.
struct DrawPool {
    candidates: Vec<(u8, f64)>,
    phase: PoolPhase,
    drawn_uniformly: usize,
}

impl DrawPool {
    fn new(weights: &[(u8, f64)]) -> Self {
        let mut candidates = weights.to_vec();
        candidates.sort_by_key(|&(n, _)| n);
        Self {
            candidates,
            phase: PoolPhase::Weighted,
            drawn_uniformly: 0,
        }
    }

    fn draw(&mut self, rng: &mut StdRng) -> CoreResult<u8> {
        if self.candidates.is_empty() {
            return Err(CoreError::SelectionInvariant("draw pool exhausted".into()));
        }

        if self.phase == PoolPhase::Weighted {
            let weights: Vec<f64> = self.candidates.iter().map(|&(_, w)| w).collect();
            match WeightedIndex::new(&weights) {
                Ok(dist) => {
                    let idx = dist.sample(rng);
                    return Ok(self.candidates.remove(idx).0);
                }
                Err(err) => {
                    log::warn!(
                        "weighted draw impossible with {} candidates left ({err}), switching to uniform",
                        self.candidates.len()
                    );
                    self.phase = PoolPhase::Uniform;
                }
            }
        }

        let idx = rng.random_range(0..self.candidates.len());
        self.drawn_uniformly += 1;
        Ok(self.candidates.remove(idx).0)
    }
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Divides by the largest weight, so the product of two factors stays finite.
fn scale_to_unit(weights: Vec<f64>) -> Vec<f64> {
    let max = weights.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        weights.into_iter().map(|w| w / max).collect()
    } else {
        weights
    }
}

/// Six distinct numbers in range plus a bonus outside them.
pub fn check_ticket(main: &[u8], bonus: u8) -> CoreResult<()> {
    if main.len() != PICK_COUNT {
        return Err(CoreError::SelectionInvariant(format!(
            "expected {PICK_COUNT} main numbers, got {}",
            main.len()
        )));
    }
    for (i, &n) in main.iter().enumerate() {
        if n == 0 || n > POOL_SIZE {
            return Err(CoreError::SelectionInvariant(format!("number {n} out of range")));
        }
        if main[..i].contains(&n) {
            return Err(CoreError::SelectionInvariant(format!("number {n} drawn twice")));
        }
    }
    if bonus == 0 || bonus > POOL_SIZE {
        return Err(CoreError::SelectionInvariant(format!("bonus {bonus} out of range")));
    }
    if main.contains(&bonus) {
        return Err(CoreError::SelectionInvariant(format!("bonus {bonus} repeats a main number")));
    }
    Ok(())
}

/// Draws one ticket from `base × bias`.
///
/// An empty base is not an error: the draw proceeds on a flat base and the
/// result is marked degraded.
pub fn select(
    base: &HistoricalWeights,
    bias: &NumberWeightTable,
    seed: u64,
) -> CoreResult<PredictionResult> {
    let mut degradations = Vec::new();

    let fallback;
    let base_table = if base.table.is_empty() {
        log::warn!("base weight table is empty, using uniform base weights");
        degradations.push(Degradation::NoHistoricalData);
        fallback = NumberWeightTable::uniform(1.0);
        &fallback
    } else {
        &base.table
    };

    let base_factors =
        scale_to_unit((1..=POOL_SIZE).map(|n| sanitize(base_table.get(n).unwrap_or(0.0))).collect());
    let bias_factors =
        scale_to_unit((1..=POOL_SIZE).map(|n| sanitize(bias.get(n).unwrap_or(1.0))).collect());
    let final_weights: Vec<(u8, f64)> = (1..=POOL_SIZE)
        .zip(base_factors.iter().zip(&bias_factors))
        .map(|(n, (b, m))| (n, b * m))
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pool = DrawPool::new(&final_weights);

    let mut main = Vec::with_capacity(PICK_COUNT);
    for _ in 0..PICK_COUNT {
        main.push(pool.draw(&mut rng)?);
    }
    let bonus = pool.draw(&mut rng)?;
    main.sort_unstable();
    check_ticket(&main, bonus)?;

    if pool.drawn_uniformly > 0 {
        degradations.push(Degradation::UniformFallback {
            drawn_uniformly: pool.drawn_uniformly,
        });
    }

    let max_weight = final_weights.iter().map(|&(_, w)| w).fold(0.0, f64::max);
    let number_detail = main
        .iter()
        .map(|&n| {
            let weight = final_weights[(n - 1) as usize].1;
            let compatibility = if max_weight > 0.0 {
                (100.0 * weight / max_weight).round() as u8
            } else {
                0
            };
            Ok(NumberDetail {
                number: n,
                element: element_for_number(n)?,
                compatibility,
                frequency: base.frequency(n),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    log::debug!("seed {seed}: {main:?} + {bonus}, degradations {degradations:?}");

    Ok(PredictionResult {
        main_numbers: main,
        bonus_number: bonus,
        number_detail,
        degraded: !degradations.is_empty(),
        degradations,
        seed,
    })
}
