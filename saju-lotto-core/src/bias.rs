//! Element ranges over the 1..=45 pool and the per-number boost they carry.
//!
//! Ranges are uneven: water only spans 40..=45.

use std::ops::RangeInclusive;

use saju_lotto_db::models::POOL_SIZE;

use crate::chart::ElementDistribution;
use crate::config::BiasConfig;
use crate::element::Element;
use crate::error::{CoreError, CoreResult};
use crate::weights::NumberWeightTable;

pub fn number_range(element: Element) -> RangeInclusive<u8> {
    match element {
        Element::Wood => 1..=9,
        Element::Fire => 10..=19,
        Element::Earth => 20..=29,
        Element::Metal => 30..=39,
        Element::Water => 40..=POOL_SIZE,
    }
}

pub fn element_for_number(number: u8) -> CoreResult<Element> {
    Element::ALL
        .iter()
        .copied()
        .find(|&e| number_range(e).contains(&number))
        .ok_or(CoreError::ArithmeticInvariant { kind: "number", index: number as i64 })
}

/// Boost for an element with `count` symbols in the chart, capped at
/// `max_boost`.
pub fn element_boost(count: u8, config: &BiasConfig) -> f64 {
    (1.0 + config.per_count_boost * count as f64).min(config.max_boost)
}

/// Multiplicative weight per number: dominant elements are boosted, every
/// other number stays at 1.0.
pub fn bias_weights(distribution: &ElementDistribution, config: &BiasConfig) -> NumberWeightTable {
    let mut weights = vec![1.0; POOL_SIZE as usize];
    for element in distribution.dominant() {
        let boost = element_boost(distribution.count(element), config);
        for n in number_range(element) {
            weights[(n - 1) as usize] = boost;
        }
    }
    NumberWeightTable::from_weights(weights).unwrap_or_else(|_| NumberWeightTable::uniform(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_cover_pool_once() {
        let mut seen = [0u8; 46];
        for e in Element::ALL {
            for n in number_range(e) {
                seen[n as usize] += 1;
            }
        }
        assert_eq!(seen[0], 0);
        assert!(seen[1..].iter().all(|&c| c == 1));
        assert_eq!(number_range(Element::Water).count(), 6);
    }

    #[test]
    fn test_element_for_number() {
        assert_eq!(element_for_number(1).unwrap(), Element::Wood);
        assert_eq!(element_for_number(9).unwrap(), Element::Wood);
        assert_eq!(element_for_number(10).unwrap(), Element::Fire);
        assert_eq!(element_for_number(39).unwrap(), Element::Metal);
        assert_eq!(element_for_number(45).unwrap(), Element::Water);
        assert!(element_for_number(0).is_err());
        assert!(element_for_number(46).is_err());
    }

    #[test]
    fn test_boost_capped() {
        let config = BiasConfig::default();
        assert!((element_boost(4, &config) - 1.5).abs() < 1e-12);
        assert!((element_boost(8, &config) - 2.0).abs() < 1e-12);
        let tight = BiasConfig { per_count_boost: 0.5, max_boost: 2.0 };
        assert!((element_boost(8, &tight) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_only_dominant_ranges_boosted() {
        let d = ElementDistribution::from_counts([1, 3, 1, 2, 1]).unwrap();
        let table = bias_weights(&d, &BiasConfig::default());
        assert!((table.get(10).unwrap() - 1.375).abs() < 1e-12);
        assert!((table.get(19).unwrap() - 1.375).abs() < 1e-12);
        assert_eq!(table.get(9), Some(1.0));
        assert_eq!(table.get(30), Some(1.0));
    }

    #[test]
    fn test_tied_dominants_both_boosted() {
        let d = ElementDistribution::from_counts([3, 0, 2, 0, 3]).unwrap();
        let table = bias_weights(&d, &BiasConfig::default());
        assert!(table.get(1).unwrap() > 1.0);
        assert!(table.get(45).unwrap() > 1.0);
        assert_eq!(table.get(20), Some(1.0));
    }

    #[test]
    fn test_boost_monotone_in_count() {
        let config = BiasConfig::default();
        let base = ElementDistribution::from_counts([1, 1, 1, 1, 1]).unwrap();
        for e in Element::ALL {
            let mut previous = 0.0;
            for count in 0..=8 {
                let d = base.with_count(e, count).unwrap();
                let w = bias_weights(&d, &config);
                let first = *number_range(e).start();
                let boost = w.get(first).unwrap();
                assert!(boost >= previous, "{e} count {count}: {boost} < {previous}");
                previous = boost;
            }
        }
    }
}
