use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{BirthInput, LunarDate, SolarDate};
use crate::cycle::FourPillarsChart;
use crate::element::{classify, Element};
use crate::error::{CoreError, CoreResult};

/// Symbols in a full chart: four stems and four branches.
pub const CHART_SYMBOLS: u8 = 8;

/// An element at or above this count is called over-represented.
pub const OVERREPRESENTED_AT: u8 = 3;

/// Element counts with integer percentages summing to exactly 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDistribution {
    counts: [u8; 5],
    percentages: [u8; 5],
}

impl ElementDistribution {
    /// Counts are indexed in canonical element order.
    pub fn from_counts(counts: [u8; 5]) -> CoreResult<Self> {
        let total: u32 = counts.iter().map(|&c| c as u32).sum();
        if total == 0 {
            return Err(CoreError::ArithmeticInvariant { kind: "element total", index: 0 });
        }
        Ok(Self {
            counts,
            percentages: largest_remainder(&counts, total),
        })
    }

    pub fn count(&self, element: Element) -> u8 {
        self.counts[element.index()]
    }

    pub fn percentage(&self, element: Element) -> u8 {
        self.percentages[element.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn counts(&self) -> BTreeMap<Element, u8> {
        Element::ALL.iter().map(|&e| (e, self.count(e))).collect()
    }

    pub fn percentages(&self) -> BTreeMap<Element, u8> {
        Element::ALL.iter().map(|&e| (e, self.percentage(e))).collect()
    }

    /// Elements sharing the maximum count, in canonical order.
    pub fn dominant(&self) -> Vec<Element> {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        Element::ALL
            .iter()
            .copied()
            .filter(|&e| max > 0 && self.count(e) == max)
            .collect()
    }

    /// Copy with one element's count replaced.
    pub fn with_count(&self, element: Element, count: u8) -> CoreResult<Self> {
        let mut counts = self.counts;
        counts[element.index()] = count;
        Self::from_counts(counts)
    }

    pub fn summary(&self) -> BalanceSummary {
        let overrepresented: Vec<Element> = Element::ALL
            .iter()
            .copied()
            .filter(|&e| self.count(e) >= OVERREPRESENTED_AT)
            .collect();
        let absent: Vec<Element> = Element::ALL
            .iter()
            .copied()
            .filter(|&e| self.count(e) == 0)
            .collect();

        let mut parts = Vec::new();
        if !overrepresented.is_empty() {
            parts.push(format!("strong {}", join_names(&overrepresented)));
        }
        if !absent.is_empty() {
            parts.push(format!("lacking {}", join_names(&absent)));
        }
        let description = if parts.is_empty() {
            "balanced across all five elements".to_string()
        } else {
            parts.join("; ")
        };

        BalanceSummary {
            overrepresented,
            absent,
            description,
        }
    }
}

fn join_names(elements: &[Element]) -> String {
    let names: Vec<&str> = elements.iter().map(|e| e.name()).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Integer percentages by largest remainder. Leftover points go to the
/// largest remainders first, then larger counts, then canonical order.
fn largest_remainder(counts: &[u8; 5], total: u32) -> [u8; 5] {
    let mut percentages = [0u8; 5];
    let mut remainders = [0u32; 5];
    for (i, &c) in counts.iter().enumerate() {
        let scaled = c as u32 * 100;
        percentages[i] = (scaled / total) as u8;
        remainders[i] = scaled % total;
    }

    let assigned: u32 = percentages.iter().map(|&p| p as u32).sum();
    let mut order: Vec<usize> = (0..5).collect();
    order.sort_by(|&a, &b| {
        remainders[b]
            .cmp(&remainders[a])
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });
    for &i in order.iter().take((100 - assigned) as usize) {
        percentages[i] += 1;
    }
    percentages
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub overrepresented: Vec<Element>,
    pub absent: Vec<Element>,
    pub description: String,
}

/// Counts the element of all eight chart symbols.
pub fn aggregate(chart: &FourPillarsChart) -> CoreResult<ElementDistribution> {
    let mut counts = [0u8; 5];
    for symbol in chart.symbols() {
        let (element, _) = classify(symbol);
        counts[element.index()] += 1;
    }
    let distribution = ElementDistribution::from_counts(counts)?;
    if distribution.total() != CHART_SYMBOLS as u32 {
        return Err(CoreError::ArithmeticInvariant {
            kind: "chart symbol count",
            index: distribution.total() as i64,
        });
    }
    Ok(distribution)
}

/// Everything derived from one birth input.
#[derive(Debug, Clone)]
pub struct ChartAnalysis {
    pub birth: BirthInput,
    pub solar_date: SolarDate,
    /// Lunar date of birth when the lookup table covers it.
    pub lunar_date: Option<LunarDate>,
    pub chart: FourPillarsChart,
    pub distribution: ElementDistribution,
    pub dominant: Vec<Element>,
    pub summary: BalanceSummary,
}
