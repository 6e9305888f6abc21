//! Serializable views of a chart analysis and a prediction.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calendar::{BirthInput, LunarDate, SolarDate};
use crate::chart::{BalanceSummary, ChartAnalysis};
use crate::config::BoundaryMode;
use crate::cycle::Pillar;
use crate::element::{Element, Polarity};
use crate::selector::{Degradation, NumberDetail, PredictionResult};

#[derive(Debug, Clone, Serialize)]
pub struct PillarReport {
    pub stem: String,
    pub branch: String,
    pub hangul: String,
    /// Element of the stem.
    pub element: Element,
    pub branch_element: Element,
    pub polarity: Polarity,
    pub cycle_index: u8,
}

impl From<Pillar> for PillarReport {
    fn from(p: Pillar) -> Self {
        Self {
            stem: p.stem().hanja().to_string(),
            branch: p.branch().hanja().to_string(),
            hangul: p.hangul(),
            element: p.stem().element(),
            branch_element: p.branch().element(),
            polarity: p.stem().polarity(),
            cycle_index: p.cycle_index(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PillarsReport {
    pub year: PillarReport,
    pub month: PillarReport,
    pub day: PillarReport,
    pub hour: PillarReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub birth: BirthInput,
    pub solar_date: SolarDate,
    pub lunar_date: Option<LunarDate>,
    pub boundary: BoundaryMode,
    pub solar_term: Option<String>,
    pub pillars: PillarsReport,
    /// Percentages, summing to 100.
    pub five_elements: BTreeMap<Element, u8>,
    pub element_counts: BTreeMap<Element, u8>,
    pub dominant_elements: Vec<Element>,
    pub summary: BalanceSummary,
}

impl From<&ChartAnalysis> for ChartReport {
    fn from(a: &ChartAnalysis) -> Self {
        Self {
            birth: a.birth.clone(),
            solar_date: a.solar_date,
            lunar_date: a.lunar_date,
            boundary: a.chart.boundary,
            solar_term: a.chart.solar_term.as_ref().map(|t| t.hangul.clone()),
            pillars: PillarsReport {
                year: a.chart.year.into(),
                month: a.chart.month.into(),
                day: a.chart.day.into(),
                hour: a.chart.hour.into(),
            },
            five_elements: a.distribution.percentages(),
            element_counts: a.distribution.counts(),
            dominant_elements: a.dominant.clone(),
            summary: a.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub main_numbers: Vec<u8>,
    pub bonus_number: u8,
    pub number_detail: Vec<NumberDetail>,
    pub degraded: bool,
    pub degradations: Vec<Degradation>,
    pub seed: u64,
}

impl From<&PredictionResult> for TicketReport {
    fn from(r: &PredictionResult) -> Self {
        Self {
            main_numbers: r.main_numbers.clone(),
            bonus_number: r.bonus_number,
            number_detail: r.number_detail.clone(),
            degraded: r.degraded,
            degradations: r.degradations.clone(),
            seed: r.seed,
        }
    }
}

/// Chart fields at the top level, then one or more tickets.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    #[serde(flatten)]
    pub chart: ChartReport,
    pub model: String,
    pub draws_used: usize,
    #[serde(flatten)]
    pub first: TicketReport,
    /// Tickets after the first, when several were requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<TicketReport>,
}

impl PredictionReport {
    /// `None` when `tickets` is empty.
    pub fn new(
        analysis: &ChartAnalysis,
        tickets: &[PredictionResult],
        model: &str,
        draws_used: usize,
    ) -> Option<Self> {
        let (first, rest) = tickets.split_first()?;
        Some(Self {
            chart: analysis.into(),
            model: model.to_string(),
            draws_used,
            first: first.into(),
            additional: rest.iter().map(TicketReport::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::weights::HistoricalWeights;

    fn analysis() -> ChartAnalysis {
        crate::derive_chart(&BirthInput::solar(1990, 5, 15, 10), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_chart_report_shape() {
        let json = serde_json::to_value(ChartReport::from(&analysis())).unwrap();
        assert_eq!(json["pillars"]["year"]["stem"], "庚");
        assert_eq!(json["pillars"]["year"]["branch"], "午");
        assert_eq!(json["pillars"]["year"]["element"], "metal");
        assert_eq!(json["pillars"]["day"]["hangul"], "경진");
        assert_eq!(json["five_elements"]["metal"], 50);
        assert_eq!(json["element_counts"]["fire"], 3);
        assert_eq!(json["dominant_elements"][0], "metal");
        assert_eq!(json["solar_date"], "1990-05-15");
        assert_eq!(json["lunar_date"]["month"], 4);
        assert_eq!(json["boundary"], "solar_term");
    }

    #[test]
    fn test_five_elements_key_order() {
        let json = serde_json::to_string(&ChartReport::from(&analysis())).unwrap();
        let wood = json.find("\"wood\"").unwrap();
        let water = json.find("\"water\"").unwrap();
        assert!(wood < water);
    }

    #[test]
    fn test_prediction_report_shape() {
        let a = analysis();
        let config = EngineConfig::default();
        let tickets =
            crate::predict_tickets(&a.distribution, &HistoricalWeights::empty(), 2, Some(11), &config)
                .unwrap();
        let report = PredictionReport::new(&a, &tickets, "Frequency", 0).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["main_numbers"].as_array().unwrap().len(), 6);
        assert!(json["bonus_number"].is_u64());
        assert_eq!(json["degraded"], true);
        assert_eq!(json["degradations"][0]["kind"], "no_historical_data");
        assert_eq!(json["seed"], 11);
        assert_eq!(json["additional"][0]["seed"], 12);
        assert_eq!(json["pillars"]["month"]["stem"], "辛");
        assert!(json["number_detail"][0]["compatibility"].is_u64());

        assert!(PredictionReport::new(&a, &[], "Frequency", 0).is_none());
    }
}
