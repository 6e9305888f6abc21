pub mod bias;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod cycle;
pub mod element;
pub mod error;
pub mod report;
pub mod selector;
pub mod weights;

use rayon::prelude::*;

use saju_lotto_db::models::Draw;

use crate::bias::bias_weights;
use crate::calendar::{
    normalize, BirthInput, CalendarKind, KoreanCalendar, LunarCalendar, LunarDate, LunarTable,
};
use crate::chart::{aggregate, ChartAnalysis, ElementDistribution};
use crate::config::{EngineConfig, LunarSystem, SelectorConfig};
use crate::cycle::compute_pillars;
use crate::error::CoreResult;
use crate::selector::{random_seed, select, PredictionResult};
use crate::weights::{build_source, HistoricalWeights};

/// Chart, element profile and balance summary for one birth input, using
/// the lunar calendar named by `config.calendar.lunar`.
pub fn derive_chart(birth: &BirthInput, config: &EngineConfig) -> CoreResult<ChartAnalysis> {
    match config.calendar.lunar {
        LunarSystem::Korean => derive_chart_with(birth, &KoreanCalendar, config),
        LunarSystem::Chinese => derive_chart_with(birth, &LunarTable, config),
    }
}

pub fn derive_chart_with(
    birth: &BirthInput,
    calendar: &dyn LunarCalendar,
    config: &EngineConfig,
) -> CoreResult<ChartAnalysis> {
    config.validate()?;
    let solar_date = normalize(birth, calendar)?;
    let (hour, minute) = birth.time_of_day();
    let chart = compute_pillars(solar_date, hour, minute, &config.calendar)?;
    let distribution = aggregate(&chart)?;

    let lunar_date = match birth.calendar {
        CalendarKind::Lunar => Some(LunarDate {
            year: birth.year,
            month: birth.month,
            day: birth.day,
            leap_month: birth.leap_month,
        }),
        CalendarKind::Solar => match calendar.to_lunar(solar_date) {
            Ok(date) => Some(date),
            Err(err) => {
                log::debug!("no lunar date for {solar_date}: {err}");
                None
            }
        },
    };

    Ok(ChartAnalysis {
        birth: birth.clone(),
        solar_date,
        lunar_date,
        dominant: distribution.dominant(),
        summary: distribution.summary(),
        chart,
        distribution,
    })
}

/// Base weights from the most recent `window` draws (`draws[0]` newest).
pub fn historical_weights(draws: &[Draw], config: &SelectorConfig) -> CoreResult<HistoricalWeights> {
    let window = config
        .window
        .map_or(draws.len(), |w| (w as usize).min(draws.len()));
    let source = build_source(config.model);
    log::debug!("{} weights over {window} draws", source.name());
    source.base_weights(&draws[..window])
}

/// One 6 + 1 ticket. Without a seed a random one is drawn and recorded in
/// the result.
pub fn predict_numbers(
    distribution: &ElementDistribution,
    historical: &HistoricalWeights,
    seed: Option<u64>,
    config: &EngineConfig,
) -> CoreResult<PredictionResult> {
    config.validate()?;
    let bias = bias_weights(distribution, &config.bias);
    select(historical, &bias, seed.unwrap_or_else(random_seed))
}

/// `count` independent tickets; ticket `i` uses seed `base + i`.
pub fn predict_tickets(
    distribution: &ElementDistribution,
    historical: &HistoricalWeights,
    count: usize,
    seed: Option<u64>,
    config: &EngineConfig,
) -> CoreResult<Vec<PredictionResult>> {
    config.validate()?;
    let bias = bias_weights(distribution, &config.bias);
    let base = seed.unwrap_or_else(random_seed);
    (0..count)
        .into_par_iter()
        .map(|i| select(historical, &bias, base.wrapping_add(i as u64)))
        .collect()
}
