use std::collections::BTreeMap;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use saju_lotto_core::chart::ChartAnalysis;
use saju_lotto_core::element::Element;
use saju_lotto_core::selector::PredictionResult;
use saju_lotto_db::models::{Draw, NumberStats};

fn element_color(element: Element) -> Color {
    match element {
        Element::Wood => Color::Green,
        Element::Fire => Color::Red,
        Element::Earth => Color::Yellow,
        Element::Metal => Color::White,
        Element::Water => Color::Blue,
    }
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Draw", "Date", "Numbers", "Bonus"]);

    for draw in draws {
        let mut sorted = draw.numbers;
        sorted.sort();
        table.add_row(vec![
            draw.draw_no.to_string(),
            draw.date.clone(),
            join_numbers(&sorted),
            format!("{:2}", draw.bonus),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Records read       : {}", result.total_records);
    println!("  Inserted           : {}", result.inserted);
    println!("  Duplicates skipped : {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors             : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStats], share: &BTreeMap<Element, f64>, window: u32) {
    println!("\nStatistics over the last {} draws\n", window);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Number", "Element", "Frequency", "Gap"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    for stat in &sorted {
        let element = saju_lotto_core::bias::element_for_number(stat.number).ok();
        let element_cell = match element {
            Some(e) => Cell::new(e.name()).fg(element_color(e)),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            element_cell,
            Cell::new(stat.frequency),
            Cell::new(stat.gap),
        ]);
    }
    println!("{table}");

    println!("\n── Element share of drawn numbers ──");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Element", "Range", "Share"]);
    for (&element, &s) in share {
        let range = saju_lotto_core::bias::number_range(element);
        table.add_row(vec![
            Cell::new(element.name()).fg(element_color(element)),
            Cell::new(format!("{}-{}", range.start(), range.end())),
            Cell::new(format!("{:.1}%", s * 100.0)),
        ]);
    }
    println!("{table}");
}

pub fn display_chart(analysis: &ChartAnalysis) {
    println!("\nFour pillars for {}", analysis.solar_date);
    if let Some(lunar) = analysis.lunar_date {
        println!("Lunar date: {lunar}");
    }
    if let Some(term) = &analysis.chart.solar_term {
        println!("Solar term: {} ({})", term.hangul, term.hanja);
    }
    if analysis.chart.is_approximate() {
        println!("Month boundaries: approximate calendar dates");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "Hour", "Day", "Month", "Year"]);

    let pillars = [analysis.chart.hour, analysis.chart.day, analysis.chart.month, analysis.chart.year];
    let mut stems = vec![Cell::new("Stem")];
    let mut branches = vec![Cell::new("Branch")];
    for p in pillars {
        let (stem, branch) = (p.stem(), p.branch());
        stems.push(
            Cell::new(format!("{} {} {}", stem, stem.hangul(), stem.element()))
                .fg(element_color(stem.element())),
        );
        branches.push(
            Cell::new(format!("{} {} {}", branch, branch.hangul(), branch.element()))
                .fg(element_color(branch.element())),
        );
    }
    table.add_row(stems);
    table.add_row(branches);
    println!("{table}");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Element", "Count", "Percent"]);
    for element in Element::ALL {
        let mut name = element.name().to_string();
        if analysis.dominant.contains(&element) {
            name.push_str(" *");
        }
        table.add_row(vec![
            Cell::new(name).fg(element_color(element)),
            Cell::new(analysis.distribution.count(element)),
            Cell::new(format!("{}%", analysis.distribution.percentage(element))),
        ]);
    }
    println!("{table}");
    println!("Balance: {}", analysis.summary.description);
}

pub fn display_tickets(tickets: &[PredictionResult], model_name: &str) {
    println!("\nNumber suggestions ({model_name})\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numbers", "Bonus", "Compatibility", "Seed"]);

    for (i, ticket) in tickets.iter().enumerate() {
        let compat = ticket
            .number_detail
            .iter()
            .map(|d| d.compatibility.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![
            format!("{}", i + 1),
            join_numbers(&ticket.main_numbers),
            format!("{:2}", ticket.bonus_number),
            compat,
            ticket.seed.to_string(),
        ]);
    }
    println!("{table}");

    for (i, ticket) in tickets.iter().enumerate() {
        for reason in &ticket.degradations {
            println!("Ticket {}: degraded ({reason})", i + 1);
        }
    }
}
