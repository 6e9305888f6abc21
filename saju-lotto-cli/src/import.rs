use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use saju_lotto_db::rusqlite::Connection;
use std::path::Path;

use saju_lotto_db::db::insert_draw;
use saju_lotto_db::models::{Draw, validate_draw};

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Cannot parse '{}' (index {})", s, idx))
    };

    let raw_no = get(0)?;
    let draw_no = raw_no
        .parse::<u32>()
        .with_context(|| format!("Invalid draw number '{}'", raw_no))?;
    let date = parse_date(&get(1)?)?;

    let numbers: [u8; 6] = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
        get_u8(7)?,
    ];
    let bonus = get_u8(8)?;
    validate_draw(&numbers, bonus).with_context(|| format!("Draw {}", draw_no))?;

    Ok(Draw {
        draw_no,
        date,
        numbers,
        bonus,
    })
}

/// Accepts `YYYY-MM-DD` and the dotted `YYYY.MM.DD` form of the official results.
fn parse_date(raw: &str) -> Result<String> {
    for format in ["%Y-%m-%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    bail!("Invalid date format: '{}'", raw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;
    import_records(conn, reader)
}

fn import_records<R: std::io::Read>(conn: &Connection, mut reader: csv::Reader<R>) -> Result<ImportResult> {
    let tx = conn.unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let draw = match record_result {
            Ok(record) => parse_record(&record),
            Err(e) => Err(e.into()),
        };
        match draw {
            Ok(draw) => match insert_draw(&tx, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    log::warn!("Insert failed for record {}: {:#}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                log::warn!("Skipping record {}: {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    Ok(result)
}
