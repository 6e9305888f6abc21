use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_no   INTEGER PRIMARY KEY,
    date      TEXT NOT NULL,
    n1        INTEGER NOT NULL,
    n2        INTEGER NOT NULL,
    n3        INTEGER NOT NULL,
    n4        INTEGER NOT NULL,
    n5        INTEGER NOT NULL,
    n6        INTEGER NOT NULL,
    bonus     INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("saju_lotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (draw_no, date, n1, n2, n3, n4, n5, n6, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            draw.draw_no,
            draw.date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
            draw.bonus,
        ],
    ).context("Insert failed")?;
    Ok(changed > 0)
}

/// Most recent draws first.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_no, date, n1, n2, n3, n4, n5, n6, bonus
         FROM draws ORDER BY draw_no DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], |row| {
        Ok(Draw {
            draw_no: row.get(0)?,
            date: row.get(1)?,
            numbers: [
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
            ],
            bonus: row.get(8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(draw_no: u32, date: &str) -> Draw {
        Draw {
            draw_no,
            date: date.to_string(),
            numbers: [1, 2, 3, 4, 5, 6],
            bonus: 7,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        insert_draw(&conn, &test_draw(3, "2002-12-21")).unwrap();
        insert_draw(&conn, &test_draw(2, "2002-12-14")).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].draw_no, 3);
        assert_eq!(draws[1].draw_no, 2);
        assert_eq!(draws[2].draw_no, 1);
    }

    #[test]
    fn test_fetch_limit_and_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let draw = Draw {
            draw_no: 1000,
            date: "2022-01-29".to_string(),
            numbers: [2, 8, 19, 22, 32, 42],
            bonus: 39,
        };
        insert_draw(&conn, &draw).unwrap();
        insert_draw(&conn, &test_draw(999, "2022-01-22")).unwrap();

        let draws = fetch_last_draws(&conn, 1).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].numbers, [2, 8, 19, 22, 32, 42]);
        assert_eq!(draws[0].bonus, 39);
        assert_eq!(draws[0].date, "2022-01-29");
    }
}
