use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use uuid::Uuid;

use crate::catalog::LabelCatalog;
use crate::model::{LabelItem, QuizHistoryEntry, QuizSummary, Winner};
use crate::util::{ensure_directory, now_utc_string};

pub const DB_SCHEMA_VERSION: &str = "0.1.0";
pub const DB_FILENAME: &str = "labelarena.sqlite";

pub fn resolve_db_path(data_root: &Path, override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| data_root.join(DB_FILENAME))
}

pub fn open_rw(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS labels (
          label_id TEXT PRIMARY KEY,
          primary_name TEXT NOT NULL,
          position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS label_aliases (
          label_id TEXT NOT NULL,
          alias TEXT NOT NULL,
          alias_order INTEGER NOT NULL,
          PRIMARY KEY (label_id, alias_order),
          FOREIGN KEY (label_id) REFERENCES labels(label_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS quiz_history (
          entry_id TEXT PRIMARY KEY,
          finished_at TEXT NOT NULL,
          total INTEGER NOT NULL,
          human_correct INTEGER NOT NULL,
          ai_correct INTEGER NOT NULL,
          human_accuracy REAL NOT NULL,
          ai_accuracy REAL NOT NULL,
          winner TEXT NOT NULL,
          model TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_labels_position ON labels(position);
        CREATE INDEX IF NOT EXISTS idx_label_aliases_label ON label_aliases(label_id);
        CREATE INDEX IF NOT EXISTS idx_quiz_history_finished_at ON quiz_history(finished_at);
        ",
    )?;

    set_metadata(connection, "db_schema_version", DB_SCHEMA_VERSION)?;
    Ok(())
}

fn set_metadata(connection: &Connection, key: &str, value: &str) -> Result<()> {
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn metadata_value(connection: &Connection, key: &str) -> Result<Option<String>> {
    let value = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Replaces the stored catalog wholesale, preserving source order via the
/// position column.
pub fn replace_catalog(
    connection: &mut Connection,
    items: &[LabelItem],
    source_path: Option<&str>,
    source_sha256: Option<&str>,
) -> Result<()> {
    let tx = connection.transaction()?;

    tx.execute("DELETE FROM label_aliases", [])?;
    tx.execute("DELETE FROM labels", [])?;

    {
        let mut label_stmt = tx.prepare(
            "INSERT INTO labels(label_id, primary_name, position) VALUES(?1, ?2, ?3)",
        )?;
        let mut alias_stmt = tx.prepare(
            "INSERT INTO label_aliases(label_id, alias, alias_order) VALUES(?1, ?2, ?3)",
        )?;

        for (position, item) in items.iter().enumerate() {
            label_stmt.execute(params![item.id, item.primary_name, position as i64])?;
            for (alias_order, alias) in item.aliases.iter().enumerate() {
                alias_stmt.execute(params![item.id, alias, alias_order as i64])?;
            }
        }
    }

    set_metadata(&tx, "catalog_updated_at", &now_utc_string())?;
    for (key, value) in [
        ("catalog_source_path", source_path),
        ("catalog_source_sha256", source_sha256),
    ] {
        match value {
            Some(value) => set_metadata(&tx, key, value)?,
            None => {
                tx.execute("DELETE FROM metadata WHERE key = ?1", params![key])?;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn load_catalog(connection: &Connection) -> Result<LabelCatalog> {
    let mut stmt = connection
        .prepare("SELECT label_id, primary_name FROM labels ORDER BY position")
        .context("failed to prepare label query")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut items = Vec::new();
    let mut index_by_id = HashMap::new();
    for row in rows {
        let (id, primary_name) = row?;
        index_by_id.insert(id.clone(), items.len());
        items.push(LabelItem {
            id,
            primary_name,
            aliases: Vec::new(),
        });
    }

    let mut stmt = connection
        .prepare("SELECT label_id, alias FROM label_aliases ORDER BY label_id, alias_order")
        .context("failed to prepare alias query")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (id, alias) = row?;
        if let Some(&index) = index_by_id.get(&id) {
            items[index].aliases.push(alias);
        }
    }

    Ok(LabelCatalog::new(items))
}

pub fn append_history(
    connection: &Connection,
    summary: &QuizSummary,
    model: Option<&str>,
) -> Result<QuizHistoryEntry> {
    let entry = QuizHistoryEntry {
        entry_id: Uuid::new_v4().to_string(),
        finished_at: summary.finished_at.clone(),
        total: summary.total,
        human_correct: summary.human_correct,
        ai_correct: summary.ai_correct,
        human_accuracy: summary.human_accuracy,
        ai_accuracy: summary.ai_accuracy,
        winner: summary.winner,
        model: model.map(ToOwned::to_owned),
    };

    connection.execute(
        "INSERT INTO quiz_history(
           entry_id, finished_at, total, human_correct, ai_correct,
           human_accuracy, ai_accuracy, winner, model
         ) VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.entry_id,
            entry.finished_at,
            entry.total as i64,
            entry.human_correct as i64,
            entry.ai_correct as i64,
            entry.human_accuracy,
            entry.ai_accuracy,
            entry.winner.as_str(),
            entry.model,
        ],
    )?;

    Ok(entry)
}

/// Most-recent-first history listing.
pub fn load_history(connection: &Connection, limit: usize) -> Result<Vec<QuizHistoryEntry>> {
    let mut stmt = connection
        .prepare(
            "SELECT entry_id, finished_at, total, human_correct, ai_correct,
                    human_accuracy, ai_accuracy, winner, model
             FROM quiz_history
             ORDER BY finished_at DESC, rowid DESC
             LIMIT ?1",
        )
        .context("failed to prepare history query")?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, f64>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, Option<String>>(8)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (
            entry_id,
            finished_at,
            total,
            human_correct,
            ai_correct,
            human_accuracy,
            ai_accuracy,
            winner_raw,
            model,
        ) = row?;

        let Some(winner) = Winner::parse(&winner_raw) else {
            bail!("unknown winner value in history: {winner_raw}");
        };

        entries.push(QuizHistoryEntry {
            entry_id,
            finished_at,
            total: total as usize,
            human_correct: human_correct as usize,
            ai_correct: ai_correct as usize,
            human_accuracy,
            ai_accuracy,
            winner,
            model,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(finished_at: &str, human: usize, ai: usize) -> QuizSummary {
        QuizSummary {
            total: 5,
            human_correct: human,
            ai_correct: ai,
            human_accuracy: human as f64 / 5.0,
            ai_accuracy: ai as f64 / 5.0,
            winner: if human > ai {
                Winner::Human
            } else if ai > human {
                Winner::Ai
            } else {
                Winner::Draw
            },
            comment: "test".to_string(),
            finished_at: finished_at.to_string(),
        }
    }

    #[test]
    fn catalog_round_trip_preserves_order_and_aliases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join(DB_FILENAME);
        let mut conn = open_rw(&db_path).expect("open");

        let items = vec![
            LabelItem {
                id: "n2".to_string(),
                primary_name: "zebra".to_string(),
                aliases: vec!["equus quagga".to_string(), "mountain zebra".to_string()],
            },
            LabelItem {
                id: "n1".to_string(),
                primary_name: "aardvark".to_string(),
                aliases: Vec::new(),
            },
        ];
        replace_catalog(&mut conn, &items, Some("label.txt"), Some("deadbeef")).expect("replace");

        let catalog = load_catalog(&conn).expect("load");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].id, "n2");
        assert_eq!(
            catalog.items()[0].aliases,
            vec!["equus quagga", "mountain zebra"]
        );
        assert_eq!(catalog.items()[1].id, "n1");
        assert_eq!(
            metadata_value(&conn, "catalog_source_path").expect("meta"),
            Some("label.txt".to_string())
        );
        assert_eq!(
            metadata_value(&conn, "db_schema_version").expect("meta"),
            Some(DB_SCHEMA_VERSION.to_string())
        );
    }

    #[test]
    fn replace_catalog_is_wholesale() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut conn = open_rw(&dir.path().join(DB_FILENAME)).expect("open");

        let first = vec![LabelItem {
            id: "n1".to_string(),
            primary_name: "tench".to_string(),
            aliases: vec!["tinca tinca".to_string()],
        }];
        replace_catalog(&mut conn, &first, None, None).expect("first replace");

        let second = vec![LabelItem {
            id: "n2".to_string(),
            primary_name: "dog".to_string(),
            aliases: Vec::new(),
        }];
        replace_catalog(&mut conn, &second, None, None).expect("second replace");

        let catalog = load_catalog(&conn).expect("load");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].id, "n2");
        assert!(
            metadata_value(&conn, "catalog_source_path")
                .expect("meta")
                .is_none()
        );
    }

    #[test]
    fn history_lists_most_recent_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_rw(&dir.path().join(DB_FILENAME)).expect("open");

        append_history(&conn, &summary("2026-08-06T10:00:00Z", 3, 2), Some("deit"))
            .expect("append older");
        append_history(&conn, &summary("2026-08-07T10:00:00Z", 1, 4), None)
            .expect("append newer");

        let entries = load_history(&conn, 10).expect("load");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].finished_at, "2026-08-07T10:00:00Z");
        assert_eq!(entries[0].winner, Winner::Ai);
        assert!(entries[0].model.is_none());
        assert_eq!(entries[1].model.as_deref(), Some("deit"));

        let limited = load_history(&conn, 1).expect("load limited");
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].finished_at, "2026-08-07T10:00:00Z");
    }
}
