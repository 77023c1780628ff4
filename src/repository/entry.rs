//! Entry repository for SQLite persistence.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::{to_option, EntryStore, Result};
use crate::models::{Entry, EntryDetails, EntryStats};

const ENTRY_COLUMNS: &str = "id, title, author, synopsis, tags, main_characters, \
    supporting_characters, other_notes, category, narrative_perspective, series, \
    progress_status, word_count, publication_status, contract_status, \
    last_update_timestamp, chapter_count, cover_image_url, review_count, \
    favorite_count, nutrient_count, total_click_count, score";

/// SQLite-backed entry repository.
pub struct EntryRepository {
    db_path: PathBuf,
}

impl EntryRepository {
    /// Open (creating if needed) the catalog database at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY,
                title TEXT,
                author TEXT,
                synopsis TEXT,
                tags TEXT,
                main_characters TEXT,
                supporting_characters TEXT,
                other_notes TEXT,
                category TEXT,
                narrative_perspective TEXT,
                series TEXT,
                progress_status TEXT,
                word_count INTEGER,
                publication_status TEXT,
                contract_status TEXT,
                last_update_timestamp TEXT,
                chapter_count INTEGER,
                cover_image_url TEXT,

                -- Current statistics snapshot
                review_count INTEGER,
                favorite_count INTEGER,
                nutrient_count INTEGER,
                total_click_count INTEGER,
                score INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_entries_title ON entries(title);
            CREATE INDEX IF NOT EXISTS idx_entries_author ON entries(author);
            CREATE INDEX IF NOT EXISTS idx_entries_tags ON entries(tags);

            -- Daily statistics series
            CREATE TABLE IF NOT EXISTS entry_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_id INTEGER NOT NULL REFERENCES entries(id),
                recorded_on TEXT NOT NULL,
                review_count INTEGER,
                favorite_count INTEGER,
                nutrient_count INTEGER,
                total_click_count INTEGER,
                score INTEGER,
                UNIQUE(entry_id, recorded_on)
            );

            CREATE INDEX IF NOT EXISTS idx_entry_stats_entry ON entry_stats(entry_id);
        "#,
        )?;
        Ok(())
    }

    /// Upsert recording the statistics under `recorded_on`.
    pub fn upsert_on(&self, entry: &Entry, recorded_on: NaiveDate) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let d = &entry.details;
        let s = &d.stats;

        tx.execute(
            r#"
            INSERT INTO entries (
                id, title, author, synopsis, tags, main_characters,
                supporting_characters, other_notes, category, narrative_perspective,
                series, progress_status, word_count, publication_status,
                contract_status, last_update_timestamp, chapter_count, cover_image_url,
                review_count, favorite_count, nutrient_count, total_click_count, score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                author = excluded.author,
                synopsis = excluded.synopsis,
                tags = excluded.tags,
                main_characters = excluded.main_characters,
                supporting_characters = excluded.supporting_characters,
                other_notes = excluded.other_notes,
                category = excluded.category,
                narrative_perspective = excluded.narrative_perspective,
                series = excluded.series,
                progress_status = excluded.progress_status,
                word_count = excluded.word_count,
                publication_status = excluded.publication_status,
                contract_status = excluded.contract_status,
                last_update_timestamp = excluded.last_update_timestamp,
                chapter_count = excluded.chapter_count,
                cover_image_url = excluded.cover_image_url,
                review_count = excluded.review_count,
                favorite_count = excluded.favorite_count,
                nutrient_count = excluded.nutrient_count,
                total_click_count = excluded.total_click_count,
                score = excluded.score
            "#,
            params![
                entry.id,
                d.title,
                d.author,
                d.synopsis,
                d.tags,
                d.main_characters,
                d.supporting_characters,
                d.other_notes,
                d.category,
                d.narrative_perspective,
                d.series,
                d.progress_status,
                d.word_count,
                d.publication_status,
                d.contract_status,
                d.last_update_timestamp,
                d.chapter_count,
                d.cover_image_url,
                s.review_count,
                s.favorite_count,
                s.nutrient_count,
                s.total_click_count,
                s.score,
            ],
        )?;

        tx.execute(
            r#"
            INSERT INTO entry_stats (
                entry_id, recorded_on, review_count, favorite_count,
                nutrient_count, total_click_count, score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(entry_id, recorded_on) DO UPDATE SET
                review_count = excluded.review_count,
                favorite_count = excluded.favorite_count,
                nutrient_count = excluded.nutrient_count,
                total_click_count = excluded.total_click_count,
                score = excluded.score
            "#,
            params![
                entry.id,
                recorded_on.to_string(),
                s.review_count,
                s.favorite_count,
                s.nutrient_count,
                s.total_click_count,
                s.score,
            ],
        )?;

        tx.commit()?;
        debug!("Stored entry {} ({})", entry.id, entry.title());
        Ok(())
    }

    /// Entries whose title or author contains `keyword`.
    pub fn search_fuzzy(&self, keyword: &str, limit: usize) -> Result<Vec<Entry>> {
        let conn = self.connect()?;
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries \
             WHERE title LIKE ?1 ESCAPE '\\' OR author LIKE ?1 ESCAPE '\\' \
             ORDER BY id LIMIT ?2"
        ))?;
        let entries = stmt
            .query_map(params![pattern, limit as i64], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Most recent statistics row for an entry.
    pub fn latest_stats(&self, entry_id: i64) -> Result<Option<(NaiveDate, EntryStats)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT recorded_on, review_count, favorite_count, nutrient_count, \
             total_click_count, score FROM entry_stats \
             WHERE entry_id = ?1 ORDER BY recorded_on DESC, id DESC LIMIT 1",
        )?;
        let row = to_option(stmt.query_row(params![entry_id], |row| {
            Ok((
                row.get::<_, String>("recorded_on")?,
                EntryStats {
                    review_count: row.get("review_count")?,
                    favorite_count: row.get("favorite_count")?,
                    nutrient_count: row.get("nutrient_count")?,
                    total_click_count: row.get("total_click_count")?,
                    score: row.get("score")?,
                },
            ))
        }))?;

        Ok(row.and_then(|(recorded_on, stats)| {
            NaiveDate::parse_from_str(&recorded_on, "%Y-%m-%d")
                .ok()
                .map(|date| (date, stats))
        }))
    }

    /// Number of stored entries.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl EntryStore for EntryRepository {
    fn find_by_title(&self, title: &str) -> Result<Option<Entry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE title = ?1 ORDER BY id LIMIT 1"
        ))?;
        to_option(stmt.query_row(params![title.trim()], row_to_entry))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Entry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"))?;
        to_option(stmt.query_row(params![id], row_to_entry))
    }

    fn list_all(&self, exclude_id: Option<i64>, limit: Option<usize>) -> Result<Vec<Entry>> {
        let conn = self.connect()?;
        // A negative LIMIT means no limit in SQLite.
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries \
             WHERE ?1 IS NULL OR id != ?1 ORDER BY id LIMIT ?2"
        ))?;
        let entries = stmt
            .query_map(params![exclude_id, limit], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn upsert(&self, entry: &Entry) -> Result<()> {
        self.upsert_on(entry, Local::now().date_naive())
    }

    fn set_cover(&self, id: i64, cover_image_url: &str) -> Result<()> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE entries SET cover_image_url = ?1 WHERE id = ?2",
            params![cover_image_url, id],
        )?;
        debug!("Set cover of entry {} ({} row)", id, updated);
        Ok(())
    }
}

fn row_to_entry(row: &Row) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get("id")?,
        details: EntryDetails {
            title: row.get("title")?,
            author: row.get("author")?,
            synopsis: row.get("synopsis")?,
            tags: row.get("tags")?,
            main_characters: row.get("main_characters")?,
            supporting_characters: row.get("supporting_characters")?,
            other_notes: row.get("other_notes")?,
            category: row.get("category")?,
            narrative_perspective: row.get("narrative_perspective")?,
            series: row.get("series")?,
            progress_status: row.get("progress_status")?,
            word_count: row.get("word_count")?,
            publication_status: row.get("publication_status")?,
            contract_status: row.get("contract_status")?,
            last_update_timestamp: row.get("last_update_timestamp")?,
            chapter_count: row.get("chapter_count")?,
            cover_image_url: row.get("cover_image_url")?,
            stats: EntryStats {
                review_count: row.get("review_count")?,
                favorite_count: row.get("favorite_count")?,
                nutrient_count: row.get("nutrient_count")?,
                total_click_count: row.get("total_click_count")?,
                score: row.get("score")?,
            },
        },
    })
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
