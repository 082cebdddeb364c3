//! SQLite-backed word store.
//!
//! One connection lives on a dedicated thread; async callers hand it closures
//! over a channel and await the reply, so all access is serialized.

mod migrations;

use std::convert::TryFrom;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::oneshot;
use tracing::{error, info};
use typeahead_core::store::word_key;
use typeahead_core::{ContextRecord, WordCount, WordRecord, WordStore};

use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("failed to send shutdown to database thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("failed to join database thread: {join_err:?}");
            }
        }
    }
}

fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

fn to_u64(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("value {value} is negative"))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

/// Escapes `%`, `_` and `\` so user text matches literally in a LIKE pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn read_contexts(conn: &Connection, word: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT context FROM word_contexts WHERE word = ?1 ORDER BY id ASC")?;
    let rows = stmt.query_map(params![word], |row| row.get::<_, String>(0))?;
    let mut contexts = Vec::new();
    for row in rows {
        contexts.push(row?);
    }
    Ok(contexts)
}

fn build_word(conn: &Connection, word: String, frequency: i64, created_at: &str) -> Result<WordRecord> {
    Ok(WordRecord {
        contexts: read_contexts(conn, &word)?,
        frequency: to_u64(frequency)?,
        created_at: parse_datetime(created_at)?,
        word,
    })
}

fn read_word(conn: &Connection, word: &str) -> Result<Option<WordRecord>> {
    let row = conn
        .query_row(
            "SELECT word, frequency, created_at FROM words WHERE word = ?1",
            params![word],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .context("failed to read word")?;

    match row {
        Some((word, frequency, created_at)) => {
            Ok(Some(build_word(conn, word, frequency, &created_at)?))
        }
        None => Ok(None),
    }
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let location = db_path.display().to_string();
        Self::spawn(location, move || {
            let conn = Connection::open(&db_path)?;
            if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                error!("failed to enable WAL mode: {err}");
            }
            Ok(conn)
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::spawn(":memory:".to_string(), Connection::open_in_memory)
    }

    fn spawn<F>(location: String, open: F) -> Result<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("typeahead-db".into())
            .spawn(move || {
                let mut conn = match open() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(
                            anyhow::Error::new(err).context("failed to open SQLite database")
                        ));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("database initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                info!("database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!(location = %location, "database initialized");

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("database caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to database thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}

#[async_trait]
impl WordStore for Database {
    async fn words_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<WordCount>> {
        let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
        let limit = to_i64(limit)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT word, frequency
                 FROM words
                 WHERE word LIKE ?1 ESCAPE '\\'
                 ORDER BY frequency DESC, word ASC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;

            let mut counts = Vec::new();
            for row in rows {
                let (word, frequency) = row?;
                counts.push(WordCount {
                    word,
                    frequency: to_u64(frequency)?,
                });
            }
            Ok(counts)
        })
        .await
    }

    async fn lookup_word(&self, word: &str) -> Result<Option<WordRecord>> {
        let key = word.trim().to_lowercase();
        self.execute(move |conn| read_word(conn, &key)).await
    }

    async fn record_word(&self, word: &str, context: &str) -> Result<WordRecord> {
        let key = word_key(word)?;
        let context = context.to_string();
        let now = Utc::now().to_rfc3339();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open word transaction")?;
            tx.execute(
                "INSERT INTO words (word, frequency, created_at) VALUES (?1, 1, ?2)
                 ON CONFLICT(word) DO UPDATE SET frequency = frequency + 1",
                params![key, now],
            )
            .context("failed to upsert word")?;
            tx.execute(
                "INSERT OR IGNORE INTO word_contexts (word, context) VALUES (?1, ?2)",
                params![key, context],
            )
            .context("failed to record word context")?;
            let record = read_word(&tx, &key)?
                .ok_or_else(|| anyhow!("word '{key}' missing after upsert"))?;
            tx.commit().context("failed to commit word")?;
            Ok(record)
        })
        .await
    }

    async fn save_context(&self, record: ContextRecord) -> Result<()> {
        let words_json =
            serde_json::to_string(&record.words).context("failed to serialize context words")?;
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO contexts (sentence, words_json, created_at) VALUES (?1, ?2, ?3)",
                params![record.sentence, words_json, record.created_at.to_rfc3339()],
            )
            .context("failed to insert context")?;
            Ok(())
        })
        .await
    }

    async fn contexts_containing(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<ContextRecord>> {
        let needle = fragment.to_lowercase();
        let limit = to_i64(limit)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT sentence, words_json, created_at
                 FROM contexts
                 WHERE instr(lower(sentence), ?1) > 0
                 ORDER BY id ASC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![needle, limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (sentence, words_json, created_at) = row?;
                records.push(ContextRecord {
                    sentence,
                    words: serde_json::from_str(&words_json)
                        .context("invalid context words JSON")?,
                    created_at: parse_datetime(&created_at)?,
                });
            }
            Ok(records)
        })
        .await
    }
}
