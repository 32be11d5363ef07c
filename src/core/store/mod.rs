mod jobs;
mod social;
pub mod types;

pub use jobs::NewJob;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rusqlite::Connection;
use tokio::fs;
use tokio::sync::Mutex;

/// Durable record store for analysis jobs, backed by a single SQLite file.
/// One mutable row per job; all status mutations go through the two
/// state-machine transitions in `jobs.rs`.
pub struct AnalysisStore {
    db: Arc<Mutex<Connection>>,
}

impl AnalysisStore {
    pub async fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).await?;
        }

        let db = Connection::open(data_dir.join("debrief.db"))?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS analysis_jobs (
                job_id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                source TEXT NOT NULL,
                external_meeting_id TEXT,
                transcript TEXT NOT NULL,
                duration_minutes INTEGER,
                participants_json TEXT,
                metadata_json TEXT,
                notify_email TEXT,
                status TEXT NOT NULL DEFAULT 'processing',
                is_discovery INTEGER,
                client_name TEXT,
                pain_point TEXT,
                goal TEXT,
                summary TEXT,
                suggestions TEXT,
                action_items TEXT,
                follow_up_subject TEXT,
                follow_up_body TEXT,
                mind_map TEXT,
                next_meeting_prep TEXT,
                error TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                completed_at DATETIME
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS social_posts (
                job_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                hook TEXT NOT NULL,
                narrative TEXT NOT NULL,
                cta TEXT NOT NULL,
                tags TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (job_id, position)
            )",
            [],
        )?;

        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_jobs_owner_created
             ON analysis_jobs(owner_id, created_at)",
            [],
        )?;
        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_jobs_client
             ON analysis_jobs(owner_id, client_name, status)",
            [],
        )?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}
