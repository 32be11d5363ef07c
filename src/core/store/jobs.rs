use anyhow::Result;
use rusqlite::{Row, params};

use super::AnalysisStore;
use super::types::AnalysisJobRecord;
use crate::core::pipeline::artifacts::AnalysisArtifacts;
use crate::core::pipeline::status::JobStatus;

const JOB_COLUMNS: &str = "job_id, owner_id, title, source, external_meeting_id, transcript, \
     duration_minutes, participants_json, metadata_json, notify_email, status, is_discovery, \
     client_name, pain_point, goal, summary, suggestions, action_items, follow_up_subject, \
     follow_up_body, mind_map, next_meeting_prep, error, created_at, updated_at, completed_at";

fn row_to_job(row: &Row) -> rusqlite::Result<AnalysisJobRecord> {
    Ok(AnalysisJobRecord {
        job_id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        source: row.get(3)?,
        external_meeting_id: row.get(4)?,
        transcript: row.get(5)?,
        duration_minutes: row.get(6)?,
        participants_json: row.get(7)?,
        metadata_json: row.get(8)?,
        notify_email: row.get(9)?,
        status: row.get(10)?,
        is_discovery: row
            .get::<_, Option<i64>>(11)?
            .map(|v| v != 0),
        client_name: row.get(12)?,
        pain_point: row.get(13)?,
        goal: row.get(14)?,
        summary: row.get(15)?,
        suggestions: row.get(16)?,
        action_items: row.get(17)?,
        follow_up_subject: row.get(18)?,
        follow_up_body: row.get(19)?,
        mind_map: row.get(20)?,
        next_meeting_prep: row.get(21)?,
        error: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
        completed_at: row.get(25)?,
    })
}

/// Admission-time inputs for a new job row.
pub struct NewJob<'a> {
    pub owner_id: &'a str,
    pub title: &'a str,
    pub source: &'a str,
    pub external_meeting_id: Option<&'a str>,
    pub transcript: &'a str,
    pub duration_minutes: Option<i64>,
    pub participants: &'a [String],
    pub notify_email: Option<&'a str>,
    pub metadata_json: Option<&'a str>,
}

impl AnalysisStore {
    pub async fn create_job(&self, new: &NewJob<'_>) -> Result<AnalysisJobRecord> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let participants_json = if new.participants.is_empty() {
            None
        } else {
            Some(serde_json::to_string(new.participants)?)
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO analysis_jobs
             (job_id, owner_id, title, source, external_meeting_id, transcript,
              duration_minutes, participants_json, metadata_json, notify_email, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'processing')",
            params![
                job_id,
                new.owner_id,
                new.title,
                new.source,
                new.external_meeting_id,
                new.transcript,
                new.duration_minutes,
                participants_json,
                new.metadata_json,
                new.notify_email,
            ],
        )?;

        let rec = db.query_row(
            &format!("SELECT {} FROM analysis_jobs WHERE job_id = ?1", JOB_COLUMNS),
            params![job_id],
            row_to_job,
        )?;
        Ok(rec)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Option<AnalysisJobRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM analysis_jobs WHERE job_id = ?1 LIMIT 1",
            JOB_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![job_id], row_to_job)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub async fn list_jobs(&self, owner_id: &str, limit: usize) -> Result<Vec<AnalysisJobRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM analysis_jobs WHERE owner_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
            JOB_COLUMNS
        ))?;
        let rows = stmt.query_map(params![owner_id, limit as i64], row_to_job)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub async fn count_jobs(&self) -> Result<i64> {
        let db = self.db.lock().await;
        let count = db.query_row("SELECT COUNT(*) FROM analysis_jobs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Success transition: flips `processing -> completed` and writes the full
    /// artifact set in one statement. The status predicate makes this a
    /// compare-and-set: a pipeline finishing after its job already went
    /// terminal changes nothing, and the caller sees `false`.
    pub async fn complete_job(&self, job_id: &str, artifacts: &AnalysisArtifacts) -> Result<bool> {
        let suggestions = serde_json::to_string(&artifacts.summary.suggestions)?;
        let action_items = serde_json::to_string(&artifacts.summary.action_items)?;
        let next_prep = serde_json::to_string(&artifacts.next_prep)?;

        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE analysis_jobs SET
                status = 'completed',
                is_discovery = ?1,
                client_name = ?2,
                pain_point = ?3,
                goal = ?4,
                summary = ?5,
                suggestions = ?6,
                action_items = ?7,
                follow_up_subject = ?8,
                follow_up_body = ?9,
                mind_map = ?10,
                next_meeting_prep = ?11,
                error = NULL,
                updated_at = CURRENT_TIMESTAMP,
                completed_at = CURRENT_TIMESTAMP
             WHERE job_id = ?12 AND status = ?13",
            params![
                artifacts.kind.is_discovery() as i64,
                artifacts.summary.client_name,
                artifacts.summary.pain_point,
                artifacts.summary.goal,
                artifacts.summary.overview,
                suggestions,
                action_items,
                artifacts.follow_up.subject,
                artifacts.follow_up.body,
                artifacts.mind_map,
                next_prep,
                job_id,
                JobStatus::Processing.as_str(),
            ],
        )?;
        Ok(rows > 0)
    }

    /// Failure transition: flips `processing -> failed` only when the success
    /// transition never ran. The extra summary predicate covers the race
    /// where artifacts persisted but the caller crashed before it could
    /// confirm: such a job must not be reported as failed.
    pub async fn mark_failed_if_processing(&self, job_id: &str, error: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE analysis_jobs SET
                status = 'failed',
                error = ?1,
                updated_at = CURRENT_TIMESTAMP,
                completed_at = CURRENT_TIMESTAMP
             WHERE job_id = ?2 AND status = ?3
               AND (summary IS NULL OR summary = '')",
            params![error, job_id, JobStatus::Processing.as_str()],
        )?;
        Ok(rows > 0)
    }

    /// All earlier completed analyses for the same owner and client, oldest
    /// first. Zero rows is a normal answer for a first meeting.
    pub async fn list_prior_completed_jobs(
        &self,
        owner_id: &str,
        client_name: &str,
    ) -> Result<Vec<AnalysisJobRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM analysis_jobs
             WHERE owner_id = ?1 AND client_name = ?2
               AND status = 'completed' AND summary IS NOT NULL
             ORDER BY created_at ASC",
            JOB_COLUMNS
        ))?;
        let rows = stmt.query_map(params![owner_id, client_name], row_to_job)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
