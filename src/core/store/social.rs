use anyhow::Result;
use rusqlite::params;

use super::AnalysisStore;
use super::types::SocialPostRecord;
use crate::core::inference::SocialPost;

impl AnalysisStore {
    /// Idempotent upsert keyed by (job_id, position): re-running after a
    /// partial failure converges on the same rows. This is the one write the
    /// pipeline wraps in a bounded retry.
    pub async fn upsert_social_posts(&self, job_id: &str, posts: &[SocialPost]) -> Result<()> {
        let db = self.db.lock().await;
        for (position, post) in posts.iter().enumerate() {
            let tags = serde_json::to_string(&post.tags)?;
            db.execute(
                "INSERT OR REPLACE INTO social_posts (job_id, position, hook, narrative, cta, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![job_id, position as i64, post.hook, post.narrative, post.cta, tags],
            )?;
        }
        Ok(())
    }

    pub async fn list_social_posts(&self, job_id: &str) -> Result<Vec<SocialPostRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT job_id, position, hook, narrative, cta, tags, created_at
             FROM social_posts WHERE job_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![job_id], |row| {
            Ok(SocialPostRecord {
                job_id: row.get(0)?,
                position: row.get(1)?,
                hook: row.get(2)?,
                narrative: row.get(3)?,
                cta: row.get(4)?,
                tags: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
