#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisJobRecord {
    pub job_id: String,
    pub owner_id: String,
    pub title: String,
    pub source: String,
    pub external_meeting_id: Option<String>,
    pub transcript: String,
    pub duration_minutes: Option<i64>,
    pub participants_json: Option<String>,
    pub metadata_json: Option<String>,
    pub notify_email: Option<String>,
    pub status: String,
    pub is_discovery: Option<bool>,
    pub client_name: Option<String>,
    pub pain_point: Option<String>,
    pub goal: Option<String>,
    pub summary: Option<String>,
    pub suggestions: Option<String>,
    pub action_items: Option<String>,
    pub follow_up_subject: Option<String>,
    pub follow_up_body: Option<String>,
    pub mind_map: Option<String>,
    pub next_meeting_prep: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SocialPostRecord {
    pub job_id: String,
    pub position: i64,
    pub hook: String,
    pub narrative: String,
    pub cta: String,
    pub tags: String,
    pub created_at: String,
}
