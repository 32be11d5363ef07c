use crate::core::inference::{
    FollowUpEmail, MeetingKind, NextMeetingPrep, SocialPost, StructuredSummary,
};

/// In-memory accumulator for one job run. Filled step by step and written to
/// the record store in a single conditional update at the end; a job that
/// fails mid-run never exposes a partially filled record.
#[derive(Debug, Clone)]
pub struct AnalysisArtifacts {
    pub kind: MeetingKind,
    pub summary: StructuredSummary,
    pub follow_up: FollowUpEmail,
    pub social_posts: Vec<SocialPost>,
    pub mind_map: String,
    pub next_prep: NextMeetingPrep,
}
