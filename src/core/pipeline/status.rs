/// Job lifecycle: `processing` is the only initial state and the only state
/// a job can leave. `completed` and `failed` are terminal and mutually
/// exclusive; once either is reached no further transition is permitted.
///
/// The persisted mirror of this machine lives in the store's conditional
/// updates (`UPDATE ... WHERE status = 'processing'`), which is what makes
/// racing finalizers safe without a read-modify-write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
    if from == to {
        return true;
    }
    match from {
        JobStatus::Processing => matches!(to, JobStatus::Completed | JobStatus::Failed),
        JobStatus::Completed | JobStatus::Failed => false,
    }
}
