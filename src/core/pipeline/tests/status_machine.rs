use crate::core::pipeline::status::{JobStatus, can_transition};

#[test]
fn processing_reaches_both_terminal_states() {
    assert!(can_transition(JobStatus::Processing, JobStatus::Completed));
    assert!(can_transition(JobStatus::Processing, JobStatus::Failed));
}

#[test]
fn terminal_states_are_sealed() {
    for terminal in [JobStatus::Completed, JobStatus::Failed] {
        assert!(
            !can_transition(terminal, JobStatus::Processing),
            "expected {:?} to reject reopening",
            terminal
        );
    }
    assert!(!can_transition(JobStatus::Completed, JobStatus::Failed));
    assert!(!can_transition(JobStatus::Failed, JobStatus::Completed));
}

#[test]
fn status_strings_round_trip() {
    for status in [JobStatus::Processing, JobStatus::Completed, JobStatus::Failed] {
        assert_eq!(JobStatus::from_status(status.as_str()), Some(status));
    }
    assert_eq!(JobStatus::from_status("queued"), None);
}

#[test]
fn only_terminal_states_report_terminal() {
    assert!(!JobStatus::Processing.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}
