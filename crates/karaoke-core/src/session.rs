//! Typed hand-off of the current job between the upload flow and the result viewer.
//!
//! A `SessionContext` lives exactly as long as the controller that owns it. Nothing else
//! writes to it; readers get the job id from [`crate::Route::VideoDetails`].

use serde::Serialize;

use crate::models::JobId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    current_job_id: Option<JobId>,
    original_file_name: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_job_id(&self) -> Option<&JobId> {
        self.current_job_id.as_ref()
    }

    /// Base name (extension stripped) of the file being processed.
    pub fn original_file_name(&self) -> Option<&str> {
        self.original_file_name.as_deref()
    }

    /// Start a new selection: forget any previous job and remember the new base name.
    pub(crate) fn begin(&mut self, original_file_name: &str) {
        self.current_job_id = None;
        self.original_file_name = Some(original_file_name.to_string());
    }

    pub(crate) fn record_job(&mut self, job_id: JobId) {
        self.current_job_id = Some(job_id);
    }

    pub(crate) fn clear(&mut self) {
        self.current_job_id = None;
        self.original_file_name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_previous_job() {
        let mut session = SessionContext::new();
        session.begin("first");
        session.record_job(JobId::new("old").unwrap());
        assert_eq!(session.current_job_id().map(JobId::as_str), Some("old"));

        session.begin("second");
        assert!(session.current_job_id().is_none());
        assert_eq!(session.original_file_name(), Some("second"));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut session = SessionContext::new();
        session.begin("song");
        session.record_job(JobId::new("abc").unwrap());
        session.clear();
        assert_eq!(session, SessionContext::default());
    }
}
