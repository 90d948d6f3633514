use chrono::{DateTime, Duration, Utc};
use media_models::{Job, JobOutcome, JobStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub session_id: String,
    pub job_id: String,
}

impl JobKey {
    pub fn new(session_id: &str, job_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            job_id: job_id.to_string(),
        }
    }
}

/// Jobs grouped by the session that created them. A session only exists
/// while it owns at least one job; lookups never create one.
#[derive(Clone, Default)]
pub struct SessionStore {
    // Jobs are kept in creation order
    sessions: Arc<Mutex<HashMap<String, Vec<Job>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: Job) {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(job.session_id.clone())
            .or_insert_with(Vec::new)
            .push(job);
    }

    pub async fn get(&self, session_id: &str, job_id: &str) -> Option<Job> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .and_then(|jobs| jobs.iter().find(|j| j.id == job_id))
            .cloned()
    }

    pub async fn list(&self, session_id: &str) -> Vec<Job> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Marks the job cancelled. Returns false when the session does not own it.
    #[instrument(skip(self))]
    pub async fn cancel(&self, session_id: &str, job_id: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions
            .get_mut(session_id)
            .and_then(|jobs| jobs.iter_mut().find(|j| j.id == job_id))
        {
            Some(job) => {
                job.cancel();
                true
            }
            None => false,
        }
    }

    /// Records the extraction result. Only a job that is still processing
    /// takes it; a cancelled or evicted job stays as it is.
    pub async fn complete(&self, key: &JobKey, outcome: JobOutcome) -> Option<JobStatus> {
        let mut sessions = self.sessions.lock().await;
        let job = sessions
            .get_mut(&key.session_id)?
            .iter_mut()
            .find(|j| j.id == key.job_id)?;

        if job.status != JobStatus::Processing {
            return None;
        }
        job.apply(outcome);
        Some(job.status)
    }

    /// Session that owns a job, whichever it is. Used for diagnostics only.
    pub async fn find_owner(&self, job_id: &str) -> Option<String> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .find(|(_, jobs)| jobs.iter().any(|j| j.id == job_id))
            .map(|(session_id, _)| session_id.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops sessions whose jobs are all older than `max_age`, then evicts
    /// the least recently active sessions beyond `max_sessions`. Returns the
    /// keys of every removed job. An age reaching past the calendar range
    /// never expires anything.
    #[instrument(skip(self))]
    pub async fn cleanup(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
        max_sessions: usize,
    ) -> Vec<JobKey> {
        let cutoff = now.checked_sub_signed(max_age);
        let mut sessions = self.sessions.lock().await;

        let mut expired: Vec<String> = match cutoff {
            Some(cutoff) => sessions
                .iter()
                .filter(|(_, jobs)| jobs.iter().all(|j| j.created_at <= cutoff))
                .map(|(id, _)| id.clone())
                .collect(),
            None => Vec::new(),
        };

        let remaining = sessions.len() - expired.len();
        if remaining > max_sessions {
            let mut by_activity: Vec<(DateTime<Utc>, String)> = sessions
                .iter()
                .filter(|(id, _)| !expired.contains(id))
                .map(|(id, jobs)| {
                    let last = jobs
                        .iter()
                        .map(|j| j.created_at)
                        .max()
                        .unwrap_or(DateTime::<Utc>::MIN_UTC);
                    (last, id.clone())
                })
                .collect();
            by_activity.sort();
            expired.extend(
                by_activity
                    .into_iter()
                    .take(remaining - max_sessions)
                    .map(|(_, id)| id),
            );
        }

        let mut removed = Vec::new();
        for session_id in &expired {
            if let Some(jobs) = sessions.remove(session_id) {
                removed.extend(jobs.iter().map(|j| JobKey::new(session_id, &j.id)));
                info!("Session {} removed by cleanup", session_id);
            }
        }
        removed
    }
}
