use chrono::{Duration, Utc};
use media_control::sessions::{JobKey, SessionStore};
use media_models::{DownloadLink, Job, JobOutcome, JobStatus};

fn job_aged(session: &str, hours: i64) -> Job {
    let mut job = Job::new(session, "https://youtu.be/abc", "best");
    job.created_at = Utc::now() - Duration::hours(hours);
    job
}

fn link() -> DownloadLink {
    DownloadLink {
        download_url: "https://cdn.example/v.mp4".into(),
        filename: "Clip.mp4".into(),
        file_size: 42,
        title: "Clip".into(),
        duration: 3.0,
    }
}

#[tokio::test]
async fn jobs_are_scoped_to_their_session() {
    let store = SessionStore::new();
    let job = Job::new("alice", "https://youtu.be/abc", "best");
    store.insert(job.clone()).await;

    assert!(store.get("alice", &job.id).await.is_some());
    assert!(store.get("bob", &job.id).await.is_none());
    assert!(store.list("bob").await.is_empty());
    assert!(!store.cancel("bob", &job.id).await);
    assert_eq!(store.find_owner(&job.id).await.as_deref(), Some("alice"));
}

#[tokio::test]
async fn reads_do_not_create_sessions() {
    let store = SessionStore::new();
    store.list("ghost").await;
    store.get("ghost", "nope").await;
    store.cancel("ghost", "nope").await;
    assert_eq!(store.session_count().await, 0);
}

#[tokio::test]
async fn list_keeps_creation_order() {
    let store = SessionStore::new();
    let first = Job::new("s", "https://youtu.be/1", "best");
    let second = Job::new("s", "https://youtu.be/2", "audio");
    store.insert(first.clone()).await;
    store.insert(second.clone()).await;

    let ids: Vec<String> = store.list("s").await.into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn completion_fills_ready_fields() {
    let store = SessionStore::new();
    let job = Job::new("s", "https://youtu.be/abc", "best");
    store.insert(job.clone()).await;

    let status = store
        .complete(&JobKey::new("s", &job.id), JobOutcome::Ready(link()))
        .await;
    assert_eq!(status, Some(JobStatus::Ready));

    let stored = store.get("s", &job.id).await.unwrap();
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.download_url.as_deref(), Some("https://cdn.example/v.mp4"));
    assert_eq!(stored.filename.as_deref(), Some("Clip.mp4"));
    assert_eq!(stored.file_size, 42);
    assert!(stored.completed_at.is_some());
}

#[tokio::test]
async fn cancelled_job_ignores_late_result() {
    let store = SessionStore::new();
    let job = Job::new("s", "https://youtu.be/abc", "best");
    store.insert(job.clone()).await;

    assert!(store.cancel("s", &job.id).await);
    let status = store
        .complete(&JobKey::new("s", &job.id), JobOutcome::Ready(link()))
        .await;
    assert_eq!(status, None);

    let stored = store.get("s", &job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert!(stored.download_url.is_none());
}

#[tokio::test]
async fn failure_records_message() {
    let store = SessionStore::new();
    let job = Job::new("s", "https://youtu.be/abc", "best");
    store.insert(job.clone()).await;

    store
        .complete(
            &JobKey::new("s", &job.id),
            JobOutcome::Failed("Video unavailable".into()),
        )
        .await;

    let stored = store.get("s", &job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Error);
    assert_eq!(stored.error.as_deref(), Some("Video unavailable"));
    assert_eq!(stored.progress, 0);
}

#[tokio::test]
async fn cleanup_expires_only_fully_stale_sessions() {
    let store = SessionStore::new();
    store.insert(job_aged("stale", 30)).await;
    store.insert(job_aged("mixed", 30)).await;
    store.insert(job_aged("mixed", 1)).await;
    store.insert(job_aged("fresh", 0)).await;

    let removed = store.cleanup(Utc::now(), Duration::hours(24), 100).await;

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].session_id, "stale");
    assert_eq!(store.session_count().await, 2);
    assert_eq!(store.list("mixed").await.len(), 2);
}

#[tokio::test]
async fn cleanup_evicts_least_recently_active_over_capacity() {
    let store = SessionStore::new();
    store.insert(job_aged("oldest", 5)).await;
    store.insert(job_aged("middle", 3)).await;
    store.insert(job_aged("newest", 1)).await;
    // An older first job does not make "middle2" stale; its latest job counts.
    store.insert(job_aged("middle2", 10)).await;
    store.insert(job_aged("middle2", 2)).await;

    let removed = store.cleanup(Utc::now(), Duration::hours(24), 2).await;

    let mut gone: Vec<String> = removed.into_iter().map(|k| k.session_id).collect();
    gone.sort();
    gone.dedup();
    assert_eq!(gone, vec!["middle".to_string(), "oldest".to_string()]);
    assert_eq!(store.session_count().await, 2);
    assert_eq!(store.list("newest").await.len(), 1);
    assert_eq!(store.list("middle2").await.len(), 2);
}

#[tokio::test]
async fn cleanup_with_room_removes_nothing() {
    let store = SessionStore::new();
    store.insert(job_aged("a", 1)).await;
    store.insert(job_aged("b", 2)).await;

    assert!(store.cleanup(Utc::now(), Duration::hours(24), 10).await.is_empty());
    assert_eq!(store.session_count().await, 2);
}

#[tokio::test]
async fn cleanup_with_unbounded_age_keeps_every_session() {
    let store = SessionStore::new();
    store.insert(job_aged("ancient", 100_000)).await;
    store.insert(job_aged("fresh", 0)).await;

    assert!(store.cleanup(Utc::now(), Duration::MAX, 10).await.is_empty());
    assert_eq!(store.session_count().await, 2);

    let removed = store.cleanup(Utc::now(), Duration::MAX, 1).await;
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].session_id, "ancient");
}
