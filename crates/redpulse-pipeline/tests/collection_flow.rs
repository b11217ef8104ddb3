//! End-to-end pipeline tests over in-memory stores.
//!
//! All pacing delays and write backoffs are zeroed so runs complete
//! instantly; nothing here touches a network or database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use futures::future::BoxFuture;
use uuid::Uuid;

use redpulse_core::{
    CollectionProgress, DailyReport, Post, SentimentLabel, TimeWindow, PROGRESS_STATUS_COLLECTING,
};
use redpulse_pipeline::{
    build_daily_report, persist_posts, run_collection, CheckpointStore, PipelineConfig,
    PipelineError, PostFetcher, PostStore, ReportStore,
};
use redpulse_scraper::{is_fallback_id, RawPost, ScrapeError};
use redpulse_sentiment::Scorer;

type EventLog = Arc<Mutex<Vec<String>>>;

fn log(events: &EventLog, entry: String) {
    events.lock().expect("event log lock").push(entry);
}

// ---------------------------------------------------------------------------
// In-memory trait implementations
// ---------------------------------------------------------------------------

enum FetchPlan {
    Posts(Vec<RawPost>),
    Fail,
}

struct MemFetcher {
    plans: HashMap<String, FetchPlan>,
    events: EventLog,
}

impl MemFetcher {
    fn new(events: EventLog) -> Self {
        MemFetcher {
            plans: HashMap::new(),
            events,
        }
    }

    fn with_posts(mut self, keyword: &str, posts: Vec<RawPost>) -> Self {
        self.plans.insert(keyword.to_owned(), FetchPlan::Posts(posts));
        self
    }

    fn with_failure(mut self, keyword: &str) -> Self {
        self.plans.insert(keyword.to_owned(), FetchPlan::Fail);
        self
    }
}

impl PostFetcher for MemFetcher {
    fn fetch_posts<'a>(
        &'a self,
        keyword: &'a str,
        _max_posts: u32,
        _window: TimeWindow,
    ) -> BoxFuture<'a, Result<Vec<RawPost>, ScrapeError>> {
        Box::pin(async move {
            log(&self.events, format!("fetch:{keyword}"));
            match self.plans.get(keyword) {
                Some(FetchPlan::Posts(posts)) => Ok(posts.clone()),
                Some(FetchPlan::Fail) => Err(ScrapeError::Api("provider unavailable".to_owned())),
                None => Ok(Vec::new()),
            }
        })
    }
}

#[derive(Default)]
struct MemStore {
    posts: Mutex<HashMap<String, Post>>,
    /// Remaining failures per post id before a write succeeds.
    flaky: Mutex<HashMap<String, u32>>,
    write_attempts: Mutex<HashMap<String, u32>>,
    /// Virtual-time stamp of every write attempt, in order.
    write_stamps: Mutex<Vec<tokio::time::Instant>>,
}

impl MemStore {
    fn failing(ids: &[(&str, u32)]) -> Self {
        let store = MemStore::default();
        {
            let mut flaky = store.flaky.lock().expect("flaky lock");
            for (id, failures) in ids {
                flaky.insert((*id).to_owned(), *failures);
            }
        }
        store
    }

    fn stored_ids(&self) -> HashSet<String> {
        self.posts
            .lock()
            .expect("posts lock")
            .keys()
            .cloned()
            .collect()
    }

    fn attempts_for(&self, id: &str) -> u32 {
        self.write_attempts
            .lock()
            .expect("attempts lock")
            .get(id)
            .copied()
            .unwrap_or(0)
    }
}

impl PostStore for MemStore {
    fn existing_post_ids<'a>(
        &'a self,
        ids: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<HashSet<String>>> {
        Box::pin(async move {
            let posts = self.posts.lock().expect("posts lock");
            Ok(ids
                .iter()
                .filter(|id| posts.contains_key(*id))
                .cloned()
                .collect())
        })
    }

    fn upsert_post<'a>(&'a self, post: &'a Post) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            self.write_stamps
                .lock()
                .expect("stamps lock")
                .push(tokio::time::Instant::now());
            *self
                .write_attempts
                .lock()
                .expect("attempts lock")
                .entry(post.id.clone())
                .or_insert(0) += 1;

            let mut flaky = self.flaky.lock().expect("flaky lock");
            if let Some(remaining) = flaky.get_mut(&post.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    anyhow::bail!("simulated write failure for {}", post.id);
                }
            }
            drop(flaky);

            self.posts
                .lock()
                .expect("posts lock")
                .insert(post.id.clone(), post.clone());
            Ok(())
        })
    }
}

#[derive(Default)]
struct MemCheckpoints {
    current: Mutex<Option<CollectionProgress>>,
    events: Option<EventLog>,
}

impl MemCheckpoints {
    fn with_events(events: EventLog) -> Self {
        MemCheckpoints {
            current: Mutex::new(None),
            events: Some(events),
        }
    }

    fn seeded(progress: CollectionProgress) -> Self {
        MemCheckpoints {
            current: Mutex::new(Some(progress)),
            events: None,
        }
    }

    fn snapshot(&self) -> Option<CollectionProgress> {
        self.current.lock().expect("checkpoint lock").clone()
    }
}

impl CheckpointStore for MemCheckpoints {
    fn load(&self) -> BoxFuture<'_, anyhow::Result<Option<CollectionProgress>>> {
        Box::pin(async move { Ok(self.current.lock().expect("checkpoint lock").clone()) })
    }

    fn save<'a>(&'a self, progress: &'a CollectionProgress) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            if let Some(events) = &self.events {
                log(events, format!("checkpoint:{}", progress.current_index));
            }
            *self.current.lock().expect("checkpoint lock") = Some(progress.clone());
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            *self.current.lock().expect("checkpoint lock") = None;
            Ok(())
        })
    }
}

#[derive(Default)]
struct MemReports {
    reports: Mutex<HashMap<NaiveDate, DailyReport>>,
    posts: Vec<Post>,
    saves: Mutex<u32>,
}

impl ReportStore for MemReports {
    fn report_for_date(
        &self,
        date: NaiveDate,
    ) -> BoxFuture<'_, anyhow::Result<Option<DailyReport>>> {
        Box::pin(async move { Ok(self.reports.lock().expect("reports lock").get(&date).cloned()) })
    }

    fn posts_for_day(&self, date: NaiveDate) -> BoxFuture<'_, anyhow::Result<Vec<Post>>> {
        Box::pin(async move {
            Ok(self
                .posts
                .iter()
                .filter(|p| p.published_at.date_naive() == date)
                .cloned()
                .collect())
        })
    }

    fn save_report<'a>(&'a self, report: &'a DailyReport) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            *self.saves.lock().expect("saves lock") += 1;
            self.reports
                .lock()
                .expect("reports lock")
                .insert(report.report_date, report.clone());
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw_post(id: &str, title: &str) -> RawPost {
    RawPost {
        post_id: id.to_owned(),
        title: title.to_owned(),
        content: String::new(),
        author: "用户_1".to_owned(),
        url: format!("https://example.com/p/{id}"),
        keyword: None,
        likes: 5,
        created_at: Some(Utc::now()),
    }
}

fn scored_post(id: &str, keyword: &str, score: f64) -> Post {
    Post {
        id: id.to_owned(),
        title: format!("title {id}"),
        body: String::new(),
        author: "用户_1".to_owned(),
        source_url: format!("https://example.com/p/{id}"),
        keyword: keyword.to_owned(),
        sentiment_score: score,
        sentiment_label: SentimentLabel::from_score(score),
        like_count: 0,
        published_at: Utc::now(),
    }
}

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| (*k).to_owned()).collect()
}

// ---------------------------------------------------------------------------
// run_collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn happy_path_scores_and_persists_all_keywords() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_posts("AI", vec![raw_post("a1", "这个产品很好"), raw_post("a2", "太垃圾了")])
        .with_posts("区块链", vec![raw_post("b1", "还行吧")]);
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::with_events(Arc::clone(&events));
    let scorer = Scorer::new();

    let summary = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &keywords(&["AI", "区块链"]),
    )
    .await
    .expect("run should succeed");

    assert_eq!(summary.keywords_total, 2);
    assert_eq!(summary.keywords_succeeded, 2);
    assert_eq!(summary.keywords_fallback, 0);
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.errors, 0);
    assert!(!summary.resumed);

    assert_eq!(
        store.stored_ids(),
        HashSet::from(["a1".to_owned(), "a2".to_owned(), "b1".to_owned()])
    );
    let stored = store.posts.lock().expect("posts lock");
    let good = stored.get("a1").expect("a1 stored");
    assert!(good.sentiment_score > 0.5, "positive title should score high");
    assert_eq!(good.sentiment_label, SentimentLabel::from_score(good.sentiment_score));
    assert_eq!(good.keyword, "AI");
    drop(stored);

    assert!(checkpoints.snapshot().is_none(), "checkpoint cleared on completion");
}

#[tokio::test]
async fn checkpoint_is_written_before_each_fetch() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_posts("AI", vec![raw_post("a1", "好")])
        .with_posts("新能源", vec![raw_post("b1", "差")]);
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::with_events(Arc::clone(&events));
    let scorer = Scorer::new();

    run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &keywords(&["AI", "新能源"]),
    )
    .await
    .expect("run should succeed");

    let seen = events.lock().expect("event log lock").clone();
    assert_eq!(
        seen,
        vec!["checkpoint:0", "fetch:AI", "checkpoint:1", "fetch:新能源"]
    );
}

#[tokio::test]
async fn failed_keyword_is_skipped_when_fallback_disabled() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_failure("AI")
        .with_posts("区块链", vec![raw_post("b1", "不错")]);
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::default();
    let scorer = Scorer::new();
    let cfg = PipelineConfig {
        fallback_enabled: false,
        ..PipelineConfig::instant()
    };

    let summary = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &cfg,
        &keywords(&["AI", "区块链"]),
    )
    .await
    .expect("one failed keyword must not abort the run");

    assert_eq!(summary.keywords_failed, 1);
    assert_eq!(summary.keywords_succeeded, 1);
    assert_eq!(summary.saved, 1);
    assert_eq!(store.stored_ids(), HashSet::from(["b1".to_owned()]));
}

#[tokio::test]
async fn failed_keyword_substitutes_fallback_posts_when_enabled() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events)).with_failure("AI");
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::default();
    let scorer = Scorer::new();
    let cfg = PipelineConfig {
        max_posts_per_keyword: 5,
        ..PipelineConfig::instant()
    };

    let summary = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &cfg,
        &keywords(&["AI"]),
    )
    .await
    .expect("fallback keeps the run alive");

    assert_eq!(summary.keywords_fallback, 1);
    assert_eq!(summary.keywords_failed, 0);
    assert_eq!(summary.collected, 5);
    assert_eq!(summary.saved, 5);
    for id in store.stored_ids() {
        assert!(is_fallback_id(&id), "expected fallback id, got {id}");
    }
}

#[tokio::test]
async fn all_keywords_empty_yields_no_data_and_keeps_checkpoint() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_posts("AI", Vec::new())
        .with_posts("区块链", Vec::new());
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::default();
    let scorer = Scorer::new();

    let result = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &keywords(&["AI", "区块链"]),
    )
    .await;

    assert!(matches!(result, Err(PipelineError::NoData)));
    assert!(store.stored_ids().is_empty());
    assert!(
        checkpoints.snapshot().is_some(),
        "checkpoint survives an empty run"
    );
}

#[tokio::test]
async fn empty_keyword_list_is_rejected() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events));
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::default();
    let scorer = Scorer::new();

    let result = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &[],
    )
    .await;

    assert!(matches!(result, Err(PipelineError::Validation(_))));
}

#[tokio::test]
async fn out_of_range_max_posts_is_rejected() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events));
    let store = MemStore::default();
    let checkpoints = MemCheckpoints::default();
    let scorer = Scorer::new();

    for bad in [0u32, 51] {
        let cfg = PipelineConfig {
            max_posts_per_keyword: bad,
            ..PipelineConfig::instant()
        };
        let result = run_collection(
            &fetcher,
            &store,
            &checkpoints,
            &scorer,
            &cfg,
            &keywords(&["AI"]),
        )
        .await;
        assert!(
            matches!(result, Err(PipelineError::Validation(_))),
            "max_posts {bad} must be rejected"
        );
    }
}

#[tokio::test]
async fn recent_checkpoint_resumes_at_next_keyword() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_posts("AI", vec![raw_post("a1", "好")])
        .with_posts("区块链", vec![raw_post("b1", "好")])
        .with_posts("新能源", vec![raw_post("c1", "好")]);
    let store = MemStore::default();
    let session_id = Uuid::new_v4();
    let checkpoints = MemCheckpoints::seeded(CollectionProgress {
        session_id,
        current_index: 0,
        total_keywords: 3,
        current_keyword: "AI".to_owned(),
        started_at: Utc::now() - Duration::seconds(120),
        updated_at: Utc::now() - Duration::seconds(60),
        status: PROGRESS_STATUS_COLLECTING.to_owned(),
    });
    let scorer = Scorer::new();

    let summary = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &keywords(&["AI", "区块链", "新能源"]),
    )
    .await
    .expect("resumed run should succeed");

    assert!(summary.resumed);
    assert_eq!(summary.session_id, session_id);
    assert_eq!(summary.collected, 2, "only keywords after the checkpoint run");
    assert_eq!(store.stored_ids(), HashSet::from(["b1".to_owned(), "c1".to_owned()]));

    let fetches: Vec<String> = events
        .lock()
        .expect("event log lock")
        .iter()
        .filter(|e| e.starts_with("fetch:"))
        .cloned()
        .collect();
    assert_eq!(fetches, vec!["fetch:区块链", "fetch:新能源"]);
}

#[tokio::test]
async fn stale_checkpoint_restarts_from_the_beginning() {
    let events = EventLog::default();
    let fetcher = MemFetcher::new(Arc::clone(&events))
        .with_posts("AI", vec![raw_post("a1", "好")])
        .with_posts("区块链", vec![raw_post("b1", "好")]);
    let store = MemStore::default();
    let old_session = Uuid::new_v4();
    let checkpoints = MemCheckpoints::seeded(CollectionProgress {
        session_id: old_session,
        current_index: 0,
        total_keywords: 2,
        current_keyword: "AI".to_owned(),
        started_at: Utc::now() - Duration::hours(3),
        updated_at: Utc::now() - Duration::hours(2),
        status: PROGRESS_STATUS_COLLECTING.to_owned(),
    });
    let scorer = Scorer::new();

    let summary = run_collection(
        &fetcher,
        &store,
        &checkpoints,
        &scorer,
        &PipelineConfig::instant(),
        &keywords(&["AI", "区块链"]),
    )
    .await
    .expect("fresh run should succeed");

    assert!(!summary.resumed);
    assert_ne!(summary.session_id, old_session);
    assert_eq!(summary.collected, 2);
}

// ---------------------------------------------------------------------------
// persist_posts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repersisting_the_same_batch_counts_duplicates() {
    let store = MemStore::default();
    let cfg = PipelineConfig::instant();
    let posts: Vec<Post> = (0..12)
        .map(|i| scored_post(&format!("p{i}"), "AI", 0.5))
        .collect();

    let first = persist_posts(&store, &posts, &cfg).await.expect("first save");
    assert_eq!(first.saved, 12);
    assert_eq!(first.duplicates, 0);
    assert_eq!(first.errors, 0);

    let second = persist_posts(&store, &posts, &cfg).await.expect("second save");
    assert_eq!(second.saved, 0);
    assert_eq!(second.duplicates, 12);
    assert_eq!(second.errors, 0);
}

#[tokio::test]
async fn one_failing_write_never_blocks_its_batch_siblings() {
    let store = MemStore::failing(&[("p1", u32::MAX)]);
    let cfg = PipelineConfig::instant();
    let posts = vec![
        scored_post("p0", "AI", 0.5),
        scored_post("p1", "AI", 0.5),
        scored_post("p2", "AI", 0.5),
    ];

    let outcome = persist_posts(&store, &posts, &cfg).await.expect("partial failure is not fatal");
    assert_eq!(outcome.saved, 2);
    assert_eq!(outcome.errors, 1);
    assert_eq!(store.stored_ids(), HashSet::from(["p0".to_owned(), "p2".to_owned()]));
}

#[tokio::test]
async fn transient_write_failures_are_retried() {
    // Two failures then success fits inside the three-attempt budget.
    let store = MemStore::failing(&[("p0", 2)]);
    let cfg = PipelineConfig::instant();
    let posts = vec![scored_post("p0", "AI", 0.5)];

    let outcome = persist_posts(&store, &posts, &cfg).await.expect("save");
    assert_eq!(outcome.saved, 1);
    assert_eq!(outcome.errors, 0);
    assert_eq!(store.attempts_for("p0"), 3);
}

#[tokio::test(start_paused = true)]
async fn write_retry_delay_grows_linearly() {
    let store = MemStore::failing(&[("p0", 3)]);
    let cfg = PipelineConfig {
        write_max_attempts: 4,
        write_retry_base_ms: 1_000,
        ..PipelineConfig::instant()
    };
    let posts = vec![scored_post("p0", "AI", 0.5)];

    let outcome = persist_posts(&store, &posts, &cfg).await.expect("save");
    assert_eq!(outcome.saved, 1);
    assert_eq!(outcome.errors, 0);

    // Paused clock: the gap between attempts is exactly the linear backoff,
    // 1000 ms x 1, x 2, x 3.
    let stamps = store.write_stamps.lock().expect("stamps lock");
    assert_eq!(stamps.len(), 4);
    assert_eq!(stamps[1] - stamps[0], std::time::Duration::from_millis(1_000));
    assert_eq!(stamps[2] - stamps[1], std::time::Duration::from_millis(2_000));
    assert_eq!(stamps[3] - stamps[2], std::time::Duration::from_millis(3_000));
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let store = MemStore::default();
    let outcome = persist_posts(&store, &[], &PipelineConfig::instant())
        .await
        .expect("empty save");
    assert_eq!(outcome.saved, 0);
    assert_eq!(outcome.duplicates, 0);
    assert_eq!(outcome.errors, 0);
}

// ---------------------------------------------------------------------------
// build_daily_report
// ---------------------------------------------------------------------------

#[tokio::test]
async fn daily_report_aggregates_and_is_idempotent() {
    let date = Utc::now().date_naive();
    let reports = MemReports {
        posts: vec![
            scored_post("a", "AI", 0.9),
            scored_post("b", "AI", 0.5),
            scored_post("c", "区块链", 0.1),
        ],
        ..MemReports::default()
    };

    let first = build_daily_report(&reports, date)
        .await
        .expect("report build")
        .expect("posts exist, report expected");
    assert_eq!(first.total_posts, 3);
    assert_eq!(first.positive_count, 1);
    assert_eq!(first.neutral_count, 1);
    assert_eq!(first.negative_count, 1);
    assert_eq!(first.top_negative_posts[0].id, "c");

    let second = build_daily_report(&reports, date)
        .await
        .expect("second build")
        .expect("existing report returned");
    assert_eq!(second.total_posts, first.total_posts);
    assert_eq!(
        *reports.saves.lock().expect("saves lock"),
        1,
        "existing report must not be rewritten"
    );
}

#[tokio::test]
async fn day_without_posts_produces_no_report() {
    let reports = MemReports::default();
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let result = build_daily_report(&reports, date).await.expect("report build");
    assert!(result.is_none());
    assert_eq!(*reports.saves.lock().expect("saves lock"), 0);
}
