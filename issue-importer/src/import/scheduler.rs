//! Wave-based hierarchical issue creation
//!
//! Rows reference their parent by a spreadsheet-local id, but Jira needs the
//! parent's real key at creation time. The scheduler therefore creates issues
//! in waves: each wave submits every pending request whose parent is absent or
//! already created, records the keys Jira hands back, and repeats. Requests
//! whose parent never gets created (dangling or circular references, or a
//! parent that itself failed) are drained as failures once a wave finds
//! nothing ready.

use std::collections::{HashMap, HashSet};

use log::{error, info, warn};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::api::{BatchEntry, IssueTracker};

/// One row's intent to create an issue
#[derive(Debug, Clone)]
pub struct CreationRequest<R> {
    pub local_id: String,
    pub parent_local_id: Option<String>,
    pub fields: Map<String, Value>,
    pub source_row: R,
}

impl<R> CreationRequest<R> {
    pub fn new(local_id: impl Into<String>, fields: Map<String, Value>, source_row: R) -> Self {
        Self {
            local_id: local_id.into(),
            parent_local_id: None,
            fields,
            source_row,
        }
    }

    /// Set the parent reference; an empty string means no parent
    pub fn with_parent(mut self, parent_local_id: impl Into<String>) -> Self {
        let parent = parent_local_id.into();
        self.parent_local_id = if parent.is_empty() { None } else { Some(parent) };
        self
    }

    fn parent(&self) -> Option<&str> {
        self.parent_local_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// Why a row did not produce an issue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The row could not be turned into a field payload
    #[error("{0}")]
    Validation(String),
    /// The parent never got created: missing, circular, or failed itself
    #[error("parent issue could not be created (missing, circular or failed parent reference)")]
    Deadlock,
    /// The batch call this row was part of failed as a whole
    #[error("bulk create failed: {0}")]
    BatchRejected(String),
    /// The batch call succeeded but returned no key for this row
    #[error("issue was not created by the tracker")]
    MissingFromResult,
    /// Never submitted because an earlier batch failed
    #[error("not submitted: an earlier batch failed")]
    Aborted,
}

/// Caller or tracker broke the scheduler's contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("request at position {0} has an empty local id")]
    EmptyLocalId(usize),
    #[error("local id '{0}' appears more than once")]
    DuplicateLocalId(String),
    #[error("tracker returned a key for '{0}', which was not in the submitted batch")]
    UnexpectedLocalId(String),
}

/// A request that produced an issue
#[derive(Debug, Clone)]
pub struct CreatedIssue<R> {
    pub local_id: String,
    pub remote_key: String,
    /// 1-based wave the issue was created in
    pub wave: usize,
    pub source_row: R,
}

/// A request that did not produce an issue
#[derive(Debug, Clone)]
pub struct FailedRequest<R> {
    pub local_id: String,
    pub source_row: R,
    pub reason: FailureReason,
}

/// Result of one scheduler run
#[derive(Debug, Clone)]
pub struct ScheduleOutcome<R> {
    /// Created issues in creation order
    pub created: Vec<CreatedIssue<R>>,
    /// Failed requests in input order
    pub failed: Vec<FailedRequest<R>>,
    /// Number of waves that submitted at least one batch
    pub waves: usize,
}

impl<R> ScheduleOutcome<R> {
    /// Local id to remote key for every created issue
    pub fn resolved(&self) -> HashMap<String, String> {
        self.created
            .iter()
            .map(|c| (c.local_id.clone(), c.remote_key.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Created { key: String, wave: usize },
    Failed(FailureReason),
}

/// Creates requests wave by wave so parents always exist before children
#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    max_batch_size: Option<usize>,
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of requests per tracker call; zero means no cap
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = if max == 0 { None } else { Some(max) };
        self
    }

    /// Run all requests to completion against `tracker`
    ///
    /// Expected failures (deadlocks, rejected batches, missing keys) end up
    /// in `ScheduleOutcome::failed`; only contract violations return `Err`.
    pub async fn run<R, T>(
        &self,
        requests: Vec<CreationRequest<R>>,
        tracker: &T,
    ) -> Result<ScheduleOutcome<R>, SchedulerError>
    where
        T: IssueTracker + ?Sized,
    {
        check_local_ids(&requests)?;

        let mut slots: Vec<Slot> = vec![Slot::Pending; requests.len()];
        let mut pending: Vec<usize> = (0..requests.len()).collect();
        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut creation_order: Vec<usize> = Vec::new();
        let mut waves = 0;

        while !pending.is_empty() {
            let ready: Vec<usize> = pending
                .iter()
                .copied()
                .filter(|&idx| match requests[idx].parent() {
                    None => true,
                    Some(parent) => resolved.contains_key(parent),
                })
                .collect();

            if ready.is_empty() {
                warn!(
                    "{} request(s) can never be created (missing or circular parents): {}",
                    pending.len(),
                    pending
                        .iter()
                        .map(|&idx| requests[idx].local_id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                for &idx in &pending {
                    slots[idx] = Slot::Failed(FailureReason::Deadlock);
                }
                break;
            }

            waves += 1;
            info!(
                "Wave {}: submitting {} of {} pending request(s)",
                waves,
                ready.len(),
                pending.len()
            );

            let chunk_size = self.max_batch_size.unwrap_or(ready.len());
            let mut aborted = false;

            for chunk in ready.chunks(chunk_size) {
                if aborted {
                    for &idx in chunk {
                        slots[idx] = Slot::Failed(FailureReason::Aborted);
                    }
                    continue;
                }

                let batch: Vec<BatchEntry> = chunk
                    .iter()
                    .map(|&idx| submission_entry(&requests[idx], &resolved))
                    .collect();

                match tracker.create_batch(&batch).await {
                    Ok(mut keys) => {
                        for &idx in chunk {
                            let local_id = &requests[idx].local_id;
                            match keys.remove(local_id) {
                                Some(key) => {
                                    resolved.insert(local_id.clone(), key.clone());
                                    slots[idx] = Slot::Created {
                                        key,
                                        wave: waves,
                                    };
                                    creation_order.push(idx);
                                }
                                None => {
                                    warn!("Tracker returned no key for {}", local_id);
                                    slots[idx] = Slot::Failed(FailureReason::MissingFromResult);
                                }
                            }
                        }
                        if let Some(unexpected) = keys.into_keys().next() {
                            return Err(SchedulerError::UnexpectedLocalId(unexpected));
                        }
                    }
                    Err(err) => {
                        error!("Wave {}: batch of {} failed: {}", waves, batch.len(), err);
                        let reason = FailureReason::BatchRejected(err.to_string());
                        for &idx in chunk {
                            slots[idx] = Slot::Failed(reason.clone());
                        }
                        aborted = true;
                    }
                }
            }

            pending.retain(|&idx| matches!(slots[idx], Slot::Pending));

            if aborted {
                for &idx in &pending {
                    slots[idx] = Slot::Failed(FailureReason::Aborted);
                }
                break;
            }
        }

        Ok(collect_outcome(requests, slots, creation_order, waves))
    }
}

fn check_local_ids<R>(requests: &[CreationRequest<R>]) -> Result<(), SchedulerError> {
    let mut seen = HashSet::with_capacity(requests.len());
    for (idx, request) in requests.iter().enumerate() {
        if request.local_id.is_empty() {
            return Err(SchedulerError::EmptyLocalId(idx));
        }
        if !seen.insert(request.local_id.as_str()) {
            return Err(SchedulerError::DuplicateLocalId(request.local_id.clone()));
        }
    }
    Ok(())
}

/// Copy of the request's fields with the resolved parent injected
fn submission_entry<R>(
    request: &CreationRequest<R>,
    resolved: &HashMap<String, String>,
) -> BatchEntry {
    let mut fields = request.fields.clone();
    if let Some(key) = request.parent().and_then(|p| resolved.get(p)) {
        fields.insert("parent".to_string(), json!({ "key": key }));
    }
    BatchEntry {
        local_id: request.local_id.clone(),
        fields,
    }
}

fn collect_outcome<R>(
    requests: Vec<CreationRequest<R>>,
    slots: Vec<Slot>,
    creation_order: Vec<usize>,
    waves: usize,
) -> ScheduleOutcome<R> {
    let mut created_at: HashMap<usize, usize> = HashMap::with_capacity(creation_order.len());
    for (position, idx) in creation_order.iter().enumerate() {
        created_at.insert(*idx, position);
    }

    let mut created: Vec<(usize, CreatedIssue<R>)> = Vec::with_capacity(creation_order.len());
    let mut failed = Vec::new();

    for (idx, (request, slot)) in requests.into_iter().zip(slots).enumerate() {
        match slot {
            Slot::Created { key, wave } => created.push((
                created_at.get(&idx).copied().unwrap_or(usize::MAX),
                CreatedIssue {
                    local_id: request.local_id,
                    remote_key: key,
                    wave,
                    source_row: request.source_row,
                },
            )),
            Slot::Failed(reason) => failed.push(FailedRequest {
                local_id: request.local_id,
                source_row: request.source_row,
                reason,
            }),
            // Never submitted
            Slot::Pending => failed.push(FailedRequest {
                local_id: request.local_id,
                source_row: request.source_row,
                reason: FailureReason::Aborted,
            }),
        }
    }

    created.sort_by_key(|(position, _)| *position);

    ScheduleOutcome {
        created: created.into_iter().map(|(_, c)| c).collect(),
        failed,
        waves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tracker::{BatchError, CreatedKeys};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// How the scripted tracker answers a given call
    enum Script {
        /// Create everything, key = id + "-KEY"
        All,
        /// Create only these ids
        Only(Vec<&'static str>),
        /// Fail the whole call
        Fail,
    }

    struct ScriptedTracker {
        script: Mutex<Vec<Script>>,
        calls: Mutex<Vec<Vec<BatchEntry>>>,
    }

    impl ScriptedTracker {
        /// Calls beyond the script fall back to `Script::All`
        fn new(script: Vec<Script>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always_succeeds() -> Self {
            Self::new(Vec::new())
        }

        fn calls(&self) -> Vec<Vec<BatchEntry>> {
            self.calls.lock().unwrap().clone()
        }

        fn call_ids(&self) -> Vec<Vec<String>> {
            self.calls()
                .into_iter()
                .map(|batch| batch.into_iter().map(|e| e.local_id).collect())
                .collect()
        }
    }

    #[async_trait]
    impl IssueTracker for ScriptedTracker {
        async fn create_batch(&self, batch: &[BatchEntry]) -> Result<CreatedKeys, BatchError> {
            assert!(!batch.is_empty(), "scheduler submitted an empty batch");
            self.calls.lock().unwrap().push(batch.to_vec());
            let step = self.script.lock().unwrap().pop().unwrap_or(Script::All);
            match step {
                Script::All => Ok(batch
                    .iter()
                    .map(|e| (e.local_id.clone(), format!("{}-KEY", e.local_id)))
                    .collect()),
                Script::Only(ids) => Ok(batch
                    .iter()
                    .filter(|e| ids.iter().any(|id| *id == e.local_id))
                    .map(|e| (e.local_id.clone(), format!("{}-KEY", e.local_id)))
                    .collect()),
                Script::Fail => Err(BatchError::Request(
                    "API error (401 Unauthorized)".to_string(),
                )),
            }
        }
    }

    /// Tracker that returns keys for ids nobody asked for
    struct RogueTracker;

    #[async_trait]
    impl IssueTracker for RogueTracker {
        async fn create_batch(&self, _batch: &[BatchEntry]) -> Result<CreatedKeys, BatchError> {
            Ok(CreatedKeys::from([("ghost".to_string(), "PRJ-1".to_string())]))
        }
    }

    fn req(id: &str, parent: Option<&str>) -> CreationRequest<String> {
        let mut fields = Map::new();
        fields.insert("summary".to_string(), json!(format!("Issue {id}")));
        CreationRequest::new(id, fields, format!("row-{id}")).with_parent(parent.unwrap_or(""))
    }

    fn failed_ids<R>(outcome: &ScheduleOutcome<R>) -> Vec<&str> {
        outcome.failed.iter().map(|f| f.local_id.as_str()).collect()
    }

    fn assert_partition<R>(outcome: &ScheduleOutcome<R>, ids: &[&str]) {
        let mut seen: Vec<&str> = outcome
            .created
            .iter()
            .map(|c| c.local_id.as_str())
            .chain(outcome.failed.iter().map(|f| f.local_id.as_str()))
            .collect();
        seen.sort();
        let mut expected = ids.to_vec();
        expected.sort();
        assert_eq!(seen, expected, "every id must end in exactly one bucket");
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let tracker = ScriptedTracker::always_succeeds();
        let outcome = WaveScheduler::new()
            .run(Vec::<CreationRequest<String>>::new(), &tracker)
            .await
            .unwrap();

        assert!(outcome.created.is_empty());
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.waves, 0);
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_simple_chain_takes_three_waves() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![req("A", None), req("B", Some("A")), req("C", Some("B"))];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(outcome.waves, 3);
        assert_eq!(
            outcome.resolved(),
            HashMap::from([
                ("A".to_string(), "A-KEY".to_string()),
                ("B".to_string(), "B-KEY".to_string()),
                ("C".to_string(), "C-KEY".to_string()),
            ])
        );
        assert!(outcome.failed.is_empty());
        assert_eq!(tracker.call_ids(), vec![vec!["A"], vec!["B"], vec!["C"]]);
    }

    #[tokio::test]
    async fn test_parent_key_injected_into_copy_only() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![req("A", None), req("B", Some("A"))];

        let child_fields = requests[1].fields.clone();

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        let calls = tracker.calls();
        assert!(!calls[0][0].fields.contains_key("parent"));
        assert_eq!(calls[1][0].fields["parent"], json!({"key": "A-KEY"}));

        let mut submitted = calls[1][0].fields.clone();
        submitted.remove("parent");
        assert_eq!(submitted, child_fields);
        assert!(!child_fields.contains_key("parent"));
        assert_eq!(calls[1][0].fields["summary"], json!("Issue B"));
        assert_eq!(outcome.created.len(), 2);
    }

    #[tokio::test]
    async fn test_independent_rows_share_a_wave_in_input_order() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![
            req("E1", None),
            req("S1", Some("E1")),
            req("E2", None),
            req("S2", Some("E2")),
            req("T1", None),
        ];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(outcome.waves, 2);
        assert_eq!(
            tracker.call_ids(),
            vec![vec!["E1", "E2", "T1"], vec!["S1", "S2"]]
        );
        let created: Vec<_> = outcome.created.iter().map(|c| c.local_id.as_str()).collect();
        assert_eq!(created, vec!["E1", "E2", "T1", "S1", "S2"]);
    }

    #[tokio::test]
    async fn test_child_listed_before_parent() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![req("child", Some("parent")), req("parent", None)];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(tracker.call_ids(), vec![vec!["parent"], vec!["child"]]);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_child_wave_after_parent_wave() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![
            req("D", Some("C")),
            req("A", None),
            req("C", Some("B")),
            req("B", Some("A")),
            req("X", Some("A")),
            req("Y", None),
        ];
        let parents: HashMap<String, Option<String>> = requests
            .iter()
            .map(|r| (r.local_id.clone(), r.parent_local_id.clone()))
            .collect();

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        let waves: HashMap<&str, usize> = outcome
            .created
            .iter()
            .map(|c| (c.local_id.as_str(), c.wave))
            .collect();
        for created in &outcome.created {
            if let Some(parent) = &parents[&created.local_id] {
                assert!(
                    waves[parent.as_str()] < created.wave,
                    "{} before its parent",
                    created.local_id
                );
            }
        }
        assert_eq!(outcome.waves, 4);
    }

    #[tokio::test]
    async fn test_mutual_cycle_fails_both() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![req("A", Some("B")), req("B", Some("A"))];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert!(outcome.resolved().is_empty());
        assert_eq!(failed_ids(&outcome), vec!["A", "B"]);
        assert!(outcome.failed.iter().all(|f| f.reason == FailureReason::Deadlock));
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_self_parent_is_a_deadlock() {
        let tracker = ScriptedTracker::always_succeeds();
        let outcome = WaveScheduler::new()
            .run(vec![req("A", Some("A"))], &tracker)
            .await
            .unwrap();

        assert_eq!(failed_ids(&outcome), vec!["A"]);
        assert_eq!(outcome.failed[0].reason, FailureReason::Deadlock);
    }

    #[tokio::test]
    async fn test_dangling_parent_fails_row_and_descendants() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![
            req("A", Some("ZZZ")),
            req("ok", None),
            req("A1", Some("A")),
        ];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(failed_ids(&outcome), vec!["A", "A1"]);
        assert_eq!(outcome.resolved().len(), 1);
        assert_eq!(outcome.waves, 1);
        assert_eq!(
            outcome.failed.iter().map(|f| f.source_row.clone()).collect::<Vec<_>>(),
            vec!["row-A".to_string(), "row-A1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_partial_batch_success_fails_missing_row_and_dependents() {
        let tracker = ScriptedTracker::new(vec![Script::Only(vec!["A"])]);
        let requests = vec![
            req("A", None),
            req("B", None),
            req("B1", Some("B")),
            req("A1", Some("A")),
        ];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(outcome.resolved().get("A").map(String::as_str), Some("A-KEY"));
        assert_eq!(outcome.resolved().get("A1").map(String::as_str), Some("A1-KEY"));
        assert_eq!(failed_ids(&outcome), vec!["B", "B1"]);
        assert_eq!(outcome.failed[0].reason, FailureReason::MissingFromResult);
        assert_eq!(outcome.failed[1].reason, FailureReason::Deadlock);
        assert_partition(&outcome, &["A", "B", "B1", "A1"]);
    }

    #[tokio::test]
    async fn test_batch_failure_stops_all_waves() {
        let tracker = ScriptedTracker::new(vec![Script::Fail]);
        let requests = vec![req("A", None), req("B", None)];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(failed_ids(&outcome), vec!["A", "B"]);
        assert!(matches!(outcome.failed[0].reason, FailureReason::BatchRejected(_)));
        assert_eq!(tracker.calls().len(), 1);
        assert_eq!(outcome.waves, 1);
    }

    #[tokio::test]
    async fn test_batch_failure_reports_unsubmitted_rows_as_aborted() {
        let tracker = ScriptedTracker::new(vec![Script::All, Script::Fail]);
        let requests = vec![
            req("A", None),
            req("B", Some("A")),
            req("C", Some("B")),
        ];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(tracker.calls().len(), 2);
        assert_eq!(outcome.resolved().len(), 1);
        assert_eq!(failed_ids(&outcome), vec!["B", "C"]);
        assert!(matches!(outcome.failed[0].reason, FailureReason::BatchRejected(_)));
        assert_eq!(outcome.failed[1].reason, FailureReason::Aborted);
        assert_partition(&outcome, &["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_failures_reported_in_input_order() {
        // "late" fails in wave 2 (missing key), "early" is drained afterwards
        let tracker = ScriptedTracker::new(vec![Script::All, Script::Only(vec![])]);
        let requests = vec![
            req("early", Some("late")),
            req("root", None),
            req("late", Some("root")),
        ];

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(failed_ids(&outcome), vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_max_batch_size_splits_waves() {
        let tracker = ScriptedTracker::always_succeeds();
        let requests = vec![
            req("A", None),
            req("B", None),
            req("C", None),
            req("A1", Some("A")),
        ];

        let outcome = WaveScheduler::new()
            .with_max_batch_size(2)
            .run(requests, &tracker)
            .await
            .unwrap();

        assert_eq!(
            tracker.call_ids(),
            vec![vec!["A", "B"], vec!["C"], vec!["A1"]]
        );
        assert_eq!(outcome.waves, 2);
        assert_eq!(outcome.created.iter().filter(|c| c.wave == 1).count(), 3);
    }

    #[tokio::test]
    async fn test_failed_chunk_keeps_earlier_chunks_and_aborts_rest() {
        let tracker = ScriptedTracker::new(vec![Script::All, Script::Fail]);
        let requests = vec![
            req("A", None),
            req("B", None),
            req("C", None),
            req("D", None),
            req("E", None),
        ];

        let outcome = WaveScheduler::new()
            .with_max_batch_size(2)
            .run(requests, &tracker)
            .await
            .unwrap();

        assert_eq!(tracker.calls().len(), 2);
        assert_eq!(outcome.resolved().len(), 2);
        assert_eq!(failed_ids(&outcome), vec!["C", "D", "E"]);
        assert!(matches!(outcome.failed[0].reason, FailureReason::BatchRejected(_)));
        assert_eq!(outcome.failed[2].reason, FailureReason::Aborted);
    }

    #[tokio::test]
    async fn test_wave_count_bounded_by_request_count() {
        let tracker = ScriptedTracker::always_succeeds();
        let ids: Vec<String> = (0..12).map(|n| format!("n{n}")).collect();
        let requests: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(n, id)| {
                let parent = if n == 0 { None } else { Some(ids[n - 1].as_str()) };
                req(id, parent)
            })
            .collect();

        let outcome = WaveScheduler::new().run(requests, &tracker).await.unwrap();

        assert_eq!(outcome.waves, 12);
        assert!(tracker.calls().len() <= 12);
        assert_eq!(outcome.created.len(), 12);
    }

    #[tokio::test]
    async fn test_duplicate_local_id_is_rejected() {
        let tracker = ScriptedTracker::always_succeeds();
        let result = WaveScheduler::new()
            .run(vec![req("A", None), req("A", None)], &tracker)
            .await;

        assert_eq!(
            result.unwrap_err(),
            SchedulerError::DuplicateLocalId("A".to_string())
        );
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_local_id_is_rejected() {
        let tracker = ScriptedTracker::always_succeeds();
        let result = WaveScheduler::new()
            .run(vec![req("A", None), req("", None)], &tracker)
            .await;

        assert_eq!(result.unwrap_err(), SchedulerError::EmptyLocalId(1));
    }

    #[tokio::test]
    async fn test_unexpected_key_is_a_contract_violation() {
        let result = WaveScheduler::new()
            .run(vec![req("A", None)], &RogueTracker)
            .await;

        assert_eq!(
            result.unwrap_err(),
            SchedulerError::UnexpectedLocalId("ghost".to_string())
        );
    }

    #[test]
    fn test_empty_parent_means_no_parent() {
        let request = req("A", Some(""));
        assert!(request.parent_local_id.is_none());
        assert!(request.parent().is_none());
    }

    #[test]
    fn test_unsubmitted_request_reported_as_aborted() {
        let requests = vec![req("A", None), req("B", Some("A"))];
        let slots = vec![
            Slot::Created {
                key: "A-KEY".to_string(),
                wave: 1,
            },
            Slot::Pending,
        ];

        let outcome = collect_outcome(requests, slots, vec![0], 1);

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(failed_ids(&outcome), vec!["B"]);
        assert_eq!(outcome.failed[0].reason, FailureReason::Aborted);
    }
}
