//! Fire-and-forget execution dispatch

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use uuid::Uuid;

use super::outcome_registry::OutcomeRegistry;
use crate::domain::{
    ExecutionId, ExecutionOutcome, TriggerPayload, WorkflowError, WorkflowExecutor,
};

/// Per conversation, the completion signal of the most recently dispatched execution
type ConversationQueues = Mutex<HashMap<String, oneshot::Receiver<()>>>;

/// Handle to a dispatched execution
#[derive(Debug)]
pub struct ExecutionHandle {
    execution_id: ExecutionId,
    join: JoinHandle<ExecutionOutcome>,
}

impl ExecutionHandle {
    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    /// Wait for the terminal outcome
    pub async fn outcome(self) -> Result<ExecutionOutcome, WorkflowError> {
        self.join
            .await
            .map_err(|e| WorkflowError::internal(format!("execution task failed: {}", e)))
    }
}

/// Starts executions on the runtime and records their outcomes
#[derive(Debug, Clone)]
pub struct ExecutionDispatcher {
    executor: Arc<dyn WorkflowExecutor>,
    registry: OutcomeRegistry,
    tracker: TaskTracker,
    queues: Option<Arc<ConversationQueues>>,
}

impl ExecutionDispatcher {
    pub fn new(executor: Arc<dyn WorkflowExecutor>, registry: OutcomeRegistry) -> Self {
        Self {
            executor,
            registry,
            tracker: TaskTracker::new(),
            queues: None,
        }
    }

    /// Run executions of the same conversation one at a time, in dispatch order
    pub fn serialize_by_conversation(mut self, enabled: bool) -> Self {
        self.queues = enabled.then(|| Arc::new(Mutex::new(HashMap::new())));
        self
    }

    pub fn registry(&self) -> &OutcomeRegistry {
        &self.registry
    }

    /// Start an execution with a fresh ID
    pub async fn dispatch(
        &self,
        trigger: TriggerPayload,
    ) -> Result<ExecutionHandle, WorkflowError> {
        self.dispatch_with_id(ExecutionId::new(Uuid::new_v4().to_string()), trigger)
            .await
    }

    /// Start an execution under a caller-chosen ID
    pub async fn dispatch_with_id(
        &self,
        execution_id: ExecutionId,
        trigger: TriggerPayload,
    ) -> Result<ExecutionHandle, WorkflowError> {
        if self.tracker.is_closed() {
            return Err(WorkflowError::internal("dispatcher is shutting down"));
        }

        let (predecessor, done) = match &self.queues {
            Some(queues) => {
                let (done, predecessor) = enqueue(queues, &trigger.conversation_id).await;
                (predecessor, Some(done))
            }
            None => (None, None),
        };

        debug!(
            execution_id = %execution_id,
            conversation_id = %trigger.conversation_id,
            queued = predecessor.is_some(),
            "Dispatching execution"
        );

        let executor = self.executor.clone();
        let registry = self.registry.clone();
        let id = execution_id.clone();

        let join = self.tracker.spawn(async move {
            if let Some(previous) = predecessor {
                // Resolves once the previous execution drops its sender
                let _ = previous.await;
            }

            let outcome = executor.start(id, trigger).await;
            registry.record(outcome.clone()).await;
            drop(done);
            outcome
        });

        Ok(ExecutionHandle { execution_id, join })
    }

    /// Number of executions still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting executions and wait for the running ones
    pub async fn shutdown(&self) {
        self.tracker.close();

        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "Waiting for in-flight executions");
        }

        self.tracker.wait().await;
    }
}

/// Take the tail of a conversation's queue.
///
/// Returns the sender the new execution drops when it finishes and the
/// receiver of the execution it has to wait for, if one is still running.
async fn enqueue(
    queues: &ConversationQueues,
    conversation_id: &str,
) -> (oneshot::Sender<()>, Option<oneshot::Receiver<()>>) {
    let (done, tail) = oneshot::channel();

    let mut map = queues.lock().await;
    map.retain(|_, rx| matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    let predecessor = map.insert(conversation_id.to_string(), tail);
    (done, predecessor)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{ErrorKind, ExecutionState, WorkflowStage};

    /// Executor that records start/finish order and sleeps in between
    #[derive(Debug)]
    struct RecordingExecutor {
        events: std::sync::Mutex<Vec<String>>,
        delay: Duration,
    }

    impl RecordingExecutor {
        fn new(delay: Duration) -> Self {
            Self {
                events: std::sync::Mutex::new(Vec::new()),
                delay,
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkflowExecutor for RecordingExecutor {
        async fn start(
            &self,
            execution_id: ExecutionId,
            trigger: TriggerPayload,
        ) -> ExecutionOutcome {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {}", execution_id));
            tokio::time::sleep(self.delay).await;
            self.events
                .lock()
                .unwrap()
                .push(format!("end {}", execution_id));

            let failed = trigger.message == "fail";
            ExecutionOutcome {
                execution_id,
                conversation_id: trigger.conversation_id,
                state: if failed {
                    ExecutionState::Failed {
                        stage: WorkflowStage::Invoking,
                        kind: ErrorKind::InferenceFailure,
                    }
                } else {
                    ExecutionState::Done
                },
                step_results: Vec::new(),
                execution_time_ms: 50,
                composed_prompt: None,
                model_request: None,
                inference: None,
                failure: None,
            }
        }
    }

    fn trigger(id: &str, message: &str) -> TriggerPayload {
        TriggerPayload::new(id, "t1", message)
    }

    fn recording() -> Arc<RecordingExecutor> {
        Arc::new(RecordingExecutor::new(Duration::from_millis(50)))
    }

    #[tokio::test]
    async fn test_dispatch_records_outcome() {
        let dispatcher = ExecutionDispatcher::new(recording(), OutcomeRegistry::new());

        let handle = dispatcher.dispatch(trigger("c1", "hi")).await.unwrap();
        let id = handle.execution_id().clone();
        let outcome = handle.outcome().await.unwrap();

        assert_eq!(outcome.execution_id, id);
        assert!(outcome.is_success());

        let recorded = dispatcher.registry().get(&id).await.unwrap();
        assert_eq!(recorded.execution_id, id);
    }

    #[tokio::test]
    async fn test_failed_outcome_is_recorded() {
        let dispatcher = ExecutionDispatcher::new(recording(), OutcomeRegistry::new());

        let handle = dispatcher
            .dispatch_with_id(ExecutionId::new("e-fail"), trigger("c1", "fail"))
            .await
            .unwrap();
        handle.outcome().await.unwrap();

        let recorded = dispatcher
            .registry()
            .get(&ExecutionId::new("e-fail"))
            .await
            .unwrap();
        assert!(!recorded.is_success());
    }

    #[tokio::test]
    async fn test_serialized_conversation_runs_in_order() {
        let executor = recording();
        let dispatcher = ExecutionDispatcher::new(executor.clone(), OutcomeRegistry::new())
            .serialize_by_conversation(true);

        let first = dispatcher
            .dispatch_with_id(ExecutionId::new("a"), trigger("c1", "one"))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch_with_id(ExecutionId::new("b"), trigger("c1", "two"))
            .await
            .unwrap();

        first.outcome().await.unwrap();
        second.outcome().await.unwrap();

        assert_eq!(executor.events(), vec!["start a", "end a", "start b", "end b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_serialized_conversation_keeps_dispatch_order_across_workers() {
        for _ in 0..20 {
            let executor = Arc::new(RecordingExecutor::new(Duration::from_millis(1)));
            let dispatcher = ExecutionDispatcher::new(executor.clone(), OutcomeRegistry::new())
                .serialize_by_conversation(true);

            let mut handles = Vec::new();
            for i in 0..20 {
                let handle = dispatcher
                    .dispatch_with_id(ExecutionId::new(format!("{:02}", i)), trigger("c1", "m"))
                    .await
                    .unwrap();
                handles.push(handle);
            }
            for handle in handles {
                handle.outcome().await.unwrap();
            }

            let expected: Vec<String> = (0..20)
                .flat_map(|i| [format!("start {:02}", i), format!("end {:02}", i)])
                .collect();
            assert_eq!(executor.events(), expected);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialization_is_per_conversation() {
        let executor = recording();
        let dispatcher = ExecutionDispatcher::new(executor.clone(), OutcomeRegistry::new())
            .serialize_by_conversation(true);

        let first = dispatcher
            .dispatch_with_id(ExecutionId::new("a"), trigger("c1", "one"))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch_with_id(ExecutionId::new("b"), trigger("c2", "two"))
            .await
            .unwrap();

        first.outcome().await.unwrap();
        second.outcome().await.unwrap();

        let events = executor.events();
        let mut starts: Vec<_> = events[..2].to_vec();
        starts.sort();
        assert_eq!(starts, vec!["start a", "start b"]);
    }

    #[tokio::test]
    async fn test_finished_queue_entries_are_pruned() {
        let dispatcher = ExecutionDispatcher::new(recording(), OutcomeRegistry::new())
            .serialize_by_conversation(true);

        for id in ["c1", "c2", "c3"] {
            dispatcher
                .dispatch(trigger(id, "m"))
                .await
                .unwrap()
                .outcome()
                .await
                .unwrap();
        }

        let last = dispatcher.dispatch(trigger("c4", "m")).await.unwrap();
        last.outcome().await.unwrap();

        let queues = dispatcher.queues.as_ref().unwrap().lock().await;
        assert_eq!(queues.len(), 1);
        assert!(queues.contains_key("c4"));
    }

    #[tokio::test]
    async fn test_unserialized_executions_overlap() {
        let executor = recording();
        let dispatcher = ExecutionDispatcher::new(executor.clone(), OutcomeRegistry::new());

        let first = dispatcher
            .dispatch_with_id(ExecutionId::new("a"), trigger("c1", "one"))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch_with_id(ExecutionId::new("b"), trigger("c1", "two"))
            .await
            .unwrap();

        first.outcome().await.unwrap();
        second.outcome().await.unwrap();

        let events = executor.events();
        assert_eq!(&events[..2], &["start a", "start b"]);
    }

    #[tokio::test]
    async fn test_shutdown_waits_and_rejects_new_work() {
        let dispatcher = ExecutionDispatcher::new(recording(), OutcomeRegistry::new());

        dispatcher
            .dispatch_with_id(ExecutionId::new("a"), trigger("c1", "one"))
            .await
            .unwrap();

        dispatcher.shutdown().await;

        assert_eq!(dispatcher.in_flight(), 0);
        assert!(dispatcher
            .registry()
            .get(&ExecutionId::new("a"))
            .await
            .is_some());
        assert!(dispatcher.dispatch(trigger("c1", "late")).await.is_err());
    }
}
