//! Stage descriptors of the recap pipeline
//!
//! Each stage reads what earlier stages left in the [`RecapContext`] and
//! writes its own output there. Only the query, template and invoke stages
//! touch external services; each of those calls is bounded by a timeout.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::config::WorkflowConfig;
use crate::domain::conversation::{flatten_history, HistoryWindow};
use crate::domain::{
    request_for_model, ConversationId, DomainError, HistoryQuery, InferenceClient,
    InferenceReceipt, MessageBatch, MessageStore, ModelRequest, PromptTemplate, TemplateStore,
    TriggerPayload, WorkflowError, WorkflowStage,
};
use crate::infrastructure::observability::record_inference;

/// Payload threaded through the stages of one execution
#[derive(Debug, Clone)]
pub struct RecapContext {
    trigger: TriggerPayload,
    pub conversation_id: Option<ConversationId>,
    pub batch: Option<MessageBatch>,
    pub history: Option<Vec<String>>,
    pub template: Option<PromptTemplate>,
    pub composed_prompt: Option<String>,
    pub model_request: Option<ModelRequest>,
    pub receipt: Option<InferenceReceipt>,
}

impl RecapContext {
    pub fn new(trigger: TriggerPayload) -> Self {
        Self {
            trigger,
            conversation_id: None,
            batch: None,
            history: None,
            template: None,
            composed_prompt: None,
            model_request: None,
            receipt: None,
        }
    }

    pub fn trigger(&self) -> &TriggerPayload {
        &self.trigger
    }

    fn require<'a, T>(value: &'a Option<T>, what: &str) -> Result<&'a T, WorkflowError> {
        value
            .as_ref()
            .ok_or_else(|| WorkflowError::internal(format!("{} has not been produced", what)))
    }
}

/// One step of the pipeline
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Which pipeline stage this descriptor implements
    fn stage(&self) -> WorkflowStage;

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError>;
}

/// Await an external call, mapping an elapsed deadline to `on_timeout`
async fn with_deadline<T, F>(
    timeout: Duration,
    call: F,
    on_timeout: impl FnOnce(u64) -> WorkflowError,
) -> Result<Result<T, DomainError>, WorkflowError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| on_timeout(timeout.as_millis() as u64))
}

/// Reads up to `page_size` messages of the trigger's conversation
#[derive(Debug)]
pub struct QueryHistoryStage {
    store: Arc<dyn MessageStore>,
    page_size: usize,
    window: HistoryWindow,
    timeout: Duration,
}

impl QueryHistoryStage {
    pub fn new(
        store: Arc<dyn MessageStore>,
        page_size: usize,
        window: HistoryWindow,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            page_size,
            window,
            timeout,
        }
    }
}

#[async_trait]
impl Stage for QueryHistoryStage {
    fn stage(&self) -> WorkflowStage {
        WorkflowStage::Querying
    }

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError> {
        let conversation_id = context.trigger().conversation_id()?;

        if self.page_size == 0 {
            return Err(WorkflowError::invalid_input("page size must be positive"));
        }

        let query =
            HistoryQuery::new(conversation_id.clone(), self.page_size).with_window(self.window);

        let records = with_deadline(self.timeout, self.store.query(&query), |ms| {
            WorkflowError::store_timeout("message query", ms)
        })
        .await?
        .map_err(|e| match e {
            DomainError::NotFound { message } => WorkflowError::store_unavailable(message),
            other => WorkflowError::from_store(other),
        })?;

        let batch = MessageBatch::from_records(records, self.page_size);

        debug!(
            store = self.store.store_name(),
            messages = batch.len(),
            "Loaded conversation history"
        );

        context.conversation_id = Some(conversation_id);
        context.batch = Some(batch);
        Ok(())
    }
}

/// Maps every message of the batch to its text
#[derive(Debug, Default)]
pub struct FlattenHistoryStage;

#[async_trait]
impl Stage for FlattenHistoryStage {
    fn stage(&self) -> WorkflowStage {
        WorkflowStage::Flattening
    }

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError> {
        let batch = RecapContext::require(&context.batch, "message batch")?;

        let history = flatten_history(batch)
            .map(|text| text.map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()?;

        context.history = Some(history);
        Ok(())
    }
}

/// Reads the prompt template object
#[derive(Debug)]
pub struct LoadTemplateStage {
    store: Arc<dyn TemplateStore>,
    key: String,
    timeout: Duration,
}

impl LoadTemplateStage {
    pub fn new(store: Arc<dyn TemplateStore>, key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Stage for LoadTemplateStage {
    fn stage(&self) -> WorkflowStage {
        WorkflowStage::LoadingTemplate
    }

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError> {
        let content = with_deadline(self.timeout, self.store.read_object(&self.key), |ms| {
            WorkflowError::store_timeout("template read", ms)
        })
        .await?
        .map_err(WorkflowError::from_store)?;

        debug!(
            store = self.store.store_name(),
            key = %self.key,
            bytes = content.len(),
            "Loaded prompt template"
        );

        context.template = Some(PromptTemplate::from_bytes(content)?);
        Ok(())
    }
}

/// Substitutes the flattened history into the template
#[derive(Debug, Default)]
pub struct ComposePromptStage;

#[async_trait]
impl Stage for ComposePromptStage {
    fn stage(&self) -> WorkflowStage {
        WorkflowStage::Composing
    }

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError> {
        let template = RecapContext::require(&context.template, "prompt template")?;
        let history = RecapContext::require(&context.history, "flattened history")?;

        let prompt = template.compose(history)?;

        context.composed_prompt = Some(prompt);
        Ok(())
    }
}

/// Shapes the vendor request and calls the inference backend
#[derive(Debug)]
pub struct InvokeModelStage {
    client: Arc<dyn InferenceClient>,
    model_id: String,
    timeout: Duration,
}

impl InvokeModelStage {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        model_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Stage for InvokeModelStage {
    fn stage(&self) -> WorkflowStage {
        WorkflowStage::Invoking
    }

    async fn run(&self, context: &mut RecapContext) -> Result<(), WorkflowError> {
        let prompt = RecapContext::require(&context.composed_prompt, "composed prompt")?;
        let request = request_for_model(&self.model_id, prompt)?;
        context.model_request = Some(request.clone());

        let start = Instant::now();
        let result = with_deadline(self.timeout, self.client.invoke(&request), |ms| {
            WorkflowError::inference_timeout(ms)
        })
        .await
        .and_then(|r| r.map_err(WorkflowError::from_inference));

        record_inference(request.family.as_str(), result.is_ok(), start.elapsed());

        let receipt = result?;

        debug!(
            provider = self.client.provider_name(),
            model = %receipt.model_id,
            response_bytes = receipt.response_bytes,
            "Inference call completed"
        );

        context.receipt = Some(receipt);
        Ok(())
    }
}

/// Ordered list of stage descriptors run by the sequencer
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The recap topology: query, flatten, load template, compose, invoke
    pub fn recap(
        message_store: Arc<dyn MessageStore>,
        template_store: Arc<dyn TemplateStore>,
        inference: Arc<dyn InferenceClient>,
        config: &WorkflowConfig,
    ) -> Self {
        let store_timeout = Duration::from_millis(config.store_timeout_ms);

        Self::new(vec![
            Arc::new(QueryHistoryStage::new(
                message_store,
                config.page_size,
                config.history_window,
                store_timeout,
            )),
            Arc::new(FlattenHistoryStage),
            Arc::new(LoadTemplateStage::new(
                template_store,
                config.template_key.clone(),
                store_timeout,
            )),
            Arc::new(ComposePromptStage),
            Arc::new(InvokeModelStage::new(
                inference,
                config.model_id.clone(),
                Duration::from_millis(config.inference_timeout_ms),
            )),
        ])
    }

    /// Swap the descriptor implementing the same stage
    pub fn with_stage(mut self, replacement: Arc<dyn Stage>) -> Self {
        if let Some(slot) = self
            .stages
            .iter_mut()
            .find(|s| s.stage() == replacement.stage())
        {
            *slot = replacement;
        }
        self
    }

    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockInferenceClient;
    use crate::domain::prompt::MockTemplateStore;
    use crate::domain::{ErrorKind, StoredMessage};
    use crate::infrastructure::conversation::InMemoryMessageStore;

    fn trigger(id: &str) -> TriggerPayload {
        TriggerPayload::new(id, "t9", "new message")
    }

    fn cid(id: &str) -> ConversationId {
        ConversationId::new(id).unwrap()
    }

    #[derive(Debug)]
    struct SlowMessageStore;

    #[async_trait]
    impl MessageStore for SlowMessageStore {
        async fn query(
            &self,
            _query: &HistoryQuery,
        ) -> Result<Vec<StoredMessage>, DomainError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn append(&self, _message: StoredMessage) -> Result<(), DomainError> {
            Ok(())
        }

        fn store_name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_query_stage_bounds_batch() {
        let messages = (0..8)
            .map(|i| StoredMessage::new(cid("c1"), format!("t{}", i), format!("m{}", i)))
            .collect();
        let store = Arc::new(InMemoryMessageStore::with_messages(messages));
        let stage =
            QueryHistoryStage::new(store, 5, HistoryWindow::Earliest, Duration::from_secs(1));

        let mut context = RecapContext::new(trigger("c1"));
        stage.run(&mut context).await.unwrap();

        let batch = context.batch.unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.messages()[0].timestamp, "t0");
        assert_eq!(context.conversation_id, Some(cid("c1")));
    }

    #[tokio::test]
    async fn test_query_stage_rejects_invalid_conversation_id() {
        let stage = QueryHistoryStage::new(
            Arc::new(InMemoryMessageStore::new()),
            5,
            HistoryWindow::Earliest,
            Duration::from_secs(1),
        );

        let mut context = RecapContext::new(trigger(""));
        let err = stage.run(&mut context).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(context.batch.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_stage_timeout_is_store_unavailable() {
        let stage = QueryHistoryStage::new(
            Arc::new(SlowMessageStore),
            5,
            HistoryWindow::Earliest,
            Duration::from_millis(100),
        );

        let mut context = RecapContext::new(trigger("c1"));
        let err = stage.run(&mut context).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.to_string().contains("timed out after 100ms"));
    }

    #[tokio::test]
    async fn test_flatten_stage_requires_batch() {
        let mut context = RecapContext::new(trigger("c1"));
        let err = FlattenHistoryStage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_flatten_stage_reports_malformed_message() {
        let mut context = RecapContext::new(trigger("c1"));
        context.batch = Some(MessageBatch::from_records(
            vec![StoredMessage::without_text(cid("c1"), "t1")],
            5,
        ));

        let err = FlattenHistoryStage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedMessage);
    }

    #[tokio::test]
    async fn test_load_template_stage_not_found() {
        let mut store = MockTemplateStore::new();
        store
            .expect_read_object()
            .times(1)
            .returning(|_| Err(DomainError::not_found("prompt.txt")));
        store.expect_store_name().return_const("mock");

        let stage = LoadTemplateStage::new(Arc::new(store), "prompt.txt", Duration::from_secs(1));
        let mut context = RecapContext::new(trigger("c1"));

        let err = stage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[tokio::test]
    async fn test_load_template_stage_transport_failure() {
        let mut store = MockTemplateStore::new();
        store
            .expect_read_object()
            .times(1)
            .returning(|_| Err(DomainError::storage("connection reset")));
        store.expect_store_name().return_const("mock");

        let stage = LoadTemplateStage::new(Arc::new(store), "prompt.txt", Duration::from_secs(1));
        let mut context = RecapContext::new(trigger("c1"));

        let err = stage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_load_template_stage_invalid_encoding_is_malformed() {
        let mut store = MockTemplateStore::new();
        store
            .expect_read_object()
            .times(1)
            .returning(|_| Ok(vec![0xff, 0xfe, 0x00]));
        store.expect_store_name().return_const("mock");

        let stage = LoadTemplateStage::new(Arc::new(store), "prompt.txt", Duration::from_secs(1));
        let mut context = RecapContext::new(trigger("c1"));

        let err = stage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateMalformed);
        assert!(context.template.is_none());
    }

    #[tokio::test]
    async fn test_compose_stage_missing_placeholder() {
        let mut context = RecapContext::new(trigger("c1"));
        context.template = Some(PromptTemplate::new("no placeholder"));
        context.history = Some(vec!["hello".to_string()]);

        let err = ComposePromptStage.run(&mut context).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateMalformed);
    }

    #[tokio::test]
    async fn test_invoke_stage_unsupported_model_makes_no_call() {
        let client = Arc::new(MockInferenceClient::new());
        let stage =
            InvokeModelStage::new(client.clone(), "acme.unknown-v1", Duration::from_secs(1));

        let mut context = RecapContext::new(trigger("c1"));
        context.composed_prompt = Some("History: hi".to_string());

        let err = stage.run(&mut context).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedModel);
        assert_eq!(client.call_count(), 0);
        assert!(context.model_request.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_stage_timeout_is_inference_failure() {
        let client = Arc::new(MockInferenceClient::new().with_delay(Duration::from_secs(120)));
        let stage = InvokeModelStage::new(
            client.clone(),
            "amazon.titan-text-lite-v1",
            Duration::from_secs(60),
        );

        let mut context = RecapContext::new(trigger("c1"));
        context.composed_prompt = Some("History: hi".to_string());

        let err = stage.run(&mut context).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InferenceFailure);
        assert_eq!(client.call_count(), 1);
        assert!(context.model_request.is_some());
        assert!(context.receipt.is_none());
    }

    #[test]
    fn test_recap_pipeline_order() {
        let pipeline = Pipeline::recap(
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(MockTemplateStore::new()),
            Arc::new(MockInferenceClient::new()),
            &WorkflowConfig::default(),
        );

        let order: Vec<_> = pipeline.stages().iter().map(|s| s.stage()).collect();
        assert_eq!(order, WorkflowStage::ALL.to_vec());
    }

    #[test]
    fn test_with_stage_replaces_same_kind() {
        let pipeline = Pipeline::new(vec![
            Arc::new(FlattenHistoryStage),
            Arc::new(ComposePromptStage),
        ])
        .with_stage(Arc::new(ComposePromptStage));

        assert_eq!(pipeline.stages().len(), 2);
        assert_eq!(pipeline.stages()[1].stage(), WorkflowStage::Composing);
    }
}
