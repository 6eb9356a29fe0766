//! End-to-end scenarios from spec §8, run against the in-memory queue so
//! no live Redis is required: a handler + registry + `WorkerRuntime`
//! wired together exactly as a real tool process would assemble them.

use async_trait::async_trait;
use fabric_config::{resolve, WorkerOptions, WorkerOptionsInput};
use fabric_queue::memory::MemoryQueueClient;
use fabric_queue::QueueClient;
use fabric_types::{JobId, ToolName, WorkItem};
use fabric_worker::{JsonTypeRegistry, ToolHandler, TypeRegistry, WorkerRuntime};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

struct EchoHandler;

#[async_trait]
impl ToolHandler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn description(&self) -> &str {
        "echoes its input back as output"
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn input_type(&self) -> &str {
        "T.In"
    }
    fn output_type(&self) -> &str {
        "T.Out"
    }
    async fn execute_binary(
        &self,
        _cancel: &CancellationToken,
        input: Value,
    ) -> Result<Value, String> {
        Ok(input)
    }
}

struct BoomHandler;

#[async_trait]
impl ToolHandler for BoomHandler {
    fn name(&self) -> &str {
        "boom"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn description(&self) -> &str {
        ""
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn input_type(&self) -> &str {
        "T.In"
    }
    fn output_type(&self) -> &str {
        "T.Out"
    }
    async fn execute_binary(
        &self,
        _cancel: &CancellationToken,
        _input: Value,
    ) -> Result<Value, String> {
        Err("boom".to_string())
    }
}

/// Records the number of concurrently in-flight invocations and sleeps
/// briefly so a pool of consumers overlaps, then echoes its input.
struct SlowEchoHandler {
    inflight: Arc<AtomicUsize>,
    max_observed: Arc<AtomicUsize>,
    sleep: Duration,
}

#[async_trait]
impl ToolHandler for SlowEchoHandler {
    fn name(&self) -> &str {
        "slow-echo"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn description(&self) -> &str {
        ""
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn input_type(&self) -> &str {
        "T.In"
    }
    fn output_type(&self) -> &str {
        "T.Out"
    }
    async fn execute_binary(
        &self,
        _cancel: &CancellationToken,
        input: Value,
    ) -> Result<Value, String> {
        let now = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_observed.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.sleep).await;
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        Ok(input)
    }
}

fn item(job_id: &str, index: i64, total: i64, tool: &str, greeting: &str) -> WorkItem {
    WorkItem::new(
        job_id,
        index,
        total,
        tool,
        serde_json::to_vec(&json!({"greeting": greeting})).unwrap(),
        "T.In",
        "T.Out",
        1_700_000_000_000,
    )
}

fn json_registry() -> Arc<dyn TypeRegistry> {
    let mut registry = JsonTypeRegistry::new();
    registry.register("T.In");
    registry.register("T.Out");
    Arc::new(registry)
}

fn test_options() -> WorkerOptions {
    resolve(WorkerOptionsInput::default()).unwrap()
}

#[tokio::test]
async fn happy_path_single_worker() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    let cancel = CancellationToken::new();
    let job_id = JobId::new("j1");

    let mut results = queue.subscribe(&cancel, &job_id).await.unwrap();

    let mut options = test_options();
    options.concurrency = 1;
    let runtime = WorkerRuntime::new(Arc::new(EchoHandler), json_registry(), options)
        .with_queue_client(queue.clone());
    let run_cancel = cancel.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    queue
        .push(&cancel, &item("j1", 0, 1, "echo", "hello"))
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), results.next())
        .await
        .expect("result should arrive")
        .expect("stream should yield a result");

    assert!(result.is_success());
    assert_eq!(result.error, "");
    assert!(result.started_at >= 1_700_000_000_000);
    assert!(result.completed_at >= result.started_at);
    let decoded: Value = serde_json::from_slice(&result.output_bytes).unwrap();
    assert_eq!(decoded, json!({"greeting": "hello"}));

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn handler_error_becomes_failure_result() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    let cancel = CancellationToken::new();
    let job_id = JobId::new("j2");
    let mut results = queue.subscribe(&cancel, &job_id).await.unwrap();

    let mut options = test_options();
    options.concurrency = 1;
    let runtime = WorkerRuntime::new(Arc::new(BoomHandler), json_registry(), options)
        .with_queue_client(queue.clone());
    let run_cancel = cancel.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    queue
        .push(&cancel, &item("j2", 0, 1, "boom", "hi"))
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), results.next())
        .await
        .unwrap()
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.error, "boom");
    assert!(result.output_bytes.is_empty());

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_input_type_is_surfaced_as_a_failure_result() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    let cancel = CancellationToken::new();
    let job_id = JobId::new("j3");
    let mut results = queue.subscribe(&cancel, &job_id).await.unwrap();

    // Empty registry: nothing is registered, so "T.In" is unknown.
    let mut options = test_options();
    options.concurrency = 1;
    let runtime = WorkerRuntime::new(
        Arc::new(EchoHandler),
        Arc::new(JsonTypeRegistry::new()),
        options,
    )
    .with_queue_client(queue.clone());
    let run_cancel = cancel.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    queue
        .push(&cancel, &item("j3", 0, 1, "echo", "hi"))
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), results.next())
        .await
        .unwrap()
        .unwrap();

    assert!(result.error.starts_with("unknown input type:"));

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn five_items_complete_in_fifo_order_with_one_worker() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    let cancel = CancellationToken::new();
    let job_id = JobId::new("j4");
    let mut results = queue.subscribe(&cancel, &job_id).await.unwrap();

    let mut options = test_options();
    options.concurrency = 1;
    let runtime = WorkerRuntime::new(Arc::new(EchoHandler), json_registry(), options)
        .with_queue_client(queue.clone());
    let run_cancel = cancel.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    for i in 0..5 {
        queue
            .push(&cancel, &item("j4", i, 5, "echo", "hi"))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..5 {
        let result = tokio::time::timeout(Duration::from_secs(2), results.next())
            .await
            .unwrap()
            .unwrap();
        seen.push(result.index);
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn concurrency_cap_bounds_simultaneous_invocations() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    let cancel = CancellationToken::new();
    let job_id = JobId::new("j5");
    let mut results = queue.subscribe(&cancel, &job_id).await.unwrap();

    let inflight = Arc::new(AtomicUsize::new(0));
    let max_observed = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(SlowEchoHandler {
        inflight: inflight.clone(),
        max_observed: max_observed.clone(),
        sleep: Duration::from_millis(50),
    });

    let mut options = test_options();
    options.concurrency = 3;
    let runtime = WorkerRuntime::new(handler, json_registry(), options).with_queue_client(queue.clone());
    let run_cancel = cancel.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    for i in 0..10 {
        queue
            .push(&cancel, &item("j5", i, 10, "slow-echo", "hi"))
            .await
            .unwrap();
    }

    for _ in 0..10 {
        tokio::time::timeout(Duration::from_secs(2), results.next())
            .await
            .unwrap()
            .unwrap();
    }

    assert!(max_observed.load(Ordering::SeqCst) <= 3);

    cancel.cancel();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn graceful_shutdown_delivers_in_flight_work_and_rebalances_worker_count() {
    let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
    // The submitter/collector's operating context is independent of the
    // worker's: a collector has no reason to stop listening just because
    // the worker it's waiting on begins shutting down.
    let collector_cancel = CancellationToken::new();
    let job_id = JobId::new("j6");
    let tool = ToolName::new("slow-echo");
    let mut results = queue.subscribe(&collector_cancel, &job_id).await.unwrap();

    let handler = Arc::new(SlowEchoHandler {
        inflight: Arc::new(AtomicUsize::new(0)),
        max_observed: Arc::new(AtomicUsize::new(0)),
        sleep: Duration::from_millis(100),
    });

    let mut options = test_options();
    options.concurrency = 1;
    options.shutdown_timeout = Duration::from_secs(5);
    let runtime = WorkerRuntime::new(handler, json_registry(), options).with_queue_client(queue.clone());
    let worker_shutdown = CancellationToken::new();
    let run_cancel = worker_shutdown.clone();
    let run = tokio::spawn(async move { runtime.run(run_cancel).await });

    queue
        .push(&collector_cancel, &item("j6", 0, 1, "slow-echo", "hi"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    worker_shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), results.next())
        .await
        .expect("run() should finish draining before the test timeout")
        .expect("the in-flight item's result should still be delivered");
    assert!(result.is_success());

    run.await.unwrap().unwrap();

    assert_eq!(queue.get_worker_count(&tool).await.unwrap(), 0);
}
