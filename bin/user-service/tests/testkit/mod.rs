#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ntex::{
    http::Request,
    web::{
        self,
        test::{self, TestRequest},
        WebResponse,
    },
    Pipeline, Service,
};
use opentelemetry_sdk::trace::{
    InMemorySpanExporter, InMemorySpanExporterBuilder, SdkTracerProvider, SimpleSpanProcessor,
    SpanData,
};
use user_service::{
    configure_ntex_app, endpoint::method_path, service::UserService, storage::store_from_config,
    ServiceSharedState,
};
use user_service_config::storage::{MemoryStorageConfig, SeedUser, StorageConfig};
use user_service_instrumentation::{
    opentelemetry::{trace::TracerProvider, KeyValue, Value},
    CounterSink,
};

#[derive(Default)]
pub struct RecordingCounter {
    calls: Mutex<Vec<Vec<KeyValue>>>,
}

impl RecordingCounter {
    pub fn calls(&self) -> Vec<Vec<KeyValue>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl CounterSink for RecordingCounter {
    fn increment(&self, attributes: &[KeyValue]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(attributes.to_vec());
        }
    }
}

pub struct TestServiceApp<T> {
    pub app: Pipeline<T>,
    pub shared_state: Arc<ServiceSharedState>,
    pub counter: Arc<RecordingCounter>,
    provider: SdkTracerProvider,
    exporter: InMemorySpanExporter,
}

impl<T> TestServiceApp<T> {
    pub fn finished_spans(&self) -> Vec<SpanData> {
        let _ = self.provider.force_flush();
        self.exporter
            .get_finished_spans()
            .expect("in-memory exporter should hold spans")
    }

    pub fn single_span(&self) -> SpanData {
        let mut spans = self.finished_spans();
        assert_eq!(spans.len(), 1, "expected exactly one finished span");
        spans.remove(0)
    }
}

pub fn seed_users(count: i64) -> StorageConfig {
    StorageConfig::Memory(MemoryStorageConfig {
        seed: (1..=count)
            .map(|id| SeedUser {
                id,
                username: format!("user{id}"),
                email: format!("user{id}@example.com"),
            })
            .collect(),
    })
}

pub async fn init_service_app(
    storage: StorageConfig,
) -> TestServiceApp<impl Service<Request, Response = WebResponse, Error = web::Error>> {
    let store = store_from_config(&storage)
        .await
        .expect("storage should initialize");

    let exporter = InMemorySpanExporterBuilder::new().build();
    let provider = SdkTracerProvider::builder()
        .with_span_processor(SimpleSpanProcessor::new(exporter.clone()))
        .build();
    let counter = Arc::new(RecordingCounter::default());

    let shared_state = Arc::new(ServiceSharedState::new(
        UserService::new(store),
        provider.tracer("user-service-e2e"),
        counter.clone(),
    ));

    let app = test::init_service(
        web::App::new()
            .state(shared_state.clone())
            .configure(configure_ntex_app),
    )
    .await;

    TestServiceApp {
        app,
        shared_state,
        counter,
        provider,
        exporter,
    }
}

pub fn rpc_request(method: &str, body: serde_json::Value) -> TestRequest {
    test::TestRequest::post()
        .uri(&method_path(method))
        .header("content-type", "application/json")
        .set_payload(body.to_string())
}

pub fn find_attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

pub fn string_attribute(span: &SpanData, key: &str) -> Option<String> {
    find_attribute(span, key).map(|value| value.as_str().into_owned())
}

pub fn has_exception_event(span: &SpanData) -> bool {
    span.events
        .events
        .iter()
        .any(|event| event.name == "exception")
}
