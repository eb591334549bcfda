use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use user_service_instrumentation::{opentelemetry_sdk::trace::Tracer, CounterSink, Instrumented};

use crate::messages::{GetUserRequest, InsertUserRequest, ListUsersRequest};
use crate::service::UserService;

pub type RequestCounter = Arc<dyn CounterSink>;
pub type TracedHandler<Req> = Instrumented<UserService, Req, Tracer, RequestCounter>;

/// Per-process state handed to every ntex worker.
pub struct ServiceSharedState {
    pub get_user: TracedHandler<GetUserRequest>,
    pub list_users: TracedHandler<ListUsersRequest>,
    pub insert_user: TracedHandler<InsertUserRequest>,
    serving: AtomicBool,
}

impl ServiceSharedState {
    pub fn new(service: UserService, tracer: Tracer, counter: RequestCounter) -> Self {
        Self {
            get_user: Instrumented::new(service.clone(), tracer.clone(), counter.clone()),
            list_users: Instrumented::new(service.clone(), tracer.clone(), counter.clone()),
            insert_user: Instrumented::new(service, tracer, counter),
            serving: AtomicBool::new(false),
        }
    }

    pub fn mark_serving(&self) {
        self.serving.store(true, Ordering::Release);
    }

    pub fn mark_not_serving(&self) {
        self.serving.store(false, Ordering::Release);
    }

    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::Acquire)
    }
}
