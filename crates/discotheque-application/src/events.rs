// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::{Arc, Mutex, PoisonError};

use discotheque_domain::DomainEvent;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

/// Event publisher abstraction
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &DomainEvent<Value>);
}

/// Serialize `payload` and publish it under `name`.
pub fn publish_event<T: Serialize>(publisher: &dyn EventPublisher, name: &'static str, payload: T) {
    let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
    publisher.publish(&DomainEvent::new(name, payload));
}

/// A minimal in-memory event bus that stores serialized events.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    inner: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the captured events, oldest first.
    pub fn names(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|event| event["name"].as_str().map(str::to_string))
            .collect()
    }

    /// Retrieve and clear all captured events
    pub fn drain(&self) -> Vec<Value> {
        std::mem::take(&mut *self.events())
    }

    fn events(&self) -> std::sync::MutexGuard<'_, Vec<Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: &DomainEvent<Value>) {
        self.events().push(json!({
            "name": event.name,
            "occurred_at": event.occurred_at,
            "payload": event.payload,
        }));
    }
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &DomainEvent<Value>) {
        info!(
            target: "application",
            event = event.name,
            occurred_at = %event.occurred_at,
            payload = %event.payload,
            "domain event"
        );
    }
}
