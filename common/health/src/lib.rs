//! Process liveness registry.
//!
//! A `HealthRegistry` hands out `HealthHandle`s to subsystems (the batch
//! orchestrator's dispatch loop, a provider's poll loop) that must call
//! `report_healthy` on some cadence. A component that hasn't reported
//! within its configured `max_age` is considered unhealthy, and the whole
//! registry is unhealthy if any registered component is.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, Clone)]
struct ComponentState {
    last_reported: DateTime<Utc>,
    max_age: Duration,
}

impl ComponentState {
    fn is_healthy(&self, now: DateTime<Utc>) -> bool {
        now - self.last_reported <= self.max_age
    }
}

/// Registry of components whose liveness is tracked by last-report timestamp.
#[derive(Clone)]
pub struct HealthRegistry {
    name: String,
    components: Arc<RwLock<HashMap<String, ComponentState>>>,
}

impl HealthRegistry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            components: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new component, returning a handle it should use to report healthy.
    pub async fn register(&self, component: String, max_age: Duration) -> HealthHandle {
        let mut components = self.components.write().await;
        components.insert(
            component.clone(),
            ComponentState {
                last_reported: Utc::now(),
                max_age,
            },
        );

        HealthHandle {
            component,
            components: self.components.clone(),
        }
    }

    /// Compute the current aggregate status: healthy iff every registered component is.
    pub async fn get_status(&self) -> HealthStatus {
        let now = Utc::now();
        let components = self.components.read().await;

        let mut unhealthy = Vec::new();
        for (name, state) in components.iter() {
            if !state.is_healthy(now) {
                unhealthy.push(name.clone());
            }
        }

        if !unhealthy.is_empty() {
            warn!(registry = %self.name, ?unhealthy, "health registry reporting unhealthy");
        }

        HealthStatus {
            healthy: unhealthy.is_empty(),
            unhealthy_components: unhealthy,
        }
    }
}

/// A handle a component uses to report that it is still making progress.
#[derive(Clone)]
pub struct HealthHandle {
    component: String,
    components: Arc<RwLock<HashMap<String, ComponentState>>>,
}

impl HealthHandle {
    pub async fn report_healthy(&self) {
        let mut components = self.components.write().await;
        if let Some(state) = components.get_mut(&self.component) {
            state.last_reported = Utc::now();
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub unhealthy_components: Vec<String>,
}

impl IntoResponse for HealthStatus {
    fn into_response(self) -> Response {
        if self.healthy {
            (StatusCode::OK, "ok").into_response()
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("unhealthy: {}", self.unhealthy_components.join(", ")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn freshly_registered_component_is_healthy() {
        let registry = HealthRegistry::new("test");
        let _handle = registry.register("worker".to_string(), Duration::seconds(30)).await;

        assert!(registry.get_status().await.healthy);
    }

    #[tokio::test]
    async fn reporting_keeps_component_healthy() {
        let registry = HealthRegistry::new("test");
        let handle = registry.register("worker".to_string(), Duration::seconds(30)).await;

        handle.report_healthy().await;

        assert!(registry.get_status().await.healthy);
    }

    #[tokio::test]
    async fn stale_component_marks_registry_unhealthy() {
        let registry = HealthRegistry::new("test");
        let _handle = registry
            .register("worker".to_string(), Duration::milliseconds(-1))
            .await;

        let status = registry.get_status().await;
        assert!(!status.healthy);
        assert_eq!(status.unhealthy_components, vec!["worker".to_string()]);
    }

    #[tokio::test]
    async fn multiple_components_all_tracked() {
        let registry = HealthRegistry::new("test");
        let a = registry.register("a".to_string(), Duration::seconds(30)).await;
        let _b = registry
            .register("b".to_string(), Duration::milliseconds(-1))
            .await;

        a.report_healthy().await;

        let status = registry.get_status().await;
        assert!(!status.healthy);
        assert_eq!(status.unhealthy_components, vec!["b".to_string()]);
    }
}
