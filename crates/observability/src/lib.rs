use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Process-wide counters for the conversation pipeline. Cheap enough to
/// bump on every inbound message.
#[derive(Debug, Default)]
pub struct AppMetrics {
    messages_total: AtomicU64,
    menu_replies_total: AtomicU64,
    classifier_total: AtomicU64,
    dispatch_errors_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub messages_total: u64,
    pub menu_replies_total: u64,
    pub classifier_total: u64,
    pub dispatch_errors_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_message(&self) {
        self.messages_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_menu_reply(&self) {
        self.menu_replies_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_classifier(&self) {
        self.classifier_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dispatch_error(&self) {
        self.dispatch_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let messages = self.messages_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            messages_total: messages,
            menu_replies_total: self.menu_replies_total.load(Ordering::Relaxed),
            classifier_total: self.classifier_total.load(Ordering::Relaxed),
            dispatch_errors_total: self.dispatch_errors_total.load(Ordering::Relaxed),
            avg_latency_millis: if messages == 0 {
                0.0
            } else {
                latency as f64 / messages as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,agro_api=info,agro_agents=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
