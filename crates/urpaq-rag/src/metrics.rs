use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use urpaq_core::types::ValidationIssue;

const MAX_RECENT_REQUESTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetric {
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: u64,
    pub success: bool,
    pub error_type: Option<String>,
}

#[derive(Default)]
struct State {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    retries: u64,
    total_response_time_ms: u64,
    validation_issues: BTreeMap<String, u64>,
    error_types: BTreeMap<String, u64>,
    recent_requests: VecDeque<RequestMetric>,
}

impl State {
    fn push_recent(&mut self, metric: RequestMetric) {
        self.recent_requests.push_back(metric);
        if self.recent_requests.len() > MAX_RECENT_REQUESTS {
            self.recent_requests.pop_front();
        }
    }
}

/// Request counters for the answering pipeline.
#[derive(Default)]
pub struct RagMetrics {
    state: Mutex<State>,
}

impl RagMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn record_success(&self, response_time_ms: u64) {
        self.with_state(|s| {
            s.total_requests += 1;
            s.successful_requests += 1;
            s.total_response_time_ms += response_time_ms;
            s.push_recent(RequestMetric { timestamp: Utc::now(), response_time_ms, success: true, error_type: None });
        });
        debug!("Recorded successful request, response time: {}ms", response_time_ms);
    }

    pub fn record_failure(&self, error_type: &str) {
        self.with_state(|s| {
            s.total_requests += 1;
            s.failed_requests += 1;
            *s.error_types.entry(error_type.to_string()).or_default() += 1;
            s.push_recent(RequestMetric {
                timestamp: Utc::now(),
                response_time_ms: 0,
                success: false,
                error_type: Some(error_type.to_string()),
            });
        });
        debug!("Recorded failed request, error: {}", error_type);
    }

    pub fn record_retry(&self) {
        let total = self.with_state(|s| {
            s.retries += 1;
            s.retries
        });
        debug!("Recorded retry, total retries: {}", total);
    }

    pub fn record_validation_failure(&self, issue: ValidationIssue) {
        self.with_state(|s| *s.validation_issues.entry(issue.to_string()).or_default() += 1);
        debug!("Recorded validation issue: {}", issue);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.with_state(|s| {
            let success_rate = if s.total_requests > 0 {
                s.successful_requests as f64 / s.total_requests as f64 * 100.0
            } else {
                0.0
            };
            let avg_response_time_ms = if s.successful_requests > 0 {
                s.total_response_time_ms as f64 / s.successful_requests as f64
            } else {
                0.0
            };
            MetricsSnapshot {
                total_requests: s.total_requests,
                successful_requests: s.successful_requests,
                failed_requests: s.failed_requests,
                total_retries: s.retries,
                success_rate,
                avg_response_time_ms,
                validation_issues: s.validation_issues.clone(),
                error_types: s.error_types.clone(),
                recent_requests: s.recent_requests.iter().cloned().collect(),
            }
        })
    }

    pub fn reset(&self) {
        self.with_state(|s| *s = State::default());
        info!("Metrics reset");
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_retries: u64,
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub validation_issues: BTreeMap<String, u64>,
    pub error_types: BTreeMap<String, u64>,
    pub recent_requests: Vec<RequestMetric>,
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &BTreeMap<String, u64>) -> fmt::Result {
    if counts.is_empty() {
        return writeln!(f, "  None");
    }
    for (name, count) in counts {
        writeln!(f, "  {}: {}", name, count)?;
    }
    Ok(())
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== RAG Metrics ===")?;
        writeln!(f, "Total Requests: {}", self.total_requests)?;
        writeln!(f, "Successful: {} ({:.1}%)", self.successful_requests, self.success_rate)?;
        writeln!(f, "Failed: {}", self.failed_requests)?;
        writeln!(f, "Retries: {}", self.total_retries)?;
        writeln!(f, "Avg Response Time: {:.0}ms", self.avg_response_time_ms)?;
        writeln!(f, "Validation Issues:")?;
        write_counts(f, &self.validation_issues)?;
        writeln!(f, "Error Types:")?;
        write_counts(f, &self.error_types)?;
        writeln!(f, "==================")
    }
}
