use serde::{Deserialize, Serialize};

/// Retry ceiling shared by the rewrite and regenerate budgets.
pub const DEFAULT_RETRY_CEILING: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Ceiling for both `retry_generate_count` and `retry_transform_count`.
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,
    /// Guardrail on node executions per turn. Reaching it diverts to `max_retries`.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Capacity of the streaming event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_retry_ceiling() -> u32 {
    DEFAULT_RETRY_CEILING
}

fn default_max_iterations() -> usize {
    50
}

fn default_event_buffer() -> usize {
    1000
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            retry_ceiling: default_retry_ceiling(),
            max_iterations: default_max_iterations(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_ceiling(mut self, ceiling: u32) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }
}
