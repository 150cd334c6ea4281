//! API usage accounting — tokens, cost, and call count for one run.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Cost per 1K tokens in USD (gpt-3.5-turbo blended rate).
const COST_PER_1K_TOKENS: f64 = 0.002;

/// Read-only snapshot of meter state, serialized into run statistics
/// as the `api_usage` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub total_api_calls: u64,
}

#[derive(Debug, Default)]
struct MeterState {
    total_tokens: u64,
    total_cost: f64,
    total_calls: u64,
}

/// Tracks LLM API usage and cost across concurrent workers.
///
/// Updated exactly once per successful remote call. Increments are
/// serialized behind a mutex so cost accounting stays exact under
/// concurrency; callers share the meter via `Arc`.
#[derive(Debug, Default)]
pub struct UsageMeter {
    state: Mutex<MeterState>,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one API call consuming `tokens` tokens.
    pub fn update(&self, tokens: u32) {
        let mut state = self.state.lock().expect("usage meter lock poisoned");
        state.total_tokens += u64::from(tokens);
        state.total_cost += f64::from(tokens) / 1000.0 * COST_PER_1K_TOKENS;
        state.total_calls += 1;
    }

    /// Snapshot of the running totals, cost rounded to cents.
    pub fn get_stats(&self) -> UsageStats {
        let state = self.state.lock().expect("usage meter lock poisoned");
        UsageStats {
            total_tokens: state.total_tokens,
            total_cost_usd: (state.total_cost * 100.0).round() / 100.0,
            total_api_calls: state.total_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meter_is_zeroed() {
        let meter = UsageMeter::new();
        let stats = meter.get_stats();
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.total_cost_usd, 0.0);
        assert_eq!(stats.total_api_calls, 0);
    }

    #[test]
    fn test_update_accumulates_tokens_and_calls() {
        let meter = UsageMeter::new();
        meter.update(1500);
        meter.update(500);
        let stats = meter.get_stats();
        assert_eq!(stats.total_tokens, 2000);
        assert_eq!(stats.total_api_calls, 2);
    }

    #[test]
    fn test_cost_is_rate_per_thousand_tokens() {
        let meter = UsageMeter::new();
        meter.update(10_000);
        // 10K tokens at 0.002/1K = 0.02 USD
        assert_eq!(meter.get_stats().total_cost_usd, 0.02);
    }

    #[test]
    fn test_cost_rounds_to_cents() {
        let meter = UsageMeter::new();
        meter.update(1234);
        meter.update(777);
        let stats = meter.get_stats();
        let cents = stats.total_cost_usd * 100.0;
        assert!((cents - cents.round()).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_updates_are_exact() {
        use std::sync::Arc;
        let meter = Arc::new(UsageMeter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let meter = Arc::clone(&meter);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        meter.update(10);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let stats = meter.get_stats();
        assert_eq!(stats.total_tokens, 8000);
        assert_eq!(stats.total_api_calls, 800);
    }
}
