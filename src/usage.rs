//! Token accounting for completion requests.
//!
//! Totals are simple running sums mutated after each completion; the
//! pipeline is sequential so no synchronization is needed.

use serde::{Deserialize, Serialize};

/// Prompt and completion token counts, summed across a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// USD per million tokens (prompt rate, completion rate).
fn model_rates(model: &str) -> Option<(f64, f64)> {
    match model {
        "gpt-4o" => Some((2.5, 10.0)),
        "gpt-4o-mini" => Some((0.150, 0.600)),
        "o1-mini" => Some((3.0, 12.0)),
        "o1-preview" => Some((15.0, 60.0)),
        _ => None,
    }
}

fn cost(tokens: u64, rate_per_million: f64) -> f64 {
    let raw = (tokens as f64) * rate_per_million / 1e6;
    (raw * 1e5).round() / 1e5
}

/// Renders the end-of-request token and cost report.
///
/// Models without a known rate still report token counts, with the cost
/// fields marked as unknown.
pub fn cost_report(model: &str, usage: &TokenUsage) -> String {
    match model_rates(model) {
        Some((prompt_rate, completion_rate)) => {
            let prompt_cost = cost(usage.prompt_tokens, prompt_rate);
            let completion_cost = cost(usage.completion_tokens, completion_rate);
            let total_cost = ((prompt_cost + completion_cost) * 1e5).round() / 1e5;
            format!(
                "\nTotal tokens generated: {}  (${})\n    Prompt (i.e. input): {}  (${})\n    Completion (i.e. output): {}  (${})",
                usage.total(),
                total_cost,
                usage.prompt_tokens,
                prompt_cost,
                usage.completion_tokens,
                completion_cost,
            )
        }
        None => format!(
            "\nTotal tokens generated: {}  (Unknown model rate)\n    Prompt (i.e. input): {}\n    Completion (i.e. output): {}",
            usage.total(),
            usage.prompt_tokens,
            usage.completion_tokens,
        ),
    }
}
