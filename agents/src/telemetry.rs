use std::time::Duration;

use tracing::info;

/// Emit a telemetry log for a completed actor turn.
pub fn record_actor_turn(
    agent_name: &str,
    used_model: bool,
    history_turns: usize,
    duration: Duration,
) {
    let duration_ms = duration.as_millis().min(u128::from(u64::MAX)) as u64;
    let responder = if used_model { "model" } else { "echo" };
    info!(
        target: "specforge::telemetry",
        event = "actor_turn",
        agent = agent_name,
        responder,
        history_turns,
        duration_ms,
    );
}
