//! Audit trail reporting.

use dmn_engine::AuditTrail;
use tracing::{info, warn};

/// Emits one event per audited rule followed by a summary event.
///
/// Rules carrying violations are reported at `warn`, everything else at
/// `info`.
pub fn log_audit_trail(audit: &AuditTrail) {
    let evaluation = audit.evaluation_id();
    for record in audit.rule_executions() {
        let conclusions = record
            .conclusion_results()
            .iter()
            .map(|result| format!("{}={}", result.output(), result.value()))
            .collect::<Vec<_>>()
            .join(", ");

        match record.exception_message() {
            Some(message) => warn!(
                %evaluation,
                decision = audit.decision_key(),
                rule = %record.rule(),
                valid = record.is_valid(),
                conclusions = %conclusions,
                violation = %message,
                "rule audited"
            ),
            None => info!(
                %evaluation,
                decision = audit.decision_key(),
                rule = %record.rule(),
                valid = record.is_valid(),
                conclusions = %conclusions,
                "rule audited"
            ),
        }
    }

    let elapsed_ms = audit
        .finished_at()
        .map(|finished| (finished - audit.started_at()).num_milliseconds());
    info!(
        %evaluation,
        decision = audit.decision_key(),
        hit_policy = %audit.hit_policy(),
        strict = audit.strict_mode(),
        failed = audit.is_failed(),
        valid_rules = audit.valid_rules().count(),
        decision_message = audit.decision_message().unwrap_or_default(),
        elapsed_ms,
        "decision audited"
    );
}
