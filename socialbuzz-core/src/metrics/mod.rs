//! Metric descriptions for the feed client
//!
//! Increment sites live next to the code they measure; this module only
//! registers names and descriptions with the `metrics` facade. Export is
//! the embedding application's choice of recorder.

use metrics::describe_counter;

/// Register descriptions for every counter the client emits
pub fn init_metrics() {
    // Feed operations
    describe_counter!("feed.operations.total", "Feed operations started");
    describe_counter!("feed.operations.failed", "Feed operations that surfaced an error");
    describe_counter!("feed.rollbacks.total", "Optimistic mutations rolled back");
    describe_counter!(
        "feed.reconciliations.kept",
        "Reconciliation mismatches resolved by keeping local state"
    );

    // Gateway
    describe_counter!("gateway.requests.total", "Requests sent to the backend");
    describe_counter!("gateway.requests.failed", "Backend requests that failed");

    // Session
    describe_counter!("session.logins.total", "Successful session bindings");
    describe_counter!("session.restores.total", "Attempted slot restores");
}
