//! Default configuration constants.
//!
//! These values are shared by the library defaults, the CLI flag defaults,
//! and the tests so the three never drift apart.

/// Default number of hits requested per query.
///
/// Metrics score over the top-k window of the returned list, so `hits`
/// should be at least as large as the largest metric cutoff in use.
pub const DEFAULT_HITS: usize = 10;

/// Default number of in-flight query executions during a batch run.
///
/// Each (query, model) pair is one outbound HTTP call; this bounds the
/// worker pool feeding the backend.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Per-request timeout in seconds for the bundled HTTP client.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Idle connections kept per host for connection reuse.
///
/// Batch evaluation issues many requests against one endpoint, so pooling
/// matters more here than for one-off queries.
pub const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// User agent sent with every query request.
pub const USER_AGENT: &str = concat!("ranklab/", env!("CARGO_PKG_VERSION"));
