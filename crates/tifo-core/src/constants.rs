/// Tifo system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model (feature-extraction capable, multilingual).
pub const DEFAULT_EMBED_MODEL: &str =
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Default feature-extraction endpoint root. The model name is appended.
pub const DEFAULT_EMBED_ENDPOINT: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// Default remote embedding batch size.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Remote call retry budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Base backoff delay; the Nth failure sleeps N * base before retrying.
pub const DEFAULT_BASE_DELAY_MS: u64 = 800;

/// Remote embedding request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default L1 embedding-cache capacity (entries).
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

/// RRF damping constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Final result count returned by the pipeline.
pub const DEFAULT_FINAL_K: usize = 8;

/// Candidate pool size fetched from each retrieval arm before fusion.
pub const CANDIDATE_POOL: usize = 100;

/// Minimum distinct citations required for a grounded answer.
pub const DEFAULT_MIN_SOURCES: usize = 2;

/// Maximum citations attached to a result.
pub const MAX_CITATIONS: usize = 3;

/// Far-future validity sentinel stamped at ingestion when `valid_to` is absent.
pub const FAR_FUTURE_VALID_TO: &str = "2099-12-31";

/// BM25 Okapi parameters.
pub const BM25_K1: f64 = 1.5;
pub const BM25_B: f64 = 0.75;
pub const BM25_EPSILON: f64 = 0.25;
