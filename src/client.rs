//! Single-call layer: parameters, retry policy and the executor.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod executor;
pub mod params;
pub mod retry;

pub use executor::{call_llm, try_call_llm, CallOutcome};
pub use params::{
    CallParameters, DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
pub use retry::RetryPolicy;
