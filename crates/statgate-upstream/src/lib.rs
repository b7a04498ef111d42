//! Upstream access for the statgate facade.
//!
//! Composition, outermost first: [`ParallelFetcher`] fans a composite
//! request out into per-source [`Gateway`] calls; each gateway call
//! consults the shared cache, asks the shared circuit breaker for a
//! permit, runs the injected [`Fetch`] transport through the retry
//! policy, and falls back to stale cache data on the degradation path.

mod fetch;
mod fetcher;
mod gateway;
mod hints;
mod http;

pub use fetch::{Endpoint, Fetch, FetchRequest, FetchResponse};
pub use fetcher::{Composite, CompletedOp, Op, ParallelFetcher, SourceStatus};
pub use gateway::{DataSource, Gateway, Sourced};
pub use hints::{combine as combine_hints, parse_rate_limit_reset, parse_retry_after};
pub use http::{HttpFetcher, HttpFetcherConfig};
