mod backoff;
mod cancellation;
