mod eviction;
mod ttl;
