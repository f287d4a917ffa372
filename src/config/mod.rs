//! Cache Configuration Module
//!
//! Configuration structures for the cache strategies in this crate. The
//! structs have all-public fields for simple instantiation:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Type safety**: All parameters must be provided at construction
//! - **No boilerplate**: No constructors or builder methods needed
//!
//! # Examples
//!
//! ```
//! use sieve_rs::config::SieveCacheConfig;
//! use sieve_rs::SieveCache;
//! use std::sync::Arc;
//!
//! // Byte-bounded cache weighed by value length.
//! let config = SieveCacheConfig {
//!     max_size_in_bytes: 50 * 1024 * 1024, // 50MB
//!     max_count: 0,                        // no count restriction
//! };
//! let mut cache: SieveCache<String, Vec<u8>, _> =
//!     SieveCache::with_weigher(config, |v: &Vec<u8>| v.len() as u64);
//! cache.set("blob".to_string(), Arc::new(vec![0u8; 1024]));
//! ```

pub mod sieve;

pub use sieve::SieveCacheConfig;
