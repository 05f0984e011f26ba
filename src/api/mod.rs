mod api_types;
mod cache;
mod cached_client;
mod client;
mod error;
mod resource;
#[cfg(test)]
pub(crate) mod testing;
mod transport;
mod types;

pub use cache::ApiQueryKey;
pub use cached_client::{CachedApiClient, QueryPolicies};
pub use client::ApiClient;
pub use error::ApiError;
pub use resource::Resource;
pub use types::*;
