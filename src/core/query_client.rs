//! Request runner producing [`QuerySnapshot`]s for the state mapper.
//!
//! Successful payloads are kept per query key so a later refetch can show
//! them while the new request is in flight.

use crate::core::async_state::{Callback, QuerySnapshot};
use crate::core::cache::{DEFAULT_TTL, TtlCache};
use crate::query::QueryParams;
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Stable cache key for a resource request
pub fn query_key(resource: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return resource.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{}?{}", resource, query.join("&"))
}

/// Runs requests and keeps their last successful payloads.
///
/// One-shot commands get settled snapshots only. The cached fallback behind
/// [`QueryClient::refetching`] and the `refetch` callbacks serve long-lived
/// library callers that re-render while a request is repeated.
#[derive(Debug, Clone)]
pub struct QueryClient {
    cache: TtlCache<String, serde_json::Value>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl QueryClient {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
        }
    }

    /// Run `request` and describe the outcome as a settled snapshot
    pub async fn fetch<T, F>(&self, key: &str, request: F, refetch: Callback) -> QuerySnapshot<T>
    where
        T: Serialize,
        F: Future<Output = crate::Result<T>>,
    {
        match request.await {
            Ok(data) => {
                self.remember(key, &data);
                QuerySnapshot::success(data, refetch)
            }
            Err(error) => {
                log::debug!("Query '{}' failed: {}", key, error);
                QuerySnapshot::failure(error, refetch)
            }
        }
    }

    /// Like `fetch` for requests whose success may carry no payload
    pub async fn fetch_optional<T, F>(
        &self,
        key: &str,
        request: F,
        refetch: Callback,
    ) -> QuerySnapshot<T>
    where
        T: Serialize,
        F: Future<Output = crate::Result<Option<T>>>,
    {
        let result = request.await;
        if let Ok(Some(data)) = &result {
            self.remember(key, data);
        }
        QuerySnapshot::from_optional(result, refetch)
    }

    /// Run several requests of the same payload type concurrently
    pub async fn fetch_all<T, F>(
        &self,
        requests: Vec<(String, F)>,
        refetch: Callback,
    ) -> Vec<QuerySnapshot<T>>
    where
        T: Serialize,
        F: Future<Output = crate::Result<T>>,
    {
        let pending = requests
            .into_iter()
            .map(|(key, request)| {
                let refetch = refetch.clone();
                async move { self.fetch(&key, request, refetch).await }
            });
        join_all(pending).await
    }

    /// Run two requests with different payload types concurrently
    pub async fn fetch_pair<A, B, FA, FB>(
        &self,
        (key_a, request_a): (&str, FA),
        (key_b, request_b): (&str, FB),
        refetch: Callback,
    ) -> (QuerySnapshot<A>, QuerySnapshot<B>)
    where
        A: Serialize,
        B: Serialize,
        FA: Future<Output = crate::Result<A>>,
        FB: Future<Output = crate::Result<B>>,
    {
        futures::join!(
            self.fetch(key_a, request_a, refetch.clone()),
            self.fetch(key_b, request_b, refetch)
        )
    }

    fn remember<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.cache.insert(key.to_string(), value),
            Err(e) => log::warn!("Payload of '{}' cannot be cached: {}", key, e),
        }
    }

    /// Last successful payload for `key`, if still fresh
    pub fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(&key.to_string())?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Discarding cached payload for '{}': {}", key, e);
                self.cache.remove(&key.to_string());
                None
            }
        }
    }

    /// Snapshot of a request that is being fetched again
    pub fn refetching<T: DeserializeOwned>(&self, key: &str, refetch: Callback) -> QuerySnapshot<T> {
        QuerySnapshot::refetching(self.cached(key), refetch)
    }

    /// Forget every payload of a resource, e.g. after a mutation
    pub fn invalidate(&self, resource: &str) -> usize {
        let removed = self.cache.remove_where(|key| {
            key == resource
                || key.starts_with(&format!("{}?", resource))
                || key.starts_with(&format!("{}/", resource))
        });
        log::debug!("Invalidated {} cached queries for '{}'", removed, resource);
        removed
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, AppError};
    use crate::query::QueryBuilder;
    use futures::future::BoxFuture;

    fn not_found() -> AppError {
        AppError::Api(ApiError::NotFound {
            endpoint: "/members/9".to_string(),
        })
    }

    #[test]
    fn test_query_key_is_stable() {
        let params = QueryBuilder::new()
            .where_eq("lastName", "Smith")
            .paginate(1, 20)
            .build()
            .unwrap();
        assert_eq!(
            query_key("member", &params),
            "member?lastName:equals=Smith&rangeEnd=19&rangeStart=0"
        );
        assert_eq!(query_key("role", &QueryParams::new()), "role");
    }

    #[tokio::test]
    async fn test_fetch_success_is_cached() {
        let client = QueryClient::default();
        let snapshot = client
            .fetch("member/1", async { Ok(vec![1u32, 2]) }, Callback::noop())
            .await;

        assert!(snapshot.is_success);
        assert_eq!(snapshot.data, Some(vec![1, 2]));
        assert_eq!(client.cached::<Vec<u32>>("member/1"), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_unserializable_payload_is_returned_but_not_cached() {
        use std::collections::BTreeMap;

        let client = QueryClient::default();
        let mut payload = BTreeMap::new();
        payload.insert(vec![1u8], 1u8);
        let snapshot = client
            .fetch("envelope/1", async move { Ok(payload) }, Callback::noop())
            .await;

        assert!(snapshot.is_success);
        assert!(snapshot.data.is_some());
        assert!(client.cached::<serde_json::Value>("envelope/1").is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_payload() {
        let client = QueryClient::default();
        client
            .fetch("member/9", async { Ok("Jane".to_string()) }, Callback::noop())
            .await;

        let snapshot: QuerySnapshot<String> = client
            .fetch("member/9", async { Err(not_found()) }, Callback::noop())
            .await;
        assert!(snapshot.is_error);
        assert_eq!(snapshot.error.unwrap().status_code(), Some(404));
        assert_eq!(client.cached::<String>("member/9"), Some("Jane".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_optional_none_is_empty_success() {
        let client = QueryClient::default();
        let snapshot: QuerySnapshot<String> = client
            .fetch_optional("member/2", async { Ok(None) }, Callback::noop())
            .await;
        assert!(snapshot.is_success);
        assert!(snapshot.data.is_none());
        assert!(client.cached::<String>("member/2").is_none());
    }

    #[tokio::test]
    async fn test_fetch_pair_and_fetch_all() {
        let client = QueryClient::default();
        let (count, names) = client
            .fetch_pair(
                ("member/count", async { Ok(12u64) }),
                ("fellowship", async { Ok(vec!["Youth".to_string()]) }),
                Callback::noop(),
            )
            .await;
        assert_eq!(count.data, Some(12));
        assert_eq!(names.data, Some(vec!["Youth".to_string()]));

        let ok: BoxFuture<'static, crate::Result<u8>> = Box::pin(async { Ok(1u8) });
        let failed: BoxFuture<'static, crate::Result<u8>> = Box::pin(async { Err(not_found()) });
        let snapshots = client
            .fetch_all(
                vec![("a".to_string(), ok), ("b".to_string(), failed)],
                Callback::noop(),
            )
            .await;
        assert!(snapshots[0].is_success);
        assert!(snapshots[1].is_error);
    }

    #[tokio::test]
    async fn test_refetching_uses_cache_and_invalidate_clears_it() {
        let client = QueryClient::default();
        client
            .fetch("member?page=1", async { Ok(3u32) }, Callback::noop())
            .await;
        client
            .fetch("fellowship", async { Ok(4u32) }, Callback::noop())
            .await;

        let snapshot: QuerySnapshot<u32> = client.refetching("member?page=1", Callback::noop());
        assert!(snapshot.is_refetching);
        assert_eq!(snapshot.data, Some(3));

        assert_eq!(client.invalidate("member"), 1);
        assert!(client.cached::<u32>("member?page=1").is_none());
        assert_eq!(client.cached::<u32>("fellowship"), Some(4));
    }

    #[test]
    fn test_cached_wrong_type_is_discarded() {
        let client = QueryClient::default();
        client
            .cache
            .insert("role".to_string(), serde_json::json!("not a number"));
        assert!(client.cached::<u32>("role").is_none());
        assert!(!client.cache.contains_key(&"role".to_string()));
    }
}
