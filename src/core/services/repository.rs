use super::traits::{Endpoint, EnvelopeAssignments, Repository};
use crate::Result;
use crate::api::ChmsClient;
use crate::api::models::{CountResponse, Envelope, EnvelopeAssignment};
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::utils::retry::{RetryConfig, RetryExecutor};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// REST implementation of [`Repository`] for any [`Endpoint`].
///
/// Reads are retried on server errors and timeouts; writes are sent once.
pub struct RestRepository<R> {
    client: ChmsClient,
    retry: RetryExecutor,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for RestRepository<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            retry: self.retry.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Endpoint> RestRepository<R> {
    pub fn new(client: ChmsClient) -> Self {
        Self::with_retry(client, RetryConfig::default())
    }

    pub fn with_retry(client: ChmsClient, config: RetryConfig) -> Self {
        Self {
            client,
            retry: RetryExecutor::new(config),
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ChmsClient {
        &self.client
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, id)
    }

    async fn read<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> std::result::Result<T, ApiError> {
        let client = &self.client;
        self.retry
            .execute(move || {
                let request = client.build_query_request(Method::GET, path, params);
                client.execute(request, path, StatusCode::OK)
            })
            .await
    }
}

#[async_trait]
impl<R: Endpoint> Repository<R, R::Create, R::Update> for RestRepository<R> {
    async fn find_all(&self, params: &QueryParams) -> Result<Vec<R>> {
        let items = self.read(R::PATH, params).await?;
        Ok(items)
    }

    async fn find_one(&self, id: &str, params: &QueryParams) -> Result<R> {
        let item = self.read(&Self::item_path(id), params).await?;
        Ok(item)
    }

    async fn count(&self, params: &QueryParams) -> Result<u64> {
        let path = format!("{}/count", R::PATH);
        let response: CountResponse = self.read(&path, params).await?;
        Ok(response.count)
    }

    async fn create(&self, input: R::Create) -> Result<R> {
        input.validate()?;
        let request = self.client.build_request(Method::POST, R::PATH).json(&input);
        let created = self
            .client
            .execute(request, R::PATH, StatusCode::CREATED)
            .await?;
        log::info!("Created {}", R::RESOURCE);
        Ok(created)
    }

    async fn update(&self, id: &str, input: R::Update) -> Result<R> {
        input.validate()?;
        let path = Self::item_path(id);
        let request = self.client.build_request(Method::PATCH, &path).json(&input);
        let updated = self.client.execute(request, &path, StatusCode::OK).await?;
        log::info!("Updated {} {}", R::RESOURCE, id);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = Self::item_path(id);
        let request = self.client.build_request(Method::DELETE, &path);
        self.client
            .execute_empty(request, &path, StatusCode::NO_CONTENT)
            .await?;
        log::info!("Deleted {} {}", R::RESOURCE, id);
        Ok(())
    }
}

#[async_trait]
impl EnvelopeAssignments for RestRepository<Envelope> {
    async fn assign(&self, envelope_id: &str, assignment: EnvelopeAssignment) -> Result<Envelope> {
        assignment.validate()?;
        let path = format!("{}/assign", Self::item_path(envelope_id));
        let request = self
            .client
            .build_request(Method::POST, &path)
            .json(&assignment);
        let envelope = self.client.execute(request, &path, StatusCode::OK).await?;
        Ok(envelope)
    }

    async fn release(&self, envelope_id: &str) -> Result<Envelope> {
        let path = format!("{}/release", Self::item_path(envelope_id));
        let request = self.client.build_request(Method::POST, &path);
        let envelope = self.client.execute(request, &path, StatusCode::OK).await?;
        Ok(envelope)
    }
}
