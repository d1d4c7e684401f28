use super::repository::RestRepository;
use super::traits::{Endpoint, EnvelopeAssignments, Repository};
use crate::Result;
use crate::api::ChmsClient;
use crate::api::models::{Envelope, EnvelopeAssignment};
use crate::core::permissions::{ActionType, CustomAction, Permission, PermissionsManager};
use crate::query::QueryParams;
use std::marker::PhantomData;

/// Permission gate in front of a repository.
///
/// Every operation checks the matching `<resource>.<action>` permission of
/// the current session first; a denied call never reaches the repository.
pub struct ResourceManager<R, P = RestRepository<R>> {
    repository: P,
    permissions: PermissionsManager,
    _resource: PhantomData<fn() -> R>,
}

/// Envelope operations including assign and release
pub type EnvelopeManager<P = RestRepository<Envelope>> = ResourceManager<Envelope, P>;

impl<R: Endpoint> ResourceManager<R> {
    /// Manager backed by the REST repository of `R`
    pub fn rest(client: ChmsClient, permissions: PermissionsManager) -> Self {
        Self::new(RestRepository::new(client), permissions)
    }
}

impl<R, P> ResourceManager<R, P>
where
    R: Endpoint,
    P: Repository<R, R::Create, R::Update>,
{
    pub fn new(repository: P, permissions: PermissionsManager) -> Self {
        Self {
            repository,
            permissions,
            _resource: PhantomData,
        }
    }

    pub fn permissions(&self) -> &PermissionsManager {
        &self.permissions
    }

    fn require(&self, action: ActionType) -> Result<()> {
        self.permissions
            .require(Permission::new(R::RESOURCE, action))?;
        Ok(())
    }

    pub async fn find_all(&self, params: &QueryParams) -> Result<Vec<R>> {
        self.require(ActionType::FindAll)?;
        self.repository.find_all(params).await
    }

    pub async fn find_one(&self, id: &str, params: &QueryParams) -> Result<R> {
        self.require(ActionType::FindOne)?;
        self.repository.find_one(id, params).await
    }

    pub async fn count(&self, params: &QueryParams) -> Result<u64> {
        self.require(ActionType::FindAll)?;
        self.repository.count(params).await
    }

    pub async fn create(&self, input: R::Create) -> Result<R> {
        self.require(ActionType::Create)?;
        self.repository.create(input).await
    }

    pub async fn update(&self, id: &str, input: R::Update) -> Result<R> {
        self.require(ActionType::Update)?;
        self.repository.update(id, input).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.require(ActionType::Delete)?;
        self.repository.delete(id).await
    }
}

impl<P> ResourceManager<Envelope, P>
where
    P: Repository<Envelope, <Envelope as Endpoint>::Create, <Envelope as Endpoint>::Update>
        + EnvelopeAssignments,
{
    pub async fn assign(&self, envelope_id: &str, member_id: &str) -> Result<Envelope> {
        self.permissions
            .require(Permission::Custom(CustomAction::EnvelopeAssign))?;
        let assignment = EnvelopeAssignment {
            member_id: member_id.to_string(),
        };
        let envelope = self.repository.assign(envelope_id, assignment).await?;
        log::info!("Envelope {} assigned to member {}", envelope_id, member_id);
        Ok(envelope)
    }

    pub async fn release(&self, envelope_id: &str) -> Result<Envelope> {
        self.permissions
            .require(Permission::Custom(CustomAction::EnvelopeRelease))?;
        let envelope = self.repository.release(envelope_id).await?;
        log::info!("Envelope {} released", envelope_id);
        Ok(envelope)
    }
}
