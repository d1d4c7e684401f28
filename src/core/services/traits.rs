use crate::Result;
use crate::api::models::{
    Envelope, EnvelopeAssignment, Fellowship, FellowshipUpdate, Member, MemberUpdate, NewEnvelope,
    NewFellowship, NewMember, NewOpportunity, NewRole, NewUser, Opportunity, OpportunityUpdate,
    Role, RoleUpdate, User, UserUpdate,
};
use crate::core::permissions::ResourceType;
use crate::query::QueryParams;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A REST collection and the payloads it accepts
pub trait Endpoint: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    type Create: Serialize + Validate + Send + Sync + 'static;
    type Update: Serialize + Validate + Send + Sync + 'static;

    /// Collection path relative to the API base, e.g. `/members`
    const PATH: &'static str;
    /// Resource name used in permission strings
    const RESOURCE: ResourceType;
}

/// Data access for one resource type
#[async_trait]
pub trait Repository<T, N, U>: Send + Sync {
    async fn find_all(&self, params: &QueryParams) -> Result<Vec<T>>;
    async fn find_one(&self, id: &str, params: &QueryParams) -> Result<T>;
    async fn count(&self, params: &QueryParams) -> Result<u64>;
    async fn create(&self, input: N) -> Result<T>;
    async fn update(&self, id: &str, input: U) -> Result<T>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Envelope hand-out and return
#[async_trait]
pub trait EnvelopeAssignments: Send + Sync {
    async fn assign(&self, envelope_id: &str, assignment: EnvelopeAssignment) -> Result<Envelope>;
    async fn release(&self, envelope_id: &str) -> Result<Envelope>;
}

/// Declare the endpoint of a model type
#[macro_export]
macro_rules! impl_endpoint {
    ($model:ty, $create:ty, $update:ty, $path:literal, $resource:expr) => {
        impl $crate::core::services::traits::Endpoint for $model {
            type Create = $create;
            type Update = $update;
            const PATH: &'static str = $path;
            const RESOURCE: $crate::core::permissions::ResourceType = $resource;
        }
    };
}

impl_endpoint!(Member, NewMember, MemberUpdate, "/members", ResourceType::Member);
impl_endpoint!(
    Fellowship,
    NewFellowship,
    FellowshipUpdate,
    "/fellowships",
    ResourceType::Fellowship
);
impl_endpoint!(Envelope, NewEnvelope, NewEnvelope, "/envelopes", ResourceType::Envelope);
impl_endpoint!(
    Opportunity,
    NewOpportunity,
    OpportunityUpdate,
    "/opportunities",
    ResourceType::Opportunity
);
impl_endpoint!(User, NewUser, UserUpdate, "/users", ResourceType::User);
impl_endpoint!(Role, NewRole, RoleUpdate, "/roles", ResourceType::Role);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths_match_resources() {
        assert_eq!(Member::PATH, "/members");
        assert_eq!(Member::RESOURCE, ResourceType::Member);
        assert_eq!(Envelope::PATH, "/envelopes");
        assert_eq!(Opportunity::RESOURCE.as_str(), "opportunity");
        assert_eq!(Role::PATH, "/roles");
    }

    #[test]
    fn test_every_resource_has_an_endpoint() {
        let resources = [
            Member::RESOURCE,
            Fellowship::RESOURCE,
            Envelope::RESOURCE,
            Opportunity::RESOURCE,
            User::RESOURCE,
            Role::RESOURCE,
        ];
        for resource in ResourceType::ALL {
            assert!(resources.contains(&resource), "{} has no endpoint", resource);
        }
    }
}
