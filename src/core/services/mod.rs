pub mod auth_service;
pub mod manager;
pub mod repository;
pub mod traits;

pub use auth_service::{AuthService, AuthStatus};
pub use manager::{EnvelopeManager, ResourceManager};
pub use repository::RestRepository;
pub use traits::{Endpoint, EnvelopeAssignments, Repository};
