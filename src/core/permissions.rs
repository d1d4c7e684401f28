//! Permission catalog and the checks built on it.
//!
//! A permission is the string `"<resource>.<action>"` (e.g. `member.findAll`)
//! or one of a few custom verbs such as `envelope.assign`. The actor's
//! allowed actions live in the [`SessionStore`]; [`PermissionsManager`] only
//! reads them.

use crate::api::models::CurrentUser;
use crate::core::session::SessionStore;
use crate::error::PermissionError;
use std::fmt;
use std::str::FromStr;

/// Role name treated as administrator regardless of its permission list
pub const ADMIN_ROLE_NAME: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Member,
    Fellowship,
    Envelope,
    Opportunity,
    User,
    Role,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Member,
        ResourceType::Fellowship,
        ResourceType::Envelope,
        ResourceType::Opportunity,
        ResourceType::User,
        ResourceType::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Member => "member",
            ResourceType::Fellowship => "fellowship",
            ResourceType::Envelope => "envelope",
            ResourceType::Opportunity => "opportunity",
            ResourceType::User => "user",
            ResourceType::Role => "role",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown resource type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    FindAll,
    FindOne,
    Create,
    Update,
    Delete,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::FindAll,
        ActionType::FindOne,
        ActionType::Create,
        ActionType::Update,
        ActionType::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::FindAll => "findAll",
            ActionType::FindOne => "findOne",
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
        }
    }
}

/// Verbs outside the resource × action grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomAction {
    EnvelopeAssign,
    EnvelopeRelease,
    RoleAssignPermissions,
}

impl CustomAction {
    pub const ALL: [CustomAction; 3] = [
        CustomAction::EnvelopeAssign,
        CustomAction::EnvelopeRelease,
        CustomAction::RoleAssignPermissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomAction::EnvelopeAssign => "envelope.assign",
            CustomAction::EnvelopeRelease => "envelope.release",
            CustomAction::RoleAssignPermissions => "role.assignPermissions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Standard(ResourceType, ActionType),
    Custom(CustomAction),
}

impl Permission {
    pub fn new(resource: ResourceType, action: ActionType) -> Self {
        Permission::Standard(resource, action)
    }

    pub fn resource(&self) -> ResourceType {
        match self {
            Permission::Standard(resource, _) => *resource,
            Permission::Custom(CustomAction::EnvelopeAssign | CustomAction::EnvelopeRelease) => {
                ResourceType::Envelope
            }
            Permission::Custom(CustomAction::RoleAssignPermissions) => ResourceType::Role,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Standard(resource, action) => {
                write!(f, "{}.{}", resource.as_str(), action.as_str())
            }
            Permission::Custom(custom) => f.write_str(custom.as_str()),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(custom) = CustomAction::ALL.into_iter().find(|c| c.as_str() == s) {
            return Ok(Permission::Custom(custom));
        }
        let (resource, action) = s
            .split_once('.')
            .ok_or_else(|| format!("'{}' is not of the form <resource>.<action>", s))?;
        let resource = resource.parse::<ResourceType>()?;
        let action = ActionType::ALL
            .into_iter()
            .find(|a| a.as_str() == action)
            .ok_or_else(|| format!("unknown action '{}'", action))?;
        Ok(Permission::Standard(resource, action))
    }
}

impl AsRef<str> for ResourceType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Every permission the system knows about, fixed at compile time
pub fn permission_catalog() -> Vec<Permission> {
    let mut catalog: Vec<Permission> = ResourceType::ALL
        .into_iter()
        .flat_map(|resource| {
            ActionType::ALL
                .into_iter()
                .map(move |action| Permission::Standard(resource, action))
        })
        .collect();
    catalog.extend(CustomAction::ALL.into_iter().map(Permission::Custom));
    catalog
}

pub fn catalog_size() -> usize {
    ResourceType::ALL.len() * ActionType::ALL.len() + CustomAction::ALL.len()
}

/// Answers permission questions for the current session
#[derive(Debug, Clone)]
pub struct PermissionsManager {
    session: SessionStore,
}

impl PermissionsManager {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Exact membership in the allowed-actions list
    pub fn can_perform_action(&self, action: impl fmt::Display) -> bool {
        let action = action.to_string();
        self.session
            .snapshot()
            .allowed_actions
            .iter()
            .any(|allowed| *allowed == action)
    }

    /// True when any allowed action belongs to `resource`
    pub fn can_access_resource(&self, resource: impl AsRef<str>) -> bool {
        let prefix = format!("{}.", resource.as_ref());
        self.session
            .snapshot()
            .allowed_actions
            .iter()
            .any(|allowed| allowed.starts_with(&prefix))
    }

    pub fn fetch_resource_permissions(&self, resource: impl AsRef<str>) -> Vec<String> {
        let prefix = format!("{}.", resource.as_ref());
        self.session
            .snapshot()
            .allowed_actions
            .iter()
            .filter(|allowed| allowed.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Admin when the role says so, when the role is named `admin`, or when
    /// the actor holds as many permissions as the catalog has.
    ///
    /// The count rule is kept for compatibility with backends that do not
    /// send `isAdmin`; it misfires if the backend grants unknown actions.
    pub fn check_is_admin(&self) -> bool {
        let session = self.session.snapshot();
        let role = session.user.as_ref().and_then(|u| u.role.as_ref());
        if let Some(role) = role {
            if role.is_admin || role.name == ADMIN_ROLE_NAME {
                return true;
            }
        }
        session.allowed_actions.len() == catalog_size()
    }

    /// Fail with `PermissionError` unless the action is allowed
    pub fn require(&self, permission: Permission) -> Result<(), PermissionError> {
        if self.can_perform_action(permission) {
            Ok(())
        } else {
            log::debug!("Permission check failed for {}", permission);
            Err(PermissionError::new(permission.to_string()))
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.current_user()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }
}
