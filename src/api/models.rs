use crate::error::ServiceError;
use crate::utils::validation::{Validate, require_non_empty, validate_email};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Authentication models
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued by `/auth/login`; replaces the whole session
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: CurrentUser,
    #[serde(default)]
    pub allowed_actions: Vec<String>,
}

/// Returned by `/auth/me` when restoring a session from a token
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: CurrentUser,
    #[serde(default)]
    pub allowed_actions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl CurrentUser {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
    Visitor,
    Transferred,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Visitor => "visitor",
            MemberStatus::Transferred => "transferred",
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            "visitor" => Ok(MemberStatus::Visitor),
            "transferred" => Ok(MemberStatus::Transferred),
            other => Err(format!(
                "unknown member status '{}' (active, inactive, visitor, transferred)",
                other
            )),
        }
    }
}

// Resource models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_on: Option<NaiveDate>,
    pub fellowship_id: Option<String>,
    pub envelope_id: Option<String>,
    pub fellowship: Option<Box<Fellowship>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fellowship {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub envelope_number: u32,
    pub member_id: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub member: Option<Box<Member>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Envelope {
    pub fn is_assigned(&self) -> bool {
        self.member_id.is_some()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub role_id: Option<String>,
    pub role: Option<Role>,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// Create/update inputs
#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub status: MemberStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fellowship_id: Option<String>,
}

impl Validate for NewMember {
    fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("firstName", &self.first_name)?;
        require_non_empty("lastName", &self.last_name)?;
        if let Some(email) = &self.email {
            validate_email("email", email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fellowship_id: Option<String>,
}

impl Validate for MemberUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(first_name) = &self.first_name {
            require_non_empty("firstName", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty("lastName", last_name)?;
        }
        if let Some(email) = &self.email {
            validate_email("email", email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewFellowship {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
}

impl Validate for NewFellowship {
    fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("name", &self.name)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FellowshipUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
}

impl Validate for FellowshipUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        match &self.name {
            Some(name) => require_non_empty("name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewEnvelope {
    pub envelope_number: u32,
}

impl Validate for NewEnvelope {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.envelope_number == 0 {
            return Err(ServiceError::Validation {
                field: "envelopeNumber".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeAssignment {
    pub member_id: String,
}

impl Validate for EnvelopeAssignment {
    fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("memberId", &self.member_id)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewOpportunity {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for NewOpportunity {
    fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("title", &self.title)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_email("email", &self.email)?;
        if self.password.chars().count() < 8 {
            return Err(ServiceError::Validation {
                field: "password".to_string(),
                message: "must be at least 8 characters".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl Validate for NewRole {
    fn validate(&self) -> Result<(), ServiceError> {
        require_non_empty("name", &self.name)
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl Validate for RoleUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        match &self.name {
            Some(name) => require_non_empty("name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for OpportunityUpdate {
    fn validate(&self) -> Result<(), ServiceError> {
        match &self.title {
            Some(title) => require_non_empty("title", title),
            None => Ok(()),
        }
    }
}
