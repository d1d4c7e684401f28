//! Filterable fields and eager-loadable relations per resource.

use super::resource::{QueryField, QueryResource};
use crate::api::models::{Envelope, Fellowship, Member, Opportunity, Role, User};

macro_rules! query_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl QueryField for $name {
            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

query_fields!(MemberField {
    Id => "id",
    FirstName => "firstName",
    LastName => "lastName",
    Email => "email",
    Phone => "phone",
    Gender => "gender",
    Status => "status",
    DateOfBirth => "dateOfBirth",
    JoinedOn => "joinedOn",
    FellowshipId => "fellowshipId",
    EnvelopeId => "envelopeId",
    CreatedAt => "createdAt",
});

query_fields!(MemberRelation {
    Fellowship => "fellowship",
    Envelope => "envelope",
    Opportunities => "opportunities",
});

query_fields!(FellowshipField {
    Id => "id",
    Name => "name",
    Description => "description",
    LeaderId => "leaderId",
    CreatedAt => "createdAt",
});

query_fields!(FellowshipRelation {
    Members => "members",
    Leader => "leader",
});

query_fields!(EnvelopeField {
    Id => "id",
    EnvelopeNumber => "envelopeNumber",
    MemberId => "memberId",
    AssignedAt => "assignedAt",
    ReleasedAt => "releasedAt",
    CreatedAt => "createdAt",
});

query_fields!(EnvelopeRelation {
    Member => "member",
});

query_fields!(OpportunityField {
    Id => "id",
    Title => "title",
    Description => "description",
    CreatedAt => "createdAt",
});

query_fields!(OpportunityRelation {
    Members => "members",
});

query_fields!(UserField {
    Id => "id",
    Email => "email",
    FirstName => "firstName",
    LastName => "lastName",
    RoleId => "roleId",
    IsActive => "isActive",
    CreatedAt => "createdAt",
});

query_fields!(UserRelation {
    Role => "role",
});

query_fields!(RoleField {
    Id => "id",
    Name => "name",
    Description => "description",
    IsAdmin => "isAdmin",
    CreatedAt => "createdAt",
});

query_fields!(RoleRelation {
    Users => "users",
});

impl QueryResource for Member {
    type Field = MemberField;
    type Relation = MemberRelation;
}

impl QueryResource for Fellowship {
    type Field = FellowshipField;
    type Relation = FellowshipRelation;
}

impl QueryResource for Envelope {
    type Field = EnvelopeField;
    type Relation = EnvelopeRelation;
}

impl QueryResource for Opportunity {
    type Field = OpportunityField;
    type Relation = OpportunityRelation;
}

impl QueryResource for User {
    type Field = UserField;
    type Relation = UserRelation;
}

impl QueryResource for Role {
    type Field = RoleField;
    type Relation = RoleRelation;
}
