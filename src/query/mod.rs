//! Query construction for list endpoints.

pub mod builder;
pub mod fields;
pub mod member;
pub mod resource;
pub mod types;

pub use builder::QueryBuilder;
pub use member::MemberQuery;
pub use resource::{QueryField, QueryResource, ResourceQuery};
pub use types::{
    FilterCriteria, FilterOperator, FilterValue, ParamValue, QueryOptions, QueryParams,
    SortCriteria, SortDirection,
};
