//! Field-checked query builders.
//!
//! [`ResourceQuery`] wraps [`QueryBuilder`] and only accepts the field and
//! relation enums of one resource, so a filter on a column the resource does
//! not have fails to compile instead of failing on the server.

use super::builder::QueryBuilder;
use super::types::{FilterValue, QueryParams, SortDirection};
use crate::error::QueryError;
use std::fmt;
use std::marker::PhantomData;

/// A column or relation name known at compile time
pub trait QueryField: Copy + fmt::Debug {
    fn name(&self) -> &'static str;
}

/// Binds a resource to its filterable fields and eager-loadable relations
pub trait QueryResource {
    type Field: QueryField;
    type Relation: QueryField;
}

pub struct ResourceQuery<R: QueryResource> {
    inner: QueryBuilder,
    _resource: PhantomData<fn() -> R>,
}

impl<R: QueryResource> Clone for ResourceQuery<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: QueryResource> fmt::Debug for ResourceQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceQuery")
            .field("options", self.inner.options())
            .finish()
    }
}

impl<R: QueryResource> Default for ResourceQuery<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: QueryResource> ResourceQuery<R> {
    pub fn new() -> Self {
        Self {
            inner: QueryBuilder::new(),
            _resource: PhantomData,
        }
    }

    fn map(self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        Self {
            inner: f(self.inner),
            _resource: PhantomData,
        }
    }

    pub fn where_eq(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_eq(field.name(), value))
    }

    pub fn where_not(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_not(field.name(), value))
    }

    pub fn where_like(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_like(field.name(), value))
    }

    pub fn where_like_lower(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_like_lower(field.name(), value))
    }

    pub fn where_contains(self, field: R::Field, value: &str) -> Self {
        self.map(|b| b.where_contains(field.name(), value))
    }

    pub fn where_starts_with(self, field: R::Field, value: &str) -> Self {
        self.map(|b| b.where_starts_with(field.name(), value))
    }

    pub fn where_ends_with(self, field: R::Field, value: &str) -> Self {
        self.map(|b| b.where_ends_with(field.name(), value))
    }

    pub fn where_in<I, V>(self, field: R::Field, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.map(|b| b.where_in(field.name(), values))
    }

    pub fn where_null(self, field: R::Field) -> Self {
        self.map(|b| b.where_null(field.name()))
    }

    pub fn where_not_null(self, field: R::Field) -> Self {
        self.map(|b| b.where_not_null(field.name()))
    }

    pub fn where_gte(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_gte(field.name(), value))
    }

    pub fn where_lte(self, field: R::Field, value: impl Into<FilterValue>) -> Self {
        self.map(|b| b.where_lte(field.name(), value))
    }

    pub fn order_by(self, field: R::Field, direction: SortDirection) -> Self {
        self.map(|b| b.order_by(field.name(), direction))
    }

    pub fn order_by_asc(self, field: R::Field) -> Self {
        self.order_by(field, SortDirection::Asc)
    }

    pub fn order_by_desc(self, field: R::Field) -> Self {
        self.order_by(field, SortDirection::Desc)
    }

    pub fn paginate(self, page: u32, page_size: u32) -> Self {
        self.map(|b| b.paginate(page, page_size))
    }

    pub fn with(self, relation: R::Relation) -> Self {
        self.map(|b| b.with(relation.name()))
    }

    pub fn with_all(self, relations: &[R::Relation]) -> Self {
        let names: Vec<&str> = relations.iter().map(|r| r.name()).collect();
        self.map(|b| b.with(names))
    }

    pub fn count_all(self) -> Self {
        self.map(QueryBuilder::count_all)
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.inner
    }

    pub fn into_builder(self) -> QueryBuilder {
        self.inner
    }

    pub fn build(&self) -> Result<QueryParams, QueryError> {
        self.inner.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Fellowship, User};
    use crate::query::fields::{FellowshipField, FellowshipRelation, UserField, UserRelation};
    use crate::query::types::ParamValue;

    #[test]
    fn test_typed_query_uses_wire_names() {
        let params = ResourceQuery::<User>::new()
            .where_eq(UserField::IsActive, true)
            .where_contains(UserField::Email, "church")
            .order_by_desc(UserField::CreatedAt)
            .with(UserRelation::Role)
            .build()
            .unwrap();

        assert_eq!(
            params["isActive:equals"],
            ParamValue::Text("true".to_string())
        );
        assert_eq!(
            params["email:likeLower"],
            ParamValue::Text("%church%".to_string())
        );
        assert_eq!(
            params["orderByDesc"],
            ParamValue::Text("createdAt".to_string())
        );
        assert_eq!(params["eager"], ParamValue::Text("role".to_string()));
    }

    #[test]
    fn test_typed_query_matches_untyped_builder() {
        let typed = ResourceQuery::<Fellowship>::new()
            .where_eq(FellowshipField::Name, "Youth")
            .paginate(2, 10)
            .with_all(&[FellowshipRelation::Members, FellowshipRelation::Leader]);
        let untyped = QueryBuilder::new()
            .where_eq("name", "Youth")
            .paginate(2, 10)
            .with(["members", "leader"]);
        assert_eq!(typed.build().unwrap(), untyped.build().unwrap());
    }

    #[test]
    fn test_typed_clone_is_independent() {
        let base = ResourceQuery::<User>::new().where_null(UserField::RoleId);
        let extended = base.clone().where_eq(UserField::IsActive, true);
        assert_eq!(base.build().unwrap().len(), 1);
        assert_eq!(extended.build().unwrap().len(), 2);
    }
}
