//! Fluent query builder for the range/filter/sort/eager query-string convention.
//!
//! A builder accumulates filters, sort directives, pagination and relation
//! includes, then [`QueryBuilder::build`] serializes them into a flat
//! [`QueryParams`] map:
//!
//! ```text
//! <field>:<operator>   filter value (isNull / isNotNull carry 1)
//! rangeStart/rangeEnd  inclusive offsets computed from page/pageSize
//! orderBy/orderByDesc  comma-joined field lists
//! eager                comma-joined relation names
//! count                count expression
//! ```

use super::types::{
    FilterCriteria, FilterOperator, FilterValue, IntoRelations, ParamValue, QueryOptions,
    QueryParams, SortCriteria, SortDirection,
};
use crate::error::QueryError;

pub const DEFAULT_COUNT_EXPRESSION: &str = "*";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    options: QueryOptions,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously accumulated options
    pub fn from_options(options: QueryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options == QueryOptions::default()
    }

    fn push_filter(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: Option<FilterValue>,
    ) -> Self {
        self.options.filters.push(FilterCriteria {
            field: field.into(),
            operator,
            value,
        });
        self
    }

    /// Add an `equals` filter
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::Equals, Some(value.into()))
    }

    pub fn where_not(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::NotEquals, Some(value.into()))
    }

    pub fn where_like(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::Like, Some(value.into()))
    }

    pub fn where_like_lower(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::LikeLower, Some(value.into()))
    }

    /// Case-insensitive substring match (`%value%`)
    pub fn where_contains(self, field: impl Into<String>, value: &str) -> Self {
        self.where_like_lower(field, format!("%{}%", value))
    }

    /// Case-insensitive prefix match (`value%`)
    pub fn where_starts_with(self, field: impl Into<String>, value: &str) -> Self {
        self.where_like_lower(field, format!("{}%", value))
    }

    /// Case-insensitive suffix match (`%value`)
    pub fn where_ends_with(self, field: impl Into<String>, value: &str) -> Self {
        self.where_like_lower(field, format!("%{}", value))
    }

    /// Membership filter. An empty list is rejected by `build`.
    pub fn where_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let list = FilterValue::List(values.into_iter().map(Into::into).collect());
        self.push_filter(field, FilterOperator::In, Some(list))
    }

    pub fn where_null(self, field: impl Into<String>) -> Self {
        self.push_filter(field, FilterOperator::IsNull, None)
    }

    pub fn where_not_null(self, field: impl Into<String>) -> Self {
        self.push_filter(field, FilterOperator::IsNotNull, None)
    }

    pub fn where_gt(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::GreaterThan, Some(value.into()))
    }

    pub fn where_gte(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::GreaterThanOrEqual, Some(value.into()))
    }

    pub fn where_lt(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::LessThan, Some(value.into()))
    }

    pub fn where_lte(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push_filter(field, FilterOperator::LessThanOrEqual, Some(value.into()))
    }

    /// Generic filter entry point used by CLI argument parsing
    pub fn filter(
        self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: Option<FilterValue>,
    ) -> Self {
        self.push_filter(field, operator, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options.sort.push(SortCriteria {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn order_by_asc(self, field: impl Into<String>) -> Self {
        self.order_by(field, SortDirection::Asc)
    }

    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, SortDirection::Desc)
    }

    /// 1-based page; offsets are computed in `build`
    pub fn paginate(mut self, page: u32, page_size: u32) -> Self {
        self.options.page = Some(page);
        self.options.page_size = Some(page_size);
        self
    }

    /// Eager-load one or more relations. Duplicates are kept.
    pub fn with(mut self, relations: impl IntoRelations) -> Self {
        self.options.includes.extend(relations.into_relations());
        self
    }

    pub fn count(mut self, expression: impl Into<String>) -> Self {
        self.options.count = Some(expression.into());
        self
    }

    pub fn count_all(self) -> Self {
        self.count(DEFAULT_COUNT_EXPRESSION)
    }

    /// Fields that are sorted both ascending and descending.
    ///
    /// Both directives are still sent; the backend decides which one wins.
    pub fn conflicting_sorts(&self) -> Vec<String> {
        let mut conflicts: Vec<String> = Vec::new();
        for asc in self
            .options
            .sort
            .iter()
            .filter(|s| s.direction == SortDirection::Asc)
        {
            let also_desc = self
                .options
                .sort
                .iter()
                .any(|s| s.direction == SortDirection::Desc && s.field == asc.field);
            if also_desc && !conflicts.contains(&asc.field) {
                conflicts.push(asc.field.clone());
            }
        }
        conflicts
    }

    fn validate(&self) -> Result<(), QueryError> {
        if let Some(page) = self.options.page {
            if page == 0 {
                return Err(QueryError::InvalidPage { page });
            }
        }
        if let Some(page_size) = self.options.page_size {
            if page_size == 0 {
                return Err(QueryError::InvalidPageSize { page_size });
            }
        }
        for filter in &self.options.filters {
            if filter.field.trim().is_empty() {
                return Err(QueryError::EmptyField {
                    operator: filter.operator.to_string(),
                });
            }
            if filter.operator == FilterOperator::In {
                if let Some(FilterValue::List(values)) = &filter.value {
                    if values.is_empty() {
                        return Err(QueryError::EmptyInList {
                            field: filter.field.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize the accumulated options. Does not modify the builder.
    pub fn build(&self) -> Result<QueryParams, QueryError> {
        self.validate()?;

        let mut params = QueryParams::new();
        let options = &self.options;

        if let (Some(page), Some(page_size)) = (options.page, options.page_size) {
            let range_start = (i64::from(page) - 1) * i64::from(page_size);
            let range_end = range_start + i64::from(page_size) - 1;
            params.insert("rangeStart".to_string(), ParamValue::Number(range_start));
            params.insert("rangeEnd".to_string(), ParamValue::Number(range_end));
        }

        for filter in &options.filters {
            let key = format!("{}:{}", filter.field, filter.operator.as_str());
            let value = match (filter.operator, &filter.value) {
                (FilterOperator::IsNull | FilterOperator::IsNotNull, _) => ParamValue::Number(1),
                (_, Some(value)) => value.to_param(),
                (_, None) => ParamValue::Text(String::new()),
            };
            // Same field and operator twice: the later filter wins
            if let Some(previous) = params.insert(key.clone(), value) {
                log::debug!("Filter {} overrides earlier value {}", key, previous);
            }
        }

        let conflicts = self.conflicting_sorts();
        if !conflicts.is_empty() {
            log::warn!(
                "Fields sorted in both directions: {}",
                conflicts.join(", ")
            );
        }

        let join_fields = |direction: SortDirection| {
            options
                .sort
                .iter()
                .filter(|s| s.direction == direction)
                .map(|s| s.field.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        let asc = join_fields(SortDirection::Asc);
        let desc = join_fields(SortDirection::Desc);
        if !asc.is_empty() {
            params.insert("orderBy".to_string(), ParamValue::Text(asc));
        }
        if !desc.is_empty() {
            params.insert("orderByDesc".to_string(), ParamValue::Text(desc));
        }

        if !options.includes.is_empty() {
            params.insert(
                "eager".to_string(),
                ParamValue::Text(options.includes.join(",")),
            );
        }

        if let Some(count) = options.count.as_deref().filter(|c| !c.is_empty()) {
            params.insert("count".to_string(), ParamValue::Text(count.to_string()));
        }

        Ok(params)
    }
}
