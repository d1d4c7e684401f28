use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Comparison applied by a single filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Like,
    LikeLower,
    In,
    IsNull,
    IsNotNull,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl FilterOperator {
    /// Suffix used in the `<field>:<operator>` query key
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "notEquals",
            FilterOperator::Like => "like",
            FilterOperator::LikeLower => "likeLower",
            FilterOperator::In => "in",
            FilterOperator::IsNull => "isNull",
            FilterOperator::IsNotNull => "isNotNull",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::GreaterThanOrEqual => "gte",
            FilterOperator::LessThan => "lt",
            FilterOperator::LessThanOrEqual => "lte",
        }
    }

    /// Null checks are sent without a value
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 11] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Like,
        FilterOperator::LikeLower,
        FilterOperator::In,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
    ];
}

impl std::str::FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown filter operator '{}'", s))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value attached to a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl FilterValue {
    fn to_text(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Integer(n) => n.to_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::List(values) => values
                .iter()
                .map(FilterValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Convert into the value sent on the wire, joining lists with commas
    pub fn to_param(&self) -> ParamValue {
        match self {
            FilterValue::Integer(n) => ParamValue::Number(*n),
            other => ParamValue::Text(other.to_text()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::Text(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

macro_rules! impl_integer_filter_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::Integer(value as i64)
                }
            }
        )*
    };
}

impl_integer_filter_value!(i32, i64, u32, u16, u8);

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One predicate; all filters are AND-ed by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Option<FilterValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortCriteria {
    pub field: String,
    pub direction: SortDirection,
}

/// Everything a builder has accumulated so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filters: Vec<FilterCriteria>,
    pub sort: Vec<SortCriteria>,
    pub includes: Vec<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub count: Option<String>,
}

/// Query-string value; numbers stay numbers until the HTTP client encodes them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(i64),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value)
    }
}

/// Serialized query, keyed the way the backend expects
pub type QueryParams = BTreeMap<String, ParamValue>;

/// Relation names accepted by `with`: a single name or a list of them
pub trait IntoRelations {
    fn into_relations(self) -> Vec<String>;
}

impl IntoRelations for &str {
    fn into_relations(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoRelations for String {
    fn into_relations(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoRelations for Vec<String> {
    fn into_relations(self) -> Vec<String> {
        self
    }
}

impl IntoRelations for Vec<&str> {
    fn into_relations(self) -> Vec<String> {
        self.into_iter().map(String::from).collect()
    }
}

impl IntoRelations for &[&str] {
    fn into_relations(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoRelations for [&str; N] {
    fn into_relations(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}
