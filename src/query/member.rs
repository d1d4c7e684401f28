use super::fields::{MemberField, MemberRelation};
use super::resource::ResourceQuery;
use super::types::QueryParams;
use crate::api::models::{Member, MemberStatus};
use crate::error::QueryError;

/// Member query with the filters the member screens use most
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    inner: ResourceQuery<Member>,
}

impl MemberQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(self, f: impl FnOnce(ResourceQuery<Member>) -> ResourceQuery<Member>) -> Self {
        Self {
            inner: f(self.inner),
        }
    }

    /// Match first or last name, case-insensitively.
    ///
    /// Backend filters are AND-ed, so a single term is matched against the
    /// first name when it has no space and against both names otherwise.
    pub fn search_name(self, term: &str) -> Self {
        let term = term.trim();
        match term.split_once(' ') {
            Some((first, last)) => self.map(|q| {
                q.where_starts_with(MemberField::FirstName, first.trim())
                    .where_starts_with(MemberField::LastName, last.trim())
            }),
            None => self.map(|q| q.where_contains(MemberField::FirstName, term)),
        }
    }

    pub fn in_fellowship(self, fellowship_id: &str) -> Self {
        self.map(|q| q.where_eq(MemberField::FellowshipId, fellowship_id))
    }

    pub fn with_envelope(self) -> Self {
        self.map(|q| q.where_not_null(MemberField::EnvelopeId))
    }

    pub fn without_envelope(self) -> Self {
        self.map(|q| q.where_null(MemberField::EnvelopeId))
    }

    pub fn status(self, status: MemberStatus) -> Self {
        self.map(|q| q.where_eq(MemberField::Status, status.as_str()))
    }

    pub fn include_fellowship(self) -> Self {
        self.map(|q| q.with(MemberRelation::Fellowship))
    }

    pub fn alphabetical(self) -> Self {
        self.map(|q| {
            q.order_by_asc(MemberField::LastName)
                .order_by_asc(MemberField::FirstName)
        })
    }

    pub fn paginate(self, page: u32, page_size: u32) -> Self {
        self.map(|q| q.paginate(page, page_size))
    }

    /// Drop down to the field-checked builder for anything not covered here
    pub fn and(self, f: impl FnOnce(ResourceQuery<Member>) -> ResourceQuery<Member>) -> Self {
        self.map(f)
    }

    pub fn inner(&self) -> &ResourceQuery<Member> {
        &self.inner
    }

    pub fn build(&self) -> Result<QueryParams, QueryError> {
        self.inner.build()
    }
}

impl From<MemberQuery> for ResourceQuery<Member> {
    fn from(query: MemberQuery) -> Self {
        query.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::ParamValue;

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }

    #[test]
    fn test_search_single_term() {
        let params = MemberQuery::new().search_name(" grace ").build().unwrap();
        assert_eq!(params["firstName:likeLower"], text("%grace%"));
        assert!(!params.contains_key("lastName:likeLower"));
    }

    #[test]
    fn test_search_full_name() {
        let params = MemberQuery::new().search_name("Ada Love").build().unwrap();
        assert_eq!(params["firstName:likeLower"], text("Ada%"));
        assert_eq!(params["lastName:likeLower"], text("Love%"));
    }

    #[test]
    fn test_domain_helpers_compose() {
        let params = MemberQuery::new()
            .in_fellowship("f-1")
            .without_envelope()
            .status(MemberStatus::Active)
            .include_fellowship()
            .alphabetical()
            .paginate(1, 20)
            .build()
            .unwrap();

        assert_eq!(params["fellowshipId:equals"], text("f-1"));
        assert_eq!(params["envelopeId:isNull"], ParamValue::Number(1));
        assert_eq!(params["status:equals"], text("active"));
        assert_eq!(params["eager"], text("fellowship"));
        assert_eq!(params["orderBy"], text("lastName,firstName"));
        assert_eq!(params["rangeStart"], ParamValue::Number(0));
        assert_eq!(params["rangeEnd"], ParamValue::Number(19));
    }

    #[test]
    fn test_clone_keeps_member_query_type() {
        let base = MemberQuery::new().with_envelope();
        let narrowed: MemberQuery = base.clone().and(|q| q.where_gte(MemberField::JoinedOn, "2024-01-01"));
        assert_eq!(base.build().unwrap().len(), 1);
        assert_eq!(narrowed.build().unwrap().len(), 2);
    }
}
