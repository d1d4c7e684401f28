use crate::api::models::MemberStatus;
use crate::error::{AppError, CliError};
use crate::query::{FilterOperator, FilterValue, MemberQuery, QueryBuilder};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chms")]
#[command(about = "Command line client for the church management system API")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Bearer token of an existing session
    #[arg(long, global = true, env = "CHMS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Church members
    Members {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Fellowship groups
    Fellowships {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Offering envelopes
    Envelopes {
        #[command(subcommand)]
        command: EnvelopeCommands,
    },
    /// Service opportunities
    Opportunities {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// System users
    Users {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Roles and their permissions
    Roles {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Inspect the permissions of the current session
    Permissions {
        #[command(subcommand)]
        command: PermissionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Log in and print the session token
    Login {
        #[arg(long)]
        username: Option<String>,
    },
    /// End the session given with --token
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set a value of the active profile
    Set {
        /// api_url, timeout_seconds, page_size or default_profile
        key: String,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List records
    List(ListArgs),
    /// Show one record
    Get(GetArgs),
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List members
    List {
        #[command(flatten)]
        list: ListArgs,
        #[command(flatten)]
        member: MemberFilterArgs,
    },
    /// Show one member
    Get(GetArgs),
    /// Member count next to the fellowship list
    Overview,
}

#[derive(Subcommand, Debug)]
pub enum EnvelopeCommands {
    /// List envelopes
    List(ListArgs),
    /// Show one envelope
    Get(GetArgs),
    /// Hand an envelope to a member
    Assign { envelope_id: String, member_id: String },
    /// Take an envelope back
    Release { envelope_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PermissionCommands {
    /// Check a single action, e.g. member.create
    Check { action: String },
    /// Allowed actions, optionally of one resource
    List { resource: Option<String> },
    /// Every permission the system knows
    Catalog,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GetArgs {
    pub id: String,
    /// Relations to load with the record
    #[arg(long = "with", value_delimiter = ',')]
    pub with: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Defaults to the profile's page_size
    #[arg(long)]
    pub page_size: Option<u32>,
    /// field=value, or field:operator=value (operators: equals, notEquals,
    /// like, likeLower, in, gt, gte, lt, lte)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
    /// field=text, matches records whose field contains text
    #[arg(long)]
    pub search: Option<String>,
    /// Only records where the field is empty
    #[arg(long = "null")]
    pub null: Vec<String>,
    /// Sort ascending by field
    #[arg(long = "sort")]
    pub sort: Vec<String>,
    /// Sort descending by field
    #[arg(long = "desc")]
    pub desc: Vec<String>,
    /// Relations to load with each record
    #[arg(long = "with", value_delimiter = ',')]
    pub with: Vec<String>,
    /// Also fetch the total number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MemberFilterArgs {
    /// First name, or "First Last"
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub fellowship: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Only members without an envelope
    #[arg(long)]
    pub without_envelope: bool,
}

fn invalid(message: String) -> AppError {
    AppError::Cli(CliError::InvalidArguments(message))
}

fn parse_filter(raw: &str) -> Result<(String, FilterOperator, String), AppError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid(format!("filter '{}' must look like field=value", raw)))?;
    let (field, operator) = match key.split_once(':') {
        Some((field, op)) => (field, op.parse::<FilterOperator>().map_err(invalid)?),
        None => (key, FilterOperator::Equals),
    };
    if !operator.takes_value() {
        return Err(invalid(format!(
            "'{}' takes no value, use --null for null checks",
            operator
        )));
    }
    Ok((field.trim().to_string(), operator, value.to_string()))
}

impl ListArgs {
    pub fn page_size_or(&self, default_page_size: u32) -> u32 {
        self.page_size.unwrap_or(default_page_size)
    }

    /// Translate the flags into a query, applied on top of `base`
    pub fn apply(&self, base: QueryBuilder, default_page_size: u32) -> Result<QueryBuilder, AppError> {
        let mut builder = self.apply_filters(base)?;

        for field in &self.sort {
            builder = builder.order_by_asc(field.as_str());
        }
        for field in &self.desc {
            builder = builder.order_by_desc(field.as_str());
        }
        if !self.with.is_empty() {
            builder = builder.with(self.with.clone());
        }

        Ok(builder.paginate(self.page, self.page_size_or(default_page_size)))
    }

    /// Same filters as `apply` in count mode, without range, sort or relations
    pub fn count_query(&self, base: QueryBuilder) -> Result<QueryBuilder, AppError> {
        Ok(self.apply_filters(base)?.count_all())
    }

    fn apply_filters(&self, base: QueryBuilder) -> Result<QueryBuilder, AppError> {
        let mut builder = base;

        for raw in &self.filters {
            let (field, operator, value) = parse_filter(raw)?;
            builder = match operator {
                FilterOperator::In => builder.where_in(
                    field,
                    value.split(',').map(str::trim).filter(|v| !v.is_empty()).map(str::to_string),
                ),
                op => builder.filter(field, op, Some(FilterValue::from(value))),
            };
        }

        if let Some(search) = &self.search {
            let (field, term) = search
                .split_once('=')
                .ok_or_else(|| invalid(format!("search '{}' must look like field=text", search)))?;
            builder = builder.where_contains(field, term);
        }

        for field in &self.null {
            builder = builder.where_null(field.as_str());
        }
        Ok(builder)
    }
}

impl MemberFilterArgs {
    pub fn to_query(&self) -> Result<MemberQuery, AppError> {
        let mut query = MemberQuery::new();
        if let Some(name) = &self.name {
            query = query.search_name(name);
        }
        if let Some(fellowship) = &self.fellowship {
            query = query.in_fellowship(fellowship);
        }
        if let Some(status) = &self.status {
            query = query.status(status.parse::<MemberStatus>().map_err(invalid)?);
        }
        if self.without_envelope {
            query = query.without_envelope();
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ParamValue;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from([
            "chms", "fellowships", "list", "--page", "2", "--filter", "name:like=You%",
            "--desc", "createdAt", "--with", "members,leader",
        ])
        .unwrap();
        match cli.command {
            Commands::Fellowships {
                command: ResourceCommands::List(args),
            } => {
                assert_eq!(args.page, 2);
                assert_eq!(args.filters, vec!["name:like=You%".to_string()]);
                assert_eq!(args.with, vec!["members".to_string(), "leader".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_list_args_to_params() {
        let args = ListArgs {
            page: 3,
            page_size: None,
            filters: vec!["lastName=Smith".to_string(), "id:in=1, 2".to_string()],
            search: Some("email=example".to_string()),
            null: vec!["envelopeId".to_string()],
            sort: vec!["lastName".to_string()],
            desc: vec![],
            with: vec!["fellowship".to_string()],
            count: false,
        };
        let params = args.apply(QueryBuilder::new(), 10).unwrap().build().unwrap();

        assert_eq!(params["lastName:equals"], ParamValue::Text("Smith".to_string()));
        assert_eq!(params["id:in"], ParamValue::Text("1,2".to_string()));
        assert_eq!(params["email:likeLower"], ParamValue::Text("%example%".to_string()));
        assert_eq!(params["envelopeId:isNull"], ParamValue::Number(1));
        assert_eq!(params["orderBy"], ParamValue::Text("lastName".to_string()));
        assert_eq!(params["eager"], ParamValue::Text("fellowship".to_string()));
        assert_eq!(params["rangeStart"], ParamValue::Number(20));
        assert_eq!(params["rangeEnd"], ParamValue::Number(29));
    }

    #[test]
    fn test_count_query_keeps_filters_only() {
        let args = ListArgs {
            page: 3,
            page_size: Some(10),
            filters: vec!["lastName=Smith".to_string()],
            sort: vec!["lastName".to_string()],
            with: vec!["fellowship".to_string()],
            count: true,
            ..ListArgs::default()
        };
        let params = args.count_query(QueryBuilder::new()).unwrap().build().unwrap();

        assert_eq!(params["lastName:equals"], ParamValue::Text("Smith".to_string()));
        assert_eq!(params["count"], ParamValue::Text("*".to_string()));
        for key in ["rangeStart", "rangeEnd", "orderBy", "eager"] {
            assert!(!params.contains_key(key), "{} leaked into the count query", key);
        }
    }

    #[test]
    fn test_bad_filters_are_rejected() {
        assert!(parse_filter("lastName").is_err());
        assert!(parse_filter("lastName:contains=x").is_err());
        assert!(parse_filter("lastName:isNull=1").is_err());
        assert_eq!(
            parse_filter("age:gte=18").unwrap(),
            ("age".to_string(), FilterOperator::GreaterThanOrEqual, "18".to_string())
        );
    }

    #[test]
    fn test_member_filters() {
        let member = MemberFilterArgs {
            name: Some("Grace".to_string()),
            fellowship: None,
            status: Some("visitor".to_string()),
            without_envelope: true,
        };
        let params = member.to_query().unwrap().build().unwrap();
        assert_eq!(params["status:equals"], ParamValue::Text("visitor".to_string()));
        assert_eq!(params["envelopeId:isNull"], ParamValue::Number(1));

        let bad = MemberFilterArgs {
            status: Some("retired".to_string()),
            ..MemberFilterArgs::default()
        };
        assert!(bad.to_query().is_err());
    }
}
