use crate::api::ChmsClient;
use crate::api::client::DEFAULT_TIMEOUT_SECS;
use crate::api::models::{Envelope, Fellowship, Member, Opportunity, Role, User};
use crate::cli::main_types::{
    AuthCommands, Commands, ConfigCommands, EnvelopeCommands, GetArgs, ListArgs, MemberCommands,
    PermissionCommands, ResourceCommands,
};
use crate::core::async_state::{
    AsyncState, Callback, MapOptions, MultiMapOptions, QuerySnapshot, StateContext,
    UnauthorizedActions, map_multi_to_async_state, map_to_async_state,
};
use crate::core::auth::LoginInput;
use crate::core::permissions::{
    ActionType, CustomAction, Permission, PermissionsManager, ResourceType, permission_catalog,
};
use crate::core::query_client::{QueryClient, query_key};
use crate::core::services::{AuthService, Endpoint, EnvelopeManager, ResourceManager};
use crate::core::session::{Session, SessionStore};
use crate::display::{PermissionRow, TableDisplay, TableRow, exit_code, render_state};
use crate::error::{AppError, CliError};
use crate::query::{QueryBuilder, QueryParams, ResourceQuery};
use crate::storage::config::{Config, Profile};
use crate::utils::logging::VerboseLogger;
use crate::utils::validation::validate_token;
use std::path::PathBuf;

/// Exit code of a successful command
pub const EXIT_OK: i32 = 0;
/// Exit code when the session lacks a permission
pub const EXIT_DENIED: i32 = 3;

/// Outcome of restoring the `--token` session
enum Connection {
    Ready(ChmsClient, PermissionsManager),
    /// The server rejected the token; its state was printed with this exit code
    Rejected(i32),
}

/// Restore the session or leave the command with the rejection's exit code
macro_rules! connect_or_exit {
    ($dispatcher:expr) => {
        match $dispatcher.connect().await? {
            Connection::Ready(client, permissions) => (client, permissions),
            Connection::Rejected(code) => return Ok(code),
        }
    };
}

/// Payload of `members overview`
#[derive(Debug, Clone)]
struct MemberOverview {
    member_count: u64,
    fellowships: Vec<Fellowship>,
}

/// Context whose error classifier turns local permission refusals into
/// `Unauthorized` instead of a generic error
fn view_context<'a, S>(resource: &str, required: &[Permission]) -> StateContext<'a, S> {
    StateContext::new(resource)
        .loading_message(format!("Loading {}...", resource))
        .required_permissions(required.iter())
        .classify_error(|error| match error {
            AppError::Permission(denied) => Some(AsyncState::Unauthorized {
                message: format!("You are not allowed to perform '{}'", denied.action),
                required_permissions: vec![denied.action.clone()],
                actions: UnauthorizedActions::default(),
            }),
            _ => None,
        })
}

pub struct Dispatcher {
    config: Config,
    config_path: PathBuf,
    profile_name: String,
    profile: Profile,
    token: Option<String>,
    logger: VerboseLogger,
    display: TableDisplay,
    queries: QueryClient,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        requested_profile: Option<String>,
        token: Option<String>,
        verbose: bool,
    ) -> Result<Self, AppError> {
        let profile = config.resolve_profile(requested_profile.as_deref())?;
        let profile_name = config.active_profile_name(requested_profile.as_deref());
        let logger = VerboseLogger::new(verbose);
        logger.log(&format!("Using profile '{}' ({})", profile_name, profile.api_url));

        Ok(Self {
            config,
            config_path,
            profile_name,
            profile,
            token: token.filter(|t| !t.is_empty()),
            logger,
            display: TableDisplay::new(),
            queries: QueryClient::default(),
        })
    }

    pub fn with_display(mut self, display: TableDisplay) -> Self {
        self.display = display;
        self
    }

    fn client(&self, session: SessionStore) -> Result<ChmsClient, AppError> {
        let timeout = self.profile.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(ChmsClient::with_timeout(
            self.profile.api_url.clone(),
            session,
            timeout,
        )?)
    }

    fn require_token(&self) -> Result<&str, AppError> {
        let token = self.token.as_deref().ok_or_else(|| {
            AppError::Cli(CliError::AuthRequired {
                message: "No session token given".to_string(),
                hint: "Run 'chms auth login' and export CHMS_API_TOKEN".to_string(),
            })
        })?;
        validate_token(token)?;
        Ok(token)
    }

    /// Restore the session of `--token` and hand out a client bound to it
    async fn connect(&self) -> Result<Connection, AppError> {
        let token = self.require_token()?;
        let session = SessionStore::new();
        let client = self.client(session.clone())?;
        match AuthService::new(client.clone())
            .restore(token.to_string())
            .await
        {
            Ok(user) => {
                self.logger
                    .log_with_prefix("auth", &format!("session of {}", user.display_name()));
                Ok(Connection::Ready(client, PermissionsManager::new(session)))
            }
            Err(error) => Ok(Connection::Rejected(self.session_rejected(error)?)),
        }
    }

    /// Print a 401/403 from session restore as a view state; other errors pass through
    fn session_rejected(&self, error: AppError) -> Result<i32, AppError> {
        if !matches!(error.status_code(), Some(401 | 403)) {
            return Err(error);
        }
        let snapshot: QuerySnapshot<()> = QuerySnapshot::failure(error, Callback::noop());
        let state = map_to_async_state(&snapshot, MapOptions::new(StateContext::new("session")));
        Ok(self.print_state(&state, |_| String::new()))
    }

    fn print_state<T>(&self, state: &AsyncState<T>, render: impl FnOnce(&T) -> String) -> i32 {
        let output = render_state(state, render);
        if state.is_success() {
            println!("{}", output);
        } else {
            eprintln!("{}", output);
        }
        exit_code(state)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<i32, AppError> {
        match command {
            Commands::Auth { command } => self.handle_auth_command(command).await,
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Members { command } => self.handle_member_command(command).await,
            Commands::Fellowships { command } => self.handle_resource::<Fellowship>(command).await,
            Commands::Envelopes { command } => self.handle_envelope_command(command).await,
            Commands::Opportunities { command } => {
                self.handle_resource::<Opportunity>(command).await
            }
            Commands::Users { command } => self.handle_resource::<User>(command).await,
            Commands::Roles { command } => self.handle_resource::<Role>(command).await,
            Commands::Permissions { command } => self.handle_permission_command(command).await,
        }
    }

    async fn handle_auth_command(&self, command: AuthCommands) -> Result<i32, AppError> {
        match command {
            AuthCommands::Login { username } => {
                self.logger.log("Attempting auth login command");
                let input = LoginInput::collect(username.as_deref())?;
                let session = SessionStore::new();
                let user = AuthService::new(self.client(session.clone())?)
                    .login(input)
                    .await?;

                println!("✅ Logged in as {}", user.display_name());
                if let Some(token) = session.token() {
                    println!("Use this session in later commands with:");
                    println!("  export CHMS_API_TOKEN={}", token);
                }
                Ok(EXIT_OK)
            }
            AuthCommands::Logout => {
                self.logger.log("Attempting auth logout command");
                let Some(token) = self.token.clone() else {
                    println!("Not logged in");
                    return Ok(EXIT_OK);
                };
                let session = SessionStore::with_session(Session::token_only(token));
                AuthService::new(self.client(session)?).logout().await?;
                println!("✅ Logged out");
                Ok(EXIT_OK)
            }
            AuthCommands::Status => {
                self.logger.log("Attempting auth status command");
                println!("Profile: {} ({})", self.profile_name, self.profile.api_url);

                let Some(token) = self.token.clone() else {
                    println!("Not authenticated");
                    return Ok(EXIT_OK);
                };

                let session = SessionStore::new();
                let service = AuthService::new(self.client(session)?);
                if let Err(error) = service.restore(token).await {
                    return self.session_rejected(error);
                }
                let status = service.status();

                if let Some(user) = &status.user {
                    println!("User: {} <{}>", user.display_name(), user.email);
                    if let Some(role) = &user.role {
                        println!("Role: {}", role.name);
                    }
                }
                println!("Allowed actions: {}", status.allowed_actions);
                println!("Administrator: {}", if status.is_admin { "yes" } else { "no" });
                Ok(EXIT_OK)
            }
        }
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<i32, AppError> {
        match command {
            ConfigCommands::Show => {
                println!("Config file: {}", self.config_path.display());
                println!(
                    "Default profile: {}",
                    self.config.default_profile.as_deref().unwrap_or("(not set)")
                );
                if self.config.profiles.is_empty() {
                    println!("No profiles configured");
                }
                for (name, profile) in &self.config.profiles {
                    let marker = if *name == self.profile_name { "*" } else { " " };
                    println!("{} [{}]", marker, name);
                    println!("    api_url: {}", profile.api_url);
                    if let Some(timeout) = profile.timeout_seconds {
                        println!("    timeout_seconds: {}", timeout);
                    }
                    println!("    page_size: {}", profile.page_size());
                }
                Ok(EXIT_OK)
            }
            ConfigCommands::Set { key, value } => {
                self.logger
                    .log(&format!("Setting {} for profile {}", key, self.profile_name));
                let mut config = self.config.clone();
                config.set_value(&self.profile_name, &key, &value)?;
                config.save(&self.config_path)?;
                println!("✅ {} = {} (profile {})", key, value, self.profile_name);
                Ok(EXIT_OK)
            }
        }
    }

    async fn handle_member_command(&self, command: MemberCommands) -> Result<i32, AppError> {
        match command {
            MemberCommands::List { list, member } => {
                let base = ResourceQuery::<Member>::from(member.to_query()?).into_builder();
                self.list::<Member>(list, base).await
            }
            MemberCommands::Get(args) => self.get::<Member>(args).await,
            MemberCommands::Overview => self.members_overview().await,
        }
    }

    async fn handle_resource<R>(&self, command: ResourceCommands) -> Result<i32, AppError>
    where
        R: Endpoint + TableRow,
    {
        match command {
            ResourceCommands::List(args) => self.list::<R>(args, QueryBuilder::new()).await,
            ResourceCommands::Get(args) => self.get::<R>(args).await,
        }
    }

    async fn handle_envelope_command(&self, command: EnvelopeCommands) -> Result<i32, AppError> {
        match command {
            EnvelopeCommands::List(args) => self.list::<Envelope>(args, QueryBuilder::new()).await,
            EnvelopeCommands::Get(args) => self.get::<Envelope>(args).await,
            EnvelopeCommands::Assign {
                envelope_id,
                member_id,
            } => self.change_envelope(envelope_id, Some(member_id)).await,
            EnvelopeCommands::Release { envelope_id } => {
                self.change_envelope(envelope_id, None).await
            }
        }
    }

    async fn list<R>(&self, args: ListArgs, base: QueryBuilder) -> Result<i32, AppError>
    where
        R: Endpoint + TableRow,
    {
        let page_size = args.page_size_or(self.profile.page_size());
        let count_params = if args.count {
            Some(args.count_query(base.clone())?.build()?)
        } else {
            None
        };
        let params = args.apply(base, page_size)?.build()?;
        let (client, permissions) = connect_or_exit!(self);
        let manager: ResourceManager<R> = ResourceManager::rest(client, permissions);

        let key = query_key(R::RESOURCE.as_str(), &params);
        self.logger.log(&format!("Fetching {}", key));
        let snapshot = self
            .queries
            .fetch(&key, manager.find_all(&params), Callback::noop())
            .await;

        let total = match &count_params {
            Some(count_params) if snapshot.is_success => {
                match manager.count(count_params).await {
                    Ok(total) => Some(total),
                    Err(e) => {
                        log::warn!("Count of {} failed: {}", R::RESOURCE, e);
                        None
                    }
                }
            }
            _ => None,
        };

        let context = view_context(
            R::RESOURCE.as_str(),
            &[Permission::new(R::RESOURCE, ActionType::FindAll)],
        );
        let state = map_to_async_state(&snapshot, MapOptions::new(context));
        Ok(self.print_state(&state, |rows: &Vec<R>| {
            format!(
                "{}\n{}",
                self.display.render(rows),
                self.display.summary(rows.len(), args.page, page_size, total)
            )
        }))
    }

    async fn get<R>(&self, args: GetArgs) -> Result<i32, AppError>
    where
        R: Endpoint + TableRow,
    {
        let mut builder = QueryBuilder::new();
        if !args.with.is_empty() {
            builder = builder.with(args.with.clone());
        }
        let params = builder.build()?;
        let (client, permissions) = connect_or_exit!(self);
        let manager: ResourceManager<R> = ResourceManager::rest(client, permissions);

        let key = format!("{}/{}", R::RESOURCE, args.id);
        let snapshot = self
            .queries
            .fetch(&key, manager.find_one(&args.id, &params), Callback::noop())
            .await;

        let context = view_context(
            R::RESOURCE.as_str(),
            &[Permission::new(R::RESOURCE, ActionType::FindOne)],
        )
        .resource_id(args.id.clone());
        let state = map_to_async_state(&snapshot, MapOptions::new(context));
        Ok(self.print_state(&state, |record| self.display.render_record(record)))
    }

    async fn change_envelope(
        &self,
        envelope_id: String,
        member_id: Option<String>,
    ) -> Result<i32, AppError> {
        let (client, permissions) = connect_or_exit!(self);
        let manager: EnvelopeManager = ResourceManager::rest(client, permissions);
        let key = format!("{}/{}", ResourceType::Envelope, envelope_id);

        let (snapshot, required) = match &member_id {
            Some(member_id) => (
                self.queries
                    .fetch(&key, manager.assign(&envelope_id, member_id), Callback::noop())
                    .await,
                Permission::Custom(CustomAction::EnvelopeAssign),
            ),
            None => (
                self.queries
                    .fetch(&key, manager.release(&envelope_id), Callback::noop())
                    .await,
                Permission::Custom(CustomAction::EnvelopeRelease),
            ),
        };
        if snapshot.is_success {
            self.queries.invalidate(ResourceType::Envelope.as_str());
        }

        let context = view_context(ResourceType::Envelope.as_str(), &[required])
            .resource_id(envelope_id.clone());
        let state = map_to_async_state(&snapshot, MapOptions::new(context));
        Ok(self.print_state(&state, |envelope: &Envelope| {
            let headline = match &member_id {
                Some(member_id) => format!(
                    "✅ Envelope {} assigned to member {}",
                    envelope.envelope_number, member_id
                ),
                None => format!("✅ Envelope {} released", envelope.envelope_number),
            };
            format!("{}\n{}", headline, self.display.render_record(envelope))
        }))
    }

    async fn members_overview(&self) -> Result<i32, AppError> {
        let (client, permissions) = connect_or_exit!(self);
        let members: ResourceManager<Member> =
            ResourceManager::rest(client.clone(), permissions.clone());
        let fellowships: ResourceManager<Fellowship> = ResourceManager::rest(client, permissions);

        let count_params = QueryParams::new();
        let list_params = QueryBuilder::new().order_by_asc("name").build()?;
        let count_key = format!("{}/count", ResourceType::Member);
        let list_key = query_key(ResourceType::Fellowship.as_str(), &list_params);

        let (count, groups) = self
            .queries
            .fetch_pair(
                (count_key.as_str(), members.count(&count_params)),
                (list_key.as_str(), fellowships.find_all(&list_params)),
                Callback::noop(),
            )
            .await;

        let context = view_context(
            "overview",
            &[
                Permission::new(ResourceType::Member, ActionType::FindAll),
                Permission::new(ResourceType::Fellowship, ActionType::FindAll),
            ],
        );
        let options = MultiMapOptions::new(
            context,
            |(member_count, fellowships): (u64, Vec<Fellowship>), actions| AsyncState::Success {
                data: MemberOverview {
                    member_count,
                    fellowships,
                },
                actions,
            },
        );
        let state = map_multi_to_async_state((&count, &groups), options)?;

        Ok(self.print_state(&state, |overview| {
            format!(
                "Members: {}\nFellowships: {}\n{}",
                overview.member_count,
                overview.fellowships.len(),
                self.display.render(&overview.fellowships)
            )
        }))
    }

    async fn handle_permission_command(&self, command: PermissionCommands) -> Result<i32, AppError> {
        match command {
            PermissionCommands::Catalog => {
                let catalog = permission_catalog();
                println!("{}", self.display.render(&catalog));
                println!("{} permissions", catalog.len());
                Ok(EXIT_OK)
            }
            PermissionCommands::Check { action } => {
                if action.parse::<Permission>().is_err() {
                    log::warn!("'{}' is not in the permission catalog", action);
                }
                let (_, permissions) = connect_or_exit!(self);
                if permissions.can_perform_action(&action) {
                    println!("✅ {} is allowed", action);
                    Ok(EXIT_OK)
                } else {
                    println!("❌ {} is not allowed", action);
                    Ok(EXIT_DENIED)
                }
            }
            PermissionCommands::List { resource } => {
                let resource = resource
                    .map(|r| r.parse::<ResourceType>())
                    .transpose()
                    .map_err(|e| AppError::Cli(CliError::InvalidArguments(e)))?;
                let (_, permissions) = connect_or_exit!(self);

                let rows: Vec<PermissionRow> = permission_catalog()
                    .into_iter()
                    .filter(|p| resource.is_none_or(|r| p.resource() == r))
                    .map(|p| PermissionRow {
                        permission: p.to_string(),
                        allowed: permissions.can_perform_action(p),
                    })
                    .collect();
                println!("{}", self.display.render(&rows));

                if let Some(resource) = resource {
                    let granted = permissions.fetch_resource_permissions(resource.as_str());
                    println!("{} of {} granted on {}", granted.len(), rows.len(), resource);
                }
                println!(
                    "Administrator: {}",
                    if permissions.check_is_admin() { "yes" } else { "no" }
                );
                Ok(EXIT_OK)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher(dir: &std::path::Path, token: Option<&str>) -> Dispatcher {
        let path = dir.join("config.toml");
        let config = Config::load(&path).expect("config load failed");
        Dispatcher::new(config, path, None, token.map(str::to_string), false)
            .expect("dispatcher creation failed")
            .with_display(TableDisplay::new().with_colors(false).with_max_width(100))
    }

    fn dispatcher_for(server: &MockServer, dir: &std::path::Path) -> Dispatcher {
        let mut config = Config::default();
        config
            .set_value("default", "api_url", &server.uri())
            .expect("api_url rejected");
        Dispatcher::new(
            config,
            dir.join("config.toml"),
            None,
            Some("session-token".to_string()),
            false,
        )
        .expect("dispatcher creation failed")
        .with_display(TableDisplay::new().with_colors(false).with_max_width(100))
    }

    async fn mount_session(server: &MockServer, status: u16) {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_json(json!({
                "user": { "id": "u-1", "email": "clerk@example.org" },
                "allowedActions": ["fellowship.findAll"]
            }))
        } else {
            ResponseTemplate::new(status)
        };
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn fellowships_list(count: bool) -> Commands {
        Commands::Fellowships {
            command: ResourceCommands::List(ListArgs {
                page: 3,
                page_size: Some(10),
                filters: vec!["name=Youth".to_string()],
                sort: vec!["name".to_string()],
                count,
                ..ListArgs::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_rejected_token_exits_as_unauthenticated() {
        let server = MockServer::start().await;
        mount_session(&server, 401).await;
        Mock::given(method("GET"))
            .and(path("/fellowships"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempdir().expect("Failed to create temp dir");
        let d = dispatcher_for(&server, dir.path());

        assert_eq!(d.dispatch(fellowships_list(false)).await.unwrap(), EXIT_DENIED);
        let status = d
            .dispatch(Commands::Auth {
                command: AuthCommands::Status,
            })
            .await;
        assert_eq!(status.unwrap(), EXIT_DENIED);
    }

    #[tokio::test]
    async fn test_session_server_errors_stay_errors() {
        let server = MockServer::start().await;
        mount_session(&server, 500).await;

        let dir = tempdir().expect("Failed to create temp dir");
        let result = dispatcher_for(&server, dir.path())
            .dispatch(fellowships_list(false))
            .await;
        assert!(matches!(result, Err(AppError::Api(_))));
    }

    #[tokio::test]
    async fn test_count_request_carries_filters_without_range() {
        let server = MockServer::start().await;
        mount_session(&server, 200).await;
        Mock::given(method("GET"))
            .and(path("/fellowships"))
            .and(query_param("rangeStart", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "f-1", "name": "Youth" }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fellowships/count"))
            .and(query_param("name:equals", "Youth"))
            .and(query_param("count", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 21 })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().expect("Failed to create temp dir");
        let code = dispatcher_for(&server, dir.path())
            .dispatch(fellowships_list(true))
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);

        let requests = server.received_requests().await.expect("recording disabled");
        let count_request = requests
            .iter()
            .find(|r| r.url.path() == "/fellowships/count")
            .expect("count was not requested");
        let keys: Vec<String> = count_request
            .url
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .collect();
        assert!(!keys.iter().any(|k| k.starts_with("range") || k.starts_with("orderBy")));
    }

    #[tokio::test]
    async fn test_config_set_persists() {
        let dir = tempdir().expect("Failed to create temp dir");
        let d = dispatcher(dir.path(), None);

        let code = d
            .dispatch(Commands::Config {
                command: ConfigCommands::Set {
                    key: "page_size".to_string(),
                    value: "50".to_string(),
                },
            })
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);

        let saved = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.get_profile("default").unwrap().page_size(), 50);
    }

    #[tokio::test]
    async fn test_config_set_rejects_unknown_key() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = dispatcher(dir.path(), None)
            .dispatch(Commands::Config {
                command: ConfigCommands::Set {
                    key: "colour".to_string(),
                    value: "blue".to_string(),
                },
            })
            .await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_catalog_needs_no_session() {
        let dir = tempdir().expect("Failed to create temp dir");
        let code = dispatcher(dir.path(), None)
            .dispatch(Commands::Permissions {
                command: PermissionCommands::Catalog,
            })
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_listing_without_token_requires_auth() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = dispatcher(dir.path(), None)
            .dispatch(Commands::Fellowships {
                command: ResourceCommands::List(ListArgs {
                    page: 1,
                    ..ListArgs::default()
                }),
            })
            .await;
        assert!(matches!(
            result,
            Err(AppError::Cli(CliError::AuthRequired { .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_page_fails_before_network() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = dispatcher(dir.path(), Some("token"))
            .dispatch(Commands::Roles {
                command: ResourceCommands::List(ListArgs::default()),
            })
            .await;
        assert!(matches!(result, Err(AppError::Query(_))));
    }

    #[tokio::test]
    async fn test_auth_status_and_logout_without_token() {
        let dir = tempdir().expect("Failed to create temp dir");
        let d = dispatcher(dir.path(), None);
        let status = d
            .dispatch(Commands::Auth {
                command: AuthCommands::Status,
            })
            .await;
        assert_eq!(status.unwrap(), EXIT_OK);

        let logout = d
            .dispatch(Commands::Auth {
                command: AuthCommands::Logout,
            })
            .await;
        assert_eq!(logout.unwrap(), EXIT_OK);
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        let result = Dispatcher::new(
            Config::default(),
            path,
            Some("missing".to_string()),
            None,
            false,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
