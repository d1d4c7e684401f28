use crate::AppError;
use crate::api::ChmsClient;
use crate::api::models::CurrentUser;
use crate::core::auth::LoginInput;
use crate::core::permissions::PermissionsManager;
use crate::core::session::{Session, SessionStore};
use crate::error::ApiError;

/// Snapshot of the authentication state for `auth status`
#[derive(Debug, Clone, PartialEq)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub user: Option<CurrentUser>,
    pub allowed_actions: usize,
    pub is_admin: bool,
}

/// Login, session restore and logout against `/auth`
pub struct AuthService {
    client: ChmsClient,
}

impl AuthService {
    pub fn new(client: ChmsClient) -> Self {
        Self { client }
    }

    fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Authenticate and replace the whole session
    pub async fn login(&self, input: LoginInput) -> Result<CurrentUser, AppError> {
        input.validate()?;

        let response = self.client.login(&input.username, &input.password).await?;
        log::info!("Logged in as {}", response.user.email);
        self.session().login(Session::new(
            response.user.clone(),
            response.token,
            response.allowed_actions,
        ));
        Ok(response.user)
    }

    /// Rebuild the session of an existing token from `/auth/me`.
    /// The session is cleared again when the token is rejected.
    pub async fn restore(&self, token: String) -> Result<CurrentUser, AppError> {
        self.session().login(Session::token_only(token.clone()));

        match self.client.current_session().await {
            Ok(info) => {
                self.session()
                    .login(Session::new(info.user.clone(), token, info.allowed_actions));
                Ok(info.user)
            }
            Err(e) => {
                self.session().logout();
                Err(e.into())
            }
        }
    }

    /// End the session; local state is cleared even when the server call fails
    pub async fn logout(&self) -> Result<(), AppError> {
        if !self.session().is_authenticated() {
            return Ok(());
        }

        let result = self.client.logout().await;
        self.session().logout();

        match result {
            Ok(()) | Err(ApiError::Unauthorized { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn status(&self) -> AuthStatus {
        let session = self.session().snapshot();
        let permissions = PermissionsManager::new(self.session().clone());
        AuthStatus {
            is_authenticated: session.is_authenticated(),
            user: session.user.clone(),
            allowed_actions: session.allowed_actions.len(),
            is_admin: session.is_authenticated() && permissions.check_is_admin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let client = ChmsClient::new("http://127.0.0.1:9".to_string(), SessionStore::new())
            .expect("client creation failed");
        AuthService::new(client)
    }

    #[test]
    fn test_status_without_session() {
        let status = service().status();
        assert!(!status.is_authenticated);
        assert!(status.user.is_none());
        assert!(!status.is_admin);
    }

    #[tokio::test]
    async fn test_login_rejects_blank_credentials_locally() {
        let service = service();
        let result = service.login(LoginInput::new("", "secret")).await;
        assert!(matches!(result, Err(AppError::Cli(_))));
        assert!(!service.status().is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_without_session_is_noop() {
        assert!(service().logout().await.is_ok());
    }
}
