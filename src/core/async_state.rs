//! Reduces request snapshots into a single view state.
//!
//! A [`QuerySnapshot`] is what a request layer knows about one request at a
//! point in time. [`map_to_async_state`] turns one snapshot into exactly one
//! [`AsyncState`]; [`map_multi_to_async_state`] does the same for a tuple of
//! snapshots that must all succeed before anything is shown.
//!
//! Precedence, first match wins:
//!
//! 1. refetching with local fallback data: `Success` from the fallback
//! 2. loading or refetching: `Loading`
//! 3. failed: custom classifier, then 401/403/404, then generic `Error`
//! 4. succeeded without data: `NotFound`
//! 5. succeeded: projection of the data
//! 6. otherwise: `Idle`

use crate::error::{ApiError, AppError, StateError};
use std::fmt;
use std::sync::Arc;

/// Cloneable action handed to the presentation layer
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl Default for Callback {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdleActions {
    pub initialize: Option<Callback>,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorActions {
    pub retry: Callback,
}

#[derive(Debug, Clone, Default)]
pub struct UnauthorizedActions {
    pub go_back: Callback,
    pub retry: Option<Callback>,
    pub request_access: Option<Callback>,
}

#[derive(Debug, Clone, Default)]
pub struct UnauthenticatedActions {
    pub login: Callback,
    pub retry: Option<Callback>,
}

#[derive(Debug, Clone, Default)]
pub struct NotFoundActions {
    pub go_back: Option<Callback>,
    pub go_to_list: Option<Callback>,
    pub retry: Callback,
}

#[derive(Debug, Clone, Default)]
pub struct SuccessActions {
    pub refresh: Option<Callback>,
}

/// One snapshot of a data-fetch lifecycle
#[derive(Debug, Clone)]
pub enum AsyncState<T> {
    Idle {
        message: Option<String>,
        actions: IdleActions,
    },
    Loading {
        message: Option<String>,
    },
    Error {
        error: Arc<AppError>,
        message: String,
        actions: ErrorActions,
    },
    Unauthorized {
        message: String,
        required_permissions: Vec<String>,
        actions: UnauthorizedActions,
    },
    Unauthenticated {
        message: String,
        actions: UnauthenticatedActions,
    },
    NotFound {
        message: String,
        resource_type: String,
        resource_id: Option<String>,
        actions: NotFoundActions,
    },
    Success {
        data: T,
        actions: SuccessActions,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Idle,
    Loading,
    Error,
    Unauthorized,
    Unauthenticated,
    NotFound,
    Success,
}

impl<T> AsyncState<T> {
    pub fn success(data: T) -> Self {
        AsyncState::Success {
            data,
            actions: SuccessActions::default(),
        }
    }

    pub fn tag(&self) -> StateTag {
        match self {
            AsyncState::Idle { .. } => StateTag::Idle,
            AsyncState::Loading { .. } => StateTag::Loading,
            AsyncState::Error { .. } => StateTag::Error,
            AsyncState::Unauthorized { .. } => StateTag::Unauthorized,
            AsyncState::Unauthenticated { .. } => StateTag::Unauthenticated,
            AsyncState::NotFound { .. } => StateTag::NotFound,
            AsyncState::Success { .. } => StateTag::Success,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AsyncState::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            AsyncState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Human-readable text of non-success states
    pub fn message(&self) -> Option<&str> {
        match self {
            AsyncState::Idle { message, .. } | AsyncState::Loading { message } => {
                message.as_deref()
            }
            AsyncState::Error { message, .. }
            | AsyncState::Unauthorized { message, .. }
            | AsyncState::Unauthenticated { message, .. }
            | AsyncState::NotFound { message, .. } => Some(message),
            AsyncState::Success { .. } => None,
        }
    }

    /// Retry action of the state, if it has one
    pub fn retry(&self) -> Option<&Callback> {
        match self {
            AsyncState::Error { actions, .. } => Some(&actions.retry),
            AsyncState::NotFound { actions, .. } => Some(&actions.retry),
            AsyncState::Unauthorized { actions, .. } => actions.retry.as_ref(),
            AsyncState::Unauthenticated { actions, .. } => actions.retry.as_ref(),
            AsyncState::Success { actions, .. } => actions.refresh.as_ref(),
            AsyncState::Idle { actions, .. } => actions.initialize.as_ref(),
            AsyncState::Loading { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncState<U> {
        match self {
            AsyncState::Idle { message, actions } => AsyncState::Idle { message, actions },
            AsyncState::Loading { message } => AsyncState::Loading { message },
            AsyncState::Error {
                error,
                message,
                actions,
            } => AsyncState::Error {
                error,
                message,
                actions,
            },
            AsyncState::Unauthorized {
                message,
                required_permissions,
                actions,
            } => AsyncState::Unauthorized {
                message,
                required_permissions,
                actions,
            },
            AsyncState::Unauthenticated { message, actions } => {
                AsyncState::Unauthenticated { message, actions }
            }
            AsyncState::NotFound {
                message,
                resource_type,
                resource_id,
                actions,
            } => AsyncState::NotFound {
                message,
                resource_type,
                resource_id,
                actions,
            },
            AsyncState::Success { data, actions } => AsyncState::Success {
                data: f(data),
                actions,
            },
        }
    }
}

/// Errors that may carry an HTTP status
pub trait StatusCoded {
    fn status_code(&self) -> Option<u16>;
}

impl StatusCoded for AppError {
    fn status_code(&self) -> Option<u16> {
        AppError::status_code(self)
    }
}

impl StatusCoded for ApiError {
    fn status_code(&self) -> Option<u16> {
        ApiError::status_code(self)
    }
}

/// What the request layer knows about one request
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub is_loading: bool,
    pub is_error: bool,
    pub is_success: bool,
    pub is_refetching: bool,
    pub error: Option<Arc<AppError>>,
    pub data: Option<T>,
    pub refetch: Callback,
}

impl<T> QuerySnapshot<T> {
    /// Not dispatched yet
    pub fn idle(refetch: Callback) -> Self {
        Self {
            is_loading: false,
            is_error: false,
            is_success: false,
            is_refetching: false,
            error: None,
            data: None,
            refetch,
        }
    }

    pub fn loading(refetch: Callback) -> Self {
        Self {
            is_loading: true,
            ..Self::idle(refetch)
        }
    }

    /// In flight again; `previous` is the payload of the last success
    pub fn refetching(previous: Option<T>, refetch: Callback) -> Self {
        Self {
            is_loading: previous.is_none(),
            is_success: previous.is_some(),
            is_refetching: true,
            data: previous,
            ..Self::idle(refetch)
        }
    }

    pub fn success(data: T, refetch: Callback) -> Self {
        Self {
            is_success: true,
            data: Some(data),
            ..Self::idle(refetch)
        }
    }

    /// Succeeded, but the backend returned no payload
    pub fn empty(refetch: Callback) -> Self {
        Self {
            is_success: true,
            ..Self::idle(refetch)
        }
    }

    pub fn failure(error: AppError, refetch: Callback) -> Self {
        Self {
            is_error: true,
            error: Some(Arc::new(error)),
            ..Self::idle(refetch)
        }
    }

    pub fn from_result(result: Result<T, AppError>, refetch: Callback) -> Self {
        match result {
            Ok(data) => Self::success(data, refetch),
            Err(error) => Self::failure(error, refetch),
        }
    }

    pub fn from_optional(result: Result<Option<T>, AppError>, refetch: Callback) -> Self {
        match result {
            Ok(Some(data)) => Self::success(data, refetch),
            Ok(None) => Self::empty(refetch),
            Err(error) => Self::failure(error, refetch),
        }
    }

    fn error_or_missing(&self) -> Arc<AppError> {
        self.error
            .clone()
            .unwrap_or_else(|| Arc::new(AppError::State(StateError::MissingError)))
    }
}

/// Navigation the presentation layer can offer from non-success states
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    pub go_back: Option<Callback>,
    pub go_to_list: Option<Callback>,
    pub login: Option<Callback>,
    pub request_access: Option<Callback>,
}

type ErrorClassifier<'a, S> = Box<dyn Fn(&AppError) -> Option<AsyncState<S>> + 'a>;
type Projection<'a, D, S> = Box<dyn FnOnce(D, SuccessActions) -> AsyncState<S> + 'a>;

/// Shared settings of the single and multi-source mappers
pub struct StateContext<'a, S> {
    pub loading_message: Option<String>,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub required_permissions: Vec<String>,
    pub navigation: Navigation,
    classify_error: Option<ErrorClassifier<'a, S>>,
}

impl<'a, S> StateContext<'a, S> {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            loading_message: None,
            resource_type: resource_type.into(),
            resource_id: None,
            required_permissions: Vec::new(),
            navigation: Navigation::default(),
            classify_error: None,
        }
    }

    pub fn loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = Some(message.into());
        self
    }

    pub fn resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn required_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        self.required_permissions = permissions.into_iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    /// Runs before the status-code classifier; `Some` overrides it entirely
    pub fn classify_error(
        mut self,
        classify: impl Fn(&AppError) -> Option<AsyncState<S>> + 'a,
    ) -> Self {
        self.classify_error = Some(Box::new(classify));
        self
    }

    fn loading<T>(&self) -> AsyncState<T> {
        AsyncState::Loading {
            message: self.loading_message.clone(),
        }
    }

    fn not_found(&self, retry: Callback) -> AsyncState<S> {
        let message = match &self.resource_id {
            Some(id) => format!("{} {} was not found", capitalize(&self.resource_type), id),
            None => format!("No {} data was found", self.resource_type),
        };
        AsyncState::NotFound {
            message,
            resource_type: self.resource_type.clone(),
            resource_id: self.resource_id.clone(),
            actions: NotFoundActions {
                go_back: self.navigation.go_back.clone(),
                go_to_list: self.navigation.go_to_list.clone(),
                retry,
            },
        }
    }

    fn classify(&self, error: Arc<AppError>, retry: Callback) -> AsyncState<S> {
        if let Some(classify) = &self.classify_error {
            if let Some(state) = classify(&error) {
                return state;
            }
        }

        match error.as_ref().status_code() {
            Some(401) => AsyncState::Unauthenticated {
                message: "Your session has expired. Please sign in again.".to_string(),
                actions: UnauthenticatedActions {
                    login: self.navigation.login.clone().unwrap_or_default(),
                    retry: Some(retry),
                },
            },
            Some(403) => AsyncState::Unauthorized {
                message: format!(
                    "You do not have permission to access this {}",
                    self.resource_type
                ),
                required_permissions: self.required_permissions.clone(),
                actions: UnauthorizedActions {
                    go_back: self.navigation.go_back.clone().unwrap_or_default(),
                    retry: Some(retry),
                    request_access: self.navigation.request_access.clone(),
                },
            },
            Some(404) => self.not_found(retry),
            _ => AsyncState::Error {
                message: error.to_string(),
                error,
                actions: ErrorActions { retry },
            },
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Options of [`map_to_async_state`]
pub struct MapOptions<'a, D, S = D> {
    pub context: StateContext<'a, S>,
    pub local_data: Option<D>,
    on_success: Projection<'a, D, S>,
}

impl<'a, D: 'a> MapOptions<'a, D, D> {
    /// Successful payloads are wrapped as they are
    pub fn new(context: StateContext<'a, D>) -> Self {
        Self {
            context,
            local_data: None,
            on_success: Box::new(|data, actions| AsyncState::Success { data, actions }),
        }
    }
}

impl<'a, D, S> MapOptions<'a, D, S> {
    /// Successful payloads go through `on_success`, which may build a richer
    /// view type or any other state
    pub fn projecting(
        context: StateContext<'a, S>,
        on_success: impl FnOnce(D, SuccessActions) -> AsyncState<S> + 'a,
    ) -> Self {
        Self {
            context,
            local_data: None,
            on_success: Box::new(on_success),
        }
    }

    /// Payload shown while a background refetch is running
    pub fn local_data(mut self, data: Option<D>) -> Self {
        self.local_data = data;
        self
    }
}

/// Options of [`map_multi_to_async_state`]; the combiner is mandatory
pub struct MultiMapOptions<'a, D, S> {
    pub context: StateContext<'a, S>,
    pub local_data: Option<D>,
    on_success: Projection<'a, D, S>,
}

impl<'a, D, S> MultiMapOptions<'a, D, S> {
    pub fn new(
        context: StateContext<'a, S>,
        on_success: impl FnOnce(D, SuccessActions) -> AsyncState<S> + 'a,
    ) -> Self {
        Self {
            context,
            local_data: None,
            on_success: Box::new(on_success),
        }
    }

    pub fn local_data(mut self, data: Option<D>) -> Self {
        self.local_data = data;
        self
    }
}

/// Reduce one request snapshot to a view state
pub fn map_to_async_state<D: Clone, S>(
    snapshot: &QuerySnapshot<D>,
    options: MapOptions<'_, D, S>,
) -> AsyncState<S> {
    let MapOptions {
        context,
        local_data,
        on_success,
    } = options;
    let retry = snapshot.refetch.clone();

    if snapshot.is_refetching {
        if let Some(cached) = local_data {
            return on_success(
                cached,
                SuccessActions {
                    refresh: Some(retry),
                },
            );
        }
    }

    if snapshot.is_loading || snapshot.is_refetching {
        return context.loading();
    }

    if snapshot.is_error {
        return context.classify(snapshot.error_or_missing(), retry);
    }

    if snapshot.is_success {
        return match snapshot.data.clone() {
            Some(data) => on_success(
                data,
                SuccessActions {
                    refresh: Some(retry),
                },
            ),
            None => context.not_found(retry),
        };
    }

    AsyncState::Idle {
        message: None,
        actions: IdleActions {
            initialize: Some(retry),
        },
    }
}

/// A fixed-size group of snapshots reduced together
pub trait SnapshotGroup {
    /// Payload tuple, in the same order as the snapshots
    type Data;

    fn len(&self) -> usize;
    fn any_loading(&self) -> bool;
    fn any_refetching(&self) -> bool;
    fn any_error(&self) -> bool;
    fn all_success(&self) -> bool;
    /// Error of the first failed snapshot by position
    fn first_error(&self) -> Option<Arc<AppError>>;
    fn data(&self) -> Result<Self::Data, StateError>;
    fn refetch_all(&self) -> Callback;
}

macro_rules! impl_snapshot_group {
    ($len:expr; $($T:ident => $idx:tt),+) => {
        impl<'s, $($T: Clone),+> SnapshotGroup for ($(&'s QuerySnapshot<$T>,)+) {
            type Data = ($($T,)+);

            fn len(&self) -> usize {
                $len
            }

            fn any_loading(&self) -> bool {
                false $(|| self.$idx.is_loading)+
            }

            fn any_refetching(&self) -> bool {
                false $(|| self.$idx.is_refetching)+
            }

            fn any_error(&self) -> bool {
                false $(|| self.$idx.is_error)+
            }

            fn all_success(&self) -> bool {
                true $(&& self.$idx.is_success)+
            }

            fn first_error(&self) -> Option<Arc<AppError>> {
                $(
                    if self.$idx.is_error {
                        return Some(self.$idx.error_or_missing());
                    }
                )+
                None
            }

            fn data(&self) -> Result<Self::Data, StateError> {
                Ok(($(
                    self.$idx
                        .data
                        .clone()
                        .ok_or(StateError::InconsistentSnapshot { index: $idx })?,
                )+))
            }

            fn refetch_all(&self) -> Callback {
                let callbacks = vec![$(self.$idx.refetch.clone()),+];
                Callback::new(move || {
                    for callback in &callbacks {
                        callback.call();
                    }
                })
            }
        }
    };
}

impl_snapshot_group!(1; A => 0);
impl_snapshot_group!(2; A => 0, B => 1);
impl_snapshot_group!(3; A => 0, B => 1, C => 2);
impl_snapshot_group!(4; A => 0, B => 1, C => 2, D => 3);

/// Reduce several snapshots into one view state.
///
/// Loading if any is loading, failed if any failed (the first by position is
/// classified), successful only when all succeeded. Fails with
/// `StateError::InconsistentSnapshot` when a snapshot claims success without
/// a payload.
pub fn map_multi_to_async_state<G: SnapshotGroup, S>(
    group: G,
    options: MultiMapOptions<'_, G::Data, S>,
) -> Result<AsyncState<S>, StateError> {
    let MultiMapOptions {
        context,
        local_data,
        on_success,
    } = options;
    let retry = group.refetch_all();

    if group.any_refetching() {
        if let Some(cached) = local_data {
            return Ok(on_success(
                cached,
                SuccessActions {
                    refresh: Some(retry),
                },
            ));
        }
    }

    if group.any_loading() || group.any_refetching() {
        return Ok(context.loading());
    }

    if group.any_error() {
        let error = group
            .first_error()
            .unwrap_or_else(|| Arc::new(AppError::State(StateError::MissingError)));
        return Ok(context.classify(error, retry));
    }

    if group.all_success() {
        let data = group.data()?;
        return Ok(on_success(
            data,
            SuccessActions {
                refresh: Some(retry),
            },
        ));
    }

    Ok(AsyncState::Idle {
        message: None,
        actions: IdleActions {
            initialize: Some(retry),
        },
    })
}
