use crate::core::async_state::AsyncState;

/// Text for a view state; `render_data` is only called on success
pub fn render_state<T>(state: &AsyncState<T>, render_data: impl FnOnce(&T) -> String) -> String {
    match state {
        AsyncState::Idle { message, .. } => message
            .clone()
            .unwrap_or_else(|| "Nothing has been requested yet".to_string()),
        AsyncState::Loading { message } => message
            .clone()
            .unwrap_or_else(|| "Loading...".to_string()),
        AsyncState::Error { error, message, .. } => {
            let mut lines = vec![format!("{} {}", error.severity().emoji(), message)];
            if let Some(hint) = error.troubleshooting_hint() {
                lines.push(format!("Hint: {}", hint));
            }
            lines.join("\n")
        }
        AsyncState::Unauthorized {
            message,
            required_permissions,
            ..
        } => {
            let mut lines = vec![format!("🚫 {}", message)];
            if !required_permissions.is_empty() {
                lines.push(format!(
                    "Required permissions: {}",
                    required_permissions.join(", ")
                ));
            }
            lines.push("Ask an administrator for access".to_string());
            lines.join("\n")
        }
        AsyncState::Unauthenticated { message, .. } => {
            format!("🔒 {}\nHint: run 'chms auth login' and pass the token with --token", message)
        }
        AsyncState::NotFound { message, .. } => format!("🔍 {}", message),
        AsyncState::Success { data, .. } => render_data(data),
    }
}

/// Process exit code for a settled state
pub fn exit_code<T>(state: &AsyncState<T>) -> i32 {
    match state {
        AsyncState::Success { .. } | AsyncState::Idle { .. } | AsyncState::Loading { .. } => 0,
        AsyncState::Unauthenticated { .. } | AsyncState::Unauthorized { .. } => 3,
        AsyncState::NotFound { .. } => 4,
        AsyncState::Error { .. } => 1,
    }
}
