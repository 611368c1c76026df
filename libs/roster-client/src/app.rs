//! Application state and the three user actions that drive it.
//!
//! Each action holds its own gate for as long as it runs; a second trigger of
//! the same action in that window returns [`ActionOutcome::Ignored`] without
//! touching the network. The refetch that follows a create is not a trigger:
//! it queues behind a running refresh and then loads again.

use std::fmt;

use tokio::sync::Mutex;

use roster_api::record::Student;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::form::StudentForm;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Checking,
    Testing,
    Connected,
    ApiError,
    HealthCheckFailed,
    ConnectionFailed,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Checking...",
            ConnectionStatus::Testing => "Testing...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::ApiError => "API Error",
            ConnectionStatus::HealthCheckFailed => "Health Check Failed",
            ConnectionStatus::ConnectionFailed => "Connection Failed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a front-end renders.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub students: Vec<Student>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub status: ConnectionStatus,
    pub form: StudentForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action ran and left an error message in the state.
    Failed,
    /// The same action was already running.
    Ignored,
}

pub struct ClientApp {
    api: ApiClient,
    state: Mutex<AppState>,
    refreshing: Mutex<()>,
    submitting: Mutex<()>,
    testing: Mutex<()>,
}

impl ClientApp {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(AppState::default()),
            refreshing: Mutex::new(()),
            submitting: Mutex::new(()),
            testing: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn stats(&self) -> Stats {
        Stats::from_students(&self.state.lock().await.students)
    }

    pub async fn set_form(&self, form: StudentForm) {
        self.state.lock().await.form = form;
    }

    /// Reload the list. On failure the previously loaded list stays.
    pub async fn refresh(&self) -> ActionOutcome {
        let Ok(_gate) = self.refreshing.try_lock() else {
            tracing::debug!("refresh already in flight");
            return ActionOutcome::Ignored;
        };
        self.load_students().await
    }

    /// Wait out any running refresh, then load the list again.
    async fn reload_after_write(&self) -> ActionOutcome {
        let _gate = self.refreshing.lock().await;
        self.load_students().await
    }

    async fn load_students(&self) -> ActionOutcome {
        {
            let mut st = self.state.lock().await;
            st.loading = true;
            st.error = None;
        }

        let result = self.api.list_students().await;

        let mut st = self.state.lock().await;
        st.loading = false;
        match result {
            Ok(env) if env.success => {
                st.students = env.data.unwrap_or_default();
                st.status = ConnectionStatus::Connected;
                ActionOutcome::Completed
            }
            Ok(_) => {
                st.error = Some("Failed to fetch students".to_string());
                st.status = ConnectionStatus::ApiError;
                ActionOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch students");
                st.error = Some(format!("Error: {}", refresh_reason(&e)));
                st.status = ConnectionStatus::ConnectionFailed;
                ActionOutcome::Failed
            }
        }
    }

    /// Validate the form, create the record, then reload the list.
    pub async fn submit(&self) -> ActionOutcome {
        let Ok(_gate) = self.submitting.try_lock() else {
            tracing::debug!("submit already in flight");
            return ActionOutcome::Ignored;
        };

        let new = {
            let mut st = self.state.lock().await;
            st.error = None;
            st.success = None;
            match st.form.to_new_student() {
                Ok(new) => {
                    st.loading = true;
                    new
                }
                Err(e) => {
                    st.error = Some(e.to_string());
                    return ActionOutcome::Failed;
                }
            }
        };

        let result = self.api.create_student(&new).await;

        {
            let mut st = self.state.lock().await;
            st.loading = false;
            match result {
                Ok(env) if env.success => {
                    st.success = Some("Student added successfully!".to_string());
                    st.form.clear();
                }
                Ok(env) => {
                    st.error = Some(env.message.unwrap_or_else(|| "Failed to add student".to_string()));
                    return ActionOutcome::Failed;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to add student");
                    st.error = Some(
                        e.server_message()
                            .unwrap_or("Error adding student")
                            .to_string(),
                    );
                    return ActionOutcome::Failed;
                }
            }
        }

        // A refresh already running may have read the list before the insert.
        self.reload_after_write().await;
        ActionOutcome::Completed
    }

    /// Probe the health endpoint and report the result.
    pub async fn test_connection(&self) -> ActionOutcome {
        let Ok(_gate) = self.testing.try_lock() else {
            tracing::debug!("connection test already in flight");
            return ActionOutcome::Ignored;
        };
        {
            let mut st = self.state.lock().await;
            st.error = None;
            st.success = None;
            st.status = ConnectionStatus::Testing;
        }

        let result = self.api.health().await;

        let mut st = self.state.lock().await;
        match result {
            Ok(report) if report.is_ok() => {
                st.success = Some("API connection successful!".to_string());
                st.status = ConnectionStatus::Connected;
                ActionOutcome::Completed
            }
            Ok(_) => {
                st.error = Some("API health check failed".to_string());
                st.status = ConnectionStatus::HealthCheckFailed;
                ActionOutcome::Failed
            }
            Err(e) => {
                st.error = Some(format!("Connection test failed: {e}"));
                st.status = ConnectionStatus::ConnectionFailed;
                ActionOutcome::Failed
            }
        }
    }
}

fn refresh_reason(e: &ClientError) -> String {
    match e.server_message() {
        Some(m) => m.to_string(),
        None => {
            let msg = e.to_string();
            if msg.is_empty() { "Connection failed".to_string() } else { msg }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::DEFAULT_TIMEOUT;

    use super::*;

    fn app() -> ClientApp {
        // Nothing listens here; tests below never reach the network.
        ClientApp::new(ApiClient::new("http://127.0.0.1:9/api", DEFAULT_TIMEOUT).unwrap())
    }

    #[test]
    fn labels() {
        assert_eq!(ConnectionStatus::default().label(), "Checking...");
        assert_eq!(ConnectionStatus::HealthCheckFailed.to_string(), "Health Check Failed");
    }

    #[tokio::test]
    async fn duplicate_trigger_is_ignored() {
        let app = app();
        let _r = app.refreshing.try_lock().unwrap();
        let _s = app.submitting.try_lock().unwrap();
        let _t = app.testing.try_lock().unwrap();

        assert_eq!(app.refresh().await, ActionOutcome::Ignored);
        assert_eq!(app.submit().await, ActionOutcome::Ignored);
        assert_eq!(app.test_connection().await, ActionOutcome::Ignored);
        assert_eq!(app.snapshot().await.status, ConnectionStatus::Checking);
    }

    #[tokio::test]
    async fn invalid_form_issues_no_request() {
        let app = app();
        app.set_form(StudentForm {
            name: "A".into(),
            email: "a@x.com".into(),
            branch: "CS".into(),
            marks: String::new(),
        })
        .await;

        assert_eq!(app.submit().await, ActionOutcome::Failed);
        let st = app.snapshot().await;
        assert_eq!(st.error.as_deref(), Some("All fields are required"));
        assert!(!st.loading);
        assert!(app.submitting.try_lock().is_ok());
    }

    #[test]
    fn refresh_prefers_server_message() {
        let api = ClientError::Api { status: 500, message: Some("Error fetching students".into()) };
        assert_eq!(refresh_reason(&api), "Error fetching students");

        let bare = ClientError::Api { status: 502, message: None };
        assert_eq!(refresh_reason(&bare), "Request failed with status code 502");
    }
}
