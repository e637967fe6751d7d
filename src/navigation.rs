use std::fmt;
use std::sync::{Arc, Mutex};

/// Client-side destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Auth,
    Properties,
    PropertyDetails(String),
    Dashboard,
    Reports,
    Activity,
    Governance,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Properties => "/properties".to_string(),
            Route::PropertyDetails(id) => format!("/properties/{}", id),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Reports => "/reports".to_string(),
            Route::Activity => "/activity".to_string(),
            Route::Governance => "/governance".to_string(),
        }
    }

    /// Parses a path; unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let route = match trimmed {
            "" => Route::Home,
            "/auth" => Route::Auth,
            "/properties" => Route::Properties,
            "/dashboard" => Route::Dashboard,
            "/reports" => Route::Reports,
            "/activity" => Route::Activity,
            "/governance" => Route::Governance,
            other => {
                let id = other.strip_prefix("/properties/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Route::PropertyDetails(id.to_string())
            }
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receives navigation side effects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only remembers where it was sent.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!("Navigating to {}", route);
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/dashboard"), Some(Route::Dashboard));
        assert_eq!(
            Route::parse("/properties/6"),
            Some(Route::PropertyDetails("6".into()))
        );
        assert_eq!(Route::parse("/properties/6/edit"), None);
        assert_eq!(Route::parse("/nope"), None);
    }

    #[test]
    fn test_path_roundtrip() {
        let route = Route::PropertyDetails("3".into());
        assert_eq!(Route::parse(&route.path()), Some(route));
    }
}
