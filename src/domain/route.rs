// src/domain/route.rs
use std::fmt;

/// Every screen the application can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Home,
    Upload,
    /// Own profile when `None`.
    Profile(Option<String>),
    NoteDetail(String),
    Todos,
    /// Carries the raw address state (without the leading `?`).
    Explore(String),
    NotFound(String),
}

impl Route {
    pub fn parse(location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, ""),
        };
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] | [""] => Route::Home,
            ["login"] => Route::SignIn,
            ["register"] => Route::SignUp,
            ["upload"] => Route::Upload,
            ["profile"] => Route::Profile(None),
            ["profile", id] if !id.is_empty() => Route::Profile(Some(id.to_string())),
            ["note", id] if !id.is_empty() => Route::NoteDetail(id.to_string()),
            ["todo"] => Route::Todos,
            ["explore"] => Route::Explore(query.to_string()),
            _ => Route::NotFound(location.to_string()),
        }
    }

    /// Routes that need a signed-in user.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::SignIn | Route::SignUp | Route::NotFound(_))
    }

    pub fn is_auth_page(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::SignIn => f.write_str("/login"),
            Route::SignUp => f.write_str("/register"),
            Route::Home => f.write_str("/"),
            Route::Upload => f.write_str("/upload"),
            Route::Profile(None) => f.write_str("/profile"),
            Route::Profile(Some(id)) => write!(f, "/profile/{id}"),
            Route::NoteDetail(id) => write!(f, "/note/{id}"),
            Route::Todos => f.write_str("/todo"),
            Route::Explore(query) if query.is_empty() => f.write_str("/explore"),
            Route::Explore(query) => write!(f, "/explore?{query}"),
            Route::NotFound(location) => f.write_str(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_paths_when_parsing_then_maps_to_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::SignIn);
        assert_eq!(Route::parse("/register"), Route::SignUp);
        assert_eq!(Route::parse("/upload/"), Route::Upload);
        assert_eq!(Route::parse("/profile"), Route::Profile(None));
        assert_eq!(
            Route::parse("/profile/u42"),
            Route::Profile(Some("u42".to_string()))
        );
        assert_eq!(Route::parse("/note/n1"), Route::NoteDetail("n1".to_string()));
        assert_eq!(Route::parse("/todo"), Route::Todos);
    }

    #[test]
    fn given_explore_with_query_when_parsing_then_keeps_address_state() {
        let route = Route::parse("/explore?search=calculus&sortBy=popular");
        assert_eq!(
            route,
            Route::Explore("search=calculus&sortBy=popular".to_string())
        );
        assert_eq!(route.to_string(), "/explore?search=calculus&sortBy=popular");
    }

    #[test]
    fn given_unknown_path_when_parsing_then_not_found_and_public() {
        let route = Route::parse("/settings/advanced");
        assert_eq!(route, Route::NotFound("/settings/advanced".to_string()));
        assert!(!route.is_protected());
        assert!(Route::Home.is_protected());
        assert!(!Route::SignIn.is_protected());
    }
}
