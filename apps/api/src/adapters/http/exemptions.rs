//! Paths the authentication gate skips entirely.

/// Exact paths and path prefixes that never carry a principal.
///
/// Prefix matching is segment-aware: `/css` covers `/css` and `/css/site.css` but not
/// `/cssx`. Federation login endpoints `/auth/{provider}/login` and
/// `/auth/{provider}/login-url` are exempt for every provider segment.
#[derive(Debug, Clone)]
pub struct ExemptionPolicy {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

const DEFAULT_EXACT: &[&str] = &[
    "/",
    "/error",
    "/favicon.ico",
    "/health",
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/providers",
];

const DEFAULT_PREFIXES: &[&str] = &[
    "/swagger-ui",
    "/api-docs",
    "/v3/api-docs",
    "/actuator",
    "/admin/login",
    "/css",
    "/js",
    "/images",
    "/static",
    "/oauth2",
];

const FEDERATION_LOGIN_ACTIONS: &[&str] = &["login", "login-url"];

impl Default for ExemptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXACT, DEFAULT_PREFIXES)
    }
}

impl ExemptionPolicy {
    pub fn new(exact: &[&str], prefixes: &[&str]) -> Self {
        Self {
            exact: exact.iter().map(|p| p.to_string()).collect(),
            prefixes: prefixes
                .iter()
                .map(|p| p.trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|prefix| matches_prefix(path, prefix))
            || is_federation_login(path)
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// `/auth/{provider}/login` or `/auth/{provider}/login-url`
fn is_federation_login(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/auth/") else {
        return false;
    };
    let mut segments = rest.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(provider), Some(action), None) => {
            !provider.is_empty() && FEDERATION_LOGIN_ACTIONS.contains(&action)
        }
        _ => false,
    }
}
