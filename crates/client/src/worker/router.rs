//! Request classification.
//!
//! First match wins:
//! 1. Path matches a network-only pattern -> [`RouteClass::NetworkOnly`]
//! 2. Origin differs from the app origin -> [`RouteClass::CrossOriginFallback`]
//! 3. Anything else -> [`RouteClass::ShellFirst`]

use regex::Regex;
use serde::Serialize;
use url::{Origin, Url};

use transit_core::{Error, Request};

/// Strategy class assigned to a request. Recomputed for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteClass {
    /// Live backend state; never read from or written to the cache.
    NetworkOnly,
    /// Third-party resource; network first, cache on failure.
    CrossOriginFallback,
    /// Same-origin app shell; cache first.
    ShellFirst,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::NetworkOnly => "network-only",
            RouteClass::CrossOriginFallback => "cross-origin-fallback",
            RouteClass::ShellFirst => "shell-first",
        }
    }
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies requests by path pattern and origin.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    origin: Origin,
    network_only: Vec<Regex>,
}

/// Compile a path pattern where `*` matches any run of characters.
fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    if pattern.is_empty() {
        return Err(Error::InvalidRoute("empty pattern".into()));
    }
    let source = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    Regex::new(&source).map_err(|e| Error::InvalidRoute(format!("{pattern}: {e}")))
}

impl RequestRouter {
    pub fn new(origin: &Url, network_only: &[String]) -> Result<Self, Error> {
        let network_only = network_only
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { origin: origin.origin(), network_only })
    }

    pub fn is_network_only(&self, path: &str) -> bool {
        self.network_only.iter().any(|re| re.is_match(path))
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    pub fn classify(&self, request: &Request) -> RouteClass {
        if self.is_network_only(request.url.path()) {
            RouteClass::NetworkOnly
        } else if !self.is_same_origin(&request.url) {
            RouteClass::CrossOriginFallback
        } else {
            RouteClass::ShellFirst
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> RequestRouter {
        let origin = Url::parse("https://transit.example").unwrap();
        RequestRouter::new(&origin, &["/api/*".to_string(), "/health".to_string()]).unwrap()
    }

    fn get(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_api_prefix_is_network_only() {
        let router = router();
        assert_eq!(router.classify(&get("https://transit.example/api/convert")), RouteClass::NetworkOnly);
        assert_eq!(router.classify(&get("https://transit.example/api/")), RouteClass::NetworkOnly);
    }

    #[test]
    fn test_health_is_exact_match() {
        let router = router();
        assert_eq!(router.classify(&get("https://transit.example/health")), RouteClass::NetworkOnly);
        assert_eq!(router.classify(&get("https://transit.example/healthz")), RouteClass::ShellFirst);
        assert_eq!(router.classify(&get("https://transit.example/api")), RouteClass::ShellFirst);
    }

    #[test]
    fn test_api_pattern_wins_over_origin() {
        let router = router();
        let request = get("https://backend.example/api/convert");
        assert_eq!(router.classify(&request), RouteClass::NetworkOnly);
        assert_eq!(router.classify(&get("https://backend.example/health")), RouteClass::NetworkOnly);
    }

    #[test]
    fn test_cross_origin() {
        let router = router();
        assert_eq!(router.classify(&get("https://cdn.example/lib.js")), RouteClass::CrossOriginFallback);
        assert_eq!(router.classify(&get("http://transit.example/")), RouteClass::CrossOriginFallback);
        assert_eq!(router.classify(&get("https://transit.example:8443/")), RouteClass::CrossOriginFallback);
    }

    #[test]
    fn test_same_origin_shell() {
        let router = router();
        assert_eq!(router.classify(&get("https://transit.example/")), RouteClass::ShellFirst);
        assert_eq!(router.classify(&get("https://transit.example/index.html?x=1")), RouteClass::ShellFirst);
    }

    #[test]
    fn test_pattern_metacharacters_are_literal() {
        let origin = Url::parse("https://transit.example").unwrap();
        let router = RequestRouter::new(&origin, &["/v1.0/*".to_string()]).unwrap();
        assert!(router.is_network_only("/v1.0/status"));
        assert!(!router.is_network_only("/v1x0/status"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let origin = Url::parse("https://transit.example").unwrap();
        assert!(matches!(RequestRouter::new(&origin, &[String::new()]), Err(Error::InvalidRoute(_))));
    }

    #[test]
    fn test_route_class_names() {
        assert_eq!(RouteClass::CrossOriginFallback.to_string(), "cross-origin-fallback");
        assert_eq!(serde_json::to_string(&RouteClass::ShellFirst).unwrap(), "\"shell-first\"");
    }
}
