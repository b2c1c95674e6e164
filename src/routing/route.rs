//! Route definitions.
//!
//! A route binds a path template to a callback, optionally constrained by
//! allowed methods and a base URL, and carries predefined arguments for the
//! dispatch layer.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::error::RouterError;
use crate::routing::path::PathTemplate;

/// The action a route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callback {
    /// A free function registered under a name.
    Function(String),
    /// A method on a component (controller) identified by name.
    Method { component: String, method: String },
}

impl Callback {
    pub fn function(name: impl Into<String>) -> Self {
        Callback::Function(name.into())
    }

    pub fn method(component: impl Into<String>, method: impl Into<String>) -> Self {
        Callback::Method {
            component: component.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Function(name) => write!(f, "{}()", name),
            Callback::Method { component, method } => write!(f, "{}::{}()", component, method),
        }
    }
}

/// An argument resolved at dispatch time by a typed resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyArgument {
    /// Resolver type, e.g. `route`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl DependencyArgument {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }
}

/// A predefined (or bound) route argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteArgument {
    Scalar(String),
    Dependency(DependencyArgument),
}

impl RouteArgument {
    pub fn scalar(value: impl Into<String>) -> Self {
        RouteArgument::Scalar(value.into())
    }

    /// The literal value, if this argument needs no resolution.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RouteArgument::Scalar(value) => Some(value),
            RouteArgument::Dependency(_) => None,
        }
    }
}

/// A path template bound to a callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RouteRecord", into = "RouteRecord")]
pub struct Route {
    template: PathTemplate,
    callback: Callback,
    id: Option<String>,
    allowed_methods: BTreeSet<String>,
    dynamic: bool,
    predefined_arguments: Vec<(String, RouteArgument)>,
    locale: Option<String>,
    base_url: Option<String>,
    source: Option<String>,
}

impl Route {
    /// Create an unconstrained route.
    pub fn new(path: &str, callback: Callback) -> Result<Self, RouterError> {
        Self::builder(path, callback).build()
    }

    pub fn builder(path: impl Into<String>, callback: Callback) -> RouteBuilder {
        RouteBuilder::new(path, callback)
    }

    /// Reopen this route for modification; `build` validates again.
    pub fn into_builder(self) -> RouteBuilder {
        RouteBuilder {
            path: self.template.as_str().to_string(),
            callback: self.callback,
            id: self.id,
            methods: self.allowed_methods.into_iter().collect(),
            dynamic: self.dynamic,
            arguments: self.predefined_arguments,
            locale: self.locale,
            base_url: self.base_url,
            source: self.source,
        }
    }

    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Upper-cased methods; empty means every method is allowed.
    pub fn allowed_methods(&self) -> &BTreeSet<String> {
        &self.allowed_methods
    }

    /// Whether the route accepts the given (upper-cased) method.
    pub fn allows_method(&self, method: &str) -> bool {
        self.allowed_methods.is_empty() || self.allowed_methods.contains(method)
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn predefined_arguments(&self) -> &[(String, RouteArgument)] {
        &self.predefined_arguments
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Tag of the IO that defined this route.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Two routes conflict when they share an id, or share path, base URL
    /// and method set. A container holds at most one of a conflicting pair.
    pub fn conflicts_with(&self, other: &Route) -> bool {
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            if a == b {
                return true;
            }
        }
        self.template == other.template
            && self.base_url == other.base_url
            && self.allowed_methods == other.allowed_methods
    }
}

// `source` is bookkeeping, not part of a route's identity.
impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
            && self.callback == other.callback
            && self.id == other.id
            && self.allowed_methods == other.allowed_methods
            && self.dynamic == other.dynamic
            && self.predefined_arguments == other.predefined_arguments
            && self.locale == other.locale
            && self.base_url == other.base_url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.template, self.callback)?;
        if !self.allowed_methods.is_empty() {
            let methods: Vec<&str> = self.allowed_methods.iter().map(String::as_str).collect();
            write!(f, " [{}]", methods.join("|"))?;
        }
        if let Some(id) = &self.id {
            write!(f, " #{}", id)?;
        }
        Ok(())
    }
}

/// Validating builder for [`Route`].
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    path: String,
    callback: Callback,
    id: Option<String>,
    methods: Vec<String>,
    dynamic: bool,
    arguments: Vec<(String, RouteArgument)>,
    locale: Option<String>,
    base_url: Option<String>,
    source: Option<String>,
}

impl RouteBuilder {
    pub fn new(path: impl Into<String>, callback: Callback) -> Self {
        Self {
            path: path.into(),
            callback,
            id: None,
            methods: Vec::new(),
            dynamic: false,
            arguments: Vec::new(),
            locale: None,
            base_url: None,
            source: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Add a predefined argument; a later argument with the same name replaces it.
    pub fn argument(mut self, name: impl Into<String>, argument: RouteArgument) -> Self {
        let name = name.into();
        match self.arguments.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = argument,
            None => self.arguments.push((name, argument)),
        }
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn build(self) -> Result<Route, RouterError> {
        let template = PathTemplate::parse(&self.path)?;

        let mut allowed_methods = BTreeSet::new();
        for method in self.methods {
            allowed_methods.insert(normalize_method(&method)?);
        }

        let base_url = match self.base_url {
            Some(base) => Some(validate_base_url(&base)?),
            None => None,
        };

        Ok(Route {
            template,
            callback: self.callback,
            id: self.id.filter(|id| !id.is_empty()),
            allowed_methods,
            dynamic: self.dynamic,
            predefined_arguments: self.arguments,
            locale: self.locale.filter(|l| !l.is_empty()),
            base_url,
            source: self.source,
        })
    }
}

/// Upper-case a method and check it is an HTTP token.
pub fn normalize_method(method: &str) -> Result<String, RouterError> {
    let method = method.trim();
    let is_token = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c));
    if !is_token {
        return Err(RouterError::InvalidMethod(method.to_string()));
    }
    Ok(method.to_ascii_uppercase())
}

fn validate_base_url(base: &str) -> Result<String, RouterError> {
    let trimmed = base.trim_end_matches('/');
    url::Url::parse(trimmed).map_err(|e| RouterError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Flat serde form of a route; deserializing validates through the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub path: String,
    pub callback: Callback,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<(String, RouteArgument)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<Route> for RouteRecord {
    fn from(route: Route) -> Self {
        Self {
            path: route.template.as_str().to_string(),
            callback: route.callback,
            id: route.id,
            methods: route.allowed_methods.into_iter().collect(),
            dynamic: route.dynamic,
            arguments: route.predefined_arguments,
            locale: route.locale,
            base_url: route.base_url,
            source: route.source,
        }
    }
}

impl TryFrom<RouteRecord> for Route {
    type Error = RouterError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let mut builder = RouteBuilder::new(record.path, record.callback)
            .methods(record.methods)
            .dynamic(record.dynamic);
        builder.id = record.id;
        builder.arguments = record.arguments;
        builder.locale = record.locale;
        builder.base_url = record.base_url;
        builder.source = record.source;
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalizes() {
        let route = Route::builder("/user/{id}/", Callback::method("UserController", "show"))
            .id("user")
            .methods(["get", "Post"])
            .base_url("https://example.com/")
            .build()
            .unwrap();

        assert_eq!(route.path(), "/user/{id}");
        assert_eq!(route.id(), Some("user"));
        assert!(route.allows_method("GET"));
        assert!(route.allows_method("POST"));
        assert!(!route.allows_method("DELETE"));
        assert_eq!(route.base_url(), Some("https://example.com"));
    }

    #[test]
    fn test_builder_rejects_invalid_input() {
        assert!(Route::new("no-slash", Callback::function("f")).is_err());
        assert!(matches!(
            Route::builder("/", Callback::function("f")).method("GE T").build(),
            Err(RouterError::InvalidMethod(_))
        ));
        assert!(matches!(
            Route::builder("/", Callback::function("f")).base_url("not a url").build(),
            Err(RouterError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_unrestricted_route_allows_everything() {
        let route = Route::new("/", Callback::function("home")).unwrap();
        assert!(route.allows_method("PATCH"));
    }

    #[test]
    fn test_equality_ignores_source() {
        let a = Route::builder("/a", Callback::function("f")).source("parser").build().unwrap();
        let b = Route::builder("/a", Callback::function("f")).build().unwrap();
        assert_eq!(a, b);

        let c = Route::builder("/a", Callback::function("g")).build().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_conflicts() {
        let get = Route::builder("/x", Callback::function("f")).method("GET").build().unwrap();
        let post = Route::builder("/x", Callback::function("g")).method("POST").build().unwrap();
        let get_again = Route::builder("/x/", Callback::function("h")).method("get").build().unwrap();
        assert!(!get.conflicts_with(&post));
        assert!(get.conflicts_with(&get_again));

        let a = Route::builder("/a", Callback::function("f")).id("same").build().unwrap();
        let b = Route::builder("/b", Callback::function("f")).id("same").build().unwrap();
        assert!(a.conflicts_with(&b));
    }

    #[test]
    fn test_argument_replaces_same_name() {
        let route = Route::builder("/", Callback::function("f"))
            .argument("page", RouteArgument::scalar("1"))
            .argument("page", RouteArgument::scalar("2"))
            .build()
            .unwrap();
        assert_eq!(route.predefined_arguments().len(), 1);
        assert_eq!(route.predefined_arguments()[0].1.as_scalar(), Some("2"));
    }

    #[test]
    fn test_serde_validates() {
        let route = Route::builder("/files", Callback::function("serve"))
            .dynamic(true)
            .argument("root", RouteArgument::scalar("/srv"))
            .source("parser")
            .build()
            .unwrap();
        let json = serde_json::to_string(&route).unwrap();
        let back: Route = serde_json::from_str(&json).unwrap();
        assert_eq!(back, route);
        assert_eq!(back.source(), Some("parser"));

        let broken = r#"{"path":"/{x","callback":{"function":"f"}}"#;
        assert!(serde_json::from_str::<Route>(broken).is_err());
    }
}
