//! Route file schema.
//!
//! ```toml
//! [[routes]]
//! path = "/user/{id}"
//! controller = "UserController"
//! action = "show"
//! id = "user"
//! methods = ["GET"]
//!
//! [[routes]]
//! path = "/admin"
//! file = "admin.toml"
//!
//! [[aliases]]
//! path = "/user/1"
//! alias = "/me"
//! force = true
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::{Alias, Callback, DependencyArgument, Route, RouteArgument, RouteContainer};

/// Argument type that carries a literal in `properties.value`.
pub const SCALAR_TYPE: &str = "scalar";

/// Action used when a controller entry names none.
pub const DEFAULT_ACTION: &str = "index";

/// Contents of one route file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<AliasDefinition>,
}

impl RouteFile {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.aliases.is_empty()
    }
}

/// A route entry, or an include when `file` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDefinition {
    pub path: String,

    /// Route file to include, relative to this one, under `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Base URL constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasDefinition {
    pub path: String,
    pub alias: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

impl RouteDefinition {
    pub fn is_include(&self) -> bool {
        self.file.is_some()
    }

    /// Properties that may not accompany `file`.
    fn route_properties(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        let optional = [
            ("function", self.function.is_some()),
            ("controller", self.controller.is_some()),
            ("action", self.action.is_some()),
            ("id", self.id.is_some()),
            ("methods", !self.methods.is_empty()),
            ("dynamic", self.dynamic),
            ("locale", self.locale.is_some()),
            ("base", self.base.is_some()),
            ("arguments", !self.arguments.is_empty()),
        ];
        for (name, present) in optional {
            if present {
                set.push(name);
            }
        }
        set
    }

    /// Check an include entry carries nothing but `path` and `file`.
    pub fn validate_include(&self) -> Result<(), String> {
        let extra = self.route_properties();
        if extra.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "an include accepts only path and file (found {})",
                extra.join(", ")
            ))
        }
    }

    pub fn callback(&self) -> Result<Callback, String> {
        match (&self.function, &self.controller) {
            (Some(_), Some(_)) => Err("set either function or controller, not both".to_string()),
            (Some(function), None) => {
                if self.action.is_some() {
                    return Err("action requires a controller".to_string());
                }
                Ok(Callback::function(function.clone()))
            }
            (None, Some(controller)) => {
                let action = self.action.as_deref().unwrap_or(DEFAULT_ACTION);
                Ok(Callback::method(controller.clone(), action))
            }
            (None, None) => Err("no callback set, expected function or controller".to_string()),
        }
    }

    /// Build the route, prefixing its path with `prefix`.
    pub fn to_route(&self, container: &RouteContainer, prefix: &str) -> Result<Route, String> {
        let mut builder = container
            .create_route(format!("{}{}", prefix, self.path), self.callback()?)
            .methods(self.methods.iter().cloned())
            .dynamic(self.dynamic);

        if let Some(id) = &self.id {
            builder = builder.id(id.clone());
        }
        if let Some(locale) = &self.locale {
            builder = builder.locale(locale.clone());
        }
        if let Some(base) = &self.base {
            builder = builder.base_url(base.clone());
        }
        for argument in &self.arguments {
            builder = builder.argument(argument.name.clone(), argument.to_argument()?);
        }

        builder.build().map_err(|e| e.to_string())
    }

    pub fn from_route(route: &Route) -> Self {
        let (function, controller, action) = match route.callback() {
            Callback::Function(name) => (Some(name.clone()), None, None),
            Callback::Method { component, method } => {
                (None, Some(component.clone()), Some(method.clone()))
            }
        };

        Self {
            path: route.path().to_string(),
            file: None,
            function,
            controller,
            action,
            id: route.id().map(str::to_string),
            methods: route.allowed_methods().iter().cloned().collect(),
            dynamic: route.is_dynamic(),
            locale: route.locale().map(str::to_string),
            base: route.base_url().map(str::to_string),
            arguments: route
                .predefined_arguments()
                .iter()
                .map(|(name, argument)| ArgumentDefinition::from_argument(name, argument))
                .collect(),
        }
    }
}

impl ArgumentDefinition {
    pub fn to_argument(&self) -> Result<RouteArgument, String> {
        if self.kind != SCALAR_TYPE {
            return Ok(RouteArgument::Dependency(DependencyArgument {
                kind: self.kind.clone(),
                properties: self.properties.clone(),
            }));
        }

        match self.properties.get("value") {
            Some(serde_json::Value::String(value)) => Ok(RouteArgument::scalar(value.clone())),
            Some(serde_json::Value::Null) | None => Err(format!(
                "scalar argument '{}' needs a value property",
                self.name
            )),
            Some(other) => Ok(RouteArgument::scalar(other.to_string())),
        }
    }

    pub fn from_argument(name: &str, argument: &RouteArgument) -> Self {
        match argument {
            RouteArgument::Scalar(value) => Self {
                name: name.to_string(),
                kind: SCALAR_TYPE.to_string(),
                properties: BTreeMap::from([(
                    "value".to_string(),
                    serde_json::Value::String(value.clone()),
                )]),
            },
            RouteArgument::Dependency(dependency) => Self {
                name: name.to_string(),
                kind: dependency.kind.clone(),
                properties: dependency.properties.clone(),
            },
        }
    }
}

impl AliasDefinition {
    /// Both sides of an included alias live under the include prefix.
    pub fn to_alias(&self, container: &RouteContainer, prefix: &str) -> Result<Alias, String> {
        let path = format!("{}{}", prefix, self.path);
        let alias = format!("{}{}", prefix, self.alias);
        container
            .create_alias(&path, &alias, self.force)
            .map_err(|e| e.to_string())
    }

    pub fn from_alias(alias: &Alias) -> Self {
        Self {
            path: alias.path().to_string(),
            alias: alias.alias().to_string(),
            force: alias.is_forced(),
        }
    }
}
