//! Route files on disk.
//!
//! # Responsibilities
//! - Locate route files across module and application directories
//! - Parse them into one container, later files overriding earlier ones
//! - Write administrative changes back to the application route file
//!
//! # Design Decisions
//! - Read order: module base files (configured order), environment files
//!   (modules first, application last), application base file
//! - Only the application base file is ever written; its includes are
//!   flattened into it on write
//! - A write keeps only routes tagged with this IO's source that no other
//!   file already provides, so inherited routes are never duplicated

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::io::definition::{AliasDefinition, RouteDefinition, RouteFile};
use crate::io::error::IoError;
use crate::io::format::ConfigFormat;
use crate::io::{remove_if_exists, write_atomic, RouteContainerIo};
use crate::routing::RouteContainer;

/// Where route files live.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFileLayout {
    /// File name, e.g. `routes.toml`.
    pub file: String,
    /// Sub directory of each root holding the file, e.g. `config`.
    pub path: Option<PathBuf>,
    pub application_dir: PathBuf,
    pub module_dirs: Vec<PathBuf>,
    pub environment: Option<String>,
}

impl RouteFileLayout {
    pub fn new(application_dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: None,
            application_dir: application_dir.into(),
            module_dirs: Vec::new(),
            environment: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dirs.push(dir.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into()).filter(|e: &String| !e.is_empty());
        self
    }

    fn directory(&self, root: &Path) -> PathBuf {
        match &self.path {
            Some(path) => root.join(path),
            None => root.to_path_buf(),
        }
    }

    /// The only file writes go to.
    pub fn application_file(&self) -> PathBuf {
        self.directory(&self.application_dir).join(&self.file)
    }

    fn environment_file(&self, root: &Path) -> Option<PathBuf> {
        self.environment
            .as_ref()
            .map(|env| self.directory(root).join(env).join(&self.file))
    }

    /// Every candidate file in precedence order, lowest first.
    pub fn read_order(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .module_dirs
            .iter()
            .map(|dir| self.directory(dir).join(&self.file))
            .collect();

        files.extend(
            self.module_dirs
                .iter()
                .chain(std::iter::once(&self.application_dir))
                .filter_map(|dir| self.environment_file(dir)),
        );

        files.push(self.application_file());
        files
    }
}

/// Reads and writes route files.
#[derive(Debug)]
pub struct ParserRouteContainerIo {
    layout: RouteFileLayout,
    container: Mutex<Option<RouteContainer>>,
}

impl ParserRouteContainerIo {
    /// Source tag stamped on every route this IO reads.
    pub const SOURCE: &'static str = "parser";

    pub fn new(layout: RouteFileLayout) -> Self {
        Self {
            layout,
            container: Mutex::new(None),
        }
    }

    pub fn layout(&self) -> &RouteFileLayout {
        &self.layout
    }

    /// Route files that currently exist, in read order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.layout
            .read_order()
            .into_iter()
            .filter(|file| file.is_file())
            .collect()
    }

    fn read_files<'a>(&self, files: impl IntoIterator<Item = &'a PathBuf>) -> Result<RouteContainer, IoError> {
        let mut container = RouteContainer::with_source(Self::SOURCE);
        for file in files {
            let mut stack = Vec::new();
            read_file(&mut container, file, "", &mut stack)?;
        }
        Ok(container)
    }
}

impl RouteContainerIo for ParserRouteContainerIo {
    fn name(&self) -> &'static str {
        Self::SOURCE
    }

    fn route_container(&self) -> Result<RouteContainer, IoError> {
        let mut cached = self.container.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(container) = cached.as_ref() {
            return Ok(container.clone());
        }

        let files = self.files();
        let container = self.read_files(&files)?;
        tracing::debug!(
            files = files.len(),
            routes = container.len(),
            "Parsed route files"
        );

        *cached = Some(container.clone());
        Ok(container)
    }

    fn set_route_container(&self, container: &RouteContainer) -> Result<(), IoError> {
        let mut cached = self.container.lock().unwrap_or_else(PoisonError::into_inner);
        let target = self.layout.application_file();

        let inherited: Vec<PathBuf> = self.files().into_iter().filter(|f| *f != target).collect();
        let inherited = self.read_files(&inherited)?;

        let routes: Vec<RouteDefinition> = container
            .routes()
            .iter()
            .filter(|route| route.source() == Some(Self::SOURCE))
            .filter(|route| !inherited.routes().iter().any(|known| known == *route))
            .map(|route| RouteDefinition::from_route(route))
            .collect();

        let aliases: Vec<AliasDefinition> = container
            .aliases()
            .filter(|alias| alias.source() == Some(Self::SOURCE))
            .filter(|alias| !inherited.aliases().any(|known| known == *alias))
            .map(|alias| AliasDefinition::from_alias(alias))
            .collect();

        let definition = RouteFile { routes, aliases };
        *cached = None;

        if definition.is_empty() {
            if remove_if_exists(&target)? {
                tracing::info!(file = %target.display(), "Removed empty application route file");
            }
            return Ok(());
        }

        let content = ConfigFormat::from_path(&target).render(&target, &definition)?;
        write_atomic(&target, &content)?;
        tracing::info!(
            file = %target.display(),
            routes = definition.routes.len(),
            aliases = definition.aliases.len(),
            "Wrote application route file"
        );
        Ok(())
    }

    fn invalidate(&self) {
        *self.container.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn read_file(
    container: &mut RouteContainer,
    file: &Path,
    prefix: &str,
    stack: &mut Vec<PathBuf>,
) -> Result<(), IoError> {
    let identity = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    if stack.contains(&identity) {
        return Err(IoError::Config {
            file: file.to_path_buf(),
            message: "include cycle detected".to_string(),
        });
    }

    let content = fs::read_to_string(file).map_err(|source| IoError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let definition: RouteFile = ConfigFormat::from_path(file).parse(file, &content)?;

    stack.push(identity);
    for (index, entry) in definition.routes.iter().enumerate() {
        let config_error = |message: String| IoError::Config {
            file: file.to_path_buf(),
            message: format!("route #{} ({}): {}", index, entry.path, message),
        };

        match &entry.file {
            Some(include) => {
                entry.validate_include().map_err(config_error)?;
                let included = file.parent().unwrap_or_else(|| Path::new("")).join(include);
                if !included.is_file() {
                    return Err(config_error(format!("included file {} not found", included.display())));
                }
                let nested = format!("{}{}", prefix, entry.path.trim_end_matches('/'));
                read_file(container, &included, &nested, stack)?;
            }
            None => {
                let route = entry.to_route(container, prefix).map_err(config_error)?;
                container.set_route(route);
            }
        }
    }

    for (index, entry) in definition.aliases.iter().enumerate() {
        let alias = entry.to_alias(container, prefix).map_err(|message| IoError::Config {
            file: file.to_path_buf(),
            message: format!("alias #{} ({}): {}", index, entry.alias, message),
        })?;
        container.set_alias(alias);
    }
    stack.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Callback;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_read_order() {
        let layout = RouteFileLayout::new("/app", "routes.toml")
            .with_path("config")
            .with_module_dir("/modules/a")
            .with_module_dir("/modules/b")
            .with_environment("dev");

        let expected: Vec<PathBuf> = [
            "/modules/a/config/routes.toml",
            "/modules/b/config/routes.toml",
            "/modules/a/config/dev/routes.toml",
            "/modules/b/config/dev/routes.toml",
            "/app/config/dev/routes.toml",
            "/app/config/routes.toml",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(layout.read_order(), expected);
    }

    #[test]
    fn test_application_overrides_module() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("module");
        let app = dir.path().join("app");
        write(
            &module.join("routes.toml"),
            "[[routes]]\npath = \"/\"\nfunction = \"module_home\"\nid = \"home\"\n\n[[routes]]\npath = \"/about\"\nfunction = \"about\"\n",
        );
        write(&app.join("routes.toml"), "[[routes]]\npath = \"/\"\nfunction = \"app_home\"\nid = \"home\"\n");

        let io = ParserRouteContainerIo::new(RouteFileLayout::new(&app, "routes.toml").with_module_dir(&module));
        let container = io.route_container().unwrap();

        assert_eq!(container.len(), 2);
        let home = container.route_by_id("home").unwrap();
        assert_eq!(home.callback(), &Callback::function("app_home"));
        assert_eq!(home.source(), Some(ParserRouteContainerIo::SOURCE));
    }

    #[test]
    fn test_include_cycle_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("routes.toml"), "[[routes]]\npath = \"/a\"\nfile = \"a.toml\"\n");
        write(&dir.path().join("a.toml"), "[[routes]]\npath = \"/b\"\nfile = \"routes.toml\"\n");

        let io = ParserRouteContainerIo::new(RouteFileLayout::new(dir.path(), "routes.toml"));
        let err = io.route_container().unwrap_err();
        assert!(err.to_string().contains("include cycle"), "{}", err);
    }

    #[test]
    fn test_write_skips_foreign_and_inherited_routes() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("module");
        let app = dir.path().join("app");
        write(&module.join("routes.json"), r#"{"routes":[{"path":"/about","function":"about"}]}"#);

        let io = ParserRouteContainerIo::new(RouteFileLayout::new(&app, "routes.json").with_module_dir(&module));
        let mut container = io.route_container().unwrap();
        container.set_route(container.create_route("/contact", Callback::function("contact")).build().unwrap());
        container.set_route(
            crate::routing::Route::builder("/foreign", Callback::function("foreign"))
                .source("memory")
                .build()
                .unwrap(),
        );
        io.set_route_container(&container).unwrap();

        let written: RouteFile =
            serde_json::from_str(&fs::read_to_string(app.join("routes.json")).unwrap()).unwrap();
        let paths: Vec<&str> = written.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/contact"]);

        // dropping the application route leaves nothing to write
        let mut reread = io.route_container().unwrap();
        assert_eq!(reread.len(), 2);
        let contact = reread.route_by_path("/contact").unwrap().clone();
        reread.unset_route(&contact);
        io.set_route_container(&reread).unwrap();
        assert!(!app.join("routes.json").exists());
    }
}
