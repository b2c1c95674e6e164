use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use web_router::config::{load_config, AppConfig};
use web_router::lifecycle::{build_routing, RoutingStack};
use web_router::observability::logging::init_logging;
use web_router::routing::{Route, RouterResult};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect and maintain a route table offline", long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in registration order
    Routes,
    /// List aliases
    Aliases,
    /// Route a request
    Match {
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Base URL the request came in on
        #[arg(short, long, default_value = "")]
        base: String,
    },
    /// Generate the URL of a route
    Url {
        id: String,
        /// Placeholder value as name=value
        #[arg(short, long = "arg", value_parser = parse_pair)]
        args: Vec<(String, String)>,
        /// Query parameter as name=value
        #[arg(short, long, value_parser = parse_pair)]
        query: Vec<(String, String)>,
        #[arg(short, long, default_value = "")]
        base: String,
    },
    /// Manage the route cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Regenerate the cache from the route files
    Warm,
    /// Delete the cache
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging("warn");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let stack = build_routing(&config.routing);

    let output = match cli.command {
        Commands::Routes => {
            let routes = stack.router.routes()?;
            let routes: Vec<&Route> = routes.iter().map(|route| route.as_ref()).collect();
            serde_json::to_value(routes)?
        }
        Commands::Aliases => {
            let aliases = stack.router.aliases()?;
            let aliases: Vec<Value> = aliases
                .iter()
                .map(|alias| serde_json::to_value(alias.as_ref()))
                .collect::<Result<_, _>>()?;
            Value::Array(aliases)
        }
        Commands::Match { path, method, base } => describe(stack.router.route(&method, &path, &base)?)?,
        Commands::Url {
            id,
            args,
            query,
            base,
        } => {
            let args = borrow_pairs(&args);
            let query = borrow_pairs(&query);
            json!({ "url": stack.router.url(&base, &id, &args, &query, "&")? })
        }
        Commands::Cache { action } => cache(&stack, action)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn describe(result: RouterResult) -> Result<Value, serde_json::Error> {
    let outcome = result.outcome();
    Ok(match result {
        RouterResult::Route(matched) => json!({
            "outcome": outcome,
            "route": serde_json::to_value(matched.route().as_ref())?,
            "arguments": serde_json::to_value(matched.arguments())?,
            "dynamic_arguments": matched.dynamic_arguments(),
        }),
        RouterResult::Alias(alias) => json!({
            "outcome": outcome,
            "alias": serde_json::to_value(alias.as_ref())?,
        }),
        RouterResult::MethodNotAllowed(methods) => json!({
            "outcome": outcome,
            "allowed_methods": methods,
        }),
        RouterResult::Empty => json!({ "outcome": outcome }),
    })
}

fn cache(stack: &RoutingStack, action: CacheAction) -> Result<Value, Box<dyn std::error::Error>> {
    let cached = stack
        .cache
        .as_ref()
        .ok_or("the route cache is disabled in the configuration")?;

    Ok(match action {
        CacheAction::Warm => {
            let container = cached.warm()?;
            json!({
                "cache": cached.cache().path(),
                "routes": container.len(),
                "aliases": container.aliases().count(),
            })
        }
        CacheAction::Clear => json!({
            "cache": cached.cache().path(),
            "removed": cached.clear()?,
        }),
    })
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}
