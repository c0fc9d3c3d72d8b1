use std::path::PathBuf;

use axum::http::{Method, Uri};
use clap::{Parser, Subcommand};
use serde_json::json;

use subsite_router::config::load_config;
use subsite_router::http::split_uri;
use subsite_router::routing::{compile_routing, dispatch, DispatchOutcome, DispatchRequest, Site};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect and exercise a subsite-router configuration", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the compiled route tree
    Check,
    /// Dispatch a request target and print the outcome
    Match {
        /// HTTP method, case-sensitive
        method: String,
        /// Request target, e.g. /has-param/3?page=2
        target: String,
    },
    /// Render a route to its URL
    Render {
        /// Dotted variant path, e.g. MySubsiteR.SubHomeR
        variant: String,
        /// Capture values in declaration order
        params: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let table = compile_routing(&config.routing)?;

    match cli.command {
        Commands::Check => {
            print!("{}", table);
        }
        Commands::Match { method, target } => {
            let method = Method::from_bytes(method.as_bytes())?;
            let uri: Uri = target.parse()?;
            let (path, query) = split_uri(&uri).ok_or("target path is not valid UTF-8")?;
            let request = DispatchRequest::new(method, path, ()).with_query(query);

            let report = match dispatch(table.as_ref(), &request) {
                DispatchOutcome::Matched(matched) => json!({
                    "outcome": "matched",
                    "handler": matched.handler,
                    "variant": matched.route.variant_path(),
                    "route": matched.route,
                }),
                DispatchOutcome::MethodNotAllowed { allowed } => json!({
                    "outcome": "method_not_allowed",
                    "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
                }),
                DispatchOutcome::NotFound => json!({ "outcome": "not_found" }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Render { variant, params } => {
            let variant: Vec<&str> = variant.split('.').collect();
            let params: Vec<&str> = params.iter().map(String::as_str).collect();
            let route = table.build_route(&variant, &params)?;
            println!("{}", table.render(&route)?.to_uri_string());
        }
    }

    Ok(())
}
