//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mounts reference declared sites)
//! - Parse every pattern and method list up front
//! - Reject mount cycles so dispatch recursion stays bounded
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - `check_routing` hands the parsed rows to table compilation, so nothing is checked twice
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use axum::http::Method;

use crate::config::schema::{MethodsConfig, RouteConfig, RouterConfig, RoutingConfig};
use crate::routing::{MethodSet, PatternError, RoutePattern};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("root site `{0}` is not declared")]
    MissingRoot(String),

    #[error("a site has an empty name")]
    EmptySiteName,

    #[error("site `{0}` is declared more than once")]
    DuplicateSite(String),

    #[error("site `{site}` declares route `{route}` more than once")]
    DuplicateRoute { site: String, route: String },

    #[error("site `{site}`, route `{route}`: {source}")]
    Pattern {
        site: String,
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("site `{site}`, route `{route}` mounts undeclared site `{mounted}`")]
    UnknownSite {
        site: String,
        route: String,
        mounted: String,
    },

    #[error("site `{site}`, route `{route}`: mount rows take no methods")]
    MethodsOnMount { site: String, route: String },

    #[error("site `{site}`, route `{route}`: {problem}")]
    Methods {
        site: String,
        route: String,
        problem: MethodsProblem,
    },

    #[error("mount cycle: {}", .0.join(" -> "))]
    MountCycle(Vec<String>),
}

/// What is wrong with a `methods` entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodsProblem {
    #[error("unknown keyword `{0}` (use \"any\" or a list)")]
    UnknownKeyword(String),

    #[error("empty method list (use \"any\" to accept every method)")]
    Empty,

    #[error("`{0}` is not a valid method token")]
    InvalidToken(String),
}

/// Validate the whole configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("listener.bind_address", &config.listener.bind_address),
        ("observability.metrics_address", &config.observability.metrics_address),
    ] {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if let Err(routing_errors) = validate_routing(&config.routing) {
        errors.extend(routing_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A route row that passed validation.
#[derive(Debug, Clone)]
pub struct CheckedRoute<'c> {
    pub config: &'c RouteConfig,
    pub target: CheckedTarget,
}

/// What a checked row dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckedTarget {
    Handler(MethodSet),
    /// Name of the mounted site, known to be declared.
    Mount(String),
}

/// Routing declarations that passed validation: every mounted site is
/// declared and the mount graph is acyclic.
#[derive(Debug)]
pub struct CheckedRouting<'c> {
    pub root: &'c str,
    sites: HashMap<&'c str, Vec<CheckedRoute<'c>>>,
}

impl<'c> CheckedRouting<'c> {
    /// Rows of `site` in declaration order.
    pub fn rows(&self, site: &str) -> &[CheckedRoute<'c>] {
        self.sites.get(site).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn site_names(&self) -> impl Iterator<Item = &'c str> + '_ {
        self.sites.keys().copied()
    }
}

/// Validate site and route declarations only.
pub fn validate_routing(routing: &RoutingConfig) -> Result<(), Vec<ValidationError>> {
    check_routing(routing).map(|_| ())
}

/// Validate routing and keep the parsed targets of every row.
pub fn check_routing(routing: &RoutingConfig) -> Result<CheckedRouting<'_>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut checked: HashMap<&str, Vec<CheckedRoute<'_>>> = HashMap::new();
    let mut declared = HashSet::new();

    for site in &routing.sites {
        if site.name.is_empty() {
            errors.push(ValidationError::EmptySiteName);
        } else if !declared.insert(site.name.as_str()) {
            errors.push(ValidationError::DuplicateSite(site.name.clone()));
        }
    }

    if !declared.contains(routing.root.as_str()) {
        errors.push(ValidationError::MissingRoot(routing.root.clone()));
    }

    let mut mounts: HashMap<String, Vec<String>> = HashMap::new();
    for site in &routing.sites {
        let rows = checked.entry(site.name.as_str()).or_default();
        let mut names = HashSet::new();
        for route in &site.routes {
            if !names.insert(route.name.as_str()) {
                errors.push(ValidationError::DuplicateRoute {
                    site: site.name.clone(),
                    route: route.name.clone(),
                });
            }

            let pattern = match RoutePattern::parse(&route.pattern) {
                Ok(pattern) => pattern,
                Err(source) => {
                    errors.push(ValidationError::Pattern {
                        site: site.name.clone(),
                        route: route.name.clone(),
                        source,
                    });
                    continue;
                }
            };

            match pattern.mount() {
                Some(mounted) => {
                    if route.methods.is_some() {
                        errors.push(ValidationError::MethodsOnMount {
                            site: site.name.clone(),
                            route: route.name.clone(),
                        });
                    }
                    if declared.contains(mounted) {
                        mounts
                            .entry(site.name.clone())
                            .or_default()
                            .push(mounted.to_string());
                        rows.push(CheckedRoute {
                            config: route,
                            target: CheckedTarget::Mount(mounted.to_string()),
                        });
                    } else {
                        errors.push(ValidationError::UnknownSite {
                            site: site.name.clone(),
                            route: route.name.clone(),
                            mounted: mounted.to_string(),
                        });
                    }
                }
                None => match method_set(route) {
                    Ok(methods) => rows.push(CheckedRoute {
                        config: route,
                        target: CheckedTarget::Handler(methods),
                    }),
                    Err(problem) => errors.push(ValidationError::Methods {
                        site: site.name.clone(),
                        route: route.name.clone(),
                        problem,
                    }),
                },
            }
        }
    }

    let site_names: Vec<&str> = routing.sites.iter().map(|s| s.name.as_str()).collect();
    if let Some(cycle) = find_cycle(&site_names, &mounts) {
        errors.push(ValidationError::MountCycle(cycle));
    }

    if errors.is_empty() {
        Ok(CheckedRouting {
            root: routing.root.as_str(),
            sites: checked,
        })
    } else {
        Err(errors)
    }
}

/// The method set declared by a handler row.
pub fn method_set(route: &RouteConfig) -> Result<MethodSet, MethodsProblem> {
    match &route.methods {
        None => Ok(MethodSet::Any),
        Some(MethodsConfig::Keyword(keyword)) if keyword.eq_ignore_ascii_case("any") => {
            Ok(MethodSet::Any)
        }
        Some(MethodsConfig::Keyword(keyword)) => Err(MethodsProblem::UnknownKeyword(keyword.clone())),
        Some(MethodsConfig::List(list)) if list.is_empty() => Err(MethodsProblem::Empty),
        Some(MethodsConfig::List(list)) => {
            let methods = list
                .iter()
                .map(|token| {
                    Method::from_bytes(token.as_bytes())
                        .map_err(|_| MethodsProblem::InvalidToken(token.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MethodSet::only(methods))
        }
    }
}

// Depth-first search over the mount graph; returns the first cycle found.
fn find_cycle(sites: &[&str], mounts: &HashMap<String, Vec<String>>) -> Option<Vec<String>> {
    fn visit<'a>(
        site: &'a str,
        mounts: &'a HashMap<String, Vec<String>>,
        stack: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(start) = stack.iter().position(|s| *s == site) {
            let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(site.to_string());
            return Some(cycle);
        }
        if done.contains(site) {
            return None;
        }

        stack.push(site);
        for child in mounts.get(site).into_iter().flatten() {
            if let Some(cycle) = visit(child, mounts, stack, done) {
                return Some(cycle);
            }
        }
        stack.pop();
        done.insert(site);
        None
    }

    let mut done = HashSet::new();
    sites
        .iter()
        .find_map(|site| visit(site, mounts, &mut Vec::new(), &mut done))
}
