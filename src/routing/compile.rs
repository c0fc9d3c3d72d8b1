//! Compile declared sites into route tables.
//!
//! Every site is compiled once, children before parents, so a site mounted
//! from several places shares a single table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::schema::RoutingConfig;
use crate::config::validation::{check_routing, CheckedRouting, CheckedTarget};
use crate::config::ConfigError;
use crate::routing::site::Site;
use crate::routing::table::RouteTable;

/// Handler reference produced by config compilation: the handler's name.
pub type HandlerName = String;

/// Validate `routing` and compile its root site.
pub fn compile_routing(routing: &RoutingConfig) -> Result<Arc<RouteTable<HandlerName>>, ConfigError> {
    let checked = check_routing(routing).map_err(ConfigError::Validation)?;
    let mut compiled = HashMap::new();
    let root = compile_site(checked.root, &checked, &mut compiled)?;

    for site in checked.site_names().filter(|name| !compiled.contains_key(*name)) {
        tracing::warn!(site = %site, root = %checked.root, "Site is never mounted from the root");
    }

    tracing::info!(root = %checked.root, sites = compiled.len(), "Routing compiled");
    Ok(root)
}

// Recursion ends because checked routings have no mount cycles.
fn compile_site(
    name: &str,
    checked: &CheckedRouting<'_>,
    compiled: &mut HashMap<String, Arc<RouteTable<HandlerName>>>,
) -> Result<Arc<RouteTable<HandlerName>>, ConfigError> {
    if let Some(table) = compiled.get(name) {
        return Ok(table.clone());
    }

    let mut builder = RouteTable::builder(name);
    for row in checked.rows(name) {
        let route = row.config;
        builder = match &row.target {
            CheckedTarget::Mount(mounted) => {
                let subsite: Arc<dyn Site<HandlerName>> = compile_site(mounted, checked, compiled)?;
                builder.mount(route.name.clone(), &route.pattern, subsite)
            }
            CheckedTarget::Handler(methods) => builder.route(
                route.name.clone(),
                &route.pattern,
                methods.clone(),
                route.handler_name().to_string(),
            ),
        };
    }

    let table = Arc::new(builder.build()?);
    compiled.insert(name.to_string(), table.clone());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{dispatch, DispatchOutcome, DispatchRequest, ParamValue, Route};
    use axum::http::Method;

    fn routing() -> RoutingConfig {
        toml::from_str(
            r#"
            root = "App"

            [[sites]]
            name = "App"
            routes = [
                { name = "HomeR", pattern = "/", methods = ["GET"], handler = "home" },
                { name = "BlogR", pattern = "/blog/@Blog" },
                { name = "ArchiveR", pattern = "/archive/@Blog" },
            ]

            [[sites]]
            name = "Blog"
            routes = [
                { name = "PostR", pattern = "/#Int", methods = ["GET"], handler = "post" },
            ]

            [[sites]]
            name = "Orphan"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_compiled_tables_dispatch() {
        let table = compile_routing(&routing()).unwrap();
        let request = DispatchRequest::new(Method::GET, ["archive", "12"], ());
        match dispatch(table.as_ref(), &request) {
            DispatchOutcome::Matched(matched) => {
                assert_eq!(matched.handler, "post");
                assert_eq!(
                    matched.route,
                    Route::mount("ArchiveR", vec![], Route::leaf("PostR", vec![ParamValue::Int(12)]))
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_checked_methods_reach_table() {
        let table = compile_routing(&routing()).unwrap();
        let request = DispatchRequest::new(Method::POST, Vec::<String>::new(), ());
        match dispatch(table.as_ref(), &request) {
            DispatchOutcome::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Method::GET]),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_shared_subsite_compiled_once() {
        let table = compile_routing(&routing()).unwrap();
        let mounts: Vec<_> = table
            .entries()
            .iter()
            .filter_map(|e| match e.kind() {
                crate::routing::EntryKind::Mount(site) => Some(site.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(mounts.len(), 2);
        assert!(Arc::ptr_eq(&mounts[0], &mounts[1]));
    }

    #[test]
    fn test_invalid_routing_is_rejected() {
        let mut config = routing();
        config.root = "Missing".into();
        assert!(matches!(compile_routing(&config), Err(ConfigError::Validation(_))));
    }
}
