//! Alias route emission.
//!
//! Every endpoint is reachable at its structurally derived path
//! (`/{controller path}/{member}`). When an endpoint declares a different
//! request path, an alias route mapping the declared pattern onto the derived
//! path is registered with the external router.

use crate::discovery::Scanner;
use crate::error::{AnnotationError, Result};
use crate::model::HttpMethod;
use tracing::{debug, info};

/// Router collaborator receiving alias routes.
pub trait RouteCollector {
    fn add_route(&mut self, methods: &[HttpMethod], pattern: &str, target: &str);
}

/// One alias route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub methods: Vec<HttpMethod>,
    pub pattern: String,
    pub target: String,
}

/// In-memory collector, used by the `routes` command and in tests.
#[derive(Debug, Default)]
pub struct RouteTable {
    pub entries: Vec<RouteEntry>,
}

impl RouteCollector for RouteTable {
    fn add_route(&mut self, methods: &[HttpMethod], pattern: &str, target: &str) {
        self.entries.push(RouteEntry {
            methods: methods.to_vec(),
            pattern: pattern.to_string(),
            target: target.to_string(),
        });
    }
}

impl RouteTable {
    /// One line per route: `METHODS pattern -> target`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let methods: Vec<&str> = entry.methods.iter().map(HttpMethod::as_str).collect();
            out.push_str(&format!(
                "{} {} -> {}\n",
                methods.join(","),
                entry.pattern,
                entry.target
            ));
        }
        out
    }
}

/// Derived path for a controller member.
///
/// `App::HttpController::Api::Auth` under namespace `App::HttpController`
/// with member `login` gives `/Api/Auth/login`.
pub fn default_path(identity: &str, namespace: &str, member: &str) -> String {
    let trimmed = match identity.strip_prefix(namespace) {
        Some(rest) if rest.is_empty() || rest.starts_with("::") => rest,
        _ => identity,
    }
    .trim_start_matches("::");
    let prefix = trimmed.replace("::", "/");
    if prefix.is_empty() {
        format!("/{}", member)
    } else {
        format!("/{}/{}", prefix, member)
    }
}

/// Normalize a declared request path into a route pattern.
///
/// The last segment loses its extension and a trailing `index` segment is
/// dropped: `/auth/login.html` → `/auth/login`, `/docs/index.html` → `/docs`.
pub fn path_info(path: &str) -> String {
    let path = path.trim();
    let (dir, file) = match path.rfind('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    };
    let stem = match file.rfind('.') {
        Some(pos) if pos > 0 => &file[..pos],
        _ => file,
    };

    let mut out = String::from("/");
    out.push_str(dir.trim_start_matches('/'));
    if stem != "index" && !stem.is_empty() {
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(stem);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Register alias routes for every controller known to the scanner.
///
/// Only endpoints declaring a request path different from their derived path
/// are registered. Returns the number of routes added.
pub fn emit_routes(scanner: &Scanner, collector: &mut dyn RouteCollector) -> Result<usize> {
    let mut added = 0;
    for identity in scanner.controllers() {
        let Some(definition) = scanner.cache().get(identity) else {
            continue;
        };
        for member in definition.endpoint_members() {
            let decl = definition
                .decode_api(member)
                .map_err(|e| AnnotationError::in_member(e, identity, &member.name))?;
            let Some(decl) = decl else {
                continue;
            };

            let real_path = default_path(identity, scanner.namespace(), &member.name);
            let Some(request_path) = decl.request_path.as_deref() else {
                continue;
            };
            if request_path == real_path {
                debug!(controller = %identity, path = %real_path, "declared path equals derived path");
                continue;
            }

            let methods = decl
                .allowed_methods
                .unwrap_or_else(|| HttpMethod::ALL.to_vec());
            let pattern = path_info(request_path);
            info!(pattern = %pattern, target = %real_path, "adding alias route");
            collector.add_route(&methods, &pattern, &real_path);
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{ApiArgs, ControllerDefinition, Member, OneOrMany};

    #[test]
    fn derived_path_trims_namespace() {
        assert_eq!(
            default_path("App::HttpController::Api::Auth", "App::HttpController", "login"),
            "/Api/Auth/login"
        );
        assert_eq!(
            default_path("Other::Thing", "App::HttpController", "run"),
            "/Other/Thing/run"
        );
        assert_eq!(default_path("App::HttpController", "App::HttpController", "index"), "/index");
        assert_eq!(default_path("Apple::Pie", "App", "eat"), "/Apple/Pie/eat");
    }

    #[test]
    fn path_info_strips_extension() {
        assert_eq!(path_info("/auth/login.html"), "/auth/login");
        assert_eq!(path_info("/auth/login"), "/auth/login");
    }

    #[test]
    fn path_info_drops_index() {
        assert_eq!(path_info("/docs/index.html"), "/docs");
        assert_eq!(path_info("/index"), "/");
    }

    #[test]
    fn path_info_adds_leading_slash() {
        assert_eq!(path_info("api/common/message/list"), "/api/common/message/list");
    }

    fn scanner_with(members: Vec<Member>) -> Scanner {
        let mut def = ControllerDefinition::new("App::HttpController::Api::Auth");
        for m in members {
            def = def.with_member(m);
        }
        let mut scanner = Scanner::default();
        scanner.register(def);
        scanner
    }

    #[test]
    fn alias_emitted_for_differing_path() {
        let api = ApiArgs {
            request_path: Some("/auth/login.html".into()),
            allow_method: Some(OneOrMany::One(HttpMethod::Post)),
            ..ApiArgs::new("login")
        };
        let scanner = scanner_with(vec![Member::with_api("login", &api).unwrap()]);
        let mut table = RouteTable::default();
        assert_eq!(emit_routes(&scanner, &mut table).unwrap(), 1);
        assert_eq!(
            table.entries,
            [RouteEntry {
                methods: vec![HttpMethod::Post],
                pattern: "/auth/login".into(),
                target: "/Api/Auth/login".into(),
            }]
        );
    }

    #[test]
    fn default_methods_when_unspecified() {
        let api = ApiArgs {
            request_path: Some("/login".into()),
            ..ApiArgs::new("login")
        };
        let scanner = scanner_with(vec![Member::with_api("login", &api).unwrap()]);
        let mut table = RouteTable::default();
        emit_routes(&scanner, &mut table).unwrap();
        assert_eq!(table.entries[0].methods, HttpMethod::ALL.to_vec());
    }

    #[test]
    fn equal_or_missing_path_not_registered() {
        let same = ApiArgs {
            request_path: Some("/Api/Auth/login".into()),
            ..ApiArgs::new("login")
        };
        let undeclared = ApiArgs {
            allow_method: Some(OneOrMany::One(HttpMethod::Get)),
            ..ApiArgs::new("logout")
        };
        let scanner = scanner_with(vec![
            Member::with_api("login", &same).unwrap(),
            Member::with_api("logout", &undeclared).unwrap(),
            Member::plain("helper"),
        ]);
        let mut table = RouteTable::default();
        assert_eq!(emit_routes(&scanner, &mut table).unwrap(), 0);
        assert!(table.entries.is_empty());
    }

    #[test]
    fn private_members_ignored() {
        let api = ApiArgs {
            request_path: Some("/hidden".into()),
            ..ApiArgs::new("hidden")
        };
        let scanner = scanner_with(vec![Member::with_api("hidden", &api).unwrap().private()]);
        let mut table = RouteTable::default();
        assert_eq!(emit_routes(&scanner, &mut table).unwrap(), 0);
    }

    #[test]
    fn table_render() {
        let mut table = RouteTable::default();
        table.add_route(&[HttpMethod::Get, HttpMethod::Post], "/a", "/X/a");
        assert_eq!(table.render(), "GET,POST /a -> /X/a\n");
    }
}
