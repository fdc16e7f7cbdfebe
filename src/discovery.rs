//! Controller discovery.
//!
//! Walks a definition file or a directory of them, keeps only recognized
//! sources (`*.toml`) that declare an API controller, and registers each one
//! in the scanner's [`ReflectionCache`]. Anything else is skipped.

use crate::annotation::ControllerDefinition;
use crate::error::{AnnotationError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of recognized definition sources.
pub const DEFINITION_EXTENSION: &str = "toml";

/// Default namespace trimmed from controller identities when deriving paths.
pub const DEFAULT_NAMESPACE: &str = "App::HttpController";

/// Parsed controller definitions keyed by identity.
///
/// Populated on first sight and never invalidated; registering the same
/// identity again is a no-op.
#[derive(Debug, Default)]
pub struct ReflectionCache {
    entries: HashMap<String, ControllerDefinition>,
}

impl ReflectionCache {
    /// Returns `false` when the identity was already cached.
    pub fn insert(&mut self, definition: ControllerDefinition) -> bool {
        if self.entries.contains_key(&definition.identity) {
            return false;
        }
        self.entries.insert(definition.identity.clone(), definition);
        true
    }

    pub fn get(&self, identity: &str) -> Option<&ControllerDefinition> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Discovery engine: owns the cache for the lifetime of one scan.
#[derive(Debug)]
pub struct Scanner {
    namespace: String,
    cache: ReflectionCache,
    order: Vec<String>,
    /// Definition file each discovered identity came from.
    sources: HashMap<String, PathBuf>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Scanner {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cache: ReflectionCache::default(),
            order: Vec::new(),
            sources: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn cache(&self) -> &ReflectionCache {
        &self.cache
    }

    /// Every registered controller identity, in registration order.
    pub fn controllers(&self) -> &[String] {
        &self.order
    }

    /// Register a definition directly, bypassing file discovery.
    pub fn register(&mut self, definition: ControllerDefinition) -> String {
        let identity = definition.identity.clone();
        if self.cache.insert(definition) {
            self.order.push(identity.clone());
        }
        identity
    }

    /// Discover the controllers under `root`, in sorted path order.
    ///
    /// Rediscovering the same file is a no-op. An identity declared by two
    /// different sources is an error.
    pub fn discover(&mut self, root: &Path) -> Result<Vec<String>> {
        let mut found: Vec<String> = Vec::new();
        for path in definition_files(root)? {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable definition");
                    continue;
                }
            };
            let table = match content.parse::<toml::Table>() {
                Ok(table) => table,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unparsable definition");
                    continue;
                }
            };
            let base_dir = path.parent().map(Path::to_path_buf);
            let Some(definition) = ControllerDefinition::from_table(table, base_dir)? else {
                debug!(path = %path.display(), "not an api controller");
                continue;
            };

            if self.cache.get(&definition.identity).is_some() {
                match self.sources.get(&definition.identity) {
                    Some(source) if *source == path => {}
                    source => {
                        let first = source
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "a direct registration".to_string());
                        return Err(AnnotationError::new(format!(
                            "duplicate controller {} declared in {} and {}",
                            definition.identity,
                            first,
                            path.display()
                        )));
                    }
                }
            }

            let identity = self.register(definition);
            self.sources.entry(identity.clone()).or_insert_with(|| path.clone());
            if !found.contains(&identity) {
                debug!(controller = %identity, path = %path.display(), "registered controller");
                found.push(identity);
            }
        }
        Ok(found)
    }
}

/// Recognized definition files under `root`, sorted for deterministic output.
///
/// A file root is accepted only if it has the definition extension; a
/// directory is walked recursively.
fn definition_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_definition(root) {
            vec![root.to_path_buf()]
        } else {
            debug!(path = %root.display(), "not a definition source");
            Vec::new()
        });
    }
    if !root.is_dir() {
        warn!(path = %root.display(), "definition root does not exist");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/**/*.{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        DEFINITION_EXTENSION
    );
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| AnnotationError::new(format!("invalid definition root {}: {}", root.display(), e)))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_definition(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(DEFINITION_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const AUTH: &str = r#"
controller = "App::HttpController::Api::Auth"
annotation_controller = true
"#;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn directory_walk_filters_sources() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Api/Auth.toml", AUTH);
        write(
            dir.path(),
            "Api/Common/Message.toml",
            "controller = \"App::HttpController::Api::Common::Message\"\nannotation_controller = true\n",
        );
        write(dir.path(), "Api/README.md", "# not a definition");
        write(dir.path(), "Api/Util.toml", "controller = \"App::Util\"\n");
        write(dir.path(), "Api/broken.toml", "this is = = not toml");

        let mut scanner = Scanner::default();
        let found = scanner.discover(dir.path()).unwrap();
        assert_eq!(
            found,
            [
                "App::HttpController::Api::Auth",
                "App::HttpController::Api::Common::Message"
            ]
        );
        assert_eq!(scanner.cache().len(), 2);
    }

    #[test]
    fn single_file_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Auth.toml", AUTH);
        let mut scanner = Scanner::default();
        let found = scanner.discover(&dir.path().join("Auth.toml")).unwrap();
        assert_eq!(found, ["App::HttpController::Api::Auth"]);
        let def = scanner.cache().get(&found[0]).unwrap();
        assert_eq!(def.base_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn unrecognized_file_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Auth.php", AUTH);
        let mut scanner = Scanner::default();
        assert!(scanner.discover(&dir.path().join("Auth.php")).unwrap().is_empty());
    }

    #[test]
    fn missing_root_yields_nothing() {
        let mut scanner = Scanner::default();
        assert!(scanner.discover(Path::new("/nonexistent/controllers")).unwrap().is_empty());
    }

    #[test]
    fn rediscovery_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Auth.toml", AUTH);
        let mut scanner = Scanner::default();
        let first = scanner.discover(dir.path()).unwrap();
        let second = scanner.discover(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(scanner.controllers().len(), 1);
    }

    #[test]
    fn cache_first_insert_wins() {
        let mut cache = ReflectionCache::default();
        assert!(cache.insert(ControllerDefinition::new("App::A")));
        assert!(!cache.insert(ControllerDefinition::new("App::A")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn same_identity_in_two_files_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "A.toml", AUTH);
        write(dir.path(), "B.toml", AUTH);
        let mut scanner = Scanner::default();
        let err = scanner.discover(dir.path()).unwrap_err();
        assert!(err.message().starts_with("duplicate controller App::HttpController::Api::Auth"), "{err}");
        assert!(err.message().contains("A.toml"));
        assert!(err.message().ends_with("B.toml"));
    }

    #[test]
    fn discovered_identity_clashing_with_registration_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Auth.toml", AUTH);
        let mut scanner = Scanner::default();
        scanner.register(ControllerDefinition::new("App::HttpController::Api::Auth"));
        let err = scanner.discover(dir.path()).unwrap_err();
        assert!(err.message().contains("a direct registration"), "{err}");
    }

    #[test]
    fn non_utf8_definition_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Auth.toml", AUTH);
        fs::write(dir.path().join("Binary.toml"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let mut scanner = Scanner::default();
        let found = scanner.discover(dir.path()).unwrap();
        assert_eq!(found, ["App::HttpController::Api::Auth"]);
    }
}
