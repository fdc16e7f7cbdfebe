//! apidoc: API documentation and alias routes from annotated controller
//! definitions.
//!
//! The pipeline is discovery ([`discovery::Scanner`]) → metadata extraction
//! ([`extract::build_model`], merging each controller's baseline params into
//! its endpoints) → rendering ([`render::Renderer`]). Route emission
//! ([`route::emit_routes`]) reads the same discovered controllers
//! independently of rendering.

pub mod annotation;
pub mod description;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod merge;
pub mod model;
pub mod render;
pub mod route;
pub mod validator;

use discovery::Scanner;
use error::Result;
use render::Renderer;
use route::RouteCollector;
use std::path::Path;

/// Discover controllers under `root`, build the model, render one document.
pub fn scan_to_doc(root: &Path, namespace: &str, renderer: &dyn Renderer) -> Result<String> {
    let mut scanner = Scanner::new(namespace);
    scanner.discover(root)?;
    let model = extract::build_model(&scanner)?;
    renderer.render(&model)
}

/// Discover controllers under `root` and register their alias routes.
pub fn mapping_router(collector: &mut dyn RouteCollector, root: &Path, namespace: &str) -> Result<usize> {
    let mut scanner = Scanner::new(namespace);
    scanner.discover(root)?;
    route::emit_routes(&scanner, collector)
}
