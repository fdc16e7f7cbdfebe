//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;
pub mod table;

use crate::error::Result;
use crate::model::DocModel;
use anyhow::anyhow;

/// Renders a metadata model into one output format.
pub trait Renderer {
    fn render(&self, model: &DocModel) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> anyhow::Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or json", format)),
    }
}
