//! Markdown document renderer.
//!
//! Produces one navigable document: a navigation index of every group and
//! endpoint, then each group with its endpoints' path, methods, description,
//! parameter table and examples. Fragments are plain markdown; tables are
//! embedded HTML built by [`table`](crate::render::table).

use crate::description;
use crate::error::Result;
use crate::model::*;
use crate::render::table::{example_table, params_table};
use crate::render::Renderer;

pub struct MarkdownRenderer;

const SEPARATOR: &str = "---------- ";

impl Renderer for MarkdownRenderer {
    fn render(&self, model: &DocModel) -> Result<String> {
        let mut output = render_navigation(model);
        output.push_str("# Api List\n");
        for group in &model.groups {
            output.push_str(&render_group(group)?);
        }
        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Navigation index: numbered groups, endpoints nested under them.
fn render_navigation(model: &DocModel) -> String {
    let mut out = String::from("<h1 id='Navigator'>Navigator</h1>\n\n");
    for (i, group) in model.groups.iter().enumerate() {
        out.push_str(&format!("{}. [{}](#{}) \n", i + 1, group.name, group.name));
        for endpoint in &group.endpoints {
            out.push_str(&format!(
                "    - [{}](#{}) \n",
                endpoint.api_name,
                anchor(group, endpoint)
            ));
        }
    }
    out.push_str("\n\n\n");
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

fn render_group(group: &ApiGroup) -> Result<String> {
    let mut out = format!("<h2 id=\"{}\">{}</h2>\n", group.name, group.name);
    if let Some(desc) = non_empty(description::resolve_opt(group.description.as_ref())?) {
        out.push_str(&format!("\n{}\n\n", desc));
    }

    if group.endpoints.is_empty() {
        out.push_str(&format!("empty api method for group **{}**\n", group.name));
    } else {
        for endpoint in &group.endpoints {
            out.push_str(&render_endpoint(group, endpoint)?);
        }
    }

    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    Ok(out)
}

fn render_endpoint(group: &ApiGroup, endpoint: &ApiEndpoint) -> Result<String> {
    let methods: Vec<&str> = endpoint.allowed_methods.iter().map(HttpMethod::as_str).collect();
    let mut lines: Vec<String> = vec![
        format!(
            "<h3 id=\"{}\">{} <sup>{}</sup></h3>\n",
            anchor(group, endpoint),
            endpoint.api_name,
            group.name
        ),
        format!("**Request Path:** {}\n", endpoint.path()),
        format!("**Allow Method:** {}\n", methods.join(",")),
        "**Api Description:**\n".to_string(),
    ];

    match non_empty(description::resolve_opt(endpoint.description.as_ref())?) {
        Some(desc) => lines.push(format!("\n{}\n", desc)),
        None => lines.push("empty method description\n".to_string()),
    }

    lines.push("**Api Params:**\n".to_string());
    if endpoint.params.is_empty() {
        lines.push("no any params required\n".to_string());
    } else {
        lines.push(format!("{}\n", params_table(&endpoint.params)?));
    }

    lines.push(render_examples(
        "Request Example",
        &endpoint.request_examples,
        "no example request",
    )?);
    lines.push(render_examples(
        "Success Response Example",
        &endpoint.success_examples,
        "no success response example",
    )?);
    lines.push(render_examples(
        "Fail Response Example",
        &endpoint.fail_examples,
        "no fail response example",
    )?);

    lines.push(format!(
        "<p align=\"right\">Back To <a href='#Navigator'>Navigator</a>|<a href='#{}'>{}<sup>{}</sup></a></p>\n",
        anchor(group, endpoint),
        endpoint.api_name,
        group.name
    ));
    lines.push(format!("{}\n", SEPARATOR));

    Ok(lines.join("\n"))
}

/// One example block per entry, numbered from 1, or the placeholder.
fn render_examples(label: &str, examples: &[Example], placeholder: &str) -> Result<String> {
    if examples.is_empty() {
        return Ok(format!("**{}:**\n\n{}\n", label, placeholder));
    }

    let mut out = String::new();
    for (i, example) in examples.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("**{}{}:**\n", label, n));
        if let Some(params) = &example.params {
            out.push_str(&example_table(params)?);
            out.push_str("\n\n");
        }
        if let Some(desc) = &example.description {
            let kind = match desc.kind {
                DescriptionKind::Json => "JSON",
                DescriptionKind::Xml => "XML",
                DescriptionKind::Plain | DescriptionKind::Markdown => "Description",
            };
            out.push_str(&format!("**{}{} {}:**\n\n", label, n, kind));
            out.push_str(&description::resolve(desc)?);
            out.push_str("\n\n");
        }
    }
    out.push('\n');
    Ok(out)
}

fn anchor(group: &ApiGroup, endpoint: &ApiEndpoint) -> String {
    format!("{}-{}", group.name, endpoint.api_name)
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}
