//! HTML table fragments for parameter trees.
//!
//! Each row builder is a pure recursive function over one parameter node: it
//! returns the rows for the node and all of its descendants, in declaration
//! order, and the caller joins them.

use crate::description;
use crate::error::{AnnotationError, Result};
use crate::model::{ParamDescriptor, ParamType, ParamValue};
use serde_json::Value;

pub const PARAM_HEADER: [&str; 5] = ["Name", "From", "Validate", "Description", "Default"];
pub const EXAMPLE_HEADER: [&str; 3] = ["Name", "Description", "Value"];

/// Indentation of nested rows in the definition table, per level.
const PARAM_INDENT: &str = "-";
/// Indentation of nested rows in example tables, per level (raw HTML).
const EXAMPLE_INDENT: &str = "&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;";

/// Parameter definition table.
pub fn params_table(params: &[ParamDescriptor]) -> Result<String> {
    let mut rows = vec![header_row(&PARAM_HEADER)];
    for param in params {
        rows.extend(param_rows(param, 0)?);
    }
    Ok(wrap_table(&rows))
}

/// Example parameter table.
pub fn example_table(params: &[ParamDescriptor]) -> Result<String> {
    let mut rows = vec![header_row(&EXAMPLE_HEADER)];
    for param in params {
        rows.extend(example_rows(param, 0)?);
    }
    Ok(wrap_table(&rows))
}

/// Rows for one definition-table node and its descendants.
pub fn param_rows(param: &ParamDescriptor, depth: usize) -> Result<Vec<String>> {
    let name = format!("{}{}", PARAM_INDENT.repeat(depth), html_escape(&param.name));
    let from: Vec<&str> = param.from.iter().map(|f| f.as_str()).collect();
    let description = description::resolve_opt(param.description.as_ref())?.unwrap_or_default();

    let mut rows = vec![row(&[
        name,
        html_escape(&from.join(",")),
        validators_cell(param),
        html_escape(&description),
        html_escape(&default_value(param)),
    ])];
    for child in object_children(param)? {
        rows.extend(param_rows(child, depth + 1)?);
    }
    Ok(rows)
}

/// Rows for one example-table node and its descendants.
pub fn example_rows(param: &ParamDescriptor, depth: usize) -> Result<Vec<String>> {
    let name = format!("{}{}", EXAMPLE_INDENT.repeat(depth), html_escape(&param.name));
    let description = description::resolve_opt(param.description.as_ref())?.unwrap_or_default();

    let mut rows = vec![row(&[
        name,
        html_escape(&description),
        html_escape(&example_value(param).unwrap_or_default()),
    ])];
    for child in object_children(param)? {
        rows.extend(example_rows(child, depth + 1)?);
    }
    Ok(rows)
}

/// Children of an object-typed parameter; empty for other types.
fn object_children(param: &ParamDescriptor) -> Result<&[ParamDescriptor]> {
    if param.param_type != ParamType::Object {
        return Ok(&[]);
    }
    param
        .children()
        .ok_or_else(|| AnnotationError::malformed_object(&param.name))
}

/// One `- message` line per bound validator, set off by blank lines.
fn validators_cell(param: &ParamDescriptor) -> String {
    if param.validators.is_empty() {
        return String::new();
    }
    let mut cell = String::from("\n\n");
    for validator in &param.validators {
        cell.push_str("- ");
        cell.push_str(&html_escape(&validator.message(param)));
        cell.push('\n');
    }
    cell.push('\n');
    cell
}

/// Type-aware stringification of an example value.
///
/// `None` means an empty cell.
pub fn example_value(param: &ParamDescriptor) -> Option<String> {
    match (param.param_type, &param.value) {
        (ParamType::Object, _) | (_, ParamValue::Children(_)) => Some("Object".to_string()),
        (ParamType::List, ParamValue::None) | (ParamType::List, ParamValue::Value(Value::Null)) => {
            Some("[]".to_string())
        }
        (ParamType::List, ParamValue::Value(value)) => Some(value.to_string()),
        (ParamType::Scalar, ParamValue::None) | (ParamType::Scalar, ParamValue::Value(Value::Null)) => None,
        (ParamType::Scalar, ParamValue::Value(value)) => Some(scalar_string(value)),
    }
}

/// Declared default shown in the definition table.
fn default_value(param: &ParamDescriptor) -> String {
    match &param.value {
        ParamValue::None | ParamValue::Children(_) => String::new(),
        ParamValue::Value(value) => scalar_string(value),
    }
}

/// Strings render raw; containers as compact JSON (Unicode and `/` unescaped).
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn header_row(cells: &[&str]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    row(&cells)
}

fn row(cells: &[String]) -> String {
    let mut out = String::from("<tr>\n");
    for cell in cells {
        out.push_str("<td>");
        out.push_str(cell);
        out.push_str("</td>\n");
    }
    out.push_str("</tr>\n");
    out
}

fn wrap_table(rows: &[String]) -> String {
    format!("<table>\n{}</table>", rows.concat())
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Description, ParamFrom};
    use crate::validator::{Rule, Validator};
    use serde_json::json;

    fn rows_of(table: &str) -> usize {
        table.matches("<tr>").count()
    }

    #[test]
    fn example_value_list_absent() {
        let p = ParamDescriptor::new("ids").with_type(ParamType::List);
        assert_eq!(example_value(&p).as_deref(), Some("[]"));
    }

    #[test]
    fn example_value_list_present_is_compact_json() {
        let p = ParamDescriptor::new("urls")
            .with_type(ParamType::List)
            .with_value(json!(["http://a/b", "中文"]));
        assert_eq!(example_value(&p).as_deref(), Some(r#"["http://a/b","中文"]"#));
    }

    #[test]
    fn example_value_object_is_placeholder() {
        let p = ParamDescriptor::new("o")
            .with_type(ParamType::Object)
            .with_value(json!("anything"));
        assert_eq!(example_value(&p).as_deref(), Some("Object"));
        let p = ParamDescriptor::new("o").with_children(vec![]);
        assert_eq!(example_value(&p).as_deref(), Some("Object"));
    }

    #[test]
    fn example_value_scalar() {
        assert_eq!(example_value(&ParamDescriptor::new("a")), None);
        let p = ParamDescriptor::new("a").with_value(42);
        assert_eq!(example_value(&p).as_deref(), Some("42"));
        let p = ParamDescriptor::new("a").with_value("x/y");
        assert_eq!(example_value(&p).as_deref(), Some("x/y"));
    }

    #[test]
    fn nested_rows_are_indented_per_level() {
        let p = ParamDescriptor::new("a").with_children(vec![
            ParamDescriptor::new("b").with_children(vec![ParamDescriptor::new("c")]),
            ParamDescriptor::new("d"),
        ]);
        let rows = param_rows(&p, 0).unwrap();
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r.lines().nth(1).unwrap())
            .collect();
        assert_eq!(names, ["<td>a</td>", "<td>-b</td>", "<td>--c</td>", "<td>-d</td>"]);
    }

    #[test]
    fn example_rows_use_nbsp_indent() {
        let p = ParamDescriptor::new("a").with_children(vec![ParamDescriptor::new("b")]);
        let rows = example_rows(&p, 0).unwrap();
        assert!(rows[1].contains("<td>&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;b</td>"));
    }

    #[test]
    fn malformed_object_fails_at_any_depth() {
        let bad = ParamDescriptor::new("deep")
            .with_type(ParamType::Object)
            .with_value(json!("x"));
        let top = ParamDescriptor::new("top")
            .with_children(vec![ParamDescriptor::new("mid").with_children(vec![bad])]);
        let err = param_rows(&top, 0).unwrap_err();
        assert_eq!(err.message(), "Param deep value not correct Object format");
        assert!(example_rows(&top, 0).is_err());

        let absent = ParamDescriptor::new("empty").with_type(ParamType::Object);
        assert!(params_table(&[absent]).is_err());
    }

    #[test]
    fn validator_cell_lists_messages() {
        let p = ParamDescriptor::new("account")
            .with_from(&[ParamFrom::Json])
            .with_validator(Validator::new(Rule::Required))
            .with_validator(Validator::new(Rule::MaxLength(15)))
            .with_description(Description::plain("<id>"));
        let table = params_table(&[p]).unwrap();
        assert_eq!(rows_of(&table), 2);
        assert!(table.contains("<td>JSON</td>"));
        assert!(table.contains("<td>\n\n- account must be set\n- account max length is 15\n\n</td>"));
        assert!(table.contains("<td>&lt;id&gt;</td>"));
    }

    #[test]
    fn header_rows() {
        let table = example_table(&[]).unwrap();
        assert_eq!(
            table,
            "<table>\n<tr>\n<td>Name</td>\n<td>Description</td>\n<td>Value</td>\n</tr>\n</table>"
        );
    }
}
