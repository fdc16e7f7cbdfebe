//! JSON renderer: structured output for tooling integration.
//!
//! Serializes the metadata model with validator messages materialized.
//! Descriptions are emitted as declared (kind plus payload), not resolved.

use crate::error::{AnnotationError, Result};
use crate::model::*;
use crate::render::Renderer;
use serde_json::{json, Value};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, model: &DocModel) -> Result<String> {
        let groups = model
            .groups
            .iter()
            .map(group_json)
            .collect::<Result<Vec<_>>>()?;
        let mut out = serde_json::to_string_pretty(&json!({ "groups": groups }))
            .map_err(|e| AnnotationError::new(format!("failed to encode model: {}", e)))?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn group_json(group: &ApiGroup) -> Result<Value> {
    let endpoints = group
        .endpoints
        .iter()
        .map(endpoint_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({
        "name": group.name,
        "description": description_json(group.description.as_ref()),
        "endpoints": endpoints,
    }))
}

fn endpoint_json(endpoint: &ApiEndpoint) -> Result<Value> {
    let methods: Vec<&str> = endpoint.allowed_methods.iter().map(HttpMethod::as_str).collect();
    Ok(json!({
        "api_name": endpoint.api_name,
        "path": endpoint.path(),
        "default_path": endpoint.default_path,
        "methods": methods,
        "description": description_json(endpoint.description.as_ref()),
        "params": params_json(&endpoint.params)?,
        "request_examples": examples_json(&endpoint.request_examples)?,
        "success_examples": examples_json(&endpoint.success_examples)?,
        "fail_examples": examples_json(&endpoint.fail_examples)?,
    }))
}

fn params_json(params: &[ParamDescriptor]) -> Result<Vec<Value>> {
    params.iter().map(param_json).collect()
}

fn param_json(param: &ParamDescriptor) -> Result<Value> {
    let from: Vec<&str> = param.from.iter().map(ParamFrom::as_str).collect();
    let validators: Vec<Value> = param
        .validators
        .iter()
        .map(|v| json!({ "rule": v.rule_name(), "message": v.message(param) }))
        .collect();

    let mut out = json!({
        "name": param.name,
        "from": from,
        "type": param.param_type.as_str(),
        "description": description_json(param.description.as_ref()),
        "validators": validators,
    });
    match (&param.value, param.param_type) {
        (ParamValue::Children(children), _) => {
            out["children"] = Value::Array(params_json(children)?);
        }
        (_, ParamType::Object) => return Err(AnnotationError::malformed_object(&param.name)),
        (ParamValue::Value(value), _) => out["value"] = value.clone(),
        (ParamValue::None, _) => {}
    }
    Ok(out)
}

fn examples_json(examples: &[Example]) -> Result<Vec<Value>> {
    examples
        .iter()
        .map(|example| {
            let params = match &example.params {
                Some(params) => Value::Array(params_json(params)?),
                None => Value::Null,
            };
            Ok(json!({
                "params": params,
                "description": description_json(example.description.as_ref()),
            }))
        })
        .collect()
}

fn description_json(description: Option<&Description>) -> Value {
    match description {
        Some(d) => json!({ "type": d.kind.as_str(), "payload": d.payload }),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Rule, Validator};

    fn model() -> DocModel {
        let mut endpoint = ApiEndpoint::new("login", "/Api/Auth/login");
        endpoint.allowed_methods = vec![HttpMethod::Post];
        endpoint.params = vec![
            ParamDescriptor::new("account").with_validator(Validator::new(Rule::MaxLength(15))),
            ParamDescriptor::new("verify").with_children(vec![ParamDescriptor::new("code")]),
        ];
        let mut model = DocModel::default();
        model.group_entry("Api.Auth").endpoints.push(endpoint);
        model
    }

    #[test]
    fn renders_model_tree() {
        let out = JsonRenderer.render(&model()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let login = &value["groups"][0]["endpoints"][0];
        assert_eq!(value["groups"][0]["name"], "Api.Auth");
        assert_eq!(login["path"], "/Api/Auth/login");
        assert_eq!(login["methods"], json!(["POST"]));
        assert_eq!(
            login["params"][0]["validators"][0]["message"],
            "account max length is 15"
        );
        assert_eq!(login["params"][1]["type"], "object");
        assert_eq!(login["params"][1]["children"][0]["name"], "code");
    }

    #[test]
    fn keeps_field_order() {
        let out = JsonRenderer.render(&model()).unwrap();
        let name = out.find("\"api_name\"").unwrap();
        let path = out.find("\"path\"").unwrap();
        assert!(name < path);
    }

    #[test]
    fn malformed_object_is_rejected() {
        let mut model = model();
        model.groups[0].endpoints[0].params =
            vec![ParamDescriptor::new("o").with_type(ParamType::Object)];
        assert!(JsonRenderer.render(&model).is_err());
    }
}
