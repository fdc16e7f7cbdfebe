//! Format-agnostic metadata model for a scan.
//!
//! Built once per scan and owned by it; nothing here is shared across scans.

use crate::validator::{Rule, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Where a parameter may be read from. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamFrom {
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "JSON")]
    Json,
    #[serde(alias = "XML")]
    Xml,
    #[serde(alias = "RAW")]
    Raw,
    #[serde(alias = "HEADER")]
    Header,
    #[serde(alias = "COOKIE")]
    Cookie,
    #[serde(alias = "FILE")]
    File,
    #[serde(alias = "ROUTE")]
    Route,
    #[serde(alias = "DI")]
    Di,
    #[serde(alias = "CONTEXT")]
    Context,
}

impl ParamFrom {
    pub const DEFAULT: [ParamFrom; 2] = [ParamFrom::Get, ParamFrom::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamFrom::Get => "GET",
            ParamFrom::Post => "POST",
            ParamFrom::Json => "JSON",
            ParamFrom::Xml => "XML",
            ParamFrom::Raw => "RAW",
            ParamFrom::Header => "HEADER",
            ParamFrom::Cookie => "COOKIE",
            ParamFrom::File => "FILE",
            ParamFrom::Route => "ROUTE",
            ParamFrom::Di => "DI",
            ParamFrom::Context => "CONTEXT",
        }
    }
}

/// Parameter shape. Every scalar kind (string, int, float, bool) collapses
/// to `Scalar`; only lists and objects change how values are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    #[serde(
        alias = "string",
        alias = "int",
        alias = "integer",
        alias = "float",
        alias = "double",
        alias = "real",
        alias = "bool",
        alias = "boolean"
    )]
    Scalar,
    List,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Scalar => "scalar",
            ParamType::List => "list",
            ParamType::Object => "object",
        }
    }
}

/// Declared default/example value of a parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParamValue {
    #[default]
    None,
    Value(Value),
    /// Sub-parameters of an object-typed parameter.
    Children(Vec<ParamDescriptor>),
}

/// One parameter and, for objects, its nested children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub from: Vec<ParamFrom>,
    pub param_type: ParamType,
    pub value: ParamValue,
    pub description: Option<Description>,
    pub validators: Vec<Validator>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: ParamFrom::DEFAULT.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: &[ParamFrom]) -> Self {
        self.from = from.to_vec();
        self
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = ParamValue::Value(value.into());
        self
    }

    /// Make this an object parameter with the given children.
    pub fn with_children(mut self, children: Vec<ParamDescriptor>) -> Self {
        self.param_type = ParamType::Object;
        self.value = ParamValue::Children(children);
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// True when an `Optional` rule is bound.
    pub fn is_optional(&self) -> bool {
        self.validators
            .iter()
            .any(|v| matches!(v.rule(), Rule::Optional))
    }

    /// True when a default/example value was declared.
    pub fn has_value(&self) -> bool {
        !matches!(self.value, ParamValue::None)
    }

    pub fn children(&self) -> Option<&[ParamDescriptor]> {
        match &self.value {
            ParamValue::Children(children) => Some(children),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionKind {
    #[serde(alias = "text")]
    Plain,
    #[serde(alias = "md")]
    Markdown,
    Json,
    Xml,
}

impl DescriptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionKind::Plain => "plain",
            DescriptionKind::Markdown => "markdown",
            DescriptionKind::Json => "json",
            DescriptionKind::Xml => "xml",
        }
    }
}

/// Inline text or a reference to a file rendered according to its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub kind: DescriptionKind,
    /// Inline text for `Plain`, a file path otherwise.
    pub payload: String,
}

impl Description {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: DescriptionKind::Plain,
            payload: text.into(),
        }
    }

    pub fn file(kind: DescriptionKind, path: impl AsRef<Path>) -> Self {
        Self {
            kind,
            payload: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self.kind {
            DescriptionKind::Plain => None,
            _ => Some(Path::new(&self.payload)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    pub params: Option<Vec<ParamDescriptor>>,
    pub description: Option<Description>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "head")]
    Head,
    #[serde(alias = "options")]
    Options,
}

impl HttpMethod {
    /// Verb set used when an endpoint declares none.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Post,
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoint {
    pub api_name: String,
    /// Path as declared, if any.
    pub request_path: Option<String>,
    /// Path derived from the controller identity and member name.
    pub default_path: String,
    pub allowed_methods: Vec<HttpMethod>,
    pub params: Vec<ParamDescriptor>,
    pub description: Option<Description>,
    pub request_examples: Vec<Example>,
    pub success_examples: Vec<Example>,
    pub fail_examples: Vec<Example>,
}

impl ApiEndpoint {
    pub fn new(api_name: impl Into<String>, default_path: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            request_path: None,
            default_path: default_path.into(),
            allowed_methods: HttpMethod::ALL.to_vec(),
            params: Vec::new(),
            description: None,
            request_examples: Vec::new(),
            success_examples: Vec::new(),
            fail_examples: Vec::new(),
        }
    }

    /// The path shown in the document: declared, else derived.
    pub fn path(&self) -> &str {
        match self.request_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => &self.default_path,
        }
    }
}

/// Endpoints sharing a group name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiGroup {
    pub name: String,
    pub description: Option<Description>,
    pub endpoints: Vec<ApiEndpoint>,
}

impl ApiGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn endpoint(&self, api_name: &str) -> Option<&ApiEndpoint> {
        self.endpoints.iter().find(|e| e.api_name == api_name)
    }
}

/// A discovered controller and its baseline parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerRecord {
    pub identity: String,
    /// Declared once on the entry handler, merged into every endpoint.
    pub baseline: Vec<ParamDescriptor>,
}

/// The complete metadata tree of a scan. Group order is discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocModel {
    pub groups: Vec<ApiGroup>,
}

impl DocModel {
    pub fn group(&self, name: &str) -> Option<&ApiGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Fetch a group, appending it on first sight.
    pub fn group_entry(&mut self, name: &str) -> &mut ApiGroup {
        let idx = match self.groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                self.groups.push(ApiGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }

    pub fn endpoint_count(&self) -> usize {
        self.groups.iter().map(|g| g.endpoints.len()).sum()
    }
}
