//! Annotation declaration surface.
//!
//! Controllers declare their metadata either in `*.toml` definition files or
//! through [`ControllerDefinition`]'s builder. Both end up as raw TOML values
//! per member; the typed `*Args` structs below are decoded from those values
//! only when a member is extracted, so a malformed declaration is reported
//! against the member that carries it.

use crate::error::AnnotationError;
use crate::model::*;
use crate::validator::ValidatorArgs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the implicit entry handler whose params are the controller baseline.
pub const ENTRY_HANDLER: &str = "on_request";

/// Group name used when a controller carries no group annotation.
pub const DEFAULT_GROUP: &str = "Default";

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("{0}")]
    Decode(#[from] toml::de::Error),
    #[error("{0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

// -- Argument types -----------------------------------------------------------

/// A single value or a list of them (`allow_method = "POST"` or `["GET", "POST"]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// `Description(type, desc)`; a bare string is plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionArgs {
    Text(String),
    Typed {
        #[serde(rename = "type")]
        kind: DescriptionKind,
        desc: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiGroupArgs {
    #[serde(alias = "name")]
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionArgs>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamArgs {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<OneOrMany<ParamFrom>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<ValidatorArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionArgs>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<ParamType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_object: Option<Vec<ParamArgs>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestParamArgs {
    #[serde(default)]
    pub params: Vec<ParamArgs>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<ParamArgs>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionArgs>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiArgs {
    pub api_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_method: Option<OneOrMany<HttpMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<ParamArgs>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_param: Option<RequestParamArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionArgs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_example: Vec<ExampleArgs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_example: Vec<ExampleArgs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_example: Vec<ExampleArgs>,
}

/// `#[Api]` arguments after conversion, before the baseline merge.
#[derive(Debug, Clone)]
pub struct ApiDecl {
    pub api_name: String,
    pub request_path: Option<String>,
    pub allowed_methods: Option<Vec<HttpMethod>>,
    pub params: Vec<ParamDescriptor>,
    pub description: Option<Description>,
    pub request_examples: Vec<Example>,
    pub success_examples: Vec<Example>,
    pub fail_examples: Vec<Example>,
}

// -- Conversion ---------------------------------------------------------------

/// Relative description files resolve against the declaring source's directory.
fn convert_description(args: DescriptionArgs, base_dir: Option<&Path>) -> Description {
    match args {
        DescriptionArgs::Text(text) => Description::plain(text),
        DescriptionArgs::Typed {
            kind: DescriptionKind::Plain,
            desc,
        } => Description::plain(desc),
        DescriptionArgs::Typed { kind, desc } => {
            let path = PathBuf::from(&desc);
            let path = match base_dir {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path,
            };
            Description::file(kind, path)
        }
    }
}

fn convert_params(args: Vec<ParamArgs>, base_dir: Option<&Path>) -> Result<Vec<ParamDescriptor>, ArgsError> {
    args.into_iter()
        .map(|p| p.into_descriptor(base_dir))
        .collect()
}

impl ParamArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn into_descriptor(self, base_dir: Option<&Path>) -> Result<ParamDescriptor, ArgsError> {
        if self.name.is_empty() {
            return Err(ArgsError::Invalid("param name can not be empty".into()));
        }
        let validators = self
            .validate
            .into_iter()
            .map(|v| v.into_validator().map_err(ArgsError::Invalid))
            .collect::<Result<Vec<_>, _>>()?;

        let mut param_type = self.param_type.unwrap_or_default();
        let value = match (self.sub_object, self.value) {
            (Some(_), Some(_)) => {
                return Err(ArgsError::Invalid(format!(
                    "param {} can not declare both value and sub_object",
                    self.name
                )))
            }
            (Some(children), None) => {
                param_type = ParamType::Object;
                ParamValue::Children(convert_params(children, base_dir)?)
            }
            // An object's value may itself be the list of sub-params; anything
            // else is kept verbatim and rejected when the tree is rendered.
            (None, Some(value)) if param_type == ParamType::Object => {
                match serde_json::from_value::<Vec<ParamArgs>>(value.clone()) {
                    Ok(children) => ParamValue::Children(convert_params(children, base_dir)?),
                    Err(_) => ParamValue::Value(value),
                }
            }
            (None, Some(value)) => ParamValue::Value(value),
            (None, None) => ParamValue::None,
        };

        Ok(ParamDescriptor {
            name: self.name,
            from: self
                .from
                .map(OneOrMany::into_vec)
                .unwrap_or_else(|| ParamFrom::DEFAULT.to_vec()),
            param_type,
            value,
            description: self.description.map(|d| convert_description(d, base_dir)),
            validators,
        })
    }
}

impl ExampleArgs {
    fn into_example(self, base_dir: Option<&Path>) -> Result<Example, ArgsError> {
        Ok(Example {
            params: self.params.map(|p| convert_params(p, base_dir)).transpose()?,
            description: self.description.map(|d| convert_description(d, base_dir)),
        })
    }
}

fn convert_examples(args: Vec<ExampleArgs>, base_dir: Option<&Path>) -> Result<Vec<Example>, ArgsError> {
    args.into_iter().map(|e| e.into_example(base_dir)).collect()
}

impl ApiArgs {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            ..Default::default()
        }
    }

    pub fn into_decl(self, base_dir: Option<&Path>) -> Result<ApiDecl, ArgsError> {
        if self.api_name.is_empty() {
            return Err(ArgsError::Invalid("api name can not be empty".into()));
        }
        let params = match (self.params, self.request_param) {
            (Some(_), Some(_)) => {
                return Err(ArgsError::Invalid(
                    "params and request_param can not be declared together".into(),
                ))
            }
            (Some(params), None) => params,
            (None, Some(request_param)) => request_param.params,
            (None, None) => Vec::new(),
        };
        let allowed_methods = self
            .allow_method
            .map(OneOrMany::into_vec)
            .filter(|m| !m.is_empty());

        Ok(ApiDecl {
            api_name: self.api_name,
            request_path: self.request_path.filter(|p| !p.is_empty()),
            allowed_methods,
            params: convert_params(params, base_dir)?,
            description: self.description.map(|d| convert_description(d, base_dir)),
            request_examples: convert_examples(self.request_example, base_dir)?,
            success_examples: convert_examples(self.success_example, base_dir)?,
            fail_examples: convert_examples(self.fail_example, base_dir)?,
        })
    }
}

/// Converted group annotation.
#[derive(Debug, Clone)]
pub struct GroupDecl {
    pub name: String,
    pub description: Option<Description>,
}

impl ApiGroupArgs {
    pub fn into_decl(self, base_dir: Option<&Path>) -> Result<GroupDecl, ArgsError> {
        if self.group_name.is_empty() {
            return Err(ArgsError::Invalid("group name can not be empty".into()));
        }
        Ok(GroupDecl {
            name: self.group_name,
            description: self.description.map(|d| convert_description(d, base_dir)),
        })
    }
}

// -- Controller definitions ---------------------------------------------------

/// A publicly reachable member of a controller and its raw `api` annotation.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub public: bool,
    pub api: Option<toml::Value>,
}

impl Member {
    /// A public member without an endpoint annotation.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: true,
            api: None,
        }
    }

    pub fn with_api(name: impl Into<String>, args: &ApiArgs) -> Result<Self, ArgsError> {
        Ok(Self {
            name: name.into(),
            public: true,
            api: Some(toml::Value::try_from(args)?),
        })
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// Structural reflection of one controller: identity plus raw annotations.
#[derive(Debug, Clone)]
pub struct ControllerDefinition {
    pub identity: String,
    /// Directory of the definition file; relative description paths resolve here.
    pub base_dir: Option<PathBuf>,
    pub group: Option<toml::Value>,
    /// Raw param annotations on the entry handler.
    pub baseline: Vec<toml::Value>,
    pub members: Vec<Member>,
}

#[derive(Deserialize)]
struct RawMember {
    name: String,
    #[serde(default = "default_public")]
    public: bool,
    #[serde(default)]
    api: Option<toml::Value>,
}

fn default_public() -> bool {
    true
}

#[derive(Deserialize)]
struct RawHandler {
    #[serde(default)]
    params: Vec<toml::Value>,
}

impl ControllerDefinition {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            base_dir: None,
            group: None,
            baseline: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_group(mut self, args: &ApiGroupArgs) -> Result<Self, ArgsError> {
        self.group = Some(toml::Value::try_from(args)?);
        Ok(self)
    }

    pub fn with_baseline_param(mut self, args: &ParamArgs) -> Result<Self, ArgsError> {
        self.baseline.push(toml::Value::try_from(args)?);
        Ok(self)
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Read a definition table. Returns `Ok(None)` when the table does not
    /// describe an API controller (the capability marker is absent or false).
    pub fn from_table(table: toml::Table, base_dir: Option<PathBuf>) -> Result<Option<Self>, AnnotationError> {
        let is_controller = table
            .get("annotation_controller")
            .and_then(toml::Value::as_bool)
            .unwrap_or(false);
        let identity = match table.get("controller").and_then(toml::Value::as_str) {
            Some(identity) if is_controller && !identity.is_empty() => identity.to_string(),
            _ => return Ok(None),
        };

        let baseline = match table.get(ENTRY_HANDLER) {
            Some(handler) => {
                decode::<RawHandler>(handler)
                    .map_err(|e| AnnotationError::in_member(e, &identity, ENTRY_HANDLER))?
                    .params
            }
            None => Vec::new(),
        };
        let members = match table.get("members") {
            Some(members) => decode::<Vec<RawMember>>(members)
                .map_err(|e| AnnotationError::in_controller(e, &identity))?
                .into_iter()
                .map(|m| Member {
                    name: m.name,
                    public: m.public,
                    api: m.api,
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Some(Self {
            identity,
            base_dir,
            group: table.get("group").cloned(),
            baseline,
            members,
        }))
    }

    /// Members eligible for endpoint extraction: public, excluding the entry handler.
    pub fn endpoint_members(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| m.public && m.name != ENTRY_HANDLER)
    }

    pub fn decode_group(&self) -> Result<Option<GroupDecl>, ArgsError> {
        self.group
            .as_ref()
            .map(|g| decode::<ApiGroupArgs>(g)?.into_decl(self.base_dir.as_deref()))
            .transpose()
    }

    pub fn decode_baseline(&self) -> Result<Vec<ParamDescriptor>, ArgsError> {
        self.baseline
            .iter()
            .map(|p| decode::<ParamArgs>(p)?.into_descriptor(self.base_dir.as_deref()))
            .collect()
    }

    pub fn decode_api(&self, member: &Member) -> Result<Option<ApiDecl>, ArgsError> {
        member
            .api
            .as_ref()
            .map(|api| decode::<ApiArgs>(api)?.into_decl(self.base_dir.as_deref()))
            .transpose()
    }
}

fn decode<T: DeserializeOwned>(value: &toml::Value) -> Result<T, ArgsError> {
    Ok(value.clone().try_into::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{RuleArgs, ValidatorArgs};

    fn table(src: &str) -> toml::Table {
        src.parse::<toml::Table>().unwrap()
    }

    #[test]
    fn non_controller_table_is_skipped() {
        let t = table("controller = \"App::Util\"\n");
        assert!(ControllerDefinition::from_table(t, None).unwrap().is_none());
    }

    #[test]
    fn controller_table_is_read() {
        let t = table(
            r#"
controller = "App::HttpController::Api::Auth"
annotation_controller = true

[[on_request.params]]
name = "token"

[[members]]
name = "login"
[members.api]
api_name = "login"

[[members]]
name = "helper"
public = false
"#,
        );
        let def = ControllerDefinition::from_table(t, None).unwrap().unwrap();
        assert_eq!(def.identity, "App::HttpController::Api::Auth");
        assert_eq!(def.baseline.len(), 1);
        assert_eq!(def.endpoint_members().count(), 1);
    }

    #[test]
    fn object_value_as_param_list() {
        let t = table(
            r#"
name = "verify"
type = "object"
value = [{ name = "code" }, { name = "phone" }]
"#,
        );
        let args: ParamArgs = toml::Value::Table(t).try_into().unwrap();
        let p = args.into_descriptor(None).unwrap();
        let names: Vec<_> = p.children().unwrap().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["code", "phone"]);
    }

    #[test]
    fn object_with_scalar_value_is_kept_malformed() {
        let args = ParamArgs {
            param_type: Some(ParamType::Object),
            value: Some(serde_json::json!("nope")),
            ..ParamArgs::new("verify")
        };
        let p = args.into_descriptor(None).unwrap();
        assert!(p.children().is_none());
        assert_eq!(p.value, ParamValue::Value(serde_json::json!("nope")));
    }

    #[test]
    fn sub_object_implies_object_type() {
        let args = ParamArgs {
            sub_object: Some(vec![ParamArgs::new("code")]),
            ..ParamArgs::new("verify")
        };
        let p = args.into_descriptor(None).unwrap();
        assert_eq!(p.param_type, ParamType::Object);
    }

    #[test]
    fn relative_description_resolves_against_base_dir() {
        let args = ParamArgs {
            description: Some(DescriptionArgs::Typed {
                kind: DescriptionKind::Markdown,
                desc: "docs/token.md".into(),
            }),
            ..ParamArgs::new("token")
        };
        let p = args.into_descriptor(Some(Path::new("/defs"))).unwrap();
        assert_eq!(
            p.description.unwrap().path(),
            Some(Path::new("/defs/docs/token.md"))
        );
    }

    #[test]
    fn params_and_request_param_conflict() {
        let args = ApiArgs {
            params: Some(vec![ParamArgs::new("a")]),
            request_param: Some(RequestParamArgs {
                params: vec![ParamArgs::new("b")],
            }),
            ..ApiArgs::new("x")
        };
        assert!(args.into_decl(None).is_err());
    }

    #[test]
    fn builder_round_trips_through_member() {
        let api = ApiArgs {
            allow_method: Some(OneOrMany::One(HttpMethod::Post)),
            params: Some(vec![ParamArgs {
                validate: vec![
                    ValidatorArgs::Name("required".into()),
                    ValidatorArgs::Rule(RuleArgs::MaxLength {
                        max_len: 15,
                        error_msg: None,
                    }),
                ],
                ..ParamArgs::new("account")
            }]),
            ..ApiArgs::new("login")
        };
        let member = Member::with_api("login", &api).unwrap();
        let def = ControllerDefinition::new("App::Auth").with_member(member);
        let decl = def.decode_api(&def.members[0]).unwrap().unwrap();
        assert_eq!(decl.allowed_methods, Some(vec![HttpMethod::Post]));
        assert_eq!(decl.params[0].validators.len(), 2);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let t = table("api_name = \"x\"\nbogus = 1\n");
        let err = decode::<ApiArgs>(&toml::Value::Table(t)).unwrap_err();
        assert!(err.to_string().contains("bogus"), "{err}");
    }
}
