//! Metadata extraction: registered controllers → [`DocModel`].
//!
//! Runs per controller in discovery order: group annotation, baseline params
//! from the entry handler, then every public member's endpoint annotation,
//! merged with the baseline. Fails fast on the first malformed declaration.

use crate::annotation::{ControllerDefinition, DEFAULT_GROUP, ENTRY_HANDLER};
use crate::discovery::Scanner;
use crate::error::{AnnotationError, Result};
use crate::merge::{collapse_baseline, merge_params};
use crate::model::*;
use crate::route::default_path;
use tracing::debug;

/// Build the metadata model for every controller the scanner knows.
pub fn build_model(scanner: &Scanner) -> Result<DocModel> {
    build_model_for(scanner, scanner.controllers())
}

/// Build the metadata model for the given controllers, in the given order.
pub fn build_model_for(scanner: &Scanner, identities: &[String]) -> Result<DocModel> {
    let mut model = DocModel::default();
    for identity in identities {
        let definition = scanner.cache().get(identity).ok_or_else(|| {
            AnnotationError::new(format!("controller {} is not registered", identity))
        })?;
        extract_controller(&mut model, definition, scanner.namespace())?;
    }
    debug!(
        groups = model.groups.len(),
        endpoints = model.endpoint_count(),
        "metadata model built"
    );
    Ok(model)
}

/// Baseline record of a controller.
pub fn controller_record(definition: &ControllerDefinition) -> Result<ControllerRecord> {
    let baseline = definition
        .decode_baseline()
        .map_err(|e| AnnotationError::in_member(e, &definition.identity, ENTRY_HANDLER))?;
    Ok(ControllerRecord {
        identity: definition.identity.clone(),
        baseline: collapse_baseline(baseline),
    })
}

fn extract_controller(model: &mut DocModel, definition: &ControllerDefinition, namespace: &str) -> Result<()> {
    let identity = definition.identity.as_str();
    let group = definition
        .decode_group()
        .map_err(|e| AnnotationError::in_controller(e, identity))?;
    let (group_name, group_description) = match group {
        Some(g) => (g.name, g.description),
        None => (DEFAULT_GROUP.to_string(), None),
    };
    let record = controller_record(definition)?;

    let group = model.group_entry(&group_name);
    for member in definition.endpoint_members() {
        let decl = definition
            .decode_api(member)
            .map_err(|e| AnnotationError::in_member(e, identity, &member.name))?;
        let Some(decl) = decl else {
            continue;
        };

        if group.endpoint(&decl.api_name).is_some() {
            return Err(AnnotationError::duplicate_api(&decl.api_name, &group_name));
        }

        group.endpoints.push(ApiEndpoint {
            api_name: decl.api_name,
            request_path: decl.request_path,
            default_path: default_path(identity, namespace, &member.name),
            allowed_methods: decl
                .allowed_methods
                .unwrap_or_else(|| HttpMethod::ALL.to_vec()),
            params: merge_params(decl.params, &record.baseline),
            description: decl.description,
            request_examples: decl.request_examples,
            success_examples: decl.success_examples,
            fail_examples: decl.fail_examples,
        });
    }

    // Write-once: a second description for the same group is an error, a
    // missing one never clears an earlier declaration.
    if let Some(description) = group_description {
        if group.description.is_some() {
            return Err(AnnotationError::duplicate_group_description(&group_name));
        }
        group.description = Some(description);
    }
    Ok(())
}
