//! Baseline merge: combine endpoint-local params with controller-shared ones.
//!
//! Endpoint-local params always win on a name collision. Baseline params
//! missing from the local set are appended in their own declaration order.
//! The merge is shallow: object children are never touched.

use crate::model::ParamDescriptor;
use std::collections::{HashMap, HashSet};

/// Effective parameter sequence for an endpoint.
pub fn merge_params(local: Vec<ParamDescriptor>, baseline: &[ParamDescriptor]) -> Vec<ParamDescriptor> {
    let declared: HashSet<&str> = local.iter().map(|p| p.name.as_str()).collect();
    let inherited: Vec<ParamDescriptor> = baseline
        .iter()
        .filter(|b| !declared.contains(b.name.as_str()))
        .cloned()
        .collect();

    let mut merged = local;
    merged.extend(inherited);
    merged
}

/// Collapse repeated baseline names: a name keeps the position of its first
/// declaration and the content of its last.
pub fn collapse_baseline(params: Vec<ParamDescriptor>) -> Vec<ParamDescriptor> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collapsed: Vec<ParamDescriptor> = Vec::with_capacity(params.len());
    for param in params {
        match index.get(&param.name).copied() {
            Some(pos) => collapsed[pos] = param,
            None => {
                index.insert(param.name.clone(), collapsed.len());
                collapsed.push(param);
            }
        }
    }
    collapsed
}
