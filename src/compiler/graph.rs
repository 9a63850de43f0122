//! Compiled-graph verification.
//!
//! The compiler builds a valid graph by construction; this is the check the
//! CLI runs before writing anything out:
//! - component IDs are unique and never reuse a raw source name
//! - every input is a raw source, a component ID, or `<route>.<branch>`
//! - the graph is acyclic

use crate::compiler::element::Element;
use crate::error::GraphError;
use std::collections::{BTreeMap, BTreeSet};

pub fn verify(elements: &[Element], raw_sources: &BTreeSet<String>) -> Result<(), GraphError> {
    // 1) Unique component IDs, distinct from raw sources.
    let mut by_id = BTreeMap::<&str, &Element>::new();
    for el in elements {
        if raw_sources.contains(&el.component_id) {
            return Err(GraphError::ShadowedSource(el.component_id.clone()));
        }
        if by_id.insert(el.component_id.as_str(), el).is_some() {
            return Err(GraphError::DuplicateComponent(el.component_id.clone()));
        }
    }

    // 2) Resolve inputs to the component that produces them.
    let mut parents = BTreeMap::<&str, Vec<&str>>::new();
    for el in elements {
        let resolved = parents.entry(el.component_id.as_str()).or_default();
        for input in &el.inputs {
            if raw_sources.contains(input) {
                continue;
            }
            match upstream(input, &by_id) {
                Some(id) => resolved.push(id),
                None => {
                    return Err(GraphError::DanglingInput {
                        component: el.component_id.clone(),
                        input: input.clone(),
                    });
                }
            }
        }
    }

    // 3) Cycle detection (DFS coloring), walking from each element to its parents.
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Mark {
        Temp,
        Perm,
    }

    fn dfs<'a>(
        v: &'a str,
        parents: &BTreeMap<&'a str, Vec<&'a str>>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), GraphError> {
        match marks.get(v).copied() {
            Some(Mark::Perm) => return Ok(()),
            Some(Mark::Temp) => {
                // v is in the current recursion stack => cycle
                stack.push(v);
                let start = stack.iter().position(|s| *s == v).unwrap_or(0);
                return Err(GraphError::Cycle(
                    stack[start..].iter().map(|s| s.to_string()).collect(),
                ));
            }
            None => {}
        }

        marks.insert(v, Mark::Temp);
        stack.push(v);
        if let Some(ps) = parents.get(v) {
            for &p in ps {
                dfs(p, parents, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(v, Mark::Perm);
        Ok(())
    }

    let mut marks = BTreeMap::<&str, Mark>::new();
    let mut stack = Vec::<&str>::new();
    for el in elements {
        stack.clear();
        dfs(el.component_id.as_str(), &parents, &mut marks, &mut stack)?;
    }

    Ok(())
}

/// Component behind an input: the ID itself, or the route of a `<route>.<branch>` input.
fn upstream<'a>(input: &str, by_id: &BTreeMap<&'a str, &'a Element>) -> Option<&'a str> {
    if let Some((id, _)) = by_id.get_key_value(input) {
        return Some(*id);
    }
    let (route, branch) = input.split_once('.')?;
    let (id, el) = by_id.get_key_value(route)?;
    el.branches()?.any(|b| b == branch).then_some(*id)
}

/// Whether every element only reads from raw sources or elements emitted before it.
pub fn is_topologically_ordered(elements: &[Element], raw_sources: &BTreeSet<String>) -> bool {
    let mut seen = BTreeMap::<&str, &Element>::new();
    for el in elements {
        let ok = el
            .inputs
            .iter()
            .all(|i| raw_sources.contains(i) || upstream(i, &seen).is_some());
        if !ok {
            return false;
        }
        seen.insert(el.component_id.as_str(), el);
    }
    true
}
