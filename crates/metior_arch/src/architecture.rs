//! The flattened architecture registry of top-level components.

use crate::compound::Component;
use crate::describe::{ArchitectureSpec, ComponentEntry};
use crate::primitive::PrimitiveComponent;
use crate::registry::ComponentRegistry;
use crate::template::TemplateRegistry;
use indexmap::IndexMap;
use metior_common::{EvalError, EvalResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// A named, flattened registry of top-level hardware components.
///
/// Built once from a flattened component list; components are owned
/// exclusively by the architecture (compound components transitively own
/// their subcomponents). The estimator and compiler access components by
/// name; class-based lookups recurse through compound subtrees.
#[derive(Debug)]
pub struct Architecture {
    name: String,
    version: String,
    config_label: IndexMap<String, String>,
    components: IndexMap<String, Component>,
    class_cache: Mutex<HashMap<String, Vec<String>>>,
}

impl Clone for Architecture {
    fn clone(&self) -> Self {
        // An isolated deep copy for parameter sweeps: independent
        // component state, cold caches.
        Self {
            name: self.name.clone(),
            version: self.version.clone(),
            config_label: self.config_label.clone(),
            components: self.components.clone(),
            class_cache: Mutex::new(HashMap::new()),
        }
    }
}

impl Architecture {
    /// Builds an architecture from its description and the two registries.
    ///
    /// Group subtrees in the description are flattened in order. Each
    /// entry instantiates a fresh primitive component or an independent
    /// clone of a registered compound template.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownComponent`] for a class found in
    /// neither registry.
    pub fn from_spec(
        spec: &ArchitectureSpec,
        registry: &ComponentRegistry,
        templates: &TemplateRegistry,
    ) -> EvalResult<Self> {
        let mut components = IndexMap::new();
        for entry in spec.flatten() {
            for (name, component) in instantiate_top(&entry, registry, templates)? {
                components.insert(name, component);
            }
        }
        Ok(Self {
            name: spec.name.clone(),
            version: spec.version.clone(),
            config_label: IndexMap::new(),
            components,
            class_cache: Mutex::new(HashMap::new()),
        })
    }

    /// The architecture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The architecture version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Provenance labels attached by parameter-sweep drivers.
    pub fn config_label(&self) -> &IndexMap<String, String> {
        &self.config_label
    }

    /// Attaches a provenance label.
    pub fn set_config_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config_label.insert(key.into(), value.into());
    }

    /// The ordered top-level components.
    pub fn components(&self) -> &IndexMap<String, Component> {
        &self.components
    }

    /// Mutable access to the top-level components.
    ///
    /// Callers that mutate component arguments or structure must call
    /// [`invalidate_caches`](Self::invalidate_caches) before the next
    /// evaluation.
    pub fn components_mut(&mut self) -> &mut IndexMap<String, Component> {
        &mut self.components
    }

    /// Looks up a top-level component by name.
    pub fn component(&self, name: &str) -> EvalResult<&Component> {
        self.components
            .get(name)
            .ok_or_else(|| EvalError::unknown_component(name))
    }

    /// Drops every memoized result in the architecture.
    pub fn invalidate_caches(&self) {
        self.class_cache.lock().unwrap().clear();
        for component in self.components.values() {
            component.clear_cache();
        }
    }

    /// Finds every primitive component of the given class.
    ///
    /// Unions direct top-level matches with recursive matches inside
    /// compound components; names are qualified by containment path. The
    /// path set is memoized per class.
    pub fn find_class(&self, class: &str) -> Vec<(String, &PrimitiveComponent)> {
        let paths = self.class_paths(class);
        paths
            .into_iter()
            .filter_map(|path| self.primitive_at(&path).map(|p| (path, p)))
            .collect()
    }

    /// Resolves a dot-separated path to a primitive component.
    pub fn primitive_at(&self, path: &str) -> Option<&PrimitiveComponent> {
        match path.split_once('.') {
            None => self.components.get(path)?.as_primitive(),
            Some((head, rest)) => match self.components.get(head)? {
                Component::Compound(inner) => inner.primitive_at(rest),
                Component::Primitive(_) => None,
            },
        }
    }

    fn class_paths(&self, class: &str) -> Vec<String> {
        if let Some(paths) = self.class_cache.lock().unwrap().get(class) {
            return paths.clone();
        }
        let mut paths = Vec::new();
        for (name, component) in &self.components {
            match component {
                Component::Primitive(p) if p.class_name() == class => paths.push(name.clone()),
                Component::Compound(c) => {
                    for (qualified, _) in c.find_class(class) {
                        // find_class qualifies with the instance name, which
                        // for a top-level compound is its registry key.
                        paths.push(qualified);
                    }
                }
                Component::Primitive(_) => {}
            }
        }
        self.class_cache
            .lock()
            .unwrap()
            .insert(class.to_string(), paths.clone());
        paths
    }
}

fn instantiate_top(
    entry: &ComponentEntry,
    registry: &ComponentRegistry,
    templates: &TemplateRegistry,
) -> EvalResult<Vec<(String, Component)>> {
    let base = if registry.is_primitive(&entry.class) {
        Component::Primitive(PrimitiveComponent::new(
            entry.name.clone(),
            &entry.class,
            entry.arguments.clone(),
            registry,
        )?)
    } else if templates.contains(&entry.class) {
        Component::Compound(templates.instantiate(&entry.class, &entry.name)?)
    } else {
        return Err(EvalError::unknown_component(&entry.class));
    };

    match entry.count {
        None => Ok(vec![(entry.name.clone(), base)]),
        Some(count) => Ok((0..count)
            .map(|i| {
                let name = format!("{}_{i}", entry.name);
                let mut instance = base.clone();
                instance.set_name(name.clone());
                (name, instance)
            })
            .collect()),
    }
}
