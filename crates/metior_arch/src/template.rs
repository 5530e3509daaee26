//! The compound component template registry.

use crate::compound::CompoundComponent;
use crate::describe::CompoundSpec;
use crate::registry::ComponentRegistry;
use indexmap::IndexMap;
use metior_common::{EvalError, EvalResult};

/// An explicit registry of compound component templates.
///
/// Templates are registered in a deterministic, caller-controlled order
/// (the loader honors an instance-order manifest, falling back to lexical
/// order). A template under construction can only reference templates
/// registered before it, so a component class can never transitively
/// contain itself. Instantiation produces independent value clones, never
/// shared references.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, CompoundComponent>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a compound component from its description and registers it
    /// under its class name.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; in particular, a subcomponent
    /// referencing a compound class not yet registered fails with
    /// [`EvalError::UnknownComponent`] — check the instance order.
    pub fn register(
        &mut self,
        spec: &CompoundSpec,
        registry: &ComponentRegistry,
    ) -> EvalResult<()> {
        let component = CompoundComponent::from_spec(spec, registry, self)?;
        self.templates.insert(spec.class_name().to_string(), component);
        Ok(())
    }

    /// Whether a template with the given class name is registered.
    pub fn contains(&self, class: &str) -> bool {
        self.templates.contains_key(class)
    }

    /// The registered template class names, in registration order.
    pub fn class_names(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }

    /// Clones a template into a named, independent instance.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownComponent`] if no such template exists.
    pub fn instantiate(&self, class: &str, name: &str) -> EvalResult<CompoundComponent> {
        let template = self
            .templates
            .get(class)
            .ok_or_else(|| EvalError::unknown_component(class))?;
        let mut instance = template.clone();
        instance.set_name(name);
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::tests::{intmac_spec, pe_spec};
    use crate::describe::{ComponentEntry, OperationDef, SubOpDef, SubOpKind};
    use crate::registry::tests::sram_spec;
    use metior_common::{ArgBindings, Feature};

    fn registries() -> (ComponentRegistry, TemplateRegistry) {
        let mut registry = ComponentRegistry::new();
        registry.register(&sram_spec()).unwrap();
        registry.register(&intmac_spec()).unwrap();
        (registry, TemplateRegistry::new())
    }

    #[test]
    fn register_and_instantiate() {
        let (registry, mut templates) = registries();
        templates.register(&pe_spec(), &registry).unwrap();
        assert!(templates.contains("pe"));

        let instance = templates.instantiate("pe", "pe_left").unwrap();
        assert_eq!(instance.name(), "pe_left");
        assert_eq!(instance.class_name(), "pe");
    }

    #[test]
    fn instances_do_not_alias() {
        let (registry, mut templates) = registries();
        templates.register(&pe_spec(), &registry).unwrap();

        let a = templates.instantiate("pe", "pe_a").unwrap();
        let b = templates.instantiate("pe", "pe_b").unwrap();

        // Warm a's caches; b must stay cold and still evaluate identically.
        let ea = a
            .calculate_operation_stat("mac_all", Feature::Energy, &ArgBindings::new())
            .unwrap();
        let eb = b
            .calculate_operation_stat("mac_all", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert_eq!(ea.to_bits(), eb.to_bits());
    }

    #[test]
    fn nested_template_by_construction_order() {
        let (registry, mut templates) = registries();
        templates.register(&pe_spec(), &registry).unwrap();

        // A cluster of two PEs, valid only because "pe" is already there.
        let cluster = CompoundSpec {
            name: "cluster".to_string(),
            class: None,
            arguments: ArgBindings::new(),
            subcomponents: vec![ComponentEntry {
                name: "pe".to_string(),
                class: "pe".to_string(),
                arguments: ArgBindings::new(),
                count: Some(2),
            }],
            operations: vec![OperationDef {
                name: "mac_both".to_string(),
                definition: vec![SubOpDef {
                    kind: SubOpKind::Parallel,
                    operation: None,
                    operations: vec!["pe.mac_all()".to_string()],
                    operation_count: 1,
                }],
            }],
        };
        templates.register(&cluster, &registry).unwrap();

        let instance = templates.instantiate("cluster", "c0").unwrap();
        let energy = instance
            .calculate_operation_stat("mac_both", Feature::Energy, &ArgBindings::new())
            .unwrap();
        // Both PEs run mac_all: 4 MACs at 4.0 each plus SRAM idle.
        assert!((energy - 2.0 * (16.0 + 1.024)).abs() < 1e-12);
    }

    #[test]
    fn forward_reference_rejected() {
        let (registry, mut templates) = registries();
        let cluster = CompoundSpec {
            name: "cluster".to_string(),
            class: None,
            arguments: ArgBindings::new(),
            subcomponents: vec![ComponentEntry {
                name: "pe0".to_string(),
                class: "pe".to_string(),
                arguments: ArgBindings::new(),
                count: None,
            }],
            operations: Vec::new(),
        };
        let err = templates.register(&cluster, &registry).unwrap_err();
        assert_eq!(err, EvalError::unknown_component("pe"));
    }

    #[test]
    fn unknown_template_instantiation() {
        let templates = TemplateRegistry::new();
        assert!(templates.instantiate("pe", "x").is_err());
    }
}
