//! Compound hardware components and the unified component enum.

use crate::describe::{ComponentEntry, CompoundSpec, SubOpKind};
use crate::registry::ComponentRegistry;
use crate::template::TemplateRegistry;
use crate::primitive::PrimitiveComponent;
use indexmap::IndexMap;
use metior_common::{
    canonical_args, parse_method_notation, ArgBindings, ArgValue, EvalError, EvalResult, Feature,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// A component of either kind, with a single evaluation interface.
///
/// Dispatch is a closed enum rather than dynamic attribute lookup: the set
/// of component kinds is fixed, and both kinds expose the same
/// `calculate_operation_stat` / `feature_reference_table` surface.
#[derive(Debug, Clone)]
pub enum Component {
    /// A leaf component with direct cost scripts.
    Primitive(PrimitiveComponent),
    /// A composition of named subcomponents.
    Compound(CompoundComponent),
}

impl Component {
    /// The instance name.
    pub fn name(&self) -> &str {
        match self {
            Component::Primitive(p) => p.name(),
            Component::Compound(c) => c.name(),
        }
    }

    /// Renames the instance.
    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Component::Primitive(p) => p.set_name(name),
            Component::Compound(c) => c.set_name(name),
        }
    }

    /// The component class name.
    pub fn class_name(&self) -> &str {
        match self {
            Component::Primitive(p) => p.class_name(),
            Component::Compound(c) => c.class_name(),
        }
    }

    /// Evaluates the cost of one operation for one feature.
    pub fn calculate_operation_stat(
        &self,
        operation: &str,
        feature: Feature,
        runtime_args: &ArgBindings,
    ) -> EvalResult<f64> {
        match self {
            Component::Primitive(p) => p.calculate_operation_stat(operation, feature, runtime_args),
            Component::Compound(c) => c.calculate_operation_stat(operation, feature, runtime_args),
        }
    }

    /// Evaluates every known operation at defaults for one feature.
    pub fn feature_reference_table(&self, feature: Feature) -> EvalResult<IndexMap<String, f64>> {
        match self {
            Component::Primitive(p) => p.feature_reference_table(feature),
            Component::Compound(c) => c.feature_reference_table(feature),
        }
    }

    /// Drops memoized results, recursively.
    pub fn clear_cache(&self) {
        match self {
            Component::Primitive(p) => p.clear_cache(),
            Component::Compound(c) => c.clear_cache(),
        }
    }

    /// Returns the primitive component, if this is one.
    pub fn as_primitive(&self) -> Option<&PrimitiveComponent> {
        match self {
            Component::Primitive(p) => Some(p),
            Component::Compound(_) => None,
        }
    }

    /// Returns the primitive component mutably, if this is one.
    pub fn as_primitive_mut(&mut self) -> Option<&mut PrimitiveComponent> {
        match self {
            Component::Primitive(p) => Some(p),
            Component::Compound(_) => None,
        }
    }
}

/// One resolved call inside a sub-operation: `target.method(args)`.
#[derive(Debug, Clone)]
struct SubOpCall {
    target: String,
    method: String,
    args: IndexMap<String, String>,
}

/// One step of an operation definition, with its targeted calls resolved
/// from method notation at construction time.
#[derive(Debug, Clone)]
struct SubOperation {
    calls: Vec<SubOpCall>,
    repeat: u64,
}

/// A hardware unit composed of named subcomponents, with cost derived
/// compositionally from its operation definitions.
///
/// Within one sub-operation, untargeted subcomponents default to `idle`;
/// energy combines by summing across subcomponents and cycle by taking the
/// maximum (critical path). Across sequential sub-operations both
/// accumulate by summing. Area is structural: only the first
/// sub-operation's footprint is counted, once.
#[derive(Debug)]
pub struct CompoundComponent {
    name: String,
    class: String,
    arguments: ArgBindings,
    subcomponents: IndexMap<String, Component>,
    groups: IndexMap<String, Vec<String>>,
    operations: IndexMap<String, Vec<SubOperation>>,
    cache: Mutex<HashMap<(String, Feature, String), f64>>,
    class_paths: Mutex<HashMap<String, Vec<String>>>,
}

impl Clone for CompoundComponent {
    fn clone(&self) -> Self {
        // Clones are independent instances with cold caches.
        Self {
            name: self.name.clone(),
            class: self.class.clone(),
            arguments: self.arguments.clone(),
            subcomponents: self.subcomponents.clone(),
            groups: self.groups.clone(),
            operations: self.operations.clone(),
            cache: Mutex::new(HashMap::new()),
            class_paths: Mutex::new(HashMap::new()),
        }
    }
}

impl CompoundComponent {
    /// Builds a compound component from its description.
    ///
    /// Subcomponent classes resolve against the primitive `registry` first
    /// and the compound `templates` second; a template may therefore only
    /// reference compound classes registered before it, which rules out
    /// containment cycles by construction order. Entries with a `count`
    /// expand to `name_0 .. name_{count-1}` and register `name` as an
    /// instance group. Operation notation is parsed and target-checked
    /// here, once, not per evaluation. An `idle` operation (all
    /// subcomponents idle in parallel) is generated when absent.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownComponent`] for an unknown subcomponent
    /// class or an operation targeting no subcomponent or group, and
    /// [`EvalError::MalformedOperation`] for unparsable notation.
    pub fn from_spec(
        spec: &CompoundSpec,
        registry: &ComponentRegistry,
        templates: &TemplateRegistry,
    ) -> EvalResult<Self> {
        let mut subcomponents: IndexMap<String, Component> = IndexMap::new();
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();

        for entry in &spec.subcomponents {
            for (name, component) in instantiate_entry(entry, registry, templates)? {
                subcomponents.insert(name, component);
            }
            if entry.count.is_some() {
                let members = expanded_names(entry);
                groups.insert(entry.name.clone(), members);
            }
        }

        let mut operations = IndexMap::new();
        for op in &spec.operations {
            let mut steps = Vec::new();
            for sub_op in &op.definition {
                let notations: Vec<&String> = match sub_op.kind {
                    SubOpKind::Serial => {
                        let single = sub_op.operation.as_ref().ok_or_else(|| {
                            EvalError::malformed_operation(format!(
                                "serial step of '{}' is missing its operation",
                                op.name
                            ))
                        })?;
                        vec![single]
                    }
                    SubOpKind::Parallel => sub_op.operations.iter().collect(),
                };
                let mut calls = Vec::new();
                for notation in notations {
                    let call = parse_method_notation(notation)?;
                    let target = call.require_target()?.to_string();
                    if !subcomponents.contains_key(&target) && !groups.contains_key(&target) {
                        return Err(EvalError::unknown_component(&target));
                    }
                    calls.push(SubOpCall {
                        target,
                        method: call.method,
                        args: call.args,
                    });
                }
                steps.push(SubOperation {
                    calls,
                    repeat: sub_op.operation_count,
                });
            }
            operations.insert(op.name.clone(), steps);
        }

        // Every compound component supports idle: all subcomponents idle
        // in parallel.
        operations.entry("idle".to_string()).or_insert_with(|| {
            vec![SubOperation {
                calls: subcomponents
                    .keys()
                    .map(|name| SubOpCall {
                        target: name.clone(),
                        method: "idle".to_string(),
                        args: IndexMap::new(),
                    })
                    .collect(),
                repeat: 1,
            }]
        });

        Ok(Self {
            name: spec.name.clone(),
            class: spec.class_name().to_string(),
            arguments: spec.arguments.clone(),
            subcomponents,
            groups,
            operations,
            cache: Mutex::new(HashMap::new()),
            class_paths: Mutex::new(HashMap::new()),
        })
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the instance.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The compound class name.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// The component-level arguments.
    pub fn arguments(&self) -> &ArgBindings {
        &self.arguments
    }

    /// The ordered subcomponents.
    pub fn subcomponents(&self) -> &IndexMap<String, Component> {
        &self.subcomponents
    }

    /// The instance groups registered by multi-instance expansion.
    pub fn groups(&self) -> &IndexMap<String, Vec<String>> {
        &self.groups
    }

    /// The defined operation names, including the implicit `idle`.
    pub fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }

    /// Drops memoized results, recursively through subcomponents.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
        self.class_paths.lock().unwrap().clear();
        for sub in self.subcomponents.values() {
            sub.clear_cache();
        }
    }

    /// Evaluates the cost of one operation for one feature.
    ///
    /// See the type-level docs for the aggregation semantics. Memoized per
    /// `(operation, feature, runtime-args)` like the primitive equivalent.
    pub fn calculate_operation_stat(
        &self,
        operation: &str,
        feature: Feature,
        runtime_args: &ArgBindings,
    ) -> EvalResult<f64> {
        let key = (
            operation.to_string(),
            feature,
            canonical_args(runtime_args),
        );
        if let Some(&value) = self.cache.lock().unwrap().get(&key) {
            return Ok(value);
        }

        let steps = self.operations.get(operation).ok_or_else(|| {
            EvalError::unknown_operation(&self.name, operation)
        })?;

        let mut out_value = 0.0;
        for step in steps {
            // Default every subcomponent to idle, then apply the step's
            // targeted calls over that baseline.
            let mut pending: IndexMap<&str, (&str, ArgBindings)> = self
                .subcomponents
                .keys()
                .map(|name| (name.as_str(), ("idle", ArgBindings::new())))
                .collect();

            for call in &step.calls {
                let merged = self.merge_call_args(call, runtime_args);
                match self.groups.get(&call.target) {
                    Some(members) => {
                        for member in members {
                            pending.insert(member.as_str(), (call.method.as_str(), merged.clone()));
                        }
                    }
                    None => {
                        pending.insert(call.target.as_str(), (call.method.as_str(), merged));
                    }
                }
            }

            let mut results = Vec::with_capacity(self.subcomponents.len());
            for (sub_name, sub) in &self.subcomponents {
                let (method, args) = &pending[sub_name.as_str()];
                let result = sub.calculate_operation_stat(method, feature, args)?;
                results.push(result * step.repeat as f64);
            }

            match feature {
                Feature::Energy => out_value += results.iter().sum::<f64>(),
                Feature::Cycle => out_value += results.iter().copied().fold(0.0, f64::max),
                Feature::Area => {
                    // Area is structural and operation-invariant: count the
                    // footprint once and stop.
                    out_value = results.iter().sum::<f64>();
                    break;
                }
            }
        }

        self.cache.lock().unwrap().insert(key, out_value);
        Ok(out_value)
    }

    /// Merges component arguments, call arguments (with component-argument
    /// textual substitution), and runtime arguments, later wins.
    fn merge_call_args(&self, call: &SubOpCall, runtime_args: &ArgBindings) -> ArgBindings {
        let mut merged = self.arguments.clone();
        for (name, raw) in &call.args {
            let mut text = raw.clone();
            for (comp_key, comp_value) in &self.arguments {
                if text.contains(comp_key.as_str()) {
                    text = text.replace(comp_key.as_str(), &comp_value.to_string());
                }
            }
            merged.insert(name.clone(), ArgValue::Text(text));
        }
        for (name, value) in runtime_args {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Evaluates every defined operation at defaults for one feature.
    pub fn feature_reference_table(&self, feature: Feature) -> EvalResult<IndexMap<String, f64>> {
        let empty = ArgBindings::new();
        let mut table = IndexMap::new();
        for op in self.operations.keys() {
            table.insert(op.clone(), self.calculate_operation_stat(op, feature, &empty)?);
        }
        Ok(table)
    }

    /// Finds every primitive subcomponent of the given class, recursively,
    /// with names qualified by their containment path.
    pub fn find_class(&self, class: &str) -> Vec<(String, &PrimitiveComponent)> {
        self.relative_class_paths(class)
            .into_iter()
            .filter_map(|path| {
                self.primitive_at(&path)
                    .map(|p| (format!("{}.{path}", self.name), p))
            })
            .collect()
    }

    /// Resolves a dot-separated path to a primitive subcomponent.
    pub fn primitive_at(&self, path: &str) -> Option<&PrimitiveComponent> {
        match path.split_once('.') {
            None => self.subcomponents.get(path)?.as_primitive(),
            Some((head, rest)) => match self.subcomponents.get(head)? {
                Component::Compound(inner) => inner.primitive_at(rest),
                Component::Primitive(_) => None,
            },
        }
    }

    /// Paths of matching primitives relative to this component, memoized.
    fn relative_class_paths(&self, class: &str) -> Vec<String> {
        if let Some(paths) = self.class_paths.lock().unwrap().get(class) {
            return paths.clone();
        }
        let mut paths = Vec::new();
        for (name, sub) in &self.subcomponents {
            match sub {
                Component::Primitive(p) if p.class_name() == class => paths.push(name.clone()),
                Component::Compound(inner) => {
                    for inner_path in inner.relative_class_paths(class) {
                        paths.push(format!("{name}.{inner_path}"));
                    }
                }
                Component::Primitive(_) => {}
            }
        }
        self.class_paths
            .lock()
            .unwrap()
            .insert(class.to_string(), paths.clone());
        paths
    }
}

/// Expands one entry into its named component instances.
fn instantiate_entry(
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
    } else {
        Component::Compound(templates.instantiate(&entry.class, &entry.name)?)
    };

    match entry.count {
        None => Ok(vec![(entry.name.clone(), base)]),
        Some(_) => Ok(expanded_names(entry)
            .into_iter()
            .map(|name| {
                let mut instance = base.clone();
                instance.set_name(name.clone());
                (name, instance)
            })
            .collect()),
    }
}

fn expanded_names(entry: &ComponentEntry) -> Vec<String> {
    let count = entry.count.unwrap_or(1);
    (0..count).map(|i| format!("{}_{i}", entry.name)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::describe::{OperationDef, SubOpDef};
    use crate::registry::tests::sram_spec;
    use crate::registry::{ActionSpec, PrimitiveClassSpec};

    pub(crate) fn intmac_spec() -> PrimitiveClassSpec {
        let mut arguments = IndexMap::new();
        arguments.insert("datasize".to_string(), "8".to_string());
        PrimitiveClassSpec {
            class: "intmac".to_string(),
            arguments,
            actions: vec![
                ActionSpec {
                    name: "multiply".to_string(),
                    energy: "0.5 * datasize".to_string(),
                    area: "10 * datasize".to_string(),
                    cycle: "1".to_string(),
                },
                ActionSpec {
                    name: "idle".to_string(),
                    energy: "0.01".to_string(),
                    area: "10 * datasize".to_string(),
                    cycle: "1".to_string(),
                },
            ],
        }
    }

    fn serial(notation: &str, count: u64) -> SubOpDef {
        SubOpDef {
            kind: SubOpKind::Serial,
            operation: Some(notation.to_string()),
            operations: Vec::new(),
            operation_count: count,
        }
    }

    fn parallel(notations: &[&str]) -> SubOpDef {
        SubOpDef {
            kind: SubOpKind::Parallel,
            operation: None,
            operations: notations.iter().map(|s| s.to_string()).collect(),
            operation_count: 1,
        }
    }

    /// A PE with 4 expanded MACs and a scratch SRAM.
    pub(crate) fn pe_spec() -> CompoundSpec {
        let mut arguments = ArgBindings::new();
        arguments.insert("pe_width".to_string(), ArgValue::Number(16.0));
        CompoundSpec {
            name: "pe".to_string(),
            class: None,
            arguments,
            subcomponents: vec![
                ComponentEntry {
                    name: "mac".to_string(),
                    class: "intmac".to_string(),
                    arguments: ArgBindings::new(),
                    count: Some(4),
                },
                ComponentEntry {
                    name: "scratch".to_string(),
                    class: "sram".to_string(),
                    arguments: ArgBindings::new(),
                    count: None,
                },
            ],
            operations: vec![
                OperationDef {
                    name: "mac_all".to_string(),
                    definition: vec![parallel(&["mac.multiply()"])],
                },
                OperationDef {
                    name: "load_then_mac".to_string(),
                    definition: vec![
                        serial("scratch.read()", 1),
                        parallel(&["mac.multiply()"]),
                    ],
                },
                OperationDef {
                    name: "mac_sized".to_string(),
                    definition: vec![serial("mac.multiply(datasize=pe_width)", 1)],
                },
            ],
        }
    }

    fn build_pe() -> CompoundComponent {
        let mut registry = ComponentRegistry::new();
        registry.register(&sram_spec()).unwrap();
        registry.register(&intmac_spec()).unwrap();
        let templates = TemplateRegistry::new();
        CompoundComponent::from_spec(&pe_spec(), &registry, &templates).unwrap()
    }

    #[test]
    fn multi_instance_expansion_and_group() {
        let pe = build_pe();
        let names: Vec<&str> = pe.subcomponents().keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["mac_0", "mac_1", "mac_2", "mac_3", "scratch"]);
        assert_eq!(pe.groups()["mac"], vec!["mac_0", "mac_1", "mac_2", "mac_3"]);
    }

    #[test]
    fn idle_operation_auto_generated() {
        let pe = build_pe();
        assert!(pe.operation_names().contains(&"idle".to_string()));
        // 4 idle MACs at 0.01 pJ plus the SRAM idle (0.001 * 32 * 32).
        let idle = pe
            .calculate_operation_stat("idle", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert!((idle - (4.0 * 0.01 + 1.024)).abs() < 1e-12);
    }

    #[test]
    fn group_targeted_parallel_energy_sums() {
        let pe = build_pe();
        // 4 MACs multiply (0.5 * 8 each) while the SRAM idles.
        let energy = pe
            .calculate_operation_stat("mac_all", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert!((energy - (4.0 * 4.0 + 1.024)).abs() < 1e-12);
    }

    #[test]
    fn cycle_is_max_within_step_and_sums_across_steps() {
        let pe = build_pe();
        // Each step's cycle cost is the max across subcomponents (1), and
        // the two sequential steps add.
        let cycles = pe
            .calculate_operation_stat("load_then_mac", Feature::Cycle, &ArgBindings::new())
            .unwrap();
        assert_eq!(cycles, 2.0);
    }

    #[test]
    fn area_counts_first_step_only() {
        let pe = build_pe();
        let area_two_steps = pe
            .calculate_operation_stat("load_then_mac", Feature::Area, &ArgBindings::new())
            .unwrap();
        let area_idle = pe
            .calculate_operation_stat("idle", Feature::Area, &ArgBindings::new())
            .unwrap();
        // Structural footprint: 4 MACs at 80 plus SRAM at 384, regardless
        // of which operation is evaluated.
        assert_eq!(area_two_steps, 4.0 * 80.0 + 384.0);
        assert_eq!(area_two_steps, area_idle);
    }

    #[test]
    fn component_argument_substitution() {
        let pe = build_pe();
        // mac_sized passes datasize=pe_width; pe_width substitutes to 16,
        // and the group target applies the call to all four MACs.
        let energy = pe
            .calculate_operation_stat("mac_sized", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert!((energy - (4.0 * 0.5 * 16.0 + 1.024)).abs() < 1e-12);
    }

    #[test]
    fn operation_repeat_factor() {
        let mut registry = ComponentRegistry::new();
        registry.register(&sram_spec()).unwrap();
        let spec = CompoundSpec {
            name: "reader".to_string(),
            class: None,
            arguments: ArgBindings::new(),
            subcomponents: vec![ComponentEntry {
                name: "buf".to_string(),
                class: "sram".to_string(),
                arguments: ArgBindings::new(),
                count: None,
            }],
            operations: vec![OperationDef {
                name: "burst_read".to_string(),
                definition: vec![serial("buf.read()", 8)],
            }],
        };
        let reader =
            CompoundComponent::from_spec(&spec, &registry, &TemplateRegistry::new()).unwrap();
        let energy = reader
            .calculate_operation_stat("burst_read", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert_eq!(energy, 80.0);
    }

    #[test]
    fn unknown_operation_errors() {
        let pe = build_pe();
        let err = pe
            .calculate_operation_stat("transpose", Feature::Energy, &ArgBindings::new())
            .unwrap_err();
        assert_eq!(err, EvalError::unknown_operation("pe", "transpose"));
    }

    #[test]
    fn construction_rejects_unknown_target() {
        let mut registry = ComponentRegistry::new();
        registry.register(&sram_spec()).unwrap();
        let spec = CompoundSpec {
            name: "broken".to_string(),
            class: None,
            arguments: ArgBindings::new(),
            subcomponents: vec![ComponentEntry {
                name: "buf".to_string(),
                class: "sram".to_string(),
                arguments: ArgBindings::new(),
                count: None,
            }],
            operations: vec![OperationDef {
                name: "oops".to_string(),
                definition: vec![serial("missing.read()", 1)],
            }],
        };
        let err =
            CompoundComponent::from_spec(&spec, &registry, &TemplateRegistry::new()).unwrap_err();
        assert_eq!(err, EvalError::unknown_component("missing"));
    }

    #[test]
    fn find_class_qualifies_paths() {
        let pe = build_pe();
        let srams = pe.find_class("sram");
        assert_eq!(srams.len(), 1);
        assert_eq!(srams[0].0, "pe.scratch");
        let macs = pe.find_class("intmac");
        assert_eq!(macs.len(), 4);
        assert_eq!(macs[0].0, "pe.mac_0");
    }

    #[test]
    fn memoization_on_compound() {
        let pe = build_pe();
        let a = pe
            .calculate_operation_stat("mac_all", Feature::Energy, &ArgBindings::new())
            .unwrap();
        let mac0 = pe.subcomponents()["mac_0"].as_primitive().unwrap();
        let count = mac0
            .script(Feature::Energy, "multiply")
            .unwrap()
            .execution_count();
        let b = pe
            .calculate_operation_stat("mac_all", Feature::Energy, &ArgBindings::new())
            .unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(
            mac0.script(Feature::Energy, "multiply")
                .unwrap()
                .execution_count(),
            count
        );
    }
}
