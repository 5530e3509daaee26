//! The primitive component class library.
//!
//! [`ComponentRegistry`] is the in-process form of the cost-function lookup
//! service: it answers "is this class primitive?", hands out compiled
//! per-feature cost scripts, and provides class-level default arguments.
//! It is populated from [`PrimitiveClassSpec`] rows, the deserialization
//! target for whatever external loader feeds the library (a database
//! client, a YAML reader — out of scope here).

use indexmap::IndexMap;
use metior_common::{ArgBindings, ArgValue, EvalError, EvalResult, Feature};
use metior_script::CostScript;
use serde::Deserialize;
use std::collections::HashMap;

/// One action row of a primitive class: the three feature cost functions.
///
/// A missing function defaults to the constant `0`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    /// The action name (e.g. `read`, `write`, `mac`, `idle`).
    pub name: String,
    /// Energy cost expression, in pJ.
    #[serde(default = "zero_body")]
    pub energy: String,
    /// Area cost expression, in um^2.
    #[serde(default = "zero_body")]
    pub area: String,
    /// Cycle cost expression.
    #[serde(default = "zero_body")]
    pub cycle: String,
}

fn zero_body() -> String {
    "0".to_string()
}

impl ActionSpec {
    fn body(&self, feature: Feature) -> &str {
        match feature {
            Feature::Energy => &self.energy,
            Feature::Area => &self.area,
            Feature::Cycle => &self.cycle,
        }
    }
}

/// The description of one primitive component class.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimitiveClassSpec {
    /// The class name (keys component entries to this library).
    pub class: String,
    /// Shared parameter names and their default-value expressions.
    ///
    /// Every action script of the class is parameterized over these.
    #[serde(default)]
    pub arguments: IndexMap<String, String>,
    /// The actions this class supports.
    pub actions: Vec<ActionSpec>,
}

/// A compiled primitive class: per-feature script tables plus defaults.
#[derive(Debug, Clone)]
pub struct PrimitiveClass {
    class: String,
    default_arguments: ArgBindings,
    scripts: HashMap<Feature, IndexMap<String, CostScript>>,
}

impl PrimitiveClass {
    /// The class name.
    pub fn name(&self) -> &str {
        &self.class
    }

    /// Class-level default arguments (already evaluated to numbers).
    pub fn default_arguments(&self) -> &ArgBindings {
        &self.default_arguments
    }

    /// The `action -> script` table for one feature.
    pub fn feature_scripts(&self, feature: Feature) -> &IndexMap<String, CostScript> {
        &self.scripts[&feature]
    }
}

/// An explicit, in-memory registry of primitive component classes.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    classes: IndexMap<String, PrimitiveClass>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and registers a primitive class from its description.
    ///
    /// Every feature table is guaranteed an `idle` entry after
    /// registration: classes that do not define one get an implicit
    /// zero-cost idle script. Re-registering a class name replaces the
    /// previous definition.
    ///
    /// # Errors
    ///
    /// Returns script compilation errors ([`EvalError::UnsafeScript`],
    /// [`EvalError::MalformedScript`]) from any action body or default.
    pub fn register(&mut self, spec: &PrimitiveClassSpec) -> EvalResult<()> {
        let params: Vec<(String, String)> = spec
            .arguments
            .iter()
            .map(|(n, d)| (n.clone(), d.clone()))
            .collect();

        let mut scripts = HashMap::new();
        for feature in Feature::ALL {
            let mut table = IndexMap::new();
            for action in &spec.actions {
                table.insert(
                    action.name.clone(),
                    CostScript::compile(action.body(feature), &params)?,
                );
            }
            table
                .entry("idle".to_string())
                .or_insert_with(|| CostScript::constant(0.0));
            scripts.insert(feature, table);
        }

        // Defaults were validated as constants during script compilation above.
        let empty = IndexMap::new();
        let mut default_arguments = ArgBindings::new();
        for (name, default_src) in &spec.arguments {
            let value = metior_script::parser::parse(default_src)
                .and_then(|expr| metior_script::eval::evaluate(&expr, &empty))?;
            default_arguments.insert(name.clone(), ArgValue::Number(value));
        }

        self.classes.insert(
            spec.class.clone(),
            PrimitiveClass {
                class: spec.class.clone(),
                default_arguments,
                scripts,
            },
        );
        Ok(())
    }

    /// Whether the given class name is a registered primitive class.
    pub fn is_primitive(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Looks up a compiled class by name.
    pub fn class(&self, class: &str) -> EvalResult<&PrimitiveClass> {
        self.classes
            .get(class)
            .ok_or_else(|| EvalError::unknown_component(class))
    }
}
