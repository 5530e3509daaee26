//! Primitive (leaf) hardware components.

use crate::registry::ComponentRegistry;
use indexmap::IndexMap;
use metior_common::{canonical_args, ArgBindings, ArgValue, EvalError, EvalResult, Feature};
use metior_script::CostScript;
use std::collections::HashMap;
use std::sync::Mutex;

/// A leaf hardware unit with directly defined cost scripts per operation.
///
/// A primitive component owns an independent copy of its class's script
/// tables and merges class defaults, instance arguments, and runtime
/// arguments (later wins) when evaluating. Results are memoized per
/// `(operation, feature, runtime-args)`; the cache must be invalidated
/// explicitly with [`clear_cache`](Self::clear_cache) whenever instance
/// arguments change.
#[derive(Debug)]
pub struct PrimitiveComponent {
    name: String,
    class: String,
    args: ArgBindings,
    scripts: HashMap<Feature, IndexMap<String, CostScript>>,
    cache: Mutex<HashMap<(String, Feature, String), f64>>,
}

impl Clone for PrimitiveComponent {
    fn clone(&self) -> Self {
        // Clones are independent instances with a cold cache.
        Self {
            name: self.name.clone(),
            class: self.class.clone(),
            args: self.args.clone(),
            scripts: self.scripts.clone(),
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl PrimitiveComponent {
    /// Creates a component instance of a registered primitive class.
    ///
    /// Instance arguments override class defaults; argument names unknown
    /// to the class are kept (they flow through to scripts, which ignore
    /// undeclared bindings).
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownComponent`] if the class is not in the
    /// registry.
    pub fn new(
        name: impl Into<String>,
        class: &str,
        instance_args: ArgBindings,
        registry: &ComponentRegistry,
    ) -> EvalResult<Self> {
        let class_def = registry.class(class)?;
        let mut args = class_def.default_arguments().clone();
        for (k, v) in instance_args {
            args.insert(k, v);
        }
        let mut scripts = HashMap::new();
        for feature in Feature::ALL {
            scripts.insert(feature, class_def.feature_scripts(feature).clone());
        }
        Ok(Self {
            name: name.into(),
            class: class.to_string(),
            args,
            scripts,
            cache: Mutex::new(HashMap::new()),
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

    /// The primitive class name.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// The merged instance arguments.
    pub fn args(&self) -> &ArgBindings {
        &self.args
    }

    /// Sets one instance argument.
    ///
    /// The caller must follow up with [`clear_cache`](Self::clear_cache);
    /// memoized results computed under the old argument are stale.
    pub fn set_argument(&mut self, name: impl Into<String>, value: ArgValue) {
        self.args.insert(name.into(), value);
    }

    /// Drops all memoized results.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// The operation names known for a feature.
    pub fn operation_names(&self, feature: Feature) -> Vec<String> {
        self.scripts[&feature].keys().cloned().collect()
    }

    /// Direct access to one cost script, for instrumentation.
    pub fn script(&self, feature: Feature, operation: &str) -> Option<&CostScript> {
        self.scripts[&feature].get(operation)
    }

    /// Evaluates the cost of one operation for one feature.
    ///
    /// Merges instance arguments with `runtime_args` (runtime wins) and
    /// executes the matching cost script. Identical calls (same operation,
    /// feature, and argument bindings in any key order) return the
    /// memoized value without re-executing the script.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownOperation`] if the feature table has no
    /// such operation, or a script execution error.
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

        let script = self.scripts[&feature].get(operation).ok_or_else(|| {
            EvalError::unknown_operation(&self.name, operation)
        })?;

        let mut merged = self.args.clone();
        for (k, v) in runtime_args {
            merged.insert(k.clone(), v.clone());
        }
        let value = script.execute(&merged)?;

        self.cache.lock().unwrap().insert(key, value);
        Ok(value)
    }

    /// Evaluates every known operation at defaults for one feature.
    pub fn feature_reference_table(&self, feature: Feature) -> EvalResult<IndexMap<String, f64>> {
        let empty = ArgBindings::new();
        let mut table = IndexMap::new();
        for op in self.scripts[&feature].keys() {
            table.insert(op.clone(), self.calculate_operation_stat(op, feature, &empty)?);
        }
        Ok(table)
    }
}
