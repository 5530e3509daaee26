//! Description types produced by external architecture loaders.
//!
//! These are plain serde targets: the YAML/database front-ends (out of
//! scope for this workspace) deserialize into them, and construction in
//! [`crate::architecture`] and [`crate::compound`] consumes them. A
//! description may group components into nested subtrees; [`flatten`]
//! expands groups into the flat, ordered component list the architecture
//! registry is built from.
//!
//! [`flatten`]: ArchitectureSpec::flatten

use metior_common::ArgBindings;
use serde::Deserialize;

/// One concrete component entry in a description.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    /// The instance name.
    pub name: String,
    /// The component class: a primitive class or a compound template name.
    pub class: String,
    /// Instance argument overrides.
    #[serde(default)]
    pub arguments: ArgBindings,
    /// Multi-instance expansion count.
    ///
    /// When present, the entry expands to `name_0 .. name_{count-1}` and
    /// registers `name` as an instance group addressing all of them.
    #[serde(default)]
    pub count: Option<u64>,
}

/// A node of a (possibly grouped) component tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentNode {
    /// A named grouping of further nodes; groups carry no cost themselves.
    Group {
        /// Optional group label, kept for provenance only.
        #[serde(default)]
        label: Option<String>,
        /// The nodes inside the group.
        components: Vec<ComponentNode>,
    },
    /// A concrete component.
    Component {
        /// The component entry.
        #[serde(flatten)]
        entry: ComponentEntry,
    },
}

/// A full architecture description.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureSpec {
    /// The architecture name.
    pub name: String,
    /// The architecture version string.
    pub version: String,
    /// The component tree.
    pub components: Vec<ComponentNode>,
}

impl ArchitectureSpec {
    /// Recursively expands groups into a flat, ordered component list.
    pub fn flatten(&self) -> Vec<ComponentEntry> {
        let mut flat = Vec::new();
        flatten_into(&self.components, &mut flat);
        flat
    }
}

fn flatten_into(nodes: &[ComponentNode], out: &mut Vec<ComponentEntry>) {
    for node in nodes {
        match node {
            ComponentNode::Group { components, .. } => flatten_into(components, out),
            ComponentNode::Component { entry } => out.push(entry.clone()),
        }
    }
}

/// The description of a compound component template.
#[derive(Debug, Clone, Deserialize)]
pub struct CompoundSpec {
    /// The template (and default instance) name.
    pub name: String,
    /// The template class name; defaults to `name`.
    #[serde(default)]
    pub class: Option<String>,
    /// Component-level arguments, substitutable into operation arguments.
    #[serde(default)]
    pub arguments: ArgBindings,
    /// The ordered subcomponents.
    pub subcomponents: Vec<ComponentEntry>,
    /// The named operation definitions.
    #[serde(default)]
    pub operations: Vec<OperationDef>,
}

impl CompoundSpec {
    /// The effective class name.
    pub fn class_name(&self) -> &str {
        self.class.as_deref().unwrap_or(&self.name)
    }
}

/// One named operation of a compound component.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationDef {
    /// The operation name.
    pub name: String,
    /// The ordered sub-operation steps.
    pub definition: Vec<SubOpDef>,
}

/// How the targets of one sub-operation execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubOpKind {
    /// A single targeted call.
    Serial,
    /// Several targeted calls executing together.
    Parallel,
}

/// One sub-operation step of an operation definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SubOpDef {
    /// Serial or parallel.
    #[serde(rename = "type")]
    pub kind: SubOpKind,
    /// The single call, for serial steps. Method notation.
    #[serde(default)]
    pub operation: Option<String>,
    /// The call list, for parallel steps. Method notation.
    #[serde(default)]
    pub operations: Vec<String>,
    /// Repeat factor applied to every subcomponent result of this step.
    #[serde(default = "default_count", rename = "operation-count")]
    pub operation_count: u64,
}

fn default_count() -> u64 {
    1
}
