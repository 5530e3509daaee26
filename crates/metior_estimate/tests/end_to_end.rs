//! End-to-end estimation scenarios: library registration through
//! architecture construction to feature estimation and reporting.

use indexmap::IndexMap;
use metior_arch::{
    ActionSpec, Architecture, ArchitectureSpec, ComponentRegistry, CompoundSpec,
    PrimitiveClassSpec, TemplateRegistry,
};
use metior_common::Feature;
use metior_estimate::{report, Estimator, Operation, OperationSpec};

/// An `sram` whose `read` energy is a flat 10 pJ, idle energy 0, and
/// read cycle cost 1.
fn sram_spec() -> PrimitiveClassSpec {
    PrimitiveClassSpec {
        class: "sram".to_string(),
        arguments: IndexMap::new(),
        actions: vec![
            ActionSpec {
                name: "read".to_string(),
                energy: "10".to_string(),
                area: "250".to_string(),
                cycle: "1".to_string(),
            },
            ActionSpec {
                name: "write".to_string(),
                energy: "12".to_string(),
                area: "250".to_string(),
                cycle: "1".to_string(),
            },
            ActionSpec {
                name: "idle".to_string(),
                energy: "0".to_string(),
                area: "250".to_string(),
                cycle: "1".to_string(),
            },
        ],
    }
}

fn mac_spec() -> PrimitiveClassSpec {
    let mut arguments = IndexMap::new();
    arguments.insert("datasize".to_string(), "8".to_string());
    PrimitiveClassSpec {
        class: "intmac".to_string(),
        arguments,
        actions: vec![
            ActionSpec {
                name: "multiply".to_string(),
                energy: "0.5 * datasize".to_string(),
                area: "15 * datasize".to_string(),
                cycle: "2".to_string(),
            },
            ActionSpec {
                name: "idle".to_string(),
                energy: "0.05".to_string(),
                area: "15 * datasize".to_string(),
                cycle: "1".to_string(),
            },
        ],
    }
}

fn single_sram_architecture(registry: &ComponentRegistry) -> Architecture {
    let spec: ArchitectureSpec = serde_json::from_str(
        r#"{
            "name": "minimal",
            "version": "1.0",
            "components": [
                { "type": "component", "name": "sram", "class": "sram" }
            ]
        }"#,
    )
    .unwrap();
    Architecture::from_spec(&spec, registry, &TemplateRegistry::new()).unwrap()
}

#[test]
fn flat_read_energy_scenario() {
    // One serial `sram.read()` with operation-times 5: energy 5 * 10 = 50.
    let mut registry = ComponentRegistry::new();
    registry.register(&sram_spec()).unwrap();
    let arch = single_sram_architecture(&registry);

    let specs: Vec<OperationSpec> = serde_json::from_str(
        r#"[ { "type": "serial", "operation": "sram.read()", "operation-times": 5 } ]"#,
    )
    .unwrap();
    let estimator = Estimator::with_operations(&arch, Operation::parse_list(&specs).unwrap());

    let energy = estimator.estimate_feature(Feature::Energy).unwrap();
    assert_eq!(energy.total, 50.0);

    let cycle = estimator.estimate_feature(Feature::Cycle).unwrap();
    assert_eq!(cycle.total, 5.0);
}

#[test]
fn idle_only_operation_list() {
    // A list consisting solely of idle time costs exactly idle * cycles.
    let mut registry = ComponentRegistry::new();
    registry.register(&mac_spec()).unwrap();
    let spec: ArchitectureSpec = serde_json::from_str(
        r#"{
            "name": "idle_rig",
            "version": "1.0",
            "components": [
                { "type": "component", "name": "mac", "class": "intmac" }
            ]
        }"#,
    )
    .unwrap();
    let arch = Architecture::from_spec(&spec, &registry, &TemplateRegistry::new()).unwrap();

    let specs: Vec<OperationSpec> = serde_json::from_str(
        r#"[ { "type": "serial", "operation": "mac.idle()", "operation-times": 32 } ]"#,
    )
    .unwrap();
    let estimator = Estimator::with_operations(&arch, Operation::parse_list(&specs).unwrap());
    let energy = estimator.estimate_feature(Feature::Energy).unwrap();
    assert!((energy.total - 32.0 * 0.05).abs() < 1e-12);
}

#[test]
fn compound_architecture_full_sweep() {
    let mut registry = ComponentRegistry::new();
    registry.register(&sram_spec()).unwrap();
    registry.register(&mac_spec()).unwrap();

    let pe: CompoundSpec = serde_json::from_str(
        r#"{
            "name": "pe",
            "subcomponents": [
                { "name": "mac", "class": "intmac", "count": 2 }
            ],
            "operations": [
                { "name": "mac_all", "definition": [
                    { "type": "parallel", "operations": ["mac.multiply()"] }
                ]}
            ]
        }"#,
    )
    .unwrap();
    let mut templates = TemplateRegistry::new();
    templates.register(&pe, &registry).unwrap();

    let arch_spec: ArchitectureSpec = serde_json::from_str(
        r#"{
            "name": "npu",
            "version": "0.3",
            "components": [
                { "type": "component", "name": "data_sram", "class": "sram" },
                { "type": "component", "name": "pe", "class": "pe" }
            ]
        }"#,
    )
    .unwrap();
    let arch = Architecture::from_spec(&arch_spec, &registry, &templates).unwrap();

    let specs: Vec<OperationSpec> = serde_json::from_str(
        r#"[
            { "type": "serial", "operation": "data_sram.read()" },
            { "type": "parallel", "operations": ["data_sram.write()", "pe.mac_all()"] }
        ]"#,
    )
    .unwrap();
    let estimator = Estimator::with_operations(&arch, Operation::parse_list(&specs).unwrap());

    let energy = estimator.estimate_feature(Feature::Energy).unwrap();
    // Column 0: sram read 10, pe idle 2 * 0.05.
    assert!((energy.matrix.get("data_sram", 0) - 10.0).abs() < 1e-12);
    assert!((energy.matrix.get("pe", 0) - 0.1).abs() < 1e-12);
    // Column 1: sram write 12, pe mac_all 2 * 4.
    assert!((energy.matrix.get("pe", 1) - 8.0).abs() < 1e-12);
    assert!((energy.total - (10.0 + 0.1 + 12.0 + 8.0)).abs() < 1e-12);

    // Area: structural, first column only, identical across columns.
    let area = estimator.estimate_feature(Feature::Area).unwrap();
    assert_eq!(area.matrix.get("pe", 0), area.matrix.get("pe", 1));
    assert_eq!(area.total, 250.0 + 2.0 * 120.0);
}

#[test]
fn pipeline_through_spec_layer() {
    let mut registry = ComponentRegistry::new();
    registry.register(&sram_spec()).unwrap();
    registry.register(&mac_spec()).unwrap();
    let spec: ArchitectureSpec = serde_json::from_str(
        r#"{
            "name": "pipe_rig",
            "version": "1.0",
            "components": [
                { "type": "component", "name": "sram", "class": "sram" },
                { "type": "component", "name": "mac", "class": "intmac" }
            ]
        }"#,
    )
    .unwrap();
    let arch = Architecture::from_spec(&spec, &registry, &TemplateRegistry::new()).unwrap();

    // Stage 1: mac.multiply, count 2, cycles 2 -> candidate 1 + 4 = 5.
    // Stage 2: sram.read, count 1, cycles 1 -> candidate 2 + 1 = 3.
    let specs: Vec<OperationSpec> = serde_json::from_str(
        r#"[ { "type": "pipeline", "stages": [
            { "operation": "mac.multiply()", "count": 2 },
            { "operation": "sram.read()" }
        ]} ]"#,
    )
    .unwrap();
    let estimator = Estimator::with_operations(&arch, Operation::parse_list(&specs).unwrap());

    let cycle = estimator.estimate_feature(Feature::Cycle).unwrap();
    assert_eq!(cycle.total, 5.0);

    let energy = estimator.estimate_feature(Feature::Energy).unwrap();
    // mac: 2 multiplies at 4 pJ, active 4 of 5 cycles -> + 1 idle at 0.05.
    assert!((energy.matrix.get("mac", 0) - 8.05).abs() < 1e-12);
    // sram: 1 read at 10 pJ, idle energy 0.
    assert!((energy.matrix.get("sram", 0) - 10.0).abs() < 1e-12);
}

#[test]
fn report_rendering_end_to_end() {
    let mut registry = ComponentRegistry::new();
    registry.register(&sram_spec()).unwrap();
    let arch = single_sram_architecture(&registry);

    let specs: Vec<OperationSpec> = serde_json::from_str(
        r#"[ { "type": "serial", "operation": "sram.read()", "operation-times": 5 } ]"#,
    )
    .unwrap();
    let estimator = Estimator::with_operations(&arch, Operation::parse_list(&specs).unwrap());
    let energy = estimator.estimate_feature(Feature::Energy).unwrap();

    let text = energy.render_text();
    assert!(text.contains("Total Energy Estimation: 50 pJ"));
    let csv = energy.matrix_csv();
    assert!(csv.lines().count() == 3); // header, sram, total

    let table = report::render_reference_table(&arch, Feature::Energy).unwrap();
    assert!(table.contains("minimal, v.1.0"));
    assert!(table.contains("Component Name: sram"));
    assert!(table.contains("Operation: read"));
}

#[test]
fn batch_sweep_skips_failing_combination() {
    // A parameter sweep over width values: one combination produces a
    // failing operation reference; the remaining combinations still
    // evaluate after invalidating caches.
    let mut registry = ComponentRegistry::new();
    let mut arguments = IndexMap::new();
    arguments.insert("width".to_string(), "32".to_string());
    registry
        .register(&PrimitiveClassSpec {
            class: "sram".to_string(),
            arguments,
            actions: vec![
                ActionSpec {
                    name: "read".to_string(),
                    energy: "width / 4".to_string(),
                    area: "10".to_string(),
                    cycle: "1".to_string(),
                },
                ActionSpec {
                    name: "idle".to_string(),
                    energy: "0".to_string(),
                    area: "10".to_string(),
                    cycle: "1".to_string(),
                },
            ],
        })
        .unwrap();
    let mut arch = single_sram_architecture(&registry);

    let ops = |notation: &str| {
        let spec = OperationSpec::Serial {
            operation: notation.to_string(),
            operation_times: 1,
        };
        Operation::parse_list(std::slice::from_ref(&spec)).unwrap()
    };

    let mut totals = Vec::new();
    for (width, notation) in [
        (8.0, "sram.read()"),
        (16.0, "sram.refresh()"), // no such operation: skipped
        (64.0, "sram.read()"),
    ] {
        arch.components_mut()["sram"]
            .as_primitive_mut()
            .unwrap()
            .set_argument("width", metior_common::ArgValue::Number(width));
        arch.invalidate_caches();
        let estimator = Estimator::with_operations(&arch, ops(notation));
        if let Ok(report) = estimator.estimate_feature(Feature::Energy) {
            totals.push(report.total);
        }
    }
    assert_eq!(totals, vec![2.0, 16.0]);
}
