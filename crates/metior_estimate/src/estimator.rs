//! The operation evaluator.

use crate::matrix::CostMatrix;
use crate::operation::{Operation, PipelineStage};
use crate::report::EstimateReport;
use indexmap::IndexMap;
use metior_arch::Architecture;
use metior_common::{ArgBindings, EvalError, EvalResult, Feature};

/// Evaluates an operation list against an architecture, one feature at a
/// time, producing a component × operation [`CostMatrix`] and totals.
///
/// Every cell starts at the component's idle cost for the operation (scaled
/// by the operation's repeat count, except for area); serial and parallel
/// operations overwrite their targets' cells, and pipelines model staggered
/// stage execution with idle-energy accounting over the pipeline's
/// wall-clock duration.
///
/// Evaluation never mutates the architecture beyond component memoization
/// caches, so a failing operation aborts that single evaluation and leaves
/// the architecture reusable.
#[derive(Debug)]
pub struct Estimator<'a> {
    architecture: &'a Architecture,
    operations: Option<Vec<Operation>>,
}

impl<'a> Estimator<'a> {
    /// Creates an estimator with no operation list yet.
    pub fn new(architecture: &'a Architecture) -> Self {
        Self {
            architecture,
            operations: None,
        }
    }

    /// Creates an estimator over an operation list.
    pub fn with_operations(architecture: &'a Architecture, operations: Vec<Operation>) -> Self {
        Self {
            architecture,
            operations: Some(operations),
        }
    }

    /// Sets or replaces the operation list.
    pub fn set_operations(&mut self, operations: Vec<Operation>) {
        self.operations = Some(operations);
    }

    /// Evaluates each requested feature in turn.
    pub fn estimate(&self, features: &[Feature]) -> EvalResult<Vec<EstimateReport>> {
        features.iter().map(|f| self.estimate_feature(*f)).collect()
    }

    /// Evaluates one feature over the whole operation list.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::NotInitialized`] if no operation list has been
    /// set, and propagates [`EvalError::UnknownComponent`] /
    /// [`EvalError::UnknownOperation`] from resolution failures.
    pub fn estimate_feature(&self, feature: Feature) -> EvalResult<EstimateReport> {
        let operations = self.operations.as_ref().ok_or_else(|| {
            EvalError::NotInitialized {
                what: "operation list".to_string(),
            }
        })?;

        let component_names: Vec<String> =
            self.architecture.components().keys().cloned().collect();
        let mut matrix = CostMatrix::new(&component_names, operations.len());
        let no_args = ArgBindings::new();

        for (col, operation) in operations.iter().enumerate() {
            // Area is structural: never multiplied by repeat counts.
            let repeat = if feature == Feature::Area {
                1
            } else {
                operation.repeat()
            };

            // Baseline: every component idles for this operation.
            for name in &component_names {
                let idle = self
                    .architecture
                    .component(name)?
                    .calculate_operation_stat("idle", feature, &no_args)?;
                matrix.set(name, col, idle * repeat as f64);
            }

            match operation {
                Operation::Serial { call, .. } => {
                    self.apply_call(&mut matrix, col, feature, call, repeat)?;
                }
                Operation::Parallel { calls, .. } => {
                    for call in calls {
                        self.apply_call(&mut matrix, col, feature, call, repeat)?;
                    }
                }
                Operation::Pipeline { stages, .. } => {
                    self.apply_pipeline(&mut matrix, col, feature, stages, repeat)?;
                }
            }
        }

        let mut component_totals = IndexMap::new();
        for name in &component_names {
            let total = match feature {
                Feature::Area => matrix.row_first(name),
                _ => matrix.row_sum(name),
            };
            component_totals.insert(name.clone(), total);
        }
        let total = match feature {
            Feature::Area => matrix.row_first(CostMatrix::TOTAL_ROW),
            _ => matrix.row_sum(CostMatrix::TOTAL_ROW),
        };

        Ok(EstimateReport {
            feature,
            matrix,
            component_totals,
            total,
        })
    }

    /// Applies one targeted call to its cell and refreshes the column total.
    fn apply_call(
        &self,
        matrix: &mut CostMatrix,
        col: usize,
        feature: Feature,
        call: &crate::operation::OpCall,
        repeat: u64,
    ) -> EvalResult<()> {
        let data = self
            .architecture
            .component(&call.target)?
            .calculate_operation_stat(&call.method, feature, &call.args)?;
        matrix.set(&call.target, col, data * repeat as f64);

        let total = match feature {
            Feature::Cycle => matrix.column_component_max(col),
            _ => matrix.column_component_sum(col),
        };
        matrix.set(CostMatrix::TOTAL_ROW, col, total);
        Ok(())
    }

    /// Applies a pipelined operation to one column.
    ///
    /// Stages execute staggered: `total_offset` accumulates each stage's
    /// offset, and the pipeline's end-to-end latency is the maximum over
    /// stages of `total_offset + stride * count * stage_cycles`. The stage
    /// cycle cost is always evaluated, even for energy/area, because the
    /// timing drives idle accounting.
    fn apply_pipeline(
        &self,
        matrix: &mut CostMatrix,
        col: usize,
        feature: Feature,
        stages: &[PipelineStage],
        repeat: u64,
    ) -> EvalResult<()> {
        let no_args = ArgBindings::new();
        let mut active_cycles: IndexMap<&str, f64> = self
            .architecture
            .components()
            .keys()
            .map(|name| (name.as_str(), 0.0))
            .collect();
        let mut touched: Vec<&str> = Vec::new();
        let mut total_cycles = 0.0_f64;
        let mut total_offset = 0.0_f64;

        for stage in stages {
            let component = self.architecture.component(&stage.call.target)?;
            let data =
                component.calculate_operation_stat(&stage.call.method, feature, &stage.call.args)?;
            let stage_cycles = if feature == Feature::Cycle {
                data
            } else {
                component.calculate_operation_stat(
                    &stage.call.method,
                    Feature::Cycle,
                    &stage.call.args,
                )?
            };

            let count = if feature == Feature::Area { 1 } else { stage.count };
            total_offset += stage.offset as f64;
            let completion = total_offset + stage.stride as f64 * count as f64 * stage_cycles;
            total_cycles = total_cycles.max(completion);

            let contribution = data * count as f64 * repeat as f64;
            let target = stage.call.target.as_str();
            if touched.contains(&target) {
                matrix.add(target, col, contribution);
            } else {
                // First stage on this component replaces its idle baseline.
                matrix.set(target, col, contribution);
                touched.push(target);
            }
            if let Some(active) = active_cycles.get_mut(target) {
                *active += stage_cycles * count as f64;
            }
        }

        match feature {
            Feature::Cycle => {
                matrix.set(CostMatrix::TOTAL_ROW, col, total_cycles * repeat as f64);
            }
            Feature::Energy => {
                // Components are busy only during their own stages and idle
                // for the rest of the pipeline's wall-clock duration. A
                // component whose active cycles exceed the pipeline latency
                // gets zero idle cycles, never negative idle energy.
                for name in self.architecture.components().keys() {
                    let idle_cycles = (total_cycles - active_cycles[name.as_str()]).max(0.0);
                    let idle_energy = self
                        .architecture
                        .component(name)?
                        .calculate_operation_stat("idle", Feature::Energy, &no_args)?;
                    matrix.add(name, col, idle_energy * idle_cycles * repeat as f64);
                }
                let sum = matrix.column_component_sum(col);
                matrix.set(CostMatrix::TOTAL_ROW, col, sum);
            }
            Feature::Area => {
                let sum = matrix.column_component_sum(col);
                matrix.set(CostMatrix::TOTAL_ROW, col, sum);
            }
        }
        Ok(())
    }
}
