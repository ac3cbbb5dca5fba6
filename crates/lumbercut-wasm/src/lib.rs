//! WASM bindings for the lumbercut optimizer.

use lumbercut::{
    convert, OptimizationGoal, OptimizationJob, OptimizationResult, OptimizerSettings, RequiredCut,
    StockBoard, Unit,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Optimizer settings for WASM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[wasm_bindgen]
pub struct WasmOptimizerSettings {
    /// Saw kerf width.
    pub saw_kerf: f64,
    /// Kerf unit (0=in, 1=ft, 2=cm, 3=m, 4=mm).
    pub kerf_unit: u32,
    /// Shortest usable offcut.
    pub min_offcut_length: f64,
    /// Offcut unit (0=in, 1=ft, 2=cm, 3=m, 4=mm).
    pub min_offcut_unit: u32,
    /// Goal (0=minimize waste, 1=minimize boards, 2=prioritize cuts, 3=maximize offcuts).
    pub optimization_goal: u32,
}

#[wasm_bindgen]
impl WasmOptimizerSettings {
    /// Create default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        OptimizerSettings::default().into()
    }

    /// Create from JSON.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmOptimizerSettings, JsError> {
        serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Convert to JSON.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self).map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for WasmOptimizerSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn unit_code(unit: Unit) -> u32 {
    Unit::ALL.iter().position(|u| *u == unit).unwrap_or(0) as u32
}

fn unit_from_code(code: u32) -> Unit {
    Unit::ALL.get(code as usize).copied().unwrap_or_default()
}

fn goal_code(goal: OptimizationGoal) -> u32 {
    OptimizationGoal::ALL.iter().position(|g| *g == goal).unwrap_or(0) as u32
}

fn goal_from_code(code: u32) -> OptimizationGoal {
    OptimizationGoal::ALL
        .get(code as usize)
        .copied()
        .unwrap_or_default()
}

impl From<OptimizerSettings> for WasmOptimizerSettings {
    fn from(settings: OptimizerSettings) -> Self {
        Self {
            saw_kerf: settings.saw_kerf,
            kerf_unit: unit_code(settings.kerf_unit),
            min_offcut_length: settings.min_offcut_length,
            min_offcut_unit: unit_code(settings.min_offcut_unit),
            optimization_goal: goal_code(settings.optimization_goal),
        }
    }
}

impl From<WasmOptimizerSettings> for OptimizerSettings {
    fn from(settings: WasmOptimizerSettings) -> Self {
        Self {
            saw_kerf: settings.saw_kerf,
            kerf_unit: unit_from_code(settings.kerf_unit),
            min_offcut_length: settings.min_offcut_length,
            min_offcut_unit: unit_from_code(settings.min_offcut_unit),
            optimization_goal: goal_from_code(settings.optimization_goal),
        }
    }
}

/// Optimization result for WASM.
#[wasm_bindgen]
pub struct WasmOptimizationResult {
    inner: OptimizationResult,
}

#[wasm_bindgen]
impl WasmOptimizationResult {
    /// Number of boards in the plan.
    #[wasm_bindgen(getter, js_name = boardCount)]
    pub fn board_count(&self) -> usize {
        self.inner.cutting_plan_by_board.len()
    }

    /// Pieces placed on some board.
    #[wasm_bindgen(getter, js_name = placedCount)]
    pub fn placed_count(&self) -> usize {
        self.inner.placed_count()
    }

    /// Pieces no board could take.
    #[wasm_bindgen(getter, js_name = unaccommodatedCount)]
    pub fn unaccommodated_count(&self) -> usize {
        self.inner.unaccommodated_count()
    }

    /// Waste, in the minimum offcut unit.
    #[wasm_bindgen(getter, js_name = totalWasteLength)]
    pub fn total_waste_length(&self) -> f64 {
        self.inner.total_waste_length
    }

    /// Waste as a percentage of all stock.
    #[wasm_bindgen(getter, js_name = totalWastePercentage)]
    pub fn total_waste_percentage(&self) -> f64 {
        self.inner.total_waste_percentage
    }

    /// Estimated cost of the waste.
    #[wasm_bindgen(getter, js_name = estimatedWasteCost)]
    pub fn estimated_waste_cost(&self) -> f64 {
        self.inner.estimated_waste_cost
    }

    /// Cost of every board in the plan.
    #[wasm_bindgen(getter, js_name = totalMaterialCost)]
    pub fn total_material_cost(&self) -> f64 {
        self.inner.total_material_cost
    }

    /// Wall-clock time of the run in milliseconds.
    #[wasm_bindgen(getter, js_name = calculationTime)]
    pub fn calculation_time(&self) -> f64 {
        self.inner.calculation_time_ms
    }

    /// Full result as JSON.
    #[wasm_bindgen(js_name = resultJson)]
    pub fn result_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner).map_err(|e| JsError::new(&e.to_string()))
    }

    /// One board's plan as a JS object.
    #[wasm_bindgen(js_name = getBoardPlan)]
    pub fn get_board_plan(&self, board_index: usize) -> Result<JsValue, JsError> {
        let plan = self
            .inner
            .cutting_plan_by_board
            .get(board_index)
            .ok_or_else(|| JsError::new("board index out of bounds"))?;

        serde_wasm_bindgen::to_value(plan).map_err(|e| JsError::new(&e.to_string()))
    }
}

/// Optimize cut and stock lists given as JSON arrays.
#[wasm_bindgen(js_name = optimizeCuts)]
pub fn optimize_cuts(
    cuts_json: &str,
    stock_json: &str,
    settings: &WasmOptimizerSettings,
) -> Result<WasmOptimizationResult, JsError> {
    let cuts: Vec<RequiredCut> =
        serde_json::from_str(cuts_json).map_err(|e| JsError::new(&e.to_string()))?;
    let stock: Vec<StockBoard> =
        serde_json::from_str(stock_json).map_err(|e| JsError::new(&e.to_string()))?;
    let settings: OptimizerSettings = settings.clone().into();

    let inner = lumbercut::optimize(&cuts, &stock, &settings)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(WasmOptimizationResult { inner })
}

/// Optimize a whole job (`requiredCuts`, `stockLumber`, `settings`) given as
/// JSON and return the result as JSON.
#[wasm_bindgen(js_name = optimizeJson)]
pub fn optimize_json(job_json: &str) -> Result<String, JsError> {
    run_job_json(job_json).map_err(|e| JsError::new(&e))
}

fn run_job_json(job_json: &str) -> Result<String, String> {
    let job: OptimizationJob = serde_json::from_str(job_json).map_err(|e| e.to_string())?;
    let result = job.run().map_err(|e| e.to_string())?;
    serde_json::to_string(&result).map_err(|e| e.to_string())
}

/// Convert a length between two named units.
#[wasm_bindgen(js_name = convertLength)]
pub fn convert_length(value: f64, from: &str, to: &str) -> Result<f64, JsError> {
    convert_named(value, from, to).map_err(|e| JsError::new(&e))
}

fn convert_named(value: f64, from: &str, to: &str) -> Result<f64, String> {
    let from: Unit = from.parse().map_err(|e: lumbercut::OptimizerError| e.to_string())?;
    let to: Unit = to.parse().map_err(|e: lumbercut::OptimizerError| e.to_string())?;
    Ok(convert(value, from, to))
}

/// Get supported length units.
#[wasm_bindgen(js_name = getUnits)]
pub fn get_units() -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&unit_infos()).map_err(|e| JsError::new(&e.to_string()))
}

fn unit_infos() -> Vec<UnitInfo> {
    Unit::ALL
        .iter()
        .map(|unit| UnitInfo {
            id: unit_code(*unit),
            name: unit.name(),
            suffix: unit.suffix(),
            inches_per_unit: unit.inches_per_unit(),
        })
        .collect()
}

#[derive(Serialize)]
struct UnitInfo {
    id: u32,
    name: &'static str,
    suffix: &'static str,
    inches_per_unit: f64,
}

/// Get optimization goal names, indexed by their settings code.
#[wasm_bindgen(js_name = getOptimizationGoals)]
pub fn get_optimization_goals() -> js_sys::Array {
    OptimizationGoal::ALL
        .iter()
        .map(|goal| JsValue::from_str(goal.name()))
        .collect()
}
