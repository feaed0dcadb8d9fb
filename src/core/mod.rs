mod chart;
mod engine;
mod format;
mod recalc;
mod types;

pub use chart::{AxisTick, ChartData, ChartSeries, DEFAULT_TICK_COUNT, tick_values};
pub use engine::{run_projection, snapshot_at};
pub use format::{CURRENCY_SYMBOL, NON_FINITE_PLACEHOLDER, format_axis_label, format_tooltip};
pub use recalc::{DEFAULT_QUIET_WINDOW, Recalculator};
pub use types::{
    ChartSeriesKind, DEFAULT_PERIODS_PER_YEAR, InputError, MAX_START_YEAR, MAX_YEARS,
    MIN_START_YEAR, MIN_YEARS, Projection, ProjectionInputs, RATE_STEP, Stepper, YearlySnapshot,
    validate_start_year,
};
