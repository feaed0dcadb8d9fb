use super::types::{Projection, ProjectionInputs, YearlySnapshot};

const CONTRIBUTIONS_PER_YEAR: f64 = 12.0;

/// Year-by-year projection for offsets `0..=inputs.years`.
///
/// Inputs are expected to have passed `ProjectionInputs::validate` and
/// `validate_start_year`; the engine itself never fails. `start_year` only
/// labels the snapshots.
pub fn run_projection(inputs: &ProjectionInputs, start_year: i32) -> Projection {
    let snapshots = (0..=inputs.years)
        .map(|offset| snapshot_at(inputs, start_year, offset))
        .collect();

    Projection {
        inputs: *inputs,
        start_year,
        snapshots,
    }
}

pub fn snapshot_at(inputs: &ProjectionInputs, start_year: i32, offset: u32) -> YearlySnapshot {
    let t = offset as f64;
    let total_value = lump_sum_value(inputs, t) + annuity_value(inputs, t);
    let principal_contributed =
        inputs.principal + inputs.monthly_contribution * CONTRIBUTIONS_PER_YEAR * t;

    YearlySnapshot {
        year: start_year.saturating_add(offset as i32),
        principal_contributed,
        total_value,
        earned_interest: total_value - principal_contributed,
        interest_rate: inputs.annual_rate,
    }
}

fn growth_factor(inputs: &ProjectionInputs, t: f64) -> f64 {
    let periods = inputs.periods_per_year as f64;
    (1.0 + inputs.annual_rate / periods).powf(periods * t)
}

fn lump_sum_value(inputs: &ProjectionInputs, t: f64) -> f64 {
    inputs.principal * growth_factor(inputs, t)
}

/// Future value of an ordinary annuity of `monthly_contribution` per period.
fn annuity_value(inputs: &ProjectionInputs, t: f64) -> f64 {
    let periods = inputs.periods_per_year as f64;
    let periodic_rate = inputs.annual_rate / periods;
    if periodic_rate == 0.0 {
        // Limit of the closed form as the rate goes to zero.
        return inputs.monthly_contribution * periods * t;
    }
    inputs.monthly_contribution * (growth_factor(inputs, t) - 1.0) / periodic_rate
}
