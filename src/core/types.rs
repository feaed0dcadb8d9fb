use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PERIODS_PER_YEAR: u32 = 12;
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 100;
pub const RATE_STEP: f64 = 0.01;
pub const MIN_START_YEAR: i32 = 1;
pub const MAX_START_YEAR: i32 = 9999;

/// Which quantity the first (bottom) chart series carries.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartSeriesKind {
    #[default]
    #[serde(alias = "contributedPrincipal", alias = "contributed_principal")]
    ContributedPrincipal,
    #[serde(alias = "totalValue", alias = "total_value")]
    TotalValue,
}

/// One press of a form +/- button.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stepper {
    #[serde(alias = "incrementYears")]
    IncrementYears,
    #[serde(alias = "decrementYears")]
    DecrementYears,
    #[serde(alias = "incrementRate")]
    IncrementRate,
    #[serde(alias = "decrementRate")]
    DecrementRate,
}

impl Stepper {
    pub fn apply(self, inputs: ProjectionInputs) -> ProjectionInputs {
        match self {
            Stepper::IncrementYears => inputs.increment_years(),
            Stepper::DecrementYears => inputs.decrement_years(),
            Stepper::IncrementRate => inputs.increment_rate(),
            Stepper::DecrementRate => inputs.decrement_rate(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("principal must be >= 0, got {0}")]
    NegativePrincipal(f64),
    #[error("monthlyContribution must be >= 0, got {0}")]
    NegativeContribution(f64),
    #[error("interestRate must be between 0 and 1, got {0}")]
    RateOutOfRange(f64),
    #[error("years must be between 1 and 100, got {0}")]
    YearsOutOfRange(u32),
    #[error("periodsPerYear must be >= 1")]
    ZeroPeriods,
    #[error("startYear must be between 1 and 9999, got {0}")]
    StartYearOutOfRange(i32),
}

/// Keeps every labelled year, `start_year + years`, well inside `i32`.
pub fn validate_start_year(start_year: i32) -> Result<(), InputError> {
    if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&start_year) {
        return Err(InputError::StartYearOutOfRange(start_year));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInputs {
    pub principal: f64,
    pub annual_rate: f64,
    pub periods_per_year: u32,
    pub years: u32,
    pub monthly_contribution: f64,
}

impl Default for ProjectionInputs {
    fn default() -> Self {
        Self {
            principal: 100.0,
            annual_rate: 0.07,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            years: 15,
            monthly_contribution: 0.0,
        }
    }
}

impl ProjectionInputs {
    pub fn validate(&self) -> Result<(), InputError> {
        for (field, value) in [
            ("principal", self.principal),
            ("interestRate", self.annual_rate),
            ("monthlyContribution", self.monthly_contribution),
        ] {
            if !value.is_finite() {
                return Err(InputError::NonFinite { field });
            }
        }

        if self.principal < 0.0 {
            return Err(InputError::NegativePrincipal(self.principal));
        }

        if self.monthly_contribution < 0.0 {
            return Err(InputError::NegativeContribution(self.monthly_contribution));
        }

        if !(0.0..=1.0).contains(&self.annual_rate) {
            return Err(InputError::RateOutOfRange(self.annual_rate));
        }

        if !(MIN_YEARS..=MAX_YEARS).contains(&self.years) {
            return Err(InputError::YearsOutOfRange(self.years));
        }

        if self.periods_per_year == 0 {
            return Err(InputError::ZeroPeriods);
        }

        Ok(())
    }

    pub fn increment_years(self) -> Self {
        if self.years < MAX_YEARS {
            Self {
                years: self.years + 1,
                ..self
            }
        } else {
            self
        }
    }

    pub fn decrement_years(self) -> Self {
        if self.years > MIN_YEARS {
            Self {
                years: self.years - 1,
                ..self
            }
        } else {
            self
        }
    }

    pub fn increment_rate(self) -> Self {
        if self.annual_rate < 1.0 {
            Self {
                annual_rate: (self.annual_rate + RATE_STEP).min(1.0),
                ..self
            }
        } else {
            self
        }
    }

    pub fn decrement_rate(self) -> Self {
        if self.annual_rate > 0.0 {
            Self {
                annual_rate: (self.annual_rate - RATE_STEP).max(0.0),
                ..self
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: i32,
    pub principal_contributed: f64,
    pub total_value: f64,
    pub earned_interest: f64,
    pub interest_rate: f64,
}

/// One complete engine run. Replaced wholesale on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub inputs: ProjectionInputs,
    pub start_year: i32,
    pub snapshots: Vec<YearlySnapshot>,
}

impl Projection {
    pub fn final_snapshot(&self) -> Option<&YearlySnapshot> {
        self.snapshots.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_form() {
        let inputs = ProjectionInputs::default();
        assert_eq!(inputs.years, 15);
        assert_eq!(inputs.periods_per_year, 12);
        assert_eq!(inputs.principal, 100.0);
        assert_eq!(inputs.annual_rate, 0.07);
        assert_eq!(inputs.monthly_contribution, 0.0);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_principal() {
        let inputs = ProjectionInputs {
            principal: -1.0,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.validate(), Err(InputError::NegativePrincipal(-1.0)));
    }

    #[test]
    fn validate_rejects_negative_contribution() {
        let inputs = ProjectionInputs {
            monthly_contribution: -5.0,
            ..ProjectionInputs::default()
        };
        let err = inputs.validate().expect_err("must reject negative contribution");
        assert!(err.to_string().contains("monthlyContribution"));
    }

    #[test]
    fn validate_rejects_rate_outside_unit_interval() {
        for rate in [-0.01, 1.01] {
            let inputs = ProjectionInputs {
                annual_rate: rate,
                ..ProjectionInputs::default()
            };
            assert_eq!(inputs.validate(), Err(InputError::RateOutOfRange(rate)));
        }
        for rate in [0.0, 1.0] {
            let inputs = ProjectionInputs {
                annual_rate: rate,
                ..ProjectionInputs::default()
            };
            assert!(inputs.validate().is_ok());
        }
    }

    #[test]
    fn validate_rejects_years_outside_form_range() {
        for years in [0, 101] {
            let inputs = ProjectionInputs {
                years,
                ..ProjectionInputs::default()
            };
            let err = inputs.validate().expect_err("must reject years");
            assert_eq!(err.to_string(), format!("years must be between 1 and 100, got {years}"));
        }
    }

    #[test]
    fn validate_rejects_non_finite_and_zero_periods() {
        let inputs = ProjectionInputs {
            principal: f64::NAN,
            ..ProjectionInputs::default()
        };
        assert_eq!(
            inputs.validate(),
            Err(InputError::NonFinite { field: "principal" })
        );

        let inputs = ProjectionInputs {
            periods_per_year: 0,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.validate(), Err(InputError::ZeroPeriods));
    }

    #[test]
    fn year_steppers_clamp_to_form_range() {
        let inputs = ProjectionInputs {
            years: 100,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.increment_years().years, 100);
        assert_eq!(inputs.decrement_years().years, 99);

        let inputs = ProjectionInputs {
            years: 1,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.decrement_years().years, 1);
        assert_eq!(inputs.increment_years().years, 2);
    }

    #[test]
    fn rate_steppers_clamp_to_unit_interval() {
        let inputs = ProjectionInputs {
            annual_rate: 0.995,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.increment_rate().annual_rate, 1.0);
        assert_eq!(inputs.increment_rate().increment_rate().annual_rate, 1.0);

        let inputs = ProjectionInputs {
            annual_rate: 0.004,
            ..ProjectionInputs::default()
        };
        assert_eq!(inputs.decrement_rate().annual_rate, 0.0);
        assert_eq!(inputs.decrement_rate().decrement_rate().annual_rate, 0.0);
    }

    #[test]
    fn stepper_dispatches_to_matching_operation() {
        let inputs = ProjectionInputs::default();
        assert_eq!(Stepper::IncrementYears.apply(inputs).years, 16);
        assert_eq!(Stepper::DecrementYears.apply(inputs).years, 14);
        assert!((Stepper::IncrementRate.apply(inputs).annual_rate - 0.08).abs() < 1e-12);
        assert!((Stepper::DecrementRate.apply(inputs).annual_rate - 0.06).abs() < 1e-12);

        let step: Stepper =
            serde_json::from_str("\"incrementRate\"").expect("alias should parse");
        assert_eq!(step, Stepper::IncrementRate);
    }

    #[test]
    fn start_year_must_stay_in_calendar_range() {
        assert!(validate_start_year(2025).is_ok());
        assert!(validate_start_year(MIN_START_YEAR).is_ok());
        assert!(validate_start_year(MAX_START_YEAR).is_ok());
        for year in [0, -5, 10_000, i32::MAX - 1, i32::MIN] {
            assert_eq!(
                validate_start_year(year),
                Err(InputError::StartYearOutOfRange(year))
            );
        }
    }

    #[test]
    fn series_kind_accepts_web_aliases() {
        let kind: ChartSeriesKind =
            serde_json::from_str("\"totalValue\"").expect("alias should parse");
        assert_eq!(kind, ChartSeriesKind::TotalValue);
        let kind: ChartSeriesKind =
            serde_json::from_str("\"contributed-principal\"").expect("kebab should parse");
        assert_eq!(kind, ChartSeriesKind::ContributedPrincipal);
    }
}
