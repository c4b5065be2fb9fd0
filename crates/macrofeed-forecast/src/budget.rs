//! Personal budget projection on top of an inflation forecast.
//!
//! Applies the forecast inflation path to current expenses with
//! category-specific inflation factors (housing and healthcare outpace the
//! headline rate, entertainment lags it), compounds expected income
//! growth, and flags budget risks over the horizon.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::ForecastResult;

/// Expense category with its inflation factor relative to the headline
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Housing,
    Food,
    Transportation,
    Healthcare,
    Education,
    Entertainment,
    Utilities,
}

impl ExpenseCategory {
    pub const ALL: [Self; 7] = [
        Self::Housing,
        Self::Food,
        Self::Transportation,
        Self::Healthcare,
        Self::Education,
        Self::Entertainment,
        Self::Utilities,
    ];

    /// Multiplier applied to the headline inflation rate for this
    /// category.
    pub const fn inflation_factor(self) -> f64 {
        match self {
            Self::Housing => 1.2,
            Self::Food => 1.1,
            Self::Transportation => 1.0,
            Self::Healthcare => 1.3,
            Self::Education => 1.1,
            Self::Entertainment => 0.9,
            Self::Utilities => 1.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Entertainment => "entertainment",
            Self::Utilities => "utilities",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller's current financial position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAssumptions {
    /// Income per forecast period.
    pub income: f64,
    /// Compound income growth per period (0.03 = 3%).
    pub income_growth: f64,
    /// Current spend per category per period.
    pub expenses: Vec<(ExpenseCategory, f64)>,
}

/// One projected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// 1-based period offset into the forecast horizon.
    pub period: usize,
    pub income: f64,
    pub expenses: f64,
    pub surplus: f64,
    /// Share of income left over, in percent.
    pub savings_rate: f64,
}

/// Threshold-based findings over the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Advisory {
    LowSavingsRate { average: f64 },
    StrongSavingsRate { average: f64 },
    DeficitPeriods { count: usize },
    DecliningTrajectory,
    ImprovingTrajectory,
}

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowSavingsRate { average } => write!(
                f,
                "projected savings rate averages {average:.1}%; consider reducing expenses or increasing income"
            ),
            Self::StrongSavingsRate { average } => write!(
                f,
                "projected savings rate averages {average:.1}%; consider increasing investments"
            ),
            Self::DeficitPeriods { count } => {
                write!(f, "budget deficit expected in {count} period(s)")
            }
            Self::DecliningTrajectory => {
                write!(f, "financial position declines over the horizon")
            }
            Self::ImprovingTrajectory => {
                write!(f, "financial position improves over the horizon")
            }
        }
    }
}

/// Full budget projection across the forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProjection {
    pub periods: Vec<BudgetPeriod>,
    pub advisories: Vec<Advisory>,
}

const LOW_SAVINGS_RATE: f64 = 10.0;
const STRONG_SAVINGS_RATE: f64 = 25.0;

/// Project expenses per category under the forecast inflation path.
///
/// Each period compounds `1 + (rate * factor) / 100` onto the category's
/// running cost, mirroring how cost-of-living adjustments are applied.
pub fn project_costs(
    expenses: &[(ExpenseCategory, f64)],
    inflation: &ForecastResult,
) -> Vec<(ExpenseCategory, Vec<f64>)> {
    expenses
        .iter()
        .map(|(category, current)| {
            let mut compounded = 1.0;
            let path = inflation
                .points
                .iter()
                .map(|rate| {
                    compounded *= 1.0 + (rate * category.inflation_factor()) / 100.0;
                    current * compounded
                })
                .collect();
            (*category, path)
        })
        .collect()
}

/// Project the full budget: income growth against inflated expenses.
pub fn project_budget(
    assumptions: &BudgetAssumptions,
    inflation: &ForecastResult,
) -> BudgetProjection {
    let cost_paths = project_costs(&assumptions.expenses, inflation);

    let mut periods = Vec::with_capacity(inflation.horizon);
    let mut income = assumptions.income;
    for period in 0..inflation.horizon {
        income *= 1.0 + assumptions.income_growth;
        let expenses: f64 = cost_paths.iter().map(|(_, path)| path[period]).sum();
        let surplus = income - expenses;
        let savings_rate = if income != 0.0 {
            surplus / income * 100.0
        } else {
            0.0
        };
        periods.push(BudgetPeriod {
            period: period + 1,
            income,
            expenses,
            surplus,
            savings_rate,
        });
    }

    let advisories = advise(&periods);
    BudgetProjection { periods, advisories }
}

fn advise(periods: &[BudgetPeriod]) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    if periods.is_empty() {
        return advisories;
    }

    let average =
        periods.iter().map(|p| p.savings_rate).sum::<f64>() / periods.len() as f64;
    if average < LOW_SAVINGS_RATE {
        advisories.push(Advisory::LowSavingsRate { average });
    } else if average > STRONG_SAVINGS_RATE {
        advisories.push(Advisory::StrongSavingsRate { average });
    }

    let deficits = periods.iter().filter(|p| p.surplus < 0.0).count();
    if deficits > 0 {
        advisories.push(Advisory::DeficitPeriods { count: deficits });
    }

    let first = periods.first().expect("non-empty");
    let last = periods.last().expect("non-empty");
    if last.surplus < first.surplus {
        advisories.push(Advisory::DecliningTrajectory);
    } else {
        advisories.push(Advisory::ImprovingTrajectory);
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofeed_core::{Indicator, Region};

    fn inflation(points: Vec<f64>) -> ForecastResult {
        let lower: Vec<f64> = points.iter().map(|p| p - 0.5).collect();
        let upper: Vec<f64> = points.iter().map(|p| p + 0.5).collect();
        ForecastResult::new(
            Indicator::InflationRate,
            Region::parse("US").expect("valid"),
            points,
            lower,
            upper,
            "test",
        )
        .expect("bounds ordered")
    }

    #[test]
    fn housing_compounds_faster_than_entertainment() {
        let expenses = vec![
            (ExpenseCategory::Housing, 1000.0),
            (ExpenseCategory::Entertainment, 1000.0),
        ];
        let paths = project_costs(&expenses, &inflation(vec![5.0, 5.0, 5.0]));

        let housing = &paths[0].1;
        let entertainment = &paths[1].1;
        assert!(housing[2] > entertainment[2]);
        // Housing factor 1.2 on 5% inflation -> 6% per period.
        assert!((housing[0] - 1060.0).abs() < 1e-9);
        assert!((entertainment[0] - 1045.0).abs() < 1e-9);
    }

    #[test]
    fn surplus_budget_improves_with_income_growth() {
        let assumptions = BudgetAssumptions {
            income: 5000.0,
            income_growth: 0.05,
            expenses: vec![(ExpenseCategory::Housing, 1500.0), (ExpenseCategory::Food, 800.0)],
        };
        let projection = project_budget(&assumptions, &inflation(vec![2.0, 2.0, 2.0, 2.0]));

        assert_eq!(projection.periods.len(), 4);
        assert!(projection.periods.iter().all(|p| p.surplus > 0.0));
        assert!(projection
            .advisories
            .contains(&Advisory::ImprovingTrajectory));
        assert!(projection
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::StrongSavingsRate { .. })));
    }

    #[test]
    fn tight_budget_flags_deficits_and_decline() {
        let assumptions = BudgetAssumptions {
            income: 3000.0,
            income_growth: 0.0,
            expenses: vec![(ExpenseCategory::Housing, 2400.0), (ExpenseCategory::Food, 550.0)],
        };
        let projection = project_budget(&assumptions, &inflation(vec![8.0, 8.0, 8.0, 8.0, 8.0]));

        assert!(projection
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::DeficitPeriods { .. })));
        assert!(projection
            .advisories
            .contains(&Advisory::DecliningTrajectory));
        assert!(projection
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::LowSavingsRate { .. })));
    }

    #[test]
    fn cost_paths_cover_the_whole_horizon() {
        let expenses = vec![(ExpenseCategory::Utilities, 200.0)];
        let paths = project_costs(&expenses, &inflation(vec![3.0; 12]));
        assert_eq!(paths[0].1.len(), 12);
        // Monotone growth under positive inflation.
        for window in paths[0].1.windows(2) {
            assert!(window[1] > window[0]);
        }
    }
}
