use serde::{Deserialize, Serialize};

/// Mid-point of the 8–10% average annual return the projections assume.
pub const DEFAULT_ANNUAL_RETURN: f64 = 0.09;

/// Projection horizons offered to the user, in years.
pub const PROJECTION_HORIZONS_YEARS: [u32; 2] = [5, 10];

/// The household inputs collected by the calculator form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProfile {
    /// Total monthly household bills, in CAD.
    pub monthly_bills_cad: f64,
    /// Number of people in the household.
    pub household_size: u32,
    /// Self-reported motivation to cut costs, 1–10.
    pub motivation: u8,
    /// Free-form savings goal ("pay down mortgage", "trip to Portugal", …).
    pub goal: String,
}

/// One point on the teaser projection series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: u32,
    /// Cash contributed so far (monthly savings × months elapsed).
    pub contributed: f64,
    /// Balance after monthly-compounded growth.
    pub balance: f64,
}

impl SavingsProfile {
    pub fn validate(&self) -> Result<(), String> {
        if !self.monthly_bills_cad.is_finite() || self.monthly_bills_cad <= 0.0 {
            return Err("monthly_bills_cad must be a positive number".to_string());
        }
        if self.monthly_bills_cad > 100_000.0 {
            return Err("monthly_bills_cad is implausibly large (max 100000)".to_string());
        }
        if self.household_size == 0 {
            return Err("household_size must be at least 1".to_string());
        }
        if self.household_size > 20 {
            return Err("household_size is implausibly large (max 20)".to_string());
        }
        if !(1..=10).contains(&self.motivation) {
            return Err("motivation must be between 1 and 10".to_string());
        }
        if self.goal.trim().is_empty() {
            return Err("goal must not be empty".to_string());
        }
        Ok(())
    }

    /// Free-tier estimate of monthly bill savings, in CAD.
    ///
    /// Deterministic teaser shown before any payment: a base fraction of the
    /// bills scaled by motivation (5.6% at motivation 1 up to 20% at 10),
    /// nudged up for larger households, which have more line items to trim.
    pub fn monthly_savings(&self) -> f64 {
        let motivation_rate = 0.04 + 0.016 * f64::from(self.motivation);
        let household_factor = 1.0 + 0.05 * f64::from(self.household_size.saturating_sub(1).min(5));
        self.monthly_bills_cad * motivation_rate * household_factor
    }

    /// Year-indexed projection of investing the freed-up cash, compounded
    /// monthly at `annual_return`. Index 0 is the starting point (zeroes);
    /// the series has `years + 1` entries.
    pub fn projection(&self, years: u32, annual_return: f64) -> Vec<ProjectionPoint> {
        let monthly = self.monthly_savings();
        let growth = 1.0 + annual_return / 12.0;
        let mut points = Vec::with_capacity(years as usize + 1);
        points.push(ProjectionPoint {
            year: 0,
            contributed: 0.0,
            balance: 0.0,
        });
        let mut balance = 0.0;
        for year in 1..=years {
            for _ in 0..12 {
                balance = balance * growth + monthly;
            }
            points.push(ProjectionPoint {
                year,
                contributed: monthly * f64::from(year) * 12.0,
                balance,
            });
        }
        points
    }

    /// Prompt for the premium recommendation, assembled from the profile.
    /// Sent to the Content Generator only after the gate reports unlocked.
    pub fn premium_prompt(&self) -> String {
        format!(
            "Aggressive Ontario household savings optimizer. \
             User: monthly bills ${bills:.0} CAD, household of {household}, \
             motivation {motivation}/10, goal: {goal}.\n\
             Include provincial rebates (Home Renovation Savings, up to 30% \
             on insulation and heat pumps).\n\
             Mix low-risk vehicles (GICs and HISAs at 3-4.5%) with \
             higher-risk growth (broad tech ETFs at 8-10% expected returns, \
             renewables).\n\
             Give 5-year and 10-year projections assuming 8-10% average \
             returns compounded monthly, starting from ${monthly:.0}/month in \
             freed-up cash.\n\
             Close with plain-language disclaimers: projections are \
             estimates, not financial advice.",
            bills = self.monthly_bills_cad,
            household = self.household_size,
            motivation = self.motivation,
            goal = self.goal.trim(),
            monthly = self.monthly_savings(),
        )
    }
}
