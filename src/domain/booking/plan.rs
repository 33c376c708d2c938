//! Bookable plans and the session counts they imply.

use serde::{Deserialize, Serialize};

use crate::domain::directory::ServiceKind;

/// Number of distinct slots a plan must be booked with.
///
/// Monthly tutoring and test-prep plans need four sessions, monthly
/// counseling two, and every other plan id (known or not) exactly one.
pub fn required_sessions_count(plan_id: &str) -> usize {
    match plan_id.trim() {
        "tutoring-monthly" | "test-prep-monthly" => 4,
        "counseling-monthly" => 2,
        _ => 1,
    }
}

/// A priced plan offered for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub service: ServiceKind,
    /// Price of the whole plan, all sessions included.
    pub price_cents: i64,
    pub duration_minutes: u32,
}

impl Plan {
    fn new(id: &str, name: &str, service: ServiceKind, price_cents: i64, duration_minutes: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            service,
            price_cents,
            duration_minutes,
        }
    }

    pub fn required_sessions(&self) -> usize {
        required_sessions_count(&self.id)
    }

    /// Share of the plan price attributed to each booked session.
    ///
    /// Any remainder cents land on the first session so the per-session
    /// prices always add up to the plan price.
    pub fn per_session_prices(&self) -> Vec<i64> {
        let count = self.required_sessions() as i64;
        let base = self.price_cents / count;
        let remainder = self.price_cents - base * count;
        (0..count)
            .map(|i| if i == 0 { base + remainder } else { base })
            .collect()
    }
}

/// All plans the marketplace sells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    pub fn standard() -> Self {
        use ServiceKind::*;
        Self::new(vec![
            Plan::new("tutoring-single", "Single Tutoring Session", Tutoring, 7_500, 60),
            Plan::new("tutoring-monthly", "Monthly Tutoring (4 sessions)", Tutoring, 26_000, 60),
            Plan::new("test-prep-single", "Single Test Prep Session", TestPrep, 9_000, 60),
            Plan::new("test-prep-monthly", "Monthly Test Prep (4 sessions)", TestPrep, 32_000, 60),
            Plan::new("counseling-single", "College Counseling Session", Counseling, 12_000, 60),
            Plan::new("counseling-monthly", "Monthly Counseling (2 sessions)", Counseling, 22_000, 60),
            Plan::new("virtual-tour-single", "Guided Virtual Campus Tour", VirtualTour, 5_000, 45),
        ])
    }

    pub fn find(&self, plan_id: &str) -> Option<&Plan> {
        let plan_id = plan_id.trim();
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn for_service(&self, service: ServiceKind) -> Vec<&Plan> {
        self.plans.iter().filter(|p| p.service == service).collect()
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_counts_follow_plan_kind() {
        assert_eq!(required_sessions_count("tutoring-monthly"), 4);
        assert_eq!(required_sessions_count("test-prep-monthly"), 4);
        assert_eq!(required_sessions_count("counseling-monthly"), 2);
        assert_eq!(required_sessions_count("tutoring-single"), 1);
        assert_eq!(required_sessions_count("virtual-tour-single"), 1);
        assert_eq!(required_sessions_count("something-new"), 1);
    }

    #[test]
    fn catalog_filters_by_service() {
        let catalog = PlanCatalog::standard();
        let counseling: Vec<&str> = catalog
            .for_service(ServiceKind::Counseling)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(counseling, vec!["counseling-single", "counseling-monthly"]);
        assert!(catalog.find(" tutoring-monthly ").is_some());
        assert!(catalog.find("tutoring-weekly").is_none());
    }

    #[test]
    fn per_session_prices_sum_to_plan_price() {
        let plan = Plan::new("tutoring-monthly", "x", ServiceKind::Tutoring, 10_001, 60);
        let prices = plan.per_session_prices();
        assert_eq!(prices, vec![2_501, 2_500, 2_500, 2_500]);
        assert_eq!(prices.iter().sum::<i64>(), 10_001);
    }
}
