//! FindProvidersHandler - Which providers qualify for a student's selectors.

use std::sync::Arc;

use crate::domain::booking::{Plan, PlanCatalog};
use crate::domain::directory::{Provider, ProviderDirectory};
use crate::domain::matching::{find_qualifying, MatchQuery};

#[derive(Debug, Clone)]
pub struct FindProvidersResult {
    /// Directory order.
    pub providers: Vec<Provider>,
    /// General counselors stood in for school-specific ones.
    pub used_fallback: bool,
    /// Plans sold for the queried service.
    pub plans: Vec<Plan>,
}

pub struct FindProvidersHandler {
    directory: Arc<ProviderDirectory>,
    plans: Arc<PlanCatalog>,
}

impl FindProvidersHandler {
    pub fn new(directory: Arc<ProviderDirectory>, plans: Arc<PlanCatalog>) -> Self {
        Self { directory, plans }
    }

    /// Pure lookup; an incomplete query yields an empty result.
    pub fn handle(&self, query: &MatchQuery) -> FindProvidersResult {
        let matched = find_qualifying(&self.directory, query);
        let plans = query
            .service
            .map(|service| self.plans.for_service(service).into_iter().cloned().collect())
            .unwrap_or_default();

        tracing::debug!(
            service = ?query.service,
            matches = matched.providers.len(),
            used_fallback = matched.used_fallback,
            "Provider search"
        );

        FindProvidersResult {
            providers: matched.providers.into_iter().cloned().collect(),
            used_fallback: matched.used_fallback,
            plans,
        }
    }
}
