//! Bodies for the provider search endpoint.

use serde::Serialize;

use crate::domain::booking::Plan;
use crate::domain::directory::{Provider, SchoolScope, ServiceKind};

/// Public view of a directory entry. Contact details stay server side.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    /// `None` for counselors who serve every school.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schools: Option<Vec<String>>,
}

impl From<&Provider> for ProviderResponse {
    fn from(provider: &Provider) -> Self {
        let schools = match provider.school_scope() {
            SchoolScope::General => None,
            SchoolScope::Specific(schools) => {
                Some(schools.iter().map(|s| s.to_string()).collect())
            }
        };
        Self {
            id: provider.id().to_string(),
            name: provider.name().to_string(),
            role: provider.role().to_string(),
            label: provider.label().to_string(),
            languages: provider.languages().iter().map(|l| l.to_string()).collect(),
            topics: provider.topics().iter().map(|t| t.to_string()).collect(),
            schools,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub id: String,
    pub name: String,
    pub service: ServiceKind,
    pub price_cents: i64,
    pub duration_minutes: u32,
    pub sessions: usize,
}

impl From<&Plan> for PlanResponse {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            service: plan.service,
            price_cents: plan.price_cents,
            duration_minutes: plan.duration_minutes,
            sessions: plan.required_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSearchResponse {
    pub providers: Vec<ProviderResponse>,
    /// True when no school-specific counselor matched and general
    /// counselors are shown instead.
    pub used_fallback: bool,
    pub plans: Vec<PlanResponse>,
}
