//! Booking draft and the five-step wizard gate.
//!
//! ```text
//! Service ──► Plan ──► Details ──► Schedule ──► Provider ──► Complete
//!   (1)        (2)       (3)          (4)          (5)
//! ```
//!
//! A draft is short-lived, client-owned state. Selections mutate it,
//! `advance` moves forward one step when that step's predicate holds, and
//! `finalize` turns a completed draft into a [`FinalizedBooking`] for
//! checkout. Changing an earlier answer clears whatever depended on it and
//! rewinds the current step so stale choices cannot slip through.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::directory::{Provider, ProviderDirectory, ServiceKind, TutoringSubject};
use crate::domain::foundation::{ProviderId, ValidationError};
use crate::domain::matching::{has_qualifying_provider, list_qualifying_providers, MatchQuery};

use super::errors::BookingError;
use super::plan::{required_sessions_count, Plan, PlanCatalog};
use super::slot::Slot;

/// Wizard position. Steps 1-5 each have a gate; `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Service,
    Plan,
    Details,
    Schedule,
    Provider,
    Complete,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Service => 1,
            WizardStep::Plan => 2,
            WizardStep::Details => 3,
            WizardStep::Schedule => 4,
            WizardStep::Provider => 5,
            WizardStep::Complete => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Service => "service",
            WizardStep::Plan => "plan",
            WizardStep::Details => "details",
            WizardStep::Schedule => "schedule",
            WizardStep::Provider => "provider",
            WizardStep::Complete => "complete",
        }
    }

    fn next(&self) -> Self {
        match self {
            WizardStep::Service => WizardStep::Plan,
            WizardStep::Plan => WizardStep::Details,
            WizardStep::Details => WizardStep::Schedule,
            WizardStep::Schedule => WizardStep::Provider,
            WizardStep::Provider | WizardStep::Complete => WizardStep::Complete,
        }
    }

    fn previous(&self) -> Self {
        match self {
            WizardStep::Service | WizardStep::Plan => WizardStep::Service,
            WizardStep::Details => WizardStep::Plan,
            WizardStep::Schedule => WizardStep::Details,
            WizardStep::Provider => WizardStep::Schedule,
            WizardStep::Complete => WizardStep::Provider,
        }
    }

    const GATED: [WizardStep; 5] = [
        WizardStep::Service,
        WizardStep::Plan,
        WizardStep::Details,
        WizardStep::Schedule,
        WizardStep::Provider,
    ];
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.name())
    }
}

/// Read-only inputs the gates consult.
#[derive(Debug, Clone, Copy)]
pub struct BookingContext<'a> {
    pub directory: &'a ProviderDirectory,
    pub plans: &'a PlanCatalog,
}

impl<'a> BookingContext<'a> {
    pub fn new(directory: &'a ProviderDirectory, plans: &'a PlanCatalog) -> Self {
        Self { directory, plans }
    }
}

/// Raw wizard answers, as a client submits them at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSelection {
    pub service: Option<ServiceKind>,
    pub plan: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub school: Option<String>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    pub provider_id: Option<String>,
}

/// A draft that passed every gate, ready for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedBooking {
    pub service: ServiceKind,
    pub plan: Plan,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub school: Option<String>,
    /// Chronological.
    pub slots: Vec<Slot>,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub provider_email: Option<String>,
}

impl FinalizedBooking {
    pub fn price_cents(&self) -> i64 {
        self.plan.price_cents
    }

    /// Human-readable line for the checkout page and meeting topic.
    pub fn description(&self) -> String {
        let detail = self
            .topic
            .as_deref()
            .or(self.subject.as_deref())
            .or(self.school.as_deref())
            .unwrap_or_default();
        if detail.is_empty() {
            format!("{} with {}", self.plan.name, self.provider_name)
        } else {
            format!("{} ({}) with {}", self.plan.name, detail, self.provider_name)
        }
    }
}

/// In-progress wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    service: Option<ServiceKind>,
    plan: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
    school: Option<String>,
    slots: Vec<Slot>,
    provider: Option<ProviderId>,
    step: WizardStep,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingDraft {
    pub fn new() -> Self {
        Self {
            service: None,
            plan: None,
            subject: None,
            topic: None,
            school: None,
            slots: Vec::new(),
            provider: None,
            step: WizardStep::Service,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn service(&self) -> Option<ServiceKind> {
        self.service
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn school(&self) -> Option<&str> {
        self.school.as_deref()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn provider(&self) -> Option<&ProviderId> {
        self.provider.as_ref()
    }

    /// Slots the chosen plan needs; 1 until a plan is picked.
    pub fn required_slots(&self) -> usize {
        self.plan.as_deref().map(required_sessions_count).unwrap_or(1)
    }

    // ───────────────────────────────────────────────────────────────
    // Selections
    // ───────────────────────────────────────────────────────────────

    /// Picks a service, discarding every answer given for a previous one.
    pub fn select_service(&mut self, service: ServiceKind) {
        self.service = Some(service);
        self.plan = None;
        self.subject = None;
        self.topic = None;
        self.school = None;
        self.slots.clear();
        self.provider = None;
        self.rewind_to(WizardStep::Plan);
    }

    pub fn select_plan(&mut self, plan_id: &str, plans: &PlanCatalog) -> Result<(), BookingError> {
        let service = self.require_service(WizardStep::Plan)?;
        let plan = plans
            .find(plan_id)
            .ok_or_else(|| BookingError::UnknownPlan(plan_id.trim().to_string()))?;
        if plan.service != service {
            return Err(BookingError::PlanServiceMismatch {
                plan: plan.id.clone(),
                service,
            });
        }
        if self.plan.as_deref() != Some(plan.id.as_str()) {
            self.plan = Some(plan.id.clone());
            self.slots.clear();
            self.rewind_to(WizardStep::Details);
        }
        Ok(())
    }

    /// Sets the tutoring subject or the test-prep test name.
    ///
    /// Clears the topic and the chosen provider.
    pub fn select_subject(&mut self, subject: &str) -> Result<(), BookingError> {
        let service = self.require_service(WizardStep::Details)?;
        let value = non_blank("subject", subject)?;
        match service {
            ServiceKind::Tutoring => {
                let parsed = TutoringSubject::parse(&value).ok_or_else(|| {
                    ValidationError::invalid_format(
                        "subject",
                        format!("'{}' is not a tutoring subject", value),
                    )
                })?;
                self.subject = Some(parsed.display_name().to_string());
            }
            ServiceKind::TestPrep => self.subject = Some(value),
            other => {
                return Err(BookingError::NotApplicable {
                    field: "subject",
                    service: other,
                })
            }
        }
        self.topic = None;
        self.provider = None;
        self.rewind_to(WizardStep::Details);
        Ok(())
    }

    /// Sets the tutoring topic (a language, a CS topic, or a free-text focus).
    pub fn select_topic(&mut self, topic: &str) -> Result<(), BookingError> {
        let service = self.require_service(WizardStep::Details)?;
        if service != ServiceKind::Tutoring {
            return Err(BookingError::NotApplicable {
                field: "topic",
                service,
            });
        }
        if self.subject.is_none() {
            return Err(BookingError::blocked(WizardStep::Details, "choose a subject before a topic"));
        }
        self.topic = Some(non_blank("topic", topic)?);
        self.provider = None;
        self.rewind_to(WizardStep::Details);
        Ok(())
    }

    pub fn select_school(&mut self, school: &str) -> Result<(), BookingError> {
        let service = self.require_service(WizardStep::Details)?;
        if !service.is_school_based() {
            return Err(BookingError::NotApplicable {
                field: "school",
                service,
            });
        }
        self.school = Some(non_blank("school", school)?);
        self.provider = None;
        self.rewind_to(WizardStep::Details);
        Ok(())
    }

    /// Adds the slot, or removes it if it is already chosen.
    ///
    /// Returns whether the slot is selected afterwards. Adding beyond
    /// the plan's required count is refused.
    pub fn toggle_slot(&mut self, slot: Slot) -> Result<bool, BookingError> {
        if self.plan.is_none() {
            return Err(BookingError::blocked(WizardStep::Schedule, "choose a plan before picking times"));
        }
        if let Some(index) = self.slots.iter().position(|s| *s == slot) {
            self.slots.remove(index);
            self.rewind_to(WizardStep::Schedule);
            return Ok(false);
        }
        let required = self.required_slots();
        if self.slots.len() >= required {
            return Err(BookingError::SlotLimitReached { required });
        }
        self.slots.push(slot);
        Ok(true)
    }

    /// Chooses a provider from the step-3 qualifying set.
    pub fn select_provider(
        &mut self,
        provider_id: &ProviderId,
        directory: &ProviderDirectory,
    ) -> Result<(), BookingError> {
        let qualifies = self
            .candidate_providers(directory)
            .iter()
            .any(|p| p.id() == provider_id);
        if !qualifies {
            return Err(BookingError::ProviderNotQualifying(provider_id.to_string()));
        }
        self.provider = Some(provider_id.clone());
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Gates
    // ───────────────────────────────────────────────────────────────

    /// The matcher query implied by the current answers.
    pub fn match_query(&self) -> MatchQuery {
        MatchQuery {
            service: self.service,
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            school: self.school.clone(),
        }
    }

    /// Providers step 5 offers.
    pub fn candidate_providers<'a>(&self, directory: &'a ProviderDirectory) -> Vec<&'a Provider> {
        list_qualifying_providers(directory, &self.match_query())
    }

    /// Checks a single step's predicate against the current answers.
    pub fn check(&self, step: WizardStep, ctx: BookingContext<'_>) -> Result<(), BookingError> {
        match step {
            WizardStep::Service => self.require_service(step).map(|_| ()),
            WizardStep::Plan => self.check_plan(ctx.plans),
            WizardStep::Details => self.check_details(ctx.directory),
            WizardStep::Schedule => self.check_schedule(),
            WizardStep::Provider => self.check_provider(ctx.directory),
            WizardStep::Complete => Ok(()),
        }
    }

    pub fn can_advance(&self, ctx: BookingContext<'_>) -> bool {
        self.step != WizardStep::Complete && self.check(self.step, ctx).is_ok()
    }

    /// Moves one step forward if the current step's predicate holds.
    pub fn advance(&mut self, ctx: BookingContext<'_>) -> Result<WizardStep, BookingError> {
        if self.step == WizardStep::Complete {
            return Err(BookingError::AlreadyComplete);
        }
        self.check(self.step, ctx)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Steps back one page without discarding answers.
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    /// Re-validates every gate and builds the checkout handoff.
    pub fn finalize(&self, ctx: BookingContext<'_>) -> Result<FinalizedBooking, BookingError> {
        if self.step != WizardStep::Complete {
            return Err(BookingError::blocked(self.step, "the wizard has not been completed"));
        }
        for step in WizardStep::GATED {
            self.check(step, ctx)?;
        }

        let (Some(service), Some(plan_id), Some(provider_id)) =
            (self.service, self.plan.as_deref(), self.provider.as_ref())
        else {
            return Err(BookingError::blocked(self.step, "incomplete answers"));
        };
        let plan = ctx
            .plans
            .find(plan_id)
            .ok_or_else(|| BookingError::UnknownPlan(plan_id.to_string()))?;
        let provider = ctx
            .directory
            .find(provider_id)
            .ok_or_else(|| BookingError::ProviderNotQualifying(provider_id.to_string()))?;

        let mut slots = self.slots.clone();
        slots.sort();

        Ok(FinalizedBooking {
            service,
            plan: plan.clone(),
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            school: self.school.clone(),
            slots,
            provider_id: provider_id.clone(),
            provider_name: provider.name().to_string(),
            provider_email: provider.email().map(str::to_string),
        })
    }

    /// Drives a fresh draft through every step with a client's answers.
    pub fn replay(
        selection: &BookingSelection,
        ctx: BookingContext<'_>,
    ) -> Result<FinalizedBooking, BookingError> {
        let mut draft = BookingDraft::new();

        let service = selection
            .service
            .ok_or_else(|| BookingError::blocked(WizardStep::Service, "choose a service"))?;
        draft.select_service(service);
        draft.advance(ctx)?;

        let plan = selection
            .plan
            .as_deref()
            .ok_or_else(|| BookingError::blocked(WizardStep::Plan, "choose a plan"))?;
        draft.select_plan(plan, ctx.plans)?;
        draft.advance(ctx)?;

        if let Some(subject) = selection.subject.as_deref() {
            draft.select_subject(subject)?;
        }
        if let Some(topic) = selection.topic.as_deref() {
            draft.select_topic(topic)?;
        }
        if let Some(school) = selection.school.as_deref() {
            draft.select_school(school)?;
        }
        draft.advance(ctx)?;

        for slot in &selection.slots {
            if !draft.toggle_slot(*slot)? {
                return Err(ValidationError::invalid_format(
                    "slots",
                    format!("slot {} was listed twice", slot),
                )
                .into());
            }
        }
        draft.advance(ctx)?;

        let raw_provider = selection
            .provider_id
            .as_deref()
            .ok_or_else(|| BookingError::blocked(WizardStep::Provider, "choose a provider"))?;
        let provider_id = ProviderId::new(raw_provider)?;
        draft.select_provider(&provider_id, ctx.directory)?;
        draft.advance(ctx)?;

        draft.finalize(ctx)
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    fn rewind_to(&mut self, step: WizardStep) {
        if self.step > step {
            self.step = step;
        }
    }

    fn require_service(&self, step: WizardStep) -> Result<ServiceKind, BookingError> {
        self.service
            .ok_or_else(|| BookingError::blocked(step, "choose a service"))
    }

    fn check_plan(&self, plans: &PlanCatalog) -> Result<(), BookingError> {
        let service = self.require_service(WizardStep::Plan)?;
        let plan_id = self
            .plan
            .as_deref()
            .ok_or_else(|| BookingError::blocked(WizardStep::Plan, "choose a plan"))?;
        match plans.find(plan_id) {
            Some(plan) if plan.service == service => Ok(()),
            Some(_) => Err(BookingError::PlanServiceMismatch {
                plan: plan_id.to_string(),
                service,
            }),
            None => Err(BookingError::UnknownPlan(plan_id.to_string())),
        }
    }

    fn check_details(&self, directory: &ProviderDirectory) -> Result<(), BookingError> {
        let step = WizardStep::Details;
        let service = self.require_service(step)?;
        match service {
            ServiceKind::Tutoring => {
                if self.subject.is_none() {
                    return Err(BookingError::blocked(step, "choose a subject"));
                }
                if self.topic.is_none() {
                    return Err(BookingError::blocked(step, "choose a topic"));
                }
            }
            ServiceKind::TestPrep => {
                if self.subject.is_none() {
                    return Err(BookingError::blocked(step, "choose a test"));
                }
            }
            ServiceKind::Counseling | ServiceKind::VirtualTour => {
                if self.school.is_none() {
                    return Err(BookingError::blocked(step, "choose a school"));
                }
            }
        }
        if !has_qualifying_provider(directory, &self.match_query()) {
            return Err(BookingError::blocked(
                step,
                "no provider is available for this selection",
            ));
        }
        Ok(())
    }

    fn check_schedule(&self) -> Result<(), BookingError> {
        let required = self.required_slots();
        if self.slots.len() != required {
            return Err(BookingError::blocked(
                WizardStep::Schedule,
                format!("select {} session time(s), {} selected", required, self.slots.len()),
            ));
        }
        Ok(())
    }

    fn check_provider(&self, directory: &ProviderDirectory) -> Result<(), BookingError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| BookingError::blocked(WizardStep::Provider, "choose a provider"))?;
        if !self.candidate_providers(directory).iter().any(|p| p.id() == provider) {
            return Err(BookingError::ProviderNotQualifying(provider.to_string()));
        }
        Ok(())
    }
}

fn non_blank(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}
