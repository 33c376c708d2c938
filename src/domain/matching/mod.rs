//! Availability matcher.
//!
//! Decides which providers qualify for a service/subject/topic/school
//! selection. Pure over a directory snapshot: the same query against the
//! same snapshot always yields the same providers, in directory order.
//!
//! A selector that is missing, blank, or unknown for the requested service
//! produces an empty result. Matching never errors.

use serde::{Deserialize, Serialize};

use crate::domain::directory::{
    NormalizedName, Provider, ProviderDirectory, ProviderLabel, School, ServiceKind, TestName,
    TutoringSubject,
};

/// Raw selectors as a student enters them.
///
/// `subject` carries the tutoring subject or, for test prep, the test name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub service: Option<ServiceKind>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub school: Option<String>,
}

impl MatchQuery {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service: Some(service),
            ..Self::default()
        }
    }

    pub fn tutoring(subject: impl Into<String>, topic: Option<&str>) -> Self {
        Self {
            service: Some(ServiceKind::Tutoring),
            subject: Some(subject.into()),
            topic: topic.map(str::to_string),
            school: None,
        }
    }

    pub fn test_prep(test: impl Into<String>) -> Self {
        Self {
            service: Some(ServiceKind::TestPrep),
            subject: Some(test.into()),
            ..Self::default()
        }
    }

    pub fn school_based(service: ServiceKind, school: impl Into<String>) -> Self {
        Self {
            service: Some(service),
            school: Some(school.into()),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_school(mut self, school: impl Into<String>) -> Self {
        self.school = Some(school.into());
        self
    }
}

/// Qualifying providers for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingSet<'a> {
    pub providers: Vec<&'a Provider>,
    /// Set when no school-specific counselor matched and general
    /// counselors were substituted.
    pub used_fallback: bool,
}

impl<'a> QualifyingSet<'a> {
    fn direct(providers: Vec<&'a Provider>) -> Self {
        Self {
            providers,
            used_fallback: false,
        }
    }

    fn empty() -> Self {
        Self::direct(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn contains(&self, provider: &Provider) -> bool {
        self.providers.iter().any(|p| p.id() == provider.id())
    }
}

/// Whether at least one provider qualifies.
pub fn has_qualifying_provider(directory: &ProviderDirectory, query: &MatchQuery) -> bool {
    !find_qualifying(directory, query).is_empty()
}

/// Every qualifying provider, in directory order.
pub fn list_qualifying_providers<'a>(
    directory: &'a ProviderDirectory,
    query: &MatchQuery,
) -> Vec<&'a Provider> {
    find_qualifying(directory, query).providers
}

/// Full match result including whether the counseling fallback applied.
pub fn find_qualifying<'a>(directory: &'a ProviderDirectory, query: &MatchQuery) -> QualifyingSet<'a> {
    let Some(service) = query.service else {
        return QualifyingSet::empty();
    };

    match service {
        ServiceKind::Tutoring => match_tutoring(directory, query),
        ServiceKind::TestPrep => match_test_prep(directory, query),
        ServiceKind::Counseling => match_counseling(directory, query),
        ServiceKind::VirtualTour => match_virtual_tour(directory, query),
    }
}

fn collect<'a, F>(directory: &'a ProviderDirectory, predicate: F) -> Vec<&'a Provider>
where
    F: Fn(&Provider) -> bool,
{
    directory.providers().iter().filter(|p| predicate(*p)).collect()
}

fn match_tutoring<'a>(directory: &'a ProviderDirectory, query: &MatchQuery) -> QualifyingSet<'a> {
    let Some(subject) = query.subject.as_deref().and_then(TutoringSubject::parse) else {
        return QualifyingSet::empty();
    };
    let label = ProviderLabel::Subject(subject);

    if !subject.is_topic_matched() {
        // Topic is informational for these subjects.
        return QualifyingSet::direct(collect(directory, |p| p.is_tutor() && *p.label() == label));
    }

    let Some(topic) = NormalizedName::parse_optional(query.topic.as_deref()) else {
        return QualifyingSet::empty();
    };
    QualifyingSet::direct(collect(directory, |p| {
        p.is_tutor() && *p.label() == label && p.teaches_topic(subject, &topic)
    }))
}

fn match_test_prep<'a>(directory: &'a ProviderDirectory, query: &MatchQuery) -> QualifyingSet<'a> {
    let Some(test) = TestName::parse_optional(query.subject.as_deref()) else {
        return QualifyingSet::empty();
    };
    let label = ProviderLabel::Test(test);
    QualifyingSet::direct(collect(directory, |p| p.is_tutor() && *p.label() == label))
}

fn match_counseling<'a>(directory: &'a ProviderDirectory, query: &MatchQuery) -> QualifyingSet<'a> {
    let Some(school) = School::parse_optional(query.school.as_deref()) else {
        return QualifyingSet::empty();
    };
    let is_college_counselor =
        |p: &Provider| p.is_counselor() && *p.label() == ProviderLabel::CollegeCounseling;

    let tagged = collect(directory, |p| {
        is_college_counselor(p) && p.school_scope().covers(&school)
    });
    if !tagged.is_empty() {
        return QualifyingSet::direct(tagged);
    }

    QualifyingSet {
        providers: collect(directory, |p| {
            is_college_counselor(p) && p.school_scope().is_general()
        }),
        used_fallback: true,
    }
}

fn match_virtual_tour<'a>(directory: &'a ProviderDirectory, query: &MatchQuery) -> QualifyingSet<'a> {
    let Some(school) = School::parse_optional(query.school.as_deref()) else {
        return QualifyingSet::empty();
    };
    QualifyingSet::direct(collect(directory, |p| {
        p.is_counselor()
            && *p.label() == ProviderLabel::VirtualTour
            && p.school_scope().covers(&school)
    }))
}
