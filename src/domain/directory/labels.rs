//! Closed vocabularies for services, subjects and provider labels.
//!
//! Every free-text value that takes part in matching is folded through
//! [`normalize`] exactly once, when it is parsed into one of these types.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The single normalization used for all case-insensitive comparisons.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A user-entered name paired with its normalized matching key.
///
/// Equality, ordering and hashing look only at the normalized key, so
/// "Stanford University" and " stanford university" are the same school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedName {
    display_name: String,
    normalized_name: String,
}

/// A school as entered by a student or tagged on a counselor.
pub type School = NormalizedName;

/// A standardized test name ("SAT", "ACT", "AP Calculus BC").
pub type TestName = NormalizedName;

impl NormalizedName {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let display_name = value.trim().to_string();
        if display_name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let normalized_name = normalize(&display_name);
        Ok(Self {
            display_name,
            normalized_name,
        })
    }

    /// Parses an optional raw selector, treating blank input as absent.
    pub fn parse_optional(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// True if `raw` normalizes to this name.
    pub fn matches(&self, raw: &str) -> bool {
        self.normalized_name == normalize(raw)
    }
}

impl PartialEq for NormalizedName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_name == other.normalized_name
    }
}

impl Eq for NormalizedName {}

impl Hash for NormalizedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_name.hash(state);
    }
}

impl PartialOrd for NormalizedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NormalizedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized_name.cmp(&other.normalized_name)
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

impl TryFrom<String> for NormalizedName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<NormalizedName> for String {
    fn from(name: NormalizedName) -> Self {
        name.display_name
    }
}

/// Services a student can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    Tutoring,
    Counseling,
    VirtualTour,
    TestPrep,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Tutoring,
        ServiceKind::Counseling,
        ServiceKind::VirtualTour,
        ServiceKind::TestPrep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Tutoring => "tutoring",
            ServiceKind::Counseling => "counseling",
            ServiceKind::VirtualTour => "virtual-tour",
            ServiceKind::TestPrep => "test-prep",
        }
    }

    /// Counseling and virtual tours are selected by school, not subject.
    pub fn is_school_based(&self) -> bool {
        matches!(self, ServiceKind::Counseling | ServiceKind::VirtualTour)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| {
                ValidationError::invalid_format("service", format!("unknown service '{}'", s.trim()))
            })
    }
}

/// Tutoring subjects offered by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TutoringSubject {
    #[serde(rename = "Math")]
    Math,
    #[serde(rename = "Science")]
    Science,
    #[serde(rename = "History & Social Studies")]
    HistorySocialStudies,
    #[serde(rename = "English & Language Arts")]
    EnglishLanguageArts,
    #[serde(rename = "Foreign Languages")]
    ForeignLanguages,
    #[serde(rename = "Computer Science")]
    ComputerScience,
}

impl TutoringSubject {
    pub const ALL: [TutoringSubject; 6] = [
        TutoringSubject::Math,
        TutoringSubject::Science,
        TutoringSubject::HistorySocialStudies,
        TutoringSubject::EnglishLanguageArts,
        TutoringSubject::ForeignLanguages,
        TutoringSubject::ComputerScience,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TutoringSubject::Math => "Math",
            TutoringSubject::Science => "Science",
            TutoringSubject::HistorySocialStudies => "History & Social Studies",
            TutoringSubject::EnglishLanguageArts => "English & Language Arts",
            TutoringSubject::ForeignLanguages => "Foreign Languages",
            TutoringSubject::ComputerScience => "Computer Science",
        }
    }

    /// Subjects whose providers are matched on a fine-grained topic.
    pub fn is_topic_matched(&self) -> bool {
        matches!(
            self,
            TutoringSubject::ForeignLanguages | TutoringSubject::ComputerScience
        )
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize(raw);
        TutoringSubject::ALL
            .into_iter()
            .find(|subject| normalize(subject.display_name()) == key)
    }
}

impl fmt::Display for TutoringSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A provider's primary label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProviderLabel {
    Subject(TutoringSubject),
    Test(TestName),
    CollegeCounseling,
    VirtualTour,
}

const COLLEGE_COUNSELING: &str = "College Counseling";
const VIRTUAL_TOUR: &str = "Virtual Tour";

impl ProviderLabel {
    /// Parses a raw label. Anything that is not a subject or one of the two
    /// counseling services names a test.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if let Some(subject) = TutoringSubject::parse(raw) {
            return Ok(ProviderLabel::Subject(subject));
        }
        let key = normalize(raw);
        if key == normalize(COLLEGE_COUNSELING) {
            return Ok(ProviderLabel::CollegeCounseling);
        }
        if key == normalize(VIRTUAL_TOUR) {
            return Ok(ProviderLabel::VirtualTour);
        }
        NormalizedName::new(raw)
            .map(ProviderLabel::Test)
            .map_err(|_| ValidationError::empty_field("label"))
    }

    pub fn display_name(&self) -> &str {
        match self {
            ProviderLabel::Subject(subject) => subject.display_name(),
            ProviderLabel::Test(name) => name.display_name(),
            ProviderLabel::CollegeCounseling => COLLEGE_COUNSELING,
            ProviderLabel::VirtualTour => VIRTUAL_TOUR,
        }
    }

    /// True for labels carried by counselors rather than tutors.
    pub fn is_counselor_label(&self) -> bool {
        matches!(self, ProviderLabel::CollegeCounseling | ProviderLabel::VirtualTour)
    }
}

impl fmt::Display for ProviderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<ProviderLabel> for String {
    fn from(label: ProviderLabel) -> Self {
        label.display_name().to_string()
    }
}

impl TryFrom<String> for ProviderLabel {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        ProviderLabel::parse(&raw)
    }
}
