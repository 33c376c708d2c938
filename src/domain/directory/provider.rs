//! Provider entity and its school scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::{ProviderId, ValidationError};

use super::labels::{NormalizedName, ProviderLabel, School, TutoringSubject};

/// Whether a provider is a tutor or a counselor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Tutor,
    Counselor,
}

impl fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRole::Tutor => f.write_str("tutor"),
            ProviderRole::Counselor => f.write_str("counselor"),
        }
    }
}

/// Which schools a counselor or tour guide covers.
///
/// `General` is its own variant. `SchoolScope::specific` over no schools
/// yields a scope that matches nothing; only the file loader reads an empty
/// tag list as general.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchoolScope {
    #[default]
    General,
    Specific(BTreeSet<School>),
}

impl SchoolScope {
    pub fn specific<I, S>(schools: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = schools
            .into_iter()
            .map(|s| School::new(s.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(SchoolScope::Specific(set))
    }

    /// True only for an explicitly tagged school.
    pub fn covers(&self, school: &School) -> bool {
        match self {
            SchoolScope::General => false,
            SchoolScope::Specific(schools) => schools.contains(school),
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, SchoolScope::General)
    }
}

/// A tutor or counselor listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    id: ProviderId,
    name: String,
    email: Option<String>,
    role: ProviderRole,
    label: ProviderLabel,
    languages: BTreeSet<NormalizedName>,
    topics: BTreeSet<NormalizedName>,
    school_scope: SchoolScope,
}

impl Provider {
    /// Creates a tutor; capability lists start empty.
    pub fn tutor(id: ProviderId, name: impl Into<String>, label: ProviderLabel) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role: ProviderRole::Tutor,
            label,
            languages: BTreeSet::new(),
            topics: BTreeSet::new(),
            school_scope: SchoolScope::General,
        }
    }

    /// Creates a counselor or tour guide.
    pub fn counselor(
        id: ProviderId,
        name: impl Into<String>,
        label: ProviderLabel,
        school_scope: SchoolScope,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role: ProviderRole::Counselor,
            label,
            languages: BTreeSet::new(),
            topics: BTreeSet::new(),
            school_scope,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages = collect_names(languages)?;
        Ok(self)
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.topics = collect_names(topics)?;
        Ok(self)
    }

    /// Checks that role, label and capability lists agree.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        match self.role {
            ProviderRole::Tutor => {
                if self.label.is_counselor_label() {
                    return Err(self.mismatch("tutors cannot carry a counseling label"));
                }
                if !self.school_scope.is_general() {
                    return Err(self.mismatch("school tags are only meaningful for counselors"));
                }
            }
            ProviderRole::Counselor => {
                if !self.label.is_counselor_label() {
                    return Err(self.mismatch("counselors must be labelled College Counseling or Virtual Tour"));
                }
            }
        }
        if !self.languages.is_empty()
            && self.label != ProviderLabel::Subject(TutoringSubject::ForeignLanguages)
        {
            return Err(self.mismatch("languages are only meaningful for Foreign Languages tutors"));
        }
        if !self.topics.is_empty()
            && self.label != ProviderLabel::Subject(TutoringSubject::ComputerScience)
        {
            return Err(self.mismatch("topics are only meaningful for Computer Science tutors"));
        }
        Ok(())
    }

    fn mismatch(&self, reason: &str) -> ValidationError {
        ValidationError::invariant(format!("provider {}: {}", self.id, reason))
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> ProviderRole {
        self.role
    }

    pub fn label(&self) -> &ProviderLabel {
        &self.label
    }

    pub fn languages(&self) -> &BTreeSet<NormalizedName> {
        &self.languages
    }

    pub fn topics(&self) -> &BTreeSet<NormalizedName> {
        &self.topics
    }

    pub fn school_scope(&self) -> &SchoolScope {
        &self.school_scope
    }

    pub fn is_tutor(&self) -> bool {
        self.role == ProviderRole::Tutor
    }

    pub fn is_counselor(&self) -> bool {
        self.role == ProviderRole::Counselor
    }

    /// Whether a topic selector names one of this tutor's capabilities for `subject`.
    pub fn teaches_topic(&self, subject: TutoringSubject, topic: &NormalizedName) -> bool {
        match subject {
            TutoringSubject::ForeignLanguages => self.languages.contains(topic),
            TutoringSubject::ComputerScience => self.topics.contains(topic),
            _ => false,
        }
    }
}

fn collect_names<I, S>(values: I) -> Result<BTreeSet<NormalizedName>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| NormalizedName::new(v.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> ProviderId {
        ProviderId::new(id).unwrap()
    }

    fn school(name: &str) -> School {
        School::new(name).unwrap()
    }

    #[test]
    fn general_scope_covers_no_specific_school() {
        assert!(!SchoolScope::General.covers(&school("MIT")));
    }

    #[test]
    fn empty_specific_scope_is_not_general() {
        let scope = SchoolScope::specific(Vec::<String>::new()).unwrap();
        assert!(!scope.is_general());
        assert!(!scope.covers(&school("MIT")));
    }

    #[test]
    fn specific_scope_matches_case_insensitively() {
        let scope = SchoolScope::specific(["Stanford University", "MIT"]).unwrap();
        assert!(scope.covers(&school(" stanford university ")));
        assert!(!scope.covers(&school("Harvard")));
    }

    #[test]
    fn language_tutor_teaches_listed_languages_only() {
        let tutor = Provider::tutor(
            pid("t-1"),
            "Aiko",
            ProviderLabel::Subject(TutoringSubject::ForeignLanguages),
        )
        .with_languages(["Japanese", "Korean"])
        .unwrap();

        let japanese = NormalizedName::new("japanese").unwrap();
        let french = NormalizedName::new("French").unwrap();
        assert!(tutor.teaches_topic(TutoringSubject::ForeignLanguages, &japanese));
        assert!(!tutor.teaches_topic(TutoringSubject::ForeignLanguages, &french));
        assert!(!tutor.teaches_topic(TutoringSubject::ComputerScience, &japanese));
        assert!(tutor.validate().is_ok());
    }

    #[test]
    fn validate_rejects_role_label_mismatch() {
        let tutor = Provider::tutor(pid("t-2"), "Sam", ProviderLabel::CollegeCounseling);
        assert!(tutor.validate().is_err());

        let counselor = Provider::counselor(
            pid("c-1"),
            "Lee",
            ProviderLabel::Subject(TutoringSubject::Math),
            SchoolScope::General,
        );
        assert!(counselor.validate().is_err());
    }

    #[test]
    fn validate_rejects_capabilities_on_wrong_subject() {
        let tutor = Provider::tutor(pid("t-3"), "Ana", ProviderLabel::Subject(TutoringSubject::Math))
            .with_languages(["Spanish"])
            .unwrap();
        assert!(tutor.validate().is_err());
    }
}
