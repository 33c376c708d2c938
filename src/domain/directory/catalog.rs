//! Immutable directory snapshot and its on-disk shape.
//!
//! A directory file is JSON or YAML:
//!
//! ```yaml
//! providers:
//!   - id: tutor-jp-1
//!     name: Aiko Tanaka
//!     role: tutor
//!     label: Foreign Languages
//!     languages: [Japanese, Korean]
//!   - id: counselor-general-1
//!     name: Morgan Reyes
//!     role: counselor
//!     label: College Counseling      # no schoolTags => general counselor
//!   - id: guide-stanford-1
//!     name: Priya Shah
//!     role: counselor
//!     label: Virtual Tour
//!     schoolTags: [Stanford University]
//! ```
//!
//! An absent, `null` or empty `schoolTags` declares a general scope; a list
//! naming at least one school declares a specific one. Files exported by
//! the original booking app write general counselors as `schoolTags: []`,
//! so an empty list cannot mean "no schools" here. A `Specific` scope with
//! no schools can still be built in code but does not survive a file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::foundation::{ProviderId, ValidationError};

use super::labels::ProviderLabel;
use super::provider::{Provider, ProviderRole, SchoolScope};

/// Errors raised while loading a directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read directory file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse directory: {0}")]
    Parse(String),

    #[error("Invalid provider entry: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Duplicate provider id: {0}")]
    DuplicateId(String),
}

/// One provider as written in a directory file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: ProviderRole,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_tags: Option<Vec<String>>,
}

impl TryFrom<ProviderRecord> for Provider {
    type Error = ValidationError;

    fn try_from(record: ProviderRecord) -> Result<Self, Self::Error> {
        let id = ProviderId::new(record.id)?;
        let label = ProviderLabel::parse(&record.label)?;
        let scope = match record.school_tags {
            Some(tags) if !tags.is_empty() => SchoolScope::specific(tags)?,
            _ => SchoolScope::General,
        };

        let mut provider = match record.role {
            ProviderRole::Tutor if !scope.is_general() => {
                return Err(ValidationError::invariant(format!(
                    "provider {}: school tags are only meaningful for counselors",
                    id
                )));
            }
            ProviderRole::Tutor => Provider::tutor(id, record.name, label),
            ProviderRole::Counselor => Provider::counselor(id, record.name, label, scope),
        }
        .with_languages(record.languages)?
        .with_topics(record.topics)?;

        if let Some(email) = record.email {
            provider = provider.with_email(email);
        }
        provider.validate()?;
        Ok(provider)
    }
}

impl From<&Provider> for ProviderRecord {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id().to_string(),
            name: provider.name().to_string(),
            email: provider.email().map(str::to_string),
            role: provider.role(),
            label: provider.label().display_name().to_string(),
            languages: provider.languages().iter().map(|l| l.to_string()).collect(),
            topics: provider.topics().iter().map(|t| t.to_string()).collect(),
            school_tags: match provider.school_scope() {
                SchoolScope::General => None,
                SchoolScope::Specific(schools) => {
                    Some(schools.iter().map(|s| s.to_string()).collect())
                }
            },
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    providers: Vec<ProviderRecord>,
}

/// Read-only snapshot of all providers, in listing order.
#[derive(Debug, Clone, Default)]
pub struct ProviderDirectory {
    providers: Vec<Provider>,
}

impl ProviderDirectory {
    /// Builds a snapshot, rejecting invalid entries and duplicate ids.
    pub fn new(providers: Vec<Provider>) -> Result<Self, DirectoryError> {
        let mut seen = HashSet::new();
        for provider in &providers {
            provider.validate()?;
            if !seen.insert(provider.id().clone()) {
                return Err(DirectoryError::DuplicateId(provider.id().to_string()));
            }
        }
        Ok(Self { providers })
    }

    pub fn from_records(records: Vec<ProviderRecord>) -> Result<Self, DirectoryError> {
        let providers = records
            .into_iter()
            .map(Provider::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(providers)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile =
            serde_json::from_str(json).map_err(|e| DirectoryError::Parse(e.to_string()))?;
        Self::from_records(file.providers)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile =
            serde_yaml::from_str(yaml).map_err(|e| DirectoryError::Parse(e.to_string()))?;
        Self::from_records(file.providers)
    }

    /// Loads a directory file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    /// Serializes the snapshot in the directory file format.
    pub fn to_json(&self) -> Result<String, DirectoryError> {
        let file = DirectoryFile {
            providers: self.providers.iter().map(ProviderRecord::from).collect(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| DirectoryError::Parse(e.to_string()))
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn find(&self, id: &ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The built-in catalog used when no directory file is configured.
    pub fn seed() -> Self {
        Self::from_yaml_str(SEED_DIRECTORY).unwrap_or_default()
    }
}

const SEED_DIRECTORY: &str = r#"
providers:
  - id: tutor-math-1
    name: Daniel Okafor
    email: daniel.okafor@tutorhub.example
    role: tutor
    label: Math
  - id: tutor-science-1
    name: Helena Brooks
    email: helena.brooks@tutorhub.example
    role: tutor
    label: Science
  - id: tutor-history-1
    name: Marcus Bell
    email: marcus.bell@tutorhub.example
    role: tutor
    label: History & Social Studies
  - id: tutor-english-1
    name: Grace Liu
    email: grace.liu@tutorhub.example
    role: tutor
    label: English & Language Arts
  - id: tutor-languages-1
    name: Sofia Marquez
    email: sofia.marquez@tutorhub.example
    role: tutor
    label: Foreign Languages
    languages: [Spanish, French, Portuguese]
  - id: tutor-languages-2
    name: Aiko Tanaka
    email: aiko.tanaka@tutorhub.example
    role: tutor
    label: Foreign Languages
    languages: [Japanese, Mandarin]
  - id: tutor-cs-1
    name: Ravi Iyer
    email: ravi.iyer@tutorhub.example
    role: tutor
    label: Computer Science
    topics: [Python, Java, AP Computer Science A]
  - id: tutor-sat-1
    name: Nora Fitzgerald
    email: nora.fitzgerald@tutorhub.example
    role: tutor
    label: SAT
  - id: tutor-act-1
    name: Caleb Hughes
    email: caleb.hughes@tutorhub.example
    role: tutor
    label: ACT
  - id: counselor-elite-1
    name: Evelyn Carter
    email: evelyn.carter@tutorhub.example
    role: counselor
    label: College Counseling
    schoolTags: [Stanford University, Massachusetts Institute of Technology, Harvard University]
  - id: counselor-general-1
    name: Morgan Reyes
    email: morgan.reyes@tutorhub.example
    role: counselor
    label: College Counseling
  - id: guide-stanford-1
    name: Priya Shah
    email: priya.shah@tutorhub.example
    role: counselor
    label: Virtual Tour
    schoolTags: [Stanford University]
  - id: guide-ucla-1
    name: Jordan Kim
    email: jordan.kim@tutorhub.example
    role: counselor
    label: Virtual Tour
    schoolTags: ["University of California, Los Angeles"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::School;

    #[test]
    fn seed_directory_loads_every_entry() {
        let directory = ProviderDirectory::seed();
        assert_eq!(directory.len(), 13);
        assert!(directory
            .find(&ProviderId::new("tutor-languages-2").unwrap())
            .is_some());
    }

    #[test]
    fn absent_school_tags_mean_general() {
        let json = r#"{"providers":[
            {"id":"c-1","name":"Gen","role":"counselor","label":"College Counseling"},
            {"id":"c-2","name":"Nul","role":"counselor","label":"College Counseling","schoolTags":null}
        ]}"#;
        let directory = ProviderDirectory::from_json_str(json).unwrap();
        assert!(directory.providers().iter().all(|p| p.school_scope().is_general()));
    }

    #[test]
    fn empty_school_tags_load_as_general() {
        let json = r#"{"providers":[
            {"id":"c-1","name":"Legacy","role":"counselor","label":"College Counseling","schoolTags":[]},
            {"id":"c-2","name":"Tagged","role":"counselor","label":"College Counseling","schoolTags":["MIT"]}
        ]}"#;
        let directory = ProviderDirectory::from_json_str(json).unwrap();

        let legacy = directory.providers()[0].school_scope();
        assert!(legacy.is_general());
        let tagged = directory.providers()[1].school_scope();
        assert!(tagged.covers(&School::new("MIT").unwrap()));
    }

    #[test]
    fn legacy_general_counselors_still_serve_as_fallback() {
        use crate::domain::directory::ServiceKind;
        use crate::domain::matching::{find_qualifying, MatchQuery};

        let yaml = "providers:\n  - {id: c-1, name: Legacy, role: counselor, label: College Counseling, schoolTags: []}\n";
        let directory = ProviderDirectory::from_yaml_str(yaml).unwrap();
        let query = MatchQuery::school_based(ServiceKind::Counseling, "Yale University");

        let found = find_qualifying(&directory, &query);

        assert_eq!(found.providers.len(), 1);
        assert!(found.used_fallback);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r#"
providers:
  - {id: t-1, name: A, role: tutor, label: Math}
  - {id: t-1, name: B, role: tutor, label: Science}
"#;
        let err = ProviderDirectory::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateId(id) if id == "t-1"));
    }

    #[test]
    fn placeholder_ids_are_rejected() {
        let yaml = "providers:\n  - {id: undefined, name: A, role: tutor, label: Math}\n";
        assert!(matches!(
            ProviderDirectory::from_yaml_str(yaml),
            Err(DirectoryError::Invalid(_))
        ));
    }

    #[test]
    fn tutors_cannot_carry_school_tags() {
        let yaml = "providers:\n  - {id: t-1, name: A, role: tutor, label: Math, schoolTags: [MIT]}\n";
        assert!(ProviderDirectory::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn json_export_preserves_scope_distinction() {
        let directory = ProviderDirectory::seed();
        let reloaded = ProviderDirectory::from_json_str(&directory.to_json().unwrap()).unwrap();
        for (a, b) in directory.providers().iter().zip(reloaded.providers()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers.yaml");
        std::fs::write(&path, "providers:\n  - {id: t-1, name: A, role: tutor, label: Math}\n")
            .unwrap();
        let directory = ProviderDirectory::load(&path).unwrap();
        assert_eq!(directory.len(), 1);

        let missing = ProviderDirectory::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(DirectoryError::Io { .. })));
    }
}
