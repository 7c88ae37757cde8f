//! Value model for an ISA investigation graph.
//!
//! The graph is populated by the caller (directly, through the guarded
//! adders below, or by deserializing JSON) and handed to
//! [`crate::bundle::encode`] as a read-only snapshot. Ontology annotations
//! point at their source by name; the sources themselves live once, in
//! [`Investigation::ontology_source_references`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IsaTabError;

/// Anything that carries an ordered list of `Comment[...]` values.
pub trait Commented {
    fn comments(&self) -> &[Comment];
}

macro_rules! impl_commented {
    ($($ty:ty),* $(,)?) => {
        $(impl Commented for $ty {
            fn comments(&self) -> &[Comment] {
                &self.comments
            }
        })*
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Comment {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologySource {
    pub name: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl OntologySource {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            ..Default::default()
        }
    }
}

/// A controlled-vocabulary term. `term_source` holds the name of an
/// [`OntologySource`] registered on the investigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyAnnotation {
    pub term: String,
    #[serde(default)]
    pub term_source: Option<String>,
    #[serde(default)]
    pub term_accession: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl OntologyAnnotation {
    /// Free-text term without source or accession.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn sourced(
        term: impl Into<String>,
        source: &OntologySource,
        accession: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            term_source: Some(source.name.clone()),
            term_accession: Some(accession.into()),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub mid_initials: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub fax: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub roles: Vec<OntologyAnnotation>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Person {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameter {
    pub parameter_name: OntologyAnnotation,
}

impl ProtocolParameter {
    pub fn new(parameter_name: OntologyAnnotation) -> Self {
        Self { parameter_name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolComponent {
    pub name: String,
    #[serde(default)]
    pub component_type: Option<OntologyAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub name: String,
    #[serde(default)]
    pub protocol_type: Option<OntologyAnnotation>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub parameters: Vec<ProtocolParameter>,
    #[serde(default)]
    pub components: Vec<ProtocolComponent>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Protocol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyFactor {
    pub name: String,
    #[serde(default)]
    pub factor_type: Option<OntologyAnnotation>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl StudyFactor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default)]
    pub pubmed_id: String,
    #[serde(default)]
    pub doi: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_list: String,
    #[serde(default)]
    pub status: Option<OntologyAnnotation>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assay {
    pub filename: String,
    #[serde(default)]
    pub measurement_type: Option<OntologyAnnotation>,
    #[serde(default)]
    pub technology_type: Option<OntologyAnnotation>,
    #[serde(default)]
    pub technology_platform: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Column-oriented sample table written verbatim to the study file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    pub identifier: String,
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub public_release_date: Option<NaiveDate>,
    #[serde(default)]
    pub design_descriptors: Vec<OntologyAnnotation>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub factors: Vec<StudyFactor>,
    #[serde(default)]
    pub assays: Vec<Assay>,
    #[serde(default)]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub contacts: Vec<Person>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub table: StudyTable,
}

impl Study {
    pub fn new(identifier: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Appends a protocol, rejecting a name already used in this study.
    pub fn add_protocol(&mut self, protocol: Protocol) -> Result<(), IsaTabError> {
        if self.protocol(&protocol.name).is_some() {
            return Err(IsaTabError::DuplicateKey {
                kind: "protocol name",
                key: protocol.name,
                entity: format!("study[{}]", self.identifier),
            });
        }
        self.protocols.push(protocol);
        Ok(())
    }

    pub fn protocol(&self, name: &str) -> Option<&Protocol> {
        self.protocols.iter().find(|protocol| protocol.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub public_release_date: Option<NaiveDate>,
    #[serde(default)]
    pub ontology_source_references: Vec<OntologySource>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub contacts: Vec<Person>,
    #[serde(default)]
    pub studies: Vec<Study>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Investigation {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    /// Appends a study; the file name and a non-empty identifier must be unused.
    pub fn add_study(&mut self, study: Study) -> Result<(), IsaTabError> {
        for existing in &self.studies {
            if !study.identifier.is_empty() && existing.identifier == study.identifier {
                return Err(IsaTabError::DuplicateKey {
                    kind: "study identifier",
                    key: study.identifier,
                    entity: format!("investigation[{}]", self.identifier),
                });
            }
            if existing.filename == study.filename {
                return Err(IsaTabError::DuplicateKey {
                    kind: "study file name",
                    key: study.filename,
                    entity: format!("investigation[{}]", self.identifier),
                });
            }
        }
        self.studies.push(study);
        Ok(())
    }

    pub fn ontology_source(&self, name: &str) -> Option<&OntologySource> {
        self.ontology_source_references
            .iter()
            .find(|source| source.name == name)
    }
}

impl_commented!(
    OntologySource,
    OntologyAnnotation,
    Person,
    Protocol,
    StudyFactor,
    Publication,
    Assay,
    Study,
    Investigation,
);
