//! Whole-graph validation run before any row is generated.

use std::collections::HashSet;

use crate::bundle::INVESTIGATION_FILE_NAME;
use crate::error::IsaTabError;
use crate::model::{Comment, Investigation, OntologyAnnotation, Person, Publication, Study};
use crate::registry::SourceRegistry;
use crate::tabtext::MULTI_VALUE_SEPARATOR;

/// Checks uniqueness, required scalars and references, and returns the
/// source registry the emitters resolve against.
pub fn validate(investigation: &Investigation) -> Result<SourceRegistry<'_>, IsaTabError> {
    let registry = SourceRegistry::from_investigation(investigation)?;
    let validator = Validator {
        registry: &registry,
    };

    for source in &investigation.ontology_source_references {
        check_comments(&source.comments, &format!("ontology source[{}]", source.name))?;
    }
    check_comments(&investigation.comments, "investigation")?;
    validator.publications(&investigation.publications, "investigation")?;
    validator.contacts(&investigation.contacts, "investigation")?;

    let mut identifiers = HashSet::new();
    let mut filenames = HashSet::new();
    for (index, study) in investigation.studies.iter().enumerate() {
        let entity = study_entity(study, index);
        check_study_filename(study, &entity)?;
        if !filenames.insert(study.filename.as_str()) {
            return Err(IsaTabError::DuplicateKey {
                kind: "study file name",
                key: study.filename.clone(),
                entity: "investigation".to_string(),
            });
        }
        if !study.identifier.is_empty() && !identifiers.insert(study.identifier.as_str()) {
            return Err(IsaTabError::DuplicateKey {
                kind: "study identifier",
                key: study.identifier.clone(),
                entity: "investigation".to_string(),
            });
        }
        validator.study(study, &entity)?;
    }

    Ok(registry)
}

struct Validator<'r, 'a> {
    registry: &'r SourceRegistry<'a>,
}

impl Validator<'_, '_> {
    fn annotation(
        &self,
        annotation: &OntologyAnnotation,
        entity: &str,
        field: &str,
    ) -> Result<(), IsaTabError> {
        self.registry.resolve_in(annotation, entity, field)?;
        check_comments(&annotation.comments, &format!("{entity}.{field}"))
    }

    /// An annotation that shares a `;`-joined cell with its siblings.
    fn listed_annotation(
        &self,
        annotation: &OntologyAnnotation,
        entity: &str,
        field: &str,
    ) -> Result<(), IsaTabError> {
        self.annotation(annotation, entity, field)?;
        check_listed(&annotation.term, entity, field)?;
        check_listed(
            annotation.term_accession.as_deref().unwrap_or(""),
            entity,
            field,
        )?;
        check_listed(annotation.term_source.as_deref().unwrap_or(""), entity, field)
    }

    fn publications(&self, publications: &[Publication], owner: &str) -> Result<(), IsaTabError> {
        for (index, publication) in publications.iter().enumerate() {
            let entity = format!("{owner}.publication[{}]", index + 1);
            if let Some(status) = &publication.status {
                self.annotation(status, &entity, "status")?;
            }
            check_comments(&publication.comments, &entity)?;
        }
        Ok(())
    }

    fn contacts(&self, people: &[Person], owner: &str) -> Result<(), IsaTabError> {
        for person in people {
            let entity = format!("{owner}.contact[{}]", person.last_name);
            for role in &person.roles {
                self.listed_annotation(role, &entity, "roles")?;
            }
            check_comments(&person.comments, &entity)?;
        }
        Ok(())
    }

    fn study(&self, study: &Study, entity: &str) -> Result<(), IsaTabError> {
        check_comments(&study.comments, entity)?;
        for descriptor in &study.design_descriptors {
            self.annotation(descriptor, entity, "design_descriptors")?;
        }
        self.publications(&study.publications, entity)?;

        for factor in &study.factors {
            let factor_entity = format!("{entity}.factor[{}]", factor.name);
            if let Some(kind) = &factor.factor_type {
                self.annotation(kind, &factor_entity, "factor_type")?;
            }
            check_comments(&factor.comments, &factor_entity)?;
        }

        for (index, assay) in study.assays.iter().enumerate() {
            let assay_entity = format!("{entity}.assay[{}]", index + 1);
            if assay.filename.trim().is_empty() {
                return Err(IsaTabError::malformed(
                    assay_entity,
                    "filename",
                    "assay file name is required",
                ));
            }
            if let Some(kind) = &assay.measurement_type {
                self.annotation(kind, &assay_entity, "measurement_type")?;
            }
            if let Some(kind) = &assay.technology_type {
                self.annotation(kind, &assay_entity, "technology_type")?;
            }
            check_comments(&assay.comments, &assay_entity)?;
        }

        let mut protocol_names = HashSet::new();
        for (index, protocol) in study.protocols.iter().enumerate() {
            if protocol.name.trim().is_empty() {
                return Err(IsaTabError::malformed(
                    format!("{entity}.protocol[#{}]", index + 1),
                    "name",
                    "protocol name is required",
                ));
            }
            if !protocol_names.insert(protocol.name.as_str()) {
                return Err(IsaTabError::DuplicateKey {
                    kind: "protocol name",
                    key: protocol.name.clone(),
                    entity: entity.to_string(),
                });
            }
            let protocol_entity = format!("{entity}.protocol[{}]", protocol.name);
            if let Some(kind) = &protocol.protocol_type {
                self.annotation(kind, &protocol_entity, "protocol_type")?;
            }
            for parameter in &protocol.parameters {
                self.listed_annotation(
                    &parameter.parameter_name,
                    &protocol_entity,
                    "parameters",
                )?;
            }
            for component in &protocol.components {
                check_listed(&component.name, &protocol_entity, "components")?;
                if let Some(kind) = &component.component_type {
                    self.listed_annotation(kind, &protocol_entity, "components")?;
                }
            }
            check_comments(&protocol.comments, &protocol_entity)?;
        }

        self.contacts(&study.contacts, entity)?;
        check_table(study, entity)
    }
}

fn study_entity(study: &Study, index: usize) -> String {
    if study.identifier.is_empty() {
        format!("study[#{}]", index + 1)
    } else {
        format!("study[{}]", study.identifier)
    }
}

fn check_study_filename(study: &Study, entity: &str) -> Result<(), IsaTabError> {
    let filename = study.filename.as_str();
    let reason = if filename.trim().is_empty() {
        "study file name is required"
    } else if filename.contains(['/', '\\']) {
        "study file name must not contain path separators"
    } else if filename == INVESTIGATION_FILE_NAME {
        "study file name collides with the investigation file"
    } else {
        return Ok(());
    };
    Err(IsaTabError::malformed(entity, "filename", reason))
}

/// Values joined positionally must not contain the separator themselves.
fn check_listed(value: &str, entity: &str, field: &str) -> Result<(), IsaTabError> {
    if value.contains(MULTI_VALUE_SEPARATOR) {
        return Err(IsaTabError::malformed(
            entity,
            field,
            format!("'{value}' contains the multi-value separator '{MULTI_VALUE_SEPARATOR}'"),
        ));
    }
    Ok(())
}

fn check_comments(comments: &[Comment], entity: &str) -> Result<(), IsaTabError> {
    for comment in comments {
        let reason = if comment.name.trim().is_empty() {
            "comment name is empty"
        } else if comment.name.contains(['[', ']']) {
            "comment name must not contain brackets"
        } else if comment.name.contains(['\t', '\n', '\r']) {
            "comment name must not contain tabs or line breaks"
        } else {
            continue;
        };
        return Err(IsaTabError::malformed(
            entity,
            format!("Comment[{}]", comment.name),
            reason,
        ));
    }
    Ok(())
}

fn check_table(study: &Study, entity: &str) -> Result<(), IsaTabError> {
    let table = &study.table;
    if table.columns.is_empty() && !table.rows.is_empty() {
        return Err(IsaTabError::malformed(
            entity,
            "table",
            "table rows given without column headers",
        ));
    }
    if let Some(position) = table.columns.iter().position(|column| column.is_empty()) {
        return Err(IsaTabError::malformed(
            entity,
            "table",
            format!("column {} has an empty header", position + 1),
        ));
    }
    for (index, row) in table.rows.iter().enumerate() {
        if row.len() != table.columns.len() {
            return Err(IsaTabError::malformed(
                entity,
                "table",
                format!(
                    "row {} has {} cells, expected {}",
                    index + 1,
                    row.len(),
                    table.columns.len()
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::model::{OntologySource, Protocol, StudyTable};

    fn investigation_with(study: Study) -> Investigation {
        let mut investigation = Investigation::new("I1");
        investigation.studies.push(study);
        investigation
    }

    #[test]
    fn study_without_filename_is_malformed() {
        let investigation = investigation_with(Study::new("S1", ""));
        let err = validate(&investigation).unwrap_err();
        assert_matches!(err, IsaTabError::MalformedValue { ref field, .. } if field == "filename");
    }

    #[test]
    fn duplicate_protocols_pushed_directly_are_caught() {
        let mut study = Study::new("S1", "s_study.txt");
        study.protocols.push(Protocol::new("Watering"));
        study.protocols.push(Protocol::new("Watering"));
        let err = validate(&investigation_with(study)).unwrap_err();
        assert_matches!(err, IsaTabError::DuplicateKey { kind: "protocol name", .. });
    }

    #[test]
    fn bracket_in_comment_name_is_malformed() {
        let mut investigation = Investigation::new("I1");
        investigation
            .comments
            .push(Comment::new("Keywords]", "drought"));
        let err = validate(&investigation).unwrap_err();
        assert_matches!(err, IsaTabError::MalformedValue { .. });
    }

    #[test]
    fn ragged_table_is_malformed() {
        let mut study = Study::new("S1", "s_study.txt");
        study.table = StudyTable {
            columns: vec!["Source Name".to_string(), "Sample Name".to_string()],
            rows: vec![vec!["plant 1".to_string()]],
        };
        let err = validate(&investigation_with(study)).unwrap_err();
        assert_matches!(err, IsaTabError::MalformedValue { ref reason, .. } if reason.contains("row 1"));
    }

    #[test]
    fn unknown_role_source_is_unresolved() {
        let mut investigation = Investigation::new("I1");
        let ghost = OntologySource::new("GHOST", "");
        let mut person = Person::new("Junker", "Astrid");
        person
            .roles
            .push(OntologyAnnotation::sourced("data curation role", &ghost, "x"));
        investigation.contacts.push(person);

        let err = validate(&investigation).unwrap_err();
        assert_matches!(
            err,
            IsaTabError::UnresolvedReference { ref source_name, ref entity, .. }
                if source_name == "GHOST" && entity == "investigation.contact[Junker]"
        );
    }

    #[test]
    fn emitting_sections_does_not_recount_citations() {
        let credit = OntologySource::new("CRediT", "http://purl.org/credit/ontology#");
        let mut person = Person::new("Junker", "Astrid");
        person.roles.push(OntologyAnnotation::sourced(
            "data curation role",
            &credit,
            "CREDIT_00000002",
        ));
        let mut investigation = Investigation::new("I1");
        investigation.ontology_source_references.push(credit);
        investigation.contacts.push(person);

        let registry = validate(&investigation).unwrap();
        let key = registry.key("CRediT").unwrap();
        assert_eq!(registry.reference_count(key), 1);

        crate::sections::contacts(
            crate::sections::Scope::Investigation,
            &investigation.contacts,
            &registry,
        )
        .unwrap();
        assert_eq!(registry.reference_count(key), 1);
    }

    #[test]
    fn separator_in_component_name_is_malformed() {
        let mut protocol = Protocol::new("Imaging");
        protocol.components.push(crate::model::ProtocolComponent {
            name: "camera;lens".to_string(),
            component_type: None,
        });
        let mut study = Study::new("S1", "s_study.txt");
        study.protocols.push(protocol);
        let err = validate(&investigation_with(study)).unwrap_err();
        assert_matches!(
            err,
            IsaTabError::MalformedValue { ref entity, ref field, .. }
                if entity == "study[S1].protocol[Imaging]" && field == "components"
        );
    }
}
