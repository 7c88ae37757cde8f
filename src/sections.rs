//! Section emitters for the investigation file.
//!
//! Each emitter projects one slice of the graph into a [`Section`]: a fixed
//! list of base columns, the `Comment[...]` columns derived from the
//! entities it holds, and one record per entity. Investigation-file
//! sections are written transposed (one row per column label).

use chrono::NaiveDate;

use crate::error::IsaTabError;
use crate::model::{
    Assay, Comment, Commented, Investigation, OntologyAnnotation, Person, Protocol, Publication,
    Study, StudyFactor,
};
use crate::registry::SourceRegistry;
use crate::tabtext::{TabWriter, check_representable, join_multi};

pub const TERM_ACCESSION_NUMBER: &str = "Term Accession Number";
pub const TERM_SOURCE_REF: &str = "Term Source REF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    OntologySourceReference,
    Investigation,
    InvestigationPublications,
    InvestigationContacts,
    Study,
    StudyDesignDescriptors,
    StudyPublications,
    StudyFactors,
    StudyAssays,
    StudyProtocols,
    StudyContacts,
}

/// Investigation-level sections, in file order.
pub const INVESTIGATION_SECTIONS: [SectionKind; 4] = [
    SectionKind::OntologySourceReference,
    SectionKind::Investigation,
    SectionKind::InvestigationPublications,
    SectionKind::InvestigationContacts,
];

/// Sections repeated for every study, in file order.
pub const STUDY_SECTIONS: [SectionKind; 7] = [
    SectionKind::Study,
    SectionKind::StudyDesignDescriptors,
    SectionKind::StudyPublications,
    SectionKind::StudyFactors,
    SectionKind::StudyAssays,
    SectionKind::StudyProtocols,
    SectionKind::StudyContacts,
];

impl SectionKind {
    pub fn marker(self) -> &'static str {
        match self {
            SectionKind::OntologySourceReference => "ONTOLOGY SOURCE REFERENCE",
            SectionKind::Investigation => "INVESTIGATION",
            SectionKind::InvestigationPublications => "INVESTIGATION PUBLICATIONS",
            SectionKind::InvestigationContacts => "INVESTIGATION CONTACTS",
            SectionKind::Study => "STUDY",
            SectionKind::StudyDesignDescriptors => "STUDY DESIGN DESCRIPTORS",
            SectionKind::StudyPublications => "STUDY PUBLICATIONS",
            SectionKind::StudyFactors => "STUDY FACTORS",
            SectionKind::StudyAssays => "STUDY ASSAYS",
            SectionKind::StudyProtocols => "STUDY PROTOCOLS",
            SectionKind::StudyContacts => "STUDY CONTACTS",
        }
    }
}

/// Label prefix for the sections that exist at both levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Investigation,
    Study,
}

impl Scope {
    fn prefix(self) -> &'static str {
        match self {
            Scope::Investigation => "Investigation",
            Scope::Study => "Study",
        }
    }

    fn publications(self) -> SectionKind {
        match self {
            Scope::Investigation => SectionKind::InvestigationPublications,
            Scope::Study => SectionKind::StudyPublications,
        }
    }

    fn contacts(self) -> SectionKind {
        match self {
            Scope::Investigation => SectionKind::InvestigationContacts,
            Scope::Study => SectionKind::StudyContacts,
        }
    }
}

const PUBLICATION_FIELDS: [&str; 7] = [
    "PubMed ID",
    "Publication DOI",
    "Publication Author List",
    "Publication Title",
    "Publication Status",
    "Publication Status Term Accession Number",
    "Publication Status Term Source REF",
];

const PERSON_FIELDS: [&str; 11] = [
    "Person Last Name",
    "Person First Name",
    "Person Mid Initials",
    "Person Email",
    "Person Phone",
    "Person Fax",
    "Person Address",
    "Person Affiliation",
    "Person Roles",
    "Person Roles Term Accession Number",
    "Person Roles Term Source REF",
];

/// A comment column: the `occurrence`-th comment called `name` on each entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentColumn<'c> {
    pub name: &'c str,
    pub occurrence: usize,
}

impl CommentColumn<'_> {
    pub fn label(&self) -> String {
        format!("Comment[{}]", self.name)
    }

    fn value<'v>(&self, comments: &'v [Comment]) -> &'v str {
        comments
            .iter()
            .filter(|comment| comment.name == self.name)
            .nth(self.occurrence)
            .map(|comment| comment.value.as_str())
            .unwrap_or("")
    }
}

/// Union of comment columns over `lists`, in first-seen order.
pub fn comment_columns<'c, I>(lists: I) -> Vec<CommentColumn<'c>>
where
    I: IntoIterator<Item = &'c [Comment]>,
{
    let mut columns: Vec<CommentColumn<'c>> = Vec::new();
    for comments in lists {
        let mut seen: Vec<&str> = Vec::new();
        for comment in comments {
            let occurrence = seen.iter().filter(|name| **name == comment.name).count();
            seen.push(comment.name.as_str());
            let column = CommentColumn {
                name: comment.name.as_str(),
                occurrence,
            };
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    columns
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub columns: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl Section {
    pub fn marker(&self) -> &'static str {
        self.kind.marker()
    }

    /// Cells of one column across all records.
    pub fn column_values(&self, label: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|column| column == label)?;
        Some(
            self.records
                .iter()
                .map(|record| record[index].as_str())
                .collect(),
        )
    }

    pub fn comment_column_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|column| column.starts_with("Comment["))
            .count()
    }

    pub fn check_cells(&self) -> Result<(), IsaTabError> {
        for (index, record) in self.records.iter().enumerate() {
            for (label, cell) in self.columns.iter().zip(record) {
                check_representable(cell).map_err(|reason| {
                    IsaTabError::malformed(
                        format!("{} #{}", self.marker(), index + 1),
                        label.as_str(),
                        reason,
                    )
                })?;
            }
        }
        Ok(())
    }

    /// Marker line, then one row per column label with a cell per record.
    pub fn write_transposed(&self, writer: &mut TabWriter) -> Result<(), IsaTabError> {
        writer.write_marker(self.marker())?;
        for (index, label) in self.columns.iter().enumerate() {
            let values: Vec<&str> = self
                .records
                .iter()
                .map(|record| record[index].as_str())
                .collect();
            writer.write_labeled(label, &values)?;
        }
        Ok(())
    }
}

struct SectionBuilder<'c> {
    kind: SectionKind,
    columns: Vec<String>,
    records: Vec<(Vec<String>, &'c [Comment])>,
}

impl<'c> SectionBuilder<'c> {
    fn new<I, S>(kind: SectionKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    fn prefixed(kind: SectionKind, prefix: &str, fields: &[&str]) -> Self {
        Self::new(kind, fields.iter().map(|field| format!("{prefix} {field}")))
    }

    fn entity(&self) -> String {
        format!("{} #{}", self.kind.marker(), self.records.len() + 1)
    }

    fn push<C: Commented>(&mut self, values: Vec<String>, entity: &'c C) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.records.push((values, entity.comments()));
    }

    fn finish(self) -> Section {
        let comment_columns = comment_columns(self.records.iter().map(|(_, comments)| *comments));
        let mut columns = self.columns;
        columns.extend(comment_columns.iter().map(CommentColumn::label));
        let records = self
            .records
            .into_iter()
            .map(|(mut values, comments)| {
                values.extend(
                    comment_columns
                        .iter()
                        .map(|column| column.value(comments).to_string()),
                );
                values
            })
            .collect();
        Section {
            kind: self.kind,
            columns,
            records,
        }
    }
}

fn term_cells(
    registry: &SourceRegistry<'_>,
    annotation: Option<&OntologyAnnotation>,
    entity: &str,
    field: &str,
) -> Result<[String; 3], IsaTabError> {
    match annotation {
        Some(annotation) => {
            let resolved = registry.lookup_in(annotation, entity, field)?;
            Ok([
                resolved.term.to_string(),
                resolved.accession.to_string(),
                resolved.source_name.to_string(),
            ])
        }
        None => Ok(Default::default()),
    }
}

/// Multi-valued annotation cells; position `i` of each cell is annotation `i`.
fn joined_term_cells<'o, I>(
    registry: &SourceRegistry<'_>,
    annotations: I,
    entity: &str,
    field: &str,
) -> Result<[String; 3], IsaTabError>
where
    I: IntoIterator<Item = Option<&'o OntologyAnnotation>>,
{
    let mut terms = Vec::new();
    let mut accessions = Vec::new();
    let mut sources = Vec::new();
    for annotation in annotations {
        let [term, accession, source] = term_cells(registry, annotation, entity, field)?;
        terms.push(term);
        accessions.push(accession);
        sources.push(source);
    }
    Ok([join_multi(terms), join_multi(accessions), join_multi(sources)])
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn ontology_sources<'a>(registry: &SourceRegistry<'a>) -> Section {
    let mut builder = SectionBuilder::new(
        SectionKind::OntologySourceReference,
        [
            "Term Source Name",
            "Term Source File",
            "Term Source Version",
            "Term Source Description",
        ],
    );
    for source in registry.sources() {
        builder.push(
            vec![
                source.name.clone(),
                source.file.clone(),
                source.version.clone(),
                source.description.clone(),
            ],
            source,
        );
    }
    builder.finish()
}

pub fn investigation(investigation: &Investigation) -> Section {
    let mut builder = SectionBuilder::prefixed(
        SectionKind::Investigation,
        "Investigation",
        &[
            "Identifier",
            "Title",
            "Description",
            "Submission Date",
            "Public Release Date",
        ],
    );
    builder.push(
        vec![
            investigation.identifier.clone(),
            investigation.title.clone(),
            investigation.description.clone(),
            date_cell(investigation.submission_date),
            date_cell(investigation.public_release_date),
        ],
        investigation,
    );
    builder.finish()
}

pub fn publications(
    scope: Scope,
    publications: &[Publication],
    registry: &SourceRegistry<'_>,
) -> Result<Section, IsaTabError> {
    let mut builder =
        SectionBuilder::prefixed(scope.publications(), scope.prefix(), &PUBLICATION_FIELDS);
    for publication in publications {
        let [status, accession, source] = term_cells(
            registry,
            publication.status.as_ref(),
            &builder.entity(),
            "status",
        )?;
        builder.push(
            vec![
                publication.pubmed_id.clone(),
                publication.doi.clone(),
                publication.author_list.clone(),
                publication.title.clone(),
                status,
                accession,
                source,
            ],
            publication,
        );
    }
    Ok(builder.finish())
}

pub fn contacts(
    scope: Scope,
    people: &[Person],
    registry: &SourceRegistry<'_>,
) -> Result<Section, IsaTabError> {
    let mut builder = SectionBuilder::prefixed(scope.contacts(), scope.prefix(), &PERSON_FIELDS);
    for person in people {
        let [roles, accessions, sources] = joined_term_cells(
            registry,
            person.roles.iter().map(Some),
            &builder.entity(),
            "roles",
        )?;
        builder.push(
            vec![
                person.last_name.clone(),
                person.first_name.clone(),
                person.mid_initials.clone(),
                person.email.clone(),
                person.phone.clone(),
                person.fax.clone(),
                person.address.clone(),
                person.affiliation.clone(),
                roles,
                accessions,
                sources,
            ],
            person,
        );
    }
    Ok(builder.finish())
}

pub fn study(study: &Study) -> Section {
    let mut builder = SectionBuilder::prefixed(
        SectionKind::Study,
        "Study",
        &[
            "Identifier",
            "Title",
            "Description",
            "Submission Date",
            "Public Release Date",
            "File Name",
        ],
    );
    builder.push(
        vec![
            study.identifier.clone(),
            study.title.clone(),
            study.description.clone(),
            date_cell(study.submission_date),
            date_cell(study.public_release_date),
            study.filename.clone(),
        ],
        study,
    );
    builder.finish()
}

pub fn design_descriptors(
    descriptors: &[OntologyAnnotation],
    registry: &SourceRegistry<'_>,
) -> Result<Section, IsaTabError> {
    let mut builder = SectionBuilder::new(
        SectionKind::StudyDesignDescriptors,
        [
            "Study Design Type".to_string(),
            format!("Study Design Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Design Type {TERM_SOURCE_REF}"),
        ],
    );
    for descriptor in descriptors {
        let cells = term_cells(registry, Some(descriptor), &builder.entity(), "design type")?;
        builder.push(Vec::from(cells), descriptor);
    }
    Ok(builder.finish())
}

pub fn factors(
    factors: &[StudyFactor],
    registry: &SourceRegistry<'_>,
) -> Result<Section, IsaTabError> {
    let mut builder = SectionBuilder::new(
        SectionKind::StudyFactors,
        [
            "Study Factor Name".to_string(),
            "Study Factor Type".to_string(),
            format!("Study Factor Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Factor Type {TERM_SOURCE_REF}"),
        ],
    );
    for factor in factors {
        let [kind, accession, source] = term_cells(
            registry,
            factor.factor_type.as_ref(),
            &builder.entity(),
            "factor type",
        )?;
        builder.push(
            vec![factor.name.clone(), kind, accession, source],
            factor,
        );
    }
    Ok(builder.finish())
}

pub fn assays(assays: &[Assay], registry: &SourceRegistry<'_>) -> Result<Section, IsaTabError> {
    let mut builder = SectionBuilder::new(
        SectionKind::StudyAssays,
        [
            "Study Assay File Name".to_string(),
            "Study Assay Measurement Type".to_string(),
            format!("Study Assay Measurement Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Assay Measurement Type {TERM_SOURCE_REF}"),
            "Study Assay Technology Type".to_string(),
            format!("Study Assay Technology Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Assay Technology Type {TERM_SOURCE_REF}"),
            "Study Assay Technology Platform".to_string(),
        ],
    );
    for assay in assays {
        let entity = builder.entity();
        let [measurement, measurement_accession, measurement_source] = term_cells(
            registry,
            assay.measurement_type.as_ref(),
            &entity,
            "measurement type",
        )?;
        let [technology, technology_accession, technology_source] = term_cells(
            registry,
            assay.technology_type.as_ref(),
            &entity,
            "technology type",
        )?;
        builder.push(
            vec![
                assay.filename.clone(),
                measurement,
                measurement_accession,
                measurement_source,
                technology,
                technology_accession,
                technology_source,
                assay.technology_platform.clone(),
            ],
            assay,
        );
    }
    Ok(builder.finish())
}

pub fn protocols(
    protocols: &[Protocol],
    registry: &SourceRegistry<'_>,
) -> Result<Section, IsaTabError> {
    let mut builder = SectionBuilder::new(
        SectionKind::StudyProtocols,
        [
            "Study Protocol Name".to_string(),
            "Study Protocol Type".to_string(),
            format!("Study Protocol Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Protocol Type {TERM_SOURCE_REF}"),
            "Study Protocol Description".to_string(),
            "Study Protocol URI".to_string(),
            "Study Protocol Version".to_string(),
            "Study Protocol Parameters Name".to_string(),
            format!("Study Protocol Parameters Name {TERM_ACCESSION_NUMBER}"),
            format!("Study Protocol Parameters Name {TERM_SOURCE_REF}"),
            "Study Protocol Components Name".to_string(),
            "Study Protocol Components Type".to_string(),
            format!("Study Protocol Components Type {TERM_ACCESSION_NUMBER}"),
            format!("Study Protocol Components Type {TERM_SOURCE_REF}"),
        ],
    );
    for protocol in protocols {
        let entity = builder.entity();
        let [kind, kind_accession, kind_source] = term_cells(
            registry,
            protocol.protocol_type.as_ref(),
            &entity,
            "protocol type",
        )?;
        let [parameters, parameter_accessions, parameter_sources] = joined_term_cells(
            registry,
            protocol
                .parameters
                .iter()
                .map(|parameter| Some(&parameter.parameter_name)),
            &entity,
            "parameters",
        )?;
        let component_names = join_multi(
            protocol
                .components
                .iter()
                .map(|component| component.name.as_str()),
        );
        let [component_types, component_accessions, component_sources] = joined_term_cells(
            registry,
            protocol
                .components
                .iter()
                .map(|component| component.component_type.as_ref()),
            &entity,
            "components",
        )?;
        builder.push(
            vec![
                protocol.name.clone(),
                kind,
                kind_accession,
                kind_source,
                protocol.description.clone(),
                protocol.uri.clone(),
                protocol.version.clone(),
                parameters,
                parameter_accessions,
                parameter_sources,
                component_names,
                component_types,
                component_accessions,
                component_sources,
            ],
            protocol,
        );
    }
    Ok(builder.finish())
}

/// Builds the seven sections of one study block, in file order.
pub fn study_block(
    study_record: &Study,
    registry: &SourceRegistry<'_>,
) -> Result<Vec<Section>, IsaTabError> {
    Ok(vec![
        study(study_record),
        design_descriptors(&study_record.design_descriptors, registry)?,
        publications(Scope::Study, &study_record.publications, registry)?,
        factors(&study_record.factors, registry)?,
        assays(&study_record.assays, registry)?,
        protocols(&study_record.protocols, registry)?,
        contacts(Scope::Study, &study_record.contacts, registry)?,
    ])
}
