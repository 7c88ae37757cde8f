//! Assembles the ISA-Tab file set for one investigation.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::IsaTabError;
use crate::model::{Investigation, StudyTable};
use crate::registry::SourceRegistry;
use crate::sections::{self, Scope, Section};
use crate::tabtext::{TabWriter, check_representable};
use crate::validate::validate;

pub const INVESTIGATION_FILE_NAME: &str = "i_investigation.txt";

/// Header written for a study whose sample table is empty.
pub const DEFAULT_STUDY_COLUMNS: [&str; 2] = ["Source Name", "Sample Name"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleFile {
    pub name: String,
    pub content: String,
}

/// Output file names mapped to their text, investigation file first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bundle {
    files: Vec<BundleFile>,
}

impl Bundle {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .map(|file| file.content.as_str())
    }

    pub fn investigation(&self) -> Option<&str> {
        self.get(INVESTIGATION_FILE_NAME)
    }

    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn push(&mut self, name: impl Into<String>, content: String) {
        self.files.push(BundleFile {
            name: name.into(),
            content,
        });
    }
}

impl IntoIterator for Bundle {
    type Item = BundleFile;
    type IntoIter = std::vec::IntoIter<BundleFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Encodes `investigation` into its investigation file and one file per
/// study. Either every file is produced or none is.
pub fn encode(investigation: &Investigation) -> Result<Bundle, IsaTabError> {
    let registry = validate(investigation)?;

    let mut investigation_sections = investigation_sections(investigation, &registry)?;
    for study in &investigation.studies {
        debug!(study = %study.identifier, file = %study.filename, "building study block");
        investigation_sections.extend(sections::study_block(study, &registry)?);
    }
    for section in &investigation_sections {
        section.check_cells()?;
    }
    for study in &investigation.studies {
        check_table_cells(&study.table, &study.filename)?;
    }

    for name in registry.unreferenced() {
        warn!(source = name, "ontology source is declared but never referenced");
    }

    let mut bundle = Bundle::default();
    let mut writer = TabWriter::new();
    for section in &investigation_sections {
        section.write_transposed(&mut writer)?;
    }
    bundle.push(INVESTIGATION_FILE_NAME, writer.into_string()?);
    for study in &investigation.studies {
        bundle.push(study.filename.clone(), study_file(&study.table)?);
    }

    info!(
        investigation = %investigation.identifier,
        studies = investigation.studies.len(),
        files = bundle.len(),
        "encoded ISA-Tab bundle"
    );
    Ok(bundle)
}

fn investigation_sections(
    investigation: &Investigation,
    registry: &SourceRegistry<'_>,
) -> Result<Vec<Section>, IsaTabError> {
    Ok(vec![
        sections::ontology_sources(registry),
        sections::investigation(investigation),
        sections::publications(Scope::Investigation, &investigation.publications, registry)?,
        sections::contacts(Scope::Investigation, &investigation.contacts, registry)?,
    ])
}

fn check_table_cells(table: &StudyTable, filename: &str) -> Result<(), IsaTabError> {
    for (index, row) in std::iter::once(&table.columns)
        .chain(&table.rows)
        .enumerate()
    {
        for (column, cell) in row.iter().enumerate() {
            check_representable(cell).map_err(|reason| {
                IsaTabError::malformed(
                    format!("{filename} line {}", index + 1),
                    format!("column {}", column + 1),
                    reason,
                )
            })?;
        }
    }
    Ok(())
}

/// Column-oriented study table: header row, then one row per entry.
pub fn study_file(table: &StudyTable) -> Result<String, IsaTabError> {
    let mut writer = TabWriter::new();
    if table.columns.is_empty() {
        writer.write_row(DEFAULT_STUDY_COLUMNS)?;
    } else {
        writer.write_row(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_row(row)?;
    }
    writer.into_string()
}
