//! Name-keyed arena of ontology sources.
//!
//! Annotations refer to sources by name only. The registry is the single
//! place where a name is turned back into a source, so a reference to a
//! source that was never declared on the investigation fails here instead
//! of silently producing a dangling `Term Source REF`.

use std::cell::Cell;
use std::collections::HashMap;

use crate::error::IsaTabError;
use crate::model::{Investigation, OntologyAnnotation, OntologySource};

/// Position of a source in registration order. Stable for one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(usize);

/// The three flattened cells ISA-Tab stores for an annotated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedTerm<'t> {
    pub term: &'t str,
    pub accession: &'t str,
    pub source_name: &'t str,
}

#[derive(Debug, Default)]
pub struct SourceRegistry<'a> {
    sources: Vec<&'a OntologySource>,
    by_name: HashMap<&'a str, SourceKey>,
    hits: Vec<Cell<usize>>,
}

impl<'a> SourceRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every source declared on the investigation, in order.
    pub fn from_investigation(investigation: &'a Investigation) -> Result<Self, IsaTabError> {
        let mut registry = Self::new();
        for source in &investigation.ontology_source_references {
            registry.register(source)?;
        }
        Ok(registry)
    }

    /// Registering the same source object twice returns the existing key;
    /// a different object under an already registered name is rejected.
    pub fn register(&mut self, source: &'a OntologySource) -> Result<SourceKey, IsaTabError> {
        if source.name.trim().is_empty() {
            return Err(IsaTabError::malformed(
                format!("ontology source #{}", self.sources.len() + 1),
                "Term Source Name",
                "name is empty",
            ));
        }
        if let Some(&key) = self.by_name.get(source.name.as_str()) {
            if std::ptr::eq(self.sources[key.0], source) {
                return Ok(key);
            }
            return Err(IsaTabError::DuplicateKey {
                kind: "ontology source name",
                key: source.name.clone(),
                entity: "ontology source references".to_string(),
            });
        }
        let key = SourceKey(self.sources.len());
        self.sources.push(source);
        self.hits.push(Cell::new(0));
        self.by_name.insert(source.name.as_str(), key);
        Ok(key)
    }

    pub fn key(&self, name: &str) -> Option<SourceKey> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, key: SourceKey) -> &'a OntologySource {
        self.sources[key.0]
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in registration order.
    pub fn sources(&self) -> impl Iterator<Item = &'a OntologySource> + '_ {
        self.sources.iter().copied()
    }

    pub fn resolve<'t>(
        &self,
        annotation: &'t OntologyAnnotation,
    ) -> Result<ResolvedTerm<'t>, IsaTabError> {
        self.resolve_in(
            annotation,
            &format!("annotation[{}]", annotation.term),
            "term_source",
        )
    }

    /// Like [`Self::resolve`], reporting failures against `entity.field`.
    pub fn resolve_in<'t>(
        &self,
        annotation: &'t OntologyAnnotation,
        entity: &str,
        field: &str,
    ) -> Result<ResolvedTerm<'t>, IsaTabError> {
        let (resolved, key) = self.flatten(annotation, entity, field)?;
        if let Some(key) = key {
            let hits = &self.hits[key.0];
            hits.set(hits.get() + 1);
        }
        Ok(resolved)
    }

    /// Same lookup as [`Self::resolve_in`] without counting a citation.
    /// Used when re-reading annotations that were already resolved once.
    pub fn lookup_in<'t>(
        &self,
        annotation: &'t OntologyAnnotation,
        entity: &str,
        field: &str,
    ) -> Result<ResolvedTerm<'t>, IsaTabError> {
        self.flatten(annotation, entity, field).map(|(resolved, _)| resolved)
    }

    fn flatten<'t>(
        &self,
        annotation: &'t OntologyAnnotation,
        entity: &str,
        field: &str,
    ) -> Result<(ResolvedTerm<'t>, Option<SourceKey>), IsaTabError> {
        let (source_name, key) = match annotation.term_source.as_deref() {
            Some(name) if !name.is_empty() => {
                let key = self
                    .key(name)
                    .ok_or_else(|| IsaTabError::UnresolvedReference {
                        source_name: name.to_string(),
                        entity: entity.to_string(),
                        field: field.to_string(),
                    })?;
                (name, Some(key))
            }
            _ => ("", None),
        };
        let resolved = ResolvedTerm {
            term: annotation.term.as_str(),
            accession: annotation.term_accession.as_deref().unwrap_or(""),
            source_name,
        };
        Ok((resolved, key))
    }

    /// Number of successful [`Self::resolve`] / [`Self::resolve_in`] calls
    /// that cited `key`. [`Self::lookup_in`] is not counted.
    pub fn reference_count(&self, key: SourceKey) -> usize {
        self.hits[key.0].get()
    }

    /// Registered sources no annotation has cited so far.
    pub fn unreferenced(&self) -> Vec<&'a str> {
        self.sources
            .iter()
            .zip(&self.hits)
            .filter(|(_, hits)| hits.get() == 0)
            .map(|(source, _)| source.name.as_str())
            .collect()
    }
}
