#![allow(dead_code)]

use chrono::NaiveDate;

use kira_isatab::model::{
    Comment, Investigation, OntologyAnnotation, OntologySource, Person, Protocol,
    ProtocolParameter, Publication, Study, StudyFactor,
};

pub fn ontology_sources() -> Vec<OntologySource> {
    let mut credit = OntologySource::new("CRediT", "http://purl.org/credit/ontology#");
    credit.description = "CASRAI Contributor Roles Taxonomy (CRediT)".to_string();

    let mut agro = OntologySource::new(
        "AGRO",
        "http://purl.obolibrary.org/obo/agro/releases/2018-05-14/agro.owl",
    );
    agro.description = "Agronomy Ontology".to_string();
    agro.version = "2018-05-14".to_string();

    let mut uo = OntologySource::new("UO", "http://data.bioontology.org/ontologies/UO");
    uo.description = "Units of Measurement Ontology".to_string();
    uo.version = "38802".to_string();

    vec![credit, agro, uo]
}

fn contact(
    last_name: &str,
    first_name: &str,
    email: &str,
    role: OntologyAnnotation,
    orcid: &str,
) -> Person {
    let mut person = Person::new(last_name, first_name);
    person.email = email.to_string();
    person.address = "Corrensstrasse 3, 06466 Stadt Seeland, OT Gatersleben, Germany".to_string();
    person.affiliation =
        "Leibniz Institute of Plant Genetics and Crop Plant Research (IPK) Gatersleben".to_string();
    person.roles.push(role);
    person.comments.push(Comment::new("Person ID", orcid));
    person
}

/// Drought stress investigation: one study, two protocols, two contacts.
pub fn drought_investigation() -> Investigation {
    let sources = ontology_sources();
    let credit = &sources[0];

    let mut investigation = Investigation::new("Investigation ID");
    investigation.title = "Drought Stress Response in Arabidopsis thaliana".to_string();
    investigation.description =
        "An experiment about drought stress in Arabidopsis thaliana".to_string();
    investigation.submission_date = NaiveDate::from_ymd_opt(2019, 1, 16);
    investigation.comments = vec![
        Comment::new("Owning Organisation URI", "http://www.ipk-gatersleben.de/"),
        Comment::new(
            "Investigation Keywords",
            "plant phenotyping, image analysis, arabidopsis thaliana, lemnatec",
        ),
        Comment::new(
            "License",
            "CC BY 4.0 (Creative Commons Attribution) - https://creativecommons.org/licenses/by/4.0/legalcode",
        ),
        Comment::new("MIAPPE version", "1.1"),
    ];

    let mut study = Study::new("1745AJ", "s_study.txt");
    study.title = "Drought Stress Response in Arabidopsis thaliana".to_string();

    let mut drought = StudyFactor::new("drought stress");
    drought.comments = vec![
        Comment::new(
            "Study Factor Description",
            "Which plants were subjected to drought stress and which ones were not?",
        ),
        Comment::new("Study Factor Values", "drought;well watered"),
    ];
    study.factors.push(drought);

    study.comments = vec![
        Comment::new("Study Start Date", ""),
        Comment::new("Study Country", "Germany"),
        Comment::new("Study Experimental Site", "LemnaTec Facility"),
        Comment::new("Study Longitude", "11.27778"),
    ];

    let mut design = OntologyAnnotation::new("Study Design");
    design.comments = vec![
        Comment::new("Observation Unit Level Hierarchy", "side>lane>block>pot"),
        Comment::new("Experimental Unit Level Hierarchy", "plant"),
    ];
    study.design_descriptors.push(design);

    let contacts = vec![
        contact(
            "Junker",
            "Astrid",
            "junkera@ipk-gatersleben.de",
            OntologyAnnotation::sourced(
                "project administration role",
                credit,
                "http://purl.org/credit/ontology#CREDIT_00000007",
            ),
            "https://orcid.org/0000-0002-4656-0308",
        ),
        contact(
            "Psaroudakis",
            "Dennis",
            "psaroudakis@ipk-gatersleben.de",
            OntologyAnnotation::sourced(
                "data curation role",
                credit,
                "http://purl.org/credit/ontology#CREDIT_00000002",
            ),
            "https://orcid.org/0000-0002-7521-798X",
        ),
    ];
    investigation.contacts = contacts.clone();
    study.contacts = contacts;

    study
        .add_protocol(Protocol::new("Phenotyping"))
        .expect("fresh protocol name");
    let mut watering = Protocol::new("Watering");
    watering.parameters = ["Irrigation Type", "Volume", "Watering Time"]
        .into_iter()
        .map(|name| ProtocolParameter::new(OntologyAnnotation::new(name)))
        .collect();
    study.add_protocol(watering).expect("fresh protocol name");

    investigation.publications.push(Publication {
        doi: "PUB DOI".to_string(),
        title: "A title".to_string(),
        author_list: "Psaroudakis, D".to_string(),
        status: Some(OntologyAnnotation::sourced("fictional", credit, "access123")),
        ..Default::default()
    });

    investigation.ontology_source_references = sources;
    investigation
        .add_study(study)
        .expect("first study is unique");
    investigation
}

/// Reference tab-splitter: honours the double-quote rule, nothing else.
pub fn read_rows(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|record| {
            record
                .expect("well-formed record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
