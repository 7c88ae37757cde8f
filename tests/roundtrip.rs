mod common;

use proptest::prelude::*;

use kira_isatab::encode;
use kira_isatab::model::{Comment, Investigation, Study};
use kira_isatab::tabtext::TabWriter;

/// Minimal decoder: section marker -> (row label, cells) in file order.
fn decode_sections(text: &str) -> Vec<(String, Vec<(String, Vec<String>)>)> {
    let mut sections: Vec<(String, Vec<(String, Vec<String>)>)> = Vec::new();
    for mut row in common::read_rows(text) {
        let label = row.remove(0);
        let is_marker =
            row.is_empty() && label.chars().all(|ch| ch.is_ascii_uppercase() || ch == ' ');
        if is_marker {
            sections.push((label, Vec::new()));
        } else if let Some((_, rows)) = sections.last_mut() {
            rows.push((label, row));
        }
    }
    sections
}

fn comments_of(rows: &[(String, Vec<String>)], column: usize) -> Vec<Comment> {
    rows.iter()
        .filter_map(|(label, cells)| {
            let name = label.strip_prefix("Comment[")?.strip_suffix(']')?;
            let value = cells.get(column)?;
            Some(Comment::new(name, value.as_str()))
        })
        .collect()
}

fn cells<'r>(rows: &'r [(String, Vec<String>)], label: &str) -> &'r [String] {
    rows.iter()
        .find(|(row_label, _)| row_label == label)
        .map(|(_, cells)| cells.as_slice())
        .unwrap_or(&[])
}

#[test]
fn decoded_shape_matches_input() {
    let investigation = common::drought_investigation();
    let bundle = encode(&investigation).unwrap();
    let sections = decode_sections(bundle.investigation().unwrap());

    let (_, header) = sections
        .iter()
        .find(|(marker, _)| marker == "INVESTIGATION")
        .unwrap();
    assert_eq!(cells(header, "Investigation Title"), [investigation.title.as_str()]);
    assert_eq!(comments_of(header, 0), investigation.comments);

    let study = &investigation.studies[0];
    let (_, study_rows) = sections.iter().find(|(marker, _)| marker == "STUDY").unwrap();
    assert_eq!(cells(study_rows, "Study Identifier"), [study.identifier.as_str()]);
    assert_eq!(comments_of(study_rows, 0), study.comments);

    let (_, protocol_rows) = sections
        .iter()
        .find(|(marker, _)| marker == "STUDY PROTOCOLS")
        .unwrap();
    let names = cells(protocol_rows, "Study Protocol Name");
    let parameters = cells(protocol_rows, "Study Protocol Parameters Name");
    for (index, protocol) in study.protocols.iter().enumerate() {
        assert_eq!(names[index], protocol.name);
        let decoded: Vec<&str> = if parameters[index].is_empty() {
            Vec::new()
        } else {
            parameters[index].split(';').collect()
        };
        let expected: Vec<&str> = protocol
            .parameters
            .iter()
            .map(|parameter| parameter.parameter_name.term.as_str())
            .collect();
        assert_eq!(decoded, expected);
    }

    let (_, contact_rows) = sections
        .iter()
        .find(|(marker, _)| marker == "INVESTIGATION CONTACTS")
        .unwrap();
    for (index, person) in investigation.contacts.iter().enumerate() {
        assert_eq!(comments_of(contact_rows, index), person.comments);
    }
}

#[test]
fn comment_rows_equal_distinct_names() {
    let mut investigation = Investigation::new("I1");
    let mut study = Study::new("S1", "s_study.txt");
    let mut first = kira_isatab::model::StudyFactor::new("light");
    first.comments = vec![Comment::new("Unit", "lux"), Comment::new("Source", "lamp")];
    let mut second = kira_isatab::model::StudyFactor::new("water");
    second.comments = vec![Comment::new("Depth", "2cm"), Comment::new("Unit", "ml")];
    study.factors = vec![first, second];
    investigation.studies.push(study);

    let bundle = encode(&investigation).unwrap();
    let sections = decode_sections(bundle.investigation().unwrap());
    let (_, factor_rows) = sections
        .iter()
        .find(|(marker, _)| marker == "STUDY FACTORS")
        .unwrap();

    let comment_rows: Vec<&(String, Vec<String>)> = factor_rows
        .iter()
        .filter(|(label, _)| label.starts_with("Comment["))
        .collect();
    assert_eq!(comment_rows.len(), 3);
    assert_eq!(comment_rows[0].0, "Comment[Unit]");
    assert_eq!(comment_rows[0].1, ["lux", "ml"]);
    assert_eq!(comment_rows[1].1, ["lamp", ""]);
    assert_eq!(comment_rows[2].1, ["", "2cm"]);
}

#[test]
fn repeated_comment_name_fills_one_row_per_occurrence() {
    let mut investigation = Investigation::new("I1");
    let mut study = Study::new("S1", "s_study.txt");
    let mut light = kira_isatab::model::StudyFactor::new("light");
    light.comments = vec![
        Comment::new("Keyword", "lux"),
        Comment::new("Unit", "lx"),
        Comment::new("Keyword", "lamp"),
    ];
    let mut water = kira_isatab::model::StudyFactor::new("water");
    water.comments = vec![Comment::new("Keyword", "irrigation")];
    study.factors = vec![light, water];
    investigation.studies.push(study);

    let bundle = encode(&investigation).unwrap();
    let sections = decode_sections(bundle.investigation().unwrap());
    let (_, factor_rows) = sections
        .iter()
        .find(|(marker, _)| marker == "STUDY FACTORS")
        .unwrap();

    let keyword_rows: Vec<&Vec<String>> = factor_rows
        .iter()
        .filter(|(label, _)| label == "Comment[Keyword]")
        .map(|(_, cells)| cells)
        .collect();
    assert_eq!(keyword_rows.len(), 2);
    assert_eq!(keyword_rows[0], &["lux", "irrigation"]);
    assert_eq!(keyword_rows[1], &["lamp", ""]);
    assert_eq!(cells(factor_rows, "Comment[Unit]"), ["lx", ""]);
    assert_eq!(comments_of(factor_rows, 0).len(), 3);
}

#[test]
fn study_table_passes_through() {
    let mut investigation = Investigation::new("I1");
    let mut study = Study::new("S1", "s_plants.txt");
    study.table.columns = vec!["Source Name".to_string(), "Characteristics[Organism]".to_string()];
    study.table.rows = vec![vec!["plant 1".to_string(), "Arabidopsis \"thaliana\"".to_string()]];
    investigation.studies.push(study);

    let bundle = encode(&investigation).unwrap();
    let rows = common::read_rows(bundle.get("s_plants.txt").unwrap());
    assert_eq!(rows[0], ["Source Name", "Characteristics[Organism]"]);
    assert_eq!(rows[1], ["plant 1", "Arabidopsis \"thaliana\""]);
}

proptest! {
    #[test]
    fn quoted_cells_split_back_exactly(cells in prop::collection::vec("[a-z\t\n\"; ]{0,12}", 1..6)) {
        let mut writer = TabWriter::new();
        let mut row = vec!["Label".to_string()];
        row.extend(cells.iter().cloned());
        writer.write_row(&row).unwrap();
        let text = writer.into_string().unwrap();

        let parsed = common::read_rows(&text);
        prop_assert_eq!(parsed.len(), 1);
        prop_assert_eq!(&parsed[0], &row);
    }
}
