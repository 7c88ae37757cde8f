use std::io::{self, Write};

use serde::Serialize;

use crate::bundle::Bundle;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodeResult {
    pub investigation: String,
    pub studies: usize,
    pub dry_run: bool,
    pub files: Vec<EncodedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodedFile {
    pub name: String,
    pub bytes: usize,
    pub path: Option<String>,
}

impl EncodeResult {
    /// Summary of `bundle`; `paths` is empty when nothing was persisted.
    pub fn new(identifier: &str, bundle: &Bundle, paths: &[String], dry_run: bool) -> Self {
        let files = bundle
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| EncodedFile {
                name: file.name.clone(),
                bytes: file.content.len(),
                path: paths.get(index).cloned(),
            })
            .collect::<Vec<_>>();
        Self {
            investigation: identifier.to_string(),
            studies: files.len().saturating_sub(1),
            dry_run,
            files,
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_encode(result: &EncodeResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_bundle(bundle: &Bundle) -> io::Result<()> {
        Self::print_json(bundle)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub fn print_summary(result: &EncodeResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let reset = "\x1b[0m";

    println!("{cyan}KIRA-ISA summary{reset}");
    println!(
        "{green}investigation {} with {} stud{}{reset}",
        result.investigation,
        result.studies,
        if result.studies == 1 { "y" } else { "ies" }
    );
    if result.dry_run {
        println!("{yellow}dry run: nothing written{reset}");
    }
    for file in &result.files {
        match &file.path {
            Some(path) => println!("{green}  {} ({} bytes) -> {path}{reset}", file.name, file.bytes),
            None => println!("{yellow}  {} ({} bytes){reset}", file.name, file.bytes),
        }
    }
}
