//! Tab-delimited line encoder.
//!
//! Cells are joined by `\t`, lines end in `\n`. A cell holding a tab, a
//! line break or `"` is wrapped in double quotes with inner quotes doubled.
//! Orientation is the caller's business: a row is just an ordered list of
//! cells.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::IsaTabError;

pub const DELIMITER: u8 = b'\t';
pub const MULTI_VALUE_SEPARATOR: &str = ";";

pub struct TabWriter {
    builder: WriterBuilder,
    out: Vec<u8>,
}

impl TabWriter {
    pub fn new() -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(DELIMITER)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .double_quote(true)
            .flexible(true)
            .has_headers(false);
        Self {
            builder,
            out: Vec::new(),
        }
    }

    /// Section marker line such as `STUDY PROTOCOLS`.
    pub fn write_marker(&mut self, marker: &str) -> Result<(), IsaTabError> {
        self.write_row([marker])
    }

    pub fn write_row<I, S>(&mut self, cells: I) -> Result<(), IsaTabError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let cells: Vec<S> = cells.into_iter().collect();
        // csv marks a record with no bytes as `""`; a lone empty cell is a bare line.
        if cells.len() <= 1 && cells.iter().all(|cell| cell.as_ref().is_empty()) {
            self.out.push(b'\n');
            return Ok(());
        }
        let mut writer = self.builder.from_writer(&mut self.out);
        writer
            .write_record(&cells)
            .map_err(|err| IsaTabError::Encode(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| IsaTabError::Encode(err.to_string()))
    }

    /// Label cell followed by one value cell per entity.
    pub fn write_labeled<S: AsRef<str>>(
        &mut self,
        label: &str,
        values: &[S],
    ) -> Result<(), IsaTabError> {
        let cells = std::iter::once(label).chain(values.iter().map(AsRef::<str>::as_ref));
        self.write_row(cells)
    }

    pub fn into_string(self) -> Result<String, IsaTabError> {
        String::from_utf8(self.out).map_err(|err| IsaTabError::Encode(err.to_string()))
    }
}

impl Default for TabWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins multi-valued cells positionally. An empty list yields an empty cell.
pub fn join_multi<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 {
            joined.push_str(MULTI_VALUE_SEPARATOR);
        }
        joined.push_str(value.as_ref());
    }
    joined
}

/// Rejects characters no quoting can carry through a line-based reader.
pub fn check_representable(value: &str) -> Result<(), String> {
    match value
        .chars()
        .find(|&ch| ch.is_control() && !matches!(ch, '\t' | '\n' | '\r'))
    {
        Some(ch) => Err(format!("contains control character U+{:04X}", ch as u32)),
        None => Ok(()),
    }
}
