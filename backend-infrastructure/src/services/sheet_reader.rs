use std::io::Cursor;

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto_from_rs, Data, Reader};

use backend_domain::{Cell, SheetDecoder, SheetFormat, SheetTable};

/// Reads the first worksheet of a workbook, or a delimited text file. The
/// first row is the header; fully blank rows are skipped.
#[derive(Debug, Default, Clone)]
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    pub fn new() -> Self {
        Self
    }
}

impl SheetDecoder for SpreadsheetReader {
    fn decode(&self, bytes: &[u8], format: SheetFormat) -> anyhow::Result<SheetTable> {
        match format {
            SheetFormat::Xlsx | SheetFormat::Xls | SheetFormat::Ods => decode_workbook(bytes),
            SheetFormat::Csv => decode_delimited(bytes),
            SheetFormat::Unknown => Err(anyhow!("unrecognized spreadsheet format")),
        }
    }
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(text) => Cell::from(text.as_str()),
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::from(text.as_str()),
        Data::Error(_) => Cell::Empty,
    }
}

fn push_rows(table: &mut SheetTable, rows: impl Iterator<Item = Vec<Cell>>) {
    for row in rows {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        table.rows.push(row);
    }
}

fn decode_workbook(bytes: &[u8]) -> anyhow::Result<SheetTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("open workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no worksheets"))?
        .context("read first worksheet")?;

    let mut rows = range.rows();
    let mut table = SheetTable::default();
    if let Some(header) = rows.next() {
        table.columns = header.iter().map(|cell| data_cell(cell).as_text()).collect();
    }
    push_rows(&mut table, rows.map(|row| row.iter().map(data_cell).collect()));
    Ok(table)
}

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|delimiter| header.matches(*delimiter as char).count())
        .filter(|delimiter| header.contains(*delimiter as char))
        .unwrap_or(b',')
}

fn decode_delimited(bytes: &[u8]) -> anyhow::Result<SheetTable> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&text))
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut table = SheetTable {
        columns: reader
            .headers()
            .context("read csv header")?
            .iter()
            .map(str::to_string)
            .collect(),
        rows: Vec::new(),
    };
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("read csv row")?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    push_rows(&mut table, rows.into_iter());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_semicolon_csv_with_bom() {
        let bytes = "\u{feff}ID;Kullanıcı Adı;Yatırımlar\n303364529;ahmet;1.250,50\n;;\n".as_bytes();
        let table = SpreadsheetReader::new()
            .decode(bytes, SheetFormat::Csv)
            .expect("table");
        assert_eq!(table.columns, vec!["ID", "Kullanıcı Adı", "Yatırımlar"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][2], Cell::Text("1.250,50".to_string()));
    }

    #[test]
    fn reads_comma_csv_with_short_rows() {
        let bytes = b"ID,Username,Deposits\n1,a,10\n2,b\n";
        let table = SpreadsheetReader::new()
            .decode(bytes, SheetFormat::Csv)
            .expect("table");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn header_only_csv_has_no_rows() {
        let table = SpreadsheetReader::new()
            .decode(b"ID,Username\n", SheetFormat::Csv)
            .expect("table");
        assert_eq!(table.columns.len(), 2);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn garbage_workbook_is_an_error() {
        let result = SpreadsheetReader::new().decode(b"PK\x03\x04not a zip", SheetFormat::Xlsx);
        assert!(result.is_err());
    }

    #[test]
    fn sniffs_delimiters() {
        assert_eq!(sniff_delimiter("a;b;c"), b';');
        assert_eq!(sniff_delimiter("a\tb"), b'\t');
        assert_eq!(sniff_delimiter("a,b"), b',');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn maps_workbook_cells() {
        assert_eq!(data_cell(&Data::Int(303364529)), Cell::Number(303364529.0));
        assert_eq!(data_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(data_cell(&Data::Bool(true)), Cell::Bool(true));
    }
}
