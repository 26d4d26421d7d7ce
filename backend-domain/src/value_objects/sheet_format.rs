// Spreadsheet format value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Ods,
    Csv,
    Unknown,
}

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const CFB_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

impl SheetFormat {
    /// Picks the format from the file signature; anything that is not a
    /// zip or compound-document container is treated as delimited text.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&ZIP_MAGIC) {
            SheetFormat::Xlsx
        } else if bytes.starts_with(&CFB_MAGIC) {
            SheetFormat::Xls
        } else if bytes.is_empty() {
            SheetFormat::Unknown
        } else {
            SheetFormat::Csv
        }
    }

    pub fn resolve(declared: Option<&str>, bytes: &[u8]) -> Self {
        match declared.map(SheetFormat::from) {
            Some(SheetFormat::Unknown) | None => SheetFormat::sniff(bytes),
            Some(format) => format,
        }
    }
}

impl From<&str> for SheetFormat {
    fn from(s: &str) -> Self {
        let lowered = s.trim().to_lowercase();
        let extension = lowered.rsplit('.').next().unwrap_or("");
        match extension {
            "xlsx" | "xlsm" => SheetFormat::Xlsx,
            "xls" => SheetFormat::Xls,
            "ods" => SheetFormat::Ods,
            "csv" | "txt" => SheetFormat::Csv,
            _ => SheetFormat::Unknown,
        }
    }
}
