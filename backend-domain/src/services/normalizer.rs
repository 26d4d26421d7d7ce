use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::{Cell, Record, SheetTable};
use crate::utils::{decimal_from_f64, decimal_to_count, is_null_marker, parse_amount_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    MemberId,
    Username,
    CustomerName,
    DepositCount,
    TotalDeposits,
    WithdrawalCount,
    TotalWithdrawals,
    Tag,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::MemberId => "member_id",
            Field::Username => "username",
            Field::CustomerName => "customer_name",
            Field::DepositCount => "deposit_count",
            Field::TotalDeposits => "total_deposits",
            Field::WithdrawalCount => "withdrawal_count",
            Field::TotalWithdrawals => "total_withdrawals",
            Field::Tag => "btag",
        }
    }
}

const NUMERIC_FIELDS: [Field; 4] = [
    Field::DepositCount,
    Field::TotalDeposits,
    Field::WithdrawalCount,
    Field::TotalWithdrawals,
];

// Header text is matched exactly after trimming.
const COLUMN_ALIASES: &[(&str, Field)] = &[
    ("member_id", Field::MemberId),
    ("ID", Field::MemberId),
    ("Id", Field::MemberId),
    ("Üye ID", Field::MemberId),
    ("Member ID", Field::MemberId),
    ("Player ID", Field::MemberId),
    ("Client ID", Field::MemberId),
    ("username", Field::Username),
    ("Kullanıcı Adı", Field::Username),
    ("Username", Field::Username),
    ("Login", Field::Username),
    ("customer_name", Field::CustomerName),
    ("Müşteri Adı", Field::CustomerName),
    ("Ad Soyad", Field::CustomerName),
    ("Customer Name", Field::CustomerName),
    ("Full Name", Field::CustomerName),
    ("Name", Field::CustomerName),
    ("deposit_count", Field::DepositCount),
    ("Para Yatırma Sayısı", Field::DepositCount),
    ("Deposit Count", Field::DepositCount),
    ("total_deposits", Field::TotalDeposits),
    ("Yatırımlar", Field::TotalDeposits),
    ("Yatırım Miktarı", Field::TotalDeposits),
    ("Total Deposits", Field::TotalDeposits),
    ("Deposits", Field::TotalDeposits),
    ("withdrawal_count", Field::WithdrawalCount),
    ("Para Çekme Sayısı", Field::WithdrawalCount),
    ("Withdrawal Count", Field::WithdrawalCount),
    ("total_withdrawals", Field::TotalWithdrawals),
    ("Para Çekme Miktarı", Field::TotalWithdrawals),
    ("Çekimler", Field::TotalWithdrawals),
    ("Total Withdrawals", Field::TotalWithdrawals),
    ("Withdrawals", Field::TotalWithdrawals),
    ("btag", Field::Tag),
    ("BTag", Field::Tag),
    ("Btag", Field::Tag),
    ("BTAG", Field::Tag),
    ("Tag", Field::Tag),
];

fn canonical_field(header: &str) -> Option<Field> {
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == header)
        .map(|(_, field)| *field)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBatch {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
    pub dropped_rows: usize,
    pub source_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    Normalized(NormalizedBatch),
    /// Nothing usable survived; carries the original columns for diagnosis.
    NoData { columns: Vec<String>, warnings: Vec<String> },
    /// A tag filter was given and no row matched it.
    NoMatchingData { columns: Vec<String>, filter: String },
}

struct ColumnMap {
    positions: HashMap<Field, usize>,
    warnings: Vec<String>,
}

impl ColumnMap {
    fn build(columns: &[String]) -> Self {
        let mut positions = HashMap::new();
        let mut warnings = Vec::new();
        for (index, header) in columns.iter().enumerate() {
            let Some(field) = canonical_field(header.trim()) else {
                continue;
            };
            if positions.contains_key(&field) {
                warnings.push(format!(
                    "column '{}' duplicates {}; keeping the first one",
                    header.trim(),
                    field.name()
                ));
                continue;
            }
            positions.insert(field, index);
        }
        Self { positions, warnings }
    }

    fn cell<'a>(&self, row: &'a [Cell], field: Field) -> Option<&'a Cell> {
        self.positions.get(&field).and_then(|index| row.get(*index))
    }

    fn text(&self, row: &[Cell], field: Field) -> String {
        self.cell(row, field).map(Cell::as_text).unwrap_or_default()
    }
}

/// Maps a decoded sheet onto canonical records. Never fails: every problem
/// is downgraded to a warning, a dropped row or an empty outcome.
pub fn normalize(table: &SheetTable, tag_filter: Option<&str>) -> NormalizeOutcome {
    let source_columns: Vec<String> = table.columns.iter().map(|c| c.trim().to_string()).collect();
    let map = ColumnMap::build(&source_columns);
    let mut warnings = map.warnings.clone();

    if table.rows.is_empty() {
        return NormalizeOutcome::NoData {
            columns: source_columns,
            warnings,
        };
    }

    let filter = tag_filter
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty());
    let rows: Vec<&Vec<Cell>> = match &filter {
        Some(needle) if map.positions.contains_key(&Field::Tag) => {
            let matched: Vec<&Vec<Cell>> = table
                .rows
                .iter()
                .filter(|row| map.text(row, Field::Tag).to_lowercase().contains(needle.as_str()))
                .collect();
            if matched.is_empty() {
                return NormalizeOutcome::NoMatchingData {
                    columns: source_columns,
                    filter: needle.clone(),
                };
            }
            matched
        }
        Some(_) => {
            warnings.push("tag filter ignored: no tag column in the sheet".to_string());
            table.rows.iter().collect()
        }
        None => table.rows.iter().collect(),
    };

    for field in NUMERIC_FIELDS {
        if !map.positions.contains_key(&field) {
            warnings.push(format!("column {} missing; filled with 0", field.name()));
        }
    }

    let mut unparsable: HashMap<Field, usize> = HashMap::new();
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped_rows = 0;
    for row in rows {
        let member_id = strip_integral_fraction(&map.text(row, Field::MemberId));
        if member_id.is_empty() {
            dropped_rows += 1;
            continue;
        }
        let mut amount = |field: Field| -> Decimal {
            match parse_amount_cell(map.cell(row, field)) {
                Ok(value) => value,
                Err(()) => {
                    *unparsable.entry(field).or_default() += 1;
                    Decimal::ZERO
                }
            }
        };
        let total_deposits = amount(Field::TotalDeposits);
        let total_withdrawals = amount(Field::TotalWithdrawals);
        let deposit_count = amount(Field::DepositCount);
        let withdrawal_count = amount(Field::WithdrawalCount);

        records.push(Record {
            member_id,
            username: map.text(row, Field::Username),
            customer_name: map.text(row, Field::CustomerName),
            deposit_count: decimal_to_count(deposit_count).unwrap_or_default(),
            total_deposits,
            withdrawal_count: decimal_to_count(withdrawal_count).unwrap_or_default(),
            total_withdrawals,
        });
    }

    for field in NUMERIC_FIELDS {
        if let Some(count) = unparsable.get(&field) {
            warnings.push(format!("{} unparsable value(s) in {} set to 0", count, field.name()));
        }
    }
    if dropped_rows > 0 {
        warnings.push(format!("{} row(s) without member id dropped", dropped_rows));
    }

    if records.is_empty() {
        return NormalizeOutcome::NoData {
            columns: source_columns,
            warnings,
        };
    }

    NormalizeOutcome::Normalized(NormalizedBatch {
        records,
        warnings,
        dropped_rows,
        source_columns,
    })
}

/// Blank cells are a silent 0; text that does not parse and negative
/// values are reported as `Err` and also become 0.
fn parse_amount_cell(cell: Option<&Cell>) -> Result<Decimal, ()> {
    let parsed = match cell {
        None | Some(Cell::Empty) => return Ok(Decimal::ZERO),
        Some(Cell::Number(value)) => decimal_from_f64(*value),
        Some(Cell::Bool(_)) => None,
        Some(Cell::Text(text)) => {
            if is_null_marker(text) {
                return Ok(Decimal::ZERO);
            }
            parse_amount_text(text)
        }
    };
    match parsed {
        Some(value) if !value.is_sign_negative() || value.is_zero() => Ok(value),
        _ => Err(()),
    }
}

fn strip_integral_fraction(value: &str) -> String {
    if let Some((whole, fraction)) = value.split_once('.') {
        if !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|c| c == '0')
        {
            return whole.to_string();
        }
    }
    value.to_string()
}
