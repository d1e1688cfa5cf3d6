// src/schema/types.rs

use serde::Serialize;

/// Column names of the output table, in order.
pub const COLUMNS: [&str; 7] = [
    "Name",
    "Address",
    "City",
    "Inspection Date",
    "Inspection Score",
    "Critical Violations",
    "Total Violations",
];

/// One restaurant after name and date repair.
#[derive(Debug, Serialize, PartialEq, Clone, Eq, Hash)]
pub struct Record {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Inspection Date")]
    pub inspection_date: String,
    #[serde(rename = "Inspection Score")]
    pub inspection_score: String,
    #[serde(rename = "Critical Violations")]
    pub critical_violations: String,
    #[serde(rename = "Total Violations")]
    pub total_violations: String,
}

impl Record {
    /// Build from exactly seven fields in column order, trimming each.
    /// Returns the field count on any other length.
    pub fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let found = fields.len();
        let [name, address, city, date, score, critical, total]: [String; 7] =
            fields.try_into().map_err(|_| found)?;
        let t = |s: String| s.trim().to_string();
        Ok(Self {
            name: t(name),
            address: t(address),
            city: t(city),
            inspection_date: t(date),
            inspection_score: t(score),
            critical_violations: t(critical),
            total_violations: t(total),
        })
    }

    pub fn to_fields(&self) -> [&str; 7] {
        [
            &self.name,
            &self.address,
            &self.city,
            &self.inspection_date,
            &self.inspection_score,
            &self.critical_violations,
            &self.total_violations,
        ]
    }

    /// Field by column name, see [`COLUMNS`].
    pub fn get(&self, column: &str) -> Option<&str> {
        COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.to_fields()[i])
    }
}

/// Ordered records with the columns of [`COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = COLUMNS.iter().position(|c| *c == name)?;
        Some(self.records.iter().map(|r| r.to_fields()[idx]).collect())
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
