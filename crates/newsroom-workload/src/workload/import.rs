use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ComplexityTier, EmployeeDraft, UnitDraft};

const PREFERRED_UNIT_SEPARATOR: char = ';';

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, message: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster file: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::InvalidRow { line, message } => {
                write!(f, "roster line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads unit and employee rosters from CSV exports.
///
/// Units: `name,monthly_articles,complexity,description`; complexity accepts `low|medium|high`
/// or the `S|M|L` codes and defaults to medium when blank.
/// Employees: `name,email,role,preferred_units` with preferred units separated by `;`.
pub struct RosterImporter;

impl RosterImporter {
    pub fn units_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<UnitDraft>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::units_from_reader(file)
    }

    pub fn units_from_reader<R: Read>(reader: R) -> Result<Vec<UnitDraft>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut units = Vec::new();

        for (index, record) in csv_reader.deserialize::<UnitRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            if row.name.is_empty() {
                return Err(invalid_row(line, "unit name must not be empty"));
            }

            let complexity = match row.complexity.as_deref() {
                None => ComplexityTier::default(),
                Some(raw) => ComplexityTier::parse(raw).ok_or_else(|| {
                    invalid_row(line, format!("unknown complexity tier '{raw}'"))
                })?,
            };

            units.push(UnitDraft {
                name: row.name,
                monthly_articles: row.monthly_articles,
                complexity,
                description: row.description,
            });
        }

        Ok(units)
    }

    pub fn employees_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<EmployeeDraft>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::employees_from_reader(file)
    }

    pub fn employees_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<EmployeeDraft>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut employees = Vec::new();

        for (index, record) in csv_reader.deserialize::<EmployeeRow>().enumerate() {
            let row = record?;
            let line = index + 2;
            if row.name.is_empty() {
                return Err(invalid_row(line, "employee name must not be empty"));
            }
            if row.role.is_empty() {
                return Err(invalid_row(line, "employee role must not be empty"));
            }

            let preferred_units = row
                .preferred_units
                .as_deref()
                .map(split_preferred)
                .unwrap_or_default();

            employees.push(EmployeeDraft {
                name: row.name,
                email: row.email,
                role: row.role,
                preferred_units,
            });
        }

        Ok(employees)
    }
}

fn invalid_row(line: usize, message: impl Into<String>) -> RosterImportError {
    RosterImportError::InvalidRow {
        line,
        message: message.into(),
    }
}

fn split_preferred(raw: &str) -> Vec<String> {
    raw.split(PREFERRED_UNIT_SEPARATOR)
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct UnitRow {
    name: String,
    monthly_articles: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    complexity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    role: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    preferred_units: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
