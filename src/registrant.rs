// 📋 Registrant Records
// Raw CSV rows → typed registrant records

use anyhow::{Context, Result};
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Token used wherever an absent value is rendered as text
/// (full names, chart labels, lookup keys).
pub const ABSENT_MARKER: &str = "undefined";

/// Legacy `last_access` date layout: year, DAY, month.
pub const ACCESS_DATE_LAYOUT: &str = "YYYY-DD-MM";

/// Columns the dataset is expected to carry.
pub const EXPECTED_COLUMNS: [&str; 9] = [
    "name",
    "lastname",
    "email",
    "partido",
    "provincia",
    "disciplina_principal",
    "gender",
    "idnumber",
    "last_access",
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// RawRow - one CSV row exactly as read, every field still a string.
/// Missing columns come through as "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub partido: String,
    #[serde(default)]
    pub provincia: String,
    #[serde(default)]
    pub disciplina_principal: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub idnumber: String,
    #[serde(default)]
    pub last_access: String,
}

/// Registrant - typed view of a RawRow. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registrant {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub partido: Option<String>,
    pub provincia: Option<String>,
    pub disciplina_principal: Option<String>,
    pub gender: String,
    /// NaN when the raw value is not numeric
    pub idnumber: f64,
    /// None when the raw value does not match the legacy layout
    pub last_access: Option<NaiveDate>,
}

impl Registrant {
    /// Every row yields exactly one registrant, possibly with absent or invalid fields.
    pub fn from_raw(raw: &RawRow) -> Self {
        let name = normalize_empty(&raw.name);
        let lastname = normalize_empty(&raw.lastname);
        let full_name = join_full_name(name.as_deref(), lastname.as_deref());

        Registrant {
            name,
            lastname,
            full_name,
            email: normalize_empty(&raw.email),
            partido: normalize_empty(&raw.partido),
            provincia: normalize_empty(&raw.provincia),
            disciplina_principal: normalize_empty(&raw.disciplina_principal),
            gender: raw.gender.clone(),
            idnumber: coerce_number(&raw.idnumber),
            last_access: parse_access_date(&raw.last_access),
        }
    }

    pub fn has_valid_idnumber(&self) -> bool {
        !self.idnumber.is_nan()
    }

    pub fn has_valid_last_access(&self) -> bool {
        self.last_access.is_some()
    }
}

impl From<&RawRow> for Registrant {
    fn from(raw: &RawRow) -> Self {
        Registrant::from_raw(raw)
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// "" → None, anything else (whitespace included) kept as-is.
pub fn normalize_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parses the date portion of a `last_access` timestamp.
///
/// Only the text before the first space is considered; with no space at all
/// that portion is empty and the parse fails. The date portion must be a
/// 4-digit year followed by a 1-2 digit day and a 1-2 digit month, in that
/// order. Out-of-range day or month values roll over like a calendar
/// would: day 31 of February is March 2nd (3rd outside leap years), month
/// 13 is January of the next year, day 0 is the last day of the previous
/// month.
pub fn parse_access_date(s: &str) -> Option<NaiveDate> {
    let prefix = match s.find(' ') {
        Some(end) => &s[..end],
        None => "",
    };

    let mut parts = prefix.split('-');
    let year = parse_digits(parts.next()?, 4..=4)?;
    let day = parse_digits(parts.next()?, 1..=2)?;
    let month = parse_digits(parts.next()?, 1..=2)?;
    if parts.next().is_some() {
        return None;
    }

    let january = NaiveDate::from_ymd_opt(year as i32, 1, 1)?;
    let first_of_month = if month == 0 {
        january.checked_sub_months(Months::new(1))?
    } else {
        january.checked_add_months(Months::new(month - 1))?
    };

    first_of_month.checked_add_signed(Duration::days(day as i64 - 1))
}

/// Unsigned decimal field with a digit count in `width`.
fn parse_digits(field: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Numeric coercion of a raw field.
///
/// Blank → 0, decimal/exponent notation, 0x/0o/0b integers and the
/// `Infinity` spellings are accepted. Anything else is NaN.
pub fn coerce_number(s: &str) -> f64 {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    // f64::from_str also takes "inf", "nan" and friends
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    let mut value = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    value
}

/// Joins name parts with a single space. Absent parts are written as
/// ABSENT_MARKER, so `None + "Cruz"` gives "undefined Cruz".
fn join_full_name(name: Option<&str>, lastname: Option<&str>) -> String {
    format!(
        "{} {}",
        name.unwrap_or(ABSENT_MARKER),
        lastname.unwrap_or(ABSENT_MARKER)
    )
}

// ============================================================================
// LOADING
// ============================================================================

/// Reads every row of a CSV source before any parsing happens.
/// A header row is required; unknown columns are ignored.
pub fn load_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    for column in EXPECTED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            warn!(column, "CSV header is missing an expected column, values default to empty");
        }
    }

    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let row: RawRow =
            result.with_context(|| format!("Failed to read registrant row {}", index + 1))?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "CSV rows read");
    Ok(rows)
}

/// Types every raw row, one registrant per row, order preserved.
pub fn parse_rows(rows: &[RawRow]) -> Vec<Registrant> {
    rows.iter().map(Registrant::from_raw).collect()
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<Registrant>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let rows = load_rows(file)?;
    let registrants = parse_rows(&rows);

    info!(
        path = %csv_path.display(),
        registrants = registrants.len(),
        "registrants loaded"
    );
    Ok(registrants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ana_row() -> RawRow {
        RawRow {
            name: "Ana".to_string(),
            lastname: "Diaz".to_string(),
            email: "a@x.com".to_string(),
            partido: "P1".to_string(),
            provincia: "Buenos Aires".to_string(),
            disciplina_principal: "Futbol".to_string(),
            gender: "F".to_string(),
            idnumber: "1".to_string(),
            last_access: "2020-05-03 10:00".to_string(),
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_empty(""), None);
        assert_eq!(normalize_empty("Ana"), Some("Ana".to_string()));
        assert_eq!(normalize_empty(" "), Some(" ".to_string()));
    }

    #[test]
    fn test_empty_fields_become_absent() {
        let raw = RawRow {
            gender: "M".to_string(),
            idnumber: "7".to_string(),
            last_access: "2019-09-09 11:00".to_string(),
            ..RawRow::default()
        };

        let r = Registrant::from_raw(&raw);

        assert_eq!(r.name, None);
        assert_eq!(r.lastname, None);
        assert_eq!(r.email, None);
        assert_eq!(r.partido, None);
        assert_eq!(r.provincia, None);
        assert_eq!(r.disciplina_principal, None);
        assert_eq!(r.gender, "M");
    }

    #[test]
    fn test_parse_access_date_day_before_month() {
        let date = parse_access_date("2020-05-03 10:00:00").unwrap();
        assert_eq!(date.year(), 2020);
        assert_eq!(date.day(), 5);
        assert_eq!(date.month(), 3);
    }

    #[test]
    fn test_parse_access_date_requires_space() {
        assert_eq!(parse_access_date("2020-05-03"), None);
        assert_eq!(parse_access_date(""), None);
    }

    #[test]
    fn test_parse_access_date_invalid_shapes() {
        assert_eq!(parse_access_date("03/05/2020 10:00"), None);
        assert_eq!(parse_access_date("20-05-03 10:00"), None);
        assert_eq!(parse_access_date("2020-05-03x 10:00"), None);
        assert_eq!(parse_access_date("2020-05-03-01 10:00"), None);
        assert_eq!(parse_access_date("2020-105-03 10:00"), None);
        assert_eq!(parse_access_date("2020--03 10:00"), None);
        assert_eq!(parse_access_date("+202-05-03 10:00"), None);
    }

    #[test]
    fn test_parse_access_date_single_digit_fields() {
        assert_eq!(parse_access_date("2020-5-3 10:00"), NaiveDate::from_ymd_opt(2020, 3, 5));
    }

    #[test]
    fn test_parse_access_date_rolls_over() {
        // day 31 of February 2020 (leap year)
        assert_eq!(parse_access_date("2020-31-02 10:00"), NaiveDate::from_ymd_opt(2020, 3, 2));
        assert_eq!(parse_access_date("2021-31-02 10:00"), NaiveDate::from_ymd_opt(2021, 3, 3));
        // day 0 of May
        assert_eq!(parse_access_date("2020-00-05 10:00"), NaiveDate::from_ymd_opt(2020, 4, 30));
        // month 13
        assert_eq!(parse_access_date("2020-01-13 10:00"), NaiveDate::from_ymd_opt(2021, 1, 1));
        // month 0 is December of the previous year
        assert_eq!(parse_access_date("2020-05-00 10:00"), NaiveDate::from_ymd_opt(2019, 12, 5));
        // month 31 → July of the next year
        assert_eq!(parse_access_date("2020-05-31 10:00"), NaiveDate::from_ymd_opt(2022, 7, 5));
        // day 99 of January
        assert_eq!(parse_access_date("2020-99-01 10:00"), NaiveDate::from_ymd_opt(2020, 4, 8));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("42"), 42.0);
        assert_eq!(coerce_number(" 42 "), 42.0);
        assert_eq!(coerce_number("-3.5"), -3.5);
        assert_eq!(coerce_number("1e3"), 1000.0);
        assert_eq!(coerce_number(".5"), 0.5);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("   "), 0.0);
        assert_eq!(coerce_number("0x1A"), 26.0);
        assert_eq!(coerce_number("0b101"), 5.0);
        assert_eq!(coerce_number("Infinity"), f64::INFINITY);
        assert_eq!(coerce_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_coerce_number_not_a_number() {
        assert!(coerce_number("abc").is_nan());
        assert!(coerce_number("12-34").is_nan());
        assert!(coerce_number("inf").is_nan());
        assert!(coerce_number("NaN").is_nan());
        assert!(coerce_number("0x").is_nan());
        assert!(coerce_number("0xZZ").is_nan());
        assert!(coerce_number("1,5").is_nan());
    }

    #[test]
    fn test_full_name_with_absent_parts() {
        let mut raw = ana_row();
        assert_eq!(Registrant::from_raw(&raw).full_name, "Ana Diaz");

        raw.name = String::new();
        assert_eq!(Registrant::from_raw(&raw).full_name, "undefined Diaz");

        raw.lastname = String::new();
        assert_eq!(Registrant::from_raw(&raw).full_name, "undefined undefined");
    }

    #[test]
    fn test_invalid_fields_do_not_fail() {
        let mut raw = ana_row();
        raw.idnumber = "not-a-number".to_string();
        raw.last_access = "yesterday".to_string();

        let r = Registrant::from_raw(&raw);

        assert!(!r.has_valid_idnumber());
        assert!(!r.has_valid_last_access());
        assert_eq!(r.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_load_rows_from_csv() {
        let data = "\
name,lastname,email,partido,provincia,disciplina_principal,gender,idnumber,last_access
Ana,Diaz,a@x.com,P1,Buenos Aires,Futbol,F,1,2020-05-03 10:00
,Cruz,c@x.com,P3,Santa Fe,Tenis,M,3,2019-09-09 11:00
";
        let rows = load_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ana_row());

        let registrants = parse_rows(&rows);
        assert_eq!(registrants[1].name, None);
        assert_eq!(registrants[1].lastname.as_deref(), Some("Cruz"));
        assert_eq!(registrants[1].idnumber, 3.0);
    }

    #[test]
    fn test_load_rows_missing_and_extra_columns() {
        let data = "\
name,lastname,extra
Ana,Diaz,ignored
";
        let rows = load_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ana");
        assert_eq!(rows[0].email, "");
        assert_eq!(rows[0].last_access, "");
    }

    #[test]
    fn test_load_rows_ragged_row_is_error() {
        let data = "\
name,lastname
Ana,Diaz,extra
";
        assert!(load_rows(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_rows_empty_dataset() {
        let rows = load_rows("name,lastname\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv(Path::new("/nonexistent/inscripciones.csv"));
        assert!(result.is_err());
    }
}
