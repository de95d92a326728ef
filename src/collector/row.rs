//! Result rows and cell coercion.

use thiserror::Error;

use super::definition::CollectError;

/// A cell value could not be coerced to the numeric type a collector expects.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot coerce {value} to {expected}")]
pub struct CoercionError {
    /// Debug rendering of the offending cell.
    pub value: String,
    /// Target type (`"integer"` or `"float"`).
    pub expected: &'static str,
}

impl CoercionError {
    fn new(value: &Value, expected: &'static str) -> Self {
        Self {
            value: format!("{value:?}"),
            expected,
        }
    }
}

/// One cell of a result row.
///
/// The database driver decides the variant from the SQL column type; the
/// value is not self-describing, so collectors coerce explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Coerce a counter column to an integer-valued gauge.
    ///
    /// Strings are parsed base-10 with a truncating parse: surrounding
    /// whitespace is ignored, an optional sign and the leading digits are
    /// kept and anything after them is dropped (`"1024"` → 1024,
    /// `"12.9"` → 12). Input without leading digits is an error.
    pub fn counter(&self) -> Result<f64, CoercionError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) if v.is_finite() => Ok(v.trunc()),
            Value::Text(s) => {
                parse_leading_integer(s).ok_or_else(|| CoercionError::new(self, "integer"))
            }
            Value::Float(_) | Value::Null => Err(CoercionError::new(self, "integer")),
        }
    }

    /// Pass a numeric column through as a float.
    pub fn gauge(&self) -> Result<f64, CoercionError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| CoercionError::new(self, "float")),
            Value::Null => Err(CoercionError::new(self, "float")),
        }
    }

    /// Render the cell as a label value. NULL becomes the empty string.
    pub fn label(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(s) => s.clone(),
            Value::Null => String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Digit runs wider than `i64` still parse, losing precision past 2^53.
fn parse_leading_integer(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: f64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row: cells in the query's declared column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Value>,
}

impl Row {
    pub fn new(cells: Vec<Value>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    /// Cell at `index`.
    ///
    /// # Errors
    /// Returns [`CollectError::ColumnOutOfRange`] when reading past the row.
    pub fn cell(&self, index: usize) -> Result<&Value, CollectError> {
        self.cells
            .get(index)
            .ok_or(CollectError::ColumnOutOfRange {
                index,
                width: self.cells.len(),
            })
    }
}

impl From<Vec<Value>> for Row {
    fn from(cells: Vec<Value>) -> Self {
        Self::new(cells)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_from_string() {
        assert_eq!(Value::from("1024").counter().unwrap(), 1024.0);
        assert_eq!(Value::from("  42 ").counter().unwrap(), 42.0);
        assert_eq!(Value::from("-7").counter().unwrap(), -7.0);
        assert_eq!(Value::from("12.9").counter().unwrap(), 12.0);
        assert_eq!(Value::from("300abc").counter().unwrap(), 300.0);
    }

    #[test]
    fn test_counter_rejects_non_numeric() {
        assert!(Value::from("abc").counter().is_err());
        assert!(Value::from("").counter().is_err());
        assert!(Value::from("-").counter().is_err());
        assert!(Value::Null.counter().is_err());
        assert!(Value::Float(f64::NAN).counter().is_err());
        let err = Value::from("n/a").counter().unwrap_err();
        assert_eq!(err.expected, "integer");
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn test_counter_wider_than_i64() {
        let value = Value::from("123456789012345678901234").counter().unwrap();
        assert_eq!(value, 123456789012345678901234.0);
        assert_eq!(
            Value::from("-99999999999999999999 rows").counter().unwrap(),
            -99999999999999999999.0
        );
    }

    #[test]
    fn test_counter_from_numbers() {
        assert_eq!(Value::Int(5).counter().unwrap(), 5.0);
        assert_eq!(Value::Float(5.8).counter().unwrap(), 5.0);
    }

    #[test]
    fn test_gauge_passes_floats_through() {
        assert_eq!(Value::Float(37.5).gauge().unwrap(), 37.5);
        assert_eq!(Value::Int(3).gauge().unwrap(), 3.0);
        assert_eq!(Value::from("0.25").gauge().unwrap(), 0.25);
        assert!(Value::from("x").gauge().is_err());
        assert!(Value::Null.gauge().is_err());
    }

    #[test]
    fn test_label_rendering() {
        assert_eq!(Value::from("AppDB").label(), "AppDB");
        assert_eq!(Value::Int(0).label(), "0");
        assert_eq!(Value::Null.label(), "");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_cell_out_of_range() {
        let row = Row::from(vec![Value::Int(1)]);
        assert_eq!(row.cell(0).unwrap(), &Value::Int(1));
        assert!(matches!(
            row.cell(1),
            Err(CollectError::ColumnOutOfRange { index: 1, width: 1 })
        ));
    }
}
