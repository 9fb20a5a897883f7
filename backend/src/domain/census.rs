//! Census facts and the per-topic tables built from them.
//!
//! Topic schemas differ and are unknown at compile time, so a fact carries a
//! free-form attribute map and each table derives its columns from the facts
//! it holds.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::OutputAreaCode;

/// Census topic identifier such as `TS001`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CensusTopicCode(String);

/// Error raised when a topic code is not a short alphanumeric token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("census topic code '{input}' must be a non-empty alphanumeric code")]
pub struct InvalidCensusTopicCode {
    input: String,
}

impl CensusTopicCode {
    /// Normalise (trim, uppercase) and validate a topic code.
    ///
    /// # Examples
    /// ```
    /// use census_lookup::domain::CensusTopicCode;
    ///
    /// let code = CensusTopicCode::new(" ts001 ").expect("valid code");
    /// assert_eq!(code.as_str(), "TS001");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidCensusTopicCode> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(InvalidCensusTopicCode {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CensusTopicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar value of a census attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Whole-number count.
    Integer(i64),
    /// Fractional measure such as a density.
    Float(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Free text.
    Text(String),
    /// Explicitly empty cell.
    Null,
}

impl AttributeValue {
    /// Interpret a raw CSV cell: integers, then floats, then booleans, then
    /// text. Blank cells become [`AttributeValue::Null`].
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Integer(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return Self::Float(value);
            }
        }
        match trimmed {
            "true" | "True" | "TRUE" => Self::Boolean(true),
            "false" | "False" | "FALSE" => Self::Boolean(false),
            _ => Self::Text(trimmed.to_owned()),
        }
    }

    /// Numeric view of the value, when it has one.
    ///
    /// Integers beyond 2^53 round to the nearest representable float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Boolean(_) | Self::Text(_) | Self::Null => None,
        }
    }

    /// Convert into a JSON value for storage.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(value) => serde_json::Value::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Boolean(value) => serde_json::Value::Bool(*value),
            Self::Text(value) => serde_json::Value::String(value.clone()),
            Self::Null => serde_json::Value::Null,
        }
    }

    /// Convert a stored JSON scalar. Nested arrays and objects are kept as
    /// their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Boolean(*flag),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(text) => Self::Text(text.clone()),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Text(nested.to_string())
            }
        }
    }
}

/// Ordered attribute map of one census fact.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// One census topic's data for one output area.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusFact {
    /// Output area the fact describes.
    pub output_area_code: OutputAreaCode,
    /// Topic the fact belongs to.
    pub topic: CensusTopicCode,
    /// Topic-specific fields.
    pub attributes: Attributes,
}

/// A table row: one fact, tagged with its output area.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusRow {
    /// Output area the row describes.
    pub output_area_code: OutputAreaCode,
    /// Values keyed by column name. Columns the fact lacks are absent.
    pub values: Attributes,
}

/// All facts of one topic across a neighbourhood.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusTable {
    topic: CensusTopicCode,
    columns: Vec<String>,
    rows: Vec<CensusRow>,
}

impl CensusTable {
    /// Topic shown by the table.
    pub fn topic(&self) -> &CensusTopicCode {
        &self.topic
    }

    /// Union of the attribute keys seen across rows, sorted by name rather
    /// than by their order in the source file.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in the order their facts were supplied.
    pub fn rows(&self) -> &[CensusRow] {
        &self.rows
    }

    /// First column holding a numeric value in any row.
    pub fn first_numeric_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|column| {
                self.rows.iter().any(|row| {
                    row.values
                        .get(column.as_str())
                        .and_then(AttributeValue::as_f64)
                        .is_some()
                })
            })
            .map(String::as_str)
    }

    /// `(area, value)` pairs for a numeric column; rows without a numeric
    /// value in that column are skipped.
    pub fn series(&self, column: &str) -> Vec<(&OutputAreaCode, f64)> {
        self.rows
            .iter()
            .filter_map(|row| {
                row.values
                    .get(column)
                    .and_then(AttributeValue::as_f64)
                    .map(|value| (&row.output_area_code, value))
            })
            .collect()
    }
}

/// Group facts by topic and flatten each into a row.
///
/// Topics with no facts are absent from the result. Duplicate facts are kept
/// as separate rows.
pub fn tabulate(facts: Vec<CensusFact>) -> BTreeMap<CensusTopicCode, CensusTable> {
    let mut grouped: BTreeMap<CensusTopicCode, (BTreeSet<String>, Vec<CensusRow>)> =
        BTreeMap::new();
    for fact in facts {
        let (columns, rows) = grouped.entry(fact.topic).or_default();
        columns.extend(fact.attributes.keys().cloned());
        rows.push(CensusRow {
            output_area_code: fact.output_area_code,
            values: fact.attributes,
        });
    }

    grouped
        .into_iter()
        .map(|(topic, (columns, rows))| {
            let table = CensusTable {
                topic: topic.clone(),
                columns: columns.into_iter().collect(),
                rows,
            };
            (topic, table)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fact(area: &str, topic: &str, attributes: &[(&str, AttributeValue)]) -> CensusFact {
        CensusFact {
            output_area_code: OutputAreaCode::new(area).expect("area code"),
            topic: CensusTopicCode::new(topic).expect("topic code"),
            attributes: attributes
                .iter()
                .map(|(key, value)| ((*key).to_owned(), value.clone()))
                .collect(),
        }
    }

    #[rstest]
    fn tabulate_groups_by_topic_and_unions_columns() {
        let tables = tabulate(vec![
            fact("E00000001", "TS001", &[("residents", AttributeValue::Integer(10))]),
            fact("E00000002", "TS001", &[("households", AttributeValue::Integer(4))]),
            fact("E00000001", "TS006", &[("density", AttributeValue::Float(12.5))]),
        ]);

        assert_eq!(tables.len(), 2);
        let ts001 = &tables[&CensusTopicCode::new("TS001").expect("topic")];
        assert_eq!(ts001.columns(), ["households", "residents"]);
        assert_eq!(ts001.rows().len(), 2);
        assert!(ts001.rows()[0].values.get("households").is_none());
    }

    #[rstest]
    fn tabulate_keeps_duplicate_facts() {
        let duplicate = fact("E00000001", "TS001", &[("residents", AttributeValue::Integer(10))]);
        let tables = tabulate(vec![duplicate.clone(), duplicate]);

        let ts001 = &tables[&CensusTopicCode::new("TS001").expect("topic")];
        assert_eq!(ts001.rows().len(), 2);
    }

    #[rstest]
    fn tabulate_of_nothing_is_empty() {
        assert!(tabulate(Vec::new()).is_empty());
    }

    #[rstest]
    fn series_uses_first_numeric_column() {
        let tables = tabulate(vec![
            fact(
                "E00000001",
                "TS001",
                &[
                    ("label", AttributeValue::Text("a".to_owned())),
                    ("residents", AttributeValue::Integer(10)),
                ],
            ),
            fact("E00000002", "TS001", &[("residents", AttributeValue::Integer(7))]),
        ]);
        let table = &tables[&CensusTopicCode::new("TS001").expect("topic")];

        let column = table.first_numeric_column().expect("numeric column");
        assert_eq!(column, "residents");
        let series: Vec<_> = table
            .series(column)
            .into_iter()
            .map(|(area, value)| (area.as_str().to_owned(), value))
            .collect();
        assert_eq!(
            series,
            vec![("E00000001".to_owned(), 10.0), ("E00000002".to_owned(), 7.0)]
        );
    }

    #[rstest]
    fn first_numeric_column_follows_name_order() {
        let tables = tabulate(vec![fact(
            "E00000001",
            "TS001",
            &[
                ("Residents: Total", AttributeValue::Integer(120)),
                ("Residents: Communal", AttributeValue::Integer(5)),
                ("Area name", AttributeValue::Text("City of London".to_owned())),
            ],
        )]);

        let ts001 = &tables[&CensusTopicCode::new("TS001").expect("topic")];
        assert_eq!(
            ts001.columns(),
            ["Area name", "Residents: Communal", "Residents: Total"]
        );
        assert_eq!(ts001.first_numeric_column(), Some("Residents: Communal"));
    }

    #[rstest]
    #[case("42", AttributeValue::Integer(42))]
    #[case("4.5", AttributeValue::Float(4.5))]
    #[case("true", AttributeValue::Boolean(true))]
    #[case("Westminster", AttributeValue::Text("Westminster".to_owned()))]
    #[case("  ", AttributeValue::Null)]
    fn infer_picks_the_narrowest_type(#[case] raw: &str, #[case] expected: AttributeValue) {
        assert_eq!(AttributeValue::infer(raw), expected);
    }

    #[rstest]
    #[case(AttributeValue::Integer(3))]
    #[case(AttributeValue::Float(0.25))]
    #[case(AttributeValue::Text("x".to_owned()))]
    #[case(AttributeValue::Null)]
    fn json_conversion_preserves_scalars(#[case] value: AttributeValue) {
        assert_eq!(AttributeValue::from_json(&value.to_json()), value);
    }

    #[rstest]
    #[case("")]
    #[case("TS-001")]
    fn topic_codes_must_be_alphanumeric(#[case] raw: &str) {
        assert!(CensusTopicCode::new(raw).is_err());
    }
}
