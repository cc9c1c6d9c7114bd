pub use crate::config::*;
use crate::dataset::Dataset;

use log::{debug, warn};
use std::collections::BTreeSet;

/// A builder for assembling a dataset row by row.
///
/// Cells are trimmed, empty cells are treated as missing, and both encodings
/// of the answer (label or signed value) are decoded.
///
/// ```
/// use survey_aggregation::builder::DatasetBuilder;
/// use survey_aggregation::Column;
///
/// let mut builder = DatasetBuilder::new(&[Column::SurveyId, Column::ResponseValue, Column::AxisCode]);
/// builder.add_cells(&[
///     (Column::SurveyId, "17"),
///     (Column::ResponseValue, "-1"),
///     (Column::AxisCode, "politicas_academicas"),
/// ]);
/// let dataset = builder.build();
///
/// assert_eq!(dataset.len(), 1);
/// assert!(dataset.has_column(Column::ResponseLabel));
/// assert_eq!(dataset.records()[0].axis_name.as_deref(), Some("Politicas Academicas"));
/// ```
pub struct DatasetBuilder {
    pub(crate) _columns: BTreeSet<Column>,
    pub(crate) _records: Vec<ResponseRecord>,
}

impl DatasetBuilder {
    /// Starts a dataset with the given columns, usually the header of a file.
    pub fn new(columns: &[Column]) -> DatasetBuilder {
        DatasetBuilder {
            _columns: columns.iter().copied().collect(),
            _records: Vec::new(),
        }
    }

    /// Adds a row given as raw cells.
    ///
    /// Cells for columns not declared at construction still fill the record but
    /// do not make the column count as present.
    pub fn add_cells<S: AsRef<str>>(&mut self, cells: &[(Column, S)]) {
        let mut record = ResponseRecord::default();
        let mut axis_code: Option<String> = None;
        let mut label_cell: Option<ResponseLabel> = None;
        let mut value_cell: Option<ResponseLabel> = None;
        let mut answer_cells: Vec<&str> = Vec::new();
        for (column, raw) in cells {
            let cell = raw.as_ref().trim();
            if cell.is_empty() {
                continue;
            }
            let text = Some(cell.to_string());
            match column {
                Column::SurveyId => record.survey_id = text,
                Column::ResponseLabel => {
                    answer_cells.push(cell);
                    label_cell = ResponseLabel::parse(cell)
                }
                Column::ResponseValue => {
                    answer_cells.push(cell);
                    value_cell = parse_response_value(cell)
                }
                Column::AxisName => record.axis_name = text,
                Column::AxisCode => axis_code = text,
                Column::DimensionName => record.dimension_name = text,
                Column::QuestionId => record.question_id = text,
                Column::QuestionText => record.question_text = text,
                Column::CourseName => record.course_name = text,
                Column::SectorName => record.sector_name = text,
                Column::DisciplineName => record.discipline_name = text,
                Column::DeliveryMode => record.delivery_mode = DeliveryMode::parse(cell),
                Column::ManagingUnit => record.managing_unit = text,
                Column::Order => record.order = parse_integer(cell),
            }
        }
        record.response = label_cell.or(value_cell);
        if record.response.is_none() {
            if answer_cells.is_empty() {
                debug!("add_cells: row {} has no answer", self._records.len());
            } else {
                warn!(
                    "add_cells: row {}: cannot decode answer {:?}, the row counts in no label",
                    self._records.len(),
                    answer_cells
                );
            }
        }
        if record.axis_name.is_none() {
            record.axis_name = axis_code.as_deref().map(axis_display_name);
        }
        self.add_record(record);
    }

    /// Adds a record that is already decoded.
    pub fn add_record(&mut self, record: ResponseRecord) {
        self._records.push(record);
    }

    pub fn build(self) -> Dataset {
        let mut columns = self._columns;
        // The code and the numeric encoding stand in for their display columns.
        if columns.contains(&Column::AxisCode) {
            columns.insert(Column::AxisName);
        }
        if columns.contains(&Column::ResponseValue) {
            columns.insert(Column::ResponseLabel);
        }
        debug!(
            "DatasetBuilder::build: {} rows, columns {:?}",
            self._records.len(),
            columns
        );
        Dataset {
            columns,
            records: self._records,
        }
    }
}

/// Derives an axis display name from its internal code:
/// separators become spaces and every word is title-cased.
pub fn axis_display_name(code: &str) -> String {
    let spaced = code.replace('_', " ");
    let mut res = String::with_capacity(spaced.len());
    let mut previous_is_letter = false;
    for c in spaced.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            res.push(c);
            previous_is_letter = false;
        }
    }
    res.trim().to_string()
}

// Spreadsheets tend to store integers as floats ("1.0").
fn parse_integer(cell: &str) -> Option<i64> {
    if let Ok(x) = cell.parse::<i64>() {
        return Some(x);
    }
    match cell.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

fn parse_response_value(cell: &str) -> Option<ResponseLabel> {
    parse_integer(cell).and_then(ResponseLabel::from_value)
}
