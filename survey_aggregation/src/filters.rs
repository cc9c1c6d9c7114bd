//! Filter resolution: turning dashboard selector values into a predicate over
//! response records.
//!
//! Every dimension accepts nothing, a single value, a list of values, or one of
//! the "all" sentinels. Anything that cannot be understood is treated as "no
//! constraint" for that dimension; resolution never fails.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::config::*;
use crate::dataset::Dataset;

/// The sentinel placed at the head of every selector.
pub const ALL: &str = "All";

// Every spelling of "all" found in the dashboards.
const ALL_SENTINELS: [&str; 4] = [ALL, "Todos", "Todas", "Todas as disciplinas"];

/// Separator between the segments of a composite selector label.
pub const COMPOSITE_SEPARATOR: &str = " - ";

pub fn is_all_sentinel(value: &str) -> bool {
    let v = value.trim();
    ALL_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(v))
}

/// The dimensions a view can be filtered on.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum FilterDimension {
    Axis,
    Question,
    Course,
    Sector,
    Discipline,
    ManagingUnit,
    Dimension,
}

impl FilterDimension {
    pub fn column(self) -> Column {
        match self {
            FilterDimension::Axis => Column::AxisName,
            FilterDimension::Question => Column::QuestionText,
            FilterDimension::Course => Column::CourseName,
            FilterDimension::Sector => Column::SectorName,
            FilterDimension::Discipline => Column::DisciplineName,
            FilterDimension::ManagingUnit => Column::ManagingUnit,
            FilterDimension::Dimension => Column::DimensionName,
        }
    }

    pub(crate) fn value_of(self, record: &ResponseRecord) -> Option<&str> {
        match self {
            FilterDimension::Axis => record.axis_name.as_deref(),
            FilterDimension::Question => record.question_text.as_deref(),
            FilterDimension::Course => record.course_name.as_deref(),
            FilterDimension::Sector => record.sector_name.as_deref(),
            FilterDimension::Discipline => record.discipline_name.as_deref(),
            FilterDimension::ManagingUnit => record.managing_unit.as_deref(),
            FilterDimension::Dimension => record.dimension_name.as_deref(),
        }
    }
}

/// The raw value of one selector.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub enum FilterValue {
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> FilterValue {
        FilterValue::Single(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> FilterValue {
        FilterValue::Single(s)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> FilterValue {
        FilterValue::List(v)
    }
}

impl From<&[&str]> for FilterValue {
    fn from(v: &[&str]) -> FilterValue {
        FilterValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(o: Option<T>) -> FilterValue {
        o.map(Into::into).unwrap_or(FilterValue::Absent)
    }
}

/// One segment of a composite selector label, e.g. `Curso: Física`.
///
/// Without a prefix the segment is the bare value.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CompositeField {
    pub dimension: FilterDimension,
    pub prefix: Option<&'static str>,
}

impl CompositeField {
    fn format(&self, value: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{}: {}", prefix, value),
            None => value.to_string(),
        }
    }

    fn extract<'s>(&self, segment: &'s str) -> Option<&'s str> {
        let segment = segment.trim();
        let value = match self.prefix {
            Some(prefix) => segment.strip_prefix(prefix)?.trim_start().strip_prefix(':')?,
            None => segment,
        };
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// The discipline selector: `Disciplina: <d> - Curso: <c> - Setor: <s>`.
pub const DISCIPLINE_SELECTOR: [CompositeField; 3] = [
    CompositeField {
        dimension: FilterDimension::Discipline,
        prefix: Some("Disciplina"),
    },
    CompositeField {
        dimension: FilterDimension::Course,
        prefix: Some("Curso"),
    },
    CompositeField {
        dimension: FilterDimension::Sector,
        prefix: Some("Setor"),
    },
];

/// The question selector: `<axis> - <question text>`.
pub const QUESTION_SELECTOR: [CompositeField; 2] = [
    CompositeField {
        dimension: FilterDimension::Axis,
        prefix: None,
    },
    CompositeField {
        dimension: FilterDimension::Question,
        prefix: None,
    },
];

pub(crate) fn format_composite(fields: &[CompositeField], values: &[&str]) -> String {
    fields
        .iter()
        .zip(values.iter())
        .map(|(f, v)| f.format(v))
        .collect::<Vec<String>>()
        .join(COMPOSITE_SEPARATOR)
}

/// Splits a composite label positionally. Segments that are missing or do not
/// carry their prefix come back as None.
pub fn decompose_composite<'s>(
    label: &'s str,
    fields: &[CompositeField],
) -> Vec<(FilterDimension, Option<&'s str>)> {
    if is_all_sentinel(label) {
        return fields.iter().map(|f| (f.dimension, None)).collect();
    }
    let segments: Vec<&str> = label.split(COMPOSITE_SEPARATOR).collect();
    if segments.len() != fields.len() {
        warn!(
            "decompose_composite: label {:?} has {} segments, expected {}",
            label,
            segments.len(),
            fields.len()
        );
    }
    fields
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            let value = segments.get(idx).and_then(|s| f.extract(s));
            if value.is_none() {
                warn!(
                    "decompose_composite: no {:?} value in {:?}, not constraining it",
                    f.dimension, label
                );
            }
            (f.dimension, value)
        })
        .collect()
}

/// The question text of a `<axis> - <question text>` label.
pub fn question_text_of(label: &str) -> Option<&str> {
    let (_, text) = label.split_once(COMPOSITE_SEPARATOR)?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// The selector values of one view.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterSelection {
    values: BTreeMap<FilterDimension, FilterValue>,
}

impl FilterSelection {
    pub fn new() -> FilterSelection {
        FilterSelection::default()
    }

    pub fn with<V: Into<FilterValue>>(mut self, dimension: FilterDimension, value: V) -> Self {
        self.set(dimension, value);
        self
    }

    pub fn set<V: Into<FilterValue>>(&mut self, dimension: FilterDimension, value: V) {
        self.values.insert(dimension, value.into());
    }

    pub fn get(&self, dimension: FilterDimension) -> Option<&FilterValue> {
        self.values.get(&dimension)
    }

    /// Sets the dimensions encoded in a composite selector label.
    ///
    /// The question dimension keeps the whole label: question values are
    /// `<axis> - <question text>` labels and are split again on resolution.
    pub fn with_composite(mut self, label: &str, fields: &[CompositeField]) -> Self {
        for (dimension, value) in decompose_composite(label, fields) {
            let value = match (dimension, value) {
                (FilterDimension::Question, Some(_)) => Some(label.trim()),
                (_, v) => v,
            };
            self.set(dimension, value);
        }
        self
    }

    /// The same selection with some dimensions released.
    pub fn without(&self, dimensions: &[FilterDimension]) -> FilterSelection {
        let mut res = self.clone();
        for d in dimensions {
            res.values.remove(d);
        }
        res
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct Constraint {
    dimension: FilterDimension,
    accepted: HashSet<String>,
}

/// A selection reduced to the predicate it stands for.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ResolvedFilter {
    constraints: Vec<Constraint>,
    order_by_axis: bool,
}

impl ResolvedFilter {
    pub fn resolve(selection: &FilterSelection) -> ResolvedFilter {
        let mut constraints: Vec<Constraint> = Vec::new();
        for (dimension, value) in selection.values.iter() {
            if let Some(accepted) = accepted_values(*dimension, value) {
                constraints.push(Constraint {
                    dimension: *dimension,
                    accepted,
                });
            }
        }
        let order_by_axis = constraints
            .iter()
            .any(|c| c.dimension == FilterDimension::Axis);
        debug!(
            "ResolvedFilter::resolve: {} active constraints, order by axis: {}",
            constraints.len(),
            order_by_axis
        );
        ResolvedFilter {
            constraints,
            order_by_axis,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constrains(&self, dimension: FilterDimension) -> bool {
        self.constraints.iter().any(|c| c.dimension == dimension)
    }

    pub fn accepts(&self, record: &ResponseRecord) -> bool {
        self.constraints.iter().all(|c| {
            c.dimension
                .value_of(record)
                .map(|v| c.accepted.contains(v))
                .unwrap_or(false)
        })
    }

    /// Applies the predicate. An active axis constraint also orders the rows by
    /// the dataset's `Ordem` column.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Result<FilteredView<'a>, AggregationError> {
        let columns: Vec<Column> = self.constraints.iter().map(|c| c.dimension.column()).collect();
        dataset.require(&columns)?;
        let mut records: Vec<&'a ResponseRecord> =
            dataset.records().iter().filter(|r| self.accepts(r)).collect();
        if self.order_by_axis && dataset.has_column(Column::Order) {
            // Stable: rows without an order keep their relative position, last.
            records.sort_by_key(|r| (r.order.is_none(), r.order));
        }
        debug!(
            "ResolvedFilter::apply: kept {} of {} rows",
            records.len(),
            dataset.len()
        );
        Ok(FilteredView { records })
    }
}

fn accepted_values(dimension: FilterDimension, value: &FilterValue) -> Option<HashSet<String>> {
    let raw: Vec<&str> = match value {
        FilterValue::Absent => return None,
        FilterValue::Single(s) => vec![s.as_str()],
        FilterValue::List(l) => l.iter().map(|s| s.as_str()).collect(),
    };
    if raw.iter().any(|s| is_all_sentinel(s)) {
        return None;
    }
    let accepted: HashSet<String> = raw
        .iter()
        .filter_map(|s| match dimension {
            FilterDimension::Question => {
                let q = question_text_of(s);
                if q.is_none() {
                    warn!("accepted_values: ignoring malformed question label {:?}", s);
                }
                q
            }
            _ => Some(s.trim()),
        })
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if accepted.is_empty() {
        warn!(
            "accepted_values: nothing usable for {:?} in {:?}, not constraining it",
            dimension, value
        );
        None
    } else {
        Some(accepted)
    }
}

/// The rows of a dataset that passed a filter. Borrowed, never copied.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a ResponseRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn all(dataset: &'a Dataset) -> FilteredView<'a> {
        FilteredView {
            records: dataset.records().iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ResponseRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
