use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::config::*;
use crate::filters::FilteredView;
use crate::metrics::LabelTally;

/// The columns a distribution can be grouped by.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum GroupField {
    Axis,
    Dimension,
    ManagingUnit,
    Course,
    Sector,
    Discipline,
}

impl GroupField {
    pub fn column(self) -> Column {
        match self {
            GroupField::Axis => Column::AxisName,
            GroupField::Dimension => Column::DimensionName,
            GroupField::ManagingUnit => Column::ManagingUnit,
            GroupField::Course => Column::CourseName,
            GroupField::Sector => Column::SectorName,
            GroupField::Discipline => Column::DisciplineName,
        }
    }

    fn key(self, record: &ResponseRecord) -> Option<&str> {
        match self {
            GroupField::Axis => record.axis_name.as_deref(),
            GroupField::Dimension => record.dimension_name.as_deref(),
            GroupField::ManagingUnit => record.managing_unit.as_deref(),
            GroupField::Course => record.course_name.as_deref(),
            GroupField::Sector => record.sector_name.as_deref(),
            GroupField::Discipline => record.discipline_name.as_deref(),
        }
    }
}

/// Label shares per category, sorted by category then label.
///
/// Rows without a category or without an answer are left out. Labels that do
/// not occur in a category produce no entry.
pub(crate) fn group_distribution(view: &FilteredView, field: GroupField) -> Vec<GroupShare> {
    let mut tallies: BTreeMap<&str, LabelTally> = BTreeMap::new();
    for r in view.iter() {
        if let (Some(category), Some(_)) = (field.key(r), r.response) {
            tallies
                .entry(category)
                .or_insert(LabelTally::EMPTY)
                .record(r.response);
        }
    }
    debug!(
        "group_distribution: {:?}: {} categories",
        field,
        tallies.len()
    );

    let mut res: Vec<GroupShare> = Vec::new();
    for (category, tally) in tallies.iter() {
        let total = tally.total();
        for label in ResponseLabel::ALL {
            let count = tally.get(label);
            if count > 0 {
                res.push(GroupShare {
                    category: category.to_string(),
                    label,
                    count,
                    total,
                    percent: tally.share(label),
                });
            }
        }
    }
    res
}

/// Answer shares of every question of one dimension, weakest agreement first.
///
/// Questions without any answer are left out. Ties keep question text order.
pub(crate) fn opinion_balance(view: &FilteredView, dimension: &str) -> Vec<QuestionBalance> {
    let dimension = dimension.trim();
    let mut tallies: BTreeMap<&str, LabelTally> = BTreeMap::new();
    for r in view.iter() {
        if r.dimension_name.as_deref() != Some(dimension) || r.response.is_none() {
            continue;
        }
        if let Some(question) = r.question_text.as_deref() {
            tallies
                .entry(question)
                .or_insert(LabelTally::EMPTY)
                .record(r.response);
        }
    }
    debug!(
        "opinion_balance: dimension {:?}: {} questions",
        dimension,
        tallies.len()
    );

    let mut res: Vec<QuestionBalance> = tallies
        .iter()
        .map(|(question, tally)| QuestionBalance {
            question: question.to_string(),
            agree_pct: tally.share(ResponseLabel::Agree),
            disagree_pct: tally.share(ResponseLabel::Disagree),
            unknown_pct: tally.share(ResponseLabel::Unknown),
        })
        .collect();
    res.sort_by(|a, b| a.agree_pct.total_cmp(&b.agree_pct));
    res
}

// Counts in order of first encounter.
struct EncounterCounter<'a> {
    positions: HashMap<&'a str, usize>,
    counts: Vec<(&'a str, u64)>,
}

impl<'a> EncounterCounter<'a> {
    fn new() -> EncounterCounter<'a> {
        EncounterCounter {
            positions: HashMap::new(),
            counts: Vec::new(),
        }
    }

    fn add(&mut self, key: &'a str) {
        match self.positions.get(key) {
            Some(&idx) => self.counts[idx].1 += 1,
            None => {
                self.positions.insert(key, self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    /// The `n` largest counts, largest first. Ties keep encounter order.
    fn largest(self, n: usize) -> Vec<UnitCount> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(n)
            .map(|(unit, count)| UnitCount {
                unit: unit.to_string(),
                count,
            })
            .collect()
    }
}

/// Rows per managing unit for the `top_n` busiest units, smallest first so a
/// horizontal bar chart reads bottom to top.
pub(crate) fn unit_response_volume(view: &FilteredView, top_n: usize) -> Vec<UnitCount> {
    let mut counter = EncounterCounter::new();
    for r in view.iter() {
        if let Some(unit) = r.managing_unit.as_deref() {
            counter.add(unit);
        }
    }
    let mut res = counter.largest(top_n);
    res.sort_by_key(|u| u.count);
    res
}

/// Distinct respondents of the `top_n` largest units against all the others.
///
/// A respondent is attributed to the unit of their first row, so nobody is
/// counted twice.
pub(crate) fn top_units_participation<'a, I>(records: I, top_n: usize) -> TopUnitsParticipation
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counter = EncounterCounter::new();
    for r in records {
        if let (Some(id), Some(unit)) = (r.survey_id.as_deref(), r.managing_unit.as_deref()) {
            if seen.insert(id) {
                counter.add(unit);
            }
        }
    }
    let grand_total = seen.len() as u64;
    let per_unit = counter.largest(top_n);
    let top_total: u64 = per_unit.iter().map(|u| u.count).sum();
    debug!(
        "top_units_participation: {} respondents, top {} units hold {}",
        grand_total, top_n, top_total
    );
    TopUnitsParticipation {
        top_total,
        other_total: grand_total - top_total,
        per_unit,
    }
}
