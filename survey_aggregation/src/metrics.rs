use std::collections::HashSet;

use crate::config::*;
use crate::filters::FilteredView;

/// Per-label answer counts.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct LabelTally {
    pub agree: u64,
    pub disagree: u64,
    pub unknown: u64,
}

impl LabelTally {
    pub const EMPTY: LabelTally = LabelTally {
        agree: 0,
        disagree: 0,
        unknown: 0,
    };

    pub fn record(&mut self, response: Option<ResponseLabel>) {
        match response {
            Some(ResponseLabel::Agree) => self.agree += 1,
            Some(ResponseLabel::Disagree) => self.disagree += 1,
            Some(ResponseLabel::Unknown) => self.unknown += 1,
            None => {}
        }
    }

    pub fn get(&self, label: ResponseLabel) -> u64 {
        match label {
            ResponseLabel::Agree => self.agree,
            ResponseLabel::Disagree => self.disagree,
            ResponseLabel::Unknown => self.unknown,
        }
    }

    /// Rows carrying an answer.
    pub fn total(&self) -> u64 {
        self.agree + self.disagree + self.unknown
    }

    /// Share of a label among the answered rows.
    pub fn share(&self, label: ResponseLabel) -> f64 {
        percent(self.get(label), self.total())
    }
}

impl<'a> FromIterator<&'a ResponseRecord> for LabelTally {
    fn from_iter<I: IntoIterator<Item = &'a ResponseRecord>>(iter: I) -> Self {
        let mut res = LabelTally::EMPTY;
        for r in iter {
            res.record(r.response);
        }
        res
    }
}

/// `count / total * 100`, and 0 when there is nothing to divide by.
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// Distinct survey ids. Rows without an id do not count.
pub fn respondent_count<'a, I: IntoIterator<Item = &'a ResponseRecord>>(records: I) -> u64 {
    let ids: HashSet<&str> = records
        .into_iter()
        .filter_map(|r| r.survey_id.as_deref())
        .collect();
    ids.len() as u64
}

pub(crate) fn summarize(view: &FilteredView) -> SummaryMetrics {
    let tally: LabelTally = view.iter().collect();
    let response_count = view.len() as u64;
    SummaryMetrics {
        respondent_count: respondent_count(view.iter()),
        response_count,
        agree_pct: percent(tally.agree, response_count),
        disagree_pct: percent(tally.disagree, response_count),
        unknown_pct: percent(tally.unknown, response_count),
        agree_count: tally.agree,
        disagree_count: tally.disagree,
        unknown_count: tally.unknown,
    }
}

/// Current metrics against the placeholder values of the previous period.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PeriodComparison {
    pub previous: PreviousPeriod,
    pub respondent_change_pct: f64,
    pub agree_delta: f64,
    pub disagree_delta: f64,
    pub unknown_delta: f64,
}

pub fn compare_with_previous(current: &SummaryMetrics, previous: &PreviousPeriod) -> PeriodComparison {
    PeriodComparison {
        previous: *previous,
        respondent_change_pct: previous.respondent_change_pct(current.respondent_count),
        agree_delta: current.agree_pct - previous.agree_pct,
        disagree_delta: current.disagree_pct - previous.disagree_pct,
        unknown_delta: current.unknown_pct - previous.unknown_pct,
    }
}
