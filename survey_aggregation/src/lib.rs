/*!
Aggregation and filtering engine for institutional survey dashboards.

Every operation is a pure function of an immutable [`dataset::Dataset`] and a
[`filters::FilterSelection`]: it resolves the filters, scans the selected rows
once and returns freshly allocated results. Empty selections give zero
results, never errors. See [`manual`] for the column vocabulary.

```
use survey_aggregation::builder::DatasetBuilder;
use survey_aggregation::filters::{FilterDimension, FilterSelection};
use survey_aggregation::*;

let mut builder = DatasetBuilder::new(&[Column::SurveyId, Column::ResponseLabel, Column::AxisName]);
for (id, answer) in [("A", "Concordo"), ("A", "Concordo"), ("B", "Discordo")] {
    builder.add_cells(&[
        (Column::SurveyId, id),
        (Column::ResponseLabel, answer),
        (Column::AxisName, "Eixo 1"),
    ]);
}
let dataset = builder.build();

let filters = FilterSelection::new().with(FilterDimension::Axis, "Todos");
let metrics = compute_summary_metrics(&dataset, &filters).unwrap();
assert_eq!(metrics.respondent_count, 2);
assert_eq!(format!("{:.1}", metrics.agree_pct), "66.7");
```
*/

mod config;
mod groups;
mod metrics;

pub mod builder;
pub mod charts;
pub mod dataset;
pub mod filters;
pub mod manual;

use log::{debug, info};

use std::collections::BTreeSet;

pub use crate::config::*;
pub use crate::groups::GroupField;
pub use crate::metrics::{
    compare_with_previous, percent, respondent_count, LabelTally, PeriodComparison,
};

use crate::dataset::Dataset;
use crate::filters::{
    format_composite, CompositeField, FilterDimension, FilterSelection, FilteredView,
    ResolvedFilter, ALL,
};

/// The rows of a dataset selected by the filters.
pub fn apply_filters<'a>(
    dataset: &'a Dataset,
    filters: &FilterSelection,
) -> Result<FilteredView<'a>, AggregationError> {
    ResolvedFilter::resolve(filters).apply(dataset)
}

/// Respondent and answer counts of the selection, with the share of each
/// answer among all selected rows.
///
/// Rows whose answer could not be decoded still count in `response_count` but
/// in none of the labels, so the three percentages then sum to less than 100.
pub fn compute_summary_metrics(
    dataset: &Dataset,
    filters: &FilterSelection,
) -> Result<SummaryMetrics, AggregationError> {
    dataset.require(&[Column::SurveyId, Column::ResponseLabel])?;
    let view = apply_filters(dataset, filters)?;
    let res = metrics::summarize(&view);
    info!(
        "compute_summary_metrics: {} rows, {} respondents",
        res.response_count, res.respondent_count
    );
    Ok(res)
}

/// Answer shares per category of `group_by`, sorted by category then label.
pub fn compute_group_distribution(
    dataset: &Dataset,
    filters: &FilterSelection,
    group_by: GroupField,
) -> Result<Vec<GroupShare>, AggregationError> {
    dataset.require(&[Column::ResponseLabel, group_by.column()])?;
    let view = apply_filters(dataset, filters)?;
    let res = groups::group_distribution(&view, group_by);
    info!(
        "compute_group_distribution: {:?} over {} rows: {} entries",
        group_by,
        view.len(),
        res.len()
    );
    Ok(res)
}

/// Answer shares of each question of a dimension, weakest agreement first.
pub fn compute_opinion_balance(
    dataset: &Dataset,
    filters: &FilterSelection,
    dimension: &str,
) -> Result<Vec<QuestionBalance>, AggregationError> {
    dataset.require(&[
        Column::DimensionName,
        Column::QuestionText,
        Column::ResponseLabel,
    ])?;
    let view = apply_filters(dataset, filters)?;
    let res = groups::opinion_balance(&view, dimension);
    info!(
        "compute_opinion_balance: dimension {:?} over {} rows: {} questions",
        dimension,
        view.len(),
        res.len()
    );
    Ok(res)
}

/// Distinct respondents of the `top_n` largest managing units against the
/// rest, over the whole dataset.
pub fn compute_top_units_participation(
    dataset: &Dataset,
    top_n: usize,
) -> Result<TopUnitsParticipation, AggregationError> {
    dataset.require(&[Column::SurveyId, Column::ManagingUnit])?;
    let res = groups::top_units_participation(dataset.records(), top_n);
    info!(
        "compute_top_units_participation: top {} hold {} of {} respondents",
        top_n,
        res.top_total,
        res.grand_total()
    );
    Ok(res)
}

/// Rows per managing unit of the `top_n` busiest units, smallest first.
pub fn compute_unit_response_volume(
    dataset: &Dataset,
    filters: &FilterSelection,
    top_n: usize,
) -> Result<Vec<UnitCount>, AggregationError> {
    dataset.require(&[Column::ManagingUnit])?;
    let view = apply_filters(dataset, filters)?;
    let res = groups::unit_response_volume(&view, top_n);
    info!(
        "compute_unit_response_volume: {} units over {} rows",
        res.len(),
        view.len()
    );
    Ok(res)
}

/// Summary metrics of the selection, of its whole course and of its whole
/// sector. The course scope releases the discipline filter, the sector scope
/// releases the course filter as well.
pub fn compute_scope_comparison(
    dataset: &Dataset,
    filters: &FilterSelection,
) -> Result<ScopeComparison, AggregationError> {
    let course_filters = filters.without(&[FilterDimension::Discipline]);
    let sector_filters =
        filters.without(&[FilterDimension::Discipline, FilterDimension::Course]);
    debug!(
        "compute_scope_comparison: course scope {:?}, sector scope {:?}",
        course_filters, sector_filters
    );
    Ok(ScopeComparison {
        selection: compute_summary_metrics(dataset, filters)?,
        course: compute_summary_metrics(dataset, &course_filters)?,
        sector: compute_summary_metrics(dataset, &sector_filters)?,
    })
}

/// The labels of a composite selector: every distinct combination present in
/// the dataset, sorted, after the "All" sentinel.
///
/// Rows where one of the fields is missing do not produce a label.
pub fn build_selector_options(
    dataset: &Dataset,
    fields: &[CompositeField],
) -> Result<Vec<String>, AggregationError> {
    let columns: Vec<Column> = fields.iter().map(|f| f.dimension.column()).collect();
    dataset.require(&columns)?;
    let mut labels: BTreeSet<String> = BTreeSet::new();
    for r in dataset.records() {
        let values: Option<Vec<&str>> = fields.iter().map(|f| f.dimension.value_of(r)).collect();
        if let Some(values) = values {
            labels.insert(format_composite(fields, &values));
        }
    }
    info!(
        "build_selector_options: {} options for {:?}",
        labels.len(),
        columns
    );
    let mut res: Vec<String> = Vec::with_capacity(labels.len() + 1);
    res.push(ALL.to_string());
    res.extend(labels);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DatasetBuilder;
    use crate::filters::{DISCIPLINE_SELECTOR, QUESTION_SELECTOR};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // (id, answer, axis, question, discipline, course, sector)
    const ROWS: [(&str, &str, &str, &str, &str, &str, &str); 8] = [
        ("1", "Concordo", "Eixo 1", "Q1", "Cálculo I", "Física", "Exatas"),
        ("1", "Discordo", "Eixo 2", "Q2", "Cálculo I", "Física", "Exatas"),
        ("2", "Concordo", "Eixo 1", "Q1", "Cálculo I", "Física", "Exatas"),
        ("3", "Desconheço", "Eixo 1", "Q1", "Mecânica", "Física", "Exatas"),
        ("4", "Concordo", "Eixo 1", "Q1", "Cálculo I", "Matemática", "Exatas"),
        ("5", "Discordo", "Eixo 2", "Q2", "Anatomia", "Medicina", "Saúde"),
        ("5", "Concordo", "Eixo 1", "Q1", "Anatomia", "Medicina", "Saúde"),
        ("6", "Concordo", "Eixo 1", "Q1", "", "Medicina", "Saúde"),
    ];

    fn dataset() -> Dataset {
        let mut b = DatasetBuilder::new(&[
            Column::SurveyId,
            Column::ResponseLabel,
            Column::AxisName,
            Column::QuestionText,
            Column::DisciplineName,
            Column::CourseName,
            Column::SectorName,
        ]);
        for (id, answer, axis, question, discipline, course, sector) in ROWS {
            b.add_cells(&[
                (Column::SurveyId, id),
                (Column::ResponseLabel, answer),
                (Column::AxisName, axis),
                (Column::QuestionText, question),
                (Column::DisciplineName, discipline),
                (Column::CourseName, course),
                (Column::SectorName, sector),
            ]);
        }
        b.build()
    }

    #[test]
    fn all_sentinel_equals_no_filter() {
        init();
        let ds = dataset();
        let none = compute_summary_metrics(&ds, &FilterSelection::new()).unwrap();
        let all = compute_summary_metrics(
            &ds,
            &FilterSelection::new().with(FilterDimension::Axis, "All"),
        )
        .unwrap();
        assert_eq!(none, all);
        assert_eq!(none.response_count, 8);
        assert_eq!(none.respondent_count, 6);
    }

    #[test]
    fn empty_selection_is_zero_not_error() {
        init();
        let ds = dataset();
        let filters = FilterSelection::new().with(FilterDimension::Course, "Direito");
        let m = compute_summary_metrics(&ds, &filters).unwrap();
        assert_eq!(m, SummaryMetrics::default());
        assert!(compute_group_distribution(&ds, &filters, GroupField::Axis)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_group_column_is_reported() {
        let ds = dataset();
        assert_eq!(
            compute_group_distribution(&ds, &FilterSelection::new(), GroupField::Dimension),
            Err(AggregationError::MissingColumn {
                column: Column::DimensionName
            })
        );
        assert_eq!(
            compute_top_units_participation(&ds, 10),
            Err(AggregationError::MissingColumn {
                column: Column::ManagingUnit
            })
        );
    }

    #[test]
    fn selector_options_are_sorted_after_sentinel() {
        let ds = dataset();
        let options = build_selector_options(&ds, &DISCIPLINE_SELECTOR).unwrap();
        assert_eq!(
            options,
            vec![
                "All",
                "Disciplina: Anatomia - Curso: Medicina - Setor: Saúde",
                "Disciplina: Cálculo I - Curso: Física - Setor: Exatas",
                "Disciplina: Cálculo I - Curso: Matemática - Setor: Exatas",
                "Disciplina: Mecânica - Curso: Física - Setor: Exatas",
            ]
        );
        let questions = build_selector_options(&ds, &QUESTION_SELECTOR).unwrap();
        assert_eq!(questions, vec!["All", "Eixo 1 - Q1", "Eixo 2 - Q2"]);
    }

    #[test]
    fn selector_options_resolve_back_to_their_rows() {
        let ds = dataset();
        let label = "Disciplina: Cálculo I - Curso: Física - Setor: Exatas";
        let filters = FilterSelection::new().with_composite(label, &DISCIPLINE_SELECTOR);
        let m = compute_summary_metrics(&ds, &filters).unwrap();
        assert_eq!(m.response_count, 3);
        assert_eq!(m.respondent_count, 2);
    }

    #[test]
    fn undecoded_answers_count_as_rows_only() {
        init();
        let mut b = DatasetBuilder::new(&[Column::SurveyId, Column::ResponseLabel]);
        for (id, answer) in [("1", "Concordo"), ("2", "Talvez"), ("3", "Discordo")] {
            b.add_cells(&[(Column::SurveyId, id), (Column::ResponseLabel, answer)]);
        }
        let ds = b.build();
        let m = compute_summary_metrics(&ds, &FilterSelection::new()).unwrap();
        assert_eq!(m.response_count, 3);
        assert_eq!(m.respondent_count, 3);
        assert_eq!(m.agree_count + m.disagree_count + m.unknown_count, 2);
        let sum = m.agree_pct + m.disagree_pct + m.unknown_pct;
        assert!((sum - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn question_options_resolve_back_to_their_rows() {
        init();
        let mut b = DatasetBuilder::new(&[
            Column::SurveyId,
            Column::ResponseLabel,
            Column::AxisName,
            Column::QuestionText,
        ]);
        for (id, question) in [("1", "Q1"), ("1", "Q2"), ("2", "Q2")] {
            b.add_cells(&[
                (Column::SurveyId, id),
                (Column::ResponseLabel, "Concordo"),
                (Column::AxisName, "Eixo 1"),
                (Column::QuestionText, question),
            ]);
        }
        let ds = b.build();
        let options = build_selector_options(&ds, &QUESTION_SELECTOR).unwrap();
        assert_eq!(options, vec!["All", "Eixo 1 - Q1", "Eixo 1 - Q2"]);

        let filters = FilterSelection::new().with_composite(&options[1], &QUESTION_SELECTOR);
        let m = compute_summary_metrics(&ds, &filters).unwrap();
        assert_eq!(m.response_count, 1);
        let filters = FilterSelection::new().with_composite(&options[2], &QUESTION_SELECTOR);
        let m = compute_summary_metrics(&ds, &filters).unwrap();
        assert_eq!(m.response_count, 2);
        assert_eq!(m.respondent_count, 2);
    }

    #[test]
    fn scope_comparison_widens_the_selection() {
        let ds = dataset();
        let filters = FilterSelection::new().with_composite(
            "Disciplina: Mecânica - Curso: Física - Setor: Exatas",
            &DISCIPLINE_SELECTOR,
        );
        let scopes = compute_scope_comparison(&ds, &filters).unwrap();
        assert_eq!(scopes.selection.response_count, 1);
        assert_eq!(scopes.selection.unknown_pct, 100.0);
        assert_eq!(scopes.course.response_count, 4);
        assert_eq!(scopes.sector.response_count, 5);
        assert_eq!(scopes.sector.respondent_count, 4);
    }

    #[test]
    fn general_sentiment_by_axis_sums_to_hundred() {
        let ds = dataset();
        let shares =
            compute_group_distribution(&ds, &FilterSelection::new(), GroupField::Axis).unwrap();
        let categories: BTreeSet<&str> = shares.iter().map(|s| s.category.as_str()).collect();
        for c in categories {
            let sum: f64 = shares
                .iter()
                .filter(|s| s.category == c)
                .map(|s| s.percent)
                .sum();
            assert!((sum - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn concurrent_calls_share_the_dataset() {
        let ds = dataset();
        let expected = compute_summary_metrics(&ds, &FilterSelection::new()).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| compute_summary_metrics(&ds, &FilterSelection::new())))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), Ok(expected));
            }
        });
    }
}
