//! Dataset access: selecting which full dataset an aggregation runs on.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use log::debug;

use crate::config::*;
use crate::filters::{CompositeField, FilterSelection};
use crate::groups::GroupField;

/// A loaded response dataset. Read-only once built.
///
/// Use [`crate::builder::DatasetBuilder`] to assemble one.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub(crate) columns: BTreeSet<Column>,
    pub(crate) records: Vec<ResponseRecord>,
}

impl Dataset {
    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub(crate) fn require(&self, columns: &[Column]) -> Result<(), AggregationError> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(column) => Err(AggregationError::MissingColumn { column: *column }),
            None => Ok(()),
        }
    }
}

/// The survey a dataset belongs to.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Domain {
    Institutional,
    Course,
    Discipline(DeliveryMode),
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Institutional => write!(f, "institutional"),
            Domain::Course => write!(f, "course"),
            Domain::Discipline(mode) => write!(f, "discipline ({})", mode),
        }
    }
}

/// Anything able to hand out the dataset of a domain.
pub trait DatasetSource {
    fn dataset(&self, domain: Domain) -> Result<&Dataset, AggregationError>;
}

/// Datasets loaded up front, one per domain.
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    datasets: HashMap<Domain, Dataset>,
}

impl DatasetCatalog {
    pub fn new() -> DatasetCatalog {
        DatasetCatalog::default()
    }

    /// Registers a dataset. Datasets for the same domain are concatenated.
    pub fn insert(&mut self, domain: Domain, dataset: Dataset) {
        debug!(
            "DatasetCatalog::insert: domain {} rows {}",
            domain,
            dataset.len()
        );
        match self.datasets.get_mut(&domain) {
            Some(existing) => {
                existing.columns.extend(dataset.columns);
                existing.records.extend(dataset.records);
            }
            None => {
                self.datasets.insert(domain, dataset);
            }
        }
    }

    pub fn domains(&self) -> Vec<Domain> {
        let mut res: Vec<Domain> = self.datasets.keys().copied().collect();
        res.sort();
        res
    }
}

impl DatasetSource for DatasetCatalog {
    fn dataset(&self, domain: Domain) -> Result<&Dataset, AggregationError> {
        self.datasets
            .get(&domain)
            .ok_or_else(|| AggregationError::DatasetUnavailable {
                domain: domain.to_string(),
            })
    }
}

/// The operations of one dashboard view, bound to one domain.
///
/// The service borrows its data source; every call recomputes from the
/// dataset and the filters it is given.
pub struct SurveyService<'a, S: DatasetSource + ?Sized> {
    source: &'a S,
    domain: Domain,
}

impl<'a, S: DatasetSource + ?Sized> SurveyService<'a, S> {
    pub fn new(source: &'a S, domain: Domain) -> SurveyService<'a, S> {
        SurveyService { source, domain }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn dataset(&self) -> Result<&'a Dataset, AggregationError> {
        self.source.dataset(self.domain)
    }

    pub fn summary_metrics(
        &self,
        filters: &FilterSelection,
    ) -> Result<SummaryMetrics, AggregationError> {
        crate::compute_summary_metrics(self.dataset()?, filters)
    }

    pub fn group_distribution(
        &self,
        filters: &FilterSelection,
        group_by: GroupField,
    ) -> Result<Vec<GroupShare>, AggregationError> {
        crate::compute_group_distribution(self.dataset()?, filters, group_by)
    }

    pub fn opinion_balance(
        &self,
        filters: &FilterSelection,
        dimension: &str,
    ) -> Result<Vec<QuestionBalance>, AggregationError> {
        crate::compute_opinion_balance(self.dataset()?, filters, dimension)
    }

    pub fn top_units_participation(
        &self,
        top_n: usize,
    ) -> Result<TopUnitsParticipation, AggregationError> {
        crate::compute_top_units_participation(self.dataset()?, top_n)
    }

    pub fn unit_response_volume(
        &self,
        filters: &FilterSelection,
        top_n: usize,
    ) -> Result<Vec<UnitCount>, AggregationError> {
        crate::compute_unit_response_volume(self.dataset()?, filters, top_n)
    }

    pub fn scope_comparison(
        &self,
        filters: &FilterSelection,
    ) -> Result<ScopeComparison, AggregationError> {
        crate::compute_scope_comparison(self.dataset()?, filters)
    }

    pub fn selector_options(
        &self,
        fields: &[CompositeField],
    ) -> Result<Vec<String>, AggregationError> {
        crate::build_selector_options(self.dataset()?, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DatasetBuilder;

    fn small_dataset(ids: &[&str]) -> Dataset {
        let mut b = DatasetBuilder::new(&[Column::SurveyId, Column::ResponseLabel]);
        for id in ids {
            b.add_cells(&[(Column::SurveyId, *id), (Column::ResponseLabel, "Concordo")]);
        }
        b.build()
    }

    #[test]
    fn missing_domain_is_unavailable() {
        let catalog = DatasetCatalog::new();
        let res = catalog.dataset(Domain::Discipline(DeliveryMode::Remote));
        assert_eq!(
            res,
            Err(AggregationError::DatasetUnavailable {
                domain: "discipline (EAD)".to_string()
            })
        );
    }

    #[test]
    fn delivery_modes_select_distinct_datasets() {
        let mut catalog = DatasetCatalog::new();
        catalog.insert(
            Domain::Discipline(DeliveryMode::InPerson),
            small_dataset(&["a", "b"]),
        );
        catalog.insert(
            Domain::Discipline(DeliveryMode::Remote),
            small_dataset(&["c"]),
        );
        let in_person = SurveyService::new(&catalog, Domain::Discipline(DeliveryMode::InPerson));
        let remote = SurveyService::new(&catalog, Domain::Discipline(DeliveryMode::Remote));
        let all = FilterSelection::new();
        assert_eq!(in_person.summary_metrics(&all).unwrap().respondent_count, 2);
        assert_eq!(remote.summary_metrics(&all).unwrap().respondent_count, 1);
        assert!(SurveyService::new(&catalog, Domain::Course)
            .summary_metrics(&all)
            .is_err());
    }

    #[test]
    fn inserting_twice_concatenates() {
        let mut catalog = DatasetCatalog::new();
        catalog.insert(Domain::Institutional, small_dataset(&["a"]));
        catalog.insert(Domain::Institutional, small_dataset(&["b", "c"]));
        assert_eq!(catalog.dataset(Domain::Institutional).unwrap().len(), 3);
        assert_eq!(catalog.domains(), vec![Domain::Institutional]);
    }

    #[test]
    fn require_reports_first_missing_column() {
        let ds = small_dataset(&["a"]);
        assert_eq!(ds.require(&[Column::SurveyId]), Ok(()));
        assert_eq!(
            ds.require(&[Column::SurveyId, Column::ManagingUnit, Column::Order]),
            Err(AggregationError::MissingColumn {
                column: Column::ManagingUnit
            })
        );
    }
}
