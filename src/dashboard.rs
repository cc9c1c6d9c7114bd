use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_aggregation::charts::*;
use survey_aggregation::dataset::{Dataset, DatasetCatalog, DatasetSource, Domain, SurveyService};
use survey_aggregation::filters::{
    FilterDimension, FilterSelection, ResolvedFilter, DISCIPLINE_SELECTOR, QUESTION_SELECTOR,
};
use survey_aggregation::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Unsupported cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("No header row in {path}"))]
    MissingHeader { path: String },
    #[snafu(display("None of the headers of {path} is a known column"))]
    UnknownHeaders { path: String },
    #[snafu(display("Aggregation failed"))]
    Aggregation { source: AggregationError },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// What is shown around the chart series.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ViewSettings {
    pub dashboard_name: String,
    pub period: Option<String>,
    pub dimension: Option<String>,
    pub top_n: usize,
}

pub fn parse_domain(domain: &str, delivery_mode: Option<&str>) -> DashResult<Domain> {
    let res = match domain.trim().to_lowercase().as_str() {
        "institutional" | "institucional" => Domain::Institutional,
        "course" | "curso" | "cursos" => Domain::Course,
        "discipline" | "disciplina" | "disciplinas" => {
            let mode = match delivery_mode.map(|m| (m, DeliveryMode::parse(m))) {
                Some((_, Some(mode))) => mode,
                Some((m, None)) => whatever!("Unknown delivery mode {:?}", m),
                None => whatever!("The discipline domain needs a delivery mode (inPerson or remote)"),
            };
            Domain::Discipline(mode)
        }
        x => whatever!("Unknown domain {:?}", x),
    };
    Ok(res)
}

fn read_dataset(path: &str, provider: &str, worksheet_name: Option<&str>) -> DashResult<Dataset> {
    info!("Attempting to read data file {:?} ({})", path, provider);
    match provider {
        "csv" => io_csv::read_csv_dataset(path),
        "xlsx" | "excel" => io_xlsx::read_xlsx_dataset(path, worksheet_name),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Loads every data source of the configuration. Sources that fail to load are
/// reported and left out, so their domain is unavailable.
pub fn load_catalog(config: &DashboardConfig, root: &Path) -> DashResult<DatasetCatalog> {
    let mut catalog = DatasetCatalog::new();
    for source in config.data_sources.iter() {
        let domain = source.domain()?;
        let p: PathBuf = root.join(&source.file_path);
        let p2 = p.as_path().display().to_string();
        match read_dataset(&p2, &source.provider, source.worksheet_name.as_deref()) {
            Ok(dataset) => {
                info!(
                    "load_catalog: {} rows for domain {} from {}",
                    dataset.len(),
                    domain,
                    io_common::simplify_file_name(&p2)
                );
                catalog.insert(domain, dataset);
            }
            Err(e) => {
                warn!("load_catalog: skipping {} for domain {}: {}", p2, domain, e);
            }
        }
    }
    Ok(catalog)
}

pub fn selection_from_args(args: &Args) -> FilterSelection {
    let mut filters = FilterSelection::new();
    if let Some(label) = &args.discipline {
        filters = filters.with_composite(label, &DISCIPLINE_SELECTOR);
    }
    let lists = [
        (FilterDimension::Axis, &args.axis),
        (FilterDimension::Question, &args.question),
        (FilterDimension::ManagingUnit, &args.managing_unit),
        (FilterDimension::Course, &args.course),
        (FilterDimension::Sector, &args.sector),
        (FilterDimension::Dimension, &args.dimension_filter),
    ];
    for (dimension, values) in lists {
        if !values.is_empty() {
            filters.set(dimension, values.clone());
        }
    }
    debug!("selection_from_args: {:?}", filters);
    filters
}

// A section whose columns are absent from the dataset is left out of the summary.
fn optional_section<T>(name: &str, res: Result<T, AggregationError>) -> DashResult<Option<T>> {
    match res {
        Ok(x) => Ok(Some(x)),
        Err(AggregationError::MissingColumn { column }) => {
            info!("{}: skipped, the dataset has no column {}", name, column);
            Ok(None)
        }
        Err(e) => Err(e).context(AggregationSnafu {}),
    }
}

// Percentages are written with four decimals.
fn round_pct(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn rounded(values: &[f64]) -> Vec<f64> {
    values.iter().map(|x| round_pct(*x)).collect()
}

fn metrics_to_json(m: &SummaryMetrics) -> JSValue {
    json!({
        "respondentCount": m.respondent_count,
        "responseCount": m.response_count,
        "agreePct": round_pct(m.agree_pct),
        "disagreePct": round_pct(m.disagree_pct),
        "unknownPct": round_pct(m.unknown_pct),
        "agreeCount": m.agree_count,
        "disagreeCount": m.disagree_count,
        "unknownCount": m.unknown_count,
    })
}

// One entry per label, with the signed value used by the numeric encoding.
fn labels_to_json(m: &SummaryMetrics, previous: &PreviousPeriod) -> JSValue {
    let labels: Vec<JSValue> = ResponseLabel::ALL
        .iter()
        .map(|l| {
            json!({
                "label": l.display_name(),
                "value": l.value(),
                "color": label_color(*l),
                "count": m.count(*l),
                "pct": round_pct(m.pct(*l)),
                "previousPct": previous.pct(*l),
            })
        })
        .collect();
    JSValue::Array(labels)
}

fn comparison_to_json(c: &PeriodComparison) -> JSValue {
    json!({
        "respondentCount": c.previous.respondent_count,
        "agreePct": c.previous.agree_pct,
        "disagreePct": c.previous.disagree_pct,
        "unknownPct": c.previous.unknown_pct,
        "respondentChangePct": round_pct(c.respondent_change_pct),
        "agreeDelta": round_pct(c.agree_delta),
        "disagreeDelta": round_pct(c.disagree_delta),
        "unknownDelta": round_pct(c.unknown_delta),
    })
}

fn donut_to_json(d: &DonutSeries) -> JSValue {
    json!({
        "labels": d.labels,
        "values": d.values,
        "colors": d.colors,
        "total": d.total(),
    })
}

fn stacked_to_json(s: &StackedBarSeries) -> JSValue {
    let traces: Vec<JSValue> = s
        .traces
        .iter()
        .map(|t| {
            json!({
                "label": t.label.display_name(),
                "color": label_color(t.label),
                "values": rounded(&t.values),
                "text": t.text,
            })
        })
        .collect();
    json!({ "categories": s.categories, "traces": traces })
}

fn diverging_to_json(d: &DivergingBarSeries) -> JSValue {
    json!({
        "questions": d.questions,
        "unknownLeft": rounded(&d.unknown_left),
        "unknownRight": rounded(&d.unknown_right),
        "disagree": rounded(&d.disagree),
        "agree": rounded(&d.agree),
        "unknownText": d.unknown_text,
        "disagreeText": d.disagree_text,
        "agreeText": d.agree_text,
        "unknownHover": d.unknown_hover,
        "disagreeHover": d.disagree_hover,
        "agreeHover": d.agree_hover,
    })
}

fn participation_to_json(p: &TopUnitsParticipation, top_n: usize) -> JSValue {
    let per_unit: Vec<JSValue> = p
        .per_unit
        .iter()
        .map(|u| json!({"unit": u.unit, "count": u.count}))
        .collect();
    json!({
        "topTotal": p.top_total,
        "otherTotal": p.other_total,
        "perUnit": per_unit,
        "donut": donut_to_json(&participation_donut(p, top_n)),
    })
}

/// Every chart series of one view, as a JSON document.
pub fn build_summary_js<S: DatasetSource + ?Sized>(
    service: &SurveyService<S>,
    filters: &FilterSelection,
    settings: &ViewSettings,
) -> DashResult<JSValue> {
    let mut out: JSMap<String, JSValue> = JSMap::new();
    out.insert(
        "config".to_string(),
        json!({
            "dashboard": settings.dashboard_name,
            "period": settings.period,
            "domain": service.domain().to_string(),
            "filtered": !ResolvedFilter::resolve(filters).is_unconstrained(),
        }),
    );

    let metrics = service
        .summary_metrics(filters)
        .context(AggregationSnafu {})?;
    let comparison = compare_with_previous(&metrics, &PreviousPeriod::PLACEHOLDER);
    let mut summary = metrics_to_json(&metrics);
    summary["previousPeriod"] = comparison_to_json(&comparison);
    summary["labels"] = labels_to_json(&metrics, &comparison.previous);
    out.insert("summary".to_string(), summary);
    out.insert(
        "responseDonut".to_string(),
        donut_to_json(&response_donut(&metrics)),
    );

    if let Some(shares) = optional_section(
        "axisDistribution",
        service.group_distribution(filters, GroupField::Axis),
    )? {
        out.insert(
            "axisDistribution".to_string(),
            stacked_to_json(&stacked_bars(&shares)),
        );
    }

    if let Some(shares) = optional_section(
        "generalSentiment",
        service.group_distribution(filters, GroupField::Dimension),
    )? {
        out.insert(
            "generalSentiment".to_string(),
            stacked_to_json(&stacked_bars(&shares)),
        );
        let r = radar(&shares, ResponseLabel::Agree);
        out.insert(
            "dimensionRadar".to_string(),
            json!({"axes": r.axes, "values": rounded(&r.values)}),
        );

        let dimension = settings
            .dimension
            .clone()
            .or_else(|| shares.first().map(|s| s.category.clone()));
        if let Some(dimension) = dimension {
            if let Some(balance) = optional_section(
                "opinionBalance",
                service.opinion_balance(filters, &dimension),
            )? {
                out.insert(
                    "opinionBalance".to_string(),
                    json!({
                        "dimension": dimension,
                        "series": diverging_to_json(&diverging_bars(&balance)),
                    }),
                );
            }
        }
    }

    if let Some(units) = optional_section(
        "unitVolume",
        service.unit_response_volume(filters, settings.top_n),
    )? {
        let b = unit_bars(&units);
        out.insert(
            "unitVolume".to_string(),
            json!({"categories": b.categories, "values": b.values, "text": b.text}),
        );
    }

    if let Some(p) = optional_section(
        "participation",
        service.top_units_participation(settings.top_n),
    )? {
        out.insert(
            "participation".to_string(),
            participation_to_json(&p, settings.top_n),
        );
    }

    if ResolvedFilter::resolve(filters).constrains(FilterDimension::Discipline) {
        if let Some(scopes) = optional_section("scopeComparison", service.scope_comparison(filters))? {
            out.insert(
                "scopeComparison".to_string(),
                json!({
                    "selection": donut_to_json(&response_donut(&scopes.selection)),
                    "course": donut_to_json(&response_donut(&scopes.course)),
                    "sector": donut_to_json(&response_donut(&scopes.sector)),
                }),
            );
        }
    }

    let mut selectors: JSMap<String, JSValue> = JSMap::new();
    if let Some(options) = optional_section(
        "disciplineSelector",
        service.selector_options(&DISCIPLINE_SELECTOR),
    )? {
        selectors.insert("disciplines".to_string(), json!(options));
    }
    if let Some(options) = optional_section(
        "questionSelector",
        service.selector_options(&QUESTION_SELECTOR),
    )? {
        selectors.insert("questions".to_string(), json!(options));
    }
    out.insert("selectors".to_string(), JSValue::Object(selectors));

    Ok(JSValue::Object(out))
}

fn write_output(pretty_js: &str, out: Option<&str>) -> DashResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })?;
            info!("Summary written to {}", path);
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> DashResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("Summary matches the reference {}", reference_path);
    Ok(())
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let domain = parse_domain(
        args.domain.as_deref().unwrap_or("institutional"),
        args.delivery_mode.as_deref(),
    )?;

    let config: Option<DashboardConfig> = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };

    let catalog = match (&args.input, &args.config, &config) {
        (Some(input), _, _) => {
            let provider = args.input_type.as_deref().unwrap_or("csv");
            let mut catalog = DatasetCatalog::new();
            catalog.insert(
                domain,
                read_dataset(input, provider, args.excel_worksheet_name.as_deref())?,
            );
            catalog
        }
        (None, Some(config_path), Some(config)) => {
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?;
            load_catalog(config, root)?
        }
        _ => whatever!("Either --config or --input must be provided"),
    };
    info!("run_dashboard: domains loaded: {:?}", catalog.domains());

    let settings = ViewSettings {
        dashboard_name: config
            .as_ref()
            .map(|c| c.output_settings.dashboard_name.clone())
            .unwrap_or_else(|| "cpadash".to_string()),
        period: config
            .as_ref()
            .and_then(|c| c.output_settings.period.clone()),
        dimension: args.dimension.clone(),
        top_n: args.top_n,
    };
    let filters = selection_from_args(args);
    let service = SurveyService::new(&catalog, domain);
    let summary = build_summary_js(&service, &filters, &settings)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    let out: Option<String> = args.out.clone().or_else(|| {
        config
            .as_ref()
            .and_then(|c| c.output_settings.output_path.clone())
    });
    write_output(&pretty_js_stats, out.as_deref())?;

    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js_stats, reference_path)?;
    }
    Ok(())
}
