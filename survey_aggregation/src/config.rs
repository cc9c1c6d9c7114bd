// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The three possible answers to a survey item.
///
/// Datasets encode them either as a label (`Concordo`, `Discordo`,
/// `Desconheço`) or as a signed value (`1`, `-1`, `0`). Both encodings map
/// onto this enum when a dataset is built.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ResponseLabel {
    Agree,
    Disagree,
    Unknown,
}

impl ResponseLabel {
    /// All the labels, in the order used by every chart series.
    pub const ALL: [ResponseLabel; 3] = [
        ResponseLabel::Agree,
        ResponseLabel::Disagree,
        ResponseLabel::Unknown,
    ];

    /// Decodes the signed numeric encoding.
    pub fn from_value(value: i64) -> Option<ResponseLabel> {
        match value {
            1 => Some(ResponseLabel::Agree),
            0 => Some(ResponseLabel::Unknown),
            -1 => Some(ResponseLabel::Disagree),
            _ => None,
        }
    }

    /// Decodes a textual label. Accepts the dataset vocabulary as well as the
    /// english names, case-insensitively.
    pub fn parse(s: &str) -> Option<ResponseLabel> {
        match s.trim().to_lowercase().as_str() {
            "concordo" | "agree" => Some(ResponseLabel::Agree),
            "discordo" | "disagree" => Some(ResponseLabel::Disagree),
            "desconheço" | "desconheco" | "unknown" => Some(ResponseLabel::Unknown),
            _ => None,
        }
    }

    pub fn value(self) -> i8 {
        match self {
            ResponseLabel::Agree => 1,
            ResponseLabel::Unknown => 0,
            ResponseLabel::Disagree => -1,
        }
    }

    /// The label as it appears in the source data and on the dashboard.
    pub fn display_name(self) -> &'static str {
        match self {
            ResponseLabel::Agree => "Concordo",
            ResponseLabel::Disagree => "Discordo",
            ResponseLabel::Unknown => "Desconheço",
        }
    }
}

impl Display for ResponseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How a discipline was delivered. Each mode has its own dataset.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum DeliveryMode {
    InPerson,
    Remote,
}

impl DeliveryMode {
    pub fn parse(s: &str) -> Option<DeliveryMode> {
        match s.trim().to_lowercase().as_str() {
            "presencial" | "inperson" | "in_person" | "in-person" => Some(DeliveryMode::InPerson),
            "ead" | "remote" | "remoto" => Some(DeliveryMode::Remote),
            _ => None,
        }
    }
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::InPerson => write!(f, "Presencial"),
            DeliveryMode::Remote => write!(f, "EAD"),
        }
    }
}

/// The columns of a response dataset that the engine knows about.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Column {
    SurveyId,
    ResponseLabel,
    ResponseValue,
    AxisName,
    AxisCode,
    DimensionName,
    QuestionId,
    QuestionText,
    CourseName,
    SectorName,
    DisciplineName,
    DeliveryMode,
    ManagingUnit,
    Order,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::SurveyId,
        Column::ResponseLabel,
        Column::ResponseValue,
        Column::AxisName,
        Column::AxisCode,
        Column::DimensionName,
        Column::QuestionId,
        Column::QuestionText,
        Column::CourseName,
        Column::SectorName,
        Column::DisciplineName,
        Column::DeliveryMode,
        Column::ManagingUnit,
        Column::Order,
    ];

    /// The header used by the exported survey spreadsheets.
    pub fn header(self) -> &'static str {
        match self {
            Column::SurveyId => "ID_PESQUISA",
            Column::ResponseLabel => "RESPOSTA",
            Column::ResponseValue => "VALOR_RESPOSTA",
            Column::AxisName => "EIXO_NOME",
            Column::AxisCode => "EIXO",
            Column::DimensionName => "DIMENSAO_NOME",
            Column::QuestionId => "ID_PERGUNTA",
            Column::QuestionText => "PERGUNTA",
            Column::CourseName => "CURSO",
            Column::SectorName => "SETOR_CURSO",
            Column::DisciplineName => "NOME_DISCIPLINA",
            Column::DeliveryMode => "MODALIDADE",
            Column::ManagingUnit => "UNIDADE GESTORA",
            Column::Order => "Ordem",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Column::SurveyId => "survey_id",
            Column::ResponseLabel => "response_label",
            Column::ResponseValue => "response_value",
            Column::AxisName => "axis_name",
            Column::AxisCode => "axis_code",
            Column::DimensionName => "dimension_name",
            Column::QuestionId => "question_id",
            Column::QuestionText => "question_text",
            Column::CourseName => "course_name",
            Column::SectorName => "sector_name",
            Column::DisciplineName => "discipline_name",
            Column::DeliveryMode => "delivery_mode",
            Column::ManagingUnit => "managing_unit",
            Column::Order => "order",
        }
    }

    /// Maps a header cell onto a known column. Unknown headers return None.
    pub fn from_header(header: &str) -> Option<Column> {
        let h = header.trim();
        if h.eq_ignore_ascii_case("EIXO_CODIGO") {
            return Some(Column::AxisCode);
        }
        Column::ALL
            .iter()
            .find(|c| h.eq_ignore_ascii_case(c.header()) || h.eq_ignore_ascii_case(c.alias()))
            .copied()
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// One row of a response dataset: one answer of one respondent to one question.
///
/// Values are trimmed when the dataset is built; empty cells are `None`.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResponseRecord {
    pub survey_id: Option<String>,
    pub response: Option<ResponseLabel>,
    /// Display name of the axis. Derived from the axis code when the
    /// display name is missing.
    pub axis_name: Option<String>,
    pub dimension_name: Option<String>,
    pub question_id: Option<String>,
    pub question_text: Option<String>,
    pub course_name: Option<String>,
    pub sector_name: Option<String>,
    pub discipline_name: Option<String>,
    pub delivery_mode: Option<DeliveryMode>,
    pub managing_unit: Option<String>,
    pub order: Option<i64>,
}

// ******** Output data structures *********

/// Headline numbers for a filtered view.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct SummaryMetrics {
    /// Distinct survey ids.
    pub respondent_count: u64,
    /// Rows.
    pub response_count: u64,
    pub agree_pct: f64,
    pub disagree_pct: f64,
    pub unknown_pct: f64,
    pub agree_count: u64,
    pub disagree_count: u64,
    pub unknown_count: u64,
}

impl SummaryMetrics {
    pub fn count(&self, label: ResponseLabel) -> u64 {
        match label {
            ResponseLabel::Agree => self.agree_count,
            ResponseLabel::Disagree => self.disagree_count,
            ResponseLabel::Unknown => self.unknown_count,
        }
    }

    pub fn pct(&self, label: ResponseLabel) -> f64 {
        match label {
            ResponseLabel::Agree => self.agree_pct,
            ResponseLabel::Disagree => self.disagree_pct,
            ResponseLabel::Unknown => self.unknown_pct,
        }
    }
}

/// The share of one response label inside one category.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupShare {
    pub category: String,
    pub label: ResponseLabel,
    pub count: u64,
    /// Answered rows in the category.
    pub total: u64,
    pub percent: f64,
}

/// Row-normalized answer shares for one question.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionBalance {
    pub question: String,
    pub agree_pct: f64,
    pub disagree_pct: f64,
    pub unknown_pct: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnitCount {
    pub unit: String,
    pub count: u64,
}

/// Respondents of the largest managing units against everyone else.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TopUnitsParticipation {
    pub top_total: u64,
    pub other_total: u64,
    /// The selected units, largest first.
    pub per_unit: Vec<UnitCount>,
}

impl TopUnitsParticipation {
    pub fn grand_total(&self) -> u64 {
        self.top_total + self.other_total
    }
}

/// Metrics of a selection next to the metrics of its enclosing course and sector.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ScopeComparison {
    pub selection: SummaryMetrics,
    pub course: SummaryMetrics,
    pub sector: SummaryMetrics,
}

/// Structural failures. Empty results and malformed filters are not errors.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AggregationError {
    /// The backing data for this domain could not be obtained.
    DatasetUnavailable { domain: String },
    /// A column required by the operation is absent from the dataset.
    MissingColumn { column: Column },
}

impl Error for AggregationError {}

impl Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::DatasetUnavailable { domain } => {
                write!(f, "dataset unavailable for domain {}", domain)
            }
            AggregationError::MissingColumn { column } => {
                write!(f, "required column {} is missing from the dataset", column)
            }
        }
    }
}

// ********* Configuration **********

/// Comparison values for the previous evaluation period.
///
/// These are fixed placeholders until a historical data source exists. They are
/// never derived from data.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PreviousPeriod {
    pub respondent_count: u64,
    pub agree_pct: f64,
    pub disagree_pct: f64,
    pub unknown_pct: f64,
}

impl PreviousPeriod {
    // TODO: replace with values read from the historical survey exports once they are published.
    pub const PLACEHOLDER: PreviousPeriod = PreviousPeriod {
        respondent_count: 500,
        agree_pct: 40.0,
        disagree_pct: 40.0,
        unknown_pct: 20.0,
    };

    /// Relative change of the respondent count, in percent.
    pub fn respondent_change_pct(&self, current: u64) -> f64 {
        if self.respondent_count == 0 {
            return 0.0;
        }
        (current as f64 / self.respondent_count as f64 - 1.0) * 100.0
    }

    pub fn pct(&self, label: ResponseLabel) -> f64 {
        match label {
            ResponseLabel::Agree => self.agree_pct,
            ResponseLabel::Disagree => self.disagree_pct,
            ResponseLabel::Unknown => self.unknown_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_encodings_agree() {
        for label in ResponseLabel::ALL {
            assert_eq!(ResponseLabel::from_value(label.value() as i64), Some(label));
            assert_eq!(ResponseLabel::parse(label.display_name()), Some(label));
        }
        assert_eq!(ResponseLabel::parse(" agree "), Some(ResponseLabel::Agree));
        assert_eq!(ResponseLabel::from_value(2), None);
        assert_eq!(ResponseLabel::parse("Talvez"), None);
    }

    #[test]
    fn headers_map_to_columns() {
        assert_eq!(Column::from_header("ID_PESQUISA"), Some(Column::SurveyId));
        assert_eq!(
            Column::from_header("UNIDADE GESTORA"),
            Some(Column::ManagingUnit)
        );
        assert_eq!(Column::from_header("eixo_codigo"), Some(Column::AxisCode));
        assert_eq!(Column::from_header("Question_Text"), Some(Column::QuestionText));
        assert_eq!(Column::from_header("COMENTARIO"), None);
    }

    #[test]
    fn placeholder_previous_period() {
        let p = PreviousPeriod::PLACEHOLDER;
        assert_eq!(p.respondent_count, 500);
        assert_eq!(p.pct(ResponseLabel::Agree), 40.0);
        assert_eq!(p.pct(ResponseLabel::Disagree), 40.0);
        assert_eq!(p.pct(ResponseLabel::Unknown), 20.0);
        assert!((p.respondent_change_pct(750) - 50.0).abs() < 1e-9);
        assert!((p.respondent_change_pct(0) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_previous_respondents_is_guarded() {
        let p = PreviousPeriod {
            respondent_count: 0,
            ..PreviousPeriod::PLACEHOLDER
        };
        assert_eq!(p.respondent_change_pct(10), 0.0);
    }
}
