//! Chart data builder: shapes aggregation results into the arrays each chart
//! type consumes.
//!
//! Nothing here computes statistics. Every function is a pure reshaping of
//! what the metrics and group operations return, with the fixed text formats
//! of the dashboard.

use std::collections::{BTreeMap, HashMap};

use crate::config::*;

/// Line separator understood by the chart renderer.
pub const LINE_BREAK: &str = "<br>";

/// Question texts longer than this are wrapped over several lines.
pub const QUESTION_WRAP_WIDTH: usize = 60;

/// `"66.7% (2)"`, the stacked bar segment label.
pub fn share_label(percent: f64, count: u64) -> String {
    format!("{:.1}% ({})", percent, count)
}

/// `"66.7%"`, or nothing when the segment is too thin to hold text.
pub fn segment_label(percent: f64) -> String {
    if percent > 1.0 {
        format!("{:.1}%", percent)
    } else {
        String::new()
    }
}

/// Fill color of a label in every chart.
pub fn label_color(label: ResponseLabel) -> &'static str {
    match label {
        ResponseLabel::Agree => "#2ecc71",
        ResponseLabel::Disagree => "#e74c3c",
        ResponseLabel::Unknown => "#95a5a6",
    }
}

/// Greedy word wrap on whitespace. Lines hold at most `width` characters
/// unless a single word is longer, which then gets a line of its own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// A question text as displayed on a bar axis.
pub fn format_question(text: &str) -> String {
    if text.chars().count() <= QUESTION_WRAP_WIDTH {
        text.to_string()
    } else {
        wrap_text(text, QUESTION_WRAP_WIDTH).join(LINE_BREAK)
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct DonutSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<&'static str>,
}

impl DonutSeries {
    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// Answer counts of a summary. Labels nobody chose are left out.
pub fn response_donut(metrics: &SummaryMetrics) -> DonutSeries {
    let mut res = DonutSeries::default();
    for label in ResponseLabel::ALL {
        let count = metrics.count(label);
        if count > 0 {
            res.labels.push(label.display_name().to_string());
            res.values.push(count);
            res.colors.push(label_color(label));
        }
    }
    res
}

/// The largest units against all the others.
pub fn participation_donut(participation: &TopUnitsParticipation, top_n: usize) -> DonutSeries {
    DonutSeries {
        labels: vec![
            format!("Top {} Unidades Gestoras", top_n),
            "Outras Unidades Gestoras".to_string(),
        ],
        values: vec![participation.top_total, participation.other_total],
        colors: vec!["#3498db", "#bdc3c7"],
    }
}

/// One label's segments across all categories of a stacked bar chart.
#[derive(PartialEq, Debug, Clone)]
pub struct StackedBarTrace {
    pub label: ResponseLabel,
    pub values: Vec<f64>,
    pub text: Vec<String>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct StackedBarSeries {
    pub categories: Vec<String>,
    pub traces: Vec<StackedBarTrace>,
}

/// Stacks the shares of a group distribution, one trace per label.
///
/// Categories keep the order of the distribution. A label missing from a
/// category gives a zero segment with no text.
pub fn stacked_bars(shares: &[GroupShare]) -> StackedBarSeries {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut categories: Vec<String> = Vec::new();
    for s in shares {
        if !index.contains_key(s.category.as_str()) {
            index.insert(s.category.as_str(), categories.len());
            categories.push(s.category.clone());
        }
    }
    let mut by_label: BTreeMap<ResponseLabel, (Vec<f64>, Vec<String>)> = BTreeMap::new();
    for s in shares {
        let (values, text) = by_label
            .entry(s.label)
            .or_insert_with(|| (vec![0.0; categories.len()], vec![String::new(); categories.len()]));
        if let Some(&idx) = index.get(s.category.as_str()) {
            values[idx] = s.percent;
            text[idx] = share_label(s.percent, s.count);
        }
    }
    let traces = by_label
        .into_iter()
        .map(|(label, (values, text))| StackedBarTrace {
            label,
            values,
            text,
        })
        .collect();
    StackedBarSeries { categories, traces }
}

/// Horizontal bars centered on zero: disagreement to the left, agreement to
/// the right, and the unknown share split evenly across the baseline.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DivergingBarSeries {
    pub questions: Vec<String>,
    pub unknown_left: Vec<f64>,
    pub unknown_right: Vec<f64>,
    pub disagree: Vec<f64>,
    pub agree: Vec<f64>,
    pub unknown_text: Vec<String>,
    pub disagree_text: Vec<String>,
    pub agree_text: Vec<String>,
    pub unknown_hover: Vec<String>,
    pub disagree_hover: Vec<String>,
    pub agree_hover: Vec<String>,
}

pub fn diverging_bars(balance: &[QuestionBalance]) -> DivergingBarSeries {
    let mut res = DivergingBarSeries::default();
    for q in balance {
        let half = q.unknown_pct / 2.0;
        res.questions.push(format_question(&q.question));
        res.unknown_left.push(-half);
        res.unknown_right.push(half);
        res.disagree.push(-q.disagree_pct);
        res.agree.push(q.agree_pct);
        res.unknown_text.push(segment_label(q.unknown_pct));
        res.disagree_text.push(segment_label(q.disagree_pct));
        res.agree_text.push(segment_label(q.agree_pct));
        res.unknown_hover
            .push(format!("Desconheço: {:.1}%", q.unknown_pct));
        res.disagree_hover
            .push(format!("Discordância: {:.1}%", q.disagree_pct));
        res.agree_hover
            .push(format!("Concordância: {:.1}%", q.agree_pct));
    }
    res
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HorizontalBarSeries {
    pub categories: Vec<String>,
    pub values: Vec<u64>,
    pub text: Vec<String>,
}

/// Unit volumes as bars, in the order given.
pub fn unit_bars(units: &[UnitCount]) -> HorizontalBarSeries {
    HorizontalBarSeries {
        categories: units.iter().map(|u| u.unit.clone()).collect(),
        values: units.iter().map(|u| u.count).collect(),
        text: units.iter().map(|u| u.count.to_string()).collect(),
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct RadarSeries {
    pub axes: Vec<String>,
    pub values: Vec<f64>,
}

/// The share of one label per category, usually per dimension.
/// Categories where nobody chose the label sit at zero.
pub fn radar(shares: &[GroupShare], label: ResponseLabel) -> RadarSeries {
    let mut res = RadarSeries::default();
    for s in shares {
        if res.axes.last() != Some(&s.category) {
            res.axes.push(s.category.clone());
            res.values.push(0.0);
        }
        if s.label == label {
            if let Some(v) = res.values.last_mut() {
                *v = s.percent;
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(category: &str, label: ResponseLabel, count: u64, total: u64) -> GroupShare {
        GroupShare {
            category: category.to_string(),
            label,
            count,
            total,
            percent: count as f64 / total as f64 * 100.0,
        }
    }

    #[test]
    fn label_formats() {
        assert_eq!(share_label(66.666, 2), "66.7% (2)");
        assert_eq!(segment_label(33.333), "33.3%");
        assert_eq!(segment_label(1.0), "");
        assert_eq!(segment_label(0.0), "");
        assert_eq!(segment_label(1.04), "1.0%");
    }

    #[test]
    fn short_questions_are_untouched() {
        let q = "O professor apresentou o plano de ensino?";
        assert_eq!(format_question(q), q);
    }

    #[test]
    fn long_questions_wrap_on_words() {
        let q = "A coordenação do curso divulga de forma clara as informações sobre estágios, atividades complementares e trabalho de conclusão";
        let formatted = format_question(q);
        let lines: Vec<&str> = formatted.split(LINE_BREAK).collect();
        assert!(lines.len() > 1);
        for line in lines.iter() {
            assert!(line.chars().count() <= QUESTION_WRAP_WIDTH);
        }
        assert_eq!(lines.join(" "), q);
    }

    #[test]
    fn long_words_are_never_split() {
        let word = "a".repeat(70);
        let lines = wrap_text(&format!("curta {} fim", word), 60);
        assert_eq!(lines, vec!["curta".to_string(), word, "fim".to_string()]);
        assert!(wrap_text("   ", 60).is_empty());
    }

    #[test]
    fn donut_omits_empty_labels() {
        let m = SummaryMetrics {
            agree_count: 3,
            unknown_count: 1,
            ..SummaryMetrics::default()
        };
        let d = response_donut(&m);
        assert_eq!(d.labels, vec!["Concordo", "Desconheço"]);
        assert_eq!(d.values, vec![3, 1]);
        assert_eq!(d.total(), 4);
        assert!(response_donut(&SummaryMetrics::default()).labels.is_empty());
    }

    #[test]
    fn participation_donut_labels() {
        let p = TopUnitsParticipation {
            top_total: 90,
            other_total: 10,
            per_unit: vec![],
        };
        let d = participation_donut(&p, 10);
        assert_eq!(d.labels, vec!["Top 10 Unidades Gestoras", "Outras Unidades Gestoras"]);
        assert_eq!(d.values, vec![90, 10]);
    }

    #[test]
    fn stacked_bars_fill_missing_segments() {
        let shares = vec![
            share("Eixo 1", ResponseLabel::Agree, 2, 3),
            share("Eixo 1", ResponseLabel::Disagree, 1, 3),
            share("Eixo 2", ResponseLabel::Agree, 1, 1),
        ];
        let s = stacked_bars(&shares);
        assert_eq!(s.categories, vec!["Eixo 1", "Eixo 2"]);
        assert_eq!(s.traces.len(), 2);
        assert_eq!(s.traces[0].label, ResponseLabel::Agree);
        assert_eq!(s.traces[0].text, vec!["66.7% (2)", "100.0% (1)"]);
        assert_eq!(s.traces[1].label, ResponseLabel::Disagree);
        assert_eq!(s.traces[1].values[1], 0.0);
        assert_eq!(s.traces[1].text, vec!["33.3% (1)".to_string(), String::new()]);
    }

    #[test]
    fn stacked_bars_index_interleaved_categories() {
        let shares: Vec<GroupShare> = (0..200)
            .flat_map(|i| {
                let c = format!("Dimensão {}", i % 100);
                vec![
                    share(&c, ResponseLabel::Unknown, 1, 2),
                    share(&c, ResponseLabel::Agree, 1, 2),
                ]
            })
            .collect();
        let s = stacked_bars(&shares);
        assert_eq!(s.categories.len(), 100);
        assert_eq!(s.categories[99], "Dimensão 99");
        assert_eq!(s.traces[0].label, ResponseLabel::Agree);
        assert_eq!(s.traces[1].label, ResponseLabel::Unknown);
        assert!(s.traces.iter().all(|t| t.values.iter().all(|v| *v == 50.0)));
    }

    #[test]
    fn diverging_bars_split_unknown() {
        let balance = vec![QuestionBalance {
            question: "Q".to_string(),
            agree_pct: 50.0,
            disagree_pct: 30.0,
            unknown_pct: 20.0,
        }];
        let d = diverging_bars(&balance);
        assert_eq!(d.unknown_left, vec![-10.0]);
        assert_eq!(d.unknown_right, vec![10.0]);
        assert_eq!(d.disagree, vec![-30.0]);
        assert_eq!(d.agree, vec![50.0]);
        assert_eq!(d.unknown_text, vec!["20.0%"]);
        assert_eq!(d.agree_hover, vec!["Concordância: 50.0%"]);
        assert_eq!(d.disagree_hover, vec!["Discordância: 30.0%"]);
        assert_eq!(d.unknown_hover, vec!["Desconheço: 20.0%"]);
    }

    #[test]
    fn zero_disagreement_has_no_text() {
        let balance = vec![QuestionBalance {
            question: "Q".to_string(),
            agree_pct: 100.0,
            disagree_pct: 0.0,
            unknown_pct: 0.0,
        }];
        let d = diverging_bars(&balance);
        assert_eq!(d.disagree, vec![-0.0]);
        assert_eq!(d.disagree_text, vec![""]);
    }

    #[test]
    fn radar_defaults_to_zero() {
        let shares = vec![
            share("Docência", ResponseLabel::Agree, 3, 4),
            share("Docência", ResponseLabel::Unknown, 1, 4),
            share("Infraestrutura", ResponseLabel::Disagree, 2, 2),
        ];
        let r = radar(&shares, ResponseLabel::Agree);
        assert_eq!(r.axes, vec!["Docência", "Infraestrutura"]);
        assert_eq!(r.values, vec![75.0, 0.0]);
    }

    #[test]
    fn unit_bars_keep_order() {
        let units = vec![
            UnitCount {
                unit: "B".to_string(),
                count: 1,
            },
            UnitCount {
                unit: "A".to_string(),
                count: 4,
            },
        ];
        let b = unit_bars(&units);
        assert_eq!(b.categories, vec!["B", "A"]);
        assert_eq!(b.values, vec![1, 4]);
        assert_eq!(b.text, vec!["1", "4"]);
    }
}
