use clap::Parser;

/// Computes the chart series of a survey evaluation dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the data sources of each domain.
    /// For more information about the file format, read the documentation of the
    /// `survey_aggregation::manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (default institutional) The survey to summarize: institutional, course or discipline.
    #[clap(short, long, value_parser)]
    pub domain: Option<String>,

    /// (inPerson or remote) How the disciplines were delivered. Required with the
    /// discipline domain.
    #[clap(long, value_parser)]
    pub delivery_mode: Option<String>,

    /// (repeatable) Restricts the view to these axes.
    #[clap(long, value_parser)]
    pub axis: Vec<String>,

    /// (repeatable) Restricts the view to these questions, given as `<axis> - <question>`.
    #[clap(long, value_parser)]
    pub question: Vec<String>,

    /// The dimension whose questions are shown in the opinion balance. Defaults to the
    /// first dimension of the selection.
    #[clap(long, value_parser)]
    pub dimension: Option<String>,

    /// (repeatable) Restricts the view to these managing units.
    #[clap(long, value_parser)]
    pub managing_unit: Vec<String>,

    /// (repeatable) Restricts the view to these courses.
    #[clap(long, value_parser)]
    pub course: Vec<String>,

    /// (repeatable) Restricts the view to these sectors.
    #[clap(long, value_parser)]
    pub sector: Vec<String>,

    /// (repeatable) Restricts the view to these dimensions.
    #[clap(long, value_parser)]
    pub dimension_filter: Vec<String>,

    /// A discipline selector label: `Disciplina: <d> - Curso: <c> - Setor: <s>`.
    /// The --course and --sector options take precedence over its segments.
    #[clap(long, value_parser)]
    pub discipline: Option<String>,

    /// Number of managing units shown individually.
    #[clap(long, value_parser, default_value_t = 10)]
    pub top_n: usize,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format
    /// to the given location. Setting this option overrides the path that may be specified
    /// with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, cpadash will check that
    /// the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or empty) A single data file for the selected domain. Setting this option
    /// overrides the data sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. Optional if the
    /// workbook has a single worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
