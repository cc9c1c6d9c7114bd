// Primitives for reading CSV files.

use std::fs::File;
use std::io::{BufRead, BufReader};

use survey_aggregation::builder::DatasetBuilder;

use crate::dashboard::{
    io_common::{assemble_row, map_header, present_columns},
    *,
};

pub fn read_csv_dataset(path: &str) -> DashResult<Dataset> {
    let delimiter = detect_delimiter(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    if header.is_empty() {
        return MissingHeaderSnafu { path }.fail();
    }
    let mapping = map_header(&header, path)?;
    debug!("read_csv_dataset: {}: mapping {:?}", path, mapping);

    let mut builder = DatasetBuilder::new(&present_columns(&mapping));
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        builder.add_cells(&assemble_row(&mapping, line.iter()));
    }
    Ok(builder.build())
}

// Spreadsheet exports in Portuguese locales use ';'.
fn detect_delimiter(path: &str) -> DashResult<u8> {
    let file = File::open(path).context(OpeningFileSnafu { path })?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .context(OpeningFileSnafu { path })?;
    let res = if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    };
    debug!("detect_delimiter: {}: {:?}", path, res as char);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(name: &str, content: &str) -> String {
        let dir = std::env::temp_dir().join(format!("cpadash-csv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    #[test]
    fn comma_separated_with_numeric_answers() {
        let path = write_file(
            "numeric.csv",
            "ID_PESQUISA,VALOR_RESPOSTA,EIXO,Ordem\n10,1,infraestrutura_fisica,2\n11,-1,infraestrutura_fisica,2\n12,0,,\n",
        );
        let ds = read_csv_dataset(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(ds.has_column(Column::ResponseLabel));
        assert!(ds.has_column(Column::AxisName));
        let r = &ds.records()[1];
        assert_eq!(r.response, Some(ResponseLabel::Disagree));
        assert_eq!(r.axis_name.as_deref(), Some("Infraestrutura Fisica"));
        assert_eq!(r.order, Some(2));
        assert_eq!(ds.records()[2].axis_name, None);
    }

    #[test]
    fn semicolon_separated_with_quoted_cells() {
        let path = write_file(
            "quoted.csv",
            "ID_PESQUISA;RESPOSTA;PERGUNTA;UNIDADE GESTORA\n1;Concordo;\"Sim; ou não?\";PROGRAD\n2;Discordo\n",
        );
        let ds = read_csv_dataset(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].question_text.as_deref(), Some("Sim; ou não?"));
        assert_eq!(ds.records()[1].managing_unit, None);
        assert_eq!(ds.records()[1].response, Some(ResponseLabel::Disagree));
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = read_csv_dataset("/nonexistent/cpadash/data.csv");
        assert!(matches!(res, Err(DashboardError::OpeningFile { .. })));
    }
}
