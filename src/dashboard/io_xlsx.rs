use calamine::{open_workbook, DataType, Reader, Xlsx};

use survey_aggregation::builder::DatasetBuilder;

use crate::dashboard::{
    io_common::{assemble_row, map_header, present_columns},
    *,
};

pub fn read_xlsx_dataset(path: &str, worksheet_name: Option<&str>) -> DashResult<Dataset> {
    let wrange = get_range(path, worksheet_name)?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(MissingHeaderSnafu { path })?;
    let header: Vec<String> = header_row.iter().map(header_text).collect();
    debug!("read_xlsx_dataset: header: {:?}", header);
    let mapping = map_header(&header, path)?;

    let mut builder = DatasetBuilder::new(&present_columns(&mapping));
    for (idx, row) in rows.enumerate() {
        // Row 1 is the header.
        let lineno = idx + 2;
        let cells: Vec<(Column, String)> = assemble_row(&mapping, row.iter())
            .into_iter()
            .map(|(c, cell)| cell_text(cell, lineno).map(|s| (c, s)))
            .collect::<DashResult<Vec<(Column, String)>>>()?;
        builder.add_cells(&cells);
    }
    Ok(builder.build())
}

fn header_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => String::new(),
        x => x.to_string(),
    }
}

// Only the cells of known columns are converted, other columns may hold anything.
fn cell_text(cell: &DataType, lineno: usize) -> DashResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok(String::new()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> DashResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }
    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => EmptyExcelSnafu { path }.fail(),
        [(name, wrange)] => {
            debug!("get_range: path: {:?} using the only worksheet {:?}", path, name);
            Ok(wrange.clone())
        }
        _ => AmbiguousWorksheetSnafu { path }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_numbers_become_integers() {
        assert_eq!(cell_text(&DataType::Float(3.0), 2).unwrap(), "3");
        assert_eq!(cell_text(&DataType::Float(-1.0), 2).unwrap(), "-1");
        assert_eq!(cell_text(&DataType::Float(2.5), 2).unwrap(), "2.5");
        assert_eq!(cell_text(&DataType::Int(17), 2).unwrap(), "17");
        assert_eq!(cell_text(&DataType::Empty, 2).unwrap(), "");
        assert_eq!(
            cell_text(&DataType::String("Concordo".to_string()), 2).unwrap(),
            "Concordo"
        );
    }

    #[test]
    fn unsupported_cells_are_reported_with_their_line() {
        let res = cell_text(&DataType::DateTime(44000.5), 7);
        assert!(matches!(
            res,
            Err(DashboardError::ExcelWrongCellType { lineno: 7, .. })
        ));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let res = read_xlsx_dataset("/nonexistent/cpadash/data.xlsx", None);
        assert!(matches!(res, Err(DashboardError::OpeningExcel { .. })));
    }
}
