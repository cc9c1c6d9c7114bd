use std::path::Path;

use crate::dashboard::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Maps each header cell onto a known column. Unknown headers map to None and
/// their cells are ignored.
pub fn map_header<S: AsRef<str>>(header: &[S], path: &str) -> DashResult<Vec<Option<Column>>> {
    let mapping: Vec<Option<Column>> = header
        .iter()
        .map(|h| Column::from_header(h.as_ref().trim_start_matches('\u{feff}')))
        .collect();
    for (h, c) in header.iter().zip(mapping.iter()) {
        if c.is_none() {
            debug!("map_header: {}: ignoring column {:?}", path, h.as_ref());
        }
    }
    if mapping.iter().all(|c| c.is_none()) {
        return UnknownHeadersSnafu { path }.fail();
    }
    Ok(mapping)
}

/// The known columns of a header, in order.
pub fn present_columns(mapping: &[Option<Column>]) -> Vec<Column> {
    mapping.iter().flatten().copied().collect()
}

/// Pairs the cells of a row with their column, dropping the unknown ones.
/// Short rows leave the trailing columns empty.
pub fn assemble_row<S>(mapping: &[Option<Column>], cells: impl IntoIterator<Item = S>) -> Vec<(Column, S)> {
    mapping
        .iter()
        .zip(cells)
        .filter_map(|(c, s)| c.map(|c| (c, s)))
        .collect()
}
