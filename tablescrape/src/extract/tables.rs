//! Table discovery and normalization.
//!
//! Every top-level `<table>` becomes one [`Dataset`]. Rows are the `<tr>`
//! elements the table owns directly (rows of nested tables are skipped),
//! cells are their `<td>`/`<th>` children. Spanning cells are repeated
//! into every grid slot they cover, a leading all-`<th>` row becomes the
//! header, and every data row is fitted to the header width.

use scraper::ElementRef;
use std::collections::HashSet;

use super::document::{element_text, is_table, Document};
use super::models::{Dataset, Diagnostic, RowFit, TableExtraction};

const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct GridCell {
    text: String,
    is_header: bool,
}

#[derive(Debug)]
struct Pending {
    text: String,
    is_header: bool,
    rows_left: usize,
}

/// Reads a span attribute; missing or unparsable values count as 1.
fn span_attr(cell: &ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, max)
}

/// `<tr>` elements owned by `table`, in document order.
fn owned_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    let mut stack: Vec<_> = table.children().rev().collect();

    while let Some(node) = stack.pop() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        match element.value().name() {
            "table" => {}
            "tr" => rows.push(element),
            _ => stack.extend(node.children().rev()),
        }
    }

    rows
}

/// Number of tables anywhere inside `table`.
fn nested_table_count(table: ElementRef<'_>) -> usize {
    table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(is_table)
        .count()
}

fn row_cells(row: ElementRef<'_>) -> Vec<RawCell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let is_header = match cell.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(RawCell {
                text: element_text(cell),
                is_header,
                colspan: span_attr(&cell, "colspan", MAX_COLSPAN),
                rowspan: span_attr(&cell, "rowspan", MAX_ROWSPAN),
            })
        })
        .collect()
}

fn take_pending(pending: &mut [Option<Pending>], col: usize) -> Option<GridCell> {
    let slot = pending.get_mut(col)?;
    let carried = slot.as_mut()?;
    let cell = GridCell {
        text: carried.text.clone(),
        is_header: carried.is_header,
    };
    carried.rows_left -= 1;
    if carried.rows_left == 0 {
        *slot = None;
    }
    Some(cell)
}

/// Lays cells out on a grid, repeating spanning cells.
fn expand_spans(rows: Vec<Vec<RawCell>>) -> Vec<Vec<GridCell>> {
    let mut pending: Vec<Option<Pending>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out = Vec::new();
        let mut cells = row.into_iter();
        let mut col = 0;

        loop {
            if let Some(carried) = take_pending(&mut pending, col) {
                out.push(carried);
                col += 1;
                continue;
            }
            let Some(cell) = cells.next() else {
                break;
            };
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize_with(col + 1, || None);
                    }
                    pending[col] = Some(Pending {
                        text: cell.text.clone(),
                        is_header: cell.is_header,
                        rows_left: cell.rowspan - 1,
                    });
                }
                out.push(GridCell {
                    text: cell.text.clone(),
                    is_header: cell.is_header,
                });
                col += 1;
            }
        }

        // Spans from above that reach past this row's own cells.
        if let Some(last) = pending.iter().rposition(Option::is_some) {
            while col <= last {
                let cell = take_pending(&mut pending, col).unwrap_or(GridCell {
                    text: String::new(),
                    is_header: false,
                });
                out.push(cell);
                col += 1;
            }
        }

        grid.push(out);
    }

    grid
}

fn flat_grid(rows: Vec<Vec<RawCell>>) -> Vec<Vec<GridCell>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| GridCell {
                    text: cell.text,
                    is_header: cell.is_header,
                })
                .collect()
        })
        .collect()
}

/// Makes header names unique: blanks become `Unnamed: {i}`, repeats get
/// `.1`, `.2`, ... suffixes.
fn unique_names(raw: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut suffix = 0;
        while !used.insert(candidate.clone()) {
            suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        names.push(candidate);
    }

    names
}

/// One normalized table plus the counts its diagnostics are built from.
struct BuiltTable {
    dataset: Dataset,
    nested: usize,
    padded: usize,
    truncated: usize,
}

/// Builds the dataset for one top-level table.
fn table_dataset(table: ElementRef<'_>, expand: bool) -> BuiltTable {
    let nested = nested_table_count(table);
    let raw: Vec<Vec<RawCell>> = owned_rows(table).into_iter().map(row_cells).collect();

    // Empty rows still consume a rowspan, so drop them only after expansion.
    let mut grid = if expand { expand_spans(raw) } else { flat_grid(raw) };
    grid.retain(|row| !row.is_empty());

    let header_idx = grid
        .iter()
        .position(|row| !row.is_empty() && row.iter().all(|c| c.is_header));
    let header = header_idx.map(|idx| grid.remove(idx));

    let column_names = match header {
        Some(cells) => unique_names(cells.into_iter().map(|c| c.text).collect()),
        None => {
            let width = grid.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| i.to_string()).collect()
        }
    };

    let mut dataset = Dataset::new(column_names);
    if let Some(caption) = table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "caption")
    {
        let text = element_text(caption);
        if !text.is_empty() {
            dataset.caption = Some(text);
        }
    }

    let (mut padded, mut truncated) = (0, 0);
    for row in grid {
        match dataset.push_row(row.into_iter().map(|c| c.text).collect()) {
            RowFit::Padded => padded += 1,
            RowFit::Truncated => truncated += 1,
            RowFit::Exact => {}
        }
    }

    BuiltTable {
        dataset,
        nested,
        padded,
        truncated,
    }
}

/// Finds and normalizes every top-level table in `doc`.
#[must_use]
pub fn collect_tables(doc: &Document, expand: bool) -> TableExtraction {
    let mut extraction = TableExtraction::default();
    let mut any_table = false;

    for table in doc.elements_by_tag("table") {
        any_table = true;
        let nested_in_table = table
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| is_table(&el));
        if nested_in_table {
            continue;
        }

        let index = extraction.datasets.len();
        let BuiltTable {
            dataset,
            nested,
            padded,
            truncated,
        } = table_dataset(table, expand);

        if nested > 0 {
            extraction
                .diagnostics
                .push(Diagnostic::NestedTablesIgnored { index, count: nested });
        }
        if padded > 0 || truncated > 0 {
            extraction.diagnostics.push(Diagnostic::RaggedRows {
                index,
                padded,
                truncated,
            });
        }
        if dataset.is_empty() {
            extraction.diagnostics.push(Diagnostic::EmptyTable { index });
        }
        extraction.datasets.push(dataset);
    }

    if !any_table {
        extraction.diagnostics.push(Diagnostic::NoTablesFound);
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tables(html: &str) -> TableExtraction {
        collect_tables(&Document::parse(html), true)
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_single_table_with_header() {
        let result = tables(
            "<table>\
               <tr><th>Rank</th><th>Player</th><th>Level</th></tr>\
               <tr><td>1</td><td>Alice</td><td>99</td></tr>\
               <tr><td>2</td><td>Bob</td><td>87</td></tr>\
             </table>",
        );

        assert_eq!(result.datasets.len(), 1);
        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["Rank", "Player", "Level"]));
        assert_eq!(
            dataset.rows,
            vec![strings(&["1", "Alice", "99"]), strings(&["2", "Bob", "87"])]
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_thead_tbody_tfoot_document_order() {
        let result = tables(
            "<table>\
               <thead><tr><th>k</th><th>v</th></tr></thead>\
               <tbody><tr><td>a</td><td>1</td></tr></tbody>\
               <tfoot><tr><td>total</td><td>1</td></tr></tfoot>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["k", "v"]));
        assert_eq!(dataset.rows, vec![strings(&["a", "1"]), strings(&["total", "1"])]);
    }

    #[test]
    fn test_no_header_uses_positional_names_from_widest_row() {
        let result = tables(
            "<table>\
               <tr><td>a</td><td>b</td></tr>\
               <tr><td>c</td><td>d</td><td>e</td></tr>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["0", "1", "2"]));
        assert_eq!(dataset.rows[0], strings(&["a", "b", ""]));
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::RaggedRows { index: 0, padded: 1, truncated: 0 }]
        );
    }

    #[test]
    fn test_ragged_rows_padded_and_truncated() {
        let result = tables(
            "<table>\
               <tr><th>a</th><th>b</th><th>c</th></tr>\
               <tr><td>1</td></tr>\
               <tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td></tr>\
               <tr><td>x</td><td>y</td><td>z</td></tr>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert!(dataset.rows.iter().all(|row| row.len() == 3));
        assert_eq!(dataset.rows[0], strings(&["1", "", ""]));
        assert_eq!(dataset.rows[1], strings(&["1", "2", "3"]));
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::RaggedRows { index: 0, padded: 1, truncated: 1 }]
        );
    }

    #[test]
    fn test_header_row_is_first_all_th_row() {
        let result = tables(
            "<table>\
               <tr><td>note</td><td>x</td></tr>\
               <tr><th>a</th><th>b</th></tr>\
               <tr><th>row</th><td>1</td></tr>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["a", "b"]));
        assert_eq!(dataset.rows, vec![strings(&["note", "x"]), strings(&["row", "1"])]);
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let result = tables(
            "<table>\
               <tr><th>a</th></tr>\
               <tr></tr>\
               <tr><td>1</td></tr>\
               <tr>  </tr>\
             </table>",
        );

        assert_eq!(result.datasets[0].rows, vec![strings(&["1"])]);
    }

    #[test]
    fn test_header_only_table_is_emitted_empty() {
        let result = tables("<table><tr><th>a</th><th>b</th></tr></table>");

        assert_eq!(result.datasets.len(), 1);
        assert_eq!(result.datasets[0].column_names, strings(&["a", "b"]));
        assert!(result.datasets[0].is_empty());
        assert_eq!(result.diagnostics, vec![Diagnostic::EmptyTable { index: 0 }]);
    }

    #[test]
    fn test_completely_empty_table() {
        let result = tables("<table></table>");

        assert_eq!(result.datasets, vec![Dataset::default()]);
        assert_eq!(result.diagnostics, vec![Diagnostic::EmptyTable { index: 0 }]);
    }

    #[test]
    fn test_no_tables() {
        let result = tables("<html><body><p>Nothing here</p></body></html>");

        assert!(result.datasets.is_empty());
        assert_eq!(result.diagnostics, vec![Diagnostic::NoTablesFound]);
    }

    #[test]
    fn test_nested_table_only_outer_emitted() {
        let result = tables(
            "<table>\
               <tr><th>name</th><th>detail</th></tr>\
               <tr><td>outer</td><td>see \
                 <table><tr><th>x</th></tr><tr><td>inner-1</td></tr><tr><td>inner-2</td></tr></table>\
               </td></tr>\
             </table>",
        );

        assert_eq!(result.datasets.len(), 1);
        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["name", "detail"]));
        assert_eq!(dataset.rows, vec![strings(&["outer", "see"])]);
        assert!(result
            .diagnostics
            .contains(&Diagnostic::NestedTablesIgnored { index: 0, count: 1 }));
    }

    #[test]
    fn test_deeply_nested_tables_counted() {
        let result = tables(
            "<table><tr><td>\
               <table><tr><td><table><tr><td>deep</td></tr></table></td></tr></table>\
             </td></tr></table>",
        );

        assert_eq!(result.datasets.len(), 1);
        assert!(result
            .diagnostics
            .contains(&Diagnostic::NestedTablesIgnored { index: 0, count: 2 }));
    }

    #[test]
    fn test_multiple_tables_document_order() {
        let result = tables(
            "<table><tr><th>first</th></tr><tr><td>1</td></tr></table>\
             <p>between</p>\
             <div><table><tr><th>second</th></tr><tr><td>2</td></tr></table></div>",
        );

        assert_eq!(result.datasets.len(), 2);
        assert_eq!(result.datasets[0].column_names, strings(&["first"]));
        assert_eq!(result.datasets[1].column_names, strings(&["second"]));
    }

    #[test]
    fn test_colspan_and_rowspan_expansion() {
        let result = tables(
            "<table>\
               <tr><th>a</th><th>b</th><th>c</th></tr>\
               <tr><td rowspan=2>x</td><td colspan=2>wide</td></tr>\
               <tr><td>1</td><td>2</td></tr>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert_eq!(
            dataset.rows,
            vec![strings(&["x", "wide", "wide"]), strings(&["x", "1", "2"])]
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_rowspan_past_own_cells() {
        let result = tables(
            "<table>\
               <tr><td>a</td><td rowspan=2>tall</td></tr>\
               <tr><td>b</td></tr>\
             </table>",
        );

        assert_eq!(
            result.datasets[0].rows,
            vec![strings(&["a", "tall"]), strings(&["b", "tall"])]
        );
    }

    #[test]
    fn test_rowspan_covers_empty_row() {
        let result = tables(
            "<table>\
               <tr><th>a</th><th>b</th></tr>\
               <tr><td rowspan=3>x</td><td>1</td></tr>\
               <tr></tr>\
               <tr><td>3</td></tr>\
             </table>",
        );

        assert_eq!(
            result.datasets[0].rows,
            vec![strings(&["x", "1"]), strings(&["x", ""]), strings(&["x", "3"])]
        );
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::RaggedRows {
                index: 0,
                padded: 1,
                truncated: 0
            }]
        );
    }

    #[test]
    fn test_spans_disabled() {
        let doc = Document::parse(
            "<table><tr><th>a</th><th>b</th></tr><tr><td colspan=2>wide</td></tr></table>",
        );
        let result = collect_tables(&doc, false);

        assert_eq!(result.datasets[0].rows, vec![strings(&["wide", ""])]);
    }

    #[test]
    fn test_bad_span_values() {
        let result = tables(
            "<table><tr><td colspan=\"abc\">a</td><td colspan=0>b</td><td colspan=-3>c</td></tr></table>",
        );
        assert_eq!(result.datasets[0].rows, vec![strings(&["a", "b", "c"])]);
    }

    #[test]
    fn test_header_names_unique() {
        let result = tables(
            "<table><tr><th>x</th><th></th><th>x</th><th>x</th></tr><tr><td>1</td></tr></table>",
        );
        assert_eq!(
            result.datasets[0].column_names,
            strings(&["x", "Unnamed: 1", "x.1", "x.2"])
        );
    }

    #[test]
    fn test_caption_and_cell_text_normalization() {
        let result = tables(
            "<table><caption> Server\n Status </caption>\
               <tr><th> Server   Name </th></tr>\
               <tr><td>\n  Eden <b>One</b>\n</td></tr>\
             </table>",
        );

        let dataset = &result.datasets[0];
        assert_eq!(dataset.caption.as_deref(), Some("Server Status"));
        assert_eq!(dataset.column_names, strings(&["Server Name"]));
        assert_eq!(dataset.rows, vec![strings(&["Eden One"])]);
    }

    #[test]
    fn test_unclosed_markup() {
        let result = tables("<table><tr><th>a<th>b<tr><td>1<td>2<tr><td>3");

        let dataset = &result.datasets[0];
        assert_eq!(dataset.column_names, strings(&["a", "b"]));
        assert_eq!(dataset.rows, vec![strings(&["1", "2"]), strings(&["3", ""])]);
    }

    #[test]
    fn test_unique_names_helper() {
        assert_eq!(
            unique_names(strings(&["a", "a", "a.1"])),
            strings(&["a", "a.1", "a.1.1"])
        );
    }
}
