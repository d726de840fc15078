//! Row-span aware action table parser
//!
//! One action usually occupies several `<tr>` rows. The first row holds the
//! identifier cell with `rowspan=n`; the rows after it only contain the
//! columns that are not covered by a spanning cell from above (on the live
//! pages that is the resource types and condition keys pair).
//!
//! Coverage is tracked per logical column, so a physical cell always lands in
//! the first column no earlier span is still covering. A continuation row that
//! still has a cell at the resource types position keeps placeholder cells
//! under the span and is read positionally instead.

use scraper::{ElementRef, Selector};
use tracing::trace;

use super::ParsingResult;
use super::config::{ParsingConfig, compile_selector};
use super::record_normalizer::{RawRecord, normalize_record, normalize_text};
use crate::domain::ActionRecord;
use crate::domain::constants::columns::{
    ACCESS_LEVEL, CONTEXT_KEYS, DESCRIPTION, IDENTIFIER, RESOURCE_TYPES, TRACKED,
};

/// A row that starts a record needs at least identifier and description
const MIN_RECORD_CELLS: usize = 2;

/// One table cell reduced to what the parser needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Concatenated text content
    pub text: String,
    /// Link texts, or the non-empty text fragments when the cell has no links
    pub values: Vec<String>,
    /// First link target in the cell
    pub href: Option<String>,
    /// Declared row span; absent, unparsable or zero counts as 1
    pub rowspan: usize,
}

impl GridCell {
    /// Plain text cell spanning a single row
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = normalize_text(&text);
        let values = if normalized.is_empty() {
            Vec::new()
        } else {
            vec![normalized]
        };
        Self {
            text,
            values,
            href: None,
            rowspan: 1,
        }
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan;
        self
    }

    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Read a `<td>`/`<th>` element
    pub fn from_element(cell: ElementRef<'_>, link_selector: &Selector) -> Self {
        let text = cell.text().collect::<String>();

        let links: Vec<String> = cell
            .select(link_selector)
            .map(|link| normalize_text(&link.text().collect::<String>()))
            .filter(|value| !value.is_empty())
            .collect();
        let values = if links.is_empty() {
            cell.text()
                .map(normalize_text)
                .filter(|value| !value.is_empty())
                .collect()
        } else {
            links
        };

        let href = cell
            .select(link_selector)
            .find_map(|link| link.value().attr("href"))
            .map(str::to_string);

        Self {
            text,
            values,
            href,
            rowspan: parse_rowspan(cell.value().attr("rowspan")),
        }
    }
}

/// Parse a `rowspan` attribute value
#[must_use]
pub fn parse_rowspan(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Where a logical column's value comes from in the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Cell(usize),
    Covered,
    Missing,
}

/// State threaded from one row to the next
#[derive(Debug, Clone, Default)]
pub struct RowSpanCarry {
    /// Remaining rows each tracked column stays covered by an earlier cell
    covered: [usize; TRACKED],
    /// Record that continuation rows merge into
    current: Option<usize>,
    /// Values of the cell spanning the resource types column
    last_resource_types: Vec<String>,
    /// Values of the cell spanning the condition keys column
    last_context_keys: Vec<String>,
}

impl RowSpanCarry {
    /// Continuation rows still owed to the current record
    #[must_use]
    pub const fn rowspan_left(&self) -> usize {
        self.covered[IDENTIFIER]
    }

    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.rowspan_left() > 0
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    fn positional_layout(physical: usize) -> [Slot; TRACKED] {
        let mut slots = [Slot::Missing; TRACKED];
        for (column, slot) in slots.iter_mut().enumerate().take(physical) {
            *slot = Slot::Cell(column);
        }
        slots
    }

    fn layout(&self, physical: usize) -> [Slot; TRACKED] {
        let mut slots = [Slot::Missing; TRACKED];
        let mut next = 0;
        for (column, slot) in slots.iter_mut().enumerate() {
            if self.covered[column] > 0 {
                *slot = Slot::Covered;
            } else if next < physical {
                *slot = Slot::Cell(next);
                next += 1;
            }
        }
        slots
    }

    fn values_at(&self, slot: Slot, column: usize, cells: &[GridCell]) -> Vec<String> {
        match slot {
            Slot::Cell(index) => cells[index].values.clone(),
            Slot::Covered => match column {
                RESOURCE_TYPES => self.last_resource_types.clone(),
                CONTEXT_KEYS => self.last_context_keys.clone(),
                _ => Vec::new(),
            },
            Slot::Missing => Vec::new(),
        }
    }

    /// Move one row down: every active span loses a row
    fn step(&mut self) {
        for remaining in &mut self.covered {
            *remaining = remaining.saturating_sub(1);
        }
    }

    fn register_spans(&mut self, layout: &[Slot; TRACKED], cells: &[GridCell]) {
        for (column, slot) in layout.iter().enumerate() {
            let Slot::Cell(index) = *slot else { continue };
            // placeholder under a span that is still running
            if self.covered[column] > 0 {
                continue;
            }
            let cell = &cells[index];
            self.covered[column] = cell.rowspan.saturating_sub(1);
            if cell.rowspan > 1 {
                match column {
                    RESOURCE_TYPES => self.last_resource_types = cell.values.clone(),
                    CONTEXT_KEYS => self.last_context_keys = cell.values.clone(),
                    _ => {}
                }
            }
        }
    }
}

/// Parser turning an action table into `ActionRecord`s
pub struct GridTableParser {
    row_selector: Selector,
    link_selector: Selector,
    trusted_doc_prefix: String,
}

impl GridTableParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            row_selector: compile_selector(&config.selectors.row)?,
            link_selector: compile_selector(&config.selectors.link)?,
            trusted_doc_prefix: config.trusted_doc_prefix.clone(),
        })
    }

    /// Parse every data row of `table`; the first row is the header
    pub fn parse_table(&self, table: ElementRef<'_>) -> Vec<ActionRecord> {
        self.parse_rows(&self.read_rows(table))
    }

    /// Read the table into rows of `GridCell`s, header row included
    pub fn read_rows(&self, table: ElementRef<'_>) -> Vec<Vec<GridCell>> {
        table
            .select(&self.row_selector)
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| GridCell::from_element(cell, &self.link_selector))
                    .collect()
            })
            .collect()
    }

    /// Merge rows into records. `rows[0]` is treated as the header.
    pub fn parse_rows(&self, rows: &[Vec<GridCell>]) -> Vec<ActionRecord> {
        let mut raw = Vec::new();
        let mut carry = RowSpanCarry::default();
        for cells in rows.iter().skip(1) {
            carry = self.process_row(cells, carry, &mut raw);
        }
        raw.into_iter().filter_map(normalize_record).collect()
    }

    fn process_row(
        &self,
        cells: &[GridCell],
        mut carry: RowSpanCarry,
        records: &mut Vec<RawRecord>,
    ) -> RowSpanCarry {
        let continuation = carry.is_continuation();
        let layout = if continuation && cells.len() > RESOURCE_TYPES {
            RowSpanCarry::positional_layout(cells.len())
        } else {
            carry.layout(cells.len())
        };
        let resource_types = carry.values_at(layout[RESOURCE_TYPES], RESOURCE_TYPES, cells);
        let context_keys = carry.values_at(layout[CONTEXT_KEYS], CONTEXT_KEYS, cells);
        carry.step();

        if continuation {
            if let Some(record) = carry.current.and_then(|index| records.get_mut(index)) {
                record.resource_types.extend(resource_types);
                record.context_keys.extend(context_keys);
            }
            carry.register_spans(&layout, cells);
            return carry;
        }

        if cells.len() < MIN_RECORD_CELLS {
            trace!("Skipping row with {} cell(s)", cells.len());
            return carry;
        }

        carry.register_spans(&layout, cells);

        let text_at = |column: usize| match layout[column] {
            Slot::Cell(index) => cells[index].text.clone(),
            Slot::Covered | Slot::Missing => String::new(),
        };

        let identifier = normalize_text(&text_at(IDENTIFIER));
        if identifier.is_empty() {
            trace!("Skipping row without an action identifier");
            carry.current = None;
            return carry;
        }

        let doc_link = match layout[IDENTIFIER] {
            Slot::Cell(index) => self.trusted_link(&cells[index]),
            Slot::Covered | Slot::Missing => String::new(),
        };

        records.push(RawRecord {
            identifier,
            description: text_at(DESCRIPTION),
            access_level: text_at(ACCESS_LEVEL),
            resource_types,
            context_keys,
            doc_link,
        });
        carry.current = Some(records.len() - 1);
        carry
    }

    fn trusted_link(&self, cell: &GridCell) -> String {
        cell.href
            .as_deref()
            .map(str::trim)
            .filter(|href| href.starts_with(&self.trusted_doc_prefix))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn header() -> Vec<GridCell> {
        ["Actions", "Description", "Access level", "Resource types", "Condition keys", "Dependent actions"]
            .into_iter()
            .map(GridCell::new)
            .collect()
    }

    fn parse_html(html: &str) -> Vec<ActionRecord> {
        let document = Html::parse_document(html);
        let table_selector = Selector::parse("table").unwrap();
        let table = document.select(&table_selector).next().unwrap();
        GridTableParser::new().unwrap().parse_table(table)
    }

    #[test]
    fn single_row_actions_map_one_to_one() {
        let records = parse_html(
            r##"<table>
                <tr><th>Actions</th><th>Description</th><th>Access level</th><th>Resource types</th><th>Condition keys</th><th>Dependent actions</th></tr>
                <tr><td><a href="https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListBuckets.html">ListAllMyBuckets</a></td>
                    <td>Grants permission to list all buckets</td><td>List</td><td></td><td></td><td></td></tr>
                <tr><td>PutObject</td><td>Grants permission to add an object</td><td>Write</td>
                    <td><a href="#amazons3-object">object*</a></td><td><a href="#condition-keys">s3:x-amz-acl</a></td><td></td></tr>
            </table>"##,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "ListAllMyBuckets");
        assert_eq!(records[0].access_level, "List");
        assert!(records[0].resource_types.is_empty());
        assert_eq!(
            records[0].doc_link,
            "https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListBuckets.html"
        );
        assert_eq!(records[1].identifier, "PutObject");
        assert_eq!(records[1].resource_types, vec!["object*"]);
        assert_eq!(records[1].context_keys, vec!["s3:x-amz-acl"]);
        assert!(!records[1].has_doc_link());
    }

    #[test]
    fn continuation_rows_merge_into_spanning_action() {
        let records = parse_html(
            r##"<table>
                <tr><th>Actions</th><th>Description</th><th>Access level</th><th>Resource types</th><th>Condition keys</th><th>Dependent actions</th></tr>
                <tr><td rowspan="3"><a id="s3-GetObject"></a><a href="https://docs.aws.amazon.com/AmazonS3/latest/API/API_GetObject.html">GetObject</a></td>
                    <td rowspan="3">Grants permission to retrieve objects from Amazon S3</td>
                    <td rowspan="3">Read</td>
                    <td><a href="#amazons3-object">object*</a></td><td></td><td></td></tr>
                <tr><td><a href="#amazons3-accesspoint">accesspoint</a></td><td><a href="#s3-authType">s3:authType</a></td><td></td></tr>
                <tr><td></td><td><a href="#s3-authType">s3:authType</a><a href="#s3-signatureAge">s3:signatureAge</a></td><td></td></tr>
                <tr><td>GetBucketAcl</td><td>Grants permission to read a bucket ACL</td><td>Read</td><td><a>bucket*</a></td><td></td><td></td></tr>
            </table>"##,
        );

        assert_eq!(records.len(), 2);
        let get_object = &records[0];
        assert_eq!(get_object.identifier, "GetObject");
        assert_eq!(get_object.description, "Grants permission to retrieve objects from Amazon S3");
        assert_eq!(get_object.resource_types, vec!["object*", "accesspoint"]);
        assert_eq!(get_object.context_keys, vec!["s3:authType", "s3:signatureAge"]);
        assert!(get_object.has_doc_link());
        assert_eq!(records[1].identifier, "GetBucketAcl");
        assert_eq!(records[1].resource_types, vec!["bucket*"]);
    }

    #[test]
    fn resource_types_accumulate_across_spanned_rows() {
        let rows = vec![
            header(),
            vec![
                GridCell::new("A").with_rowspan(3),
                GridCell::new("does A").with_rowspan(3),
                GridCell::new("Write").with_rowspan(3),
                GridCell::new("R1"),
                GridCell::new(""),
            ],
            vec![GridCell::new("R2"), GridCell::new("")],
            vec![GridCell::new("R3"), GridCell::new("")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_types, vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn placeholder_cells_under_span_are_read_positionally() {
        let rows = vec![
            header(),
            vec![
                GridCell::new("A").with_rowspan(2),
                GridCell::new("does A"),
                GridCell::new("Write"),
                GridCell::new("R1"),
            ],
            vec![
                GridCell::new(""),
                GridCell::new(""),
                GridCell::new(""),
                GridCell::new("R2"),
            ],
            vec![GridCell::new("B"), GridCell::new("does B")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "A");
        assert_eq!(records[0].resource_types, vec!["R1", "R2"]);
        assert_eq!(records[1].identifier, "B");
    }

    #[test]
    fn short_continuation_row_contributes_nothing() {
        let rows = vec![
            header(),
            vec![
                GridCell::new("A").with_rowspan(2),
                GridCell::new("does A").with_rowspan(2),
                GridCell::new("Read").with_rowspan(2),
                GridCell::new("R1"),
            ],
            vec![],
            vec![GridCell::new("B"), GridCell::new("does B")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        let ids: Vec<_> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(records[0].resource_types, vec!["R1"]);
        assert!(records[0].context_keys.is_empty());
    }

    #[test]
    fn header_only_table_yields_nothing() {
        let parser = GridTableParser::new().unwrap();
        assert!(parser.parse_rows(&[header()]).is_empty());
        assert!(parser.parse_rows(&[]).is_empty());
    }

    #[test]
    fn duplicate_identifiers_are_kept_in_order() {
        let rows = vec![
            header(),
            vec![GridCell::new("Tag"), GridCell::new("first")],
            vec![GridCell::new("Tag"), GridCell::new("second")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "first");
        assert_eq!(records[1].description, "second");
    }

    #[test]
    fn malformed_rowspan_counts_as_single_row() {
        assert_eq!(parse_rowspan(None), 1);
        assert_eq!(parse_rowspan(Some("abc")), 1);
        assert_eq!(parse_rowspan(Some("0")), 1);
        assert_eq!(parse_rowspan(Some(" 4 ")), 4);

        let records = parse_html(
            r#"<table>
                <tr><th>Actions</th><th>Description</th></tr>
                <tr><td rowspan="abc">A</td><td>does A</td></tr>
                <tr><td rowspan="0">B</td><td>does B</td></tr>
            </table>"#,
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn oversized_rowspan_truncates_at_table_end() {
        let rows = vec![
            header(),
            vec![
                GridCell::new("A").with_rowspan(9),
                GridCell::new("does A").with_rowspan(9),
                GridCell::new("Write").with_rowspan(9),
                GridCell::new("R1"),
                GridCell::new("K1"),
            ],
            vec![GridCell::new("R2"), GridCell::new("K2")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "A");
        assert_eq!(records[0].resource_types, vec!["R1", "R2"]);
        assert_eq!(records[0].context_keys, vec!["K1", "K2"]);
    }

    #[test]
    fn rows_with_one_cell_are_skipped() {
        let rows = vec![
            header(),
            vec![GridCell::new("lonely")],
            vec![GridCell::new("A"), GridCell::new("does A")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "A");
    }

    #[test]
    fn untrusted_doc_links_are_dropped() {
        let rows = vec![
            header(),
            vec![
                GridCell::new("A").with_href("https://example.com/A.html"),
                GridCell::new("does A"),
            ],
            vec![
                GridCell::new("B").with_href("https://docs.aws.amazon.com/B.html"),
                GridCell::new("does B"),
            ],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records[0].doc_link, "");
        assert_eq!(records[1].doc_link, "https://docs.aws.amazon.com/B.html");
    }

    #[test]
    fn new_action_inherits_spanned_resource_column() {
        // Resource cell of A spans two rows, so B's row has no resource cell.
        let rows = vec![
            header(),
            vec![
                GridCell::new("A"),
                GridCell::new("does A"),
                GridCell::new("Read"),
                GridCell::new("shared").with_rowspan(2),
                GridCell::new("k1"),
            ],
            vec![
                GridCell::new("B"),
                GridCell::new("does B"),
                GridCell::new("Read"),
                GridCell::new("k2"),
            ],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].resource_types, vec!["shared"]);
        assert_eq!(records[1].context_keys, vec!["k2"]);
    }

    #[test]
    fn spanned_rows_of_blank_action_are_discarded() {
        let rows = vec![
            header(),
            vec![
                GridCell::new(" ").with_rowspan(2),
                GridCell::new("nothing").with_rowspan(2),
                GridCell::new("Read").with_rowspan(2),
                GridCell::new("R1"),
            ],
            vec![GridCell::new("R2")],
            vec![GridCell::new("A"), GridCell::new("does A")],
        ];

        let records = GridTableParser::new().unwrap().parse_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "A");
        assert!(records[0].resource_types.is_empty());
    }

    #[test]
    fn carry_tracks_remaining_rows() {
        let parser = GridTableParser::new().unwrap();
        let mut records = Vec::new();
        let row = vec![
            GridCell::new("A").with_rowspan(3),
            GridCell::new("does A").with_rowspan(3),
        ];

        let carry = parser.process_row(&row, RowSpanCarry::default(), &mut records);
        assert_eq!(carry.rowspan_left(), 2);
        assert_eq!(carry.current(), Some(0));

        let carry = parser.process_row(&[GridCell::new("R")], carry, &mut records);
        assert_eq!(carry.rowspan_left(), 1);
        let carry = parser.process_row(&[], carry, &mut records);
        assert!(!carry.is_continuation());
        assert_eq!(records.len(), 1);
    }
}
