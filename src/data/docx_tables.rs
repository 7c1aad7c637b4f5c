// ============================================================
// Layer 4 — .docx Table Extractor
// ============================================================
// Turns the tables of a .docx file into flat text using docx-rs.
//
// A .docx file is a ZIP archive of XML parts. docx-rs parses it
// into a typed tree; the parts we walk look like:
//   Document
//     └── children: Vec<DocumentChild>
//           └── Table
//                 └── rows: Vec<TableChild::TableRow>
//                       └── cells: Vec<TableRowChild::TableCell>
//                             └── children: Vec<TableCellContent::Paragraph>
//                                   └── Run / Hyperlink → Run
//                                         └── Text, Tab, Break
//
// Rendering rules, applied per table in document order:
//   - first row has ≤ 2 cells → one labeled line "\nTable: <first cell>\n"
//   - otherwise               → one line per row: ['cell', 'cell', ...]
//
// Row lines use Python list-literal quoting, so a cell containing
// a single quote is wrapped in double quotes and a newline inside a
// cell is written as \n.
//
// The data dictionary benchmarked here describes each database
// table with a small two-column header table (its name) followed
// by a wide table of its fields, so the labeled lines end up
// separated from each other by blank lines.

use anyhow::{anyhow, Context, Result};
use docx_rs::{read_docx, DocumentChild, Paragraph, Table};
use std::{fs, path::Path};

use crate::domain::traits::TextExtractor;

/// Rows of cell texts for one table.
pub type TableGrid = Vec<Vec<String>>;

/// Extracts the tables of a .docx document as text.
/// Paragraphs outside tables are not part of the output.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxTableExtractor;

impl TextExtractor for DocxTableExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        let tables = read_tables(&bytes)
            .with_context(|| format!("Cannot parse '{}'", path.display()))?;

        tracing::debug!("Found {} tables in '{}'", tables.len(), path.display());
        Ok(render_tables(&tables))
    }
}

/// Parse a .docx byte buffer and collect every top-level table.
pub fn read_tables(bytes: &[u8]) -> Result<Vec<TableGrid>> {
    let docx = read_docx(bytes)
        .map_err(|e| anyhow!("docx-rs parse error: {:?}", e))?;

    let tables = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Table(table) => Some(table_grid(table)),
            _ => None,
        })
        .collect();

    Ok(tables)
}

/// Render extracted tables into the flat context text.
pub fn render_tables(tables: &[TableGrid]) -> String {
    let mut out = String::new();

    for rows in tables {
        // Tables without rows carry nothing to render
        let Some(first_row) = rows.first() else { continue };

        if first_row.len() <= 2 {
            let label = first_row.first().map(String::as_str).unwrap_or_default();
            out.push_str(&format!("\nTable: {label}\n"));
            continue;
        }

        for row in rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
    }

    out
}

/// Collect the text of every cell, row by row.
fn table_grid(table: &Table) -> TableGrid {
    use docx_rs::{TableCellContent, TableChild, TableRowChild};

    let mut rows = Vec::new();

    for row_child in &table.rows {
        #[allow(irrefutable_let_patterns)]
        let TableChild::TableRow(row) = row_child else { continue };

        let mut cells = Vec::new();
        for cell_child in &row.cells {
            #[allow(irrefutable_let_patterns)]
            let TableRowChild::TableCell(cell) = cell_child else { continue };

            // A cell's text is its paragraphs joined by newlines;
            // nested tables are skipped
            let paragraphs: Vec<String> = cell
                .children
                .iter()
                .filter_map(|content| match content {
                    TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                    _ => None,
                })
                .collect();
            cells.push(paragraphs.join("\n"));
        }
        rows.push(cells);
    }

    rows
}

/// `['a', 'b', ...]` with each cell quoted as a Python string literal.
fn render_row(row: &[String]) -> String {
    let cells: Vec<String> = row.iter().map(|c| quote_cell(c)).collect();
    format!("[{}]", cells.join(", "))
}

/// Single quotes unless the text has a single quote and no double quote.
fn quote_cell(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Text of a paragraph: runs are concatenated with no separator,
/// tabs become '\t' and line breaks '\n'. Hyperlinked runs count too.
fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&para.children, &mut text);
    text
}

fn push_children_text(children: &[docx_rs::ParagraphChild], out: &mut String) {
    use docx_rs::{ParagraphChild, RunChild};

    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) | RunChild::CarriageReturn(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, out),
            _ => {}
        }
    }
}
