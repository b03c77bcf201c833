//! Minimal PDF 1.4 writer for tabular ledger reports.
//!
//! Pages are A4 portrait, set in the built-in Courier face so columns line
//! up without font metrics.

use std::fmt::Write as _;

use crate::models::Transaction;
use crate::util::{format_amount, truncate};

use super::created_by_label;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const LINE_HEIGHT: u32 = 13;
pub(super) const ROWS_PER_PAGE: usize = 50;

const DATE_WIDTH: usize = 10;
const TYPE_WIDTH: usize = 7;
const CATEGORY_WIDTH: usize = 19;
const AMOUNT_WIDTH: usize = 16;
const DESCRIPTION_WIDTH: usize = 26;

pub(super) fn render(title: &str, records: &[Transaction]) -> Vec<u8> {
    let pages: Vec<&[Transaction]> = if records.is_empty() {
        vec![records]
    } else {
        records.chunks(ROWS_PER_PAGE).collect()
    };
    let page_count = pages.len();

    let mut doc = PdfDocument::new();
    // Fixed object numbers: 1 catalog, 2 page tree, 3 font. Each page then
    // takes two numbers: the page itself and its content stream.
    let page_ids: Vec<usize> = (0..page_count).map(|i| 4 + 2 * i).collect();

    doc.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    doc.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        ),
    );
    doc.object(
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>",
    );

    for (index, rows) in pages.iter().enumerate() {
        let page_id = page_ids[index];
        let content_id = page_id + 1;
        doc.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
            ),
        );
        let content = page_content(title, rows, index + 1, page_count, records);
        doc.stream(content_id, &content);
    }

    doc.finish()
}

fn page_content(
    title: &str,
    rows: &[Transaction],
    page: usize,
    page_count: usize,
    all: &[Transaction],
) -> String {
    let top = PAGE_HEIGHT - MARGIN;
    let mut out = String::new();

    let _ = writeln!(out, "BT /F1 14 Tf {MARGIN} {top} Td ({}) Tj ET", escape(title));

    let header = header_line();
    let rule = "-".repeat(header.len());
    let mut lines = vec![header, rule];
    if rows.is_empty() {
        lines.push("No transactions for this period.".to_string());
    }
    lines.extend(rows.iter().map(row_line));
    if page == page_count && !all.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} transactions", all.len()));
    }

    let _ = writeln!(
        out,
        "BT /F1 8 Tf {LINE_HEIGHT} TL {MARGIN} {} Td",
        top - 2 * LINE_HEIGHT
    );
    for line in &lines {
        let _ = writeln!(out, "({}) Tj T*", escape(line));
    }
    let _ = writeln!(out, "ET");

    let _ = writeln!(
        out,
        "BT /F1 8 Tf {MARGIN} {} Td (Page {page} of {page_count}) Tj ET",
        MARGIN / 2
    );
    out
}

fn header_line() -> String {
    format!(
        "{:<dw$} {:<tw$} {:<cw$} {:>aw$}  {:<sw$} {}",
        "Date",
        "Type",
        "Category",
        "Amount",
        "Description",
        "Created by",
        dw = DATE_WIDTH,
        tw = TYPE_WIDTH,
        cw = CATEGORY_WIDTH,
        aw = AMOUNT_WIDTH,
        sw = DESCRIPTION_WIDTH,
    )
}

fn row_line(txn: &Transaction) -> String {
    format!(
        "{:<dw$} {:<tw$} {:<cw$} {:>aw$}  {:<sw$} {}",
        txn.date.format("%Y-%m-%d").to_string(),
        txn.kind.as_str(),
        txn.category.as_str(),
        format_amount(txn.amount),
        truncate(&txn.description, DESCRIPTION_WIDTH),
        created_by_label(txn),
        dw = DATE_WIDTH,
        tw = TYPE_WIDTH,
        cw = CATEGORY_WIDTH,
        aw = AMOUNT_WIDTH,
        sw = DESCRIPTION_WIDTH,
    )
}

/// Escape a string for a PDF literal. The ellipsis maps to its WinAnsi code;
/// other characters outside printable ASCII become `?`.
pub(super) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{2026}' => out.push_str("\\205"),
            _ => out.push('?'),
        }
    }
    out
}

struct PdfDocument {
    buf: Vec<u8>,
    /// Byte offset of each object, indexed by object number - 1.
    offsets: Vec<usize>,
}

impl PdfDocument {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self, id: usize) {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.buf.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn object(&mut self, id: usize, body: &str) {
        self.begin(id);
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, content: &str) {
        self.begin(id);
        self.buf
            .extend_from_slice(format!("<< /Length {} >>\nstream\n", content.len()).as_bytes());
        self.buf.extend_from_slice(content.as_bytes());
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {count} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}
