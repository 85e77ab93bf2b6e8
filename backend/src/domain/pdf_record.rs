//! Printable vaccine record rendered with `pdf-writer`.
//!
//! Pages are A4 with the built-in Helvetica font. The table is grouped by
//! milestone and continues on new pages when it runs out of room.

use chrono::NaiveDate;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::domain::export_service::{format_record_date, RecordGroup};

/// Everything printed on the record
#[derive(Debug, Clone)]
pub struct VaccineRecordDocument {
    pub child_name: String,
    pub parent_name: String,
    pub dob: NaiveDate,
    pub country: String,
    pub generated_on: NaiveDate,
    pub overdue: u32,
    pub due_soon: u32,
    pub completed: u32,
    pub groups: Vec<RecordGroup>,
}

const TITLE: &str = "Vaccination Record";
const EMPTY_SCHEDULE: &str = "No vaccination schedule available.";
const HEADERS: [&str; 3] = ["Vaccine", "Status", "Date"];

struct RecordPdf {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    bold_font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,
    col_widths: [f32; 3],
}

impl RecordPdf {
    fn new() -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        // Text is written as single bytes, so the fonts need WinAnsi to show accented letters
        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            bold_font_id,
            page_refs: Vec::new(),
            next_id: 5,

            page_w: 595.0,
            page_h: 842.0,
            margin: 50.0,
            row_h: 18.0,
            col_widths: [245.0, 110.0, 140.0],
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn table_width(&self) -> f32 {
        self.col_widths.iter().sum()
    }

    /// Write a finished page with its content stream
    fn push_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
                .contents(content_id);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(b"F1"), self.font_id);
            fonts.pair(Name(b"F2"), self.bold_font_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    fn draw_text(content: &mut Content, font: &[u8], x: f32, y: f32, size: f32, text: &str) {
        let encoded = encode_text(text);
        content.begin_text();
        content.set_font(Name(font), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn fill_band(&self, content: &mut Content, y: f32, gray: f32) {
        content.save_state();
        content.set_fill_rgb(gray, gray, gray);
        content.rect(self.margin, y, self.table_width(), self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(&self, content: &mut Content, y: f32, cells: &[&str], font: &[u8]) {
        let mut x = self.margin;
        for (cell, width) in cells.iter().zip(self.col_widths.iter()) {
            Self::draw_text(content, font, x + 4.0, y + 5.0, 10.0, cell);
            content.save_state();
            content.set_stroke_rgb(0.75, 0.75, 0.75);
            content.rect(x, y, *width, self.row_h);
            content.stroke();
            content.restore_state();
            x += width;
        }
    }

    fn draw_footer(&self, content: &mut Content, page: usize) {
        let label = format!("Page {}", page);
        Self::draw_text(content, b"F1", self.page_w - self.margin - 40.0, self.margin - 30.0, 9.0, &label);
    }

    /// Header block of the first page; returns the y position below it
    fn draw_header(&self, content: &mut Content, doc: &VaccineRecordDocument) -> f32 {
        let mut y = self.page_h - self.margin;
        Self::draw_text(content, b"F2", self.margin, y, 18.0, TITLE);
        y -= 28.0;

        let lines = [
            format!("Child: {}", doc.child_name),
            format!("Parent: {}", doc.parent_name),
            format!("Date of birth: {}", format_record_date(doc.dob)),
            format!("Country: {}", doc.country),
            format!("Generated: {}", format_record_date(doc.generated_on)),
        ];
        for line in &lines {
            Self::draw_text(content, b"F1", self.margin, y, 11.0, line);
            y -= 16.0;
        }

        y -= 6.0;
        let summary = format!(
            "Overdue: {}    Due Soon: {}    Complete: {}",
            doc.overdue, doc.due_soon, doc.completed
        );
        Self::draw_text(content, b"F2", self.margin, y, 11.0, &summary);
        y - 28.0
    }

    fn draw_table_header(&self, content: &mut Content, y: f32) {
        self.fill_band(content, y, 0.85);
        self.draw_row(content, y, &HEADERS, b"F2");
    }

    fn render(mut self, doc: &VaccineRecordDocument) -> Vec<u8> {
        let mut page_no = 1;
        let mut content = Content::new();
        let mut y = self.draw_header(&mut content, doc);

        if doc.groups.is_empty() {
            Self::draw_text(&mut content, b"F1", self.margin, y, 11.0, EMPTY_SCHEDULE);
        } else {
            self.draw_table_header(&mut content, y);
            y -= self.row_h;

            for group in &doc.groups {
                // Keep a heading together with at least one of its rows
                let rows: Vec<[String; 3]> = group
                    .rows
                    .iter()
                    .map(|row| {
                        [
                            row.vaccine.clone(),
                            row.status.label().to_string(),
                            format_record_date(row.date),
                        ]
                    })
                    .collect();
                let lines = std::iter::once(None).chain(rows.iter().map(Some));

                for (i, line) in lines.enumerate() {
                    let needed = if i == 0 { 2.0 * self.row_h } else { self.row_h };
                    if y - needed < self.margin {
                        self.draw_footer(&mut content, page_no);
                        self.push_page(content);
                        page_no += 1;
                        content = Content::new();
                        y = self.page_h - self.margin;
                        Self::draw_text(&mut content, b"F2", self.margin, y, 12.0, &format!("{} (continued)", TITLE));
                        y -= 28.0;
                        self.draw_table_header(&mut content, y);
                        y -= self.row_h;
                    }

                    match line {
                        None => {
                            self.fill_band(&mut content, y, 0.93);
                            Self::draw_text(&mut content, b"F2", self.margin + 4.0, y + 5.0, 10.0, &group.age);
                        }
                        Some(cells) => {
                            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
                            self.draw_row(&mut content, y, &cells, b"F1");
                        }
                    }
                    y -= self.row_h;
                }
            }
        }

        self.draw_footer(&mut content, page_no);
        self.push_page(content);

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        {
            let mut pages = self.pdf.pages(self.pages_id);
            pages.count(self.page_refs.len() as i32);
            pages.kids(self.page_refs.iter().copied());
        }

        self.pdf.finish()
    }
}

/// Helvetica uses a single-byte encoding; characters outside Latin-1 become `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u8::try_from(u32::from(ch)) {
            // WinAnsi puts other glyphs where Latin-1 has C1 controls
            Ok(byte) if !(0x80..0xA0).contains(&byte) => byte,
            _ => b'?',
        })
        .collect()
}

/// Render the record as PDF bytes
pub fn render_vaccine_record(doc: &VaccineRecordDocument) -> Vec<u8> {
    RecordPdf::new().render(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::export_service::{RecordRow, RecordStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    fn document(groups: Vec<RecordGroup>) -> VaccineRecordDocument {
        VaccineRecordDocument {
            child_name: "NoPI Kid".to_string(),
            parent_name: "PDF Parent".to_string(),
            dob: date(2024, 1, 1),
            country: "UK".to_string(),
            generated_on: date(2026, 2, 17),
            overdue: 1,
            due_soon: 0,
            completed: 2,
            groups,
        }
    }

    #[test]
    fn test_record_contains_core_text() {
        let groups = vec![RecordGroup {
            age: "8 Weeks".to_string(),
            rows: vec![RecordRow {
                vaccine: "MMR".to_string(),
                status: RecordStatus::Due,
                date: date(2026, 1, 1),
            }],
        }];

        let bytes = render_vaccine_record(&document(groups));

        assert!(bytes.starts_with(b"%PDF-"));
        for text in [
            "Vaccination Record",
            "Child: NoPI Kid",
            "Parent: PDF Parent",
            "Overdue: 1",
            "Due Soon: 0",
            "Complete: 2",
            "8 Weeks",
            "MMR",
            "01 Jan 2026",
        ] {
            assert!(contains(&bytes, text), "missing {:?}", text);
        }
        assert!(!contains(&bytes, EMPTY_SCHEDULE));
    }

    #[test]
    fn test_empty_schedule_message() {
        let bytes = render_vaccine_record(&document(Vec::new()));
        assert!(contains(&bytes, "No vaccination schedule available."));
    }

    #[test]
    fn test_long_schedules_paginate() {
        let groups: Vec<RecordGroup> = (0..20)
            .map(|i| RecordGroup {
                age: format!("{} Months", i),
                rows: (0..5)
                    .map(|j| RecordRow {
                        vaccine: format!("Vaccine {}-{}", i, j),
                        status: RecordStatus::Overdue,
                        date: date(2025, 1, 1),
                    })
                    .collect(),
            })
            .collect();

        let bytes = render_vaccine_record(&document(groups));

        assert!(contains(&bytes, "Page 2"));
        assert!(contains(&bytes, "Vaccination Record (continued)"));
        assert!(contains(&bytes, "Vaccine 19-4"));
    }

    #[test]
    fn test_fonts_use_win_ansi_encoding() {
        let mut doc = document(Vec::new());
        doc.child_name = "Zoë".to_string();

        let bytes = render_vaccine_record(&doc);

        let encodings = bytes
            .windows(b"/WinAnsiEncoding".len())
            .filter(|w| *w == b"/WinAnsiEncoding")
            .count();
        assert_eq!(encodings, 2);
    }

    #[test]
    fn test_encode_text_replaces_wide_characters() {
        assert_eq!(encode_text("Zoë"), vec![b'Z', b'o', 0xEB]);
        assert_eq!(encode_text("आ"), vec![b'?']);
        assert_eq!(encode_text("a\u{0085}"), vec![b'a', b'?']);
    }
}
