use std::io::BufWriter;

use printpdf::*;

use crate::error::{OutlayError, Result};
use crate::export::{report_date, MonthReport, REPORT_TITLE};
use crate::fmt::money_code_prefixed;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 18.0;
const MARGIN_RIGHT: f32 = 18.0;
const ROW_H: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 8.0;
const DESCRIPTION_CHARS: usize = 40;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const COLS: [Col; 4] = [
    Col { width: 28.0, align: Align::Left },
    Col { width: 32.0, align: Align::Left },
    Col { width: 38.0, align: Align::Right },
    Col { width: 76.0, align: Align::Left },
];
const HEADERS: [&str; 4] = ["Date", "Category", "Amount", "Description"];
/// Gap between the right-aligned amount and the description column.
const AMOUNT_GAP: f32 = 6.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| OutlayError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| OutlayError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            pages: vec![(page, layer)],
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.pages.len() - 1];
        self.doc.get_page(page).get_layer(layer)
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.pages.push((page, layer));
        self.y = MARGIN_TOP;
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer().use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        });
    }

    fn header(&mut self, month_label: &str, total: &str) {
        self.text(REPORT_TITLE, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 8.0;
        self.text(month_label, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 6.0;
        self.text(&format!("Total: {total}"), MARGIN_LEFT, SUBTITLE_SIZE, true);
        self.y += 6.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 6.0;
    }

    fn row(&mut self, values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in COLS.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - AMOUNT_GAP - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn table_header(&mut self) {
        self.row(&HEADERS, true);
        self.y -= ROW_H - 1.5;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += ROW_H - 1.5;
    }

    /// Stamp `Page n of N` on every page once the page count is known.
    fn footers(&mut self) {
        let count = self.pages.len();
        self.y = PAGE_H - MARGIN_BOTTOM / 2.0;
        for (i, (page, layer)) in self.pages.iter().enumerate() {
            let label = format!("Page {} of {count}", i + 1);
            let x = PAGE_W - MARGIN_RIGHT - approx_text_width(&label, FOOTER_SIZE);
            self.doc
                .get_page(*page)
                .get_layer(*layer)
                .use_text(label, FOOTER_SIZE, Mm(x), Mm(self.pdf_y()), &self.font);
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| OutlayError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| OutlayError::Pdf(e.to_string()))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{cut}...")
    }
}

/// Render a month report. Amounts carry the currency code rather than the
/// symbol since the builtin fonts only cover Latin-1.
pub fn render_month(report: &MonthReport) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(REPORT_TITLE)?;
    let total = money_code_prefixed(report.total, report.currency);
    pdf.header(&report.month.label(), &total);

    for (i, rows) in report.pages().into_iter().enumerate() {
        if i > 0 {
            pdf.new_page();
        }
        pdf.table_header();
        if rows.is_empty() {
            pdf.text("No expenses recorded.", MARGIN_LEFT, FONT_SIZE, false);
        }
        for e in rows {
            let date = report_date(e);
            let amount = money_code_prefixed(e.amount, report.currency);
            let description = truncate(e.description.as_deref().unwrap_or("-"), DESCRIPTION_CHARS);
            pdf.row(&[&date, e.category.label(), &amount, &description], false);
        }
    }
    pdf.footers();
    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::currency::by_code;
    use crate::models::{Category, Expense};
    use crate::period::YearMonth;

    fn expenses(n: i64) -> Vec<Expense> {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        (1..=n)
            .map(|id| Expense {
                id,
                amount: 12.5 * id as f64,
                category: Category::ALL[id as usize % Category::ALL.len()],
                description: Some(format!("item {id}")),
                date: NaiveDate::from_ymd_opt(2025, 3, (id as u32 % 28) + 1).unwrap(),
                created_at: ts,
                updated_at: ts,
            })
            .collect()
    }

    fn render(n: i64) -> Vec<u8> {
        let report = MonthReport::new(
            YearMonth { year: 2025, month: 3 },
            by_code("INR").unwrap(),
            &expenses(n),
        );
        render_month(&report).unwrap()
    }

    #[test]
    fn test_render_month_produces_pdf() {
        let bytes = render(3);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_month_multiple_pages() {
        let bytes = render(60);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > render(3).len());
    }

    #[test]
    fn test_render_empty_month() {
        assert!(render(0).starts_with(b"%PDF"));
    }

    #[test]
    fn test_truncate_long_descriptions() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
