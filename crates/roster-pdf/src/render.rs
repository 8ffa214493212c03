//! Fixed A4 layout: title header, three label/value sections, page footers.

use printpdf::{
  BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
  PdfLayerIndex, PdfPageIndex,
};
use roster_core::Worker;

use crate::Result;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const LABEL_COLUMN: f32 = 58.0;
const FOOTER_Y: f32 = 12.0;

// Helvetica at 10pt fits roughly this many characters across the value
// column; used for profile-text wrapping.
const WRAP_WIDTH: usize = 86;

/// Render a worker's CV. Deterministic for a given worker: same sections,
/// same rows, same wrapping.
pub fn render_cv(worker: &Worker) -> Result<Vec<u8>> {
  let mut cv = CvDoc::new(&worker.identity.full_name)?;

  cv.title(&worker.identity.full_name);

  cv.section("Personal Data");
  cv.row("Full name", &worker.identity.full_name);
  cv.row("Document id", &worker.identity.document_id);
  cv.row("Email", &worker.identity.email);
  cv.row("Phone", &worker.identity.phone);
  cv.row("Address", &worker.identity.address);

  cv.section("Employment Data");
  cv.row("Position", &worker.position);
  cv.row("Department", &worker.department.to_string());
  cv.row("Status", &worker.status.to_string());
  cv.row("Wage", &worker.wage.to_string());
  cv.row(
    "Registered",
    &worker.registered_at.format("%Y-%m-%d").to_string(),
  );

  cv.section("Education & Profile");
  cv.row("Education level", &worker.education.to_string());
  cv.paragraph("Professional profile", &worker.profile);

  cv.finish()
}

/// Greedy word wrap at `max_chars` columns. Words longer than the width get
/// a line of their own rather than being split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
  let mut lines = Vec::new();
  let mut current = String::new();

  for word in text.split_whitespace() {
    if current.is_empty() {
      current = word.to_owned();
    } else if current.len() + 1 + word.len() <= max_chars {
      current.push(' ');
      current.push_str(word);
    } else {
      lines.push(std::mem::take(&mut current));
      current = word.to_owned();
    }
  }
  if !current.is_empty() {
    lines.push(current);
  }
  lines
}

// ─── Document builder ────────────────────────────────────────────────────────

/// Cursor-based page builder. Tracks the y position on the current page and
/// breaks to a fresh page when a line would cross the bottom margin; footers
/// are stamped once the page count is known.
struct CvDoc {
  doc:     PdfDocumentReference,
  pages:   Vec<(PdfPageIndex, PdfLayerIndex)>,
  regular: IndirectFontRef,
  bold:    IndirectFontRef,
  y:       f32,
}

impl CvDoc {
  fn new(full_name: &str) -> Result<Self> {
    let (doc, page, layer) = PdfDocument::new(
      format!("CV - {full_name}"),
      Mm(PAGE_WIDTH),
      Mm(PAGE_HEIGHT),
      "content",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    Ok(CvDoc {
      doc,
      pages: vec![(page, layer)],
      regular,
      bold,
      y: PAGE_HEIGHT - MARGIN,
    })
  }

  fn layer(&self) -> printpdf::PdfLayerReference {
    let (page, layer) = self.pages[self.pages.len() - 1];
    self.doc.get_page(page).get_layer(layer)
  }

  /// Break to a new page when fewer than `needed` millimetres remain above
  /// the footer area.
  fn ensure_room(&mut self, needed: f32) {
    if self.y - needed < MARGIN {
      let (page, layer) =
        self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
      self.pages.push((page, layer));
      self.y = PAGE_HEIGHT - MARGIN;
    }
  }

  fn title(&mut self, text: &str) {
    self.ensure_room(LINE_HEIGHT * 2.0);
    self
      .layer()
      .use_text(text, 20.0, Mm(MARGIN), Mm(self.y), &self.bold);
    self.y -= LINE_HEIGHT * 2.0;
  }

  fn section(&mut self, heading: &str) {
    self.ensure_room(LINE_HEIGHT * 2.5);
    self.y -= LINE_HEIGHT * 0.5;
    self
      .layer()
      .use_text(heading, 13.0, Mm(MARGIN), Mm(self.y), &self.bold);
    self.y -= LINE_HEIGHT * 1.5;
  }

  fn row(&mut self, label: &str, value: &str) {
    self.ensure_room(LINE_HEIGHT);
    let layer = self.layer();
    layer.use_text(label, 10.0, Mm(MARGIN), Mm(self.y), &self.bold);
    layer.use_text(value, 10.0, Mm(LABEL_COLUMN), Mm(self.y), &self.regular);
    self.y -= LINE_HEIGHT;
  }

  fn paragraph(&mut self, label: &str, text: &str) {
    self.ensure_room(LINE_HEIGHT);
    self
      .layer()
      .use_text(label, 10.0, Mm(MARGIN), Mm(self.y), &self.bold);
    self.y -= LINE_HEIGHT;

    for line in wrap_text(text, WRAP_WIDTH) {
      self.ensure_room(LINE_HEIGHT);
      self
        .layer()
        .use_text(line, 10.0, Mm(MARGIN), Mm(self.y), &self.regular);
      self.y -= LINE_HEIGHT;
    }
  }

  fn finish(self) -> Result<Vec<u8>> {
    let total = self.pages.len();
    for (number, (page, layer)) in self.pages.iter().enumerate() {
      self.doc.get_page(*page).get_layer(*layer).use_text(
        format!("Page {} of {}", number + 1, total),
        9.0,
        Mm(PAGE_WIDTH / 2.0 - 12.0),
        Mm(FOOTER_Y),
        &self.regular,
      );
    }
    Ok(self.doc.save_to_bytes()?)
  }
}
