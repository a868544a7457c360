//! Printable request document.
//!
//! Rendering happens in two steps: [`layout::compose`] decides what goes where
//! (and paginates), [`pdf::write_pdf`] paints the result with `printpdf`.

pub mod layout;
pub mod metrics;
pub mod pdf;

use crate::domain::money::{Money, NumberLocale};
use crate::domain::request::{LineItem, RequestRecord};
use crate::error::Result;
use layout::DocumentLayout;

/// A finished document ready to be attached.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub grand_total: Money,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer {
    locale: NumberLocale,
}

impl DocumentRenderer {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    pub fn layout(&self, record: &RequestRecord, items: &[LineItem]) -> DocumentLayout {
        layout::compose(record, items, self.locale)
    }

    pub fn render(&self, record: &RequestRecord, items: &[LineItem]) -> Result<RenderedDocument> {
        let layout = self.layout(record, items);
        let bytes = pdf::write_pdf(&layout, record.kind.title())?;
        Ok(RenderedDocument {
            bytes,
            grand_total: layout.grand_total,
            page_count: layout.pages.len(),
        })
    }
}
