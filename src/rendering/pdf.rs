use super::layout::{Color, DocumentLayout, DrawOp, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::{RequestError, Result};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};

const LAYER: &str = "Layer 1";
const PT_PER_MM: f32 = 72.0 / 25.4;
const GRID_WIDTH: f32 = 0.1;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Paints `layout` into a PDF document, one PDF page per layout page.
pub fn write_pdf(layout: &DocumentLayout, title: &str) -> Result<Vec<u8>> {
    let (document, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let fonts = Fonts {
        regular: document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_error)?,
        bold: document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_error)?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            document.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            document.get_page(page_index).get_layer(layer_index)
        };
        for op in &page.ops {
            paint(&layer, op, &fonts);
        }
    }

    document.save_to_bytes().map_err(render_error)
}

fn paint(layer: &PdfLayerReference, op: &DrawOp, fonts: &Fonts) {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            content,
        } => {
            let font = if *bold { &fonts.bold } else { &fonts.regular };
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(content.as_str(), *size, Mm(*x), Mm(PAGE_HEIGHT - *y), font);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(*width * PT_PER_MM);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(PAGE_HEIGHT - *y1)), false),
                    (Point::new(Mm(*x2), Mm(PAGE_HEIGHT - *y2)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Cell {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            layer.set_fill_color(pdf_color(*fill));
            layer.set_outline_color(pdf_color(*stroke));
            layer.set_outline_thickness(GRID_WIDTH * PT_PER_MM);
            let rect = Rect::new(
                Mm(*x),
                Mm(PAGE_HEIGHT - (*y + *height)),
                Mm(*x + *width),
                Mm(PAGE_HEIGHT - *y),
            )
            .with_mode(PaintMode::FillStroke);
            layer.add_rect(rect);
        }
    }
}

fn pdf_color(Color(r, g, b): Color) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn render_error(error: impl std::fmt::Display) -> RequestError {
    RequestError::RenderError(error.to_string())
}
