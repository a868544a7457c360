//! Page composition.
//!
//! Produces a backend-independent list of drawing operations per page.
//! Coordinates are millimetres from the top-left corner of a landscape A4 page;
//! text `y` is the baseline.

use super::metrics::{line_height, text_width, wrap_text};
use crate::domain::money::{Money, NumberLocale};
use crate::domain::request::{LineItem, RequestRecord};

pub const PAGE_WIDTH: f32 = 297.0;
pub const PAGE_HEIGHT: f32 = 210.0;

const TOP: f32 = 15.0;
const BOTTOM: f32 = PAGE_HEIGHT - 10.0;
const CENTER: f32 = PAGE_WIDTH / 2.0;
const LEFT: f32 = 15.0;
const SECOND_COLUMN: f32 = 150.0;
const TABLE_LEFT: f32 = 14.0;
const CELL_PADDING: f32 = 2.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 8.0;
const CLIENT_SIZE: f32 = 7.0;
const DISCLAIMER_WIDTH: f32 = 270.0;

pub const PLACEHOLDER: &str = "-";
pub const TOTAL_LABEL: &str = "TOTAL";
pub const SIGNATURE_CAPTION: &str = "Signature of Requester / Approver";
/// Legal text kept in its original wording, whatever the language of the rest of the page.
pub const DISCLAIMER: &str = "(*) Declaro que caso não preste as contas devidas no prazo de 30(trinta) dias contados a partir da presente data ou no mesmo prazo haja saldo devedor em aberto, fica autorizado o desconto do valor devido em folha de pagamento ou no Termo de Rescisão do Contrato de Trabalho, conforme artigo 462 da CLT.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    pub const WARNING: Self = Self(200, 0, 0);
    pub const HEADER: Self = Self(22, 78, 99);
    pub const GRID: Self = Self(200, 200, 200);
    pub const SHADE: Self = Self(240, 240, 240);
    pub const TOTAL_SHADE: Self = Self(220, 220, 220);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Color,
        content: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        /// Stroke width in millimetres.
        width: f32,
        color: Color,
    },
    /// A filled and stroked table cell; `y` is its top edge.
    Cell {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Color,
        stroke: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    /// Sum of the line totals of the rendered rows.
    pub grand_total: Money,
}

impl DocumentLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

struct Column {
    title: &'static str,
    width: f32,
    align: Align,
}

static COLUMNS: [Column; 9] = [
    Column { title: "Date", width: 22.0, align: Align::Left },
    Column { title: "Detail", width: 62.0, align: Align::Left },
    Column { title: "Category", width: 28.0, align: Align::Left },
    Column { title: "Amount (R$)", width: 25.0, align: Align::Right },
    Column { title: "Distance (km)", width: 18.0, align: Align::Right },
    Column { title: "Rate/km", width: 22.0, align: Align::Right },
    Column { title: "Distance Total", width: 28.0, align: Align::Right },
    Column { title: "Line Total", width: 28.0, align: Align::Right },
    Column { title: "Bill to Client", width: 36.0, align: Align::Center },
];

#[derive(Clone)]
struct Cell {
    lines: Vec<String>,
    size: f32,
    bold: bool,
    fill: Color,
    text: Color,
}

impl Cell {
    fn new(column: &Column, content: &str) -> Self {
        Self::styled(column, content, TABLE_SIZE, false)
    }

    fn styled(column: &Column, content: &str, size: f32, bold: bool) -> Self {
        Self {
            lines: wrap_text(content, column.width - 2.0 * CELL_PADDING, size, bold),
            size,
            bold,
            fill: Color::WHITE,
            text: Color::BLACK,
        }
    }

    fn shaded(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    fn height(&self) -> f32 {
        self.lines.len() as f32 * line_height(self.size) + 2.0 * CELL_PADDING
    }

    /// How many lines fit in a cell `available` millimetres tall.
    fn lines_within(&self, available: f32) -> usize {
        ((available - 2.0 * CELL_PADDING) / line_height(self.size))
            .floor()
            .max(0.0) as usize
    }

    /// Moves the first `count` lines into a cell of the same style.
    fn take_lines(&mut self, count: usize) -> Cell {
        let count = count.min(self.lines.len());
        Cell {
            lines: self.lines.drain(..count).collect(),
            size: self.size,
            bold: self.bold,
            fill: self.fill,
            text: self.text,
        }
    }
}

/// Builds the page layout of one request.
pub fn compose(record: &RequestRecord, items: &[LineItem], locale: NumberLocale) -> DocumentLayout {
    let mut composer = Composer::new();
    composer.header(record);

    let mut grand_total = Money::ZERO;
    let mut rows = Vec::with_capacity(items.len() + 1);
    for item in items {
        grand_total += item.line_total;
        rows.push(item_row(item, locale));
    }
    rows.push(total_row(grand_total, locale));

    composer.table(&rows);
    composer.disclaimer();
    composer.signature();

    DocumentLayout {
        pages: composer.pages,
        grand_total,
    }
}

fn item_row(item: &LineItem, locale: NumberLocale) -> Vec<Cell> {
    let bill = match &item.bill_to_client {
        Some(client) => format!("YES\n({client})"),
        None => "NO".to_string(),
    };
    vec![
        Cell::new(&COLUMNS[0], &item.date),
        Cell::new(&COLUMNS[1], &item.detail),
        Cell::new(&COLUMNS[2], &item.category.to_string()),
        Cell::new(&COLUMNS[3], &locale.format_amount(item.amount)),
        Cell::new(&COLUMNS[4], &locale.format_distance(item.distance)),
        Cell::new(&COLUMNS[5], &locale.format_amount(item.rate)),
        Cell::new(&COLUMNS[6], &locale.format_amount(item.distance_amount)),
        Cell::styled(&COLUMNS[7], &locale.format_amount(item.line_total), TABLE_SIZE, true)
            .shaded(Color::SHADE),
        Cell::styled(&COLUMNS[8], &bill, CLIENT_SIZE, false),
    ]
}

fn total_row(total: Money, locale: NumberLocale) -> Vec<Cell> {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let content = match index {
                6 => TOTAL_LABEL.to_string(),
                7 => locale.format_amount(total),
                _ => String::new(),
            };
            Cell::styled(column, &content, TABLE_SIZE, true).shaded(Color::TOTAL_SHADE)
        })
        .collect()
}

fn header_row() -> Vec<Cell> {
    COLUMNS
        .iter()
        .map(|column| {
            let mut cell = Cell::styled(column, column.title, TABLE_SIZE, true).shaded(Color::HEADER);
            cell.text = Color::WHITE;
            cell
        })
        .collect()
}

struct Composer {
    pages: Vec<Page>,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP,
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = TOP;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= BOTTOM
    }

    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, color: Color, content: impl Into<String>) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            content: content.into(),
        });
    }

    fn label(&mut self, x: f32, y: f32, content: impl Into<String>) {
        self.text(x, y, BODY_SIZE, false, Color::BLACK, content);
    }

    fn centered(&mut self, y: f32, size: f32, bold: bool, content: &str) {
        let x = CENTER - text_width(content, size, bold) / 2.0;
        self.text(x, y, size, bold, Color::BLACK, content);
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, width: f32) {
        self.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            width,
            color: Color::BLACK,
        });
    }

    fn header(&mut self, record: &RequestRecord) {
        self.centered(20.0, 16.0, true, record.kind.title());
        self.rule(10.0, PAGE_WIDTH - 10.0, 25.0, 0.5);

        self.label(LEFT, 35.0, format!("Requester: {}", record.requester));
        self.label(SECOND_COLUMN, 35.0, format!("Date: {}", record.request_date));
        self.label(LEFT, 42.0, format!("Beneficiary: {}", or_placeholder(Some(record.beneficiary.as_str()))));
        self.label(LEFT, 49.0, format!("Department: {}", record.department));
        self.label(LEFT, 56.0, format!("Tax ID (CPF/CNPJ): {}", record.tax_id));

        self.text(LEFT, 66.0, BODY_SIZE, true, Color::BLACK, "BANKING DATA / PIX");
        self.label(LEFT, 72.0, format!("Bank: {}", or_placeholder(record.bank.as_deref())));
        self.label(100.0, 72.0, format!("Branch: {}", or_placeholder(record.branch.as_deref())));
        self.label(160.0, 72.0, format!("Account: {}", or_placeholder(record.account.as_deref())));
        self.label(LEFT, 78.0, format!("PIX Key: {}", or_placeholder(record.pix_key.as_deref())));

        self.label(
            LEFT,
            88.0,
            format!("Urgency: {}", record.urgency.label().to_uppercase()),
        );
        self.label(SECOND_COLUMN, 88.0, format!("Payment Date: {}", record.payment_date));

        self.y = 98.0;
    }

    /// Draws the header row and `rows`, repeating the header on every page.
    ///
    /// A row taller than a whole page is split across pages line by line.
    fn table(&mut self, rows: &[Vec<Cell>]) {
        let header = header_row();
        let header_height = row_height(&header);
        let page_room = BOTTOM - TOP - header_height;
        let first_height = match rows.first().map(|row| row_height(row)) {
            Some(height) if height <= page_room => height,
            Some(_) => line_height(TABLE_SIZE) + 2.0 * CELL_PADDING,
            None => 0.0,
        };
        if !self.fits(header_height + first_height) {
            self.new_page();
        }
        self.row(&header);

        for row in rows {
            let height = row_height(row);
            if self.fits(height) {
                self.row(row);
            } else if height <= page_room {
                self.new_page();
                self.row(&header);
                self.row(row);
            } else {
                self.split_row(row, &header);
            }
        }
    }

    fn split_row(&mut self, row: &[Cell], header: &[Cell]) {
        let mut remaining = row.to_vec();
        let mut fresh_page = false;
        loop {
            let available = BOTTOM - self.y;
            let segment: Vec<Cell> = remaining
                .iter_mut()
                .map(|cell| {
                    let count = cell.lines_within(available).max(usize::from(fresh_page));
                    cell.take_lines(count)
                })
                .collect();
            if segment.iter().any(|cell| !cell.lines.is_empty()) {
                self.row(&segment);
            }
            if remaining.iter().all(|cell| cell.lines.is_empty()) {
                break;
            }
            self.new_page();
            self.row(header);
            fresh_page = true;
        }
    }

    fn row(&mut self, cells: &[Cell]) {
        let height = row_height(cells);
        let top = self.y;
        let mut x = TABLE_LEFT;
        for (column, cell) in COLUMNS.iter().zip(cells) {
            self.push(DrawOp::Cell {
                x,
                y: top,
                width: column.width,
                height,
                fill: cell.fill,
                stroke: Color::GRID,
            });

            let leading = line_height(cell.size);
            let block = cell.lines.len() as f32 * leading;
            let mut baseline = top + (height - block) / 2.0 + leading * 0.78;
            for line in &cell.lines {
                let width = text_width(line, cell.size, cell.bold);
                let text_x = match column.align {
                    Align::Left => x + CELL_PADDING,
                    Align::Center => x + (column.width - width) / 2.0,
                    Align::Right => x + column.width - CELL_PADDING - width,
                };
                if !line.is_empty() {
                    self.text(text_x, baseline, cell.size, cell.bold, cell.text, line.as_str());
                }
                baseline += leading;
            }
            x += column.width;
        }
        self.y = top + height;
    }

    fn disclaimer(&mut self) {
        let leading = line_height(TABLE_SIZE);
        self.y += 10.0;
        for line in wrap_text(DISCLAIMER, DISCLAIMER_WIDTH, TABLE_SIZE, false) {
            if !self.fits(0.0) {
                self.new_page();
                self.y += leading;
            }
            let y = self.y;
            self.text(LEFT, y, TABLE_SIZE, false, Color::WARNING, line);
            self.y += leading;
        }
    }

    fn signature(&mut self) {
        self.y += 20.0;
        if !self.fits(6.0) {
            self.new_page();
            self.y += 20.0;
        }
        let y = self.y;
        self.rule(100.0, 197.0, y, 0.2);
        self.centered(y + 5.0, TABLE_SIZE, false, SIGNATURE_CAPTION);
        self.y += 6.0;
    }
}

fn row_height(cells: &[Cell]) -> f32 {
    cells.iter().map(Cell::height).fold(0.0, f32::max)
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER,
    }
}
