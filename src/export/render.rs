use askama::Template;

use super::layout::{
    Element, ExportDocument, LINE_HEIGHT, MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH, TIME_COLUMN_WIDTH,
    FOOTER_Y,
};

#[derive(Template)]
#[template(path = "export/itinerary.html")]
pub struct ItineraryPrintTemplate {
    pub file_name: String,
    pub page_width: f32,
    pub page_height: f32,
    pub footer_y: f32,
    pub pages: Vec<PageView>,
}

pub struct PageView {
    pub footer: String,
    pub items: Vec<ItemView>,
}

pub struct ItemView {
    pub kind: &'static str,
    pub style: String,
    pub text: String,
    pub time: String,
    pub lines: Vec<String>,
}

impl ItineraryPrintTemplate {
    pub fn from_document(document: &ExportDocument) -> Self {
        let pages = document
            .pages
            .iter()
            .map(|page| PageView {
                footer: page.footer.clone(),
                items: page.elements.iter().map(item_view).collect(),
            })
            .collect();
        Self {
            file_name: document.file_name.clone(),
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            footer_y: FOOTER_Y,
            pages,
        }
    }
}

fn item_view(element: &Element) -> ItemView {
    match element {
        Element::Text { x, y, style, text } => ItemView {
            kind: style.css_class(),
            style: format!(
                "left:{x}mm;top:{}mm;font-size:{}pt",
                y - LINE_HEIGHT,
                style.font_size()
            ),
            text: text.clone(),
            time: String::new(),
            lines: Vec::new(),
        },
        Element::Image {
            x,
            y,
            width,
            height,
            data_uri,
        } => ItemView {
            kind: "image",
            style: format!("left:{x}mm;top:{y}mm;width:{width}mm;height:{height}mm"),
            text: data_uri.clone(),
            time: String::new(),
            lines: Vec::new(),
        },
        Element::Row {
            y,
            height,
            time,
            lines,
        } => ItemView {
            kind: "row",
            style: format!(
                "left:{MARGIN_X}mm;top:{y}mm;height:{height}mm;width:{}mm;--time-width:{TIME_COLUMN_WIDTH}mm",
                PAGE_WIDTH - 2.0 * MARGIN_X
            ),
            text: String::new(),
            time: time.clone(),
            lines: lines.clone(),
        },
    }
}
