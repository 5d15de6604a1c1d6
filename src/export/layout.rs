use serde::Serialize;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_X: f32 = 14.0;
pub const TOP_Y: f32 = 20.0;
/// Content past this line moves to a new page.
pub const PAGE_BREAK_Y: f32 = 270.0;
pub const FOOTER_Y: f32 = 290.0;
pub const TIME_COLUMN_WIDTH: f32 = 20.0;
pub const ROW_BASE_HEIGHT: f32 = 8.0;
pub const LINE_HEIGHT: f32 = 5.0;
pub const COVER_HEIGHT: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Title,
    Subtitle,
    DayHeading,
    Muted,
}

impl TextStyle {
    pub fn font_size(&self) -> f32 {
        match self {
            TextStyle::Title => 24.0,
            TextStyle::Subtitle => 12.0,
            TextStyle::DayHeading => 14.0,
            TextStyle::Muted => 10.0,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TextStyle::Title => "title",
            TextStyle::Subtitle => "subtitle",
            TextStyle::DayHeading => "day-heading",
            TextStyle::Muted => "muted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        style: TextStyle,
        text: String,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        data_uri: String,
    },
    Row {
        y: f32,
        height: f32,
        time: String,
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub elements: Vec<Element>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub file_name: String,
    pub pages: Vec<Page>,
}

#[derive(Debug)]
pub(crate) struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                elements: Vec::new(),
                footer: String::new(),
            }],
            y: TOP_Y,
        }
    }

    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub(crate) fn advance(&mut self, by: f32) {
        self.y += by;
    }

    pub(crate) fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            elements: Vec::new(),
            footer: String::new(),
        });
        self.y = TOP_Y;
    }

    pub(crate) fn ensure_room(&mut self, height: f32) {
        if self.y + height > PAGE_BREAK_Y {
            self.new_page();
        }
    }

    pub(crate) fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    pub(crate) fn finish(self) -> Vec<Page> {
        let total = self.pages.len();
        self.pages
            .into_iter()
            .map(|mut page| {
                page.footer = format!("Page {} of {}", page.number, total);
                page
            })
            .collect()
    }
}
