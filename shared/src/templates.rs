use askama::Template;

use crate::bookmarks::{MapView, Notice};
use crate::charts::{script_json, thousands};
use crate::models::{Bookmark, StockBar};

/// One `<option>` of a page selector
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<'a, I>(values: I, selected: &str) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .map(|v| SelectOption {
                value: v.to_string(),
                label: v.to_string(),
                selected: v == selected,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BookmarkRow {
    pub name: String,
    pub lat: String,
    pub lon: String,
}

impl From<&Bookmark> for BookmarkRow {
    fn from(b: &Bookmark) -> Self {
        Self {
            name: b.name.clone(),
            lat: format!("{:.6}", b.position.lat),
            lon: format!("{:.6}", b.position.lon),
        }
    }
}

/// Values echoed back into the add form
#[derive(Debug, Clone)]
pub struct BookmarkFormValues {
    pub name: String,
    pub lat: String,
    pub lon: String,
}

impl Default for BookmarkFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            lat: "37.566500".to_string(),
            lon: "126.978000".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "bookmark_map.html")]
pub struct BookmarkMapTemplate {
    pub active: &'static str,
    pub success: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub bookmarks: Vec<BookmarkRow>,
    pub map_json: String,
    pub request_location: bool,
    pub form: BookmarkFormValues,
}

impl BookmarkMapTemplate {
    pub fn new(
        view: &MapView,
        bookmarks: &[Bookmark],
        notice: Option<Notice>,
        error: Option<String>,
        request_location: bool,
        form: BookmarkFormValues,
    ) -> Result<Self, serde_json::Error> {
        let (success, warning) = match notice {
            Some(Notice::Success(msg)) => (Some(msg), None),
            Some(Notice::Warning(msg)) => (None, Some(msg)),
            None => (None, None),
        };
        Ok(Self {
            active: "map",
            success,
            warning,
            error,
            bookmarks: bookmarks.iter().map(BookmarkRow::from).collect(),
            map_json: script_json(view)?,
            request_location,
            form,
        })
    }
}

#[derive(Template)]
#[template(path = "population.html")]
pub struct PopulationTemplate {
    pub active: &'static str,
    pub regions: Vec<SelectOption>,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub figure_json: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PriceRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl From<&StockBar> for PriceRow {
    fn from(bar: &StockBar) -> Self {
        Self {
            date: bar.date.to_string(),
            open: format!("{:.2}", bar.open),
            high: format!("{:.2}", bar.high),
            low: format!("{:.2}", bar.low),
            close: format!("{:.2}", bar.close),
            volume: thousands(bar.volume),
        }
    }
}

#[derive(Template)]
#[template(path = "stocks.html")]
pub struct StocksTemplate {
    pub active: &'static str,
    pub companies: Vec<SelectOption>,
    pub heading: String,
    pub fetch_error: Option<String>,
    pub figure_json: Option<String>,
    pub rows: Vec<PriceRow>,
}
