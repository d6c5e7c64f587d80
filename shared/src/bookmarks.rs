//! Per-session bookmark map state and the map view built from it

use serde::Serialize;
use tracing::info;

use crate::error::ValidationError;
use crate::geolocation::{LocationMailbox, LocationReport};
use crate::models::{Bookmark, Coordinates};

/// Seoul City Hall
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 37.5665,
    lon: 126.9780,
};
pub const DEFAULT_ZOOM: u8 = 6;
pub const LOCATED_ZOOM: u8 = 12;

/// Everything one browser session owns. Transitions consume the context and
/// hand back the next one.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    bookmarks: Vec<Bookmark>,
    current_location: Option<Coordinates>,
    mailbox: LocationMailbox,
    location_reported: bool,
}

/// Outcome of draining the mailbox, shown once on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Warning(String),
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    #[cfg(test)]
    pub fn current_location(&self) -> Option<Coordinates> {
        self.current_location
    }

    /// Nothing stored yet: same as a fresh context.
    pub fn is_blank(&self) -> bool {
        self.bookmarks.is_empty()
            && self.current_location.is_none()
            && self.mailbox.is_empty()
            && !self.location_reported
    }

    /// True once the browser has answered at least one location request.
    pub fn location_reported(&self) -> bool {
        self.location_reported
    }

    /// Append a bookmark. On failure the caller keeps the old context.
    pub fn with_bookmark(mut self, name: &str, lat: f64, lon: f64) -> Result<Self, ValidationError> {
        let bookmark = Bookmark::new(name, lat, lon)?;
        info!("Bookmark added: {} ({}, {})", bookmark.name, lat, lon);
        self.bookmarks.push(bookmark);
        Ok(self)
    }

    pub fn cleared(mut self) -> Self {
        info!("Cleared {} bookmarks", self.bookmarks.len());
        self.bookmarks.clear();
        self
    }

    /// Store a raw browser payload for the next render.
    pub fn with_posted_location(mut self, raw: impl Into<String>) -> Self {
        self.mailbox.post(raw);
        self
    }

    /// Drain the mailbox. Garbage payloads leave the location as it was.
    pub fn with_location_report(mut self) -> (Self, Option<Notice>) {
        let Some(raw) = self.mailbox.take() else {
            return (self, None);
        };

        let notice = match LocationReport::parse(&raw) {
            Some(LocationReport::Fix(position)) => {
                self.current_location = Some(position);
                self.location_reported = true;
                Some(Notice::Success(
                    "Your current location was retrieved.".to_string(),
                ))
            }
            Some(LocationReport::Failed(reason)) => {
                self.current_location = None;
                self.location_reported = true;
                Some(Notice::Warning(format!(
                    "Could not get your location: {}",
                    reason
                )))
            }
            None => None,
        };
        (self, notice)
    }

    pub fn map_view(&self) -> MapView {
        MapView::render(self.current_location, &self.bookmarks)
    }
}

/// Minimal rectangle covering a set of points, serialised as
/// `[[min_lat, min_lon], [max_lat, max_lon]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[[f64; 2]; 2]")]
pub struct BoundingBox {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl BoundingBox {
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => BoundingBox {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => BoundingBox {
                    south_west: Coordinates {
                        lat: b.south_west.lat.min(p.lat),
                        lon: b.south_west.lon.min(p.lon),
                    },
                    north_east: Coordinates {
                        lat: b.north_east.lat.max(p.lat),
                        lon: b.north_east.lon.max(p.lon),
                    },
                },
            })
        })
    }

    pub fn as_array(&self) -> [[f64; 2]; 2] {
        [
            [self.south_west.lat, self.south_west.lon],
            [self.north_east.lat, self.north_east.lon],
        ]
    }
}

impl From<BoundingBox> for [[f64; 2]; 2] {
    fn from(b: BoundingBox) -> Self {
        b.as_array()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub tooltip: String,
    pub highlighted: bool,
}

/// What the Leaflet widget draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub bounds: Option<BoundingBox>,
}

impl MapView {
    pub fn render(current: Option<Coordinates>, bookmarks: &[Bookmark]) -> Self {
        let (center, zoom) = match current {
            Some(c) => (c, LOCATED_ZOOM),
            None => (DEFAULT_CENTER, DEFAULT_ZOOM),
        };

        let mut markers: Vec<Marker> = current
            .map(|c| Marker {
                lat: c.lat,
                lon: c.lon,
                tooltip: "Current location".to_string(),
                highlighted: true,
            })
            .into_iter()
            .collect();
        markers.extend(bookmarks.iter().map(|b| Marker {
            lat: b.position.lat,
            lon: b.position.lon,
            tooltip: b.name.clone(),
            highlighted: false,
        }));

        let bounds = BoundingBox::enclosing(
            bookmarks.iter().map(|b| b.position).chain(current),
        );

        MapView {
            center,
            zoom,
            markers,
            bounds,
        }
    }
}
