use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{
    charts,
    stocks::{company_or_default, COMPANIES},
    templates::{
        BookmarkFormValues, BookmarkMapTemplate, PopulationTemplate, PriceRow, SelectOption,
        StocksTemplate,
    },
    Notice, SessionContext, ValidationError,
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

/// Rows shown in the price table
const TABLE_ROWS: usize = 100;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn render_map(
    ctx: &SessionContext,
    notice: Option<Notice>,
    error: Option<String>,
    form: BookmarkFormValues,
) -> Result<Html<String>, ApiError> {
    let page = BookmarkMapTemplate::new(
        &ctx.map_view(),
        ctx.bookmarks(),
        notice,
        error,
        !ctx.location_reported(),
        form,
    )?;
    Ok(Html(page.render()?))
}

pub async fn map_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ApiError> {
    let (jar, sid) = session::resolve(jar);

    let (ctx, notice) = state
        .sessions
        .update(sid, |ctx| {
            let (next, notice) = ctx.with_location_report();
            (next.clone(), (next, notice))
        })
        .await;

    let html = render_map(&ctx, notice, None, BookmarkFormValues::default())?;
    Ok((jar, html))
}

#[derive(Debug, Deserialize)]
pub struct BookmarkForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

pub async fn add_bookmark(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<BookmarkForm>,
) -> Result<Response, ApiError> {
    let (jar, sid) = session::resolve(jar);

    let parsed = parse_coordinate("latitude", &form.lat)
        .and_then(|lat| Ok((lat, parse_coordinate("longitude", &form.lon)?)));

    let outcome = state
        .sessions
        .update(sid, |ctx| {
            let added = parsed.and_then(|(lat, lon)| ctx.clone().with_bookmark(&form.name, lat, lon));
            match added {
                Ok(next) => (next, Ok(())),
                Err(e) => {
                    let snapshot = ctx.clone();
                    (ctx, Err((e, snapshot)))
                }
            }
        })
        .await;

    match outcome {
        Ok(()) => Ok((jar, Redirect::to("/map")).into_response()),
        Err((e, ctx)) => {
            warn!("Rejected bookmark {:?}: {}", form.name, e);
            let message = format!(
                "Enter a place name and a valid latitude (-90..90) / longitude (-180..180): {}",
                e
            );
            let values = BookmarkFormValues {
                name: form.name,
                lat: form.lat,
                lon: form.lon,
            };
            let html = render_map(&ctx, None, Some(message), values)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, jar, html).into_response())
        }
    }
}

pub async fn clear_bookmarks(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, sid) = session::resolve(jar);
    state.sessions.update(sid, |ctx| (ctx.cleared(), ())).await;
    (jar, Redirect::to("/map"))
}

/// Browser geolocation callback. The payload is only parsed at the next render.
pub async fn post_geolocation(
    State(state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> (CookieJar, StatusCode) {
    let (jar, sid) = session::resolve(jar);
    state
        .sessions
        .update(sid, |ctx| (ctx.with_posted_location(body), ()))
        .await;
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PopulationQuery {
    pub region: Option<String>,
}

pub async fn population_page(
    State(state): State<AppState>,
    Query(query): Query<PopulationQuery>,
) -> Result<Html<String>, ApiError> {
    let service = state.population.clone();
    let path = state.config.population_csv_path.clone();
    let loaded = tokio::task::spawn_blocking(move || service.load(&path)).await?;

    let mut page = PopulationTemplate {
        active: "population",
        regions: Vec::new(),
        error: None,
        warning: None,
        figure_json: None,
    };

    match loaded {
        Err(e) => page.error = Some(e.to_string()),
        Ok(table) => {
            let requested = query.region.as_deref().filter(|r| !r.is_empty());
            let row = match requested.and_then(|r| table.region(r)) {
                Some(row) => Some(row),
                None => {
                    let first = table.first();
                    if let (Some(r), Some(first)) = (requested, first) {
                        page.warning = Some(format!(
                            "Unknown region {:?}, showing {} instead.",
                            r, first.region
                        ));
                    }
                    first
                }
            };

            if let Some(row) = row {
                page.regions = SelectOption::list(table.regions(), &row.region);
                let figure = charts::population_pyramid(table.ages(), row);
                page.figure_json = Some(charts::script_json(&figure)?);
            }
        }
    }

    Ok(Html(page.render()?))
}

#[derive(Debug, Deserialize)]
pub struct StocksQuery {
    pub company: Option<String>,
}

pub async fn stocks_page(
    State(state): State<AppState>,
    Query(query): Query<StocksQuery>,
) -> Result<Html<String>, ApiError> {
    let (company, ticker) = company_or_default(query.company.as_deref());
    info!("Stock viewer: {} ({})", company, ticker);

    let outcome = state.stocks.fetch(ticker, &state.config.stock_period).await;

    let figure_json = if outcome.series.is_empty() {
        None
    } else {
        let figure = charts::price_history(company, ticker, &outcome.series);
        Some(charts::script_json(&figure)?)
    };

    let page = StocksTemplate {
        active: "stocks",
        companies: SelectOption::list(COMPANIES.iter().map(|(name, _)| *name), company),
        heading: format!("{} ({})", company, ticker),
        fetch_error: outcome.warning,
        figure_json,
        rows: outcome
            .series
            .tail_newest_first(TABLE_ROWS)
            .into_iter()
            .map(PriceRow::from)
            .collect(),
    };

    Ok(Html(page.render()?))
}
