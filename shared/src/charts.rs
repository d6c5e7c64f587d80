//! Plotly figure descriptions for the chart pages

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{PopulationRow, StockSeries};

/// `1234567` -> `"1,234,567"`
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Serialise for embedding inside a `<script>` element.
pub fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// Diverging horizontal bars: males to the left, females to the right.
pub fn population_pyramid(ages: &[String], row: &PopulationRow) -> Value {
    let male: Vec<i64> = row.male.iter().map(|p| -(*p as i64)).collect();
    let x_max = row.max_count() as f64 * 1.2;
    let half = (x_max / 2.0).round();

    json!({
        "data": [
            {
                "type": "bar",
                "y": ages,
                "x": male,
                "name": "Male",
                "orientation": "h",
                "marker": {"color": "skyblue"}
            },
            {
                "type": "bar",
                "y": ages,
                "x": row.female,
                "name": "Female",
                "orientation": "h",
                "marker": {"color": "lightcoral"}
            }
        ],
        "layout": {
            "title": {"text": format!("Population Pyramid for {}", row.region)},
            "barmode": "relative",
            "bargap": 0.2,
            "height": 700,
            "xaxis": {
                "title": {"text": "Population"},
                "tickvals": [-half, 0, half],
                "ticktext": [thousands(half as u64), "0", thousands(half as u64)],
                "range": [-x_max, x_max]
            },
            "yaxis": {"title": {"text": "Age Group"}}
        }
    })
}

/// Close, high and low lines over the whole series.
pub fn price_history(company: &str, ticker: &str, series: &StockSeries) -> Value {
    let dates: Vec<String> = series.dates().iter().map(|d| d.to_string()).collect();

    json!({
        "data": [
            {
                "type": "scatter",
                "mode": "lines",
                "x": dates,
                "y": series.closes(),
                "name": "Close",
                "line": {"color": "blue"}
            },
            {
                "type": "scatter",
                "mode": "lines",
                "x": dates,
                "y": series.highs(),
                "name": "High",
                "line": {"color": "green", "dash": "dot"}
            },
            {
                "type": "scatter",
                "mode": "lines",
                "x": dates,
                "y": series.lows(),
                "name": "Low",
                "line": {"color": "red", "dash": "dot"}
            }
        ],
        "layout": {
            "title": {"text": format!("{} ({}) 1-year price history", company, ticker)},
            "xaxis": {"title": {"text": "Date"}, "rangeslider": {"visible": true}},
            "yaxis": {"title": {"text": "Price (USD)"}},
            "hovermode": "x unified",
            "template": "plotly_white",
            "legend": {"title": {"text": "Series"}}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockBar;
    use chrono::NaiveDate;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_script_json_neutralises_markup() {
        let out = script_json(&json!({"name": "</script><b>&"})).unwrap();
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["name"], "</script><b>&");
    }

    #[test]
    fn test_pyramid_axis() {
        let row = PopulationRow {
            region: "Seoul".into(),
            male: vec![10_000, 5_000],
            female: vec![8_000, 4_000],
        };
        let ages = vec!["0".to_string(), "1".to_string()];
        let fig = population_pyramid(&ages, &row);

        assert_eq!(fig["data"][0]["x"], json!([-10_000, -5_000]));
        assert_eq!(fig["data"][1]["x"], json!([8_000, 4_000]));
        assert_eq!(fig["layout"]["xaxis"]["range"], json!([-12_000.0, 12_000.0]));
        assert_eq!(fig["layout"]["xaxis"]["tickvals"], json!([-6_000.0, 0, 6_000.0]));
        assert_eq!(fig["layout"]["xaxis"]["ticktext"], json!(["6,000", "0", "6,000"]));
        assert_eq!(fig["layout"]["title"]["text"], "Population Pyramid for Seoul");
    }

    #[test]
    fn test_price_history_traces() {
        let series = StockSeries::from_vec(vec![StockBar {
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10,
        }]);
        let fig = price_history("Apple", "AAPL", &series);
        let names: Vec<&str> = fig["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Close", "High", "Low"]);
        assert_eq!(fig["data"][0]["x"], json!(["2025-03-04"]));
        assert_eq!(fig["layout"]["hovermode"], "x unified");
    }
}
