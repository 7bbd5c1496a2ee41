use serde_json::{json, Value};
use crate::services::indicators::IndicatorSeries;

/// HH:MM 标签，按抽样点的本地时间
pub fn labels(series: &IndicatorSeries) -> Vec<String> {
    series.points
        .iter()
        .map(|p| p.timestamp.format("%H:%M").to_string())
        .collect()
}

fn dataset(label: &str, data: Value, color: &str, axis: &str) -> Value {
    json!({
        "label": label,
        "data": data,
        "borderColor": color,
        "tension": 0.1,
        "yAxisID": axis,
    })
}

/// 生成 Chart.js 折线图配置：价格一轴，MACD/Signal 一轴，RSI 固定 0-100
pub fn chart_config(series: &IndicatorSeries) -> Value {
    let prices: Vec<f64> = series.points.iter().map(|p| p.close).collect();

    json!({
        "type": "line",
        "data": {
            "labels": labels(series),
            "datasets": [
                dataset("Price", json!(prices), "rgb(75, 192, 192)", "price"),
                dataset("MACD", json!(series.macd), "rgb(255, 99, 132)", "macd"),
                dataset("Signal", json!(series.signal), "rgb(54, 162, 235)", "macd"),
                dataset("RSI", json!(series.rsi), "rgb(153, 102, 255)", "rsi"),
            ]
        },
        "options": {
            "scales": {
                "price": {
                    "type": "linear",
                    "position": "left",
                    "title": { "display": true, "text": "Price" }
                },
                "macd": {
                    "type": "linear",
                    "position": "right",
                    "title": { "display": true, "text": "MACD" },
                    "grid": { "display": false }
                },
                "rsi": {
                    "type": "linear",
                    "position": "right",
                    "title": { "display": true, "text": "RSI" },
                    "min": 0,
                    "max": 100,
                    "grid": { "display": false }
                }
            }
        }
    })
}
