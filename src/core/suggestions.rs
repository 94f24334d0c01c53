//! AI 設施建議的提示詞與回應解析。
//!
//! 服務端不保證輸出格式，這裡負責去掉 Markdown 標記、找出 JSON 陣列，
//! 並逐筆檢查欄位。

use crate::domain::model::{Coord, PoiSuggestion};
use crate::utils::error::{Result, SalesMapError};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub fn build_prompt(address: &str, center: Coord, count: usize) -> String {
    format!(
        r#"你是一個房地產專家。請針對「{address}」（經緯度：{lat}, {lng}）
列出 {count} 個附近最重要的銷售亮點設施（例如捷運站、商圈、公園、學校、地標）。

請回傳純 JSON 格式，不要有 markdown 標記。格式如下：
[
  {{ "name": "設施名稱", "type": "類別(如捷運/商圈/公園)", "minutes": 預估開車分鐘數(整數), "address": "設施地址", "lat": 緯度, "lng": 經度 }}
]

注意：
1. 經緯度必須真實且在該地點附近。
2. minutes 請根據距離估算。
3. address 請盡量提供完整地址，方便後續定位。"#,
        address = address,
        lat = center.lat(),
        lng = center.lon(),
        count = count,
    )
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[A-Za-z]*").expect("valid fence regex"))
}

/// 去掉 ``` 與 ```json 這類標記
pub fn strip_code_fences(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// 從模型輸出取出設施清單，最多 `limit` 筆
pub fn parse_suggestions(text: &str, limit: usize) -> Result<Vec<PoiSuggestion>> {
    let cleaned = strip_code_fences(text);

    let start = cleaned.find('[');
    let end = cleaned.rfind(']');
    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &cleaned[s..=e],
        _ => {
            return Err(SalesMapError::AiGenerationError {
                message: format!("response does not contain a JSON array: {}", cleaned),
            })
        }
    };

    let items: Vec<Value> =
        serde_json::from_str(json_str).map_err(|e| SalesMapError::AiGenerationError {
            message: format!("invalid JSON in response: {}", e),
        })?;

    let total = items.len();
    let suggestions: Vec<PoiSuggestion> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match suggestion_from_value(item) {
            Some(s) => Some(s),
            None => {
                tracing::warn!("⚠️ Skipping invalid AI suggestion #{}: {}", index, item);
                None
            }
        })
        .take(limit)
        .collect();

    if suggestions.is_empty() && total > 0 {
        return Err(SalesMapError::AiGenerationError {
            message: format!("none of the {} suggested entries were usable", total),
        });
    }

    Ok(suggestions)
}

fn suggestion_from_value(item: &Value) -> Option<PoiSuggestion> {
    let obj = item.as_object()?;

    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    let minutes = obj.get("minutes").and_then(number_from_value).unwrap_or(0.0);
    let minutes = if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u32
    } else {
        0
    };

    let address = obj
        .get("address")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    let lat = obj.get("lat").and_then(number_from_value)?;
    let lng = obj.get("lng").and_then(number_from_value)?;
    let coord = Coord::new(lng, lat).ok()?;

    Some(PoiSuggestion {
        name: name.to_string(),
        kind,
        minutes,
        address,
        coord,
    })
}

/// 模型有時把數字包成字串
fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = r#"```json
[
  { "name": "市政府站", "type": "捷運", "minutes": 3, "address": "台北市信義區忠孝東路五段", "lat": 25.0411, "lng": 121.5651 },
  { "name": "台北 101", "type": "地標", "minutes": "4", "lat": "25.0336", "lng": 121.5648 }
]
```"#;

    #[test]
    fn test_parses_fenced_json_array() {
        let pois = parse_suggestions(FENCED, 10).unwrap();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].name, "市政府站");
        assert_eq!(pois[0].address.as_deref(), Some("台北市信義區忠孝東路五段"));
        assert_eq!(pois[1].minutes, 4);
        assert!((pois[1].coord.lat() - 25.0336).abs() < 1e-9);
        assert_eq!(pois[1].address, None);
    }

    #[test]
    fn test_finds_array_embedded_in_prose() {
        let text = "好的，以下是結果：\n[{\"name\":\"公園\",\"type\":\"公園\",\"minutes\":6,\"lat\":25.03,\"lng\":121.56}]\n希望有幫助！";
        let pois = parse_suggestions(text, 4).unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].kind, "公園");
    }

    #[test]
    fn test_limits_number_of_results() {
        assert_eq!(parse_suggestions(FENCED, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_drops_entries_without_coordinates() {
        let text = r#"[{"name":"無座標","type":"x","minutes":1},{"name":"OK","type":"y","minutes":2,"lat":25.0,"lng":121.0}]"#;
        let pois = parse_suggestions(text, 4).unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name, "OK");
    }

    #[test]
    fn test_rejects_non_json_response() {
        let err = parse_suggestions("抱歉，我無法回答。", 4).unwrap_err();
        assert!(matches!(err, SalesMapError::AiGenerationError { .. }));

        let err = parse_suggestions("[not json]", 4).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));

        let err = parse_suggestions(r#"[{"type":"no name"}]"#, 4).unwrap_err();
        assert!(err.to_string().contains("usable"));
    }

    #[test]
    fn test_prompt_embeds_address_center_and_count() {
        let prompt = build_prompt("台北101", Coord::new(121.5654, 25.033).unwrap(), 4);
        assert!(prompt.contains("「台北101」"));
        assert!(prompt.contains("25.033, 121.5654"));
        assert!(prompt.contains("列出 4 個"));
    }
}
