use crate::domain::model::{Coord, Poi};

struct PoiTemplate {
    name: &'static str,
    kind: &'static str,
    minutes: u32,
    dlon: f64,
    dlat: f64,
}

/// 相對於案場中心的固定偏移
const TEMPLATES: [PoiTemplate; 4] = [
    PoiTemplate {
        name: "捷運站",
        kind: "捷運站",
        minutes: 3,
        dlon: -0.0009,
        dlat: 0.0035,
    },
    PoiTemplate {
        name: "商圈",
        kind: "商業機能",
        minutes: 5,
        dlon: 0.0011,
        dlat: -0.0020,
    },
    PoiTemplate {
        name: "文創園區",
        kind: "文化 / 展演",
        minutes: 7,
        dlon: -0.0056,
        dlat: 0.0065,
    },
    PoiTemplate {
        name: "地標",
        kind: "地標",
        minutes: 4,
        dlon: -0.0014,
        dlat: -0.0045,
    },
];

/// 依序循環模板直到湊滿 `count` 筆
pub fn generate_mock_pois(center: Coord, count: usize) -> Vec<Poi> {
    TEMPLATES
        .iter()
        .cycle()
        .take(count)
        .map(|template| Poi {
            name: format!("附近{}", template.name),
            kind: template.kind.to_string(),
            minutes: template.minutes,
            coord: center.offset(template.dlon, template.dlat),
            manual: false,
        })
        .collect()
}
