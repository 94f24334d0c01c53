pub const DEFAULT_RING_MINUTES: [u32; 3] = [5, 10, 15];

/// 表單提供的車程等級選項
pub const RING_PRESETS: [(&str, &str); 3] = [
    ("5,10,15", "5 / 10 / 15 分鐘"),
    ("3,6,9", "3 / 6 / 9 分鐘"),
    ("8,15,25", "8 / 15 / 25 分鐘"),
];

/// 解析 "5,10,15" 形式的車程等級，無效片段直接丟棄，保留原順序。
/// 沒有任何有效值時回傳預設的 5 / 10 / 15。
pub fn parse_ring_minutes(option: &str) -> Vec<u32> {
    let rings: Vec<u32> = option
        .split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .filter(|minutes| *minutes > 0)
        .collect();

    if rings.is_empty() {
        tracing::debug!("No valid ring minutes in '{}', using default", option);
        DEFAULT_RING_MINUTES.to_vec()
    } else {
        rings
    }
}

pub fn format_ring_minutes(rings: &[u32]) -> String {
    rings
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
