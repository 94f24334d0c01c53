use crate::utils::error::{Result, SalesMapError};
use serde::{Deserialize, Serialize};

/// 經緯度座標，序列化為 `[lon, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    lon: f64,
    lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(SalesMapError::InvalidCoordinate {
                message: format!("longitude out of range: {}", lon),
            });
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SalesMapError::InvalidCoordinate {
                message: format!("latitude out of range: {}", lat),
            });
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// 經度跨過 ±180 時繞回另一側，緯度夾在兩極之間
    pub fn offset(&self, dlon: f64, dlat: f64) -> Self {
        let lon = self.lon + dlon;
        let lon = if (-180.0..=180.0).contains(&lon) {
            lon
        } else {
            (lon + 180.0).rem_euclid(360.0) - 180.0
        };
        Self {
            lon,
            lat: (self.lat + dlat).clamp(-90.0, 90.0),
        }
    }
}

impl TryFrom<[f64; 2]> for Coord {
    type Error = SalesMapError;

    fn try_from(value: [f64; 2]) -> Result<Self> {
        Self::new(value[0], value[1])
    }
}

impl From<Coord> for [f64; 2] {
    fn from(coord: Coord) -> Self {
        [coord.lon, coord.lat]
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub minutes: u32,
    pub coord: Coord,
    /// true 表示座標是 AI 推估、未經地理編碼確認
    #[serde(default)]
    pub manual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub address: String,
    pub center: Coord,
    pub ring_minutes: Vec<u32>,
    pub pois: Vec<Poi>,
}

impl Default for Project {
    /// 信義區示意案場
    fn default() -> Self {
        let seed = |name: &str, kind: &str, minutes: u32, lon: f64, lat: f64| Poi {
            name: name.to_string(),
            kind: kind.to_string(),
            minutes,
            coord: Coord { lon, lat },
            manual: false,
        };

        Self {
            name: "信義璞園".to_string(),
            address: "台北市信義區市府路45號".to_string(),
            center: Coord {
                lon: 121.5654,
                lat: 25.0375,
            },
            ring_minutes: vec![5, 10, 15],
            pois: vec![
                seed("市政府捷運站", "捷運站", 3, 121.5645, 25.0410),
                seed("信義商圈", "商業機能", 5, 121.5665, 25.0355),
                seed("松山文創園區", "文化 / 展演", 7, 121.5598, 25.0440),
                seed("台北 101", "地標", 4, 121.5640, 25.0330),
            ],
        }
    }
}

/// AI 回傳的單筆設施建議（已通過欄位檢查）
#[derive(Debug, Clone, PartialEq)]
pub struct PoiSuggestion {
    pub name: String,
    pub kind: String,
    pub minutes: u32,
    pub address: Option<String>,
    pub coord: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TravelMode {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TravelMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Driving => "開車",
            Self::Cycling => "機車 / 單車",
            Self::Walking => "步行",
        }
    }
}
