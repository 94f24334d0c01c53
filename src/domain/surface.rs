//! 地圖繪製面的抽象：相機、標記、source/layer 與指標事件。
//!
//! 實際的向量地圖函式庫只需要實作 [`MapSurface`]；渲染邏輯只依賴這層介面。

use crate::domain::model::Coord;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub center: Coord,
    pub zoom: f64,
    /// 以動畫飛行過去，而非直接跳轉
    pub animate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub subtitle: String,
    pub offset: u32,
    pub close_button: bool,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coord,
    pub color: String,
    pub popup: Option<Popup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvent {
    Click,
    MouseEnter,
    MouseLeave,
}

/// 指標事件觸發時要做的事，以宣告方式描述
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Interaction {
    /// 以被點擊的 feature 屬性填入模板，`{name}` 形式
    OpenFeaturePopup {
        title: String,
        subtitle: String,
        offset: u32,
        class_name: String,
    },
    SetCursor { cursor: String },
}

pub trait MapSurface {
    fn fly_to(&mut self, camera: Camera);

    fn add_marker(&mut self, marker: Marker) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    fn has_source(&self, id: &str) -> bool;

    /// `data` 是 GeoJSON FeatureCollection
    fn add_source(&mut self, id: &str, data: Value) -> Result<()>;

    fn set_source_data(&mut self, id: &str, data: Value) -> Result<()>;

    /// `layer` 是 Mapbox style layer 物件，必須帶 `id` 與 `source`
    fn add_layer(&mut self, layer: Value) -> Result<()>;

    fn on(&mut self, event: PointerEvent, layer_id: &str, interaction: Interaction);
}
