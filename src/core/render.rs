//! 把專案快照套用到地圖繪製面。
//!
//! 每次呼叫都整份替換 source 資料；layer 與事件只在第一次建立 source 時加入，
//! 重複呼叫不會累積標記或事件。

use crate::domain::model::Project;
use crate::domain::surface::{
    Camera, Interaction, MapSurface, Marker, MarkerId, PointerEvent, Popup,
};
use crate::utils::error::Result;
use serde_json::{json, Value};
use tokio::sync::watch;

pub const RING_SOURCE_ID: &str = "project-rings";
pub const POI_SOURCE_ID: &str = "project-pois";
pub const RING_FILL_LAYER_ID: &str = "rings-fill";
pub const RING_LABEL_LAYER_ID: &str = "rings-label";
pub const POI_CIRCLE_LAYER_ID: &str = "pois-circle";
pub const POI_LABEL_LAYER_ID: &str = "pois-label";

const ACCENT_COLOR: &str = "#007aff";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub zoom: f64,
    /// 每分鐘車程在 reference_zoom 下的像素半徑（約 500 公尺）
    pub base_radius_px: f64,
    pub reference_zoom: f64,
    pub max_zoom: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            zoom: 13.0,
            base_radius_px: 26.0,
            reference_zoom: 13.0,
            max_zoom: 22.0,
        }
    }
}

/// 以 2 為底的指數內插，讓圓圈在 Web Mercator 下維持同樣的地面距離
pub fn ring_radius_expression(settings: &RenderSettings) -> Value {
    let max_scale = 2f64.powf(settings.max_zoom - settings.reference_zoom);
    json!([
        "interpolate", ["exponential", 2], ["zoom"],
        settings.reference_zoom, ["*", ["get", "minutes"], settings.base_radius_px],
        settings.max_zoom, ["*", ["get", "minutes"], settings.base_radius_px * max_scale]
    ])
}

pub fn ring_features(project: &Project) -> Value {
    let features: Vec<Value> = project
        .ring_minutes
        .iter()
        .map(|minutes| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": project.center },
                "properties": { "minutes": minutes }
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

pub fn poi_features(project: &Project) -> Value {
    let features: Vec<Value> = project
        .pois
        .iter()
        .map(|poi| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": poi.coord },
                "properties": {
                    "name": poi.name,
                    "type": poi.kind,
                    "minutes": poi.minutes,
                    "manual": poi.manual
                }
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

fn ring_layers(settings: &RenderSettings) -> [Value; 2] {
    [
        json!({
            "id": RING_FILL_LAYER_ID,
            "type": "circle",
            "source": RING_SOURCE_ID,
            "paint": {
                "circle-radius": ring_radius_expression(settings),
                "circle-color": ACCENT_COLOR,
                "circle-opacity": 0.06,
                "circle-stroke-width": 1,
                "circle-stroke-color": ACCENT_COLOR,
                "circle-stroke-opacity": 0.4
            }
        }),
        json!({
            "id": RING_LABEL_LAYER_ID,
            "type": "symbol",
            "source": RING_SOURCE_ID,
            "layout": {
                "text-field": ["concat", ["get", "minutes"], " 分鐘車程圈"],
                "text-size": 12,
                "text-offset": [0, -1],
                "text-anchor": "bottom"
            },
            "paint": {
                "text-color": "#6b7280",
                "text-halo-color": "#ffffff",
                "text-halo-width": 2
            }
        }),
    ]
}

fn poi_layers() -> [Value; 2] {
    [
        json!({
            "id": POI_CIRCLE_LAYER_ID,
            "type": "circle",
            "source": POI_SOURCE_ID,
            "paint": {
                "circle-radius": 6,
                "circle-color": "#ffffff",
                "circle-stroke-width": 2,
                "circle-stroke-color": "#111827"
            }
        }),
        json!({
            "id": POI_LABEL_LAYER_ID,
            "type": "symbol",
            "source": POI_SOURCE_ID,
            "layout": {
                "text-field": ["get", "name"],
                "text-size": 11,
                "text-offset": [0, 1.2],
                "text-anchor": "top"
            },
            "paint": {
                "text-color": "#111827",
                "text-halo-color": "#ffffff",
                "text-halo-width": 2
            }
        }),
    ]
}

fn upsert_source<S: MapSurface>(surface: &mut S, id: &str, data: Value) -> Result<bool> {
    if surface.has_source(id) {
        surface.set_source_data(id, data)?;
        Ok(false)
    } else {
        surface.add_source(id, data)?;
        Ok(true)
    }
}

/// 套用一份快照；`center_marker` 記住上一次的中心標記以便替換
pub fn render<S: MapSurface>(
    surface: &mut S,
    project: &Project,
    settings: &RenderSettings,
    center_marker: &mut Option<MarkerId>,
) -> Result<()> {
    surface.fly_to(Camera {
        center: project.center,
        zoom: settings.zoom,
        animate: true,
    });

    if let Some(previous) = center_marker.take() {
        surface.remove_marker(previous);
    }
    *center_marker = Some(surface.add_marker(Marker {
        position: project.center,
        color: ACCENT_COLOR.to_string(),
        popup: Some(Popup {
            title: project.name.clone(),
            subtitle: "建案基地位置".to_string(),
            offset: 25,
            close_button: false,
            open: true,
        }),
    }));

    if upsert_source(surface, RING_SOURCE_ID, ring_features(project))? {
        for layer in ring_layers(settings) {
            surface.add_layer(layer)?;
        }
    }

    if upsert_source(surface, POI_SOURCE_ID, poi_features(project))? {
        for layer in poi_layers() {
            surface.add_layer(layer)?;
        }

        surface.on(
            PointerEvent::Click,
            POI_CIRCLE_LAYER_ID,
            Interaction::OpenFeaturePopup {
                title: "{name}".to_string(),
                subtitle: "{type} • 約 {minutes} 分鐘".to_string(),
                offset: 10,
                class_name: "poi-popup".to_string(),
            },
        );
        surface.on(
            PointerEvent::MouseEnter,
            POI_CIRCLE_LAYER_ID,
            Interaction::SetCursor {
                cursor: "pointer".to_string(),
            },
        );
        surface.on(
            PointerEvent::MouseLeave,
            POI_CIRCLE_LAYER_ID,
            Interaction::SetCursor {
                cursor: String::new(),
            },
        );
    }

    tracing::debug!(
        "Rendered '{}' with {} rings and {} POIs",
        project.name,
        project.ring_minutes.len(),
        project.pois.len()
    );
    Ok(())
}

/// 地圖工作階段：繪製面在第一次套用快照時才建立，之後重複使用
pub struct MapSession<S: MapSurface> {
    settings: RenderSettings,
    init: Box<dyn Fn() -> S + Send>,
    surface: Option<S>,
    center_marker: Option<MarkerId>,
}

impl<S: MapSurface> MapSession<S> {
    pub fn new(settings: RenderSettings, init: impl Fn() -> S + Send + 'static) -> Self {
        Self {
            settings,
            init: Box::new(init),
            surface: None,
            center_marker: None,
        }
    }

    pub fn apply(&mut self, project: &Project) -> Result<()> {
        let init = &self.init;
        let surface = self.surface.get_or_insert_with(|| {
            tracing::debug!("Initializing map surface");
            init()
        });
        render(surface, project, &self.settings, &mut self.center_marker)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn into_surface(self) -> Option<S> {
        self.surface
    }

    /// 先套用目前的快照，之後每次 store 更新就重新套用，直到 store 被釋放
    pub async fn follow(&mut self, mut rx: watch::Receiver<Project>) -> Result<()> {
        let snapshot = rx.borrow_and_update().clone();
        self.apply(&snapshot)?;

        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            self.apply(&snapshot)?;
        }
        Ok(())
    }
}
