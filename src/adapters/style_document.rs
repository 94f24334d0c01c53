//! 記憶體內的地圖繪製面，輸出成宣告式的地圖文件（JSON）與可直接開啟的 HTML。

use crate::domain::model::Coord;
use crate::domain::surface::{Camera, Interaction, MapSurface, Marker, MarkerId, PointerEvent};
use crate::utils::error::{Result, SalesMapError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/light-v11";
const MAPBOX_GL_VERSION: &str = "v3.4.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub kind: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handler {
    pub event: PointerEvent,
    pub layer: String,
    #[serde(flatten)]
    pub interaction: Interaction,
}

#[derive(Debug, Clone)]
pub struct StyleDocument {
    style_url: String,
    camera: Camera,
    controls: Vec<Control>,
    markers: BTreeMap<MarkerId, Marker>,
    next_marker: u64,
    sources: BTreeMap<String, Value>,
    layers: Vec<Value>,
    handlers: Vec<Handler>,
    created_at: DateTime<Utc>,
}

impl StyleDocument {
    /// 初始視角、導覽與精簡版權控制項都放右下角
    pub fn new(style_url: String, initial_center: Coord, zoom: f64) -> Self {
        Self {
            style_url,
            camera: Camera {
                center: initial_center,
                zoom,
                animate: false,
            },
            controls: vec![
                Control {
                    kind: "navigation".to_string(),
                    position: "bottom-right".to_string(),
                    compact: None,
                },
                Control {
                    kind: "attribution".to_string(),
                    position: "bottom-right".to_string(),
                    compact: Some(true),
                },
            ],
            markers: BTreeMap::new(),
            next_marker: 0,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            handlers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn source(&self, id: &str) -> Option<&Value> {
        self.sources.get(id)
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter_map(|layer| layer["id"].as_str())
            .collect()
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn to_json(&self) -> Value {
        let sources: serde_json::Map<String, Value> = self
            .sources
            .iter()
            .map(|(id, data)| (id.clone(), json!({ "type": "geojson", "data": data })))
            .collect();
        let markers: Vec<&Marker> = self.markers.values().collect();

        json!({
            "style": self.style_url,
            "camera": self.camera,
            "controls": self.controls,
            "markers": markers,
            "sources": sources,
            "layers": self.layers,
            "handlers": self.handlers,
            "createdAt": self.created_at.to_rfc3339(),
        })
    }

    /// 單檔 HTML，載入 mapbox-gl 後依文件內容重建地圖
    pub fn to_html(&self, title: &str, access_token: &str) -> Result<String> {
        let document = serde_json::to_string(&self.to_json())?;
        let token = serde_json::to_string(access_token)?;

        Ok(HTML_TEMPLATE
            .replace("{{TITLE}}", &escape_html(title))
            .replace("{{VERSION}}", MAPBOX_GL_VERSION)
            .replace("{{TOKEN}}", &escape_script(&token))
            .replace("{{DOCUMENT}}", &escape_script(&document)))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 避免內容提早結束 <script> 區塊
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

impl MapSurface for StyleDocument {
    fn fly_to(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, data: Value) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(SalesMapError::RenderError {
                message: format!("source '{}' already exists", id),
            });
        }
        self.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: Value) -> Result<()> {
        match self.sources.get_mut(id) {
            Some(existing) => {
                *existing = data;
                Ok(())
            }
            None => Err(SalesMapError::RenderError {
                message: format!("source '{}' does not exist", id),
            }),
        }
    }

    fn add_layer(&mut self, layer: Value) -> Result<()> {
        let id = layer["id"].as_str().ok_or_else(|| SalesMapError::RenderError {
            message: "layer is missing an id".to_string(),
        })?;
        if self.layer_ids().contains(&id) {
            return Err(SalesMapError::RenderError {
                message: format!("layer '{}' already exists", id),
            });
        }
        let source = layer["source"].as_str().unwrap_or_default();
        if !self.sources.contains_key(source) {
            return Err(SalesMapError::RenderError {
                message: format!("layer '{}' references unknown source '{}'", id, source),
            });
        }

        self.layers.push(layer);
        Ok(())
    }

    fn on(&mut self, event: PointerEvent, layer_id: &str, interaction: Interaction) {
        self.handlers.push(Handler {
            event,
            layer: layer_id.to_string(),
            interaction,
        });
    }
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
<meta charset="utf-8">
<title>{{TITLE}} | SalesMap Studio</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link href="https://api.mapbox.com/mapbox-gl-js/{{VERSION}}/mapbox-gl.css" rel="stylesheet">
<script src="https://api.mapbox.com/mapbox-gl-js/{{VERSION}}/mapbox-gl.js"></script>
<style>
  html, body, #map { margin: 0; height: 100%; }
  .popup-title { font-weight: 600; }
  .popup-subtitle { color: #6b7280; font-size: 12px; }
</style>
</head>
<body>
<div id="map"></div>
<script>
const doc = {{DOCUMENT}};
mapboxgl.accessToken = {{TOKEN}};

const map = new mapboxgl.Map({
  container: 'map',
  style: doc.style,
  center: doc.camera.center,
  zoom: doc.camera.zoom,
  attributionControl: false
});

for (const control of doc.controls) {
  if (control.kind === 'navigation') {
    map.addControl(new mapboxgl.NavigationControl(), control.position);
  } else if (control.kind === 'attribution') {
    map.addControl(new mapboxgl.AttributionControl({ compact: !!control.compact }), control.position);
  }
}

const text = (value) => {
  const div = document.createElement('div');
  div.textContent = value;
  return div.innerHTML;
};
const fill = (template, props) => template.replace(/\{(\w+)\}/g, (_, key) => text(props[key] ?? ''));

map.on('load', () => {
  for (const [id, source] of Object.entries(doc.sources)) {
    map.addSource(id, source);
  }
  for (const layer of doc.layers) {
    map.addLayer(layer);
  }
  for (const marker of doc.markers) {
    const m = new mapboxgl.Marker({ color: marker.color }).setLngLat(marker.position);
    if (marker.popup) {
      const p = marker.popup;
      m.setPopup(new mapboxgl.Popup({ offset: p.offset, closeButton: p.close_button })
        .setHTML(`<div class="popup-title">${text(p.title)}</div><div class="popup-subtitle">${text(p.subtitle)}</div>`));
    }
    m.addTo(map);
    if (marker.popup && marker.popup.open) m.togglePopup();
  }
  for (const h of doc.handlers) {
    const event = h.event === 'mouseenter' ? 'mouseenter' : h.event === 'mouseleave' ? 'mouseleave' : 'click';
    map.on(event, h.layer, (e) => {
      if (h.action === 'set_cursor') {
        map.getCanvas().style.cursor = h.cursor;
      } else if (h.action === 'open_feature_popup') {
        const feature = e.features[0];
        new mapboxgl.Popup({ offset: h.offset, className: h.class_name })
          .setLngLat(feature.geometry.coordinates.slice())
          .setHTML(`<div class="popup-title">${fill(h.title, feature.properties)}</div><div class="popup-subtitle">${fill(h.subtitle, feature.properties)}</div>`)
          .addTo(map);
      }
    });
  }
  map.flyTo({ center: doc.camera.center, zoom: doc.camera.zoom, essential: true });
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{render, RenderSettings, POI_SOURCE_ID, RING_SOURCE_ID};
    use crate::domain::model::Project;

    fn document() -> StyleDocument {
        StyleDocument::new(
            DEFAULT_STYLE_URL.to_string(),
            Coord::new(121.5654, 25.0375).unwrap(),
            13.0,
        )
    }

    #[test]
    fn test_layer_requires_existing_source() {
        let mut doc = document();
        let err = doc
            .add_layer(json!({ "id": "x", "type": "circle", "source": "missing" }))
            .unwrap_err();
        assert!(err.to_string().contains("unknown source"));

        assert!(doc.set_source_data("missing", json!({})).is_err());
    }

    #[test]
    fn test_rendered_document_contains_sources_layers_and_handlers() {
        let mut doc = document();
        let mut marker = None;
        let settings = RenderSettings::default();
        render(&mut doc, &Project::default(), &settings, &mut marker).unwrap();
        render(&mut doc, &Project::default(), &settings, &mut marker).unwrap();

        let value = doc.to_json();
        assert_eq!(value["style"], DEFAULT_STYLE_URL);
        assert_eq!(value["sources"][RING_SOURCE_ID]["type"], "geojson");
        assert_eq!(
            value["sources"][POI_SOURCE_ID]["data"]["features"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert_eq!(value["layers"].as_array().unwrap().len(), 4);
        assert_eq!(value["markers"].as_array().unwrap().len(), 1);
        assert_eq!(value["handlers"].as_array().unwrap().len(), 3);
        assert_eq!(value["handlers"][0]["action"], "open_feature_popup");
        assert_eq!(value["camera"]["center"], json!([121.5654, 25.0375]));
    }

    #[test]
    fn test_html_escapes_script_breaking_content() {
        let mut doc = document();
        let mut marker = None;
        let project = Project {
            name: "</script><b>案</b>".to_string(),
            ..Project::default()
        };
        render(&mut doc, &project, &RenderSettings::default(), &mut marker).unwrap();

        let html = doc.to_html(&project.name, "pk.test").unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("&lt;/script&gt;"));
        assert!(html.contains("\"pk.test\""));
        assert!(html.contains("mapbox-gl-js/v3.4.0"));
    }
}
