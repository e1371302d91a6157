use serde::Serialize;
use serde_json::Value;

use crate::{
    components::Geometry,
    errors::Result,
    pipeline::{CLOUD_SCORE, CLOUD_SHADOW_SCORE},
    sensors::sentinel2::{B2, B3, B4},
    service::{MapId, VisParams},
};

pub const SAGA_PALETTE: [&str; 5] = ["#000180", "#0075FD", "#6CFB93", "#F99D05", "#A70700"];

const TILE_ATTRIBUTION: &str = "Google Earth Engine";

/// True color, digital numbers 0..4000.
pub fn rgb_vis() -> VisParams {
    VisParams::range(0.0, 4000.0).with_bands(&[B4, B3, B2])
}

pub fn cloud_score_vis() -> VisParams {
    VisParams::range(0.0, 0.2)
        .with_bands(&[CLOUD_SCORE])
        .with_palette(&SAGA_PALETTE)
}

pub fn cloud_shadow_score_vis() -> VisParams {
    VisParams::range(-0.2, 0.0)
        .with_bands(&[CLOUD_SHADOW_SCORE])
        .with_palette(&SAGA_PALETTE)
}

/// Base map under the overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseTiles {
    #[default]
    OpenStreetMap,
    CartoDbPositron,
    CartoDbDarkMatter,
    EsriWorldImagery,
}

impl BaseTiles {
    pub fn name(&self) -> &'static str {
        match self {
            BaseTiles::OpenStreetMap => "OpenStreetMap",
            BaseTiles::CartoDbPositron => "CartoDB Positron",
            BaseTiles::CartoDbDarkMatter => "CartoDB Dark Matter",
            BaseTiles::EsriWorldImagery => "Esri World Imagery",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            BaseTiles::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            BaseTiles::CartoDbPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png"
            }
            BaseTiles::CartoDbDarkMatter => {
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png"
            }
            BaseTiles::EsriWorldImagery => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            BaseTiles::OpenStreetMap => "&copy; OpenStreetMap contributors",
            BaseTiles::CartoDbPositron | BaseTiles::CartoDbDarkMatter => {
                "&copy; OpenStreetMap contributors &copy; CARTO"
            }
            BaseTiles::EsriWorldImagery => "Tiles &copy; Esri",
        }
    }
}

/// Content of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// Server-rendered raster tiles.
    Tiles(MapId),
    /// Vector data as GeoJSON.
    GeoJson(Value),
}

impl From<MapId> for LayerSource {
    fn from(value: MapId) -> Self {
        LayerSource::Tiles(value)
    }
}

impl From<&Geometry> for LayerSource {
    fn from(value: &Geometry) -> Self {
        LayerSource::GeoJson(value.to_geojson())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub source: LayerSource,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum LayerSpec<'a> {
    Tiles {
        name: &'a str,
        url: &'a str,
        attribution: &'a str,
        overlay: bool,
    },
    GeoJson {
        name: &'a str,
        data: &'a Value,
    },
}

#[derive(Serialize)]
struct MapSpec<'a> {
    location: [f64; 2],
    zoom_start: u8,
    base: LayerSpec<'a>,
    layers: Vec<LayerSpec<'a>>,
}

/// Interactive web map with a layer control.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDisplay {
    /// `[lat, lon]`, Leaflet's order.
    location: [f64; 2],
    zoom_start: u8,
    tiles: BaseTiles,
    layers: Vec<Layer>,
}

impl MapDisplay {
    /// `center` is `(lon, lat)`, as geometries give it.
    pub fn new(center: (f64, f64), zoom_start: u8) -> Self {
        Self {
            location: [center.1, center.0],
            zoom_start,
            tiles: BaseTiles::default(),
            layers: Vec::new(),
        }
    }

    pub fn centered_on(roi: &Geometry, zoom_start: u8) -> Result<Self> {
        Ok(Self::new(roi.centroid()?, zoom_start))
    }

    /// Map with one overlay per entry, in order.
    pub fn with_layers<N: Into<String>>(
        center: (f64, f64),
        layers: impl IntoIterator<Item = (N, LayerSource)>,
        zoom_start: u8,
    ) -> Self {
        layers
            .into_iter()
            .fold(Self::new(center, zoom_start), |map, (name, source)| {
                map.add_layer(name, source)
            })
    }

    pub fn tiles(mut self, tiles: BaseTiles) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn add_layer(mut self, name: impl Into<String>, source: impl Into<LayerSource>) -> Self {
        self.layers.push(Layer {
            name: name.into(),
            source: source.into(),
        });
        self
    }

    pub fn location(&self) -> [f64; 2] {
        self.location
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn spec(&self) -> MapSpec<'_> {
        let layers = self
            .layers
            .iter()
            .map(|layer| match &layer.source {
                LayerSource::Tiles(map_id) => LayerSpec::Tiles {
                    name: &layer.name,
                    url: &map_id.url_format,
                    attribution: TILE_ATTRIBUTION,
                    overlay: true,
                },
                LayerSource::GeoJson(data) => LayerSpec::GeoJson {
                    name: &layer.name,
                    data,
                },
            })
            .collect();
        MapSpec {
            location: self.location,
            zoom_start: self.zoom_start,
            base: LayerSpec::Tiles {
                name: self.tiles.name(),
                url: self.tiles.url(),
                attribution: self.tiles.attribution(),
                overlay: false,
            },
            layers,
        }
    }

    /// Standalone Leaflet page.
    pub fn to_html(&self) -> Result<String> {
        // A literal `</` would end the script element early.
        let spec = serde_json::to_string(&self.spec())?.replace("</", "<\\/");
        log::debug!("rendering map with {} overlays", self.layers.len());
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const spec = {spec};
const map = L.map("map").setView(spec.location, spec.zoom_start);
const toLeaflet = (layer) => layer.kind === "tiles"
  ? L.tileLayer(layer.url, {{ attribution: layer.attribution }})
  : L.geoJSON(layer.data);
const base = toLeaflet(spec.base).addTo(map);
const overlays = {{}};
for (const layer of spec.layers) {{
  overlays[layer.name] = toLeaflet(layer).addTo(map);
}}
L.control.layers({{ [spec.base.name]: base }}, overlays).addTo(map);
</script>
</body>
</html>
"#
        ))
    }
}
