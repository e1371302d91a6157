use serde::{Deserialize, Serialize};

use crate::{encode::Encoded, errors::Result};

/// Remote compute platform.
///
/// Both calls are blocking round trips. Implementations report failures as
/// [crate::CloudFreeError::Service] and nothing here retries.
pub trait ComputeService {
    /// Evaluates an expression and returns its JSON value.
    fn compute_value(&self, expression: &Encoded) -> Result<serde_json::Value>;

    /// Registers an image for tiled rendering.
    fn get_map_id(&self, image: &Encoded, vis: &VisParams) -> Result<MapId>;
}

/// Rendering parameters for [ComputeService::get_map_id].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl VisParams {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn with_bands<S: AsRef<str>>(mut self, bands: &[S]) -> Self {
        self.bands = Some(bands.iter().map(|b| b.as_ref().to_string()).collect());
        self
    }

    pub fn with_palette<S: AsRef<str>>(mut self, palette: &[S]) -> Self {
        self.palette = Some(palette.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }
}

/// Handle of a rendered image on the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapId {
    pub mapid: String,
    #[serde(default)]
    pub token: String,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_format: String,
}

impl MapId {
    pub fn new(mapid: &str, url_format: &str) -> Self {
        Self {
            mapid: mapid.into(),
            token: String::new(),
            url_format: url_format.into(),
        }
    }

    /// Parses a service response, falling back to the public tile endpoint
    /// when no URL template is given.
    pub fn from_response(response: &serde_json::Value) -> Result<Self> {
        let mapid = response
            .get("mapid")
            .or_else(|| response.get("name"))
            .and_then(serde_json::Value::as_str)
            .ok_or(crate::CloudFreeError::MalformedResponse("mapid"))?;
        let url_format = response
            .get("url_format")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("https://earthengine.googleapis.com/v1/{mapid}/tiles/{{z}}/{{x}}/{{y}}")
            });
        Ok(Self {
            mapid: mapid.into(),
            token: response
                .get("token")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .into(),
            url_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vis_params_skip_unset_fields() {
        let vis = VisParams::range(0.0, 0.2).with_palette(&["#000180", "#A70700"]);
        assert_eq!(
            serde_json::to_value(&vis).unwrap(),
            json!({ "min": 0.0, "max": 0.2, "palette": ["#000180", "#A70700"] })
        );
    }

    #[test]
    fn map_id_defaults_tile_template() {
        let map_id = MapId::from_response(&json!({ "name": "projects/p/maps/abc" })).unwrap();
        assert_eq!(
            map_id.url_format,
            "https://earthengine.googleapis.com/v1/projects/p/maps/abc/tiles/{z}/{x}/{y}"
        );
        assert!(map_id.token.is_empty());
    }

    #[test]
    fn map_id_without_name_is_malformed() {
        assert!(matches!(
            MapId::from_response(&json!({ "token": "t" })),
            Err(crate::CloudFreeError::MalformedResponse("mapid"))
        ));
    }
}
