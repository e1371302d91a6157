//! In-memory stand-in for the compute service.
//!
//! Interprets encoded graphs over tiny rasters (a handful of pixels, one
//! value per pixel and band, `None` where masked). Only the functions the
//! compositing tests touch are implemented; anything else is reported as a
//! service error, like the real service does for unknown algorithms.

use std::{cell::Cell, collections::BTreeMap};

use cloudfree::{CloudFreeError, ComputeService, Encoded, MapId, Result, VisParams};
use serde_json::{json, Value};

pub type Pixels = Vec<Option<f64>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Raster {
    pub bands: Vec<(String, Pixels)>,
    pub properties: BTreeMap<String, Value>,
}

impl Raster {
    pub fn band(mut self, name: &str, pixels: Pixels) -> Self {
        self.bands.push((name.into(), pixels));
        self
    }

    pub fn property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    fn get(&self, name: &str) -> Option<&Pixels> {
        self.bands
            .iter()
            .find_map(|(band, pixels)| (band == name).then_some(pixels))
    }

    fn to_json(&self) -> Value {
        let bands: serde_json::Map<String, Value> = self
            .bands
            .iter()
            .map(|(name, pixels)| (name.clone(), json!(pixels)))
            .collect();
        json!({ "bands": bands, "properties": self.properties })
    }
}

#[derive(Debug, Clone)]
enum Filter {
    LessThan(String, f64),
    GreaterThan(String, f64),
}

impl Filter {
    fn accepts(&self, raster: &Raster) -> bool {
        let value = |key: &str| raster.properties.get(key).and_then(Value::as_f64);
        match self {
            Filter::LessThan(key, bound) => value(key).is_some_and(|v| v < *bound),
            Filter::GreaterThan(key, bound) => value(key).is_some_and(|v| v > *bound),
        }
    }
}

#[derive(Debug, Clone)]
enum Val {
    Json(Value),
    Image(Raster),
    Collection(Vec<Raster>),
    List(Vec<Val>),
    Filter(Filter),
    Function { arguments: Vec<String>, body: String },
}

type Env = BTreeMap<String, Val>;

fn unsupported(what: impl std::fmt::Display) -> CloudFreeError {
    CloudFreeError::Service(format!("mock: {what}"))
}

#[derive(Debug, Default)]
pub struct MockService {
    pixels: usize,
    assets: BTreeMap<String, Raster>,
    map_requests: Cell<usize>,
}

impl MockService {
    pub fn new(pixels: usize) -> Self {
        Self {
            pixels,
            ..Default::default()
        }
    }

    pub fn asset(mut self, id: &str, raster: Raster) -> Self {
        assert!(raster.bands.iter().all(|(_, p)| p.len() == self.pixels));
        self.assets.insert(id.into(), raster);
        self
    }

    pub fn map_requests(&self) -> usize {
        self.map_requests.get()
    }

    fn eval(&self, encoded: &Encoded, reference: &Value, env: &Env) -> Result<Val> {
        let id = reference
            .get("valueReference")
            .and_then(Value::as_str)
            .ok_or_else(|| unsupported(format!("inline value {reference}")))?;
        self.eval_id(encoded, id, env)
    }

    fn eval_id(&self, encoded: &Encoded, id: &str, env: &Env) -> Result<Val> {
        let value = encoded
            .value(id)
            .ok_or_else(|| unsupported(format!("dangling reference {id}")))?;
        if let Some(constant) = value.get("constantValue") {
            return Ok(Val::Json(constant.clone()));
        }
        if let Some(name) = value.get("argumentReference").and_then(Value::as_str) {
            return env
                .get(name)
                .cloned()
                .ok_or_else(|| unsupported(format!("unbound argument {name}")));
        }
        if let Some(definition) = value.get("functionDefinitionValue") {
            let arguments = definition["argumentNames"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|name| name.as_str().map(str::to_string))
                .collect();
            let body = definition["body"].as_str().unwrap_or_default().to_string();
            return Ok(Val::Function { arguments, body });
        }
        if let Some(items) = value.pointer("/arrayValue/values").and_then(Value::as_array) {
            return items
                .iter()
                .map(|item| self.eval(encoded, item, env))
                .collect::<Result<_>>()
                .map(Val::List);
        }
        if let Some(invocation) = value.get("functionInvocationValue") {
            let function = invocation["functionName"].as_str().unwrap_or_default();
            let empty = serde_json::Map::new();
            let arguments = invocation["arguments"].as_object().unwrap_or(&empty);
            let mut args = BTreeMap::new();
            for (name, reference) in arguments {
                args.insert(name.as_str(), self.eval(encoded, reference, env)?);
            }
            return self.invoke(encoded, function, args);
        }
        Err(unsupported(format!("value {value}")))
    }

    fn invoke(&self, encoded: &Encoded, function: &str, mut args: BTreeMap<&str, Val>) -> Result<Val> {
        let mut take = |name: &str| {
            args.remove(name)
                .ok_or_else(|| unsupported(format!("{function} without {name}")))
        };
        match function {
            "Image.load" => {
                let id = json_of(take("id")?)?;
                let id = id.as_str().unwrap_or_default();
                self.assets
                    .get(id)
                    .cloned()
                    .map(Val::Image)
                    .ok_or_else(|| CloudFreeError::Service(format!("Image asset '{id}' not found")))
            }
            "Image.constant" => {
                let value = json_of(take("value")?)?.as_f64();
                Ok(Val::Image(
                    Raster::default().band("constant", vec![value; self.pixels]),
                ))
            }
            "Image.rename" => {
                let mut image = image_of(take("input")?)?;
                let names = json_of(take("names")?)?;
                for ((band, _), name) in image.bands.iter_mut().zip(strings(&names)) {
                    *band = name;
                }
                Ok(Val::Image(image))
            }
            "Image.select" => {
                let image = image_of(take("input")?)?;
                let selectors = strings(&json_of(take("bandSelectors")?)?);
                let bands = selectors
                    .iter()
                    .map(|name| {
                        image
                            .get(name)
                            .map(|pixels| (name.clone(), pixels.clone()))
                            .ok_or_else(|| {
                                CloudFreeError::Service(format!("Band '{name}' not found"))
                            })
                    })
                    .collect::<Result<_>>()?;
                Ok(Val::Image(Raster {
                    bands,
                    properties: image.properties,
                }))
            }
            "Image.addBands" => {
                let mut dst = image_of(take("dstImg")?)?;
                dst.bands.extend(image_of(take("srcImg")?)?.bands);
                Ok(Val::Image(dst))
            }
            "Image.updateMask" => {
                let mut image = image_of(take("image")?)?;
                let mask = image_of(take("mask")?)?;
                let mask = mask.bands.first().map(|(_, p)| p.clone()).unwrap_or_default();
                for (_, pixels) in image.bands.iter_mut() {
                    for (pixel, keep) in pixels.iter_mut().zip(&mask) {
                        if !matches!(keep, Some(m) if *m != 0.0) {
                            *pixel = None;
                        }
                    }
                }
                Ok(Val::Image(image))
            }
            "Element.set" => {
                let mut image = image_of(take("object")?)?;
                let key = json_of(take("key")?)?;
                let value = json_of(take("value")?)?;
                image
                    .properties
                    .insert(key.as_str().unwrap_or_default().into(), value);
                Ok(Val::Image(image))
            }
            "Element.get" => {
                let image = image_of(take("object")?)?;
                let property = json_of(take("property")?)?;
                Ok(Val::Json(
                    image
                        .properties
                        .get(property.as_str().unwrap_or_default())
                        .cloned()
                        .unwrap_or(Value::Null),
                ))
            }
            "Number.add" | "Number.multiply" | "Number.divide" => {
                let left = json_of(take("left")?)?.as_f64();
                let right = json_of(take("right")?)?.as_f64();
                let result = left.zip(right).map(|(l, r)| match function {
                    "Number.add" => l + r,
                    "Number.multiply" => l * r,
                    _ => l / r,
                });
                Ok(Val::Json(json!(result)))
            }
            "Filter.lessThan" | "Filter.greaterThan" => {
                let field = json_of(take("leftField")?)?;
                let field = field.as_str().unwrap_or_default().to_string();
                let bound = json_of(take("rightValue")?)?.as_f64().unwrap_or(f64::NAN);
                Ok(Val::Filter(if function == "Filter.lessThan" {
                    Filter::LessThan(field, bound)
                } else {
                    Filter::GreaterThan(field, bound)
                }))
            }
            "ImageCollection.load" => Ok(Val::Collection(self.assets.values().cloned().collect())),
            "ImageCollection.fromImages" => match take("images")? {
                Val::List(items) => items
                    .into_iter()
                    .map(image_of)
                    .collect::<Result<_>>()
                    .map(Val::Collection),
                other => Err(unsupported(format!("images {other:?}"))),
            },
            "Collection.filter" => {
                let images = collection_of(take("collection")?)?;
                let Val::Filter(filter) = take("filter")? else {
                    return Err(unsupported("filter is not a filter"));
                };
                Ok(Val::Collection(
                    images.into_iter().filter(|image| filter.accepts(image)).collect(),
                ))
            }
            "Collection.limit" => {
                let mut images = collection_of(take("collection")?)?;
                let key = json_of(take("key")?)?;
                let key = key.as_str().unwrap_or_default();
                let ascending = json_of(take("ascending")?)?.as_bool().unwrap_or(true);
                let sort_value =
                    |image: &Raster| image.properties.get(key).and_then(Value::as_f64).unwrap_or(f64::NAN);
                images.sort_by(|a, b| {
                    let order = sort_value(a).total_cmp(&sort_value(b));
                    if ascending {
                        order
                    } else {
                        order.reverse()
                    }
                });
                Ok(Val::Collection(images))
            }
            "Collection.map" => {
                let images = collection_of(take("collection")?)?;
                let Val::Function { arguments, body } = take("baseAlgorithm")? else {
                    return Err(unsupported("baseAlgorithm is not a function"));
                };
                images
                    .into_iter()
                    .map(|image| {
                        let env: Env = arguments
                            .iter()
                            .cloned()
                            .zip([Val::Image(image)])
                            .collect();
                        self.eval_id(encoded, &body, &env).and_then(image_of)
                    })
                    .collect::<Result<_>>()
                    .map(Val::Collection)
            }
            "ImageCollection.mosaic" => Ok(Val::Image(self.mosaic(&collection_of(take("collection")?)?))),
            "ImageCollection.qualityMosaic" => {
                let images = collection_of(take("collection")?)?;
                let band = json_of(take("qualityBand")?)?;
                Ok(Val::Image(
                    self.quality_mosaic(&images, band.as_str().unwrap_or_default()),
                ))
            }
            other => Err(unsupported(format!("algorithm {other} is not implemented"))),
        }
    }

    /// Later images on top, per band and pixel.
    fn mosaic(&self, images: &[Raster]) -> Raster {
        let mut composite = Raster::default();
        for image in images {
            for (name, pixels) in &image.bands {
                match composite.bands.iter_mut().find(|(band, _)| band == name) {
                    Some((_, below)) => {
                        for (below, above) in below.iter_mut().zip(pixels) {
                            if above.is_some() {
                                *below = *above;
                            }
                        }
                    }
                    None => composite.bands.push((name.clone(), pixels.clone())),
                }
            }
        }
        composite
    }

    /// Per pixel, every band of the image with the highest quality.
    fn quality_mosaic(&self, images: &[Raster], quality_band: &str) -> Raster {
        let mut composite = Raster::default();
        for (name, _) in images.iter().flat_map(|image| &image.bands) {
            if composite.get(name).is_none() {
                composite.bands.push((name.clone(), vec![None; self.pixels]));
            }
        }
        for pixel in 0..self.pixels {
            let best = images
                .iter()
                .filter_map(|image| Some((image.get(quality_band)?[pixel]?, image)))
                .max_by(|(a, _), (b, _)| a.total_cmp(b));
            let Some((_, best)) = best else {
                continue;
            };
            for (name, pixels) in &best.bands {
                if let Some((_, out)) = composite.bands.iter_mut().find(|(band, _)| band == name) {
                    out[pixel] = pixels[pixel];
                }
            }
        }
        composite
    }
}

fn json_of(val: Val) -> Result<Value> {
    match val {
        Val::Json(value) => Ok(value),
        other => Err(unsupported(format!("expected a JSON value, got {other:?}"))),
    }
}

fn image_of(val: Val) -> Result<Raster> {
    match val {
        Val::Image(image) => Ok(image),
        other => Err(unsupported(format!("expected an image, got {other:?}"))),
    }
}

fn collection_of(val: Val) -> Result<Vec<Raster>> {
    match val {
        Val::Collection(images) => Ok(images),
        other => Err(unsupported(format!("expected a collection, got {other:?}"))),
    }
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

impl ComputeService for MockService {
    fn compute_value(&self, expression: &Encoded) -> Result<Value> {
        Ok(match self.eval_id(expression, &expression.result, &Env::new())? {
            Val::Json(value) => value,
            Val::Image(image) => image.to_json(),
            Val::Collection(images) => Value::Array(images.iter().map(Raster::to_json).collect()),
            other => return Err(unsupported(format!("cannot materialize {other:?}"))),
        })
    }

    fn get_map_id(&self, image: &Encoded, vis: &VisParams) -> Result<MapId> {
        // Rendering needs a valid image.
        self.compute_value(image)?;
        let request = self.map_requests.get();
        self.map_requests.set(request + 1);
        MapId::from_response(&json!({
            "name": format!("projects/mock/maps/{request}"),
            "token": serde_json::to_string(vis)?,
        }))
    }
}
