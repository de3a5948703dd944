//! Named map layers and the registry that owns them.
//!
//! Every refresh goes through [`LayerManager::begin`] and
//! [`LayerManager::apply`]: the ticket taken before fetching is checked when
//! the data arrives, so a slow, older response never overwrites a newer one.
//! A layer that can refresh in place is updated; anything else is rebuilt and
//! re-registered under the same name.

use crate::error::Result;
use geo::{Area, BoundingRect, Centroid, Geometry, MultiPolygon, Polygon};
use geojson::FeatureCollection;
use ratatui::style::Color;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One drawable feature with its properties.
#[derive(Clone, Debug)]
pub struct Shape {
    pub geometry: Geometry<f64>,
    pub properties: Map<String, Value>,
}

impl Shape {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    pub fn anchor(&self) -> Option<(f64, f64)> {
        self.geometry.centroid().map(|p| (p.x(), p.y()))
    }
}

/// Converts a collection into shapes, dropping features without geometry.
///
/// Multi-polygons keep only parts at least a fifth the size of their largest
/// part, which keeps islets from cluttering a terminal canvas.
pub fn shapes_from(data: FeatureCollection) -> Result<Vec<Shape>> {
    let mut shapes = Vec::with_capacity(data.features.len());
    for feature in data.features {
        let Some(gj) = feature.geometry else { continue };
        let mut geometry: Geometry<f64> = gj.value.try_into()?;
        if let Geometry::MultiPolygon(mp) = &geometry {
            if mp.0.len() > 1 {
                geometry = Geometry::MultiPolygon(drop_fragments(mp));
            }
        }
        shapes.push(Shape { geometry, properties: feature.properties.unwrap_or_default() });
    }
    Ok(shapes)
}

fn drop_fragments(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let largest = mp.0.iter().map(|p| p.unsigned_area()).fold(0.0, f64::max);
    let kept: Vec<Polygon<f64>> = mp
        .0
        .iter()
        .filter(|p| p.unsigned_area() >= largest * 0.2)
        .cloned()
        .collect();
    MultiPolygon(kept)
}

/// `(min_x, min_y, max_x, max_y)` over all shapes.
pub fn extent(shapes: &[Shape]) -> Option<(f64, f64, f64, f64)> {
    shapes
        .iter()
        .filter_map(|s| s.geometry.bounding_rect())
        .fold(None, |acc, r| {
            let (x0, y0, x1, y1) = (r.min().x, r.min().y, r.max().x, r.max().y);
            Some(match acc {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            })
        })
}

#[derive(Clone, Debug)]
pub struct LayerStyle {
    pub color: Color,
    /// Property that drives shading; `None` draws outlines only.
    pub value_property: Option<String>,
    /// Property used for on-map labels.
    pub label_property: Option<String>,
}

impl LayerStyle {
    pub fn outline(color: Color, label_property: &str) -> Self {
        Self { color, value_property: None, label_property: Some(label_property.to_string()) }
    }

    pub fn shaded(color: Color, value_property: &str) -> Self {
        Self { color, value_property: Some(value_property.to_string()), label_property: None }
    }
}

/// A layer that refreshes its features in place instead of being rebuilt.
pub trait UpdatableLayer {
    fn update_features(&mut self, data: FeatureCollection) -> Result<()>;

    /// Marks the layer dirty so the next frame redraws it.
    fn changed(&mut self);

    fn revision(&self) -> u64;
}

/// Thematic data layer, shaded by a value property.
#[derive(Clone, Debug)]
pub struct FeatureLayer {
    shapes: Vec<Shape>,
    style: LayerStyle,
    value_range: Option<(f64, f64)>,
    revision: u64,
}

impl FeatureLayer {
    pub fn new(data: FeatureCollection, style: LayerStyle) -> Result<Self> {
        let mut layer = Self { shapes: Vec::new(), style, value_range: None, revision: 0 };
        layer.replace_shapes(shapes_from(data)?);
        Ok(layer)
    }

    /// Min and max of the shading property across the layer.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.value_range
    }

    fn replace_shapes(&mut self, shapes: Vec<Shape>) {
        self.value_range = self.style.value_property.as_deref().and_then(|key| {
            shapes.iter().filter_map(|s| s.number(key)).fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
        });
        self.shapes = shapes;
    }
}

impl UpdatableLayer for FeatureLayer {
    fn update_features(&mut self, data: FeatureCollection) -> Result<()> {
        let shapes = shapes_from(data)?;
        self.replace_shapes(shapes);
        Ok(())
    }

    fn changed(&mut self) {
        self.revision += 1;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Administrative outlines. Rebuilt whenever its data changes.
#[derive(Clone, Debug)]
pub struct BoundaryLayer {
    shapes: Vec<Shape>,
    style: LayerStyle,
}

impl BoundaryLayer {
    pub fn new(data: FeatureCollection, style: LayerStyle) -> Result<Self> {
        Ok(Self { shapes: shapes_from(data)?, style })
    }
}

#[derive(Clone, Debug)]
pub enum MapLayer {
    Features(FeatureLayer),
    Boundary(BoundaryLayer),
}

impl MapLayer {
    pub fn shapes(&self) -> &[Shape] {
        match self {
            MapLayer::Features(l) => &l.shapes,
            MapLayer::Boundary(l) => &l.shapes,
        }
    }

    pub fn style(&self) -> &LayerStyle {
        match self {
            MapLayer::Features(l) => &l.style,
            MapLayer::Boundary(l) => &l.style,
        }
    }

    pub fn value_range(&self) -> Option<(f64, f64)> {
        match self {
            MapLayer::Features(l) => l.value_range(),
            MapLayer::Boundary(_) => None,
        }
    }

    pub fn as_updatable(&mut self) -> Option<&mut dyn UpdatableLayer> {
        match self {
            MapLayer::Features(l) => Some(l),
            MapLayer::Boundary(_) => None,
        }
    }
}

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Proof that a refresh of `name` was requested; only the newest ticket per
/// name is honoured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    manager: u64,
    pub name: String,
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    Replaced,
    Stale,
}

struct Slot {
    layer: MapLayer,
    z_index: i32,
    order: u64,
}

/// Registry of the map's visible layers, at most one per name.
pub struct LayerManager {
    id: u64,
    layers: HashMap<String, Slot>,
    generations: HashMap<String, u64>,
    inserted: u64,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            layers: HashMap::new(),
            generations: HashMap::new(),
            inserted: 0,
        }
    }

    pub fn get_layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.get(name).map(|s| &s.layer)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Registers `layer` under `name`, replacing whatever was there.
    pub fn add_layer(&mut self, layer: MapLayer, name: &str, z_index: Option<i32>) {
        self.inserted += 1;
        let slot = Slot { layer, z_index: z_index.unwrap_or(0), order: self.inserted };
        if self.layers.insert(name.to_string(), slot).is_some() {
            log::debug!("layer {name} replaced");
        }
    }

    /// Detaches the layer and invalidates every outstanding ticket for it.
    pub fn remove_layer(&mut self, name: &str) -> Option<MapLayer> {
        self.invalidate(name);
        self.layers.remove(name).map(|s| s.layer)
    }

    pub fn clear(&mut self) {
        let names: Vec<String> = self.layers.keys().cloned().collect();
        for name in names {
            self.remove_layer(&name);
        }
    }

    /// Layers bottom to top: by z-index, then by registration order.
    pub fn ordered(&self) -> Vec<(&str, &MapLayer)> {
        let mut slots: Vec<(&String, &Slot)> = self.layers.iter().collect();
        slots.sort_by_key(|(_, s)| (s.z_index, s.order));
        slots.into_iter().map(|(n, s)| (n.as_str(), &s.layer)).collect()
    }

    pub fn begin(&mut self, name: &str) -> Ticket {
        let generation = self.invalidate(name);
        Ticket { manager: self.id, name: name.to_string(), generation }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.manager == self.id && self.generations.get(&ticket.name) == Some(&ticket.generation)
    }

    fn invalidate(&mut self, name: &str) -> u64 {
        let generation = self.generations.entry(name.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Upserts the data a ticket was issued for.
    pub fn apply<F>(
        &mut self,
        ticket: &Ticket,
        data: FeatureCollection,
        z_index: Option<i32>,
        build: F,
    ) -> Result<Upsert>
    where
        F: FnOnce(FeatureCollection) -> Result<MapLayer>,
    {
        if !self.is_current(ticket) {
            log::debug!("dropping stale response for {}", ticket.name);
            return Ok(Upsert::Stale);
        }
        if let Some(slot) = self.layers.get_mut(&ticket.name) {
            if let Some(layer) = slot.layer.as_updatable() {
                layer.update_features(data)?;
                layer.changed();
                return Ok(Upsert::Updated);
            }
        }
        let existed = self.layers.contains_key(&ticket.name);
        let layer = build(data)?;
        self.add_layer(layer, &ticket.name, z_index);
        Ok(if existed { Upsert::Replaced } else { Upsert::Created })
    }

    /// Begin and apply in one step, for data already at hand.
    pub fn upsert<F>(&mut self, name: &str, data: FeatureCollection, z_index: Option<i32>, build: F) -> Result<Upsert>
    where
        F: FnOnce(FeatureCollection) -> Result<MapLayer>,
    {
        let ticket = self.begin(name);
        self.apply(&ticket, data, z_index, build)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geojson::{Feature, Geometry as GjGeometry, Value as GjValue};

    pub(crate) fn points(values: &[(f64, f64, f64)]) -> FeatureCollection {
        let features = values
            .iter()
            .map(|&(x, y, v)| {
                let mut props = Map::new();
                props.insert("value".into(), Value::from(v));
                Feature {
                    bbox: None,
                    geometry: Some(GjGeometry::new(GjValue::Point(vec![x, y]))),
                    id: None,
                    properties: Some(props),
                    foreign_members: None,
                }
            })
            .collect();
        FeatureCollection { bbox: None, features, foreign_members: None }
    }

    fn feature_layer(data: FeatureCollection) -> Result<MapLayer> {
        Ok(MapLayer::Features(FeatureLayer::new(data, LayerStyle::shaded(Color::Green, "value"))?))
    }

    fn boundary_layer(data: FeatureCollection) -> Result<MapLayer> {
        Ok(MapLayer::Boundary(BoundaryLayer::new(data, LayerStyle::outline(Color::White, "name"))?))
    }

    #[test]
    fn repeated_refreshes_keep_one_layer() {
        let mut mgr = LayerManager::new();
        let mut outcomes = Vec::new();
        for i in 0..5 {
            let data = points(&[(126.5, 33.4, i as f64)]);
            outcomes.push(mgr.upsert("crops", data, None, feature_layer).unwrap());
            assert_eq!(mgr.len(), 1);
        }
        assert_eq!(outcomes[0], Upsert::Created);
        assert!(outcomes[1..].iter().all(|o| *o == Upsert::Updated));
        assert_eq!(mgr.get_layer("crops").unwrap().value_range(), Some((4.0, 4.0)));
    }

    #[test]
    fn older_response_arriving_late_is_dropped() {
        let mut mgr = LayerManager::new();
        let a = mgr.begin("crops");
        let b = mgr.begin("crops");
        let got_b = mgr.apply(&b, points(&[(0.0, 0.0, 2.0)]), None, feature_layer).unwrap();
        let got_a = mgr.apply(&a, points(&[(0.0, 0.0, 1.0)]), None, feature_layer).unwrap();
        assert_eq!(got_b, Upsert::Created);
        assert_eq!(got_a, Upsert::Stale);
        assert_eq!(mgr.get_layer("crops").unwrap().value_range(), Some((2.0, 2.0)));
    }

    #[test]
    fn static_layers_are_rebuilt() {
        let mut mgr = LayerManager::new();
        mgr.upsert("outline", points(&[(0.0, 0.0, 0.0)]), Some(-1), boundary_layer).unwrap();
        let again = mgr.upsert("outline", points(&[(1.0, 1.0, 0.0), (2.0, 2.0, 0.0)]), Some(-1), boundary_layer);
        assert_eq!(again.unwrap(), Upsert::Replaced);
        assert_eq!(mgr.get_layer("outline").unwrap().shapes().len(), 2);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn removal_invalidates_pending_tickets() {
        let mut mgr = LayerManager::new();
        let t = mgr.begin("crops");
        mgr.remove_layer("crops");
        let got = mgr.apply(&t, points(&[(0.0, 0.0, 1.0)]), None, feature_layer).unwrap();
        assert_eq!(got, Upsert::Stale);
        assert!(mgr.get_layer("crops").is_none());
    }

    #[test]
    fn tickets_do_not_cross_managers() {
        let mut first = LayerManager::new();
        let mut second = LayerManager::new();
        let t = first.begin("crops");
        second.begin("crops");
        assert!(!second.is_current(&t));
    }

    #[test]
    fn ordered_by_z_then_insertion() {
        let mut mgr = LayerManager::new();
        mgr.upsert("data", points(&[]), Some(10), feature_layer).unwrap();
        mgr.upsert("outline", points(&[]), None, boundary_layer).unwrap();
        mgr.upsert("labels", points(&[]), Some(10), feature_layer).unwrap();
        let names: Vec<&str> = mgr.ordered().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["outline", "data", "labels"]);
    }

    #[test]
    fn changed_bumps_revision_on_update() {
        let mut mgr = LayerManager::new();
        mgr.upsert("crops", points(&[(0.0, 0.0, 1.0)]), None, feature_layer).unwrap();
        mgr.upsert("crops", points(&[(0.0, 0.0, 1.0)]), None, feature_layer).unwrap();
        match mgr.get_layer("crops") {
            Some(MapLayer::Features(l)) => assert_eq!(l.revision(), 1),
            other => panic!("unexpected layer {:?}", other.map(|l| l.shapes().len())),
        }
    }

    #[test]
    fn extent_covers_all_shapes() {
        let shapes = shapes_from(points(&[(126.2, 33.2, 0.0), (126.9, 33.5, 0.0)])).unwrap();
        assert_eq!(extent(&shapes), Some((126.2, 33.2, 126.9, 33.5)));
        assert_eq!(extent(&[]), None);
    }
}
