// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed key-value properties attached to edges and faces.
//!
//! Properties travel with the geometry: slicing an edge copies them to every
//! piece, cutting a face copies them to every new face, and gluing merges
//! them with the first input winning on conflicting keys.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cast::{SpatialTag, TemporalTag, TypedCellKey};
use crate::cell::CellData;
use crate::complex::Complex;

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Int(i64),
    Double(f64),
    String(String),
    /// RGBA, components in `[0, 1]`.
    Color([f64; 4]),
    List(Vec<PropValue>),
}

/// Property map of a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(FxHashMap<String, PropValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropValue) -> Option<PropValue> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Adds the entries of `other` whose keys are not already present.
    pub fn merge_missing(&mut self, other: &Properties) {
        for (k, v) in &other.0 {
            self.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    /// Merges several property maps, earlier maps winning on conflicts.
    pub fn merged<'a>(all: impl IntoIterator<Item = &'a Properties>) -> Properties {
        let mut result = Properties::new();
        for p in all {
            result.merge_missing(p);
        }
        result
    }
}

impl Complex {
    /// Properties of an edge or face. `None` for vertices, inbetween cells
    /// and stale keys.
    pub fn cell_properties<S: SpatialTag, T: TemporalTag>(
        &self,
        cell: TypedCellKey<S, T>,
    ) -> Option<&Properties> {
        match &self.try_cell(cell.key()).ok()?.data {
            CellData::KeyEdge(e) => Some(e.data.properties()),
            CellData::KeyFace(f) => Some(&f.properties),
            _ => None,
        }
    }

    /// Mutable access to the properties of an edge or face.
    pub fn cell_properties_mut<S: SpatialTag, T: TemporalTag>(
        &mut self,
        cell: TypedCellKey<S, T>,
    ) -> Option<&mut Properties> {
        let key = cell.key();
        self.cell_properties(cell)?;
        let id = self.try_node(key).ok()?.id;
        self.diff.on_geometry_changed(id);
        match &mut self.try_cell_mut(key).ok()?.data {
            CellData::KeyEdge(e) => Some(e.data.properties_mut()),
            CellData::KeyFace(f) => Some(&mut f.properties),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimTime, KeyEdgeData};
    use nalgebra::Point2;
    use vac_lite_geometry::Stroke2d;

    fn circle_edge(complex: &mut Complex) -> crate::KeyEdgeKey {
        let positions = (0..8)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 8.0;
                Point2::new(a.cos(), a.sin())
            })
            .collect();
        let data = KeyEdgeData::new(Stroke2d::new(positions, vec![], true).unwrap());
        let root = complex.root();
        complex
            .create_key_closed_edge(data, root, None, AnimTime::default())
            .unwrap()
    }

    #[test]
    fn merged_keeps_first_value() {
        let mut a = Properties::new();
        a.insert("color", PropValue::String("red".to_string()));
        let mut b = Properties::new();
        b.insert("color", PropValue::String("blue".to_string()));
        b.insert("weight", PropValue::Double(2.0));

        let m = Properties::merged([&a, &b]);
        assert_eq!(m.get("color"), Some(&PropValue::String("red".to_string())));
        assert_eq!(m.get("weight"), Some(&PropValue::Double(2.0)));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn edge_properties_are_editable() {
        let mut complex = Complex::new();
        let e = circle_edge(&mut complex);
        complex
            .cell_properties_mut(e)
            .unwrap()
            .insert("id", PropValue::Int(42));
        assert_eq!(
            complex.cell_properties(e).unwrap().get("id"),
            Some(&PropValue::Int(42))
        );
    }

    #[test]
    fn vertices_have_no_properties() {
        let mut complex = Complex::new();
        let root = complex.root();
        let v = complex
            .create_key_vertex(Point2::origin(), root, None, AnimTime::default())
            .unwrap();
        assert!(complex.cell_properties(v).is_none());
    }

    #[test]
    fn nested_list_values_serialize() {
        let mut p = Properties::new();
        p.insert(
            "stops",
            PropValue::List(vec![PropValue::Int(1), PropValue::Color([1.0, 0.0, 0.0, 1.0])]),
        );
        let json = serde_json::to_string(&p).unwrap();
        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
