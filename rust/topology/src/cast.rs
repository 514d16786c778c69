// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed cell handles and casts between cell views.
//!
//! A cell can be viewed at twelve levels of precision: as any cell, by its
//! spatial type only (vertex, edge, face cell), by its temporal type only
//! (key, inbetween cell), or fully resolved (key vertex, ..., inbetween
//! face). Each view is a [`TypedCellKey`] instantiated with a zero-sized
//! spatial tag and temporal tag from the [`spatial`] and [`temporal`]
//! modules, where [`spatial::Any`] / [`temporal::Any`] mean "not statically
//! known".
//!
//! Casting between views is checked twice:
//!
//! - at compile time, a cast whose source and target tags are known to be
//!   different (e.g. a key vertex to a face cell) does not type-check;
//! - at run time, [`dynamic_cell_cast`] compares the handle's [`CellType`]
//!   against the target view and returns `None` on mismatch, while
//!   [`static_cell_cast`] trusts the caller (debug-asserted).
//!
//! ```
//! use vac_lite_topology::{static_cell_cast, dynamic_cell_cast};
//! use vac_lite_topology::{CellKey, EdgeCellKey, KeyCellKey, KeyEdgeKey};
//!
//! fn widen(e: KeyEdgeKey) -> EdgeCellKey {
//!     static_cell_cast(e)
//! }
//!
//! fn narrow(c: CellKey) -> Option<KeyEdgeKey> {
//!     dynamic_cell_cast(c)
//! }
//!
//! fn cross(k: KeyCellKey) -> Option<EdgeCellKey> {
//!     k.to_edge_cell()
//! }
//! ```
//!
//! Statically incompatible casts are rejected:
//!
//! ```compile_fail
//! use vac_lite_topology::{static_cell_cast, KeyEdgeKey, KeyVertexKey};
//!
//! fn bad(e: KeyEdgeKey) -> KeyVertexKey {
//!     static_cell_cast(e)
//! }
//! ```
//!
//! ```compile_fail
//! use vac_lite_topology::{static_cell_cast, FaceCellKey, KeyVertexKey};
//!
//! fn bad(v: KeyVertexKey) -> FaceCellKey {
//!     static_cell_cast(v)
//! }
//! ```
//!
//! ```compile_fail
//! use vac_lite_topology::{dynamic_cell_cast, InbetweenCellKey, KeyCellKey};
//!
//! fn bad(k: KeyCellKey) -> Option<InbetweenCellKey> {
//!     dynamic_cell_cast(k)
//! }
//! ```
//!
//! Named accessors follow the same rules:
//!
//! ```compile_fail
//! use vac_lite_topology::{KeyFaceKey, KeyVertexKey};
//!
//! fn bad(v: KeyVertexKey) -> Option<KeyFaceKey> {
//!     v.to_key_face()
//! }
//! ```
//!
//! ```compile_fail
//! use vac_lite_topology::{InbetweenVertexKey, KeyVertexKey};
//!
//! fn bad(v: KeyVertexKey) -> InbetweenVertexKey {
//!     v.to_inbetween_vertex_unchecked()
//! }
//! ```
//!
//! ```compile_fail
//! use vac_lite_topology::{EdgeCellKey, VertexCellKey};
//!
//! fn bad(v: VertexCellKey) -> Option<EdgeCellKey> {
//!     v.to_edge_cell()
//! }
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::cell_type::{CellSpatialType, CellTemporalType, CellType};
use crate::keys::NodeKey;

mod sealed {
    pub trait Sealed {}

    pub trait FromParts {
        fn from_parts_unchecked(
            key: crate::keys::NodeKey,
            cell_type: crate::cell_type::CellType,
        ) -> Self;
    }
}

/// Spatial tags.
pub mod spatial {
    /// Spatial type not statically known.
    #[derive(Debug)]
    pub enum Any {}
    /// Vertex cells.
    #[derive(Debug)]
    pub enum Vertex {}
    /// Edge cells.
    #[derive(Debug)]
    pub enum Edge {}
    /// Face cells.
    #[derive(Debug)]
    pub enum Face {}
}

/// Temporal tags.
pub mod temporal {
    /// Temporal type not statically known.
    #[derive(Debug)]
    pub enum Any {}
    /// Key cells.
    #[derive(Debug)]
    pub enum Key {}
    /// Inbetween cells.
    #[derive(Debug)]
    pub enum Inbetween {}
}

/// A spatial tag. `SPATIAL` is `None` for [`spatial::Any`].
pub trait SpatialTag: sealed::Sealed + 'static {
    const SPATIAL: Option<CellSpatialType>;
}

/// A temporal tag. `TEMPORAL` is `None` for [`temporal::Any`].
pub trait TemporalTag: sealed::Sealed + 'static {
    const TEMPORAL: Option<CellTemporalType>;
}

/// Implemented when a cell viewed with spatial tag `From` may also be a
/// cell of spatial tag `Self`, i.e. the two tags are not statically known to
/// differ.
pub trait CastFromSpatial<From: SpatialTag>: SpatialTag {}

/// Temporal counterpart of [`CastFromSpatial`].
pub trait CastFromTemporal<From: TemporalTag>: TemporalTag {}

/// Implemented when every cell with tag `Self` also has tag `To`.
pub trait SpatialWidensTo<To: SpatialTag>: SpatialTag {}

/// Temporal counterpart of [`SpatialWidensTo`].
pub trait TemporalWidensTo<To: TemporalTag>: TemporalTag {}

impl sealed::Sealed for spatial::Any {}
impl SpatialTag for spatial::Any {
    const SPATIAL: Option<CellSpatialType> = None;
}
impl<From: SpatialTag> CastFromSpatial<From> for spatial::Any {}
impl<S: SpatialTag> SpatialWidensTo<spatial::Any> for S {}

impl sealed::Sealed for temporal::Any {}
impl TemporalTag for temporal::Any {
    const TEMPORAL: Option<CellTemporalType> = None;
}
impl<From: TemporalTag> CastFromTemporal<From> for temporal::Any {}
impl<T: TemporalTag> TemporalWidensTo<temporal::Any> for T {}

macro_rules! spatial_tags {
    ($($tag:ident => $value:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for spatial::$tag {}
            impl SpatialTag for spatial::$tag {
                const SPATIAL: Option<CellSpatialType> = Some(CellSpatialType::$value);
            }
            impl CastFromSpatial<spatial::Any> for spatial::$tag {}
            impl CastFromSpatial<spatial::$tag> for spatial::$tag {}
            impl SpatialWidensTo<spatial::$tag> for spatial::$tag {}
        )*
    };
}

macro_rules! temporal_tags {
    ($($tag:ident => $value:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for temporal::$tag {}
            impl TemporalTag for temporal::$tag {
                const TEMPORAL: Option<CellTemporalType> = Some(CellTemporalType::$value);
            }
            impl CastFromTemporal<temporal::Any> for temporal::$tag {}
            impl CastFromTemporal<temporal::$tag> for temporal::$tag {}
            impl TemporalWidensTo<temporal::$tag> for temporal::$tag {}
        )*
    };
}

spatial_tags!(Vertex => Vertex, Edge => Edge, Face => Face);
temporal_tags!(Key => Key, Inbetween => Inbetween);

/// Handle to a cell of a complex, viewed with spatial tag `S` and temporal
/// tag `T`.
///
/// The handle stores the node key and the runtime cell type, so runtime
/// checks never need to consult the complex. Equality and hashing only use
/// the node key, so handles of different views of the same cell compare
/// equal.
pub struct TypedCellKey<S, T> {
    key: NodeKey,
    cell_type: CellType,
    _tags: PhantomData<fn() -> (S, T)>,
}

pub type CellKey = TypedCellKey<spatial::Any, temporal::Any>;
pub type VertexCellKey = TypedCellKey<spatial::Vertex, temporal::Any>;
pub type EdgeCellKey = TypedCellKey<spatial::Edge, temporal::Any>;
pub type FaceCellKey = TypedCellKey<spatial::Face, temporal::Any>;
pub type KeyCellKey = TypedCellKey<spatial::Any, temporal::Key>;
pub type InbetweenCellKey = TypedCellKey<spatial::Any, temporal::Inbetween>;
pub type KeyVertexKey = TypedCellKey<spatial::Vertex, temporal::Key>;
pub type KeyEdgeKey = TypedCellKey<spatial::Edge, temporal::Key>;
pub type KeyFaceKey = TypedCellKey<spatial::Face, temporal::Key>;
pub type InbetweenVertexKey = TypedCellKey<spatial::Vertex, temporal::Inbetween>;
pub type InbetweenEdgeKey = TypedCellKey<spatial::Edge, temporal::Inbetween>;
pub type InbetweenFaceKey = TypedCellKey<spatial::Face, temporal::Inbetween>;

impl<S, T> Clone for TypedCellKey<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for TypedCellKey<S, T> {}

impl<S, T, S2, T2> PartialEq<TypedCellKey<S2, T2>> for TypedCellKey<S, T> {
    fn eq(&self, other: &TypedCellKey<S2, T2>) -> bool {
        self.key == other.key
    }
}

impl<S, T> Eq for TypedCellKey<S, T> {}

impl<S, T> PartialOrd for TypedCellKey<S, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, T> Ord for TypedCellKey<S, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<S, T> Hash for TypedCellKey<S, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<S, T> fmt::Debug for TypedCellKey<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.cell_type, self.key)
    }
}

impl<S, T> From<TypedCellKey<S, T>> for NodeKey {
    fn from(k: TypedCellKey<S, T>) -> Self {
        k.key
    }
}

impl<S: SpatialTag, T: TemporalTag> TypedCellKey<S, T> {
    /// Whether a cell of runtime type `cell_type` can be viewed as `Self`.
    pub fn accepts(cell_type: CellType) -> bool {
        S::SPATIAL.map_or(true, |s| s == cell_type.spatial_type())
            && T::TEMPORAL.map_or(true, |t| t == cell_type.temporal_type())
    }

    pub(crate) fn new_unchecked(key: NodeKey, cell_type: CellType) -> Self {
        debug_assert!(
            Self::accepts(cell_type),
            "{cell_type} cannot be viewed as {}/{}",
            std::any::type_name::<S>(),
            std::any::type_name::<T>()
        );
        Self {
            key,
            cell_type,
            _tags: PhantomData,
        }
    }

    pub(crate) fn try_new(key: NodeKey, cell_type: CellType) -> Option<Self> {
        Self::accepts(cell_type).then(|| Self::new_unchecked(key, cell_type))
    }

    /// The untyped node key.
    pub fn key(self) -> NodeKey {
        self.key
    }

    /// The runtime type of the cell.
    pub fn cell_type(self) -> CellType {
        self.cell_type
    }

    pub fn spatial_type(self) -> CellSpatialType {
        self.cell_type.spatial_type()
    }

    pub fn temporal_type(self) -> CellTemporalType {
        self.cell_type.temporal_type()
    }

    /// Infallible widening to a less precise view.
    pub fn upcast<S2: SpatialTag, T2: TemporalTag>(self) -> TypedCellKey<S2, T2>
    where
        S: SpatialWidensTo<S2>,
        T: TemporalWidensTo<T2>,
    {
        TypedCellKey::new_unchecked(self.key, self.cell_type)
    }

    /// Shorthand for `upcast::<spatial::Any, temporal::Any>()`.
    pub fn as_cell(self) -> CellKey {
        self.upcast()
    }
}

/// A typed view of a cell.
///
/// Sealed: the only implementors are the [`TypedCellKey`] instantiations.
pub trait CellView: sealed::FromParts + Copy {
    type Spatial: SpatialTag;
    type Temporal: TemporalTag;

    fn node_key(&self) -> NodeKey;
    fn runtime_type(&self) -> CellType;
}

impl<S: SpatialTag, T: TemporalTag> sealed::FromParts for TypedCellKey<S, T> {
    fn from_parts_unchecked(key: NodeKey, cell_type: CellType) -> Self {
        Self::new_unchecked(key, cell_type)
    }
}

impl<S: SpatialTag, T: TemporalTag> CellView for TypedCellKey<S, T> {
    type Spatial = S;
    type Temporal = T;

    fn node_key(&self) -> NodeKey {
        self.key
    }

    fn runtime_type(&self) -> CellType {
        self.cell_type
    }
}

fn view_accepts<V: CellView>(cell_type: CellType) -> bool {
    <V::Spatial as SpatialTag>::SPATIAL.map_or(true, |s| s == cell_type.spatial_type())
        && <V::Temporal as TemporalTag>::TEMPORAL.map_or(true, |t| t == cell_type.temporal_type())
}

/// Reinterprets `from` as the view `To` without a runtime check.
///
/// Does not compile when `To` and `From` are statically known to have
/// different spatial or temporal types. Passing a cell whose runtime type
/// does not match `To` is a logic error, caught by a debug assertion.
pub fn static_cell_cast<To, From>(from: From) -> To
where
    To: CellView,
    From: CellView,
    To::Spatial: CastFromSpatial<From::Spatial>,
    To::Temporal: CastFromTemporal<From::Temporal>,
{
    debug_assert!(
        view_accepts::<To>(from.runtime_type()),
        "invalid static_cell_cast from {}",
        from.runtime_type()
    );
    To::from_parts_unchecked(from.node_key(), from.runtime_type())
}

/// Views `from` as `To` if its runtime type matches, `None` otherwise.
///
/// Same compile-time restrictions as [`static_cell_cast`].
pub fn dynamic_cell_cast<To, From>(from: From) -> Option<To>
where
    To: CellView,
    From: CellView,
    To::Spatial: CastFromSpatial<From::Spatial>,
    To::Temporal: CastFromTemporal<From::Temporal>,
{
    view_accepts::<To>(from.runtime_type())
        .then(|| To::from_parts_unchecked(from.node_key(), from.runtime_type()))
}

macro_rules! cell_accessors {
    ($($checked:ident, $unchecked:ident => $spatial:ident, $temporal:ident;)*) => {
        impl<S: SpatialTag, T: TemporalTag> TypedCellKey<S, T> {
            $(
                #[doc = concat!("Runtime-checked view as `", stringify!($spatial), "`/`", stringify!($temporal), "`.")]
                pub fn $checked(self) -> Option<TypedCellKey<spatial::$spatial, temporal::$temporal>>
                where
                    spatial::$spatial: CastFromSpatial<S>,
                    temporal::$temporal: CastFromTemporal<T>,
                {
                    dynamic_cell_cast(self)
                }

                #[doc = concat!("Unchecked view as `", stringify!($spatial), "`/`", stringify!($temporal), "`.")]
                pub fn $unchecked(self) -> TypedCellKey<spatial::$spatial, temporal::$temporal>
                where
                    spatial::$spatial: CastFromSpatial<S>,
                    temporal::$temporal: CastFromTemporal<T>,
                {
                    static_cell_cast(self)
                }
            )*
        }
    };
}

cell_accessors! {
    to_cell, to_cell_unchecked => Any, Any;
    to_vertex_cell, to_vertex_cell_unchecked => Vertex, Any;
    to_edge_cell, to_edge_cell_unchecked => Edge, Any;
    to_face_cell, to_face_cell_unchecked => Face, Any;
    to_key_cell, to_key_cell_unchecked => Any, Key;
    to_inbetween_cell, to_inbetween_cell_unchecked => Any, Inbetween;
    to_key_vertex, to_key_vertex_unchecked => Vertex, Key;
    to_key_edge, to_key_edge_unchecked => Edge, Key;
    to_key_face, to_key_face_unchecked => Face, Key;
    to_inbetween_vertex, to_inbetween_vertex_unchecked => Vertex, Inbetween;
    to_inbetween_edge, to_inbetween_edge_unchecked => Edge, Inbetween;
    to_inbetween_face, to_inbetween_face_unchecked => Face, Inbetween;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn cell(cell_type: CellType) -> CellKey {
        CellKey::new_unchecked(NodeKey::default(), cell_type)
    }

    #[test]
    fn dynamic_cast_checks_runtime_type() {
        let c = cell(CellType::KeyEdge);
        assert!(dynamic_cell_cast::<KeyEdgeKey, _>(c).is_some());
        assert!(dynamic_cell_cast::<EdgeCellKey, _>(c).is_some());
        assert!(dynamic_cell_cast::<KeyCellKey, _>(c).is_some());
        assert!(dynamic_cell_cast::<KeyVertexKey, _>(c).is_none());
        assert!(dynamic_cell_cast::<InbetweenEdgeKey, _>(c).is_none());
    }

    #[test]
    fn cross_category_casts() {
        // Temporal-only view to spatial-only view goes through the concrete type.
        let k: KeyCellKey = cell(CellType::KeyFace).to_key_cell_unchecked();
        assert_eq!(k.to_face_cell().map(|f| f.cell_type()), Some(CellType::KeyFace));
        assert!(k.to_vertex_cell().is_none());

        let v: VertexCellKey = cell(CellType::InbetweenVertex).to_vertex_cell_unchecked();
        assert!(v.to_inbetween_cell().is_some());
        assert!(v.to_key_cell().is_none());
        assert!(v.to_inbetween_vertex().is_some());
    }

    #[test]
    fn upcast_preserves_identity() {
        let kv: KeyVertexKey = cell(CellType::KeyVertex).to_key_vertex_unchecked();
        let vc: VertexCellKey = kv.upcast();
        let kc: KeyCellKey = kv.upcast();
        assert_eq!(vc, kv);
        assert_eq!(kc.as_cell(), kv.as_cell());
        assert_eq!(vc.cell_type(), CellType::KeyVertex);
    }

    #[test]
    fn accepts_matches_tags() {
        assert!(CellKey::accepts(CellType::InbetweenFace));
        assert!(FaceCellKey::accepts(CellType::InbetweenFace));
        assert!(!KeyFaceKey::accepts(CellType::InbetweenFace));
        assert!(InbetweenCellKey::accepts(CellType::InbetweenVertex));
        assert!(!InbetweenCellKey::accepts(CellType::KeyVertex));
        assert!(KeyVertexKey::try_new(NodeKey::default(), CellType::KeyEdge).is_none());
    }

    #[test]
    fn hashing_ignores_view() {
        let kv: KeyVertexKey = cell(CellType::KeyVertex).to_key_vertex_unchecked();
        let mut set = FxHashSet::default();
        set.insert(kv.as_cell());
        set.insert(kv.upcast::<spatial::Vertex, temporal::Any>().as_cell());
        assert_eq!(set.len(), 1);
    }
}
