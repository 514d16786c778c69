// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Star/boundary bookkeeping and reference substitution.
//!
//! The boundary of a cell is derived from its data (end vertices of an edge,
//! edges and vertices of a face's cycles, key cells of an inbetween cell).
//! After editing the data, [`Complex::sync_boundary`] brings the stored
//! boundary and the stars of the affected cells back in line.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::cast::{CellKey, KeyVertexKey};
use crate::cell::CellData;
use crate::complex::Complex;
use crate::error::Result;
use crate::halfedge::KeyHalfedge;
use crate::keys::NodeKey;

impl Complex {
    /// Adds `b` to the boundary of `cell` and `cell` to the star of `b`.
    pub(crate) fn add_to_boundary(&mut self, cell: CellKey, b: CellKey) {
        let mut changed = false;
        if let Ok(c) = self.try_cell_mut(cell.key()) {
            if !c.boundary.contains(&b) {
                c.boundary.push(b);
                changed = true;
            }
        }
        if let Ok(bc) = self.try_cell_mut(b.key()) {
            if !bc.star.contains(&cell) {
                bc.star.push(cell);
            }
        }
        if changed {
            let id = self.id_of(cell.key());
            self.diff.on_boundary_changed(id);
        }
    }

    /// Removes `b` from the boundary of `cell` and `cell` from the star of
    /// `b`.
    pub(crate) fn remove_from_boundary(&mut self, cell: CellKey, b: CellKey) {
        let mut changed = false;
        if let Ok(c) = self.try_cell_mut(cell.key()) {
            let before = c.boundary.len();
            c.boundary.retain(|x| *x != b);
            changed = c.boundary.len() != before;
        }
        if let Ok(bc) = self.try_cell_mut(b.key()) {
            bc.star.retain(|x| *x != cell);
        }
        if changed {
            let id = self.id_of(cell.key());
            self.diff.on_boundary_changed(id);
        }
    }

    /// Boundary implied by the data of a cell, without duplicates.
    pub(crate) fn expected_boundary(&self, key: NodeKey) -> Result<SmallVec<[CellKey; 8]>> {
        let mut out: SmallVec<[CellKey; 8]> = SmallVec::new();
        let mut push = |c: CellKey| {
            if !out.contains(&c) {
                out.push(c);
            }
        };
        match &self.try_cell(key)?.data {
            CellData::KeyVertex(_) => {}
            CellData::KeyEdge(e) => {
                e.start_vertex.into_iter().for_each(|v| push(v.as_cell()));
                e.end_vertex.into_iter().for_each(|v| push(v.as_cell()));
            }
            CellData::KeyFace(f) => {
                for cycle in &f.cycles {
                    if let Some(v) = cycle.steiner_vertex() {
                        push(v.as_cell());
                    }
                    for h in cycle.halfedges() {
                        push(h.edge().as_cell());
                        if let Some(v) = h.start_vertex(self) {
                            push(v.as_cell());
                        }
                    }
                }
            }
            CellData::InbetweenVertex(v) => {
                push(v.before.as_cell());
                push(v.after.as_cell());
            }
            CellData::InbetweenEdge(e) => {
                push(e.before.edge().as_cell());
                push(e.after.edge().as_cell());
                let key_vertices = [
                    e.before.start_vertex(self),
                    e.before.end_vertex(self),
                    e.after.start_vertex(self),
                    e.after.end_vertex(self),
                ];
                key_vertices.into_iter().flatten().for_each(|v| push(v.as_cell()));
                e.start_vertex.into_iter().for_each(|v| push(v.as_cell()));
                e.end_vertex.into_iter().for_each(|v| push(v.as_cell()));
            }
            CellData::InbetweenFace(f) => {
                for &face in f.before.iter().chain(&f.after) {
                    push(face.as_cell());
                }
            }
        }
        Ok(out)
    }

    /// Makes the stored boundary of `cell` match its data.
    pub(crate) fn sync_boundary(&mut self, cell: CellKey) -> Result<()> {
        let expected = self.expected_boundary(cell.key())?;
        let current: SmallVec<[CellKey; 4]> = self.try_cell(cell.key())?.boundary.clone();
        for b in current.iter().filter(|b| !expected.contains(b)) {
            self.remove_from_boundary(cell, *b);
        }
        for b in expected {
            self.add_to_boundary(cell, b);
        }
        Ok(())
    }

    /// Replaces every reference to `old` by `new` in the cells of its star.
    ///
    /// Incident edges are re-snapped to `new`. `old` ends up with an empty
    /// star.
    pub(crate) fn substitute_vertex(&mut self, old: KeyVertexKey, new: KeyVertexKey) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let star: Vec<CellKey> = self.star(old).to_vec();
        // Edges first: face boundaries are derived from edge end vertices.
        let (edges, others): (Vec<CellKey>, Vec<CellKey>) = star
            .into_iter()
            .partition(|c| c.to_key_edge().is_some());

        for cell in edges {
            if let CellData::KeyEdge(e) = &mut self.try_cell_mut(cell.key())?.data {
                if e.start_vertex == Some(old) {
                    e.start_vertex = Some(new);
                }
                if e.end_vertex == Some(old) {
                    e.end_vertex = Some(new);
                }
            }
            if let Some(e) = cell.to_key_edge() {
                self.snap_key_edge(e)?;
            }
            self.sync_boundary(cell)?;
        }

        for cell in others {
            match &mut self.try_cell_mut(cell.key())?.data {
                CellData::KeyFace(f) => {
                    for cycle in &mut f.cycles {
                        if cycle.steiner_vertex() == Some(old) {
                            cycle.set_steiner_vertex(new);
                        }
                    }
                }
                CellData::InbetweenVertex(v) => {
                    if v.before == old {
                        v.before = new;
                    }
                    if v.after == old {
                        v.after = new;
                    }
                }
                _ => {}
            }
            self.sync_boundary(cell)?;
        }

        // Faces and inbetween edges reached through the edges above.
        let star: Vec<CellKey> = self.star(old).to_vec();
        for cell in star {
            self.sync_boundary(cell)?;
        }
        debug_assert!(self.star(old).is_empty());
        Ok(())
    }

    /// Replaces every use of the edge of `old` by the edge of `new`.
    ///
    /// A use traversing `old` in its direction becomes `new`, a use in the
    /// other direction becomes `new.opposite()`.
    pub(crate) fn substitute_edge(&mut self, old: KeyHalfedge, new: KeyHalfedge) -> Result<()> {
        if old.edge() == new.edge() && old.direction() == new.direction() {
            return Ok(());
        }
        let map = |h: KeyHalfedge| {
            if h.edge() != old.edge() {
                h
            } else if h.direction() == old.direction() {
                new
            } else {
                new.opposite()
            }
        };
        let star: Vec<CellKey> = self.star(old.edge()).to_vec();
        for cell in star {
            match &mut self.try_cell_mut(cell.key())?.data {
                CellData::KeyFace(f) => {
                    for cycle in &mut f.cycles {
                        for h in cycle.halfedges_mut() {
                            *h = map(*h);
                        }
                    }
                }
                CellData::InbetweenEdge(e) => {
                    e.before = map(e.before);
                    e.after = map(e.after);
                }
                _ => {}
            }
            self.sync_boundary(cell)?;
        }
        Ok(())
    }

    /// Whether every stored boundary matches the cell data and every star is
    /// the exact inverse of the boundaries.
    pub fn is_star_boundary_consistent(&self) -> bool {
        for (key, node) in &self.nodes {
            let Some(cell) = node.as_cell() else {
                continue;
            };
            let me = CellKey::new_unchecked(key, cell.cell_type());

            let Ok(expected) = self.expected_boundary(key) else {
                return false;
            };
            let stored: FxHashSet<CellKey> = cell.boundary.iter().copied().collect();
            if stored.len() != cell.boundary.len()
                || stored.len() != expected.len()
                || !expected.iter().all(|b| stored.contains(b))
            {
                return false;
            }

            let boundary_ok = cell
                .boundary
                .iter()
                .all(|b| self.try_cell(b.key()).is_ok_and(|bc| bc.star.contains(&me)));
            let star_ok = cell
                .star
                .iter()
                .all(|s| self.try_cell(s.key()).is_ok_and(|sc| sc.boundary.contains(&me)));
            if !boundary_ok || !star_ok {
                return false;
            }
        }
        true
    }
}
