//! Broadphase: a uniform grid hash with per-shape back-references.

pub mod cell;

use crate::{
    config::HashConfig,
    error::ColliderError,
    narrow::{CollisionData, NarrowPhase},
    shape::{Circle, HashId, Point, Rect, Shape, ShapeId},
    Fp,
};
use cell::{indexable, touched_cells, Cell, CellCoord, CellInfo, DebugDraw, FnvIndexSet};
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use tracing::{debug, trace};

type FnvIndexMap<K, V> = IndexMap<K, V, FnvBuildHasher>;

/// Uniform grid partition of world space.
///
/// The grid stores every shape it has been given, addressed by [`ShapeId`].
/// Each shape is registered in every cell its bounding box touches, and the
/// grid keeps the reverse mapping (the shape's back-references) so that
/// removal and candidate queries never scan the whole grid.
///
/// Cells are created on demand and are not dropped when they empty out, so a
/// long-running world with wide-ranging movement accumulates cells. Call
/// [`SpatialHash::compact`] periodically if that matters.
///
/// All operations are synchronous and the grid does no locking of its own.
#[derive(Debug)]
pub struct SpatialHash {
    id: HashId,
    config: HashConfig,
    cells: FnvIndexMap<CellCoord, Cell>,
    backref: FnvIndexMap<ShapeId, FnvIndexSet<CellCoord>>,
    shapes: FnvIndexMap<ShapeId, Shape>,
    narrow: NarrowPhase,
    next_id: u64,
}

impl SpatialHash {
    pub fn new(cell_size: i32) -> Result<SpatialHash, ColliderError> {
        SpatialHash::with_config(HashConfig::new(cell_size))
    }
    pub fn with_config(config: HashConfig) -> Result<SpatialHash, ColliderError> {
        config.validate()?;
        let id = HashId::next();
        debug!(?id, cell_size = config.cell_size, "created spatial hash");

        Ok(SpatialHash {
            id,
            config,
            cells: FnvIndexMap::default(),
            backref: FnvIndexMap::default(),
            shapes: FnvIndexMap::default(),
            narrow: NarrowPhase::default(),
            next_id: 0,
        })
    }
    pub fn with_narrow_phase(mut self, narrow: NarrowPhase) -> SpatialHash {
        self.narrow = narrow;
        self
    }

    #[inline]
    pub fn id(&self) -> HashId {
        self.id
    }
    #[inline]
    pub fn config(&self) -> &HashConfig {
        &self.config
    }
    #[inline]
    pub fn cell_size(&self) -> i32 {
        self.config.cell_size
    }
    #[inline]
    pub fn narrow_phase(&self) -> &NarrowPhase {
        &self.narrow
    }
    #[inline]
    pub fn narrow_phase_mut(&mut self) -> &mut NarrowPhase {
        &mut self.narrow
    }

    // ---------- Shape table ---------- //

    pub fn new_point(&mut self, x: Fp, y: Fp) -> Result<ShapeId, ColliderError> {
        let half = self.config.point_half_extent;
        self.add(Point::with_half_extent(x, y, half).into())
    }
    pub fn new_circle(&mut self, x: Fp, y: Fp, radius: Fp) -> Result<ShapeId, ColliderError> {
        self.add(Circle::new(radius, x, y).into())
    }
    pub fn new_rect(&mut self, x: Fp, y: Fp, width: Fp, height: Fp) -> Result<ShapeId, ColliderError> {
        self.add(Rect::new(x, y, width, height).into())
    }

    pub fn add(&mut self, shape: Shape) -> Result<ShapeId, ColliderError> {
        //! Stores `shape` under a fresh handle and registers it in every cell its bounds touch.
        //! Shapes whose bounds are not finite, or lie beyond the indexable cells, are rejected.
        self.check_bounds(&shape)?;
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.insert(id, shape);
        self.register(id);
        Ok(id)
    }

    pub fn take(&mut self, id: ShapeId) -> Option<Shape> {
        //! Unregisters the shape and hands it back. The handle is dead afterwards.
        self.unregister(id);
        self.shapes.shift_remove(&id)
    }

    #[inline]
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> + '_ {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }
    #[inline]
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    // ---------- Registration ---------- //

    pub fn insert(&mut self, id: ShapeId) -> Result<(), ColliderError> {
        //! Registers a stored shape in the cells its bounds touch, e.g. after `remove`.
        //! Registering an already registered shape leaves its membership unchanged.
        if !self.shapes.contains_key(&id) {
            return Err(ColliderError::UnknownShape(id));
        }
        self.register(id);
        Ok(())
    }

    pub fn remove(&mut self, id: ShapeId) -> Result<(), ColliderError> {
        //! Evicts the shape from every cell it is registered in. The shape stays stored
        //! and keeps its reference to this grid.
        if !self.shapes.contains_key(&id) {
            return Err(ColliderError::UnknownShape(id));
        }
        if self.unregister(id) {
            Ok(())
        } else {
            debug!(?id, "remove of unregistered shape");
            Err(ColliderError::NotFound(id))
        }
    }

    pub fn translate(&mut self, id: ShapeId, dx: Fp, dy: Fp) -> Result<(), ColliderError> {
        //! Moves the shape by `(dx, dy)` and recomputes its cell membership.
        let mut moved = self.shapes.get(&id).ok_or(ColliderError::UnknownShape(id))?.clone();
        moved.translate(dx, dy);
        self.commit_move(id, moved)
    }
    pub fn move_to(&mut self, id: ShapeId, x: Fp, y: Fp) -> Result<(), ColliderError> {
        //! Moves the shape to `(x, y)` and recomputes its cell membership.
        let mut moved = self.shapes.get(&id).ok_or(ColliderError::UnknownShape(id))?.clone();
        moved.move_to(x, y);
        self.commit_move(id, moved)
    }

    fn commit_move(&mut self, id: ShapeId, moved: Shape) -> Result<(), ColliderError> {
        // a rejected move leaves the shape where it was
        self.check_bounds(&moved)?;
        if let Some(shape) = self.shapes.get_mut(&id) {
            *shape = moved;
        }
        self.reregister(id);
        Ok(())
    }

    fn check_bounds(&self, shape: &Shape) -> Result<(), ColliderError> {
        let bounds = shape.bounds();
        if indexable(&bounds, self.config.cell_size) {
            Ok(())
        } else {
            debug!(?bounds, "rejected shape bounds");
            Err(ColliderError::InvalidShape(format!(
                "bounds {:?} are not finite or exceed the grid's cell range",
                bounds.to_tuple()
            )))
        }
    }

    fn register(&mut self, id: ShapeId) {
        let shape = match self.shapes.get_mut(&id) {
            Some(shape) => shape,
            None => return,
        };
        let bounds = shape.bounds();
        let refs = self.backref.entry(id).or_insert_with(FnvIndexSet::default);
        for coord in touched_cells(&bounds, self.config.cell_size) {
            self.cells.entry(coord).or_insert_with(Cell::default).insert(id);
            refs.insert(coord);
        }
        shape.set_hash(self.id);
        trace!(?id, cells = refs.len(), "registered shape");
    }

    fn unregister(&mut self, id: ShapeId) -> bool {
        //! Returns whether the shape was registered anywhere.
        let refs = match self.backref.swap_remove(&id) {
            Some(refs) if !refs.is_empty() => refs,
            _ => return false,
        };
        for coord in refs.iter() {
            if let Some(cell) = self.cells.get_mut(coord) {
                cell.remove(id);
            }
        }
        trace!(?id, cells = refs.len(), "unregistered shape");
        true
    }

    fn reregister(&mut self, id: ShapeId) {
        // remove-then-insert against the grid the shape last registered with
        let owner = self.shapes.get(&id).and_then(Shape::hash);
        if owner == Some(self.id) {
            self.unregister(id);
            self.register(id);
        }
    }

    // ---------- Queries ---------- //

    pub fn backref(&self, id: ShapeId) -> impl Iterator<Item = CellCoord> + '_ {
        //! Cells the shape is currently registered in, in registration order.
        self.backref.get(&id).into_iter().flat_map(|refs| refs.iter().copied())
    }
    #[inline]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn collision_candidates(&self, id: ShapeId) -> Result<Vec<ShapeId>, ColliderError> {
        //! Returns every other shape sharing at least one cell with `id`, without duplicates,
        //! in first-seen order.
        if !self.shapes.contains_key(&id) {
            return Err(ColliderError::UnknownShape(id));
        }
        let mut found: FnvIndexSet<ShapeId> = FnvIndexSet::default();
        for coord in self.backref(id) {
            if let Some(cell) = self.cells.get(&coord) {
                found.extend(cell.iter().filter(|&other| other != id));
            }
        }
        Ok(found.into_iter().collect())
    }

    pub fn check_collisions(&self, id: ShapeId) -> Result<Vec<CollisionData>, ColliderError> {
        //! Runs the narrowphase between `id` and each of its candidates, returning the
        //! non-zero separating vectors to apply to `id`.
        let shape = self.shapes.get(&id).ok_or(ColliderError::UnknownShape(id))?;
        let mut collisions = Vec::new();
        for other in self.collision_candidates(id)? {
            let other_shape = match self.shapes.get(&other) {
                Some(s) => s,
                None => continue,
            };
            let separating = self.narrow.separate(&shape.kind, &other_shape.kind)?;
            if separating.length() > 0.0 {
                collisions.push(CollisionData { other, separating });
            }
        }
        Ok(collisions)
    }

    // ---------- Debug & maintenance ---------- //

    pub fn cells(&self) -> impl Iterator<Item = CellInfo> + '_ {
        //! Every cell ever created (and not compacted away), with its world bounds and member count.
        let size = self.config.cell_size;
        self.cells.iter().map(move |(coord, cell)| CellInfo {
            coord: *coord,
            bounds: coord.bounds(size),
            count: cell.len(),
        })
    }
    pub fn draw<D: DebugDraw + ?Sized>(&self, surface: &mut D) {
        for info in self.cells() {
            surface.draw_cell(&info);
        }
    }

    pub fn compact(&mut self) -> usize {
        //! Drops empty cells, returning how many were dropped.
        let before = self.cells.len();
        self.cells.retain(|_, cell| !cell.is_empty());
        let evicted = before - self.cells.len();
        debug!(evicted, remaining = self.cells.len(), "compacted spatial hash");
        evicted
    }
}
