use crate::{shape::{Aabb, ShapeId}, Fp, Vec2};
use fnv::FnvBuildHasher;
use indexmap::IndexSet;

pub(crate) type FnvIndexSet<T> = IndexSet<T, FnvBuildHasher>;

/// Integer index of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}
impl CellCoord {
    #[inline]
    pub fn new(x: i32, y: i32) -> CellCoord {
        CellCoord { x, y }
    }
    #[inline]
    pub fn of(loc: Vec2, cell_size: i32) -> CellCoord {
        //! Returns the cell containing `loc`. Cell edges belong to the cell on their positive side.
        let size = Fp::from(cell_size);
        CellCoord { x: (loc.x / size).floor() as i32, y: (loc.y / size).floor() as i32 }
    }

    pub fn bounds(self, cell_size: i32) -> Aabb {
        //! Returns the world-space square this cell covers.
        let size = Fp::from(cell_size);
        let min = Vec2::new(Fp::from(self.x) * size, Fp::from(self.y) * size);
        Aabb { min, max: min + Vec2::splat(size) }
    }
}

/// Whether every cell index of `aabb` is finite and fits in a [`CellCoord`].
pub(crate) fn indexable(aabb: &Aabb, cell_size: i32) -> bool {
    let size = Fp::from(cell_size);
    let limit = Fp::from(i32::MAX);
    aabb.is_finite()
        && [aabb.min.x, aabb.min.y, aabb.max.x, aabb.max.y]
            .iter()
            .all(|v| (v / size).floor().abs() < limit)
}

/// Iterates every cell the box `aabb` touches, row by row.
///
/// A box that ends exactly on a cell edge also touches the cell beyond that
/// edge. A zero-extent box touches exactly one cell.
pub(crate) fn touched_cells(aabb: &Aabb, cell_size: i32) -> impl Iterator<Item = CellCoord> {
    let lo = CellCoord::of(aabb.min, cell_size);
    let hi = CellCoord::of(aabb.max, cell_size);
    (lo.x..=hi.x).flat_map(move |x| (lo.y..=hi.y).map(move |y| CellCoord { x, y }))
}

/// One bucket of the grid. Membership is unique per shape.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    shapes: FnvIndexSet<ShapeId>,
}
impl Cell {
    #[inline]
    pub(crate) fn insert(&mut self, id: ShapeId) -> bool {
        self.shapes.insert(id)
    }
    #[inline]
    pub(crate) fn remove(&mut self, id: ShapeId) -> bool {
        self.shapes.shift_remove(&id)
    }

    #[inline]
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains(&id)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.iter().copied()
    }
}

/// What the debug renderer needs to know about a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellInfo {
    pub coord: CellCoord,
    pub bounds: Aabb,
    pub count: usize,
}

/// A drawing surface for grid debug output, supplied by the host.
pub trait DebugDraw {
    fn draw_cell(&mut self, cell: &CellInfo);
}
