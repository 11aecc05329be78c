use std::fmt;
use std::mem::swap;

use tracing::{debug, trace};

use crate::arena::{Arena, Checkpoint};
use crate::error::ArenaResult;
use crate::ring::{Node, NodeId, RingList, SENTINEL};
use MoveResult::*;

/// A grid cell. Signed so that stepping backwards off an edge can be wrapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit step along one axis, or no motion at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NONE: Direction = Direction { dx: 0, dy: 0 };
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };

    pub fn is_none(self) -> bool {
        self == Direction::NONE
    }

    pub fn reversed(self) -> Direction {
        Direction {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// Toroidal playfield dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    columns: i32,
    rows: i32,
}

impl Grid {
    /// Both dimensions must be at least one cell.
    pub fn new(columns: u32, rows: u32) -> Option<Self> {
        let columns = i32::try_from(columns).ok().filter(|c| *c > 0)?;
        let rows = i32::try_from(rows).ok().filter(|r| *r > 0)?;
        Some(Grid { columns, rows })
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.columns / 2, self.rows / 2)
    }

    /// Moves `cell` one step along `direction`, wrapping each axis.
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        Cell {
            x: (cell.x + direction.dx).rem_euclid(self.columns),
            y: (cell.y + direction.dy).rem_euclid(self.rows),
        }
    }
}

/// One record of the chain: where it is and which way it last moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Segment {
    pub cell: Cell,
    pub direction: Direction,
}

impl Segment {
    fn at(cell: Cell) -> Self {
        Segment {
            cell,
            direction: Direction::NONE,
        }
    }
}

/// What one relay step did to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The front moved and the body followed.
    Moved { new_head: Cell, old_head: Cell },
    /// The front reached the goal and a record was appended behind the tail.
    Grew { new_head: Cell, old_head: Cell },
    /// Growth brought the chain to its maximum length.
    Won { new_head: Cell },
    /// The front ran into the body.
    Crashed { new_head: Cell },
    /// There is no chain to move.
    Empty,
}

/// Open transaction on the chain store: the arena checkpoint plus the slot
/// count of the ring at the same moment.
#[derive(Debug)]
struct CellMemory {
    checkpoint: Checkpoint,
    slots: usize,
}

/// The positioned chain. Records live in a ring list; every record is
/// accounted for by a sub-arena carved for the maximum chain length and is
/// only ever released by rolling that arena back on [`restart`](Self::restart).
#[derive(Debug)]
pub struct Snake {
    cells: Arena,
    cell_memory: Option<CellMemory>,
    body: RingList<Segment>,
    direction: Direction,
    max_length: usize,
}

impl Snake {
    /// Carves the chain store out of `arena`. The chain starts out empty;
    /// call [`restart`](Self::restart) to lay out the first records.
    pub fn new(arena: &mut Arena, max_length: usize) -> ArenaResult<Self> {
        let cells = arena.carve_for::<Node<Segment>>(max_length)?;

        Ok(Snake {
            cells,
            cell_memory: None,
            body: RingList::with_capacity(max_length),
            direction: Direction::NONE,
            max_length,
        })
    }

    /// Discards the whole chain and rebuilds it as `length` records stacked
    /// on `start`, with no direction.
    pub fn restart(&mut self, start: Cell, length: usize) -> ArenaResult<()> {
        if let Some(memory) = self.cell_memory.take() {
            self.cells.end_temporary(memory.checkpoint)?;
            self.body.rollback(memory.slots);
        }

        self.cell_memory = Some(CellMemory {
            checkpoint: self.cells.begin_temporary(),
            slots: self.body.slots(),
        });
        self.body.init();
        self.direction = Direction::NONE;

        let mut at = SENTINEL;
        for _ in 0..length {
            at = self.create_after(at, Segment::at(start))?;
        }

        debug!(%start, length, used = self.cells.used(), "chain rebuilt");
        Ok(())
    }

    /// Accepts `direction` unless it points straight back into the chain.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction.is_none() || direction == self.direction.reversed() {
            return;
        }
        self.direction = direction;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().map(|id| self.body[id].cell)
    }

    pub fn tail(&self) -> Option<Segment> {
        self.body.tail().map(|id| self.body[id])
    }

    /// Records front to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.body.iter()
    }

    /// Bytes of the chain store currently in use.
    pub fn memory_used(&self) -> usize {
        self.cells.used()
    }

    pub fn memory_capacity(&self) -> usize {
        self.cells.capacity()
    }

    /// Advances the chain one cell.
    ///
    /// The front moves first. Each following record then takes over the
    /// cell its predecessor just vacated, along with the direction that led
    /// out of it, so the links never change and nothing is allocated unless
    /// the goal is reached.
    /// With no direction yet (the stacked starting layout) only the front
    /// moves.
    pub fn move_step(&mut self, grid: Grid, goal: Cell) -> ArenaResult<MoveResult> {
        let front = match self.body.front() {
            Some(front) => front,
            None => return Ok(Empty),
        };

        let old_head = self.body[front].cell;
        let new_head = grid.step(old_head, self.direction);
        self.body[front] = Segment {
            cell: new_head,
            direction: self.direction,
        };
        trace!(%old_head, %new_head, "relay step");

        if self.direction.is_none() {
            return Ok(Moved { new_head, old_head });
        }

        let mut carry = Segment {
            cell: old_head,
            direction: self.direction,
        };
        let mut id = self.body.next(front);
        while id != SENTINEL {
            let segment = &mut self.body[id];
            if segment.cell == new_head {
                return Ok(Crashed { new_head });
            }
            swap(&mut carry, segment);
            id = self.body.next(id);
        }

        if new_head != goal {
            return Ok(Moved { new_head, old_head });
        }

        self.grow(grid)?;
        if self.len() >= self.max_length {
            Ok(Won { new_head })
        } else {
            Ok(Grew { new_head, old_head })
        }
    }

    /// Appends one record one step behind the tail.
    fn grow(&mut self, grid: Grid) -> ArenaResult<()> {
        let tail = match self.body.tail() {
            Some(tail) => tail,
            None => return Ok(()),
        };

        let last = self.body[tail];
        let segment = Segment {
            cell: grid.step(last.cell, last.direction.reversed()),
            direction: last.direction,
        };
        self.create_after(tail, segment)?;

        debug!(cell = %segment.cell, length = self.len(), "chain grew");
        Ok(())
    }

    fn create_after(&mut self, at: NodeId, segment: Segment) -> ArenaResult<NodeId> {
        self.cells.push::<Node<Segment>>()?;
        Ok(self.body.insert_after(at, segment))
    }
}
