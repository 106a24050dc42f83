use serde::{Deserialize, Serialize};

/// Cell kinds. Symbols are mapped to kinds once at parse time; nothing past
/// the parser looks at raw characters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    Wall = 1,
    Pit = 2,
    Goal = 3,
    Start = 4,
}

impl Cell {
    /// Symbol table: `S`=start, `G`=goal, `#`=wall, `P`=pit, anything else empty.
    pub fn from_symbol(ch: char) -> Cell {
        match ch {
            'S' => Cell::Start,
            'G' => Cell::Goal,
            '#' => Cell::Wall,
            'P' => Cell::Pit,
            _ => Cell::Empty,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Pit => 'P',
            Cell::Goal => 'G',
            Cell::Start => 'S',
        }
    }

    /// Adjacency code used in visibility observations.
    /// 0=empty, 1=wall, 2=pit, 3=goal; the start cell reads as empty.
    pub fn visibility_code(self) -> u8 {
        match self {
            Cell::Empty | Cell::Start => 0,
            Cell::Wall => 1,
            Cell::Pit => 2,
            Cell::Goal => 3,
        }
    }
}

/// Errors rejected at construction time. A maze without exactly one start and
/// one goal is a configuration error, not something to discover mid-episode.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("maze layout is empty")]
    Empty,
    #[error("maze row {0} has a different length than row 0")]
    Ragged(usize),
    #[error("maze must be at least 2x2 (observations normalize by dimension-1)")]
    TooSmall,
    #[error("maze has no start cell ('S')")]
    MissingStart,
    #[error("maze has no goal cell ('G')")]
    MissingGoal,
    #[error("maze has more than one start cell")]
    DuplicateStart,
    #[error("maze has more than one goal cell")]
    DuplicateGoal,
}

/// Immutable-per-episode maze layout. Row-major flat storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: (usize, usize),
    goal: (usize, usize),
}

impl Grid {
    /// Parse a literal layout, one string per row, one symbol per cell.
    /// Validates shape and the exactly-one-start / exactly-one-goal invariant.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Grid, LayoutError> {
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }
        let cols = rows[0].as_ref().chars().count();
        if cols == 0 {
            return Err(LayoutError::Empty);
        }
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != cols {
                return Err(LayoutError::Ragged(r));
            }
            cells.extend(row.chars().map(Cell::from_symbol));
        }
        Self::from_cells(rows.len(), cols, cells)
    }

    /// Build from pre-mapped cells. Shared validation path for the parser and
    /// the procedural generator.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Grid, LayoutError> {
        if rows < 2 || cols < 2 {
            return Err(LayoutError::TooSmall);
        }
        debug_assert_eq!(cells.len(), rows * cols);
        let mut start = None;
        let mut goal = None;
        for (i, cell) in cells.iter().enumerate() {
            let pos = (i / cols, i % cols);
            match cell {
                Cell::Start => {
                    if start.replace(pos).is_some() {
                        return Err(LayoutError::DuplicateStart);
                    }
                }
                Cell::Goal => {
                    if goal.replace(pos).is_some() {
                        return Err(LayoutError::DuplicateGoal);
                    }
                }
                _ => {}
            }
        }
        let start = start.ok_or(LayoutError::MissingStart)?;
        let goal = goal.ok_or(LayoutError::MissingGoal)?;
        Ok(Grid { rows, cols, cells, start, goal })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    pub fn goal(&self) -> (usize, usize) {
        self.goal
    }

    #[inline]
    fn idx(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    #[inline]
    pub fn in_bounds(&self, r: isize, c: isize) -> bool {
        r >= 0 && c >= 0 && (r as usize) < self.rows && (c as usize) < self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> Cell {
        self.cells[self.idx(r, c)]
    }

    /// A coordinate is walkable iff it is in bounds and not a wall.
    /// Pits are walkable; stepping onto one is legal and ends the episode.
    pub fn is_walkable(&self, r: isize, c: isize) -> bool {
        self.in_bounds(r, c) && self.get(r as usize, c as usize) != Cell::Wall
    }

    /// Text view of the layout, one symbol per cell.
    pub fn maze_text(&self) -> String {
        self.maze_text_with_agent(None)
    }

    /// Text view with the agent overlaid as 'A' on its current cell.
    pub fn maze_text_with_agent(&self, agent: Option<(usize, usize)>) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                if agent == Some((r, c)) {
                    out.push('A');
                } else {
                    out.push(self.get(r, c).symbol());
                }
            }
            if r + 1 < self.rows {
                out.push('\n');
            }
        }
        out
    }
}
