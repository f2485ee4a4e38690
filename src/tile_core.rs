use serde::{Deserialize, Serialize};

pub const GRID_SIZE: usize = 5;
pub const TILE_SIZE: f32 = 100.0;
pub const TILE_NUMBER_LIMIT: i32 = 9;

/// Minimum number of generation ticks between two arithmetic tiles of the
/// same kind. A tick advances once per generated tile, not per wall-clock
/// frame.
pub const ARITHMETIC_TICK_INTERVAL: u64 = 10;

/// Maximum allowed imbalance between positive and negative adders before
/// newly generated values are drawn from a one-sided range.
pub const ADDER_SKEW_LIMIT: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl Coord {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// 4-connected adjacency. Diagonal neighbors do not count.
    pub fn is_adjacent(self, other: Coord) -> bool {
        (self.col == other.col && self.row.abs_diff(other.row) == 1)
            || (self.row == other.row && self.col.abs_diff(other.col) == 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Adder { value: i32 },
    Multiplier { factor: i32 },
    Square,
}

impl TileKind {
    /// Folds this tile's operator into the running accumulator. Square
    /// squares the accumulator itself; it carries no operand.
    pub fn apply_op(self, acc: i64) -> i64 {
        match self {
            TileKind::Adder { value } => acc.saturating_add(value as i64),
            TileKind::Multiplier { factor } => acc.saturating_mul(factor as i64),
            TileKind::Square => acc.saturating_mul(acc),
        }
    }

    pub fn is_adder(self) -> bool {
        matches!(self, TileKind::Adder { .. })
    }

    /// Text a renderer puts on the tile face.
    pub fn label(self) -> String {
        match self {
            TileKind::Adder { value } => value.to_string(),
            TileKind::Multiplier { factor: -1 } => "-x".to_string(),
            TileKind::Multiplier { factor } => format!("\u{d7}{factor}"),
            TileKind::Square => "x\u{b2}".to_string(),
        }
    }
}

/// A grid cell. The kind is fixed at creation; everything else is transient
/// presentation state advanced by grid placement and animation steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    pub cx: f32,
    pub cy: f32,
    pub highlight: bool,
    pub drop: f32,
    pub tile_size: f32,
    pub show_text: bool,
}

impl Tile {
    pub fn new(kind: TileKind, cx: f32, cy: f32) -> Self {
        Self {
            kind,
            cx,
            cy,
            highlight: false,
            drop: 0.0,
            tile_size: TILE_SIZE,
            show_text: true,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn apply_op(&self, acc: i64) -> i64 {
        self.kind.apply_op(acc)
    }
}

/// Live composition of the grid, as seen by the tile factory. Empty slots
/// are skipped. Zero-valued adders count toward the negative bucket; the
/// skew check below relies on that split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCensus {
    pub positive_adders: u32,
    pub negative_adders: u32,
    pub multipliers: u32,
    pub squares: u32,
}

impl TileCensus {
    fn adder_skew(self) -> i32 {
        self.positive_adders as i32 - self.negative_adders as i32
    }
}

/// Produces new tiles, weighting draws by the grid's current composition and
/// throttling arithmetic kinds by generation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileFactory {
    rng: Rng,
    tick: u64,
    last_multiplier_tick: u64,
    last_square_tick: u64,
    arithmetic_tiles: bool,
    number_limit: i32,
}

impl TileFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
            tick: 0,
            last_multiplier_tick: 0,
            last_square_tick: 0,
            arithmetic_tiles: true,
            number_limit: TILE_NUMBER_LIMIT,
        }
    }

    pub fn set_arithmetic_tiles(&mut self, enabled: bool) {
        self.arithmetic_tiles = enabled;
    }

    pub fn arithmetic_tiles(&self) -> bool {
        self.arithmetic_tiles
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn multiplier_ready(&self, census: TileCensus) -> bool {
        self.tick - self.last_multiplier_tick > ARITHMETIC_TICK_INTERVAL && census.multipliers < 1
    }

    fn square_ready(&self, census: TileCensus) -> bool {
        self.tick - self.last_square_tick > ARITHMETIC_TICK_INTERVAL && census.squares < 1
    }

    /// Generates the tile for a cell centered at `(cx, cy)`.
    ///
    /// Rules are evaluated in a fixed priority order; the first satisfied
    /// rule wins and everything else falls through to the adder default.
    pub fn generate(&mut self, census: TileCensus, cx: f32, cy: f32) -> Tile {
        self.tick += 1;
        let r = self.rng.next_unit_f64();

        if self.arithmetic_tiles {
            if r > 0.9 {
                if self.multiplier_ready(census) {
                    self.last_multiplier_tick = self.tick;
                    return Tile::new(TileKind::Multiplier { factor: 2 }, cx, cy);
                }
            } else if r > 0.8 {
                if self.multiplier_ready(census) {
                    self.last_multiplier_tick = self.tick;
                    return Tile::new(TileKind::Multiplier { factor: -1 }, cx, cy);
                }
            } else if r > 0.7 && self.square_ready(census) {
                self.last_square_tick = self.tick;
                return Tile::new(TileKind::Square, cx, cy);
            }
        }

        // Adder default. Keep the positive/negative ratio from skewing too
        // far in either direction.
        let limit = self.number_limit;
        let skew = census.adder_skew();
        let value = if skew > ADDER_SKEW_LIMIT {
            self.rng.int_inclusive(-limit, 0)
        } else if -skew > ADDER_SKEW_LIMIT {
            self.rng.int_inclusive(0, limit)
        } else {
            self.rng.int_inclusive(-limit, limit)
        };
        Tile::new(TileKind::Adder { value }, cx, cy)
    }
}

/// Fixed 5x5 arena of tile slots, column-major so that `(x, y)` and
/// `(col, row)` stay interchangeable. `None` marks a vacated slot and is
/// only observable mid-compaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    cells: Vec<Vec<Option<Tile>>>,
    x: f32,
    y: f32,
}

impl TileGrid {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            cells: vec![vec![None; GRID_SIZE]; GRID_SIZE],
            x,
            y,
        }
    }

    fn cell_center(&self, coord: Coord) -> (f32, f32) {
        (
            self.x + coord.col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y + coord.row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// Fills every slot through the factory. Used at startup and on round
    /// reset; slots not yet regenerated stay visible to the factory's
    /// census during the pass.
    pub fn init(&mut self, factory: &mut TileFactory) {
        for col in 0..GRID_SIZE {
            for row in 0..GRID_SIZE {
                let coord = Coord::new(col, row);
                let (cx, cy) = self.cell_center(coord);
                let census = self.census();
                self.cells[col][row] = Some(factory.generate(census, cx, cy));
            }
        }
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.cells.get(coord.col)?.get(coord.row)?.as_ref()
    }

    pub fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.cells.get_mut(coord.col)?.get_mut(coord.row)?.as_mut()
    }

    /// Replaces a slot with a fresh tile of the given kind at the cell's
    /// designated center. Setup hook for tests and editors.
    pub fn set_tile(&mut self, coord: Coord, kind: TileKind) {
        if coord.col >= GRID_SIZE || coord.row >= GRID_SIZE {
            return;
        }
        let (cx, cy) = self.cell_center(coord);
        self.cells[coord.col][coord.row] = Some(Tile::new(kind, cx, cy));
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flat_map(|column| column.iter().flatten())
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells
            .iter_mut()
            .flat_map(|column| column.iter_mut().flatten())
    }

    pub fn census(&self) -> TileCensus {
        let mut census = TileCensus::default();
        for tile in self.tiles() {
            match tile.kind() {
                TileKind::Adder { value } => {
                    if value > 0 {
                        census.positive_adders += 1;
                    } else {
                        census.negative_adders += 1;
                    }
                }
                TileKind::Multiplier { .. } => census.multipliers += 1,
                TileKind::Square => census.squares += 1,
            }
        }
        census
    }

    /// Resolves a point to the first cell (column-major scan) whose square
    /// bounding box of side `tile_size` contains it. Points in padding or
    /// over vacated slots resolve to `None`.
    pub fn cell_at(&self, px: f32, py: f32) -> Option<Coord> {
        for col in 0..GRID_SIZE {
            for row in 0..GRID_SIZE {
                let Some(tile) = &self.cells[col][row] else {
                    continue;
                };
                let half = tile.tile_size / 2.0;
                if (px - tile.cx).abs() <= half && (py - tile.cy).abs() <= half {
                    return Some(Coord::new(col, row));
                }
            }
        }
        None
    }

    pub fn highlight(&mut self, coord: Coord) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.highlight = true;
        }
    }

    pub fn clear_highlights(&mut self) {
        for tile in self.tiles_mut() {
            tile.highlight = false;
        }
    }

    pub fn is_fully_populated(&self) -> bool {
        self.cells
            .iter()
            .all(|column| column.iter().all(|slot| slot.is_some()))
    }

    pub fn column_len(&self, col: usize) -> usize {
        self.cells
            .get(col)
            .map(|column| column.iter().flatten().count())
            .unwrap_or(0)
    }

    /// Empties the cleared cells, settles each column downward and tops it
    /// up with freshly generated tiles parked above the visible grid.
    ///
    /// Survivors get `drop` = vanished-cells-below x `TILE_SIZE`; every
    /// replacement in a column gets `drop` = vacated x `TILE_SIZE`, so all
    /// drops in a column land simultaneously. Returns the total number of
    /// vacated slots. Once every drop has been walked back to zero the grid
    /// holds exactly `GRID_SIZE` tiles per column again.
    pub fn remove_and_compact(&mut self, cleared: &[Coord], factory: &mut TileFactory) -> usize {
        for &coord in cleared {
            if coord.col < GRID_SIZE && coord.row < GRID_SIZE {
                self.cells[coord.col][coord.row] = None;
            }
        }

        // Settle survivors, bottom row first.
        let mut total_vacated = 0;
        for col in 0..GRID_SIZE {
            let mut vacated = 0;
            for row in (0..GRID_SIZE).rev() {
                match self.cells[col][row].take() {
                    None => vacated += 1,
                    Some(mut tile) => {
                        if vacated > 0 {
                            tile.drop = vacated as f32 * TILE_SIZE;
                        }
                        self.cells[col][row + vacated] = Some(tile);
                    }
                }
            }
            total_vacated += vacated;
        }

        // Top up each column. Replacements spawn in the negative space above
        // the grid so the translate phase can walk them into place; the
        // census each draw sees includes earlier replacements.
        for col in 0..GRID_SIZE {
            let vacated = self.cells[col].iter().filter(|slot| slot.is_none()).count();
            for neg_row in 0..vacated {
                let cx = self.x + col as f32 * TILE_SIZE + TILE_SIZE / 2.0;
                let cy = self.y - (neg_row as f32 + 1.0) * TILE_SIZE + TILE_SIZE / 2.0;
                let census = self.census();
                let mut tile = factory.generate(census, cx, cy);
                tile.drop = vacated as f32 * TILE_SIZE;
                self.cells[col][vacated - neg_row - 1] = Some(tile);
            }
        }

        total_vacated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            0x9E37_79B9_7F4A_7C15
        } else {
            seed
        };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }

    fn next_unit_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    fn int_inclusive(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (max - min + 1) as u32;
        min + (self.next_u32() % span) as i32
    }
}
