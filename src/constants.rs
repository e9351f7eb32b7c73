//! Shared numeric constants for the 75-ball card game.

/// Cards are square grids of this dimension.
pub const CARD_DIM: usize = 5;

/// Coordinates of the free cell (always marked).
pub const FREE_CELL: (usize, usize) = (2, 2);

/// Lowest drawable number.
pub const MIN_NUMBER: u8 = 1;

/// Highest drawable number.
pub const MAX_NUMBER: u8 = 75;

/// Total numbers in the draw pool.
pub const POOL_SIZE: usize = MAX_NUMBER as usize;

/// Each card column covers a contiguous span of this many numbers.
pub const COLUMN_SPAN: u8 = 15;

/// Share of the gross prize routed to the bonus reserve when the
/// dynamic bonus is enabled, in whole percent.
pub const DYNAMIC_BONUS_PERCENT: i64 = 5;
