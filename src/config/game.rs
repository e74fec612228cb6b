/// Game configuration constants.
/// 
/// This module defines the default gameplay parameters: board and roster limits,
/// action point costs and the starting stats of a freshly placed player.

/// Board size used when a create request does not specify one.
pub const DEFAULT_BOARD_SIZE: usize = 20;

/// Smallest accepted board. Placement only uses interior cells, so anything
/// below this leaves no room to space two players apart.
pub const MIN_BOARD_SIZE: usize = 5;

/// Largest accepted board.
pub const MAX_BOARD_SIZE: usize = 50;

/// Roster capacity used when a create request does not specify one.
pub const DEFAULT_MAX_PLAYERS: usize = 4;

/// Minimum number of players required to start a game.
pub const MIN_PLAYERS: usize = 2;

/// Maximum roster capacity a game may be created with.
pub const MAX_PLAYERS: usize = 20;

/// Bounds on the display name of a game, in characters.
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a chat message, in characters.
pub const MAX_CHAT_LEN: usize = 500;

/// AP granted per tick (kept in the settings for clients, the engine does not drip AP).
pub const AP_PER_TICK: u32 = 1;

/// AP a player holds right after placement.
pub const STARTING_AP: u32 = 1;

/// AP cost of moving one step (any distance within range).
pub const MOVE_COST: u32 = 1;

/// AP cost of a shot.
pub const SHOOT_COST: u32 = 3;

/// AP cost of increasing range by one.
pub const UPGRADE_COST: u32 = 3;

/// Range of a freshly placed player.
pub const DEFAULT_RANGE: u32 = 2;

/// Hearts of a freshly placed player. Also the maximum.
pub const DEFAULT_HEARTS: u32 = 3;

/// Hearts removed by one shot.
pub const DAMAGE_PER_SHOT: u32 = 1;

/// Default page size of the action history endpoint.
pub const HISTORY_PAGE_SIZE: usize = 20;

/// Largest page the action history endpoint serves.
pub const MAX_HISTORY_PAGE_SIZE: usize = 100;
