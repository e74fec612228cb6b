use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::game::{
    AP_PER_TICK, DAMAGE_PER_SHOT, DEFAULT_HEARTS, DEFAULT_RANGE, MOVE_COST, SHOOT_COST,
    STARTING_AP, UPGRADE_COST,
};

/// Identifier of an authenticated player, issued by the auth collaborator.
pub type PlayerId = Uuid;

/// Identifier of a game session.
pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Waiting,
    Active,
    Completed,
}

impl SessionStatus {
    /// Status transitions only ever move forward.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Waiting, SessionStatus::Active)
                | (SessionStatus::Active, SessionStatus::Completed)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    Alive,
    Dead,
}

/// Player state held by a board cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub ap: u32,
    pub range: u32,
    pub hearts: u32,
    pub status: PlayerStatus,
}

impl PlayerSnapshot {
    /// Fresh snapshot for a newly placed player.
    pub fn spawn(player_id: PlayerId, settings: &GameSettings) -> Self {
        Self {
            player_id,
            ap: settings.starting_ap,
            range: settings.default_range.max(1),
            hearts: settings.default_hearts,
            status: PlayerStatus::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == PlayerStatus::Alive && self.hearts > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Occupant {
    Empty,
    Player(PlayerSnapshot),
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    pub fn player(&self) -> Option<&PlayerSnapshot> {
        match self {
            Occupant::Player(snapshot) => Some(snapshot),
            Occupant::Empty => None,
        }
    }

    /// Snapshot of a player that can still be shot or traded with.
    pub fn living_player(&self) -> Option<&PlayerSnapshot> {
        self.player().filter(|snapshot| snapshot.is_alive())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub occupant: Occupant,
}

/// Roster entry. Mirrors the occupant of the player's cell; only
/// `Session` writes it, together with the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: PlayerId,
    pub joined_at: DateTime<Utc>,
    pub position: Option<Position>,
    pub ap: u32,
    pub range: u32,
    pub hearts: u32,
    pub alive: bool,
    pub kills: u32,
    pub deaths: u32,
}

impl Player {
    pub fn new(player_id: PlayerId, settings: &GameSettings) -> Self {
        Self {
            player_id,
            joined_at: Utc::now(),
            position: None,
            ap: settings.starting_ap,
            range: settings.default_range.max(1),
            hearts: settings.default_hearts,
            alive: true,
            kills: 0,
            deaths: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    pub ap_per_tick: u32,
    pub starting_ap: u32,
    pub move_cost: u32,
    pub shoot_cost: u32,
    pub upgrade_cost: u32,
    pub default_range: u32,
    pub default_hearts: u32,
    pub damage_per_shot: u32,
    /// Complete the game automatically once a single player is left alive.
    pub last_survivor_wins: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            ap_per_tick: AP_PER_TICK,
            starting_ap: STARTING_AP,
            move_cost: MOVE_COST,
            shoot_cost: SHOOT_COST,
            upgrade_cost: UPGRADE_COST,
            default_range: DEFAULT_RANGE,
            default_hearts: DEFAULT_HEARTS,
            damage_per_shot: DAMAGE_PER_SHOT,
            last_survivor_wins: false,
        }
    }
}

/// What an applied action did, as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionDetails {
    #[serde(rename_all = "camelCase")]
    Move { from: Position, to: Position, ap_spent: u32 },
    #[serde(rename_all = "camelCase")]
    Shoot {
        target: PlayerId,
        position: Position,
        damage: u32,
        target_killed: bool,
        ap_spent: u32,
    },
    #[serde(rename_all = "camelCase")]
    IncreaseRange { new_range: u32, ap_spent: u32 },
    #[serde(rename_all = "camelCase")]
    TransferAp { target: PlayerId, position: Position, amount: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub details: ActionDetails,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: PlayerId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
