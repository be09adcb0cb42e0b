//! Player records and the three-symbol rule set.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PlayerId;

/// Longest accepted display name, in characters, after trimming.
pub const MAX_NAME_LEN: usize = 32;

/// One of the three moves a player can make.
///
/// Serialized with the English names. The Portuguese names used by the
/// first deployment of the game are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Choice {
    /// Beats [`Choice::Scissors`].
    #[serde(alias = "Pedra")]
    Rock,
    /// Beats [`Choice::Rock`].
    #[serde(alias = "Papel")]
    Paper,
    /// Beats [`Choice::Paper`].
    #[serde(alias = "Tesoura")]
    Scissors,
}

impl Choice {
    /// All symbols of the rule set.
    pub const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    /// The symbol this one dominates.
    #[must_use]
    pub const fn beats(self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }

    /// Returns `true` if `self` dominates `other`.
    #[must_use]
    pub fn defeats(self, other: Self) -> bool {
        self.beats() == other
    }

    /// Wire name of the symbol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rock => "Rock",
            Self::Paper => "Paper",
            Self::Scissors => "Scissors",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`Choice`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown choice: {0}")]
pub struct UnknownChoice(pub String);

impl FromStr for Choice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" | "pedra" => Ok(Self::Rock),
            "paper" | "papel" => Ok(Self::Paper),
            "scissors" | "tesoura" => Ok(Self::Scissors),
            _ => Err(UnknownChoice(s.to_string())),
        }
    }
}

/// An active participant of the session roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Unique token assigned at join.
    pub id: PlayerId,
    /// Display name; not required to be unique.
    pub name: String,
    /// Move for the current round, absent until the player moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
    /// Last mutation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Player {
    /// Creates a freshly joined player with no move.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            choice: None,
            timestamp: now_millis(),
        }
    }

    /// Records a move and refreshes the timestamp.
    ///
    /// The timestamp never moves backwards even if the wall clock does.
    pub fn record_choice(&mut self, choice: Choice) {
        self.choice = Some(choice);
        self.timestamp = now_millis().max(self.timestamp);
    }

    /// Returns `true` once the player has moved this round.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.choice.is_some()
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Sorts players by ascending timestamp (join/move order).
pub fn sort_by_timestamp(players: &mut [Player]) {
    players.sort_by_key(|p| p.timestamp);
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn beats_relation_is_cyclic() {
        for choice in Choice::ALL {
            assert!(choice.defeats(choice.beats()));
            assert!(!choice.defeats(choice));
            assert!(!choice.beats().defeats(choice));
        }
    }

    #[test]
    fn parses_english_and_portuguese() {
        assert_eq!("rock".parse::<Choice>(), Ok(Choice::Rock));
        assert_eq!("Tesoura".parse::<Choice>(), Ok(Choice::Scissors));
        assert_eq!(" PAPEL ".parse::<Choice>(), Ok(Choice::Paper));
        assert!("lizard".parse::<Choice>().is_err());
    }

    #[test]
    fn json_accepts_alias() {
        let Ok(choice) = serde_json::from_str::<Choice>("\"Pedra\"") else {
            panic!("alias rejected");
        };
        assert_eq!(choice, Choice::Rock);
        assert_eq!(serde_json::to_string(&choice).ok().as_deref(), Some("\"Rock\""));
    }

    #[test]
    fn new_player_has_no_choice() {
        let player = Player::new("Alice");
        assert!(!player.has_moved());
        let Ok(json) = serde_json::to_value(&player) else {
            panic!("serialization failed");
        };
        assert!(json.get("choice").is_none());
        assert!(json.get("timestamp").is_some_and(serde_json::Value::is_i64));
    }

    #[test]
    fn record_choice_never_rewinds_timestamp() {
        let mut player = Player::new("Bob");
        player.timestamp = i64::MAX - 1;
        player.record_choice(Choice::Paper);
        assert_eq!(player.timestamp, i64::MAX - 1);
        assert_eq!(player.choice, Some(Choice::Paper));
    }

    #[test]
    fn sorts_by_timestamp() {
        let mut a = Player::new("a");
        let mut b = Player::new("b");
        a.timestamp = 20;
        b.timestamp = 10;
        let mut players = vec![a, b];
        sort_by_timestamp(&mut players);
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
