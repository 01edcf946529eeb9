//! JSON persistence. A snapshot captures the durable match state: players,
//! property ownership and the turn cursor. Deck order, dice RNG state and
//! in-flight dialogs are deliberately not persisted; a restored game starts
//! the current player's turn fresh.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::board::PropertyState;
use crate::config::{HOTEL_LEVEL, MAX_HOTELS, MAX_HOUSES, MAX_PLAYERS, MIN_PLAYERS, SPACE_COUNT};
use crate::player::Player;
use crate::turn::{DialogKind, Game, TurnPhase};

pub const DEFAULT_SAVE_PATH: &str = "config/save.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("save file is invalid: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlayerData {
    pub name: String,
    pub is_ai: bool,
    pub money: i64,
    pub position: usize,
    pub in_jail: bool,
    pub jail_turns: usize,
    pub bankrupt: bool,
    pub properties: Vec<usize>,
    pub jail_free_cards: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SaveData {
    pub players: Vec<PlayerData>,
    pub properties: Vec<PropertyState>,
    pub house_pool: usize,
    pub hotel_pool: usize,
    pub die1: usize,
    pub die2: usize,
    pub current: usize,
    pub turns: usize,
    pub messages: Vec<String>,
}

impl Game {
    pub fn snapshot(&self) -> SaveData {
        SaveData {
            players: self
                .players
                .iter()
                .map(|p| PlayerData {
                    name: p.name.clone(),
                    is_ai: p.is_ai,
                    money: p.money,
                    position: p.position,
                    in_jail: p.in_jail,
                    jail_turns: p.jail_turns,
                    bankrupt: p.bankrupt,
                    properties: p.properties.clone(),
                    jail_free_cards: p.jail_free_cards,
                })
                .collect(),
            properties: self.board.properties.to_vec(),
            house_pool: self.board.house_pool,
            hotel_pool: self.board.hotel_pool,
            die1: self.die1,
            die2: self.die2,
            current: self.current,
            turns: self.turns,
            messages: self.messages.clone(),
        }
    }

    /// Rebuilds a game from a snapshot. The seed feeds fresh decks and dice;
    /// the restored player begins their turn from the top. A snapshot that
    /// parses but violates board or player bounds is rejected as invalid.
    pub fn from_snapshot(data: &SaveData, seed: u64) -> Result<Self, SaveError> {
        validate(data)?;
        let roster: Vec<(&str, bool)> = data
            .players
            .iter()
            .map(|p| (p.name.as_str(), p.is_ai))
            .collect();
        let mut game = Game::new(&roster, seed);

        for (id, saved) in data.players.iter().enumerate() {
            let p = &mut game.players[id];
            *p = Player {
                id,
                name: saved.name.clone(),
                is_ai: saved.is_ai,
                money: saved.money,
                position: saved.position,
                in_jail: saved.in_jail,
                jail_turns: saved.jail_turns,
                bankrupt: saved.bankrupt,
                properties: saved.properties.clone(),
                jail_free_cards: saved.jail_free_cards,
            };
        }

        for (idx, prop) in data.properties.iter().enumerate() {
            if idx < game.board.properties.len() {
                game.board.properties[idx] = *prop;
            }
        }
        // Trust the placed houses over the saved pool counters.
        game.board.house_pool = MAX_HOUSES
            - game
                .board
                .properties
                .iter()
                .filter(|p| p.houses < HOTEL_LEVEL)
                .map(|p| p.houses)
                .sum::<usize>();
        game.board.hotel_pool = MAX_HOTELS
            - game
                .board
                .properties
                .iter()
                .filter(|p| p.houses == HOTEL_LEVEL)
                .count();

        game.die1 = data.die1.clamp(1, 6);
        game.die2 = data.die2.clamp(1, 6);
        game.current = data.current;
        game.turns = data.turns;
        for msg in &data.messages {
            game.add_message(msg.clone());
        }
        if game.players[game.current].in_jail {
            game.phase = TurnPhase::JailDecision;
            game.dialog = DialogKind::JailOptions;
        }
        Ok(game)
    }
}

/// Bounds checks over a parsed snapshot, so a hand-edited or truncated file
/// surfaces as a recoverable error instead of corrupting the match.
fn validate(data: &SaveData) -> Result<(), SaveError> {
    let invalid = |msg: String| Err(SaveError::Invalid(msg));

    let seats = data.players.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats) {
        return invalid(format!("player count {seats} out of range"));
    }
    if data.properties.len() != SPACE_COUNT {
        return invalid(format!(
            "expected {SPACE_COUNT} property entries, got {}",
            data.properties.len()
        ));
    }
    if data.current >= seats {
        return invalid(format!("current player {} out of range", data.current));
    }

    let mut houses = 0;
    let mut hotels = 0;
    for (idx, prop) in data.properties.iter().enumerate() {
        if let Some(owner) = prop.owner {
            if owner >= seats {
                return invalid(format!("space {idx} owned by unknown player {owner}"));
            }
        }
        if prop.houses > HOTEL_LEVEL {
            return invalid(format!("space {idx} has {} houses", prop.houses));
        }
        if prop.houses == HOTEL_LEVEL {
            hotels += 1;
        } else {
            houses += prop.houses;
        }
    }
    if houses > MAX_HOUSES || hotels > MAX_HOTELS {
        return invalid(format!(
            "{houses} houses and {hotels} hotels exceed the bank"
        ));
    }

    for player in &data.players {
        if player.position >= SPACE_COUNT {
            return invalid(format!("{} is at position {}", player.name, player.position));
        }
        if let Some(&idx) = player.properties.iter().find(|&&idx| idx >= SPACE_COUNT) {
            return invalid(format!("{} owns unknown space {idx}", player.name));
        }
        if player.money < 0 {
            return invalid(format!("{} has negative money", player.name));
        }
    }

    Ok(())
}

/// Writes the snapshot atomically: serialize to a sibling temp file, then
/// rename over the target so a crash never leaves a half-written save.
pub fn save(game: &Game, path: &Path) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&game.snapshot())?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load(path: &Path) -> Result<SaveData, SaveError> {
    let json = fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    info!(path = %path.display(), "game loaded");
    Ok(data)
}

pub fn has_save(path: &Path) -> bool {
    path.exists()
}

pub fn delete_save(path: &Path) -> Result<(), SaveError> {
    fs::remove_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trip_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut game = Game::new(&[("A", false), ("B", true)], 3);
        game.players[0].money = 900;
        game.players[0].add_property(1);
        game.board.properties[1].owner = Some(0);
        game.board.properties[1].houses = 2;
        game.board.house_pool -= 2;
        game.board.properties[3].owner = Some(0);
        game.players[0].add_property(3);
        game.board.properties[3].mortgaged = true;
        game.send_to_jail(1);
        game.current = 1;
        game.turns = 17;
        game.die1 = 4;
        game.die2 = 2;

        save(&game, &path).unwrap();
        assert!(has_save(&path));

        let data = load(&path).unwrap();
        let restored = Game::from_snapshot(&data, 99).unwrap();

        assert_eq!(restored.players[0].money, 900);
        assert_eq!(restored.players[0].properties, vec![1, 3]);
        assert_eq!(restored.board.properties[1].houses, 2);
        assert!(restored.board.properties[3].mortgaged);
        assert!(restored.players[1].in_jail);
        assert_eq!(restored.current, 1);
        assert_eq!(restored.turns, 17);
        assert_eq!((restored.die1, restored.die2), (4, 2));
        assert!(!restored.messages.is_empty());
        assert_eq!(restored.board.house_pool, MAX_HOUSES - 2);
        // Restored in-jail player starts at the jail decision.
        assert_eq!(restored.phase, TurnPhase::JailDecision);

        delete_save(&path).unwrap();
        assert!(!has_save(&path));
    }

    #[test]
    fn overbuilt_snapshot_is_rejected() {
        let game = Game::new(&[("A", false), ("B", true)], 3);
        let mut data = game.snapshot();
        // 10 spaces at 4 houses each claims 40 houses against a bank of 32.
        for prop in data.properties.iter_mut().take(10) {
            prop.houses = 4;
        }
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));
    }

    #[test]
    fn out_of_range_snapshot_fields_are_rejected() {
        let game = Game::new(&[("A", false), ("B", true)], 3);

        let mut data = game.snapshot();
        data.players[0].position = 99;
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));

        let mut data = game.snapshot();
        data.current = 7;
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));

        let mut data = game.snapshot();
        data.players.clear();
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));

        let mut data = game.snapshot();
        data.properties[1].houses = 9;
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));

        let mut data = game.snapshot();
        data.properties[1].owner = Some(5);
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));

        let mut data = game.snapshot();
        data.properties.truncate(12);
        assert!(matches!(
            Game::from_snapshot(&data, 3),
            Err(SaveError::Invalid(_))
        ));
    }

    #[test]
    fn corrupt_file_reports_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load(&path), Err(SaveError::Io(_))));
    }
}
