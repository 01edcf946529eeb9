//! Monopoly marocain: a Moroccan-themed Monopoly engine.
//!
//! The crate is a frontend-agnostic rules engine. [`Game`] owns the full
//! match state and is stepped with [`Game::advance`]; a driver feeds it
//! [`PlayerInput`] values for human decisions and reads the public fields
//! (board, players, phase, dialog, messages) to render. Dice and deck
//! shuffles come from a seeded RNG, so a seed fully determines a match.

pub mod ai;
pub mod auction;
pub mod audio;
pub mod board;
pub mod cards;
pub mod config;
pub mod player;
pub mod rules;
pub mod save;
pub mod trade;
pub mod turn;

pub use audio::{AudioCue, AudioSink, NullAudio};
pub use turn::{DialogKind, Game, GameState, PlayerInput, TurnPhase};
