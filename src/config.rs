//! Fixed game constants. Board geometry is compile-time known: exactly 40
//! spaces, 32 houses and 12 hotels in the bank.

pub const SPACE_COUNT: usize = 40;

pub const STARTING_MONEY: i64 = 1500;
pub const GO_SALARY: i64 = 200;
pub const MAX_PLAYERS: usize = 4;
pub const MIN_PLAYERS: usize = 2;

pub const MAX_HOUSES: usize = 32;
pub const MAX_HOTELS: usize = 12;
pub const HOUSES_PER_HOTEL: usize = 4;
pub const HOTEL_LEVEL: usize = 5; // 4 houses + 1 hotel

pub const GO_POSITION: usize = 0;
pub const JAIL_POSITION: usize = 10;
pub const GO_TO_JAIL_POSITION: usize = 30;

pub const JAIL_FINE: i64 = 50;
pub const MAX_JAIL_TURNS: usize = 3;

pub const INCOME_TAX: i64 = 200;
pub const LUXURY_TAX: i64 = 100;

pub const MORTGAGE_RATE: i64 = 50; // percent of price
pub const UNMORTGAGE_RATE: i64 = 110; // percent of mortgage value

pub const AUCTION_BID_INCREMENT: i64 = 10;

pub const MAX_MESSAGES: usize = 12;

// Timing (seconds); phase durations only, not frame pacing.
pub const DICE_ANIM_DURATION: f64 = 0.8;
pub const TOKEN_MOVE_DURATION: f64 = 0.15; // per space
pub const AI_TURN_DELAY: f64 = 0.5;
