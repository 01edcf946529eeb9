//! Stateless AI decision functions. The turn state machine consults these
//! whenever the active player is computer-controlled; trade evaluation lives
//! in `trade.rs` because it needs full board context.

use crate::config::JAIL_FINE;
use crate::player::Player;

const BUY_BUFFER_EARLY: i64 = 200; // keep at least this much after buying (early game)
const BUY_BUFFER_LATE: i64 = 100; // keep at least this much after buying (late game)
const BUILD_BUFFER: i64 = 150; // keep after building
const LATE_GAME_PROPERTY_COUNT: usize = 10;

pub const BID_RESERVE: i64 = 100; // keep after an auction bid
pub const BID_PRICE_CAP_PERCENT: i64 = 80; // never bid above this share of list price

/// Buy if the purchase leaves a cash buffer; the buffer shrinks once the
/// market has mostly been claimed.
pub fn should_buy(player: &Player, price: i64, total_owned: usize) -> bool {
    let buffer = if total_owned > LATE_GAME_PROPERTY_COUNT {
        BUY_BUFFER_LATE
    } else {
        BUY_BUFFER_EARLY
    };
    player.money >= price + buffer
}

pub fn should_build(player: &Player, house_cost: i64) -> bool {
    player.money >= house_cost + BUILD_BUFFER
}

/// Bid `amount` if it stays under the price cap and leaves the reserve;
/// otherwise withdraw from the auction.
pub fn should_bid(player: &Player, amount: i64, price: i64) -> bool {
    amount <= price * BID_PRICE_CAP_PERCENT / 100 && player.money >= amount + BID_RESERVE
}

/// How an AI leaves jail: card first, then fine when comfortably solvent,
/// otherwise try for doubles.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum JailChoice {
    UseCard,
    PayFine,
    Roll,
}

pub fn jail_choice(player: &Player) -> JailChoice {
    if player.jail_free_cards > 0 {
        JailChoice::UseCard
    } else if player.money >= JAIL_FINE + 200 {
        JailChoice::PayFine
    } else {
        JailChoice::Roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with(money: i64) -> Player {
        let mut p = Player::new(0, "AI", true);
        p.money = money;
        p
    }

    #[test]
    fn buy_buffer_shrinks_late_game() {
        let p = player_with(250);
        assert!(!should_buy(&p, 100, 0));
        assert!(should_buy(&p, 100, 11));
    }

    #[test]
    fn bid_respects_price_cap_and_reserve() {
        let p = player_with(1000);
        assert!(should_bid(&p, 80, 100));
        assert!(!should_bid(&p, 90, 100)); // above 80% of price
        let poor = player_with(150);
        assert!(!should_bid(&poor, 80, 100)); // reserve not covered
    }

    #[test]
    fn jail_prefers_card_then_fine() {
        let mut p = player_with(1000);
        p.jail_free_cards = 1;
        assert_eq!(jail_choice(&p), JailChoice::UseCard);
        p.jail_free_cards = 0;
        assert_eq!(jail_choice(&p), JailChoice::PayFine);
        p.money = 100;
        assert_eq!(jail_choice(&p), JailChoice::Roll);
    }
}
