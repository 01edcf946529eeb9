//! Auction round embedded in the turn state machine. An auction is created
//! when a buy decision is declined and discarded as soon as it resolves.

use crate::ai;
use crate::audio::AudioCue;
use crate::config::AUCTION_BID_INCREMENT;
use crate::turn::{DialogKind, Game, TurnPhase};
use tracing::debug;

/// Scratch state for one auction. Owned by the turn state machine while the
/// round runs; dropped on completion so no stale bids survive.
pub struct Auction {
    pub space: usize,
    /// Player whose turn it is to bid.
    pub current: usize,
    pub high_bid: i64,
    pub high_bidder: Option<usize>,
    /// Still-in-the-running flag per player id.
    pub active: Vec<bool>,
}

impl Auction {
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }
}

impl Game {
    /// Opens an auction for `space_index` among all non-bankrupt players,
    /// starting with the player after the one who declined.
    pub fn start_auction(&mut self, space_index: usize) {
        let active = self.players.iter().map(|p| !p.bankrupt).collect();
        self.auction = Some(Auction {
            space: space_index,
            current: self.current,
            high_bid: 0,
            high_bidder: None,
            active,
        });
        self.phase = TurnPhase::Auction;
        self.dialog = DialogKind::Auction;
        let name = self.board.spaces[space_index].name;
        self.add_message(format!("Auction started for {name}!"));
        self.advance_auction();
    }

    /// Rotates to the next active bidder, resolving AI bids inline until a
    /// human bidder is up or the auction ends.
    pub(crate) fn advance_auction(&mut self) {
        loop {
            let Some(auction) = &self.auction else {
                return;
            };
            if auction.active_count() <= 1 {
                let winner = match auction.high_bidder {
                    Some(bidder) if auction.high_bid > 0 => Some(bidder),
                    _ => None,
                };
                self.end_auction(winner);
                return;
            }

            let auction = self.auction.as_mut().expect("auction in progress");
            loop {
                auction.current = (auction.current + 1) % self.players.len();
                if auction.active[auction.current] {
                    break;
                }
            }

            let bidder = auction.current;
            if self.players[bidder].is_ai {
                self.ai_bid(bidder);
            } else {
                // Wait for the human's bid or pass.
                return;
            }
        }
    }

    /// Current bidder raises by the fixed increment. An unaffordable bid
    /// counts as a pass.
    pub(crate) fn auction_bid(&mut self) {
        let Some(auction) = self.auction.as_mut() else {
            return;
        };
        let bidder = auction.current;
        let amount = auction.high_bid + AUCTION_BID_INCREMENT;
        if self.players[bidder].money >= amount {
            auction.high_bid = amount;
            auction.high_bidder = Some(bidder);
            let name = self.players[bidder].name.clone();
            self.add_message(format!("{name} bids {amount} MAD"));
        } else {
            auction.active[bidder] = false;
            let name = self.players[bidder].name.clone();
            self.add_message(format!("{name} passes"));
        }
        self.advance_auction();
    }

    pub(crate) fn auction_pass(&mut self) {
        let Some(auction) = self.auction.as_mut() else {
            return;
        };
        let bidder = auction.current;
        auction.active[bidder] = false;
        let name = self.players[bidder].name.clone();
        self.add_message(format!("{name} passes"));
        self.advance_auction();
    }

    /// AI bidding: raise while under the price cap with reserve to spare,
    /// withdraw otherwise.
    fn ai_bid(&mut self, bidder: usize) {
        let auction = self.auction.as_mut().expect("auction in progress");
        let amount = auction.high_bid + AUCTION_BID_INCREMENT;
        let price = self.board.spaces[auction.space].price;
        if ai::should_bid(&self.players[bidder], amount, price) {
            auction.high_bid = amount;
            auction.high_bidder = Some(bidder);
            let name = self.players[bidder].name.clone();
            self.add_message(format!("{name} (AI) bids {amount} MAD"));
        } else {
            auction.active[bidder] = false;
            let name = self.players[bidder].name.clone();
            self.add_message(format!("{name} (AI) passes"));
        }
    }

    /// Settles the auction: the winner (if any) pays the bank and takes the
    /// property; with no bids it stays unowned. The auction value is dropped.
    fn end_auction(&mut self, winner: Option<usize>) {
        let auction = self.auction.take().expect("auction in progress");
        let name = self.board.spaces[auction.space].name;

        match winner {
            Some(winner) => {
                self.players[winner].pay(auction.high_bid);
                self.players[winner].add_property(auction.space);
                self.board.properties[auction.space].owner = Some(winner);
                let winner_name = self.players[winner].name.clone();
                debug!(winner, space = auction.space, bid = auction.high_bid, "auction won");
                self.add_message(format!(
                    "{winner_name} wins auction for {name} at {} MAD!",
                    auction.high_bid
                ));
                self.play_cue(AudioCue::Purchase);
            }
            None => {
                self.add_message(format!("No bids! {name} remains unowned."));
            }
        }

        self.dialog = DialogKind::None;
        self.phase = TurnPhase::PostAction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::{Game, PlayerInput};

    #[test]
    fn all_ai_auction_resolves_immediately() {
        let mut game = Game::new(&[("A", true), ("B", true), ("C", true)], 5);
        game.start_auction(1); // Derb Sultan, price 60
        // AI cap is 80% of 60 = 48, so bids stop at 40.
        assert!(game.auction.is_none());
        assert_eq!(game.phase, TurnPhase::PostAction);
        let owner = game.board.properties[1].owner;
        assert!(owner.is_some());
        let winner = owner.unwrap();
        assert!(game.players[winner].owns_property(1));
        assert!(game.players[winner].money < 1500);
    }

    #[test]
    fn broke_ais_leave_property_unowned() {
        let mut game = Game::new(&[("A", true), ("B", true)], 5);
        game.players[0].money = 50;
        game.players[1].money = 50;
        game.start_auction(39); // price 400; nobody clears the reserve
        assert!(game.auction.is_none());
        assert_eq!(game.board.properties[39].owner, None);
    }

    #[test]
    fn human_bid_and_pass_round_trip() {
        let mut game = Game::new(&[("H", false), ("AI", true)], 9);
        game.start_auction(39); // price 400, AI cap 320
        // Auction waits on the human bidder.
        assert!(game.auction.is_some());
        let before = game.auction.as_ref().unwrap().high_bid;
        game.queue_input(PlayerInput::Bid);
        game.advance(0.0);
        // Either the auction ended (AI withdrew) or the high bid moved past ours.
        match &game.auction {
            Some(a) => assert!(a.high_bid > before),
            None => assert!(game.board.properties[39].owner.is_some()),
        }
    }

    #[test]
    fn human_pass_hands_it_to_the_last_bidder() {
        let mut game = Game::new(&[("H", false), ("AI", true)], 2);
        game.start_auction(1);
        // The AI opened with a bid; the human is up.
        assert!(game.auction.is_some());
        game.queue_input(PlayerInput::Pass);
        game.advance(0.0);
        assert!(game.auction.is_none());
        assert_eq!(game.board.properties[1].owner, Some(1));
        assert_eq!(game.phase, TurnPhase::PostAction);
    }
}
