//! Pure rules over board and player state: rent, monopolies, building,
//! mortgages, net worth and the liquidation/bankruptcy pipeline.
//!
//! Build/sell operations assume the caller already gated them through the
//! matching `can_*` check; they apply unconditionally.

use crate::audio::AudioCue;
use crate::board::{ColorGroup, SpaceType};
use crate::config::{HOTEL_LEVEL, HOUSES_PER_HOTEL, MORTGAGE_RATE, UNMORTGAGE_RATE};
use crate::turn::Game;
use tracing::debug;

impl Game {
    /// Rent owed for landing on `space_index`, given the most recent dice
    /// total (utilities only). Mortgaged spaces collect nothing.
    pub fn calculate_rent(&self, space_index: usize, dice_total: usize) -> i64 {
        let space = &self.board.spaces[space_index];
        let prop = &self.board.properties[space_index];

        if prop.mortgaged {
            return 0;
        }

        match space.ty {
            SpaceType::Property => {
                if prop.houses > 0 {
                    space.rent[prop.houses]
                } else if let Some(owner) = prop.owner {
                    if self.has_monopoly(owner, space.group) {
                        space.rent[0] * 2
                    } else {
                        space.rent[0]
                    }
                } else {
                    space.rent[0]
                }
            }
            SpaceType::Railroad => {
                let count = prop
                    .owner
                    .map_or(0, |owner| self.count_owned_railroads(owner));
                match count {
                    1..=4 => [25, 50, 100, 200][count - 1],
                    _ => 25,
                }
            }
            SpaceType::Utility => {
                let count = prop
                    .owner
                    .map_or(0, |owner| self.count_owned_utilities(owner));
                if count == 2 {
                    dice_total as i64 * 10
                } else {
                    dice_total as i64 * 4
                }
            }
            _ => 0,
        }
    }

    /// True iff the player owns every space of the colour group.
    pub fn has_monopoly(&self, player_id: usize, group: ColorGroup) -> bool {
        if group == ColorGroup::None {
            return false;
        }
        self.board
            .spaces_in_group(group)
            .iter()
            .all(|&idx| self.board.properties[idx].owner == Some(player_id))
    }

    pub fn count_owned_railroads(&self, player_id: usize) -> usize {
        self.board
            .railroad_indices()
            .iter()
            .filter(|&&idx| self.board.properties[idx].owner == Some(player_id))
            .count()
    }

    pub fn count_owned_utilities(&self, player_id: usize) -> usize {
        self.board
            .utility_indices()
            .iter()
            .filter(|&&idx| self.board.properties[idx].owner == Some(player_id))
            .count()
    }

    /// Building on a group requires the full monopoly with no member mortgaged.
    pub fn can_build_on_group(&self, player_id: usize, group: ColorGroup) -> bool {
        if group == ColorGroup::None || !self.has_monopoly(player_id, group) {
            return false;
        }
        self.board
            .spaces_in_group(group)
            .iter()
            .all(|&idx| !self.board.properties[idx].mortgaged)
    }

    /// Even building rule: a property may only receive a house while it has
    /// the fewest houses in its group.
    pub fn can_build_on_space(&self, space_index: usize) -> bool {
        let space = &self.board.spaces[space_index];
        let prop = &self.board.properties[space_index];

        if space.ty != SpaceType::Property {
            return false;
        }
        let Some(owner) = prop.owner else {
            return false;
        };
        if prop.mortgaged || !self.can_build_on_group(owner, space.group) {
            return false;
        }
        if prop.houses >= HOTEL_LEVEL {
            return false;
        }

        // Pool availability: upgrading 4 houses needs a hotel, anything else a house.
        if prop.houses == HOUSES_PER_HOTEL {
            if self.board.hotel_pool == 0 {
                return false;
            }
        } else if self.board.house_pool == 0 {
            return false;
        }

        prop.houses <= self.min_houses_in_group(space.group)
    }

    /// Adds a house (or upgrades to a hotel) and returns the cost charged.
    /// Caller must have validated via `can_build_on_space`.
    pub fn build_house(&mut self, space_index: usize) -> i64 {
        let house_cost = self.board.spaces[space_index].house_cost;
        let prop = &mut self.board.properties[space_index];

        if prop.houses == HOUSES_PER_HOTEL {
            // Upgrade to hotel: return 4 houses to the pool, take 1 hotel.
            self.board.house_pool += HOUSES_PER_HOTEL;
            self.board.hotel_pool -= 1;
            prop.houses = HOTEL_LEVEL;
        } else {
            self.board.house_pool -= 1;
            prop.houses += 1;
        }
        house_cost
    }

    /// Even selling rule: a house may only be removed from a property holding
    /// the most houses in its group.
    pub fn can_sell_house_on_space(&self, space_index: usize) -> bool {
        let space = &self.board.spaces[space_index];
        let prop = &self.board.properties[space_index];
        if space.ty != SpaceType::Property || prop.houses == 0 {
            return false;
        }
        prop.houses >= self.max_houses_in_group(space.group)
    }

    /// Removes a house (or downgrades a hotel) and returns the refund,
    /// half the house cost rounded down.
    pub fn sell_house(&mut self, space_index: usize) -> i64 {
        let house_cost = self.board.spaces[space_index].house_cost;
        let prop = &mut self.board.properties[space_index];

        if prop.houses == HOTEL_LEVEL {
            // Downgrade from hotel: return the hotel, take 4 houses back.
            self.board.hotel_pool += 1;
            self.board.house_pool -= HOUSES_PER_HOTEL;
            prop.houses = HOUSES_PER_HOTEL;
        } else {
            self.board.house_pool += 1;
            prop.houses -= 1;
        }
        house_cost / 2
    }

    pub fn buildable_properties(&self, player_id: usize) -> Vec<usize> {
        self.players[player_id]
            .properties
            .iter()
            .copied()
            .filter(|&idx| self.can_build_on_space(idx))
            .collect()
    }

    pub fn sellable_properties(&self, player_id: usize) -> Vec<usize> {
        self.players[player_id]
            .properties
            .iter()
            .copied()
            .filter(|&idx| self.can_sell_house_on_space(idx))
            .collect()
    }

    /// Unmortgaged, unimproved properties (the only ones mortgageable).
    pub fn mortgageable_properties(&self, player_id: usize) -> Vec<usize> {
        self.players[player_id]
            .properties
            .iter()
            .copied()
            .filter(|&idx| {
                let prop = &self.board.properties[idx];
                !prop.mortgaged && prop.houses == 0
            })
            .collect()
    }

    /// Mortgaged properties the player can currently afford to redeem.
    pub fn unmortgageable_properties(&self, player_id: usize) -> Vec<usize> {
        self.players[player_id]
            .properties
            .iter()
            .copied()
            .filter(|&idx| {
                self.board.properties[idx].mortgaged
                    && self.players[player_id].money >= self.unmortgage_cost(idx)
            })
            .collect()
    }

    pub fn mortgage_value(&self, space_index: usize) -> i64 {
        self.board.spaces[space_index].price * MORTGAGE_RATE / 100
    }

    /// The two sequential truncating divisions are load-bearing: price 60
    /// mortgages for 30 and redeems for 33, not 60*55/100 = 33 by accident
    /// but 30*110/100 = 33 by construction.
    pub fn unmortgage_cost(&self, space_index: usize) -> i64 {
        self.mortgage_value(space_index) * UNMORTGAGE_RATE / 100
    }

    /// Sets the flag and returns the cash the owner receives.
    pub fn mortgage_property(&mut self, space_index: usize) -> i64 {
        self.board.properties[space_index].mortgaged = true;
        self.mortgage_value(space_index)
    }

    /// Clears the flag and returns the cost charged.
    pub fn unmortgage_property(&mut self, space_index: usize) -> i64 {
        self.board.properties[space_index].mortgaged = false;
        self.unmortgage_cost(space_index)
    }

    fn min_houses_in_group(&self, group: ColorGroup) -> usize {
        self.board
            .spaces_in_group(group)
            .iter()
            .map(|&idx| self.board.properties[idx].houses)
            .min()
            .unwrap_or(0)
    }

    fn max_houses_in_group(&self, group: ColorGroup) -> usize {
        self.board
            .spaces_in_group(group)
            .iter()
            .map(|&idx| self.board.properties[idx].houses)
            .max()
            .unwrap_or(0)
    }

    /// Cash plus property values: mortgaged properties count at mortgage
    /// value, developed ones add half the sunk house cost.
    pub fn player_net_worth(&self, player_id: usize) -> i64 {
        let p = &self.players[player_id];
        let mut total = p.money;
        for &idx in &p.properties {
            let space = &self.board.spaces[idx];
            let prop = &self.board.properties[idx];
            if prop.mortgaged {
                total += self.mortgage_value(idx);
            } else {
                total += space.price;
            }
            if prop.houses > 0 && prop.houses <= HOUSES_PER_HOTEL {
                total += prop.houses as i64 * space.house_cost / 2;
            } else if prop.houses == HOTEL_LEVEL {
                total += HOUSES_PER_HOTEL as i64 * space.house_cost / 2;
            }
        }
        total
    }

    /// Pays `amount` from `debtor` to `creditor` (`None` = the bank),
    /// liquidating assets if needed and declaring bankruptcy as the final
    /// fallback. Every money-debit path in the game routes through here.
    pub fn pay_debt(&mut self, debtor: usize, creditor: Option<usize>, amount: i64) {
        if self.players[debtor].money >= amount {
            self.transfer(debtor, creditor, amount);
            return;
        }

        self.auto_liquidate(debtor);

        if self.players[debtor].money >= amount {
            self.transfer(debtor, creditor, amount);
            return;
        }

        self.declare_bankruptcy(debtor, creditor);
    }

    fn transfer(&mut self, debtor: usize, creditor: Option<usize>, amount: i64) {
        self.players[debtor].pay(amount);
        if let Some(creditor) = creditor {
            self.players[creditor].receive(amount);
        }
    }

    /// Sells every eligible house (respecting the even-selling rule, looping
    /// until nothing more can go) and then mortgages every unimproved
    /// property, crediting proceeds as each step completes.
    pub fn auto_liquidate(&mut self, player_id: usize) {
        loop {
            let mut sold = false;
            for idx in self.players[player_id].properties.clone() {
                if self.board.properties[idx].houses > 0 && self.can_sell_house_on_space(idx) {
                    let refund = self.sell_house(idx);
                    self.players[player_id].receive(refund);
                    let name = self.board.spaces[idx].name;
                    let player = self.players[player_id].name.clone();
                    self.add_message(format!("{player} sold house on {name} (+{refund} MAD)"));
                    sold = true;
                }
            }
            if !sold {
                break;
            }
        }

        for idx in self.players[player_id].properties.clone() {
            let prop = &self.board.properties[idx];
            if !prop.mortgaged && prop.houses == 0 {
                let value = self.mortgage_property(idx);
                self.players[player_id].receive(value);
                let name = self.board.spaces[idx].name;
                let player = self.players[player_id].name.clone();
                self.add_message(format!("{player} mortgaged {name} (+{value} MAD)"));
            }
        }
    }

    /// Flags the debtor bankrupt and settles the estate: everything goes to
    /// the creditor, or back to the bank (cleared for re-auction) when the
    /// debt was owed to the bank.
    pub fn declare_bankruptcy(&mut self, debtor: usize, creditor: Option<usize>) {
        let debtor_name = self.players[debtor].name.clone();
        self.add_message(format!("{debtor_name} is BANKRUPT!"));
        debug!(debtor, ?creditor, "bankruptcy declared");
        self.play_cue(AudioCue::Bankruptcy);
        self.players[debtor].bankrupt = true;

        let properties = std::mem::take(&mut self.players[debtor].properties);
        if let Some(creditor) = creditor {
            let money = self.players[debtor].money;
            let cards = self.players[debtor].jail_free_cards;
            self.players[creditor].receive(money.max(0));
            for idx in properties {
                self.players[creditor].add_property(idx);
                self.board.properties[idx].owner = Some(creditor);
            }
            self.players[creditor].jail_free_cards += cards;
            let creditor_name = self.players[creditor].name.clone();
            self.add_message(format!(
                "{creditor_name} receives all of {debtor_name}'s assets"
            ));
        } else {
            // Owed to the bank: properties return to circulation, cleared.
            for idx in properties {
                let prop = &mut self.board.properties[idx];
                prop.owner = None;
                prop.mortgaged = false;
                prop.houses = 0;
            }
        }

        self.players[debtor].money = 0;
        self.players[debtor].jail_free_cards = 0;

        self.check_game_over();
    }
}

#[cfg(test)]
mod tests {
    use crate::board::ColorGroup;
    use crate::config::{MAX_HOTELS, MAX_HOUSES};
    use crate::turn::Game;

    fn two_player_game() -> Game {
        Game::new(&[("A", false), ("B", false)], 1)
    }

    fn give(game: &mut Game, player: usize, space: usize) {
        game.board.properties[space].owner = Some(player);
        game.players[player].add_property(space);
    }

    fn house_equivalents(game: &Game) -> usize {
        let mut total = game.board.house_pool + game.board.hotel_pool * 4;
        for prop in &game.board.properties {
            total += if prop.houses == 5 { 4 } else { prop.houses };
        }
        total
    }

    #[test]
    fn mortgage_arithmetic_truncates_twice() {
        let game = two_player_game();
        // Av. Mohammed V: price 140 -> mortgage 70 -> unmortgage 77
        assert_eq!(game.mortgage_value(11), 70);
        assert_eq!(game.unmortgage_cost(11), 77);
        // Derb Sultan: price 60 -> mortgage 30 -> unmortgage 33
        assert_eq!(game.mortgage_value(1), 30);
        assert_eq!(game.unmortgage_cost(1), 33);
    }

    #[test]
    fn mortgage_round_trip_costs_money() {
        let mut game = two_player_game();
        give(&mut game, 0, 1);
        let before = game.players[0].money;
        let value = game.mortgage_property(1);
        game.players[0].receive(value);
        let cost = game.unmortgage_property(1);
        game.players[0].pay(cost);
        assert!(!game.board.properties[1].mortgaged);
        assert_eq!(game.players[0].money, before - (cost - value));
        assert!(cost > value);
    }

    #[test]
    fn monopoly_doubles_base_rent() {
        let mut game = two_player_game();
        give(&mut game, 0, 1);
        assert_eq!(game.calculate_rent(1, 7), 2);
        give(&mut game, 0, 3);
        assert_eq!(game.calculate_rent(1, 7), 4);
    }

    #[test]
    fn railroad_rent_scales_with_count() {
        let mut game = two_player_game();
        give(&mut game, 0, 5);
        assert_eq!(game.calculate_rent(5, 7), 25);
        for idx in [15, 25, 35] {
            give(&mut game, 0, idx);
        }
        for idx in [5, 15, 25, 35] {
            assert_eq!(game.calculate_rent(idx, 7), 200);
        }
    }

    #[test]
    fn utility_rent_uses_dice_total() {
        let mut game = two_player_game();
        give(&mut game, 0, 12);
        assert_eq!(game.calculate_rent(12, 7), 28);
        give(&mut game, 0, 28);
        assert_eq!(game.calculate_rent(12, 7), 70);
    }

    #[test]
    fn mortgaged_space_collects_nothing() {
        let mut game = two_player_game();
        give(&mut game, 0, 39);
        game.board.properties[39].mortgaged = true;
        assert_eq!(game.calculate_rent(39, 7), 0);
    }

    #[test]
    fn even_building_holds_under_greedy_builds() {
        let mut game = two_player_game();
        let group = game.board.spaces_in_group(ColorGroup::Orange);
        for &idx in &group {
            give(&mut game, 0, idx);
        }
        // Build as many houses as the rules admit, always on the first
        // eligible space; spread must stay within one house.
        for _ in 0..group.len() * 5 {
            let Some(&idx) = group.iter().find(|&&idx| game.can_build_on_space(idx)) else {
                break;
            };
            game.build_house(idx);
            let houses: Vec<usize> = group
                .iter()
                .map(|&idx| game.board.properties[idx].houses)
                .collect();
            let min = *houses.iter().min().unwrap();
            let max = *houses.iter().max().unwrap();
            assert!(max - min <= 1, "uneven build: {houses:?}");
        }
        assert!(group
            .iter()
            .all(|&idx| game.board.properties[idx].houses == 5));
    }

    #[test]
    fn pool_conservation_through_build_and_sell() {
        let mut game = two_player_game();
        let start = MAX_HOUSES + MAX_HOTELS * 4;
        assert_eq!(house_equivalents(&game), start);

        for idx in game.board.spaces_in_group(ColorGroup::Brown) {
            give(&mut game, 0, idx);
        }
        for _ in 0..10 {
            if let Some(idx) = game.buildable_properties(0).first().copied() {
                game.build_house(idx);
                assert_eq!(house_equivalents(&game), start);
            }
        }
        while let Some(idx) = game.sellable_properties(0).first().copied() {
            game.sell_house(idx);
            assert_eq!(house_equivalents(&game), start);
        }
    }

    #[test]
    fn hotel_upgrade_moves_pool_counts() {
        let mut game = two_player_game();
        for idx in game.board.spaces_in_group(ColorGroup::Brown) {
            give(&mut game, 0, idx);
        }
        // 4 houses on both brown spaces, then upgrade one to a hotel.
        for _ in 0..8 {
            let idx = game.buildable_properties(0)[0];
            game.build_house(idx);
        }
        let houses_before = game.board.house_pool;
        let hotels_before = game.board.hotel_pool;
        let idx = game.buildable_properties(0)[0];
        game.build_house(idx);
        assert_eq!(game.board.properties[idx].houses, 5);
        assert_eq!(game.board.house_pool, houses_before + 4);
        assert_eq!(game.board.hotel_pool, hotels_before - 1);
    }

    #[test]
    fn cannot_build_on_mortgaged_group() {
        let mut game = two_player_game();
        for idx in game.board.spaces_in_group(ColorGroup::Brown) {
            give(&mut game, 0, idx);
        }
        game.board.properties[1].mortgaged = true;
        assert!(!game.can_build_on_space(3));
    }

    #[test]
    fn empty_house_pool_blocks_building() {
        let mut game = two_player_game();
        for idx in game.board.spaces_in_group(ColorGroup::Brown) {
            give(&mut game, 0, idx);
        }
        game.board.house_pool = 0;
        assert!(!game.can_build_on_space(1));
    }

    #[test]
    fn debt_liquidates_before_bankruptcy() {
        let mut game = two_player_game();
        // 40 MAD cash, one unmortgaged houseless property worth 60, owing 50.
        game.players[0].money = 40;
        give(&mut game, 0, 1);
        game.pay_debt(0, Some(1), 50);
        assert!(!game.players[0].bankrupt);
        assert!(game.board.properties[1].mortgaged);
        assert_eq!(game.players[0].money, 20); // 40 + 30 mortgage - 50 debt
    }

    #[test]
    fn bankruptcy_to_creditor_transfers_everything() {
        let mut game = two_player_game();
        game.players[0].money = 10;
        game.players[0].jail_free_cards = 1;
        give(&mut game, 0, 1);
        game.board.properties[1].mortgaged = true; // nothing left to liquidate
        game.pay_debt(0, Some(1), 500);
        assert!(game.players[0].bankrupt);
        assert!(game.players[0].properties.is_empty());
        assert_eq!(game.players[0].money, 0);
        assert_eq!(game.board.properties[1].owner, Some(1));
        assert!(game.board.properties[1].mortgaged); // state preserved
        assert_eq!(game.players[1].jail_free_cards, 1);
    }

    #[test]
    fn bankruptcy_to_bank_returns_properties_cleared() {
        let mut game = two_player_game();
        game.players[0].money = 0;
        give(&mut game, 0, 1);
        game.board.properties[1].mortgaged = true;
        game.pay_debt(0, None, 500);
        assert!(game.players[0].bankrupt);
        assert_eq!(game.board.properties[1].owner, None);
        assert!(!game.board.properties[1].mortgaged);
        assert_eq!(game.board.properties[1].houses, 0);
    }
}
