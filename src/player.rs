use crate::config::{GO_POSITION, STARTING_MONEY};

/// A game participant. Players are never removed from the player list, even
/// after bankruptcy, so ids stay stable for the whole match.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub is_ai: bool,
    pub money: i64,
    pub position: usize,
    pub in_jail: bool,
    pub jail_turns: usize,
    pub bankrupt: bool,
    /// Space indices owned, in acquisition order.
    pub properties: Vec<usize>,
    pub jail_free_cards: usize,
}

impl Player {
    pub fn new(id: usize, name: impl Into<String>, is_ai: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_ai,
            money: STARTING_MONEY,
            position: GO_POSITION,
            in_jail: false,
            jail_turns: 0,
            bankrupt: false,
            properties: Vec::new(),
            jail_free_cards: 0,
        }
    }

    pub fn add_property(&mut self, space: usize) {
        if !self.properties.contains(&space) {
            self.properties.push(space);
        }
    }

    pub fn remove_property(&mut self, space: usize) {
        self.properties.retain(|&idx| idx != space);
    }

    pub fn owns_property(&self, space: usize) -> bool {
        self.properties.contains(&space)
    }

    /// Deducts money. Callers that can overdraw must go through
    /// `Game::pay_debt` instead.
    pub fn pay(&mut self, amount: i64) {
        debug_assert!(amount >= 0);
        self.money -= amount;
    }

    pub fn receive(&mut self, amount: i64) {
        debug_assert!(amount >= 0);
        self.money += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_on_depart_with_full_funds() {
        let p = Player::new(2, "Amina", true);
        assert_eq!(p.position, GO_POSITION);
        assert_eq!(p.money, STARTING_MONEY);
        assert!(!p.in_jail && !p.bankrupt);
        assert!(p.properties.is_empty());
    }
}
