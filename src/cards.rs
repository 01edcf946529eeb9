use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Effect carried by a Chance or Caisse Commune card.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CardEffect {
    /// Collect money from the bank.
    Collect { amount: i64 },
    /// Pay money to the bank.
    Pay { amount: i64 },
    /// Move to a specific space, collecting salary when passing DEPART.
    MoveTo { space: usize },
    /// Move by a signed number of steps (no salary).
    MoveSteps { steps: isize },
    GoToJail,
    GetOutOfJail,
    /// Repairs: pay per house and per hotel owned.
    PayPerHouse { per_house: i64, per_hotel: i64 },
    /// Collect from every other player.
    CollectAll { amount: i64 },
    /// Pay every other player.
    PayAll { amount: i64 },
}

#[derive(Copy, Clone, Debug)]
pub struct Card {
    pub text: &'static str,
    pub effect: CardEffect,
}

/// A shuffled card deck that never empties: drawing past the end reshuffles
/// and resets the draw pointer before the draw completes.
pub struct Deck {
    cards: Vec<Card>,
    current: usize,
}

impl Deck {
    pub fn new(cards: Vec<Card>, rng: &mut StdRng) -> Self {
        assert!(!cards.is_empty(), "deck must not be empty");
        let mut deck = Self { cards, current: 0 };
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle(&mut self, rng: &mut StdRng) {
        self.cards.shuffle(rng);
        self.current = 0;
    }

    pub fn draw(&mut self, rng: &mut StdRng) -> Card {
        if self.current >= self.cards.len() {
            self.shuffle(rng);
        }
        let card = self.cards[self.current];
        self.current += 1;
        card
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

pub fn chance_cards() -> Vec<Card> {
    use CardEffect::*;
    vec![
        Card { text: "Avancez jusqu'a DEPART. Recevez 200 MAD.", effect: MoveTo { space: 0 } },
        Card { text: "Allez a Jemaa el-Fna. Si vous passez par DEPART, recevez 200 MAD.", effect: MoveTo { space: 21 } },
        Card { text: "Allez a Av. Mohammed V (Rabat). Si vous passez par DEPART, recevez 200 MAD.", effect: MoveTo { space: 11 } },
        Card { text: "Allez a Gare Marrakech. Si vous passez par DEPART, recevez 200 MAD.", effect: MoveTo { space: 25 } },
        Card { text: "La banque vous verse 50 MAD de dividendes.", effect: Collect { amount: 50 } },
        Card { text: "Vous avez gagne le prix du Festival de Fes! Recevez 150 MAD.", effect: Collect { amount: 150 } },
        Card { text: "Carte de sortie de prison gratuite.", effect: GetOutOfJail },
        Card { text: "Reculez de 3 cases.", effect: MoveSteps { steps: -3 } },
        Card { text: "Allez en prison. Ne passez pas par DEPART.", effect: GoToJail },
        Card { text: "Faites des reparations: payez 25 MAD par maison et 100 MAD par hotel.", effect: PayPerHouse { per_house: 25, per_hotel: 100 } },
        Card { text: "Amende pour exces de vitesse: 15 MAD.", effect: Pay { amount: 15 } },
        Card { text: "Voyage au souk! Allez a Gare Casa-Voyageurs.", effect: MoveTo { space: 5 } },
        Card { text: "Elu president du conseil communal. Payez 50 MAD a chaque joueur.", effect: PayAll { amount: 50 } },
        Card { text: "Votre investissement immobilier rapporte: recevez 100 MAD.", effect: Collect { amount: 100 } },
        Card { text: "Allez a Chefchaouen. Si vous passez par DEPART, recevez 200 MAD.", effect: MoveTo { space: 37 } },
        Card { text: "Allez a Derb Sultan.", effect: MoveTo { space: 1 } },
    ]
}

pub fn community_cards() -> Vec<Card> {
    use CardEffect::*;
    vec![
        Card { text: "Avancez jusqu'a DEPART. Recevez 200 MAD.", effect: MoveTo { space: 0 } },
        Card { text: "Erreur bancaire en votre faveur. Recevez 200 MAD.", effect: Collect { amount: 200 } },
        Card { text: "Frais medicaux. Payez 50 MAD.", effect: Pay { amount: 50 } },
        Card { text: "Vente de votre huile d'argan. Recevez 50 MAD.", effect: Collect { amount: 50 } },
        Card { text: "Carte de sortie de prison gratuite.", effect: GetOutOfJail },
        Card { text: "Allez en prison. Ne passez pas par DEPART.", effect: GoToJail },
        Card { text: "Fete de l'Aid! Recevez 100 MAD de chaque joueur.", effect: CollectAll { amount: 100 } },
        Card { text: "Remboursement d'impots. Recevez 20 MAD.", effect: Collect { amount: 20 } },
        Card { text: "C'est votre anniversaire! Recevez 10 MAD de chaque joueur.", effect: CollectAll { amount: 10 } },
        Card { text: "Assurance vie. Recevez 100 MAD.", effect: Collect { amount: 100 } },
        Card { text: "Frais de scolarite. Payez 150 MAD.", effect: Pay { amount: 150 } },
        Card { text: "Recevez votre allocation vacances. Recevez 100 MAD.", effect: Collect { amount: 100 } },
        Card { text: "Heritage familial. Recevez 100 MAD.", effect: Collect { amount: 100 } },
        Card { text: "Reparations de votre riad: payez 40 MAD par maison et 115 MAD par hotel.", effect: PayPerHouse { per_house: 40, per_hotel: 115 } },
        Card { text: "Frais d'hospitalisation. Payez 100 MAD.", effect: Pay { amount: 100 } },
        Card { text: "Deuxieme prix au concours de beaute. Recevez 10 MAD.", effect: Collect { amount: 10 } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn draw_past_end_reshuffles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::new(chance_cards(), &mut rng);
        let n = deck.len();
        for _ in 0..n {
            deck.draw(&mut rng);
        }
        assert_eq!(deck.current, n);
        // The (n+1)th draw triggers exactly one reshuffle and still yields a card.
        deck.draw(&mut rng);
        assert_eq!(deck.current, 1);
        assert_eq!(deck.len(), n);
    }

    #[test]
    fn deck_size_is_stable() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut deck = Deck::new(community_cards(), &mut rng);
        let n = deck.len();
        for _ in 0..(n * 3 + 5) {
            deck.draw(&mut rng);
            assert_eq!(deck.len(), n);
        }
    }

    #[test]
    fn shuffle_is_seed_deterministic() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let mut deck_a = Deck::new(chance_cards(), &mut a);
        let mut deck_b = Deck::new(chance_cards(), &mut b);
        for _ in 0..40 {
            assert_eq!(deck_a.draw(&mut a).text, deck_b.draw(&mut b).text);
        }
    }
}
