use crate::cards::{chance_cards, community_cards, Deck};
use crate::config::{MAX_HOTELS, MAX_HOUSES, SPACE_COUNT};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Kind of board space. This is a closed set fixed at design time.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SpaceType {
    Go,
    Property,
    CommunityChest,
    Chance,
    Tax,
    Railroad,
    Utility,
    Jail,
    FreeParking,
    GoToJail,
}

/// Property colour groups. `None` marks non-grouped spaces
/// (railroads, utilities, corners).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ColorGroup {
    None,
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

impl ColorGroup {
    /// Number of properties in the group (2 or 3, 0 for `None`).
    pub fn size(self) -> usize {
        match self {
            ColorGroup::Brown | ColorGroup::DarkBlue => 2,
            ColorGroup::None => 0,
            _ => 3,
        }
    }
}

/// A single board space. Built once, never mutated.
#[derive(Clone, Debug)]
pub struct Space {
    pub index: usize,
    pub name: &'static str,
    /// Short display name for the board (max ~7 chars).
    pub short_name: &'static str,
    pub ty: SpaceType,
    pub group: ColorGroup,
    pub price: i64,
    /// base, 1-4 houses, hotel
    pub rent: [i64; 6],
    pub house_cost: i64,
    /// Only for `SpaceType::Tax`.
    pub tax_amount: i64,
}

impl Space {
    const fn blank(index: usize, name: &'static str, ty: SpaceType) -> Self {
        Self {
            index,
            name,
            short_name: name,
            ty,
            group: ColorGroup::None,
            price: 0,
            rent: [0; 6],
            house_cost: 0,
            tax_amount: 0,
        }
    }
}

/// Ownership and development state of one space.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct PropertyState {
    pub owner: Option<usize>,
    /// 0-4 houses, 5 = hotel.
    pub houses: usize,
    pub mortgaged: bool,
}

/// The 40 space definitions plus all mutable board-side state: per-space
/// ownership/development, the two card decks and the house/hotel pools.
pub struct Board {
    pub spaces: [Space; SPACE_COUNT],
    pub properties: [PropertyState; SPACE_COUNT],
    pub house_pool: usize,
    pub hotel_pool: usize,
    pub chance_deck: Deck,
    pub community_deck: Deck,
}

impl Board {
    pub fn new(rng: &mut StdRng) -> Self {
        Self {
            spaces: build_spaces(),
            properties: [PropertyState::default(); SPACE_COUNT],
            house_pool: MAX_HOUSES,
            hotel_pool: MAX_HOTELS,
            chance_deck: Deck::new(chance_cards(), rng),
            community_deck: Deck::new(community_cards(), rng),
        }
    }

    /// True if the space can be owned (property, railroad or utility).
    pub fn is_ownable(&self, index: usize) -> bool {
        matches!(
            self.spaces[index].ty,
            SpaceType::Property | SpaceType::Railroad | SpaceType::Utility
        )
    }

    pub fn spaces_in_group(&self, group: ColorGroup) -> Vec<usize> {
        if group == ColorGroup::None {
            return vec![];
        }
        self.spaces
            .iter()
            .filter(|s| s.group == group)
            .map(|s| s.index)
            .collect()
    }

    pub fn railroad_indices(&self) -> Vec<usize> {
        self.spaces
            .iter()
            .filter(|s| s.ty == SpaceType::Railroad)
            .map(|s| s.index)
            .collect()
    }

    pub fn utility_indices(&self) -> Vec<usize> {
        self.spaces
            .iter()
            .filter(|s| s.ty == SpaceType::Utility)
            .map(|s| s.index)
            .collect()
    }
}

macro_rules! property {
    ($idx:expr, $name:expr, $short:expr, $group:expr, $price:expr, $rent:expr, $house_cost:expr) => {
        Space {
            index: $idx,
            name: $name,
            short_name: $short,
            ty: SpaceType::Property,
            group: $group,
            price: $price,
            rent: $rent,
            house_cost: $house_cost,
            tax_amount: 0,
        }
    };
}

/// The full Moroccan board layout.
fn build_spaces() -> [Space; SPACE_COUNT] {
    use ColorGroup::*;
    [
        // Bottom row (0-10)
        Space::blank(0, "DEPART", SpaceType::Go),
        property!(1, "Derb Sultan", "Derb S.", Brown, 60, [2, 10, 30, 90, 160, 250], 50),
        Space::blank(2, "Caisse Commune", SpaceType::CommunityChest),
        property!(3, "Bab Marrakech", "Bab Mk.", Brown, 60, [4, 20, 60, 180, 320, 450], 50),
        Space {
            tax_amount: crate::config::INCOME_TAX,
            short_name: "IMPOT",
            ..Space::blank(4, "Impot sur le Revenu", SpaceType::Tax)
        },
        Space {
            price: 200,
            short_name: "G.Casa",
            ..Space::blank(5, "Gare Casa-Voyageurs", SpaceType::Railroad)
        },
        property!(6, "Av. Hassan II", "HassnII", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
        Space::blank(7, "Chance", SpaceType::Chance),
        property!(8, "Bab Bou Jeloud", "B.Jelud", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
        property!(9, "Talaa Kebira", "Talaa K", LightBlue, 120, [8, 40, 100, 300, 450, 600], 50),
        Space::blank(10, "EN VISITE", SpaceType::Jail),
        // Left column (11-20)
        property!(11, "Av. Mohammed V", "Mohd V", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
        Space {
            price: 150,
            short_name: "ONEE",
            ..Space::blank(12, "ONEE (Electricite)", SpaceType::Utility)
        },
        property!(13, "Rue des Consuls", "Consuls", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
        property!(14, "Kasbah Oudayas", "Kasbah", Pink, 160, [12, 60, 180, 500, 700, 900], 100),
        Space {
            price: 200,
            short_name: "G.Rabat",
            ..Space::blank(15, "Gare Rabat-Ville", SpaceType::Railroad)
        },
        property!(16, "Av. de la Liberte", "Av Lbrt", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
        Space::blank(17, "Caisse Commune", SpaceType::CommunityChest),
        property!(18, "Rue de la Liberte", "Ru Lbrt", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
        property!(19, "Grand Socco", "Socco", Orange, 200, [16, 80, 220, 600, 800, 1000], 100),
        Space::blank(20, "PARKING GRATUIT", SpaceType::FreeParking),
        // Top row (21-30)
        property!(21, "Jemaa el-Fna", "Jemaa", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
        Space::blank(22, "Chance", SpaceType::Chance),
        property!(23, "Rue Bab Agnaou", "Agnaou", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
        property!(24, "Koutoubia", "Koutbia", Red, 240, [20, 100, 300, 750, 925, 1100], 150),
        Space {
            price: 200,
            short_name: "G.Mrkch",
            ..Space::blank(25, "Gare Marrakech", SpaceType::Railroad)
        },
        property!(26, "Av. Mohammed VI", "Mohd VI", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
        property!(27, "Corniche Ain Diab", "AinDiab", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
        Space {
            price: 150,
            short_name: "LYDEC",
            ..Space::blank(28, "LYDEC (Eau)", SpaceType::Utility)
        },
        property!(29, "Bd. de la Corniche", "Cornich", Yellow, 280, [24, 120, 360, 850, 1025, 1200], 150),
        Space::blank(30, "ALLEZ EN PRISON", SpaceType::GoToJail),
        // Right column (31-39)
        property!(31, "Vallee du Dades", "Dades", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
        property!(32, "Gorges du Todra", "Todra", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
        Space::blank(33, "Caisse Commune", SpaceType::CommunityChest),
        property!(34, "Merzouga (Sahara)", "Merzoug", Green, 320, [28, 150, 450, 1000, 1200, 1400], 200),
        Space {
            price: 200,
            short_name: "G.Tangr",
            ..Space::blank(35, "Gare Tanger-Ville", SpaceType::Railroad)
        },
        Space::blank(36, "Chance", SpaceType::Chance),
        property!(37, "Chefchaouen", "Chefch.", DarkBlue, 350, [35, 175, 500, 1100, 1300, 1500], 200),
        Space {
            tax_amount: crate::config::LUXURY_TAX,
            short_name: "T.LUXE",
            ..Space::blank(38, "Taxe de Luxe", SpaceType::Tax)
        },
        property!(39, "Mosquee Hassan II", "Msq.HII", DarkBlue, 400, [50, 200, 600, 1400, 1700, 2000], 200),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn board() -> Board {
        Board::new(&mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn layout_is_fixed() {
        let b = board();
        assert_eq!(b.railroad_indices(), vec![5, 15, 25, 35]);
        assert_eq!(b.utility_indices(), vec![12, 28]);
        assert_eq!(b.spaces[10].ty, SpaceType::Jail);
        assert_eq!(b.spaces[30].ty, SpaceType::GoToJail);
        for (i, s) in b.spaces.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn group_sizes_match_catalog() {
        let b = board();
        for group in [
            ColorGroup::Brown,
            ColorGroup::LightBlue,
            ColorGroup::Pink,
            ColorGroup::Orange,
            ColorGroup::Red,
            ColorGroup::Yellow,
            ColorGroup::Green,
            ColorGroup::DarkBlue,
        ] {
            assert_eq!(b.spaces_in_group(group).len(), group.size());
        }
        assert!(b.spaces_in_group(ColorGroup::None).is_empty());
    }

    #[test]
    fn ownable_spaces() {
        let b = board();
        let ownable = (0..SPACE_COUNT).filter(|&i| b.is_ownable(i)).count();
        // 22 colour properties, 4 railroads, 2 utilities
        assert_eq!(ownable, 28);
    }
}
