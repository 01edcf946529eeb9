//! The turn state machine. `Game` owns all match state and is driven by
//! `advance(dt)`: animations progress by elapsed time, AI decisions fire on a
//! pacing timer, and queued human inputs are drained at the end of every step.
//! Nothing here blocks; a driver calls `advance` in a loop and reads the
//! public state for display.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ai::{self, JailChoice};
use crate::audio::{AudioCue, AudioSink, NullAudio};
use crate::auction::Auction;
use crate::board::{Board, SpaceType};
use crate::cards::CardEffect;
use crate::config::{
    AI_TURN_DELAY, DICE_ANIM_DURATION, GO_SALARY, INCOME_TAX, JAIL_FINE, JAIL_POSITION,
    MAX_JAIL_TURNS, MAX_MESSAGES, SPACE_COUNT, TOKEN_MOVE_DURATION,
};
use crate::player::Player;
use crate::trade::{TradeDraft, TradeOffer, TradeStage};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Where the current turn stands. `Rolling` and `Moving` are animation
/// phases; the rest wait on a decision (human input or the AI timer).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TurnPhase {
    PreRoll,
    JailDecision,
    Rolling,
    Moving,
    Landed,
    Dialog,
    PostAction,
    TurnEnd,
    Auction,
    Trade,
    Build,
    Mortgage,
}

/// Which decision surface a renderer should present.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DialogKind {
    None,
    BuyProperty,
    JailOptions,
    IncomeTax,
    Build,
    Mortgage,
    Trade,
    TradeReceived,
    Auction,
}

/// Abstract player decisions. A frontend translates clicks or key presses
/// into these; inputs that do not fit the current phase are discarded.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PlayerInput {
    RollDice,
    PayJailFine,
    UseJailCard,
    RollForDoubles,
    Buy,
    Decline,
    PayFlatTax,
    PayPercentTax,
    Bid,
    Pass,
    OpenBuild,
    OpenMortgage,
    OpenTrade,
    BuildAt(usize),
    MortgageToggle(usize),
    SelectPartner(usize),
    ToggleOffered(usize),
    ToggleWanted(usize),
    AdjustOfferedMoney(i64),
    AdjustWantedMoney(i64),
    ToggleOfferJailCard,
    ToggleWantJailCard,
    ProposeTrade,
    TradeBack,
    AcceptTrade,
    DeclineTrade,
    EndTurn,
    Cancel,
}

pub struct Game {
    pub board: Board,
    pub players: Vec<Player>,
    /// Index of the player whose turn it is.
    pub current: usize,
    pub state: GameState,
    pub phase: TurnPhase,
    pub dialog: DialogKind,
    pub die1: usize,
    pub die2: usize,
    pub doubles: bool,
    pub doubles_count: usize,
    pub dice_rolling: bool,
    /// Rolling event log, capped at the most recent entries.
    pub messages: Vec<String>,
    /// Count of every message ever logged, for tailing by a driver.
    pub total_messages: usize,
    pub auction: Option<Auction>,
    pub trade: Option<TradeDraft>,
    pub pending_offer: Option<TradeOffer>,
    /// Spaces the open build/mortgage panel lets the player act on.
    pub selectable_spaces: Vec<usize>,
    /// Completed turn count across all players.
    pub turns: usize,

    /// Token animation progress, exposed for renderers.
    pub move_from: usize,
    pub move_steps: usize,
    pub move_current: usize,

    dice_timer: f64,
    move_timer: f64,
    ai_timer: f64,
    pub(crate) panel_return: TurnPhase,
    inputs: VecDeque<PlayerInput>,
    rng: StdRng,
    audio: Box<dyn AudioSink>,
}

impl Game {
    /// Starts a match from `(name, is_ai)` pairs. The seed fixes every dice
    /// roll and deck shuffle, so equal seeds replay identical games.
    pub fn new(players: &[(&str, bool)], seed: u64) -> Self {
        Self::with_audio(players, seed, Box::new(NullAudio))
    }

    pub fn with_audio(players: &[(&str, bool)], seed: u64, audio: Box<dyn AudioSink>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::new(&mut rng);
        let players = players
            .iter()
            .enumerate()
            .map(|(id, &(name, is_ai))| Player::new(id, name, is_ai))
            .collect();
        Self {
            board,
            players,
            current: 0,
            state: GameState::Playing,
            phase: TurnPhase::PreRoll,
            dialog: DialogKind::None,
            die1: 1,
            die2: 1,
            doubles: false,
            doubles_count: 0,
            dice_rolling: false,
            messages: Vec::new(),
            total_messages: 0,
            auction: None,
            trade: None,
            pending_offer: None,
            selectable_spaces: Vec::new(),
            turns: 0,
            move_from: 0,
            move_steps: 0,
            move_current: 0,
            dice_timer: 0.0,
            move_timer: 0.0,
            ai_timer: 0.0,
            panel_return: TurnPhase::PreRoll,
            inputs: VecDeque::new(),
            rng,
            audio,
        }
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn queue_input(&mut self, input: PlayerInput) {
        self.inputs.push_back(input);
    }

    pub fn add_message(&mut self, msg: String) {
        debug!(target: "game", "{msg}");
        self.total_messages += 1;
        self.messages.push(msg);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    pub fn play_cue(&mut self, cue: AudioCue) {
        self.audio.play(cue);
    }

    /// Steps the match by `dt` seconds, then drains queued inputs.
    pub fn advance(&mut self, dt: f64) {
        if self.state == GameState::GameOver {
            return;
        }

        match self.phase {
            TurnPhase::Rolling => self.update_dice_anim(dt),
            TurnPhase::Moving => self.update_token_move(dt),
            TurnPhase::Landed => self.resolve_landing(),
            // An auction waits on its current bidder; AI bids were already
            // resolved inline when the round rotated to them.
            TurnPhase::Auction => {}
            _ => {
                if self.players[self.current].is_ai && self.pending_offer.is_none() {
                    self.ai_timer += dt;
                    if self.ai_timer >= AI_TURN_DELAY {
                        self.ai_timer = 0.0;
                        self.advance_ai();
                    }
                }
            }
        }

        while let Some(input) = self.inputs.pop_front() {
            if self.state == GameState::GameOver {
                break;
            }
            self.handle_input(input);
        }
    }

    // --- dice ---

    fn start_dice_roll(&mut self) {
        self.die1 = self.rng.gen_range(1..=6);
        self.die2 = self.rng.gen_range(1..=6);
        self.dice_rolling = true;
        self.dice_timer = 0.0;
        self.dialog = DialogKind::None;
        self.phase = TurnPhase::Rolling;
        self.play_cue(AudioCue::DiceRoll);
    }

    /// Test hook: fixes the dice and resolves the roll immediately.
    #[cfg(test)]
    pub(crate) fn begin_roll(&mut self, die1: usize, die2: usize) {
        self.die1 = die1;
        self.die2 = die2;
        self.finish_roll();
    }

    fn update_dice_anim(&mut self, dt: f64) {
        self.dice_timer += dt;
        if self.dice_timer < DICE_ANIM_DURATION {
            return;
        }
        self.dice_rolling = false;
        self.finish_roll();
    }

    fn finish_roll(&mut self) {
        let total = self.die1 + self.die2;
        let rolled_doubles = self.die1 == self.die2;
        let name = self.players[self.current].name.clone();
        self.add_message(format!(
            "{name} rolled {} + {} = {total}",
            self.die1, self.die2
        ));

        if self.players[self.current].in_jail {
            self.finish_jail_roll(total, rolled_doubles);
            return;
        }

        if rolled_doubles {
            self.doubles = true;
            self.doubles_count += 1;
            if self.doubles_count >= 3 {
                self.add_message(format!("{name} rolled three doubles in a row!"));
                self.send_to_jail(self.current);
                self.phase = TurnPhase::PostAction;
                return;
            }
        } else {
            self.doubles = false;
        }

        self.start_move(total);
    }

    /// Jail roll: doubles release and count toward the streak like any other
    /// roll; the third failed attempt forces the fine and the player moves
    /// anyway.
    fn finish_jail_roll(&mut self, total: usize, rolled_doubles: bool) {
        let name = self.players[self.current].name.clone();

        if rolled_doubles {
            self.doubles = true;
            self.doubles_count += 1;
            let p = &mut self.players[self.current];
            p.in_jail = false;
            p.jail_turns = 0;
            self.add_message(format!("{name} rolled doubles and is free!"));
            self.start_move(total);
            return;
        }

        self.doubles = false;

        self.players[self.current].jail_turns += 1;
        if self.players[self.current].jail_turns >= MAX_JAIL_TURNS {
            self.add_message(format!("{name} must pay the {JAIL_FINE} MAD fine"));
            self.pay_debt(self.current, None, JAIL_FINE);
            if self.players[self.current].bankrupt {
                self.phase = TurnPhase::TurnEnd;
                return;
            }
            let p = &mut self.players[self.current];
            p.in_jail = false;
            p.jail_turns = 0;
            self.start_move(total);
        } else {
            self.add_message(format!("{name} stays in jail"));
            self.phase = TurnPhase::PostAction;
        }
    }

    // --- movement ---

    fn start_move(&mut self, steps: usize) {
        self.move_from = self.players[self.current].position;
        self.move_steps = steps;
        self.move_current = 0;
        self.move_timer = 0.0;
        self.phase = TurnPhase::Moving;
    }

    /// Advances the token one space per animation tick. Salary is credited
    /// on the step that wraps past DEPART, so a large `dt` that covers the
    /// whole move still pays exactly once.
    fn update_token_move(&mut self, dt: f64) {
        self.move_timer += dt;
        while self.move_timer >= TOKEN_MOVE_DURATION && self.move_current < self.move_steps {
            self.move_timer -= TOKEN_MOVE_DURATION;
            self.move_current += 1;
            let prev = self.players[self.current].position;
            let next = (prev + 1) % SPACE_COUNT;
            self.players[self.current].position = next;
            if next < prev {
                self.players[self.current].receive(GO_SALARY);
                let name = self.players[self.current].name.clone();
                self.add_message(format!("{name} passed DEPART (+{GO_SALARY} MAD)"));
                self.play_cue(AudioCue::PassGo);
            }
        }
        if self.move_current >= self.move_steps {
            self.phase = TurnPhase::Landed;
            self.resolve_landing();
        }
    }

    // --- landing resolution ---

    fn resolve_landing(&mut self) {
        let pos = self.players[self.current].position;
        let space_ty = self.board.spaces[pos].ty;
        let space_name = self.board.spaces[pos].name;
        let tax_amount = self.board.spaces[pos].tax_amount;
        let name = self.players[self.current].name.clone();
        self.add_message(format!("{name} landed on {space_name}"));

        match space_ty {
            SpaceType::Property | SpaceType::Railroad | SpaceType::Utility => {
                match self.board.properties[pos].owner {
                    None => {
                        self.dialog = DialogKind::BuyProperty;
                        self.phase = TurnPhase::Dialog;
                    }
                    Some(owner) if owner != self.current && !self.players[owner].bankrupt => {
                        self.charge_rent(pos, owner);
                    }
                    _ => self.phase = TurnPhase::PostAction,
                }
            }
            SpaceType::Chance => self.draw_card(true),
            SpaceType::CommunityChest => self.draw_card(false),
            SpaceType::Tax => {
                if tax_amount == INCOME_TAX {
                    self.dialog = DialogKind::IncomeTax;
                    self.phase = TurnPhase::Dialog;
                } else {
                    self.add_message(format!("{name} pays {tax_amount} MAD luxury tax"));
                    self.pay_debt(self.current, None, tax_amount);
                    self.after_payment();
                }
            }
            SpaceType::GoToJail => {
                self.send_to_jail(self.current);
                self.phase = TurnPhase::PostAction;
            }
            SpaceType::Go | SpaceType::Jail | SpaceType::FreeParking => {
                self.phase = TurnPhase::PostAction;
            }
        }
    }

    fn charge_rent(&mut self, pos: usize, owner: usize) {
        let rent = self.calculate_rent(pos, self.die1 + self.die2);
        if rent > 0 {
            let payer = self.players[self.current].name.clone();
            let payee = self.players[owner].name.clone();
            self.add_message(format!("{payer} pays {rent} MAD rent to {payee}"));
            self.play_cue(AudioCue::Rent);
            self.pay_debt(self.current, Some(owner), rent);
        } else {
            self.add_message("Mortgaged, no rent due".to_string());
        }
        self.after_payment();
    }

    /// Common continuation after a debt that may have bankrupted the payer.
    fn after_payment(&mut self) {
        self.dialog = DialogKind::None;
        self.phase = if self.players[self.current].bankrupt {
            TurnPhase::TurnEnd
        } else {
            TurnPhase::PostAction
        };
    }

    // --- cards ---

    fn draw_card(&mut self, chance: bool) {
        let card = if chance {
            self.board.chance_deck.draw(&mut self.rng)
        } else {
            self.board.community_deck.draw(&mut self.rng)
        };
        self.add_message(format!("Carte: {}", card.text));
        self.play_cue(AudioCue::CardDraw);
        self.execute_card(card.effect);
    }

    fn execute_card(&mut self, effect: CardEffect) {
        let name = self.players[self.current].name.clone();
        match effect {
            CardEffect::Collect { amount } => {
                self.players[self.current].receive(amount);
                self.add_message(format!("{name} receives {amount} MAD"));
                self.phase = TurnPhase::PostAction;
            }
            CardEffect::Pay { amount } => {
                self.pay_debt(self.current, None, amount);
                self.after_payment();
            }
            CardEffect::MoveTo { space } => {
                let pos = self.players[self.current].position;
                if space < pos {
                    self.players[self.current].receive(GO_SALARY);
                    self.add_message(format!("{name} passed DEPART (+{GO_SALARY} MAD)"));
                    self.play_cue(AudioCue::PassGo);
                }
                self.players[self.current].position = space;
                self.resolve_landing();
            }
            CardEffect::MoveSteps { steps } => {
                let pos = self.players[self.current].position as isize;
                let next = (pos + steps).rem_euclid(SPACE_COUNT as isize) as usize;
                self.players[self.current].position = next;
                self.resolve_landing();
            }
            CardEffect::GoToJail => {
                self.send_to_jail(self.current);
                self.phase = TurnPhase::PostAction;
            }
            CardEffect::GetOutOfJail => {
                self.players[self.current].jail_free_cards += 1;
                self.phase = TurnPhase::PostAction;
            }
            CardEffect::PayPerHouse {
                per_house,
                per_hotel,
            } => {
                let mut houses = 0i64;
                let mut hotels = 0i64;
                for &idx in &self.players[self.current].properties {
                    match self.board.properties[idx].houses {
                        5 => hotels += 1,
                        n => houses += n as i64,
                    }
                }
                let total = houses * per_house + hotels * per_hotel;
                if total > 0 {
                    self.add_message(format!("{name} pays {total} MAD in repairs"));
                    self.pay_debt(self.current, None, total);
                }
                self.after_payment();
            }
            CardEffect::CollectAll { amount } => {
                let others: Vec<usize> = self
                    .players
                    .iter()
                    .filter(|p| p.id != self.current && !p.bankrupt)
                    .map(|p| p.id)
                    .collect();
                for other in others {
                    self.pay_debt(other, Some(self.current), amount);
                }
                self.phase = TurnPhase::PostAction;
            }
            CardEffect::PayAll { amount } => {
                let others: Vec<usize> = self
                    .players
                    .iter()
                    .filter(|p| p.id != self.current && !p.bankrupt)
                    .map(|p| p.id)
                    .collect();
                for other in others {
                    self.pay_debt(self.current, Some(other), amount);
                    if self.players[self.current].bankrupt {
                        break;
                    }
                }
                self.after_payment();
            }
        }
    }

    // --- purchases and jail ---

    fn buy_property(&mut self) {
        let pos = self.players[self.current].position;
        let price = self.board.spaces[pos].price;
        if self.players[self.current].money < price {
            self.add_message("Not enough money to buy".to_string());
            return;
        }
        self.players[self.current].pay(price);
        self.players[self.current].add_property(pos);
        self.board.properties[pos].owner = Some(self.current);
        let name = self.players[self.current].name.clone();
        let space = self.board.spaces[pos].name;
        self.add_message(format!("{name} bought {space} for {price} MAD"));
        self.play_cue(AudioCue::Purchase);
        self.dialog = DialogKind::None;
        self.phase = TurnPhase::PostAction;
    }

    fn decline_buy(&mut self) {
        let pos = self.players[self.current].position;
        self.dialog = DialogKind::None;
        self.start_auction(pos);
    }

    fn pay_income_tax(&mut self, flat: bool) {
        let amount = if flat {
            INCOME_TAX
        } else {
            self.player_net_worth(self.current) / 10
        };
        let name = self.players[self.current].name.clone();
        self.add_message(format!("{name} pays {amount} MAD income tax"));
        self.pay_debt(self.current, None, amount);
        self.after_payment();
    }

    pub(crate) fn send_to_jail(&mut self, player_id: usize) {
        let p = &mut self.players[player_id];
        p.position = JAIL_POSITION;
        p.in_jail = true;
        p.jail_turns = 0;
        let name = self.players[player_id].name.clone();
        self.add_message(format!("{name} goes to JAIL!"));
        self.play_cue(AudioCue::Jail);
    }

    fn pay_jail_fine(&mut self) {
        self.pay_debt(self.current, None, JAIL_FINE);
        if self.players[self.current].bankrupt {
            self.phase = TurnPhase::TurnEnd;
            return;
        }
        let p = &mut self.players[self.current];
        p.in_jail = false;
        p.jail_turns = 0;
        let name = self.players[self.current].name.clone();
        self.add_message(format!("{name} paid the fine and is free"));
        self.dialog = DialogKind::None;
        self.phase = TurnPhase::PreRoll;
    }

    fn use_jail_card(&mut self) {
        if self.players[self.current].jail_free_cards == 0 {
            return;
        }
        let p = &mut self.players[self.current];
        p.jail_free_cards -= 1;
        p.in_jail = false;
        p.jail_turns = 0;
        let name = self.players[self.current].name.clone();
        self.add_message(format!("{name} used a Get Out of Jail Free card"));
        self.dialog = DialogKind::None;
        self.phase = TurnPhase::PreRoll;
    }

    // --- build and mortgage panels ---

    fn open_build_dialog(&mut self) {
        let candidates = self.buildable_properties(self.current);
        if candidates.is_empty() {
            self.add_message("Nothing to build on".to_string());
            return;
        }
        self.selectable_spaces = candidates;
        self.panel_return = self.phase;
        self.phase = TurnPhase::Build;
        self.dialog = DialogKind::Build;
    }

    fn open_mortgage_dialog(&mut self) {
        if self.players[self.current].properties.is_empty() {
            self.add_message("No properties to mortgage".to_string());
            return;
        }
        self.selectable_spaces = self.players[self.current].properties.clone();
        self.panel_return = self.phase;
        self.phase = TurnPhase::Mortgage;
        self.dialog = DialogKind::Mortgage;
    }

    fn close_panel(&mut self) {
        self.selectable_spaces.clear();
        self.dialog = DialogKind::None;
        self.phase = self.panel_return;
    }

    fn try_build(&mut self, space_index: usize) {
        if !self.selectable_spaces.contains(&space_index)
            || !self.can_build_on_space(space_index)
            || self.players[self.current].money < self.board.spaces[space_index].house_cost
        {
            return;
        }
        let cost = self.build_house(space_index);
        self.players[self.current].pay(cost);
        let name = self.players[self.current].name.clone();
        let space = self.board.spaces[space_index].name;
        self.add_message(format!("{name} built on {space} (-{cost} MAD)"));
        self.play_cue(AudioCue::Build);
        self.selectable_spaces = self.buildable_properties(self.current);
        if self.selectable_spaces.is_empty() {
            self.close_panel();
        }
    }

    fn toggle_mortgage(&mut self, space_index: usize) {
        if self.board.properties[space_index].owner != Some(self.current) {
            return;
        }
        let name = self.players[self.current].name.clone();
        let space = self.board.spaces[space_index].name;
        if self.board.properties[space_index].mortgaged {
            let cost = self.unmortgage_cost(space_index);
            if self.players[self.current].money < cost {
                self.add_message("Not enough money to unmortgage".to_string());
                return;
            }
            self.unmortgage_property(space_index);
            self.players[self.current].pay(cost);
            self.add_message(format!("{name} unmortgaged {space} (-{cost} MAD)"));
        } else {
            if self.board.properties[space_index].houses > 0 {
                return;
            }
            let value = self.mortgage_property(space_index);
            self.players[self.current].receive(value);
            self.add_message(format!("{name} mortgaged {space} (+{value} MAD)"));
        }
    }

    // --- AI turn driving ---

    fn advance_ai(&mut self) {
        match self.phase {
            TurnPhase::PreRoll => {
                self.ai_build_if_possible();
                self.start_dice_roll();
            }
            TurnPhase::JailDecision => match ai::jail_choice(&self.players[self.current]) {
                JailChoice::UseCard => self.use_jail_card(),
                JailChoice::PayFine => self.pay_jail_fine(),
                JailChoice::Roll => self.start_dice_roll(),
            },
            TurnPhase::Dialog => match self.dialog {
                DialogKind::BuyProperty => {
                    let pos = self.players[self.current].position;
                    let price = self.board.spaces[pos].price;
                    let total_owned = self
                        .board
                        .properties
                        .iter()
                        .filter(|p| p.owner.is_some())
                        .count();
                    if ai::should_buy(&self.players[self.current], price, total_owned) {
                        self.buy_property();
                    } else {
                        self.decline_buy();
                    }
                }
                DialogKind::IncomeTax => {
                    let flat = INCOME_TAX <= self.player_net_worth(self.current) / 10;
                    self.pay_income_tax(flat);
                }
                _ => self.phase = TurnPhase::PostAction,
            },
            TurnPhase::PostAction | TurnPhase::TurnEnd => self.end_turn(),
            _ => {}
        }
    }

    /// Greedy building pass before the AI rolls, first eligible space first.
    fn ai_build_if_possible(&mut self) {
        loop {
            let Some(&idx) = self.buildable_properties(self.current).first() else {
                break;
            };
            let cost = self.board.spaces[idx].house_cost;
            if !ai::should_build(&self.players[self.current], cost) {
                break;
            }
            let charged = self.build_house(idx);
            self.players[self.current].pay(charged);
            let name = self.players[self.current].name.clone();
            let space = self.board.spaces[idx].name;
            self.add_message(format!("{name} built on {space} (-{charged} MAD)"));
            self.play_cue(AudioCue::Build);
        }
    }

    // --- turn rotation ---

    pub fn end_turn(&mut self) {
        self.dialog = DialogKind::None;
        self.selectable_spaces.clear();
        self.check_game_over();
        if self.state == GameState::GameOver {
            return;
        }

        let p = &self.players[self.current];
        if self.doubles && !p.in_jail && !p.bankrupt {
            let name = p.name.clone();
            self.doubles = false;
            self.phase = TurnPhase::PreRoll;
            self.add_message(format!("{name} rolled doubles, extra turn!"));
            return;
        }

        self.next_player();
    }

    fn next_player(&mut self) {
        self.doubles = false;
        self.doubles_count = 0;
        self.turns += 1;
        loop {
            self.current = (self.current + 1) % self.players.len();
            if !self.players[self.current].bankrupt {
                break;
            }
        }
        self.ai_timer = 0.0;
        if self.players[self.current].in_jail {
            self.phase = TurnPhase::JailDecision;
            self.dialog = DialogKind::JailOptions;
        } else {
            self.phase = TurnPhase::PreRoll;
            self.dialog = DialogKind::None;
        }
    }

    pub fn check_game_over(&mut self) {
        if self.state == GameState::GameOver {
            return;
        }
        let alive: Vec<usize> = self
            .players
            .iter()
            .filter(|p| !p.bankrupt)
            .map(|p| p.id)
            .collect();
        if alive.len() <= 1 {
            self.state = GameState::GameOver;
            if let Some(&winner) = alive.first() {
                let name = self.players[winner].name.clone();
                self.add_message(format!("{name} WINS the game!"));
                self.play_cue(AudioCue::Win);
            }
        }
    }

    // --- input dispatch ---

    /// Applies one queued input if it fits the current phase. Auction bids
    /// and trade answers are owned by the player they are addressed to, who
    /// need not be the turn player; everything else belongs to the turn
    /// player and is dropped when an AI holds the turn.
    fn handle_input(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::Bid | PlayerInput::Pass => {
                let human_bidder = self
                    .auction
                    .as_ref()
                    .map_or(false, |a| !self.players[a.current].is_ai);
                if !human_bidder {
                    return;
                }
            }
            PlayerInput::AcceptTrade | PlayerInput::DeclineTrade => {
                let human_target = self
                    .pending_offer
                    .as_ref()
                    .map_or(false, |o| !self.players[o.to_player].is_ai);
                if !human_target {
                    return;
                }
            }
            _ => {
                if self.players[self.current].is_ai {
                    return;
                }
            }
        }

        match (self.phase, input) {
            (TurnPhase::PreRoll, PlayerInput::RollDice) => self.start_dice_roll(),
            (TurnPhase::PreRoll | TurnPhase::PostAction, PlayerInput::OpenBuild) => {
                self.open_build_dialog()
            }
            (TurnPhase::PreRoll | TurnPhase::PostAction, PlayerInput::OpenMortgage) => {
                self.open_mortgage_dialog()
            }
            (TurnPhase::PreRoll | TurnPhase::PostAction, PlayerInput::OpenTrade) => {
                self.open_trade_dialog()
            }

            (TurnPhase::JailDecision, PlayerInput::PayJailFine) => self.pay_jail_fine(),
            (TurnPhase::JailDecision, PlayerInput::UseJailCard) => self.use_jail_card(),
            (TurnPhase::JailDecision, PlayerInput::RollForDoubles) => self.start_dice_roll(),

            (TurnPhase::Dialog, PlayerInput::Buy) if self.dialog == DialogKind::BuyProperty => {
                self.buy_property()
            }
            (TurnPhase::Dialog, PlayerInput::Decline)
                if self.dialog == DialogKind::BuyProperty =>
            {
                self.decline_buy()
            }
            (TurnPhase::Dialog, PlayerInput::PayFlatTax)
                if self.dialog == DialogKind::IncomeTax =>
            {
                self.pay_income_tax(true)
            }
            (TurnPhase::Dialog, PlayerInput::PayPercentTax)
                if self.dialog == DialogKind::IncomeTax =>
            {
                self.pay_income_tax(false)
            }

            (TurnPhase::Auction, PlayerInput::Bid) => self.auction_bid(),
            (TurnPhase::Auction, PlayerInput::Pass) => self.auction_pass(),

            (TurnPhase::Build, PlayerInput::BuildAt(idx)) => self.try_build(idx),
            (TurnPhase::Build, PlayerInput::Cancel) => self.close_panel(),
            (TurnPhase::Mortgage, PlayerInput::MortgageToggle(idx)) => self.toggle_mortgage(idx),
            (TurnPhase::Mortgage, PlayerInput::Cancel) => self.close_panel(),

            (TurnPhase::Trade, PlayerInput::SelectPartner(id)) => self.trade_select_partner(id),
            (TurnPhase::Trade, PlayerInput::ToggleOffered(idx)) => self.trade_toggle_offered(idx),
            (TurnPhase::Trade, PlayerInput::ToggleWanted(idx)) => self.trade_toggle_wanted(idx),
            (TurnPhase::Trade, PlayerInput::AdjustOfferedMoney(delta)) => {
                self.trade_adjust_offered_money(delta)
            }
            (TurnPhase::Trade, PlayerInput::AdjustWantedMoney(delta)) => {
                self.trade_adjust_wanted_money(delta)
            }
            (TurnPhase::Trade, PlayerInput::ToggleOfferJailCard) => {
                self.trade_toggle_offer_jail_card()
            }
            (TurnPhase::Trade, PlayerInput::ToggleWantJailCard) => {
                self.trade_toggle_want_jail_card()
            }
            (TurnPhase::Trade, PlayerInput::ProposeTrade) => {
                match self.trade.as_ref().map(|d| d.stage) {
                    Some(TradeStage::SelectOffer) => self.trade_confirm(),
                    Some(TradeStage::Confirm) => self.trade_propose(),
                    _ => {}
                }
            }
            (TurnPhase::Trade, PlayerInput::TradeBack) => self.trade_back(),
            (TurnPhase::Trade, PlayerInput::AcceptTrade) => self.trade_accept(),
            (TurnPhase::Trade, PlayerInput::DeclineTrade) => self.trade_decline(),
            (TurnPhase::Trade, PlayerInput::Cancel)
                if self.dialog != DialogKind::TradeReceived =>
            {
                self.close_trade()
            }

            (TurnPhase::PostAction | TurnPhase::TurnEnd, PlayerInput::EndTurn) => self.end_turn(),

            // Anything else does not fit the current phase.
            _ => {}
        }
    }
}
