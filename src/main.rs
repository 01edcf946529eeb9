//! Command-line driver. Steps the engine on a fixed tick, prints the event
//! log as it grows and prompts whenever a human decision is pending.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use maroc_monopoly::config::{MAX_PLAYERS, MIN_PLAYERS};
use maroc_monopoly::save;
use maroc_monopoly::trade::TradeStage;
use maroc_monopoly::{AudioCue, DialogKind, Game, GameState, PlayerInput, TurnPhase};

const TICK: f64 = 0.1;
const AI_NAMES: [&str; 3] = ["Amina", "Youssef", "Fatima"];

#[derive(Parser, Debug)]
#[command(name = "maroc-monopoly", about = "Monopoly marocain en ligne de commande")]
struct Args {
    /// Number of players; player 1 is human unless --auto.
    #[arg(
        long,
        default_value_t = MAX_PLAYERS as u8,
        value_parser = clap::value_parser!(u8).range(MIN_PLAYERS as i64..=MAX_PLAYERS as i64)
    )]
    players: u8,

    /// Human player name.
    #[arg(long, default_value = "Joueur")]
    name: String,

    /// RNG seed; random when omitted. Equal seeds replay identical games.
    #[arg(long)]
    seed: Option<u64>,

    /// Run every seat as AI, without prompts.
    #[arg(long)]
    auto: bool,

    /// Stop after this many turns.
    #[arg(long, default_value_t = 500)]
    max_turns: usize,

    /// Resume from the save file instead of starting fresh.
    #[arg(long)]
    resume: bool,

    /// Save file location.
    #[arg(long, default_value = save::DEFAULT_SAVE_PATH)]
    save_path: PathBuf,
}

enum Command {
    Input(PlayerInput),
    Save,
    Quit,
    Help,
    Unknown,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut game = if args.resume {
        let data = save::load(&args.save_path)
            .with_context(|| format!("cannot resume from {}", args.save_path.display()))?;
        Game::from_snapshot(&data, seed)
            .with_context(|| format!("cannot resume from {}", args.save_path.display()))?
    } else {
        let mut roster: Vec<(String, bool)> = Vec::new();
        for i in 0..args.players as usize {
            if i == 0 && !args.auto {
                roster.push((args.name.clone(), false));
            } else {
                let idx = if args.auto { i } else { i - 1 };
                roster.push((AI_NAMES[idx % AI_NAMES.len()].to_string(), true));
            }
        }
        let refs: Vec<(&str, bool)> = roster.iter().map(|(n, ai)| (n.as_str(), *ai)).collect();
        Game::new(&refs, seed)
    };

    println!("Monopoly marocain (seed {seed})");
    let mut printed = 0usize;
    let stdin = io::stdin();

    loop {
        game.advance(TICK);
        flush_messages(&game, &mut printed);

        if game.state == GameState::GameOver {
            break;
        }
        if game.turns >= args.max_turns {
            println!("Turn cap reached after {} turns", game.turns);
            break;
        }
        if args.auto {
            continue;
        }
        if !waiting_for_human(&game) {
            thread::sleep(Duration::from_millis(50));
            continue;
        }

        print_prompt(&game)?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match parse_command(line.trim(), &game) {
            Command::Input(input) => {
                game.play_cue(AudioCue::MenuSelect);
                game.queue_input(input);
            }
            Command::Save => {
                save::save(&game, &args.save_path)?;
                println!("Partie sauvegardee.");
            }
            Command::Quit => break,
            Command::Help => print_help(&game),
            Command::Unknown => println!("Commande inconnue (tapez help)"),
        }
    }

    flush_messages(&game, &mut printed);
    Ok(())
}

/// Prints log entries added since the last flush, from the capped tail.
fn flush_messages(game: &Game, printed: &mut usize) {
    let new = game.total_messages - *printed;
    let start = game.messages.len().saturating_sub(new);
    for msg in &game.messages[start..] {
        println!("  {msg}");
    }
    *printed = game.total_messages;
}

/// True when the engine is blocked on a human decision: the turn player in a
/// decision phase, a human auction bidder, or the human target of a trade.
fn waiting_for_human(game: &Game) -> bool {
    if let Some(auction) = &game.auction {
        return !game.players[auction.current].is_ai;
    }
    if let Some(offer) = &game.pending_offer {
        return !game.players[offer.to_player].is_ai;
    }
    if game.players[game.current].is_ai {
        return false;
    }
    matches!(
        game.phase,
        TurnPhase::PreRoll
            | TurnPhase::JailDecision
            | TurnPhase::Dialog
            | TurnPhase::PostAction
            | TurnPhase::TurnEnd
            | TurnPhase::Trade
            | TurnPhase::Build
            | TurnPhase::Mortgage
    )
}

fn print_prompt(game: &Game) -> io::Result<()> {
    let player = if let Some(auction) = &game.auction {
        &game.players[auction.current]
    } else if let Some(offer) = &game.pending_offer {
        &game.players[offer.to_player]
    } else {
        game.current_player()
    };
    let space = game.board.spaces[player.position].name;
    println!("\n{} | {} MAD | {}", player.name, player.money, space);

    match game.phase {
        TurnPhase::Build => {
            println!("Constructible:");
            for &idx in &game.selectable_spaces {
                let s = &game.board.spaces[idx];
                println!(
                    "  {idx:2} {} ({} maisons, {} MAD)",
                    s.name, game.board.properties[idx].houses, s.house_cost
                );
            }
        }
        TurnPhase::Mortgage => {
            println!("Proprietes:");
            for &idx in &game.selectable_spaces {
                let s = &game.board.spaces[idx];
                let flag = if game.board.properties[idx].mortgaged {
                    "hypothequee"
                } else {
                    "libre"
                };
                println!("  {idx:2} {} ({flag})", s.name);
            }
        }
        TurnPhase::Trade if game.dialog == DialogKind::TradeReceived => {
            if let Some(offer) = &game.pending_offer {
                let from = &game.players[offer.from_player].name;
                println!("{from} propose un echange:");
                for &idx in &offer.offered_props {
                    println!("  donne {}", game.board.spaces[idx].name);
                }
                for &idx in &offer.wanted_props {
                    println!("  demande {}", game.board.spaces[idx].name);
                }
                if offer.offered_money > 0 {
                    println!("  donne {} MAD", offer.offered_money);
                }
                if offer.wanted_money > 0 {
                    println!("  demande {} MAD", offer.wanted_money);
                }
            }
        }
        TurnPhase::Trade => {
            if let Some(draft) = &game.trade {
                match draft.stage {
                    TradeStage::SelectPartner => {
                        println!("Partenaires:");
                        for p in &game.players {
                            if p.id != game.current && !p.bankrupt {
                                println!("  {} {}", p.id, p.name);
                            }
                        }
                    }
                    _ => {
                        println!(
                            "Offre: {:?} + {} MAD  contre  {:?} + {} MAD",
                            draft.offered_props,
                            draft.offered_money,
                            draft.wanted_props,
                            draft.wanted_money
                        );
                    }
                }
            }
        }
        _ => {}
    }

    print!("[{}] > ", options_for(game));
    io::stdout().flush()
}

fn options_for(game: &Game) -> &'static str {
    if game.auction.is_some() {
        return "bid/pass";
    }
    match game.phase {
        TurnPhase::PreRoll => "roll/build/mortgage/trade/save/quit",
        TurnPhase::JailDecision => "pay/card/roll",
        TurnPhase::Dialog => match game.dialog {
            DialogKind::BuyProperty => "buy/pass",
            DialogKind::IncomeTax => "flat/percent",
            _ => "help",
        },
        TurnPhase::Build => "build <n>/done",
        TurnPhase::Mortgage => "mortgage <n>/done",
        TurnPhase::Trade => {
            if game.dialog == DialogKind::TradeReceived {
                "accept/decline"
            } else {
                "partner <n>/offer <n>/want <n>/give <mad>/ask <mad>/propose/back/cancel"
            }
        }
        TurnPhase::PostAction | TurnPhase::TurnEnd => "end/build/mortgage/trade/save/quit",
        _ => "",
    }
}

fn print_help(game: &Game) {
    println!("Commandes: {}", options_for(game));
}

fn parse_command(line: &str, game: &Game) -> Command {
    let mut tokens = line.split_whitespace();
    let Some(word) = tokens.next() else {
        return Command::Unknown;
    };
    let arg: Option<&str> = tokens.next();
    let arg_usize: Option<usize> = arg.and_then(|v| v.parse().ok());
    let arg_i64: Option<i64> = arg.and_then(|v| v.parse().ok());

    let input = match word {
        "save" => return Command::Save,
        "quit" | "exit" => return Command::Quit,
        "help" | "?" => return Command::Help,

        "roll" => {
            if game.phase == TurnPhase::JailDecision {
                PlayerInput::RollForDoubles
            } else {
                PlayerInput::RollDice
            }
        }
        "pay" => PlayerInput::PayJailFine,
        "card" => PlayerInput::UseJailCard,
        "buy" => PlayerInput::Buy,
        "flat" => PlayerInput::PayFlatTax,
        "percent" => PlayerInput::PayPercentTax,
        "bid" => PlayerInput::Bid,
        "pass" => {
            if game.auction.is_some() {
                PlayerInput::Pass
            } else {
                PlayerInput::Decline
            }
        }
        "end" => PlayerInput::EndTurn,
        "done" | "cancel" => PlayerInput::Cancel,

        "build" => match arg_usize {
            Some(idx) => PlayerInput::BuildAt(idx),
            None => PlayerInput::OpenBuild,
        },
        "mortgage" => match arg_usize {
            Some(idx) => PlayerInput::MortgageToggle(idx),
            None => PlayerInput::OpenMortgage,
        },

        "trade" => PlayerInput::OpenTrade,
        "partner" => match arg_usize {
            Some(id) => PlayerInput::SelectPartner(id),
            None => return Command::Unknown,
        },
        "offer" => match arg_usize {
            Some(idx) => PlayerInput::ToggleOffered(idx),
            None => return Command::Unknown,
        },
        "want" => match arg_usize {
            Some(idx) => PlayerInput::ToggleWanted(idx),
            None => return Command::Unknown,
        },
        "give" => match arg_i64 {
            Some(amount) => PlayerInput::AdjustOfferedMoney(amount),
            None => return Command::Unknown,
        },
        "ask" => match arg_i64 {
            Some(amount) => PlayerInput::AdjustWantedMoney(amount),
            None => return Command::Unknown,
        },
        "givecard" => PlayerInput::ToggleOfferJailCard,
        "askcard" => PlayerInput::ToggleWantJailCard,
        "propose" => PlayerInput::ProposeTrade,
        "back" => PlayerInput::TradeBack,
        "accept" => PlayerInput::AcceptTrade,
        "decline" => PlayerInput::DeclineTrade,

        _ => return Command::Unknown,
    };
    Command::Input(input)
}
