//! Dice, tokens, Go salary, jail and what happens on the cell a token lands on.

use serde_json::json;
use tracing::debug;

use crate::board::Owner;
use crate::game::cards::Card;
use crate::game::history::Function;
use crate::game::state::GameState;
use crate::types::{ActionKind, ActionType, CardPack, LocationClass, PlayerId, ReturnCode};

/// Failed rolls a jailed player gets before the fine is charged.
pub const MAX_JAIL_ROLLS: u8 = 3;

fn collect_go(state: &mut GameState, player: PlayerId) {
    let amount = state.bank.go_increment;
    let result = state.bank_pays(player, amount);
    let detail = result.as_ref().err().map(ToString::to_string);
    let code = if result.is_ok() {
        ReturnCode::Success
    } else {
        ReturnCode::Failure
    };
    state.record(Some(player), Function::CollectGo, json!({ "amount": amount }), code, detail);
}

/// Moves the token `steps` cells forward, paying Go salary on the way past.
pub fn advance(state: &mut GameState, player: PlayerId, steps: usize) -> usize {
    let len = state.board.len().max(1);
    let from = state.players[player].position;
    let to = (from + steps) % len;
    state.players[player].position = to;
    state.record(
        Some(player),
        Function::MovePlayer,
        json!({ "from": from, "to": to }),
        ReturnCode::Success,
        None,
    );
    if from + steps >= len {
        collect_go(state, player);
    }
    to
}

/// Moves straight to `position`; Go salary is paid when that wraps around the board.
pub fn advance_to(state: &mut GameState, player: PlayerId, position: usize) {
    let len = state.board.len().max(1);
    let from = state.players[player].position;
    let steps = if position > from {
        position - from
    } else {
        position + len - from
    };
    advance(state, player, steps);
}

pub fn send_to_jail(state: &mut GameState, player: PlayerId) {
    let jail = state.board.jail_position;
    state.players[player].send_to_jail(jail);
    state.players[player].option_to_buy = None;
    debug!(player, "sent to jail");
    state.record(
        Some(player),
        Function::GoToJail,
        json!({ "position": jail }),
        ReturnCode::Success,
        None,
    );
}

/// Rolls for the current player and moves them, honouring jail rules.
/// Returns the die total when the token moved.
pub fn roll_and_move(state: &mut GameState, player: PlayerId) -> Option<u8> {
    let (a, b) = state.roll_dice();
    state.record(Some(player), Function::RollDie, json!([a, b]), ReturnCode::Success, None);
    let total = a + b;

    if state.players[player].currently_in_jail {
        if a == b {
            state.players[player].release_from_jail();
        } else {
            state.players[player].jail_rolls += 1;
            if state.players[player].jail_rolls < MAX_JAIL_ROLLS {
                return None;
            }
            let fine = state.bank.jail_fine;
            state.pay_bank(player, fine);
            state.players[player].release_from_jail();
            state.record(
                Some(player),
                Function::Action(ActionType::PayJailFine),
                json!({ "fine": fine, "forced": true }),
                ReturnCode::Success,
                None,
            );
        }
    }

    advance(state, player, total as usize);
    resolve_landing(state, player, total, true);
    Some(total)
}

/// Applies the cell the player is standing on. Cards may move the token once
/// more; `draw_cards` stops a second card being drawn from that landing.
pub fn resolve_landing(state: &mut GameState, player: PlayerId, die_total: u8, draw_cards: bool) {
    let position = state.players[player].position;
    let Some(asset) = state.board.location_at(position) else {
        return;
    };
    let location = &state.board.locations[asset];
    let (class, owned_by, is_mortgaged, action) =
        (location.class, location.owned_by, location.is_mortgaged, location.action);
    match class {
        LocationClass::RealEstate | LocationClass::Railroad | LocationClass::Utility => {
            match owned_by {
                Owner::Bank => state.players[player].option_to_buy = Some(asset),
                Owner::Player(owner) if owner != player && !is_mortgaged => {
                    let dues = state.dues(asset, die_total);
                    state.pay_player(player, owner, dues);
                    debug!(player, owner, asset, dues, "paid dues");
                    state.record(
                        Some(player),
                        Function::PayDues,
                        json!({ "asset": asset, "owner": owner, "amount": dues }),
                        ReturnCode::Success,
                        None,
                    );
                }
                Owner::Player(_) => {}
            }
        }
        LocationClass::Tax => {
            let tax = state.dues(asset, die_total);
            state.pay_bank(player, tax);
            state.record(
                Some(player),
                Function::PayTax,
                json!({ "asset": asset, "amount": tax }),
                ReturnCode::Success,
                None,
            );
        }
        LocationClass::Action => match action {
            Some(ActionKind::GoToJail) => send_to_jail(state, player),
            Some(ActionKind::Chance) if draw_cards => {
                draw_and_apply(state, player, CardPack::Chance, die_total)
            }
            Some(ActionKind::CommunityChest) if draw_cards => {
                draw_and_apply(state, player, CardPack::CommunityChest, die_total)
            }
            _ => {}
        },
        LocationClass::DoNothing => {}
    }
}

fn draw_and_apply(state: &mut GameState, player: PlayerId, pack: CardPack, die_total: u8) {
    let Some(card) = state.draw_card(pack) else {
        return;
    };
    let mut code = ReturnCode::Success;
    let mut detail = None;
    match card {
        Card::GetOutOfJailFree => {
            state.players[player].jail_cards.insert(pack);
        }
        Card::Collect(amount) => {
            if let Err(err) = state.bank_pays(player, amount) {
                code = ReturnCode::Failure;
                detail = Some(err.to_string());
            }
        }
        Card::Pay(amount) => state.pay_bank(player, amount),
        Card::AdvanceTo(position) => {
            advance_to(state, player, position);
            resolve_landing(state, player, die_total, false);
        }
        Card::GoToJail => send_to_jail(state, player),
    }
    state.record(
        Some(player),
        Function::DrawCard,
        json!({ "pack": pack, "card": card }),
        code,
        detail,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::CardDecks;
    use crate::game::state::GameConfig;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn passing_go_pays_salary() {
        let mut state = state();
        state.players[0].position = 38;
        let total = state.total_cash();
        assert_eq!(advance(&mut state, 0, 4), 2);
        assert_eq!(state.players[0].cash, 1700);
        assert_eq!(state.total_cash(), total);
    }

    #[test]
    fn landing_on_owned_asset_pays_owner() {
        let mut state = state();
        let reading = state.board.find("Reading Railroad").unwrap();
        state.transfer_asset(reading, Owner::Player(1));
        state.players[0].position = 5;
        resolve_landing(&mut state, 0, 5, true);
        assert_eq!(state.players[0].cash, 1475);
        assert_eq!(state.players[1].cash, 1525);
    }

    #[test]
    fn landing_on_bank_asset_opens_option() {
        let mut state = state();
        state.players[0].position = 39;
        resolve_landing(&mut state, 0, 4, true);
        assert_eq!(state.players[0].option_to_buy, state.board.find("Boardwalk"));
    }

    #[test]
    fn go_to_jail_cell_jails_without_salary() {
        let mut state = state();
        state.players[0].position = 30;
        resolve_landing(&mut state, 0, 4, true);
        assert!(state.players[0].currently_in_jail);
        assert_eq!(state.players[0].position, 10);
        assert_eq!(state.players[0].cash, 1500);
    }

    #[test]
    fn tax_goes_to_bank() {
        let mut state = state();
        let bank = state.bank.cash();
        state.players[0].position = 4;
        resolve_landing(&mut state, 0, 4, true);
        assert_eq!(state.players[0].cash, 1300);
        assert_eq!(state.bank.cash(), bank + 200);
    }

    #[test]
    fn advance_card_moves_and_collects_go() {
        let mut state = state();
        state.decks = CardDecks::empty();
        state.decks.push_top(CardPack::Chance, Card::AdvanceTo(0));
        state.players[0].position = 36;
        resolve_landing(&mut state, 0, 6, true);
        assert_eq!(state.players[0].position, 0);
        assert_eq!(state.players[0].cash, 1700);
    }

    #[test]
    fn jail_card_is_kept_by_player() {
        let mut state = state();
        state.decks = CardDecks::empty();
        state.decks.push_top(CardPack::CommunityChest, Card::GetOutOfJailFree);
        state.players[0].position = 2;
        resolve_landing(&mut state, 0, 2, true);
        assert!(state.players[0].jail_cards.contains(&CardPack::CommunityChest));
        assert_eq!(state.decks.len(CardPack::CommunityChest), 0);
    }

    #[test]
    fn third_failed_jail_roll_charges_fine() {
        let mut state = state();
        state.rules.roll_die = |_| (1, 2);
        state.players[0].send_to_jail(10);
        assert_eq!(roll_and_move(&mut state, 0), None);
        assert_eq!(roll_and_move(&mut state, 0), None);
        assert_eq!(roll_and_move(&mut state, 0), Some(3));
        assert!(!state.players[0].currently_in_jail);
        assert_eq!(state.players[0].position, 13);
        assert_eq!(state.players[0].cash, 1450);
    }

    #[test]
    fn doubles_release_from_jail() {
        let mut state = state();
        state.rules.roll_die = |_| (2, 2);
        state.players[0].send_to_jail(10);
        assert_eq!(roll_and_move(&mut state, 0), Some(4));
        assert_eq!(state.players[0].position, 14);
    }
}
