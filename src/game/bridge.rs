//! Runs an agent-chosen action through the rule book and records the outcome.

use tracing::debug;

use crate::game::action::GameAction;
use crate::game::actions::ActionError;
use crate::game::history::Function;
use crate::game::state::{GameError, GameState};
use crate::types::{ActionType, ReturnCode};

/// Executes `action`, appends it to the history log and verifies the ledger.
///
/// A rejected action yields `ReturnCode::Failure` and leaves the state as it
/// was. `Err` is reserved for a broken ledger, which ends the game.
pub fn execute_action(state: &mut GameState, action: &GameAction) -> Result<ReturnCode, GameError> {
    let result = dispatch(state, action);
    let code = match &result {
        Ok(()) if action.action_type == ActionType::Skip => ReturnCode::Skip,
        Ok(()) => ReturnCode::Success,
        Err(_) => ReturnCode::Failure,
    };
    let params = serde_json::to_value(&action.payload).unwrap_or_default();
    let detail = result.as_ref().err().map(ToString::to_string);
    debug!(
        player = action.player_index,
        action = %action.action_type,
        ?code,
        reason = detail.as_deref().unwrap_or(""),
        "executed action"
    );
    state.record(
        Some(action.player_index),
        Function::Action(action.action_type),
        params,
        code,
        detail,
    );
    if result.is_ok() {
        state.check_invariants()?;
    }
    Ok(code)
}

/// Records a move the agent was not allowed to make.
pub fn reject_action(state: &mut GameState, action: &GameAction) {
    let params = serde_json::to_value(&action.payload).unwrap_or_default();
    let detail = ActionError::NotAllowed(action.action_type).to_string();
    debug!(player = action.player_index, action = %action.action_type, "action not allowed");
    state.record(
        Some(action.player_index),
        Function::Action(action.action_type),
        params,
        ReturnCode::Failure,
        Some(detail),
    );
}

fn dispatch(state: &mut GameState, action: &GameAction) -> Result<(), ActionError> {
    if !action.action_type.accepts(&action.payload) {
        return Err(ActionError::PayloadMismatch(action.action_type));
    }
    let function = state.rules.action(action.action_type);
    function(state, action.player_index, &action.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::ActionPayload;
    use crate::game::state::GameConfig;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn success_and_failure_are_recorded() {
        let mut state = state();
        let boardwalk = state.board.find("Boardwalk").unwrap();
        let buy = GameAction::on_asset(0, ActionType::BuyProperty, boardwalk);
        assert_eq!(execute_action(&mut state, &buy).unwrap(), ReturnCode::Success);
        assert_eq!(execute_action(&mut state, &buy).unwrap(), ReturnCode::Failure);

        let records = state.history.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].result, ReturnCode::Success);
        assert_eq!(records[1].result, ReturnCode::Failure);
        assert!(records[1].detail.as_deref().unwrap().contains("not owned by the bank"));
    }

    #[test]
    fn skip_reports_skip_code() {
        let mut state = state();
        assert_eq!(
            execute_action(&mut state, &GameAction::skip(1)).unwrap(),
            ReturnCode::Skip
        );
    }

    #[test]
    fn wrong_payload_shape_fails_without_dispatch() {
        let mut state = state();
        let action =
            GameAction::new(0, ActionType::MortgageProperty).with_payload(ActionPayload::None);
        let cash = state.players[0].cash;
        assert_eq!(execute_action(&mut state, &action).unwrap(), ReturnCode::Failure);
        assert_eq!(state.players[0].cash, cash);
        assert!(state.history.last().unwrap().detail.as_deref().unwrap().contains("payload"));
    }

    #[test]
    fn calls_go_through_the_rule_book() {
        let mut state = state();
        state.rules.set_action(ActionType::Conclude, |_, _, _| {
            Err(ActionError::NotAllowed(ActionType::Conclude))
        });
        assert_eq!(
            execute_action(&mut state, &GameAction::conclude(0)).unwrap(),
            ReturnCode::Failure
        );
    }

    #[test]
    fn broken_ledger_aborts() {
        let mut state = state();
        state.rules.set_action(ActionType::Conclude, |state, player, _| {
            state.players[player].assets.insert(1);
            Ok(())
        });
        assert!(matches!(
            execute_action(&mut state, &GameAction::conclude(0)),
            Err(GameError::InvariantViolation(_))
        ));
    }
}
