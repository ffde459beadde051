//! Consensus-scan and state-machine scenarios.

use bot::services::consensus::{find_consensus, Consensus, ScanSignal, CONSENSUS_SIZE};
use bot::services::dispatcher::{decide, ConfirmationAction};
use shared::{BotPhase, OperationDirection, OrderSide};

/// Helper building one scan signal per (side, strategy) pair, ids
/// assigned in order.
fn scan(signals: &[(OrderSide, &str)]) -> Vec<ScanSignal> {
    signals
        .iter()
        .enumerate()
        .map(|(i, (side, strategy))| ScanSignal {
            id: i as u64 + 1,
            side: *side,
            strategy: strategy.to_string(),
        })
        .collect()
}

fn buys(strategies: &[&str]) -> Vec<ScanSignal> {
    scan(&strategies
        .iter()
        .map(|s| (OrderSide::Buy, *s))
        .collect::<Vec<_>>())
}

#[test]
fn five_distinct_buys_form_a_group_with_exactly_those_signals() {
    let signals = buys(&["rsi", "macd", "ema", "ichimoku", "pivot"]);
    let consensus = find_consensus(&signals).unwrap();

    assert_eq!(consensus.direction, OrderSide::Buy);
    assert_eq!(consensus.member_ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(consensus.member_ids.len(), CONSENSUS_SIZE);
}

#[test]
fn five_sells_are_symmetric() {
    let signals = scan(&[
        (OrderSide::Sell, "rsi"),
        (OrderSide::Sell, "macd"),
        (OrderSide::Sell, "ema"),
        (OrderSide::Sell, "ichimoku"),
        (OrderSide::Sell, "pivot"),
    ]);
    let consensus = find_consensus(&signals).unwrap();
    assert_eq!(consensus.direction, OrderSide::Sell);
    assert_eq!(consensus.member_ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn four_distinct_strategies_do_not_qualify() {
    // Five consecutive buys, but "rsi" repeats.
    let signals = buys(&["rsi", "macd", "ema", "rsi", "pivot"]);
    assert_eq!(find_consensus(&signals), None);
}

#[test]
fn strategy_collision_blocks_the_run_until_a_reset() {
    // First five collide on "rsi"; a sixth distinct strategy still cannot
    // rescue the window anchored at the run's start.
    let signals = buys(&["rsi", "macd", "ema", "rsi", "pivot", "ichimoku"]);
    assert_eq!(find_consensus(&signals), None);

    // After an opposite signal resets the run, a clean five qualifies.
    let mut signals = scan(&[(OrderSide::Sell, "vwap")]);
    signals.extend(buys(&["rsi", "macd", "ema", "ichimoku", "pivot"]).into_iter().map(
        |mut s| {
            s.id += 1;
            s
        },
    ));
    assert!(find_consensus(&signals).is_some());
}

#[test]
fn hold_breaks_a_run() {
    // Four buys + hold + one buy is not five consecutive.
    let signals = scan(&[
        (OrderSide::Buy, "rsi"),
        (OrderSide::Buy, "macd"),
        (OrderSide::Buy, "ema"),
        (OrderSide::Buy, "ichimoku"),
        (OrderSide::Hold, "vwap"),
        (OrderSide::Buy, "pivot"),
    ]);
    assert_eq!(find_consensus(&signals), None);
}

#[test]
fn opposite_signal_breaks_a_run() {
    let signals = scan(&[
        (OrderSide::Buy, "rsi"),
        (OrderSide::Buy, "macd"),
        (OrderSide::Buy, "ema"),
        (OrderSide::Buy, "ichimoku"),
        (OrderSide::Sell, "vwap"),
        (OrderSide::Buy, "pivot"),
    ]);
    assert_eq!(find_consensus(&signals), None);
}

#[test]
fn scan_stops_at_the_first_qualifying_window() {
    // Seven distinct buys; the group is the first five, not the last.
    let signals = buys(&["rsi", "macd", "ema", "ichimoku", "pivot", "vwap", "obv"]);
    assert_eq!(
        find_consensus(&signals),
        Some(Consensus {
            direction: OrderSide::Buy,
            member_ids: vec![1, 2, 3, 4, 5],
        })
    );
}

#[test]
fn runs_interrupted_then_rebuilt_use_fresh_signals() {
    let signals = scan(&[
        (OrderSide::Buy, "rsi"),
        (OrderSide::Buy, "macd"),
        (OrderSide::Sell, "ema"),
        (OrderSide::Buy, "ichimoku"),
        (OrderSide::Buy, "pivot"),
        (OrderSide::Buy, "vwap"),
        (OrderSide::Buy, "obv"),
        (OrderSide::Buy, "fib"),
    ]);
    let consensus = find_consensus(&signals).unwrap();
    // The two buys before the sell are gone; members start at id 4.
    assert_eq!(consensus.member_ids, vec![4, 5, 6, 7, 8]);
}

#[test]
fn empty_and_short_inputs_yield_nothing() {
    assert_eq!(find_consensus(&[]), None);
    assert_eq!(
        find_consensus(&buys(&["rsi", "macd", "ema", "ichimoku"])),
        None
    );
}

// --- state machine decisions ---

#[test]
fn idle_bot_ignores_confirmations() {
    assert_eq!(
        decide(BotPhase::Idle, None, OrderSide::Buy),
        ConfirmationAction::Ignore("bot is idle")
    );
    // Even with an open position, idle never reacts.
    assert!(matches!(
        decide(BotPhase::Idle, Some(OperationDirection::Long), OrderSide::Sell),
        ConfirmationAction::Ignore(_)
    ));
}

#[test]
fn listening_bot_opens_directly() {
    assert_eq!(
        decide(BotPhase::Listening, None, OrderSide::Buy),
        ConfirmationAction::Open
    );
    assert_eq!(
        decide(BotPhase::Listening, None, OrderSide::Sell),
        ConfirmationAction::Open
    );
}

#[test]
fn same_direction_confirmation_never_pyramids() {
    assert!(matches!(
        decide(BotPhase::Operating, Some(OperationDirection::Long), OrderSide::Buy),
        ConfirmationAction::Ignore(_)
    ));
    assert!(matches!(
        decide(BotPhase::Operating, Some(OperationDirection::Short), OrderSide::Sell),
        ConfirmationAction::Ignore(_)
    ));
}

#[test]
fn opposite_direction_confirmation_reverses() {
    assert_eq!(
        decide(BotPhase::Operating, Some(OperationDirection::Long), OrderSide::Sell),
        ConfirmationAction::Reverse
    );
    assert_eq!(
        decide(BotPhase::Operating, Some(OperationDirection::Short), OrderSide::Buy),
        ConfirmationAction::Reverse
    );
}

#[test]
fn stale_operating_pointer_behaves_as_flat() {
    // The dispatcher resolves current_operation_id against open rows
    // only; a dangling pointer reaches decide() as None and re-opens.
    assert_eq!(
        decide(BotPhase::Operating, None, OrderSide::Buy),
        ConfirmationAction::Open
    );
}
