//! End-to-end tests for the journal façade: open → close lifecycle,
//! validation surfacing, and list filtering.

use chrono::{Duration, Local, TimeZone};
use tempfile::TempDir;
use tradelog_core::{
    CloseParams, CloseReason, Direction, Journal, JournalError, ListFilter, MarketType, OpenParams,
    Position, StatusFilter, ValidationError,
};

fn open_params(symbol: &str, market_type: MarketType, direction: Direction) -> OpenParams {
    let (stop_loss, take_profit) = match direction {
        Direction::Long => (90.0, 120.0),
        Direction::Short => (110.0, 80.0),
    };
    OpenParams {
        account_name: "main".to_string(),
        account_balance: 10_000.0,
        symbol: symbol.to_string(),
        market_type,
        direction,
        open_price: 100.0,
        quantity: 1.0,
        stop_loss,
        take_profit,
        margin: 1000.0,
        reason: String::new(),
        market_context: None,
        open_time: None,
    }
}

fn close_params(price: f64, quantity: f64) -> CloseParams {
    CloseParams {
        close_price: price,
        close_quantity: quantity,
        close_reason: CloseReason::Manual,
        close_note: String::new(),
        close_time: None,
    }
}

#[test]
fn open_then_close_computes_pnl_figures() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    // Open a long BTC/USDT position: price 100, qty 1, margin 1000,
    // stop 90, take 120. Close at 110 for the full quantity.
    let opened = journal
        .open_position(open_params("BTC/USDT", MarketType::Crypto, Direction::Long))
        .unwrap();
    assert!(opened.is_open());
    assert!(opened.close_time.is_none());

    let closed = journal
        .close_position(&opened.position_id, close_params(110.0, 1.0))
        .unwrap();
    assert!(closed.is_closed());
    assert_eq!(closed.realized_pnl, Some(10.0));
    assert_eq!(closed.pnl_percentage, Some(1.0));
    assert_eq!(closed.close_reason, Some(CloseReason::Manual));
    assert!(closed.holding_duration.is_some());

    // The persisted view agrees with the returned value.
    let found = journal.ledger().find_by_id(&opened.position_id).unwrap();
    assert_eq!(found, closed);
}

#[test]
fn explicit_timestamps_drive_holding_duration() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let open_time = Local.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
    let mut params = open_params("XAU/USD", MarketType::Gold, Direction::Long);
    params.open_time = Some(open_time);
    let opened = journal.open_position(params).unwrap();

    let mut close = close_params(105.0, 1.0);
    close.close_time = Some(open_time + Duration::days(2) + Duration::hours(5) + Duration::minutes(30));
    let closed = journal.close_position(&opened.position_id, close).unwrap();

    assert_eq!(closed.holding_duration.as_deref(), Some("2d 5h 30m"));
}

#[test]
fn short_close_pnl_sign() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let opened = journal
        .open_position(open_params("EUR/USD", MarketType::Forex, Direction::Short))
        .unwrap();
    let closed = journal
        .close_position(&opened.position_id, close_params(105.0, 1.0))
        .unwrap();

    assert_eq!(closed.realized_pnl, Some(-5.0));
}

#[test]
fn invalid_open_is_rejected_and_not_persisted() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let mut params = open_params("BTC/USDT", MarketType::Crypto, Direction::Long);
    params.stop_loss = 100.0; // at open price: out of range for a long
    let err = journal.open_position(params).unwrap_err();
    assert!(matches!(
        err,
        JournalError::Validation(ValidationError::StopLossRange { .. })
    ));

    assert!(journal.list_positions(&ListFilter::default()).unwrap().is_empty());
}

#[test]
fn closing_twice_fails_already_closed() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let opened = journal
        .open_position(open_params("BTC/USDT", MarketType::Crypto, Direction::Long))
        .unwrap();
    journal
        .close_position(&opened.position_id, close_params(110.0, 1.0))
        .unwrap();

    let err = journal
        .close_position(&opened.position_id, close_params(111.0, 1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        JournalError::Validation(ValidationError::AlreadyClosed { .. })
    ));
}

#[test]
fn over_quantity_close_fails() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let opened = journal
        .open_position(open_params("BTC/USDT", MarketType::Crypto, Direction::Long))
        .unwrap();
    let err = journal
        .close_position(&opened.position_id, close_params(110.0, 2.0))
        .unwrap_err();
    assert!(matches!(
        err,
        JournalError::Validation(ValidationError::CloseQuantityExceeds { .. })
    ));
}

#[test]
fn closing_unknown_position_is_not_found() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());

    let err = journal
        .close_position("20991231-235959-FFFF", close_params(110.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, JournalError::Ledger(_)));
}

fn seed_mixed_positions(journal: &Journal) -> Vec<Position> {
    let mut out = Vec::new();
    let base = Local.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();

    let mut btc = open_params("BTC/USDT", MarketType::Crypto, Direction::Long);
    btc.open_time = Some(base);
    out.push(journal.open_position(btc).unwrap());

    let mut eur = open_params("EUR/USD", MarketType::Forex, Direction::Short);
    eur.open_time = Some(base + Duration::days(5));
    eur.account_name = "swing".to_string();
    out.push(journal.open_position(eur).unwrap());

    let mut gold = open_params("XAU/USD", MarketType::Gold, Direction::Long);
    gold.open_time = Some(base + Duration::days(10));
    out.push(journal.open_position(gold).unwrap());

    // Close the gold position so status filtering has both kinds.
    let closed = journal
        .close_position(&out[2].position_id, close_params(110.0, 1.0))
        .unwrap();
    out[2] = closed;
    out
}

#[test]
fn list_filters_compose_with_and_semantics() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());
    let seeded = seed_mixed_positions(&journal);

    let all = journal.list_positions(&ListFilter::default()).unwrap();
    assert_eq!(all.len(), 3);

    let open_only = journal
        .list_positions(&ListFilter {
            status: StatusFilter::Open,
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(open_only.len(), 2);

    let closed_only = journal
        .list_positions(&ListFilter {
            status: StatusFilter::Closed,
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(closed_only.len(), 1);
    assert_eq!(closed_only[0].position_id, seeded[2].position_id);

    let by_symbol = journal
        .list_positions(&ListFilter {
            symbol: Some("BTC/USDT".to_string()),
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(by_symbol.len(), 1);

    let by_market = journal
        .list_positions(&ListFilter {
            market_type: Some(MarketType::Forex),
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(by_market.len(), 1);

    let by_account = journal
        .list_positions(&ListFilter {
            account: Some("swing".to_string()),
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(by_account.len(), 1);

    // Inclusive date bounds on open time.
    let base = Local.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
    let ranged = journal
        .list_positions(&ListFilter {
            from: Some(base),
            to: Some(base + Duration::days(5)),
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(ranged.len(), 2);

    // Composed: open crypto positions only.
    let composed = journal
        .list_positions(&ListFilter {
            status: StatusFilter::Open,
            market_type: Some(MarketType::Crypto),
            ..ListFilter::default()
        })
        .unwrap();
    assert_eq!(composed.len(), 1);
    assert_eq!(composed[0].symbol, "BTC/USDT");
}

#[test]
fn open_positions_matches_status_filter() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(dir.path());
    seed_mixed_positions(&journal);

    let open = journal.open_positions().unwrap();
    assert_eq!(open.len(), 2);
    assert!(open.iter().all(|p| p.is_open()));
}
