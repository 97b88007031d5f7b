//! End-to-end agent scenarios against the in-memory exchange.
//!
//! Each test builds an `Agent` over a seeded `MockExchange`, runs one
//! user-facing operation and checks both the returned value and the exact
//! sequence of exchange calls the agent made.

use gatecmd_agent::test_support::{Call, MockExchange};
use gatecmd_agent::{Agent, AgentError, Logger};
use gatecmd_models::{
    BalanceRecord, Order, OrderRequest, OrderStatus, OrderType, PriceSource, Side, Trade,
    TradeRole,
};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

fn agent(exchange: MockExchange) -> Agent<MockExchange> {
    Agent::with_client(Logger::disabled(), exchange, "usdt")
}

fn open_order(id: u64, symbol: &str, side: Side) -> Order {
    Order {
        id,
        client_id: None,
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Limit,
        status: OrderStatus::Open,
        price: Some(dec!(20000)),
        amount: dec!(0.01),
        left: dec!(0.01),
        filled_total: dec!(0),
        avg_deal_price: None,
        fee: dec!(0),
        fee_currency: None,
        created_at: None,
    }
}

fn fill(id: u64, order_id: u64, symbol: &str) -> Trade {
    Trade {
        id,
        order_id,
        symbol: symbol.to_string(),
        side: Side::Buy,
        role: TradeRole::Taker,
        amount: dec!(0.005),
        price: dec!(20010),
        fee: dec!(0.00001),
        fee_currency: "BTC".to_string(),
        created_at: None,
    }
}

#[tokio::test]
async fn scenario_portfolio_valuation() {
    let exchange = MockExchange::new()
        .with_balances(vec![
            BalanceRecord::new("usdt", dec!(100), dec!(0)),
            BalanceRecord::new("btc", dec!(1), dec!(0.5)),
            BalanceRecord::new("ghost", dec!(3), dec!(0)),
        ])
        .with_price("btc_usdt", dec!(20000));
    let agent = agent(exchange);

    let valuation = agent.balance(&CancellationToken::new()).await.unwrap();

    let sources: Vec<PriceSource> = valuation.balances.iter().map(|b| b.price_source).collect();
    assert_eq!(
        sources,
        vec![PriceSource::Quote, PriceSource::Market, PriceSource::Fallback]
    );
    assert_eq!(valuation.total, dec!(30103));
    assert_eq!(
        agent.client().calls(),
        vec![
            Call::GetBalances,
            Call::GetLastPrice("btc_usdt".to_string()),
            Call::GetLastPrice("ghost_usdt".to_string()),
        ]
    );
}

#[tokio::test]
async fn scenario_balance_in_other_quote() {
    let exchange = MockExchange::new()
        .with_balances(vec![
            BalanceRecord::new("BTC", dec!(2), dec!(0)),
            BalanceRecord::new("ETH", dec!(10), dec!(0)),
        ])
        .with_price("eth_btc", dec!(0.05));
    let agent = agent(exchange);

    let valuation = agent
        .balance_in(&CancellationToken::new(), "BTC")
        .await
        .unwrap();

    assert_eq!(valuation.quote_currency, "btc");
    assert_eq!(valuation.total, dec!(2.5));
}

#[tokio::test]
async fn scenario_balance_fetch_failure() {
    let agent = agent(MockExchange::new().failing_transport());
    let err = agent.balance(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::TransportFailure {
            operation: "get balances",
            ..
        }
    ));
}

#[tokio::test]
async fn scenario_limit_sell_then_cancel() {
    let exchange = MockExchange::new()
        .with_order_id(5001)
        .with_open_orders(vec![open_order(5001, "BTC_USDT", Side::Sell)]);
    let agent = agent(exchange);
    let cancel = CancellationToken::new();

    let placed = agent
        .place_order(
            &cancel,
            &OrderRequest::limit("btc_usdt", "sell", "30000", "0.01").with_client_id("t-exit"),
        )
        .await
        .unwrap();
    assert_eq!(placed.id, 5001);
    let order = placed.order.unwrap();
    assert_eq!(order.client_id.as_deref(), Some("t-exit"));
    assert_eq!(order.price, Some(dec!(30000)));

    let cancelled = agent
        .cancel_order(&cancel, "btc_usdt", "5001")
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    assert_eq!(
        agent.client().calls()[1],
        Call::CancelOrder {
            symbol: "btc_usdt".to_string(),
            order_id: 5001,
        }
    );
}

#[tokio::test]
async fn scenario_cancel_unknown_order_is_rejected() {
    let agent = agent(MockExchange::new());
    let err = agent
        .cancel_order(&CancellationToken::new(), "btc_usdt", "999")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::ExchangeRejected { .. }));
}

#[tokio::test]
async fn scenario_market_sell_unknown_pair() {
    let agent = agent(MockExchange::new().with_unknown_symbol("nope_usdt"));
    let err = agent
        .place_order(
            &CancellationToken::new(),
            &OrderRequest::market_sell("nope_usdt", "1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::UnknownSymbol { .. }));
    assert!(!agent
        .client()
        .calls()
        .iter()
        .any(|c| matches!(c, Call::PlaceMarket { .. })));
}

#[tokio::test]
async fn scenario_invalid_requests_make_no_calls() {
    let agent = agent(MockExchange::new());
    let cancel = CancellationToken::new();

    let bad_requests = vec![
        OrderRequest::limit("btc_usdt", "hold", "1", "1"),
        OrderRequest {
            order_type: "stop".to_string(),
            ..OrderRequest::limit("btc_usdt", "buy", "1", "1")
        },
        OrderRequest::limit("btc_usdt", "buy", "abc", "1"),
        OrderRequest::limit("btc_usdt", "buy", "1", "0"),
        OrderRequest::market_buy("btc_usdt", "-5"),
        OrderRequest::market_sell("btc_usdt", ""),
    ];

    for request in &bad_requests {
        let err = agent.place_order(&cancel, request).await.unwrap_err();
        assert!(err.is_validation(), "{request:?} gave {err}");
    }
    assert_eq!(agent.client().call_count(), 0);
}

#[tokio::test]
async fn scenario_open_orders_by_symbol() {
    let exchange = MockExchange::new().with_open_orders(vec![
        open_order(1, "BTC_USDT", Side::Buy),
        open_order(2, "ETH_USDT", Side::Sell),
        open_order(3, "BTC_USDT", Side::Sell),
    ]);
    let agent = agent(exchange);
    let cancel = CancellationToken::new();

    let btc = agent.list_orders(&cancel, "btc_usdt").await.unwrap();
    assert_eq!(btc.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3]);

    let all = agent.list_orders(&cancel, "").await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn scenario_trade_history_for_one_order() {
    let exchange = MockExchange::new().with_trades(vec![
        fill(10, 100, "BTC_USDT"),
        fill(11, 101, "BTC_USDT"),
        fill(12, 100, "BTC_USDT"),
    ]);
    let agent = agent(exchange);
    let cancel = CancellationToken::new();

    let trades = agent
        .tx_history(&cancel, "btc_usdt", Some("100"))
        .await
        .unwrap();
    assert_eq!(trades.iter().map(|t| t.id).collect::<Vec<_>>(), vec![10, 12]);

    let everything = agent.tx_history(&cancel, "btc_usdt", None).await.unwrap();
    assert_eq!(everything.len(), 3);

    let err = agent
        .tx_history(&cancel, "btc_usdt", Some("x1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::InvalidOrderId(_)));
}

#[tokio::test]
async fn scenario_close_after_work() {
    let agent = agent(MockExchange::new().with_balances(vec![BalanceRecord::new(
        "usdt",
        dec!(1),
        dec!(0),
    )]));
    agent.balance(&CancellationToken::new()).await.unwrap();
    agent.close();
}
