//! Unit tests for the engine's pure pieces: webhook validation, position
//! math, thresholds and the strategy seam.

#[cfg(test)]
mod tests {
    use bot::http::SignalPayload;
    use bot::services::monitor::breached_threshold;
    use bot::services::position_service::{leveraged_profit_pct, round_quantity};
    use bot::strategy::{collect_recommendations, Candle, MarketData, Recommendation, Strategy};
    use shared::{OperationDirection, OrderSide};

    fn payload() -> SignalPayload {
        SignalPayload {
            ticker: Some("BTCUSDT".to_string()),
            signal: Some("buy".to_string()),
            timeframe: Some("15m".to_string()),
            strategy: Some("rsi_ma_crossover".to_string()),
            price_close: Some(64250.5),
        }
    }

    #[test]
    fn webhook_payload_validates() {
        let valid = payload().validate().unwrap();
        assert_eq!(valid.ticker, "BTCUSDT");
        assert_eq!(valid.side, OrderSide::Buy);
        assert_eq!(valid.strategy, "rsi_ma_crossover");
        assert_eq!(valid.price, 64250.5);
    }

    #[test]
    fn webhook_payload_rejects_missing_fields() {
        let mut missing_ticker = payload();
        missing_ticker.ticker = None;
        assert!(missing_ticker.validate().is_err());

        let mut blank_strategy = payload();
        blank_strategy.strategy = Some("   ".to_string());
        assert!(blank_strategy.validate().is_err());

        let mut no_price = payload();
        no_price.price_close = None;
        assert!(no_price.validate().is_err());

        let mut bad_price = payload();
        bad_price.price_close = Some(-1.0);
        assert!(bad_price.validate().is_err());
    }

    #[test]
    fn webhook_payload_rejects_unknown_side() {
        let mut unknown = payload();
        unknown.signal = Some("flat".to_string());
        assert!(unknown.validate().is_err());

        let mut hold = payload();
        hold.signal = Some("hold".to_string());
        assert_eq!(hold.validate().unwrap().side, OrderSide::Hold);
    }

    #[test]
    fn leveraged_profit_long_and_short_mirror() {
        // Entry 100 → exit 110 is a 10% move; x10 leverage makes it 100%.
        let long = leveraged_profit_pct(100.0, 110.0, OperationDirection::Long, 10);
        assert!((long - 100.0).abs() < 1e-9);

        let short = leveraged_profit_pct(100.0, 110.0, OperationDirection::Short, 10);
        assert!((short + 100.0).abs() < 1e-9);
    }

    #[test]
    fn leveraged_profit_handles_losses() {
        let long = leveraged_profit_pct(200.0, 190.0, OperationDirection::Long, 5);
        assert!((long + 25.0).abs() < 1e-9);

        let short = leveraged_profit_pct(200.0, 190.0, OperationDirection::Short, 5);
        assert!((short - 25.0).abs() < 1e-9);
    }

    #[test]
    fn quantity_rounds_down_to_precision() {
        assert_eq!(round_quantity(0.123456, 3), 0.123);
        assert_eq!(round_quantity(0.9999, 2), 0.99);
        assert_eq!(round_quantity(5.0, 0), 5.0);
        assert_eq!(round_quantity(0.0789, 1), 0.0);
    }

    #[test]
    fn thresholds_close_at_boundaries_only() {
        assert_eq!(breached_threshold(25.0, 25, 25), Some("take profit"));
        assert_eq!(breached_threshold(26.3, 25, 25), Some("take profit"));
        assert_eq!(breached_threshold(-25.0, 25, 25), Some("stop loss"));
        assert_eq!(breached_threshold(-30.0, 25, 25), Some("stop loss"));
        assert_eq!(breached_threshold(24.9, 25, 25), None);
        assert_eq!(breached_threshold(-24.9, 25, 25), None);
        assert_eq!(breached_threshold(0.0, 25, 25), None);
    }

    struct AlwaysBuy;

    impl Strategy for AlwaysBuy {
        fn name(&self) -> &str {
            "always_buy"
        }

        fn evaluate(&self, data: &MarketData) -> Recommendation {
            Recommendation {
                side: OrderSide::Buy,
                price: data.last_close().unwrap_or(0.0),
            }
        }
    }

    struct AlwaysHold;

    impl Strategy for AlwaysHold {
        fn name(&self) -> &str {
            "always_hold"
        }

        fn evaluate(&self, data: &MarketData) -> Recommendation {
            Recommendation {
                side: OrderSide::Hold,
                price: data.last_close().unwrap_or(0.0),
            }
        }
    }

    fn market_data(closes: &[f64]) -> MarketData {
        MarketData {
            ticker: "BTCUSDT".to_string(),
            timeframe: "15m".to_string(),
            candles: closes
                .iter()
                .enumerate()
                .map(|(i, close)| Candle {
                    open: *close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close: *close,
                    volume: 1000.0,
                    timestamp: i as i64 * 900,
                })
                .collect(),
        }
    }

    #[test]
    fn every_strategy_sees_the_same_snapshot() {
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(AlwaysBuy), Box::new(AlwaysHold)];
        let data = market_data(&[100.0, 101.0, 102.5]);

        let recommendations = collect_recommendations(&strategies, &data);
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].0, "always_buy");
        assert_eq!(recommendations[0].1.side, OrderSide::Buy);
        assert_eq!(recommendations[0].1.price, 102.5);
        assert_eq!(recommendations[1].0, "always_hold");
        assert_eq!(recommendations[1].1.side, OrderSide::Hold);
    }
}
