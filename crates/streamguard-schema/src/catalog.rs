//! Built-in schema catalog.
//!
//! Every entry is `(family, name, schema document)`. The documents live under
//! `schemas/<family>/<name>.schema.json`, the same layout
//! [`SchemaRegistry::from_directory`](crate::SchemaRegistry::from_directory)
//! reads at runtime.

/// Exchange market data: books, tickers and trades for spot and futures markets.
pub const EXCHANGE_DATA: &str = "exchange-data";
/// Informational feeds (sports schedules and scores).
pub const INFO_DATA: &str = "info-data";
/// Control messages exchanged around a subscription.
pub const CONTROL: &str = "control";

macro_rules! schema {
    ($family:literal, $name:literal) => {
        (
            $family,
            $name,
            include_str!(concat!("../schemas/", $family, "/", $name, ".schema.json")),
        )
    };
}

pub const BUILTIN: &[(&str, &str, &str)] = &[
    schema!("exchange-data", "spot-book"),
    schema!("exchange-data", "spot-ticker"),
    schema!("exchange-data", "spot-trade"),
    schema!("exchange-data", "futures-book"),
    schema!("exchange-data", "futures-ticker"),
    schema!("exchange-data", "futures-trade"),
    schema!("info-data", "sports-schedule"),
    schema!("info-data", "sports-score"),
    schema!("control", "welcome"),
    schema!("control", "invoice"),
    schema!("control", "payment-received"),
    schema!("control", "time-warning"),
    schema!("control", "unsubscribed"),
];

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decoder::decode;
    use crate::SchemaRegistry;

    #[test]
    fn family_constants_match_catalog() {
        for (family, _, _) in BUILTIN {
            assert!([EXCHANGE_DATA, INFO_DATA, CONTROL].contains(family));
        }
    }

    #[test]
    fn spot_book_accepts_string_prices() {
        let registry = SchemaRegistry::builtin().unwrap();
        let book = registry.descriptor("spot-book").unwrap();
        let value = json!([{
            "exchange": "binance",
            "symbol": "BTC-USDT",
            "side": "bid",
            "price": "64000.5",
            "size": "0.25",
            "timestamp": 1700000000000u64
        }]);

        let decoded = decode(&value, book).unwrap();
        assert_eq!(decoded[0]["price"], json!(64000.5));
        assert_eq!(decoded[0]["size"], json!(0.25));
    }

    #[test]
    fn futures_trade_requires_contract_type() {
        let registry = SchemaRegistry::builtin().unwrap();
        let trades = registry.descriptor("futures-trade").unwrap();
        let value = json!([{
            "exchange": "bybit",
            "symbol": "ETHUSD",
            "tradeId": 991,
            "side": "sell",
            "price": 3100,
            "size": 2,
            "timestamp": 1
        }]);

        let errors = decode(&value, trades).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].path, "$[0]");
    }

    #[test]
    fn sports_score_rejects_unknown_status() {
        let registry = SchemaRegistry::builtin().unwrap();
        let scores = registry.descriptor("sports-score").unwrap();
        let value = json!([{
            "league": "nba",
            "gameId": 401,
            "homeScore": "101",
            "awayScore": 99,
            "status": "halftime-show"
        }]);

        let errors = decode(&value, scores).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].path, "$[0].status");
    }

    #[test]
    fn control_schemas_pin_event_sentinels() {
        let registry = SchemaRegistry::builtin().unwrap();
        let unsubscribed = registry.descriptor("unsubscribed").unwrap();

        assert!(decode(
            &json!({ "uuid": "x", "event": "unsubscribed", "amountRefunded": 5 }),
            unsubscribed
        )
        .is_ok());
        assert!(decode(
            &json!({ "uuid": "x", "event": "payment received", "amountRefunded": 5 }),
            unsubscribed
        )
        .is_err());
    }
}
