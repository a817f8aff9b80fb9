//! Quote records exchanged along the relay chain.
//!
//! The provider answers with an envelope keyed by pair code (`RawQuote`). The
//! relay flattens it into a `FlatQuote`, which is both the persisted row and
//! the value handed from the gateway to the sink. Only the `Bid` travels on to
//! the consumer. Every attribute is kept as the provider's text; nothing here
//! parses prices as numbers.
use serde::{Deserialize, Serialize};

/// Provider envelope for `GET /json/last/USD-BRL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Attributes of the USD/BRL pair.
    #[serde(rename = "USDBRL")]
    pub usdbrl: PairAttributes,
}

/// The eleven attributes the provider reports for a pair.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAttributes {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    #[serde(rename = "varBid")]
    pub var_bid: String,
    #[serde(rename = "pctChange")]
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

/// Flattened quote; one persisted row.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatQuote {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    pub var_bid: String,
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

impl From<RawQuote> for FlatQuote {
    fn from(raw: RawQuote) -> Self {
        let PairAttributes {
            code,
            codein,
            name,
            high,
            low,
            var_bid,
            pct_change,
            bid,
            ask,
            timestamp,
            create_date,
        } = raw.usdbrl;

        FlatQuote { code, codein, name, high, low, var_bid, pct_change, bid, ask, timestamp, create_date }
    }
}

impl FlatQuote {
    /// The bid attribute, the only value relayed to the consumer.
    pub fn bid(&self) -> Bid {
        Bid(self.bid.clone())
    }
}

/// Bid price as the provider wrote it. Serializes as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bid(pub String);

impl Bid {
    /// Borrow the bid text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPSTREAM_BODY: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.4610","low":"5.4102","varBid":"-0.0121","pctChange":"-0.22","bid":"5.4321","ask":"5.4351","timestamp":"1718920799","create_date":"2024-06-20 18:59:59"}}"#;

    #[test]
    fn projection_keeps_every_attribute() {
        let raw: RawQuote = serde_json::from_str(UPSTREAM_BODY).unwrap();
        let flat = FlatQuote::from(raw);

        assert_eq!(flat.code, "USD");
        assert_eq!(flat.codein, "BRL");
        assert_eq!(flat.name, "Dólar Americano/Real Brasileiro");
        assert_eq!(flat.high, "5.4610");
        assert_eq!(flat.low, "5.4102");
        assert_eq!(flat.var_bid, "-0.0121");
        assert_eq!(flat.pct_change, "-0.22");
        assert_eq!(flat.bid, "5.4321");
        assert_eq!(flat.ask, "5.4351");
        assert_eq!(flat.timestamp, "1718920799");
        assert_eq!(flat.create_date, "2024-06-20 18:59:59");
    }

    #[test]
    fn prices_stay_text() {
        let body = UPSTREAM_BODY.replace("5.4321", "5,4321000");
        let flat = FlatQuote::from(serde_json::from_str::<RawQuote>(&body).unwrap());
        assert_eq!(flat.bid, "5,4321000");
    }

    #[test]
    fn missing_pair_key_is_rejected() {
        let res = serde_json::from_str::<RawQuote>(r#"{"status":404,"code":"CoinNotExists"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn bid_encodes_as_json_string() {
        let flat = FlatQuote::from(serde_json::from_str::<RawQuote>(UPSTREAM_BODY).unwrap());
        assert_eq!(serde_json::to_string(&flat.bid()).unwrap(), r#""5.4321""#);
        let back: Bid = serde_json::from_str(r#""5.43""#).unwrap();
        assert_eq!(back.as_str(), "5.43");
    }
}
