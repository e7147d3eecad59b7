//! Plain text market report

use super::snapshot::CompleteSnapshot;

pub const SUBJECT: &str = "Market Update — Gold, Currency, and Crypto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

impl Report {
    pub fn compose(snapshot: &CompleteSnapshot, local_currency: &str) -> Self {
        let body = [
            format!("Gold (24k/gram): {} {local_currency}", snapshot.gold),
            format!("USD → {local_currency}: {}", snapshot.usd),
            format!("EUR → {local_currency}: {}", snapshot.eur),
            format!("BTC → USD: {}", snapshot.btc),
            format!("ETH → USD: {}", snapshot.eth),
        ]
        .join("\n");

        Report {
            subject: SUBJECT.to_string(),
            body,
        }
    }
}

/// Single line console rendering of a complete snapshot.
pub fn summary_line(snapshot: &CompleteSnapshot, local_currency: &str) -> String {
    format!(
        "Gold: {} {local_currency} | USD: {} | EUR: {} | BTC: {} USD | ETH: {} USD",
        snapshot.gold, snapshot.usd, snapshot.eur, snapshot.btc, snapshot.eth
    )
}
