//! Fixed endpoints and file locations used by the relay server and the consumer.

/// TCP port the relay server listens on.
pub const RELAY_PORT: u16 = 8080;
/// Single path segment served by the relay.
pub const QUOTE_ROUTE: &str = "cotacao";
/// Upstream provider endpoint for the USD/BRL pair.
pub const UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
/// SQLite file the relay persists quotes into.
pub const DATABASE_PATH: &str = "cotacoes.db";
/// File the consumer writes the bid into.
pub const OUTPUT_FILE: &str = "cotacao.txt";

/// Full URL of the quote route on a relay reachable at `host:port`.
pub fn relay_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/{QUOTE_ROUTE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_url_points_at_quote_route() {
        assert_eq!(relay_url("localhost", RELAY_PORT), "http://localhost:8080/cotacao");
    }
}
