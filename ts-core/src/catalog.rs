/// Label shown in the suggestion list and the canonical symbol it fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerSuggestion {
    pub label: &'static str,
    pub value: &'static str,
}

const fn entry(label: &'static str, value: &'static str) -> TickerSuggestion {
    TickerSuggestion { label, value }
}

/// Built-in suggestion list: NSE large caps followed by US large caps.
pub const TICKER_CATALOG: &[TickerSuggestion] = &[
    entry("RELIANCE - Reliance Industries", "RELIANCE.NS"),
    entry("TCS - Tata Consultancy Services", "TCS.NS"),
    entry("HDFCBANK - HDFC Bank", "HDFCBANK.NS"),
    entry("INFY - Infosys", "INFY.NS"),
    entry("HINDUNILVR - Hindustan Unilever", "HINDUNILVR.NS"),
    entry("ICICIBANK - ICICI Bank", "ICICIBANK.NS"),
    entry("KOTAKBANK - Kotak Mahindra Bank", "KOTAKBANK.NS"),
    entry("AXISBANK - Axis Bank", "AXISBANK.NS"),
    entry("LT - Larsen & Toubro", "LT.NS"),
    entry("SBIN - State Bank of India", "SBIN.NS"),
    entry("AAPL - Apple Inc.", "AAPL"),
    entry("MSFT - Microsoft Corporation", "MSFT"),
    entry("GOOGL - Alphabet Inc.", "GOOGL"),
    entry("AMZN - Amazon.com Inc.", "AMZN"),
    entry("TSLA - Tesla Inc.", "TSLA"),
    entry("BRK-B - Berkshire Hathaway Inc.", "BRK-B"),
    entry("NVDA - NVIDIA Corporation", "NVDA"),
    entry("META - Meta Platforms Inc.", "META"),
    entry("JNJ - Johnson & Johnson", "JNJ"),
    entry("V - Visa Inc.", "V"),
    entry("WMT - Walmart Inc.", "WMT"),
    entry("PG - Procter & Gamble Co.", "PG"),
    entry("MA - Mastercard Inc.", "MA"),
    entry("UNH - UnitedHealth Group Inc.", "UNH"),
    entry("HD - Home Depot Inc.", "HD"),
    entry("DIS - Walt Disney Co.", "DIS"),
    entry("PYPL - PayPal Holdings Inc.", "PYPL"),
    entry("ADBE - Adobe Inc.", "ADBE"),
    entry("CRM - Salesforce Inc.", "CRM"),
    entry("NFLX - Netflix Inc.", "NFLX"),
    entry("BAC - Bank of America Corp.", "BAC"),
    entry("KO - Coca-Cola Co.", "KO"),
    entry("PEP - PepsiCo Inc.", "PEP"),
    entry("XOM - Exxon Mobil Corp.", "XOM"),
    entry("T - AT&T Inc.", "T"),
    entry("CSCO - Cisco Systems Inc.", "CSCO"),
    entry("INTC - Intel Corp.", "INTC"),
    entry("ORCL - Oracle Corp.", "ORCL"),
    entry("ABT - Abbott Laboratories", "ABT"),
];

/// Case-insensitive matches for `query`.
///
/// Entries whose value starts with the query come first, then entries whose
/// label or value merely contains it. Catalog order is kept within each group.
/// A blank query yields nothing.
pub fn suggest<'a>(query: &str, catalog: &'a [TickerSuggestion]) -> Vec<&'a TickerSuggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut prefix = Vec::new();
    let mut contains = Vec::new();
    for item in catalog {
        let value = item.value.to_lowercase();
        if value.starts_with(&needle) {
            prefix.push(item);
        } else if value.contains(&needle) || item.label.to_lowercase().contains(&needle) {
            contains.push(item);
        }
    }
    prefix.extend(contains);
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(query: &str) -> Vec<&'static str> {
        suggest(query, TICKER_CATALOG).iter().map(|s| s.value).collect()
    }

    #[test]
    fn catalog_has_every_listing() {
        assert_eq!(TICKER_CATALOG.len(), 39);
        assert_eq!(TICKER_CATALOG.iter().filter(|s| s.value.ends_with(".NS")).count(), 10);
    }

    #[test]
    fn prefix_matches_rank_before_label_matches() {
        let hits = values("ma");
        assert_eq!(hits.first(), Some(&"MA"));
        // "Amazon", "Mahindra", "Walmart" only match through the label.
        assert!(hits.contains(&"AMZN"));
        assert!(hits.contains(&"KOTAKBANK.NS"));
        let ma = hits.iter().position(|v| *v == "MA").unwrap();
        let amzn = hits.iter().position(|v| *v == "AMZN").unwrap();
        assert!(ma < amzn);
    }

    #[test]
    fn matching_ignores_case_and_surrounding_space() {
        assert_eq!(values("  nvidia "), vec!["NVDA"]);
        assert_eq!(values("BRK"), vec!["BRK-B"]);
    }

    #[test]
    fn blank_or_unknown_query_has_no_suggestions() {
        assert!(values("").is_empty());
        assert!(values("   ").is_empty());
        assert!(values("zzzz").is_empty());
    }
}
