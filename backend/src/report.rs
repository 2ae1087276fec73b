//! Structured stock report and its HTML rendering.
//!
//! The report JSON uses the display labels as keys ("Company Overview",
//! "Revenue (TTM)", ...) because the writer asks a language model to fill a
//! template with exactly those keys.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::market::QuoteSummary;

pub const DISCLAIMER_HTML: &str = "<div class='alert alert-warning'>Disclaimer: The stock analysis and recommendations provided are for informational purposes only and should not be considered financial advice. Always do your own research or consult with a financial professional.</div>";

const MISSING: &str = "N/A";
const UNPROVIDED_PHRASE: &str = "Not explicitly provided in the tool output.";
const UNPROVIDED_REPLACEMENT: &str = "Not available but will continue fetching other relevant data...";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    #[serde(rename = "Company Overview", default)]
    pub company_overview: CompanyOverview,
    #[serde(rename = "Stock Performance", default)]
    pub stock_performance: Map<String, Value>,
    #[serde(rename = "Recent News", default)]
    pub recent_news: Vec<NewsItem>,
    #[serde(rename = "Analyst Ratings", default)]
    pub analyst_ratings: AnalystRatings,
    #[serde(rename = "Technical Trend Analysis", default)]
    pub technical_trend: Map<String, Value>,
    #[serde(rename = "Final Buy/Hold/Sell Recommendation", default)]
    pub recommendation: Recommendation,
    #[serde(default)]
    pub risk_factors: Vec<Value>,
    #[serde(default)]
    pub bull_case: Scenario,
    #[serde(default)]
    pub bear_case: Scenario,
    #[serde(default)]
    pub investor_recommendations: InvestorRecommendations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Market Cap", default)]
    pub market_cap: Option<Value>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<Value>,
    #[serde(rename = "Industry", default)]
    pub industry: Option<Value>,
    #[serde(rename = "Key Financials", default)]
    pub key_financials: KeyFinancials,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyFinancials {
    #[serde(rename = "Revenue (TTM)", default)]
    pub revenue: Option<Value>,
    #[serde(rename = "Net Income (TTM)", default)]
    pub net_income: Option<Value>,
    #[serde(rename = "EPS (TTM)", default)]
    pub eps: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "Headline", alias = "Title", default)]
    pub headline: Option<Value>,
    #[serde(rename = "Summary", default)]
    pub summary: Option<Value>,
    #[serde(rename = "Detailed Summary", default)]
    pub detailed_summary: Option<Value>,
    #[serde(rename = "Source", default)]
    pub source: Option<Value>,
    #[serde(rename = "Source Link", default)]
    pub source_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystRatings {
    #[serde(rename = "Analyst Consensus", default)]
    pub consensus: Option<Value>,
    #[serde(rename = "Average Price Target", default)]
    pub average_price_target: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "Recommendation", default)]
    pub call: Option<Value>,
    #[serde(rename = "Reasoning", default)]
    pub reasoning: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub scenario: Option<Value>,
    #[serde(default)]
    pub price_target: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestorRecommendations {
    #[serde(default)]
    pub conservative_investors: Option<Value>,
    #[serde(default)]
    pub moderate_investors: Option<Value>,
    #[serde(default)]
    pub aggressive_investors: Option<Value>,
}

/// Writer output: a parsed report, or text that did not parse as one.
#[derive(Debug, Clone, PartialEq)]
pub enum Narrative {
    Structured { report: StockReport, raw: Value },
    Freeform(String),
}

impl Narrative {
    /// Interpret model output: strip code fences, then try the report schema.
    pub fn from_model_output(content: &str) -> Self {
        let cleaned = content.replace(UNPROVIDED_PHRASE, UNPROVIDED_REPLACEMENT);
        let json = strip_code_fences(&cleaned);
        let parsed = serde_json::from_str::<Value>(json).and_then(|raw| {
            serde_json::from_value::<StockReport>(raw.clone()).map(|report| (report, raw))
        });
        match parsed {
            Ok((report, raw)) => Narrative::Structured { report, raw },
            Err(err) => {
                tracing::warn!(error = %err, "report is not valid JSON; rendering as text");
                Narrative::Freeform(cleaned.trim().to_string())
            }
        }
    }

    pub fn from_report(report: StockReport) -> Self {
        let raw = serde_json::to_value(&report).unwrap_or(Value::Null);
        Narrative::Structured { report, raw }
    }

    pub fn to_html(&self) -> String {
        match self {
            Narrative::Structured { report, .. } => render_report_html(report),
            Narrative::Freeform(text) => render_text_html(text),
        }
    }

    pub fn raw_json(&self) -> Option<Value> {
        match self {
            Narrative::Structured { raw, .. } => Some(raw.clone()),
            Narrative::Freeform(_) => None,
        }
    }
}

/// Drop markdown code fence markers (```json and ```) and trim.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::String(s) if s.trim().is_empty() => MISSING.to_string(),
        Value::String(s) => escape_html(s),
        other => escape_html(&other.to_string()),
    }
}

fn field(value: &Option<Value>) -> String {
    value.as_ref().map(text).unwrap_or_else(|| MISSING.to_string())
}

fn safe_link(link: Option<&str>) -> String {
    match link.map(str::trim) {
        Some(l) if l.starts_with("https://") || l.starts_with("http://") => escape_html(l),
        _ => "#".to_string(),
    }
}

fn labeled(out: &mut String, label: &str, value: &str) {
    let _ = write!(out, "<p><strong>{}:</strong> {}</p>", escape_html(label), value);
}

fn scenario_box(out: &mut String, heading: &str, case: &Scenario) {
    let _ = write!(out, "<h2>{heading}</h2><div class=\"box\">");
    labeled(out, "Scenario", &field(&case.scenario));
    labeled(out, "Price Target", &field(&case.price_target));
    out.push_str("</div>");
}

pub fn render_report_html(report: &StockReport) -> String {
    let mut out = String::from("<div class=\"container\">");

    let overview = &report.company_overview;
    out.push_str("<div class=\"box\"><h2>COMPANY OVERVIEW</h2>");
    labeled(&mut out, "Market Cap", &field(&overview.market_cap));
    labeled(&mut out, "Sector", &field(&overview.sector));
    labeled(&mut out, "Industry", &field(&overview.industry));
    out.push_str("</div>");

    let financials = &overview.key_financials;
    out.push_str("<div class=\"box\"><h2>Key Financials</h2>");
    labeled(&mut out, "Revenue (TTM)", &field(&financials.revenue));
    labeled(&mut out, "Net Income (TTM)", &field(&financials.net_income));
    labeled(&mut out, "EPS (TTM)", &field(&financials.eps));
    out.push_str("</div>");

    out.push_str("<div class=\"box\"><h2>STOCK PERFORMANCE</h2>");
    for (key, value) in &report.stock_performance {
        labeled(&mut out, key, &text(value));
    }
    out.push_str("</div>");

    let ratings = &report.analyst_ratings;
    out.push_str("<div class=\"box\"><h2>ANALYST RATINGS &amp; TECHNICAL TREND ANALYSIS</h2>");
    labeled(&mut out, "Analyst Consensus", &field(&ratings.consensus));
    labeled(&mut out, "Average Price Target", &field(&ratings.average_price_target));
    for (key, value) in &report.technical_trend {
        labeled(&mut out, key, &text(value));
    }
    out.push_str("</div></div>");

    out.push_str("<h2>RECENT NEWS</h2>");
    for (i, news) in report.recent_news.iter().enumerate() {
        match &news.headline {
            Some(headline) => {
                let _ = write!(out, "<h3>News {}: {}</h3>", i + 1, text(headline));
            }
            None => {
                let _ = write!(out, "<h3>News {}</h3>", i + 1);
            }
        }
        labeled(&mut out, "Summary", &field(&news.summary));
        if news.detailed_summary.is_some() {
            labeled(&mut out, "Detailed Summary", &field(&news.detailed_summary));
        }
        let _ = write!(
            out,
            "<p><strong>Source:</strong> <a href=\"{}\" target=\"_blank\">{}</a></p>",
            safe_link(news.source_link.as_deref()),
            field(&news.source)
        );
    }

    out.push_str("<h2>FINAL BUY/HOLD/SELL RECOMMENDATION</h2>");
    labeled(&mut out, "Recommendation", &field(&report.recommendation.call));
    labeled(&mut out, "Reasoning", &field(&report.recommendation.reasoning));

    out.push_str("<h2>RISK FACTORS</h2>");
    for factor in &report.risk_factors {
        let _ = write!(out, "<p>&bull; {}</p>", text(factor));
    }

    scenario_box(&mut out, "BULL CASE SCENARIO", &report.bull_case);
    scenario_box(&mut out, "BEAR CASE SCENARIO", &report.bear_case);

    let investors = &report.investor_recommendations;
    out.push_str("<h2>INVESTOR RECOMMENDATIONS</h2><div class=\"container\">");
    for (heading, value) in [
        ("Conservative Investors", &investors.conservative_investors),
        ("Moderate Investors", &investors.moderate_investors),
        ("Aggressive Investors", &investors.aggressive_investors),
    ] {
        let _ = write!(out, "<div class=\"box\"><h3>{heading}</h3><p>{}</p></div>", field(value));
    }
    out.push_str("</div>");

    out
}

/// Escaped paragraphs for text that is not a structured report.
pub fn render_text_html(text: &str) -> String {
    let mut out = String::new();
    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let lines: Vec<String> = block.lines().map(|l| escape_html(l.trim())).collect();
        let _ = write!(out, "<p>{}</p>", lines.join("<br>"));
    }
    out
}

/// Price header shown above the report.
pub fn price_message_html(quote: &QuoteSummary) -> String {
    let mut out = String::new();
    match quote.effective_price() {
        Some((price, fallback)) => {
            let _ = write!(
                out,
                "<p class='text-light'><strong>Live Stock Price:</strong> ${price:.2}</p>"
            );
            if fallback {
                out.push_str("<p class='text-warning'><em>Note: Real-time price data unavailable. Using last closing price instead.</em></p>");
            }
        }
        None => out.push_str("<p class='text-warning'><strong>Stock Price Unavailable</strong></p>"),
    }
    if let Some(after_hours) = quote.post_market_price.filter(|p| *p > 0.0) {
        let _ = write!(
            out,
            "<p class='text-light'><strong>After-Hours Price:</strong> ${after_hours:.2}</p>"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("  {\"b\":2} "), "{\"b\":2}");
    }

    #[test]
    fn structured_output_renders_all_sections() {
        let raw = json!({
            "Company Overview": {
                "Market Cap": "$2.9T",
                "Sector": "Technology",
                "Key Financials": { "Revenue (TTM)": "$383B", "EPS (TTM)": 6.13 }
            },
            "Stock Performance": { "Current Price": "$189.30", "52-Week Range": "$164 - $199" },
            "Recent News": [
                { "News 1": "Apple ships", "Summary": "Sales up", "Source": "Reuters", "Source Link": "https://reuters.com/a" },
                { "Summary": "Second", "Source": "Blog", "Source Link": "javascript:alert(1)" }
            ],
            "Analyst Ratings": { "Analyst Consensus": "Buy" },
            "Technical Trend Analysis": { "50-Day Moving Average": "$185" },
            "Final Buy/Hold/Sell Recommendation": { "Recommendation": "Hold" },
            "risk_factors": ["Regulation <EU>", "Supply chain"],
            "bull_case": { "scenario": "Services grow", "price_target": "$230" },
            "investor_recommendations": { "moderate_investors": "Accumulate" }
        });
        let content = format!("```json\n{raw}\n```");
        let narrative = Narrative::from_model_output(&content);
        assert_eq!(narrative.raw_json(), Some(raw));

        let html = narrative.to_html();
        for heading in [
            "COMPANY OVERVIEW",
            "Key Financials",
            "STOCK PERFORMANCE",
            "ANALYST RATINGS &amp; TECHNICAL TREND ANALYSIS",
            "RECENT NEWS",
            "FINAL BUY/HOLD/SELL RECOMMENDATION",
            "RISK FACTORS",
            "BULL CASE SCENARIO",
            "BEAR CASE SCENARIO",
            "INVESTOR RECOMMENDATIONS",
        ] {
            assert!(html.contains(heading), "missing {heading}");
        }
        assert!(html.contains("<p><strong>Sector:</strong> Technology</p>"));
        assert!(html.contains("<p><strong>Industry:</strong> N/A</p>"));
        assert!(html.contains("<p><strong>EPS (TTM):</strong> 6.13</p>"));
        assert!(html.contains("<p><strong>52-Week Range:</strong> $164 - $199</p>"));
        assert!(html.contains("<h3>News 1</h3>"));
        assert!(html.contains("href=\"https://reuters.com/a\""));
        assert!(html.contains("<a href=\"#\" target=\"_blank\">Blog</a>"));
        assert!(html.contains("Regulation &lt;EU&gt;"));
        assert!(html.contains("<h3>Conservative Investors</h3><p>N/A</p>"));
        assert!(html.contains("<h3>Moderate Investors</h3><p>Accumulate</p>"));
    }

    #[test]
    fn unparseable_output_becomes_escaped_paragraphs() {
        let narrative =
            Narrative::from_model_output("Apple looks <strong>fine</strong>.\n\nRevenue: Not explicitly provided in the tool output.");
        assert_eq!(narrative.raw_json(), None);
        let html = narrative.to_html();
        assert_eq!(
            html,
            "<p>Apple looks &lt;strong&gt;fine&lt;/strong&gt;.</p><p>Revenue: Not available but will continue fetching other relevant data...</p>"
        );
    }

    #[test]
    fn wrong_shape_json_falls_back_to_text() {
        let narrative = Narrative::from_model_output("{\"Company Overview\": \"big\"}");
        assert!(matches!(narrative, Narrative::Freeform(_)));
    }

    #[test]
    fn price_message_variants() {
        let live = QuoteSummary {
            regular_market_price: Some(189.321),
            post_market_price: Some(190.0),
            ..Default::default()
        };
        let html = price_message_html(&live);
        assert!(html.contains("<strong>Live Stock Price:</strong> $189.32"));
        assert!(html.contains("<strong>After-Hours Price:</strong> $190.00"));
        assert!(!html.contains("Note:"));

        let closed = QuoteSummary {
            previous_close: Some(101.5),
            ..Default::default()
        };
        let html = price_message_html(&closed);
        assert!(html.contains("$101.50"));
        assert!(html.contains("Using last closing price instead."));

        assert!(price_message_html(&QuoteSummary::default()).contains("Stock Price Unavailable"));
    }
}
