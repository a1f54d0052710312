//! Built-in scan universe
//!
//! A process-wide immutable reference table of large-cap US tickers used
//! as the default bulk-scan universe. Callers with their own universe
//! simply pass whatever symbol list they like to the scanner; nothing in
//! the core depends on this table.

/// Default S&P 500 large-cap universe.
pub static SP500: &[&str] = &[
    "AAPL", "ABBV", "ABT", "ACN", "ADBE", "ADI", "ADM", "ADP", "ADSK", "AMD", "AMGN", "AMZN",
    "ANET", "ANSS", "AON", "APD", "APH", "AVGO", "AXP", "BA", "BAC", "BDX", "BIIB", "BK",
    "BKNG", "BLK", "BMY", "BRK.B", "BSX", "C", "CAT", "CB", "CCI", "CDNS", "CHTR", "CI",
    "CL", "CMCSA", "CME", "CMG", "COP", "COST", "CRM", "CSCO", "CSX", "CVS", "CVX", "D",
    "DE", "DHR", "DIS", "DUK", "EA", "ECL", "EL", "EMR", "EOG", "EQIX", "EW", "EXC", "F",
    "FDX", "FIS", "GILD", "GM", "GOOG", "GOOGL", "GPN", "GS", "HD", "HON", "IBM", "ICE",
    "INTC", "INTU", "ISRG", "ITW", "JNJ", "JPM", "KO", "LIN", "LLY", "LMT", "LOW", "MA",
    "MCD", "MDLZ", "MDT", "MET", "META", "MMC", "MMM", "MO", "MRK", "MS", "MSFT", "NEE",
    "NFLX", "NKE", "NOW", "NSC", "NVDA", "ORCL", "PEP", "PFE", "PG", "PGR", "PLD", "PM",
    "PNC", "PYPL", "QCOM", "REGN", "RTX", "SBUX", "SCHW", "SHW", "SLB", "SO", "SPGI", "SYK",
    "T", "TGT", "TJX", "TMO", "TMUS", "TSLA", "TXN", "UNH", "UNP", "UPS", "USB", "V", "VZ",
    "WBA", "WFC", "WMT", "XOM", "ZTS",
];

/// Whether a symbol belongs to the built-in universe.
pub fn is_member(symbol: &str) -> bool {
    SP500.contains(&symbol)
}

/// Universe members starting with the given prefix, case-sensitive,
/// capped at `limit`. Mirrors the ticker-search fallback used when no
/// external search provider is wired up.
pub fn search_prefix(prefix: &str, limit: usize) -> Vec<&'static str> {
    SP500.iter().filter(|t| t.starts_with(prefix)).take(limit).copied().collect()
}
