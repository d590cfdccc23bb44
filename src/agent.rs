use std::sync::OnceLock;

use regex::Regex;

/// What a question is asking for, with any parameters pulled out of the text.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    RevenueVsBudget { month_text: Option<String> },
    GrossMarginTrend { months: u32, end_text: Option<String> },
    OpexBreakdown { month_text: Option<String> },
    CashRunway,
    Ebitda { month_text: Option<String> },
    Unknown,
}

const DEFAULT_TREND_MONTHS: u32 = 3;

fn month_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let month_names = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
        Regex::new(&format!(
            r"(?i)\b{month_names}\s+\d{{4}}|\d{{4}}[-/]\d{{1,2}}|\d{{1,2}}[-/]\d{{4}}"
        ))
        .unwrap()
    })
}

fn window_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"last\s+(\d+)\s+months?").unwrap())
}

/// Pull a month reference ("June 2025", "2025-06", "06/2025") out of free
/// text, if any.
pub fn extract_month_text(text: &str) -> Option<String> {
    month_text_re().find(text).map(|m| m.as_str().to_string())
}

fn extract_window(q: &str) -> Option<u32> {
    window_re()
        .captures(q)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn classify(question: &str) -> Intent {
    let q = question.to_lowercase();
    let month_text = extract_month_text(question);

    if (q.contains("revenue") && q.contains("budget")) || q.contains("vs budget") {
        return Intent::RevenueVsBudget { month_text };
    }
    if q.contains("gross") && q.contains("margin") {
        return Intent::GrossMarginTrend {
            months: extract_window(&q).unwrap_or(DEFAULT_TREND_MONTHS),
            end_text: month_text,
        };
    }
    if q.contains("opex")
        && (q.contains("breakdown") || q.contains("by category") || q.contains("categories"))
    {
        return Intent::OpexBreakdown { month_text };
    }
    if q.contains("cash") && q.contains("runway") {
        return Intent::CashRunway;
    }
    if q.contains("ebitda") {
        return Intent::Ebitda { month_text };
    }
    Intent::Unknown
}
