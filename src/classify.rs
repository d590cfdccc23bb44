use std::sync::OnceLock;

use regex::Regex;

// Masks are applied independently per metric; a label may match several
// categories and no strict partition is enforced.

fn revenue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^revenue$|\brevenue\b|\bsales\b|\bturnover\b|\bnet revenue\b|\btotal revenue\b")
            .unwrap()
    })
}

fn cogs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^cogs$|\bcogs\b|\bcost of goods\b|\bcost of sales\b").unwrap()
    })
}

fn opex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^opex|\bopex\b|\boperating exp|\bexpenses?\b|\bsg&a\b|\bg&a\b|\bsga\b")
            .unwrap()
    })
}

pub fn is_revenue(account_norm: &str) -> bool {
    revenue_re().is_match(account_norm)
}

pub fn is_cogs(account_norm: &str) -> bool {
    cogs_re().is_match(account_norm)
}

pub fn is_opex(account_norm: &str) -> bool {
    opex_re().is_match(account_norm)
}

/// Sub-category of an opex account label, for breakdown reporting.
/// "Opex:Marketing" → "Marketing"; SG&A variants collapse to "SG&A";
/// "Operating Expenses - Travel" → "Operating Expenses"; anything else is
/// returned unchanged.
pub fn opex_category(account: &str) -> String {
    if let Some((prefix, rest)) = account.split_once(':') {
        if prefix.trim().to_lowercase().starts_with("opex") {
            let category = rest.trim();
            return if category.is_empty() {
                "Other".to_string()
            } else {
                category.to_string()
            };
        }
    }
    let lower = account.to_lowercase();
    if lower.contains("sg&a") || lower.contains("sga") {
        return "SG&A".to_string();
    }
    if lower.contains("operating exp") {
        return "Operating Expenses".to_string();
    }
    account.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_mask() {
        assert!(is_revenue("revenue"));
        assert!(is_revenue("net revenue"));
        assert!(is_revenue("total revenue (usd)"));
        assert!(is_revenue("product sales"));
        assert!(is_revenue("turnover"));
        assert!(!is_revenue("cogs"));
        assert!(!is_revenue("salesforce subscription")); // no whole-word match
    }

    #[test]
    fn test_cogs_mask() {
        assert!(is_cogs("cogs"));
        assert!(is_cogs("cost of goods sold"));
        assert!(is_cogs("cost of sales"));
        assert!(!is_cogs("cost center"));
        assert!(!is_cogs("revenue"));
    }

    #[test]
    fn test_opex_mask() {
        assert!(is_opex("opex"));
        assert!(is_opex("opex:marketing")); // prefix match
        assert!(is_opex("operating expenses"));
        assert!(is_opex("operating exp."));
        assert!(is_opex("travel expense"));
        assert!(is_opex("expenses"));
        assert!(is_opex("sg&a"));
        assert!(is_opex("g&a"));
        assert!(is_opex("sga"));
        assert!(!is_opex("revenue"));
        assert!(!is_opex("cogs"));
    }

    #[test]
    fn test_masks_are_not_mutually_exclusive() {
        assert!(is_revenue("revenue opex adjustment"));
        assert!(is_opex("revenue opex adjustment"));
    }

    #[test]
    fn test_opex_category_colon_prefix() {
        assert_eq!(opex_category("Opex:Marketing"), "Marketing");
        assert_eq!(opex_category("opex : Admin"), "Admin");
        assert_eq!(opex_category("Opex:"), "Other");
        assert_eq!(opex_category("Opex:  "), "Other");
        // Colon without an opex prefix is left alone
        assert_eq!(opex_category("Travel: Air"), "Travel: Air");
    }

    #[test]
    fn test_opex_category_keyword_collapse() {
        assert_eq!(opex_category("SG&A"), "SG&A");
        assert_eq!(opex_category("Total SGA"), "SG&A");
        assert_eq!(opex_category("Operating Expenses - Travel"), "Operating Expenses");
    }

    #[test]
    fn test_opex_category_passthrough() {
        assert_eq!(opex_category("Marketing"), "Marketing");
    }
}
