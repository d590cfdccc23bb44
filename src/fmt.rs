use chrono::NaiveDate;

/// Format a float as a whole-dollar amount with thousands separators: $1,234,568
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let whole = format!("{:.0}", val.abs());

    let mut with_commas = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}")
    } else {
        format!("${with_commas}")
    }
}

/// Format a ratio as a signed percentage: +5.0% / -5.0%; "n/a" when undefined.
pub fn pct(val: Option<f64>) -> String {
    match val {
        Some(v) => format!("{:+.1}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Short month label: Jun 2025
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

/// Full month label: June 2025
pub fn month_name(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}
