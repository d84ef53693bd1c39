//! Amount formatting for finding descriptions

/// Format a whole amount with thousands separators: 1234.6 -> "1,235"
pub fn whole(val: f64) -> String {
    let rounded = crate::aggregate::round_half_up(val);
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}")
    } else {
        with_commas
    }
}

/// Format an amount with a currency symbol prefix: ("₪", 1234.0) -> "₪1,234"
pub fn money(symbol: &str, val: f64) -> String {
    format!("{symbol}{}", whole(val))
}
