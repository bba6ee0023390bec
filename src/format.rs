/// Format a value the way the dashboards print it: dot as thousands
/// separator, comma before exactly two decimal places
/// (`1000000` → `"1.000.000,00"`).
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!(
        "{}{},{:02}",
        if negative { "-" } else { "" },
        grouped,
        frac
    )
}
