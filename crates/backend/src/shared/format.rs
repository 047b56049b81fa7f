/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```ignore
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Вес в формате pt-BR: тысячи через точку, два знака после запятой
pub fn format_weight(weight: f64) -> String {
    let cents = (weight.max(0.0) * 100.0).round() as u64;
    format!(
        "{},{:02}",
        format_number((cents / 100) as usize),
        cents % 100
    )
}
