//! Разбор чисел в формате pt-BR: точка отделяет тысячи, запятая десятичная.

/// Вес: оставляем только цифры и запятые, первая запятая становится точкой.
/// Любая ошибка разбора дает 0.
pub fn parse_weight(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    cleaned
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Количество коробок: оставляем только цифры. Любая ошибка разбора дает 0.
pub fn parse_box_count(text: &str) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().unwrap_or(0)
}
