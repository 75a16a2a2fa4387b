//! Syntax checks for user-supplied locations.
//!
//! These only look at the shape of the input. A latitude of `91` is well-formed and passes.

/// True when `city` has at least two characters after trimming and only contains ASCII
/// letters, whitespace, hyphens and apostrophes.
pub fn is_valid_city_name(city: &str) -> bool {
    let trimmed = city.trim();
    if trimmed.chars().count() < 2 {
        return false;
    }

    trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' || c == '\'')
}

/// Trim, collapse inner whitespace and title-case each word.
pub fn sanitize_city_name(city: &str) -> String {
    city.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut start_of_word = true;
    for c in word.chars() {
        if start_of_word {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        // "saint-denis" -> "Saint-Denis", "l'aquila" -> "L'Aquila"
        start_of_word = !c.is_alphanumeric();
    }
    out
}

/// True when both values look like decimal numbers (`-?\d+(\.\d+)?`).
pub fn is_valid_coordinate(lat: &str, lon: &str) -> bool {
    is_decimal(lat) && is_decimal(lon)
}

fn is_decimal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(int_part) && frac_part.is_none_or(all_digits)
}
