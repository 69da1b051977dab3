use heck::ToUpperCamelCase;

/// Name-transformation collaborator used by the locator.
pub trait Inflector {
    fn singularize(&self, word: &str) -> String;

    fn pluralize(&self, word: &str) -> String;

    /// Class-name form of an alias: singular, UpperCamelCase.
    fn classify(&self, word: &str) -> String {
        self.singularize(word).to_upper_camel_case()
    }
}

// ─── DefaultInflector ───────────────────────────────────────────────────────

/// Regular English rules plus a short irregular/uncountable list. Only the
/// last word of a compound (`user_profiles`, `MockEntities`) is inflected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInflector;

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "media",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

impl Inflector for DefaultInflector {
    fn singularize(&self, word: &str) -> String {
        let lower = word.to_ascii_lowercase();
        if let Some(out) = inflect_special(word, &lower, |(singular, plural)| (plural, singular)) {
            return out;
        }

        if let Some(stem) = lower.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{}y", &word[..stem.len()]);
            }
        }
        // bus/buses, status/statuses; house/houses keeps its e
        if let Some(stem) = lower.strip_suffix("uses") {
            let consonant = stem
                .chars()
                .last()
                .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
            if consonant {
                return word[..word.len() - 2].to_owned();
            }
        }
        for suffix in ["sses", "shes", "ches", "xes", "zes"] {
            if lower.ends_with(suffix) {
                return word[..word.len() - 2].to_owned();
            }
        }
        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return word.to_owned();
        }
        match lower.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => word[..stem.len()].to_owned(),
            _ => word.to_owned(),
        }
    }

    fn pluralize(&self, word: &str) -> String {
        let lower = word.to_ascii_lowercase();
        if let Some(out) = inflect_special(word, &lower, |pair| pair) {
            return out;
        }

        if let Some(stem) = lower.strip_suffix('y') {
            let consonant = stem
                .chars()
                .last()
                .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
            if consonant {
                return format!("{}ies", &word[..stem.len()]);
            }
        }
        if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
            return format!("{word}es");
        }
        if word.is_empty() {
            return String::new();
        }
        format!("{word}s")
    }
}

/// Irregular and uncountable words. `direction` maps a `(singular, plural)`
/// pair to `(from, to)`.
fn inflect_special(
    word: &str,
    lower: &str,
    direction: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Option<String> {
    for uncountable in UNCOUNTABLE {
        if ends_with_word(word, lower, uncountable) {
            return Some(word.to_owned());
        }
    }
    for &pair in IRREGULAR {
        let (from, to) = direction(pair);
        if ends_with_word(word, lower, from) {
            let prefix = &word[..word.len() - from.len()];
            let tail = &word[prefix.len()..];
            return Some(format!("{prefix}{}", match_case(to, tail)));
        }
    }
    None
}

/// `lower` ends with `suffix` and the suffix starts a word in `word`
/// (at the start, after `_`, or at an uppercase letter).
fn ends_with_word(word: &str, lower: &str, suffix: &str) -> bool {
    if !lower.ends_with(suffix) {
        return false;
    }
    let start = word.len() - suffix.len();
    start == 0
        || word[..start].ends_with('_')
        || word[start..].starts_with(|c: char| c.is_ascii_uppercase())
}

fn match_case(replacement: &str, original: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(o), Some(first)) if o.is_ascii_uppercase() => {
            format!("{}{}", first.to_ascii_uppercase(), chars.as_str())
        }
        _ => replacement.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_regular() {
        let inflector = DefaultInflector;
        assert_eq!(inflector.pluralize("user"), "users");
        assert_eq!(inflector.pluralize("MockEntity"), "MockEntities");
        assert_eq!(inflector.pluralize("day"), "days");
        assert_eq!(inflector.pluralize("box"), "boxes");
        assert_eq!(inflector.pluralize("Match"), "Matches");
    }

    #[test]
    fn test_singularize_regular() {
        let inflector = DefaultInflector;
        assert_eq!(inflector.singularize("users"), "user");
        assert_eq!(inflector.singularize("MockEntities"), "MockEntity");
        assert_eq!(inflector.singularize("boxes"), "box");
        assert_eq!(inflector.singularize("addresses"), "address");
        assert_eq!(inflector.singularize("address"), "address");
        assert_eq!(inflector.singularize("status"), "status");
    }

    #[test]
    fn test_singularize_us_endings() {
        let inflector = DefaultInflector;
        assert_eq!(inflector.singularize("buses"), "bus");
        assert_eq!(inflector.singularize("statuses"), "status");
        assert_eq!(inflector.singularize("OrderStatuses"), "OrderStatus");
        assert_eq!(inflector.singularize("houses"), "house");
        assert_eq!(inflector.singularize("causes"), "cause");
        assert_eq!(inflector.classify("order_statuses"), "OrderStatus");
    }

    #[test]
    fn test_irregular_and_uncountable() {
        let inflector = DefaultInflector;
        assert_eq!(inflector.pluralize("Person"), "People");
        assert_eq!(inflector.singularize("SalesPeople"), "SalesPerson");
        assert_eq!(inflector.singularize("user_children"), "user_child");
        assert_eq!(inflector.pluralize("news"), "news");
        // "Human" does not end in the word "man"
        assert_eq!(inflector.pluralize("Human"), "Humans");
    }

    #[test]
    fn test_classify() {
        let inflector = DefaultInflector;
        assert_eq!(inflector.classify("user_profiles"), "UserProfile");
        assert_eq!(inflector.classify("MockEntities"), "MockEntity");
        assert_eq!(inflector.classify("categories"), "Category");
    }
}
