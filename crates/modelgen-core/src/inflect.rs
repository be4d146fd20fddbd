//! English inflection for identifier derivation.
//!
//! Rule tables, not a grammar: database identifiers are a narrow dialect and
//! the tables below cover what real schemas use. Multi-word snake_case names
//! inflect their final segment only (`user_roles` → `user_role`).

/// Words with no distinct plural form.
const UNCOUNTABLE: &[&str] = &[
    "aircraft",
    "bison",
    "deer",
    "equipment",
    "fish",
    "information",
    "money",
    "moose",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
    "swine",
];

/// (singular, plural) pairs the suffix rules get wrong.
const IRREGULAR: &[(&str, &str)] = &[
    ("analysis", "analyses"),
    ("axis", "axes"),
    ("basis", "bases"),
    ("child", "children"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("echo", "echoes"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("house", "houses"),
    ("index", "indices"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("medium", "media"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("ox", "oxen"),
    ("person", "people"),
    ("potato", "potatoes"),
    ("quiz", "quizzes"),
    ("shelf", "shelves"),
    ("tomato", "tomatoes"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Pluralize the final segment of a snake_case identifier.
#[must_use]
pub fn pluralize(identifier: &str) -> String {
    inflect_last_segment(identifier, pluralize_word)
}

/// Singularize the final segment of a snake_case identifier.
#[must_use]
pub fn singularize(identifier: &str) -> String {
    inflect_last_segment(identifier, singularize_word)
}

fn inflect_last_segment(identifier: &str, f: fn(&str) -> String) -> String {
    match identifier.rfind('_') {
        Some(pos) => format!("{}{}", &identifier[..=pos], f(&identifier[pos + 1..])),
        None => f(identifier),
    }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, p)| *p == word) {
        // already plural
        return word.to_string();
    }

    if ["s", "sh", "ch", "x", "z"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
        return (*singular).to_string();
    }
    if IRREGULAR.iter().any(|(s, _)| *s == word) {
        // already singular
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }

    let es_suffixes = ["sses", "shes", "ches", "xes", "zes", "ses"];
    if es_suffixes.iter().any(|s| word.ends_with(s)) {
        if let Some(stem) = word.strip_suffix("es") {
            return stem.to_string();
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    word.strip_suffix('s').map_or_else(|| word.to_string(), ToString::to_string)
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
