//! Small builders for WHERE clause text

use std::fmt::Display;

/// Join conditions with `AND`
pub fn and<S: AsRef<str>>(conditions: &[S]) -> String {
    join(conditions, " AND ")
}

/// Join conditions with `OR`
pub fn or<S: AsRef<str>>(conditions: &[S]) -> String {
    join(conditions, " OR ")
}

/// `<expr> BETWEEN <low> AND <high>`
pub fn between(expr: impl Display, low: impl Display, high: impl Display) -> String {
    format!("{} BETWEEN {} AND {}", expr, low, high)
}

/// Wrap a condition in parentheses, for nesting `or` inside `and`
pub fn group(condition: impl Display) -> String {
    format!("({})", condition)
}

/// Quote an identifier (table or column name) with double quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn join<S: AsRef<str>>(conditions: &[S], sep: &str) -> String {
    conditions
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_or() {
        assert_eq!(and(&["a = 1", "b = 2"]), "a = 1 AND b = 2");
        assert_eq!(or(&["a = 1"]), "a = 1");
        assert_eq!(and::<&str>(&[]), "");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("artists"), "\"artists\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_nested() {
        let clause = and(&[group(or(&["GenreId = 1", "GenreId = 3"])), between("Milliseconds", 1000, 2000)]);
        assert_eq!(
            clause,
            "(GenreId = 1 OR GenreId = 3) AND Milliseconds BETWEEN 1000 AND 2000"
        );
    }
}
