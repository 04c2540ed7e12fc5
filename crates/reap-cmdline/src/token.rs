use std::sync::LazyLock;

use regex::Regex;

/// A run of non-space, non-quote characters, or one complete `"..."` span.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\s"]+|"[^"]*""#).expect("token pattern is valid"));

/// Split a joined command string back into argv-style tokens.
///
/// Quoted spans keep their enclosing quotes; an unterminated `"` is dropped.
pub fn tokenize(command: &str) -> Vec<String> {
    TOKEN
        .find_iter(command)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_runs() {
        assert_eq!(tokenize("  ls   -la\t/tmp  "), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn keeps_quoted_spans_whole() {
        assert_eq!(
            tokenize(r#""C:\Program Files\app.exe" --name "two words""#),
            vec![r#""C:\Program Files\app.exe""#, "--name", r#""two words""#]
        );
    }

    #[test]
    fn quote_terminates_a_bare_run() {
        assert_eq!(tokenize(r#"abc"d e"f"#), vec!["abc", r#""d e""#, "f"]);
    }

    #[test]
    fn unterminated_quote_is_dropped() {
        assert_eq!(tokenize(r#"run "open"#), vec!["run", "open"]);
        assert!(tokenize("\" ").is_empty());
    }

    #[test]
    fn rejoined_plain_tokens_keep_their_boundaries() {
        let tokens = ["java", "-Xmx1g", "-cp", "a.jar:b.jar", "Main", "x=1"];
        assert_eq!(tokenize(&tokens.join(" ")), tokens);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t ").is_empty());
    }
}
