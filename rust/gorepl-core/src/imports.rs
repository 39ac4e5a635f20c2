//! Import resolution for synthesized programs.

use serde::{Deserialize, Serialize};

/// How the import declaration of a program image is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Import exactly the known packages the code refers to.
    #[default]
    Dynamic,
    /// Always import `fmt` and nothing else.
    Fixed,
}

/// Packages recognised by qualifier: (qualifier, import path).
pub const KNOWN_PACKAGES: &[(&str, &str)] = &[
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("errors", "errors"),
    ("fmt", "fmt"),
    ("maps", "maps"),
    ("math", "math"),
    ("rand", "math/rand"),
    ("os", "os"),
    ("regexp", "regexp"),
    ("slices", "slices"),
    ("sort", "sort"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("time", "time"),
    ("unicode", "unicode"),
];

const FIXED_IMPORTS: &[&str] = &["fmt"];

impl ImportMode {
    /// Import paths for `code`, sorted and deduplicated.
    pub fn resolve(self, code: &str) -> Vec<&'static str> {
        match self {
            ImportMode::Fixed => FIXED_IMPORTS.to_vec(),
            ImportMode::Dynamic => detect_imports(code),
        }
    }
}

/// Scan `code` for `pkg.` qualifiers of known packages. Text inside string
/// and rune literals and `//` comments is not scanned.
pub fn detect_imports(code: &str) -> Vec<&'static str> {
    let code = blank_literals(code);
    let mut paths: Vec<&'static str> = KNOWN_PACKAGES
        .iter()
        .filter(|(qualifier, _)| mentions_qualifier(&code, qualifier))
        .map(|(_, path)| *path)
        .collect();
    paths.sort_unstable();
    paths.dedup();
    paths
}

/// True when `qualifier.` occurs at an identifier boundary.
fn mentions_qualifier(code: &str, qualifier: &str) -> bool {
    let needle = format!("{qualifier}.");
    code.match_indices(&needle).any(|(idx, _)| {
        code[..idx]
            .chars()
            .next_back()
            .map_or(true, |prev| !(prev.is_alphanumeric() || prev == '_' || prev == '.'))
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Code,
    Interpreted(char),
    Raw,
    Comment,
}

/// Copy of `code` with the contents of literals and line comments replaced
/// by spaces. Delimiters and newlines are kept.
fn blank_literals(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut state = Lexeme::Code;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Lexeme::Code => {
                match c {
                    '"' | '\'' => state = Lexeme::Interpreted(c),
                    '`' => state = Lexeme::Raw,
                    '/' if chars.peek() == Some(&'/') => state = Lexeme::Comment,
                    _ => {}
                }
                out.push(c);
            }
            Lexeme::Interpreted(quote) => {
                if c == '\\' {
                    out.push(' ');
                    if chars.next().is_some() {
                        out.push(' ');
                    }
                } else if c == quote || c == '\n' {
                    state = Lexeme::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            Lexeme::Raw => {
                if c == '`' {
                    state = Lexeme::Code;
                    out.push(c);
                } else {
                    out.push(if c == '\n' { c } else { ' ' });
                }
            }
            Lexeme::Comment => {
                if c == '\n' {
                    state = Lexeme::Code;
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
        }
    }
    out
}

/// Render an import declaration; `None` when there is nothing to import.
pub fn render_import_decl(paths: &[&str]) -> Option<String> {
    match paths {
        [] => None,
        [single] => Some(format!("import \"{single}\"")),
        many => {
            let mut decl = String::from("import (\n");
            for path in many {
                decl.push_str(&format!("    \"{path}\"\n"));
            }
            decl.push(')');
            Some(decl)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_qualified_calls() {
        assert_eq!(detect_imports("fmt.Println(1)"), vec!["fmt"]);
        assert_eq!(
            detect_imports("fmt.Println(strings.ToUpper(s), math.Pi)"),
            vec!["fmt", "math", "strings"]
        );
        assert_eq!(detect_imports("n := rand.Intn(3)"), vec!["math/rand"]);
    }

    #[test]
    fn ignores_qualifiers_inside_longer_identifiers() {
        assert!(detect_imports("myfmt.Println(1)").is_empty());
        assert!(detect_imports("p.os.Exit(1)").is_empty());
        assert!(detect_imports("x := 5").is_empty());
    }

    #[test]
    fn qualifier_at_start_of_text_counts() {
        assert_eq!(detect_imports("os.Exit(0)"), vec!["os"]);
        assert_eq!(detect_imports("(time.Second)"), vec!["time"]);
    }

    #[test]
    fn qualifiers_inside_literals_are_ignored() {
        assert_eq!(
            detect_imports(r#"fmt.Println("see os.Args")"#),
            vec!["fmt"]
        );
        assert_eq!(
            detect_imports("fmt.Println(`time.Now()\nstrings.Fields`)"),
            vec!["fmt"]
        );
        assert_eq!(
            detect_imports(r#"fmt.Println("quote \" os.Exit", strings.TrimSpace(s))"#),
            vec!["fmt", "strings"]
        );
        assert!(detect_imports("r := '.'").is_empty());
        assert!(detect_imports("x := 1 // then os.Exit(0)").is_empty());
    }

    #[test]
    fn code_after_a_literal_is_still_scanned() {
        assert_eq!(
            detect_imports("s := \"a\"\nos.Exit(len(s))"),
            vec!["os"]
        );
        assert_eq!(
            detect_imports("u := \"http://x\"; fmt.Println(u)"),
            vec!["fmt"]
        );
    }

    #[test]
    fn fixed_mode_always_imports_fmt() {
        assert_eq!(ImportMode::Fixed.resolve("strings.ToUpper(s)"), vec!["fmt"]);
        assert_eq!(ImportMode::Fixed.resolve(""), vec!["fmt"]);
    }

    #[test]
    fn renders_import_declarations() {
        assert_eq!(render_import_decl(&[]), None);
        assert_eq!(
            render_import_decl(&["fmt"]).as_deref(),
            Some("import \"fmt\"")
        );
        assert_eq!(
            render_import_decl(&["fmt", "strings"]).as_deref(),
            Some("import (\n    \"fmt\"\n    \"strings\"\n)")
        );
    }
}
