//! Fragment classification by lexical prefix/operator inspection.

use std::fmt;

/// Name of the synthesized entry point. A `func` with exactly this name is
/// not a function declaration; names that merely start with it
/// (`func mainLoop()`) are, unlike a plain `func main` prefix test.
pub const ENTRY_POINT: &str = "main";

/// What kind of Go code a fragment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TypeDecl,
    PackageVar,
    FunctionDecl,
    LocalVarDecl,
    Statement,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::TypeDecl => "type declaration",
            Category::PackageVar => "package variable",
            Category::FunctionDecl => "function declaration",
            Category::LocalVarDecl => "local variable",
            Category::Statement => "statement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Rule {
    category: Category,
    matches: fn(&str) -> bool,
}

/// Ordered rule table; the first matching rule decides.
const RULES: &[Rule] = &[
    Rule {
        category: Category::TypeDecl,
        matches: is_type_decl,
    },
    Rule {
        category: Category::PackageVar,
        matches: is_package_var,
    },
    Rule {
        category: Category::FunctionDecl,
        matches: is_function_decl,
    },
    Rule {
        category: Category::LocalVarDecl,
        matches: is_local_binding,
    },
];

fn is_type_decl(input: &str) -> bool {
    input.starts_with("type ")
}

fn is_package_var(input: &str) -> bool {
    input.starts_with("var ")
}

fn is_local_binding(input: &str) -> bool {
    input.contains(":=")
}

fn is_function_decl(input: &str) -> bool {
    match input.strip_prefix("func ") {
        Some(rest) => function_name(rest) != ENTRY_POINT,
        None => false,
    }
}

/// The identifier between `func ` and the parameter list.
fn function_name(rest: &str) -> &str {
    rest.trim_start()
        .split(|c: char| c == '(' || c == '[' || c.is_whitespace())
        .next()
        .unwrap_or("")
}

/// Classify a fragment. Leading/trailing whitespace is ignored.
pub fn classify(fragment: &str) -> Category {
    let trimmed = fragment.trim();
    RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .map(|rule| rule.category)
        .unwrap_or(Category::Statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_category() {
        assert_eq!(
            classify("type Point struct { X int; Y int }"),
            Category::TypeDecl
        );
        assert_eq!(classify("var g = 10"), Category::PackageVar);
        assert_eq!(
            classify("func add(a, b int) int { return a + b }"),
            Category::FunctionDecl
        );
        assert_eq!(classify("x := 5"), Category::LocalVarDecl);
        assert_eq!(classify("fmt.Println(x)"), Category::Statement);
    }

    #[test]
    fn first_match_wins() {
        // A function body containing `:=` is still a function.
        assert_eq!(
            classify("func f() {\n  y := 2\n}"),
            Category::FunctionDecl
        );
        assert_eq!(
            classify("var s = func() int { x := 1; return x }()"),
            Category::PackageVar
        );
    }

    #[test]
    fn entry_point_is_not_a_function_declaration() {
        assert_eq!(classify("func main() {}"), Category::Statement);
        assert_eq!(
            classify("func main() {\n  x := 1\n}"),
            Category::LocalVarDecl
        );
        assert_eq!(classify("func mainLoop() {}"), Category::FunctionDecl);
        assert_eq!(classify("func (p Point) main() {}"), Category::FunctionDecl);
    }

    #[test]
    fn generic_function_name_is_cut_at_type_params() {
        assert_eq!(function_name("Map[T any](xs []T) {}"), "Map");
        assert_eq!(function_name("main() {}"), "main");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(classify("   type T int\n"), Category::TypeDecl);
        assert_eq!(classify("\n\tvar v int"), Category::PackageVar);
    }

    #[test]
    fn known_false_positive_for_loop_header() {
        // Only the operator is inspected, so loop headers count as bindings.
        assert_eq!(
            classify("for i := 0; i < 3; i++ {\n}"),
            Category::LocalVarDecl
        );
    }

    #[test]
    fn prefixes_need_trailing_space() {
        assert_eq!(classify("typeName()"), Category::Statement);
        assert_eq!(classify("variable++"), Category::Statement);
        assert_eq!(classify("functor()"), Category::Statement);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Category::LocalVarDecl.to_string(), "local variable");
    }
}
