//! Program image assembly.
//!
//! A program image is laid out as: package clause, imports, type
//! declarations, package variables, functions, then `func main`.

use crate::imports::{render_import_decl, ImportMode};

const INDENT: &str = "    ";

/// Entry-point statement for a just-defined type.
pub const TYPE_DEFINED: &str = r#"fmt.Println("Type defined successfully")"#;

/// Entry-point statement for a just-defined function.
pub const FUNCTION_DEFINED: &str = r#"fmt.Println("Function defined successfully")"#;

/// Entry-point statement echoing a just-declared variable's value.
pub fn variable_declared(name: &str) -> String {
    format!(r#"fmt.Printf("Variable declared: %v\n", {name})"#)
}

/// The layers of one program image, borrowed from the session stores.
#[derive(Debug, Clone, Default)]
pub struct ProgramImage<'a> {
    pub types: Vec<&'a str>,
    pub package_vars: Vec<&'a str>,
    pub functions: Vec<&'a str>,
    pub main_body: Vec<String>,
}

impl ProgramImage<'_> {
    /// Render to Go source. Empty layers are left out.
    pub fn render(&self, imports: ImportMode) -> String {
        let mut decls = String::new();
        for layer in [&self.types, &self.package_vars, &self.functions] {
            if !layer.is_empty() {
                decls.push_str(&layer.join("\n"));
                decls.push_str("\n\n");
            }
        }

        decls.push_str("func main() {\n");
        for stmt in &self.main_body {
            decls.push_str(INDENT);
            decls.push_str(stmt);
            decls.push('\n');
        }
        decls.push_str("}\n");

        let mut out = String::from("package main\n\n");
        if let Some(import_decl) = render_import_decl(&imports.resolve(&decls)) {
            out.push_str(&import_decl);
            out.push_str("\n\n");
        }
        out.push_str(&decls);
        out
    }
}
