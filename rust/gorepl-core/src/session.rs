//! Declaration stores and program synthesis.
//!
//! A [`Session`] keeps every accepted fragment in one of four ordered,
//! append-only stores and renders a complete program for each new fragment
//! by layering the stores beneath it.

use std::fmt;

use tracing::debug;

use crate::classify::{classify, Category};
use crate::error::SynthError;
use crate::imports::ImportMode;
use crate::render::{variable_declared, ProgramImage, FUNCTION_DEFINED, TYPE_DEFINED};

/// One of the session's declaration stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    Types,
    PackageVars,
    Functions,
    LocalVars,
}

impl Store {
    pub const ALL: [Store; 4] = [
        Store::Types,
        Store::PackageVars,
        Store::Functions,
        Store::LocalVars,
    ];

    /// The store a category persists into; statements are not stored.
    pub fn for_category(category: Category) -> Option<Store> {
        match category {
            Category::TypeDecl => Some(Store::Types),
            Category::PackageVar => Some(Store::PackageVars),
            Category::FunctionDecl => Some(Store::Functions),
            Category::LocalVarDecl => Some(Store::LocalVars),
            Category::Statement => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Store::Types => "types",
            Store::PackageVars => "package vars",
            Store::Functions => "functions",
            Store::LocalVars => "local vars",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified fragment and the program synthesized for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub category: Category,
    pub program: String,
}

/// Accumulated REPL state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    types: Vec<String>,
    package_vars: Vec<String>,
    functions: Vec<String>,
    local_vars: Vec<String>,
    imports: ImportMode,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imports(imports: ImportMode) -> Self {
        Self {
            imports,
            ..Self::default()
        }
    }

    pub fn import_mode(&self) -> ImportMode {
        self.imports
    }

    /// Forget every accepted fragment.
    pub fn reset(&mut self) {
        for store in Store::ALL {
            self.store_mut(store).clear();
        }
    }

    pub fn store(&self, store: Store) -> &[String] {
        match store {
            Store::Types => &self.types,
            Store::PackageVars => &self.package_vars,
            Store::Functions => &self.functions,
            Store::LocalVars => &self.local_vars,
        }
    }

    fn store_mut(&mut self, store: Store) -> &mut Vec<String> {
        match store {
            Store::Types => &mut self.types,
            Store::PackageVars => &mut self.package_vars,
            Store::Functions => &mut self.functions,
            Store::LocalVars => &mut self.local_vars,
        }
    }

    pub fn is_empty(&self) -> bool {
        Store::ALL.iter().all(|store| self.store(*store).is_empty())
    }

    /// Classify `fragment`, store it, and return the program to run.
    ///
    /// Rejected input leaves the stores untouched.
    pub fn submit(&mut self, fragment: &str) -> Result<Submission, SynthError> {
        let submission = self.render(fragment)?;
        if let Some(store) = Store::for_category(submission.category) {
            self.store_mut(store).push(fragment.to_string());
            debug!(
                %store,
                len = self.store(store).len(),
                "persisted fragment"
            );
        }
        Ok(submission)
    }

    /// Remove the most recent fragment of `category`, if any was stored.
    pub fn retract(&mut self, category: Category) -> Option<String> {
        let store = Store::for_category(category)?;
        let removed = self.store_mut(store).pop();
        if removed.is_some() {
            debug!(%store, "retracted fragment");
        }
        removed
    }

    /// Synthesize the program for `fragment` on top of the current stores,
    /// without modifying them.
    pub fn render(&self, fragment: &str) -> Result<Submission, SynthError> {
        let category = classify(fragment);
        debug!(%category, "classified fragment");

        let mut image = ProgramImage {
            types: borrow_all(&self.types),
            package_vars: borrow_all(&self.package_vars),
            functions: borrow_all(&self.functions),
            main_body: Vec::new(),
        };

        match category {
            Category::TypeDecl => {
                image.types.push(fragment);
                image.main_body.push(TYPE_DEFINED.to_string());
            }
            Category::PackageVar => {
                let name = package_var_name(fragment)?;
                image.package_vars.push(fragment);
                image.main_body.push(variable_declared(name));
            }
            Category::FunctionDecl => {
                image.functions.push(fragment);
                image.main_body.push(FUNCTION_DEFINED.to_string());
            }
            Category::LocalVarDecl => {
                image.main_body.extend(self.local_vars.iter().cloned());
                image.main_body.push(fragment.to_string());
                image.main_body.push(variable_declared(local_var_name(fragment)));
            }
            Category::Statement => {
                image.main_body.extend(self.local_vars.iter().cloned());
                image.main_body.push(fragment.to_string());
            }
        }

        Ok(Submission {
            category,
            program: image.render(self.imports),
        })
    }

    /// The program the current stores amount to, with no new fragment:
    /// declarations plus the local bindings inside `main`.
    pub fn snapshot(&self) -> String {
        ProgramImage {
            types: borrow_all(&self.types),
            package_vars: borrow_all(&self.package_vars),
            functions: borrow_all(&self.functions),
            main_body: self.local_vars.clone(),
        }
        .render(self.imports)
    }
}

fn borrow_all(store: &[String]) -> Vec<&str> {
    store.iter().map(String::as_str).collect()
}

/// Name declared by `var name ...`, taken from the text before any `=`.
///
/// Only the name list is checked for commas; the type that follows may
/// contain its own (`var f func(a, b int)`).
pub fn package_var_name(fragment: &str) -> Result<&str, SynthError> {
    let trimmed = fragment.trim();
    let rest = trimmed.strip_prefix("var ").unwrap_or(trimmed).trim_start();
    let head = rest.split('=').next().unwrap_or("");
    let mut tokens = head.split_whitespace();
    let Some(name) = tokens.next() else {
        return Err(SynthError::UnnamedVar(trimmed.to_string()));
    };
    let continues_list = tokens.next().is_some_and(|next| next.starts_with(','));
    if name.contains(',') || continues_list {
        return Err(SynthError::MultiNameVar(trimmed.to_string()));
    }
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(SynthError::UnnamedVar(trimmed.to_string()))
    }
}

/// Everything left of the first `:=`, trimmed.
pub fn local_var_name(fragment: &str) -> &str {
    fragment.split(":=").next().unwrap_or("").trim()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
