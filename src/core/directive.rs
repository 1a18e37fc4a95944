//! Directive grammar: `[scope:]search=>replace`.
//!
//! Directives arrive as one or more comma-joined strings and are parsed into an
//! ordered list of [`Rule`]s. Order is significant: each rule observes the tree
//! left behind by the rules before it.

use crate::error::{Error, Result};
use std::fmt;

/// Replacement value that deletes the selected declarations.
pub const DELETE_MARKER: &str = "-";

const ARROW: &str = "=>";

/// Which part of a file a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A type name or a free-function name (`List`, `NewList`).
    Named(String),
    /// A method bound to a receiver type (`List.Push`), by value or by pointer.
    Method { type_name: String, method: String },
}

impl Scope {
    fn parse(scope: &str) -> Self {
        match scope.split_once('.') {
            Some((type_name, method)) => Scope::Method {
                type_name: type_name.trim().to_string(),
                method: method.trim().to_string(),
            },
            None => Scope::Named(scope.trim().to_string()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Named(name) => write!(f, "{}", name),
            Scope::Method { type_name, method } => write!(f, "{}.{}", type_name, method),
        }
    }
}

/// An import a qualified replacement needs in order to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub path: String,
    /// Qualifier used in the rewritten identifiers.
    pub alias: String,
}

impl ImportRef {
    /// Whether the import must be written with an explicit name.
    pub fn needs_alias(&self) -> bool {
        base_name(&self.path) != self.alias
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Rename {
        text: String,
        import: Option<ImportRef>,
    },
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub scope: Option<Scope>,
    pub search: String,
    pub replacement: Replacement,
}

impl Rule {
    pub fn is_delete(&self) -> bool {
        matches!(self.replacement, Replacement::Delete)
    }

    pub fn import(&self) -> Option<&ImportRef> {
        match &self.replacement {
            Replacement::Rename { import, .. } => import.as_ref(),
            Replacement::Delete => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{}:", scope)?;
        }
        match &self.replacement {
            Replacement::Rename { text, .. } => write!(f, "{}=>{}", self.search, text),
            Replacement::Delete => write!(f, "{}=>{}", self.search, DELETE_MARKER),
        }
    }
}

/// Last `/`-separated segment of an import path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parse every directive found in `args`, each argument possibly holding
/// several comma-joined directives.
///
/// The first malformed directive aborts parsing: a partially applied rule set
/// would leave the generated package inconsistent.
pub fn parse_directives<S: AsRef<str>>(args: &[S]) -> Result<Vec<Rule>> {
    let directives: Vec<&str> = args
        .iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .collect();

    directives
        .iter()
        .map(|directive| {
            parse_directive(directive).map_err(|err| err.with_directives(directives.join(",")))
        })
        .collect()
}

/// Parse a single `[scope:]search=>replace` directive.
pub fn parse_directive(directive: &str) -> Result<Rule> {
    let directive = directive.trim();
    let (left, right) = directive
        .split_once(ARROW)
        .ok_or_else(|| Error::malformed_directive(directive, "missing '=>' separator"))?;

    let (scope, search) = match left.split_once(':') {
        Some((scope, search)) => (Some(scope.trim()), search.trim()),
        None => (None, left.trim()),
    };

    if search.is_empty() {
        return Err(Error::malformed_directive(directive, "empty search term"));
    }

    let scope = scope.filter(|s| !s.is_empty()).map(Scope::parse);

    Ok(Rule {
        scope,
        search: search.to_string(),
        replacement: parse_replacement(right.trim())?,
    })
}

fn parse_replacement(replace: &str) -> Result<Replacement> {
    if replace == DELETE_MARKER {
        return Ok(Replacement::Delete);
    }

    let Some(dot) = replace.rfind('.') else {
        return Ok(Replacement::Rename {
            text: replace.to_string(),
            import: None,
        });
    };

    let path = &replace[..dot];
    let name = &replace[dot + 1..];
    if path.is_empty() {
        return Err(Error::malformed_qualified_replacement(
            replace,
            "empty import path before '.'",
        ));
    }
    if name.is_empty() {
        return Err(Error::malformed_qualified_replacement(
            replace,
            "empty type name after '.'",
        ));
    }

    let alias = base_name(path).replace('-', "");
    if alias.is_empty() {
        return Err(Error::malformed_qualified_replacement(
            replace,
            "import path has an empty base name",
        ));
    }

    Ok(Replacement::Rename {
        text: format!("{}.{}", alias, name),
        import: Some(ImportRef {
            path: path.to_string(),
            alias,
        }),
    })
}
