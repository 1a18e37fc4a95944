//! Node selection: resolve a rule's scope to declarations.

use crate::directive::Scope;
use crate::source::{DeclKind, SourceFile};

/// What a rule acts on within one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The whole file.
    File,
    /// Declaration indices, in file order. May be empty.
    Declarations(Vec<usize>),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Declarations(indices) if indices.is_empty())
    }
}

/// Resolve `scope` against `file`. Pure: the file is never modified.
///
/// - no scope: the whole file
/// - `T`: types declaring `T`, the free function `T`, and every method whose
///   receiver type is `T`
/// - `T.M`: methods named `M` whose receiver type is `T`
pub fn select(scope: Option<&Scope>, file: &SourceFile) -> Selection {
    resolve(scope, file, true)
}

/// Declarations a scoped delete removes.
///
/// Same as [`select`] except that `T` stops at the type and the free function
/// `T`: deleting a type never takes its methods with it.
pub fn select_for_delete(scope: Option<&Scope>, file: &SourceFile) -> Selection {
    resolve(scope, file, false)
}

fn resolve(scope: Option<&Scope>, file: &SourceFile, with_methods: bool) -> Selection {
    let Some(scope) = scope else {
        return Selection::File;
    };

    let methods = file.method_index();
    let mut indices: Vec<usize> = match scope {
        Scope::Named(name) => {
            let mut indices = declared_as(name, file);
            if with_methods {
                if let Some(bound) = methods.get(name.as_str()) {
                    indices.extend(bound);
                }
            }
            indices
        }
        Scope::Method { type_name, method } => methods
            .get(type_name.as_str())
            .map(|bound| {
                bound
                    .iter()
                    .copied()
                    .filter(|&i| file.declarations[i].name() == Some(method.as_str()))
                    .collect()
            })
            .unwrap_or_default(),
    };

    indices.sort_unstable();
    indices.dedup();
    Selection::Declarations(indices)
}

/// Types declaring `name` and the free function `name`.
fn declared_as(name: &str, file: &SourceFile) -> Vec<usize> {
    file.declarations
        .iter()
        .enumerate()
        .filter(|(_, decl)| match &decl.kind {
            DeclKind::Type(t) => t.declares(name),
            DeclKind::Func(f) => !f.is_method() && f.name() == name,
            DeclKind::Value(_) => false,
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_file;
    use std::path::Path;

    const SOURCE: &str = "package mymap

var somethingelse int

type MyMap map[string]int

func NewMyMap() MyMap {
\treturn MyMap{}
}

func MyMap2() {}

func (l *MyMap) Set(k string, v int) {
\t(*l)[k] = v
}

func (l MyMap) Rm(k string) {
\tdelete(l, k)
}

func (o *Other) Rm() {}
";

    fn file() -> SourceFile {
        parse_file(Path::new("mymap.go"), SOURCE).unwrap()
    }

    fn named(name: &str) -> Scope {
        Scope::Named(name.to_string())
    }

    fn method(type_name: &str, method: &str) -> Scope {
        Scope::Method {
            type_name: type_name.to_string(),
            method: method.to_string(),
        }
    }

    #[test]
    fn no_scope_selects_the_file() {
        assert_eq!(select(None, &file()), Selection::File);
    }

    #[test]
    fn type_scope_selects_type_and_its_methods() {
        let selection = select(Some(&named("MyMap")), &file());
        assert_eq!(selection, Selection::Declarations(vec![1, 4, 5]));
    }

    #[test]
    fn delete_selection_leaves_bound_methods_out() {
        assert_eq!(
            select_for_delete(Some(&named("MyMap")), &file()),
            Selection::Declarations(vec![1])
        );
        assert_eq!(
            select_for_delete(Some(&method("MyMap", "Rm")), &file()),
            Selection::Declarations(vec![5])
        );
        assert_eq!(select_for_delete(None, &file()), Selection::File);
    }

    #[test]
    fn function_scope_uses_exact_names() {
        assert_eq!(
            select(Some(&named("NewMyMap")), &file()),
            Selection::Declarations(vec![2])
        );
        assert_eq!(
            select(Some(&named("MyMap2")), &file()),
            Selection::Declarations(vec![3])
        );
    }

    #[test]
    fn method_scope_matches_receiver_and_name() {
        assert_eq!(
            select(Some(&method("MyMap", "Rm")), &file()),
            Selection::Declarations(vec![5])
        );
        assert_eq!(
            select(Some(&method("Other", "Rm")), &file()),
            Selection::Declarations(vec![6])
        );
    }

    #[test]
    fn unmatched_scopes_select_nothing() {
        for scope in [method("MyMap", "Pop"), method("Nope", "Rm"), named("Nope")] {
            let selection = select(Some(&scope), &file());
            assert!(selection.is_empty(), "{:?}", scope);
        }
    }

    #[test]
    fn method_names_are_not_free_functions() {
        assert!(select(Some(&named("Set")), &file()).is_empty());
    }
}
