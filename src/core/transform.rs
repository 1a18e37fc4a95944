//! Tree mutations: rename, delete, import injection, package rename.
//!
//! Nothing here fails. A selection that matches nothing, or a search term
//! that never occurs, leaves the file as it was.

use crate::directive::{ImportRef, Replacement, Rule};
use crate::select::{select, select_for_delete, Selection};
use crate::source::{DeclKind, Import, SourceFile};
use serde::Serialize;

/// What one rule did to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub renamed: usize,
    pub deleted: usize,
    pub import_added: bool,
}

/// Rewrite every identifier named `search` inside the selection.
///
/// The whole-file selection also covers import names, so `str => s` renames
/// `import str "strings"` along with its uses.
pub fn rename(file: &mut SourceFile, selection: &Selection, search: &str, replace: &str) -> usize {
    match selection {
        Selection::File => {
            let mut count: usize = file
                .declarations
                .iter_mut()
                .map(|decl| decl.body_mut().rename(search, replace))
                .sum();
            for import in &mut file.imports {
                if import.alias.as_deref() == Some(search) {
                    import.alias = Some(replace.to_string());
                    count += 1;
                }
            }
            count
        }
        Selection::Declarations(indices) => {
            let mut count = 0;
            for &i in indices {
                if let Some(decl) = file.declarations.get_mut(i) {
                    count += decl.body_mut().rename(search, replace);
                }
            }
            count
        }
    }
}

/// Remove declarations.
///
/// A scoped selection removes every selected declaration. The whole-file
/// selection removes the types and free functions named `search`. Methods are
/// never removed along with their type, and comments that are not the
/// removed declaration's own doc comment stay in the file.
pub fn delete(file: &mut SourceFile, selection: &Selection, search: &str) -> usize {
    match selection {
        Selection::File => file.remove_declarations(|_, decl| match &decl.kind {
            DeclKind::Type(t) => t.declares(search),
            DeclKind::Func(f) => !f.is_method() && f.name() == search,
            DeclKind::Value(_) => false,
        }),
        Selection::Declarations(indices) => {
            file.remove_declarations(|index, _| indices.contains(&index))
        }
    }
}

/// Add `import` unless the file already imports its path.
pub fn add_import(file: &mut SourceFile, import: &ImportRef) -> bool {
    if file.has_import(&import.path) {
        return false;
    }
    file.imports.push(Import {
        alias: import.needs_alias().then(|| import.alias.clone()),
        path: import.path.clone(),
        injected: true,
        referenced: false,
    });
    true
}

pub fn set_package_name(file: &mut SourceFile, name: &str) {
    file.package_name = name.to_string();
}

/// Select, then rename or delete, for a single rule.
pub fn apply_rule(file: &mut SourceFile, rule: &Rule) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    if let Some(import) = rule.import() {
        outcome.import_added = add_import(file, import);
    }

    match &rule.replacement {
        Replacement::Rename { text, .. } => {
            let selection = select(rule.scope.as_ref(), file);
            outcome.renamed = rename(file, &selection, &rule.search, text);
        }
        Replacement::Delete => {
            let selection = select_for_delete(rule.scope.as_ref(), file);
            outcome.deleted = delete(file, &selection, &rule.search);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::parse_directive;
    use crate::source::{emit, parse_file};
    use std::path::Path;

    const LIST: &str = "package list

// {{.version}}

// List holds ints.
type List []int

func NewList() List {
\treturn List{}
}

func (l *List) Push(n int) {
\t*l = append(*l, n)
}

func (l *List) Pop() int {
\treturn 0
}
";

    fn list() -> SourceFile {
        parse_file(Path::new("list.go"), LIST).unwrap()
    }

    fn apply(file: &mut SourceFile, directive: &str) -> RuleOutcome {
        apply_rule(file, &parse_directive(directive).unwrap())
    }

    #[test]
    fn unscoped_rename_touches_every_declaration() {
        let mut file = list();
        let outcome = apply(&mut file, "int => string");
        assert_eq!(outcome.renamed, 3);
        let out = emit(&file);
        assert!(out.contains("type List []string"));
        assert!(out.contains("func (l *List) Push(n string)"));
        assert!(out.contains("func (l *List) Pop() string"));
        assert!(out.contains("// List holds ints."));
    }

    #[test]
    fn unscoped_rename_leaves_other_names_alone() {
        let mut file = list();
        apply(&mut file, "List => StrList");
        let out = emit(&file);
        assert!(out.contains("type StrList []int"));
        assert!(out.contains("func NewList() StrList {\n\treturn StrList{}\n}"));
        assert!(out.contains("func (l *StrList) Push(n int)"));
    }

    #[test]
    fn method_scoped_rename_stays_inside_the_method() {
        let mut file = list();
        let outcome = apply(&mut file, "List.Pop:int => float64");
        assert_eq!(outcome.renamed, 1);
        let out = emit(&file);
        assert!(out.contains("func (l *List) Pop() float64"));
        assert!(out.contains("func (l *List) Push(n int)"));
        assert!(out.contains("type List []int"));
    }

    #[test]
    fn unmatched_method_scope_changes_nothing() {
        let mut file = list();
        let before = file.declarations.clone();
        let outcome = apply(&mut file, "List.Shift:int => string");
        assert_eq!(outcome, RuleOutcome::default());
        assert_eq!(file.declarations, before);
    }

    #[test]
    fn deleting_a_method_keeps_type_and_siblings() {
        let mut file = list();
        let outcome = apply(&mut file, "List.Pop:Pop => -");
        assert_eq!(outcome.deleted, 1);
        let names: Vec<&str> = file.declarations.iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["List", "NewList", "Push"]);
    }

    #[test]
    fn deleting_a_type_does_not_cascade() {
        let mut file = list();
        let outcome = apply(&mut file, "List => -");
        assert_eq!(outcome.deleted, 1);
        let names: Vec<&str> = file.declarations.iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["NewList", "Push", "Pop"]);
        let out = emit(&file);
        assert!(!out.contains("List holds"));
        assert!(out.starts_with("package list\n\n// {{.version}}\n\nfunc NewList() List {"));
    }

    #[test]
    fn scoped_type_delete_keeps_methods() {
        let mut file = list();
        let outcome = apply(&mut file, "List:List => -");
        assert_eq!(outcome.deleted, 1);
        let names: Vec<&str> = file.declarations.iter().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["NewList", "Push", "Pop"]);
    }

    #[test]
    fn scoped_rename_still_reaches_methods() {
        let mut file = list();
        let outcome = apply(&mut file, "List:int => uint");
        assert_eq!(outcome.renamed, 3);
    }

    #[test]
    fn unscoped_rename_covers_import_names() {
        let mut file = parse_file(
            Path::new("p.go"),
            "package p\n\nimport str \"strings\"\n\nfunc Up(s string) string {\n\treturn str.ToUpper(s)\n}\n",
        )
        .unwrap();
        let outcome = apply(&mut file, "str => strs");
        assert_eq!(outcome.renamed, 2);
        let out = emit(&file);
        assert!(out.contains("import strs \"strings\"\n"));
        assert!(out.contains("return strs.ToUpper(s)"));
    }

    #[test]
    fn scoped_rename_leaves_import_names_alone() {
        let mut file = parse_file(
            Path::new("p.go"),
            "package p\n\nimport str \"strings\"\n\nfunc Up(s string) string {\n\treturn str.ToUpper(s)\n}\n",
        )
        .unwrap();
        apply(&mut file, "Up:str => strs");
        assert_eq!(file.imports[0].alias.as_deref(), Some("str"));
    }

    #[test]
    fn qualified_replacement_injects_one_import() {
        let mut file = list();
        let first = apply(&mut file, "List.Push:int => bytes.Buffer");
        let second = apply(&mut file, "List.Pop:int => bytes.Buffer");
        assert!(first.import_added);
        assert!(!second.import_added);
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.imports[0].path, "bytes");
        assert_eq!(file.imports[0].alias, None);
        assert!(emit(&file).contains("import \"bytes\"\n"));
    }

    #[test]
    fn hyphenated_import_gets_an_alias() {
        let mut file = list();
        apply(&mut file, "int => github.com/acme/big-num.Int");
        assert_eq!(file.imports[0].alias.as_deref(), Some("bignum"));
        assert!(emit(&file).contains("func (l *List) Push(n bignum.Int)"));
    }

    #[test]
    fn existing_import_path_is_not_duplicated() {
        let mut file = parse_file(
            Path::new("p.go"),
            "package p\n\nimport \"bytes\"\n\nvar b Reader\n",
        )
        .unwrap();
        let outcome = apply(&mut file, "Reader => bytes.Buffer");
        assert!(!outcome.import_added);
        assert_eq!(file.imports.len(), 1);
    }
}
