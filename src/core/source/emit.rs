//! [`SourceFile`] → Go source text.

use super::{Import, SourceFile};

/// Standard library paths have no dot in their first segment.
fn is_std(path: &str) -> bool {
    !path.split('/').next().unwrap_or(path).contains('.')
}

fn import_line(import: &Import) -> String {
    match &import.alias {
        Some(alias) => format!("{} \"{}\"", alias, import.path),
        None => format!("\"{}\"", import.path),
    }
}

/// Imports that survive emission. Blank and dot imports always do. Others
/// must still be referred to; a template import the template itself never
/// used is left alone.
fn live_imports(file: &SourceFile) -> Vec<&Import> {
    file.imports
        .iter()
        .filter(|import| {
            if import.is_unqualified() {
                return true;
            }
            file.refers_to(import) || (!import.injected && !import.referenced)
        })
        .collect()
}

fn render_imports(imports: &[&Import]) -> String {
    if let [single] = imports {
        return format!("import {}", import_line(single));
    }

    let mut std: Vec<&Import> = imports.iter().copied().filter(|i| is_std(&i.path)).collect();
    let mut other: Vec<&Import> = imports.iter().copied().filter(|i| !is_std(&i.path)).collect();
    std.sort_by(|a, b| a.path.cmp(&b.path));
    other.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::from("import (\n");
    for import in &std {
        out.push('\t');
        out.push_str(&import_line(import));
        out.push('\n');
    }
    if !std.is_empty() && !other.is_empty() {
        out.push('\n');
    }
    for import in &other {
        out.push('\t');
        out.push_str(&import_line(import));
        out.push('\n');
    }
    out.push(')');
    out
}

/// Serialize a file. Declaration text and comments are reproduced verbatim;
/// the import declarations are merged into one normalized block.
pub fn emit(file: &SourceFile) -> String {
    let mut out = String::new();
    out.push_str(&file.layout.preamble);
    out.push_str("package ");
    out.push_str(&file.package_name);

    let imports = live_imports(file);
    if !imports.is_empty() {
        out.push_str(file.layout.import_gap.as_deref().unwrap_or("\n\n"));
        out.push_str(&render_imports(&imports));
    }

    for decl in &file.declarations {
        out.push_str(&decl.leading);
        out.push_str(&decl.body().text());
    }

    out.push_str(&file.layout.trailer);
    out
}

#[cfg(test)]
mod tests {
    use super::super::parse_file;
    use super::*;
    use std::path::Path;

    #[test]
    fn untouched_file_round_trips() {
        let src = "// Copyright notice\n\npackage list\n\n// {{.version}}\n\ntype List []int\n\n// Push appends.\nfunc (l *List) Push(n int) {\n\t*l = append(*l, n) // keep\n}\n\n//etc...\n";
        let file = parse_file(Path::new("list.go"), src).unwrap();
        assert_eq!(emit(&file), src);
    }

    #[test]
    fn injected_import_is_added_after_package_clause() {
        let src = "package p\n\ntype T struct{ v int }\n";
        let mut file = parse_file(Path::new("p.go"), src).unwrap();
        file.declarations[0].body_mut().rename("int", "bytes.Buffer");
        file.imports.push(Import {
            alias: None,
            path: "bytes".to_string(),
            injected: true,
            referenced: false,
        });
        assert_eq!(
            emit(&file),
            "package p\n\nimport \"bytes\"\n\ntype T struct{ v bytes.Buffer }\n"
        );
    }

    #[test]
    fn unused_injected_import_is_dropped() {
        let src = "package p\n\ntype T int\n";
        let mut file = parse_file(Path::new("p.go"), src).unwrap();
        file.imports.push(Import {
            alias: None,
            path: "bytes".to_string(),
            injected: true,
            referenced: false,
        });
        assert_eq!(emit(&file), src);
    }

    #[test]
    fn imports_are_grouped_std_first() {
        let src = "package p\n\nimport (\n\t\"github.com/x/y\"\n\t\"fmt\"\n)\n\nvar _ = fmt.Sprint\nvar _ = y.Z\n";
        let mut file = parse_file(Path::new("p.go"), src).unwrap();
        file.imports.push(Import {
            alias: Some("bignum".to_string()),
            path: "github.com/acme/big-num".to_string(),
            injected: false,
            referenced: false,
        });
        let out = emit(&file);
        assert!(out.starts_with(
            "package p\n\nimport (\n\t\"fmt\"\n\n\tbignum \"github.com/acme/big-num\"\n\t\"github.com/x/y\"\n)\n\nvar _ = fmt.Sprint\n"
        ), "{}", out);
    }

    #[test]
    fn template_import_left_unused_by_a_delete_is_dropped() {
        let src = "package list\n\nimport (\n\t\"fmt\"\n\t\"strings\"\n)\n\ntype List []string\n\nfunc (l List) Join() string {\n\treturn strings.Join(l, \",\")\n}\n\nfunc (l List) Dump() {\n\tfmt.Println(l)\n}\n";
        let mut file = parse_file(Path::new("list.go"), src).unwrap();
        file.remove_declarations(|_, decl| decl.name() == Some("Dump"));
        let out = emit(&file);
        assert!(out.starts_with("package list\n\nimport \"strings\"\n\ntype List []string\n"), "{}", out);
        assert!(!out.contains("fmt"));
    }

    #[test]
    fn blank_and_unreferenced_template_imports_are_kept() {
        let src = "package p\n\nimport (\n\t_ \"embed\"\n\t\"unsafe\"\n)\n\ntype T int\n";
        let file = parse_file(Path::new("p.go"), src).unwrap();
        assert_eq!(emit(&file), src);
    }
}
