//! Go source → [`SourceFile`], via tree-sitter-go.

use super::{
    Body, DeclKind, Declaration, FuncDecl, Import, Layout, ReceiverSlots, SourceFile, TypeDecl,
    ValueDecl,
};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Leaf node kinds that name something: Go's `ast.Ident`.
const IDENT_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "field_identifier",
    "package_identifier",
    "label_name",
];

fn node_text<'a>(node: Node, src: &'a str) -> &'a str {
    &src[node.start_byte()..node.end_byte()]
}

fn load_error(path: &Path, problem: impl Into<String>) -> Error {
    Error::template_load(
        path.parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        problem,
        Some(path.display().to_string()),
    )
}

/// Parse Go source text into a [`SourceFile`].
pub fn parse_file(path: &Path, src: &str) -> Result<SourceFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::internal_unexpected(format!("failed to load Go grammar: {}", e)))?;

    let tree = parser
        .parse(src, None)
        .ok_or_else(|| load_error(path, "parser returned no tree"))?;
    let root = tree.root_node();

    if root.has_error() {
        let position = first_error(root)
            .map(|n| {
                let pos = n.start_position();
                format!(" at line {}, column {}", pos.row + 1, pos.column + 1)
            })
            .unwrap_or_default();
        return Err(load_error(path, format!("syntax error{}", position)));
    }

    let mut package_name = None;
    let mut layout = Layout::default();
    let mut imports: Vec<Import> = Vec::new();
    let mut declarations = Vec::new();
    let mut cursor_pos = 0;

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "comment" => {}
            "package_clause" => {
                layout.preamble = src[..node.start_byte()].to_string();
                package_name = package_identifier(node, src);
                cursor_pos = node.end_byte();
            }
            "import_declaration" => {
                if layout.import_gap.is_none() {
                    layout.import_gap = Some(src[cursor_pos..node.start_byte()].to_string());
                }
                collect_imports(node, src, &mut imports);
                cursor_pos = node.end_byte();
            }
            _ => {
                let leading = src[cursor_pos..node.start_byte()].to_string();
                declarations.push(Declaration {
                    leading,
                    kind: declaration_kind(node, src),
                });
                cursor_pos = node.end_byte();
            }
        }
    }
    layout.trailer = src[cursor_pos..].to_string();

    let package_name = package_name.ok_or_else(|| load_error(path, "missing package clause"))?;

    let mut file = SourceFile {
        path: path.to_path_buf(),
        package_name,
        imports,
        declarations,
        layout,
    };
    let referenced: Vec<bool> = file.imports.iter().map(|i| file.refers_to(i)).collect();
    for (import, referenced) in file.imports.iter_mut().zip(referenced) {
        import.referenced = referenced;
    }

    Ok(file)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn package_identifier(clause: Node, src: &str) -> Option<String> {
    let mut cursor = clause.walk();
    let name = clause
        .named_children(&mut cursor)
        .find(|child| child.kind() == "package_identifier")
        .map(|child| node_text(child, src).to_string());
    name
}

fn collect_imports(node: Node, src: &str, imports: &mut Vec<Import>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                if let Some(import) = import_spec(child, src) {
                    if !imports.iter().any(|i| i.path == import.path) {
                        imports.push(import);
                    }
                }
            }
            "import_spec_list" => collect_imports(child, src, imports),
            _ => {}
        }
    }
}

fn import_spec(spec: Node, src: &str) -> Option<Import> {
    let path = spec.child_by_field_name("path")?;
    let path = node_text(path, src)
        .trim_matches(|c| c == '"' || c == '`')
        .to_string();
    if path.is_empty() {
        return None;
    }
    let alias = spec
        .child_by_field_name("name")
        .map(|name| node_text(name, src).to_string());

    Some(Import {
        alias,
        path,
        injected: false,
        referenced: false,
    })
}

/// Segments of `node`'s text plus a map from identifier start byte to segment index.
fn segment(node: Node, src: &str) -> (Body, HashMap<usize, usize>) {
    let mut body = Body::default();
    let mut slots = HashMap::new();
    let mut pos = node.start_byte();
    collect_idents(node, src, &mut body, &mut slots, &mut pos);
    body.push_text(&src[pos..node.end_byte()]);
    (body, slots)
}

fn collect_idents(
    node: Node,
    src: &str,
    body: &mut Body,
    slots: &mut HashMap<usize, usize>,
    pos: &mut usize,
) {
    if IDENT_KINDS.contains(&node.kind()) {
        body.push_text(&src[*pos..node.start_byte()]);
        let index = body.push_ident(node_text(node, src));
        slots.insert(node.start_byte(), index);
        *pos = node.end_byte();
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_idents(child, src, body, slots, pos);
    }
}

fn declaration_kind(node: Node, src: &str) -> DeclKind {
    let (body, slots) = segment(node, src);
    let slot = |n: Node| slots.get(&n.start_byte()).copied();

    match node.kind() {
        "type_declaration" => {
            let mut cursor = node.walk();
            let names = node
                .named_children(&mut cursor)
                .filter(|spec| matches!(spec.kind(), "type_spec" | "type_alias"))
                .filter_map(|spec| spec.child_by_field_name("name"))
                .filter_map(slot)
                .collect();
            DeclKind::Type(TypeDecl { names, body })
        }
        "function_declaration" | "method_declaration" => {
            let name = node.child_by_field_name("name").and_then(slot);
            let receiver = node
                .child_by_field_name("receiver")
                .and_then(|list| receiver_slots(list, &slot));
            match name {
                Some(name) => DeclKind::Func(FuncDecl {
                    name,
                    receiver,
                    body,
                }),
                None => DeclKind::Value(ValueDecl { body }),
            }
        }
        _ => DeclKind::Value(ValueDecl { body }),
    }
}

fn receiver_slots(list: Node, slot: &impl Fn(Node) -> Option<usize>) -> Option<ReceiverSlots> {
    let mut cursor = list.walk();
    let param = list
        .named_children(&mut cursor)
        .find(|child| child.kind() == "parameter_declaration")?;

    let type_name = receiver_type_node(param.child_by_field_name("type")?)?;
    Some(ReceiverSlots {
        binding: param.child_by_field_name("name").and_then(slot),
        type_name: slot(type_name)?,
    })
}

/// Unwraps `*T`, `(T)` and `T[K, V]` down to the identifier naming `T`.
fn receiver_type_node(node: Node) -> Option<Node> {
    match node.kind() {
        "type_identifier" => Some(node),
        "generic_type" => receiver_type_node(node.child_by_field_name("type")?),
        "pointer_type" | "parenthesized_type" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).next()?;
            receiver_type_node(inner)
        }
        _ => None,
    }
}
