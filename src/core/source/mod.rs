//! In-memory model of a Go source file.
//!
//! A file is an ordered list of top-level declarations. Each declaration keeps
//! its source text as a list of segments: verbatim text interleaved with
//! identifier occurrences. Only identifier segments are ever rewritten, so
//! comments, string literals and formatting survive generation untouched.

mod emit;
mod parse;

pub use emit::emit;
pub use parse::parse_file;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Ident(String),
}

/// Text of a declaration split into verbatim text and identifier occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    segments: Vec<Segment>,
}

impl Body {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    /// Appends an identifier and returns its segment index.
    fn push_ident(&mut self, name: &str) -> usize {
        self.segments.push(Segment::Ident(name.to_string()));
        self.segments.len() - 1
    }

    fn ident(&self, index: usize) -> &str {
        match &self.segments[index] {
            Segment::Ident(name) => name,
            Segment::Text(text) => text,
        }
    }

    /// Every identifier occurrence, in source order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Ident(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Rewrite every identifier named `search`; returns how many were rewritten.
    pub fn rename(&mut self, search: &str, replace: &str) -> usize {
        let mut count = 0;
        for segment in &mut self.segments {
            if let Segment::Ident(name) = segment {
                if name == search {
                    *name = replace.to_string();
                    count += 1;
                }
            }
        }
        count
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Ident(text) => out.push_str(text),
            }
        }
        out
    }
}

/// `type` declaration, single or grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    names: Vec<usize>,
    body: Body,
}

impl TypeDecl {
    /// Name of the first type spec.
    pub fn name(&self) -> &str {
        self.names
            .first()
            .map(|&index| self.body.ident(index))
            .unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|&index| self.body.ident(index))
    }

    pub fn declares(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReceiverSlots {
    binding: Option<usize>,
    type_name: usize,
}

/// Receiver of a method. Pointer and value receivers look the same here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver<'a> {
    pub binding_name: Option<&'a str>,
    pub receiver_type: &'a str,
}

/// Function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    name: usize,
    receiver: Option<ReceiverSlots>,
    body: Body,
}

impl FuncDecl {
    pub fn name(&self) -> &str {
        self.body.ident(self.name)
    }

    pub fn receiver(&self) -> Option<Receiver<'_>> {
        self.receiver.map(|slots| Receiver {
            binding_name: slots.binding.map(|index| self.body.ident(index)),
            receiver_type: self.body.ident(slots.type_name),
        })
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// `var` or `const` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Type(TypeDecl),
    Func(FuncDecl),
    Value(ValueDecl),
}

/// A top-level declaration together with the comments and blank lines that
/// precede it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub leading: String,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn body(&self) -> &Body {
        match &self.kind {
            DeclKind::Type(decl) => &decl.body,
            DeclKind::Func(decl) => &decl.body,
            DeclKind::Value(decl) => &decl.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        match &mut self.kind {
            DeclKind::Type(decl) => &mut decl.body,
            DeclKind::Func(decl) => &mut decl.body,
            DeclKind::Value(decl) => &mut decl.body,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDecl> {
        match &self.kind {
            DeclKind::Type(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            DeclKind::Func(decl) => Some(decl),
            _ => None,
        }
    }

    /// Declared name, for types and functions.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Type(decl) => Some(decl.name()),
            DeclKind::Func(decl) => Some(decl.name()),
            DeclKind::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
    /// Added by a qualified replacement rather than present in the template.
    pub injected: bool,
    /// Whether the template referred to the package when it was loaded.
    pub referenced: bool,
}

impl Import {
    /// Name the importing file uses to refer to the package.
    pub fn qualifier(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => crate::directive::base_name(&self.path).replace('-', ""),
        }
    }

    /// Blank and dot imports, which are never referred to by a qualifier.
    pub fn is_unqualified(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_") | Some("."))
    }

    /// Names the file may use for the package: the alias, or else the names Go
    /// tooling assumes from the import path (`yaml` for `gopkg.in/yaml.v3`,
    /// `chi` for `github.com/go-chi/chi/v5`).
    fn candidate_names(&self) -> Vec<String> {
        if let Some(alias) = &self.alias {
            return vec![alias.clone()];
        }

        let mut base = crate::directive::base_name(&self.path);
        if is_major_version(base) {
            if let Some((parent, _)) = self.path.rsplit_once('/') {
                base = crate::directive::base_name(parent);
            }
        }
        let trimmed = base.strip_prefix("go-").unwrap_or(base);
        let assumed: String = trimmed
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();

        let mut names = vec![base.to_string(), base.replace('-', ""), assumed];
        names.retain(|name| !name.is_empty());
        names.dedup();
        names
    }
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// Comments in `leading` separated from the declaration by a blank line: file
/// headers and free-floating notes, as opposed to the doc comment.
fn detached_trivia(leading: &str) -> &str {
    match leading.rfind("\n\n") {
        Some(end) if !leading[..end].trim().is_empty() => &leading[..end],
        _ => "",
    }
}

/// Text around the structured parts of a file, kept so emission reproduces
/// the template faithfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Layout {
    /// Everything before the `package` keyword (build tags, file comments).
    preamble: String,
    /// Text between the package clause and the first import declaration.
    import_gap: Option<String>,
    /// Everything after the last declaration.
    trailer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package_name: String,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    layout: Layout,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Methods grouped by receiver type name, as declaration indices.
    ///
    /// The association is by name only: a method's receiver type does not
    /// have to be declared in this file.
    pub fn method_index(&self) -> HashMap<&str, Vec<usize>> {
        let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, decl) in self.declarations.iter().enumerate() {
            if let Some(receiver) = decl.as_func().and_then(FuncDecl::receiver) {
                index.entry(receiver.receiver_type).or_default().push(i);
            }
        }
        index
    }

    /// Remove the declarations `remove` picks. Detached comments in front of a
    /// removed declaration move to whatever follows it; its doc comment goes
    /// with it. Returns how many were removed.
    pub fn remove_declarations(
        &mut self,
        mut remove: impl FnMut(usize, &Declaration) -> bool,
    ) -> usize {
        let before = self.declarations.len();
        let mut carried = String::new();
        let mut kept = Vec::with_capacity(before);

        for (i, mut decl) in std::mem::take(&mut self.declarations)
            .into_iter()
            .enumerate()
        {
            if remove(i, &decl) {
                carried.push_str(detached_trivia(&decl.leading));
                continue;
            }
            if !carried.is_empty() {
                decl.leading = std::mem::take(&mut carried) + &decl.leading;
            }
            kept.push(decl);
        }

        if !carried.is_empty() {
            self.layout.trailer = carried + &self.layout.trailer;
        }
        self.declarations = kept;
        before - self.declarations.len()
    }

    /// Whether any identifier refers to `import`'s package.
    pub fn refers_to(&self, import: &Import) -> bool {
        let names = import.candidate_names();
        self.identifiers().any(|ident| {
            names.iter().any(|name| {
                ident == name
                    || ident
                        .strip_prefix(name.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            })
        })
    }

    pub fn has_import(&self, path: &str) -> bool {
        self.imports.iter().any(|import| import.path == path)
    }

    /// Every identifier occurrence across all declarations.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .flat_map(|decl| decl.body().identifiers())
    }
}
