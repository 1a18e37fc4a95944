//! Template package loading.
//!
//! Resolves the template path to a directory, picks the `.go` files that take
//! part in generation and parses each of them.

use crate::error::{Error, Result};
use crate::log_status;
use crate::source::{parse_file, SourceFile};
use crate::utils::io;
use glob_match::glob_match;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded template package.
#[derive(Debug, Clone)]
pub struct TemplatePackage {
    pub dir: PathBuf,
    /// Package name declared by the template files.
    pub name: String,
    pub files: Vec<SourceFile>,
    /// Base names of files excluded by a skip pattern.
    pub skipped: Vec<String>,
}

/// Compiled set of skip patterns, matched against file base names.
#[derive(Debug, Clone, Default)]
pub struct SkipGlobs {
    patterns: Vec<String>,
}

impl SkipGlobs {
    /// Build from user patterns plus the pattern matching previously
    /// generated outputs, so they are never read back as templates.
    pub fn new<S: AsRef<str>>(patterns: &[S], output_prefix: &str) -> Self {
        let mut patterns: Vec<String> = patterns
            .iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        patterns.push(format!("{}*", output_prefix));
        Self { patterns }
    }

    pub fn matches_any(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| glob_match(pattern, file_name))
    }
}

fn go_path() -> Option<PathBuf> {
    match env::var("GOPATH") {
        Ok(path) if !path.is_empty() => path.split(':').next().map(PathBuf::from),
        _ => Some(PathBuf::from(shellexpand::tilde("~/go").to_string())),
    }
}

/// Find the directory holding the template package.
///
/// An existing directory wins; otherwise the path is treated as an import path
/// under `$GOPATH/src`.
pub fn resolve_template_dir(template: &str) -> Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(template).to_string());
    if expanded.is_dir() {
        return Ok(expanded);
    }

    if let Some(candidate) = go_path().map(|root| root.join("src").join(template)) {
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    Err(
        Error::template_load(template, "template package directory not found", None)
            .with_hint("Pass a directory path or an import path under $GOPATH/src"),
    )
}

/// Non-test `.go` files directly inside `dir`, sorted by name.
fn list_go_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", dir.display())))
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = file_name(path);
            name.ends_with(".go") && !name.ends_with("_test.go")
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split `paths` into participating files and skipped base names.
pub fn select_files(paths: Vec<PathBuf>, skips: &SkipGlobs) -> (Vec<PathBuf>, Vec<String>) {
    let mut selected = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        let name = file_name(&path);
        if skips.matches_any(&name) {
            skipped.push(name);
        } else {
            selected.push(path);
        }
    }
    (selected, skipped)
}

/// Resolve, select and parse the template package.
pub fn load_template(template: &str, skips: &SkipGlobs) -> Result<TemplatePackage> {
    let dir = resolve_template_dir(template)?;
    let (selected, skipped) = select_files(list_go_files(&dir)?, skips);

    if selected.is_empty() {
        return Err(Error::template_load(
            template,
            "no Go files left to use as templates",
            None,
        ));
    }

    log_status!(
        "load",
        "{}: {} template files ({} skipped)",
        dir.display(),
        selected.len(),
        skipped.len()
    );

    let mut files = Vec::with_capacity(selected.len());
    for path in &selected {
        let src = io::read_file(path, &format!("read template {}", path.display()))
            .map_err(|e| {
                Error::template_load(
                    template,
                    e.details["error"].as_str().unwrap_or("unreadable file"),
                    Some(path.display().to_string()),
                )
            })?;
        files.push(parse_file(path, &src)?);
    }

    let name = files
        .first()
        .map(|f| f.package_name.clone())
        .unwrap_or_else(|| file_name(&dir));

    Ok(TemplatePackage {
        dir,
        name,
        files,
        skipped,
    })
}

/// Package name the generated files must declare.
///
/// Taken from the first `package` clause of a `.go` file in `dst`; a directory
/// without Go files falls back to its own name.
pub fn destination_package_name(dst: &Path) -> Result<String> {
    if dst.is_dir() {
        for path in list_go_files(dst)? {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let declared = content.lines().find_map(|line| {
                line.strip_prefix("package ")
                    .and_then(|rest| rest.split_whitespace().next())
                    .map(str::to_string)
            });
            if let Some(name) = declared {
                return Ok(name);
            }
        }
    }

    let name = file_name(dst);
    if name.is_empty() {
        return Err(Error::validation_invalid_argument(
            "dst",
            format!("cannot derive a package name from {}", dst.display()),
        ));
    }
    Ok(name)
}
