//! One generation run, end to end.
//!
//! [`plan_stamp`] loads the template package, applies the rules, emits and
//! renders every output in memory. [`apply_stamp`] writes the result. Nothing
//! touches the destination until every file has been produced successfully.

use crate::defaults::Defaults;
use crate::directive::Rule;
use crate::error::{Error, Result};
use crate::generate::{generate, FileReport};
use crate::loader::{destination_package_name, load_template, SkipGlobs};
use crate::log_status;
use crate::plan::OutputNaming;
use crate::render::{RenderVars, Renderer};
use crate::source::emit;
use crate::utils::io;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs, already merged from config and CLI flags.
#[derive(Debug, Clone)]
pub struct StampRequest {
    pub template: String,
    pub dst: PathBuf,
    pub rules: Vec<Rule>,
    pub skip: Vec<String>,
    pub suffix: Option<String>,
    pub defaults: Defaults,
    /// Run the text template pass over emitted files.
    pub render: bool,
    /// Invocation string exposed to templates as `.cli`.
    pub cli: String,
}

/// A generated file waiting to be written.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub source: String,
    pub destination: String,
    pub report: FileReport,
    #[serde(skip)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StampResult {
    pub template_dir: String,
    pub template_package: String,
    pub dst_package: String,
    pub skipped: Vec<String>,
    pub outputs: Vec<GeneratedFile>,
    pub applied: bool,
}

/// Variables for a run started now.
pub fn render_vars(cli: &str) -> RenderVars {
    RenderVars {
        now: chrono::Local::now()
            .format("%A, %d-%b-%y %H:%M:%S %Z")
            .to_string(),
        cli: cli.to_string(),
        version: format!("gostamp {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Produce every output in memory.
pub fn plan_stamp(request: &StampRequest) -> Result<StampResult> {
    plan_stamp_with(request, &render_vars(&request.cli))
}

/// [`plan_stamp`] with explicit template variables.
pub fn plan_stamp_with(request: &StampRequest, vars: &RenderVars) -> Result<StampResult> {
    let defaults = &request.defaults;
    let renderer = if request.render {
        Some(Renderer::new(&defaults.left_delim, &defaults.right_delim)?)
    } else {
        None
    };

    let mut skip = defaults.skip.clone();
    skip.extend(request.skip.iter().cloned());
    let skips = SkipGlobs::new(&skip, &defaults.output_prefix);

    let mut package = load_template(&request.template, &skips)?;
    let dst_package = destination_package_name(&request.dst)?;

    let reports = generate(&mut package.files, &request.rules, &dst_package);

    let naming = OutputNaming {
        prefix: defaults.output_prefix.clone(),
        suffix: request.suffix.clone(),
    };
    let multi_file = package.files.len() > 1;

    let mut outputs = Vec::with_capacity(package.files.len());
    for (file, report) in package.files.iter().zip(reports) {
        let destination =
            naming.output_path(&request.dst, &package.name, file.path(), multi_file);

        let text = emit(file);
        let content = match &renderer {
            Some(renderer) => renderer
                .render(&text, vars)
                .map_err(|e| with_file(e, file.path()))?,
            None => text,
        };

        outputs.push(GeneratedFile {
            source: file.path().display().to_string(),
            destination: destination.display().to_string(),
            report,
            content,
        });
    }

    Ok(StampResult {
        template_dir: package.dir.display().to_string(),
        template_package: package.name,
        dst_package,
        skipped: package.skipped,
        outputs,
        applied: false,
    })
}

fn with_file(mut err: Error, path: &Path) -> Error {
    if let serde_json::Value::Object(map) = &mut err.details {
        map.insert(
            "file".to_string(),
            serde_json::Value::String(path.display().to_string()),
        );
    }
    err
}

/// Write every planned output, creating the destination directory if needed.
pub fn apply_stamp(result: &mut StampResult, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dst.display())))
    })?;

    for output in &result.outputs {
        let path = Path::new(&output.destination);
        io::write_file_atomic(path, &output.content, &format!("write {}", path.display()))?;
        log_status!("write", "{}", path.display());
    }

    result.applied = true;
    Ok(())
}

/// Stdout rendering: each output preceded by its source and destination.
pub fn to_stdout_text(result: &StampResult) -> String {
    let mut out = String::new();
    for output in &result.outputs {
        out.push_str(&format!("// source        {}\n", output.source));
        out.push_str(&format!("// destination   {}\n", output.destination));
        out.push_str(&output.content);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::parse_directives;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    const LIST: &str = "package list

// {{.version}}

type List []int

func (l *List) Push(n int) {
\t*l = append(*l, n)
}
";

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let root = TempDir::new().unwrap();
        let tpl = root.path().join("list");
        let dst = root.path().join("strs");
        fs::create_dir_all(&tpl).unwrap();
        fs::write(tpl.join("list.go"), LIST).unwrap();
        (root, tpl, dst)
    }

    fn request(tpl: &Path, dst: &Path, directives: &str) -> StampRequest {
        StampRequest {
            template: tpl.display().to_string(),
            dst: dst.to_path_buf(),
            rules: parse_directives(&[directives]).unwrap(),
            skip: Vec::new(),
            suffix: None,
            defaults: Defaults::default(),
            render: true,
            cli: "gostamp".to_string(),
        }
    }

    fn vars() -> RenderVars {
        RenderVars {
            version: "gostamp test".to_string(),
            ..RenderVars::default()
        }
    }

    #[test]
    fn plans_without_writing() {
        let (_root, tpl, dst) = fixture();
        let result = plan_stamp_with(&request(&tpl, &dst, "List => StrList"), &vars()).unwrap();

        assert_eq!(result.template_package, "list");
        assert_eq!(result.dst_package, "strs");
        assert_eq!(result.outputs.len(), 1);
        assert!(result.outputs[0].destination.ends_with("generated_list.go"));
        assert!(result.outputs[0].content.starts_with("package strs\n\n// gostamp test\n"));
        assert!(!dst.exists());
    }

    #[test]
    fn apply_writes_rendered_outputs() {
        let (_root, tpl, dst) = fixture();
        let mut result = plan_stamp_with(&request(&tpl, &dst, "List => StrList"), &vars()).unwrap();
        apply_stamp(&mut result, &dst).unwrap();

        let written = fs::read_to_string(dst.join("generated_list.go")).unwrap();
        assert!(written.contains("type StrList []int"));
        assert!(result.applied);
    }

    #[test]
    fn render_can_be_disabled() {
        let (_root, tpl, dst) = fixture();
        let mut req = request(&tpl, &dst, "List => StrList");
        req.render = false;
        let result = plan_stamp_with(&req, &vars()).unwrap();
        assert!(result.outputs[0].content.contains("// {{.version}}"));
    }

    #[test]
    fn render_failure_names_the_file() {
        let (_root, tpl, dst) = fixture();
        fs::write(tpl.join("list.go"), "package list\n\n// {{.version\n").unwrap();
        let err = plan_stamp_with(&request(&tpl, &dst, "A => B"), &vars()).unwrap_err();
        assert_eq!(err.code, ErrorCode::TemplateRenderFailed);
        assert!(err.details["file"].as_str().unwrap().ends_with("list.go"));
    }

    #[test]
    fn stdout_text_has_headers() {
        let (_root, tpl, dst) = fixture();
        let result = plan_stamp_with(&request(&tpl, &dst, "List => StrList"), &vars()).unwrap();
        let text = to_stdout_text(&result);
        assert!(text.starts_with("// source        "));
        assert!(text.contains("\n// destination   "));
        assert!(text.contains("package strs\n"));
    }
}
