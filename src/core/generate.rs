//! Rule sequencing. Every rule is applied, in order, to every template file.
//!
//! Each rule re-runs selection against the tree left by the previous rule, so
//! rules compose: `A=>B, B=>C` turns `A` into `C`. Files share nothing and
//! could be processed in any order; rules within a file never can.

use crate::directive::Rule;
use crate::log_status;
use crate::source::SourceFile;
use crate::transform::{apply_rule, set_package_name, RuleOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub directive: String,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

/// Summary of one file's rule pass.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub package: String,
    pub rules: Vec<RuleReport>,
    pub total_renamed: usize,
    pub total_deleted: usize,
    pub imports_added: usize,
}

/// Apply `rules` to one file, then rename its package to `dst_package`.
pub fn apply_rules(file: &mut SourceFile, rules: &[Rule], dst_package: &str) -> FileReport {
    let mut reports = Vec::with_capacity(rules.len());

    for rule in rules {
        let outcome = apply_rule(file, rule);
        reports.push(RuleReport {
            directive: rule.to_string(),
            outcome,
        });
    }

    set_package_name(file, dst_package);

    FileReport {
        file: file.path().display().to_string(),
        package: dst_package.to_string(),
        total_renamed: reports.iter().map(|r| r.outcome.renamed).sum(),
        total_deleted: reports.iter().map(|r| r.outcome.deleted).sum(),
        imports_added: reports.iter().filter(|r| r.outcome.import_added).count(),
        rules: reports,
    }
}

/// Apply `rules` to every file of the template package.
pub fn generate(files: &mut [SourceFile], rules: &[Rule], dst_package: &str) -> Vec<FileReport> {
    files
        .iter_mut()
        .map(|file| {
            let report = apply_rules(file, rules, dst_package);
            log_status!(
                "generate",
                "{}: {} renamed, {} deleted, {} imports added",
                report.file,
                report.total_renamed,
                report.total_deleted,
                report.imports_added
            );
            report
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::parse_directives;
    use crate::source::{emit, parse_file};
    use std::path::Path;

    const LIST: &str = "package list

type List []int

func (l *List) Push(n int) {
\t*l = append(*l, n)
}
";

    fn run(directives: &str) -> (String, FileReport) {
        let mut file = parse_file(Path::new("list.go"), LIST).unwrap();
        let rules = parse_directives(&[directives]).unwrap();
        let report = apply_rules(&mut file, &rules, "lib");
        (emit(&file), report)
    }

    #[test]
    fn scoped_substitution_then_type_rename() {
        let (out, report) = run("List:int => string, List => StrList");
        assert_eq!(
            out,
            "package lib

type StrList []string

func (l *StrList) Push(n string) {
\t*l = append(*l, n)
}
"
        );
        assert_eq!(report.total_renamed, 4);
        assert_eq!(report.rules[0].directive, "List:int=>string");
    }

    #[test]
    fn scope_names_the_current_tree() {
        let (out, _) = run("List => StrList, StrList:int => string");
        assert!(out.contains("type StrList []string"));
        assert!(out.contains("func (l *StrList) Push(n string)"));

        let (out, report) = run("List => StrList, List:int => string");
        assert!(out.contains("type StrList []int"));
        assert_eq!(report.rules[1].outcome, RuleOutcome::default());
    }

    #[test]
    fn rules_compose_sequentially() {
        let (out, _) = run("List => A, A => B");
        assert!(out.contains("type B []int"));
        assert!(!out.contains(" A "));
    }

    #[test]
    fn package_is_renamed_without_rules() {
        let (out, report) = run("Nothing => Matches");
        assert!(out.starts_with("package lib\n"));
        assert_eq!(report.package, "lib");
        assert_eq!(report.total_renamed, 0);
    }

    #[test]
    fn generate_processes_every_file() {
        let mut files = vec![
            parse_file(Path::new("a.go"), "package tpl\n\ntype T int\n").unwrap(),
            parse_file(Path::new("b.go"), "package tpl\n\nfunc F(t T) {}\n").unwrap(),
        ];
        let rules = parse_directives(&["T => U"]).unwrap();
        let reports = generate(&mut files, &rules, "dst");
        assert_eq!(reports.len(), 2);
        assert_eq!(emit(&files[0]), "package dst\n\ntype U int\n");
        assert_eq!(emit(&files[1]), "package dst\n\nfunc F(t U) {}\n");
    }
}
