use clap::{ArgAction, Args};
use serde::Serialize;
use std::path::{Path, PathBuf};

use gostamp::defaults::{self, Defaults};
use gostamp::directive::parse_directives;
use gostamp::stamp::{self, StampRequest, StampResult};

use crate::commands::CmdResult;

/// Lone positional that switches output from disk to stdout.
pub const STDOUT_MARKER: &str = "-";

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Template package: a directory, or an import path under $GOPATH/src
    #[arg(long)]
    pub template: String,

    /// Destination package directory
    #[arg(long, default_value = ".")]
    pub dst: PathBuf,

    /// Comma separated globs of template files to ignore
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Inserted before the extension of every output file name
    #[arg(long)]
    pub suffix: Option<String>,

    /// Left delimiter of the output template pass
    #[arg(long = "dl", value_name = "LEFT")]
    pub left_delim: Option<String>,

    /// Right delimiter of the output template pass
    #[arg(long = "dr", value_name = "RIGHT")]
    pub right_delim: Option<String>,

    /// Render generated files as text templates
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub render: bool,

    /// Directives of the form [scope:]search=>replace, comma separated.
    /// A lone `-` prints the results instead of writing them.
    #[arg(allow_hyphen_values = true, value_name = "DIRECTIVES")]
    pub directives: Vec<String>,
}

impl GenerateArgs {
    pub fn is_stdout(&self) -> bool {
        self.directives.iter().any(|d| d == STDOUT_MARKER)
    }

    fn directive_args(&self) -> Vec<&str> {
        self.directives
            .iter()
            .map(String::as_str)
            .filter(|d| *d != STDOUT_MARKER)
            .collect()
    }
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum GenerateOutput {
    #[serde(rename = "generate")]
    Generate {
        #[serde(flatten)]
        result: StampResult,
        total_files: usize,
        total_renamed: usize,
        total_deleted: usize,
    },
}

pub fn run(args: GenerateArgs) -> CmdResult<GenerateOutput> {
    let request = build_request(&args, defaults::load_defaults())?;
    let mut result = stamp::plan_stamp(&request)?;
    stamp::apply_stamp(&mut result, &request.dst)?;

    let total_files = result.outputs.len();
    let total_renamed = result.outputs.iter().map(|o| o.report.total_renamed).sum();
    let total_deleted = result.outputs.iter().map(|o| o.report.total_deleted).sum();

    Ok((
        GenerateOutput::Generate {
            result,
            total_files,
            total_renamed,
            total_deleted,
        },
        0,
    ))
}

/// Stdout mode: every output, with source and destination headers, nothing written.
pub fn run_raw(args: GenerateArgs) -> CmdResult<String> {
    let request = build_request(&args, defaults::load_defaults())?;
    let result = stamp::plan_stamp(&request)?;
    Ok((stamp::to_stdout_text(&result), 0))
}

fn build_request(args: &GenerateArgs, mut defaults: Defaults) -> gostamp::Result<StampRequest> {
    let rules = parse_directives(&args.directive_args())?;

    if let Some(left) = &args.left_delim {
        defaults.left_delim = left.clone();
    }
    if let Some(right) = &args.right_delim {
        defaults.right_delim = right.clone();
    }

    Ok(StampRequest {
        template: args.template.clone(),
        dst: absolute(&args.dst)?,
        rules,
        skip: args.skip.clone(),
        suffix: args.suffix.clone().filter(|s| !s.is_empty()),
        defaults,
        render: args.render,
        cli: invocation(std::env::args()),
    })
}

fn absolute(path: &Path) -> gostamp::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| {
            gostamp::Error::internal_io(e.to_string(), Some("current dir".to_string()))
        })?;
        cwd.join(path)
    };
    // Collecting components drops `.` segments, so `./` still has a base name.
    Ok(joined.components().collect())
}

/// The command line as typed, quoting arguments that contain spaces.
fn invocation(args: impl IntoIterator<Item = String>) -> String {
    args.into_iter()
        .map(|arg| {
            if arg.contains(' ') {
                format!("{:?}", arg)
            } else {
                arg
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
