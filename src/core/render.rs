//! Second-pass text templating of generated files.
//!
//! Runs on emitted text, after the structural rewrite. Supports the small
//! action language template authors use in comments and strings:
//!
//! - `{{.now}}`, `{{.cli}}`, `{{.version}}`: run variables
//! - `{{env "HOME"}}`: environment lookup
//! - `{{"literal"}}`: a quoted string, handy for emitting the delimiters
//! - `{{/* comment */}}`: dropped
//!
//! `{{- ` and ` -}}` trim surrounding whitespace. Delimiters are configurable.

use crate::error::{Error, Result};
use regex::Regex;

pub const NO_VALUE: &str = "<no value>";

/// Variables available to `.name` actions.
#[derive(Debug, Clone, Default)]
pub struct RenderVars {
    pub now: String,
    pub cli: String,
    pub version: String,
}

impl RenderVars {
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "now" => Some(&self.now),
            "cli" => Some(&self.cli),
            "version" => Some(&self.version),
            _ => None,
        }
    }
}

pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub struct Renderer {
    left: String,
    pattern: Regex,
    env: EnvLookup,
}

impl Renderer {
    pub fn new(left: &str, right: &str) -> Result<Self> {
        if left.is_empty() || right.is_empty() {
            return Err(Error::validation_invalid_argument(
                "delimiters",
                "template delimiters must not be empty",
            ));
        }
        let pattern = Regex::new(&format!(
            "(?s){}(.*?){}",
            regex::escape(left),
            regex::escape(right)
        ))
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;

        Ok(Self {
            left: left.to_string(),
            pattern,
            env: process_env,
        })
    }

    /// Replace the environment lookup used by `env` actions.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn render(&self, text: &str, vars: &RenderVars) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut trim_next = false;

        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let mut action = inner.as_str();

            if action.contains(self.left.as_str()) {
                return Err(Error::template_render(
                    whole.as_str(),
                    "unterminated action",
                    None,
                ));
            }

            let mut chunk = &text[last..whole.start()];
            if trim_next {
                chunk = chunk.trim_start();
            }
            if let Some(rest) = strip_trim_marker_start(action) {
                chunk = chunk.trim_end();
                action = rest;
            }
            out.push_str(chunk);

            trim_next = match strip_trim_marker_end(action) {
                Some(rest) => {
                    action = rest;
                    true
                }
                None => false,
            };

            out.push_str(&self.evaluate(action.trim(), vars)?);
            last = whole.end();
        }

        let tail = &text[last..];
        if let Some(pos) = tail.find(self.left.as_str()) {
            let snippet: String = tail[pos..].chars().take(40).collect();
            return Err(Error::template_render(snippet, "unterminated action", None));
        }
        out.push_str(if trim_next { tail.trim_start() } else { tail });

        Ok(out)
    }

    fn evaluate(&self, action: &str, vars: &RenderVars) -> Result<String> {
        if action.starts_with("/*") && action.ends_with("*/") {
            return Ok(String::new());
        }

        if let Some(key) = action.strip_prefix('.') {
            if is_identifier(key) {
                return Ok(vars.get(key).unwrap_or(NO_VALUE).to_string());
            }
        }

        if let Some(arg) = action.strip_prefix("env") {
            if arg.starts_with(char::is_whitespace) {
                let name = unquote(arg.trim()).ok_or_else(|| {
                    Error::template_render(action, "env expects one quoted name", None)
                })?;
                return Ok((self.env)(&name).unwrap_or_default());
            }
        }

        if let Some(literal) = unquote(action) {
            return Ok(literal);
        }

        Err(Error::template_render(action, "unsupported action", None))
    }
}

fn strip_trim_marker_start(action: &str) -> Option<&str> {
    let rest = action.strip_prefix('-')?;
    rest.starts_with(char::is_whitespace).then_some(rest)
}

fn strip_trim_marker_end(action: &str) -> Option<&str> {
    let rest = action.strip_suffix('-')?;
    rest.ends_with(char::is_whitespace).then_some(rest)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Decode a Go interpreted (`"..."`) or raw (`` `...` ``) string literal.
fn unquote(s: &str) -> Option<String> {
    if s.len() >= 2 && s.starts_with('`') && s.ends_with('`') {
        return Some(s[1..s.len() - 1].to_string());
    }
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return None;
    }

    let mut out = String::new();
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                _ => return None,
            },
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}
