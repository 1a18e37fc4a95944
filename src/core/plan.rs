//! Output file naming.

use std::path::{Path, PathBuf};

/// Naming knobs shared by every file of one run.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    pub prefix: String,
    /// Inserted before the extension, e.g. `_string` → `generated_list_string.go`.
    pub suffix: Option<String>,
}

impl OutputNaming {
    /// Path of the generated counterpart of `source`.
    ///
    /// A single-file template package yields `<prefix><package>.go`; with
    /// several files the source base name is embedded as well so outputs do
    /// not collide.
    pub fn output_path(
        &self,
        dst_dir: &Path,
        template_package: &str,
        source: &Path,
        multi_file: bool,
    ) -> PathBuf {
        let name = if multi_file {
            let base = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            format!("{}{}_{}", self.prefix, template_package, base)
        } else {
            format!("{}{}.go", self.prefix, template_package)
        };

        let name = match self.suffix.as_deref().filter(|s| !s.is_empty()) {
            Some(suffix) => match name.rfind('.') {
                Some(dot) => format!("{}{}{}", &name[..dot], suffix, &name[dot..]),
                None => format!("{}{}", name, suffix),
            },
            None => name,
        };

        dst_dir.join(name)
    }
}
