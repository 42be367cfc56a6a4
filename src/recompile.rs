use crate::compiler::{CompileOptions, Compilers};
use crate::config::Config;
use crate::directive::{Directives, StyleLang};
use crate::error::{CompileError, Error};
use crate::rebase::rebase;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static RE_LITERATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(litcoffee|coffee\.md)$").unwrap());

/// The document a block belongs to, plus what is needed to recompile it.
pub struct Unit<'a> {
    pub path: &'a Path,
    pub relative: &'a Path,
    pub config: &'a Config,
    pub compilers: &'a Compilers,
}

/// Recompilation step for one block, picked from the declared language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompiler {
    Passthrough,
    Coffee,
    Sass,
}

impl Recompiler {
    pub fn for_script(directives: &Directives, config: &Config) -> Self {
        if config.coffee.compile && directives.script_coffee {
            Recompiler::Coffee
        } else {
            Recompiler::Passthrough
        }
    }

    pub fn for_style(directives: &Directives, config: &Config) -> Self {
        if config.sass.compile && directives.style_lang == Some(StyleLang::Sass) {
            Recompiler::Sass
        } else {
            Recompiler::Passthrough
        }
    }

    pub fn lang(self) -> &'static str {
        match self {
            Recompiler::Passthrough => "passthrough",
            Recompiler::Coffee => "coffee",
            Recompiler::Sass => "sass",
        }
    }

    pub fn run(self, block: String, unit: &Unit) -> Result<String, Error> {
        let result = match self {
            Recompiler::Passthrough => return Ok(block),
            Recompiler::Coffee => {
                let options = script_options(unit.path, unit.relative, &unit.config.coffee.options);
                unit.compilers.script.compile(&block, &options)
            }
            Recompiler::Sass => {
                let source = rebase(&unit.config.sass.apply_replacements(&block));
                let options = style_options(unit.path, &unit.config.sass.options);
                unit.compilers.style.compile(&source, &options)
            }
        };
        result.map_err(|err| self.fail(unit.path, err))
    }

    fn fail(self, path: &Path, source: CompileError) -> Error {
        log::error!("Error compiling {} in {}: {}", self.lang(), path.display(), source);
        Error::Compile {
            lang: self.lang(),
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn is_literate(path: &Path) -> bool {
    RE_LITERATE.is_match(&path.to_string_lossy())
}

/// `x.coffee.md` and `x.vue` both map to `x.js`.
pub fn generated_file(relative: &Path) -> PathBuf {
    let text = relative.to_string_lossy();
    let renamed = match text.strip_suffix(".coffee.md") {
        Some(stem) => PathBuf::from(format!("{}.litcoffee", stem)),
        None => relative.to_path_buf(),
    };
    renamed.with_extension("js")
}

/// Compiler defaults, overridden by `user`, with the per-file fields re-applied last.
pub fn script_options(path: &Path, relative: &Path, user: &CompileOptions) -> CompileOptions {
    let mut options = CompileOptions::new();
    options.insert("bare".into(), Value::Bool(false));
    options.insert("header".into(), Value::Bool(false));
    options.insert("sourceRoot".into(), Value::Bool(false));
    options.insert("literate".into(), Value::Bool(is_literate(path)));
    for (key, value) in user {
        options.insert(key.clone(), value.clone());
    }
    options.insert("filename".into(), Value::String(path.display().to_string()));
    options.insert(
        "sourceFiles".into(),
        Value::Array(vec![Value::String(relative.display().to_string())]),
    );
    options.insert(
        "generatedFile".into(),
        Value::String(generated_file(relative).display().to_string()),
    );
    options
}

pub fn file_url(path: &Path) -> String {
    std::path::absolute(path)
        .ok()
        .and_then(|abs| url::Url::from_file_path(abs).ok())
        .map(String::from)
        .unwrap_or_else(|| format!("file://{}", path.display()))
}

pub fn style_options(path: &Path, user: &CompileOptions) -> CompileOptions {
    let mut options = CompileOptions::new();
    options.insert("url".into(), Value::String(file_url(path)));
    for (key, value) in user {
        options.insert(key.clone(), value.clone());
    }
    options
}
