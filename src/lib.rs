pub mod assemble;
pub mod compiler;
pub mod config;
pub mod directive;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod normalize;
pub mod rebase;
pub mod recompile;

use compiler::Compilers;
use config::Config;
use error::Error;
use extract::BlockOptions;
use fragment::Fragment;
use recompile::{Recompiler, Unit};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Null,
    Text(String),
    Binary(Vec<u8>),
}

/// A component file: its contents plus the path it is identified by.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// Root that `relative()` is taken against.
    pub base: PathBuf,
    pub contents: Contents,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Document {
            path: path.into(),
            base: base.into(),
            contents: Contents::Text(text.into()),
        }
    }

    pub fn from_bytes(path: impl Into<PathBuf>, base: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let contents = match String::from_utf8(bytes) {
            Ok(text) => Contents::Text(text),
            Err(e) => Contents::Binary(e.into_bytes()),
        };
        Document {
            path: path.into(),
            base: base.into(),
            contents,
        }
    }

    pub fn read(path: &Path, base: &Path) -> io::Result<Self> {
        Ok(Document::from_bytes(path, base, std::fs::read(path)?))
    }

    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    pub fn text(&self) -> Option<&str> {
        match &self.contents {
            Contents::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Normalize one component into `<template>`, `<script>`, `<style>` order,
/// recompiling the script and style blocks where configured.
pub fn compile(doc: &Document, config: &Config, compilers: &Compilers) -> Result<String, Error> {
    let source = doc.text().ok_or_else(|| Error::Unsupported {
        path: doc.path.clone(),
    })?;

    // Locate
    let fragment = Fragment::parse(source);
    let directives = directive::detect(&fragment, config.directives);

    // Extract
    let plain = BlockOptions::default();
    let script_options = BlockOptions {
        empty_export: config.empty_export,
        ..Default::default()
    };
    let template = extract::parse_block(&fragment, "template", &plain);
    let script = extract::parse_block(&fragment, "script", &script_options);
    let style = extract::parse_block(&fragment, "style", &plain);

    // Normalize
    let template = normalize::strip_blank_lines(template, config.remove_blank_lines);
    let script = normalize::strip_blank_lines(script, config.remove_blank_lines);
    let style = normalize::strip_blank_lines(style, config.remove_blank_lines);

    // Recompile
    let unit = Unit {
        path: &doc.path,
        relative: doc.relative(),
        config,
        compilers,
    };
    let script_step = Recompiler::for_script(&directives, config);
    let style_step = Recompiler::for_style(&directives, config);
    log::debug!(
        "{}: script -> {}, style -> {}",
        doc.path.display(),
        script_step.lang(),
        style_step.lang()
    );
    let script = script_step.run(script, &unit)?;
    let style = style_step.run(style, &unit)?;
    let style_lang = match style_step {
        Recompiler::Sass => None,
        _ => directives.style_lang,
    };

    // Assemble
    Ok(assemble::assemble(
        &template,
        &script,
        &style,
        directives.template_lang,
        style_lang,
        directives.scoped,
    ))
}

/// Null documents pass through untouched; text documents are compiled.
pub fn transform(mut doc: Document, config: &Config, compilers: &Compilers) -> Result<Document, Error> {
    match doc.contents {
        Contents::Null => Ok(doc),
        Contents::Binary(_) => Err(Error::Unsupported { path: doc.path }),
        Contents::Text(_) => {
            let output = compile(&doc, config, compilers)?;
            doc.contents = Contents::Text(output);
            Ok(doc)
        }
    }
}

/// An input file and the root its output path is taken relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: PathBuf,
    pub base: PathBuf,
}

fn walk(dir: &Path, base: &Path, out: &mut Vec<Input>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let sub_path = entry?.path();
        if sub_path.is_dir() {
            walk(&sub_path, base, out)?;
        } else if sub_path.is_file() && is_component(&sub_path) {
            out.push(Input {
                path: sub_path,
                base: base.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn is_component(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vue"))
}

/// Expand files and directories into `.vue` inputs, sorted by path.
pub fn list_files(inputs: &[PathBuf]) -> io::Result<Vec<Input>> {
    let mut out: Vec<Input> = Vec::new();

    for p in inputs {
        if p.is_dir() {
            walk(p, p, &mut out)?;
        } else if p.is_file() {
            // Explicitly named files are taken regardless of extension.
            out.push(Input {
                path: p.clone(),
                base: p.parent().map(Path::to_path_buf).unwrap_or_default(),
            });
        }
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
