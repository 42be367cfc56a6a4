use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use sfcc::compiler::Compilers;
use sfcc::config::Config;
use sfcc::directive::DirectiveMode;
use sfcc::error::Error;
use sfcc::{Contents, Document, Input};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "sfcc", version, about = "SFC Compiler: normalize single-file components")]
struct Cli {
    /// Input file(s) or directory
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (default: stdout)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Config file path (default: sfcc.config.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compile `lang="coffee"` scripts
    #[arg(long)]
    coffee: bool,

    /// Compile `lang="sass"` styles
    #[arg(long)]
    sass: bool,

    /// Strip blank lines from every block
    #[arg(long)]
    remove_blank_lines: bool,

    /// Emit a default-export stub when there is no script block
    #[arg(long)]
    empty_export: bool,

    /// Scan the whole document for lang/scoped directives
    #[arg(long)]
    document_directives: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config JSON in {}", path.display()))
}

fn write_output(doc: &Document, out_dir: &Path) -> Result<()> {
    let Contents::Text(text) = &doc.contents else {
        return Ok(());
    };
    let target = out_dir.join(doc.relative());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    fs::write(&target, text).with_context(|| format!("cannot write {}", target.display()))
}

fn compile_input(input: &Input, config: &Config, compilers: &Compilers) -> Result<Document> {
    let doc = Document::read(&input.path, &input.base)
        .with_context(|| format!("cannot read {}", input.path.display()))?;
    Ok(sfcc::transform(doc, config, compilers)?)
}

fn report(input: &Input, e: &anyhow::Error) {
    // Recompile failures are logged by the recompiler.
    if matches!(e.downcast_ref::<Error>(), Some(Error::Compile { .. })) {
        log::debug!("{}: {:#}", input.path.display(), e);
    } else {
        log::error!("{}: {:#}", input.path.display(), e);
    }
}

/// Write or print every compiled document; returns the number of failures.
fn emit(files: &[Input], results: Vec<Result<Document>>, out_dir: Option<&Path>) -> usize {
    let mut failed = 0;
    for (input, result) in files.iter().zip(results) {
        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                report(input, &e);
                failed += 1;
                continue;
            }
        };
        match out_dir {
            Some(out_dir) => match write_output(&doc, out_dir) {
                Ok(()) => log::info!("compiled {}", input.path.display()),
                Err(e) => {
                    report(input, &e);
                    failed += 1;
                }
            },
            None => {
                if let Contents::Text(text) = &doc.contents {
                    print!("{}", text);
                }
            }
        }
    }
    failed
}

fn run(cli: Cli) -> Result<()> {
    // Load config
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let default = Path::new("sfcc.config.json");
            if default.is_file() {
                load_config(default)?
            } else {
                Config::default()
            }
        }
    };

    // CLI overrides
    if cli.coffee {
        config.coffee.compile = true;
    }
    if cli.sass {
        config.sass.compile = true;
    }
    if cli.remove_blank_lines {
        config.remove_blank_lines = true;
    }
    if cli.empty_export {
        config.empty_export = true;
    }
    if cli.document_directives {
        config.directives = DirectiveMode::Document;
    }

    let files = sfcc::list_files(&cli.inputs)?;
    if files.is_empty() {
        bail!("no input files found");
    }

    let compilers = Compilers::from_config(&config);
    let results: Vec<Result<Document>> = files
        .par_iter()
        .map(|input| compile_input(input, &config, &compilers))
        .collect();

    let failed = emit(&files, results, cli.out_dir.as_deref());

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, files.len());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfcc::error::CompileError;

    fn input(root: &Path, name: &str) -> Input {
        Input {
            path: root.join("src").join(name),
            base: root.join("src"),
        }
    }

    fn compiled(root: &Path, name: &str) -> Document {
        Document::new(root.join("src").join(name), root.join("src"), "<template>x</template>\n")
    }

    #[test]
    fn test_write_failure_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let out = root.join("out");
        fs::create_dir_all(&out).unwrap();
        // A plain file where the `blocked/` output directory would go.
        fs::write(out.join("blocked"), "").unwrap();

        let files = vec![input(root, "blocked/A.vue"), input(root, "B.vue")];
        let results = vec![
            Ok(compiled(root, "blocked/A.vue")),
            Ok(compiled(root, "B.vue")),
        ];
        let failed = emit(&files, results, Some(&out));
        assert_eq!(failed, 1);
        assert_eq!(
            fs::read_to_string(out.join("B.vue")).unwrap(),
            "<template>x</template>\n"
        );
    }

    #[test]
    fn test_failed_results_counted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let out = root.join("out");
        let files = vec![input(root, "A.vue"), input(root, "B.vue"), input(root, "C.vue")];
        let results = vec![
            Err(anyhow::Error::new(Error::Compile {
                lang: "coffee",
                path: root.join("src/A.vue"),
                source: CompileError::Message("unexpected indentation".to_string()),
            })),
            Err(anyhow::anyhow!("cannot read B.vue")),
            Ok(compiled(root, "C.vue")),
        ];
        assert_eq!(emit(&files, results, Some(&out)), 2);
        assert!(out.join("C.vue").is_file());
        assert!(!out.join("A.vue").exists());
    }
}
