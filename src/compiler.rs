use crate::config::Config;
use crate::error::CompileError;
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

pub type CompileOptions = Map<String, Value>;

pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError>;
}

pub trait StyleCompiler: Send + Sync {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError>;
}

impl<F> ScriptCompiler for F
where
    F: Fn(&str, &CompileOptions) -> Result<String, CompileError> + Send + Sync,
{
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        self(source, options)
    }
}

impl<F> StyleCompiler for F
where
    F: Fn(&str, &CompileOptions) -> Result<String, CompileError> + Send + Sync,
{
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        self(source, options)
    }
}

pub struct Compilers {
    pub script: Box<dyn ScriptCompiler>,
    pub style: Box<dyn StyleCompiler>,
}

impl Compilers {
    pub fn from_config(config: &Config) -> Self {
        Compilers {
            script: Box::new(CoffeeCli::new(config.coffee.command.clone())),
            style: Box::new(SassCli::new(config.sass.command.clone())),
        }
    }
}

impl Default for Compilers {
    fn default() -> Self {
        Compilers::from_config(&Config::default())
    }
}

fn flag(options: &CompileOptions, key: &str) -> Option<bool> {
    options.get(key).and_then(Value::as_bool)
}

fn run_with_stdin(command: &[String], args: &[String], input: &str) -> Result<String, CompileError> {
    let Some((program, leading)) = command.split_first() else {
        return Err(CompileError::Message("empty compiler command".to_string()));
    };
    let resolved = which::which(program).map_err(|_| CompileError::NotFound(program.clone()))?;
    log::debug!("running `{} {}`", command.join(" "), args.join(" "));

    let io_err = |source: io::Error| CompileError::Io {
        program: program.clone(),
        source,
    };
    let mut child = Command::new(resolved)
        .args(leading)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(io_err)?;

    // stdin is written on its own thread while the output pipes drain.
    let stdin = child.stdin.take();
    let (written, output) = thread::scope(|scope| {
        let writer = scope.spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        });
        let output = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        (written, output)
    });

    let output = output.map_err(io_err)?;
    if !output.status.success() {
        return Err(CompileError::Failed {
            program: program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    written.map_err(io_err)?;
    String::from_utf8(output.stdout)
        .map_err(|e| CompileError::Message(format!("`{}` produced non-UTF-8 output: {}", program, e)))
}

/// `coffee --stdio --print`
#[derive(Debug, Clone)]
pub struct CoffeeCli {
    command: Vec<String>,
}

impl CoffeeCli {
    pub fn new(command: Vec<String>) -> Self {
        CoffeeCli { command }
    }

    pub fn args(options: &CompileOptions) -> Vec<String> {
        let mut args = vec!["--stdio".to_string(), "--print".to_string()];
        if flag(options, "bare") == Some(true) {
            args.push("--bare".to_string());
        }
        if flag(options, "header") != Some(true) {
            args.push("--no-header".to_string());
        }
        if flag(options, "literate") == Some(true) {
            args.push("--literate".to_string());
        }
        if flag(options, "transpile") == Some(true) {
            args.push("--transpile".to_string());
        }
        args
    }
}

impl ScriptCompiler for CoffeeCli {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        run_with_stdin(&self.command, &Self::args(options), source)
    }
}

/// `sass --stdin --indented --no-source-map`
#[derive(Debug, Clone)]
pub struct SassCli {
    command: Vec<String>,
}

impl SassCli {
    pub fn new(command: Vec<String>) -> Self {
        SassCli { command }
    }

    pub fn args(options: &CompileOptions) -> Result<Vec<String>, CompileError> {
        let mut args: Vec<String> = ["--stdin", "--indented", "--no-source-map"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(style) = options.get("style").and_then(Value::as_str) {
            args.push(format!("--style={}", style));
        }
        if flag(options, "charset") == Some(false) {
            args.push("--no-charset".to_string());
        }
        if flag(options, "quietDeps") == Some(true) {
            args.push("--quiet-deps".to_string());
        }

        // Relative imports resolve against the component's directory.
        if let Some(raw) = options.get("url").and_then(Value::as_str) {
            let url = url::Url::parse(raw).map_err(|_| CompileError::InvalidUrl(raw.to_string()))?;
            if let Some(dir) = url
                .to_file_path()
                .ok()
                .and_then(|p| p.parent().map(PathBuf::from))
            {
                args.push(format!("--load-path={}", dir.display()));
            }
        }
        if let Some(paths) = options.get("loadPaths").and_then(Value::as_array) {
            for path in paths.iter().filter_map(Value::as_str) {
                args.push(format!("--load-path={}", path));
            }
        }
        Ok(args)
    }
}

impl StyleCompiler for SassCli {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        let css = run_with_stdin(&self.command, &Self::args(options)?, source)?;
        Ok(css.trim_end_matches('\n').to_string())
    }
}
