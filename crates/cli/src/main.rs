//! phl - PHLang command line driver.
//! Compiles PHLang sources to Python and runs them through an interpreter.

use bumpalo::Bump;
use clap::Parser as ClapParser;
use directories::ProjectDirs;
use log::{LevelFilter, debug, info};
use phlang_compiler::translate::{
    NativeException, describe_compiler_error, describe_diagnostic, translate,
};
use phlang_compiler::{CompileError, Compilation, Compiler, CompilerOptions};
use phlang_language::lexer::BlockCommentPolicy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

const CONFIG_FILE: &str = "phlang.json";

#[derive(ClapParser)]
#[command(name = "phl")]
#[command(about = "phl: PHLang to Python compiler")]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Config file (default: ./phlang.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Treat semantic diagnostics as errors
    #[arg(long, global = true)]
    strict: bool,
    /// Reject unterminated block comments
    #[arg(long, global = true)]
    strict_comments: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Compile a source file to Python
    Compile {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (default: input with a .py extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also print the code and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report syntax errors and semantic diagnostics without generating code
    Check { file: PathBuf },
    /// Compile and execute with a Python interpreter
    Run {
        file: PathBuf,
        #[arg(long, default_value = "python3")]
        python: String,
    },
    /// Print the token stream or syntax tree as JSON
    Dump {
        file: PathBuf,
        #[arg(long, conflicts_with = "ast", required_unless_present = "ast")]
        tokens: bool,
        #[arg(long)]
        ast: bool,
    },
    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let options = load_options(cli.config.as_deref(), cli.strict, cli.strict_comments)?;
    let compiler = Compiler::new(options);

    match cli.command {
        Commands::Compile { input, output, json } => {
            let source = read_source(&input)?;
            let compilation = compile(&compiler, &source)?;
            let output = output.unwrap_or_else(|| input.with_extension("py"));
            fs::write(&output, &compilation.code)
                .map_err(|e| format!("Hindi maisulat ang {}: {}", output.display(), e))?;
            info!("wrote {}", output.display());
            if json {
                let report = serde_json::to_string_pretty(&compilation).map_err(|e| e.to_string())?;
                println!("{}", report);
            }
        }
        Commands::Check { file } => {
            let source = read_source(&file)?;
            let arena = Bump::new();
            let program = compiler.parse(&source, &arena).map_err(|e| describe_compiler_error(&e))?;
            let diagnostics = phlang_compiler::semantic::analyze(&program);
            for d in &diagnostics {
                println!("{}", describe_diagnostic(d));
            }
            if diagnostics.is_empty() {
                println!("Walang nakitang mali.");
            } else if compiler.options().strict {
                return Err(format!("{} na mali sa semantiko", diagnostics.len()));
            }
        }
        Commands::Run { file, python } => {
            let source = read_source(&file)?;
            let start = Instant::now();
            let compilation = compile(&compiler, &source)?;
            println!("Oras ng pagkocompile: {:.4} segundo", start.elapsed().as_secs_f64());
            execute(&python, &compilation.code)?;
        }
        Commands::Dump { file, tokens, ast } => {
            let source = read_source(&file)?;
            let json = match (tokens, ast) {
                (true, _) => {
                    let tokens = compiler.tokenize(&source).map_err(|e| describe_compiler_error(&e))?;
                    serde_json::to_string_pretty(&tokens)
                }
                _ => {
                    let arena = Bump::new();
                    let program = compiler.parse(&source, &arena).map_err(|e| describe_compiler_error(&e))?;
                    serde_json::to_string_pretty(&program)
                }
            };
            println!("{}", json.map_err(|e| e.to_string())?);
        }
        Commands::Version => {
            println!("phl {}", env!("CARGO_PKG_VERSION"));
            println!("Target: Python 3");
        }
    }

    Ok(())
}

fn load_options(
    explicit: Option<&Path>,
    strict: bool,
    strict_comments: bool,
) -> Result<CompilerOptions, String> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(),
    };
    let mut options = match path {
        Some(path) => {
            info!("loading config from {}", path.display());
            CompilerOptions::load(&path).map_err(|e| e.to_string())?
        }
        None => CompilerOptions::default(),
    };
    if strict {
        options.strict = true;
    }
    if strict_comments {
        options.block_comments = BlockCommentPolicy::Error;
    }
    Ok(options)
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let dirs = ProjectDirs::from("", "", "phlang")?;
    let user = dirs.config_dir().join(CONFIG_FILE);
    user.is_file().then_some(user)
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Hindi mabasa ang {}: {}", path.display(), e))
}

fn compile(compiler: &Compiler, source: &str) -> Result<Compilation, String> {
    compiler.compile(source).map_err(|e| match &e {
        CompileError::Syntax(err) => describe_compiler_error(err),
        CompileError::Rejected { diagnostics } => {
            let mut lines: Vec<String> = diagnostics.iter().map(describe_diagnostic).collect();
            lines.push(e.to_string());
            lines.join("\n")
        }
    })
}

/// Feed `code` to the interpreter on stdin. Output passes straight through;
/// a failing run is reported by its translated exception.
fn execute(python: &str, code: &str) -> Result<(), String> {
    let mut child = Command::new(python)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Hindi mapatakbo ang {}: {}", python, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(code.as_bytes()).map_err(|e| e.to_string())?;
    }

    let output = child.wait_with_output().map_err(|e| e.to_string())?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("interpreter stderr:\n{}", stderr);
    match NativeException::from_traceback(&stderr) {
        Some(exception) => Err(format!("Error: {}", translate(&exception))),
        None => Err(format!("Nabigo ang {} ({})", python, output.status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dump_requires_a_mode() {
        assert!(Cli::try_parse_from(["phl", "dump", "a.phl"]).is_err());
        assert!(Cli::try_parse_from(["phl", "dump", "a.phl", "--tokens", "--ast"]).is_err());
        assert!(Cli::try_parse_from(["phl", "dump", "a.phl", "--ast"]).is_ok());
    }

    #[test]
    fn test_flags_override_config() {
        let path = std::env::temp_dir().join(format!("phl-cli-test-{}.json", std::process::id()));
        fs::write(&path, r#"{ "indent_width": 2 }"#).unwrap();
        let options = load_options(Some(&path), true, true);
        let _ = fs::remove_file(&path);

        let options = options.unwrap();
        assert!(options.strict);
        assert_eq!(options.block_comments, BlockCommentPolicy::Error);
        assert_eq!(options.indent_width, 2);
    }

    #[test]
    fn test_compile_failures_are_described() {
        let err = compile(&Compiler::default(), "idikta 'bukas").unwrap_err();
        assert_eq!(err, "Mali sa linya 1, hanay 8: Hindi nakumpleto ang string");

        let strict = Compiler::new(CompilerOptions { strict: true, ..CompilerOptions::default() });
        let err = compile(&strict, "idikta x;").unwrap_err();
        assert_eq!(
            err,
            "Mali sa semantiko: Ang variable na 'x' ay ginamit bago pa naideklara\n\
             Hindi itinuloy ang pagkocompile: 1 na mali sa semantiko"
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let missing = Path::new("/nonexistent/phlang.json");
        assert!(load_options(Some(missing), false, false).is_err());
    }
}
