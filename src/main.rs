use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rtranspiler::{
  BlockStyle, Options, Precedence, TranspileResult, parse_with, tokenize, transpile_with,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Translate a small imperative language into C-family source text.
#[derive(Debug, Parser)]
#[command(name = "rtranspiler", version, about)]
struct Args {
  /// Source file to translate. Reads stdin when omitted or `-`.
  input: Option<PathBuf>,

  /// Write the result to this file instead of stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// TOML file with dialect options.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// How conditions group operators: `flat` or `standard`.
  #[arg(long)]
  precedence: Option<Precedence>,

  /// Where blocks end: `keyword` or `explicit`.
  #[arg(long)]
  blocks: Option<BlockStyle>,

  /// What to print.
  #[arg(long, value_enum, default_value_t = Emit::Code)]
  emit: Emit,

  /// More log output on stderr; repeat for more detail.
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
  /// Generated target code.
  Code,
  /// One token per line.
  Tokens,
  /// The parsed syntax tree.
  Ast,
}

fn main() -> anyhow::Result<ExitCode> {
  let args = Args::parse();
  init_logging(args.verbose);

  let status = run(
    &args,
    io::stdin().lock(),
    &mut io::stdout().lock(),
    &mut io::stderr().lock(),
  )?;
  Ok(ExitCode::from(status))
}

/// One full run of the driver. Returns the process exit status: `1` when the
/// source fails to translate, after the diagnostic is written to `stderr`.
fn run(
  args: &Args,
  stdin: impl Read,
  stdout: &mut impl Write,
  stderr: &mut impl Write,
) -> anyhow::Result<u8> {
  let options = resolve_options(args)?;
  let source = read_input(args.input.as_deref(), stdin)?;

  let text = match render(&source, &options, args.emit) {
    Ok(text) => text,
    Err(err) => {
      writeln!(stderr, "{}", err.render(&source)).context("could not write stderr")?;
      return Ok(1);
    }
  };

  write_output(args.output.as_deref(), &text, stdout)?;
  Ok(0)
}

fn init_logging(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

/// Config file first, then command-line overrides.
fn resolve_options(args: &Args) -> anyhow::Result<Options> {
  let mut options = match &args.config {
    Some(path) => Options::load(path)?,
    None => Options::default(),
  };
  if let Some(precedence) = args.precedence {
    options.precedence = precedence;
  }
  if let Some(blocks) = args.blocks {
    options.blocks = blocks;
  }

  info!(precedence = %options.precedence, blocks = %options.blocks, "resolved options");
  Ok(options)
}

fn read_input(path: Option<&Path>, mut stdin: impl Read) -> anyhow::Result<String> {
  match path {
    Some(path) if path != Path::new("-") => fs::read_to_string(path)
      .with_context(|| format!("could not read {}", path.display())),
    _ => {
      let mut source = String::new();
      stdin
        .read_to_string(&mut source)
        .context("could not read stdin")?;
      Ok(source)
    }
  }
}

fn render(source: &str, options: &Options, mode: Emit) -> TranspileResult<String> {
  match mode {
    Emit::Code => transpile_with(source, options).map(|code| code + "\n"),
    Emit::Tokens => Ok(
      tokenize(source)?
        .iter()
        .map(|token| format!("{token}\n"))
        .collect(),
    ),
    Emit::Ast => {
      let program = parse_with(tokenize(source)?, options)?;
      Ok(format!("{program:#?}\n"))
    }
  }
}

fn write_output(path: Option<&Path>, text: &str, stdout: &mut impl Write) -> anyhow::Result<()> {
  match path {
    Some(path) => {
      fs::write(path, text).with_context(|| format!("could not write {}", path.display()))?;
      info!(path = %path.display(), "wrote output");
    }
    None => stdout
      .write_all(text.as_bytes())
      .context("could not write stdout")?,
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use tempfile::TempDir;

  fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("rtranspiler").chain(argv.iter().copied()))
      .expect("arguments should parse")
  }

  /// Run the driver on `stdin`, returning status, stdout and stderr.
  fn run_with(argv: &[&str], stdin: &str) -> (u8, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = run(&args(argv), stdin.as_bytes(), &mut stdout, &mut stderr)
      .expect("driver should not fail");
    (
      status,
      String::from_utf8(stdout).unwrap(),
      String::from_utf8(stderr).unwrap(),
    )
  }

  #[test]
  fn reads_stdin_when_input_is_omitted_or_dash() {
    let expected = (0, "x = (1 + 2);\n".to_string(), String::new());
    assert_eq!(run_with(&[], "x = 1 + 2"), expected);
    assert_eq!(run_with(&["-"], "x = 1 + 2"), expected);
  }

  #[test]
  fn reads_input_file_and_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("loop.src");
    let output = dir.path().join("loop.js");
    fs::write(&input, "while n > 0:\nn = n - 1").unwrap();

    let (status, stdout, _) = run_with(
      &[input.to_str().unwrap(), "-o", output.to_str().unwrap()],
      "",
    );
    assert_eq!(status, 0);
    assert_eq!(stdout, "");
    assert_eq!(
      fs::read_to_string(&output).unwrap(),
      "while ((n > 0)) { n = (n - 1); }\n"
    );
  }

  #[test]
  fn flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("dialect.toml");
    fs::write(&config, "precedence = \"standard\"\nblocks = \"explicit\"\n").unwrap();
    let config = config.to_str().unwrap();

    let options = resolve_options(&args(&["-c", config])).unwrap();
    assert_eq!(
      options,
      Options {
        precedence: Precedence::Standard,
        blocks: BlockStyle::Explicit,
      }
    );

    let options = resolve_options(&args(&["-c", config, "--precedence", "flat"])).unwrap();
    assert_eq!(options.precedence, Precedence::Flat);
    assert_eq!(options.blocks, BlockStyle::Explicit);

    let options = resolve_options(&args(&["-c", config, "--blocks", "keyword"])).unwrap();
    assert_eq!(options.precedence, Precedence::Standard);
    assert_eq!(options.blocks, BlockStyle::Keyword);
  }

  #[test]
  fn missing_config_file_is_a_driver_error() {
    let err = resolve_options(&args(&["-c", "/definitely/not/here.toml"])).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.toml"), "{err}");
  }

  #[test]
  fn rejects_unknown_flag_values() {
    let result = Args::try_parse_from(["rtranspiler", "--blocks", "python"]);
    assert!(result.is_err());
  }

  #[test]
  fn emits_one_token_per_line() {
    let text = render("x = 1", &Options::default(), Emit::Tokens).unwrap();
    assert_eq!(text, "identifier x\noperator =\nnumber 1\n");
  }

  #[test]
  fn emits_debug_tree() {
    let text = render("x = 1", &Options::default(), Emit::Ast).unwrap();
    assert!(text.starts_with("Program {"), "{text}");
    assert!(text.contains("Assignment {"), "{text}");
    assert!(text.contains("\"x\""), "{text}");
  }

  #[test]
  fn emits_code_with_trailing_newline() {
    let text = render("f(1)", &Options::default(), Emit::Code).unwrap();
    assert_eq!(text, "f(1);\n");
  }

  #[test]
  fn render_respects_options() {
    let options = Options {
      precedence: Precedence::Standard,
      ..Options::default()
    };
    let text = render("while a or b and c:\nx = 1", &options, Emit::Code).unwrap();
    assert_eq!(text, "while ((a or (b and c))) { x = 1; }\n");
  }

  #[test]
  fn render_propagates_pipeline_errors() {
    assert!(render("x = @", &Options::default(), Emit::Tokens).is_err());
    assert!(render("x = ", &Options::default(), Emit::Ast).is_err());
  }

  #[test]
  fn pipeline_error_prints_diagnostic_and_fails() {
    let (status, stdout, stderr) = run_with(&[], "x = 1\ny = x @ 2");
    assert_eq!(status, 1);
    assert_eq!(stdout, "");
    assert_eq!(
      stderr,
      "2:7: y = x @ 2\n           ^ no token matches at offset 12\n"
    );
  }
}
