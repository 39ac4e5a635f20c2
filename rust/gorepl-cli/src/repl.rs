//! Interactive REPL for Go.
//!
//! The loop reads one line at a time from a [`LineSource`], buffers it in an
//! [`Accumulator`] until a fragment is complete, synthesizes a whole program
//! through the [`Session`], and hands it to a [`Runner`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gorepl_core::imports::KNOWN_PACKAGES;
use gorepl_core::{
    Accumulator, Category, CompletenessRule, ImportMode, LineOutcome, Runner, Session, Store,
};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History, SearchDirection};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, info, warn};

use crate::colors::{bold, cyan, gray, green, red, yellow};
use crate::config::{GoreplConfig, ReplSection};
use crate::runner::GoRunner;

/// Go keywords for tab completion.
const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Predeclared identifiers for tab completion.
const BUILTINS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover", "any", "bool", "byte",
    "comparable", "error", "float32", "float64", "int", "int8", "int16", "int32", "int64", "rune",
    "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr", "true", "false", "iota",
    "nil",
];

/// REPL commands for tab completion.
const COMMANDS: &[&str] = &[
    ":help", ":quit", ":reset", ":env", ":source", ":clear", ":history",
];

/// Environment variable used to override REPL history location.
pub const REPL_HISTORY_PATH_ENV: &str = "GOREPL_HISTORY_PATH";

const BANNER: &str = " ---------------------------------------\n\
                      |==Golang Interactive Code Environment==|\n \
                      ---------------------------------------\n";

/// Completer for the REPL.
struct GoCompleter;

impl Completer for GoCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || "([{,;.".contains(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..pos];
        Ok((start, completion_candidates(line, word)))
    }
}

impl Hinter for GoCompleter {
    type Hint = String;
}

impl Highlighter for GoCompleter {}

impl Validator for GoCompleter {}

impl Helper for GoCompleter {}

fn completion_candidates(line: &str, word: &str) -> Vec<Pair> {
    if word.is_empty() {
        return Vec::new();
    }

    let pool: Vec<&str> = if line.trim_start() == word && word.starts_with(':') {
        COMMANDS.to_vec()
    } else {
        let packages = KNOWN_PACKAGES.iter().map(|(qualifier, _)| qualifier);
        KEYWORDS
            .iter()
            .chain(BUILTINS)
            .chain(packages)
            .copied()
            .collect()
    };

    pool.into_iter()
        .filter(|candidate| candidate.starts_with(word))
        .map(|candidate| Pair {
            display: candidate.to_string(),
            replacement: candidate.to_string(),
        })
        .collect()
}

// =============================================================================
// Line sources
// =============================================================================

/// What one read from the line source produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user pressed Ctrl-C.
    Interrupted,
    /// No more input.
    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Editor(#[from] ReadlineError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Supplies input lines to the REPL.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadError>;

    /// Previously entered lines, oldest first.
    fn history(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Terminal line source backed by `rustyline`.
pub struct EditorSource {
    editor: Editor<GoCompleter, DefaultHistory>,
}

impl EditorSource {
    pub fn new() -> Result<Self, ReadlineError> {
        let config = rustyline::Config::builder().auto_add_history(true).build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(GoCompleter));
        Ok(Self { editor })
    }

    pub fn load_history(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        if let Err(err) = self.editor.load_history(path) {
            eprintln!(
                "{} failed to load history from {}: {}",
                red("Warning:"),
                path.display(),
                err
            );
        }
    }

    pub fn save_history(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!(
                    "{} failed to create history directory {}: {}",
                    red("Warning:"),
                    parent.display(),
                    err
                );
            }
        }
        if let Err(err) = self.editor.save_history(path) {
            eprintln!(
                "{} failed to save history to {}: {}",
                red("Warning:"),
                path.display(),
                err
            );
        }
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ReadError> {
        let marker = prompt.trim_end();
        let styled = if marker == "go>" {
            format!("{}{}", green(marker), &prompt[marker.len()..])
        } else {
            format!("{}{}", gray(marker), &prompt[marker.len()..])
        };

        match self.editor.readline(&styled) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn history(&self) -> Vec<String> {
        let history = self.editor.history();
        (0..history.len())
            .filter_map(|i| match history.get(i, SearchDirection::Forward) {
                Ok(Some(result)) => Some(result.entry.into_owned()),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Help,
    Reset,
    Clear,
    History,
    Env,
    Source,
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedCommand {
    NotACommand,
    UnknownCommand,
    InvalidUsage(&'static str),
    Command(ReplCommand),
}

fn parse_repl_command(line: &str) -> ParsedCommand {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return ParsedCommand::NotACommand;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let has_arg = parts.next().map(str::trim).is_some_and(|arg| !arg.is_empty());

    let command = match cmd {
        ":quit" | ":q" => ReplCommand::Quit,
        ":help" | ":h" => ReplCommand::Help,
        ":reset" | ":r" => ReplCommand::Reset,
        ":clear" | ":c" => ReplCommand::Clear,
        ":history" => ReplCommand::History,
        ":env" => ReplCommand::Env,
        ":source" | ":s" => ReplCommand::Source,
        _ => return ParsedCommand::UnknownCommand,
    };
    if has_arg {
        return ParsedCommand::InvalidUsage("commands take no arguments");
    }
    ParsedCommand::Command(command)
}

// =============================================================================
// The loop
// =============================================================================

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// `exit` typed at an empty buffer.
    ExitSentinel,
    /// `:quit`.
    Quit,
    /// The line source ran dry.
    EndOfInput,
    /// The line source failed.
    ReadFailed,
}

impl Shutdown {
    pub fn exit_code(self) -> i32 {
        match self {
            Shutdown::ReadFailed => 1,
            _ => 0,
        }
    }
}

/// Behavior knobs for a [`Repl`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplOptions {
    pub completeness: CompletenessRule,
    pub imports: ImportMode,
    pub rollback_on_failure: bool,
}

impl From<&ReplSection> for ReplOptions {
    fn from(section: &ReplSection) -> Self {
        Self {
            completeness: section.completeness,
            imports: section.imports,
            rollback_on_failure: section.rollback_on_failure,
        }
    }
}

/// A REPL session wired to its line source, runner and console.
pub struct Repl<S, R, W> {
    source: S,
    runner: R,
    out: W,
    session: Session,
    input: Accumulator,
    rollback_on_failure: bool,
}

impl<S: LineSource, R: Runner, W: Write> Repl<S, R, W> {
    pub fn new(source: S, runner: R, out: W, options: ReplOptions) -> Self {
        Self {
            source,
            runner,
            out,
            session: Session::with_imports(options.imports),
            input: Accumulator::new(options.completeness),
            rollback_on_failure: options.rollback_on_failure,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until exit, end of input, or a read failure.
    pub fn run(&mut self) -> io::Result<Shutdown> {
        writeln!(self.out, "{}", BANNER)?;
        writeln!(
            self.out,
            "{}\n",
            bold(&cyan("Go REPL (Ctrl+D or 'exit' to quit, :help for commands)"))
        )?;

        let shutdown = loop {
            let prompt = self.input.prompt();
            match self.source.read_line(prompt) {
                Ok(ReadOutcome::Line(line)) => {
                    if let Some(shutdown) = self.handle_line(&line)? {
                        break shutdown;
                    }
                }
                Ok(ReadOutcome::Interrupted) => {
                    self.input.clear();
                    writeln!(self.out, "{}", gray("(Ctrl-D or 'exit' to quit)"))?;
                }
                Ok(ReadOutcome::Eof) => break Shutdown::EndOfInput,
                Err(err) => {
                    writeln!(self.out, "{} {}", red("Error reading input:"), err)?;
                    return Ok(Shutdown::ReadFailed);
                }
            }
        };

        writeln!(self.out, "\n{}", cyan("Goodbye!"))?;
        info!(?shutdown, "repl finished");
        Ok(shutdown)
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Option<Shutdown>> {
        // Commands only on a fresh prompt
        if self.input.is_empty() {
            match parse_repl_command(line) {
                ParsedCommand::NotACommand => {}
                ParsedCommand::UnknownCommand => {
                    writeln!(
                        self.out,
                        "{} unknown command. Type :help for usage.",
                        red("Error:")
                    )?;
                    return Ok(None);
                }
                ParsedCommand::InvalidUsage(usage) => {
                    writeln!(self.out, "{} {}", red("Error:"), usage)?;
                    return Ok(None);
                }
                ParsedCommand::Command(command) => return self.run_command(command),
            }
        }

        match self.input.accept_line(line) {
            LineOutcome::Pending => Ok(None),
            LineOutcome::Exit => Ok(Some(Shutdown::ExitSentinel)),
            LineOutcome::Fragment(fragment) => {
                self.evaluate(&fragment)?;
                Ok(None)
            }
        }
    }

    fn run_command(&mut self, command: ReplCommand) -> io::Result<Option<Shutdown>> {
        match command {
            ReplCommand::Quit => return Ok(Some(Shutdown::Quit)),
            ReplCommand::Help => print_help(&mut self.out)?,
            ReplCommand::Reset => {
                self.session.reset();
                info!("session reset");
                writeln!(self.out, "{}", gray("Session state reset."))?;
            }
            ReplCommand::Clear => {
                write!(self.out, "\x1b[2J\x1b[H")?; // Clear screen and move cursor to top
                self.out.flush()?;
            }
            ReplCommand::History => {
                for (i, entry) in self.source.history().iter().enumerate() {
                    writeln!(self.out, "{:>4} {}", gray(&(i + 1).to_string()), entry)?;
                }
            }
            ReplCommand::Env => print_env(&mut self.out, &self.session)?,
            ReplCommand::Source => write!(self.out, "{}", self.session.snapshot())?,
        }
        Ok(None)
    }

    /// Synthesize, run and report one fragment.
    fn evaluate(&mut self, fragment: &str) -> io::Result<()> {
        let submission = match self.session.submit(fragment) {
            Ok(submission) => submission,
            Err(err) => {
                writeln!(self.out, "{} {}", yellow("Unsupported input:"), err)?;
                return Ok(());
            }
        };
        debug!(category = %submission.category, "running submission");

        match self.runner.execute(&submission.program) {
            Ok(exec) if exec.success => {
                write!(self.out, "{}", exec.output)?;
            }
            Ok(exec) => {
                writeln!(
                    self.out,
                    "{} {}",
                    red("Execution error:"),
                    exec.output.trim_end()
                )?;
                self.discard_failed(submission.category)?;
            }
            Err(err) => {
                warn!(%err, "runner unavailable");
                writeln!(self.out, "{} {}", red("Execution error:"), err)?;
                self.discard_failed(submission.category)?;
            }
        }
        self.out.flush()
    }

    fn discard_failed(&mut self, category: Category) -> io::Result<()> {
        if !self.rollback_on_failure {
            return Ok(());
        }
        if self.session.retract(category).is_some() {
            writeln!(
                self.out,
                "{}",
                gray(&format!("(discarded failed {})", category))
            )?;
        }
        Ok(())
    }
}

fn print_env<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    if session.is_empty() {
        return writeln!(out, "{}", gray("No declarations yet."));
    }
    for store in Store::ALL {
        let fragments = session.store(store);
        if fragments.is_empty() {
            continue;
        }
        writeln!(out, "{} ({}):", bold(store.label()), fragments.len())?;
        for fragment in fragments {
            for line in fragment.lines() {
                writeln!(out, "  {}", cyan(line))?;
            }
        }
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", bold("Commands:"))?;
    let rows = [
        (":help, :h", "Show this help"),
        (":quit, :q", "Exit the REPL"),
        (":reset, :r", "Forget all declarations"),
        (":env", "Show stored declarations"),
        (":source, :s", "Print the program accumulated so far"),
        (":clear, :c", "Clear terminal screen"),
        (":history", "Show command history"),
    ];
    for (name, about) in rows {
        writeln!(out, "  {}  {}", cyan(name), gray(about))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", gray("Input:"))?;
    writeln!(
        out,
        "  {}",
        gray("• Multi-line input continues until braces balance")
    )?;
    writeln!(out, "  {}", gray("• An empty line submits the buffer as-is"))?;
    writeln!(
        out,
        "  {}",
        gray("• Types, vars, funcs and := bindings carry into later input")
    )?;
    writeln!(out, "  {}", gray("• 'exit' or Ctrl-D quits"))?;
    Ok(())
}

// =============================================================================
// History
// =============================================================================

const HISTORY_DIR: &str = ".gorepl";
const HISTORY_FILE: &str = "repl_history";

/// Where line-editor history lives.
///
/// An override that is absolute is taken as-is. `~`, `~/...` and plain
/// relative overrides are anchored at `home`. Without an override the file
/// is `<home>/.gorepl/repl_history`. `None` when a home-relative location
/// is needed but no home is known.
fn resolve_history_path(home: Option<&Path>, override_path: Option<&str>) -> Option<PathBuf> {
    let configured = override_path.map(str::trim).filter(|raw| !raw.is_empty());
    let Some(raw) = configured else {
        return home.map(|home| home.join(HISTORY_DIR).join(HISTORY_FILE));
    };

    match raw.strip_prefix('~') {
        Some("") => home.map(Path::to_path_buf),
        Some(rest) if rest.starts_with('/') => home.map(|home| home.join(&rest[1..])),
        _ if Path::new(raw).is_absolute() => Some(PathBuf::from(raw)),
        _ => home.map(|home| home.join(raw)),
    }
}

fn get_history_path() -> Option<PathBuf> {
    let override_path = std::env::var(REPL_HISTORY_PATH_ENV).ok();
    resolve_history_path(dirs::home_dir().as_deref(), override_path.as_deref())
}

/// Run the terminal REPL with `config`; returns the process exit code.
pub fn run_repl(config: &GoreplConfig) -> i32 {
    let mut source = match EditorSource::new() {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{} cannot start line editor: {}", red("error:"), err);
            return 1;
        }
    };

    let history_path = if config.repl.history {
        get_history_path()
    } else {
        None
    };
    if let Some(ref path) = history_path {
        source.load_history(path);
    }

    let runner = GoRunner::from_config(&config.runner);
    let mut repl = Repl::new(
        source,
        runner,
        io::stdout(),
        ReplOptions::from(&config.repl),
    );

    let code = match repl.run() {
        Ok(shutdown) => shutdown.exit_code(),
        Err(err) => {
            eprintln!("{} writing output: {}", red("error:"), err);
            1
        }
    };

    if let Some(ref path) = history_path {
        repl.source_mut().save_history(path);
    }
    code
}
