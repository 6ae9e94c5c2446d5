//! Native Rust implementation of the libopt command line option parser.
//!
//! Declarative option parsing with an explicit parser value:
//! - an ordered `OptionTable` of descriptors, scanned in table order
//! - typed storage cells (`FlagCell`, `ValueCell`) instead of untyped
//!   target pointers
//! - a `Parser` holding the usage/version strings and the diagnostic sink,
//!   so independent parses in one process cannot interfere

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

// ============================================================================
// Result and Error types
// ============================================================================

pub type Result<T> = std::result::Result<T, Error>;

/// Status code for missing-value and unrecognized-option errors.
pub const ERROR: i32 = -1;
/// Status code reported when `--help` was handled.
pub const HELP: i32 = -2;

/// Errors that abort a parse. Codes -1 to -99 are reserved for this
/// library; handler-defined codes should be -100 or lower.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("option requires an argument -- {0}")]
    MissingValue(String),

    #[error("unrecognized option: '{0}'")]
    Unrecognized(String),

    #[error("help requested")]
    Help,

    #[error("handler aborted with status {0}")]
    Handler(i32),
}

impl Error {
    /// The numeric status code of the original C API.
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingValue(_) | Error::Unrecognized(_) => ERROR,
            Error::Help => HELP,
            Error::Handler(code) => *code,
        }
    }

    pub fn is_help(&self) -> bool {
        matches!(self, Error::Help)
    }
}

// ============================================================================
// Storage cells
// ============================================================================

/// Shared boolean cell targeted by set-flag and clear-flag options.
///
/// Cells are cheap handles: the caller keeps one clone and the option table
/// another, and the parser mutates the shared storage in place.
#[derive(Debug, Clone, Default)]
pub struct FlagCell(Rc<Cell<bool>>);

impl FlagCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    fn set(&self, x: bool) {
        self.0.set(x);
    }
}

/// Shared string cell targeted by value-assigning options.
#[derive(Debug, Clone, Default)]
pub struct ValueCell(Rc<RefCell<Option<String>>>);

impl ValueCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assigned value, or `None` if the option was never seen.
    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    fn set(&self, value: &str) {
        *self.0.borrow_mut() = Some(value.to_string());
    }
}

// ============================================================================
// Option descriptors
// ============================================================================

/// Storage effect applied when an option matches.
#[derive(Clone)]
enum Action {
    SetFlag(FlagCell),
    ClearFlag(FlagCell),
    Assign(ValueCell),
    None,
}

/// Option callback. Receives the resolved value (guaranteed `Some` for a
/// value-requiring option). Returns 0 to continue parsing; a nonzero status
/// aborts the parse and becomes its result.
pub type Handler = Rc<dyn Fn(Option<&str>) -> i32>;

/// Presets dispatched by the parser itself, since they need access to the
/// table and the configured usage/version strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Help,
    Version,
}

/// One entry of an option table.
///
/// Every descriptor carries at least one name: the constructors take either
/// a long name (`Opt::new`) or a short letter (`Opt::short_only`), so an
/// unmatchable descriptor cannot be built.
pub struct Opt {
    short: Option<char>,
    long: Option<String>,
    description: String,
    takes_value: bool,
    action: Action,
    handler: Option<Handler>,
    builtin: Option<Builtin>,
}

impl Opt {
    /// Descriptor with a long name (matched as `--name`).
    pub fn new(long: &str) -> Self {
        Opt {
            short: None,
            long: Some(long.to_string()),
            description: String::new(),
            takes_value: false,
            action: Action::None,
            handler: None,
            builtin: None,
        }
    }

    /// Descriptor with a short letter only (matched as `-x`).
    pub fn short_only(c: char) -> Self {
        Opt {
            short: Some(c),
            long: None,
            description: String::new(),
            takes_value: false,
            action: Action::None,
            handler: None,
            builtin: None,
        }
    }

    /// The `--help` preset: prints the usage text through the diagnostic
    /// sink. Under the default hosted policy the process then exits
    /// successfully; with `Parser::exit_on_help(false)` the parse aborts
    /// with `Error::Help` instead.
    pub fn help() -> Self {
        let mut opt = Opt::new("help");
        opt.description = "Print this message and exit".to_string();
        opt.builtin = Some(Builtin::Help);
        opt
    }

    /// The `--version` preset: prints the program name and the configured
    /// version string, then parsing continues normally.
    pub fn version() -> Self {
        let mut opt = Opt::new("version");
        opt.description = "Show version information and exit".to_string();
        opt.builtin = Some(Builtin::Version);
        opt
    }

    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    /// Description shown in the usage listing. A leading `[NAME]` span
    /// names the value placeholder of a value-taking option; the span is
    /// stripped from the rendered description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Require a supplied value without attaching a storage effect.
    pub fn takes_value(mut self) -> Self {
        self.takes_value = true;
        self
    }

    /// Set the flag cell when the option is seen.
    pub fn set_flag(mut self, cell: &FlagCell) -> Self {
        self.action = Action::SetFlag(cell.clone());
        self
    }

    /// Clear the flag cell when the option is seen.
    pub fn clear_flag(mut self, cell: &FlagCell) -> Self {
        self.action = Action::ClearFlag(cell.clone());
        self
    }

    /// Store the supplied value in the cell. Implies a required value.
    pub fn store(mut self, cell: &ValueCell) -> Self {
        self.takes_value = true;
        self.action = Action::Assign(cell.clone());
        self
    }

    /// Callback invoked after the storage effect, with the resolved value.
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&str>) -> i32 + 'static,
    {
        self.handler = Some(Rc::new(f));
        self
    }
}

// ============================================================================
// Option table
// ============================================================================

/// Ordered sequence of descriptors, immutable during a parse.
///
/// Table order is the sole match-priority mechanism: the first descriptor
/// that structurally matches a token wins. Descriptors sharing a short
/// letter are ambiguous by construction and the earlier one always wins.
#[derive(Default)]
pub struct OptionTable {
    entries: Vec<Opt>,
}

impl OptionTable {
    pub fn new() -> Self {
        OptionTable {
            entries: Vec::new(),
        }
    }

    pub fn option(mut self, opt: Opt) -> Self {
        self.entries.push(opt);
        self
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Number of characters between the option names and the description.
const DESC_INDENT: usize = 24;

/// Result of the full-token matching passes.
enum FullMatch {
    Exact(usize),
    /// `--name=value` or `-x=value`; the payload is the byte offset of
    /// the `=` in the token.
    Attached(usize, usize),
}

/// Parser configuration and per-parse state.
///
/// Everything the original kept in process-wide variables lives here, so
/// multiple independent parsers in one process are safe.
pub struct Parser {
    table: OptionTable,
    usage: String,
    version: String,
    progname: String,
    caseless: bool,
    exit_on_help: bool,
    sink: Box<dyn Write>,
}

impl Parser {
    pub fn new(table: OptionTable) -> Self {
        Parser {
            table,
            usage: "[options] arg...".to_string(),
            version: String::new(),
            progname: String::new(),
            caseless: false,
            exit_on_help: true,
            sink: Box::new(io::stderr()),
        }
    }

    /// Text printed after the program name in the usage line.
    pub fn usage(mut self, text: &str) -> Self {
        self.usage = text.to_string();
        self
    }

    /// Version string printed by the version preset.
    pub fn version(mut self, text: &str) -> Self {
        self.version = text.to_string();
        self
    }

    /// Ignore ASCII case when matching option names.
    pub fn caseless(mut self, x: bool) -> Self {
        self.caseless = x;
        self
    }

    /// Whether handling `--help` exits the process (the hosted default) or
    /// aborts the parse with `Error::Help` for the caller to act on.
    pub fn exit_on_help(mut self, x: bool) -> Self {
        self.exit_on_help = x;
        self
    }

    /// Redirect diagnostic, help and version output. Defaults to standard
    /// error; `Box::new(std::io::sink())` discards it.
    pub fn diagnostics(mut self, sink: Box<dyn Write>) -> Self {
        self.sink = sink;
        self
    }

    /// Program invocation name captured from `argv[0]` by the last parse.
    pub fn program_name(&self) -> &str {
        &self.progname
    }

    /// Handle all options from the argument vector, applying effects token
    /// by token, and return the index of the first non-option argument
    /// (`argv.len()` if there is none).
    ///
    /// `argv[0]` is the program name; it seeds `program_name` and is never
    /// scanned as an option. Effects applied before an error stay applied.
    pub fn parse(&mut self, argv: &[String]) -> Result<usize> {
        if let Some(name) = argv.first() {
            if !name.is_empty() {
                self.progname = name.clone();
            }
        }
        let mut i = 1;
        while i < argv.len() {
            let arg = &argv[i];
            if !arg.starts_with('-') {
                return Ok(i); // non-option
            }
            if arg == "--" {
                return Ok(i + 1); // explicit end of options
            }
            // Single short or long option as a whole token.
            match self.match_full_token(arg) {
                Some(FullMatch::Exact(idx)) => {
                    let value = if self.table.entries[idx].takes_value {
                        match argv.get(i + 1) {
                            Some(next) => {
                                i += 1;
                                Some(next.clone())
                            }
                            None => {
                                return Err(self.missing_value(arg.trim_start_matches('-')));
                            }
                        }
                    } else {
                        None
                    };
                    self.apply(idx, value.as_deref())?;
                    i += 1;
                    continue;
                }
                Some(FullMatch::Attached(idx, eq)) => {
                    let value = arg[eq + 1..].to_string();
                    self.apply(idx, Some(&value))?;
                    i += 1;
                    continue;
                }
                None => {}
            }
            if arg[1..].starts_with('-') {
                return Err(self.unrecognized(arg));
            }
            // Multiple short options in one token, e.g. '-abc'. Once a
            // letter that takes a value is reached, the rest of the token
            // (one leading '=' stripped) is the value; if the token ends
            // there, the next argument is consumed instead.
            let letters = &arg[1..];
            for (pos, c) in letters.char_indices() {
                let idx = match self.find_short(c) {
                    Some(idx) => idx,
                    None => return Err(self.unrecognized(arg)),
                };
                if self.table.entries[idx].takes_value {
                    let rest = &letters[pos + c.len_utf8()..];
                    let value = if rest.is_empty() {
                        match argv.get(i + 1) {
                            Some(next) => {
                                i += 1;
                                next.clone()
                            }
                            None => return Err(self.missing_value(&c.to_string())),
                        }
                    } else {
                        rest.strip_prefix('=').unwrap_or(rest).to_string()
                    };
                    self.apply(idx, Some(&value))?;
                    break;
                }
                self.apply(idx, None)?;
            }
            i += 1;
        }
        Ok(argv.len())
    }

    /// Exact pass over the whole table, then the attached-value (`=`) pass
    /// over value-taking descriptors. First table-order match wins in each
    /// pass; a long name that is a prefix of another can shadow it in the
    /// attached pass depending on table order.
    fn match_full_token(&self, tok: &str) -> Option<FullMatch> {
        for (idx, opt) in self.table.entries.iter().enumerate() {
            if self.short_matches(opt, tok) || self.long_matches(opt, tok) {
                return Some(FullMatch::Exact(idx));
            }
        }
        for (idx, opt) in self.table.entries.iter().enumerate() {
            if !opt.takes_value {
                continue;
            }
            if let Some(eq) = self.attached_eq(opt, tok) {
                return Some(FullMatch::Attached(idx, eq));
            }
        }
        None
    }

    fn names_eq(&self, a: &str, b: &str) -> bool {
        if self.caseless {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    fn short_matches(&self, opt: &Opt, tok: &str) -> bool {
        let Some(c) = opt.short else { return false };
        let mut buf = [0u8; 4];
        match tok.strip_prefix('-') {
            Some(rest) => self.names_eq(rest, c.encode_utf8(&mut buf)),
            None => false,
        }
    }

    fn long_matches(&self, opt: &Opt, tok: &str) -> bool {
        let Some(long) = opt.long.as_deref() else {
            return false;
        };
        match tok.strip_prefix("--") {
            Some(rest) => self.names_eq(rest, long),
            None => false,
        }
    }

    /// Byte offset of the `=` if `tok` is the attached-value form of this
    /// descriptor's short or long name.
    fn attached_eq(&self, opt: &Opt, tok: &str) -> Option<usize> {
        if let Some(c) = opt.short {
            let end = 1 + c.len_utf8();
            if let Some(head) = tok.get(1..end) {
                let mut buf = [0u8; 4];
                if tok.starts_with('-')
                    && self.names_eq(head, c.encode_utf8(&mut buf))
                    && tok[end..].starts_with('=')
                {
                    return Some(end);
                }
            }
        }
        if let Some(long) = opt.long.as_deref() {
            let end = 2 + long.len();
            if tok.starts_with("--") {
                if let Some(head) = tok.get(2..end) {
                    if self.names_eq(head, long) && tok[end..].starts_with('=') {
                        return Some(end);
                    }
                }
            }
        }
        None
    }

    fn find_short(&self, c: char) -> Option<usize> {
        self.table.entries.iter().position(|opt| match opt.short {
            Some(s) => {
                if self.caseless {
                    s.eq_ignore_ascii_case(&c)
                } else {
                    s == c
                }
            }
            None => false,
        })
    }

    /// Shared dispatch for both matching paths: apply the storage effect,
    /// then run the builtin or the handler. `value` is `Some` whenever the
    /// descriptor requires a value.
    fn apply(&mut self, idx: usize, value: Option<&str>) -> Result<()> {
        let opt = &self.table.entries[idx];
        match &opt.action {
            Action::SetFlag(cell) => cell.set(true),
            Action::ClearFlag(cell) => cell.set(false),
            Action::Assign(cell) => {
                if let Some(v) = value {
                    cell.set(v);
                }
            }
            Action::None => {}
        }
        let builtin = opt.builtin;
        let handler = opt.handler.clone();
        match builtin {
            Some(Builtin::Help) => return self.handle_help(),
            Some(Builtin::Version) => self.handle_version(),
            None => {}
        }
        if let Some(handler) = handler {
            match handler(value) {
                0 => {}
                HELP => return Err(Error::Help),
                code => return Err(Error::Handler(code)),
            }
        }
        Ok(())
    }

    fn handle_help(&mut self) -> Result<()> {
        self.print_usage();
        if self.exit_on_help {
            std::process::exit(0);
        }
        Err(Error::Help)
    }

    fn handle_version(&mut self) {
        let _ = write!(self.sink, "{} {}\n", self.progname, self.version);
    }

    fn missing_value(&mut self, name: &str) -> Error {
        let _ = write!(
            self.sink,
            "{}: option requires an argument -- {}\n",
            self.progname, name
        );
        Error::MissingValue(name.to_string())
    }

    fn unrecognized(&mut self, tok: &str) -> Error {
        let _ = write!(
            self.sink,
            "{}: unrecognized option: '{}'\n",
            self.progname, tok
        );
        Error::Unrecognized(tok.to_string())
    }

    /// Print the help message to the diagnostic sink.
    ///
    /// One line per descriptor in table order: the short name (or padding),
    /// the long name, `=PLACEHOLDER` for value-taking options, then the
    /// description aligned at `DESC_INDENT` (a single space separates them
    /// when the names already reach that column).
    pub fn print_usage(&mut self) {
        let out = &mut self.sink;
        let _ = write!(out, "Usage: {}", self.progname);
        if !self.usage.is_empty() {
            let _ = write!(out, " {}", self.usage);
        }
        let _ = write!(out, "\n\nOptions:\n");
        for opt in &self.table.entries {
            let (placeholder, desc) = split_placeholder(&opt.description, opt.takes_value);
            match opt.short {
                Some(c) => {
                    let _ = write!(out, "  -{}", c);
                }
                None => {
                    let _ = write!(out, "    ");
                }
            }
            let sep = if opt.short.is_some() && opt.long.is_some() {
                ", "
            } else {
                "  "
            };
            let _ = write!(out, "{}", sep);
            let mut n = 0;
            if let Some(long) = opt.long.as_deref() {
                let _ = write!(out, "--{}", long);
                n += 2 + long.len();
            }
            if opt.takes_value {
                let _ = write!(out, "={}", placeholder);
                n += placeholder.len() + 1;
            }
            if n < DESC_INDENT {
                let _ = write!(out, "{:width$}", "", width = DESC_INDENT - n);
            } else {
                let _ = write!(out, " ");
            }
            let _ = write!(out, "{}\n", desc);
        }
    }
}

/// Split a leading `[NAME]` span off a description. The span names the
/// value placeholder of a value-taking option; without one the placeholder
/// is `VALUE` and the description is shown unmodified.
fn split_placeholder(desc: &str, takes_value: bool) -> (&str, &str) {
    if takes_value {
        if let Some(rest) = desc.strip_prefix('[') {
            if let Some(end) = rest.find(']') {
                return (&rest[..end], &rest[end + 1..]);
            }
        }
    }
    ("VALUE", desc)
}

// ============================================================================
// Tests
// ============================================================================
