//! Line editor abstraction for the REPL.
//!
//! The REPL talks to a [`LineEditor`]; [`RustylineEditor`] is the terminal
//! implementation, with bracket validation for multi-line input, completion
//! of special forms and bound names, and syntax highlighting.

use std::borrow::Cow;

use bytelisp_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

use crate::highlight::BytelispHighlighter;

/// Words offered for completion before any names are known.
pub const SPECIAL_FORMS: &[&str] = &["def", "let", "do", "if", "fn", "nil", "true", "false"];

/// What the editor produced for one prompt.
#[derive(Debug)]
pub enum ReadResult {
    /// One line of input, without its newline.
    Line(String),
    /// Ctrl+C.
    Interrupted,
    /// Ctrl+D or end of piped input.
    Eof,
}

/// Source of REPL input lines. Tests substitute a scripted editor.
pub trait LineEditor {
    /// Prompts for and returns one line.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Records a complete input in the history.
    fn add_history(&mut self, line: &str);

    /// Replaces the words offered for completion.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Depth of unclosed parentheses in `input`, ignoring strings and comments.
/// Negative when there are more closers than openers. The second value is
/// true when `input` ends inside a string.
#[must_use]
pub fn open_depth(input: &str) -> (i32, bool) {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escape_next = false;

    for c in input.chars() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            ';' if !in_string => in_comment = true,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            _ => {}
        }
    }

    (depth, in_string)
}

/// Returns true once every `(` is closed and no string is open.
#[must_use]
pub fn is_complete(input: &str) -> bool {
    let (depth, in_string) = open_depth(input);
    depth <= 0 && !in_string
}

/// Completion, highlighting, and multi-line validation for rustyline.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct BytelispHelper {
    #[rustyline(Completer)]
    completer: KeywordCompleter,
    #[rustyline(Validator)]
    validator: BracketValidator,
    highlighter: BytelispHighlighter,
}

impl Highlighter for BytelispHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

/// Completer for special forms and bound names.
struct KeywordCompleter {
    keywords: Vec<String>,
}

impl KeywordCompleter {
    fn new() -> Self {
        Self {
            keywords: SPECIAL_FORMS.iter().map(ToString::to_string).collect(),
        }
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',')
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];

        let candidates = self
            .keywords
            .iter()
            .filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw.clone(),
            })
            .collect();
        (start, candidates)
    }
}

impl Completer for KeywordCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Nothing to complete inside a string.
        if open_depth(&line[..pos]).1 {
            return Ok((pos, Vec::new()));
        }
        Ok(self.candidates(line, pos))
    }
}

/// Keeps reading lines until every `(` is closed.
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Terminal editor backed by rustyline.
pub struct RustylineEditor {
    editor: Editor<BytelispHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = BytelispHelper {
            completer: KeywordCompleter::new(),
            validator: BracketValidator,
            highlighter: BytelispHighlighter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Io(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
