//! The main REPL implementation.

use std::io::{self, Write};

use bytelisp_foundation::{Error, Result, Value};

use crate::config::{CONTINUATION_PROMPT, RuntimeConfig};
use crate::editor::{LineEditor, ReadResult, RustylineEditor, SPECIAL_FORMS, is_complete};
use crate::session::Session;

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,
    /// Compiled code and the persistent environment.
    session: Session,
    /// Banner, prompt, and listing options.
    config: RuntimeConfig,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self::with_config(editor, RuntimeConfig::default())
    }

    /// Creates a new REPL with the given editor and configuration.
    pub fn with_config(editor: E, config: RuntimeConfig) -> Self {
        Self {
            editor,
            session: Session::with_config(config.vm.clone()),
            config,
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.config.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.config.show_banner {
            self.print_banner();
        }

        loop {
            self.refresh_keywords();
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    self.print_error(&e);
                }
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false);
        };

        if input.trim().is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(value) => {
                if !value.is_nil() {
                    println!("{}", self.format_value(&value));
                }
            }
            Err(e) => {
                self.print_error(&e);
            }
        }

        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let prompt = if first_line {
                self.config.prompt.as_str()
            } else {
                CONTINUATION_PROMPT
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);

                    if is_complete(&input) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::parse("unexpected end of input", 0, 0));
                }
            }
        }
    }

    /// Compiles and runs one input, printing a listing first when enabled.
    ///
    /// # Errors
    ///
    /// Returns the first compile or runtime error.
    pub fn eval(&mut self, input: &str) -> Result<Value> {
        let start = self.session.compile(input)?;
        if self.config.disassemble {
            print!("{}", self.session.listing(start)?);
        }
        self.session.run_from(start)
    }

    /// Offers special forms plus everything bound in the session.
    fn refresh_keywords(&mut self) {
        let mut keywords: Vec<String> = SPECIAL_FORMS.iter().map(ToString::to_string).collect();
        keywords.extend(self.session.names());
        self.editor.set_keywords(keywords);
    }

    /// Formats a value for display.
    #[allow(clippy::unused_self)]
    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => format!("\x1b[1m{s:?}\x1b[0m"),
            other => format!("\x1b[1m{other}\x1b[0m"),
        }
    }

    /// Prints an error message.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mBytelisp v{}\x1b[0m", env!("CARGO_PKG_VERSION"));
        println!("Type expressions to evaluate. Use Ctrl+D to exit.");
        println!(
            "\x1b[2mA session holds up to {} bytes of code with branches or functions.\x1b[0m\n",
            bytelisp_language::Word::MAX
        );

        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockEditor {
        inputs: Vec<String>,
        index: usize,
        history: Vec<String>,
        keywords: Vec<String>,
    }

    impl MockEditor {
        fn new(inputs: Vec<&str>) -> Self {
            Self {
                inputs: inputs.into_iter().map(String::from).collect(),
                index: 0,
                history: Vec::new(),
                keywords: Vec::new(),
            }
        }
    }

    impl LineEditor for MockEditor {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
            if self.index < self.inputs.len() {
                let line = self.inputs[self.index].clone();
                self.index += 1;
                Ok(ReadResult::Line(line))
            } else {
                Ok(ReadResult::Eof)
            }
        }

        fn add_history(&mut self, line: &str) {
            self.history.push(line.to_string());
        }

        fn set_keywords(&mut self, keywords: Vec<String>) {
            self.keywords = keywords;
        }
    }

    #[test]
    fn eval_simple_expression() {
        let mut repl = Repl::with_editor(MockEditor::new(vec![]));
        assert_eq!(repl.eval("(+ 1 (* 2 3) 4)").unwrap(), Value::Number(11.0));
    }

    #[test]
    fn definitions_survive_between_inputs() {
        let mut repl = Repl::with_editor(MockEditor::new(vec![]));
        repl.eval("(def add_1 (fn (a) (+ a 1)))").unwrap();
        assert_eq!(repl.eval("(add_1 6)").unwrap(), Value::Number(7.0));
        assert_eq!(repl.eval("(add_1 6)").unwrap(), Value::Number(7.0));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let mut repl = Repl::with_editor(MockEditor::new(vec![]));
        repl.eval("(def a 1)").unwrap();
        assert!(repl.eval("(if a 1)").is_err());
        assert!(repl.eval("(+ a \"x\")").is_err());
        assert_eq!(repl.eval("a").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn multi_line_input_is_joined() {
        let editor = MockEditor::new(vec!["(def sq (fn (x)", "  (* x x)))", "(sq 5)"]);
        let mut repl = Repl::with_editor(editor).without_banner();
        repl.run().unwrap();
        assert_eq!(repl.session().get("sq").value_type(), bytelisp_foundation::Type::Fn);
        assert_eq!(repl.editor.history.len(), 2);
        assert_eq!(repl.editor.history[0], "(def sq (fn (x)\n  (* x x)))");
    }

    #[test]
    fn eof_in_open_form_is_an_error() {
        let mut repl = Repl::with_editor(MockEditor::new(vec!["(+ 1"]));
        assert!(repl.read_input().is_err());
    }

    #[test]
    fn keywords_include_definitions() {
        let editor = MockEditor::new(vec!["(def my_value 3)"]);
        let mut repl = Repl::with_editor(editor).without_banner();
        repl.run().unwrap();
        repl.refresh_keywords();
        assert!(repl.editor.keywords.contains(&"let".to_string()));
        assert!(repl.editor.keywords.contains(&"my_value".to_string()));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let editor = MockEditor::new(vec!["", "   "]);
        let mut repl = Repl::with_editor(editor).without_banner();
        repl.run().unwrap();
        assert!(repl.editor.history.is_empty());
        assert!(repl.session().code().is_empty());
    }
}
