//! Configuration for sessions, the REPL, and the CLI.

use bytelisp_language::{TraceOutput, VmConfig};

/// Default primary prompt.
pub const DEFAULT_PROMPT: &str = "λ> ";

/// Continuation prompt for multi-line input.
pub const CONTINUATION_PROMPT: &str = ".. ";

/// Runtime configuration.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Configuration handed to every VM the runtime creates.
    pub vm: VmConfig,

    /// Print a disassembly of each compiled input before running it.
    pub disassemble: bool,

    /// Show the welcome banner when the REPL starts.
    pub show_banner: bool,

    /// Primary REPL prompt.
    pub prompt: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            vm: VmConfig::default(),
            disassemble: false,
            show_banner: true,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the VM configuration.
    #[must_use]
    pub fn with_vm(mut self, vm: VmConfig) -> Self {
        self.vm = vm;
        self
    }

    /// Builder method to enable VM instruction tracing to stderr.
    #[must_use]
    pub fn with_trace_vm(mut self, enabled: bool) -> Self {
        self.vm.trace = if enabled {
            TraceOutput::Stderr
        } else {
            TraceOutput::None
        };
        self
    }

    /// Builder method to enable disassembly listings.
    #[must_use]
    pub fn with_disassemble(mut self, enabled: bool) -> Self {
        self.disassemble = enabled;
        self
    }

    /// Builder method to show or hide the banner.
    #[must_use]
    pub fn with_banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// Builder method to set the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}
