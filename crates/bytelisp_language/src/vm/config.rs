//! Configuration for the virtual machine.

/// Default limit on the number of values on the stack.
pub const DEFAULT_MAX_STACK: usize = 1 << 20;

/// Where execution traces should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// Tracing disabled.
    #[default]
    None,
    /// Write each traced instruction to stderr.
    Stderr,
    /// Keep traced lines in memory, see [`Vm::trace`](super::Vm::trace).
    Buffer,
}

/// Configuration for the virtual machine.
#[derive(Clone, Debug)]
pub struct VmConfig {
    /// Instruction tracing.
    pub trace: TraceOutput,

    /// Maximum number of values on the stack. Frames count too, so this
    /// also bounds recursion depth.
    pub max_stack: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            trace: TraceOutput::None,
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

impl VmConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that traces to stderr.
    #[must_use]
    pub fn traced() -> Self {
        Self {
            trace: TraceOutput::Stderr,
            ..Self::default()
        }
    }

    /// Builder method to set trace output.
    #[must_use]
    pub fn with_trace(mut self, trace: TraceOutput) -> Self {
        self.trace = trace;
        self
    }

    /// Builder method to set the stack limit.
    #[must_use]
    pub fn with_max_stack(mut self, max_stack: usize) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// Returns true if instructions are traced anywhere.
    #[must_use]
    pub fn is_tracing(&self) -> bool {
        self.trace != TraceOutput::None
    }
}
