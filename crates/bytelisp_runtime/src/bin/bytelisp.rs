//! Bytelisp CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use bytelisp_runtime::{Repl, RuntimeConfig, RustylineEditor, Session, load_from_file, save_to_file};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    compile_to: Option<PathBuf>,
    image: Option<PathBuf>,
    // Debug flags
    trace_vm: bool,
    disassemble: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--trace-vm" => config.trace_vm = true,
            "--disassemble" => config.disassemble = true,
            "--compile" => {
                let out = args.next().ok_or("--compile requires an output path")?;
                config.compile_to = Some(PathBuf::from(out));
            }
            "--image" => {
                let image = args.next().ok_or("--image requires a path")?;
                config.image = Some(PathBuf::from(image));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            _ => config.files.push(PathBuf::from(arg)),
        }
    }

    if config.compile_to.is_some() && config.image.is_some() {
        return Err("--compile and --image cannot be combined".into());
    }
    if config.image.is_some() && !config.files.is_empty() {
        return Err("--image cannot be combined with source files".into());
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("bytelisp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let runtime = RuntimeConfig::new()
        .with_trace_vm(config.trace_vm)
        .with_disassemble(config.disassemble)
        .with_banner(config.files.is_empty());

    let mut session = Session::with_config(runtime.vm.clone());

    if let Some(out) = &config.compile_to {
        for file in &config.files {
            session.compile_file(file)?;
        }
        if runtime.disassemble {
            print!("{}", session.listing(0)?);
        }
        save_to_file(session.code(), out)?;
        return Ok(());
    }

    if let Some(image) = &config.image {
        let code = load_from_file(image)?;
        if runtime.disassemble {
            print!("{}", bytelisp_language::disassemble(&code)?);
        }
        session.load_image(code)?;
        return Ok(());
    }

    for file in &config.files {
        let start = session.compile_file(file)?;
        if runtime.disassemble {
            print!("{}", session.listing(start)?);
        }
        session.run_from(start)?;
    }

    if config.batch_mode {
        return Ok(());
    }

    let editor = RustylineEditor::new()?;
    let mut repl = Repl::with_config(editor, runtime).with_session(session);
    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mBytelisp\x1b[0m - A small Lisp compiled to bytecode

\x1b[1mUSAGE:\x1b[0m
    bytelisp [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Files to run before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -b, --batch        Run files and exit (no REPL)
    --compile OUT      Compile files into a bytecode image and exit
    --image FILE       Run a bytecode image and exit

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace-vm         Trace every executed instruction to stderr
    --disassemble      Print a listing of compiled code before running it

\x1b[1mEXAMPLES:\x1b[0m
    bytelisp                          Start interactive REPL
    bytelisp fib.bl                   Run fib.bl, then start REPL
    bytelisp -b fib.bl                Run fib.bl and exit
    bytelisp --compile fib.blc fib.bl Save fib.bl as an image
    bytelisp --image fib.blc          Run a saved image

\x1b[1mREPL:\x1b[0m
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input

\x1b[1mLIMITS:\x1b[0m
    Every input in a session is appended to one bytecode buffer. Jumps and
    functions use 16-bit offsets, so once a session has compiled 65535 bytes
    new `if` and `fn` forms are rejected. Restart to reclaim space."
    );
}
