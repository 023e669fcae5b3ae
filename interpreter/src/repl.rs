//! The interactive mode. Every line is compiled on its own and evaluated against the same
//! context, so values stay on the stack until something consumes them.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use toyforth_lib::value::Source;
use toyforth_lib::{parser, vm, Error};

use std::io::{self, Write};

const PROMPT: &str = "toyf> ";

pub fn run() -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ctx = vm::Context::new(&mut out);

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str())?;

        if line.trim() == ".s" {
            println!("<{}> {}", ctx.stack.depth(), ctx.stack);
            continue;
        }
        eval_line(&mut ctx, line)?;
    }
}

/// errors in the program are reported and the session goes on
fn eval_line(ctx: &mut vm::Context, line: String) -> Result<()> {
    // a token at the very end of the input doesn't count as terminated
    let src: Source = format!("{}\n", line).into();
    match parser::compile(src.clone()) {
        Ok(compiled) => {
            for w in compiled.warnings {
                eprintln!("{}", Error::from(w).render(&src, None));
            }
            match ctx.evaluate_list(&compiled.program) {
                Ok(()) => {}
                Err(vm::Error::Io(e)) => return Err(e.into()),
                Err(e) => eprintln!("{}", Error::from(e).render(&src, None)),
            }
        }
        Err(e) => eprintln!("{}", Error::from(e).render(&src, None)),
    }
    io::stdout().flush()?;
    Ok(())
}
