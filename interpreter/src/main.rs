use anyhow::{Context as _, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use toyforth_lib::parser::{self, Compiled};
use toyforth_lib::value::Source;
use toyforth_lib::{utils, vm, Error};

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

mod repl;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// the program to run
    script: Option<PathBuf>,

    /// start an interactive session instead of running a script
    #[arg(short, long, conflicts_with = "script")]
    repl: bool,

    /// print the compiled program instead of running it
    #[cfg(feature = "dev")]
    #[arg(short = 'p', long)]
    show_program: bool,

    /// log every evaluation step to stderr
    #[cfg(feature = "dev")]
    #[arg(short = 't', long)]
    trace: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => usage(Some(e)),
    };

    if cli.repl {
        return repl::run();
    }
    let Some(script) = cli.script.as_ref() else {
        usage(None);
    };

    let src: Source = utils::read_source(script)
        .with_context(|| format!("reading {}", script.display()))?
        .into();
    let path = script.to_string_lossy().into_owned();

    let Compiled { program, warnings } = match parser::compile(src.clone()) {
        Ok(compiled) => compiled,
        Err(e) => fail(&Error::from(e), &src, &path),
    };
    for w in warnings {
        eprintln!("{}", Error::from(w).render(&src, Some(path.as_str())));
    }

    #[cfg(feature = "dev")]
    if cli.show_program {
        println!("{:#?}", program);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ctx = vm::Context::new(&mut out);
    #[cfg(feature = "dev")]
    let ctx = ctx.with_trace(cli.trace);

    if let Err(e) = ctx.run(&program) {
        fail(&Error::from(e), &src, &path);
    }
    out.flush()?;
    Ok(())
}

/// prints usage to stdout and exits with 1. clap errors already contain the usage
fn usage(err: Option<clap::Error>) -> ! {
    match err {
        Some(err) => print!("{}", err),
        None => println!("{}", Cli::command().render_usage()),
    }
    process::exit(1);
}

fn fail(err: &Error, src: &str, path: &str) -> ! {
    eprintln!("{}", err.render(src, Some(path)));
    process::exit(1);
}
