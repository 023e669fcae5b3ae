use anyhow::{anyhow, bail, Context, Result};
use glob::glob;
use std::result::Result as StdResult;

use std::fs;
use std::path::Path;
use std::process::Command;

const INTERPRETER: &str = "../target/release/toyf";

fn main() -> Result<()> {
    compile_toyf().context("compiling interpreter")?;

    let scripts: Vec<_> = glob("tests/*.tf")?.collect::<StdResult<_, _>>()?;
    let mut failed = vec![];
    for script in &scripts {
        match run_script(script)? {
            None => println!("{}: passed", script.display()),
            Some(report) => {
                println!("{}: failed\n{}", script.display(), report);
                failed.push(script.display().to_string());
            }
        }
    }
    if !failed.is_empty() {
        bail!(
            "{} of {} scripts failed: {}",
            failed.len(),
            scripts.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

/// Runs one script and compares its stdout with the `.out` file next to it. Returns a
/// description of the first differing line, or `None` if the output matches.
fn run_script(script: &Path) -> Result<Option<String>> {
    let expected_path = script.with_extension("out");
    let expected = fs::read_to_string(&expected_path)
        .with_context(|| format!("loading expected output: {}", expected_path.display()))?;
    let output = Command::new(INTERPRETER)
        .arg(script)
        .output()
        .with_context(|| format!("running script {}", script.display()))?;
    let actual = String::from_utf8(output.stdout)?;
    if actual == expected {
        return Ok(None);
    }

    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (e, a) => {
                return Ok(Some(format!(
                    "  line {}: expected {:?}, got {:?}\n  exit status: {}\n  stderr:\n{}",
                    line,
                    e.unwrap_or("<end of output>"),
                    a.unwrap_or("<end of output>"),
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                )))
            }
        }
    }
}

fn compile_toyf() -> Result<()> {
    let st = Command::new("cargo")
        .args(["build", "--release", "-p", "toyf"])
        .current_dir("..")
        .status()?;
    if st.success() {
        Ok(())
    } else {
        Err(anyhow!("compiling the interpreter failed"))
    }
}
