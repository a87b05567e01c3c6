use std::fs::File;
use std::io::{stderr, stdout, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::fs::Fs;

/// Run one stage's script to completion, storing stdout and stderr next to
/// the executed notebook while echoing both to the console.
/// Based on:
/// <https://stackoverflow.com/questions/66060139/how-to-tee-stdout-stderr-from-a-subprocess-in-rust>
pub fn run_cmd(
    cmd: &mut Command,
    fs: &Fs,
    conf_id: &str,
    stage: &str,
    pathbuf: &mut PathBuf,
    verbose: bool,
) -> Result<bool> {
    let out_file = fs
        .create_file(fs.stage_stdout(conf_id, stage, pathbuf))
        .context("creating stage stdout file")?;
    let err_file = fs
        .create_file(fs.stage_stderr(conf_id, stage, pathbuf))
        .context("creating stage stderr file")?;

    if verbose {
        eprintln!("{}", "Running stage script...".magenta());
    }

    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| {
            format!(
                "while spawning child process {:?} {:?}",
                cmd.get_program(),
                cmd.get_args(),
            )
        })?;

    let child_out = child.stdout.take().expect("Cannot attach to child stdout");
    let child_err = child.stderr.take().expect("Cannot attach to child stderr");

    let thread_out = thread::spawn(move || {
        communicate(child_out, out_file, stdout()).expect("error communicating with child stdout")
    });
    let thread_err = thread::spawn(move || {
        communicate(child_err, err_file, stderr()).expect("error communicating with child stderr")
    });

    thread_out.join().expect("Error joining stdout thread");
    thread_err.join().expect("Error joining stderr thread");

    let status = child.wait().context("while waiting on child process")?;

    if verbose {
        eprintln!("\n{} with {status}.", "Stage script finished".green());
    }
    Ok(status.success())
}

fn communicate<R: Read, W: Write>(
    mut stream: R,
    mut file: File,
    mut output: W,
) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    loop {
        let num_read = stream.read(&mut buf)?;
        if num_read == 0 {
            break;
        }

        let buf = &buf[..num_read];
        file.write_all(buf)?;
        output.write_all(buf)?;
    }

    Ok(())
}
