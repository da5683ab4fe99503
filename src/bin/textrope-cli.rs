//! Small demo binary exercising `textrope` end to end: bytes in, through the
//! rope and the normalization engine, graphemes and byte counts out.
//!
//! Usage:
//!   textrope-cli [--form nfc|nfd|nfkc|nfkd|fcc] [TEXT]
//!
//! With `--form`, prints the input normalized into that form. Without it,
//! prints grapheme and byte counts for the input as a `GraphemeRope`. Reads
//! from stdin when no TEXT argument is given.

use std::env;
use std::io::{self, Read};
use std::process::ExitCode;

use textrope::ucd::NormalizationForm;
use textrope::{normalize, GraphemeRope};

fn parse_form(name: &str) -> Option<NormalizationForm> {
    match name.to_ascii_lowercase().as_str() {
        "nfc" => Some(NormalizationForm::Nfc),
        "nfd" => Some(NormalizationForm::Nfd),
        "nfkc" => Some(NormalizationForm::Nfkc),
        "nfkd" => Some(NormalizationForm::Nfkd),
        "fcc" => Some(NormalizationForm::Fcc),
        _ => None,
    }
}

fn read_input(text_arg: Option<String>) -> io::Result<String> {
    match text_arg {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            while buf.ends_with('\n') || buf.ends_with('\r') {
                buf.pop();
            }
            Ok(buf)
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let mut form: Option<NormalizationForm> = None;
    let mut text_arg: Option<String> = None;

    while let Some(arg) = args.next() {
        if arg == "--form" {
            let value = args.next().ok_or("--form requires a value")?;
            form = Some(parse_form(&value).ok_or_else(|| format!("unknown normalization form: {value}"))?);
        } else {
            text_arg = Some(arg);
        }
    }

    let input = read_input(text_arg).map_err(|e| format!("failed to read input: {e}"))?;

    match form {
        Some(form) => {
            let cps: Vec<u32> = input.chars().map(|c| c as u32).collect();
            let normalized = normalize::normalize(&cps, form);
            let out: String = normalized
                .into_iter()
                .map(|cp| char::from_u32(cp).unwrap_or('\u{FFFD}'))
                .collect();
            println!("{out}");
        }
        None => {
            let rope = GraphemeRope::new(&input);
            println!("bytes: {}", rope.len_bytes());
            println!("graphemes: {}", rope.graphemes().count());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("textrope-cli: {e}");
            ExitCode::FAILURE
        }
    }
}
