use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{DataError, Result};
use crate::normalize::NormalizeKind;

/// `-` (or nothing) means stdin; anything else is a file path.
pub fn open_input(target: Option<&str>) -> Result<Box<dyn BufRead>> {
    match target {
        None | Some("-") => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(path) => {
            let file = File::open(path).map_err(|e| DataError::io(path, e))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// `-` (or nothing) means stdout; anything else is created or truncated.
pub fn open_output(target: Option<&str>) -> Result<Box<dyn Write>> {
    match target {
        None | Some("-") => Ok(Box::new(BufWriter::new(io::stdout()))),
        Some(path) => {
            let file = File::create(path).map_err(|e| DataError::io(path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

/// Apply `kind` to every line of `input`, one output line per input line.
///
/// Empty lines are treated as missing values and missing results are written
/// as empty lines, so line numbers stay aligned. Returns the number of lines.
pub fn normalize_lines<R: BufRead, W: Write>(
    kind: NormalizeKind,
    input: R,
    mut output: W,
    excluded_tokens: &[&str],
) -> Result<usize> {
    let mut count = 0;
    for line in input.lines() {
        let line = line.map_err(|e| DataError::io(Path::new("<input>"), e))?;
        let value = Some(line.trim_end_matches('\r')).filter(|v| !v.is_empty());
        let result = kind.apply(value, excluded_tokens).unwrap_or_default();
        writeln!(output, "{}", result).map_err(|e| DataError::io(Path::new("<output>"), e))?;
        count += 1;
    }
    output
        .flush()
        .map_err(|e| DataError::io(Path::new("<output>"), e))?;
    Ok(count)
}
