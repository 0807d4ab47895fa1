use crate::error::{Result, ShellError};

/// Split a command line into arguments.
///
/// Everything from `//` onwards is a comment. Arguments are separated by
/// runs of spaces and tabs. More than `max_args` arguments is an error.
pub fn tokenize(line: &str, max_args: usize) -> Result<Vec<&str>> {
    let line = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut args = Vec::new();
    for word in line.split([' ', '\t']).filter(|w| !w.is_empty()) {
        if args.len() == max_args {
            return Err(ShellError::TooManyArgs { max: max_args });
        }
        args.push(word);
    }
    Ok(args)
}
