//! Pulling results out of network CLI output
//!
//! The CLI mixes logging with results on stdout and stderr. Results are
//! recognized line by line; the first matching line wins. Shell trace lines
//! (`+ ...`) echo the caller's arguments verbatim and are never read as
//! results.

const INVOKE_SUCCESS_MARKER: &str = "invoke successful";
const PAYLOAD_MARKER: &str = "payload:";
const ERROR_MARKER: &str = "Error:";

/// Trimmed lines, minus shell trace echoes.
fn result_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('+'))
}

/// First trimmed line that looks like a JSON object.
pub fn find_object_line(output: &str) -> Option<&str> {
    find_delimited_line(output, '{', '}')
}

/// First trimmed line that looks like a JSON array.
pub fn find_array_line(output: &str) -> Option<&str> {
    find_delimited_line(output, '[', ']')
}

fn find_delimited_line(output: &str, open: char, close: char) -> Option<&str> {
    result_lines(output).find(|line| line.starts_with(open) && line.ends_with(close))
}

/// First line that is exactly `true` or `false`.
pub fn find_bool_line(output: &str) -> Option<bool> {
    result_lines(output).find_map(|line| match line {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    })
}

/// The line reporting a committed transaction. The result comes after any
/// echoed command, so the last match is taken.
fn success_line(output: &str) -> Option<&str> {
    result_lines(output)
        .filter(|line| line.to_ascii_lowercase().contains(INVOKE_SUCCESS_MARKER))
        .last()
}

/// Whether the CLI reported a committed transaction.
pub fn invoke_succeeded(output: &str) -> bool {
    success_line(output).is_some()
}

/// The `payload:` value of the invoke result line.
///
/// Quoted payloads are unescaped; bare payloads run to the next whitespace.
pub fn extract_payload(output: &str) -> Option<String> {
    let line = success_line(output)?;
    let start = line.find(PAYLOAD_MARKER)? + PAYLOAD_MARKER.len();
    let rest = line[start..].trim();

    if rest.starts_with('"') {
        serde_json::Deserializer::from_str(rest)
            .into_iter::<String>()
            .next()?
            .ok()
    } else {
        rest.split_whitespace().next().map(str::to_string)
    }
}

/// Lines carrying an `Error:` report.
pub fn error_lines(output: &str) -> impl Iterator<Item = &str> {
    result_lines(output).filter(|line| line.contains(ERROR_MARKER))
}
