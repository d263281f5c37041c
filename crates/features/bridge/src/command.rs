/// One `path=value` command borrowed from an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand<'a> {
    pub path: &'a str,
    pub raw: &'a str,
}

/// Splits a line on its first `=`.
///
/// Trailing line terminators are dropped. Empty lines and lines without `=`
/// yield `None`. The value keeps everything after the first `=`, including
/// further `=` characters.
#[must_use]
pub fn parse_line(line: &str) -> Option<PendingCommand<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }
    let (path, raw) = line.split_once('=')?;
    Some(PendingCommand { path, raw })
}
