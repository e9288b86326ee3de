//! `^FH` field data escaping
//!
//! ZPL treats raw line breaks inside `^FD` data as structure, so they are
//! written as hexadecimal escapes introduced by the `_` indicator that `^FH`
//! enables for the following field.

use std::borrow::Cow;

/// Hex escape for a CR LF pair (`_0D_0A`)
pub const LINE_BREAK_ESCAPE: &str = "_0D_0A";

/// Replace every line break in `data` with [`LINE_BREAK_ESCAPE`]
///
/// A `\r\n` pair is one line break. Input without line breaks is returned
/// borrowed.
pub fn escape_line_breaks(data: &str) -> Cow<'_, str> {
    if !data.contains('\n') {
        return Cow::Borrowed(data);
    }

    let mut out = String::with_capacity(data.len() + 8);
    let mut rest = data;
    while let Some(pos) = rest.find('\n') {
        let line = &rest[..pos];
        out.push_str(line.strip_suffix('\r').unwrap_or(line));
        out.push_str(LINE_BREAK_ESCAPE);
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);

    Cow::Owned(out)
}
