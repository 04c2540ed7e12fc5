use std::borrow::Cow;

use crate::{
    error::{CmdlineError, CmdlineResult},
    mode::VerificationMode,
};

const ARG_EMBEDDED_QUOTE: &str = "argument has embedded quote, invoke the script interpreter explicitly";

/// Report whether `arg` is already enclosed in a pair of `"`.
///
/// With `strict` set, a `"` anywhere other than the enclosing pair is an
/// [`CmdlineError::EmbeddedQuote`] carrying `context`.
pub fn is_quoted(strict: bool, arg: &str, context: &'static str) -> CmdlineResult<bool> {
    let bytes = arg.as_bytes();
    let last = bytes.len().saturating_sub(1);

    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[last] == b'"' {
        if strict && arg[1..last].contains('"') {
            return Err(CmdlineError::EmbeddedQuote {
                token: arg.to_string(),
                context,
            });
        }
        return Ok(true);
    }
    if strict && arg.contains('"') {
        return Err(CmdlineError::EmbeddedQuote {
            token: arg.to_string(),
            context,
        });
    }
    Ok(false)
}

/// Returns `true` if `arg` must be quoted to survive re-splitting under `mode`.
pub fn needs_escaping(mode: VerificationMode, arg: &str) -> CmdlineResult<bool> {
    if is_quoted(mode.is_strict(), arg, ARG_EMBEDDED_QUOTE)? {
        return Ok(false);
    }
    Ok(arg.contains(mode.unsafe_chars()))
}

/// Wrap `arg` in double quotes, verbatim.
pub fn quote(arg: &str) -> String {
    let mut buf = String::with_capacity(arg.len() + 2);
    buf.push('"');
    buf.push_str(arg);
    buf.push('"');
    buf
}

/// Quote `arg` only if `mode` requires it.
///
/// Outside [`VerificationMode::ScriptFile`] a trailing `\` gains a second one
/// so the closing quote is not read as escaped.
pub fn escape_arg(mode: VerificationMode, arg: &str) -> CmdlineResult<Cow<'_, str>> {
    if !needs_escaping(mode, arg)? {
        return Ok(Cow::Borrowed(arg));
    }
    let mut buf = String::with_capacity(arg.len() + 3);
    buf.push('"');
    buf.push_str(arg);
    if mode != VerificationMode::ScriptFile && arg.ends_with('\\') {
        buf.push('\\');
    }
    buf.push('"');
    Ok(Cow::Owned(buf))
}
