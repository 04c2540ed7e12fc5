use std::fmt;

use tracing::{debug, trace};

use crate::{
    error::{CmdlineError, CmdlineResult},
    mode::VerificationMode,
    quote::{escape_arg, is_quoted, needs_escaping, quote},
    token::tokenize,
};

const EXE_EMBEDDED_QUOTE: &str = "executable name has embedded quote, split the arguments";

/// Process-wide command-line policy, fixed at startup.
#[derive(Debug, Clone)]
pub struct CmdlineConfig {
    /// Accept token 0 as a raw path and quote under [`VerificationMode::Unrestricted`].
    ///
    /// When `false` the executable is resolved strictly and, if that fails,
    /// recovered by re-tokenizing the whole command.
    pub allow_ambiguous: bool,
}

impl Default for CmdlineConfig {
    fn default() -> Self {
        Self {
            allow_ambiguous: true,
        }
    }
}

impl CmdlineConfig {
    pub fn strict() -> Self {
        Self {
            allow_ambiguous: false,
        }
    }
}

/// A composed command line.
///
/// `tokens()` holds the resolved argv (executable unquoted); `Display` yields
/// the single quoted string handed to a launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    mode: VerificationMode,
    tokens: Vec<String>,
    line: String,
}

impl CommandLine {
    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    pub fn executable(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    pub fn into_string(self) -> String {
        self.line
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl AsRef<str> for CommandLine {
    fn as_ref(&self) -> &str {
        &self.line
    }
}

/// Compose `executable` followed by `args`, each escaped under `mode`.
///
/// `executable` is emitted as given; callers decide whether it is quoted.
pub fn compose<S: AsRef<str>>(
    mode: VerificationMode,
    executable: &str,
    args: &[S],
) -> CmdlineResult<String> {
    let mut line = String::with_capacity(80);
    line.push_str(executable);
    for arg in args {
        line.push(' ');
        line.push_str(&escape_arg(mode, arg.as_ref())?);
    }
    Ok(line)
}

#[derive(Debug, Clone, Default)]
pub struct CommandLineBuilder {
    config: CmdlineConfig,
}

impl CommandLineBuilder {
    pub fn new(config: CmdlineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CmdlineConfig {
        &self.config
    }

    /// Build a command line from untrusted tokens; token 0 names the executable.
    pub fn build<S: AsRef<str>>(&self, tokens: &[S]) -> CmdlineResult<CommandLine> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        if tokens.is_empty() {
            return Err(CmdlineError::Empty);
        }

        if self.config.allow_ambiguous {
            self.build_unrestricted(tokens)
        } else {
            self.build_strict(tokens)
        }
    }

    fn build_unrestricted(&self, tokens: Vec<String>) -> CmdlineResult<CommandLine> {
        let mode = VerificationMode::Unrestricted;
        let exe = &tokens[0];
        if exe.is_empty() {
            return Err(CmdlineError::Empty);
        }

        let exe_part = if needs_escaping(mode, exe)? {
            quote(exe)
        } else {
            exe.clone()
        };
        let line = compose(mode, &exe_part, &tokens[1..])?;

        trace!(target: "reap.cmdline", ?mode, %line, "command line composed");
        Ok(CommandLine { mode, tokens, line })
    }

    fn build_strict(&self, mut tokens: Vec<String>) -> CmdlineResult<CommandLine> {
        let exe = match resolve_executable(&tokens[0]) {
            Ok(exe) => exe,
            Err(err) => {
                debug!(
                    target: "reap.cmdline",
                    token = %tokens[0],
                    error = %err,
                    "executable unresolved; re-tokenizing joined command"
                );
                tokens = tokenize(&tokens.join(" "));
                let first = tokens
                    .first()
                    .ok_or_else(|| CmdlineError::Unresolvable(err_token(&err)))?;
                resolve_executable(first).map_err(|_| CmdlineError::Unresolvable(first.clone()))?
            }
        };
        if exe.is_empty() {
            return Err(CmdlineError::Empty);
        }

        let mode = VerificationMode::for_executable(&exe);
        let line = compose(mode, &quote(&exe), &tokens[1..])?;
        tokens[0] = exe;

        trace!(target: "reap.cmdline", ?mode, %line, "command line composed");
        Ok(CommandLine { mode, tokens, line })
    }
}

/// Strip an enclosing quote pair from an executable token, rejecting any other `"`.
fn resolve_executable(token: &str) -> CmdlineResult<String> {
    if is_quoted(true, token, EXE_EMBEDDED_QUOTE)? {
        Ok(token[1..token.len() - 1].to_string())
    } else {
        Ok(token.to_string())
    }
}

fn err_token(err: &CmdlineError) -> String {
    match err {
        CmdlineError::EmbeddedQuote { token, .. } | CmdlineError::Unresolvable(token) => {
            token.clone()
        }
        CmdlineError::Empty => String::new(),
    }
}
