/// Which characters force an argument to be quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationMode {
    /// Arguments to a `.cmd`/`.bat` script, re-parsed by the script interpreter.
    ScriptFile,
    /// Arguments to a native executable.
    NativeExecutable,
    /// Trusted invocation; the widest unsafe set applies.
    Unrestricted,
}

impl VerificationMode {
    /// Characters that make an unquoted argument ambiguous under this mode.
    pub const fn unsafe_chars(self) -> &'static [char] {
        match self {
            VerificationMode::ScriptFile => &[' ', '\t'],
            VerificationMode::NativeExecutable => &[' ', '\t', '<', '>'],
            VerificationMode::Unrestricted => &[' ', '\t', '<', '>', '&', '|', '^'],
        }
    }

    /// Strict modes reject `"` anywhere except as an enclosing pair.
    pub const fn is_strict(self) -> bool {
        matches!(self, VerificationMode::ScriptFile)
    }

    /// Pick the mode for a resolved executable path.
    pub fn for_executable(path: &str) -> Self {
        if is_script_file(path) {
            VerificationMode::ScriptFile
        } else {
            VerificationMode::NativeExecutable
        }
    }
}

fn is_script_file(path: &str) -> bool {
    let upper = path.to_ascii_uppercase();
    upper.ends_with(".CMD") || upper.ends_with(".BAT")
}
