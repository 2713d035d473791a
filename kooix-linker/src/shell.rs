// Shell rendering of tool invocations for logs and error reports.
// Tools are always spawned with an argument vector, never through a shell.

use std::ffi::OsStr;

/// Quote `arg` for a POSIX shell: wrap in single quotes, rewriting each
/// embedded `'` as `'\''`
pub fn shell_quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Copy-pasteable command line for `program args...`
pub fn render_command<I, S>(program: impl AsRef<OsStr>, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut rendered = shell_quote(&program.as_ref().to_string_lossy());
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&shell_quote(&arg.as_ref().to_string_lossy()));
    }
    rendered
}
