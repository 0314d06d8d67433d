use std::borrow::Cow;

/// A tool invocation: program, quoted arguments, and an optional opaque tail.
///
/// `trailing` is appended to the rendered command line exactly as given, so
/// caller-supplied option strings reach the tool without being re-split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub trailing: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            trailing: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn trailing(mut self, raw: Option<&str>) -> Self {
        self.trailing = raw.filter(|s| !s.trim().is_empty()).map(str::to_string);
        self
    }

    pub fn command_line(&self) -> String {
        let mut line = quote_arg(&self.program).into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote_arg(arg));
        }
        if let Some(raw) = &self.trailing {
            line.push(' ');
            line.push_str(raw);
        }
        line
    }
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c) || (cfg!(windows) && c == '\\')
}

fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return Cow::Borrowed(arg);
    }
    if cfg!(windows) {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty() && self.stderr.trim().is_empty()
    }

    /// Last `max_lines` non-blank lines of stdout followed by stderr.
    pub fn tail(&self, max_lines: usize) -> Vec<&str> {
        let lines: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();
        let skip = lines.len().saturating_sub(max_lines);
        lines[skip..].to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub output: CapturedOutput,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
