use std::fmt;
use std::path::PathBuf;

use crate::unit::UnitFile;

/// A shell script that installs generated unit files and then runs a few commands.
///
/// Each unit file is written through a quoted heredoc, so `$MAINPID` and friends reach the unit
/// file verbatim instead of being expanded by the shell running the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    shell: String,
    files: Vec<(PathBuf, UnitFile)>,
    commands: Vec<String>,
}

impl Script {
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            files: Vec::with_capacity(2),
            commands: Vec::with_capacity(4),
        }
    }

    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>, unit: UnitFile) -> Self {
        self.files.push((path.into(), unit));
        self
    }

    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    #[must_use]
    pub fn command_if(self, condition: bool, command: impl Into<String>) -> Self {
        if condition {
            self.command(command)
        } else {
            self
        }
    }

    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }

    #[must_use]
    pub fn files(&self) -> &[(PathBuf, UnitFile)] {
        &self.files
    }

    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#!{}", self.shell)?;

        for (path, unit) in &self.files {
            let text = unit.render();
            let delimiter = heredoc_delimiter(&text);

            writeln!(f, "cat << '{delimiter}' > \"{}\"", path.display())?;
            writeln!(f, "{text}")?;
            writeln!(f, "{delimiter}")?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
        }

        for command in &self.commands {
            writeln!(f, "{command}")?;
        }

        Ok(())
    }
}

/// `EOF`, or `EOF_<n>` for the first `n` that no line of `text` is equal to.
fn heredoc_delimiter(text: &str) -> String {
    let taken = |delimiter: &str| text.lines().any(|line| line == delimiter);

    let mut delimiter = String::from("EOF");
    let mut n = 0;

    while taken(&delimiter) {
        n += 1;
        delimiter = format!("EOF_{n}");
    }

    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let mut unit = UnitFile::new();
        unit.set("Service", "ExecStart", "/bin/true");

        let script = Script::new("/bin/bash")
            .file("/etc/systemd/system/test.service", unit)
            .command("systemctl daemon-reload")
            .command_if(false, "systemctl enable test.service")
            .command_if(true, "systemctl start test.service");

        assert_eq!(
            script.to_string(),
            "#!/bin/bash\n\
             cat << 'EOF' > \"/etc/systemd/system/test.service\"\n\
             [Service]\n\
             ExecStart=/bin/true\n\
             EOF\n\
             \n\
             systemctl daemon-reload\n\
             systemctl start test.service\n"
        );
    }

    #[test]
    fn one_heredoc_per_file() {
        let mut socket = UnitFile::new();
        socket.set("Socket", "ListenStream", "127.0.0.1:80");
        let mut service = UnitFile::new();
        service.set("Service", "ExecStart", "/bin/true");

        let text = Script::new("/bin/sh")
            .file("/tmp/a.socket", socket)
            .file("/tmp/a.service", service)
            .to_string();

        assert_eq!(text.matches("cat << 'EOF'").count(), 2);
        assert_eq!(text.lines().filter(|&line| line == "EOF").count(), 2);
        assert!(text.starts_with("#!/bin/sh\n"));
        assert!(text.ends_with("EOF\n"));
    }

    #[test]
    fn delimiter_never_matches_a_unit_line() {
        let mut unit = UnitFile::new();
        unit.set(
            "Service",
            "ExecStart",
            "/bin/true\nEOF\nEOF_1\necho injected",
        );

        let text = Script::new("/bin/sh")
            .file("/tmp/a.service", unit)
            .command("systemctl daemon-reload")
            .to_string();

        assert!(text.contains("cat << 'EOF_2' > \"/tmp/a.service\"\n"));
        assert_eq!(text.lines().filter(|&line| line == "EOF_2").count(), 1);
        assert!(text.contains("echo injected\nEOF_2\n\nsystemctl daemon-reload\n"));
    }
}
