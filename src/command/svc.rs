use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use super::{OutputArgs, unit_path};
use crate::options::{UnitOption, apply_options};
use crate::script::Script;
use crate::unit::UnitFile;

#[derive(Args, Debug, Clone)]
pub struct Svc {
    /// Name of the unit file
    pub unit: String,

    /// Description of the service unit file
    #[arg(short = 'n', long)]
    pub description: String,

    /// Services for the After= and Requires= lines
    #[arg(short, long, alias = "afterRequires", value_name = "UNIT")]
    pub after_requires: Vec<String>,

    /// The command in ExecStart
    #[arg(short, long, alias = "execStart", value_name = "COMMAND")]
    pub exec_start: String,

    /// The command in ExecStartPre
    #[arg(short = 'p', long, alias = "execStartPre", value_name = "COMMAND")]
    pub exec_start_pre: Vec<String>,

    /// The command in ExecStartPost
    #[arg(short = 'P', long, alias = "execStartPost", value_name = "COMMAND")]
    pub exec_start_post: Vec<String>,

    /// The command in ExecStop
    #[arg(short = 's', long, alias = "execStop", value_name = "COMMAND")]
    pub exec_stop: Vec<String>,

    /// Restart rule
    #[arg(short, long, default_value = "always")]
    pub restart: String,

    /// Seconds to wait before restarting; ignored with `--restart no`
    #[arg(short = 'R', long, alias = "restartSec", default_value_t = 10)]
    pub restart_sec: u32,

    /// Service type
    #[arg(short = 't', long = "type", default_value = "simple")]
    pub service_type: String,

    /// Seconds to wait for start-up; 0 leaves the systemd default
    #[arg(short = 'i', long, alias = "timeoutStartSec", default_value_t = 120)]
    pub timeout_start_sec: u32,

    /// Seconds to wait for stop; 0 leaves the systemd default
    #[arg(short = 'I', long, alias = "timeoutStopSec", default_value_t = 15)]
    pub timeout_stop_sec: u32,

    /// Target in the install section
    #[arg(short = 'b', long, alias = "wantedBy", default_value = "multi-user.target")]
    pub wanted_by: String,

    /// Inline environment variables in the unit file
    #[arg(short = 'v', long, value_name = "NAME=VALUE")]
    pub environment: Vec<String>,

    /// File containing environment variables
    #[arg(short = 'V', long, alias = "environmentFile", value_name = "PATH")]
    pub environment_file: Vec<String>,

    /// Wrap each exec command in the shell provided
    #[arg(short, long, value_name = "SHELL")]
    pub wrap: Option<String>,

    /// Add an arbitrary option to the service unit file, as Section:Key=Value
    #[arg(short = 'o', long, alias = "serviceOption", value_name = "OPTION")]
    pub service_option: Vec<UnitOption>,

    /// Systemd unit file directory
    #[arg(
        short,
        long,
        env = "SYSTEMD_DIR",
        default_value = "/etc/systemd/system"
    )]
    pub dir: PathBuf,

    /// Use a specific shell to execute the output
    #[arg(long, default_value = "/bin/bash")]
    pub shell: String,

    /// Enable the service unit after writing
    #[arg(long)]
    pub enable: bool,

    /// Start the service unit after writing
    #[arg(long)]
    pub start: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Svc {
    fn wrap(&self, command: &str) -> String {
        match &self.wrap {
            Some(shell) => format!("{shell} -c \"{command}\""),
            None => command.to_owned(),
        }
    }

    fn wrap_all(&self, commands: &[String]) -> Vec<String> {
        commands.iter().map(|command| self.wrap(command)).collect()
    }

    #[must_use]
    pub fn service_unit(&self) -> UnitFile {
        let mut unit = UnitFile::new();

        let section = unit.section_mut("Unit");
        section.set("Description", self.description.as_str());

        if !self.after_requires.is_empty() {
            let dependencies = self.after_requires.join(" ");
            section.set("Requires", dependencies.as_str());
            section.set("After", dependencies);
        }

        let section = unit.section_mut("Service");
        section.set("Type", self.service_type.as_str());

        if !self.exec_start_pre.is_empty() {
            section.set("ExecStartPre", self.wrap_all(&self.exec_start_pre));
        }

        section.set("ExecStart", self.wrap(&self.exec_start));

        if !self.exec_start_post.is_empty() {
            section.set("ExecStartPost", self.wrap_all(&self.exec_start_post));
        }

        if !self.exec_stop.is_empty() {
            section.set("ExecStop", self.wrap_all(&self.exec_stop));
        }

        section.set("Restart", self.restart.as_str());

        if self.restart_sec != 0 && self.restart != "no" {
            section.set("RestartSec", self.restart_sec.to_string());
        }

        // Zero means "leave it to systemd".
        if self.timeout_start_sec != 0 {
            section.set("TimeoutStartSec", self.timeout_start_sec.to_string());
        }

        if self.timeout_stop_sec != 0 {
            section.set("TimeoutStopSec", self.timeout_stop_sec.to_string());
        }

        if !self.environment.is_empty() {
            section.set("Environment", self.environment.clone());
        }

        if !self.environment_file.is_empty() {
            section.set("EnvironmentFile", self.environment_file.clone());
        }

        unit.set("Install", "WantedBy", self.wanted_by.as_str());

        apply_options(&mut unit, &self.service_option);
        unit
    }

    #[must_use]
    pub fn script(&self) -> Script {
        debug!(unit = %self.unit, exec_start = %self.exec_start, "building service");

        let service_name = format!("{}.service", self.unit);

        Script::new(self.shell.as_str())
            .file(unit_path(&self.dir, &self.unit, ".service"), self.service_unit())
            .command("systemctl daemon-reload")
            .command_if(self.enable, format!("systemctl enable {service_name}"))
            .command_if(self.start, format!("systemctl start {service_name}"))
    }
}
