use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use super::{OutputArgs, unit_path};
use crate::options::{UnitOption, apply_options};
use crate::script::Script;
use crate::unit::UnitFile;

const SOCKET_PROXYD: &str = "/usr/lib/systemd/systemd-socket-proxyd";

#[derive(Args, Debug, Clone)]
pub struct Fwd {
    /// Name of the unit file
    pub unit: String,

    /// Destination address passed to systemd-socket-proxyd
    #[arg(short = 'e', long)]
    pub destination: String,

    /// Adds addresses to the "ListenStream" section of the unit file
    #[arg(short, long)]
    pub listen: Vec<String>,

    /// Adds interfaces to the "BindToDevice" section of the unit file
    #[arg(short, long, alias = "bindToDevice")]
    pub bind_to_device: Vec<String>,

    /// Adds a WantedBy target in the install section
    #[arg(short, long, alias = "wantedBy", default_value = "sockets.target")]
    pub wanted_by: String,

    /// Add an arbitrary option to the socket unit file, as Section:Key=Value
    #[arg(short = 'o', long, alias = "socketOption", value_name = "OPTION")]
    pub socket_option: Vec<UnitOption>,

    /// Add an arbitrary option to the service unit file, as Section:Key=Value
    #[arg(long, alias = "serviceOption", value_name = "OPTION")]
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

    /// Enable the socket unit after writing
    #[arg(long)]
    pub enable: bool,

    /// Start the socket unit after writing
    #[arg(long)]
    pub start: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Fwd {
    fn description(&self) -> String {
        format!("Port Forward to {}", self.destination)
    }

    #[must_use]
    pub fn socket_unit(&self) -> UnitFile {
        let mut socket = UnitFile::new();

        socket.set("Unit", "Description", self.description());

        if !self.listen.is_empty() {
            socket.set("Socket", "ListenStream", self.listen.clone());
        }

        if !self.bind_to_device.is_empty() {
            socket.set("Socket", "BindToDevice", self.bind_to_device.clone());
        }

        socket.set("Install", "WantedBy", self.wanted_by.as_str());

        apply_options(&mut socket, &self.socket_option);
        socket
    }

    #[must_use]
    pub fn service_unit(&self) -> UnitFile {
        let mut service = UnitFile::new();
        let socket_name = format!("{}.socket", self.unit);

        let unit = service.section_mut("Unit");
        unit.set("Description", self.description());
        unit.set("Requires", socket_name.as_str());
        unit.set("After", socket_name);

        service.set(
            "Service",
            "ExecStart",
            format!("{SOCKET_PROXYD} {}", self.destination),
        );

        apply_options(&mut service, &self.service_option);
        service
    }

    #[must_use]
    pub fn script(&self) -> Script {
        debug!(unit = %self.unit, destination = %self.destination, "building port forward");

        let socket_name = format!("{}.socket", self.unit);

        Script::new(self.shell.as_str())
            .file(unit_path(&self.dir, &self.unit, ".socket"), self.socket_unit())
            .file(unit_path(&self.dir, &self.unit, ".service"), self.service_unit())
            .command("systemctl daemon-reload")
            .command_if(self.enable, format!("systemctl enable {socket_name}"))
            .command_if(self.start, format!("systemctl start {socket_name}"))
    }
}
