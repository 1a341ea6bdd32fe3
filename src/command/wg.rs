use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};

use super::{OutputArgs, unit_path};
use crate::error::Error;
use crate::options::{UnitOption, apply_options};
use crate::script::Script;
use crate::unit::UnitFile;

const PERSISTENT_KEEPALIVE: &str = "25";

#[derive(Args, Debug, Clone)]
pub struct Wg {
    /// Name of the wireguard interface
    pub unit: String,

    /// Private key of the local Wireguard peer
    #[arg(short, long, alias = "privateKey", value_name = "KEY")]
    pub private_key: String,

    /// Public key of the remote Wireguard server
    #[arg(short = 'u', long, alias = "publicKey", value_name = "KEY")]
    pub public_key: String,

    /// Preshared key of the link
    #[arg(short = 'k', long, alias = "presharedKey", value_name = "KEY")]
    pub preshared_key: Option<String>,

    /// Adds addresses to the allowed IPs section
    #[arg(short = 'i', long, alias = "allowedIps", value_name = "CIDR")]
    pub allowed_ips: Vec<String>,

    /// Address of the local peer
    #[arg(short, long)]
    pub address: String,

    /// Endpoint of the remote server
    #[arg(short, long)]
    pub endpoint: String,

    /// Gateway of the remote server
    #[arg(short, long)]
    pub gateway: String,

    /// CIDR subnet of the remote network
    #[arg(short = 'b', long, value_name = "CIDR")]
    pub subnet: String,

    /// Add an arbitrary option to the netdev unit file, as Section:Key=Value
    #[arg(long, alias = "netdevOption", value_name = "OPTION")]
    pub netdev_option: Vec<UnitOption>,

    /// Add an arbitrary option to the network unit file, as Section:Key=Value
    #[arg(long, alias = "networkOption", value_name = "OPTION")]
    pub network_option: Vec<UnitOption>,

    /// Systemd networkd file directory
    #[arg(
        short,
        long,
        env = "NETWORKD_DIR",
        default_value = "/etc/systemd/network"
    )]
    pub dir: PathBuf,

    /// Use a specific shell to execute the output
    #[arg(long, default_value = "/bin/sh")]
    pub shell: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Wg {
    #[must_use]
    pub fn private_key_path(&self) -> PathBuf {
        unit_path(&self.dir, &self.unit, "-private-key")
    }

    #[must_use]
    pub fn preshared_key_path(&self) -> PathBuf {
        unit_path(&self.dir, &self.unit, "-preshared-key")
    }

    #[must_use]
    pub fn netdev_unit(&self) -> UnitFile {
        let mut netdev = UnitFile::new();

        let section = netdev.section_mut("NetDev");
        section.set("Name", self.unit.as_str());
        section.set("Kind", "wireguard");
        section.set("Description", format!("Wireguard Client for {}", self.unit));

        netdev.set(
            "WireGuard",
            "PrivateKeyFile",
            self.private_key_path().display().to_string(),
        );

        let section = netdev.section_mut("WireGuardPeer");
        section.set("PublicKey", self.public_key.as_str());
        section.set("Endpoint", self.endpoint.as_str());
        section.set("PersistentKeepalive", PERSISTENT_KEEPALIVE);

        // systemd accepts a comma separated list here, so keep it on one line.
        if !self.allowed_ips.is_empty() {
            section.set("AllowedIPs", self.allowed_ips.join(","));
        }

        if self.preshared_key.is_some() {
            section.set(
                "PresharedKeyFile",
                self.preshared_key_path().display().to_string(),
            );
        }

        apply_options(&mut netdev, &self.netdev_option);
        netdev
    }

    #[must_use]
    pub fn network_unit(&self) -> UnitFile {
        let mut network = UnitFile::new();

        network.set("Match", "Name", self.unit.as_str());
        network.set("Network", "Address", self.address.as_str());

        let route = network.section_mut("Route");
        route.set("Gateway", self.gateway.as_str());
        route.set("Destination", self.subnet.as_str());
        route.set("GatewayOnlink", "true");

        apply_options(&mut network, &self.network_option);
        network
    }

    /// Writes the private key, and the preshared key if there is one, next to the unit files.
    ///
    /// The directory is created if it does not exist yet.
    pub fn write_keys(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        write_secret(&self.private_key_path(), &self.private_key)?;

        if let Some(preshared_key) = &self.preshared_key {
            write_secret(&self.preshared_key_path(), preshared_key)?;
        }

        Ok(())
    }

    #[must_use]
    pub fn script(&self) -> Script {
        debug!(interface = %self.unit, endpoint = %self.endpoint, "building wireguard interface");

        Script::new(self.shell.as_str())
            .file(unit_path(&self.dir, &self.unit, ".netdev"), self.netdev_unit())
            .file(unit_path(&self.dir, &self.unit, ".network"), self.network_unit())
            .command("systemctl daemon-reload")
            .command("systemctl restart systemd-networkd")
    }
}

fn write_secret(path: &Path, secret: &str) -> Result<(), Error> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(secret.as_bytes()))
        .map_err(|source| Error::write(path, source))?;

    info!(path = %path.display(), "wrote key material");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::command::test_util::parse;
    use crate::unit::Value;
    use tempfile::TempDir;

    fn wg(args: &[&str]) -> Wg {
        let args = [&["wg"][..], args].concat();

        match parse(&args) {
            Command::Wg(wg) => wg,
            other => panic!("expected wg, got {other:?}"),
        }
    }

    fn required<'a>(dir: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec![
            "wg0",
            "-p",
            "private_key",
            "-u",
            "public_key",
            "-a",
            "10.0.44.2/32",
            "-e",
            "wireguard.example.com:51820",
            "-g",
            "10.0.44.1",
            "-b",
            "10.0.44.0/24",
            "-d",
            dir,
        ];
        args.extend_from_slice(extra);
        args
    }

    #[test]
    fn netdev_and_network_units() {
        let wg = wg(&required("/etc/systemd/network", &[]));

        assert_eq!(
            wg.netdev_unit().render(),
            "[NetDev]\n\
             Name=wg0\n\
             Kind=wireguard\n\
             Description=Wireguard Client for wg0\n\
             \n\
             [WireGuard]\n\
             PrivateKeyFile=/etc/systemd/network/wg0-private-key\n\
             \n\
             [WireGuardPeer]\n\
             PublicKey=public_key\n\
             Endpoint=wireguard.example.com:51820\n\
             PersistentKeepalive=25"
        );

        assert_eq!(
            wg.network_unit().render(),
            "[Match]\n\
             Name=wg0\n\
             \n\
             [Network]\n\
             Address=10.0.44.2/32\n\
             \n\
             [Route]\n\
             Gateway=10.0.44.1\n\
             Destination=10.0.44.0/24\n\
             GatewayOnlink=true"
        );
    }

    #[test]
    fn allowed_ips_are_comma_joined() {
        let wg = wg(&required(
            "/etc/systemd/network",
            &["-i", "10.0.0.0/16", "-i", "10.0.1.0/24"],
        ));

        assert_eq!(
            wg.netdev_unit().get("WireGuardPeer", "AllowedIPs"),
            Some(&Value::from("10.0.0.0/16,10.0.1.0/24"))
        );
    }

    #[test]
    fn preshared_key_adds_key_file() {
        let wg = wg(&required("/etc/systemd/network", &["-k", "preshared"]));

        assert_eq!(
            wg.netdev_unit().get("WireGuardPeer", "PresharedKeyFile"),
            Some(&Value::from("/etc/systemd/network/wg0-preshared-key"))
        );
    }

    #[test]
    fn options_target_their_own_unit() {
        let wg = wg(&required(
            "/etc/systemd/network",
            &[
                "--netdevOption",
                "WireGuardPeer:PersistentKeepalive=30",
                "--network-option",
                "Network:DNS=10.0.44.1",
            ],
        ));

        assert_eq!(
            wg.netdev_unit().get("WireGuardPeer", "PersistentKeepalive"),
            Some(&Value::List(vec!["25".to_owned(), "30".to_owned()]))
        );
        assert_eq!(
            wg.network_unit().get("Network", "DNS"),
            Some(&Value::List(vec!["10.0.44.1".to_owned()]))
        );
        assert!(wg.netdev_unit().section("Network").is_none());
    }

    #[test]
    fn write_keys_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("network");
        let dir_str = dir.to_str().unwrap();

        let wg = wg(&required(dir_str, &["-k", "preshared"]));
        wg.write_keys().unwrap();

        assert_eq!(
            fs::read_to_string(dir.join("wg0-private-key")).unwrap(),
            "private_key"
        );
        assert_eq!(
            fs::read_to_string(dir.join("wg0-preshared-key")).unwrap(),
            "preshared"
        );
    }

    #[cfg(unix)]
    #[test]
    fn key_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir_str = tmp.path().to_str().unwrap();

        let wg = wg(&required(dir_str, &[]));
        wg.write_keys().unwrap();

        let mode = fs::metadata(tmp.path().join("wg0-private-key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.path().join("wg0-preshared-key").exists());
    }

    #[test]
    fn script_restarts_networkd() {
        let wg = wg(&required("/etc/systemd/network", &[]));
        let script = wg.script();

        assert_eq!(script.shell(), "/bin/sh");
        assert_eq!(
            script.commands(),
            ["systemctl daemon-reload", "systemctl restart systemd-networkd"]
        );
        assert_eq!(
            script.files()[1].0,
            PathBuf::from("/etc/systemd/network/wg0.network")
        );
    }
}
