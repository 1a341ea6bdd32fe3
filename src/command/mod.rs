mod fwd;
mod svc;
mod wg;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

pub use self::fwd::Fwd;
pub use self::svc::Svc;
pub use self::wg::Wg;
use crate::error::Error;
use crate::output::Output;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Adds systemd socket activation unit files to effect port forwarding
    Fwd(Fwd),
    /// Generates a systemd unit file for an arbitrary service
    Svc(Svc),
    /// Adds a wireguard interface to the networkd files
    Wg(Wg),
}

impl Command {
    pub fn run(&self) -> Result<(), Error> {
        match self {
            Self::Fwd(fwd) => fwd.output.output().write(&fwd.script().to_string()),
            Self::Svc(svc) => svc.output.output().write(&svc.script().to_string()),
            Self::Wg(wg) => {
                wg.write_keys()?;
                wg.output.output().write(&wg.script().to_string())
            }
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write output to this file rather than STDOUT
    #[arg(short, long, value_name = "FILE", conflicts_with = "append")]
    pub file: Option<PathBuf>,

    /// Append output to this file rather than STDOUT
    #[arg(short = 'F', long, value_name = "FILE")]
    pub append: Option<PathBuf>,
}

impl OutputArgs {
    #[must_use]
    pub fn output(&self) -> Output {
        Output::new(self.file.clone(), self.append.clone())
    }
}

/// `<dir>/<unit><suffix>`, e.g. `/etc/systemd/system/foo.service`.
pub(crate) fn unit_path(dir: &Path, unit: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{unit}{suffix}"))
}
