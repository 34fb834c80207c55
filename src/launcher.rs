use std::fmt;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::endpoint::{ConnectionDescriptor, EngineParams};
use crate::error::{DbaasError, DbaasResult};

const MASK: &str = "****";
const PASSWORD_FLAGS: [&str; 2] = ["-a", "-p"];

/// Native client invocation for one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn for_descriptor(db: &ConnectionDescriptor) -> Self {
        let password = &db.password;
        let (program, args) = match &db.engine {
            EngineParams::Redis => {
                let mut args = vec!["-h".to_string(), db.hostname.clone()];
                if let Some(password) = password {
                    args.extend(["-a".to_string(), password.clone()]);
                }
                ("redis-cli", args)
            }
            EngineParams::Mongo { username, path } => {
                let mut args = vec![
                    format!("{}{}", db.hostname, path),
                    "-u".to_string(),
                    username.clone(),
                ];
                if let Some(password) = password {
                    args.extend(["-p".to_string(), password.clone()]);
                }
                ("mongo", args)
            }
            EngineParams::Mysql { username, database } => {
                let mut args = vec![
                    "-h".to_string(),
                    db.hostname.clone(),
                    "-u".to_string(),
                    username.clone(),
                ];
                if let Some(password) = password {
                    args.extend(["-p".to_string(), password.clone()]);
                }
                args.push(database.clone());
                ("mysql", args)
            }
        };

        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Runs the client with the terminal attached and returns its exit code.
    ///
    /// Ctrl-C reaches the whole foreground group; the client decides what an
    /// interrupt means, so it is swallowed here until the client exits.
    pub async fn run(&self) -> DbaasResult<i32> {
        info!("Launching {}", self);

        let launch_err = |source: std::io::Error| DbaasError::LaunchError {
            program: self.program.clone(),
            source,
        };

        // Registered before spawning so an early interrupt cannot kill us.
        let mut interrupts = interrupts().map_err(launch_err)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(launch_err)?;

        let status = loop {
            tokio::select! {
                status = child.wait() => break status.map_err(launch_err)?,
                Some(()) = interrupts.recv() => {
                    debug!("Interrupt received while {} is running", self.program);
                }
            }
        };

        match status.code() {
            Some(code) => Ok(code),
            None => {
                warn!("{} was terminated by a signal", self.program);
                Ok(1)
            }
        }
    }
}

#[cfg(unix)]
fn interrupts() -> std::io::Result<tokio::signal::unix::Signal> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupts() -> std::io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        let mut previous: Option<&str> = None;
        for arg in &self.args {
            if previous.is_some_and(|flag| PASSWORD_FLAGS.contains(&flag)) {
                write!(f, " {}", MASK)?;
            } else {
                write!(f, " {}", arg)?;
            }
            previous = Some(arg.as_str());
        }
        Ok(())
    }
}
