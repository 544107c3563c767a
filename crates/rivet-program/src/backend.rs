//! Programmer backends and board dispatch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProgrammerError, Result};

/// Loads a bitstream into a device through an external tool.
///
/// Object-safe so board dispatch can hand back `Box<dyn Programmer>`.
pub trait Programmer: fmt::Debug {
    /// Backend name, for diagnostics.
    fn name(&self) -> &str;

    /// Whether the bitstream bytes must be bit-reversed before loading.
    fn needs_bitreverse(&self) -> bool {
        false
    }

    /// Load a bitstream onto the attached device.
    ///
    /// `cable_suffix` disambiguates between several attached cables of the
    /// same kind (e.g., `" [1-2]"`); empty means the only cable.
    fn load_bitstream(&self, bitstream: &Path, cable_suffix: &str) -> Result<()>;
}

/// Run an external tool to completion, mapping the two observable failure
/// shapes onto [`ProgrammerError`].
fn run_tool(tool: &Path, args: &[String]) -> Result<()> {
    let name = tool.display().to_string();
    let status = Command::new(tool)
        .args(args)
        .status()
        .map_err(|source| ProgrammerError::Invocation {
            tool: name.clone(),
            source,
        })?;
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ProgrammerError::Exit { tool: name, code }),
        None => Err(ProgrammerError::Terminated { tool: name }),
    }
}

/// Altera/Intel USB-Blaster cable, driven through `quartus_pgm`.
#[derive(Debug)]
pub struct UsbBlaster {
    cable_name: String,
    device_id: u32,
    tool: PathBuf,
}

impl UsbBlaster {
    /// Target the device at `device_id` in the JTAG chain.
    pub fn new(device_id: u32) -> Self {
        Self {
            cable_name: "USB-Blaster".into(),
            device_id,
            tool: "quartus_pgm".into(),
        }
    }

    /// Use a different cable name (e.g., "USB-BlasterII").
    pub fn with_cable(mut self, cable_name: impl Into<String>) -> Self {
        self.cable_name = cable_name.into();
        self
    }

    /// Override the tool path (tests point this at a stub).
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    fn args(&self, bitstream: &Path, cable_suffix: &str) -> Vec<String> {
        vec![
            "-m".into(),
            "jtag".into(),
            "-c".into(),
            format!("{}{cable_suffix}", self.cable_name),
            "-o".into(),
            format!("p;{}@{}", bitstream.display(), self.device_id),
        ]
    }
}

impl Programmer for UsbBlaster {
    fn name(&self) -> &str {
        "usb-blaster"
    }

    fn load_bitstream(&self, bitstream: &Path, cable_suffix: &str) -> Result<()> {
        run_tool(&self.tool, &self.args(bitstream, cable_suffix))
    }
}

/// JTAG programming through `openocd` with a board config file.
#[derive(Debug)]
pub struct OpenOcd {
    config: PathBuf,
    tool: PathBuf,
}

impl OpenOcd {
    /// Program through the given OpenOCD board configuration.
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
            tool: "openocd".into(),
        }
    }

    /// Override the tool path (tests point this at a stub).
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    fn args(&self, bitstream: &Path) -> Vec<String> {
        vec![
            "-f".into(),
            self.config.display().to_string(),
            "-c".into(),
            format!("init; pld load 0 {}; exit", bitstream.display()),
        ]
    }
}

impl Programmer for OpenOcd {
    fn name(&self) -> &str {
        "openocd"
    }

    fn load_bitstream(&self, bitstream: &Path, _cable_suffix: &str) -> Result<()> {
        run_tool(&self.tool, &self.args(bitstream))
    }
}

/// Serial-port image loader (`flterm`-compatible arguments).
#[derive(Debug)]
pub struct SerialLoader {
    port: String,
    speed: u32,
    tool: PathBuf,
}

impl SerialLoader {
    pub fn new(port: impl Into<String>, speed: u32) -> Self {
        Self {
            port: port.into(),
            speed,
            tool: "flterm".into(),
        }
    }

    /// Override the tool path (tests point this at a stub).
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    fn args(&self, image: &Path) -> Vec<String> {
        vec![
            "--port".into(),
            self.port.clone(),
            "--speed".into(),
            self.speed.to_string(),
            "--kernel".into(),
            image.display().to_string(),
        ]
    }
}

impl Programmer for SerialLoader {
    fn name(&self) -> &str {
        "serial"
    }

    fn load_bitstream(&self, bitstream: &Path, _cable_suffix: &str) -> Result<()> {
        run_tool(&self.tool, &self.args(bitstream))
    }
}

/// Select the default programmer for a board identity.
pub fn for_board(board: &str) -> Option<Box<dyn Programmer>> {
    match board {
        "arty-a7-35" => Some(Box::new(OpenOcd::new("digilent_arty.cfg"))),
        "de0-nano" => Some(Box::new(UsbBlaster::new(1))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn stub_tool(dir: &Path, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("stub-tool");
        std::fs::write(&path, format!("#!/bin/sh\nexit {exit_code}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn usb_blaster_command_line() {
        let blaster = UsbBlaster::new(1);
        let args = blaster.args(Path::new("build/top.sof"), " [1-2]");
        assert_eq!(
            args,
            vec![
                "-m",
                "jtag",
                "-c",
                "USB-Blaster [1-2]",
                "-o",
                "p;build/top.sof@1",
            ]
        );
    }

    #[test]
    fn openocd_command_line() {
        let ocd = OpenOcd::new("digilent_arty.cfg");
        let args = ocd.args(Path::new("build/top.bit"));
        assert_eq!(args[1], "digilent_arty.cfg");
        assert_eq!(args[3], "init; pld load 0 build/top.bit; exit");
    }

    #[test]
    fn serial_loader_command_line() {
        let serial = SerialLoader::new("/dev/ttyUSB0", 115200);
        let args = serial.args(Path::new("firmware.bin"));
        assert_eq!(
            args,
            vec![
                "--port",
                "/dev/ttyUSB0",
                "--speed",
                "115200",
                "--kernel",
                "firmware.bin",
            ]
        );
    }

    #[test]
    fn missing_tool_is_an_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let blaster = UsbBlaster::new(1).with_tool(dir.path().join("no-such-tool"));
        let err = blaster
            .load_bitstream(Path::new("top.sof"), "")
            .unwrap_err();
        assert!(matches!(err, ProgrammerError::Invocation { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_code_is_carried() {
        let dir = tempfile::tempdir().unwrap();
        let tool = stub_tool(dir.path(), 2);
        let ocd = OpenOcd::new("board.cfg").with_tool(tool);
        let err = ocd.load_bitstream(Path::new("top.bit"), "").unwrap_err();
        match err {
            ProgrammerError::Exit { code, .. } => assert_eq!(code, 2),
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let tool = stub_tool(dir.path(), 0);
        let ocd = OpenOcd::new("board.cfg").with_tool(tool);
        ocd.load_bitstream(Path::new("top.bit"), "").unwrap();
    }

    #[test]
    fn board_dispatch() {
        assert_eq!(for_board("arty-a7-35").unwrap().name(), "openocd");
        assert_eq!(for_board("de0-nano").unwrap().name(), "usb-blaster");
        assert!(for_board("unknown").is_none());
    }

    #[test]
    fn bitreverse_defaults_off() {
        assert!(!UsbBlaster::new(0).needs_bitreverse());
        assert!(!OpenOcd::new("x.cfg").needs_bitreverse());
    }
}
