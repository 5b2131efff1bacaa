//! Replay script format

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Window known to the registry before the first step
#[derive(Debug, Clone, Deserialize)]
pub struct WindowDecl {
    pub handle: u32,
    pub surface: u32,
}

/// One raw callback or controller request
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Bind the outbound channel here instead of before the first step
    Bind,
    Capabilities {
        #[serde(default)]
        pointer: bool,
        #[serde(default)]
        keyboard: bool,
    },
    /// XKB text keymap file, shared as fd + size
    Keymap { path: PathBuf },
    PointerEnter { surface: u32, x: f64, y: f64 },
    PointerLeave { surface: u32 },
    Motion { x: f64, y: f64 },
    Button { button: u32, pressed: bool },
    Axis { axis: u32, value: f64 },
    KeyboardEnter { surface: u32 },
    KeyboardLeave { surface: u32 },
    /// evdev key code
    Key { key: u32, pressed: bool },
    Modifiers {
        #[serde(default)]
        depressed: u32,
        #[serde(default)]
        latched: u32,
        #[serde(default)]
        locked: u32,
        #[serde(default)]
        group: u32,
    },
    SetActiveWindow {
        #[serde(default)]
        window: Option<u32>,
    },
    ResetIme,
    ShowInputPanel,
    HideInputPanel,
    Commit { text: String },
    Preedit { text: String, commit: String },
    Keysym {
        sym: u32,
        pressed: bool,
        #[serde(default)]
        modifiers: u32,
    },
    /// Server-side resize of a window
    Resize { window: u32, width: u32, height: u32 },
    /// Host shell asks the window to close
    ShellClose { window: u32 },
    /// Window destroyed locally (the server doesn't know yet)
    DestroyWindow { window: u32 },
}

/// Replay script
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Seat id passed to text-model requests
    pub seat: u32,
    #[serde(rename = "window")]
    pub windows: Vec<WindowDecl>,
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse script: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
