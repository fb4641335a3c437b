//! Line-based terminal controls.
//!
//! Each stdin line is one control, mirroring the buttons and pointer of
//! the browser page:
//!
//! | line | control |
//! |------|---------|
//! | `play`, `pause`, `p` | start or pause |
//! | `step`, `s` | advance one generation |
//! | `random [density]`, `r` | reseed (configured density by default) |
//! | `clear`, `c` | kill every cell |
//! | `fast [on\|off]`, `f` | toggle or set fast speed |
//! | `set <row> <col> <0\|1\|2>` | write one cell |
//! | `draw <row> <col> [primary\|secondary]` | press the pointer |
//! | `move <row> <col>` | drag the pointer |
//! | `up` | release the pointer |
//! | `quit`, `q` | end the run |
//! | `help`, `?` | print this table |

use std::io::BufRead;
use std::thread;

use anyhow::{Context, anyhow, bail};
use colony_core::runner::ControlCommand;
use colony_types::{Cell, PointerButton};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Help text printed for `help`.
pub const USAGE: &str = "\
controls:
  play | pause | p            start or pause
  step | s                    advance one generation
  random [density] | r        reseed
  clear | c                   kill every cell
  fast [on|off] | f           toggle or set fast speed
  set <row> <col> <0|1|2>     write one cell
  draw <row> <col> [primary|secondary]
  move <row> <col>            continue the stroke
  up                          end the stroke
  quit | q                    end the run";

/// One parsed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Forward to the command loop.
    Command(ControlCommand),
    /// Print [`USAGE`].
    Help,
    /// Blank line.
    Nothing,
}

/// Parse one line of terminal input.
///
/// `density` is used by `random` without an argument.
pub fn parse_line(line: &str, density: f64) -> anyhow::Result<Input> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Input::Nothing);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("help" | "?", _) => return Ok(Input::Help),
        ("play" | "pause" | "p" | "toggle", []) => ControlCommand::TogglePlay,
        ("step" | "s", []) => ControlCommand::Step,
        ("random" | "r", []) => ControlCommand::Randomize { density },
        ("random" | "r", [value]) => ControlCommand::Randomize {
            density: parse_density(value)?,
        },
        ("clear" | "c", []) => ControlCommand::Clear,
        ("fast" | "f", []) => ControlCommand::ToggleFast,
        ("fast" | "f", [flag]) => ControlCommand::SetFast {
            enabled: parse_flag(flag)?,
        },
        ("set", [row, col, value]) => ControlCommand::SetCell {
            row: parse_coord(row, "row")?,
            col: parse_coord(col, "col")?,
            cell: parse_cell(value)?,
        },
        ("draw", [row, col]) => ControlCommand::BeginStroke {
            row: parse_coord(row, "row")?,
            col: parse_coord(col, "col")?,
            button: PointerButton::Primary,
        },
        ("draw", [row, col, button]) => ControlCommand::BeginStroke {
            row: parse_coord(row, "row")?,
            col: parse_coord(col, "col")?,
            button: parse_button(button)?,
        },
        ("move" | "drag", [row, col]) => ControlCommand::ContinueStroke {
            row: parse_coord(row, "row")?,
            col: parse_coord(col, "col")?,
        },
        ("up" | "release", []) => ControlCommand::EndStroke,
        ("quit" | "exit" | "q", []) => ControlCommand::Shutdown,
        (other, _) => bail!("unrecognized control `{other}` with {} argument(s)", args.len()),
    };
    Ok(Input::Command(command))
}

fn parse_coord(raw: &str, name: &str) -> anyhow::Result<usize> {
    raw.parse::<usize>()
        .with_context(|| format!("{name} must be a non-negative integer, got `{raw}`"))
}

fn parse_density(raw: &str) -> anyhow::Result<f64> {
    let density: f64 = raw
        .parse()
        .with_context(|| format!("density must be a number, got `{raw}`"))?;
    if !(0.0..=1.0).contains(&density) {
        bail!("density must be within [0, 1], got {density}");
    }
    Ok(density)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(anyhow!("expected on or off, got `{other}`")),
    }
}

fn parse_cell(raw: &str) -> anyhow::Result<Cell> {
    let byte: u8 = raw
        .parse()
        .with_context(|| format!("cell value must be 0, 1 or 2, got `{raw}`"))?;
    Ok(Cell::try_from(byte)?)
}

fn parse_button(raw: &str) -> anyhow::Result<PointerButton> {
    match raw.to_lowercase().as_str() {
        "primary" | "left" | "1" => Ok(PointerButton::Primary),
        "secondary" | "right" | "2" => Ok(PointerButton::Secondary),
        other => Err(anyhow!("expected primary or secondary, got `{other}`")),
    }
}

/// Read stdin on a dedicated thread and forward each control.
///
/// A blocking thread is used so a pending read never holds up runtime
/// shutdown. The thread ends at EOF, on `quit`, or when the loop has gone.
pub fn spawn_stdin_reader(
    commands: mpsc::Sender<ControlCommand>,
    density: f64,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("colony-stdin".to_owned())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(error = %err, "Failed to read stdin");
                        break;
                    }
                };
                match parse_line(&line, density) {
                    Ok(Input::Command(command)) => {
                        debug!(command = ?command, "Control parsed");
                        let shutdown = matches!(command, ControlCommand::Shutdown);
                        if commands.blocking_send(command).is_err() || shutdown {
                            break;
                        }
                    }
                    Ok(Input::Help) => eprintln!("{USAGE}"),
                    Ok(Input::Nothing) => {}
                    Err(err) => {
                        let reason = format!("{err:#}");
                        warn!(input = %line, error = %reason, "Bad control");
                    }
                }
            }
            info!("Stdin reader finished");
        })
}
