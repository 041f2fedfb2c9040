//! Key scripts: one character per command.
//!
//! | Char          | Command                         |
//! |---------------|---------------------------------|
//! | `^ v < >`     | press and release an arrow key  |
//! | `x`           | press and release space (wait)  |
//! | `p`           | `pause_next()`                  |
//! | `r`           | `resume()`                      |
//! | `e`           | `end_task()`                    |
//! | `.`           | idle for one gap                |
//!
//! Whitespace is ignored.

use anyhow::{bail, Result};

use gw_core::Action;
use gw_task::Key;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Press(Key),
    PauseNext,
    Resume,
    EndTask,
    Idle,
}

pub fn parse(script: &str) -> Result<Vec<Command>> {
    let mut out = Vec::with_capacity(script.len());
    for (i, ch) in script.chars().enumerate() {
        let cmd = match ch {
            c if c.is_whitespace() => continue,
            'p' => Command::PauseNext,
            'r' => Command::Resume,
            'e' => Command::EndTask,
            '.' => Command::Idle,
            c => match Action::from_code(c) {
                Some(a) => Command::Press(Key::for_action(a)),
                None => bail!("unknown script character {c:?} at position {i}"),
            },
        };
        out.push(cmd);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_script() {
        let cmds = parse("^> p x r .e").unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::Press(Key::ArrowUp),
                Command::Press(Key::ArrowRight),
                Command::PauseNext,
                Command::Press(Key::Space),
                Command::Resume,
                Command::Idle,
                Command::EndTask,
            ]
        );
    }

    #[test]
    fn rejects_unknown() {
        assert!(parse("^?").is_err());
    }
}
