//! Plain-text command scripts replayed against a scene.
//!
//! One command per line, arguments separated by whitespace. Blank lines and
//! lines starting with `#` are ignored.

use antcore::prelude::{AntennaMode, SolverRunner};
use antcore::scene::{Scene, StandardAntenna};
use antcore::solver::{SolveSummary, Solver};
use anyhow::{anyhow, bail, Context};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    Standard(StandardAntenna),
    Wall,
    NextElement,
    NextAntenna,
    Move(f64, f64, f64),
    Rotate(f64, f64, f64),
    Scale(f64, f64),
    MoveWall(f64, f64, f64),
    ScaleWall(f64, f64, f64),
    MoveAntenna(f64, f64, f64),
    RotateAntenna(f64, f64, f64),
    Frequency(f64),
    Delete,
    Mode(AntennaMode),
    Solve,
    Save(PathBuf),
}

fn numbers<const N: usize>(verb: &str, args: &[&str]) -> anyhow::Result<[f64; N]> {
    if args.len() != N {
        bail!("{} takes {} numbers, got {}", verb, N, args.len());
    }
    let mut values = [0.0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("{}: {:?} is not a number", verb, arg))?;
    }
    Ok(values)
}

fn single<'a>(verb: &str, args: &[&'a str]) -> anyhow::Result<&'a str> {
    match args {
        [one] => Ok(*one),
        _ => bail!("{} takes exactly one argument", verb),
    }
}

fn bare(verb: &str, args: &[&str], command: Command) -> anyhow::Result<Command> {
    if !args.is_empty() {
        bail!("{} takes no arguments", verb);
    }
    Ok(command)
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = words.collect();

        let command = match verb {
            "load" => Command::Load(PathBuf::from(single(verb, &args)?)),
            "standard" => {
                let name = single(verb, &args)?;
                Command::Standard(
                    StandardAntenna::from_name(name)
                        .ok_or_else(|| anyhow!("unknown standard antenna {:?}", name))?,
                )
            }
            "wall" => bare(verb, &args, Command::Wall)?,
            "next-element" => bare(verb, &args, Command::NextElement)?,
            "next-antenna" => bare(verb, &args, Command::NextAntenna)?,
            "move" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::Move(x, y, z)
            }
            "rotate" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::Rotate(x, y, z)
            }
            "scale" => {
                let [scale, width] = numbers::<2>(verb, &args)?;
                Command::Scale(scale, width)
            }
            "move-wall" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::MoveWall(x, y, z)
            }
            "scale-wall" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::ScaleWall(x, y, z)
            }
            "move-antenna" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::MoveAntenna(x, y, z)
            }
            "rotate-antenna" => {
                let [x, y, z] = numbers::<3>(verb, &args)?;
                Command::RotateAntenna(x, y, z)
            }
            "frequency" => {
                let [mhz] = numbers::<1>(verb, &args)?;
                Command::Frequency(mhz)
            }
            "delete" => bare(verb, &args, Command::Delete)?,
            "mode" => match single(verb, &args)? {
                "single" => Command::Mode(AntennaMode::Single),
                "multiple" => Command::Mode(AntennaMode::Multiple),
                other => bail!("unknown antenna mode {:?}", other),
            },
            "solve" => bare(verb, &args, Command::Solve)?,
            "save" => Command::Save(PathBuf::from(single(verb, &args)?)),
            other => bail!("unknown command {:?}", other),
        };
        Ok(command)
    }
}

pub fn parse_script(text: &str) -> anyhow::Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            line.parse::<Command>()
                .with_context(|| format!("script line {}: {:?}", number, line))
        })
        .collect()
}

pub fn load_script<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Command>> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading command script {}", path_ref.display()))?;
    parse_script(&contents).with_context(|| format!("parsing command script {}", path_ref.display()))
}

/// Replays commands in order and collects the summaries of the solves they
/// triggered.
pub struct CommandReplay<'a, R: SolverRunner> {
    scene: &'a mut Scene,
    solver: &'a mut Solver<R>,
    solves: Vec<SolveSummary>,
}

impl<'a, R: SolverRunner> CommandReplay<'a, R> {
    pub fn new(scene: &'a mut Scene, solver: &'a mut Solver<R>) -> Self {
        Self {
            scene,
            solver,
            solves: Vec::new(),
        }
    }

    pub fn run(mut self, commands: &[Command]) -> anyhow::Result<Vec<SolveSummary>> {
        for (idx, command) in commands.iter().enumerate() {
            self.apply(command)
                .with_context(|| format!("command {} ({:?})", idx + 1, command))?;
        }
        Ok(self.solves)
    }

    fn apply(&mut self, command: &Command) -> anyhow::Result<()> {
        let scene = &mut *self.scene;
        let applied = match command {
            Command::Load(path) => {
                let idx = scene.load_file(path)?;
                info!("loaded {} as antenna {}", path.display(), idx);
                true
            }
            Command::Standard(standard) => {
                scene.load_standard(*standard)?;
                true
            }
            Command::Wall => {
                scene.add_wall()?;
                true
            }
            Command::NextElement => {
                scene.select_next_element()?;
                true
            }
            Command::NextAntenna => {
                scene.select_next_antenna()?;
                true
            }
            Command::Move(x, y, z) => scene.move_current_element(*x, *y, *z)?,
            Command::Rotate(x, y, z) => scene.rotate_current_element(*x, *y, *z)?,
            Command::Scale(scale, width) => scene.scale_current_element(*scale, *width)?,
            Command::MoveWall(x, y, z) => scene.move_current_wall(*x, *y, *z)?,
            Command::ScaleWall(x, y, z) => scene.scale_current_wall(*x, *y, *z)?,
            Command::MoveAntenna(x, y, z) => {
                scene.move_current_antenna(*x, *y, *z)?;
                true
            }
            Command::RotateAntenna(x, y, z) => {
                scene.rotate_current_antenna(*x, *y, *z)?;
                true
            }
            Command::Frequency(mhz) => {
                scene.change_frequency(*mhz)?;
                true
            }
            Command::Delete => {
                scene.delete_current_antenna()?;
                true
            }
            Command::Mode(mode) => {
                scene.mode = *mode;
                true
            }
            Command::Solve => {
                if let Some(summary) = self.solver.solve_if_needed(scene)? {
                    self.solves.push(summary);
                }
                true
            }
            Command::Save(path) => {
                scene.save(path, self.solver.visual())?;
                true
            }
        };
        if !applied {
            warn!("{:?} does not apply to the selected element", command);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_parses_every_verb() {
        let script = "\
# demo
standard yagi
load antennas/dipole.nec

wall
next-element
next-antenna
move 0 0.5 0
rotate 10 0 45
scale 0.2 -0.1
move-wall 1 0 0
scale-wall 0 1 1
move-antenna 3 0 0
rotate-antenna 0 0 90
frequency 28.4
mode multiple
solve
save out/edited.nec
delete
";
        let commands = parse_script(script).unwrap();
        assert_eq!(commands.len(), 17);
        assert_eq!(commands[0], Command::Standard(StandardAntenna::Yagi));
        assert_eq!(commands[6], Command::Rotate(10.0, 0.0, 45.0));
        assert_eq!(commands[7], Command::Scale(0.2, -0.1));
        assert_eq!(commands[13], Command::Mode(AntennaMode::Multiple));
        assert_eq!(commands[16], Command::Delete);
    }

    #[test]
    fn bad_lines_name_their_line_number() {
        let err = parse_script("wall\nmove 1 2\n").unwrap_err();
        assert!(format!("{:#}", err).contains("script line 2"));

        assert!("frequency fast".parse::<Command>().is_err());
        assert!("standard helix".parse::<Command>().is_err());
        assert!("wall now".parse::<Command>().is_err());
        assert!("teleport".parse::<Command>().is_err());
    }
}
