use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tetrion_store::{FileStore, SharedStore};

use self::{
    achievements::AchievementsArg,
    simulate::SimulateArg,
    speed::SpeedArg,
};

mod achievements;
mod simulate;
mod speed;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// JSON file holding saved achievements and settings
    #[arg(long, global = true, default_value = "./data/tetrion-store.json")]
    store: PathBuf,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a headless game with a random placement bot
    Simulate(#[clap(flatten)] SimulateArg),
    /// Show or reset unlocked achievements
    Achievements(#[clap(flatten)] AchievementsArg),
    /// Show or change the game speed multiplier
    Speed(#[clap(flatten)] SpeedArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let store = open_store(&args.store)?;
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg, store)?,
        Mode::Achievements(arg) => achievements::run(&arg, store)?,
        Mode::Speed(arg) => speed::run(&arg, store)?,
    }
    Ok(())
}

type Store = SharedStore<FileStore>;

fn open_store(path: &Path) -> anyhow::Result<Store> {
    let store = FileStore::open(path)
        .with_context(|| format!("Failed to open store file: {}", path.display()))?;
    Ok(SharedStore::new(store))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_store_flag_is_global() {
        let args =
            CommandArgs::try_parse_from(["tetrion", "speed", "get", "--store", "x.json"]).unwrap();
        assert_eq!(args.store, PathBuf::from("x.json"));
        assert!(matches!(args.mode, Some(Mode::Speed(_))));
    }

    #[test]
    fn test_fps_is_bounded() {
        assert!(CommandArgs::try_parse_from(["tetrion", "simulate", "--fps", "1000"]).is_ok());
        for fps in ["0", "1001", "18446744073709551"] {
            assert!(
                CommandArgs::try_parse_from(["tetrion", "simulate", "--fps", fps]).is_err(),
                "fps {fps}"
            );
        }
    }

    #[test]
    fn test_default_mode_is_none() {
        let args = CommandArgs::try_parse_from(["tetrion"]).unwrap();
        assert!(args.mode.is_none());
        assert_eq!(args.store, PathBuf::from("./data/tetrion-store.json"));
    }
}
