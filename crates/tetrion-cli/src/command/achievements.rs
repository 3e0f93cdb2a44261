use anyhow::bail;
use clap::Subcommand;
use tetrion_achievements::{ACHIEVEMENTS, AchievementEngine};

use super::Store;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AchievementsArg {
    #[command(subcommand)]
    action: AchievementsAction,
}

#[derive(Debug, Clone, Subcommand)]
enum AchievementsAction {
    /// List the catalog with unlock dates
    List,
    /// Forget every unlocked achievement
    Reset,
}

pub(crate) fn run(arg: &AchievementsArg, store: Store) -> anyhow::Result<()> {
    let mut engine = AchievementEngine::new(store);
    match arg.action {
        AchievementsAction::List => {
            let progress = engine.progress();
            println!(
                "{}/{} unlocked ({:.0}%)",
                progress.unlocked,
                progress.total,
                progress.percent()
            );
            for def in ACHIEVEMENTS {
                let status = match engine.unlock_record(def.id) {
                    Some(record) => record.unlocked_at.format("%Y-%m-%d %H:%M").to_string(),
                    None => "locked".to_owned(),
                };
                println!(
                    "{:<16} {:<10} {:<17} {}",
                    def.name,
                    def.rarity.to_string(),
                    status,
                    def.description
                );
            }
        }
        AchievementsAction::Reset => {
            engine.reset_achievements();
            if let Some(error) = engine.last_save_error() {
                bail!("{error}");
            }
            println!("All achievements have been reset.");
        }
    }
    Ok(())
}
