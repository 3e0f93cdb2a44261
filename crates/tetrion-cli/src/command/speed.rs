use anyhow::Context as _;
use clap::Subcommand;
use tetrion_store::{MAX_SPEED, MIN_SPEED, SpeedSetting};

use super::Store;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SpeedArg {
    #[command(subcommand)]
    action: SpeedAction,
}

#[derive(Debug, Clone, Subcommand)]
enum SpeedAction {
    /// Print the current multiplier
    Get,
    /// Change the multiplier (clamped to the allowed range)
    Set {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Return to the default multiplier
    Reset,
}

pub(crate) fn run(arg: &SpeedArg, store: Store) -> anyhow::Result<()> {
    let mut setting = SpeedSetting::load(store);
    match arg.action {
        SpeedAction::Get => println!("{}", setting.multiplier()),
        SpeedAction::Set { value } => {
            let applied = setting
                .set(value)
                .context("Failed to save the speed multiplier")?;
            if !(MIN_SPEED..=MAX_SPEED).contains(&value) {
                eprintln!("speed clamped to {applied} (allowed range {MIN_SPEED}..={MAX_SPEED})");
            }
            println!("{applied}");
        }
        SpeedAction::Reset => {
            setting
                .reset()
                .context("Failed to reset the speed multiplier")?;
            println!("{}", setting.multiplier());
        }
    }
    Ok(())
}
