use wasm_bindgen::prelude::*;
use reel_engine::{Result, Switcher, Timeline};

mod brick_by_brick;
mod common;
mod cube_swarm;
mod data_leak;
mod flag;
mod helix;
mod money_transfer;
mod power_balance;
mod profile_web;
mod torus_drift;
mod unraveling_thread;

pub use brick_by_brick::BrickByBrick;
pub use cube_swarm::CubeSwarm;
pub use data_leak::DataLeak;
pub use flag::Flag;
pub use helix::Helix;
pub use money_transfer::MoneyTransfer;
pub use power_balance::PowerBalance;
pub use profile_web::{Profile, ProfileWeb};
pub use torus_drift::TorusDrift;
pub use unraveling_thread::UnravelingThread;

/// Every show, in menu order.
pub fn catalogue() -> Result<Switcher> {
    let mut sw = Switcher::new();
    sw.register("cube-swarm", Timeline::boxed(CubeSwarm::new())?)?;
    sw.register("torus-drift", Timeline::boxed(TorusDrift::new())?)?;
    sw.register("helix", Timeline::boxed(Helix::new())?)?;
    sw.register("flag", Timeline::boxed(Flag::new())?)?;
    sw.register("money-transfer", Timeline::boxed(MoneyTransfer::new())?)?;
    sw.register("brick-by-brick", Timeline::boxed(BrickByBrick::new())?)?;
    sw.register("data-leak", Timeline::boxed(DataLeak::new())?)?;
    sw.register("power-balance", Timeline::boxed(PowerBalance::new())?)?;
    sw.register("profile-web", Timeline::boxed(ProfileWeb::new(profile_web::default_profiles()))?)?;
    sw.register("unraveling-thread", Timeline::boxed(UnravelingThread::new())?)?;
    Ok(sw)
}

reel_web::export_shows!(catalogue, "reel-shows");

#[cfg(test)]
mod tests {
    use super::*;
    use reel_engine::{ShowContext, ShowId};

    #[test]
    fn catalogue_registers_every_show() {
        let sw = catalogue().unwrap();
        assert_eq!(sw.len(), 10);
        assert_eq!(sw.ids().next(), Some("cube-swarm"));
    }

    #[test]
    fn switching_through_catalogue_never_overlaps() {
        let mut sw = catalogue().unwrap();
        let mut ctx = ShowContext::default();
        let ids: Vec<String> = sw.ids().map(str::to_string).collect();
        for (i, id) in ids.iter().enumerate() {
            sw.activate(&mut ctx, id).unwrap();
            for _ in 0..90 {
                sw.update(&mut ctx, 1.0 / 30.0);
            }
            let owner = ShowId(i as u32 + 1);
            assert_eq!(ctx.scene.len(), ctx.scene.count_owned_by(owner), "leftovers while {} runs", id);
        }
        sw.deactivate(&mut ctx);
        assert!(ctx.scene.is_empty());
        assert!(ctx.camera.is_home());
    }
}
