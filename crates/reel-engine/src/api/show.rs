use crate::api::context::ShowContext;
use crate::api::frame::{Cast, Frame};
use crate::api::types::ShowId;
use crate::assets::loader::AssetEvent;
use crate::core::schedule::StageSchedule;
use crate::error::Result;

/// Lifecycle every switchable show exposes to the host.
pub trait Show {
    fn name(&self) -> &str;

    /// Assign the id used to tag owned entities and asset requests.
    /// Called once by the switcher on registration.
    fn bind(&mut self, owner: ShowId);

    fn owner(&self) -> ShowId;

    /// Build the scene and enter the initial state. A second call while
    /// active does nothing.
    fn init(&mut self, ctx: &mut ShowContext);

    /// Advance by `dt` seconds and apply the current stage.
    fn update(&mut self, ctx: &mut ShowContext, dt: f32);

    /// Remove everything the show created. Safe to call repeatedly.
    fn dispose(&mut self, ctx: &mut ShowContext);

    /// Deliver a completed load. Ignored unless it belongs to the live run.
    fn on_asset(&mut self, ctx: &mut ShowContext, event: AssetEvent);

    fn is_active(&self) -> bool;
}

/// Per-stage callback. Receives the stage's local progress in [0, 1].
pub type StageHandler<C> = fn(&mut C, &mut Frame<'_>, f32);

/// The authored part of a show: what to build and how each stage moves it.
///
/// Wrap an implementation in [`Timeline`](crate::api::timeline::Timeline) to
/// get a [`Show`].
pub trait Choreography: Sized + 'static {
    /// Handler `i` drives stage `i + 1` of the schedule.
    const STAGES: &'static [StageHandler<Self>] = &[];

    /// Handler for 1-based `stage`. Shows whose stage count depends on
    /// their data override this instead of listing `STAGES`.
    fn handler(&self, stage: usize) -> Option<StageHandler<Self>> {
        stage.checked_sub(1).and_then(|i| Self::STAGES.get(i)).copied()
    }

    fn name(&self) -> &str;

    fn schedule(&self) -> Result<StageSchedule>;

    /// Spawn entities and request assets. Runs on every `init`.
    fn build(&mut self, cast: &mut Cast<'_>);

    /// Put every entity in its initial pose. Runs after `build` and at the
    /// start of every loop.
    fn reset(&mut self, frame: &mut Frame<'_>);

    /// Effects applied every tick regardless of stage.
    fn continuous(&mut self, _frame: &mut Frame<'_>) {}

    fn asset_ready(&mut self, _cast: &mut Cast<'_>, _event: &AssetEvent) {}

    /// Drop show-local state that referenced removed entities.
    fn teardown(&mut self) {}
}
