/*!
# netvakt Simulator

Event sources for driving a monitor without live capture.

## Key Components:
- **Synthetic Source:** Seeded generator of KDD-style traffic with attack injection.
- **Scripted Source:** Fixed, in-order event list for deterministic runs.
- **Replay Source:** Plays back a recorded scenario, optionally on a loop.
- **Scenarios:** YAML recordings sealed with a BLAKE3 checksum.
- **Chaos:** Optional fault injection on any source.
*/

use std::sync::Arc;

use netvakt_config::SimulatorConfig;
use netvakt_core::events::EventSource;
use netvakt_core::time::Clock;

pub mod chaos;
pub mod replay;
pub mod scenario;
pub mod scripted;
pub mod synthetic;

pub use chaos::{ChaosSource, FaultInjector};
pub use replay::ReplaySource;
pub use scenario::{Scenario, ScenarioError};
pub use scripted::ScriptedSource;
pub use synthetic::{InjectedAttack, SyntheticSource};

/// Builds the source described by `config`: a scenario replay when a
/// scenario path is set, otherwise synthetic traffic.
pub fn source_from_config(
    config: &SimulatorConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn EventSource>, ScenarioError> {
    let Some(path) = &config.scenario else {
        return Ok(Arc::new(SyntheticSource::from_config(config, clock)));
    };

    let scenario = Scenario::load(path)?;
    tracing::info!(
        path = %path.display(),
        events = scenario.events.len(),
        checksum = %scenario.checksum,
        "Loaded scenario"
    );
    let replay = ReplaySource::new(scenario, clock).looping(config.loop_replay);
    let fault_probability = config.chaos.fault_probability;
    if fault_probability > 0.0 {
        Ok(Arc::new(ChaosSource::new(replay, fault_probability, config.seed)))
    } else {
        Ok(Arc::new(replay))
    }
}
