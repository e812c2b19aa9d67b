//! Fluent builder for constructing a [`Sim`].

use pilot_behavior::{OrbitalConfig, OrbitalPilot, Pilot, SurfaceConfig, SurfacePilot};
use pilot_core::{LoopConfig, VesselId};

use crate::sim::VesselSlot;
use crate::{Sim, SimError, SimResult, WorldView};

enum PilotSpec {
    Orbital(OrbitalConfig),
    Surface(SurfaceConfig),
    Custom(Box<dyn Pilot>),
}

/// Fluent builder for [`Sim<W>`].
///
/// # Required inputs
///
/// - [`LoopConfig`]: step length, total ticks, seed, report interval
/// - `W: WorldView`: supplies per-vessel inputs and absorbs commands
///
/// # Vessels
///
/// | Method                | Pilot                                            |
/// |-----------------------|--------------------------------------------------|
/// | `.orbital(id, cfg)`   | `OrbitalPilot` seeded from `config.seed`         |
/// | `.surface(id, cfg)`   | `SurfacePilot` with the default pathfinder       |
/// | `.pilot(id, boxed)`   | Any `Pilot`, e.g. a surface pilot with a custom pathfinder |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(LoopConfig::default(), world)
///     .orbital(VesselId(0), OrbitalConfig::default())
///     .surface(VesselId(1), SurfaceConfig::default())
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: WorldView> {
    config:  LoopConfig,
    world:   W,
    vessels: Vec<(VesselId, PilotSpec)>,
}

impl<W: WorldView> SimBuilder<W> {
    pub fn new(config: LoopConfig, world: W) -> Self {
        Self { config, world, vessels: Vec::new() }
    }

    pub fn orbital(mut self, vessel: VesselId, cfg: OrbitalConfig) -> Self {
        self.vessels.push((vessel, PilotSpec::Orbital(cfg)));
        self
    }

    pub fn surface(mut self, vessel: VesselId, cfg: SurfaceConfig) -> Self {
        self.vessels.push((vessel, PilotSpec::Surface(cfg)));
        self
    }

    /// Register an already-constructed pilot.
    pub fn pilot(mut self, vessel: VesselId, pilot: Box<dyn Pilot>) -> Self {
        self.vessels.push((vessel, PilotSpec::Custom(pilot)));
        self
    }

    /// Validate the loop config, construct pilots, and return a ready-to-run
    /// [`Sim`] whose vessels are ordered by ascending id.
    pub fn build(mut self) -> SimResult<Sim<W>> {
        self.config.validate()?;
        if let Some((id, _)) = self.vessels.iter().find(|(id, _)| !id.is_valid()) {
            return Err(SimError::Config(format!("{id} is the invalid sentinel")));
        }

        self.vessels.sort_by_key(|(id, _)| *id);
        if let Some(pair) = self.vessels.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SimError::DuplicateVessel(pair[0].0));
        }

        let seed = self.config.seed;
        let mut slots = Vec::with_capacity(self.vessels.len());
        for (id, spec) in self.vessels {
            let pilot: Box<dyn Pilot> = match spec {
                PilotSpec::Orbital(cfg) => Box::new(OrbitalPilot::new(cfg, seed, id)?),
                PilotSpec::Surface(cfg) => Box::new(SurfacePilot::new(cfg, seed, id)?),
                PilotSpec::Custom(p)    => p,
            };
            slots.push(VesselSlot::new(id, pilot));
        }

        Ok(Sim {
            clock:   self.config.make_clock(),
            config:  self.config,
            world:   self.world,
            vessels: slots,
        })
    }
}
