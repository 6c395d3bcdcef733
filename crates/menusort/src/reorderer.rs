#![forbid(unsafe_code)]

//! One list's worth of drag-to-reorder wiring.

use menusort_core::{ContainerId, EntityId, OrderedEntity, ReorderConfig};
use menusort_drag::{
    DragEffect, DragInput, DragSessionController, DragTransition, NudgeDirection, RegionTable,
    SessionGate, nudge,
};
use menusort_sync::{
    DispatchStep, EntityStore, MutationDispatcher, MutationResponse, Settlement,
};

use crate::{Error, Result};

/// Owns the region table, a drag controller, and a dispatcher for one
/// reorderable surface (e.g. the category list or one category's items).
///
/// The UI layer registers regions after each layout pass, forwards pointer
/// input to [`handle`](Self::handle), and performs the returned requests.
#[derive(Debug)]
pub struct MenuReorderer {
    regions: RegionTable,
    session: DragSessionController,
    dispatcher: MutationDispatcher,
}

impl Default for MenuReorderer {
    fn default() -> Self {
        Self::new(ReorderConfig::default())
    }
}

impl MenuReorderer {
    /// Reorderer on the process-wide session gate: while any surface built
    /// this way is dragging, pointer-downs on the others are ignored.
    #[must_use]
    pub fn new(config: ReorderConfig) -> Self {
        Self::with_gate(config, SessionGate::global())
    }

    /// Reorderer with a private session gate, independent of every other
    /// surface.
    #[must_use]
    pub fn isolated(config: ReorderConfig) -> Self {
        Self::with_gate(config, SessionGate::new())
    }

    /// Reorderer sharing `gate` with other surfaces, so at most one of them
    /// runs a drag at a time.
    #[must_use]
    pub fn with_gate(config: ReorderConfig, gate: SessionGate) -> Self {
        Self {
            regions: RegionTable::new(),
            session: DragSessionController::with_gate(&config, gate),
            dispatcher: MutationDispatcher::new(config),
        }
    }

    /// Like [`new`](Self::new), rejecting out-of-range configuration.
    pub fn try_new(config: ReorderConfig) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(Error::InvalidConfig(problems));
        }
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Regions to re-register after a layout pass. Changes do not affect a
    /// gesture already in progress.
    pub fn regions_mut(&mut self) -> &mut RegionTable {
        &mut self.regions
    }

    #[must_use]
    pub fn session(&self) -> &DragSessionController {
        &self.session
    }

    #[must_use]
    pub fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut MutationDispatcher {
        &mut self.dispatcher
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        self.session.gate()
    }

    /// Seed the cache with the authoritative siblings of `container`.
    pub fn load(
        &mut self,
        container: ContainerId,
        entities: impl IntoIterator<Item = OrderedEntity>,
    ) {
        self.dispatcher.load(container, entities);
    }

    /// Refetch `container` from `store`.
    pub fn refresh<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        container: ContainerId,
    ) -> Result<()> {
        self.dispatcher.refresh(store, container).map_err(Error::from)
    }

    /// Create an entity at the end of `parent`.
    pub fn create<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        parent: ContainerId,
    ) -> Result<OrderedEntity> {
        Ok(self.dispatcher.create_entity(store, parent)?)
    }

    /// Feed one input; returns the controller's transition and, when the
    /// gesture ended in a drop, the dispatcher's first step.
    pub fn handle_input(&mut self, input: DragInput) -> (DragTransition, Option<DispatchStep>) {
        let transition = self.session.apply(input, &self.regions);
        let step = match transition.effect {
            DragEffect::Dropped(intent) => Some(self.dispatcher.dispatch(intent)),
            DragEffect::Cancelled { entity, reason } => {
                tracing::debug!(
                    target: "menusort.drag",
                    entity = entity.0,
                    ?reason,
                    "gesture cancelled without mutation"
                );
                None
            }
            _ => None,
        };
        (transition, step)
    }

    /// Feed one input; `Some` only when a drop was dispatched.
    pub fn handle(&mut self, input: DragInput) -> Option<DispatchStep> {
        self.handle_input(input).1
    }

    /// Fold a store response into its dispatch.
    pub fn complete(&mut self, response: MutationResponse) -> DispatchStep {
        self.dispatcher.complete(response)
    }

    /// Keyboard move of `entity` within its container. `None` at the
    /// boundary, for unknown entities, or while a pointer drag is active.
    pub fn nudge(&mut self, entity: EntityId, direction: NudgeDirection) -> Option<DispatchStep> {
        if self.session.is_active() {
            return None;
        }
        let container = self.dispatcher.cache().find(entity)?.parent_id;
        let intent = nudge(self.dispatcher.view(container)?, entity, direction)?;
        Some(self.dispatcher.dispatch(intent))
    }

    /// Feed one input and, on a drop, drive the dispatch to settlement
    /// against `store` on the calling thread.
    pub fn handle_blocking<S: EntityStore + Sync + ?Sized>(
        &mut self,
        store: &S,
        input: DragInput,
    ) -> Option<Settlement> {
        let transition = self.session.apply(input, &self.regions);
        let intent = transition.intent()?;
        Some(self.dispatcher.run(store, intent))
    }

    /// Abort any active gesture (e.g. the surface is being torn down).
    pub fn cancel(&mut self) -> Option<DragTransition> {
        self.session.force_cancel()
    }
}
