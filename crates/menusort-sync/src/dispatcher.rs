#![forbid(unsafe_code)]

//! Drop intent → position mutations.
//!
//! [`MutationDispatcher`] is event-driven: [`dispatch`](MutationDispatcher::dispatch)
//! applies the new order to the cache optimistically and returns the
//! requests to issue; the host performs them (on any thread, in any order)
//! and feeds each [`MutationResponse`] to
//! [`complete`](MutationDispatcher::complete). Several dispatches may be in
//! flight at once, each identified by its [`DispatchTicket`].
//!
//! # Plans
//!
//! | Drop | Requests |
//! |------|----------|
//! | same slot | none, settles immediately |
//! | insertion | one `{position}` |
//! | swap | two `{position}` in one batch |
//! | other container | one `{parentId, position}` |
//! | no integer gap | renumber batch, then the insertion |
//!
//! # Reconciliation
//!
//! Success applies the authoritative entities and marks the affected
//! containers stale. A failed single update reverts to the snapshot taken at
//! dispatch. A half-failed swap or a failed renumber batch cannot be undone
//! locally, so the affected containers are flagged for refetch.

use std::collections::VecDeque;

use ahash::AHashMap;
use menusort_core::allocator::{Allocation, allocate, allocate_move, renumber};
use menusort_core::{ContainerId, EntityId, EntityPatch, OrderedEntity, OrderedView, ReorderConfig};
use menusort_drag::{DropIntent, DropKind};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheSnapshot, OrderedCache};
use crate::error::{ReorderError, StoreError};
use crate::executor::execute_concurrent;
use crate::store::EntityStore;

// ---------------------------------------------------------------------------
// Public message types
// ---------------------------------------------------------------------------

/// Identifies one dispatched intent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DispatchTicket(pub u64);

/// Identifies one request within the dispatcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestId(pub u64);

/// A partial update the host must perform with `update_entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub ticket: DispatchTicket,
    pub id: RequestId,
    pub entity: EntityId,
    pub patch: EntityPatch,
}

impl MutationRequest {
    /// Wrap the store's answer to this request.
    #[must_use]
    pub fn respond(&self, result: Result<OrderedEntity, StoreError>) -> MutationResponse {
        MutationResponse {
            ticket: self.ticket,
            request: self.id,
            entity: self.entity,
            result,
        }
    }
}

/// The store's answer to one [`MutationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResponse {
    pub ticket: DispatchTicket,
    pub request: RequestId,
    pub entity: EntityId,
    pub result: Result<OrderedEntity, StoreError>,
}

/// How the caller should bring the UI back in line after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconcile {
    /// The cache is back at the last confirmed state; nothing to fetch.
    Reverted,
    /// Server state is unknown; refetch these containers with `list_siblings`.
    Refetch(Vec<ContainerId>),
}

/// Final outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Applied {
        ticket: DispatchTicket,
        /// Number of update requests issued; zero for a no-op drop.
        mutations: usize,
        /// Whether a renumbering pass was part of the move.
        renumbered: bool,
        /// Containers whose cached order should be refreshed from the store.
        invalidated: Vec<ContainerId>,
    },
    Failed {
        ticket: DispatchTicket,
        error: ReorderError,
        reconcile: Reconcile,
    },
}

impl Settlement {
    #[must_use]
    pub const fn ticket(&self) -> DispatchTicket {
        match self {
            Self::Applied { ticket, .. } | Self::Failed { ticket, .. } => *ticket,
        }
    }

    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ReorderError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Applied { .. } => None,
        }
    }
}

/// What the host should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStep {
    /// Perform these requests; they are independent and may run concurrently.
    Issue(Vec<MutationRequest>),
    /// Other requests of the same batch are still outstanding.
    Waiting,
    Settled(Settlement),
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanKind {
    Insert,
    Relocate,
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageKind {
    Renumber(ContainerId),
    Final,
}

#[derive(Debug, Clone)]
struct Stage {
    kind: StageKind,
    writes: Vec<(EntityId, EntityPatch)>,
}

#[derive(Debug)]
struct Plan {
    kind: PlanKind,
    stages: Vec<Stage>,
    optimistic: Vec<OrderedEntity>,
    affected: Vec<ContainerId>,
}

#[derive(Debug)]
enum Planned {
    Unchanged,
    Mutate(Plan),
}

#[derive(Debug)]
struct PendingDispatch {
    kind: PlanKind,
    affected: Vec<ContainerId>,
    snapshot: CacheSnapshot,
    stages: VecDeque<Stage>,
    current: StageKind,
    outstanding: Vec<RequestId>,
    confirmed: Vec<OrderedEntity>,
    failures: Vec<(EntityId, StoreError)>,
    issued: usize,
    renumbered: bool,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Plans, tracks, and reconciles reorder mutations.
#[derive(Debug)]
pub struct MutationDispatcher {
    config: ReorderConfig,
    cache: OrderedCache,
    pending: AHashMap<DispatchTicket, PendingDispatch>,
    next_ticket: u64,
    next_request: u64,
}

impl Default for MutationDispatcher {
    fn default() -> Self {
        Self::new(ReorderConfig::default())
    }
}

impl MutationDispatcher {
    #[must_use]
    pub fn new(config: ReorderConfig) -> Self {
        Self {
            config,
            cache: OrderedCache::new(),
            pending: AHashMap::new(),
            next_ticket: 0,
            next_request: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &OrderedCache {
        &self.cache
    }

    /// Current (possibly optimistic) display order of `container`.
    #[must_use]
    pub fn view(&self, container: ContainerId) -> Option<&OrderedView> {
        self.cache.view(container)
    }

    /// Number of dispatches awaiting responses.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Seed the cache with authoritative siblings of `container`.
    pub fn load(&mut self, container: ContainerId, entities: impl IntoIterator<Item = OrderedEntity>) {
        self.cache.load(container, entities);
    }

    /// Refetch `container` from the store.
    pub fn refresh<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        container: ContainerId,
    ) -> Result<(), StoreError> {
        let siblings = store.list_siblings(container)?;
        self.cache.load(container, siblings);
        Ok(())
    }

    /// Refetch every stale container, returning the ones refreshed.
    pub fn refresh_stale<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<Vec<ContainerId>, StoreError> {
        let stale = self.cache.stale_containers();
        for &container in &stale {
            self.refresh(store, container)?;
        }
        Ok(stale)
    }

    /// Create an entity at the end of `parent` and add it to the cache.
    pub fn create_entity<S: EntityStore + ?Sized>(
        &mut self,
        store: &S,
        parent: ContainerId,
    ) -> Result<OrderedEntity, StoreError> {
        let entity = store.create_entity(parent)?;
        self.cache.apply_entity(entity);
        tracing::debug!(
            target: "menusort.sync",
            entity = entity.id.0,
            parent = parent.0,
            position = entity.position,
            "entity created"
        );
        Ok(entity)
    }

    /// Plan `intent`, update the cache optimistically, and return the first
    /// batch of requests (or the settlement if nothing needs persisting).
    pub fn dispatch(&mut self, intent: DropIntent) -> DispatchStep {
        self.next_ticket += 1;
        let ticket = DispatchTicket(self.next_ticket);
        let _span = tracing::debug_span!(
            "menusort.dispatch",
            ticket = ticket.0,
            entity = intent.entity.0,
            target = intent.target.0,
            index = intent.index,
        )
        .entered();

        let plan = match self.plan(&intent) {
            Ok(Planned::Unchanged) => {
                tracing::debug!(target: "menusort.sync", ticket = ticket.0, "no-op drop skipped");
                return DispatchStep::Settled(Settlement::Applied {
                    ticket,
                    mutations: 0,
                    renumbered: false,
                    invalidated: Vec::new(),
                });
            }
            Ok(Planned::Mutate(plan)) => plan,
            Err(error) => {
                tracing::warn!(target: "menusort.sync", ticket = ticket.0, %error, "drop rejected");
                let mut containers = vec![intent.source];
                if intent.target != intent.source {
                    containers.push(intent.target);
                }
                return DispatchStep::Settled(Settlement::Failed {
                    ticket,
                    error,
                    reconcile: Reconcile::Refetch(containers),
                });
            }
        };

        let snapshot = self.cache.snapshot(&plan.affected);
        for entity in &plan.optimistic {
            self.cache.apply_entity(*entity);
        }

        let mut stages: VecDeque<Stage> = plan.stages.into();
        let Some(first) = stages.pop_front() else {
            return DispatchStep::Settled(Settlement::Applied {
                ticket,
                mutations: 0,
                renumbered: false,
                invalidated: Vec::new(),
            });
        };
        if matches!(first.kind, StageKind::Renumber(_)) {
            tracing::warn!(
                target: "menusort.sync",
                ticket = ticket.0,
                writes = first.writes.len(),
                "position gap exhausted; renumbering container"
            );
        }

        let requests = issue_stage(ticket, &first, &mut self.next_request);
        tracing::debug!(
            target: "menusort.sync",
            ticket = ticket.0,
            kind = ?plan.kind,
            requests = requests.len(),
            "dispatch planned"
        );
        self.pending.insert(
            ticket,
            PendingDispatch {
                kind: plan.kind,
                affected: plan.affected,
                snapshot,
                stages,
                current: first.kind,
                outstanding: requests.iter().map(|r| r.id).collect(),
                confirmed: Vec::new(),
                failures: Vec::new(),
                issued: requests.len(),
                renumbered: false,
            },
        );
        DispatchStep::Issue(requests)
    }

    /// Fold one response into its dispatch.
    pub fn complete(&mut self, response: MutationResponse) -> DispatchStep {
        let ticket = response.ticket;
        {
            let Some(pending) = self.pending.get_mut(&ticket) else {
                tracing::warn!(target: "menusort.sync", ticket = ticket.0, "response for unknown dispatch");
                return DispatchStep::Waiting;
            };
            let Some(slot) = pending.outstanding.iter().position(|id| *id == response.request) else {
                tracing::warn!(
                    target: "menusort.sync",
                    ticket = ticket.0,
                    request = response.request.0,
                    "unexpected or duplicate response"
                );
                return DispatchStep::Waiting;
            };
            pending.outstanding.swap_remove(slot);
            match response.result {
                Ok(entity) => pending.confirmed.push(entity),
                Err(error) => pending.failures.push((response.entity, error)),
            }
            if !pending.outstanding.is_empty() {
                return DispatchStep::Waiting;
            }

            if pending.failures.is_empty() {
                if matches!(pending.current, StageKind::Renumber(_)) {
                    pending.renumbered = true;
                }
                if let Some(next) = pending.stages.pop_front() {
                    let requests = issue_stage(ticket, &next, &mut self.next_request);
                    pending.current = next.kind;
                    pending.outstanding = requests.iter().map(|r| r.id).collect();
                    pending.issued += requests.len();
                    return DispatchStep::Issue(requests);
                }
            }
        }

        match self.pending.remove(&ticket) {
            Some(pending) => DispatchStep::Settled(self.settle(ticket, pending)),
            None => DispatchStep::Waiting,
        }
    }

    /// Give up on an in-flight dispatch (e.g. after a host-side timeout).
    ///
    /// The optimistic state is reverted and the affected containers are
    /// flagged for refetch, since requests may still land server-side.
    pub fn abandon(&mut self, ticket: DispatchTicket) -> Option<Settlement> {
        let pending = self.pending.remove(&ticket)?;
        self.cache.restore(&pending.snapshot);
        for &container in &pending.affected {
            self.cache.invalidate(container);
        }
        tracing::warn!(target: "menusort.sync", ticket = ticket.0, "dispatch abandoned");
        Some(Settlement::Failed {
            ticket,
            error: ReorderError::Stalled,
            reconcile: Reconcile::Refetch(pending.affected),
        })
    }

    /// Drive `intent` to settlement against `store`, issuing each batch
    /// concurrently. Blocks the calling thread.
    pub fn run<S: EntityStore + Sync + ?Sized>(
        &mut self,
        store: &S,
        intent: DropIntent,
    ) -> Settlement {
        let mut step = self.dispatch(intent);
        let ticket = DispatchTicket(self.next_ticket);
        loop {
            match step {
                DispatchStep::Settled(settlement) => return settlement,
                DispatchStep::Waiting => {
                    return self.abandon(ticket).unwrap_or(Settlement::Failed {
                        ticket,
                        error: ReorderError::Stalled,
                        reconcile: Reconcile::Refetch(Vec::new()),
                    });
                }
                DispatchStep::Issue(requests) => {
                    step = DispatchStep::Waiting;
                    for response in execute_concurrent(store, &requests) {
                        step = self.complete(response);
                    }
                }
            }
        }
    }

    fn settle(&mut self, ticket: DispatchTicket, pending: PendingDispatch) -> Settlement {
        let PendingDispatch {
            kind,
            affected,
            snapshot,
            current,
            confirmed,
            failures,
            issued,
            renumbered,
            ..
        } = pending;

        let Some((failed, source)) = failures.into_iter().next() else {
            for entity in confirmed {
                self.cache.apply_entity(entity);
            }
            for &container in &affected {
                self.cache.invalidate(container);
            }
            tracing::debug!(
                target: "menusort.sync",
                ticket = ticket.0,
                mutations = issued,
                renumbered,
                "dispatch applied"
            );
            return Settlement::Applied {
                ticket,
                mutations: issued,
                renumbered,
                invalidated: affected,
            };
        };

        let (error, reconcile) = match (current, kind) {
            (StageKind::Renumber(container), _) => {
                self.cache.restore(&snapshot);
                self.invalidate_all(&affected);
                (
                    ReorderError::AllocationCollision { container, source },
                    Reconcile::Refetch(affected),
                )
            }
            (StageKind::Final, PlanKind::Swap) if !confirmed.is_empty() => {
                for entity in confirmed {
                    self.cache.apply_entity(entity);
                }
                self.invalidate_all(&affected);
                (
                    ReorderError::PartialSwapFailure { failed, source },
                    Reconcile::Refetch(affected),
                )
            }
            (StageKind::Final, _) => {
                self.cache.restore(&snapshot);
                let error = ReorderError::MutationFailure {
                    entity: failed,
                    source,
                };
                if renumbered {
                    // The renumbered positions did persist.
                    self.invalidate_all(&affected);
                    (error, Reconcile::Refetch(affected))
                } else {
                    (error, Reconcile::Reverted)
                }
            }
        };

        tracing::warn!(
            target: "menusort.sync",
            ticket = ticket.0,
            %error,
            "dispatch failed"
        );
        Settlement::Failed {
            ticket,
            error,
            reconcile,
        }
    }

    fn invalidate_all(&mut self, containers: &[ContainerId]) {
        for &container in containers {
            self.cache.invalidate(container);
        }
    }

    fn plan(&self, intent: &DropIntent) -> Result<Planned, ReorderError> {
        let moving = self
            .cache
            .find(intent.entity)
            .ok_or(ReorderError::UnknownEntity(intent.entity))?;
        let target_view = self
            .cache
            .view(intent.target)
            .ok_or(ReorderError::ContainerNotLoaded(intent.target))?;

        if let DropKind::Swap { with } = intent.kind
            && moving.parent_id == intent.target
            && let Some(partner) = target_view.get(with).copied()
            && partner.position != moving.position
        {
            return Ok(Planned::Mutate(Plan {
                kind: PlanKind::Swap,
                stages: vec![Stage {
                    kind: StageKind::Final,
                    writes: vec![
                        (moving.id, EntityPatch::position(partner.position)),
                        (partner.id, EntityPatch::position(moving.position)),
                    ],
                }],
                optimistic: vec![
                    OrderedEntity {
                        position: partner.position,
                        ..moving
                    },
                    OrderedEntity {
                        position: moving.position,
                        ..partner
                    },
                ],
                affected: vec![intent.target],
            }));
        }

        self.plan_insert(moving, intent.target, target_view, intent.index)
    }

    fn plan_insert(
        &self,
        moving: OrderedEntity,
        target: ContainerId,
        view: &OrderedView,
        index: usize,
    ) -> Result<Planned, ReorderError> {
        let same_container = moving.parent_id == target;
        let siblings = view.without(moving.id);
        let index = index.min(siblings.len());
        let current = if same_container {
            view.slot_of(moving.id)
        } else {
            None
        };
        let (kind, affected) = if same_container {
            (PlanKind::Insert, vec![target])
        } else {
            (PlanKind::Relocate, vec![moving.parent_id, target])
        };
        let patch_for = |position| {
            if same_container {
                EntityPatch::position(position)
            } else {
                EntityPatch::relocate(target, position)
            }
        };
        let baseline = self.config.baseline;

        match allocate_move(&siblings.positions(), index, current, baseline) {
            Allocation::Unchanged => Ok(Planned::Unchanged),
            Allocation::At(position) => {
                let patch = patch_for(position);
                Ok(Planned::Mutate(Plan {
                    kind,
                    stages: vec![Stage {
                        kind: StageKind::Final,
                        writes: vec![(moving.id, patch)],
                    }],
                    optimistic: vec![patch.apply(moving)],
                    affected,
                }))
            }
            Allocation::Exhausted => {
                // Renumber in the current display order; in the source
                // container that includes the moving entity itself.
                let order = if same_container {
                    view.ids()
                } else {
                    siblings.ids()
                };
                let renumbered: Vec<OrderedEntity> =
                    renumber(order, self.config.renumber_stride, baseline)
                        .into_iter()
                        .filter(|(id, _)| *id != moving.id)
                        .filter_map(|(id, position)| {
                            siblings
                                .get(id)
                                .map(|e| OrderedEntity { position, ..*e })
                        })
                        .collect();
                let fresh = OrderedView::new(renumbered.iter().copied());

                let Allocation::At(position) = allocate(&fresh.positions(), index, baseline) else {
                    return Err(ReorderError::AllocationCollision {
                        container: target,
                        source: StoreError::Validation(
                            "no headroom after renumbering".into(),
                        ),
                    });
                };

                let writes: Vec<(EntityId, EntityPatch)> = renumbered
                    .iter()
                    .filter(|e| siblings.get(e.id).is_some_and(|old| old.position != e.position))
                    .map(|e| (e.id, EntityPatch::position(e.position)))
                    .collect();
                let patch = patch_for(position);

                let mut stages = Vec::with_capacity(2);
                if !writes.is_empty() {
                    stages.push(Stage {
                        kind: StageKind::Renumber(target),
                        writes,
                    });
                }
                stages.push(Stage {
                    kind: StageKind::Final,
                    writes: vec![(moving.id, patch)],
                });

                let mut optimistic = renumbered;
                optimistic.push(patch.apply(moving));
                Ok(Planned::Mutate(Plan {
                    kind,
                    stages,
                    optimistic,
                    affected,
                }))
            }
        }
    }
}

fn issue_stage(ticket: DispatchTicket, stage: &Stage, next_request: &mut u64) -> Vec<MutationRequest> {
    stage
        .writes
        .iter()
        .map(|&(entity, patch)| {
            *next_request += 1;
            MutationRequest {
                ticket,
                id: RequestId(*next_request),
                entity,
                patch,
            }
        })
        .collect()
}
