//! Scenario orchestration.
//!
//! Runs the eight phases strictly in order against one [`ScenarioContext`].
//! A phase always runs to completion before the next starts, and no failure
//! inside a phase aborts the run: every phase executes and a report can
//! always be produced from the observer log.

use std::time::{Duration, Instant};
use tracing::info;

use crate::api::HotelApi;
use crate::cities::CityDataset;
use crate::entities::Role;
use crate::fake_data::FakerProvider;
use crate::metrics::PHASE_DURATION_SECONDS;
use crate::registry::RegistrySummary;
use crate::scenario::{Phase, ScenarioContext, ScenarioPlan};
use crate::selection::SeededSelection;
use crate::synth::PayloadSynthesizer;
use crate::workflows::booking::BookingOutcome;
use crate::workflows::cancellation::CancellationOutcome;
use crate::workflows::{accounts, booking, cancellation, hotel_setup, review, search};

/// Result of a single phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseResult {
    pub phase: Phase,

    /// API calls issued during the phase
    pub calls: usize,

    /// Units of work that succeeded (actors ready, hotels created, bookings...)
    pub completed: usize,

    pub duration: Duration,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub seed: u64,
    pub phases: Vec<PhaseResult>,
    pub total_calls: usize,
    pub registry: RegistrySummary,
    pub duration: Duration,
}

impl ScenarioResult {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseResult> {
        self.phases.iter().find(|result| result.phase == phase)
    }
}

/// Build a run context whose selection and payload randomness all derive
/// from `seed`.
pub fn seeded_context(api: HotelApi, seed: u64, cities: CityDataset) -> ScenarioContext {
    let synth = PayloadSynthesizer::new(
        Box::new(FakerProvider::new(seed.wrapping_add(1))),
        seed.wrapping_add(2),
        cities,
    );
    ScenarioContext::new(api, Box::new(SeededSelection::new(seed)), synth)
}

pub struct ScenarioOrchestrator {
    plan: ScenarioPlan,
    seed: u64,
}

impl ScenarioOrchestrator {
    pub fn new(plan: ScenarioPlan, seed: u64) -> Self {
        Self { plan, seed }
    }

    /// A fresh, empty context for one run.
    pub fn context(&self, api: HotelApi, cities: CityDataset) -> ScenarioContext {
        seeded_context(api, self.seed, cities)
    }

    /// Execute all phases in order.
    pub async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult {
        let run_start = Instant::now();
        info!(
            seed = self.seed,
            guests = self.plan.guests,
            owners = self.plan.owners,
            hotels_per_owner = %self.plan.hotels_per_owner,
            room_types_per_hotel = %self.plan.room_types_per_hotel,
            base_url = %ctx.api.base_url(),
            "Starting scenario"
        );

        let calls_at_start = ctx.api.calls();
        let mut phases = Vec::with_capacity(Phase::all().len());

        for phase in Phase::all() {
            let calls_before = ctx.api.calls();
            let phase_start = Instant::now();

            let completed = self.run_phase(phase, ctx).await;

            let duration = phase_start.elapsed();
            let calls = ctx.api.calls() - calls_before;
            PHASE_DURATION_SECONDS
                .with_label_values(&[phase.label()])
                .observe(duration.as_secs_f64());

            info!(
                phase = %phase,
                calls,
                completed,
                duration_ms = duration.as_millis() as u64,
                "Phase complete"
            );

            phases.push(PhaseResult {
                phase,
                calls,
                completed,
                duration,
            });
        }

        let registry = ctx.registry.summary();
        let total_calls = ctx.api.calls() - calls_at_start;
        let duration = run_start.elapsed();

        info!(
            total_calls,
            guests = registry.guests,
            owners = registry.owners,
            hotels = registry.hotels,
            room_types = registry.room_types,
            reservations = registry.reservations,
            cancelled = registry.cancelled,
            duration_ms = duration.as_millis() as u64,
            "Scenario completed"
        );

        ScenarioResult {
            seed: self.seed,
            phases,
            total_calls,
            registry,
            duration,
        }
    }

    async fn run_phase(&self, phase: Phase, ctx: &mut ScenarioContext) -> usize {
        match phase {
            Phase::RegisterGuests => {
                accounts::register_actors(ctx, Role::Guest, self.plan.guests).await
            }
            Phase::RegisterOwners => {
                accounts::register_actors(ctx, Role::Owner, self.plan.owners).await
            }
            Phase::CreateHotels => {
                hotel_setup::create_hotels(ctx, self.plan.hotels_per_owner).await
            }
            Phase::CreateRoomTypes => {
                hotel_setup::create_room_types(ctx, self.plan.room_types_per_hotel).await
            }
            Phase::Search => search::run_searches(ctx).await,
            Phase::Book => booking::book_for_guests(ctx)
                .await
                .iter()
                .filter(|outcome| matches!(outcome, BookingOutcome::Booked { .. }))
                .count(),
            Phase::Review => {
                let summary = review::review(ctx).await;
                summary.guest_reservation_lists
                    + summary.owner_hotel_lists
                    + summary.hotel_reservation_lists
                    + summary.room_type_lists
            }
            Phase::Cancel => match cancellation::cancel_one(ctx).await {
                CancellationOutcome::Cancelled { .. } => 1,
                _ => 0,
            },
        }
    }
}
