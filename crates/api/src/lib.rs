//! HTTP API server with observability for the car-rental saga.
//!
//! Provides REST endpoints for reservations and rentals, with structured
//! logging (tracing) and Prometheus metrics. The saga's two sides run as
//! background workers over in-memory channels in the single-process
//! deployment; [`create_default_state`] wires them up.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::{Invoice, InvoiceProcessingStatus};
use messaging::{
    INVOICE_STATUS_CHANNEL, INVOICES_CHANNEL, InMemoryConsumer, in_memory_channel,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rental::{BillingProcessor, InMemoryRentalStore, RentalService};
use reservation::{
    Car, InMemoryInventoryClient, InMemoryReservationStore, ReservationService, ReservationStore,
    SettlementProcessor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::reservations::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ReservationStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/reservation", post(routes::reservations::create::<S>))
        .route(
            "/reservation/availability",
            get(routes::reservations::availability::<S>),
        )
        .route("/reservation/all", get(routes::reservations::list::<S>))
        .route("/reservation/{id}", put(routes::reservations::extend::<S>))
        .route(
            "/reservation/{id}",
            delete(routes::reservations::cancel::<S>),
        )
        .route("/rental/active", get(routes::rentals::active::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Background saga workers for the single-process deployment.
///
/// The billing processor consumes invoices and publishes statuses; the
/// settlement processor consumes statuses and applies them. Both run
/// until their channel closes.
pub struct SagaWorkers {
    pub billing: BillingProcessor<
        InMemoryRentalStore,
        messaging::InMemoryPublisher<InvoiceProcessingStatus>,
    >,
    pub invoices: InMemoryConsumer<Invoice>,
    pub settlement: SettlementProcessor<InMemoryReservationStore>,
    pub statuses: InMemoryConsumer<InvoiceProcessingStatus>,
}

impl SagaWorkers {
    /// Spawns both processing loops on the current runtime.
    pub fn spawn(self) {
        let SagaWorkers {
            billing,
            mut invoices,
            settlement,
            mut statuses,
        } = self;
        tokio::spawn(async move { billing.run(&mut invoices).await });
        tokio::spawn(async move { settlement.run(&mut statuses).await });
    }
}

/// Creates the default application state: in-memory stores, a demo
/// fleet, and both sides of the saga wired over in-memory channels of
/// the given capacity.
pub fn create_default_state(
    channel_capacity: usize,
) -> (Arc<AppState<InMemoryReservationStore>>, SagaWorkers) {
    let reservation_store = InMemoryReservationStore::new();
    let rental_store = InMemoryRentalStore::new();

    let inventory = InMemoryInventoryClient::with_cars(vec![
        Car::new(1, "ABC-123", "Toyota", "Corolla"),
        Car::new(2, "DEF-456", "Skoda", "Octavia"),
        Car::new(3, "GHI-789", "Volkswagen", "Golf"),
    ]);

    let (invoice_tx, invoice_rx) =
        in_memory_channel::<Invoice>(INVOICES_CHANNEL, channel_capacity);
    let (status_tx, status_rx) = in_memory_channel::<InvoiceProcessingStatus>(
        INVOICE_STATUS_CHANNEL,
        channel_capacity,
    );

    let state = Arc::new(AppState {
        reservations: ReservationService::new(reservation_store.clone(), inventory, invoice_tx),
        rentals: RentalService::new(rental_store.clone()),
    });

    let workers = SagaWorkers {
        billing: BillingProcessor::new(rental_store, status_tx),
        invoices: invoice_rx,
        settlement: SettlementProcessor::new(reservation_store),
        statuses: status_rx,
    };

    (state, workers)
}
