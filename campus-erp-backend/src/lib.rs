//! HTTP API over the campus ledgers, plus the connection loop that serves it.

pub mod error;
pub mod fixtures;
pub mod routes;
pub mod telemetry;

use core::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::handler::Handler;
use axum::routing::{on, MethodFilter};
use axum::Router;
use campus_erp_config::Config;
use campus_erp_database::{get_database_connection, PgStore};
use campus_erp_ledger::{
    AdmissionLedger, AnalyticsLedger, AttendanceLedger, CampusStore, ExamLedger, FeeLedger,
    HostelLedger, InMemoryStore,
};
use error::AppError;
use futures_util::{pin_mut, Future};
use http::Request;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tower::{Service as _, ServiceBuilder, ServiceExt as _};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::routes::{admissions, analytics, attendance, exams, fees, health, hostel};

#[derive(Clone)]
pub struct AppState<S> {
    hostel: HostelLedger<S>,
    attendance: AttendanceLedger<S>,
    admissions: AdmissionLedger<S>,
    fees: FeeLedger<S>,
    exams: ExamLedger<S>,
    analytics: AnalyticsLedger<S>,
}

impl<S: CampusStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            hostel: HostelLedger::new(store.clone()),
            attendance: AttendanceLedger::new(store.clone()),
            admissions: AdmissionLedger::new(store.clone()),
            fees: FeeLedger::new(store.clone()),
            exams: ExamLedger::new(store.clone()),
            analytics: AnalyticsLedger::new(store),
        }
    }
}

impl<S: Clone> FromRef<AppState<S>> for HostelLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.hostel.clone()
    }
}

impl<S: Clone> FromRef<AppState<S>> for AttendanceLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.attendance.clone()
    }
}

impl<S: Clone> FromRef<AppState<S>> for AdmissionLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.admissions.clone()
    }
}

impl<S: Clone> FromRef<AppState<S>> for FeeLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.fees.clone()
    }
}

impl<S: Clone> FromRef<AppState<S>> for ExamLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.exams.clone()
    }
}

impl<S: Clone> FromRef<AppState<S>> for AnalyticsLedger<S> {
    fn from_ref(state: &AppState<S>) -> Self {
        state.analytics.clone()
    }
}

struct CampusRouter<S> {
    router: Router<AppState<S>>,
}

impl<S: CampusStore> CampusRouter<S> {
    fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    #[track_caller]
    #[must_use]
    fn route<T: 'static, H: Handler<T, AppState<S>>>(
        self,
        method: MethodFilter,
        path: &'static str,
        handler: H,
    ) -> Self {
        Self {
            // routes registered twice for the same path are merged by method
            router: self.router.route(path, on(method, handler)),
        }
    }

    fn finish(self) -> Router<AppState<S>> {
        self.router
    }
}

pub fn router<S: CampusStore>(state: AppState<S>) -> Router {
    let app = CampusRouter::new()
        .route(MethodFilter::GET, "/health", health::health)
        .route(MethodFilter::GET, "/hostel/rooms", hostel::rooms::<S>)
        .route(
            MethodFilter::GET,
            "/hostel/rooms/available",
            hostel::available_rooms::<S>,
        )
        .route(
            MethodFilter::GET,
            "/hostel/students/unallocated",
            hostel::unallocated_students::<S>,
        )
        .route(MethodFilter::POST, "/hostel/allocations", hostel::allocate::<S>)
        .route(
            MethodFilter::POST,
            "/hostel/deallocations",
            hostel::deallocate::<S>,
        )
        .route(MethodFilter::GET, "/attendance", attendance::history::<S>)
        .route(
            MethodFilter::GET,
            "/attendance/classes",
            attendance::classes::<S>,
        )
        .route(
            MethodFilter::GET,
            "/attendance/:class_id/:date",
            attendance::attendance_for::<S>,
        )
        .route(
            MethodFilter::PUT,
            "/attendance/:class_id/:date",
            attendance::upsert::<S>,
        )
        .route(
            MethodFilter::GET,
            "/attendance/:class_id/:date/session",
            attendance::marking_session::<S>,
        )
        .route(
            MethodFilter::GET,
            "/attendance/:class_id/:date/summary",
            attendance::summary::<S>,
        )
        .route(MethodFilter::GET, "/admissions", admissions::list::<S>)
        .route(MethodFilter::POST, "/admissions", admissions::submit::<S>)
        .route(
            MethodFilter::POST,
            "/admissions/:id/approve",
            admissions::approve::<S>,
        )
        .route(
            MethodFilter::POST,
            "/admissions/:id/reject",
            admissions::reject::<S>,
        )
        .route(MethodFilter::GET, "/fees", fees::list::<S>)
        .route(MethodFilter::POST, "/fees", fees::record::<S>)
        .route(MethodFilter::GET, "/exams", exams::list::<S>)
        .route(MethodFilter::POST, "/exams", exams::upload::<S>)
        .route(MethodFilter::GET, "/analytics", analytics::summary::<S>)
        .finish();

    // layers are in reverse order
    app.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new()),
    )
}

/// Builds the application on Postgres when a database is configured, otherwise on the
/// in-memory demo data.
pub fn setup_server(config: &Config) -> Result<Router, AppError> {
    info!("starting up server...");

    if let Some(database_url) = &config.database_url {
        let pool = get_database_connection(database_url)?;
        Ok(router(AppState::new(PgStore::new(pool))))
    } else {
        warn!("no database_url configured, serving in-memory demo data");
        Ok(router(AppState::new(InMemoryStore::new(fixtures::demo()))))
    }
}

pub async fn run_server(
    config: &Config,
) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    let app = setup_server(config)?;
    let listener = TcpListener::bind(config.listen).await?;

    info!(listen = %listener.local_addr()?, "started up server...");

    Ok(serve(listener, app, shutdown_signal()))
}

// https://github.com/tokio-rs/axum/blob/main/examples/serve-with-hyper/src/main.rs

/// Accepts connections until `shutdown` completes, then waits for open connections to finish.
#[allow(clippy::cognitive_complexity)]
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError> {
    let mut make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    pin_mut!(shutdown);

    #[allow(clippy::redundant_pub_crate)]
    loop {
        select! {
            accept = listener.accept() => {
                let (socket, remote_addr) = match accept {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!("failed to accept connection: {err}");
                        continue;
                    }
                };

                // `IntoMakeServiceWithConnectInfo` is always ready
                let tower_service = unwrap_infallible(make_service.call(remote_addr).await);

                let shutdown_tx = Arc::clone(&shutdown_tx);
                let closed_rx = closed_rx.clone();

                tokio::spawn(async move {
                    let socket = TokioIo::new(socket);

                    let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                        tower_service.clone().oneshot(request)
                    });

                    let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
                    let connection = builder.serve_connection_with_upgrades(socket, hyper_service);
                    pin_mut!(connection);

                    let mut shutting_down = false;
                    loop {
                        select! {
                            connection_result = connection.as_mut() => {
                                if let Err(err) = connection_result {
                                    error!("failed to serve connection: {err:#}");
                                }
                                break; // (gracefully) finished connection
                            }
                            () = shutdown_tx.closed(), if !shutting_down => {
                                shutting_down = true;
                                connection.as_mut().graceful_shutdown();
                            }
                        }
                    }

                    drop(closed_rx);
                });
            }
            () = &mut shutdown => {
                warn!("shutting down, waiting for open connections");
                drop(shutdown_rx); // initiate shutdown
                drop(closed_rx);
                closed_tx.closed().await;
                break;
            }
        }
    }

    info!("server stopped");
    Ok(())
}

fn unwrap_infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => match err {},
    }
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn serves_until_shutdown() -> Result<(), AppError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let app = router(AppState::new(InMemoryStore::new(fixtures::demo())));
        let server = tokio::spawn(serve(listener, app, async {
            let _ = stop_rx.await;
        }));

        let mut stream = TcpStream::connect(address).await?;
        stream
            .write_all(b"GET /health HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
            .await?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains("x-request-id"), "{response}");

        stop_tx.send(()).unwrap();
        server.await.unwrap()
    }
}
