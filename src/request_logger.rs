use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Start time of the request, cached per request.
struct RequestStart(Instant);

/// Fairing that writes one log line per request.
///
/// Uploads are logged with their declared size; imports can take minutes, so
/// slow requests are raised to `warn`.
pub struct RequestLogger;

const SLOW_REQUEST_MS: f64 = 30_000.0;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| RequestStart(Instant::now()));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started = request.local_cache(|| RequestStart(Instant::now()));
        let elapsed_ms = started.0.elapsed().as_secs_f64() * 1000.0;

        let upload = request
            .headers()
            .get_one("Content-Length")
            .map(|len| format!(" [{} bytes]", len))
            .unwrap_or_default();

        if elapsed_ms > SLOW_REQUEST_MS {
            log::warn!(
                "{} {}{} -> {} ({:.2}ms, slow)",
                request.method(),
                request.uri(),
                upload,
                response.status().code,
                elapsed_ms
            );
        } else {
            log::info!(
                "{} {}{} -> {} ({:.2}ms)",
                request.method(),
                request.uri(),
                upload,
                response.status().code,
                elapsed_ms
            );
        }
    }
}
