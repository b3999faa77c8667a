//! Paid-session fulfillment: resolve purchased track ids, sign download
//! links, email the purchaser.
//!
//! Runs entirely inside the webhook request; the only concurrency is the
//! fan-out over per-track signing calls, joined before the email goes out.

use crate::catalog::Catalog;
use crate::mailer::{DownloadLink, Mailer, SendError};
use crate::payments::CheckoutSessionObject;
use crate::storage::{sign_object_url, ObjectStore, SignOutcome, DOWNLOAD_URL_EXPIRY};
use tracing::{info, warn};

/// What happened to a verified, paid checkout session.
#[derive(Debug, PartialEq, Eq)]
pub enum FulfillmentStatus {
    /// The mixtape email went out with this many links.
    Delivered { links: usize },
    /// Nothing deliverable: no email, no metadata, or no resolvable tracks.
    /// The webhook still acknowledges the event so the provider stops
    /// redelivering something that can never succeed.
    NothingToDeliver,
}

/// Fulfill a paid checkout session.
///
/// Unresolvable track ids are skipped rather than failing the event; a
/// per-track signing failure degrades that one link to the raw stored
/// reference. A mailer failure is the only error surfaced, so the webhook
/// can answer 500 and lean on the provider's redelivery.
pub async fn fulfill_paid_session(
    catalog: &Catalog,
    store: &dyn ObjectStore,
    mailer: &dyn Mailer,
    session: &CheckoutSessionObject,
) -> Result<FulfillmentStatus, SendError> {
    let (email, track_ids) = match (session.purchaser_email(), session.track_ids_metadata()) {
        (Some(email), Some(track_ids)) => (email, track_ids),
        _ => {
            warn!(
                "Session {} is paid but has no email or no trackIds metadata",
                session.id
            );
            return Ok(FulfillmentStatus::NothingToDeliver);
        }
    };

    let resolved: Vec<_> = track_ids
        .split(',')
        .filter_map(|raw_id| {
            let found = catalog.resolve_track(raw_id);
            if found.is_none() {
                warn!("Skipping unresolvable track id \"{}\"", raw_id);
            }
            found
        })
        .collect();

    if resolved.is_empty() {
        warn!("No resolvable tracks for session {}", session.id);
        return Ok(FulfillmentStatus::NothingToDeliver);
    }

    let links: Vec<DownloadLink> = futures::future::join_all(resolved.iter().map(
        |(_, track)| async {
            let outcome =
                sign_object_url(store, &track.audio_url, DOWNLOAD_URL_EXPIRY, true).await;
            if let SignOutcome::UnsignedFallback(_) = &outcome {
                warn!(
                    "Emailing unsigned storage reference for \"{}\"",
                    track.title
                );
            }
            DownloadLink {
                title: track.title.clone(),
                url: outcome.into_url(),
            }
        },
    ))
    .await;

    mailer
        .send_mixtape(email, session.purchaser_name(), &links)
        .await?;

    info!(
        "Delivered {} download links for session {}",
        links.len(),
        session.id
    );
    Ok(FulfillmentStatus::Delivered { links: links.len() })
}
