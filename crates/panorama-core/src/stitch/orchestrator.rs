use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{panic_message, PanoramaError, Result, StrategyFailure};
use crate::frame::ColorFrame;

use super::{ComposeOutcome, Compositor, StitchStrategy};

/// Successful stitch: the composite, the strategy that produced it and the
/// strategies that failed before it.
#[derive(Clone, Debug)]
pub struct StitchReport {
    pub composite: ColorFrame,
    pub strategy: StitchStrategy,
    pub failures: Vec<StrategyFailure>,
}

/// Try each compositor in order; the first success wins.
///
/// A compositor error or panic counts as a failure of that strategy. When every
/// strategy fails, the returned `Stitch` error lists each reason in order.
pub fn stitch_with_fallback(
    images: &[ColorFrame],
    compositors: &[Arc<dyn Compositor>],
    confidence_threshold: f32,
) -> Result<StitchReport> {
    let mut failures = Vec::with_capacity(compositors.len());

    for compositor in compositors {
        let strategy = compositor.strategy();
        info!(%strategy, images = images.len(), confidence_threshold, "Trying stitch strategy");

        let attempt = catch_unwind(AssertUnwindSafe(|| {
            compositor.compose(images, confidence_threshold)
        }));

        let reason = match attempt {
            Ok(Ok(ComposeOutcome::Success(composite))) => {
                info!(
                    %strategy,
                    width = composite.width(),
                    height = composite.height(),
                    "Stitching successful"
                );
                return Ok(StitchReport {
                    composite,
                    strategy,
                    failures,
                });
            }
            Ok(Ok(ComposeOutcome::Failure(reason))) => {
                warn!(%strategy, %reason, "Stitching failed");
                reason
            }
            Ok(Err(e)) => {
                warn!(%strategy, error = %e, "Error with stitching strategy");
                e.to_string()
            }
            Err(payload) => {
                let reason = format!("compositor panicked: {}", panic_message(payload.as_ref()));
                warn!(%strategy, %reason, "Compositor panicked");
                reason
            }
        };

        failures.push(StrategyFailure { strategy, reason });
    }

    Err(PanoramaError::Stitch { attempts: failures })
}
