//! Ordered fallback chain of removal methods
//!
//! Methods are tried strictly in registration order and the first success
//! wins; results from different methods are never blended. A method that
//! panics, or that claims success with an image of the wrong size, is treated
//! like a declared failure and the chain moves on. When every method fails
//! the error carries one [`MethodFailure`] per attempt.

use crate::{
    config::RemovalConfig,
    error::{BgRemovalError, Result},
    methods::{create_method, MethodKind, RemovalMethod},
    types::{MethodFailure, RemovalOutput},
};
use image::{DynamicImage, GenericImageView};
use instant::Instant;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug_span, info, warn};

/// Explicit ordered registry of removal methods
pub struct MethodChain {
    methods: Vec<Box<dyn RemovalMethod>>,
}

impl MethodChain {
    /// Chain over an explicit list of methods, highest priority first
    #[must_use]
    pub fn new(methods: Vec<Box<dyn RemovalMethod>>) -> Self {
        Self { methods }
    }

    /// Chain built from the configured method order
    #[must_use]
    pub fn from_config(config: &RemovalConfig) -> Self {
        let methods = config
            .methods
            .iter()
            .map(|kind| create_method(*kind, config))
            .collect();
        Self::new(methods)
    }

    /// Kinds of the registered methods in attempt order
    #[must_use]
    pub fn method_kinds(&self) -> Vec<MethodKind> {
        self.methods.iter().map(|m| m.kind()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Run the chain on a decoded image
    ///
    /// # Errors
    /// `AllMethodsExhausted` with every attempt's failure when no method
    /// succeeds (an empty chain yields an empty failure list).
    pub fn run(&self, image: &DynamicImage) -> Result<RemovalOutput> {
        let start = Instant::now();
        let expected = image.dimensions();
        let mut failures = Vec::new();

        for method in &self.methods {
            let kind = method.kind();
            let span = debug_span!("removal_method", method = %kind);
            let _guard = span.enter();
            let attempt_start = Instant::now();

            let outcome = match catch_unwind(AssertUnwindSafe(|| method.attempt(image))) {
                Ok(result) => result.into_result(kind).and_then(|rgba| {
                    if rgba.dimensions() == expected {
                        Ok(rgba)
                    } else {
                        Err(BgRemovalError::MethodFailure(MethodFailure::new(
                            kind,
                            format!(
                                "produced a {}x{} image for a {}x{} input",
                                rgba.width(),
                                rgba.height(),
                                expected.0,
                                expected.1
                            ),
                        )))
                    }
                }),
                Err(payload) => Err(BgRemovalError::MethodFailure(MethodFailure::new(
                    kind,
                    format!("unexpected error: {}", panic_message(&*payload)),
                ))),
            };

            match outcome {
                Ok(rgba) => {
                    info!(
                        method = %kind,
                        elapsed_ms = attempt_start.elapsed().as_millis() as u64,
                        previous_failures = failures.len(),
                        "Background removed"
                    );
                    return Ok(RemovalOutput {
                        image: rgba,
                        method: kind,
                        failed_attempts: failures,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    });
                },
                Err(e) => {
                    let failure = match e {
                        BgRemovalError::MethodFailure(failure) => failure,
                        other => MethodFailure::new(kind, other.to_string()),
                    };
                    warn!(
                        method = %kind,
                        reason = %failure.reason,
                        "Removal method failed, trying next"
                    );
                    failures.push(failure);
                },
            }
        }

        Err(BgRemovalError::AllMethodsExhausted { failures })
    }
}

impl std::fmt::Debug for MethodChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodChain")
            .field("methods", &self.method_kinds())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "method panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::test_utils::{
        create_test_image, FailingMethod, PanickingMethod, SucceedingMethod, WrongSizeMethod,
    };
    use crate::methods::BrightnessMask;

    #[test]
    fn test_first_success_wins() {
        let first = SucceedingMethod::new(MethodKind::ThresholdContour);
        let second = SucceedingMethod::new(MethodKind::Brightness);
        let second_calls = second.call_counter();
        let chain = MethodChain::new(vec![Box::new(first), Box::new(second)]);

        let output = chain.run(&create_test_image(3, 3, [0, 0, 0])).unwrap();
        assert_eq!(output.method, MethodKind::ThresholdContour);
        assert!(output.failed_attempts.is_empty());
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn test_falls_through_failures_in_order() {
        let chain = MethodChain::new(vec![
            Box::new(FailingMethod::new(MethodKind::Neural, "model unavailable")),
            Box::new(FailingMethod::new(MethodKind::ThresholdContour, "no contours")),
            Box::new(SucceedingMethod::new(MethodKind::Brightness)),
        ]);

        let output = chain.run(&create_test_image(2, 2, [0, 0, 0])).unwrap();
        assert_eq!(output.method, MethodKind::Brightness);
        let failed: Vec<_> = output.failed_attempts.iter().map(|f| f.method).collect();
        assert_eq!(failed, vec![MethodKind::Neural, MethodKind::ThresholdContour]);
    }

    #[test]
    fn test_single_failing_method_exhausts() {
        let chain = MethodChain::new(vec![Box::new(FailingMethod::new(
            MethodKind::Neural,
            "model unavailable",
        ))]);

        let err = chain.run(&create_test_image(2, 2, [0, 0, 0])).unwrap_err();
        match err {
            BgRemovalError::AllMethodsExhausted { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].method, MethodKind::Neural);
                assert_eq!(failures[0].reason, "model unavailable");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_failure_is_recorded() {
        let chain = MethodChain::new(vec![
            Box::new(FailingMethod::new(MethodKind::Neural, "a")),
            Box::new(FailingMethod::new(MethodKind::ThresholdContour, "b")),
        ]);

        let err = chain.run(&create_test_image(2, 2, [0, 0, 0])).unwrap_err();
        let reasons: Vec<_> = err.method_failures().iter().map(|f| f.reason.as_str()).collect();
        assert_eq!(reasons, vec!["a", "b"]);
    }

    #[test]
    fn test_panic_is_recovered_as_failure() {
        let chain = MethodChain::new(vec![
            Box::new(PanickingMethod(MethodKind::Neural)),
            Box::new(BrightnessMask::default()),
        ]);

        let output = chain.run(&create_test_image(4, 4, [255, 255, 255])).unwrap();
        assert_eq!(output.method, MethodKind::Brightness);
        assert_eq!(output.failed_attempts.len(), 1);
        assert!(output.failed_attempts[0].reason.contains("segmentation backend crashed"));
    }

    #[test]
    fn test_wrong_size_success_is_rejected() {
        let chain = MethodChain::new(vec![
            Box::new(WrongSizeMethod(MethodKind::Neural)),
            Box::new(SucceedingMethod::new(MethodKind::Brightness)),
        ]);

        let output = chain.run(&create_test_image(5, 2, [9, 9, 9])).unwrap();
        assert_eq!(output.method, MethodKind::Brightness);
        assert_eq!(output.dimensions(), (5, 2));
        assert!(output.failed_attempts[0].reason.contains("1x1"));
    }

    #[test]
    fn test_empty_chain_exhausts_with_no_failures() {
        let chain = MethodChain::new(Vec::new());
        assert!(chain.is_empty());

        let err = chain.run(&create_test_image(1, 1, [0, 0, 0])).unwrap_err();
        assert!(matches!(err, BgRemovalError::AllMethodsExhausted { ref failures } if failures.is_empty()));
    }

    #[test]
    fn test_from_config_follows_method_order() {
        let config = RemovalConfig::builder()
            .methods(vec![MethodKind::Brightness, MethodKind::ThresholdContour])
            .build()
            .unwrap();
        let chain = MethodChain::from_config(&config);

        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.method_kinds(),
            vec![MethodKind::Brightness, MethodKind::ThresholdContour]
        );
        assert!(format!("{chain:?}").contains("Brightness"));
    }
}
