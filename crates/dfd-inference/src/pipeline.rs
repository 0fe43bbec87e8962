//! Detection pipeline.
//!
//! sample -> normalize -> classify -> aggregate -> (if fake) select evidence.
//! Every CPU-bound step runs on the blocking pool; the classifier comes from
//! the shared registry.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use dfd_media::{
    decode_image, encode_jpeg_base64, extract_frames, normalize_batch, MediaError, SampledFrame,
};
use dfd_models::limits::MAX_BATCH_FILES;
use dfd_models::{
    AggregateResult, BatchItemResult, BatchSummary, CanonicalPrediction, ClassifierVariant,
    FakeFrame, ProcessingInfo, VideoSamplingParams,
};
use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{aggregate, summarize_batch};
use crate::canonical::canonicalize;
use crate::classifier::{classify_checked, Classifier};
use crate::error::{InferenceError, InferenceResult};
use crate::evidence::{encode_evidence, select_evidence};
use crate::metrics::{record_frames_sampled, record_inference};
use crate::registry::ClassifierRegistry;

/// Single-image outcome.
#[derive(Debug, Clone)]
pub struct ImageDetection {
    pub prediction: CanonicalPrediction,
    /// The decoded upload re-encoded as JPEG
    pub image_base64: String,
}

/// Whole-video outcome.
#[derive(Debug, Clone)]
pub struct VideoDetection {
    pub processing_info: ProcessingInfo,
    pub result: AggregateResult,
    /// Present only when the overall verdict is fake
    pub fake_frames: Option<Vec<FakeFrame>>,
}

/// Batch outcome, one result per input in input order.
#[derive(Debug, Clone)]
pub struct BatchDetection {
    pub summary: BatchSummary,
    pub results: Vec<BatchItemResult>,
}

/// One file of a batch request.
#[derive(Debug, Clone)]
pub enum BatchInput {
    Image { filename: String, bytes: Vec<u8> },
    /// Refused before decoding (e.g. wrong content type)
    Rejected { filename: String, reason: String },
}

impl BatchInput {
    pub fn filename(&self) -> &str {
        match self {
            BatchInput::Image { filename, .. } | BatchInput::Rejected { filename, .. } => filename,
        }
    }
}

/// Runs detections against classifiers from a shared registry.
#[derive(Clone)]
pub struct Detector {
    registry: Arc<ClassifierRegistry>,
}

impl Detector {
    pub fn new(registry: Arc<ClassifierRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClassifierRegistry> {
        &self.registry
    }

    /// Classify one uploaded image. The upload is decoded before the
    /// classifier is fetched, so bad input never triggers a model load.
    pub async fn detect_image(
        &self,
        bytes: Vec<u8>,
        variant: ClassifierVariant,
    ) -> InferenceResult<ImageDetection> {
        let image = tokio::task::spawn_blocking(move || decode_image(&bytes)).await??;
        let classifier = self.registry.get(variant).await?;

        tokio::task::spawn_blocking(move || -> InferenceResult<ImageDetection> {
            let image_base64 = encode_jpeg_base64(&image)?;
            let labels = classify_images(classifier.as_ref(), &[(0, &image)])?;
            let prediction = canonicalize(labels[0], variant);

            debug!(model_type = %variant, raw = prediction.raw_prediction, "Image classified");
            Ok(ImageDetection {
                prediction,
                image_base64,
            })
        })
        .await?
    }

    /// Sample a video and classify its frames.
    ///
    /// `source` is moved onto the blocking thread and dropped when the work
    /// finishes, so a temp file it owns outlives the decoder.
    pub async fn detect_video<P>(
        &self,
        source: P,
        params: VideoSamplingParams,
        variant: ClassifierVariant,
    ) -> InferenceResult<VideoDetection>
    where
        P: AsRef<Path> + Send + 'static,
    {
        params.validate().map_err(InferenceError::invalid_parameters)?;
        let classifier = self.registry.get(variant).await?;

        tokio::task::spawn_blocking(move || -> InferenceResult<VideoDetection> {
            let start = Instant::now();
            let frames = extract_frames(source.as_ref(), &params)?;
            drop(source);
            record_frames_sampled(frames.len());

            if frames.is_empty() {
                return Err(MediaError::NoFramesExtracted.into());
            }

            let (result, fake_frames) = analyze_frames(classifier.as_ref(), variant, &frames)?;

            info!(
                model_type = %variant,
                frames = frames.len(),
                fake_percentage = result.fake_percentage,
                verdict = %result.overall_prediction,
                duration_ms = start.elapsed().as_millis() as u64,
                "Video analyzed"
            );

            Ok(VideoDetection {
                processing_info: ProcessingInfo {
                    frames_extracted: frames.len(),
                    frame_rate_used: params.frame_rate,
                    max_frames_limit: params.max_frames,
                },
                result,
                fake_frames,
            })
        })
        .await?
    }

    /// Classify independent images. A file that cannot be decoded becomes a
    /// failed item and does not affect the others.
    pub async fn detect_batch(
        &self,
        inputs: Vec<BatchInput>,
        variant: ClassifierVariant,
    ) -> InferenceResult<BatchDetection> {
        if inputs.len() > MAX_BATCH_FILES {
            return Err(InferenceError::invalid_parameters(format!(
                "Maximum {} files allowed in batch processing",
                MAX_BATCH_FILES
            )));
        }
        let classifier = self.registry.get(variant).await?;

        tokio::task::spawn_blocking(move || -> InferenceResult<BatchDetection> {
            let results = classify_batch(classifier.as_ref(), variant, inputs)?;
            let summary = summarize_batch(&results);
            info!(
                model_type = %variant,
                total = summary.total_files,
                failed = summary.failed_predictions,
                fake_percentage = summary.fake_percentage,
                "Batch analyzed"
            );
            Ok(BatchDetection { summary, results })
        })
        .await?
    }
}

/// Normalize and classify `(index, image)` pairs as one batch.
fn classify_images(
    classifier: &dyn Classifier,
    images: &[(usize, &RgbImage)],
) -> InferenceResult<Vec<i64>> {
    let batch = normalize_batch(images)?;
    let start = Instant::now();
    let labels = classify_checked(classifier, &batch)?;
    record_inference(
        classifier.variant().as_str(),
        start.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(labels)
}

/// Classify sampled frames, aggregate, and collect evidence when fake.
fn analyze_frames(
    classifier: &dyn Classifier,
    variant: ClassifierVariant,
    frames: &[SampledFrame],
) -> InferenceResult<(AggregateResult, Option<Vec<FakeFrame>>)> {
    let pairs: Vec<(usize, &RgbImage)> = frames.iter().map(|f| (f.index, &f.image)).collect();
    let labels = classify_images(classifier, &pairs)?;
    let result = aggregate(&labels, variant);

    let fake_frames = if result.is_fake() {
        let evidence = select_evidence(frames, &result.individual_predictions);
        Some(encode_evidence(&evidence)?)
    } else {
        None
    };

    Ok((result, fake_frames))
}

fn classify_batch(
    classifier: &dyn Classifier,
    variant: ClassifierVariant,
    inputs: Vec<BatchInput>,
) -> InferenceResult<Vec<BatchItemResult>> {
    // (filename, decoded image or per-item error), in input order
    let decoded: Vec<(String, Result<RgbImage, String>)> = inputs
        .into_par_iter()
        .map(|input| match input {
            BatchInput::Image { filename, bytes } => {
                let image = decode_image(&bytes).map_err(|e| e.to_string());
                (filename, image)
            }
            BatchInput::Rejected { filename, reason } => (filename, Err(reason)),
        })
        .collect();

    let pairs: Vec<(usize, &RgbImage)> = decoded
        .iter()
        .enumerate()
        .filter_map(|(i, (_, image))| image.as_ref().ok().map(|img| (i, img)))
        .collect();

    let labels = classify_images(classifier, &pairs)?;
    let mut predictions: Vec<Option<CanonicalPrediction>> = vec![None; decoded.len()];
    for ((index, _), raw) in pairs.iter().zip(labels) {
        predictions[*index] = Some(canonicalize(raw, variant));
    }

    let results: Vec<BatchItemResult> = decoded
        .par_iter()
        .zip(predictions.into_par_iter())
        .map(|((filename, image), prediction)| match (image, prediction) {
            (Ok(image), Some(prediction)) => match encode_jpeg_base64(image) {
                Ok(encoded) => BatchItemResult::succeeded(filename.clone(), prediction, Some(encoded)),
                Err(e) => BatchItemResult::failed(filename.clone(), e.to_string()),
            },
            (Err(reason), _) => BatchItemResult::failed(filename.clone(), reason.clone()),
            (Ok(_), None) => BatchItemResult::failed(filename.clone(), "Missing prediction"),
        })
        .collect();

    Ok(results)
}
