use crate::error::AppError;
use crate::models::archive_types::ExtractedImage;
use crate::models::classify_types::{ClassificationResult, DocumentLabel};
use crate::services::classifier::engine::{Inference, InferenceEngine};
use crate::services::classifier::model_manager::{ModelDescriptor, ModelSource};
use crate::services::image_store::ImageStore;
use async_trait::async_trait;
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// In-memory ZIP; `None` content makes a directory entry.
pub(crate) fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        match content {
            Some(data) => {
                writer.start_file(name.to_string(), options).unwrap();
                writer.write_all(data).unwrap();
            }
            None => writer.add_directory(name.to_string(), options).unwrap(),
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Uncompressed ZIP, so entry bytes appear verbatim in the blob.
pub(crate) fn build_zip_stored(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(name.to_string(), options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Flip the first occurrence of `marker` so its entry fails the CRC check.
pub(crate) fn corrupt(blob: &mut [u8], marker: &[u8]) {
    let pos = blob
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("marker present in archive");
    for byte in &mut blob[pos..pos + marker.len()] {
        *byte ^= 0xFF;
    }
}

pub(crate) fn read_zip(blob: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(blob)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub(crate) fn extracted(filename: &str, data: &[u8]) -> ExtractedImage {
    ExtractedImage {
        filename: filename.to_string(),
        data: Arc::from(data.to_vec()),
    }
}

pub(crate) fn loaded_model() -> ModelDescriptor {
    ModelDescriptor {
        name: "test.h5".to_string(),
        source: ModelSource::Memory(Arc::from(b"weights".to_vec())),
        loaded: true,
    }
}

pub(crate) fn result_for(
    store: &ImageStore,
    filename: &str,
    data: &[u8],
    label: DocumentLabel,
) -> ClassificationResult {
    ClassificationResult {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        image: store.insert(Arc::from(data.to_vec())),
        classification: label,
        confidence: 0.9,
    }
}

/// Always answers the same label and confidence, counting calls.
pub(crate) struct FixedEngine {
    inference: Inference,
    calls: AtomicUsize,
}

impl FixedEngine {
    pub(crate) fn new(label: DocumentLabel, confidence: f32) -> Self {
        Self {
            inference: Inference { label, confidence },
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn infer(&self, _model: &ModelDescriptor, _image: &ExtractedImage) -> Result<Inference, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inference)
    }
}

/// Labels by filename prefix (`p` → PAN) and fails on one chosen file.
pub(crate) struct FailingEngine {
    poison: String,
}

impl FailingEngine {
    pub(crate) fn failing_on(filename: &str) -> Self {
        Self {
            poison: filename.to_string(),
        }
    }
}

#[async_trait]
impl InferenceEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    async fn infer(&self, _model: &ModelDescriptor, image: &ExtractedImage) -> Result<Inference, AppError> {
        if image.filename == self.poison {
            return Err(AppError::Processing(format!("cannot classify {}", image.filename)));
        }
        let label = if image.filename.starts_with('p') {
            DocumentLabel::PanCard
        } else {
            DocumentLabel::Aadhar
        };
        Ok(Inference {
            label,
            confidence: 0.8,
        })
    }
}
