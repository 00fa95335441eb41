//! Core business logic modules.

pub mod classifier;
pub mod locks;
pub mod reconciler;
pub mod relocator;
pub mod resolver;
pub mod suffix;

pub use classifier::QualityClassifier;
pub use reconciler::{ExistingFileReconciler, ReconcileReport};
pub use relocator::{Relocator, RelocatorConfig};
