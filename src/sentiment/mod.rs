// Sentiment classification: trait-based abstraction over the model.
//
// SentimentClassifier defines the interface. OnnxSentimentClassifier runs a
// multilingual three-class model locally; NotLoadedClassifier stands in when
// no model is available.

pub mod model;
pub mod onnx;
pub mod traits;

pub use traits::{ClassifierError, NotLoadedClassifier, SentimentClassifier, SentimentScores};
