// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer builds tensors or networks directly.
//
// What's in this layer:
//
//   config.rs      — LmConfig, the hyperparameters of any family
//   base.rs        — ModelBase: validation, paths, cross-entropy
//                    loss and next-token sampling shared by all
//   network.rs     — the Network capability and AnyNetwork sum
//   bigram.rs      — bigram lookup-table model
//   recurrent.rs   — LSTM and GRU models
//   transformer.rs — causal transformer decoder
//   registry.rs    — key → constructor table
//   model.rs       — LanguageModel = ModelBase + AnyNetwork
//   backend.rs     — DeviceKind → Burn backend dispatch
//
// Reference: Burn Book §3 (Building Blocks)

/// Hyperparameters shared by every model family
pub mod config;

/// Shared loss, sampling and path behaviour
pub mod base;

/// Forward-pass capability trait and the closed network enum
pub mod network;

/// Bigram language model
pub mod bigram;

/// LSTM and GRU language models
pub mod recurrent;

/// Causal transformer language model
pub mod transformer;

/// Registry from string key to model constructor
pub mod registry;

/// Base + network composition
pub mod model;

/// Backend selection and dispatch
pub mod backend;
