pub mod constants;
pub mod schema;
pub mod verifier;
pub mod witness;
pub mod witness_builder;

// Re-export key types for external usage
pub use schema::{CircuitInput, CircuitSchema, IndexEncoding, InputKind};
pub use verifier::{BbVerifierGenerator, VerifierError, VerifierGenerator};
pub use witness::{WitnessError, WitnessRecord, WitnessValue, write_prover_toml};
pub use witness_builder::{NoteWitnessBuilder, NoteWitnessParams};
