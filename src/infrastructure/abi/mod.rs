//! ABI infrastructure - contract ABIs, artifacts and alloy-dyn-abi conversions

mod artifacts;
mod contracts;
mod values;

pub use artifacts::{Artifact, ArtifactScanner, ArtifactSet};
pub use contracts::{builtin_abi, ContractAddresses, ContractHandle, ContractSet};
pub use values::{coerce_arg, encode_topic, field_value, record_from_event, record_from_outputs};
