pub mod cache;
pub mod error;
pub mod gate;
pub mod verifier;
pub mod worker;

pub use cache::{ContentCache, HashNamedCache, LicenseCache};
pub use error::LicenseError;
pub use gate::{CachePolicy, CheckOutcome, GateState, LicenseGate};
pub use verifier::{EndpointFlavor, HttpVerifier, Verification, Verifier};
pub use worker::{CancelToken, GateReport, GateRequest, GateTask};
