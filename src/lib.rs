pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::server::run;
pub use use_cases::verify_init_data::{InitDataVerifier, verify_init_data};
