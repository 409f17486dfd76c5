//! # Mimic - call recording for test doubles
//!
//! Mimic is the engine underneath hand-written test doubles:
//! - One shared, ordered history of intercepted calls, whatever their signature
//! - Typed retrieval of recorded arguments, per operation and per subject
//! - Pluggable conversion of arguments before they are stored
//! - Forwarding in a fixed order: override, then delegate, then default
//!
//! ## Quick Start
//!
//! ```rust
//! use mimic_core::prelude::*;
//!
//! trait Refrigerator {
//!     fn get_eggs(&self, count: u32) -> u32;
//! }
//!
//! static GET_EGGS: Operation<(u32,), u32> = Operation::new("Refrigerator::get_eggs");
//!
//! struct RefrigeratorMock(Mock<dyn Refrigerator>);
//!
//! impl Refrigerator for RefrigeratorMock {
//!     fn get_eggs(&self, count: u32) -> u32 {
//!         self.0.call(&GET_EGGS, (count,), |real, (count,)| real.get_eggs(count))
//!     }
//! }
//!
//! let fridge = RefrigeratorMock(Mock::new());
//! fridge.0.set(&GET_EGGS, |(count,)| count);
//!
//! assert_eq!(fridge.get_eggs(2), 2);
//! assert_eq!(fridge.0.find(&GET_EGGS).get::<0>(0), Some(&2));
//! ```
//!
//! ## Architecture
//!
//! - **Identity**: subjects and operations ([`identity`])
//! - **Conversion**: what gets stored for each argument ([`conversion`])
//! - **Recorder**: the shared history ([`recorder`])
//! - **Overrides**: per-wrapper replacement behaviour ([`overrides`])
//! - **Dispatch**: the wrappers and the forwarding gateway ([`dispatch`])
//! - **Result view**: typed rows of recorded arguments ([`result`])
//!
//! Everything is single-threaded: wrappers share state through `Rc`.

pub mod config;
pub mod conversion;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod overrides;
pub mod recorder;
pub mod result;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigBuilder, MimicConfig, RecorderConfig, ReportConfig, ReportFormat};
    pub use crate::conversion::{
        ConversionPolicy, Convert, ConvertArgs, DefaultConversion, MinimalConversion,
    };
    pub use crate::dispatch::{FunctionMock, FunctionRegistry, FunctorMock, Mock, Tier};
    pub use crate::error::{MimicError, Result};
    pub use crate::identity::{Operation, OperationId, SubjectId};
    pub use crate::overrides::OverrideTable;
    pub use crate::recorder::{CallRecord, CallRecorder, CallSummary};
    pub use crate::result::ResultSet;
}
