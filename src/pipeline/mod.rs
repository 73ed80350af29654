//! Pipeline stages for one analysis request.
//!
//! Each submodule implements exactly one step, so each can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ encode ──▶ invoke ──▶ respond
//! (per file)   (base64)   (model)    (envelope)
//! ```
//!
//! 1. [`validate`]: extension check, header verify, rewind, full decode
//! 2. [`encode`]: PNG-encode and base64-wrap each accepted image
//! 3. [`invoke`]: pick the prompt, call the model once; the only stage
//!    with network I/O
//! 4. [`respond`]: wrap the model text, or a validation message, in the
//!    outward JSON envelope

pub mod encode;
pub mod invoke;
pub mod respond;
pub mod validate;
