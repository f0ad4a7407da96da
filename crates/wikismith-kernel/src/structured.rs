//! Structured-output contract
//!
//! Every JSON payload the pipelines request from a model implements
//! [`StructuredPayload`]: a stable shape name (used in decode errors and
//! retry prompts) and the format-instructions block appended to prompts
//! that request the payload.

/// Contract for a JSON shape a model is asked to produce.
pub trait StructuredPayload {
    /// Stable name of the shape, used in decode errors and retry prompts.
    fn shape_name() -> &'static str;

    /// Instructions block appended to a prompt requesting this payload.
    ///
    /// Should describe the exact JSON object expected, field by field.
    fn format_instructions() -> &'static str;
}
