//! Cross-cutting test suites: end-to-end engine behaviour and
//! property-based checks. Unit tests for individual stages live next to
//! the stage they exercise.
