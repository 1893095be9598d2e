//! Archigraph Core Types and Definitions
//!
//! This crate provides the value types shared by the archigraph diagram engine.
//! It includes:
//!
//! - **Identifiers**: Generated node/cluster/diagram ids and interned type tags
//!   ([`identifier`] module)
//! - **Colors**: CSS-validated colors ([`color::Color`])
//! - **Styles**: Edge style carriers and line styles ([`style`] module)
//! - **Formats**: Output formats, layout directions and curve styles ([`format`] module)
//! - **Errors**: Errors raised when parsing enumerated values ([`error::ValueError`])

pub mod color;
pub mod error;
pub mod format;
pub mod identifier;
pub mod style;
