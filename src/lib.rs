//! footprint-tool: generates PCB footprints from declarative pad-array descriptions
//!
//! A footprint is described by its package body and a list of pad arrays
//! (single rows, dual rows, quad packages). The library lays out the pads,
//! cuts pad clearances out of the silkscreen body outline and writes KiCad
//! footprints plus a simple VRML body model.
//!
//! # Pipeline
//!
//! ```text
//! JSON --definitions--> FootprintSpec --footprint::generate--> GeneratedFootprint
//!                                                                |-- kicad --> .kicad_mod
//!                                                                '-- vrml  --> .wrl
//! ```
//!
//! The geometry engine is synchronous and performs no I/O; only [`output`]
//! touches the file system.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`definitions`]: JSON definition libraries and inheritance
//! - [`error`]: Error types
//! - [`footprint`]: Pad layout and silkscreen visibility engines
//! - [`geometry`]: Vectors, orientations and boolean difference
//! - [`kicad`]: `.kicad_mod` writer
//! - [`vrml`]: `.wrl` body writer
//! - [`output`]: File output

pub mod config;
pub mod definitions;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod kicad;
pub mod output;
pub mod vrml;
