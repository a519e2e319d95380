//! speakerpacket - Speaker Packet generator for event Onsite Packets
//!
//! This crate extracts event metadata and a per-speaker schedule from an
//! "Onsite Packet" Excel workbook (XLSX) and renders a per-speaker Word
//! document (DOCX) from a fixed template.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use speakerpacket::{PacketGeneratorBuilder, SpeakerSelection};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a generator with default sheet names
//!     let generator = PacketGeneratorBuilder::new()
//!         .with_template_path("speaker_template.docx")
//!         .build()?;
//!
//!     // List the speakers found in the workbook
//!     let speakers = generator.list_speakers(File::open("onsite_packet.xlsx")?)?;
//!     println!("{:?}", speakers); // ["All Speakers", "Bob", "Jane", ...]
//!
//!     // Generate a packet for one speaker
//!     let packet = generator.generate_packet(
//!         File::open("onsite_packet.xlsx")?,
//!         &SpeakerSelection::Name("Jane".to_string()),
//!     )?;
//!
//!     std::fs::write(&packet.file_name, &packet.bytes)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! For in-memory workbooks, any `Read + Seek` source works:
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use speakerpacket::{PacketGeneratorBuilder, SpeakerSelection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = PacketGeneratorBuilder::new()
//!     .with_template_path("speaker_template.docx")
//!     .build()?;
//! let workbook_bytes: Vec<u8> = vec![]; // Your uploaded XLSX bytes
//! let context = generator.extract_context(
//!     Cursor::new(workbook_bytes),
//!     &SpeakerSelection::AllSpeakers,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use speakerpacket::PacketGeneratorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Override the sheet names used for extraction
//!     let generator = PacketGeneratorBuilder::new()
//!         .with_template_path("speaker_template.docx")
//!         .with_event_details_sheet("Event Details")
//!         .with_schedule_sheet("Onsite Schedule")
//!         .build()?;
//!     let _ = generator;
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod error;
mod extractor;
mod render;
mod security;
mod types;

// 公開API
pub use api::{packet_file_name, SpeakerSelection, ALL_SPEAKERS_LABEL};
pub use builder::{PacketGenerator, PacketGeneratorBuilder, SpeakerPacket};
pub use error::SpeakerPacketError;
pub use render::{DocxTemplate, TemplateRenderer, DOCX_CONTENT_TYPE};
pub use types::{EventMetadata, ScheduleRow, SpeakerPacketContext};
