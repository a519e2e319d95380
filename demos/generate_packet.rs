//! Packet Generation Example
//!
//! This example demonstrates how to build a command-line tool
//! using speakerpacket for generating per-speaker DOCX packets
//! from an Onsite Packet workbook.

use std::fs::File;
use std::process;
use speakerpacket::{
    PacketGeneratorBuilder, SpeakerPacketError, SpeakerSelection, ALL_SPEAKERS_LABEL,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} <onsite_packet.xlsx> <template.docx> [options]",
            args[0]
        );
        eprintln!("\nOptions:");
        eprintln!("  --speaker <name>     Generate a packet for one speaker");
        eprintln!("  --all                Generate a packet with the full schedule (default)");
        eprintln!("  --list               List speakers found in the workbook and exit");
        eprintln!("\nExamples:");
        eprintln!("  {} onsite_packet.xlsx template.docx --list", args[0]);
        eprintln!(
            "  {} onsite_packet.xlsx template.docx --speaker \"Jane Doe\"",
            args[0]
        );
        process::exit(1);
    }

    let input_path = &args[1];
    let template_path = &args[2];

    // Parse options
    let mut selection = SpeakerSelection::AllSpeakers;
    let mut list_only = false;
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--speaker" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --speaker requires a value");
                    process::exit(1);
                }
                selection = SpeakerSelection::from_label(&args[i + 1]);
                i += 2;
            }
            "--all" => {
                selection = SpeakerSelection::AllSpeakers;
                i += 1;
            }
            "--list" => {
                list_only = true;
                i += 1;
            }
            _ => {
                eprintln!("Error: Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
    }

    let result = if list_only {
        list_speakers(input_path, template_path)
    } else {
        generate_packet(input_path, template_path, &selection)
    };

    if let Err(e) = result {
        handle_error(e);
        process::exit(1);
    }
}

fn list_speakers(input_path: &str, template_path: &str) -> Result<(), SpeakerPacketError> {
    let generator = PacketGeneratorBuilder::new()
        .with_template_path(template_path)
        .build()?;

    let speakers = generator.list_speakers(File::open(input_path)?)?;
    for speaker in speakers {
        if speaker == ALL_SPEAKERS_LABEL {
            println!("{} (full schedule)", speaker);
        } else {
            println!("{}", speaker);
        }
    }

    Ok(())
}

fn generate_packet(
    input_path: &str,
    template_path: &str,
    selection: &SpeakerSelection,
) -> Result<(), SpeakerPacketError> {
    let generator = PacketGeneratorBuilder::new()
        .with_template_path(template_path)
        .build()?;

    let packet = generator.generate_packet(File::open(input_path)?, selection)?;
    std::fs::write(&packet.file_name, &packet.bytes)?;

    println!(
        "Packet generated: {} ({} bytes)",
        packet.file_name,
        packet.bytes.len()
    );

    Ok(())
}

fn handle_error(error: SpeakerPacketError) {
    match error {
        SpeakerPacketError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        SpeakerPacketError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid Excel file or may be corrupted.");
        }
        SpeakerPacketError::Utf8(utf8_err) => {
            eprintln!("UTF-8 Conversion Error: {}", utf8_err);
            eprintln!("The template contains invalid UTF-8 characters.");
        }
        SpeakerPacketError::Zip(msg) => {
            eprintln!("ZIP Archive Error: {}", msg);
            eprintln!("The file may be corrupted or not a valid ZIP archive.");
        }
        SpeakerPacketError::MalformedInput { sheet, message } => {
            eprintln!("Malformed Input:");
            eprintln!("  Sheet: {}", sheet);
            eprintln!("  Details: {}", message);
            eprintln!("Please check the workbook against the Onsite Packet template.");
        }
        SpeakerPacketError::Render(msg) => {
            eprintln!("Render Error: {}", msg);
            eprintln!("The DOCX template may be missing or malformed.");
        }
        SpeakerPacketError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check the sheet names and template path.");
        }
        SpeakerPacketError::SecurityViolation(msg) => {
            eprintln!("Security Violation: {}", msg);
            eprintln!("The file violates security constraints (e.g., file size limit).");
        }
    }
}
