// src/splice/render.rs

//! Textual splice descriptions in the engine's XML dialect.
//!
//! Only the textual description is produced here; the engine does the
//! binary section encoding.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::loader::write_atomic;
use crate::splice::command::SpliceCommand;
use crate::types::SpliceKind;

/// Render a splice information table containing `cmd`.
pub fn render_xml(cmd: &SpliceCommand) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<tsduck>\n");
    out.push_str("  <splice_information_table>\n");

    match cmd.kind {
        SpliceKind::Insert => render_insert(&mut out, cmd),
        SpliceKind::TimeSignal => render_time_signal(&mut out, cmd),
    }

    out.push_str("  </splice_information_table>\n");
    out.push_str("</tsduck>\n");
    out
}

/// Segmentation type for the start of a provider placement opportunity.
pub const SEGMENTATION_PLACEMENT_START: u8 = 0x34;
/// Segmentation type for the end of a provider placement opportunity.
pub const SEGMENTATION_PLACEMENT_END: u8 = 0x35;

fn render_insert(out: &mut String, cmd: &SpliceCommand) {
    let _ = write!(
        out,
        "    <splice_insert splice_event_id=\"{}\" splice_event_cancel=\"{}\"",
        cmd.event_id, cmd.cancel
    );
    if cmd.cancel {
        out.push_str("/>\n");
        return;
    }

    let _ = writeln!(
        out,
        " out_of_network=\"{}\" splice_immediate=\"{}\" unique_program_id=\"{}\" \
         avail_num=\"0\" avails_expected=\"0\">",
        cmd.out_of_network, cmd.immediate, cmd.unique_program_id
    );
    if let Some(pts) = cmd.pts_time {
        let _ = writeln!(out, "      <splice_time pts_time=\"{pts}\"/>");
    }
    if cmd.has_duration {
        let _ = writeln!(
            out,
            "      <break_duration auto_return=\"{}\" duration=\"{}\"/>",
            cmd.auto_return, cmd.duration_ticks
        );
    }
    out.push_str("    </splice_insert>\n");
}

/// A time signal only carries the PTS; which event it belongs to and
/// whether it opens or closes a break goes into a segmentation descriptor.
fn render_time_signal(out: &mut String, cmd: &SpliceCommand) {
    match cmd.pts_time {
        Some(pts) => {
            let _ = writeln!(out, "    <time_signal pts_time=\"{pts}\"/>");
        }
        None => out.push_str("    <time_signal/>\n"),
    }

    let _ = write!(
        out,
        "    <segmentation_descriptor segmentation_event_id=\"{}\" \
         segmentation_event_cancel=\"{}\"",
        cmd.event_id, cmd.cancel
    );
    if cmd.cancel {
        out.push_str("/>\n");
        return;
    }

    let type_id = if cmd.out_of_network {
        SEGMENTATION_PLACEMENT_START
    } else {
        SEGMENTATION_PLACEMENT_END
    };
    let _ = write!(
        out,
        " segmentation_type_id=\"{type_id:#04x}\" segment_num=\"0\" segments_expected=\"0\""
    );
    if cmd.has_duration {
        let _ = write!(out, " segmentation_duration=\"{}\"", cmd.duration_ticks);
    }
    out.push_str(">\n");
    out.push_str("      <segmentation_upid type=\"0x00\"/>\n");
    out.push_str("    </segmentation_descriptor>\n");
}

/// File name for the splice file of `cmd`. Cancels get their own name so
/// they never overwrite the file of the event they cancel.
pub fn marker_file_name(cmd: &SpliceCommand) -> String {
    if cmd.cancel {
        format!("splice_{}_cancel.xml", cmd.event_id)
    } else {
        format!("splice_{}.xml", cmd.event_id)
    }
}

/// Atomically write the rendered command into `dir` and return its path.
pub fn write_marker_file(dir: &Path, cmd: &SpliceCommand) -> io::Result<PathBuf> {
    let path = dir.join(marker_file_name(cmd));
    write_atomic(&path, render_xml(cmd).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalSettings;
    use crate::splice::generator::SpliceGenerator;
    use crate::types::PolicyKind;

    fn generator(kind: SpliceKind) -> SpliceGenerator {
        SpliceGenerator::new(&SignalSettings {
            ad_duration_seconds: 60,
            event_id: 1,
            preroll_ms: 0,
            unique_program_id: 7,
            command: kind,
        })
    }

    #[test]
    fn cue_out_renders_time_and_duration() {
        let cmd = generator(SpliceKind::Insert)
            .generate(PolicyKind::CueOut, 10, 90_000)
            .unwrap();
        let xml = render_xml(&cmd);

        assert!(xml.contains("splice_event_id=\"10\""));
        assert!(xml.contains("out_of_network=\"true\""));
        assert!(xml.contains("unique_program_id=\"7\""));
        assert!(xml.contains("<splice_time pts_time=\"90000\"/>"));
        assert!(xml.contains("duration=\"5400000\""));
    }

    #[test]
    fn cue_in_has_no_break_duration() {
        let cmd = generator(SpliceKind::Insert)
            .generate(PolicyKind::CueIn, 11, 1)
            .unwrap();
        let xml = render_xml(&cmd);

        assert!(xml.contains("out_of_network=\"false\""));
        assert!(!xml.contains("break_duration"));
    }

    #[test]
    fn crash_out_is_immediate() {
        let cmd = generator(SpliceKind::Insert)
            .generate(PolicyKind::CrashOut, 12, 1)
            .unwrap();
        let xml = render_xml(&cmd);

        assert!(xml.contains("splice_immediate=\"true\""));
        assert!(!xml.contains("splice_time"));
    }

    #[test]
    fn time_signal_cue_out_opens_a_placement() {
        let cmd = generator(SpliceKind::TimeSignal)
            .generate(PolicyKind::CueOut, 13, 4_500)
            .unwrap();
        let xml = render_xml(&cmd);

        assert!(xml.contains("<time_signal pts_time=\"4500\"/>"));
        assert!(xml.contains("segmentation_event_id=\"13\""));
        assert!(xml.contains("segmentation_type_id=\"0x34\""));
        assert!(xml.contains("segmentation_duration=\"5400000\""));
        assert!(!xml.contains("splice_insert"));
    }

    #[test]
    fn time_signal_cue_in_closes_the_placement() {
        let mut generator = generator(SpliceKind::TimeSignal);
        let out = render_xml(&generator.generate(PolicyKind::CueOut, 1, 90_000).unwrap());
        let back = render_xml(&generator.generate(PolicyKind::CueIn, 2, 90_000).unwrap());

        assert_ne!(out, back);
        assert!(back.contains("segmentation_event_id=\"2\""));
        assert!(back.contains("segmentation_type_id=\"0x35\""));
        assert!(!back.contains("segmentation_duration"));
    }

    #[test]
    fn cancelled_time_signal_has_no_segmentation_fields() {
        let mut cmd = SpliceCommand::cancel_event(5, 1);
        cmd.kind = SpliceKind::TimeSignal;
        let xml = render_xml(&cmd);

        assert!(xml.contains("segmentation_event_cancel=\"true\"/>"));
        assert!(!xml.contains("segmentation_type_id"));
    }

    #[test]
    fn cancel_is_a_bare_insert() {
        let xml = render_xml(&SpliceCommand::cancel_event(99, 1));
        assert!(xml.contains("splice_event_cancel=\"true\"/>"));
        assert!(!xml.contains("</splice_insert>"));
    }

    #[test]
    fn cancel_file_does_not_clash_with_the_event_file() {
        let cancel = SpliceCommand::cancel_event(99, 1);
        let event = generator(SpliceKind::Insert)
            .generate(PolicyKind::CueOut, 99, 0)
            .unwrap();
        assert_eq!(marker_file_name(&event), "splice_99.xml");
        assert_eq!(marker_file_name(&cancel), "splice_99_cancel.xml");
    }
}
