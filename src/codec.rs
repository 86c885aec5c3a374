//! Save and restore device state as a flat text file.
//!
//! The file is a sequence of nine-line records, one per device, each line
//! `Label: value`:
//!
//! ```text
//! Name: Speakers (Realtek Audio)
//! VolumeScalar: 0.5
//! VolumeLevel: -10.5
//! IsMute: 0
//! IsDefaultPlayback: 1
//! IsDefaultRecording: 0
//! IsDefaultCommunicationPlayback: 1
//! IsDefaultCommunicationRecording: 0
//! State: 1
//! ```
//!
//! Records are matched to live devices by exact name. Fields are only
//! applied to devices that are active when their `Name:` line is read.

use crate::audio::{Device, DeviceRole, DeviceSource, DeviceState, Direction};
use crate::registry::DeviceRegistry;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// State file errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to open state file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One line kind of a record, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    VolumeScalar,
    VolumeLevel,
    IsMute,
    IsDefaultPlayback,
    IsDefaultRecording,
    IsDefaultCommunicationPlayback,
    IsDefaultCommunicationRecording,
    State,
}

impl Field {
    pub const ORDER: [Field; 9] = [
        Field::Name,
        Field::VolumeScalar,
        Field::VolumeLevel,
        Field::IsMute,
        Field::IsDefaultPlayback,
        Field::IsDefaultRecording,
        Field::IsDefaultCommunicationPlayback,
        Field::IsDefaultCommunicationRecording,
        Field::State,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::VolumeScalar => "VolumeScalar",
            Field::VolumeLevel => "VolumeLevel",
            Field::IsMute => "IsMute",
            Field::IsDefaultPlayback => "IsDefaultPlayback",
            Field::IsDefaultRecording => "IsDefaultRecording",
            Field::IsDefaultCommunicationPlayback => "IsDefaultCommunicationPlayback",
            Field::IsDefaultCommunicationRecording => "IsDefaultCommunicationRecording",
            Field::State => "State",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|f| f.label() == label)
    }

    /// Role and direction a default flag stands for.
    fn default_target(&self) -> Option<(DeviceRole, Direction)> {
        match self {
            Field::IsDefaultPlayback => Some((DeviceRole::Console, Direction::Playback)),
            Field::IsDefaultRecording => Some((DeviceRole::Console, Direction::Capture)),
            Field::IsDefaultCommunicationPlayback => {
                Some((DeviceRole::Communications, Direction::Playback))
            }
            Field::IsDefaultCommunicationRecording => {
                Some((DeviceRole::Communications, Direction::Capture))
            }
            _ => None,
        }
    }
}

/// Split `Label: value` into its field and raw value.
pub fn parse_line(line: &str) -> Option<(Field, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (label, value) = line.split_once(':')?;
    let field = Field::from_label(label.trim())?;
    Some((field, value.strip_prefix(' ').unwrap_or(value)))
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
enum Value<'a> {
    Text(&'a str),
    Float(f32),
    Flag(bool),
    State(DeviceState),
}

fn decode(field: Field, raw: &str) -> Option<Value<'_>> {
    match field {
        Field::Name => Some(Value::Text(raw)),
        Field::VolumeScalar | Field::VolumeLevel => raw.trim().parse().ok().map(Value::Float),
        Field::State => raw
            .trim()
            .parse::<i32>()
            .ok()
            .map(|code| Value::State(DeviceState::from_code(code))),
        _ => match raw.trim() {
            "0" => Some(Value::Flag(false)),
            "1" => Some(Value::Flag(true)),
            _ => None,
        },
    }
}

/// Serialized form of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord {
    pub name: String,
    pub volume_scalar: f32,
    pub volume_level: f32,
    pub is_mute: bool,
    pub is_default_playback: bool,
    pub is_default_recording: bool,
    pub is_default_communication_playback: bool,
    pub is_default_communication_recording: bool,
    pub state: DeviceState,
}

impl ConfigRecord {
    pub fn from_device(device: &Device) -> Self {
        let playback = device.direction == Direction::Playback;
        let capture = device.direction == Direction::Capture;
        Self {
            name: device.name.clone(),
            volume_scalar: device.volume_scalar,
            volume_level: device.volume_level,
            is_mute: device.is_muted,
            is_default_playback: playback && device.is_default_console,
            is_default_recording: capture && device.is_default_console,
            is_default_communication_playback: playback && device.is_default_communications,
            is_default_communication_recording: capture && device.is_default_communications,
            state: device.state,
        }
    }

    fn value(&self, field: Field) -> String {
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        match field {
            Field::Name => self.name.clone(),
            Field::VolumeScalar => self.volume_scalar.to_string(),
            Field::VolumeLevel => self.volume_level.to_string(),
            Field::IsMute => flag(self.is_mute),
            Field::IsDefaultPlayback => flag(self.is_default_playback),
            Field::IsDefaultRecording => flag(self.is_default_recording),
            Field::IsDefaultCommunicationPlayback => flag(self.is_default_communication_playback),
            Field::IsDefaultCommunicationRecording => {
                flag(self.is_default_communication_recording)
            }
            Field::State => self.state.code().to_string(),
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for field in Field::ORDER {
            writeln!(out, "{}: {}", field.label(), self.value(field))?;
        }
        Ok(())
    }
}

/// Re-read every device and write one record each to `path`, replacing
/// whatever was there. Returns the number of records written.
pub fn save(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    path: &Path,
) -> Result<usize, CodecError> {
    let file = File::create(path).map_err(|source| CodecError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    let count = save_to(registry, source, &mut out)?;
    out.flush()?;
    info!("Saved {} devices to {}", count, path.display());
    Ok(count)
}

/// [`save`] to any writer.
pub fn save_to<W: Write>(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    out: &mut W,
) -> Result<usize, CodecError> {
    for index in 0..registry.len() {
        registry.refresh_state(index, source);
        registry.refresh_levels(index, source);
        ConfigRecord::from_device(&registry.devices()[index]).write_to(out)?;
    }
    Ok(registry.len())
}

/// Outcome counts for a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records whose name matched a live device
    pub records_matched: usize,

    /// Field values written to a device
    pub fields_applied: usize,

    /// Field lines of a matched record that were not applied: inactive
    /// device, bad value, or a default flag that does not apply. Lines
    /// outside any matched record are not counted.
    pub fields_skipped: usize,

    /// Platform writes that failed
    pub failures: usize,

    /// Names in the file with no live device
    pub unknown_names: Vec<String>,
}

/// Which device, if any, the lines being read belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    NoMatch,
    Matched { index: usize, active: bool },
}

/// Apply the records in `path` to the live devices they name.
pub fn load(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    path: &Path,
) -> Result<LoadSummary, CodecError> {
    let file = File::open(path).map_err(|source| CodecError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let summary = load_from(registry, source, file)?;
    info!(
        "Loaded {} records from {} ({} fields applied)",
        summary.records_matched,
        path.display(),
        summary.fields_applied
    );
    Ok(summary)
}

/// [`load`] from any seekable reader. The input is rescanned from the top
/// for every device, so record order does not have to follow device order.
pub fn load_from<R: Read + Seek>(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    mut input: R,
) -> Result<LoadSummary, CodecError> {
    let mut summary = LoadSummary::default();

    let mut names_seen = BTreeSet::new();
    for_each_line(&mut input, |line| {
        if let Some((Field::Name, raw)) = parse_line(line) {
            names_seen.insert(raw.to_string());
        }
    })?;

    for index in 0..registry.len() {
        let mut cursor = Cursor::NoMatch;
        for_each_line(&mut input, |line| {
            load_line(registry, source, index, line, &mut cursor, &mut summary)
        })?;
    }

    for name in names_seen {
        if registry.position_by_name(&name).is_none() {
            warn!("No device named {:?}, record ignored", name);
            summary.unknown_names.push(name);
        }
    }

    Ok(summary)
}

/// Feed every line of `input`, from the top, to `f`. Bytes that are not
/// valid UTF-8 are replaced rather than failing the whole read.
fn for_each_line<R, F>(input: &mut R, mut f: F) -> io::Result<()>
where
    R: Read + Seek,
    F: FnMut(&str),
{
    input.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = text {
            debug!("Replaced invalid UTF-8 in line {:?}", text);
        }
        f(text.strip_suffix('\n').unwrap_or(&text));
    }
}

/// Advance the cursor for device `index` over one line, applying the line
/// if it belongs to that device's record.
fn load_line(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    index: usize,
    line: &str,
    cursor: &mut Cursor,
    summary: &mut LoadSummary,
) {
    let Some((field, raw)) = parse_line(line) else {
        if !line.trim().is_empty() {
            trace!("Ignoring line {:?}", line);
        }
        return;
    };

    if field == Field::Name {
        *cursor = if raw == registry.devices()[index].name {
            let active = registry.refresh_state(index, source) == DeviceState::Active;
            summary.records_matched += 1;
            debug!("Matched record {:?} (active: {})", raw, active);
            Cursor::Matched { index, active }
        } else {
            Cursor::NoMatch
        };
        return;
    }

    match *cursor {
        Cursor::NoMatch => {
            trace!("No device for {} line, skipping", field.label());
        }
        Cursor::Matched { active: false, .. } => summary.fields_skipped += 1,
        Cursor::Matched {
            index,
            active: true,
        } => apply_field(registry, source, index, field, raw, summary),
    }

    if field == Field::State {
        *cursor = Cursor::NoMatch;
    }
}

fn apply_field(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    index: usize,
    field: Field,
    raw: &str,
    summary: &mut LoadSummary,
) {
    let Some(value) = decode(field, raw) else {
        warn!("Bad value {:?} for {}", raw, field.label());
        summary.fields_skipped += 1;
        return;
    };

    let result = match (field, value) {
        (Field::VolumeScalar, Value::Float(v)) => registry.write_volume_scalar(index, source, v),
        (Field::VolumeLevel, Value::Float(v)) => registry.write_volume_level(index, source, v),
        (Field::IsMute, Value::Flag(v)) => registry.write_mute(index, source, v),
        (Field::State, Value::State(state)) => {
            let result = registry.write_visible(index, source, state == DeviceState::Active);
            registry.refresh_state(index, source);
            result
        }
        (field, Value::Flag(set)) => match field.default_target() {
            Some((role, direction))
                if set && registry.devices()[index].direction == direction =>
            {
                registry.write_default(index, source, role)
            }
            _ => {
                summary.fields_skipped += 1;
                return;
            }
        },
        (field, value) => {
            warn!("Unexpected {:?} for {}", value, field.label());
            summary.fields_skipped += 1;
            return;
        }
    };

    match result {
        Ok(()) => summary.fields_applied += 1,
        Err(e) => {
            warn!("{}", e);
            summary.failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{EndpointInfo, MemorySource, SourceCall};
    use std::io::Cursor as IoCursor;

    fn source() -> MemorySource {
        let source = MemorySource::new();
        source.add(
            EndpointInfo::new("spk", "Speakers", Direction::Playback, DeviceState::Active),
            0.5,
            -10.5,
            false,
        );
        source.add(
            EndpointInfo::new("mic", "Microphone", Direction::Capture, DeviceState::Active),
            0.25,
            -20.0,
            true,
        );
        source.set_current_default(Direction::Playback, DeviceRole::Console, "spk");
        source.set_current_default(Direction::Capture, DeviceRole::Communications, "mic");
        source
    }

    fn saved(source: &MemorySource) -> String {
        let mut registry = DeviceRegistry::build(source).unwrap();
        let mut out = Vec::new();
        save_to(&mut registry, source, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_save_layout() {
        let text = saved(&source());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 18);
        assert_eq!(
            &lines[..9],
            &[
                "Name: Speakers",
                "VolumeScalar: 0.5",
                "VolumeLevel: -10.5",
                "IsMute: 0",
                "IsDefaultPlayback: 1",
                "IsDefaultRecording: 0",
                "IsDefaultCommunicationPlayback: 0",
                "IsDefaultCommunicationRecording: 0",
                "State: 1",
            ]
        );
        assert_eq!(lines[9], "Name: Microphone");
        assert_eq!(lines[12], "IsMute: 1");
        assert_eq!(lines[16], "IsDefaultCommunicationRecording: 1");
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("Name: Mic: Front (USB)\r"),
            Some((Field::Name, "Mic: Front (USB)"))
        );
        assert_eq!(parse_line("State:8"), Some((Field::State, "8")));
        assert_eq!(parse_line("Colour: red"), None);
        assert_eq!(parse_line("no separator"), None);
    }

    #[test]
    fn test_round_trip_restores_levels_and_defaults() {
        let source = source();
        let text = saved(&source);

        source.set_levels("spk", 1.0, 0.0, true);
        source.set_levels("mic", 0.9, -1.0, false);
        source.set_current_default(Direction::Playback, DeviceRole::Console, "other");
        source.clear_journal();

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.records_matched, 2);
        assert_eq!(summary.failures, 0);
        assert_eq!(source.levels("spk"), Some((0.5, -10.5, false)));
        assert_eq!(source.levels("mic"), Some((0.25, -20.0, true)));
        assert_eq!(
            source.default_for(Direction::Playback, DeviceRole::Console),
            Some("spk".to_string())
        );
        assert!(registry.get(0).unwrap().is_default_console);
        assert!(registry.get(1).unwrap().is_default_communications);
    }

    #[test]
    fn test_unknown_name_is_skipped() {
        let source = source();
        let text = "Name: Gone\nVolumeScalar: 0.1\nVolumeLevel: -40\nIsMute: 1\n\
                    IsDefaultPlayback: 1\nIsDefaultRecording: 0\n\
                    IsDefaultCommunicationPlayback: 1\nIsDefaultCommunicationRecording: 0\n\
                    State: 2\n\
                    Name: Speakers\nVolumeScalar: 0.75\nVolumeLevel: -3\nIsMute: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.unknown_names, vec!["Gone".to_string()]);
        assert_eq!(summary.records_matched, 1);
        assert_eq!(source.levels("spk"), Some((0.75, -3.0, true)));
        assert_eq!(source.levels("mic"), Some((0.25, -20.0, true)));
        assert!(source.calls_for("mic").is_empty());
    }

    #[test]
    fn test_inactive_device_is_not_written() {
        let source = source();
        source.set_state("mic", DeviceState::Unplugged);
        let text = "Name: Microphone\nVolumeScalar: 1\nIsMute: 0\nState: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.records_matched, 1);
        assert_eq!(summary.fields_skipped, 3);
        assert!(source.calls_for("mic").is_empty());
    }

    #[test]
    fn test_record_order_independent_of_registry() {
        let source = source();
        let text = "Name: Microphone\nIsMute: 0\nState: 1\nName: Speakers\nIsMute: 1\nState: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(source.levels("spk").map(|l| l.2), Some(true));
        assert_eq!(source.levels("mic").map(|l| l.2), Some(false));
    }

    #[test]
    fn test_bad_values_and_stray_lines() {
        let source = source();
        let text = "garbage\nVolumeScalar: 0.1\nName: Speakers\nVolumeScalar: loud\n\
                    IsMute: yes\nVolumeLevel: -6\nState: 1\nIsMute: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.fields_skipped, 2);
        // The trailing IsMute comes after State and belongs to no record.
        assert_eq!(source.levels("spk"), Some((0.5, -6.0, false)));
    }

    #[test]
    fn test_default_flag_for_other_direction_is_ignored() {
        let source = source();
        let text = "Name: Speakers\nIsDefaultRecording: 1\nIsDefaultCommunicationPlayback: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(
            source.journal(),
            vec![SourceCall::SetDefault {
                device_id: "spk".to_string(),
                role: DeviceRole::Communications,
            }]
        );
    }

    #[test]
    fn test_state_disabled_hides_device() {
        let source = source();
        let text = "Name: Speakers\nState: 2\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(registry.get(0).unwrap().state, DeviceState::Disabled);
        assert_eq!(source.current_state("spk"), Some(DeviceState::Disabled));
    }

    #[test]
    fn test_save_truncates_file() {
        let source = source();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.cfg");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        let mut registry = DeviceRegistry::build(&source).unwrap();
        assert_eq!(save(&mut registry, &source, &path).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Name: Speakers\n"));
        assert!(!text.contains('x'));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_abort_load() {
        let source = source();
        let mut text = b"Name: Speakers\nVolumeScalar: 0.1\nIsMute: 1\nState: 1\n".to_vec();
        text.extend_from_slice(b"Name: Realtek\xAE Line\nVolumeScalar: 0.9\nState: 1\n");
        text.extend_from_slice(b"Name: Microphone\nVolumeScalar: 0.5\nIsMute: 0\nState: 1\n");

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.records_matched, 2);
        assert_eq!(summary.unknown_names, vec!["Realtek\u{FFFD} Line".to_string()]);
        assert_eq!(source.levels("spk"), Some((0.1, -10.5, true)));
        assert_eq!(source.levels("mic"), Some((0.5, -20.0, false)));
    }

    #[test]
    fn test_unknown_names_reported_with_no_devices() {
        let source = MemorySource::new();
        let text = "Name: Speakers\nIsMute: 1\nState: 1\n";

        let mut registry = DeviceRegistry::build(&source).unwrap();
        let summary = load_from(&mut registry, &source, IoCursor::new(text)).unwrap();

        assert_eq!(summary.records_matched, 0);
        assert_eq!(summary.unknown_names, vec!["Speakers".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let source = source();
        let mut registry = DeviceRegistry::build(&source).unwrap();
        let err = load(&mut registry, &source, Path::new("/nonexistent/devices.cfg")).unwrap_err();
        assert!(matches!(err, CodecError::Open { .. }));
    }
}
